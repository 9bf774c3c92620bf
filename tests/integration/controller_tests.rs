//! Controller wired to the fan-out sink and a hand-advanced clock.

use std::time::Duration;

use intersection::adapters::fanout::FanoutSink;
use intersection::app::ports::Clock;
use intersection::app::service::Controller;
use intersection::config::{ControllerConfig, SignalTiming};
use intersection::fsm::Side;

use super::mock_io::{
    FlakyLink, ManualClock, MemoryBus, RecordingSink, ScriptedSensor, SinkCall, run_seconds,
    started,
};

fn fanout(fail_first: usize) -> FanoutSink<FlakyLink, MemoryBus> {
    let config = ControllerConfig::default();
    let link = FlakyLink {
        fail_first,
        ..FlakyLink::default()
    };
    FanoutSink::new(link, MemoryBus::default(), &config.serial, &config.mqtt)
}

#[test]
fn startup_command_reaches_serial_and_bus() {
    let mut sink = fanout(0);
    let mut c = Controller::new(SignalTiming::default());
    c.start(&mut sink);

    let (link, bus) = sink.into_parts();
    assert_eq!(link.lines, vec!["GREEN1 RED2 RED3 RED4\n"]);
    assert_eq!(bus.payloads("TrafficTopic"), vec!["GREEN1 RED2 RED3 RED4"]);
}

#[test]
fn phase_command_is_retried_once_on_serial_timeout() {
    let mut sink = fanout(1);
    let mut c = Controller::new(SignalTiming::default());
    c.start(&mut sink);
    assert_eq!(c.stats().dropped_commands, 0);

    let (link, _bus) = sink.into_parts();
    assert_eq!(link.attempts, 2);
    assert_eq!(link.lines, vec!["GREEN1 RED2 RED3 RED4\n"]);
}

#[test]
fn exhausted_retries_are_counted_and_the_cycle_continues() {
    let mut sink = fanout(2);
    let mut c = Controller::new(SignalTiming::default());
    let mut sensor = ScriptedSensor::constant(0);
    c.start(&mut sink);
    assert_eq!(c.stats().dropped_commands, 1);

    run_seconds(&mut c, 0, 10, &mut sensor, &mut sink);
    assert_eq!(c.assignment().to_string(), "YELLOW1 RED2 RED3 RED4");

    let (link, bus) = sink.into_parts();
    assert_eq!(link.lines, vec!["YELLOW1 RED2 RED3 RED4\n"]);
    // The bus is independent of the serial outcome.
    assert_eq!(bus.payloads("TrafficTopic").len(), 2);
}

#[test]
fn telemetry_goes_to_bus_only() {
    let mut sink = fanout(0);
    let mut c = Controller::new(SignalTiming::default());
    let mut sensor = ScriptedSensor::constant(5);
    c.start(&mut sink);
    run_seconds(&mut c, 0, 15, &mut sensor, &mut sink);

    let (link, bus) = sink.into_parts();
    assert_eq!(bus.payloads("TrafficTimeSide1"), vec!["15", "0"]);
    assert!(link.lines.iter().all(|l| !l.starts_with("15")));
}

#[test]
fn frame_rate_polling_matches_per_second_ticks() {
    let clock = ManualClock::default();
    let mut fast_sink = RecordingSink::new();
    let mut fast = started(&mut fast_sink);
    let mut sensor = ScriptedSensor::constant(3);

    // ~30 samples per second for 60 seconds.
    let frame = Duration::from_micros(33_333);
    while clock.since_start() < Duration::from_secs(60) {
        fast.poll(clock.since_start(), &mut sensor, &mut fast_sink);
        clock.advance(frame);
    }

    let mut slow_sink = RecordingSink::new();
    let mut slow = started(&mut slow_sink);
    run_seconds(&mut slow, 0, 59, &mut ScriptedSensor::constant(3), &mut slow_sink);

    assert_eq!(fast_sink.calls, slow_sink.calls);
    assert_eq!(fast.stats().ticks, 60);
    assert!(fast.discarded_samples() > 1000);
}

#[test]
fn unavailable_sensor_counts_as_zero_vehicles() {
    let mut sink = RecordingSink::new();
    let mut c = started(&mut sink);
    // No reading until t=3, then 4 vehicles.
    let mut sensor = ScriptedSensor::new([None, None, None, Some(4)]);

    run_seconds(&mut c, 0, 5, &mut sensor, &mut sink);
    assert_eq!(c.stats().sensor_gaps, 3);
    assert_eq!(sink.telemetry(), vec![10, 14]);
}

#[test]
fn late_sample_fires_at_most_one_transition() {
    let mut sink = RecordingSink::new();
    let mut c = started(&mut sink);
    let mut sensor = ScriptedSensor::constant(0);

    c.poll(Duration::ZERO, &mut sensor, &mut sink);
    // The loop stalled for 20 seconds.
    c.poll(Duration::from_secs(20), &mut sensor, &mut sink);
    assert_eq!(c.assignment().to_string(), "YELLOW1 RED2 RED3 RED4");

    c.poll(Duration::from_secs(23), &mut sensor, &mut sink);
    assert_eq!(c.assignment().to_string(), "RED1 GREEN2 RED3 RED4");
}

#[test]
fn first_green_is_timed_from_start_not_from_clock_zero() {
    // Transports took five seconds to come up before the first command.
    let clock = ManualClock::default();
    clock.advance(Duration::from_secs(5));
    let mut sink = RecordingSink::new();
    let mut c = Controller::new(SignalTiming::default());
    c.start_at(clock.since_start(), &mut sink);
    let mut sensor = ScriptedSensor::constant(0);

    let mut yellow_at = None;
    while clock.since_start() <= Duration::from_secs(20) && yellow_at.is_none() {
        let before = sink.commands().len();
        let tick = c.poll(clock.since_start(), &mut sensor, &mut sink);
        if sink.commands().len() > before {
            yellow_at = tick;
        }
        clock.advance(Duration::from_secs(1));
    }

    assert_eq!(sink.commands()[0], "GREEN1 RED2 RED3 RED4");
    assert_eq!(yellow_at, Some(15));
}

#[test]
fn green_time_is_published_on_the_sensored_sides_topic() {
    let config = ControllerConfig::default();
    let timing = SignalTiming {
        sensored_side: Side::Three,
        ..SignalTiming::default()
    };
    let mut sink = FanoutSink::new(
        FlakyLink::default(),
        MemoryBus::default(),
        &config.serial,
        &config.mqtt,
    );
    let mut c = Controller::new(timing);
    let mut sensor = ScriptedSensor::constant(4);
    c.start(&mut sink);

    // GREEN3 runs from t=26 to t=40 with four vehicles.
    run_seconds(&mut c, 0, 40, &mut sensor, &mut sink);
    assert_eq!(c.assignment().to_string(), "RED1 RED2 YELLOW3 RED4");

    let (_, bus) = sink.into_parts();
    assert_eq!(bus.payloads("TrafficTimeSide3"), vec!["14", "0"]);
    assert!(bus.payloads("TrafficTimeSide1").is_empty());
}

#[test]
fn undelivered_phase_commands_are_counted_and_the_cycle_continues() {
    let mut sink = RecordingSink {
        failing_phase_commands: 2,
        ..RecordingSink::default()
    };
    let mut c = started(&mut sink);
    let mut sensor = ScriptedSensor::constant(0);
    run_seconds(&mut c, 0, 13, &mut sensor, &mut sink);

    // GREEN1 and YELLOW1 were lost; GREEN2 at t=13 went through.
    assert_eq!(c.stats().dropped_commands, 2);
    assert_eq!(c.stats().transitions, 2);
    assert_eq!(sink.commands(), vec!["RED1 GREEN2 RED3 RED4"]);
    assert!(sink.calls.contains(&SinkCall::Telemetry(Side::One, 0)));
}
