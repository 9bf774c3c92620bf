//! End-to-end timing scenarios, ticked once per whole second from t=0.

use super::mock_io::{RecordingSink, ScriptedSensor, SinkCall, run_seconds, started};

use std::time::Duration;

use intersection::fsm::Side;

// ── Scenario A: no vehicles ───────────────────────────────────

#[test]
fn base_green_ends_exactly_at_ten_seconds() {
    let mut sink = RecordingSink::new();
    let mut c = started(&mut sink);
    let mut sensor = ScriptedSensor::constant(0);

    run_seconds(&mut c, 0, 9, &mut sensor, &mut sink);
    assert_eq!(sink.commands(), vec!["GREEN1 RED2 RED3 RED4"]);

    run_seconds(&mut c, 10, 10, &mut sensor, &mut sink);
    assert_eq!(
        sink.commands(),
        vec!["GREEN1 RED2 RED3 RED4", "YELLOW1 RED2 RED3 RED4"]
    );
}

// ── Scenario B: five vehicles on the sensored side ────────────

#[test]
fn five_vehicles_extend_green_to_fifteen_seconds() {
    let mut sink = RecordingSink::new();
    let mut c = started(&mut sink);
    let mut sensor = ScriptedSensor::constant(5);

    run_seconds(&mut c, 0, 14, &mut sensor, &mut sink);
    assert_eq!(sink.commands().len(), 1);
    assert_eq!(sink.telemetry(), vec![15]);

    run_seconds(&mut c, 15, 15, &mut sensor, &mut sink);
    assert_eq!(sink.commands().last().map(String::as_str), Some("YELLOW1 RED2 RED3 RED4"));
    assert_eq!(sink.telemetry(), vec![15, 0]);
}

#[test]
fn extension_tracks_latest_count() {
    let mut sink = RecordingSink::new();
    let mut c = started(&mut sink);
    // 2 vehicles for three seconds, then 6, then back down to 1.
    let script = [2, 2, 2, 6, 6, 1].map(Some);
    let mut sensor = ScriptedSensor::new(script);

    run_seconds(&mut c, 0, 10, &mut sensor, &mut sink);
    assert_eq!(sink.telemetry(), vec![12, 16, 11]);
    // 11s required, so still GREEN at t=10.
    assert_eq!(sink.commands().len(), 1);

    run_seconds(&mut c, 11, 11, &mut sensor, &mut sink);
    assert_eq!(sink.commands().len(), 2);
    assert_eq!(sink.telemetry(), vec![12, 16, 11, 0]);
}

// ── Scenario C: full rotation at base durations ───────────────

#[test]
fn full_rotation_takes_fifty_two_seconds() {
    let mut sink = RecordingSink::new();
    let mut c = started(&mut sink);
    let mut sensor = ScriptedSensor::constant(0);

    let mut changes = Vec::new();
    for t in 0..=52u64 {
        let before = sink.commands().len();
        c.poll(Duration::from_secs(t), &mut sensor, &mut sink);
        if sink.commands().len() > before {
            changes.push((t, sink.commands()[before].clone()));
        }
    }

    let expected = [
        (10, "YELLOW1 RED2 RED3 RED4"),
        (13, "RED1 GREEN2 RED3 RED4"),
        (23, "RED1 YELLOW2 RED3 RED4"),
        (26, "RED1 RED2 GREEN3 RED4"),
        (36, "RED1 RED2 YELLOW3 RED4"),
        (39, "RED1 RED2 RED3 GREEN4"),
        (49, "RED1 RED2 RED3 YELLOW4"),
        (52, "GREEN1 RED2 RED3 RED4"),
    ];
    let got: Vec<(u64, &str)> = changes.iter().map(|(t, s)| (*t, s.as_str())).collect();
    assert_eq!(got, expected);

    assert_eq!(c.stats().transitions, 8);
    assert_eq!(c.stats().cycles_completed, 1);
}

// ── Scenario D: count drops to zero once YELLOW starts ────────

#[test]
fn no_telemetry_during_yellow_or_unsensored_sides() {
    let mut sink = RecordingSink::new();
    let mut c = started(&mut sink);
    // Five vehicles for t=0..=15, zero from the first YELLOW tick onwards.
    let mut script: Vec<Option<u32>> = vec![Some(5); 16];
    script.push(Some(0));
    let mut sensor = ScriptedSensor::new(script);

    // Through the end of side 4's YELLOW (side 1 GREEN again at t=57).
    run_seconds(&mut c, 0, 56, &mut sensor, &mut sink);

    let transition_at_15 = sink
        .calls
        .iter()
        .position(|call| *call == SinkCall::Phase("YELLOW1 RED2 RED3 RED4".into()));
    assert!(transition_at_15.is_some());

    // 15 during GREEN, then the reset emitted with the YELLOW change.
    assert_eq!(sink.telemetry(), vec![15, 0]);
    let idx = transition_at_15.unwrap_or_default();
    assert_eq!(sink.calls.get(idx + 1), Some(&SinkCall::Telemetry(Side::One, 0)));
}
