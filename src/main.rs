//! Intersection controller main entry point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MonotonicClock   LineFeedSensor   SerialLink   MqttBus        │
//! │  (Clock)          (VehicleSensor)  (LinePort)   (BusPort)      │
//! │                          FanoutSink / LogCommandSink           │
//! │                          (CommandSink)                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  TickDriver · PhaseScheduler                           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use intersection::adapters::config_file::JsonFileConfig;
use intersection::adapters::fanout::FanoutSink;
use intersection::adapters::log_sink::LogCommandSink;
use intersection::adapters::mqtt::MqttBus;
use intersection::adapters::sensor::{FixedVehicleSensor, LineFeedSensor};
use intersection::adapters::serial::SerialLink;
use intersection::adapters::time::MonotonicClock;
use intersection::app::ports::{Clock, CommandSink, ConfigPort, VehicleSensor};
use intersection::app::service::Controller;
use intersection::config::ControllerConfig;
use intersection::error::SensorError;

// ── Command line ──────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "intersection", version, about)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long, env = "INTERSECTION_CONFIG")]
    config: Option<PathBuf>,

    /// Log commands instead of opening the serial port and broker
    #[arg(long)]
    dry_run: bool,

    /// Use a constant vehicle count instead of reading counts from stdin
    #[arg(long, value_name = "N")]
    vehicles: Option<u32>,

    /// Override `serial.port`
    #[arg(long, env = "INTERSECTION_SERIAL_PORT")]
    serial_port: Option<String>,

    /// Override `mqtt.host`
    #[arg(long, env = "INTERSECTION_MQTT_HOST")]
    mqtt_host: Option<String>,
}

// ── Vehicle source selection ──────────────────────────────────

enum SensorSource {
    Feed(LineFeedSensor),
    Fixed(FixedVehicleSensor),
}

impl VehicleSensor for SensorSource {
    fn vehicle_count(&mut self) -> Result<u32, SensorError> {
        match self {
            Self::Feed(s) => s.vehicle_count(),
            Self::Fixed(s) => s.vehicle_count(),
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging + CLI ──────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("Intersection controller v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config(&cli)?;
    info!(
        "Timing: green {}s (+{}s/vehicle on side {}), yellow {}s, base cycle {}s",
        config.timing.base_green_secs,
        config.timing.extra_secs_per_vehicle,
        config.timing.sensored_side,
        config.timing.yellow_secs,
        config.timing.base_cycle_secs(),
    );

    // ── 3. Stop request (Ctrl-C / SIGTERM / `q` on the feed) ──
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("installing stop signal handler")?;
    }

    let mut sensor = match cli.vehicles {
        Some(n) => {
            info!("Vehicle count fixed at {}", n);
            SensorSource::Fixed(FixedVehicleSensor(n))
        }
        None => {
            info!("Reading vehicle counts from stdin (one per line, `q` to stop)");
            SensorSource::Feed(LineFeedSensor::stdin(stop.clone()))
        }
    };

    let mut controller = Controller::new(config.timing);
    let poll = Duration::from_millis(config.poll_interval_ms);

    // ── 4. Transports + control loop ──────────────────────────
    if cli.dry_run {
        info!("Dry run: commands are logged, no serial port or broker");
        let mut sink = LogCommandSink::new();
        control_loop(&mut controller, &mut sensor, &mut sink, &stop, poll);
        let (commands, telemetry) = sink.counts();
        info!("Dry run logged {} phase commands, {} green-time values", commands, telemetry);
    } else {
        // Both transports must be up before the first command is issued.
        let link = SerialLink::open(&config.serial)
            .with_context(|| format!("opening serial port {}", config.serial.port))?;
        let bus = match MqttBus::connect(&config.mqtt) {
            Ok(bus) => bus,
            Err(e) => {
                link.close();
                return Err(e).with_context(|| {
                    format!("connecting to broker {}:{}", config.mqtt.host, config.mqtt.port)
                });
            }
        };

        let mut sink = FanoutSink::new(link, bus, &config.serial, &config.mqtt);
        control_loop(&mut controller, &mut sensor, &mut sink, &stop, poll);

        // ── 5. Shutdown ───────────────────────────────────────
        let (link, bus) = sink.into_parts();
        bus.shutdown();
        link.close();
    }

    let stats = controller.stats();
    info!(
        "Stopped after {} ticks: {} transitions, {} cycles, {} dropped commands, \
         {} dropped telemetry, {} sensor gaps",
        stats.ticks,
        stats.transitions,
        stats.cycles_completed,
        stats.dropped_commands,
        stats.dropped_telemetry,
        stats.sensor_gaps,
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ControllerConfig> {
    let mut config = JsonFileConfig::new(cli.config.clone())
        .load()
        .context("loading configuration")?;

    if let Some(port) = &cli.serial_port {
        config.serial.port.clone_from(port);
    }
    if let Some(host) = &cli.mqtt_host {
        config.mqtt.host.clone_from(host);
    }
    config
        .validate()
        .context("validating command-line overrides")?;
    Ok(config)
}

/// Sample the clock until a stop is requested.  The controller ticks at
/// most once per whole second regardless of `poll`.
///
/// The clock starts here, after every transport is up, and side 1's first
/// GREEN is timed from the sample taken as the initial command goes out.
fn control_loop(
    controller: &mut Controller,
    sensor: &mut impl VehicleSensor,
    sink: &mut impl CommandSink,
    stop: &AtomicBool,
    poll: Duration,
) {
    let clock = MonotonicClock::new();
    controller.start_at(clock.since_start(), sink);
    info!("Controller running. Entering control loop.");

    while !stop.load(Ordering::SeqCst) {
        controller.poll(clock.since_start(), sensor, sink);
        std::thread::sleep(poll);
    }

    warn!("Stop requested, leaving control loop");
}
