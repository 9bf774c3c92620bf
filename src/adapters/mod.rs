//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements      | Connects to                  |
//! |----------------|-----------------|------------------------------|
//! | `config_file`  | ConfigPort      | JSON config file             |
//! | `fanout`       | CommandSink     | LinePort + BusPort           |
//! | `log_sink`     | CommandSink     | Logger (dry run)             |
//! | `mqtt`         | BusPort         | MQTT broker (rumqttc)        |
//! | `sensor`       | VehicleSensor   | Line feed (stdin) / constant |
//! | `serial`       | LinePort        | Serial port (serialport)     |
//! | `time`         | Clock           | `std::time::Instant`         |

pub mod config_file;
pub mod fanout;
pub mod log_sink;
pub mod mqtt;
pub mod sensor;
pub mod serial;
pub mod time;
