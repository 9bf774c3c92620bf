//! MQTT bus adapter.
//!
//! Implements [`BusPort`] over `rumqttc`'s synchronous client.  The
//! client's network event loop runs on its own thread; publishes from the
//! control loop use `try_publish`, so a slow broker fills the bounded
//! request queue and drops messages instead of stalling the loop.
//!
//! ## Lifecycle
//!
//! 1. [`MqttBus::connect`] spawns the event loop and waits (bounded by
//!    `connect_timeout_ms`) for the broker's CONNACK.  No CONNACK is a
//!    fatal [`ConfigError::BrokerUnreachable`].
//! 2. After that, connection drops are logged and `rumqttc` reconnects
//!    on the next poll.
//! 3. [`MqttBus::shutdown`] sends DISCONNECT and joins the thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};
use rumqttc::{Client, ConnectReturnCode, Event, MqttOptions, Outgoing, Packet, QoS};

use crate::app::ports::BusPort;
use crate::config::MqttConfig;
use crate::error::{ConfigError, TransportError};

/// Delay between reconnect attempts after the initial connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub struct MqttBus {
    client: Client,
    event_loop: Option<JoinHandle<()>>,
    shutting_down: Arc<AtomicBool>,
}

impl MqttBus {
    /// Connect to the configured broker.  Failure is fatal at startup.
    pub fn connect(config: &MqttConfig) -> Result<Self, ConfigError> {
        let mut opts = MqttOptions::new(&config.client_id, &config.host, config.port);
        opts.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));
        opts.set_clean_session(true);

        let (client, mut connection) = Client::new(opts, config.channel_capacity);
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let shutting_down = Arc::new(AtomicBool::new(false));
        let stop = shutting_down.clone();

        let event_loop = std::thread::Builder::new()
            .name("mqtt-event-loop".into())
            .spawn(move || {
                let mut connected = false;
                for notification in connection.iter() {
                    match notification {
                        Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                            if ack.code == ConnectReturnCode::Success {
                                if !connected {
                                    let _ = ready_tx.send(Ok(()));
                                }
                                connected = true;
                                info!("MQTT: connected");
                            } else if !connected {
                                let _ = ready_tx.send(Err(format!("{:?}", ack.code)));
                                break;
                            }
                        }
                        Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                            debug!("MQTT: disconnect sent");
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            if !connected {
                                let _ = ready_tx.send(Err(e.to_string()));
                                break;
                            }
                            if stop.load(Ordering::SeqCst) {
                                break;
                            }
                            warn!("MQTT: connection error ({}), retrying", e);
                            std::thread::sleep(RECONNECT_DELAY);
                        }
                    }
                }
                debug!("MQTT: event loop exited");
            })
            .map_err(|e| {
                warn!("MQTT: cannot start event loop: {}", e);
                ConfigError::BrokerUnreachable
            })?;

        let timeout = Duration::from_millis(config.connect_timeout_ms);
        let endpoint = format!("{}:{}", config.host, config.port);
        match ready_rx.recv_timeout(timeout) {
            Ok(Ok(())) => Ok(Self {
                client,
                event_loop: Some(event_loop),
                shutting_down,
            }),
            Ok(Err(reason)) => {
                warn!("MQTT: broker {} refused or unreachable: {}", endpoint, reason);
                Err(ConfigError::BrokerUnreachable)
            }
            Err(_) => {
                warn!("MQTT: no CONNACK from {} within {:?}", endpoint, timeout);
                shutting_down.store(true, Ordering::SeqCst);
                let _ = client.try_disconnect();
                Err(ConfigError::BrokerUnreachable)
            }
        }
    }

    /// Disconnect gracefully and wait for the event loop to finish.
    pub fn shutdown(mut self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        if let Err(e) = self.client.disconnect() {
            warn!("MQTT: disconnect failed: {}", e);
        }
        if let Some(handle) = self.event_loop.take() {
            if handle.join().is_err() {
                warn!("MQTT: event loop panicked");
            }
        }
        info!("MQTT: disconnected");
    }
}

impl BusPort for MqttBus {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| {
                warn!("MQTT: publish to {} failed: {}", topic, e);
                TransportError::PublishFailed
            })
    }
}
