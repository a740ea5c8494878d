//! Session controller
//!
//! Composes the permission gate, scanner, connection manager, reassembler,
//! and outbound writer into one logical session: permissions → scan → connect
//! → pump. Decoded samples, state changes, and errors all flow out on a
//! single event channel; the collision flag flows in on a watch channel.

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use carlink_core::{CarlinkError, ConnectionState, FrameReassembler, SessionEvent};

use crate::config::SessionConfig;
use crate::connection::{ConnectionManager, Subscription};
use crate::permissions::PermissionGate;
use crate::radio::Radio;
use crate::scanner::{name_matches, Scanner};
use crate::writer::OutboundWriter;

// ----------------------------------------------------------------------------
// Session Handle
// ----------------------------------------------------------------------------

/// Consumer-side handle on a running session.
///
/// Dropping the handle tears the session down the same way [`stop`]
/// (SessionHandle::stop) does.
pub struct SessionHandle {
    events: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    collision: watch::Sender<bool>,
    stop: watch::Sender<bool>,
}

impl SessionHandle {
    /// Take the event receiver. Yields `Some` exactly once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.events.take()
    }

    /// Update the tracked event flag. Every change is forwarded to the
    /// peripheral, including rapid back-and-forth toggles.
    pub fn set_collision(&self, flag: bool) {
        let _ = self.collision.send(flag);
    }

    /// End the session: cancels a pending scan, closes the GATT link, and
    /// invalidates the subscription. Safe to call at any time and any number
    /// of times, including before the session ever connected.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

// ----------------------------------------------------------------------------
// Session Controller
// ----------------------------------------------------------------------------

/// One BLE control-loop session.
///
/// Owns the radio exclusively for its lifetime; at most one scan and one
/// peripheral connection exist per session.
pub struct CarSession {
    config: SessionConfig,
    state: ConnectionState,
    events: mpsc::UnboundedSender<SessionEvent>,
    flag_rx: watch::Receiver<bool>,
    stop_rx: watch::Receiver<bool>,
    manager: ConnectionManager,
    writer: OutboundWriter,
}

impl CarSession {
    pub fn new(config: SessionConfig) -> (Self, SessionHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (collision_tx, flag_rx) = watch::channel(false);
        let (stop_tx, stop_rx) = watch::channel(false);

        let session = Self {
            manager: ConnectionManager::new(config.clone()),
            config,
            state: ConnectionState::Idle,
            events: event_tx,
            flag_rx,
            stop_rx,
            writer: OutboundWriter::new(),
        };
        let handle = SessionHandle {
            events: Some(event_rx),
            collision: collision_tx,
            stop: stop_tx,
        };
        (session, handle)
    }

    /// Drive the session to completion. Resolves once the session has been
    /// stopped, the peripheral disconnected, or a stage failed; the session
    /// never retries on its own.
    pub async fn run(mut self) {
        info!(device = %self.config.device_name, "session starting");

        // The stock firmware's companion proceeds to scan even when the
        // grant is denied; the denial is reported, not enforced.
        if !PermissionGate::for_platform().request_capabilities().await {
            warn!("capabilities denied, proceeding anyway");
            self.emit_error(CarlinkError::PermissionDenied);
        }

        let radio = match Radio::acquire().await {
            Ok(radio) => radio,
            Err(e) => return self.fail(e),
        };

        self.set_state(ConnectionState::Scanning);
        let scanner = Scanner::new(radio.adapter().clone());
        let device_name = self.config.device_name.clone();
        let peripheral = match scanner
            .scan_first(name_matches(&device_name), self.stop_rx.clone())
            .await
        {
            Ok(Some(peripheral)) => peripheral,
            Ok(None) => return self.set_state(ConnectionState::Disconnected),
            Err(e) => return self.fail(e),
        };

        self.set_state(ConnectionState::Connecting);
        if let Err(e) = self.manager.open_link(peripheral).await {
            return self.teardown_with(e).await;
        }

        self.set_state(ConnectionState::DiscoveringCapabilities);
        let mut subscription = match self.manager.subscribe().await {
            Ok(subscription) => subscription,
            Err(e) => return self.teardown_with(e).await,
        };

        self.set_state(ConnectionState::Subscribed);
        let (write_peripheral, characteristic) = subscription.write_target();
        self.writer.attach(write_peripheral, characteristic);

        self.pump(&mut subscription).await;

        self.manager.disconnect().await;
        self.writer.detach();
        self.set_state(ConnectionState::Disconnected);
        info!("session ended");
    }

    /// Forward fragments through the reassembler and flag changes to the
    /// writer until stop, handle drop, or peripheral disconnect.
    async fn pump(&mut self, subscription: &mut Subscription) {
        let mut stop_rx = self.stop_rx.clone();
        let mut flag_rx = self.flag_rx.clone();
        let mut reassembler = FrameReassembler::new();

        // The flag effect fires once on subscribe with the current value.
        let initial_flag = *flag_rx.borrow_and_update();
        if let Err(e) = self.writer.send(initial_flag).await {
            self.emit_error(e);
        }

        loop {
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        info!("session stop requested");
                        break;
                    }
                }
                changed = flag_rx.changed() => {
                    match changed {
                        Ok(()) => {
                            let flag = *flag_rx.borrow_and_update();
                            if let Err(e) = self.writer.send(flag).await {
                                self.emit_error(e);
                            }
                        }
                        // Handle dropped; no consumer left to drive the flag.
                        Err(_) => break,
                    }
                }
                fragment = subscription.next_fragment() => {
                    match fragment {
                        Some(bytes) => {
                            if let Some(result) = reassembler.push(&bytes) {
                                match result {
                                    Ok(sample) => self.emit(SessionEvent::Sample(sample)),
                                    Err(e) => {
                                        warn!("discarding malformed frame: {}", e);
                                        self.emit_error(e);
                                    }
                                }
                            }
                        }
                        None => {
                            info!("notification stream ended");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            info!(?state, "connection state changed");
            self.state = state;
            self.emit(SessionEvent::StateChanged(state));
        }
    }

    /// Report a stage failure and end the session without a link to close.
    fn fail(&mut self, error: CarlinkError) {
        self.emit_error(error);
        self.set_state(ConnectionState::Disconnected);
    }

    /// Report a stage failure and close the half-open link first.
    async fn teardown_with(&mut self, error: CarlinkError) {
        self.emit_error(error);
        self.manager.disconnect().await;
        self.set_state(ConnectionState::Disconnected);
    }

    fn emit_error(&mut self, error: CarlinkError) {
        warn!("session error: {}", error);
        self.emit(SessionEvent::Error(error));
    }

    fn emit(&mut self, event: SessionEvent) {
        // A consumer that dropped its receiver forfeits the events.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_receiver_can_be_taken_exactly_once() {
        let (_session, mut handle) = CarSession::new(SessionConfig::default());
        assert!(handle.take_events().is_some());
        assert!(handle.take_events().is_none());
    }

    #[test]
    fn handle_controls_survive_a_dropped_session() {
        let (session, handle) = CarSession::new(SessionConfig::default());
        drop(session);
        // Both notifications land in a closed channel and are ignored.
        handle.set_collision(true);
        handle.stop();
        handle.stop();
    }

    #[tokio::test]
    async fn stop_is_visible_to_a_pending_scan_receiver() {
        let (session, handle) = CarSession::new(SessionConfig::default());
        let mut stop_rx = session.stop_rx.clone();
        handle.stop();
        stop_rx.changed().await.unwrap();
        assert!(*stop_rx.borrow());
    }
}
