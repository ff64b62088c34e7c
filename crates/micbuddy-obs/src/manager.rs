//! Connection manager reconciling OBS presence with the websocket session.
//!
//! Once per tick the manager checks whether OBS is running, opens or drops
//! the session to match, and polls mute state while connected. There is no
//! backoff: a failed handshake or a faulted session is simply retried on the
//! next tick.

use std::sync::Arc;
use std::time::Duration;

use micbuddy_core::Config;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::poll::{bounded, poll_live};
use crate::{ConnectParams, Connector, ControlSession, HostProbe};

/// Lifecycle of the single OBS session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Values pushed out of the manager's loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSignal {
    /// A session was opened (`true`) or torn down (`false`).
    Connectivity(bool),
    /// Result of a successful poll: every mic unmuted.
    Live(bool),
}

/// Owns the OBS session and drives it from a fixed tick.
pub struct ConnectionManager<C: Connector, P: HostProbe> {
    connector: C,
    /// Shared with the blocking pool while a scan runs.
    probe: Arc<Mutex<P>>,
    params: ConnectParams,
    call_timeout: Duration,
    poll_interval: Duration,
    session: Option<C::Session>,
    state: ConnectionState,
    /// Last connectivity value sent, so repeats are suppressed.
    reported: Option<bool>,
    signals: mpsc::UnboundedSender<ConnectionSignal>,
}

impl<C: Connector, P: HostProbe + 'static> ConnectionManager<C, P> {
    pub fn new(
        connector: C,
        probe: P,
        config: &Config,
        signals: mpsc::UnboundedSender<ConnectionSignal>,
    ) -> Self {
        Self {
            connector,
            probe: Arc::new(Mutex::new(probe)),
            params: ConnectParams::from_config(config),
            call_timeout: config.call_timeout(),
            poll_interval: config.poll_interval(),
            session: None,
            state: ConnectionState::Disconnected,
            reported: None,
            signals,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Ticks until `shutdown` flips or its sender is dropped, then closes
    /// the session.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            url = %self.params.url(),
            interval = ?self.poll_interval,
            "connection manager started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                _ = shutdown.changed() => break,
            }
        }

        self.shutdown().await;
    }

    /// One reconciliation step: probe, connect or disconnect, then poll.
    pub async fn tick(&mut self) {
        let host_running = scan(Arc::clone(&self.probe)).await;

        match (host_running, self.session.is_some()) {
            (true, false) => self.connect().await,
            (false, true) => {
                info!("OBS is no longer running");
                self.disconnect().await;
            }
            _ => {}
        }

        let Some(session) = self.session.as_mut() else {
            self.report_connectivity(false);
            return;
        };
        match poll_live(session, self.call_timeout).await {
            Ok(live) => self.emit(ConnectionSignal::Live(live)),
            Err(e) => {
                warn!(error = %e, "mute poll failed, dropping session");
                self.disconnect().await;
            }
        }
    }

    /// Closes any open session and reports the disconnect.
    pub async fn shutdown(&mut self) {
        self.disconnect().await;
        info!("connection manager shut down");
    }

    async fn connect(&mut self) {
        self.state = ConnectionState::Connecting;
        debug!(url = %self.params.url(), "connecting to OBS");

        let handshake = bounded(
            "handshake",
            self.params.timeout,
            self.connector.connect(&self.params),
        )
        .await;

        match handshake {
            Ok(session) => {
                self.session = Some(session);
                self.state = ConnectionState::Connected;
                info!("connected to OBS");
                self.report_connectivity(true);
            }
            Err(e) => {
                // Expected while OBS is still starting up.
                debug!(error = %e, "handshake failed, retrying next tick");
                self.state = ConnectionState::Disconnected;
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            if tokio::time::timeout(self.call_timeout, session.close())
                .await
                .is_err()
            {
                debug!("session close timed out");
            }
            info!("disconnected from OBS");
        }
        self.state = ConnectionState::Disconnected;
        self.report_connectivity(false);
    }

    fn report_connectivity(&mut self, connected: bool) {
        if self.reported != Some(connected) {
            self.reported = Some(connected);
            self.emit(ConnectionSignal::Connectivity(connected));
        }
    }

    fn emit(&self, signal: ConnectionSignal) {
        if self.signals.send(signal).is_err() {
            debug!(signal = ?signal, "signal receiver dropped");
        }
    }
}

/// Runs the process scan on the blocking pool so it never stalls the
/// runtime's worker. A panicking scan counts as "not running".
async fn scan<P: HostProbe + 'static>(probe: Arc<Mutex<P>>) -> bool {
    match tokio::task::spawn_blocking(move || probe.lock().host_running()).await {
        Ok(running) => running,
        Err(e) => {
            warn!(error = %e, "process probe failed");
            false
        }
    }
}
