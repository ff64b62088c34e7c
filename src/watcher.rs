//! Background OBS watcher feeding the event loop.

use std::time::Duration;

use micbuddy_core::Config;
use micbuddy_obs::{ConnectionManager, ConnectionSignal, ObsConnector, ProcessProbe};
use tao::event_loop::EventLoopProxy;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::event::MicBuddyEvent;

/// How long quitting waits for the OBS session to close.
const STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs the connection manager on its own runtime and forwards its signals
/// to the event loop.
pub struct ObsWatcher {
    runtime: Runtime,
    manager: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl ObsWatcher {
    pub fn start(config: &Config, proxy: EventLoopProxy<MicBuddyEvent>) -> anyhow::Result<Self> {
        // Set up tokio runtime
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let (signal_sender, signal_receiver) = mpsc::unbounded_channel();
        let (shutdown, shutdown_receiver) = watch::channel(false);

        let manager = ConnectionManager::new(
            ObsConnector,
            ProcessProbe::new(),
            config,
            signal_sender,
        );
        let manager = runtime.spawn(manager.run(shutdown_receiver));

        runtime.spawn(forward_signals(signal_receiver, move |event| {
            proxy.send_event(event).is_ok()
        }));

        Ok(Self {
            runtime,
            manager,
            shutdown,
        })
    }

    /// Stops the manager, giving it a moment to close the session.
    pub fn stop(self) {
        info!("stopping OBS watcher");
        self.shutdown.send(true).ok();

        let manager = self.manager;
        let stopped = self
            .runtime
            .block_on(async { tokio::time::timeout(STOP_TIMEOUT, manager).await });
        if stopped.is_err() {
            warn!(timeout = ?STOP_TIMEOUT, "connection manager did not stop in time");
        }
        self.runtime.shutdown_timeout(STOP_TIMEOUT);
    }
}

/// Relays manager signals until either side goes away.
///
/// `deliver` returns `false` once the event loop is gone.
async fn forward_signals<F>(mut signals: mpsc::UnboundedReceiver<ConnectionSignal>, mut deliver: F)
where
    F: FnMut(MicBuddyEvent) -> bool,
{
    while let Some(signal) = signals.recv().await {
        debug!(signal = ?signal, "forwarding signal");
        if !deliver(signal.into()) {
            debug!("event loop closed, stopping signal forwarding");
            break;
        }
    }
}
