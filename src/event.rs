//! Application events for the tao event loop.

use micbuddy_obs::ConnectionSignal;

/// Events delivered to the UI thread through the event loop proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicBuddyEvent {
    /// OBS session opened or closed
    Connectivity(bool),
    /// Every mic is unmuted (`true`) or at least one is muted
    Live(bool),
}

impl From<ConnectionSignal> for MicBuddyEvent {
    fn from(signal: ConnectionSignal) -> Self {
        match signal {
            ConnectionSignal::Connectivity(connected) => Self::Connectivity(connected),
            ConnectionSignal::Live(live) => Self::Live(live),
        }
    }
}
