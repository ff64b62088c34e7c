//! Connection and microphone status shared with the tray.

/// Snapshot of what the overlay currently believes about OBS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    /// Whether a session with OBS is open
    pub connected: bool,
    /// Whether every tracked microphone is unmuted
    pub live: bool,
}

impl Status {
    /// Human readable connection line for the tray menu.
    pub fn connection_text(&self) -> &'static str {
        if self.connected {
            "OBS Status: Connected"
        } else {
            "OBS Status: Waiting…"
        }
    }

    /// Human readable microphone line for the tray menu.
    pub fn mic_text(&self) -> &'static str {
        if self.live {
            "Mic Status: Live"
        } else {
            "Mic Status: Muted"
        }
    }
}
