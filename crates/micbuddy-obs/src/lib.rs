//! OBS connection management for micbuddy.
//!
//! This crate watches for a running OBS process, keeps a single
//! obs-websocket session open while it runs, and polls the mute flags of
//! every microphone input to derive one aggregate live/muted value.
//!
//! The websocket client and the process probe sit behind the [`Connector`],
//! [`ControlSession`] and [`HostProbe`] traits so the [`ConnectionManager`]
//! can be driven by fakes in tests.

mod client;
pub mod manager;
mod poll;
mod probe;
mod protocol;

use std::time::Duration;

use async_trait::async_trait;
pub use client::{ObsConnector, ObsSession};
pub use manager::{ConnectionManager, ConnectionSignal, ConnectionState};
pub use poll::{MIC_KIND_MARKERS, aggregate_live, is_mic_kind, poll_live};
pub use probe::{HostProbe, OBS_PROCESS_NAMES, ProcessProbe, is_host_process};
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors from talking to OBS.
///
/// Anything raised once a session is open is treated as session-ending by
/// the [`ConnectionManager`].
#[derive(Debug, Error)]
pub enum ObsError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("request {request_type} failed with code {code}: {comment}")]
    Request {
        request_type: String,
        code: i64,
        comment: String,
    },

    #[error("unexpected message: {0}")]
    Protocol(String),

    #[error("{0} timed out after {1:?}")]
    Timeout(&'static str, Duration),

    #[error("connection closed")]
    Closed,
}

/// Result type for OBS operations.
pub type Result<T> = std::result::Result<T, ObsError>;

/// One configured OBS input as reported by the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicInput {
    pub name: String,
    pub kind: String,
}

impl MicInput {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl ConnectParams {
    /// Builds connection parameters from the user's config.
    pub fn from_config(config: &micbuddy_core::Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            password: config.password().map(str::to_owned),
            timeout: config.connect_timeout(),
        }
    }

    /// The websocket URL for these parameters.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// An open control session with the host.
#[async_trait]
pub trait ControlSession: Send {
    /// Lists every configured input, in the host's order.
    async fn list_inputs(&mut self) -> Result<Vec<MicInput>>;

    /// Queries the mute flag of a single input by name.
    async fn input_muted(&mut self, name: &str) -> Result<bool>;

    /// Closes the session. Errors are swallowed; the session is gone either way.
    async fn close(&mut self);
}

/// Opens control sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: ControlSession;

    /// Opens a session and completes the handshake.
    async fn connect(&self, params: &ConnectParams) -> Result<Self::Session>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ObsError::Closed;
        assert_eq!(err.to_string(), "connection closed");

        let err = ObsError::Timeout("GetInputMute", Duration::from_secs(2));
        assert_eq!(err.to_string(), "GetInputMute timed out after 2s");

        let err = ObsError::Request {
            request_type: "GetInputMute".into(),
            code: 600,
            comment: "No source was found".into(),
        };
        assert!(err.to_string().contains("600"));
    }

    #[test]
    fn test_params_from_config() {
        let config = micbuddy_core::Config {
            port: 4460,
            password: Some("secret".into()),
            ..Default::default()
        };
        let params = ConnectParams::from_config(&config);
        assert_eq!(params.url(), "ws://localhost:4460");
        assert_eq!(params.password.as_deref(), Some("secret"));
        assert_eq!(params.timeout, Duration::from_secs(5));
    }
}
