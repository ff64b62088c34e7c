// Re-export from sub-crates
pub use micbuddy_core::{
    APP_NAME, APP_NAME_PRETTY, Config, ConfigManager, DEFAULT_LOG_LEVEL, Status, WindowPosition,
};
pub use micbuddy_face::{FRAME_INTERVAL, FaceEngine};
pub use micbuddy_obs::{ConnectionManager, ConnectionSignal, ObsError};

// App-specific modules
pub mod coordinator;
pub mod event;
pub mod icon;
pub mod overlay;
pub mod tray;
pub mod watcher;

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
