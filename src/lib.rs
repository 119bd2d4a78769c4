//! snaptile - keyboard-driven window snapping for desktop compositors
//!
//! snaptile computes a target rectangle for the focused window from a
//! directional command, cycling through configured size steps on repeated
//! presses, and morphs the window into place with an interruptible snapshot
//! crossfade that hides the compositor's native unmaximize jump.

pub mod animation;
pub mod cli;
pub mod config;
pub mod host;
pub mod logging;
pub mod models;
pub mod services;

pub use models::*;
pub use services::*;

/// Result type alias for snaptile operations
pub type Result<T> = anyhow::Result<T>;

/// Compositor-assigned window identifier
pub type WindowId = u64;

/// Error types specific to snaptile operations
#[derive(thiserror::Error, Debug)]
pub enum SnapTileError {
    #[error("Window not found: {0}")]
    WindowNotFound(WindowId),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(u64),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Compositor error: {0}")]
    CompositorError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
