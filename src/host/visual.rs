use crate::models::Rect;
use crate::{Result, WindowId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;

/// Handle to a snapshot actor living in the compositor's render tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot-{}", self.0)
    }
}

/// Position, scale and opacity of a visual actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorTransform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,
}

impl ActorTransform {
    /// Unscaled, fully opaque actor at the given position
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            scale_x: 1.,
            scale_y: 1.,
            opacity: 1.,
        }
    }

    pub fn is_unscaled(&self) -> bool {
        self.scale_x == 1. && self.scale_y == 1.
    }
}

/// Render-tree capabilities used to mask window resizes.
#[cfg_attr(test, mockall::automock)]
pub trait VisualLayer: Send + Sync {
    /// Capture the window's current pixels into a new, not yet visible actor
    /// covering `rect`
    fn capture_snapshot(&self, window: WindowId, rect: Rect) -> Result<SnapshotId>;

    /// Insert a captured snapshot into the render tree directly above the window
    fn insert_snapshot_above(&self, snapshot: SnapshotId, window: WindowId) -> Result<()>;

    fn set_snapshot_transform(&self, snapshot: SnapshotId, transform: ActorTransform) -> Result<()>;

    /// Remove and free a snapshot. Must be a no-op for unknown or already
    /// destroyed snapshots.
    fn destroy_snapshot(&self, snapshot: SnapshotId);

    fn set_window_visible(&self, window: WindowId, visible: bool) -> Result<()>;

    fn set_window_transform(&self, window: WindowId, transform: ActorTransform) -> Result<()>;

    /// Subscribe to frame ticks, each carrying the frame's presentation time
    fn subscribe_frames(&self) -> broadcast::Receiver<Duration>;
}
