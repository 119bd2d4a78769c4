use crate::models::Rect;
use crate::{Result, WindowId};

/// Window, monitor and settings capabilities consumed from the host compositor.
///
/// Implementations are queried on the event loop for every command, so the
/// returned geometry always reflects the live state of the desktop.
#[cfg_attr(test, mockall::automock)]
pub trait Compositor: Send + Sync {
    /// Currently focused window, if any
    fn focused_window(&self) -> Option<WindowId>;

    /// Window geometry excluding client-side decorations and shadows
    fn frame_rect(&self, window: WindowId) -> Result<Rect>;

    /// Geometry of everything the window draws, including decorations
    fn buffer_rect(&self, window: WindowId) -> Result<Rect>;

    fn is_maximized(&self, window: WindowId) -> Result<bool>;

    /// Geometry of the monitor the window lives on
    fn monitor_geometry(&self, window: WindowId) -> Result<Rect>;

    /// Work area of the window's workspace on its monitor, excluding panels
    fn work_area(&self, window: WindowId) -> Result<Rect>;

    fn unmaximize(&self, window: WindowId) -> Result<()>;

    /// Move and resize the window frame
    fn move_resize_frame(&self, window: WindowId, rect: Rect) -> Result<()>;

    /// Global desktop setting controlling the compositor's own animations
    fn animations_enabled(&self) -> bool;

    fn set_animations_enabled(&self, enabled: bool);

    /// Post an informational desktop notification
    fn notify(&self, title: &str, body: &str);
}
