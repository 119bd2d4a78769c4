use super::compositor::Compositor;
use super::visual::{ActorTransform, SnapshotId, VisualLayer};
use crate::models::Rect;
use crate::{Result, SnapTileError, WindowId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::trace;

const FRAME_CHANNEL_CAPACITY: usize = 256;

/// Space a window draws around its frame (shadows, client-side borders)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decorations {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Decorations {
    pub fn uniform(size: i32) -> Self {
        Self {
            left: size,
            top: size,
            right: size,
            bottom: size,
        }
    }
}

/// Window tracked by the in-memory host
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryWindow {
    pub id: WindowId,
    pub frame: Rect,
    pub decorations: Decorations,
    pub maximized: bool,
    /// Frame restored on unmaximize
    pub restore_frame: Rect,
    pub monitor: usize,
    pub visible: bool,
    pub transform: ActorTransform,
}

impl InMemoryWindow {
    pub fn new(id: WindowId, frame: Rect) -> Self {
        let mut window = Self {
            id,
            frame,
            decorations: Decorations::default(),
            maximized: false,
            restore_frame: frame,
            monitor: 0,
            visible: true,
            transform: ActorTransform::at(0., 0.),
        };
        window.reset_transform();
        window
    }

    pub fn with_decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = decorations;
        self.reset_transform();
        self
    }

    pub fn on_monitor(mut self, monitor: usize) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn buffer_rect(&self) -> Rect {
        Rect {
            x: self.frame.x - self.decorations.left,
            y: self.frame.y - self.decorations.top,
            width: self.frame.width + self.decorations.left + self.decorations.right,
            height: self.frame.height + self.decorations.top + self.decorations.bottom,
        }
    }

    fn reset_transform(&mut self) {
        let buffer = self.buffer_rect();
        self.transform = ActorTransform::at(f64::from(buffer.x), f64::from(buffer.y));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InMemoryMonitor {
    pub geometry: Rect,
    pub work_area: Rect,
}

/// Snapshot actor state as observed by tests
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotActor {
    pub window: WindowId,
    pub rect: Rect,
    pub inserted: bool,
    pub destroyed: bool,
    pub transform: ActorTransform,
}

impl SnapshotActor {
    /// Inserted into the render tree and not destroyed yet
    pub fn is_live(&self) -> bool {
        self.inserted && !self.destroyed
    }
}

#[derive(Debug, Default)]
struct HostState {
    windows: HashMap<WindowId, InMemoryWindow>,
    monitors: Vec<InMemoryMonitor>,
    focused: Option<WindowId>,
    animations_enabled: bool,
    animation_flag_history: Vec<bool>,
    notifications: Vec<(String, String)>,
    snapshots: HashMap<SnapshotId, SnapshotActor>,
    next_snapshot: u64,
    move_resize_log: Vec<(WindowId, Rect)>,
}

/// Simple in-memory compositor used for tests and the `simulate` command.
///
/// Frame ticks are pushed explicitly through [`InMemoryCompositor::tick`].
#[derive(Debug)]
pub struct InMemoryCompositor {
    state: RwLock<HostState>,
    frames: broadcast::Sender<Duration>,
}

impl InMemoryCompositor {
    pub fn new_with(monitors: Vec<InMemoryMonitor>, windows: Vec<InMemoryWindow>) -> Self {
        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        let mut state = HostState {
            monitors,
            animations_enabled: true,
            ..HostState::default()
        };

        for window in windows {
            state.focused.get_or_insert(window.id);
            state.windows.insert(window.id, window);
        }

        Self {
            state: RwLock::new(state),
            frames,
        }
    }

    /// Single monitor whose work area equals its geometry
    pub fn single_monitor(geometry: Rect, windows: Vec<InMemoryWindow>) -> Self {
        Self::new_with(
            vec![InMemoryMonitor {
                geometry,
                work_area: geometry,
            }],
            windows,
        )
    }

    fn read(&self) -> RwLockReadGuard<'_, HostState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HostState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a frame tick to every subscriber, returning how many received it
    pub fn tick(&self, at: Duration) -> usize {
        self.frames.send(at).unwrap_or(0)
    }

    pub fn focus(&self, window: Option<WindowId>) {
        self.write().focused = window;
    }

    /// Maximize a window over its monitor's work area
    pub fn maximize(&self, window: WindowId) -> Result<()> {
        let mut state = self.write();
        let work_area = {
            let entry = state
                .windows
                .get(&window)
                .ok_or(SnapTileError::WindowNotFound(window))?;
            state
                .monitors
                .get(entry.monitor)
                .map(|monitor| monitor.work_area)
                .ok_or_else(|| SnapTileError::CompositorError("Window has no monitor".into()))?
        };

        if let Some(entry) = state.windows.get_mut(&window) {
            if !entry.maximized {
                entry.restore_frame = entry.frame;
            }
            entry.maximized = true;
            entry.frame = work_area;
            entry.reset_transform();
        }
        Ok(())
    }

    /// Remove a window as if its client had closed it
    pub fn close_window(&self, window: WindowId) {
        let mut state = self.write();
        state.windows.remove(&window);
        if state.focused == Some(window) {
            state.focused = None;
        }
    }

    pub fn set_decorations(&self, window: WindowId, decorations: Decorations) {
        if let Some(entry) = self.write().windows.get_mut(&window) {
            entry.decorations = decorations;
        }
    }

    pub fn window(&self, window: WindowId) -> Option<InMemoryWindow> {
        self.read().windows.get(&window).cloned()
    }

    pub fn snapshot(&self, snapshot: SnapshotId) -> Option<SnapshotActor> {
        self.read().snapshots.get(&snapshot).cloned()
    }

    /// Every snapshot ever captured, ordered by id
    pub fn snapshots(&self) -> Vec<(SnapshotId, SnapshotActor)> {
        let mut snapshots: Vec<_> = self
            .read()
            .snapshots
            .iter()
            .map(|(id, actor)| (*id, actor.clone()))
            .collect();
        snapshots.sort_by_key(|(id, _)| id.0);
        snapshots
    }

    pub fn live_snapshot_count(&self) -> usize {
        self.read()
            .snapshots
            .values()
            .filter(|actor| actor.is_live())
            .count()
    }

    /// Every value the animations flag was set to, in order
    pub fn animation_flag_history(&self) -> Vec<bool> {
        self.read().animation_flag_history.clone()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.read().notifications.clone()
    }

    pub fn move_resize_log(&self) -> Vec<(WindowId, Rect)> {
        self.read().move_resize_log.clone()
    }

    fn with_window<T>(&self, window: WindowId, f: impl FnOnce(&InMemoryWindow) -> T) -> Result<T> {
        self.read()
            .windows
            .get(&window)
            .map(f)
            .ok_or_else(|| SnapTileError::WindowNotFound(window).into())
    }

    fn with_window_mut<T>(
        &self,
        window: WindowId,
        f: impl FnOnce(&mut InMemoryWindow) -> T,
    ) -> Result<T> {
        self.write()
            .windows
            .get_mut(&window)
            .map(f)
            .ok_or_else(|| SnapTileError::WindowNotFound(window).into())
    }

    fn monitor_of(&self, window: WindowId) -> Result<InMemoryMonitor> {
        let state = self.read();
        let entry = state
            .windows
            .get(&window)
            .ok_or(SnapTileError::WindowNotFound(window))?;
        state
            .monitors
            .get(entry.monitor)
            .copied()
            .ok_or_else(|| {
                SnapTileError::CompositorError(format!("Monitor {} does not exist", entry.monitor))
                    .into()
            })
    }
}

impl Compositor for InMemoryCompositor {
    fn focused_window(&self) -> Option<WindowId> {
        let state = self.read();
        state
            .focused
            .filter(|window| state.windows.contains_key(window))
    }

    fn frame_rect(&self, window: WindowId) -> Result<Rect> {
        self.with_window(window, |entry| entry.frame)
    }

    fn buffer_rect(&self, window: WindowId) -> Result<Rect> {
        self.with_window(window, InMemoryWindow::buffer_rect)
    }

    fn is_maximized(&self, window: WindowId) -> Result<bool> {
        self.with_window(window, |entry| entry.maximized)
    }

    fn monitor_geometry(&self, window: WindowId) -> Result<Rect> {
        Ok(self.monitor_of(window)?.geometry)
    }

    fn work_area(&self, window: WindowId) -> Result<Rect> {
        Ok(self.monitor_of(window)?.work_area)
    }

    fn unmaximize(&self, window: WindowId) -> Result<()> {
        self.with_window_mut(window, |entry| {
            if entry.maximized {
                entry.maximized = false;
                entry.frame = entry.restore_frame;
                entry.reset_transform();
            }
        })
    }

    fn move_resize_frame(&self, window: WindowId, rect: Rect) -> Result<()> {
        self.with_window_mut(window, |entry| {
            entry.frame = rect;
            if !entry.maximized {
                entry.restore_frame = rect;
            }
            // The actor follows the window, its scale is left alone
            let buffer = entry.buffer_rect();
            entry.transform.x = f64::from(buffer.x);
            entry.transform.y = f64::from(buffer.y);
        })?;
        self.write().move_resize_log.push((window, rect));
        trace!(window, %rect, "Moved window frame");
        Ok(())
    }

    fn animations_enabled(&self) -> bool {
        self.read().animations_enabled
    }

    fn set_animations_enabled(&self, enabled: bool) {
        let mut state = self.write();
        state.animations_enabled = enabled;
        state.animation_flag_history.push(enabled);
    }

    fn notify(&self, title: &str, body: &str) {
        self.write()
            .notifications
            .push((title.to_string(), body.to_string()));
    }
}

impl VisualLayer for InMemoryCompositor {
    fn capture_snapshot(&self, window: WindowId, rect: Rect) -> Result<SnapshotId> {
        let mut state = self.write();
        if !state.windows.contains_key(&window) {
            return Err(SnapTileError::WindowNotFound(window).into());
        }

        state.next_snapshot += 1;
        let id = SnapshotId(state.next_snapshot);
        state.snapshots.insert(
            id,
            SnapshotActor {
                window,
                rect,
                inserted: false,
                destroyed: false,
                transform: ActorTransform::at(f64::from(rect.x), f64::from(rect.y)),
            },
        );
        Ok(id)
    }

    fn insert_snapshot_above(&self, snapshot: SnapshotId, window: WindowId) -> Result<()> {
        let mut state = self.write();
        if !state.windows.contains_key(&window) {
            return Err(SnapTileError::WindowNotFound(window).into());
        }

        match state.snapshots.get_mut(&snapshot) {
            Some(actor) if !actor.destroyed => {
                actor.inserted = true;
                Ok(())
            }
            _ => Err(SnapTileError::SnapshotNotFound(snapshot.0).into()),
        }
    }

    fn set_snapshot_transform(
        &self,
        snapshot: SnapshotId,
        transform: ActorTransform,
    ) -> Result<()> {
        match self.write().snapshots.get_mut(&snapshot) {
            Some(actor) if !actor.destroyed => {
                actor.transform = transform;
                Ok(())
            }
            _ => Err(SnapTileError::SnapshotNotFound(snapshot.0).into()),
        }
    }

    fn destroy_snapshot(&self, snapshot: SnapshotId) {
        if let Some(actor) = self.write().snapshots.get_mut(&snapshot) {
            actor.destroyed = true;
        }
    }

    fn set_window_visible(&self, window: WindowId, visible: bool) -> Result<()> {
        self.with_window_mut(window, |entry| entry.visible = visible)
    }

    fn set_window_transform(&self, window: WindowId, transform: ActorTransform) -> Result<()> {
        self.with_window_mut(window, |entry| entry.transform = transform)
    }

    fn subscribe_frames(&self) -> broadcast::Receiver<Duration> {
        self.frames.subscribe()
    }
}
