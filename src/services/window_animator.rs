//! Seamless move/resize of a single window.
//!
//! A snapshot of the window's old pixels is laid over the real window while
//! the client redraws at its new size. Once the client has had a few frames to
//! catch up, the snapshot morphs toward the target and fades out while the real
//! window grows from the old geometry into the new one.

use crate::animation::{lerp, Animation, Curve};
use crate::host::{ActorTransform, Compositor, SnapshotId, VisualLayer};
use crate::models::Rect;
use crate::{Result, WindowId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Frame count and duration of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTiming {
    /// Frames the client gets to redraw before the real window is revealed.
    /// The window shows on the frame after the last one waited for.
    pub redraw_frames: u64,
    pub duration: Duration,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            redraw_frames: 5,
            duration: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    CapturingSnapshot,
    WaitingForRedraw,
    Interpolating,
    Completed,
    Cancelled,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionPhase::CapturingSnapshot => "capturing-snapshot",
            TransitionPhase::WaitingForRedraw => "waiting-for-redraw",
            TransitionPhase::Interpolating => "interpolating",
            TransitionPhase::Completed => "completed",
            TransitionPhase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// How a transition task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The window reached its target and was snapped to identity
    Completed,
    /// A newer transition for the same window took over
    Superseded,
    /// The window disappeared or stopped accepting updates
    WindowClosed,
    /// The frame clock went away before the transition finished
    FrameClockStopped,
}

/// Result of [`WindowTransitionAnimator::set_window_rect`]
#[derive(Debug)]
pub enum Transition {
    /// The window was moved without animation
    Immediate,
    Animating(JoinHandle<TransitionOutcome>),
}

impl Transition {
    pub fn is_animating(&self) -> bool {
        matches!(self, Transition::Animating(_))
    }

    /// Wait for the transition to end
    pub async fn finished(self) -> Result<TransitionOutcome> {
        match self {
            Transition::Immediate => Ok(TransitionOutcome::Completed),
            Transition::Animating(handle) => Ok(handle.await?),
        }
    }
}

/// Counters for transitions handled by the animator
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransitionMetrics {
    pub immediate: u64,
    pub started: u64,
    pub completed: u64,
    pub superseded: u64,
    pub aborted: u64,
}

#[derive(Debug, Clone, Copy)]
struct TransitionRecord {
    id: u64,
    snapshot: SnapshotId,
    phase: TransitionPhase,
}

type TransitionTable = Arc<Mutex<HashMap<WindowId, TransitionRecord>>>;

/// Turns the compositor's animation setting off until dropped, then restores it
pub struct SuppressedAnimations<'a> {
    compositor: &'a dyn Compositor,
    restore: bool,
}

impl<'a> SuppressedAnimations<'a> {
    pub fn new(compositor: &'a dyn Compositor) -> Self {
        let restore = compositor.animations_enabled();
        if restore {
            compositor.set_animations_enabled(false);
        }
        Self {
            compositor,
            restore,
        }
    }
}

impl Drop for SuppressedAnimations<'_> {
    fn drop(&mut self) {
        if self.restore {
            self.compositor.set_animations_enabled(true);
        }
    }
}

/// Moves windows to new rectangles, optionally hiding the resize behind a
/// snapshot crossfade. At most one transition runs per window; starting a new
/// one tears the previous one down.
pub struct WindowTransitionAnimator {
    compositor: Arc<dyn Compositor>,
    visual: Arc<dyn VisualLayer>,
    timing: TransitionTiming,
    transitions: TransitionTable,
    metrics: Arc<RwLock<TransitionMetrics>>,
    next_id: AtomicU64,
}

impl WindowTransitionAnimator {
    pub fn new(
        compositor: Arc<dyn Compositor>,
        visual: Arc<dyn VisualLayer>,
        timing: TransitionTiming,
    ) -> Self {
        Self {
            compositor,
            visual,
            timing,
            transitions: Arc::new(Mutex::new(HashMap::new())),
            metrics: Arc::new(RwLock::new(TransitionMetrics::default())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of windows with a transition in progress
    pub async fn in_flight(&self) -> usize {
        self.transitions.lock().await.len()
    }

    pub async fn phase(&self, window: WindowId) -> Option<TransitionPhase> {
        self.transitions
            .lock()
            .await
            .get(&window)
            .map(|record| record.phase)
    }

    pub async fn metrics(&self) -> TransitionMetrics {
        self.metrics.read().await.clone()
    }

    /// Move `window` so its frame covers `target`.
    ///
    /// Without animation the window is moved in one step. With animation the
    /// move happens immediately as well, and the returned task masks it until
    /// the window has settled.
    pub async fn set_window_rect(
        &self,
        window: WindowId,
        target: Rect,
        animate: bool,
    ) -> Result<Transition> {
        let frame_before = self.compositor.frame_rect(window)?;
        let buffer_before = self.compositor.buffer_rect(window)?;
        let maximized = self.compositor.is_maximized(window)?;

        // The maximized pixels must be captured before the window shrinks
        let mut snapshot = None;
        if maximized {
            if animate {
                snapshot = Some(self.visual.capture_snapshot(window, buffer_before)?);
            }
            if let Err(err) = self.unmaximize_without_animation(window, frame_before) {
                if let Some(snapshot) = snapshot {
                    self.visual.destroy_snapshot(snapshot);
                }
                return Err(err);
            }
        }

        let mut transitions = self.transitions.lock().await;
        if let Some(previous) = transitions.remove(&window) {
            debug!(window, phase = %previous.phase, "Superseding in-flight transition");
            self.tear_down(window, previous);
        }

        if !animate {
            drop(transitions);
            self.compositor.move_resize_frame(window, target)?;
            self.metrics.write().await.immediate += 1;
            debug!(window, %target, "Moved window without animation");
            return Ok(Transition::Immediate);
        }

        let snapshot = match snapshot {
            Some(snapshot) => snapshot,
            None => {
                trace!(window, phase = %TransitionPhase::CapturingSnapshot, "Capturing window");
                self.visual.capture_snapshot(window, buffer_before)?
            }
        };

        if let Err(err) = self.cover_with_snapshot(window, target, snapshot) {
            self.visual.destroy_snapshot(snapshot);
            // Best effort, the window may already be gone
            if let Err(show_err) = self.visual.set_window_visible(window, true) {
                trace!(window, error = %show_err, "Window not shown after failed cover");
            }
            return Err(err);
        }

        // Subscribe before spawning so no frame is missed
        let frames = self.visual.subscribe_frames();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        transitions.insert(
            window,
            TransitionRecord {
                id,
                snapshot,
                phase: TransitionPhase::WaitingForRedraw,
            },
        );
        drop(transitions);

        self.metrics.write().await.started += 1;
        debug!(
            window,
            id,
            %snapshot,
            from = %frame_before,
            to = %target,
            "Started window transition"
        );

        let task = TransitionTask {
            id,
            window,
            snapshot,
            geometry: TransitionGeometry::new(frame_before, buffer_before, target),
            timing: self.timing,
            compositor: Arc::clone(&self.compositor),
            visual: Arc::clone(&self.visual),
            transitions: Arc::clone(&self.transitions),
            metrics: Arc::clone(&self.metrics),
        };

        Ok(Transition::Animating(tokio::spawn(task.run(frames))))
    }

    /// Tear down every transition in progress, leaving windows visible and
    /// unscaled at their current position
    pub async fn shutdown(&self) {
        let mut transitions = self.transitions.lock().await;
        let count = transitions.len();
        for (window, record) in transitions.drain() {
            self.tear_down(window, record);
        }
        if count > 0 {
            debug!(count, "Tore down in-flight transitions");
        }
    }

    fn unmaximize_without_animation(&self, window: WindowId, frame: Rect) -> Result<()> {
        let _suppressed = SuppressedAnimations::new(self.compositor.as_ref());
        self.compositor.unmaximize(window)?;
        // Keep the frame where it was so nothing jumps under the snapshot
        self.compositor.move_resize_frame(window, frame)
    }

    fn cover_with_snapshot(
        &self,
        window: WindowId,
        target: Rect,
        snapshot: SnapshotId,
    ) -> Result<()> {
        self.compositor.move_resize_frame(window, target)?;
        self.visual.insert_snapshot_above(snapshot, window)?;
        self.visual.set_window_visible(window, false)
    }

    fn tear_down(&self, window: WindowId, record: TransitionRecord) {
        release(self.compositor.as_ref(), self.visual.as_ref(), window, record.snapshot);
    }
}

/// Destroy the snapshot and show the window unscaled at its buffer origin
fn release(
    compositor: &dyn Compositor,
    visual: &dyn VisualLayer,
    window: WindowId,
    snapshot: SnapshotId,
) {
    visual.destroy_snapshot(snapshot);

    let restored = compositor.buffer_rect(window).and_then(|buffer| {
        visual.set_window_visible(window, true)?;
        visual.set_window_transform(
            window,
            ActorTransform::at(f64::from(buffer.x), f64::from(buffer.y)),
        )
    });
    if let Err(err) = restored {
        trace!(window, error = %err, "Window not restored after teardown");
    }
}

/// Geometry captured when a transition starts
#[derive(Debug, Clone, Copy)]
struct TransitionGeometry {
    frame_before: Rect,
    buffer_before: Rect,
    target: Rect,
    /// Scale taking the old window size to the target size
    grow_x: f64,
    grow_y: f64,
    /// Scale making the target-sized window look like the old one
    shrink_x: f64,
    shrink_y: f64,
}

impl TransitionGeometry {
    fn new(frame_before: Rect, buffer_before: Rect, target: Rect) -> Self {
        Self {
            frame_before,
            buffer_before,
            target,
            grow_x: ratio(target.width, frame_before.width),
            grow_y: ratio(target.height, frame_before.height),
            shrink_x: ratio(frame_before.width, target.width),
            shrink_y: ratio(frame_before.height, target.height),
        }
    }

    fn decoration_before(&self) -> (f64, f64) {
        decoration_offset(self.frame_before, self.buffer_before)
    }
}

fn ratio(numerator: i32, denominator: i32) -> f64 {
    if denominator == 0 {
        1.
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

/// Distance from the buffer origin to the frame origin
fn decoration_offset(frame: Rect, buffer: Rect) -> (f64, f64) {
    (f64::from(frame.x - buffer.x), f64::from(frame.y - buffer.y))
}

/// Eased tracks for the snapshot and the real window
struct Tracks {
    opacity: Animation,
    snapshot_x: Animation,
    snapshot_y: Animation,
    snapshot_scale_x: Animation,
    snapshot_scale_y: Animation,
    window: Animation,
}

impl Tracks {
    fn new(geometry: &TransitionGeometry, start: Duration, duration: Duration) -> Self {
        let (deco_left, deco_top) = geometry.decoration_before();
        let buffer = geometry.buffer_before;
        let target = geometry.target;
        let expo =
            |from: f64, to: f64| Animation::ease(from, to, start, duration, Curve::EaseOutExpo);

        Self {
            opacity: Animation::ease(1., 0., start, duration, Curve::EaseOutQuart),
            snapshot_x: expo(
                f64::from(buffer.x),
                f64::from(target.x) - deco_left * geometry.grow_x,
            ),
            snapshot_y: expo(
                f64::from(buffer.y),
                f64::from(target.y) - deco_top * geometry.grow_y,
            ),
            snapshot_scale_x: expo(1., geometry.grow_x),
            snapshot_scale_y: expo(1., geometry.grow_y),
            window: expo(0., 1.),
        }
    }

    fn snapshot_at(&self, at: Duration) -> ActorTransform {
        ActorTransform {
            x: self.snapshot_x.value_at(at),
            y: self.snapshot_y.value_at(at),
            scale_x: self.snapshot_scale_x.value_at(at),
            scale_y: self.snapshot_scale_y.value_at(at),
            opacity: self.opacity.value_at(at),
        }
    }
}

/// Per-transition work run on its own task
struct TransitionTask {
    id: u64,
    window: WindowId,
    snapshot: SnapshotId,
    geometry: TransitionGeometry,
    timing: TransitionTiming,
    compositor: Arc<dyn Compositor>,
    visual: Arc<dyn VisualLayer>,
    transitions: TransitionTable,
    metrics: Arc<RwLock<TransitionMetrics>>,
}

impl TransitionTask {
    async fn run(self, mut frames: broadcast::Receiver<Duration>) -> TransitionOutcome {
        let outcome = self.drive(&mut frames).await;

        let mut metrics = self.metrics.write().await;
        match outcome {
            TransitionOutcome::Completed => metrics.completed += 1,
            TransitionOutcome::Superseded => metrics.superseded += 1,
            TransitionOutcome::WindowClosed | TransitionOutcome::FrameClockStopped => {
                metrics.aborted += 1
            }
        }
        debug!(window = self.window, id = self.id, ?outcome, "Window transition ended");
        outcome
    }

    async fn drive(&self, frames: &mut broadcast::Receiver<Duration>) -> TransitionOutcome {
        let mut seen = 0;

        let reveal_at = loop {
            let Some(at) = next_frame(frames, &mut seen).await else {
                return self.abandon(TransitionOutcome::FrameClockStopped).await;
            };
            if !self.is_current().await {
                self.visual.destroy_snapshot(self.snapshot);
                return TransitionOutcome::Superseded;
            }
            if seen > self.timing.redraw_frames {
                break at;
            }
        };

        let (tracks, frame_after) = match self.reveal(reveal_at).await {
            Ok(Some(revealed)) => revealed,
            Ok(None) => return TransitionOutcome::Superseded,
            Err(err) => return self.fail(err).await,
        };

        let mut at = reveal_at;
        loop {
            if tracks.window.is_done(at) {
                return match self.complete().await {
                    Ok(outcome) => outcome,
                    Err(err) => self.fail(err).await,
                };
            }

            match self.interpolate(&tracks, frame_after, at).await {
                Ok(true) => {}
                Ok(false) => return TransitionOutcome::Superseded,
                Err(err) => return self.fail(err).await,
            }

            at = match next_frame(frames, &mut seen).await {
                Some(at) => at,
                None => return self.abandon(TransitionOutcome::FrameClockStopped).await,
            };
        }
    }

    async fn is_current(&self) -> bool {
        self.owns(&*self.transitions.lock().await)
    }

    fn owns(&self, transitions: &HashMap<WindowId, TransitionRecord>) -> bool {
        transitions
            .get(&self.window)
            .is_some_and(|record| record.id == self.id)
    }

    /// Show the real window scaled down to the old geometry. Returns `None`
    /// when superseded.
    ///
    /// Like every step after the identity check, this runs with the
    /// transition table locked.
    async fn reveal(&self, at: Duration) -> Result<Option<(Tracks, Rect)>> {
        let mut transitions = self.transitions.lock().await;
        match transitions.get_mut(&self.window) {
            Some(record) if record.id == self.id => {
                record.phase = TransitionPhase::Interpolating;
            }
            _ => {
                self.visual.destroy_snapshot(self.snapshot);
                return Ok(None);
            }
        }

        self.visual.set_window_visible(self.window, true)?;
        let frame_after = self.compositor.frame_rect(self.window)?;
        trace!(window = self.window, phase = %TransitionPhase::Interpolating, "Revealed window");

        let tracks = Tracks::new(&self.geometry, at, self.timing.duration);
        Ok(Some((tracks, frame_after)))
    }

    /// Apply one frame. Returns `false` when superseded.
    async fn interpolate(&self, tracks: &Tracks, frame_after: Rect, at: Duration) -> Result<bool> {
        let transitions = self.transitions.lock().await;
        if !self.owns(&transitions) {
            self.visual.destroy_snapshot(self.snapshot);
            return Ok(false);
        }

        let geometry = &self.geometry;
        let progress = tracks.window.value_at(at);

        // Decorations can change size while the client redraws
        let buffer = self.compositor.buffer_rect(self.window)?;
        let (deco_left, deco_top) = decoration_offset(frame_after, buffer);

        let window = ActorTransform {
            x: lerp(
                f64::from(geometry.frame_before.x) - deco_left * geometry.shrink_x,
                f64::from(geometry.target.x) - deco_left,
                progress,
            ),
            y: lerp(
                f64::from(geometry.frame_before.y) - deco_top * geometry.shrink_y,
                f64::from(geometry.target.y) - deco_top,
                progress,
            ),
            scale_x: lerp(geometry.shrink_x, 1., progress),
            scale_y: lerp(geometry.shrink_y, 1., progress),
            opacity: 1.,
        };

        self.visual.set_window_transform(self.window, window)?;
        self.visual
            .set_snapshot_transform(self.snapshot, tracks.snapshot_at(at))?;
        Ok(true)
    }

    /// Snap the window to identity and release the record, unless superseded
    async fn complete(&self) -> Result<TransitionOutcome> {
        let mut transitions = self.transitions.lock().await;
        if !self.owns(&transitions) {
            self.visual.destroy_snapshot(self.snapshot);
            return Ok(TransitionOutcome::Superseded);
        }
        transitions.remove(&self.window);

        self.visual.destroy_snapshot(self.snapshot);
        let buffer = self.compositor.buffer_rect(self.window)?;
        self.visual.set_window_transform(
            self.window,
            ActorTransform::at(f64::from(buffer.x), f64::from(buffer.y)),
        )?;
        trace!(window = self.window, phase = %TransitionPhase::Completed, "Window settled");
        Ok(TransitionOutcome::Completed)
    }

    async fn fail(&self, err: anyhow::Error) -> TransitionOutcome {
        warn!(window = self.window, error = %err, "Window transition aborted");
        self.abandon(TransitionOutcome::WindowClosed).await
    }

    /// Release everything this task owns and drop its record if still current
    async fn abandon(&self, outcome: TransitionOutcome) -> TransitionOutcome {
        let mut transitions = self.transitions.lock().await;
        if self.owns(&transitions) {
            transitions.remove(&self.window);
            release(
                self.compositor.as_ref(),
                self.visual.as_ref(),
                self.window,
                self.snapshot,
            );
        } else {
            self.visual.destroy_snapshot(self.snapshot);
        }
        trace!(
            window = self.window,
            phase = %TransitionPhase::Cancelled,
            ?outcome,
            "Transition abandoned"
        );
        outcome
    }
}

/// Next frame time, counting frames skipped by a lagging receiver
async fn next_frame(
    frames: &mut broadcast::Receiver<Duration>,
    seen: &mut u64,
) -> Option<Duration> {
    loop {
        match frames.recv().await {
            Ok(at) => {
                *seen += 1;
                return Some(at);
            }
            Err(RecvError::Lagged(missed)) => *seen += missed,
            Err(RecvError::Closed) => return None,
        }
    }
}
