//! Contract tests for WindowTransitionAnimator
//!
//! These tests drive the animator against the in-memory host and check the
//! observable guarantees: windows end visible and unscaled at their target,
//! snapshots never outlive their transition, and transitions on different
//! windows do not interfere with each other.

use snaptile::{
    host::{
        ActorTransform, Compositor, Decorations, InMemoryCompositor, InMemoryMonitor,
        InMemoryWindow, SnapshotId, VisualLayer,
    },
    models::Rect,
    Transition, TransitionOutcome, TransitionPhase, TransitionTiming, WindowTransitionAnimator,
    WindowId,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const LEFT_HALF: Rect = Rect::new(0, 0, 960, 1080);
const RIGHT_HALF: Rect = Rect::new(960, 0, 960, 1080);

fn two_window_host() -> Arc<InMemoryCompositor> {
    Arc::new(InMemoryCompositor::single_monitor(
        Rect::new(0, 0, 1920, 1080),
        vec![
            InMemoryWindow::new(1, Rect::new(100, 100, 800, 600))
                .with_decorations(Decorations::uniform(12)),
            InMemoryWindow::new(2, Rect::new(300, 200, 640, 480)),
        ],
    ))
}

fn animator_for(host: &Arc<InMemoryCompositor>) -> WindowTransitionAnimator {
    WindowTransitionAnimator::new(host.clone(), host.clone(), TransitionTiming::default())
}

/// Push `count` frames 16ms apart, starting after `from`
fn run_frames(host: &InMemoryCompositor, from: u64, count: u64) {
    for frame in from + 1..=from + count {
        host.tick(Duration::from_millis(16 * frame));
    }
}

fn assert_settled(host: &InMemoryCompositor, window: u64, target: Rect) {
    let state = host.window(window).expect("window exists");
    let buffer = state.buffer_rect();

    assert_eq!(state.frame, target);
    assert!(state.visible, "window {} left hidden", window);
    assert!(state.transform.is_unscaled(), "window {} left scaled", window);
    assert_eq!(state.transform.opacity, 1.);
    assert_eq!(
        (state.transform.x, state.transform.y),
        (f64::from(buffer.x), f64::from(buffer.y))
    );
}

#[tokio::test]
async fn test_transitions_on_different_windows_run_independently() {
    let host = two_window_host();
    let animator = animator_for(&host);

    let first = animator.set_window_rect(1, LEFT_HALF, true).await.unwrap();
    let second = animator.set_window_rect(2, RIGHT_HALF, true).await.unwrap();

    assert_eq!(animator.in_flight().await, 2);
    assert_eq!(host.live_snapshot_count(), 2);
    assert!(!host.window(1).unwrap().visible);
    assert!(!host.window(2).unwrap().visible);

    run_frames(&host, 0, 40);

    assert_eq!(first.finished().await.unwrap(), TransitionOutcome::Completed);
    assert_eq!(second.finished().await.unwrap(), TransitionOutcome::Completed);
    assert_settled(&host, 1, LEFT_HALF);
    assert_settled(&host, 2, RIGHT_HALF);
    assert_eq!(host.live_snapshot_count(), 0);
}

#[tokio::test]
async fn test_superseding_one_window_leaves_the_other_running() {
    let host = two_window_host();
    let animator = animator_for(&host);

    let first = animator.set_window_rect(1, LEFT_HALF, true).await.unwrap();
    let other = animator.set_window_rect(2, RIGHT_HALF, true).await.unwrap();
    run_frames(&host, 0, 3);

    let replacement = animator
        .set_window_rect(1, Rect::new(0, 0, 1920, 540), true)
        .await
        .unwrap();
    // Exactly one snapshot per animating window
    assert_eq!(host.live_snapshot_count(), 2);
    assert_eq!(animator.phase(2).await, Some(TransitionPhase::WaitingForRedraw));

    run_frames(&host, 3, 40);

    assert_eq!(first.finished().await.unwrap(), TransitionOutcome::Superseded);
    assert_eq!(replacement.finished().await.unwrap(), TransitionOutcome::Completed);
    assert_eq!(other.finished().await.unwrap(), TransitionOutcome::Completed);
    assert_settled(&host, 1, Rect::new(0, 0, 1920, 540));
    assert_settled(&host, 2, RIGHT_HALF);
    assert!(host.snapshots().iter().all(|(_, actor)| actor.destroyed));
}

#[tokio::test]
async fn test_rapid_retargeting_settles_on_last_target() {
    let host = two_window_host();
    let animator = animator_for(&host);
    let targets = [
        LEFT_HALF,
        Rect::new(0, 0, 640, 1080),
        Rect::new(0, 0, 1280, 1080),
        RIGHT_HALF,
    ];

    let mut handles = Vec::new();
    for (index, target) in targets.iter().enumerate() {
        handles.push(animator.set_window_rect(1, *target, true).await.unwrap());
        run_frames(&host, index as u64 * 2, 2);
    }
    run_frames(&host, 8, 40);

    let last = handles.pop().unwrap();
    for handle in handles {
        assert_eq!(handle.finished().await.unwrap(), TransitionOutcome::Superseded);
    }
    assert_eq!(last.finished().await.unwrap(), TransitionOutcome::Completed);
    assert_settled(&host, 1, RIGHT_HALF);

    let metrics = animator.metrics().await;
    assert_eq!(metrics.started, 4);
    assert_eq!(metrics.superseded, 3);
    assert_eq!(metrics.completed, 1);
}

#[tokio::test]
async fn test_shutdown_restores_every_window() {
    let host = two_window_host();
    let animator = animator_for(&host);

    let first = animator.set_window_rect(1, LEFT_HALF, true).await.unwrap();
    let second = animator.set_window_rect(2, RIGHT_HALF, true).await.unwrap();
    run_frames(&host, 0, 8);

    animator.shutdown().await;
    assert_eq!(animator.in_flight().await, 0);
    assert_eq!(host.live_snapshot_count(), 0);

    run_frames(&host, 8, 2);
    assert_eq!(first.finished().await.unwrap(), TransitionOutcome::Superseded);
    assert_eq!(second.finished().await.unwrap(), TransitionOutcome::Superseded);
    assert_settled(&host, 1, LEFT_HALF);
    assert_settled(&host, 2, RIGHT_HALF);
}

#[tokio::test]
async fn test_lagging_frame_clock_still_completes() {
    let host = two_window_host();
    let animator = animator_for(&host);

    let transition = animator.set_window_rect(1, LEFT_HALF, true).await.unwrap();
    // More frames than the channel buffers before the task first runs
    run_frames(&host, 0, 300);

    assert_eq!(transition.finished().await.unwrap(), TransitionOutcome::Completed);
    assert_settled(&host, 1, LEFT_HALF);
}

#[tokio::test]
async fn test_decoration_change_during_redraw_is_followed() {
    let host = two_window_host();
    let animator = animator_for(&host);

    let transition = animator.set_window_rect(1, LEFT_HALF, true).await.unwrap();
    // The client drops its shadows once it is tiled
    host.set_decorations(1, Decorations::default());
    run_frames(&host, 0, 40);

    assert_eq!(transition.finished().await.unwrap(), TransitionOutcome::Completed);
    let window = host.window(1).unwrap();
    assert_eq!((window.transform.x, window.transform.y), (0., 0.));
}

#[tokio::test]
async fn test_immediate_moves_never_touch_the_render_tree() {
    let host = two_window_host();
    let animator = animator_for(&host);

    for target in [LEFT_HALF, RIGHT_HALF, LEFT_HALF] {
        let transition = animator.set_window_rect(2, target, false).await.unwrap();
        assert!(matches!(transition, Transition::Immediate));
    }

    assert!(host.snapshots().is_empty());
    assert!(host.animation_flag_history().is_empty());
    assert_eq!(host.move_resize_log().len(), 3);
    assert_settled(&host, 2, LEFT_HALF);
}

#[tokio::test]
async fn test_window_on_second_monitor_uses_its_own_geometry() {
    let host = Arc::new(InMemoryCompositor::new_with(
        vec![
            InMemoryMonitor {
                geometry: Rect::new(0, 0, 1920, 1080),
                work_area: Rect::new(0, 0, 1920, 1080),
            },
            InMemoryMonitor {
                geometry: Rect::new(1920, 0, 2560, 1440),
                work_area: Rect::new(1920, 32, 2560, 1408),
            },
        ],
        vec![InMemoryWindow::new(5, Rect::new(2000, 100, 800, 600)).on_monitor(1)],
    ));
    let animator = animator_for(&host);

    host.maximize(5).unwrap();
    assert_eq!(host.frame_rect(5).unwrap(), Rect::new(1920, 32, 2560, 1408));

    let target = Rect::new(1920, 32, 1280, 1408);
    let transition = animator.set_window_rect(5, target, true).await.unwrap();
    assert_eq!(host.snapshots()[0].1.rect, Rect::new(1920, 32, 2560, 1408));

    run_frames(&host, 0, 40);
    assert_eq!(transition.finished().await.unwrap(), TransitionOutcome::Completed);
    assert!(!host.is_maximized(5).unwrap());
    assert_settled(&host, 5, target);
}

#[tokio::test]
async fn test_missing_window_is_an_error() {
    let host = two_window_host();
    let animator = animator_for(&host);

    assert!(animator.set_window_rect(42, LEFT_HALF, true).await.is_err());
    assert!(animator.set_window_rect(42, LEFT_HALF, false).await.is_err());
    assert_eq!(animator.in_flight().await, 0);
    assert!(host.snapshots().is_empty());
}

/// Render tree that stalls the first reveal of a window, as a busy compositor
/// thread would
struct StallingReveal {
    host: Arc<InMemoryCompositor>,
    stall: Duration,
    stalled: AtomicBool,
}

impl StallingReveal {
    fn has_stalled(&self) -> bool {
        self.stalled.load(Ordering::SeqCst)
    }
}

impl VisualLayer for StallingReveal {
    fn capture_snapshot(&self, window: WindowId, rect: Rect) -> snaptile::Result<SnapshotId> {
        self.host.capture_snapshot(window, rect)
    }

    fn insert_snapshot_above(
        &self,
        snapshot: SnapshotId,
        window: WindowId,
    ) -> snaptile::Result<()> {
        self.host.insert_snapshot_above(snapshot, window)
    }

    fn set_snapshot_transform(
        &self,
        snapshot: SnapshotId,
        transform: ActorTransform,
    ) -> snaptile::Result<()> {
        self.host.set_snapshot_transform(snapshot, transform)
    }

    fn destroy_snapshot(&self, snapshot: SnapshotId) {
        self.host.destroy_snapshot(snapshot)
    }

    fn set_window_visible(&self, window: WindowId, visible: bool) -> snaptile::Result<()> {
        if visible && !self.stalled.swap(true, Ordering::SeqCst) {
            std::thread::sleep(self.stall);
        }
        self.host.set_window_visible(window, visible)
    }

    fn set_window_transform(
        &self,
        window: WindowId,
        transform: ActorTransform,
    ) -> snaptile::Result<()> {
        self.host.set_window_transform(window, transform)
    }

    fn subscribe_frames(&self) -> broadcast::Receiver<Duration> {
        self.host.subscribe_frames()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_superseded_reveal_leaves_new_transition_untouched() {
    let host = two_window_host();
    let visual = Arc::new(StallingReveal {
        host: host.clone(),
        stall: Duration::from_millis(300),
        stalled: AtomicBool::new(false),
    });
    let animator =
        WindowTransitionAnimator::new(host.clone(), visual.clone(), TransitionTiming::default());

    let first = animator.set_window_rect(1, LEFT_HALF, true).await.unwrap();
    run_frames(&host, 0, 6);

    // Wait until the first transition is revealing the window on a worker
    for _ in 0..200 {
        if visual.has_stalled() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(visual.has_stalled(), "first transition never reached its reveal");

    let second = animator.set_window_rect(1, RIGHT_HALF, true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(animator.phase(1).await, Some(TransitionPhase::WaitingForRedraw));
    let window = host.window(1).unwrap();
    assert!(!window.visible, "window shown during the redraw wait");
    assert!(window.transform.is_unscaled(), "stale frame applied to the window");

    assert_eq!(first.finished().await.unwrap(), TransitionOutcome::Superseded);
    let window = host.window(1).unwrap();
    assert!(!window.visible);
    assert!(window.transform.is_unscaled());

    run_frames(&host, 6, 40);
    assert_eq!(second.finished().await.unwrap(), TransitionOutcome::Completed);
    assert_settled(&host, 1, RIGHT_HALF);
    assert_eq!(host.live_snapshot_count(), 0);
}
