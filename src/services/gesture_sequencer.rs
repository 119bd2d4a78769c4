use crate::config::TilingConfig;
use crate::models::{Direction, Rect, WorkArea};
use crate::services::rect_planner::compute_rect;
use crate::WindowId;
use tokio::time::Instant;
use tracing::debug;

/// Record of the most recent tiling command
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub window_id: WindowId,
    pub direction: Direction,
    pub rect: Rect,
    pub timestamp: Instant,
    /// Index of the step the next successive press starts from
    pub step_index: usize,
}

/// Decides whether a command continues the previous press cycle and picks
/// the rectangle for it
#[derive(Debug, Default)]
pub struct GestureSequencer {
    previous: Option<GestureState>,
}

impl GestureSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&GestureState> {
        self.previous.as_ref()
    }

    /// Forget the current cycle, the next command starts from the first step
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Pick the target rectangle for `direction` and remember the press.
    ///
    /// Repeated presses for the same window and direction within the
    /// configured timeout walk through the step sequence. Steps that would
    /// leave the window where the previous press put it are skipped, trying
    /// each step at most once.
    pub fn next_rect(
        &mut self,
        window_id: WindowId,
        direction: Direction,
        area: &WorkArea,
        config: &TilingConfig,
        now: Instant,
    ) -> Rect {
        let center = direction.is_center();
        let steps = config.steps(center);

        let previous = self.previous.as_ref().filter(|prev| {
            prev.window_id == window_id
                && now.saturating_duration_since(prev.timestamp) <= config.gesture_timeout
                && prev.direction == direction
                && prev.step_index < steps.len()
        });

        let mut iteration = previous.map_or(0, |prev| prev.step_index);
        let plan = |index: usize| {
            compute_rect(area, direction, steps.step(index), center, config.inner_gaps)
        };

        let mut rect = plan(iteration);
        if let Some(prev) = previous {
            let mut tried = 1;
            while rect == prev.rect && tried < steps.len() {
                iteration = (iteration + 1) % steps.len();
                rect = plan(iteration);
                tried += 1;
            }
        }

        debug!(
            window_id,
            %direction,
            successive = previous.is_some(),
            iteration,
            %rect,
            "Planned tiling step"
        );

        self.previous = Some(GestureState {
            window_id,
            direction,
            rect,
            timestamp: now,
            step_index: iteration + 1,
        });

        rect
    }
}
