use crate::config::{GapChange, SettingsStore};
use crate::host::{Compositor, VisualLayer};
use crate::models::{Direction, WorkArea};
use crate::services::gesture_sequencer::GestureSequencer;
use crate::services::window_animator::{Transition, TransitionTiming, WindowTransitionAnimator};
use crate::{Result, SnapTileError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Title used for desktop notifications
pub const NOTIFICATION_TITLE: &str = "snaptile";

/// A command bound to a keyboard shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCommand {
    Tile(Direction),
    /// Center the window without resizing it
    AlignToCenter,
    IncreaseGapSize,
    DecreaseGapSize,
}

impl TileCommand {
    pub const ALL: [TileCommand; 13] = [
        TileCommand::AlignToCenter,
        TileCommand::Tile(Direction::CENTER),
        TileCommand::Tile(Direction::FILL),
        TileCommand::Tile(Direction::LEFT),
        TileCommand::Tile(Direction::RIGHT),
        TileCommand::Tile(Direction::TOP),
        TileCommand::Tile(Direction::TOP_LEFT),
        TileCommand::Tile(Direction::TOP_RIGHT),
        TileCommand::Tile(Direction::BOTTOM),
        TileCommand::Tile(Direction::BOTTOM_LEFT),
        TileCommand::Tile(Direction::BOTTOM_RIGHT),
        TileCommand::IncreaseGapSize,
        TileCommand::DecreaseGapSize,
    ];

    /// Keybinding name of the command, `None` for direction combinations
    /// without a shortcut
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            TileCommand::AlignToCenter => "align-window-to-center",
            TileCommand::IncreaseGapSize => "increase-gap-size",
            TileCommand::DecreaseGapSize => "decrease-gap-size",
            TileCommand::Tile(direction) => match direction {
                Direction::CENTER => "tile-window-to-center",
                Direction::FILL => "tile-window-to-fill",
                Direction::LEFT => "tile-window-to-left",
                Direction::RIGHT => "tile-window-to-right",
                Direction::TOP => "tile-window-to-top",
                Direction::TOP_LEFT => "tile-window-to-top-left",
                Direction::TOP_RIGHT => "tile-window-to-top-right",
                Direction::BOTTOM => "tile-window-to-bottom",
                Direction::BOTTOM_LEFT => "tile-window-to-bottom-left",
                Direction::BOTTOM_RIGHT => "tile-window-to-bottom-right",
                _ => return None,
            },
        };
        Some(name)
    }
}

impl fmt::Display for TileCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self) {
            (Some(name), _) => f.write_str(name),
            (None, TileCommand::Tile(direction)) => write!(f, "tile-window-to-{}", direction),
            (None, _) => Ok(()),
        }
    }
}

impl FromStr for TileCommand {
    type Err = SnapTileError;

    /// Accepts keybinding names with or without the `shortcut-` prefix
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("shortcut-").unwrap_or(name);

        TileCommand::ALL
            .iter()
            .copied()
            .find(|command| command.name() == Some(name))
            .ok_or_else(|| SnapTileError::ValidationError(format!("Unknown command: {}", s)))
    }
}

/// Entry point for keyboard commands.
///
/// Reads settings once per command, asks the sequencer for the target
/// rectangle and hands it to the animator.
pub struct TilingController {
    compositor: Arc<dyn Compositor>,
    settings: Arc<dyn SettingsStore>,
    animator: WindowTransitionAnimator,
    sequencer: Mutex<GestureSequencer>,
}

impl TilingController {
    pub fn new(
        compositor: Arc<dyn Compositor>,
        visual: Arc<dyn VisualLayer>,
        settings: Arc<dyn SettingsStore>,
        timing: TransitionTiming,
    ) -> Self {
        let animator = WindowTransitionAnimator::new(Arc::clone(&compositor), visual, timing);
        Self {
            compositor,
            settings,
            animator,
            sequencer: Mutex::new(GestureSequencer::new()),
        }
    }

    pub fn animator(&self) -> &WindowTransitionAnimator {
        &self.animator
    }

    /// Run one command. Returns the transition when a window was moved.
    #[instrument(skip(self))]
    pub async fn run(&self, command: TileCommand) -> Result<Option<Transition>> {
        match command {
            TileCommand::Tile(direction) => self.tile(direction).await,
            TileCommand::AlignToCenter => self.align_to_center().await,
            TileCommand::IncreaseGapSize => {
                self.increase_gap_size().await?;
                Ok(None)
            }
            TileCommand::DecreaseGapSize => {
                self.decrease_gap_size().await?;
                Ok(None)
            }
        }
    }

    pub async fn tile(&self, direction: Direction) -> Result<Option<Transition>> {
        self.tile_at(direction, Instant::now()).await
    }

    /// Tile the focused window as if the command arrived at `now`
    pub async fn tile_at(&self, direction: Direction, now: Instant) -> Result<Option<Transition>> {
        let Some(window) = self.compositor.focused_window() else {
            debug!(%direction, "No focused window, ignoring tiling command");
            return Ok(None);
        };

        let config = self.settings.load().tiling_config();
        let area = WorkArea::new(
            self.compositor.work_area(window)?,
            self.compositor.monitor_geometry(window)?,
            config.gap_size,
        );

        let target = self
            .sequencer
            .lock()
            .await
            .next_rect(window, direction, &area, &config, now);

        let transition = self
            .animator
            .set_window_rect(window, target, config.animate)
            .await?;
        Ok(Some(transition))
    }

    /// Center the focused window in its work area, keeping its size
    pub async fn align_to_center(&self) -> Result<Option<Transition>> {
        let Some(window) = self.compositor.focused_window() else {
            debug!("No focused window, ignoring align command");
            return Ok(None);
        };

        let config = self.settings.load().tiling_config();
        let work_area = self.compositor.work_area(window)?;
        let target = self.compositor.frame_rect(window)?.centered_in(&work_area);

        let transition = self
            .animator
            .set_window_rect(window, target, config.animate)
            .await?;
        Ok(Some(transition))
    }

    pub async fn increase_gap_size(&self) -> Result<u32> {
        self.change_gap_size(GapChange::Increase).await
    }

    pub async fn decrease_gap_size(&self) -> Result<u32> {
        self.change_gap_size(GapChange::Decrease).await
    }

    async fn change_gap_size(&self, change: GapChange) -> Result<u32> {
        let gap_size = self.settings.load().stepped_gap_size(change);
        self.settings.set_gap_size(gap_size)?;

        info!(gap_size, ?change, "Gap size changed");
        self.compositor
            .notify(NOTIFICATION_TITLE, &gap_size_message(gap_size));
        Ok(gap_size)
    }

    /// Release every in-flight transition and forget the press history
    pub async fn shutdown(&self) {
        self.animator.shutdown().await;
        self.sequencer.lock().await.reset();
        debug!("Tiling controller shut down");
    }
}

pub fn gap_size_message(gap_size: u32) -> String {
    format!("Gap size is now at {} percent", gap_size)
}
