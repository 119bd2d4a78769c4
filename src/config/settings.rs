use crate::models::tiling_step::{TilingSteps, DEFAULT_CENTER_STEPS, DEFAULT_SIDE_STEPS};
use crate::models::work_area::GAP_SIZE_LIMIT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User settings as stored on disk.
///
/// Every key is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Gap around tiled windows, in percent of the work area
    pub gap_size: u32,
    /// Amount the gap shortcuts add or remove
    pub gap_size_increments: u32,
    /// Upper bound reachable with the gap shortcuts
    pub gap_size_max: u32,
    /// Split the gap between windows sharing an edge
    pub enable_inner_gaps: bool,
    pub enable_window_animation: bool,
    /// Window in milliseconds in which repeated presses continue a cycle
    pub tiling_steps_timeout: u64,
    pub tiling_steps_center: String,
    pub tiling_steps_side: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gap_size: 0,
            gap_size_increments: 1,
            gap_size_max: 50,
            enable_inner_gaps: true,
            enable_window_animation: true,
            tiling_steps_timeout: 1000,
            tiling_steps_center: DEFAULT_CENTER_STEPS.to_string(),
            tiling_steps_side: DEFAULT_SIDE_STEPS.to_string(),
        }
    }
}

/// Direction for the gap size shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapChange {
    Increase,
    Decrease,
}

impl Settings {
    /// Copy with every numeric setting forced into its valid range
    pub fn sanitized(&self) -> Self {
        let gap_size_max = self.gap_size_max.min(GAP_SIZE_LIMIT);
        Self {
            gap_size: self.gap_size.min(gap_size_max),
            gap_size_increments: self.gap_size_increments.max(1),
            gap_size_max,
            ..self.clone()
        }
    }

    /// Gap size after one press of a gap shortcut, kept within `[0, gap_size_max]`
    pub fn stepped_gap_size(&self, change: GapChange) -> u32 {
        let settings = self.sanitized();
        match change {
            GapChange::Increase => settings
                .gap_size
                .saturating_add(settings.gap_size_increments)
                .min(settings.gap_size_max),
            GapChange::Decrease => settings
                .gap_size
                .saturating_sub(settings.gap_size_increments),
        }
    }

    /// Typed snapshot read once per tiling command
    pub fn tiling_config(&self) -> TilingConfig {
        let settings = self.sanitized();
        TilingConfig {
            gap_size: settings.gap_size,
            inner_gaps: settings.enable_inner_gaps,
            animate: settings.enable_window_animation,
            gesture_timeout: Duration::from_millis(settings.tiling_steps_timeout),
            center_steps: TilingSteps::parse_or(
                &settings.tiling_steps_center,
                DEFAULT_CENTER_STEPS,
            ),
            side_steps: TilingSteps::parse_or(&settings.tiling_steps_side, DEFAULT_SIDE_STEPS),
        }
    }
}

/// Parsed configuration consumed by the planner, sequencer and animator
#[derive(Debug, Clone, PartialEq)]
pub struct TilingConfig {
    pub gap_size: u32,
    pub inner_gaps: bool,
    pub animate: bool,
    pub gesture_timeout: Duration,
    pub center_steps: TilingSteps,
    pub side_steps: TilingSteps,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Settings::default().tiling_config()
    }
}

impl TilingConfig {
    /// Step sequence used for the given tiling mode
    pub fn steps(&self, center: bool) -> &TilingSteps {
        if center {
            &self.center_steps
        } else {
            &self.side_steps
        }
    }
}
