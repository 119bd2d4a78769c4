use super::geometry::{Orientation, Rect};
use serde::{Deserialize, Serialize};

/// Largest configurable gap, as a percentage of the work area
pub const GAP_SIZE_LIMIT: u32 = 100;

/// Pixels removed from each side of the work area before tiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapInsets {
    pub x: i32,
    pub y: i32,
}

impl GapInsets {
    /// Derive insets from a gap percentage of the work area.
    ///
    /// Neither axis may exceed twice the other, and the axes are exchanged on
    /// portrait monitors. Returns `None` when the gap is zero.
    pub fn from_percentage(
        gap_size: u32,
        work_area: &Rect,
        orientation: Orientation,
    ) -> Option<Self> {
        if gap_size == 0 {
            return None;
        }

        let gap = f64::from(gap_size.min(GAP_SIZE_LIMIT));
        let unchecked_x = (gap / 200.0 * f64::from(work_area.width)).round() as i32;
        let unchecked_y = (gap / 200.0 * f64::from(work_area.height)).round() as i32;

        let insets = Self {
            x: unchecked_x.min(unchecked_y * 2),
            y: unchecked_y.min(unchecked_x * 2),
        };

        Some(match orientation {
            Orientation::Landscape => insets,
            Orientation::Portrait => Self {
                x: insets.y,
                y: insets.x,
            },
        })
    }
}

/// Area a window is tiled into, after gap insets are applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkArea {
    /// Work area with gap insets removed
    pub rect: Rect,
    /// Monitor work area before any gaps
    pub full: Rect,
    pub gaps: Option<GapInsets>,
    pub orientation: Orientation,
}

impl WorkArea {
    /// Build the tiling area for a monitor's work area and gap percentage.
    /// Orientation comes from the monitor geometry, not the work area.
    pub fn new(work_area: Rect, monitor: Rect, gap_size: u32) -> Self {
        let orientation = monitor.orientation();
        let gaps = GapInsets::from_percentage(gap_size, &work_area, orientation);

        let rect = match gaps {
            Some(gaps) => Rect {
                x: work_area.x + gaps.x,
                y: work_area.y + gaps.y,
                width: (work_area.width - gaps.x * 2).max(0),
                height: (work_area.height - gaps.y * 2).max(0),
            },
            None => work_area,
        };

        Self {
            rect,
            full: work_area,
            gaps,
            orientation,
        }
    }

    /// Area without gaps, with the orientation taken from the area itself
    pub fn ungapped(work_area: Rect) -> Self {
        Self::new(work_area, work_area, 0)
    }
}
