//! Target rectangle calculation for a single tiling command.
//!
//! Everything here is a pure function of the work area, the direction and the
//! step, so identical inputs always yield the identical rectangle.

use crate::models::{Direction, Orientation, Rect, TilingStep, WorkArea};

/// Compute the rectangle a window should occupy.
///
/// `center` selects centered tiling, where the step says how much smaller than
/// the full work area the window becomes. Otherwise every axis with exactly one
/// selected edge is cut down to the step fraction and anchored to that edge,
/// and axes with both or neither edge selected span the whole area.
pub fn compute_rect(
    area: &WorkArea,
    direction: Direction,
    step: TilingStep,
    center: bool,
    inner_gaps: bool,
) -> Rect {
    if center {
        centered_rect(area, step)
    } else {
        edge_rect(area, direction, step, inner_gaps)
    }
}

fn centered_rect(area: &WorkArea, step: TilingStep) -> Rect {
    // The first fraction always drives the visually longer axis
    let step = match area.orientation {
        Orientation::Landscape => step,
        Orientation::Portrait => step.swapped(),
    };

    let work = area.rect;
    let width = (f64::from(area.full.width) * (1.0 - step.x)).min(f64::from(work.width));
    let height = (f64::from(area.full.height) * (1.0 - step.y)).min(f64::from(work.height));

    let x = f64::from(work.x) + (f64::from(work.width) - width) / 2.0;
    let y = f64::from(work.y) + (f64::from(work.height) - height) / 2.0;

    Rect::rounded(x, y, width, height)
}

fn edge_rect(area: &WorkArea, direction: Direction, step: TilingStep, inner_gaps: bool) -> Rect {
    let work = area.rect;
    let (mut x, mut width) =
        split_axis(work.x, work.width, direction.left, direction.right, step.x);
    let (mut y, mut height) =
        split_axis(work.y, work.height, direction.top, direction.bottom, step.y);

    if let (true, Some(gaps)) = (inner_gaps, area.gaps) {
        let half_x = f64::from(gaps.x) / 2.0;
        let half_y = f64::from(gaps.y) / 2.0;

        if direction.splits_horizontally() {
            if direction.right {
                x += half_x;
            }
            width -= half_x;
        }

        if direction.splits_vertically() {
            if direction.bottom {
                y += half_y;
            }
            height -= half_y;
        }
    }

    Rect::rounded(x, y, width, height)
}

/// Position and extent along one axis. `near` is the left/top edge.
fn split_axis(start: i32, extent: i32, near: bool, far: bool, fraction: f64) -> (f64, f64) {
    let start = f64::from(start);
    let extent = f64::from(extent);

    if near == far {
        return (start, extent);
    }

    let size = extent * fraction;
    if near {
        (start, size)
    } else {
        (start + extent - size, size)
    }
}
