use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Integer pixel rectangle in compositor coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Round floating point geometry to whole pixels, never producing a
    /// negative size. Edges are rounded rather than sizes, so rectangles that
    /// touch before rounding still touch afterwards.
    pub fn rounded(x: f64, y: f64, width: f64, height: f64) -> Self {
        let left = x.round();
        let top = y.round();
        let right = (x + width.max(0.0)).round();
        let bottom = (y + height.max(0.0)).round();

        Self {
            x: left as i32,
            y: top as i32,
            width: (right - left).max(0.0) as i32,
            height: (bottom - top).max(0.0) as i32,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn orientation(&self) -> Orientation {
        if self.height > self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Whether `other` lies completely inside this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Rectangle with the same size centered within `area`
    pub fn centered_in(&self, area: &Rect) -> Rect {
        Rect {
            x: area.x + (area.width - self.width) / 2,
            y: area.y + (area.height - self.height) / 2,
            width: self.width,
            height: self.height,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum GeometryParseError {
    #[error("Expected four comma separated integers (x,y,width,height), got '{0}'")]
    WrongArity(String),
    #[error("Invalid integer '{0}'")]
    InvalidNumber(String),
    #[error("Rectangle size must not be negative: {0}")]
    NegativeSize(String),
}

impl FromStr for Rect {
    type Err = GeometryParseError;

    /// Parses `x,y,width,height`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GeometryParseError::WrongArity(s.to_string()));
        }

        let mut values = [0i32; 4];
        for (value, part) in values.iter_mut().zip(parts) {
            *value = part
                .parse()
                .map_err(|_| GeometryParseError::InvalidNumber(part.to_string()))?;
        }

        let [x, y, width, height] = values;
        if width < 0 || height < 0 {
            return Err(GeometryParseError::NegativeSize(s.to_string()));
        }

        Ok(Rect::new(x, y, width, height))
    }
}

/// Monitor orientation, used to keep gaps and center steps visually consistent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// Edges a tiling command snaps to.
///
/// Opposite edges both set fill that axis, a single edge of a pair anchors the
/// window to it, and no edge at all requests centered tiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Direction {
    pub const CENTER: Direction = Direction::new(false, false, false, false);
    pub const FILL: Direction = Direction::new(true, true, true, true);
    pub const LEFT: Direction = Direction::new(true, true, true, false);
    pub const RIGHT: Direction = Direction::new(true, true, false, true);
    pub const TOP: Direction = Direction::new(true, false, true, true);
    pub const BOTTOM: Direction = Direction::new(false, true, true, true);
    pub const TOP_LEFT: Direction = Direction::new(true, false, true, false);
    pub const TOP_RIGHT: Direction = Direction::new(true, false, false, true);
    pub const BOTTOM_LEFT: Direction = Direction::new(false, true, true, false);
    pub const BOTTOM_RIGHT: Direction = Direction::new(false, true, false, true);

    pub const fn new(top: bool, bottom: bool, left: bool, right: bool) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// No edge selected at all
    pub fn is_center(&self) -> bool {
        !(self.top || self.bottom || self.left || self.right)
    }

    /// Exactly one of left/right is selected
    pub fn splits_horizontally(&self) -> bool {
        self.left != self.right
    }

    /// Exactly one of top/bottom is selected
    pub fn splits_vertically(&self) -> bool {
        self.top != self.bottom
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_center() {
            return f.write_str("center");
        }

        let edges: Vec<&str> = [
            (self.top, "top"),
            (self.bottom, "bottom"),
            (self.left, "left"),
            (self.right, "right"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        f.write_str(&edges.join("+"))
    }
}
