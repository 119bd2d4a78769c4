use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Default sequence cycled through by repeated centered tiling presses
pub const DEFAULT_CENTER_STEPS: &str = "0.25;0.15, 0.5;0.3";

/// Default sequence cycled through by repeated edge and corner presses
pub const DEFAULT_SIDE_STEPS: &str = "0.5, 0.333, 0.667";

/// Size fractions applied for one press of a tiling command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilingStep {
    /// Fraction applied to the horizontal axis (the longer axis in center mode)
    pub x: f64,
    /// Fraction applied to the vertical axis
    pub y: f64,
}

impl TilingStep {
    /// Build a step, clamping both fractions into `[0, 1]`
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }

    /// Step using the same fraction on both axes
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value)
    }

    /// The same step with the axes exchanged
    pub fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl fmt::Display for TilingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.x == self.y {
            write!(f, "{}", self.x)
        } else {
            write!(f, "{};{}", self.x, self.y)
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum StepParseError {
    #[error("Step sequence is empty")]
    Empty,
    #[error("Expected a number, got '{0}'")]
    InvalidNumber(String),
    #[error("A step takes one or two values, got {0}")]
    TooManyValues(usize),
}

/// Non-empty ordered sequence of tiling steps
#[derive(Debug, Clone, PartialEq)]
pub struct TilingSteps {
    steps: Vec<TilingStep>,
}

impl TilingSteps {
    /// Returns `None` for an empty list, a sequence always holds at least one step
    pub fn new(steps: Vec<TilingStep>) -> Option<Self> {
        if steps.is_empty() {
            None
        } else {
            Some(Self { steps })
        }
    }

    /// Parse `value`, falling back to `default` when it is malformed
    pub fn parse_or(value: &str, default: &str) -> Self {
        match value.parse() {
            Ok(steps) => steps,
            Err(err) => {
                warn!(value, error = %err, "Malformed tiling steps, using defaults");
                default
                    .parse()
                    .unwrap_or_else(|_| Self::single(TilingStep::uniform(0.5)))
            }
        }
    }

    pub fn default_center() -> Self {
        Self::parse_or(DEFAULT_CENTER_STEPS, DEFAULT_CENTER_STEPS)
    }

    pub fn default_side() -> Self {
        Self::parse_or(DEFAULT_SIDE_STEPS, DEFAULT_SIDE_STEPS)
    }

    pub fn single(step: TilingStep) -> Self {
        Self { steps: vec![step] }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`, wrapping around the end of the sequence
    pub fn step(&self, index: usize) -> TilingStep {
        self.steps[index % self.steps.len()]
    }

}

impl FromStr for TilingSteps {
    type Err = StepParseError;

    /// Parses `"0.5, 0.333;0.5"`: comma separated steps of one or two
    /// semicolon separated fractions. Fractions are clamped into `[0, 1]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(StepParseError::Empty);
        }

        let steps = s
            .split(',')
            .map(parse_step)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(steps).ok_or(StepParseError::Empty)
    }
}

fn parse_step(step: &str) -> Result<TilingStep, StepParseError> {
    let values = step
        .split(';')
        .map(|raw| {
            let raw = raw.trim();
            let value: f64 = raw
                .parse()
                .map_err(|_| StepParseError::InvalidNumber(raw.to_string()))?;
            if value.is_nan() {
                return Err(StepParseError::InvalidNumber(raw.to_string()));
            }
            Ok(value)
        })
        .collect::<Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [x] => Ok(TilingStep::uniform(*x)),
        [x, y] => Ok(TilingStep::new(*x, *y)),
        other => Err(StepParseError::TooManyValues(other.len())),
    }
}

impl fmt::Display for TilingSteps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}
