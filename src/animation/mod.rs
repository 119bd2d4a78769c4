//! Time-based easing used by window transitions.
//!
//! Animations are driven by frame timestamps coming from the compositor's
//! frame clock rather than by wall-clock sleeps, so a transition advances
//! exactly as often as the screen is redrawn.

use std::time::Duration;

use keyframe::functions::EaseOutQuart;
use keyframe::EasingFunction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    EaseOutQuart,
    EaseOutExpo,
}

impl Curve {
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::Linear => x,
            Curve::EaseOutQuart => EaseOutQuart.y(x),
            Curve::EaseOutExpo => {
                if x >= 1. {
                    1.
                } else {
                    1. - 2f64.powf(-10. * x)
                }
            }
        }
    }
}

/// Linear interpolation that lands exactly on the endpoints.
#[inline]
pub fn lerp(from: f64, to: f64, progress: f64) -> f64 {
    if progress >= 1. {
        to
    } else if progress <= 0. {
        from
    } else {
        (to - from).mul_add(progress, from)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Animation {
    from: f64,
    to: f64,
    start_time: Duration,
    duration: Duration,
    curve: Curve,
}

impl Animation {
    pub fn ease(
        from: f64,
        to: f64,
        start_time: Duration,
        duration: Duration,
        curve: Curve,
    ) -> Self {
        Self {
            from,
            to,
            start_time,
            duration,
            curve,
        }
    }

    /// Eased progress in `[0, 1]` at the given frame time.
    pub fn progress_at(&self, at: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.;
        } else if at <= self.start_time {
            return 0.;
        } else if self.start_time + self.duration <= at {
            return 1.;
        }

        let passed = at.saturating_sub(self.start_time).as_secs_f64();
        let x = (passed / self.duration.as_secs_f64()).clamp(0., 1.);
        self.curve.y(x)
    }

    pub fn value_at(&self, at: Duration) -> f64 {
        lerp(self.from, self.to, self.progress_at(at))
    }

    pub fn is_done(&self, at: Duration) -> bool {
        self.start_time + self.duration <= at
    }
}
