//! Core services for snaptile

pub mod gesture_sequencer;
pub mod rect_planner;
pub mod tiling_controller;
pub mod window_animator;

pub use gesture_sequencer::*;
pub use rect_planner::*;
pub use tiling_controller::*;
pub use window_animator::*;
