//! Data models for snaptile

pub mod geometry;
pub mod tiling_step;
pub mod work_area;

pub use geometry::*;
pub use tiling_step::*;
pub use work_area::*;
