//! Host compositor integration layer for snaptile
//!
//! The compositor's window queries and its render tree are consumed through
//! the [`Compositor`] and [`VisualLayer`] traits. Real desktop bindings
//! implement them outside this crate, while tests and the `simulate` command
//! rely on the in-memory host.

pub mod compositor;
pub mod in_memory;
pub mod visual;

pub use compositor::*;
pub use in_memory::*;
pub use visual::*;
