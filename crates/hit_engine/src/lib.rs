//! Hit Engine - Pointer positions to visual elements
//!
//! Walks the visual element tree an [`arrange_engine::ArrangeEngine`] last
//! produced, undoing scroll offsets on the way down, and reports the element
//! and hitbox kinds under a desktop position together with the container and
//! positioning page a drop at that position would land in.

mod error;
mod hit;
mod hit_info;

pub use error::*;
pub use hit::*;
pub use hit_info::*;
