//! Item Model - Items, ids and the item store
//!
//! This crate holds the canonical domain tree that the arrange engine reads:
//! typed items keyed by id, their measurable fields, and the rules that turn
//! declared spatial units into block dimensions.

mod error;
mod geometry;
mod item;
mod item_id;
mod measure;
mod store;

pub use error::*;
pub use geometry::*;
pub use item::*;
pub use item_id::*;
pub use measure::*;
pub use store::*;
