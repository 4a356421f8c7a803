//! Arrange Engine - Visual element trees computed from items
//!
//! Given an item store, a root page and the current scroll and interaction
//! state, this crate computes the tree of visual elements that gets drawn:
//! pixel bounds, viewports, child areas and hitboxes for every visible item.
//! Trees are cached by path so that unchanged subtrees keep their slots, and
//! subtrees can be redone alone when only part of the store changes.

mod arrange;
mod cache;
mod config;
mod error;
mod hitbox;
mod item_geometry;
mod scroll;
mod ui_state;
mod veid;
mod visual_element;

pub use arrange::*;
pub use cache::*;
pub use config::*;
pub use error::*;
pub use hitbox::*;
pub use item_geometry::*;
pub use scroll::*;
pub use ui_state::*;
pub use veid::*;
pub use visual_element::*;
