//! Flip cards show one of two side pages

use super::item::Placement;
use super::Arranger;
use crate::{ArrangeFlags, ItemGeometry, Result, VisualElement, VisualElementFlags};
use item_model::Item;

impl Arranger<'_> {
    pub(crate) fn arrange_flip_card(&mut self, node: &mut VisualElement) -> Result<()> {
        let store = self.store;
        let sides: Vec<&Item> = store.children_of(node.display_item.id()).collect();
        if sides.len() != 2 {
            tracing::warn!(card = %node.path, sides = sides.len(), "flip card should have two sides");
        }
        node.flags |= VisualElementFlags::DETAILED;
        node.viewport_bounds_px = Some(node.bounds_px);
        node.child_area_bounds_px = Some(node.bounds_px);

        let side_index = self.ui.flip_side(node.actual_veid());
        let Some(side) = sides.get(side_index).copied() else {
            return Ok(());
        };
        if !store.resolve(side).display.is_page() {
            tracing::warn!(card = %node.path, side = %side.id(), "flip card side is not a page");
            return Ok(());
        }

        let bounds = node.bounds_px.zero_top_left();
        let block = node.block_size_px.unwrap_or_else(|| self.natural_block());
        let placement = Placement::new(
            ItemGeometry::root(bounds, block),
            ArrangeFlags::RENDER_CHILDREN_AS_FULL,
            VisualElementFlags::FLIP_CARD_PAGE,
        );
        node.children = vec![self.arrange_item(side, &node.path, placement)?];
        Ok(())
    }
}
