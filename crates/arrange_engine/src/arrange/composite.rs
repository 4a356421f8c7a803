//! Composites: items stacked into one block

use super::item::Placement;
use super::Arranger;
use crate::{calc_geometry_in_composite, ArrangeFlags, Result, VisualElement, VisualElementFlags};
use item_model::ItemKind;

impl Arranger<'_> {
    pub(crate) fn arrange_composite(&mut self, node: &mut VisualElement) -> Result<()> {
        let store = self.store;
        let config = self.config;
        let block = node.block_size_px.unwrap_or_else(|| self.natural_block());
        let width_bl = node.bounds_px.w / block.w;
        let gap = config.composite_item_gap_bl * block.h;

        let mut top = 0.0;
        let mut children = Vec::new();
        for child in store.children_of(node.display_item.id()) {
            let geometry = calc_geometry_in_composite(config, store, child, block, width_bl, 0.0, top);
            top += geometry.bounds_px.h + gap;
            let full = match &store.resolve(child).display.kind {
                ItemKind::Page(_) => width_bl >= config.child_items_visible_width_bl,
                _ => true,
            };
            let arrange_flags = ArrangeFlags::INSIDE_COMPOSITE_OR_DOC
                | if full {
                    ArrangeFlags::RENDER_CHILDREN_AS_FULL
                } else {
                    ArrangeFlags::RENDER_AS_OUTLINE
                };
            let placement = Placement::new(geometry, arrange_flags, VisualElementFlags::NONE);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        node.flags |= VisualElementFlags::DETAILED;
        node.viewport_bounds_px = Some(node.bounds_px);
        node.child_area_bounds_px = Some(node.bounds_px);
        node.children = children;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrangeEngine, Veid, VisualElementFlags};
    use item_model::{CompositeItem, Item, ItemKind, ItemStore, NoteItem, PageItem};

    #[test]
    fn test_children_stack_inside_bounds() {
        let mut store = ItemStore::new();
        let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default()))).unwrap();
        let composite = store
            .add_child(root, Item::new(ItemKind::Composite(CompositeItem::default())).at_gr(120.0, 120.0))
            .unwrap();
        let notes: Vec<_> = (0..3)
            .map(|_| {
                store
                    .add_child(composite, Item::new(ItemKind::Note(NoteItem::default())))
                    .unwrap()
            })
            .collect();

        let mut engine = ArrangeEngine::default();
        engine.arrange(&store, root, None).unwrap();
        let node = engine.cache().find_single(Veid::item(composite)).unwrap();
        let block = node.block_size_px.unwrap();
        assert_eq!(node.children.len(), 3);
        assert_eq!(node.child_area_bounds_px, Some(node.bounds_px));

        let mut previous_bottom: Option<f64> = None;
        for id in &notes {
            let child = engine.cache().find_single(Veid::item(*id)).unwrap();
            assert!(child.flags.contains(VisualElementFlags::INSIDE_COMPOSITE_OR_DOC));
            assert!(node.bounds_px.zero_top_left().contains_box(&child.bounds_px));
            if let Some(bottom) = previous_bottom {
                assert!((child.bounds_px.y - bottom - block.h * 0.5).abs() < 1e-9);
            }
            previous_bottom = Some(child.bounds_px.bottom());
        }
    }
}
