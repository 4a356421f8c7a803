//! Document pages: children stacked in a single column

use super::item::Placement;
use super::page::PageContent;
use super::Arranger;
use crate::{calc_geometry_in_composite, ArrangeFlags, Result, VisualElement, VisualElementFlags};
use item_model::{BoundingBox, Dimensions, PageItem};

impl Arranger<'_> {
    pub(crate) fn arrange_document_page(&mut self, page: &PageItem, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let config = self.config;
        let viewport = node.viewport_bounds_px.unwrap_or(node.bounds_px);
        let natural = config.natural_block_size_px;
        let margin_bl = config.document_left_margin_bl;

        let total_width_px = (page.doc_width_bl + margin_bl * 2.0) * natural;
        let scale = if total_width_px > 0.0 {
            (viewport.w / total_width_px).min(1.0)
        } else {
            1.0
        };
        let block = Dimensions::new(natural * scale, natural * scale);
        let left = margin_bl * block.w;
        let gap = config.composite_item_gap_bl * block.h;
        let parent_full = node.arrange_flags.is_root() || page.interactive;

        let mut top = config.document_top_margin_px * scale;
        let mut children = Vec::new();
        for child in store.children_of(node.display_item.id()) {
            if store.resolve(child).display.is_table() {
                tracing::debug!(page = %node.path, item = %child.id(), "tables are not shown in documents");
                continue;
            }
            let geometry = calc_geometry_in_composite(config, store, child, block, page.doc_width_bl, left, top);
            top += geometry.bounds_px.h + gap;
            let arrange_flags =
                self.child_arrange_flags(child, &geometry, parent_full, true, false) | ArrangeFlags::INSIDE_COMPOSITE_OR_DOC;
            let placement = Placement::new(geometry, arrange_flags, VisualElementFlags::NONE);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        let child_area = BoundingBox::new(viewport.x, viewport.y, viewport.w, top.max(viewport.h));
        Ok(PageContent::new(child_area, children))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrangeEngine, Veid, VisualElementFlags};
    use item_model::{
        ArrangeAlgorithm, BoundingBox, Item, ItemKind, ItemStore, NoteItem, PageItem, TableItem,
    };

    #[test]
    fn test_children_stack_with_gaps() {
        let mut store = ItemStore::new();
        let root = store
            .insert_root(Item::new(ItemKind::Page(PageItem {
                arrange_algorithm: ArrangeAlgorithm::Document,
                doc_width_bl: 36.0,
                ..Default::default()
            })))
            .unwrap();
        let first = store
            .add_child(root, Item::new(ItemKind::Note(NoteItem::default())))
            .unwrap();
        let table = store
            .add_child(root, Item::new(ItemKind::Table(TableItem::default())))
            .unwrap();
        let second = store
            .add_child(root, Item::new(ItemKind::Note(NoteItem::default())))
            .unwrap();

        // 40 blocks of 24 px fit exactly, so nothing is scaled
        let mut engine = ArrangeEngine::default().with_desktop_bounds(BoundingBox::new(0.0, 0.0, 960.0, 600.0));
        let top = engine.arrange(&store, root, None).unwrap();

        let first = engine.cache().find_single(Veid::item(first)).unwrap();
        assert_eq!(first.bounds_px, BoundingBox::new(48.0, 20.0, 864.0, 24.0));
        assert!(first
            .flags
            .contains(VisualElementFlags::INSIDE_COMPOSITE_OR_DOC | VisualElementFlags::DETAILED));

        let second = engine.cache().find_single(Veid::item(second)).unwrap();
        assert_eq!(second.bounds_px.y, 20.0 + 24.0 + 12.0);

        assert!(engine.cache().find(Veid::item(table)).is_empty());
        let page = engine.cache().require(&top).unwrap();
        assert_eq!(page.children.len(), 2);
    }
}
