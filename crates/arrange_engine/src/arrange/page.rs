//! Pages drawn with their children

use super::Arranger;
use crate::{ArrangeFlags, Hitbox, ItemGeometry, Result, VePath, VisualElement, VisualElementFlags};
use item_model::{ArrangeAlgorithm, BoundingBox, Item, ItemKind, PageItem};

/// What an arrangement algorithm produces for a page
#[derive(Debug, Default)]
pub(crate) struct PageContent {
    pub child_area_px: BoundingBox,
    pub children: Vec<VePath>,
    pub selected: Option<VePath>,
    pub list_child_area_px: Option<BoundingBox>,
    /// Added after the page's own hitboxes
    pub hitboxes: Vec<Hitbox>,
}

impl PageContent {
    pub fn new(child_area_px: BoundingBox, children: Vec<VePath>) -> Self {
        Self {
            child_area_px,
            children,
            ..Default::default()
        }
    }
}

impl Arranger<'_> {
    pub(crate) fn arrange_page_with_children(&mut self, page: &PageItem, node: &mut VisualElement) -> Result<()> {
        node.flags |= VisualElementFlags::SHOW_CHILDREN;
        if page.interactive && !node.arrange_flags.is_root() {
            node.flags |= VisualElementFlags::EMBEDDED_INTERACTIVE_ROOT;
        }
        if node.viewport_bounds_px.is_none() {
            node.viewport_bounds_px = Some(node.bounds_px);
        }

        let top_root = node.arrange_flags.contains(ArrangeFlags::TOP_ROOT);
        let algorithm = match self.algorithm_override {
            Some(algorithm) if top_root => algorithm,
            _ => page.arrange_algorithm,
        };

        let content = if node.arrange_flags.contains(ArrangeFlags::DOCK_ROOT) {
            self.arrange_dock_page(node)?
        } else if node.flags.contains(VisualElementFlags::FLIP_CARD_PAGE) {
            self.arrange_spatial_page(page, node)?
        } else {
            match algorithm {
                ArrangeAlgorithm::SpatialStretch => self.arrange_spatial_page(page, node)?,
                ArrangeAlgorithm::Grid => self.arrange_grid_page(page, node)?,
                ArrangeAlgorithm::List => self.arrange_list_page(page, node)?,
                ArrangeAlgorithm::Document => self.arrange_document_page(page, node)?,
                ArrangeAlgorithm::Calendar => self.arrange_calendar_page(node)?,
                ArrangeAlgorithm::Justified => self.arrange_justified_page(page, node)?,
                ArrangeAlgorithm::SingleCell => self.arrange_single_cell_page(page, node)?,
            }
        };

        node.child_area_bounds_px = Some(content.child_area_px);
        node.children = content.children;
        node.selected = content.selected;
        node.list_child_area_bounds_px = content.list_child_area_px;
        node.hitboxes.extend(content.hitboxes);

        let ui = self.ui;
        if top_root {
            if let Some(spec) = ui.popup() {
                if let Some(popup_path) = self.arrange_popup(page, algorithm, node, spec)? {
                    node.children.push(popup_path.clone());
                    node.popup = Some(popup_path);
                }
            }
        }
        Ok(())
    }

    /// Whether children of a page are drawn in full, and if so whether each
    /// nested page is wide enough to show its own children.
    pub(crate) fn child_arrange_flags(
        &self,
        child: &Item,
        geometry: &ItemGeometry,
        parent_full: bool,
        spatial: bool,
        parent_is_popup: bool,
    ) -> ArrangeFlags {
        let mut flags = if parent_is_popup {
            ArrangeFlags::PARENT_IS_POPUP
        } else {
            ArrangeFlags::NONE
        };
        if !parent_full {
            return flags | ArrangeFlags::RENDER_AS_OUTLINE;
        }
        let full = match &self.store.resolve(child).display.kind {
            ItemKind::Page(_) => {
                let block_w = if spatial {
                    geometry.block_size_px.w
                } else {
                    self.config.natural_block_size_px
                };
                geometry.bounds_px.w / block_w >= self.config.child_items_visible_width_bl
            }
            _ => true,
        };
        flags |= if full {
            ArrangeFlags::RENDER_CHILDREN_AS_FULL
        } else {
            ArrangeFlags::RENDER_AS_OUTLINE
        };
        flags
    }

    /// Whether the node at `path` is the item being dragged
    pub(crate) fn is_moving(&self, path: &VePath) -> bool {
        self.ui.moving().is_some_and(|m| &m.path == path)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrangeEngine, ArrangeFlags, VisualElementFlags};
    use item_model::{ArrangeAlgorithm, Item, ItemKind, ItemStore, NoteItem, PageItem};

    #[test]
    fn test_narrow_nested_page_is_outline() {
        let mut store = ItemStore::new();
        let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default()))).unwrap();
        // a default page is 4 blocks wide, under the width at which children show
        let narrow = store
            .add_child(root, Item::new(ItemKind::Page(PageItem::default())).at_gr(60.0, 60.0))
            .unwrap();
        let wide = store
            .add_child(
                root,
                Item::new(ItemKind::Page(PageItem {
                    spatial_width_gr: 10.0 * 60.0,
                    ..Default::default()
                }))
                .at_gr(600.0, 60.0),
            )
            .unwrap();
        store
            .add_child(wide, Item::new(ItemKind::Note(NoteItem::default())))
            .unwrap();

        let mut engine = ArrangeEngine::default();
        let top = engine.arrange(&store, root, None).unwrap();
        let top_node = engine.cache().require(&top).unwrap();
        assert!(top_node.flags.contains(VisualElementFlags::TOP_LEVEL_ROOT | VisualElementFlags::SHOW_CHILDREN));

        let narrow_node = engine.cache().find_single(crate::Veid::item(narrow)).unwrap();
        assert!(narrow_node.arrange_flags.contains(ArrangeFlags::RENDER_AS_OUTLINE));
        assert!(narrow_node.children.is_empty());

        let wide_node = engine.cache().find_single(crate::Veid::item(wide)).unwrap();
        assert!(wide_node.flags.contains(VisualElementFlags::SHOW_CHILDREN));
        assert_eq!(wide_node.children.len(), 1);
        let grandchild = engine.cache().require(&wide_node.children[0]).unwrap();
        assert!(grandchild.arrange_flags.contains(ArrangeFlags::RENDER_AS_OUTLINE));
    }

    #[test]
    fn test_override_applies_to_top_level_only() {
        let mut store = ItemStore::new();
        let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default()))).unwrap();
        for _ in 0..3 {
            store
                .add_child(root, Item::new(ItemKind::Note(NoteItem::default())))
                .unwrap();
        }
        let mut engine = ArrangeEngine::default();
        let top = engine.arrange(&store, root, Some(ArrangeAlgorithm::Grid)).unwrap();
        let top_node = engine.cache().require(&top).unwrap();
        let first = engine.cache().require(&top_node.children[0]).unwrap();
        assert_eq!(first.col, Some(0));
        assert_eq!(first.row, Some(0));
        let third = engine.cache().require(&top_node.children[2]).unwrap();
        assert_eq!(third.col, Some(2));
    }
}
