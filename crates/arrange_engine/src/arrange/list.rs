//! List pages: a scrolling column of line items, with the selected item
//! shown in the space to the right.

use super::item::{veid_for, Placement};
use super::page::PageContent;
use super::Arranger;
use crate::{
    calc_geometry_in_cell, calc_geometry_list_item, ArrangeFlags, Hitbox, HitboxFlags, ItemGeometry, Result, VePath,
    VisualElement, VisualElementFlags,
};
use item_model::{BoundingBox, Dimensions, Item, ItemKind, LinkItem, PageItem, LIST_PAGE_MAIN_ITEM_LINK_ID};

impl Arranger<'_> {
    pub(crate) fn arrange_list_page(&mut self, page: &PageItem, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let config = self.config;
        let viewport = node.viewport_bounds_px.unwrap_or(node.bounds_px);
        let parent_is_popup = node.arrange_flags.contains(ArrangeFlags::POPUP_ROOT);

        let scale = if node
            .arrange_flags
            .intersects(ArrangeFlags::TOP_ROOT | ArrangeFlags::LIST_PAGE_MAIN_ROOT)
            || self.main_area_px.w <= 0.0
        {
            1.0
        } else {
            (viewport.w / self.main_area_px.w).min(1.0)
        };
        let block = Dimensions::new(config.natural_block_size_px * scale, config.natural_block_size_px * scale);
        let list_width_bl = page.list_column_width_gr / config.grid_size;
        let list_width_px = (list_width_bl * block.w).min(viewport.w);
        let pad_top = config.list_page_top_padding_px * scale;
        let selected_veid = self.ui.selected_list_item(node.actual_veid());

        let mut rows: Vec<&Item> = Vec::new();
        let mut moving: Option<&Item> = None;
        for child in store.children_of(node.display_item.id()) {
            if moving.is_none()
                && node.arrange_flags.contains(ArrangeFlags::TOP_ROOT)
                && self.is_moving(&node.path.child(veid_for(store, child)))
            {
                moving = Some(child);
            } else {
                rows.push(child);
            }
        }

        let mut children = Vec::with_capacity(rows.len() + 2);
        let mut selected_item = None;
        for (row, child) in rows.iter().enumerate() {
            let veid = veid_for(store, child);
            let mut flags = VisualElementFlags::LINE_ITEM;
            if selected_veid == Some(veid) {
                flags |= VisualElementFlags::SELECTED;
                selected_item = Some(*child);
            }
            let geometry = calc_geometry_list_item(block, row, 0, list_width_bl, pad_top, parent_is_popup, false);
            let arrange_flags = if parent_is_popup {
                ArrangeFlags::PARENT_IS_POPUP
            } else {
                ArrangeFlags::NONE
            };
            let placement = Placement::new(geometry, arrange_flags, flags).at_row(row);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        if let (Some(child), Some(state)) = (moving, self.ui.moving()) {
            let cursor = state.cursor_desktop_px.sub(viewport.top_left());
            let mut geometry = calc_geometry_list_item(block, 0, 0, list_width_bl, 0.0, parent_is_popup, false);
            geometry.bounds_px.x = cursor.x - state.click_offset_prop.x * geometry.bounds_px.w;
            geometry.bounds_px.y = cursor.y - state.click_offset_prop.y * geometry.bounds_px.h;
            let placement = Placement::new(
                geometry,
                ArrangeFlags::MOVING,
                VisualElementFlags::LINE_ITEM | VisualElementFlags::MOVING,
            );
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        let list_child_area = BoundingBox::new(
            viewport.x,
            viewport.y,
            list_width_px,
            (rows.len() as f64 * block.h + pad_top).max(viewport.h),
        );

        let mut content = PageContent::new(viewport, children);
        content.list_child_area_px = Some(list_child_area);
        content.hitboxes.push(Hitbox::new(
            HitboxFlags::HORIZONTAL_RESIZE,
            BoundingBox::new(
                viewport.x - node.bounds_px.x + list_width_px - config.resize_box_size_px,
                viewport.y - node.bounds_px.y,
                config.resize_box_size_px,
                viewport.h,
            ),
        ));

        if let Some(child) = selected_item {
            if let Some(selected_path) = self.arrange_selected_list_item(child, node, viewport, list_width_px)? {
                content.children.push(selected_path.clone());
                content.selected = Some(selected_path);
            }
        }
        Ok(content)
    }

    /// Show the selected item in the area right of the list, through a
    /// synthetic link so it does not collide with its own line item.
    fn arrange_selected_list_item(
        &mut self,
        child: &Item,
        node: &VisualElement,
        viewport: BoundingBox,
        list_width_px: f64,
    ) -> Result<Option<VePath>> {
        let store = self.store;
        let line_height = self.config.line_height_px;
        let bounds = BoundingBox::new(
            list_width_px + line_height,
            line_height,
            viewport.w - list_width_px - line_height * 2.0,
            viewport.h - line_height * 2.0,
        );
        let min_size = self.config.min_selected_size_px;
        if bounds.w < min_size || bounds.h < min_size {
            tracing::warn!(page = %node.path, "no room to show the selected list item");
            return Ok(None);
        }

        let resolved = store.resolve(child);
        let display = resolved.display;
        let actual_link = resolved.link.filter(|link| !link.id().is_reserved());
        let synthetic = Item::with_id(
            LIST_PAGE_MAIN_ITEM_LINK_ID,
            ItemKind::Link(LinkItem {
                link_to: display.id(),
                spatial_width_gr: display.spatial_width_gr().unwrap_or(0.0),
                spatial_height_gr: display.spatial_height_gr().unwrap_or(0.0),
            }),
        );

        let placement = if display.is_page() {
            let geometry = ItemGeometry::root(bounds, self.natural_block());
            let arrange_flags = if node.arrange_flags.is_root() {
                ArrangeFlags::LIST_PAGE_MAIN_ROOT
            } else {
                self.child_arrange_flags(&synthetic, &geometry, true, false, false)
            };
            Placement::new(geometry, arrange_flags, VisualElementFlags::NONE)
        } else {
            let geometry = calc_geometry_in_cell(self.config, store, &synthetic, bounds);
            Placement::new(geometry, ArrangeFlags::RENDER_CHILDREN_AS_FULL, VisualElementFlags::NONE)
        };
        self.arrange_linked(&synthetic, actual_link, &node.path, placement).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrangeEngine, ArrangeFlags, HitboxFlags, Veid, VisualElementFlags};
    use item_model::{
        ArrangeAlgorithm, BoundingBox, Item, ItemId, ItemKind, ItemStore, NoteItem, PageItem,
        LIST_PAGE_MAIN_ITEM_LINK_ID,
    };

    fn list_store() -> (ItemStore, ItemId, Vec<ItemId>) {
        let mut store = ItemStore::new();
        let root = store
            .insert_root(Item::new(ItemKind::Page(PageItem {
                arrange_algorithm: ArrangeAlgorithm::List,
                ..Default::default()
            })))
            .unwrap();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(
                store
                    .add_child(root, Item::new(ItemKind::Note(NoteItem::default())))
                    .unwrap(),
            );
        }
        ids.push(
            store
                .add_child(
                    root,
                    Item::new(ItemKind::Page(PageItem {
                        spatial_width_gr: 12.0 * 60.0,
                        ..Default::default()
                    })),
                )
                .unwrap(),
        );
        (store, root, ids)
    }

    #[test]
    fn test_rows_stack_under_padding() {
        let (store, root, ids) = list_store();
        let mut engine = ArrangeEngine::default();
        let top = engine.arrange(&store, root, None).unwrap();

        for (row, id) in ids.iter().enumerate() {
            let node = engine.cache().find_single(Veid::item(*id)).unwrap();
            assert_eq!(node.bounds_px.y, row as f64 * 24.0 + 12.0);
            assert_eq!(node.bounds_px.h, 24.0);
            assert!(node.flags.contains(VisualElementFlags::LINE_ITEM));
        }

        let page = engine.cache().require(&top).unwrap();
        let list_area = page.list_child_area_bounds_px.unwrap();
        // eight block list column
        assert_eq!(list_area.w, 192.0);
        assert!(page.hitboxes.iter().any(|h| h.kind == HitboxFlags::HORIZONTAL_RESIZE));
        assert_eq!(page.child_area_bounds_px, page.viewport_bounds_px);
    }

    #[test]
    fn test_selected_page_becomes_list_main_root() {
        let (store, root, ids) = list_store();
        let mut engine = ArrangeEngine::default().with_desktop_bounds(BoundingBox::new(0.0, 0.0, 1000.0, 600.0));
        let top = engine.arrange(&store, root, None).unwrap();
        let page_veid = top.veid();
        engine.ui_mut().select_list_item(page_veid, Veid::item(ids[3]));
        engine.arrange(&store, root, None).unwrap();

        let page = engine.cache().require(&top).unwrap();
        let selected_path = page.selected.clone().unwrap();
        assert_eq!(selected_path.veid(), Veid::linked(ids[3], LIST_PAGE_MAIN_ITEM_LINK_ID));
        assert_eq!(page.children.last(), Some(&selected_path));

        let selected = engine.cache().require(&selected_path).unwrap();
        assert!(selected.arrange_flags.contains(ArrangeFlags::LIST_PAGE_MAIN_ROOT));
        assert!(selected.flags.contains(VisualElementFlags::LIST_PAGE_ROOT));
        assert_eq!(selected.bounds_px, BoundingBox::new(216.0, 24.0, 760.0, 552.0));

        let line = engine.cache().require(&top.child(Veid::item(ids[3]))).unwrap();
        assert!(line.flags.contains(VisualElementFlags::SELECTED));
    }

    #[test]
    fn test_deleting_first_row_shifts_the_rest_up() {
        let (mut store, root, ids) = list_store();
        let mut engine = ArrangeEngine::default();
        engine.arrange(&store, root, None).unwrap();
        store.remove(ids[0]).unwrap();
        engine.arrange(&store, root, None).unwrap();

        let second = engine.cache().find_single(Veid::item(ids[1])).unwrap();
        assert_eq!(second.row, Some(0));
        assert_eq!(second.bounds_px.y, 12.0);
        assert!(engine.cache().find(Veid::item(ids[0])).is_empty());
    }
}
