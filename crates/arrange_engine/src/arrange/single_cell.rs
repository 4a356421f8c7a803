//! One cell the size of the page, shared by every child

use super::item::{veid_for, Placement};
use super::page::PageContent;
use super::Arranger;
use crate::{calc_geometry_in_cell, ArrangeFlags, Result, VisualElement, VisualElementFlags};
use item_model::{calc_spatial_dimensions_bl, BoundingBox, PageItem};

impl Arranger<'_> {
    pub(crate) fn arrange_single_cell_page(&mut self, page: &PageItem, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let viewport = node.viewport_bounds_px.unwrap_or(node.bounds_px);
        let top_root = node.arrange_flags.contains(ArrangeFlags::TOP_ROOT);
        let parent_is_popup = node.arrange_flags.contains(ArrangeFlags::POPUP_ROOT);
        let parent_full = node.arrange_flags.is_root() || page.interactive;
        let child_area = BoundingBox::new(viewport.x, viewport.y, viewport.w, viewport.h);
        let page_cell = child_area.zero_top_left();

        let mut children = Vec::new();
        for child in store.children_of(node.display_item.id()) {
            let moving = self.is_moving(&node.path.child(veid_for(store, child)));
            let cell = match self.ui.moving() {
                // on the top level page the item follows the cursor
                Some(state) if moving && top_root => {
                    let size_bl = calc_spatial_dimensions_bl(store, child, &self.config.measure_params());
                    let scale = node.bounds_px.w / self.desktop_px.w.max(1.0);
                    let block = self.config.natural_block_size_px * scale;
                    let (w, h) = (size_bl.w * block, size_bl.h * block);
                    let cursor = state.cursor_desktop_px.sub(viewport.top_left());
                    BoundingBox::new(
                        cursor.x - state.click_offset_prop.x * w,
                        cursor.y - state.click_offset_prop.y * h,
                        w,
                        h,
                    )
                }
                _ => page_cell,
            };
            let geometry = calc_geometry_in_cell(self.config, store, child, cell);
            let mut arrange_flags = self.child_arrange_flags(child, &geometry, parent_full, false, parent_is_popup);
            if moving {
                arrange_flags |= ArrangeFlags::MOVING;
            }
            let placement =
                Placement::new(geometry, arrange_flags, VisualElementFlags::NONE).in_cell(0, 0, page_cell.size());
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        Ok(PageContent::new(child_area, children))
    }
}
