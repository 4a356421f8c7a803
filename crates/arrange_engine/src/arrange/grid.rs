//! Fixed column grid

use super::item::{veid_for, Placement};
use super::page::PageContent;
use super::Arranger;
use crate::{calc_geometry_in_cell, ArrangeFlags, Result, VisualElement, VisualElementFlags};
use item_model::{BoundingBox, Dimensions, Item, PageItem};

/// Column and row of the `index`th item in a grid of `columns` columns
pub fn grid_cell(index: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    (index % columns, index / columns)
}

impl Arranger<'_> {
    pub(crate) fn arrange_grid_page(&mut self, page: &PageItem, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let viewport = node.viewport_bounds_px.unwrap_or(node.bounds_px);
        let columns = page.grid_number_of_columns.max(1);
        let parent_is_popup = node.arrange_flags.contains(ArrangeFlags::POPUP_ROOT);
        let parent_full = node.arrange_flags.is_root() || page.interactive;

        let mut slotted: Vec<&Item> = Vec::new();
        let mut moving: Option<&Item> = None;
        for child in store.children_of(node.display_item.id()) {
            if moving.is_none() && self.is_moving(&node.path.child(veid_for(store, child))) {
                moving = Some(child);
            } else {
                slotted.push(child);
            }
        }

        let num_rows = slotted.len().div_ceil(columns);
        let cell_w = viewport.w / columns as f64;
        let cell_h = cell_w / page.grid_cell_aspect;
        let margin = cell_w * self.config.grid_cell_margin_prop;
        let cell_size = Dimensions::new(cell_w, cell_h);
        let child_area = BoundingBox::new(
            viewport.x,
            viewport.y,
            viewport.w,
            (num_rows as f64 * cell_h).max(viewport.h),
        );

        let mut children = Vec::with_capacity(slotted.len() + 1);
        for (index, child) in slotted.iter().enumerate() {
            let (col, row) = grid_cell(index, columns);
            let cell = BoundingBox::new(
                col as f64 * cell_w + margin,
                row as f64 * cell_h + margin,
                cell_w - margin * 2.0,
                cell_h - margin * 2.0,
            );
            let geometry = calc_geometry_in_cell(self.config, store, child, cell);
            let arrange_flags = self.child_arrange_flags(child, &geometry, parent_full, false, parent_is_popup);
            let placement =
                Placement::new(geometry, arrange_flags, VisualElementFlags::NONE).in_cell(col, row, cell_size);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        if let Some(child) = moving {
            let (col, row) = grid_cell(slotted.len(), columns);
            let inner_w = cell_w - margin * 2.0;
            let inner_h = cell_h - margin * 2.0;
            let cell = match self.ui.moving() {
                // on the top level page the item follows the cursor
                Some(state) if node.arrange_flags.contains(ArrangeFlags::TOP_ROOT) => {
                    let scroll_y = self.scroll.scroll_y_prop(node.actual_veid()) * (child_area.h - viewport.h).max(0.0);
                    let cursor = state.cursor_desktop_px.sub(viewport.top_left());
                    BoundingBox::new(
                        cursor.x - state.click_offset_prop.x * inner_w,
                        cursor.y + scroll_y - state.click_offset_prop.y * inner_h,
                        inner_w,
                        inner_h,
                    )
                }
                _ => BoundingBox::new(
                    col as f64 * cell_w + margin,
                    row as f64 * cell_h + margin,
                    inner_w,
                    inner_h,
                ),
            };
            let geometry = calc_geometry_in_cell(self.config, store, child, cell);
            let arrange_flags =
                self.child_arrange_flags(child, &geometry, parent_full, false, parent_is_popup) | ArrangeFlags::MOVING;
            let placement =
                Placement::new(geometry, arrange_flags, VisualElementFlags::NONE).in_cell(col, row, cell_size);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        Ok(PageContent::new(child_area, children))
    }
}
