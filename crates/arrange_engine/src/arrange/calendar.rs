//! Calendar pages
//!
//! A calendar page lists the children dated on the day being viewed. The
//! year grid drawn behind them is twelve month columns of 31 day rows;
//! [`calendar_position_at`] maps a point on that grid back to a date.

use super::item::Placement;
use super::page::PageContent;
use super::Arranger;
use crate::{calc_geometry_list_item, ArrangeFlags, CalendarGridMetrics, Result, VisualElement, VisualElementFlags};
use chrono::{DateTime, NaiveDate};
use item_model::{BoundingBox, Dimensions, Item, Vector};

/// Month (1 to 12) and day (1 to 31) under `pos` on a calendar grid laid out
/// by `grid` in a child area of `size`. Points off the grid clamp to the
/// nearest cell.
pub fn calendar_position_at(grid: &CalendarGridMetrics, size: Dimensions, pos: Vector) -> (u32, u32) {
    let columns = f64::from(grid.month_columns.max(1));
    let rows = f64::from(grid.day_rows.max(1));
    let column_w = (size.w - grid.side_margin_px * 2.0 - grid.month_spacing_px * (columns - 1.0)) / columns;
    let month = ((pos.x - grid.side_margin_px) / (column_w + grid.month_spacing_px)).floor() + 1.0;

    let days_top = grid.days_top_px();
    let day_h = (size.h - days_top - grid.bottom_margin_px) / rows;
    let day = ((pos.y - days_top) / day_h).floor() + 1.0;

    (clamp_cell(month, columns), clamp_cell(day, rows))
}

fn clamp_cell(value: f64, max: f64) -> u32 {
    if value.is_nan() {
        return 1;
    }
    value.clamp(1.0, max) as u32
}

/// Day an item is dated on, in UTC
fn item_day(item: &Item) -> Option<NaiveDate> {
    DateTime::from_timestamp(item.common.date_time, 0).map(|dt| dt.date_naive())
}

impl Arranger<'_> {
    pub(crate) fn arrange_calendar_page(&mut self, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let viewport = node.viewport_bounds_px.unwrap_or(node.bounds_px);
        let header = self.config.calendar_header_height_px;
        let block = self.natural_block();
        let width_bl = (viewport.w / block.w).floor().max(1.0);
        let parent_is_popup = node.arrange_flags.contains(ArrangeFlags::POPUP_ROOT);
        let day = self.ui.calendar_day();

        let mut children = Vec::new();
        let dated = store
            .children_of(node.display_item.id())
            .filter(|child| item_day(store.resolve(child).display) == Some(day));
        for (row, child) in dated.enumerate() {
            let geometry = calc_geometry_list_item(block, row, 0, width_bl, header, parent_is_popup, false);
            let placement = Placement::new(geometry, ArrangeFlags::NONE, VisualElementFlags::LINE_ITEM).at_row(row);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        let height = header + children.len() as f64 * block.h;
        let child_area = BoundingBox::new(viewport.x, viewport.y, viewport.w, height.max(viewport.h));
        Ok(PageContent::new(child_area, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArrangeEngine, Veid};
    use item_model::{ArrangeAlgorithm, ItemKind, ItemStore, NoteItem, PageItem};

    #[test]
    fn test_position_maps_to_month_and_day() {
        // columns of (1200 - 10 - 55) / 12 = 94.58 px, day rows of
        // (800 - 91 - 5) / 31 = 22.71 px
        let grid = CalendarGridMetrics::default();
        let size = Dimensions::new(1200.0, 800.0);
        assert_eq!(calendar_position_at(&grid, size, Vector::new(6.0, 92.0)), (1, 1));
        assert_eq!(calendar_position_at(&grid, size, Vector::new(300.0, 91.0 + 22.71 * 9.5)), (3, 10));
        assert_eq!(calendar_position_at(&grid, size, Vector::new(1195.0, 799.0)), (12, 31));
    }

    #[test]
    fn test_position_clamps_off_grid() {
        let grid = CalendarGridMetrics::default();
        let size = Dimensions::new(1200.0, 800.0);
        assert_eq!(calendar_position_at(&grid, size, Vector::new(-50.0, -50.0)), (1, 1));
        assert_eq!(calendar_position_at(&grid, size, Vector::new(5000.0, 5000.0)), (12, 31));
    }

    #[test]
    fn test_position_follows_configured_margins() {
        // no title rows: the day grid starts at the top
        let grid = CalendarGridMetrics {
            title_height_px: 0.0,
            month_title_height_px: 0.0,
            title_to_month_spacing_px: 0.0,
            day_row_top_padding_px: 0.0,
            bottom_margin_px: 0.0,
            month_spacing_px: 0.0,
            side_margin_px: 0.0,
            ..Default::default()
        };
        let size = Dimensions::new(1200.0, 310.0);
        assert_eq!(calendar_position_at(&grid, size, Vector::new(0.0, 0.0)), (1, 1));
        assert_eq!(calendar_position_at(&grid, size, Vector::new(150.0, 25.0)), (2, 3));
    }

    #[test]
    fn test_only_items_on_the_day_are_listed() {
        let mut store = ItemStore::new();
        let root = store
            .insert_root(Item::new(ItemKind::Page(PageItem {
                arrange_algorithm: ArrangeAlgorithm::Calendar,
                ..Default::default()
            })))
            .unwrap();
        // 2024-03-09 12:00 and 2024-03-10 12:00 UTC
        let on_day = store
            .add_child(root, Item::new(ItemKind::Note(NoteItem::default())).dated(1_709_985_600))
            .unwrap();
        let next_day = store
            .add_child(root, Item::new(ItemKind::Note(NoteItem::default())).dated(1_710_072_000))
            .unwrap();

        let mut engine = ArrangeEngine::default();
        engine
            .ui_mut()
            .set_calendar_day(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        let top = engine.arrange(&store, root, None).unwrap();

        let listed = engine.cache().find_single(Veid::item(on_day)).unwrap();
        assert_eq!(listed.bounds_px.y, 84.0);
        assert_eq!(listed.row, Some(0));
        assert!(engine.cache().find(Veid::item(next_day)).is_empty());
        assert_eq!(engine.cache().require(&top).unwrap().children.len(), 1);
    }
}
