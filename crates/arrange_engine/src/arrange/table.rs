//! Detailed tables
//!
//! A table drawn in detail has a title bar, an optional column header, and a
//! scrolling body of one block high rows. Only the rows in view are arranged.
//! Rows of expanded container children follow their parent row, indented,
//! as further children of the table itself.

use super::item::{veid_for, Placement};
use super::Arranger;
use crate::item_geometry::{attach_box, resize_box};
use crate::{
    calc_geometry_list_item, ArrangeError, ArrangeFlags, Hitbox, HitboxFlags, HitboxMeta, ItemGeometry, Result,
    UiState, VePath, VisualElement, VisualElementFlags,
};
use item_model::{BoundingBox, Dimensions, Item, ItemId, ItemStore, TableItem};
use std::ops::Range;

/// A row of a table body
#[derive(Debug, Clone, Copy)]
struct TableRow<'s> {
    item: &'s Item,
    depth: usize,
}

/// Rows `first..` that fit in the body, counting one partly visible row
pub fn visible_row_range(scroll_pos: f64, body_height_bl: f64, row_count: usize) -> Range<usize> {
    let first = scroll_pos.max(0.0).floor() as usize;
    let count = (body_height_bl - 1e-6).max(0.0).ceil() as usize + 1;
    first.min(row_count)..(first + count).min(row_count)
}

/// Pixels over block size, snapped to a whole number of blocks when within
/// rounding error of one
fn blocks(px: f64, block_px: f64) -> f64 {
    let value = px / block_px;
    let whole = value.round();
    if (value - whole).abs() < 1e-9 {
        whole
    } else {
        value
    }
}

/// Column layout shared by hitboxes and row attachments
struct Columns {
    /// Start and end of each visible column, in blocks, clipped to the table
    spans: Vec<(f64, f64)>,
}

impl Columns {
    fn new(table: &TableItem, width_bl: f64, grid_size: f64) -> Self {
        let visible = table.number_of_visible_columns.max(1).min(table.columns.len());
        let mut spans = Vec::with_capacity(visible);
        let mut start = 0.0;
        for column in table.columns.iter().take(visible) {
            if start >= width_bl {
                break;
            }
            let end = (start + column.width_gr / grid_size).min(width_bl);
            spans.push((start, end));
            start = end;
        }
        Self { spans }
    }
}

/// Walks a table's items in row order, descending into expanded containers
struct RowWalk<'s, 'w> {
    store: &'s ItemStore,
    ui: &'w UiState,
    table_path: &'w VePath,
    max_depth: usize,
}

impl<'s> RowWalk<'s, '_> {
    fn collect(&self, parent_id: ItemId, depth: usize, rows: &mut Vec<TableRow<'s>>) {
        for child in self.store.children_of(parent_id) {
            rows.push(TableRow { item: child, depth });
            let display = self.store.resolve(child).display;
            if display.is_container()
                && depth < self.max_depth
                && self.ui.is_expanded(&self.table_path.child(veid_for(self.store, child)))
            {
                self.collect(display.id(), depth + 1, rows);
            }
        }
    }
}

impl<'a> Arranger<'a> {
    /// Every row of the table at `table_path`, in display order
    fn table_rows(&self, table_id: ItemId, table_path: &VePath) -> Vec<TableRow<'a>> {
        let walk = RowWalk {
            store: self.store,
            ui: self.ui,
            table_path,
            max_depth: self.config.table_max_row_depth,
        };
        let mut rows = Vec::new();
        walk.collect(table_id, 0, &mut rows);
        rows
    }
}

impl Arranger<'_> {
    pub(crate) fn arrange_table(&mut self, table: &TableItem, node: &mut VisualElement) -> Result<()> {
        let block = node.block_size_px.unwrap_or_else(|| self.natural_block());
        let size_bl = Dimensions::new(blocks(node.bounds_px.w, block.w), blocks(node.bounds_px.h, block.h));
        let header_bl = self.table_header_height_bl(table);

        let viewport = BoundingBox::new(
            node.bounds_px.x,
            node.bounds_px.y + header_bl * block.h,
            node.bounds_px.w,
            (node.bounds_px.h - header_bl * block.h).max(0.0),
        );
        node.flags |= VisualElementFlags::DETAILED;
        node.viewport_bounds_px = Some(viewport);
        node.hitboxes = self.table_hitboxes(table, node, size_bl, block);

        let rows = self.table_rows(node.display_item.id(), &node.path);
        node.child_area_bounds_px = Some(BoundingBox::new(
            viewport.x,
            viewport.y,
            viewport.w,
            rows.len() as f64 * block.h,
        ));

        let scroll_pos = self.scroll.table_scroll_y_pos(node.actual_veid());
        let range = visible_row_range(scroll_pos, size_bl.h - header_bl, rows.len());
        let (children, row_indexes) = self.arrange_table_rows(table, node, &rows, range, None)?;
        node.children = children;
        node.table_ves_rows = row_indexes;
        Ok(())
    }

    /// Rebuild the row set of a detailed table after a scroll from
    /// `prev_scroll_pos`, keeping rows that were already in view.
    pub(crate) fn rescroll_table(&mut self, mut node: VisualElement, prev_scroll_pos: f64) -> Result<()> {
        let store = self.store;
        let id = node.display_item.id();
        let table = store
            .get(id)
            .and_then(|item| item.as_table())
            .ok_or(ArrangeError::ItemNotFound(id))?;
        let block = node.block_size_px.unwrap_or_else(|| self.natural_block());
        let body_bl = blocks(node.bounds_px.h, block.h) - self.table_header_height_bl(table);

        let rows = self.table_rows(id, &node.path);
        let previous = visible_row_range(prev_scroll_pos, body_bl, rows.len());
        let scroll_pos = self.scroll.table_scroll_y_pos(node.actual_veid());
        let range = visible_row_range(scroll_pos, body_bl, rows.len());

        let (children, row_indexes) = self.arrange_table_rows(table, &node, &rows, range, Some(previous))?;
        node.children = children;
        node.table_ves_rows = row_indexes;
        if let Some(child_area) = node.child_area_bounds_px.as_mut() {
            child_area.h = rows.len() as f64 * block.h;
        }
        self.insert_node(node)?;
        Ok(())
    }

    fn table_header_height_bl(&self, table: &TableItem) -> f64 {
        let col_header = if table.show_col_header {
            self.config.table_col_header_height_bl
        } else {
            0.0
        };
        self.config.table_title_header_height_bl + col_header
    }

    /// Arrange rows in `range`. Rows also in `keep` that are already cached at
    /// the same index are kept as they are.
    fn arrange_table_rows(
        &mut self,
        table: &TableItem,
        node: &VisualElement,
        rows: &[TableRow<'_>],
        range: Range<usize>,
        keep: Option<Range<usize>>,
    ) -> Result<(Vec<VePath>, Vec<usize>)> {
        let store = self.store;
        let block = node.block_size_px.unwrap_or_else(|| self.natural_block());
        let width_bl = blocks(node.bounds_px.w, block.w);
        let columns = Columns::new(table, width_bl, self.config.grid_size);
        let row_width_bl = match columns.spans.as_slice() {
            [] | [_] => width_bl,
            [(start, end), ..] => end - start,
        };
        let parent_is_popup = node.arrange_flags.contains(ArrangeFlags::PARENT_IS_POPUP);

        let mut children = Vec::with_capacity(range.len());
        let mut row_indexes = Vec::with_capacity(range.len());
        for index in range {
            let row = rows[index];
            let row_path = node.path.child(veid_for(store, row.item));
            let reusable = keep.as_ref().is_some_and(|keep| keep.contains(&index))
                && self.cache.get(&row_path).is_some_and(|cached| cached.row == Some(index));
            if reusable {
                self.cache.touch_subtree(&row_path)?;
            } else {
                let expandable = store.resolve(row.item).display.is_container();
                let geometry = calc_geometry_list_item(
                    block,
                    index,
                    row.depth,
                    (row_width_bl - row.depth as f64).max(1.0),
                    0.0,
                    parent_is_popup,
                    expandable,
                );
                let placement = Placement::new(
                    geometry,
                    ArrangeFlags::NONE,
                    VisualElementFlags::LINE_ITEM | VisualElementFlags::INSIDE_TABLE,
                )
                .at_row(index);
                let actual_link = store.resolve(row.item).link;
                let mut row_node = self.build_node(row.item, actual_link, &node.path, placement)?;
                row_node.attachments = self.arrange_row_attachments(&row_node, &columns, block, index)?;
                self.insert_node(row_node)?;
            }
            children.push(row_path);
            row_indexes.push(index);
        }
        Ok((children, row_indexes))
    }

    /// Attachments of a row fill the columns after the first
    fn arrange_row_attachments(
        &mut self,
        row_node: &VisualElement,
        columns: &Columns,
        block: Dimensions,
        index: usize,
    ) -> Result<Vec<VePath>> {
        let store = self.store;
        let mut paths = Vec::new();
        for (j, attachment) in store.attachments_of(row_node.display_item.id()).enumerate() {
            let Some(&(start, end)) = columns.spans.get(j + 1) else {
                break;
            };
            let bounds = BoundingBox::new(
                start * block.w - row_node.bounds_px.x,
                0.0,
                (end - start) * block.w,
                block.h,
            );
            let inner = bounds.zero_top_left();
            let geometry = ItemGeometry {
                bounds_px: bounds,
                viewport_bounds_px: None,
                block_size_px: block,
                hitboxes: vec![
                    Hitbox::new(HitboxFlags::CLICK, inner),
                    Hitbox::new(HitboxFlags::MOVE, inner),
                ],
            };
            let placement = Placement::new(
                geometry,
                ArrangeFlags::NONE,
                VisualElementFlags::INSIDE_TABLE | VisualElementFlags::ATTACHMENT,
            )
            .at_row(index);
            paths.push(self.arrange_item(attachment, &row_node.path, placement)?);
        }
        Ok(paths)
    }

    /// Hitboxes of a detailed table. The resize corner is always last.
    fn table_hitboxes(
        &self,
        table: &TableItem,
        node: &VisualElement,
        size_bl: Dimensions,
        block: Dimensions,
    ) -> Vec<Hitbox> {
        let config = self.config;
        let inner = node.bounds_px.zero_top_left();
        let title_h = config.table_title_header_height_bl * block.h;
        let col_header_h = if table.show_col_header {
            config.table_col_header_height_bl * block.h
        } else {
            0.0
        };
        let columns = Columns::new(table, size_bl.w, config.grid_size);

        let mut hitboxes = vec![
            Hitbox::new(HitboxFlags::MOVE, inner),
            Hitbox::new(HitboxFlags::ATTACH, attach_box(config, &inner)),
        ];
        if node.arrange_flags.contains(ArrangeFlags::INSIDE_COMPOSITE_OR_DOC) {
            let margin = config.composite_move_out_margin_px;
            hitboxes.push(Hitbox::new(
                HitboxFlags::MOVE,
                BoundingBox::new(
                    inner.w - config.composite_move_out_width_px - margin,
                    margin,
                    config.composite_move_out_width_px,
                    inner.h - margin,
                ),
            ));
        }
        if table.show_col_header {
            for (col, &(start, end)) in columns.spans.iter().enumerate() {
                hitboxes.push(Hitbox::with_meta(
                    HitboxFlags::CLICK,
                    BoundingBox::new(start * block.w, title_h, (end - start) * block.w, col_header_h),
                    HitboxMeta::column_span(col, start, end),
                ));
            }
        }
        hitboxes.push(Hitbox::new(HitboxFlags::CLICK, BoundingBox::new(0.0, 0.0, inner.w, title_h)));

        let last = columns.spans.len().saturating_sub(1);
        for (col, &(_, end)) in columns.spans.iter().enumerate().take(last) {
            if end >= size_bl.w {
                break;
            }
            hitboxes.push(Hitbox::with_meta(
                HitboxFlags::COL_RESIZE,
                BoundingBox::new(
                    end * block.w - config.col_resize_width_px / 2.0,
                    title_h,
                    config.col_resize_width_px,
                    inner.h - title_h,
                ),
                HitboxMeta::column(col),
            ));
        }
        hitboxes.push(Hitbox::new(HitboxFlags::RESIZE, resize_box(config, &inner)));
        hitboxes
    }
}
