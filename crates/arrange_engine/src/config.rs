//! Arrangement configuration
//!
//! Every tunable constant used by the arrangers lives here so tests and hosts
//! can adjust them in one place.

use crate::Result;
use item_model::{MeasureParams, Vector, COMPOSITE_ITEM_GAP_BL, GRID_SIZE};
use serde::{Deserialize, Serialize};

/// Layout of the year grid drawn behind a calendar page, in pixels unless
/// noted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarGridMetrics {
    pub month_columns: u32,
    pub day_rows: u32,
    pub title_height_px: f64,
    pub month_title_height_px: f64,
    pub title_to_month_spacing_px: f64,
    pub day_row_top_padding_px: f64,
    pub bottom_margin_px: f64,
    pub month_spacing_px: f64,
    pub side_margin_px: f64,
}

impl Default for CalendarGridMetrics {
    fn default() -> Self {
        Self {
            month_columns: 12,
            day_rows: 31,
            title_height_px: 40.0,
            month_title_height_px: 30.0,
            title_to_month_spacing_px: 14.0,
            day_row_top_padding_px: 7.0,
            bottom_margin_px: 5.0,
            month_spacing_px: 5.0,
            side_margin_px: 5.0,
        }
    }
}

impl CalendarGridMetrics {
    /// Top of the first day row
    pub fn days_top_px(&self) -> f64 {
        self.title_height_px + self.title_to_month_spacing_px + self.month_title_height_px + self.day_row_top_padding_px
    }
}

/// Tunable constants for arrangement, in pixels unless noted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArrangeConfig {
    /// Grid units per block
    pub grid_size: f64,
    pub line_height_px: f64,
    /// Size of one block at natural scale
    pub natural_block_size_px: f64,
    pub resize_box_size_px: f64,
    pub attach_area_size_px: f64,
    pub list_page_top_padding_px: f64,
    pub document_top_margin_px: f64,
    /// In blocks
    pub document_left_margin_bl: f64,
    /// In blocks
    pub composite_item_gap_bl: f64,
    pub composite_move_out_width_px: f64,
    pub composite_move_out_margin_px: f64,
    pub dock_gap_px: f64,
    /// Narrowest embedded page, in blocks, whose children are drawn
    pub child_items_visible_width_bl: f64,
    /// In blocks
    pub table_title_header_height_bl: f64,
    /// In blocks
    pub table_col_header_height_bl: f64,
    /// A page wider than the viewport by this ratio scrolls horizontally
    pub spatial_scroll_wide_aspect_cutoff: f64,
    /// A page narrower than the viewport by this ratio scrolls vertically
    pub spatial_scroll_tall_aspect_cutoff: f64,
    /// Proportion of a grid cell's width left as margin on each side
    pub grid_cell_margin_prop: f64,
    /// Attachment size as a proportion of the parent's block size
    pub attachment_scale: f64,
    /// Fallback cell popup center, as a proportion of the desktop
    pub cell_popup_position_norm: Vector,
    /// Fallback cell popup width, as a proportion of the desktop width
    pub cell_popup_width_norm: f64,
    pub calendar_header_height_px: f64,
    pub calendar_grid: CalendarGridMetrics,
    pub col_resize_width_px: f64,
    /// The selected item of a list page is not drawn below this size
    pub min_selected_size_px: f64,
    /// Deepest nesting of expanded rows in a table
    pub table_max_row_depth: usize,
    /// Padding around justified rows, per pixel of target row height
    pub justified_padding_per_row_height: f64,
    /// Spacing between justified boxes, per pixel of target row height
    pub justified_spacing_per_row_height: f64,
    /// How far, as a fraction of the target, a justified row's height may stray
    pub justified_row_height_tolerance: f64,
    /// Smallest and largest justified row height, as multiples of the target
    pub justified_row_height_range: (f64, f64),
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            line_height_px: 24.0,
            natural_block_size_px: 24.0,
            resize_box_size_px: 8.0,
            attach_area_size_px: 10.0,
            list_page_top_padding_px: 12.0,
            document_top_margin_px: 20.0,
            document_left_margin_bl: 2.0,
            composite_item_gap_bl: COMPOSITE_ITEM_GAP_BL,
            composite_move_out_width_px: 16.0,
            composite_move_out_margin_px: 4.0,
            dock_gap_px: 12.0,
            child_items_visible_width_bl: 6.0,
            table_title_header_height_bl: 1.0,
            table_col_header_height_bl: 1.0,
            spatial_scroll_wide_aspect_cutoff: 1.3,
            spatial_scroll_tall_aspect_cutoff: 0.7,
            grid_cell_margin_prop: 0.01,
            attachment_scale: 0.8,
            cell_popup_position_norm: Vector::new(0.5, 0.5),
            cell_popup_width_norm: 0.6,
            calendar_header_height_px: 84.0,
            calendar_grid: CalendarGridMetrics::default(),
            col_resize_width_px: 8.0,
            min_selected_size_px: 12.0,
            table_max_row_depth: 8,
            justified_padding_per_row_height: 10.0 / 200.0,
            justified_spacing_per_row_height: 5.0 / 200.0,
            justified_row_height_tolerance: 0.25,
            justified_row_height_range: (0.5, 2.0),
        }
    }
}

impl ArrangeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_line_height(mut self, line_height_px: f64) -> Self {
        self.line_height_px = line_height_px;
        self
    }

    pub fn with_natural_block_size(mut self, block_size_px: f64) -> Self {
        self.natural_block_size_px = block_size_px;
        self
    }

    pub fn with_list_page_top_padding(mut self, padding_px: f64) -> Self {
        self.list_page_top_padding_px = padding_px;
        self
    }

    pub fn with_calendar_header_height(mut self, height_px: f64) -> Self {
        self.calendar_header_height_px = height_px;
        self
    }

    pub fn with_child_items_visible_width(mut self, width_bl: f64) -> Self {
        self.child_items_visible_width_bl = width_bl;
        self
    }

    /// Unit conversions handed to item measurement
    pub fn measure_params(&self) -> MeasureParams {
        MeasureParams {
            grid_size: self.grid_size,
            composite_item_gap_bl: self.composite_item_gap_bl,
        }
    }
}
