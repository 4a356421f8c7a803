//! Justified rows
//!
//! Children keep their natural aspect and are packed into rows whose height
//! stays near a target. Each complete row is scaled so it spans the page
//! width exactly; a last row too short to fill the width keeps the target
//! height and sits at the left.

use super::item::{veid_for, Placement};
use super::page::PageContent;
use super::Arranger;
use crate::{calc_geometry_in_cell, ArrangeConfig, ArrangeFlags, Result, VisualElement, VisualElementFlags};
use item_model::{calc_spatial_dimensions_bl, BoundingBox, Item, PageItem};

/// Inputs to [`justified_layout`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JustifyOptions {
    pub container_width: f64,
    /// Around the outside of all rows
    pub padding: f64,
    /// Between boxes in a row, and between rows
    pub spacing: f64,
    pub target_row_height: f64,
    /// How far, as a fraction of the target, a row's height may stray
    pub row_height_tolerance: f64,
    /// Smallest and largest row height, as multiples of the target
    pub row_height_range: (f64, f64),
}

impl JustifyOptions {
    /// Options for a page `width_px` wide whose rows aim for a height of
    /// `width_px / row_aspect`. Padding and spacing scale with the row height.
    pub fn for_width(config: &ArrangeConfig, width_px: f64, row_aspect: f64) -> Self {
        let row_aspect = if row_aspect > 0.0 { row_aspect } else { 1.0 };
        let target_row_height = width_px / row_aspect;
        Self {
            container_width: width_px,
            padding: config.justified_padding_per_row_height * target_row_height,
            spacing: config.justified_spacing_per_row_height * target_row_height,
            target_row_height,
            row_height_tolerance: config.justified_row_height_tolerance,
            row_height_range: config.justified_row_height_range,
        }
    }
}

/// Boxes produced by [`justified_layout`], one per input aspect and in the
/// same order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JustifiedLayout {
    pub boxes: Vec<BoundingBox>,
    pub container_height: f64,
}

/// A row being filled
struct Row {
    top: f64,
    aspects: Vec<f64>,
}

impl Row {
    fn new(top: f64) -> Self {
        Self { top, aspects: Vec::new() }
    }

    fn aspect_sum(&self) -> f64 {
        self.aspects.iter().sum()
    }
}

/// Pack boxes of the given width over height `aspects` into justified rows
pub fn justified_layout(aspects: &[f64], options: &JustifyOptions) -> JustifiedLayout {
    let target = options.target_row_height;
    let spacing = options.spacing;
    let row_width = (options.container_width - options.padding * 2.0).max(0.0);
    let min_aspect = row_width / target * (1.0 - options.row_height_tolerance);
    let max_aspect = row_width / target * (1.0 + options.row_height_tolerance);
    let (min_scale, max_scale) = options.row_height_range;
    let width_without_spacing = |count: usize| row_width - count.saturating_sub(1) as f64 * spacing;

    let mut layout = JustifiedLayout::default();
    let mut top = options.padding;
    let mut row = Row::new(top);

    let mut close_row = |row: &mut Row, height: f64, layout: &mut JustifiedLayout| {
        // rows far off the target are not stretched to the edge
        let clamped = height.clamp(target * min_scale, target * max_scale.max(min_scale));
        let mut left = options.padding;
        for aspect in &row.aspects {
            let width = aspect * clamped;
            layout.boxes.push(BoundingBox::new(left, row.top, width, clamped));
            left += width + spacing;
        }
        top = row.top + clamped + spacing;
        *row = Row::new(top);
    };

    for &aspect in aspects {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let previous_sum = row.aspect_sum();
        let new_sum = previous_sum + aspect;
        let count = row.aspects.len() + 1;

        if new_sum < min_aspect {
            row.aspects.push(aspect);
            continue;
        }
        if new_sum > max_aspect && !row.aspects.is_empty() {
            let new_miss = (new_sum - width_without_spacing(count) / target).abs();
            let previous_miss = (previous_sum - width_without_spacing(count - 1) / target).abs();
            if new_miss > previous_miss {
                // the row is closer to its target without this box
                let height = width_without_spacing(count - 1) / previous_sum;
                close_row(&mut row, height, &mut layout);
                row.aspects.push(aspect);
                if aspect >= min_aspect {
                    let height = width_without_spacing(1) / aspect;
                    close_row(&mut row, height, &mut layout);
                }
                continue;
            }
        }
        row.aspects.push(aspect);
        let height = width_without_spacing(count) / new_sum;
        close_row(&mut row, height, &mut layout);
    }

    if !row.aspects.is_empty() {
        close_row(&mut row, target, &mut layout);
    }

    layout.container_height = if layout.boxes.is_empty() {
        options.padding * 2.0
    } else {
        top - spacing + options.padding
    };
    layout
}

impl Arranger<'_> {
    pub(crate) fn arrange_justified_page(&mut self, page: &PageItem, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let viewport = node.viewport_bounds_px.unwrap_or(node.bounds_px);
        let top_root = node.arrange_flags.contains(ArrangeFlags::TOP_ROOT);
        let parent_is_popup = node.arrange_flags.contains(ArrangeFlags::POPUP_ROOT);
        let parent_full = node.arrange_flags.is_root() || page.interactive;
        let params = self.config.measure_params();

        // on the top level page a dragged item follows the cursor and leaves
        // the rows, anywhere else it keeps a place at the end
        let mut flowed: Vec<&Item> = Vec::new();
        let mut dragged: Option<&Item> = None;
        let mut flowed_moving: Option<&Item> = None;
        for child in store.children_of(node.display_item.id()) {
            let moving = self.is_moving(&node.path.child(veid_for(store, child)));
            match moving {
                true if top_root && dragged.is_none() => dragged = Some(child),
                true if flowed_moving.is_none() => flowed_moving = Some(child),
                _ => flowed.push(child),
            }
        }
        flowed.extend(flowed_moving);

        let aspects: Vec<f64> = flowed
            .iter()
            .map(|child| calc_spatial_dimensions_bl(store, child, &params).aspect())
            .collect();
        let layout = justified_layout(
            &aspects,
            &JustifyOptions::for_width(self.config, viewport.w, page.justified_row_aspect),
        );
        let child_area = BoundingBox::new(
            viewport.x,
            viewport.y,
            viewport.w,
            layout.container_height.max(viewport.h),
        );

        let mut children = Vec::with_capacity(flowed.len() + 1);
        for (child, cell) in flowed.iter().zip(&layout.boxes) {
            let geometry = calc_geometry_in_cell(self.config, store, child, *cell);
            let mut arrange_flags = self.child_arrange_flags(child, &geometry, parent_full, false, parent_is_popup);
            if flowed_moving.is_some_and(|moving| moving.id() == child.id()) {
                arrange_flags |= ArrangeFlags::MOVING;
            }
            let placement = Placement::new(geometry, arrange_flags, VisualElementFlags::NONE);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        if let (Some(child), Some(state)) = (dragged, self.ui.moving()) {
            let size_bl = calc_spatial_dimensions_bl(store, child, &params);
            let scale = node.bounds_px.w / self.desktop_px.w.max(1.0);
            let block = self.config.natural_block_size_px * scale;
            let (w, h) = (size_bl.w * block, size_bl.h * block);
            let scroll_y = self.scroll.scroll_y_prop(node.actual_veid()) * (child_area.h - viewport.h).max(0.0);
            let cursor = state.cursor_desktop_px.sub(viewport.top_left());
            let cell = BoundingBox::new(
                cursor.x - state.click_offset_prop.x * w,
                cursor.y + scroll_y - state.click_offset_prop.y * h,
                w,
                h,
            );
            let geometry = calc_geometry_in_cell(self.config, store, child, cell);
            let arrange_flags =
                self.child_arrange_flags(child, &geometry, parent_full, false, parent_is_popup) | ArrangeFlags::MOVING;
            let placement = Placement::new(geometry, arrange_flags, VisualElementFlags::NONE);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        Ok(PageContent::new(child_area, children))
    }
}
