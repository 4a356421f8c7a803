//! The popup shown over the top level page

use super::item::Placement;
use super::Arranger;
use crate::{popup_hitboxes, ArrangeFlags, ItemGeometry, PopupKind, PopupSpec, Result, VePath, VisualElement, VisualElementFlags};
use item_model::{
    calc_inner_spatial_dimensions_bl, calc_spatial_dimensions_bl, ArrangeAlgorithm, BoundingBox, Dimensions, Item,
    ItemKind, LinkItem, PageItem, Vector, POPUP_LINK_ID,
};

fn centered(center: Vector, size: Dimensions) -> BoundingBox {
    BoundingBox::new(center.x - size.w / 2.0, center.y - size.h / 2.0, size.w, size.h)
}

/// Width over height of what a popup shows
fn display_aspect(display: &Item, size_bl: Dimensions) -> f64 {
    match &display.kind {
        ItemKind::Page(page) => page.natural_aspect,
        ItemKind::Image(image) if image.image_size_px.h > 0.0 => image.image_size_px.aspect(),
        _ => size_bl.aspect(),
    }
}

impl Arranger<'_> {
    /// Arrange the popup described by `spec` over the top level page `node`,
    /// whose child area must already be set.
    pub(crate) fn arrange_popup(
        &mut self,
        page: &PageItem,
        algorithm: ArrangeAlgorithm,
        node: &VisualElement,
        spec: &PopupSpec,
    ) -> Result<Option<VePath>> {
        let store = self.store;
        let config = self.config;
        let Some(target) = store.get(spec.veid.item_id) else {
            tracing::warn!(popup = %spec.veid, "popup item not in store");
            return Ok(None);
        };
        let actual_link = spec.veid.link_id.and_then(|id| store.get(id));
        let child_area = node.child_area_bounds_px.unwrap_or(node.bounds_px);
        let size_bl = calc_spatial_dimensions_bl(store, actual_link.unwrap_or(target), &config.measure_params());
        let aspect = display_aspect(target, size_bl);

        let synthetic = Item::with_id(
            POPUP_LINK_ID,
            ItemKind::Link(LinkItem {
                link_to: target.id(),
                spatial_width_gr: target.spatial_width_gr().unwrap_or(0.0),
                spatial_height_gr: target.spatial_height_gr().unwrap_or(0.0),
            }),
        );

        let mut flags = VisualElementFlags::POPUP;
        let bounds = match spec.kind {
            PopupKind::Attachment => {
                let block = config.natural_block_size_px;
                let size = Dimensions::new(size_bl.w * block, size_bl.h * block);
                let source = spec.source_position_px.unwrap_or_else(|| child_area.zero_top_left().center());
                let mut bounds = centered(source, size);
                bounds.x = bounds.x.min(child_area.w - size.w - block).max(block);
                bounds.y = bounds.y.min(child_area.h - size.h - block).max(block);
                bounds
            }
            PopupKind::Page | PopupKind::Image if algorithm == ArrangeAlgorithm::SpatialStretch => {
                let gs = config.grid_size;
                let inner_bl = calc_inner_spatial_dimensions_bl(page, &config.measure_params());
                let px_per_gr = Dimensions::new(child_area.w / (inner_bl.w * gs), child_area.h / (inner_bl.h * gs));
                let width_gr = page.popup_width_gr;
                let height_gr = (width_gr / aspect / gs / 2.0).round() * 2.0 * gs;
                let center = Vector::new(
                    page.popup_position_gr.x * px_per_gr.w,
                    page.popup_position_gr.y * px_per_gr.h,
                );
                centered(center, Dimensions::new(width_gr * px_per_gr.w, height_gr * px_per_gr.h))
            }
            PopupKind::Page | PopupKind::Image => {
                let main = self.main_area_px;
                let width = main.w * page.cell_popup_width_norm;
                let center = Vector::new(
                    page.cell_popup_position_norm.x * main.w,
                    page.cell_popup_position_norm.y * main.h,
                );
                flags |= VisualElementFlags::FIXED;
                centered(center, Dimensions::new(width, width / aspect))
            }
        };

        let is_page = target.is_page() && spec.kind != PopupKind::Image;
        let block = Dimensions::new(bounds.w / size_bl.w, bounds.h / size_bl.h);
        let geometry = ItemGeometry {
            bounds_px: bounds,
            viewport_bounds_px: Some(bounds),
            block_size_px: block,
            hitboxes: popup_hitboxes(config, bounds.size()),
        };
        let arrange_flags = if is_page {
            ArrangeFlags::POPUP_ROOT
        } else {
            ArrangeFlags::RENDER_CHILDREN_AS_FULL
        };
        let placement = Placement::new(geometry, arrange_flags, flags);
        self.arrange_linked(&synthetic, actual_link, &node.path, placement).map(Some)
    }
}
