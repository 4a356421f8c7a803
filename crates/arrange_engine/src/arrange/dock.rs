//! The dock: a page pinned down the left of the desktop whose children are
//! stacked as tiles.

use super::item::Placement;
use super::page::PageContent;
use super::Arranger;
use crate::{calc_geometry_in_cell, ArrangeFlags, DockSpec, ItemGeometry, Result, VePath, VisualElement, VisualElementFlags};
use item_model::{calc_spatial_dimensions_bl, BoundingBox};

impl Arranger<'_> {
    pub(crate) fn arrange_dock(&mut self, spec: DockSpec, umbrella_path: &VePath) -> Result<Option<VePath>> {
        let Some(dock_page) = self.store.get(spec.page_id) else {
            return Ok(None);
        };
        if !dock_page.is_page() {
            tracing::warn!(item = %spec.page_id, "dock item is not a page");
            return Ok(None);
        }
        let bounds = BoundingBox::new(0.0, 0.0, self.main_area_px.x, self.desktop_px.h);
        let placement = Placement::new(
            ItemGeometry::root(bounds, self.natural_block()),
            ArrangeFlags::DOCK_ROOT,
            VisualElementFlags::NONE,
        );
        self.arrange_item(dock_page, umbrella_path, placement).map(Some)
    }

    pub(crate) fn arrange_dock_page(&mut self, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let config = self.config;
        let gap = config.dock_gap_px;
        let width = node.bounds_px.w;
        let tile_w = (width - gap * 2.0).max(0.0);

        let mut top = gap;
        let mut children = Vec::new();
        for child in store.children_of(node.display_item.id()) {
            let size_bl = calc_spatial_dimensions_bl(store, child, &config.measure_params());
            let tile_h = tile_w * size_bl.h / size_bl.w;
            let geometry = calc_geometry_in_cell(config, store, child, BoundingBox::new(gap, top, tile_w, tile_h));
            top += tile_h + gap;
            let placement = Placement::new(geometry, ArrangeFlags::RENDER_AS_OUTLINE, VisualElementFlags::DOCK_ITEM);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }

        let child_area = BoundingBox::new(node.bounds_px.x, node.bounds_px.y, width, top.max(node.bounds_px.h));
        Ok(PageContent::new(child_area, children))
    }
}
