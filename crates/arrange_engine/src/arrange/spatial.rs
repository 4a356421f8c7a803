//! Free placement by grid unit position

use super::item::{veid_for, Placement};
use super::page::PageContent;
use super::Arranger;
use crate::{calc_geometry_spatial, ArrangeFlags, Result, VisualElement, VisualElementFlags};
use item_model::{calc_inner_spatial_dimensions_bl, ArrangeAlgorithm, BoundingBox, Dimensions, Item, PageItem};

impl Arranger<'_> {
    pub(crate) fn arrange_spatial_page(&mut self, page: &PageItem, node: &VisualElement) -> Result<PageContent> {
        let store = self.store;
        let inner_bl = calc_inner_spatial_dimensions_bl(page, &self.config.measure_params());
        let viewport = node.viewport_bounds_px.unwrap_or(node.bounds_px);
        let is_root = node.arrange_flags.is_root();

        let size = if is_root {
            self.spatial_child_area_size(inner_bl, viewport.size())
        } else {
            node.bounds_px.size()
        };
        let child_area = BoundingBox::new(viewport.x, viewport.y, size.w, size.h);

        let mut children = Vec::new();
        for child in store.children_of(node.display_item.id()) {
            let placement = self.spatial_child_placement(page, node, child, child_area);
            children.push(self.arrange_item(child, &node.path, placement)?);
        }
        Ok(PageContent::new(child_area, children))
    }

    /// Placement of one child of the spatial page `node`, whose child area is
    /// `child_area`
    pub(crate) fn spatial_child_placement(
        &self,
        page: &PageItem,
        node: &VisualElement,
        child: &Item,
        child_area: BoundingBox,
    ) -> Placement {
        let store = self.store;
        let inner_bl = calc_inner_spatial_dimensions_bl(page, &self.config.measure_params());
        let parent_is_popup = node.arrange_flags.contains(ArrangeFlags::POPUP_ROOT);
        let parent_full = node.arrange_flags.is_root() || page.interactive;

        let geometry = calc_geometry_spatial(
            self.config,
            store,
            child,
            child_area.zero_top_left(),
            inner_bl,
            parent_is_popup,
        );
        let mut arrange_flags = self.child_arrange_flags(child, &geometry, parent_full, true, parent_is_popup);
        if self.is_moving(&node.path.child(veid_for(store, child))) {
            arrange_flags |= ArrangeFlags::MOVING;
        }
        Placement::new(geometry, arrange_flags, VisualElementFlags::NONE)
    }

    /// The page item of `node` when its children are placed freely, each
    /// independent of its siblings
    pub(crate) fn spatial_page_of(&self, node: &VisualElement) -> Option<&'_ PageItem> {
        if !node.is_positioning_page() || node.arrange_flags.contains(ArrangeFlags::DOCK_ROOT) {
            return None;
        }
        let page = self.store.get(node.display_item.id())?.as_page()?;
        let algorithm = match self.algorithm_override {
            Some(algorithm) if node.arrange_flags.contains(ArrangeFlags::TOP_ROOT) => algorithm,
            _ => page.arrange_algorithm,
        };
        let spatial = node.flags.contains(VisualElementFlags::FLIP_CARD_PAGE)
            || algorithm == ArrangeAlgorithm::SpatialStretch;
        spatial.then_some(page)
    }

    /// Size of a root page's child area. A page much wider than its viewport
    /// keeps the viewport height and scrolls sideways, one much taller keeps
    /// the width and scrolls down, anything else is stretched to fit.
    fn spatial_child_area_size(&self, inner_bl: Dimensions, viewport: Dimensions) -> Dimensions {
        if viewport.w <= 0.0 || viewport.h <= 0.0 {
            return viewport;
        }
        let page_aspect = inner_bl.w / inner_bl.h;
        let ratio = page_aspect / (viewport.w / viewport.h);
        if ratio > self.config.spatial_scroll_wide_aspect_cutoff {
            Dimensions::new((viewport.h * page_aspect).round(), viewport.h)
        } else if ratio < self.config.spatial_scroll_tall_aspect_cutoff {
            Dimensions::new(viewport.w, (viewport.w / page_aspect).round())
        } else {
            viewport
        }
    }
}
