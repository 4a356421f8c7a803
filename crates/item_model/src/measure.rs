//! Spatial measurement of items in block units
//!
//! One block is `grid_size` grid units. Every size the arranger derives, for a
//! container's inner box or a child's outer box, goes through these functions
//! so the two never disagree.

use crate::{Dimensions, Item, ItemKind, ItemStore, PageItem};

/// Grid units per block
pub const GRID_SIZE: f64 = 60.0;

/// Vertical gap between composite children, in blocks
pub const COMPOSITE_ITEM_GAP_BL: f64 = 0.5;

/// Unit conversion parameters shared by measurement and arrangement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureParams {
    pub grid_size: f64,
    pub composite_item_gap_bl: f64,
}

impl Default for MeasureParams {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            composite_item_gap_bl: COMPOSITE_ITEM_GAP_BL,
        }
    }
}

/// Size overrides applied when an item is measured through a link or as a
/// composite member
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeOverride {
    pub width_gr: Option<f64>,
    pub height_gr: Option<f64>,
}

/// Outer size of an item in blocks. A link is measured as its target with the
/// link's width and height overrides.
pub fn calc_spatial_dimensions_bl(store: &ItemStore, item: &Item, params: &MeasureParams) -> Dimensions {
    if let ItemKind::Link(link) = &item.kind {
        return match store.get(link.link_to) {
            Some(target) => {
                let overrides = SizeOverride {
                    width_gr: target.spatial_width_gr().map(|_| link.spatial_width_gr),
                    height_gr: target.spatial_height_gr().map(|_| link.spatial_height_gr),
                };
                calc_dimensions_with_override(store, target, overrides, params)
            }
            None => Dimensions::new((link.spatial_width_gr / params.grid_size).max(1.0), 1.0),
        };
    }
    calc_dimensions_with_override(store, item, SizeOverride::default(), params)
}

/// Outer size of a display item, with optional width and height overrides in
/// grid units.
pub fn calc_dimensions_with_override(
    store: &ItemStore,
    item: &Item,
    overrides: SizeOverride,
    params: &MeasureParams,
) -> Dimensions {
    let gs = params.grid_size;
    let width_bl = |declared: f64| overrides.width_gr.unwrap_or(declared) / gs;
    match &item.kind {
        ItemKind::Page(page) => aspect_dimensions(width_bl(page.spatial_width_gr), page.natural_aspect),
        ItemKind::FlipCard(card) => aspect_dimensions(width_bl(card.spatial_width_gr), card.natural_aspect),
        ItemKind::Table(table) => Dimensions::new(
            width_bl(table.spatial_width_gr),
            overrides.height_gr.unwrap_or(table.spatial_height_gr) / gs,
        ),
        ItemKind::Image(image) => {
            let w = width_bl(image.spatial_width_gr);
            let h = if image.image_size_px.w > 0.0 {
                w * image.image_size_px.h / image.image_size_px.w
            } else {
                w
            };
            Dimensions::new(w, h)
        }
        ItemKind::Note(note) => {
            let w = width_bl(note.spatial_width_gr);
            let h = match overrides.height_gr.or(note.spatial_height_gr) {
                Some(h_gr) => h_gr / gs,
                None => note.title.lines().count().max(1) as f64,
            };
            Dimensions::new(w, h)
        }
        ItemKind::Composite(composite) => {
            let w_gr = overrides.width_gr.unwrap_or(composite.spatial_width_gr);
            let mut h = 0.0;
            for child in store.children_of(item.id()) {
                let child_override = SizeOverride {
                    width_gr: Some(w_gr),
                    height_gr: None,
                };
                let display = store.resolve(child).display;
                let child_dims = if display.spatial_width_gr().is_some() {
                    calc_dimensions_with_override(store, display, child_override, params)
                } else {
                    calc_spatial_dimensions_bl(store, child, params)
                };
                h += child_dims.h + params.composite_item_gap_bl;
            }
            if h > 0.0 {
                h -= params.composite_item_gap_bl;
            }
            let h = ((h * 2.0).ceil() / 2.0).max(0.5);
            Dimensions::new(w_gr / gs, h)
        }
        ItemKind::File(f) => Dimensions::new(width_bl(f.spatial_width_gr), 1.0),
        ItemKind::Password(p) => Dimensions::new(width_bl(p.spatial_width_gr), 1.0),
        ItemKind::Expression(e) => Dimensions::new(width_bl(e.spatial_width_gr), 1.0),
        ItemKind::Link(link) => Dimensions::new(width_bl(link.spatial_width_gr), 1.0),
        ItemKind::Rating(_) | ItemKind::Placeholder(_) | ItemKind::Unknown(_) => Dimensions::new(1.0, 1.0),
    }
}

/// Size of a page's inner coordinate space in blocks
pub fn calc_inner_spatial_dimensions_bl(page: &PageItem, params: &MeasureParams) -> Dimensions {
    let w = page.inner_spatial_width_gr / params.grid_size;
    Dimensions::new(w, (w / page.natural_aspect).floor())
}

fn aspect_dimensions(w: f64, aspect: f64) -> Dimensions {
    let h = ((w / aspect) * 2.0).round() / 2.0;
    Dimensions::new(w, h.max(0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompositeItem, ImageItem, LinkItem, NoteItem, TableItem};

    fn params() -> MeasureParams {
        MeasureParams::default()
    }

    #[test]
    fn test_page_height_rounds_to_half_blocks() {
        let store = ItemStore::new();
        let page = Item::new(ItemKind::Page(PageItem {
            spatial_width_gr: 10.0 * 60.0,
            natural_aspect: 3.0,
            ..Default::default()
        }));
        let dims = calc_spatial_dimensions_bl(&store, &page, &params());
        assert_eq!(dims, Dimensions::new(10.0, 3.5));
    }

    #[test]
    fn test_inner_dimensions_floor() {
        let page = PageItem {
            inner_spatial_width_gr: 50.0 * 60.0,
            natural_aspect: 1.5,
            ..Default::default()
        };
        assert_eq!(calc_inner_spatial_dimensions_bl(&page, &params()), Dimensions::new(50.0, 33.0));
    }

    #[test]
    fn test_note_line_count_and_explicit_height() {
        let store = ItemStore::new();
        let note = Item::new(ItemKind::Note(NoteItem {
            title: "one\ntwo\nthree".to_string(),
            ..Default::default()
        }));
        assert_eq!(calc_spatial_dimensions_bl(&store, &note, &params()).h, 3.0);

        let sized = Item::new(ItemKind::Note(NoteItem {
            spatial_height_gr: Some(150.0),
            ..Default::default()
        }));
        assert_eq!(calc_spatial_dimensions_bl(&store, &sized, &params()).h, 2.5);
    }

    #[test]
    fn test_image_keeps_pixel_aspect() {
        let store = ItemStore::new();
        let image = Item::new(ItemKind::Image(ImageItem {
            spatial_width_gr: 8.0 * 60.0,
            image_size_px: Dimensions::new(800.0, 200.0),
            ..Default::default()
        }));
        assert_eq!(calc_spatial_dimensions_bl(&store, &image, &params()), Dimensions::new(8.0, 2.0));
    }

    #[test]
    fn test_link_overrides_target_size() {
        let mut store = ItemStore::new();
        let table_id = store
            .insert_root(Item::new(ItemKind::Table(TableItem::default())))
            .unwrap();
        let link = Item::new(ItemKind::Link(LinkItem {
            link_to: table_id,
            spatial_width_gr: 3.0 * 60.0,
            spatial_height_gr: 2.0 * 60.0,
        }));
        assert_eq!(calc_spatial_dimensions_bl(&store, &link, &params()), Dimensions::new(3.0, 2.0));
    }

    #[test]
    fn test_composite_sums_children_with_gaps() {
        let mut store = ItemStore::new();
        let composite_id = store
            .insert_root(Item::new(ItemKind::Composite(CompositeItem::default())))
            .unwrap();
        for _ in 0..3 {
            store
                .add_child(composite_id, Item::new(ItemKind::Note(NoteItem::default())))
                .unwrap();
        }
        let composite = store.get(composite_id).unwrap();
        // three one-line notes and two half-block gaps
        assert_eq!(calc_spatial_dimensions_bl(&store, composite, &params()), Dimensions::new(6.0, 4.0));
    }

    #[test]
    fn test_empty_composite_has_minimum_height() {
        let store = ItemStore::new();
        let composite = Item::new(ItemKind::Composite(CompositeItem::default()));
        assert_eq!(calc_spatial_dimensions_bl(&store, &composite, &params()).h, 0.5);
    }
}
