//! Pixel geometry and hitboxes of a single item
//!
//! Each function places one item (or a link to one) in a particular context:
//! free on a spatial page, fitted to a grid cell, as a list row, stacked in a
//! composite, or hung off its parent as an attachment.

use crate::{ArrangeConfig, Hitbox, HitboxFlags};
use item_model::{
    calc_bounds_in_cell, calc_dimensions_with_override, calc_spatial_dimensions_bl, BoundingBox, Dimensions,
    Item, ItemKind, ItemStore, SizeOverride,
};

/// Where an item is drawn and how it can be hit
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGeometry {
    pub bounds_px: BoundingBox,
    pub viewport_bounds_px: Option<BoundingBox>,
    /// Pixels per block at which the item is drawn
    pub block_size_px: Dimensions,
    pub hitboxes: Vec<Hitbox>,
}

impl ItemGeometry {
    /// Geometry for a root region such as the desktop or a popup body
    pub fn root(bounds_px: BoundingBox, block_size_px: Dimensions) -> Self {
        Self {
            bounds_px,
            viewport_bounds_px: Some(bounds_px),
            block_size_px,
            hitboxes: Vec::new(),
        }
    }
}

fn display_kind<'a>(store: &'a ItemStore, item: &'a Item) -> &'a ItemKind {
    &store.resolve(item).display.kind
}

pub(crate) fn attach_box(config: &ArrangeConfig, inner: &BoundingBox) -> BoundingBox {
    BoundingBox::new(
        inner.w - config.attach_area_size_px + 2.0,
        0.0,
        config.attach_area_size_px,
        config.attach_area_size_px,
    )
}

pub(crate) fn resize_box(config: &ArrangeConfig, inner: &BoundingBox) -> BoundingBox {
    BoundingBox::new(
        inner.w - config.resize_box_size_px + 2.0,
        inner.h - config.resize_box_size_px + 2.0,
        config.resize_box_size_px,
        config.resize_box_size_px,
    )
}

/// Move strips along the four edges of a popup, then its resize corner
pub fn popup_hitboxes(config: &ArrangeConfig, size: Dimensions) -> Vec<Hitbox> {
    let inner = BoundingBox::new(0.0, 0.0, size.w, size.h);
    let edge = config.resize_box_size_px;
    vec![
        Hitbox::new(HitboxFlags::MOVE, BoundingBox::new(0.0, 0.0, edge, inner.h)),
        Hitbox::new(HitboxFlags::MOVE, BoundingBox::new(0.0, 0.0, inner.w, edge)),
        Hitbox::new(HitboxFlags::MOVE, BoundingBox::new(0.0, inner.h - edge, inner.w, edge)),
        Hitbox::new(HitboxFlags::MOVE, BoundingBox::new(inner.w - edge, 0.0, edge, inner.h)),
        Hitbox::new(HitboxFlags::RESIZE, resize_box(config, &inner)),
    ]
}

/// Hitboxes of an item placed freely on a spatial page
pub fn spatial_hitboxes(config: &ArrangeConfig, kind: &ItemKind, size: Dimensions, parent_is_popup: bool) -> Vec<Hitbox> {
    let inner = BoundingBox::new(0.0, 0.0, size.w, size.h);
    match kind {
        ItemKind::Page(_) | ItemKind::FlipCard(_) => {
            let open_popup = if parent_is_popup {
                inner
            } else {
                BoundingBox::new(inner.w / 3.0, inner.h / 3.0, inner.w / 3.0, inner.h / 3.0)
            };
            vec![
                Hitbox::new(HitboxFlags::MOVE, inner),
                Hitbox::new(HitboxFlags::CLICK, inner),
                Hitbox::new(HitboxFlags::OPEN_POPUP, open_popup),
                Hitbox::new(HitboxFlags::ATTACH, attach_box(config, &inner)),
                Hitbox::new(HitboxFlags::RESIZE, resize_box(config, &inner)),
            ]
        }
        ItemKind::Table(_) | ItemKind::Composite(_) => vec![
            Hitbox::new(HitboxFlags::MOVE, inner),
            Hitbox::new(HitboxFlags::ATTACH, attach_box(config, &inner)),
            Hitbox::new(HitboxFlags::RESIZE, resize_box(config, &inner)),
        ],
        ItemKind::Image(_) => vec![
            Hitbox::new(HitboxFlags::CLICK, inner),
            Hitbox::new(HitboxFlags::MOVE, inner),
            Hitbox::new(
                HitboxFlags::ATTACH,
                BoundingBox::new(0.0, 0.0, inner.w, config.attach_area_size_px),
            ),
            Hitbox::new(HitboxFlags::RESIZE, resize_box(config, &inner)),
        ],
        ItemKind::Note(_)
        | ItemKind::File(_)
        | ItemKind::Password(_)
        | ItemKind::Expression(_)
        | ItemKind::Link(_) => vec![
            Hitbox::new(HitboxFlags::CLICK, inner),
            Hitbox::new(HitboxFlags::MOVE, inner),
            Hitbox::new(HitboxFlags::ATTACH, attach_box(config, &inner)),
            Hitbox::new(HitboxFlags::RESIZE, resize_box(config, &inner)),
        ],
        ItemKind::Rating(_) => vec![
            Hitbox::new(HitboxFlags::CLICK, inner),
            Hitbox::new(HitboxFlags::MOVE, inner),
        ],
        ItemKind::Placeholder(_) | ItemKind::Unknown(_) => vec![Hitbox::new(HitboxFlags::MOVE, inner)],
    }
}

/// Place an item by its grid unit position inside a container whose inner
/// coordinate space is `container_inner_bl` blocks and whose pixel box is
/// `container_px`.
pub fn calc_geometry_spatial(
    config: &ArrangeConfig,
    store: &ItemStore,
    item: &Item,
    container_px: BoundingBox,
    container_inner_bl: Dimensions,
    parent_is_popup: bool,
) -> ItemGeometry {
    let params = config.measure_params();
    let size_bl = calc_spatial_dimensions_bl(store, item, &params);
    let block_size_px = Dimensions::new(
        container_px.w / container_inner_bl.w,
        container_px.h / container_inner_bl.h,
    );
    let pos = item.common.spatial_position_gr;
    let bounds_px = BoundingBox::new(
        pos.x / params.grid_size * block_size_px.w + container_px.x,
        pos.y / params.grid_size * block_size_px.h + container_px.y,
        size_bl.w * block_size_px.w,
        size_bl.h * block_size_px.h,
    );
    let hitboxes = spatial_hitboxes(config, display_kind(store, item), bounds_px.size(), parent_is_popup);
    ItemGeometry {
        bounds_px,
        viewport_bounds_px: None,
        block_size_px,
        hitboxes,
    }
}

/// Fit an item to a cell, keeping its aspect
pub fn calc_geometry_in_cell(config: &ArrangeConfig, store: &ItemStore, item: &Item, cell_px: BoundingBox) -> ItemGeometry {
    let size_bl = calc_spatial_dimensions_bl(store, item, &config.measure_params());
    let bounds_px = calc_bounds_in_cell(size_bl, cell_px);
    let inner = bounds_px.zero_top_left();
    let mut hitboxes = vec![
        Hitbox::new(HitboxFlags::CLICK, inner),
        Hitbox::new(HitboxFlags::MOVE, inner),
    ];
    if matches!(display_kind(store, item), ItemKind::Page(_) | ItemKind::Image(_)) {
        hitboxes.push(Hitbox::new(HitboxFlags::OPEN_POPUP, inner));
    }
    ItemGeometry {
        bounds_px,
        viewport_bounds_px: None,
        block_size_px: Dimensions::new(bounds_px.w / size_bl.w, bounds_px.h / size_bl.h),
        hitboxes,
    }
}

/// A one block high row. `col` offsets the row to the right, `pad_top_px` is
/// added above the first row.
pub fn calc_geometry_list_item(
    block_size_px: Dimensions,
    row: usize,
    col: usize,
    width_bl: f64,
    pad_top_px: f64,
    parent_is_popup: bool,
    expandable: bool,
) -> ItemGeometry {
    let bounds_px = BoundingBox::new(
        block_size_px.w * col as f64,
        block_size_px.h * row as f64 + pad_top_px,
        block_size_px.w * width_bl,
        block_size_px.h,
    );
    let inner = bounds_px.zero_top_left();
    let click = BoundingBox::new(block_size_px.w, 0.0, block_size_px.w * (width_bl - 1.0).max(0.0), block_size_px.h);
    let open_popup = if parent_is_popup {
        inner
    } else {
        BoundingBox::new(0.0, 0.0, block_size_px.w, block_size_px.h)
    };
    let mut hitboxes = vec![
        Hitbox::new(HitboxFlags::CLICK, click),
        Hitbox::new(HitboxFlags::OPEN_POPUP, open_popup),
        Hitbox::new(HitboxFlags::MOVE, inner),
    ];
    if expandable {
        hitboxes.push(Hitbox::new(
            HitboxFlags::EXPAND,
            BoundingBox::new(0.0, 0.0, block_size_px.w, block_size_px.h),
        ));
    }
    ItemGeometry {
        bounds_px,
        viewport_bounds_px: None,
        block_size_px,
        hitboxes,
    }
}

/// Stack an item in a composite or document at the given offset. The item is
/// measured at the column width.
pub fn calc_geometry_in_composite(
    config: &ArrangeConfig,
    store: &ItemStore,
    item: &Item,
    block_size_px: Dimensions,
    column_width_bl: f64,
    left_px: f64,
    top_px: f64,
) -> ItemGeometry {
    let params = config.measure_params();
    let resolved = store.resolve(item);
    let size_bl = if resolved.display.spatial_width_gr().is_some() {
        let overrides = SizeOverride {
            width_gr: Some(column_width_bl * params.grid_size),
            height_gr: None,
        };
        calc_dimensions_with_override(store, resolved.display, overrides, &params)
    } else {
        calc_spatial_dimensions_bl(store, item, &params)
    };
    let bounds_px = BoundingBox::new(
        left_px,
        top_px,
        column_width_bl * block_size_px.w,
        size_bl.h * block_size_px.h,
    );
    let inner = bounds_px.zero_top_left();
    let margin = config.composite_move_out_margin_px;
    let move_out = BoundingBox::new(
        inner.w - config.composite_move_out_width_px - margin,
        margin,
        config.composite_move_out_width_px,
        inner.h - margin,
    );
    ItemGeometry {
        bounds_px,
        viewport_bounds_px: None,
        block_size_px,
        hitboxes: vec![
            Hitbox::new(HitboxFlags::CLICK, inner),
            Hitbox::new(HitboxFlags::MOVE, move_out),
        ],
    }
}

/// Place the `index`th attachment along the top edge of its parent, right to
/// left. Bounds are relative to the parent's top left.
pub fn calc_geometry_attachment(
    config: &ArrangeConfig,
    store: &ItemStore,
    attachment: &Item,
    parent_bounds_px: BoundingBox,
    parent_size_bl: Dimensions,
    index: usize,
) -> ItemGeometry {
    let size_bl = calc_spatial_dimensions_bl(store, attachment, &config.measure_params());
    let parent_block_px = parent_bounds_px.w / parent_size_bl.w;
    let scaled_px = parent_block_px * config.attachment_scale;
    let margin = (parent_block_px - scaled_px) / 2.0;
    let min_px = scaled_px / 5.0;
    let (w, h) = if size_bl.w >= size_bl.h {
        (scaled_px, (scaled_px * size_bl.h / size_bl.w).max(min_px))
    } else {
        ((scaled_px * size_bl.w / size_bl.h).max(min_px), scaled_px)
    };
    let margin_w = (scaled_px - w) / 2.0;
    let margin_h = (scaled_px - h) / 2.0;
    let bounds_px = BoundingBox::new(
        parent_bounds_px.w - parent_block_px * (index as f64 + 1.0) + margin_w + margin,
        -parent_block_px / 2.0 + margin_h + margin,
        w,
        h,
    );
    let inner = bounds_px.zero_top_left();
    ItemGeometry {
        bounds_px,
        viewport_bounds_px: None,
        block_size_px: Dimensions::new(w / size_bl.w, h / size_bl.h),
        hitboxes: vec![
            Hitbox::new(HitboxFlags::MOVE, inner),
            Hitbox::new(HitboxFlags::OPEN_ATTACHMENT, inner),
        ],
    }
}
