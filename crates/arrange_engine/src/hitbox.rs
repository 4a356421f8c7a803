//! Interactive regions of a visual element

use bitflags::bitflags;
use item_model::{BoundingBox, Vector};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Kinds of interaction a hitbox offers. A hit test returns the union of
    /// every hitbox under the pointer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HitboxFlags: u32 {
        const NONE = 0;
        const CLICK = 1 << 0;
        const MOVE = 1 << 1;
        const RESIZE = 1 << 2;
        const OPEN_POPUP = 1 << 3;
        const ATTACH = 1 << 4;
        const COL_RESIZE = 1 << 5;
        const OPEN_ATTACHMENT = 1 << 6;
        const EXPAND = 1 << 7;
        const HORIZONTAL_RESIZE = 1 << 8;
    }
}

/// Extra data carried by column hitboxes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HitboxMeta {
    pub col_num: Option<usize>,
    pub start_bl: Option<f64>,
    pub end_bl: Option<f64>,
}

impl HitboxMeta {
    pub fn column(col_num: usize) -> Self {
        Self {
            col_num: Some(col_num),
            ..Default::default()
        }
    }

    pub fn column_span(col_num: usize, start_bl: f64, end_bl: f64) -> Self {
        Self {
            col_num: Some(col_num),
            start_bl: Some(start_bl),
            end_bl: Some(end_bl),
        }
    }
}

/// A region relative to the owning element's top left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub kind: HitboxFlags,
    pub bounds_px: BoundingBox,
    pub meta: Option<HitboxMeta>,
}

impl Hitbox {
    pub fn new(kind: HitboxFlags, bounds_px: BoundingBox) -> Self {
        Self {
            kind,
            bounds_px,
            meta: None,
        }
    }

    pub fn with_meta(kind: HitboxFlags, bounds_px: BoundingBox, meta: HitboxMeta) -> Self {
        Self {
            kind,
            bounds_px,
            meta: Some(meta),
        }
    }

    pub fn contains(&self, pos_rel_px: Vector) -> bool {
        self.bounds_px.is_inside(pos_rel_px)
    }
}

/// Union of the kinds of every hitbox containing the point, and the meta of
/// the last one that carried any.
pub fn hitboxes_at(hitboxes: &[Hitbox], pos_rel_px: Vector) -> (HitboxFlags, Option<HitboxMeta>) {
    let mut kind = HitboxFlags::NONE;
    let mut meta = None;
    for hitbox in hitboxes.iter().filter(|h| h.contains(pos_rel_px)) {
        kind |= hitbox.kind;
        if hitbox.meta.is_some() {
            meta = hitbox.meta;
        }
    }
    (kind, meta)
}
