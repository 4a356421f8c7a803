//! Geometry primitives shared by the item store and the arrange engine

use serde::{Deserialize, Serialize};

/// A point or offset in pixels or grid units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

/// A width and height pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub w: f64,
    pub h: f64,
}

impl Dimensions {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn aspect(&self) -> f64 {
        self.w / self.h
    }
}

/// An axis aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub const EMPTY: BoundingBox = BoundingBox { x: 0.0, y: 0.0, w: 0.0, h: 0.0 };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_dimensions(dimensions: Dimensions) -> Self {
        Self::new(0.0, 0.0, dimensions.w, dimensions.h)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn top_left(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.w, self.h)
    }

    pub fn center(&self) -> Vector {
        Vector::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict containment: a point on any edge is outside.
    pub fn is_inside(&self, point: Vector) -> bool {
        point.x > self.x && point.x < self.right() && point.y > self.y && point.y < self.bottom()
    }

    /// Inclusive containment of another box, with a small tolerance for float drift.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        const EPSILON: f64 = 1e-6;
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    pub fn offset_by(&self, offset: Vector) -> BoundingBox {
        BoundingBox::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Same size, moved to the origin.
    pub fn zero_top_left(&self) -> BoundingBox {
        BoundingBox::new(0.0, 0.0, self.w, self.h)
    }
}

/// Fit something of the given block size into a cell, keeping its aspect.
///
/// The fitted box spans the cell along its limiting axis, is rounded to whole
/// pixels and is centered along the other axis.
pub fn calc_bounds_in_cell(size_bl: Dimensions, cell_bounds_px: BoundingBox) -> BoundingBox {
    let item_aspect = size_bl.w / size_bl.h;
    let cell_aspect = cell_bounds_px.w / cell_bounds_px.h;
    if item_aspect > cell_aspect {
        let w = cell_bounds_px.w.round();
        let h = (cell_bounds_px.w / item_aspect).round();
        let y = (cell_bounds_px.y + (cell_bounds_px.h - h) / 2.0).round();
        BoundingBox::new(cell_bounds_px.x.round(), y, w, h)
    } else {
        let h = cell_bounds_px.h.round();
        let w = (cell_bounds_px.h * item_aspect).round();
        let x = (cell_bounds_px.x + (cell_bounds_px.w - w) / 2.0).round();
        BoundingBox::new(x, cell_bounds_px.y.round(), w, h)
    }
}
