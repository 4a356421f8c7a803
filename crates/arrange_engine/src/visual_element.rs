//! The computed render node
//!
//! A [`VisualElement`] is produced for every item that is drawn. It carries a
//! snapshot of the item it displays, its pixel geometry, its hitboxes, and the
//! paths of the nodes under it. It never holds references to other nodes.

use crate::{Hitbox, VePath, Veid};
use bitflags::bitflags;
use item_model::{BoundingBox, Dimensions, Item, ItemKind};
use serde::{Deserialize, Serialize};

bitflags! {
    /// How a visual element is drawn and hit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct VisualElementFlags: u32 {
        const NONE = 0;
        const SELECTED = 1 << 0;
        const DETAILED = 1 << 1;
        const LINE_ITEM = 1 << 2;
        const INSIDE_TABLE = 1 << 3;
        /// A page drawn with its children, into which items can be dropped
        const SHOW_CHILDREN = 1 << 4;
        const POPUP = 1 << 5;
        const LIST_PAGE_ROOT = 1 << 6;
        /// Positioned against the desktop rather than the scrolled page
        const FIXED = 1 << 7;
        const MOVING = 1 << 8;
        const ATTACHMENT = 1 << 9;
        const INSIDE_COMPOSITE_OR_DOC = 1 << 10;
        const TOP_LEVEL_ROOT = 1 << 11;
        const UMBRELLA_PAGE = 1 << 12;
        const DOCK_ITEM = 1 << 13;
        const FLIP_CARD_PAGE = 1 << 14;
        const UNKNOWN_ITEM = 1 << 15;
        /// A nested page whose children take pointer input directly
        const EMBEDDED_INTERACTIVE_ROOT = 1 << 16;
    }
}

bitflags! {
    /// Inputs to arrangement, kept on the node so a subtree can be redone alone
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ArrangeFlags: u32 {
        const NONE = 0;
        const TOP_ROOT = 1 << 0;
        const POPUP_ROOT = 1 << 1;
        const LIST_PAGE_MAIN_ROOT = 1 << 2;
        const DOCK_ROOT = 1 << 3;
        const PARENT_IS_POPUP = 1 << 4;
        const MOVING = 1 << 5;
        const RENDER_CHILDREN_AS_FULL = 1 << 6;
        const RENDER_AS_OUTLINE = 1 << 7;
        const INSIDE_COMPOSITE_OR_DOC = 1 << 8;
    }
}

impl ArrangeFlags {
    /// Any of the flags that make a page a root of its own frame
    pub const ANY_ROOT: ArrangeFlags = ArrangeFlags::TOP_ROOT
        .union(ArrangeFlags::POPUP_ROOT)
        .union(ArrangeFlags::LIST_PAGE_MAIN_ROOT)
        .union(ArrangeFlags::DOCK_ROOT);

    pub fn is_root(&self) -> bool {
        self.intersects(Self::ANY_ROOT)
    }
}

/// A computed render node.
///
/// Geometry is in the frame of the parent's child area: `bounds_px`,
/// `viewport_bounds_px` and `child_area_bounds_px` share that frame, and the
/// bounds of children are relative to the top left of `child_area_bounds_px`.
/// Hitboxes and attachments are relative to `bounds_px`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    pub path: VePath,
    pub parent_path: Option<VePath>,
    /// The item drawn; the target when shown through a link
    pub display_item: Item,
    /// The link used to arrive here, real or synthetic
    pub link_item: Option<Item>,
    /// The real link, when the display came through one
    pub actual_link_item: Option<Item>,
    pub flags: VisualElementFlags,
    pub arrange_flags: ArrangeFlags,
    pub bounds_px: BoundingBox,
    pub viewport_bounds_px: Option<BoundingBox>,
    pub child_area_bounds_px: Option<BoundingBox>,
    /// Scrollable extent of a list page's list pane
    pub list_child_area_bounds_px: Option<BoundingBox>,
    pub block_size_px: Option<Dimensions>,
    pub cell_size_px: Option<Dimensions>,
    pub row: Option<usize>,
    pub col: Option<usize>,
    pub hitboxes: Vec<Hitbox>,
    pub children: Vec<VePath>,
    pub attachments: Vec<VePath>,
    pub popup: Option<VePath>,
    pub selected: Option<VePath>,
    pub dock: Option<VePath>,
    /// For a table, the row index of each child in `children`
    pub table_ves_rows: Vec<usize>,
}

impl VisualElement {
    pub fn new(path: VePath, display_item: Item) -> Self {
        Self {
            parent_path: path.parent(),
            path,
            display_item,
            link_item: None,
            actual_link_item: None,
            flags: VisualElementFlags::NONE,
            arrange_flags: ArrangeFlags::NONE,
            bounds_px: BoundingBox::EMPTY,
            viewport_bounds_px: None,
            child_area_bounds_px: None,
            list_child_area_bounds_px: None,
            block_size_px: None,
            cell_size_px: None,
            row: None,
            col: None,
            hitboxes: Vec::new(),
            children: Vec::new(),
            attachments: Vec::new(),
            popup: None,
            selected: None,
            dock: None,
            table_ves_rows: Vec::new(),
        }
    }

    pub fn veid(&self) -> Veid {
        self.path.veid()
    }

    /// The Veid per-item state such as scroll position is keyed by. Synthetic
    /// popup and selection links are replaced by the real link, if any.
    pub fn actual_veid(&self) -> Veid {
        Veid::new(self.display_item.id(), self.actual_link_item.as_ref().map(|l| l.id()))
    }

    pub fn is_page(&self) -> bool {
        matches!(self.display_item.kind, ItemKind::Page(_))
    }

    pub fn is_table(&self) -> bool {
        matches!(self.display_item.kind, ItemKind::Table(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.display_item.kind, ItemKind::Composite(_))
    }

    pub fn is_line_item(&self) -> bool {
        self.flags.contains(VisualElementFlags::LINE_ITEM)
    }

    pub fn is_popup(&self) -> bool {
        self.flags.contains(VisualElementFlags::POPUP)
    }

    pub fn is_detailed_table(&self) -> bool {
        self.is_table() && self.flags.contains(VisualElementFlags::DETAILED) && !self.is_line_item()
    }

    /// A page drawn with its children
    pub fn is_positioning_page(&self) -> bool {
        self.is_page() && self.flags.contains(VisualElementFlags::SHOW_CHILDREN)
    }

    /// Offset of the child area's visible window under the given scroll
    /// proportions, never negative.
    pub fn scroll_offset_px(&self, scroll_x_prop: f64, scroll_y_prop: f64) -> item_model::Vector {
        match (self.child_area_bounds_px, self.viewport_bounds_px) {
            (Some(child_area), Some(viewport)) => item_model::Vector::new(
                scroll_x_prop * (child_area.w - viewport.w).max(0.0),
                scroll_y_prop * (child_area.h - viewport.h).max(0.0),
            ),
            _ => item_model::Vector::ZERO,
        }
    }
}
