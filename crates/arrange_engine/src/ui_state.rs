//! Interaction state that shapes arrangement
//!
//! This is the transient state an input layer maintains between arrange
//! passes: what is popped up, selected, expanded, flipped or being dragged.

use crate::{VePath, Veid};
use chrono::NaiveDate;
use item_model::{ItemId, Vector};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupKind {
    Page,
    Image,
    Attachment,
}

/// The item shown as a popup over the top level page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupSpec {
    /// The item popped up, with the real link it was opened through
    pub veid: Veid,
    pub kind: PopupKind,
    /// Where an attachment popup was opened from, in the page's child area
    pub source_position_px: Option<Vector>,
}

impl PopupSpec {
    pub fn page(veid: Veid) -> Self {
        Self {
            veid,
            kind: PopupKind::Page,
            source_position_px: None,
        }
    }

    pub fn image(veid: Veid) -> Self {
        Self {
            veid,
            kind: PopupKind::Image,
            source_position_px: None,
        }
    }

    pub fn attachment(veid: Veid, source_position_px: Vector) -> Self {
        Self {
            veid,
            kind: PopupKind::Attachment,
            source_position_px: Some(source_position_px),
        }
    }
}

/// An item being dragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingState {
    pub path: VePath,
    pub cursor_desktop_px: Vector,
    /// Where in the item the drag started, as a proportion of its size
    pub click_offset_prop: Vector,
}

/// A page pinned to the left of the desktop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockSpec {
    pub page_id: ItemId,
    pub width_px: f64,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    popup: Option<PopupSpec>,
    selected: HashMap<Veid, Veid>,
    expanded: HashSet<VePath>,
    flip_sides: HashMap<Veid, usize>,
    moving: Option<MovingState>,
    dock: Option<DockSpec>,
    calendar_day: Option<NaiveDate>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popup(&self) -> Option<&PopupSpec> {
        self.popup.as_ref()
    }

    pub fn set_popup(&mut self, popup: PopupSpec) {
        self.popup = Some(popup);
    }

    pub fn clear_popup(&mut self) {
        self.popup = None;
    }

    /// The list item selected in a list page, keyed by the page's Veid
    pub fn selected_list_item(&self, page: Veid) -> Option<Veid> {
        self.selected.get(&page).copied()
    }

    pub fn select_list_item(&mut self, page: Veid, item: Veid) {
        self.selected.insert(page, item);
    }

    pub fn clear_selection(&mut self, page: Veid) {
        self.selected.remove(&page);
    }

    /// Whether a container row inside a table shows its children
    pub fn is_expanded(&self, path: &VePath) -> bool {
        self.expanded.contains(path)
    }

    pub fn set_expanded(&mut self, path: VePath, expanded: bool) {
        if expanded {
            self.expanded.insert(path);
        } else {
            self.expanded.remove(&path);
        }
    }

    pub fn toggle_expanded(&mut self, path: VePath) {
        let expanded = self.is_expanded(&path);
        self.set_expanded(path, !expanded);
    }

    /// Visible side of a flip card, 0 or 1
    pub fn flip_side(&self, card: Veid) -> usize {
        self.flip_sides.get(&card).copied().unwrap_or(0)
    }

    pub fn flip(&mut self, card: Veid) {
        let side = self.flip_side(card);
        self.flip_sides.insert(card, 1 - side);
    }

    pub fn moving(&self) -> Option<&MovingState> {
        self.moving.as_ref()
    }

    pub fn set_moving(&mut self, moving: MovingState) {
        self.moving = Some(moving);
    }

    pub fn clear_moving(&mut self) {
        self.moving = None;
    }

    pub fn dock(&self) -> Option<DockSpec> {
        self.dock
    }

    pub fn set_dock(&mut self, dock: Option<DockSpec>) {
        self.dock = dock;
    }

    /// The day a Calendar page shows; today when unset
    pub fn calendar_day(&self) -> NaiveDate {
        self.calendar_day
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    pub fn set_calendar_day(&mut self, day: NaiveDate) {
        self.calendar_day = Some(day);
    }
}
