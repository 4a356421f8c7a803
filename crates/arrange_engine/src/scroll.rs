//! Per-Veid scroll state
//!
//! Page scroll is stored as a proportion of the scrollable range so it
//! survives resizes. Table scroll is stored in rows.

use crate::Veid;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ScrollStore {
    page_x_prop: HashMap<Veid, f64>,
    page_y_prop: HashMap<Veid, f64>,
    table_y_pos: HashMap<Veid, f64>,
}

impl ScrollStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_x_prop(&self, veid: Veid) -> f64 {
        self.page_x_prop.get(&veid).copied().unwrap_or(0.0)
    }

    pub fn set_scroll_x_prop(&mut self, veid: Veid, prop: f64) {
        self.page_x_prop.insert(veid, clamp_prop(prop));
    }

    pub fn scroll_y_prop(&self, veid: Veid) -> f64 {
        self.page_y_prop.get(&veid).copied().unwrap_or(0.0)
    }

    pub fn set_scroll_y_prop(&mut self, veid: Veid, prop: f64) {
        self.page_y_prop.insert(veid, clamp_prop(prop));
    }

    /// Scroll position of a table, in rows
    pub fn table_scroll_y_pos(&self, veid: Veid) -> f64 {
        self.table_y_pos.get(&veid).copied().unwrap_or(0.0)
    }

    pub fn set_table_scroll_y_pos(&mut self, veid: Veid, pos: f64) {
        let pos = if pos.is_finite() { pos.max(0.0) } else { 0.0 };
        self.table_y_pos.insert(veid, pos);
    }

    /// Forget all scroll state for a Veid
    pub fn clear(&mut self, veid: Veid) {
        self.page_x_prop.remove(&veid);
        self.page_y_prop.remove(&veid);
        self.table_y_pos.remove(&veid);
    }
}

fn clamp_prop(prop: f64) -> f64 {
    if prop.is_finite() {
        prop.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_model::ItemId;

    #[test]
    fn test_defaults_to_zero() {
        let store = ScrollStore::new();
        let veid = Veid::item(ItemId::from_u128(1));
        assert_eq!(store.scroll_x_prop(veid), 0.0);
        assert_eq!(store.table_scroll_y_pos(veid), 0.0);
    }

    #[test]
    fn test_clamping() {
        let mut store = ScrollStore::new();
        let veid = Veid::item(ItemId::from_u128(1));
        store.set_scroll_y_prop(veid, 1.7);
        assert_eq!(store.scroll_y_prop(veid), 1.0);
        store.set_scroll_x_prop(veid, -0.2);
        assert_eq!(store.scroll_x_prop(veid), 0.0);
        store.set_table_scroll_y_pos(veid, -3.0);
        assert_eq!(store.table_scroll_y_pos(veid), 0.0);
        store.set_table_scroll_y_pos(veid, 12.5);
        assert_eq!(store.table_scroll_y_pos(veid), 12.5);
        store.set_scroll_y_prop(veid, f64::NAN);
        assert_eq!(store.scroll_y_prop(veid), 0.0);
    }

    #[test]
    fn test_keyed_by_link() {
        let mut store = ScrollStore::new();
        let target = ItemId::from_u128(1);
        let direct = Veid::item(target);
        let linked = Veid::linked(target, ItemId::from_u128(2));
        store.set_scroll_y_prop(linked, 0.5);
        assert_eq!(store.scroll_y_prop(direct), 0.0);
        assert_eq!(store.scroll_y_prop(linked), 0.5);
        store.clear(linked);
        assert_eq!(store.scroll_y_prop(linked), 0.0);
    }
}
