//! Arrangement passes
//!
//! [`ArrangeEngine`] owns the cache together with the scroll and interaction
//! state, and runs full and partial passes over an [`ItemStore`]. Each pass
//! borrows everything it needs into an [`Arranger`], whose methods are split
//! across the modules below by what they arrange.

mod attachments;
mod calendar;
mod composite;
mod document;
mod dock;
mod flipcard;
mod grid;
mod item;
mod justified;
mod list;
mod page;
mod popup;
mod single_cell;
mod spatial;
mod table;

pub use calendar::calendar_position_at;
pub use grid::grid_cell;
pub use justified::{justified_layout, JustifiedLayout, JustifyOptions};

use crate::{
    ArrangeConfig, ArrangeError, ArrangeFlags, ItemGeometry, Result, ScrollStore, UiState, VePath, Veid,
    VesCache, VisualElement, VisualElementFlags,
};
use item::{veid_for, Placement};
use item_model::{ArrangeAlgorithm, BoundingBox, Dimensions, Item, ItemId, ItemKind, ItemStore, PageItem, UMBRELLA_PAGE_ID};
use std::time::Instant;

/// State borrowed by one arrangement pass
pub(crate) struct Arranger<'a> {
    pub store: &'a ItemStore,
    pub config: &'a ArrangeConfig,
    pub scroll: &'a ScrollStore,
    pub ui: &'a UiState,
    pub cache: &'a mut VesCache,
    /// The desktop, with its top left at the origin
    pub desktop_px: BoundingBox,
    /// The desktop less the dock, in the desktop frame
    pub main_area_px: BoundingBox,
    /// Replaces the arrangement algorithm of the top level page
    pub algorithm_override: Option<ArrangeAlgorithm>,
}

/// Flags a pass must carry over when it rebuilds a node in place
const CARRIED_FLAGS: VisualElementFlags = VisualElementFlags::SELECTED
    .union(VisualElementFlags::LINE_ITEM)
    .union(VisualElementFlags::INSIDE_TABLE)
    .union(VisualElementFlags::FIXED)
    .union(VisualElementFlags::POPUP)
    .union(VisualElementFlags::ATTACHMENT)
    .union(VisualElementFlags::DOCK_ITEM)
    .union(VisualElementFlags::FLIP_CARD_PAGE);

/// Nodes whose geometry is decided by their parent's layout as a whole
const PARENT_LAID_OUT: VisualElementFlags = VisualElementFlags::LINE_ITEM
    .union(VisualElementFlags::ATTACHMENT)
    .union(VisualElementFlags::INSIDE_COMPOSITE_OR_DOC)
    .union(VisualElementFlags::INSIDE_TABLE);

impl Arranger<'_> {
    fn arrange_top_level(&mut self, root_id: ItemId) -> Result<VePath> {
        let store = self.store;
        let umbrella_path = umbrella_path();

        let dock_spec = self.ui.dock().filter(|dock| store.contains(dock.page_id));
        let dock_width = dock_spec.map(|d| d.width_px.clamp(0.0, self.desktop_px.w)).unwrap_or(0.0);
        self.main_area_px = BoundingBox::new(dock_width, 0.0, self.desktop_px.w - dock_width, self.desktop_px.h);

        let dock_path = match dock_spec {
            Some(spec) => self.arrange_dock(spec, &umbrella_path)?,
            None => None,
        };

        let root = store.get(root_id).ok_or(ArrangeError::ItemNotFound(root_id))?;
        if !store.resolve(root).display.is_page() {
            return Err(ArrangeError::invariant(
                &umbrella_path.child(veid_for(store, root)),
                "top level item is not a page",
            ));
        }
        let geometry = ItemGeometry::root(self.main_area_px, self.natural_block());
        let top_path = self.arrange_item(
            root,
            &umbrella_path,
            Placement::new(geometry, ArrangeFlags::TOP_ROOT, VisualElementFlags::NONE),
        )?;

        let mut umbrella = VisualElement::new(
            umbrella_path,
            Item::with_id(UMBRELLA_PAGE_ID, ItemKind::Page(PageItem::default())),
        );
        umbrella.flags = VisualElementFlags::UMBRELLA_PAGE | VisualElementFlags::SHOW_CHILDREN;
        umbrella.bounds_px = self.desktop_px;
        umbrella.viewport_bounds_px = Some(self.desktop_px);
        umbrella.child_area_bounds_px = Some(self.desktop_px);
        umbrella.block_size_px = Some(self.natural_block());
        umbrella.children = vec![top_path.clone()];
        umbrella.dock = dock_path;
        self.insert_node(umbrella)?;
        Ok(top_path)
    }

    /// The node a partial pass for a change at `path` has to start from, or
    /// `None` when only a full pass will do. Climbs while the node's geometry
    /// depends on its siblings or its parent's size depends on it, and stops
    /// at a child of a spatial page or at a root whose frame is fixed.
    fn partial_target(&self, path: &VePath) -> Result<Option<VisualElement>> {
        let mut target = self.cache.require(path)?;
        loop {
            if target.arrange_flags.is_root() && !target.arrange_flags.contains(ArrangeFlags::POPUP_ROOT) {
                return Ok(Some(target.clone()));
            }
            let Some(parent_path) = &target.parent_path else {
                return Ok(None);
            };
            let parent = self.cache.require(parent_path)?;
            let placed_alone = !target.flags.intersects(PARENT_LAID_OUT)
                && parent.popup.as_ref() != Some(&target.path)
                && parent.selected.as_ref() != Some(&target.path)
                && self.spatial_page_of(parent).is_some();
            if placed_alone {
                return Ok(Some(target.clone()));
            }
            target = parent;
        }
    }

    /// Rebuild `target` in place. Roots keep their stored geometry, children
    /// of spatial pages are measured again against the parent's child area.
    fn rearrange_node(&mut self, target: &VisualElement) -> Result<VePath> {
        let store = self.store;
        let parent_path = target
            .parent_path
            .clone()
            .ok_or_else(|| ArrangeError::invariant(&target.path, "cannot rearrange the umbrella in place"))?;

        let item = match &target.link_item {
            Some(link) if link.id().is_reserved() => link,
            Some(link) => store.get(link.id()).ok_or(ArrangeError::ItemNotFound(link.id()))?,
            None => {
                let id = target.display_item.id();
                store.get(id).ok_or(ArrangeError::ItemNotFound(id))?
            }
        };
        let actual_link = target.actual_link_item.as_ref().and_then(|l| store.get(l.id()));

        let placement = if target.arrange_flags.is_root() {
            let geometry = ItemGeometry {
                bounds_px: target.bounds_px,
                viewport_bounds_px: target.viewport_bounds_px,
                block_size_px: target.block_size_px.unwrap_or_else(|| self.natural_block()),
                hitboxes: target.hitboxes.clone(),
            };
            let mut placement = Placement::new(geometry, target.arrange_flags, target.flags & CARRIED_FLAGS);
            placement.row = target.row;
            placement.col = target.col;
            placement.cell_size_px = target.cell_size_px;
            placement
        } else {
            let parent = self.cache.require(&parent_path)?;
            let page = self
                .spatial_page_of(parent)
                .ok_or_else(|| ArrangeError::invariant(&target.path, "parent does not place children freely"))?;
            let child_area = parent
                .child_area_bounds_px
                .ok_or_else(|| ArrangeError::invariant(&parent_path, "spatial page has no child area"))?;
            self.spatial_child_placement(page, parent, item, child_area)
        };
        self.arrange_linked(item, actual_link, &parent_path, placement)
    }

    pub(crate) fn natural_block(&self) -> Dimensions {
        Dimensions::new(self.config.natural_block_size_px, self.config.natural_block_size_px)
    }
}

/// Path of the umbrella node every arrangement hangs off
pub fn umbrella_path() -> VePath {
    VePath::root(Veid::item(UMBRELLA_PAGE_ID))
}

/// Computes visual element trees and keeps them cached between passes
#[derive(Debug)]
pub struct ArrangeEngine {
    config: ArrangeConfig,
    cache: VesCache,
    scroll: ScrollStore,
    ui: UiState,
    desktop_bounds_px: BoundingBox,
    main_area_bounds_px: BoundingBox,
    top_level_path: Option<VePath>,
    last_root: Option<(ItemId, Option<ArrangeAlgorithm>)>,
}

impl Default for ArrangeEngine {
    fn default() -> Self {
        Self::new(ArrangeConfig::default())
    }
}

impl ArrangeEngine {
    pub fn new(config: ArrangeConfig) -> Self {
        let desktop = BoundingBox::new(0.0, 0.0, 1200.0, 800.0);
        Self {
            config,
            cache: VesCache::new(),
            scroll: ScrollStore::new(),
            ui: UiState::new(),
            desktop_bounds_px: desktop,
            main_area_bounds_px: desktop,
            top_level_path: None,
            last_root: None,
        }
    }

    pub fn with_desktop_bounds(mut self, desktop_bounds_px: BoundingBox) -> Self {
        self.set_desktop_bounds(desktop_bounds_px);
        self
    }

    /// Resize the desktop. Takes effect on the next full pass.
    pub fn set_desktop_bounds(&mut self, desktop_bounds_px: BoundingBox) {
        self.desktop_bounds_px = desktop_bounds_px.zero_top_left();
        self.main_area_bounds_px = self.desktop_bounds_px;
    }

    pub fn config(&self) -> &ArrangeConfig {
        &self.config
    }

    pub fn cache(&self) -> &VesCache {
        &self.cache
    }

    pub fn scroll(&self) -> &ScrollStore {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollStore {
        &mut self.scroll
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    pub fn desktop_bounds_px(&self) -> BoundingBox {
        self.desktop_bounds_px
    }

    /// The desktop less the dock
    pub fn main_area_bounds_px(&self) -> BoundingBox {
        self.main_area_bounds_px
    }

    pub fn umbrella_path(&self) -> VePath {
        umbrella_path()
    }

    /// Path of the top level page after the last full pass
    pub fn top_level_path(&self) -> Option<&VePath> {
        self.top_level_path.as_ref()
    }

    /// Arrange everything reachable from the page `root_id` as the top level
    /// page. Nodes not reached are evicted from the cache.
    pub fn arrange(
        &mut self,
        store: &ItemStore,
        root_id: ItemId,
        algorithm_override: Option<ArrangeAlgorithm>,
    ) -> Result<VePath> {
        let started = Instant::now();
        let before = self.cache.stats();
        self.cache.begin_full()?;

        let mut arranger = Arranger {
            store,
            config: &self.config,
            scroll: &self.scroll,
            ui: &self.ui,
            cache: &mut self.cache,
            desktop_px: self.desktop_bounds_px,
            main_area_px: self.desktop_bounds_px,
            algorithm_override,
        };
        let result = arranger.arrange_top_level(root_id);
        let main_area_px = arranger.main_area_px;

        let top_path = match result {
            Ok(top_path) => top_path,
            Err(err) => {
                self.cache.abandon();
                return Err(err);
            }
        };
        let evicted = self.cache.finish_full()?;
        self.main_area_bounds_px = main_area_px;
        self.top_level_path = Some(top_path.clone());
        self.last_root = Some((root_id, algorithm_override));

        let after = self.cache.stats();
        tracing::debug!(
            target: "arrange",
            root = %root_id,
            nodes = self.cache.len(),
            created = after.created - before.created,
            recycled = (after.recycled_changed + after.recycled_unchanged)
                - (before.recycled_changed + before.recycled_unchanged),
            evicted,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "full arrange"
        );
        Ok(top_path)
    }

    /// Redo the subtree at `path` after the items under it changed. When the
    /// node's geometry depends on its parent's layout, or its parent's size
    /// depends on it, the parent is redone instead. Returns the path actually
    /// rebuilt.
    pub fn rearrange_subtree(&mut self, store: &ItemStore, path: &VePath) -> Result<VePath> {
        let started = Instant::now();
        let algorithm_override = self.last_root.and_then(|(_, o)| o);
        let target = Arranger {
            store,
            config: &self.config,
            scroll: &self.scroll,
            ui: &self.ui,
            cache: &mut self.cache,
            desktop_px: self.desktop_bounds_px,
            main_area_px: self.main_area_bounds_px,
            algorithm_override,
        }
        .partial_target(path)?;

        let target = match target {
            Some(target) if self.shows_same_item(store, &target) => target,
            _ => {
                let (root_id, algorithm_override) = self
                    .last_root
                    .ok_or_else(|| ArrangeError::invariant(path, "no full arrange to repeat"))?;
                tracing::debug!(target: "arrange", path = %path, "rearrange falls back to a full pass");
                return self.arrange(store, root_id, algorithm_override);
            }
        };

        self.cache.begin_partial(&target.path)?;
        let mut arranger = Arranger {
            store,
            config: &self.config,
            scroll: &self.scroll,
            ui: &self.ui,
            cache: &mut self.cache,
            desktop_px: self.desktop_bounds_px,
            main_area_px: self.main_area_bounds_px,
            algorithm_override,
        };
        let result = arranger.rearrange_node(&target);
        let rebuilt = match result {
            Ok(rebuilt) => rebuilt,
            Err(err) => {
                self.cache.abandon();
                return Err(err);
            }
        };
        let evicted = self.cache.finish_partial()?;
        tracing::debug!(
            target: "arrange",
            path = %rebuilt,
            evicted,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "partial arrange"
        );
        Ok(rebuilt)
    }

    /// Whether rebuilding `target` from the store would land at the same path
    fn shows_same_item(&self, store: &ItemStore, target: &VisualElement) -> bool {
        let item = match &target.link_item {
            Some(link) if link.id().is_reserved() => Some(link),
            Some(link) => store.get(link.id()),
            None => store.get(target.display_item.id()),
        };
        item.is_some_and(|item| veid_for(store, item) == target.veid())
    }

    /// Update a detailed table after its scroll position changed from
    /// `prev_scroll_pos`. Rows still visible are kept as they are, rows that
    /// came into view are arranged, and rows that left are evicted.
    pub fn rearrange_table_after_scroll(
        &mut self,
        store: &ItemStore,
        table_path: &VePath,
        prev_scroll_pos: f64,
    ) -> Result<()> {
        let table_node = self.cache.require(table_path)?.clone();
        if !table_node.is_detailed_table() {
            return Err(ArrangeError::invariant(table_path, "scroll rearrange of a node that is not a detailed table"));
        }

        self.cache.begin_partial(table_path)?;
        let mut arranger = Arranger {
            store,
            config: &self.config,
            scroll: &self.scroll,
            ui: &self.ui,
            cache: &mut self.cache,
            desktop_px: self.desktop_bounds_px,
            main_area_px: self.main_area_bounds_px,
            algorithm_override: None,
        };
        if let Err(err) = arranger.rescroll_table(table_node, prev_scroll_pos) {
            self.cache.abandon();
            return Err(err);
        }
        let evicted = self.cache.finish_partial()?;
        tracing::trace!(target: "arrange", path = %table_path, evicted, "table rows rearranged after scroll");
        Ok(())
    }
}
