//! Arrangement of a single item into a visual element

use super::Arranger;
use crate::{ArrangeFlags, ItemGeometry, Result, VePath, Veid, VisualElement, VisualElementFlags};
use item_model::{calc_spatial_dimensions_bl, Dimensions, Item, ItemKind, ItemStore};

/// Everything a parent decides about how a child is placed
#[derive(Debug, Clone)]
pub(crate) struct Placement {
    pub geometry: ItemGeometry,
    pub arrange_flags: ArrangeFlags,
    pub flags: VisualElementFlags,
    pub row: Option<usize>,
    pub col: Option<usize>,
    pub cell_size_px: Option<Dimensions>,
}

impl Placement {
    pub fn new(geometry: ItemGeometry, arrange_flags: ArrangeFlags, flags: VisualElementFlags) -> Self {
        Self {
            geometry,
            arrange_flags,
            flags,
            row: None,
            col: None,
            cell_size_px: None,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn in_cell(mut self, col: usize, row: usize, cell_size_px: Dimensions) -> Self {
        self.col = Some(col);
        self.row = Some(row);
        self.cell_size_px = Some(cell_size_px);
        self
    }
}

/// The Veid an item is displayed under
pub(crate) fn veid_for(store: &ItemStore, item: &Item) -> Veid {
    let resolved = store.resolve(item);
    Veid::new(resolved.display.id(), resolved.link.map(|l| l.id()))
}

/// Node flags implied by arrangement flags
fn implied_flags(arrange_flags: ArrangeFlags) -> VisualElementFlags {
    let mut flags = VisualElementFlags::NONE;
    if arrange_flags.contains(ArrangeFlags::TOP_ROOT) {
        flags |= VisualElementFlags::TOP_LEVEL_ROOT;
    }
    if arrange_flags.contains(ArrangeFlags::POPUP_ROOT) {
        flags |= VisualElementFlags::POPUP;
    }
    if arrange_flags.contains(ArrangeFlags::LIST_PAGE_MAIN_ROOT) {
        flags |= VisualElementFlags::LIST_PAGE_ROOT;
    }
    if arrange_flags.contains(ArrangeFlags::MOVING) {
        flags |= VisualElementFlags::MOVING;
    }
    if arrange_flags.contains(ArrangeFlags::RENDER_CHILDREN_AS_FULL) {
        flags |= VisualElementFlags::DETAILED;
    }
    if arrange_flags.contains(ArrangeFlags::INSIDE_COMPOSITE_OR_DOC) {
        flags |= VisualElementFlags::INSIDE_COMPOSITE_OR_DOC | VisualElementFlags::DETAILED;
    }
    flags
}

impl Arranger<'_> {
    /// Arrange an item, or a link to one, as a child of `parent_path`
    pub(crate) fn arrange_item(&mut self, item: &Item, parent_path: &VePath, placement: Placement) -> Result<VePath> {
        let actual_link = self
            .store
            .resolve(item)
            .link
            .filter(|link| !link.id().is_reserved());
        self.arrange_linked(item, actual_link, parent_path, placement)
    }

    /// Arrange an item reached through `actual_link`, which differs from the
    /// item itself when the item is a synthetic popup or selection link.
    pub(crate) fn arrange_linked(
        &mut self,
        item: &Item,
        actual_link: Option<&Item>,
        parent_path: &VePath,
        placement: Placement,
    ) -> Result<VePath> {
        let mut node = self.build_node(item, actual_link, parent_path, placement)?;
        if shows_attachments(&node) {
            node.attachments = self.arrange_attachments(&node)?;
        }
        self.insert_node(node)
    }

    /// Compute a node and everything under it. Descendants go into the cache,
    /// the node itself is returned for the caller to finish.
    pub(crate) fn build_node(
        &mut self,
        item: &Item,
        actual_link: Option<&Item>,
        parent_path: &VePath,
        placement: Placement,
    ) -> Result<VisualElement> {
        let store = self.store;
        let resolved = store.resolve(item);
        let display = resolved.display;
        let veid = Veid::new(display.id(), resolved.link.map(|l| l.id()));
        let path = parent_path.child(veid);

        let mut node = VisualElement::new(path.clone(), display.clone());
        node.link_item = resolved.link.cloned();
        node.actual_link_item = actual_link.cloned();
        node.arrange_flags = placement.arrange_flags;
        node.flags = placement.flags | implied_flags(placement.arrange_flags);
        node.bounds_px = placement.geometry.bounds_px;
        node.viewport_bounds_px = placement.geometry.viewport_bounds_px;
        node.block_size_px = Some(placement.geometry.block_size_px);
        node.hitboxes = placement.geometry.hitboxes;
        node.row = placement.row;
        node.col = placement.col;
        node.cell_size_px = placement.cell_size_px;

        if self.ui.moving().is_some_and(|m| m.path == path) {
            node.flags |= VisualElementFlags::MOVING;
        }

        let full = placement.arrange_flags.contains(ArrangeFlags::RENDER_CHILDREN_AS_FULL);
        match &display.kind {
            ItemKind::Page(page) => {
                if placement.arrange_flags.is_root() || full {
                    self.arrange_page_with_children(page, &mut node)?;
                }
            }
            ItemKind::Table(table) => {
                if full {
                    self.arrange_table(table, &mut node)?;
                }
            }
            ItemKind::Composite(_) => {
                if full {
                    self.arrange_composite(&mut node)?;
                }
            }
            ItemKind::FlipCard(_) => {
                if full {
                    self.arrange_flip_card(&mut node)?;
                }
            }
            ItemKind::Expression(_) => self.cache.mark_evaluation_required(&path),
            ItemKind::Unknown(unknown) => {
                tracing::warn!(path = %path, type_tag = %unknown.type_tag, "arranging placeholder for unknown item type");
                node.flags |= VisualElementFlags::UNKNOWN_ITEM;
            }
            ItemKind::Note(_)
            | ItemKind::Image(_)
            | ItemKind::File(_)
            | ItemKind::Link(_)
            | ItemKind::Rating(_)
            | ItemKind::Password(_)
            | ItemKind::Placeholder(_) => {}
        }
        Ok(node)
    }

    pub(crate) fn insert_node(&mut self, node: VisualElement) -> Result<VePath> {
        let path = node.path.clone();
        self.cache.create_or_recycle(node)?;
        Ok(path)
    }

    /// Size in blocks of what a node shows, measured through its link
    pub(crate) fn node_size_bl(&self, node: &VisualElement) -> Dimensions {
        let measured = node.link_item.as_ref().unwrap_or(&node.display_item);
        calc_spatial_dimensions_bl(self.store, measured, &self.config.measure_params())
    }
}

/// Whether a node hangs its item's attachments off itself
fn shows_attachments(node: &VisualElement) -> bool {
    node.display_item.is_attachments_item()
        && !node.arrange_flags.is_root()
        && !node.flags.intersects(
            VisualElementFlags::LINE_ITEM
                | VisualElementFlags::ATTACHMENT
                | VisualElementFlags::INSIDE_COMPOSITE_OR_DOC
                | VisualElementFlags::POPUP
                | VisualElementFlags::INSIDE_TABLE,
        )
}
