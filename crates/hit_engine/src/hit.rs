//! The hit test walk
//!
//! The walk starts at the dock or the top level page, descends into the popup
//! and then the selected list item when the position falls inside them, and
//! then checks the children of that root from the topmost drawn down. Inside
//! each child, attachments win over the child's body, a detailed table's
//! resize corner wins over its column resize strips, and those win over its
//! rows.
//!
//! Nothing is cached between calls. Every call reads the current tree from the
//! engine's cache and the current scroll positions.

use crate::hit_info::{finalize, positioning_page_of};
use crate::{HitInfo, HitTestError, Result};
use arrange_engine::{hitboxes_at, ArrangeEngine, HitboxFlags, VePath, VesCache, VisualElement, VisualElementFlags};
use item_model::{ItemId, ItemKind, Vector};

/// Find what lies under `pos_px`, a position on the desktop.
///
/// Elements showing an item in `ignore_ids` are passed over, as are all
/// attachments when `ignore_attachments` is set.
pub fn hit_test(
    engine: &ArrangeEngine,
    pos_px: Vector,
    ignore_ids: &[ItemId],
    ignore_attachments: bool,
) -> Result<HitInfo> {
    let tester = HitTester {
        engine,
        cache: engine.cache(),
        pos_px,
        ignore_ids,
        ignore_attachments,
    };
    let hit = tester.hit()?;
    tracing::trace!(
        over = %hit.over_element_path,
        hitbox_type = ?hit.hitbox_type,
        "hit test"
    );
    Ok(hit)
}

/// A node whose children are being hit
struct Frame<'e> {
    /// Root reported in the result
    root: &'e VePath,
    node: &'e VisualElement,
    /// Position relative to the top left of the node's child area, before
    /// scrolling
    local: Vector,
}

impl<'e> Frame<'e> {
    /// Enter `node` as a new root from a position in its parent's frame
    fn root(node: &'e VisualElement, pos: Vector) -> Self {
        Self::nested(&node.path, node, pos)
    }

    /// Enter `node` keeping the current root
    fn nested(root: &'e VePath, node: &'e VisualElement, pos: Vector) -> Self {
        let origin = node.child_area_bounds_px.unwrap_or(node.bounds_px).top_left();
        Self {
            root,
            node,
            local: pos.sub(origin),
        }
    }
}

#[derive(Clone, Copy)]
struct HitTester<'e> {
    engine: &'e ArrangeEngine,
    cache: &'e VesCache,
    pos_px: Vector,
    ignore_ids: &'e [ItemId],
    ignore_attachments: bool,
}

impl<'e> HitTester<'e> {
    fn hit(&self) -> Result<HitInfo> {
        let cache = self.cache;
        let umbrella_path = self.engine.umbrella_path();
        let umbrella = cache.require(&umbrella_path)?;

        if let Some(dock_path) = &umbrella.dock {
            let dock = cache.require(dock_path)?;
            if dock.bounds_px.is_inside(self.pos_px) {
                if let Some(hit) = self.hit_root_itself(dock, self.pos_px)? {
                    return Ok(hit);
                }
                return self.hit_under_root(&Frame::root(dock, self.pos_px));
            }
        }

        let top_path = umbrella
            .children
            .first()
            .ok_or_else(|| HitTestError::invariant(&umbrella.path, "umbrella has no top level page"))?;
        let top = cache.require(top_path)?;
        if let Some(hit) = self.hit_root_itself(top, self.pos_px)? {
            return Ok(hit);
        }
        let mut frame = Frame::root(top, self.pos_px);

        if let Some(popup_path) = &top.popup {
            let popup = cache.require(popup_path)?;
            let pos = if popup.flags.contains(VisualElementFlags::FIXED) {
                frame.local
            } else {
                self.scrolled(&frame)
            };
            if popup.bounds_px.is_inside(pos) {
                if let Some(hit) = self.hit_root_itself(popup, pos)? {
                    return Ok(hit);
                }
                frame = Frame::root(popup, pos);
            }
        }

        let node = frame.node;
        if let Some(selected_path) = &node.selected {
            let selected = cache.require(selected_path)?;
            let pos = self.scrolled(&frame);
            if selected.is_page() && selected.bounds_px.is_inside(pos) {
                if let Some(hit) = self.hit_root_itself(selected, pos)? {
                    return Ok(hit);
                }
                frame = Frame::root(selected, pos);
            }
        }

        self.hit_under_root(&frame)
    }

    fn hit_under_root(&self, frame: &Frame<'_>) -> Result<HitInfo> {
        match self.hit_children(frame)? {
            Some(hit) => Ok(hit),
            None => finalize(self.cache, HitboxFlags::NONE, frame.node, None, frame.root),
        }
    }

    /// A hit on a root's own hitboxes, such as a popup's edges
    fn hit_root_itself(&self, node: &VisualElement, pos: Vector) -> Result<Option<HitInfo>> {
        let (kind, meta) = hitboxes_at(&node.hitboxes, pos.sub(node.bounds_px.top_left()));
        if kind.is_empty() || self.is_ignored(node) {
            return Ok(None);
        }
        finalize(self.cache, kind, node, meta, &node.path).map(Some)
    }

    fn is_ignored(&self, node: &VisualElement) -> bool {
        self.ignore_ids.contains(&node.display_item.id())
    }

    /// The frame's position with the node's page scroll applied
    fn scrolled(&self, frame: &Frame<'_>) -> Vector {
        let scroll = self.engine.scroll();
        let veid = frame.node.actual_veid();
        frame
            .local
            .add(frame.node.scroll_offset_px(scroll.scroll_x_prop(veid), scroll.scroll_y_prop(veid)))
    }

    /// Position of a child of the frame in the frame's scrolled child area.
    /// Line items of a list page scroll with the list pane.
    fn child_pos(&self, frame: &Frame<'_>, child: &VisualElement) -> Vector {
        let node = frame.node;
        match (node.list_child_area_bounds_px, node.viewport_bounds_px) {
            (Some(list_area), Some(viewport)) if child.is_line_item() => {
                let prop = self.engine.scroll().scroll_y_prop(node.actual_veid());
                frame
                    .local
                    .add(Vector::new(0.0, prop * (list_area.h - viewport.h).max(0.0)))
            }
            _ => self.scrolled(frame),
        }
    }

    fn hit_children(&self, frame: &Frame<'_>) -> Result<Option<HitInfo>> {
        for child_path in frame.node.children.iter().rev() {
            if frame.node.popup.as_ref() == Some(child_path) {
                continue;
            }
            let child = self.cache.require(child_path)?;
            let pos = self.child_pos(frame, child);
            if let Some(hit) = self.hit_child(frame.root, child, pos)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// Hit one child, `pos` being in the frame of its bounds
    fn hit_child(&self, root: &VePath, child: &VisualElement, pos: Vector) -> Result<Option<HitInfo>> {
        if !self.ignore_attachments {
            if let Some(hit) = self.hit_attachments(root, child, pos)? {
                return Ok(Some(hit));
            }
        }
        if !child.bounds_px.is_inside(pos) {
            return Ok(None);
        }

        if child.is_detailed_table() {
            if let Some(hit) = self.hit_table(root, child, pos)? {
                return Ok(Some(hit));
            }
        } else if child.is_composite() && !child.is_line_item() {
            if let Some(hit) = self.hit_composite(root, child, pos)? {
                return Ok(Some(hit));
            }
        } else if takes_input_directly(child) {
            if let Some(hit) = self.hit_nested(root, child, pos)? {
                return Ok(Some(hit));
            }
        }

        if self.is_ignored(child) {
            return Ok(None);
        }
        let (kind, meta) = hitboxes_at(&child.hitboxes, pos.sub(child.bounds_px.top_left()));
        finalize(self.cache, kind, child, meta, root).map(Some)
    }

    /// Attachments of `child`, last drawn first. What a hit attachment would
    /// be dropped into is found by hitting again with attachments ignored.
    fn hit_attachments(&self, root: &VePath, child: &VisualElement, pos: Vector) -> Result<Option<HitInfo>> {
        let rel = pos.sub(child.bounds_px.top_left());
        for attachment_path in child.attachments.iter().rev() {
            let attachment = self.cache.require(attachment_path)?;
            if !attachment.bounds_px.is_inside(rel) || self.is_ignored(attachment) {
                continue;
            }
            let (kind, meta) = hitboxes_at(&attachment.hitboxes, rel.sub(attachment.bounds_px.top_left()));
            let beneath = HitTester {
                ignore_attachments: true,
                ..*self
            }
            .hit()?;
            return Ok(Some(HitInfo {
                hitbox_type: kind,
                root_path: root.clone(),
                over_element_path: attachment.path.clone(),
                over_element_meta: meta,
                over_container_path: beneath.over_container_path,
                over_positionable_path: beneath.over_positionable_path,
            }));
        }
        Ok(None)
    }

    fn hit_table(&self, root: &VePath, table: &VisualElement, pos: Vector) -> Result<Option<HitInfo>> {
        let cache = self.cache;
        let viewport = table
            .viewport_bounds_px
            .ok_or_else(|| HitTestError::MissingChildArea(table.path.clone()))?;
        let child_area = table
            .child_area_bounds_px
            .ok_or_else(|| HitTestError::MissingChildArea(table.path.clone()))?;
        if !viewport.is_inside(pos) {
            return Ok(None);
        }

        let rel = pos.sub(table.bounds_px.top_left());
        let (resize, rest) = match table.hitboxes.split_last() {
            Some((last, rest)) if last.kind == HitboxFlags::RESIZE => (last, rest),
            _ => {
                return Err(HitTestError::invariant(
                    &table.path,
                    "last hitbox of a detailed table is not Resize",
                ))
            }
        };
        if resize.contains(rel) {
            return finalize(cache, HitboxFlags::RESIZE, table, resize.meta, root).map(Some);
        }
        for hitbox in rest.iter().rev().take_while(|h| h.kind == HitboxFlags::COL_RESIZE) {
            if hitbox.contains(rel) {
                return finalize(cache, HitboxFlags::COL_RESIZE, table, hitbox.meta, root).map(Some);
            }
        }

        let row_h = table
            .block_size_px
            .map_or(self.engine.config().natural_block_size_px, |block| block.h);
        let scroll_rows = self.engine.scroll().table_scroll_y_pos(table.actual_veid());
        let row_pos = pos
            .sub(child_area.top_left())
            .add(Vector::new(0.0, scroll_rows * row_h));

        for row_path in &table.children {
            let row = cache.require(row_path)?;
            let row_rel = row_pos.sub(row.bounds_px.top_left());
            if row.bounds_px.is_inside(row_pos) && !self.is_ignored(row) && !self.is_ignored(table) {
                let (kind, meta) = hitboxes_at(&row.hitboxes, row_rel);
                return finalize(cache, kind, row, meta, root).map(Some);
            }
            for attachment_path in &row.attachments {
                let attachment = cache.require(attachment_path)?;
                if !attachment.bounds_px.is_inside(row_rel) || self.is_ignored(attachment) {
                    continue;
                }
                let (kind, meta) = hitboxes_at(&attachment.hitboxes, row_rel.sub(attachment.bounds_px.top_left()));
                return Ok(Some(HitInfo {
                    hitbox_type: kind,
                    root_path: root.clone(),
                    over_element_path: attachment.path.clone(),
                    over_element_meta: meta,
                    over_container_path: Some(table.path.clone()),
                    over_positionable_path: Some(positioning_page_of(cache, table)?),
                }));
            }
        }
        Ok(None)
    }

    /// Children of a composite are hit through it. Where a child offers no
    /// hitbox the composite itself is hit.
    fn hit_composite(&self, root: &VePath, composite: &VisualElement, pos: Vector) -> Result<Option<HitInfo>> {
        let cache = self.cache;
        let rel = pos.sub(composite.bounds_px.top_left());
        if let Some(resize) = composite.hitboxes.last().filter(|h| h.kind == HitboxFlags::RESIZE) {
            if resize.contains(rel) {
                return finalize(cache, HitboxFlags::RESIZE, composite, resize.meta, root).map(Some);
            }
        }

        let (composite_kind, composite_meta) = hitboxes_at(&composite.hitboxes, rel);
        for child_path in &composite.children {
            let child = cache.require(child_path)?;
            if child.is_detailed_table() {
                if let Some(hit) = self.hit_child(root, child, rel)? {
                    return Ok(Some(hit));
                }
                continue;
            }
            if !self.ignore_attachments {
                if let Some(hit) = self.hit_attachments(root, child, rel)? {
                    return Ok(Some(hit));
                }
            }
            if !child.bounds_px.is_inside(rel) {
                continue;
            }
            let (kind, meta) = hitboxes_at(&child.hitboxes, rel.sub(child.bounds_px.top_left()));
            if kind.is_empty() {
                if !self.is_ignored(composite) {
                    return finalize(cache, composite_kind, composite, composite_meta, root).map(Some);
                }
            } else if !self.is_ignored(child) {
                return finalize(cache, kind, child, meta, root).map(Some);
            }
        }
        Ok(None)
    }

    /// Children of an interactive page or a flip card's visible side are hit
    /// before the container itself.
    fn hit_nested(&self, root: &VePath, container: &VisualElement, pos: Vector) -> Result<Option<HitInfo>> {
        let (page, pos) = if container.flags.contains(VisualElementFlags::EMBEDDED_INTERACTIVE_ROOT) {
            (container, pos)
        } else {
            let Some(side_path) = container.children.first() else {
                return Ok(None);
            };
            let origin = container.child_area_bounds_px.unwrap_or(container.bounds_px).top_left();
            (self.cache.require(side_path)?, pos.sub(origin))
        };
        let viewport = page.viewport_bounds_px.unwrap_or(page.bounds_px);
        if !viewport.is_inside(pos) {
            return Ok(None);
        }
        self.hit_children(&Frame::nested(root, page, pos))
    }
}

fn takes_input_directly(node: &VisualElement) -> bool {
    node.flags.contains(VisualElementFlags::EMBEDDED_INTERACTIVE_ROOT)
        || (matches!(node.display_item.kind, ItemKind::FlipCard(_))
            && node.flags.contains(VisualElementFlags::DETAILED))
}
