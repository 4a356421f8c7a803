//! The result of a hit test, and how its container context is derived

use crate::{HitTestError, Result};
use arrange_engine::{HitboxFlags, HitboxMeta, VePath, VesCache, VisualElement, VisualElementFlags};

/// What lies under a pointer position
#[derive(Debug, Clone, PartialEq)]
pub struct HitInfo {
    /// Union of the kinds of every hitbox under the position
    pub hitbox_type: HitboxFlags,
    /// The top level page, or the popup, selected item or dock the position
    /// fell in
    pub root_path: VePath,
    pub over_element_path: VePath,
    pub over_element_meta: Option<HitboxMeta>,
    /// The container an item dropped here would be added to
    pub over_container_path: Option<VePath>,
    /// The page whose scale and coordinates a dropped item would take
    pub over_positionable_path: Option<VePath>,
}

impl HitInfo {
    pub fn is_over(&self, kind: HitboxFlags) -> bool {
        self.hitbox_type.contains(kind)
    }
}

/// Build the hit on `over`, working out its container and positioning page
/// from the chain of parents.
pub(crate) fn finalize(
    cache: &VesCache,
    hitbox_type: HitboxFlags,
    over: &VisualElement,
    meta: Option<HitboxMeta>,
    root_path: &VePath,
) -> Result<HitInfo> {
    let (container, positionable) = containers_of(cache, over)?;
    Ok(HitInfo {
        hitbox_type,
        root_path: root_path.clone(),
        over_element_path: over.path.clone(),
        over_element_meta: meta,
        over_container_path: Some(container),
        over_positionable_path: Some(positionable),
    })
}

fn containers_of(cache: &VesCache, over: &VisualElement) -> Result<(VePath, VePath)> {
    if over.flags.contains(VisualElementFlags::INSIDE_TABLE) {
        let table = enclosing_table(cache, over)?;
        return Ok((table.path.clone(), positioning_page_of(cache, table)?));
    }
    if over.is_table() {
        return Ok((over.path.clone(), positioning_page_of(cache, over)?));
    }
    if over.is_positioning_page() {
        return Ok((over.path.clone(), over.path.clone()));
    }

    let parent = parent_of(cache, over)?;
    if parent.is_composite() {
        return Ok((parent.path.clone(), positioning_page_of(cache, parent)?));
    }
    if !parent.is_positioning_page() {
        return Err(HitTestError::invariant(
            &over.path,
            "parent of a non-container is not a positioning page",
        ));
    }
    if over.is_page() {
        Ok((over.path.clone(), parent.path.clone()))
    } else {
        Ok((parent.path.clone(), parent.path.clone()))
    }
}

/// The page a node is positioned in: its parent, or the page holding the
/// composite it is stacked in.
pub(crate) fn positioning_page_of(cache: &VesCache, node: &VisualElement) -> Result<VePath> {
    let parent = parent_of(cache, node)?;
    if parent.is_positioning_page() {
        return Ok(parent.path.clone());
    }
    if parent.is_composite() {
        let grandparent = parent_of(cache, parent)?;
        if grandparent.is_positioning_page() {
            return Ok(grandparent.path.clone());
        }
    }
    Err(HitTestError::invariant(&node.path, "container is not inside a positioning page"))
}

fn enclosing_table<'c>(cache: &'c VesCache, node: &VisualElement) -> Result<&'c VisualElement> {
    let mut current = parent_of(cache, node)?;
    while !current.is_table() {
        if !current.flags.contains(VisualElementFlags::INSIDE_TABLE) {
            return Err(HitTestError::invariant(
                &node.path,
                "marked as inside a table but no table encloses it",
            ));
        }
        current = parent_of(cache, current)?;
    }
    Ok(current)
}

fn parent_of<'c>(cache: &'c VesCache, node: &VisualElement) -> Result<&'c VisualElement> {
    let parent_path = node
        .parent_path
        .as_ref()
        .ok_or_else(|| HitTestError::invariant(&node.path, "visual element has no parent"))?;
    Ok(cache.require(parent_path)?)
}
