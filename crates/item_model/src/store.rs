//! Item storage
//!
//! The store owns every item, keyed by id. Child and attachment lists are
//! derived from each item's parent id and relationship, sorted by the opaque
//! ordering key, and kept current by the mutation methods.

use crate::{Item, ItemCommon, ItemId, ItemKind, ItemModelError, ItemType, RelationshipToParent, Result, UnknownItem};
use serde_json::Value;
use std::collections::HashMap;

/// An item as it should be drawn: the link target when the item is a link
/// whose target exists, otherwise the item itself.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub display: &'a Item,
    pub link: Option<&'a Item>,
}

/// The canonical item tree
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: HashMap<ItemId, Item>,
    roots: Vec<ItemId>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids of items that have no parent
    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    /// Get an item that must exist
    pub fn require(&self, id: ItemId) -> Result<&Item> {
        self.items.get(&id).ok_or(ItemModelError::ItemNotFound(id))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Add an item with no parent
    pub fn insert_root(&mut self, mut item: Item) -> Result<ItemId> {
        let id = item.id();
        if id.is_reserved() {
            return Err(ItemModelError::InvalidOperation(format!("{} is a reserved id", id)));
        }
        if self.items.contains_key(&id) {
            return Err(ItemModelError::DuplicateItem(id));
        }
        item.common.parent_id = None;
        item.common.relationship_to_parent = RelationshipToParent::NoParent;
        self.items.insert(id, item);
        self.roots.push(id);
        Ok(id)
    }

    /// Add an item as the last child of a container
    pub fn add_child(&mut self, parent_id: ItemId, item: Item) -> Result<ItemId> {
        let parent = self.require(parent_id)?;
        let siblings = parent.children().ok_or(ItemModelError::NotAContainer(parent_id))?;
        let ordering = self.ordering_after(siblings);
        self.attach(parent_id, item, RelationshipToParent::Child, ordering)
    }

    /// Add an item as the last attachment of another item
    pub fn add_attachment(&mut self, parent_id: ItemId, item: Item) -> Result<ItemId> {
        let parent = self.require(parent_id)?;
        let siblings = parent.attachments().ok_or(ItemModelError::NotAttachable(parent_id))?;
        let ordering = self.ordering_after(siblings);
        self.attach(parent_id, item, RelationshipToParent::Attachment, ordering)
    }

    fn attach(
        &mut self,
        parent_id: ItemId,
        mut item: Item,
        relationship: RelationshipToParent,
        ordering: Vec<u8>,
    ) -> Result<ItemId> {
        let id = item.id();
        if id.is_reserved() {
            return Err(ItemModelError::InvalidOperation(format!("{} is a reserved id", id)));
        }
        if self.items.contains_key(&id) {
            return Err(ItemModelError::DuplicateItem(id));
        }
        item.common.parent_id = Some(parent_id);
        item.common.relationship_to_parent = relationship;
        item.common.ordering = ordering;
        self.items.insert(id, item);

        let parent = self.items.get_mut(&parent_id).ok_or(ItemModelError::ItemNotFound(parent_id))?;
        let list = match relationship {
            RelationshipToParent::Attachment => parent.attachments_mut(),
            _ => parent.children_mut(),
        };
        if let Some(list) = list {
            list.push(id);
        }
        Ok(id)
    }

    /// Ordering key that sorts after every given sibling
    fn ordering_after(&self, siblings: &[ItemId]) -> Vec<u8> {
        let last = siblings
            .iter()
            .filter_map(|id| self.items.get(id))
            .map(|item| &item.common.ordering)
            .max();
        match last {
            None => vec![128],
            Some(last) => {
                let mut next = last.clone();
                match next.last_mut() {
                    Some(byte) if *byte < u8::MAX => *byte += 1,
                    _ => next.push(128),
                }
                next
            }
        }
    }

    /// Remove an item together with its children and attachments
    pub fn remove(&mut self, id: ItemId) -> Result<Item> {
        let item = self.items.remove(&id).ok_or(ItemModelError::ItemNotFound(id))?;

        match item.common.parent_id.and_then(|pid| self.items.get_mut(&pid)) {
            Some(parent) => {
                if let Some(children) = parent.children_mut() {
                    children.retain(|c| *c != id);
                }
                if let Some(attachments) = parent.attachments_mut() {
                    attachments.retain(|a| *a != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let mut pending: Vec<ItemId> = item
            .children()
            .unwrap_or(&[])
            .iter()
            .chain(item.attachments().unwrap_or(&[]))
            .copied()
            .collect();
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.items.remove(&next) {
                pending.extend(removed.children().unwrap_or(&[]));
                pending.extend(removed.attachments().unwrap_or(&[]));
            }
        }
        Ok(item)
    }

    /// Children of an item in sibling order. Empty for non-containers.
    pub fn children_of(&self, id: ItemId) -> impl Iterator<Item = &Item> {
        self.items
            .get(&id)
            .and_then(|item| item.children())
            .unwrap_or(&[])
            .iter()
            .filter_map(|child| self.items.get(child))
    }

    /// Attachments of an item in sibling order
    pub fn attachments_of(&self, id: ItemId) -> impl Iterator<Item = &Item> {
        self.items
            .get(&id)
            .and_then(|item| item.attachments())
            .unwrap_or(&[])
            .iter()
            .filter_map(|attachment| self.items.get(attachment))
    }

    /// Follow a link to the item it displays
    pub fn resolve<'a>(&'a self, item: &'a Item) -> Resolved<'a> {
        match &item.kind {
            ItemKind::Link(link) => match self.items.get(&link.link_to) {
                Some(target) => Resolved {
                    display: target,
                    link: Some(item),
                },
                None => {
                    tracing::warn!(link = %item.id(), target = %link.link_to, "link target not in store");
                    Resolved {
                        display: item,
                        link: None,
                    }
                }
            },
            _ => Resolved {
                display: item,
                link: None,
            },
        }
    }

    /// Load a store from a JSON array of items.
    ///
    /// Items with an unrecognised type tag are kept as [`ItemKind::Unknown`].
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Vec<Value> = serde_json::from_str(json)?;
        let mut store = Self::new();
        for value in values {
            let tag = value.get("itemType").and_then(Value::as_str).unwrap_or_default().to_string();
            let item = if ItemType::from_tag(&tag).is_some() {
                serde_json::from_value::<Item>(value)?
            } else {
                let common: ItemCommon = serde_json::from_value(value)?;
                tracing::warn!(id = %common.id, type_tag = %tag, "unknown item type");
                Item {
                    common,
                    kind: ItemKind::Unknown(UnknownItem { type_tag: tag }),
                }
            };
            let id = item.id();
            if store.items.insert(id, item).is_some() {
                return Err(ItemModelError::DuplicateItem(id));
            }
        }
        store.rebuild_relationships();
        tracing::debug!(items = store.items.len(), roots = store.roots.len(), "item store loaded");
        Ok(store)
    }

    /// Serialize every item to a JSON array, sorted by id.
    ///
    /// Unknown items are not written back since their fields were not kept.
    pub fn to_json(&self) -> Result<String> {
        let mut items: Vec<&Item> = self
            .items
            .values()
            .filter(|item| {
                let known = !matches!(item.kind, ItemKind::Unknown(_));
                if !known {
                    tracing::warn!(id = %item.id(), "skipping unknown item on save");
                }
                known
            })
            .collect();
        items.sort_by_key(|item| item.id());
        Ok(serde_json::to_string(&items)?)
    }

    fn rebuild_relationships(&mut self) {
        let mut by_parent: HashMap<(ItemId, RelationshipToParent), Vec<(Vec<u8>, ItemId)>> = HashMap::new();
        let mut roots = Vec::new();
        for item in self.items.values() {
            match item.common.parent_id {
                Some(pid) if self.items.contains_key(&pid) => {
                    by_parent
                        .entry((pid, item.common.relationship_to_parent))
                        .or_default()
                        .push((item.common.ordering.clone(), item.id()));
                }
                Some(pid) => {
                    tracing::warn!(id = %item.id(), parent = %pid, "parent missing, treating item as a root");
                    roots.push(item.id());
                }
                None => roots.push(item.id()),
            }
        }
        roots.sort();
        self.roots = roots;

        for ((pid, relationship), mut entries) in by_parent {
            entries.sort();
            let ids: Vec<ItemId> = entries.into_iter().map(|(_, id)| id).collect();
            if let Some(parent) = self.items.get_mut(&pid) {
                let list = match relationship {
                    RelationshipToParent::Attachment => parent.attachments_mut(),
                    _ => parent.children_mut(),
                };
                match list {
                    Some(list) => *list = ids,
                    None => tracing::warn!(parent = %pid, "item cannot hold the items that name it as parent"),
                }
            }
        }
    }
}
