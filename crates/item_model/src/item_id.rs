//! Item ID generation and management

use crate::ItemModelError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an item in the store.
///
/// The text form is the 32 character lowercase hex encoding of the UUID with
/// no separators. Visual element paths rely on that length being fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(Uuid);

/// Length of an [`ItemId`] in its text form.
pub const ITEM_ID_LENGTH: usize = 32;

/// Id of the synthetic page that wraps the whole desktop.
pub const UMBRELLA_PAGE_ID: ItemId = ItemId(Uuid::from_u128(1));

/// Id of the synthetic link used to render the current popup.
pub const POPUP_LINK_ID: ItemId = ItemId(Uuid::from_u128(2));

/// Id of the synthetic link used to render the selected item of a list page.
pub const LIST_PAGE_MAIN_ITEM_LINK_ID: ItemId = ItemId(Uuid::from_u128(3));

impl ItemId {
    /// The nil id, used where an item has no parent or owner.
    pub const EMPTY: ItemId = ItemId(Uuid::nil());

    /// Create a new random ItemId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an ItemId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create an ItemId from a u128, handy for deterministic fixtures
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Create an ItemId from its 32 character text form
    pub fn from_string(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    /// True for ids reserved for synthetic items that never live in the store.
    pub fn is_reserved(&self) -> bool {
        *self == UMBRELLA_PAGE_ID || *self == POPUP_LINK_ID || *self == LIST_PAGE_MAIN_ITEM_LINK_ID
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for ItemId {
    type Err = ItemModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ITEM_ID_LENGTH || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ItemModelError::InvalidId(s.to_string()));
        }
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| ItemModelError::InvalidId(s.to_string()))
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ItemId> for Uuid {
    fn from(id: ItemId) -> Self {
        id.0
    }
}
