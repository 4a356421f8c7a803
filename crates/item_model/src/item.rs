//! Item types
//!
//! Every item in the store is an [`Item`]: the fields shared by all items plus
//! one [`ItemKind`] variant carrying the type-specific measurable fields.
//! Arrangement matches on the kind exhaustively, so adding a variant is a
//! compile error everywhere a layout decision depends on it.

use crate::{ItemId, Vector};
use serde::{Deserialize, Serialize};

/// Type tag of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Page,
    Note,
    Table,
    Image,
    File,
    Link,
    Rating,
    Password,
    Composite,
    Expression,
    Placeholder,
    FlipCard,
    Unknown,
}

impl ItemType {
    /// The tag used in serialized items
    pub fn tag(&self) -> &'static str {
        match self {
            ItemType::Page => "page",
            ItemType::Note => "note",
            ItemType::Table => "table",
            ItemType::Image => "image",
            ItemType::File => "file",
            ItemType::Link => "link",
            ItemType::Rating => "rating",
            ItemType::Password => "password",
            ItemType::Composite => "composite",
            ItemType::Expression => "expression",
            ItemType::Placeholder => "placeholder",
            ItemType::FlipCard => "flipcard",
            ItemType::Unknown => "unknown",
        }
    }

    /// Look up a serialized tag. Returns None for tags this model does not know.
    pub fn from_tag(tag: &str) -> Option<ItemType> {
        let item_type = match tag {
            "page" => ItemType::Page,
            "note" => ItemType::Note,
            "table" => ItemType::Table,
            "image" => ItemType::Image,
            "file" => ItemType::File,
            "link" => ItemType::Link,
            "rating" => ItemType::Rating,
            "password" => ItemType::Password,
            "composite" => ItemType::Composite,
            "expression" => ItemType::Expression,
            "placeholder" => ItemType::Placeholder,
            "flipcard" => ItemType::FlipCard,
            _ => return None,
        };
        Some(item_type)
    }
}

/// How an item hangs off its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipToParent {
    #[default]
    NoParent,
    Child,
    Attachment,
}

/// Layout mode of a page's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrangeAlgorithm {
    /// Free placement by grid-unit position
    #[default]
    SpatialStretch,
    Grid,
    List,
    Document,
    Calendar,
    /// Rows of items at their natural aspect, scaled to fill the width
    Justified,
    /// Every child fills the whole page
    SingleCell,
}

/// Fields common to every item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCommon {
    pub id: ItemId,
    #[serde(default = "empty_id")]
    pub owner_id: ItemId,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub relationship_to_parent: RelationshipToParent,
    #[serde(default)]
    pub creation_date: i64,
    #[serde(default)]
    pub last_modified_date: i64,
    /// Unix seconds; the day a Calendar page files the item under
    #[serde(default)]
    pub date_time: i64,
    /// Opaque sibling sort key, compared bytewise
    #[serde(default)]
    pub ordering: Vec<u8>,
    #[serde(default)]
    pub spatial_position_gr: Vector,
}

fn empty_id() -> ItemId {
    ItemId::EMPTY
}

impl ItemCommon {
    pub fn new(id: ItemId) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id,
            owner_id: ItemId::EMPTY,
            parent_id: None,
            relationship_to_parent: RelationshipToParent::NoParent,
            creation_date: now,
            last_modified_date: now,
            date_time: now,
            ordering: Vec::new(),
            spatial_position_gr: Vector::ZERO,
        }
    }
}

/// A table column header and width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    #[serde(default)]
    pub name: String,
    pub width_gr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageItem {
    pub title: String,
    pub spatial_width_gr: f64,
    pub inner_spatial_width_gr: f64,
    pub natural_aspect: f64,
    pub arrange_algorithm: ArrangeAlgorithm,
    pub grid_number_of_columns: usize,
    pub grid_cell_aspect: f64,
    /// Page width over the target row height when arranged as justified rows
    pub justified_row_aspect: f64,
    pub doc_width_bl: f64,
    /// Width of the list column when arranged as a list
    pub list_column_width_gr: f64,
    /// Center of a popup opened over this page
    pub popup_position_gr: Vector,
    pub popup_width_gr: f64,
    /// Center of a cell popup, as a proportion of the desktop
    pub cell_popup_position_norm: Vector,
    /// Width of a cell popup, as a proportion of the desktop width
    pub cell_popup_width_norm: f64,
    /// Children stay interactive when the page is embedded in another page
    pub interactive: bool,
    #[serde(skip)]
    pub computed_children: Vec<ItemId>,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for PageItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            spatial_width_gr: 4.0 * 60.0,
            inner_spatial_width_gr: 60.0 * 60.0,
            natural_aspect: 2.0,
            arrange_algorithm: ArrangeAlgorithm::SpatialStretch,
            grid_number_of_columns: 6,
            grid_cell_aspect: 1.5,
            justified_row_aspect: 7.0,
            doc_width_bl: 36.0,
            list_column_width_gr: 8.0 * 60.0,
            popup_position_gr: Vector::new(30.0 * 60.0, 15.0 * 60.0),
            popup_width_gr: 10.0 * 60.0,
            cell_popup_position_norm: Vector::new(0.5, 0.5),
            cell_popup_width_norm: 0.6,
            interactive: false,
            computed_children: Vec::new(),
            computed_attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteItem {
    pub title: String,
    pub spatial_width_gr: f64,
    /// Set when the note is sized by hand rather than by its text
    pub spatial_height_gr: Option<f64>,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for NoteItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            spatial_width_gr: 4.0 * 60.0,
            spatial_height_gr: None,
            computed_attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableItem {
    pub title: String,
    pub spatial_width_gr: f64,
    pub spatial_height_gr: f64,
    pub columns: Vec<TableColumn>,
    pub number_of_visible_columns: usize,
    pub show_col_header: bool,
    #[serde(skip)]
    pub computed_children: Vec<ItemId>,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for TableItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            spatial_width_gr: 8.0 * 60.0,
            spatial_height_gr: 6.0 * 60.0,
            columns: vec![
                TableColumn { name: "Title".to_string(), width_gr: 4.0 * 60.0 },
                TableColumn { name: "Col 1".to_string(), width_gr: 4.0 * 60.0 },
            ],
            number_of_visible_columns: 1,
            show_col_header: false,
            computed_children: Vec::new(),
            computed_attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageItem {
    pub title: String,
    pub spatial_width_gr: f64,
    pub image_size_px: crate::Dimensions,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for ImageItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            spatial_width_gr: 4.0 * 60.0,
            image_size_px: crate::Dimensions::new(400.0, 300.0),
            computed_attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileItem {
    pub title: String,
    pub spatial_width_gr: f64,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for FileItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            spatial_width_gr: 4.0 * 60.0,
            computed_attachments: Vec::new(),
        }
    }
}

/// An indirection to another item, optionally resizing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub link_to: ItemId,
    #[serde(default)]
    pub spatial_width_gr: f64,
    #[serde(default)]
    pub spatial_height_gr: f64,
}

impl LinkItem {
    pub fn to(link_to: ItemId) -> Self {
        Self {
            link_to,
            spatial_width_gr: 4.0 * 60.0,
            spatial_height_gr: 4.0 * 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingItem {
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordItem {
    pub spatial_width_gr: f64,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for PasswordItem {
    fn default() -> Self {
        Self {
            spatial_width_gr: 4.0 * 60.0,
            computed_attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositeItem {
    pub spatial_width_gr: f64,
    #[serde(skip)]
    pub computed_children: Vec<ItemId>,
}

impl Default for CompositeItem {
    fn default() -> Self {
        Self {
            spatial_width_gr: 6.0 * 60.0,
            computed_children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpressionItem {
    pub title: String,
    pub spatial_width_gr: f64,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for ExpressionItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            spatial_width_gr: 4.0 * 60.0,
            computed_attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderItem {}

/// A two-sided card; its two children are the side pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipCardItem {
    pub spatial_width_gr: f64,
    pub natural_aspect: f64,
    /// Ratio of side page blocks to card blocks
    pub scale: f64,
    #[serde(skip)]
    pub computed_children: Vec<ItemId>,
    #[serde(skip)]
    pub computed_attachments: Vec<ItemId>,
}

impl Default for FlipCardItem {
    fn default() -> Self {
        Self {
            spatial_width_gr: 6.0 * 60.0,
            natural_aspect: 1.5,
            scale: 1.0,
            computed_children: Vec::new(),
            computed_attachments: Vec::new(),
        }
    }
}

/// An item whose type tag this model does not recognise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownItem {
    pub type_tag: String,
}

/// Type-specific part of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "itemType", rename_all = "lowercase")]
pub enum ItemKind {
    Page(PageItem),
    Note(NoteItem),
    Table(TableItem),
    Image(ImageItem),
    File(FileItem),
    Link(LinkItem),
    Rating(RatingItem),
    Password(PasswordItem),
    Composite(CompositeItem),
    Expression(ExpressionItem),
    Placeholder(PlaceholderItem),
    FlipCard(FlipCardItem),
    #[serde(skip)]
    Unknown(UnknownItem),
}

/// An item in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(flatten)]
    pub common: ItemCommon,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    /// Create an item with a fresh id
    pub fn new(kind: ItemKind) -> Self {
        Self::with_id(ItemId::new(), kind)
    }

    pub fn with_id(id: ItemId, kind: ItemKind) -> Self {
        Self {
            common: ItemCommon::new(id),
            kind,
        }
    }

    /// Set the spatial position in grid units
    pub fn at_gr(mut self, x: f64, y: f64) -> Self {
        self.common.spatial_position_gr = Vector::new(x, y);
        self
    }

    /// Set the timestamp a Calendar page files the item under
    pub fn dated(mut self, date_time: i64) -> Self {
        self.common.date_time = date_time;
        self
    }

    pub fn id(&self) -> ItemId {
        self.common.id
    }

    pub fn parent_id(&self) -> Option<ItemId> {
        self.common.parent_id
    }

    pub fn item_type(&self) -> ItemType {
        match &self.kind {
            ItemKind::Page(_) => ItemType::Page,
            ItemKind::Note(_) => ItemType::Note,
            ItemKind::Table(_) => ItemType::Table,
            ItemKind::Image(_) => ItemType::Image,
            ItemKind::File(_) => ItemType::File,
            ItemKind::Link(_) => ItemType::Link,
            ItemKind::Rating(_) => ItemType::Rating,
            ItemKind::Password(_) => ItemType::Password,
            ItemKind::Composite(_) => ItemType::Composite,
            ItemKind::Expression(_) => ItemType::Expression,
            ItemKind::Placeholder(_) => ItemType::Placeholder,
            ItemKind::FlipCard(_) => ItemType::FlipCard,
            ItemKind::Unknown(_) => ItemType::Unknown,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Page(p) => Some(&p.title),
            ItemKind::Note(n) => Some(&n.title),
            ItemKind::Table(t) => Some(&t.title),
            ItemKind::Image(i) => Some(&i.title),
            ItemKind::File(f) => Some(&f.title),
            ItemKind::Expression(e) => Some(&e.title),
            _ => None,
        }
    }

    /// Declared width for kinds whose width the user sets
    pub fn spatial_width_gr(&self) -> Option<f64> {
        match &self.kind {
            ItemKind::Page(p) => Some(p.spatial_width_gr),
            ItemKind::Note(n) => Some(n.spatial_width_gr),
            ItemKind::Table(t) => Some(t.spatial_width_gr),
            ItemKind::Image(i) => Some(i.spatial_width_gr),
            ItemKind::File(f) => Some(f.spatial_width_gr),
            ItemKind::Link(l) => Some(l.spatial_width_gr),
            ItemKind::Password(p) => Some(p.spatial_width_gr),
            ItemKind::Composite(c) => Some(c.spatial_width_gr),
            ItemKind::Expression(e) => Some(e.spatial_width_gr),
            ItemKind::FlipCard(f) => Some(f.spatial_width_gr),
            ItemKind::Rating(_) | ItemKind::Placeholder(_) | ItemKind::Unknown(_) => None,
        }
    }

    /// Declared height for kinds whose height the user sets
    pub fn spatial_height_gr(&self) -> Option<f64> {
        match &self.kind {
            ItemKind::Table(t) => Some(t.spatial_height_gr),
            ItemKind::Note(n) => n.spatial_height_gr,
            ItemKind::Link(l) => Some(l.spatial_height_gr),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.children().is_some()
    }

    pub fn is_attachments_item(&self) -> bool {
        self.attachments().is_some()
    }

    /// Ordered child ids, for kinds that hold children
    pub fn children(&self) -> Option<&[ItemId]> {
        match &self.kind {
            ItemKind::Page(p) => Some(&p.computed_children),
            ItemKind::Table(t) => Some(&t.computed_children),
            ItemKind::Composite(c) => Some(&c.computed_children),
            ItemKind::FlipCard(f) => Some(&f.computed_children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<ItemId>> {
        match &mut self.kind {
            ItemKind::Page(p) => Some(&mut p.computed_children),
            ItemKind::Table(t) => Some(&mut t.computed_children),
            ItemKind::Composite(c) => Some(&mut c.computed_children),
            ItemKind::FlipCard(f) => Some(&mut f.computed_children),
            _ => None,
        }
    }

    /// Ordered attachment ids, for kinds that accept attachments
    pub fn attachments(&self) -> Option<&[ItemId]> {
        match &self.kind {
            ItemKind::Page(p) => Some(&p.computed_attachments),
            ItemKind::Note(n) => Some(&n.computed_attachments),
            ItemKind::Table(t) => Some(&t.computed_attachments),
            ItemKind::Image(i) => Some(&i.computed_attachments),
            ItemKind::File(f) => Some(&f.computed_attachments),
            ItemKind::Password(p) => Some(&p.computed_attachments),
            ItemKind::Expression(e) => Some(&e.computed_attachments),
            ItemKind::FlipCard(f) => Some(&f.computed_attachments),
            _ => None,
        }
    }

    pub fn attachments_mut(&mut self) -> Option<&mut Vec<ItemId>> {
        match &mut self.kind {
            ItemKind::Page(p) => Some(&mut p.computed_attachments),
            ItemKind::Note(n) => Some(&mut n.computed_attachments),
            ItemKind::Table(t) => Some(&mut t.computed_attachments),
            ItemKind::Image(i) => Some(&mut i.computed_attachments),
            ItemKind::File(f) => Some(&mut f.computed_attachments),
            ItemKind::Password(p) => Some(&mut p.computed_attachments),
            ItemKind::Expression(e) => Some(&mut e.computed_attachments),
            ItemKind::FlipCard(f) => Some(&mut f.computed_attachments),
            _ => None,
        }
    }

    pub fn as_page(&self) -> Option<&PageItem> {
        match &self.kind {
            ItemKind::Page(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_page_mut(&mut self) -> Option<&mut PageItem> {
        match &mut self.kind {
            ItemKind::Page(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableItem> {
        match &self.kind {
            ItemKind::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut TableItem> {
        match &mut self.kind {
            ItemKind::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&LinkItem> {
        match &self.kind {
            ItemKind::Link(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self.kind, ItemKind::Page(_))
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, ItemKind::Table(_))
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, ItemKind::Link(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ItemKind::Composite(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_tags_round_trip() {
        for item_type in [
            ItemType::Page,
            ItemType::Note,
            ItemType::Table,
            ItemType::Image,
            ItemType::File,
            ItemType::Link,
            ItemType::Rating,
            ItemType::Password,
            ItemType::Composite,
            ItemType::Expression,
            ItemType::Placeholder,
            ItemType::FlipCard,
        ] {
            assert_eq!(ItemType::from_tag(item_type.tag()), Some(item_type));
        }
        assert_eq!(ItemType::from_tag("hologram"), None);
    }

    #[test]
    fn test_container_and_attachment_kinds() {
        let page = Item::new(ItemKind::Page(PageItem::default()));
        assert!(page.is_container());
        assert!(page.is_attachments_item());

        let note = Item::new(ItemKind::Note(NoteItem::default()));
        assert!(!note.is_container());
        assert!(note.is_attachments_item());

        let rating = Item::new(ItemKind::Rating(RatingItem::default()));
        assert!(!rating.is_container());
        assert!(!rating.is_attachments_item());
        assert_eq!(rating.spatial_width_gr(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let item = Item::with_id(
            ItemId::from_u128(7),
            ItemKind::Note(NoteItem { title: "hello".to_string(), ..Default::default() }),
        )
        .at_gr(60.0, 120.0);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["itemType"], "note");
        assert_eq!(value["title"], "hello");
        assert_eq!(value["spatialPositionGr"]["y"], 120.0);
        assert!(value.get("computedAttachments").is_none());

        let back: Item = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }
}
