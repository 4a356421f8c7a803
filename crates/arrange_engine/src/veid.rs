//! Visual element identity and paths
//!
//! A [`Veid`] names what a visual element displays. A [`VePath`] names where it
//! is displayed: the Veid of the element followed by the Veid of every
//! ancestor up to the root. Paths are the only way nodes refer to one another.
//!
//! The text form joins segments with `-`, node first. A segment is the
//! 32 character item id with the link id, if any, in brackets:
//! `<item>[<link>]-<parent>-...-<root>`.

use crate::PathError;
use item_model::{ItemId, ITEM_ID_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DELIMITER: char = '-';

/// What a visual element displays: an item, and the link it is shown through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Veid {
    pub item_id: ItemId,
    pub link_id: Option<ItemId>,
}

impl Veid {
    pub fn new(item_id: ItemId, link_id: Option<ItemId>) -> Self {
        Self { item_id, link_id }
    }

    pub fn item(item_id: ItemId) -> Self {
        Self { item_id, link_id: None }
    }

    pub fn linked(item_id: ItemId, link_id: ItemId) -> Self {
        Self {
            item_id,
            link_id: Some(link_id),
        }
    }
}

impl fmt::Display for Veid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.link_id {
            Some(link_id) => write!(f, "{}[{}]", self.item_id, link_id),
            None => write!(f, "{}", self.item_id),
        }
    }
}

/// Address of a visual element: its Veid then each ancestor's, root last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VePath {
    segments: Vec<Veid>,
}

impl VePath {
    /// A single segment path
    pub fn root(veid: Veid) -> Self {
        Self { segments: vec![veid] }
    }

    /// Path of a child of this element
    pub fn child(&self, veid: Veid) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(veid);
        segments.extend_from_slice(&self.segments);
        Self { segments }
    }

    /// Path of the parent element, None at the root
    pub fn parent(&self) -> Option<VePath> {
        if self.segments.len() > 1 {
            Some(Self {
                segments: self.segments[1..].to_vec(),
            })
        } else {
            None
        }
    }

    /// Veid of the element this path addresses
    pub fn veid(&self) -> Veid {
        self.segments[0]
    }

    pub fn item_id(&self) -> ItemId {
        self.segments[0].item_id
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Split into the element's Veid and its parent path
    pub fn split_first(&self) -> (Veid, Option<VePath>) {
        (self.veid(), self.parent())
    }

    /// True if `ancestor` is a strict ancestor of this path
    pub fn is_descendant_of(&self, ancestor: &VePath) -> bool {
        self.segments.len() > ancestor.segments.len() && self.segments.ends_with(&ancestor.segments)
    }

    pub fn is_same_or_descendant_of(&self, ancestor: &VePath) -> bool {
        self == ancestor || self.is_descendant_of(ancestor)
    }

    /// Segments from the element up to the root
    pub fn segments(&self) -> &[Veid] {
        &self.segments
    }
}

impl fmt::Display for VePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, veid) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DELIMITER)?;
            }
            write!(f, "{}", veid)?;
        }
        Ok(())
    }
}

fn parse_id(text: &str, path: &str, segment: &str) -> Result<ItemId, PathError> {
    if text.len() != ITEM_ID_LENGTH {
        return Err(PathError::BadIdLength {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }
    text.parse().map_err(|_| PathError::InvalidId {
        path: path.to_string(),
        segment: segment.to_string(),
    })
}

fn parse_segment(segment: &str, path: &str) -> Result<Veid, PathError> {
    match segment.find('[') {
        None => Ok(Veid::item(parse_id(segment, path, segment)?)),
        Some(open) => {
            let rest = &segment[open + 1..];
            let link_text = rest.strip_suffix(']').ok_or_else(|| PathError::UnterminatedBracket {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
            let item_id = parse_id(&segment[..open], path, segment)?;
            let link_id = parse_id(link_text, path, segment)?;
            Ok(Veid::linked(item_id, link_id))
        }
    }
}

impl FromStr for VePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        if s.starts_with('[') {
            return Err(PathError::LeadingBracket(s.to_string()));
        }
        if s.contains("--") {
            return Err(PathError::DoubledDelimiter(s.to_string()));
        }
        let segments = s
            .split(DELIMITER)
            .map(|segment| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    parse_segment(segment, s)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }
}

impl TryFrom<String> for VePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VePath> for String {
    fn from(path: VePath) -> Self {
        path.to_string()
    }
}
