//! Attribute records and the paired entry type.
//!
//! The attribute stream is a fixed-width tabular format; its header
//! declares an ordered field layout that every record follows. Field
//! order is significant, so records use an insertion-ordered map.

use crate::geometry::Geometry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The field type codes the attribute format defines.
/// Anything unrecognized decodes as `Character` (pass-through text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Character,
    Numeric,
    Float,
    Logical,
    Date,
}

impl FieldKind {
    /// Map a raw type byte from a field descriptor.
    pub fn from_code(code: u8) -> Self {
        match code {
            b'N' => FieldKind::Numeric,
            b'F' => FieldKind::Float,
            b'L' => FieldKind::Logical,
            b'D' => FieldKind::Date,
            _ => FieldKind::Character,
        }
    }
}

/// One field descriptor from the attribute stream header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, at most 10 characters, trimmed of NUL padding.
    pub name: String,
    pub kind: FieldKind,
    /// Fixed byte width of this field in every record.
    pub length: u8,
}

/// A typed attribute value.
///
/// `Null` marks an absent value — an empty numeric field decodes to
/// `Null`, never to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Logical(bool),
    /// Reformatted `YYYY-MM-DD` date.
    Date(String),
    Null,
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Returns the inner string for Text and Date values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) | AttributeValue::Date(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// One decoded attribute record: field name → typed value, in the
/// header's field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    #[serde(flatten)]
    fields: IndexMap<String, AttributeValue>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.fields.get(name)
    }

    /// Convenience accessor for text-typed fields.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(AttributeValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, AttributeValue)> for AttributeRecord {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// One paired geometry + attribute record at a zero-based sequence
/// position. Entries are produced in file order; file order is the only
/// addressing scheme the dataset supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub index: u64,
    pub geometry: Geometry,
    pub attributes: AttributeRecord,
}
