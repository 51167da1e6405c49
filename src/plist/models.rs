/*!
 Data structures representing the objects stored in a binary plist.

 Every value in a plist is an [`Item`]; composite items own their children
 through shared [`ItemRef`] handles so that a sub-object referenced from
 several places in a decoded graph resolves to a single instance.
*/

use std::rc::Rc;

use crate::plist::{array::BpArray, dict::BpDict, set::BpSet};

/// The 8 byte magic header identifying the format
pub(crate) const MAGIC: &[u8; 8] = b"bplist00";
/// Length of the fixed trailer at the end of every buffer
pub(crate) const TRAILER_SIZE: usize = 32;

/// Null singleton marker
pub(crate) const MARKER_NULL: u8 = 0x00;
/// `false` marker
pub(crate) const MARKER_FALSE: u8 = 0x08;
/// `true` marker
pub(crate) const MARKER_TRUE: u8 = 0x09;
/// Fill byte; carries no payload and decodes as null
pub(crate) const MARKER_FILL: u8 = 0x0F;
/// Date marker, always followed by an 8 byte double
pub(crate) const MARKER_DATE: u8 = 0x33;

/// High nibble type codes for marker bytes
pub(crate) const TYPE_INT: u8 = 0x1;
pub(crate) const TYPE_REAL: u8 = 0x2;
pub(crate) const TYPE_DATE: u8 = 0x3;
pub(crate) const TYPE_DATA: u8 = 0x4;
pub(crate) const TYPE_ASCII_STRING: u8 = 0x5;
pub(crate) const TYPE_UTF16_STRING: u8 = 0x6;
pub(crate) const TYPE_UID: u8 = 0x8;
pub(crate) const TYPE_ARRAY: u8 = 0xA;
pub(crate) const TYPE_SET: u8 = 0xC;
pub(crate) const TYPE_DICT: u8 = 0xD;

/// Low nibble value meaning the length follows as an integer object
pub(crate) const LENGTH_FOLLOWS: u8 = 0xF;

/// A shared handle to an [`Item`]
///
/// Decoded graphs reuse the same handle for every reference to a given
/// object table index, so sharing is observable with [`Rc::ptr_eq`].
pub type ItemRef = Rc<Item>;

/// A single object in a binary plist
///
/// The variant set is closed; traversal is an exhaustive `match` over it.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// The null singleton; carries no payload
    Null,
    /// `true` or `false`
    Bool(bool),
    /// Signed integer, stored at full width
    Int(i64),
    /// Floating point number, serialized as 4 or 8 bytes
    Real(f64),
    /// Seconds relative to 2001-01-01T00:00:00Z
    Date(f64),
    /// Raw bytes
    Data(Vec<u8>),
    /// Text with a fixed encoding tag
    String(BpString),
    /// Unsigned integer used by keyed archives to reference other objects
    Uid(u64),
    /// Ordered sequence of items
    Array(BpArray),
    /// Unordered collection of items, array-like on the wire
    Set(BpSet),
    /// Ordered mapping from string keys to items
    Dict(BpDict),
}

impl Item {
    /// Wrap this item in a shared handle
    pub fn into_ref(self) -> ItemRef {
        Rc::new(self)
    }

    /// The integer payload truncated to 32 bits
    ///
    /// Values past the 32 bit boundary wrap two's-complement, matching the
    /// narrow accessor callers use for small fields; use [`Item::long_value`]
    /// when the full range matters.
    pub fn int_value(&self) -> Option<i32> {
        match self {
            Item::Int(value) => Some(*value as i32),
            _ => None,
        }
    }

    /// The full 64 bit integer payload
    pub fn long_value(&self) -> Option<i64> {
        match self {
            Item::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Item::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Item::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::String(string) => Some(string.as_str()),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&BpString> {
        match self {
            Item::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Item::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&BpArray> {
        match self {
            Item::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BpSet> {
        match self {
            Item::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BpDict> {
        match self {
            Item::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Item::Bool(value)
    }
}

impl From<i32> for Item {
    fn from(value: i32) -> Self {
        Item::Int(value as i64)
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Item::Int(value)
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Item::Real(value)
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Item::String(BpString::new(value))
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Item::String(BpString::new(value))
    }
}

impl From<BpString> for Item {
    fn from(value: BpString) -> Self {
        Item::String(value)
    }
}

impl From<Vec<u8>> for Item {
    fn from(value: Vec<u8>) -> Self {
        Item::Data(value)
    }
}

impl From<BpArray> for Item {
    fn from(value: BpArray) -> Self {
        Item::Array(value)
    }
}

impl From<BpSet> for Item {
    fn from(value: BpSet) -> Self {
        Item::Set(value)
    }
}

impl From<BpDict> for Item {
    fn from(value: BpDict) -> Self {
        Item::Dict(value)
    }
}

/// How a string serializes on the wire
///
/// The tag is fixed when the string is constructed and never re-derived
/// from the text afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringEncoding {
    /// One byte per character
    Ascii,
    /// Big-endian UTF-16 code units, two bytes each
    Utf16,
}

/// Text plus the encoding it serializes with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BpString {
    text: String,
    encoding: StringEncoding,
}

impl BpString {
    /// Build a string, classifying its encoding from the code points:
    /// anything outside 7 bit ASCII forces UTF-16, an empty string is ASCII
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let encoding = if text.is_ascii() {
            StringEncoding::Ascii
        } else {
            StringEncoding::Utf16
        };
        Self { text, encoding }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }
}

impl From<&str> for BpString {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for BpString {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl std::fmt::Display for BpString {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.text)
    }
}
