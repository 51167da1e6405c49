/*!
 Contains logic to serialize an [`Item`] graph into binary plist data.

 A depth-first walk from the root assigns every distinct object a table
 index on first visit; composites deduplicate by handle identity and all
 nulls share a single slot. Objects then serialize in table order with the
 narrowest widths that represent their values, followed by the offset table
 and the fixed trailer. Output is deterministic for a fixed input graph:
 re-encoding the same graph yields the same bytes.
*/

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::{
    error::plist::BinaryPlistError,
    plist::models::{
        BpString, Item, ItemRef, StringEncoding, LENGTH_FOLLOWS, MAGIC, MARKER_DATE,
        MARKER_FALSE, MARKER_NULL, MARKER_TRUE, TRAILER_SIZE, TYPE_ARRAY, TYPE_ASCII_STRING,
        TYPE_DATA, TYPE_DICT, TYPE_INT, TYPE_SET, TYPE_UID, TYPE_UTF16_STRING,
    },
};

/// Marker byte for a 4 byte real
const MARKER_REAL_32: u8 = 0x22;
/// Marker byte for an 8 byte real
const MARKER_REAL_64: u8 = 0x23;

/// Contains logic and state used to serialize an item graph
#[derive(Debug, Default)]
pub struct BinaryPlistEncoder {
    /// Objects in table order; the root is object 0
    objects: Vec<ItemRef>,
    /// Handle address to assigned table index
    index_of: HashMap<usize, u64>,
    /// Handles on the current walk path, used to reject reference cycles
    in_flight: HashSet<usize>,
    /// The single table slot shared by every null
    null_index: Option<u64>,
}

impl BinaryPlistEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to serialize the graph rooted at `root`
    pub fn encode(&mut self, root: &ItemRef) -> Result<Vec<u8>, BinaryPlistError> {
        self.visit(root)?;

        let count = self.objects.len();
        let ref_size = Self::ref_size_for(count)?;

        let mut table = Vec::new();
        let mut offsets = Vec::with_capacity(count);
        for object in &self.objects {
            offsets.push((MAGIC.len() + table.len()) as u64);
            self.write_object(&mut table, object, ref_size);
        }

        let offset_size = Self::offset_size_for(offsets.last().copied().unwrap_or(0));
        let mut out =
            Vec::with_capacity(MAGIC.len() + table.len() + count * offset_size + TRAILER_SIZE);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&table);

        let table_start = out.len() as u64;
        for offset in &offsets {
            push_be(&mut out, *offset, offset_size);
        }

        out.extend_from_slice(&[0u8; 6]);
        out.push(offset_size as u8);
        out.push(ref_size as u8);
        out.extend_from_slice(&(count as u64).to_be_bytes());
        out.extend_from_slice(&0u64.to_be_bytes());
        out.extend_from_slice(&table_start.to_be_bytes());
        Ok(out)
    }

    /// Assign table indexes depth-first in visitation order. Revisiting a
    /// handle already on the walk path means the graph contains itself.
    fn visit(&mut self, item: &ItemRef) -> Result<(), BinaryPlistError> {
        if matches!(item.as_ref(), Item::Null) {
            if self.null_index.is_none() {
                self.null_index = Some(self.objects.len() as u64);
                self.objects.push(Rc::clone(item));
            }
            return Ok(());
        }

        let key = Rc::as_ptr(item) as usize;
        if let Some(index) = self.index_of.get(&key) {
            if self.in_flight.contains(&key) {
                return Err(BinaryPlistError::SelfReference(*index));
            }
            return Ok(());
        }
        self.index_of.insert(key, self.objects.len() as u64);
        self.objects.push(Rc::clone(item));

        match item.as_ref() {
            Item::Array(array) => {
                self.in_flight.insert(key);
                for child in array.items().iter() {
                    self.visit(child)?;
                }
                self.in_flight.remove(&key);
            }
            Item::Set(set) => {
                self.in_flight.insert(key);
                for child in set.items().iter() {
                    self.visit(child)?;
                }
                self.in_flight.remove(&key);
            }
            Item::Dict(dict) => {
                self.in_flight.insert(key);
                for (dict_key, value) in dict.entries().iter() {
                    self.visit(dict_key)?;
                    self.visit(value)?;
                }
                self.in_flight.remove(&key);
            }
            _ => {}
        }
        Ok(())
    }

    fn write_object(&self, out: &mut Vec<u8>, item: &ItemRef, ref_size: usize) {
        match item.as_ref() {
            Item::Null => out.push(MARKER_NULL),
            Item::Bool(false) => out.push(MARKER_FALSE),
            Item::Bool(true) => out.push(MARKER_TRUE),
            Item::Int(value) => write_int(out, *value),
            Item::Real(value) => write_real(out, *value),
            Item::Date(value) => {
                out.push(MARKER_DATE);
                out.extend_from_slice(&value.to_bits().to_be_bytes());
            }
            Item::Data(bytes) => {
                write_marker(out, TYPE_DATA, bytes.len());
                out.extend_from_slice(bytes);
            }
            Item::String(string) => write_string(out, string),
            Item::Uid(value) => {
                let width = uint_width(*value);
                out.push((TYPE_UID << 4) | (width - 1) as u8);
                push_be(out, *value, width);
            }
            Item::Array(array) => {
                let items = array.items();
                write_marker(out, TYPE_ARRAY, items.len());
                for child in items.iter() {
                    push_be(out, self.object_index(child), ref_size);
                }
            }
            Item::Set(set) => {
                let items = set.items();
                write_marker(out, TYPE_SET, items.len());
                for child in items.iter() {
                    push_be(out, self.object_index(child), ref_size);
                }
            }
            Item::Dict(dict) => {
                let entries = dict.entries();
                write_marker(out, TYPE_DICT, entries.len());
                for (key, _) in entries.iter() {
                    push_be(out, self.object_index(key), ref_size);
                }
                for (_, value) in entries.iter() {
                    push_be(out, self.object_index(value), ref_size);
                }
            }
        }
    }

    fn object_index(&self, item: &ItemRef) -> u64 {
        if matches!(item.as_ref(), Item::Null) {
            // visit allocated the shared slot before anything references it
            return match self.null_index {
                Some(index) => index,
                None => unreachable!(),
            };
        }
        match self.index_of.get(&(Rc::as_ptr(item) as usize)) {
            Some(index) => *index,
            // visit assigned an index to every reachable object
            None => unreachable!(),
        }
    }

    /// The narrowest reference width able to index `count - 1`
    fn ref_size_for(count: usize) -> Result<usize, BinaryPlistError> {
        let max_index = count.saturating_sub(1) as u64;
        if max_index <= u8::MAX as u64 {
            Ok(1)
        } else if max_index <= u16::MAX as u64 {
            Ok(2)
        } else if max_index <= u32::MAX as u64 {
            Ok(4)
        } else {
            Err(BinaryPlistError::TooManyObjects(count))
        }
    }

    /// The narrowest offset width able to represent the largest offset
    fn offset_size_for(max_offset: u64) -> usize {
        if max_offset <= u8::MAX as u64 {
            1
        } else if max_offset <= u16::MAX as u64 {
            2
        } else if max_offset <= u32::MAX as u64 {
            4
        } else {
            8
        }
    }
}

/// Append the low `width` bytes of `value`, big-endian
fn push_be(out: &mut Vec<u8>, value: u64, width: usize) {
    out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

/// The minimal number of bytes holding `value`
fn uint_width(value: u64) -> usize {
    if value <= u8::MAX as u64 {
        1
    } else if value <= u16::MAX as u64 {
        2
    } else if value <= u32::MAX as u64 {
        4
    } else {
        8
    }
}

fn write_marker(out: &mut Vec<u8>, type_code: u8, length: usize) {
    if length < LENGTH_FOLLOWS as usize {
        out.push((type_code << 4) | length as u8);
    } else {
        out.push((type_code << 4) | LENGTH_FOLLOWS);
        write_int(out, length as i64);
    }
}

fn write_int(out: &mut Vec<u8>, value: i64) {
    // Narrow widths decode as unsigned, so negative values keep 8 bytes
    let (exponent, width): (u8, usize) = if value < 0 {
        (3, 8)
    } else {
        match uint_width(value as u64) {
            1 => (0, 1),
            2 => (1, 2),
            4 => (2, 4),
            _ => (3, 8),
        }
    };
    out.push((TYPE_INT << 4) | exponent);
    push_be(out, value as u64, width);
}

fn write_real(out: &mut Vec<u8>, value: f64) {
    if value as f32 as f64 == value {
        out.push(MARKER_REAL_32);
        out.extend_from_slice(&(value as f32).to_bits().to_be_bytes());
    } else {
        out.push(MARKER_REAL_64);
        out.extend_from_slice(&value.to_bits().to_be_bytes());
    }
}

fn write_string(out: &mut Vec<u8>, string: &BpString) {
    match string.encoding() {
        StringEncoding::Ascii => {
            let bytes = string.as_str().as_bytes();
            write_marker(out, TYPE_ASCII_STRING, bytes.len());
            out.extend_from_slice(bytes);
        }
        StringEncoding::Utf16 => {
            let units: Vec<u16> = string.as_str().encode_utf16().collect();
            write_marker(out, TYPE_UTF16_STRING, units.len());
            for unit in units {
                out.extend_from_slice(&unit.to_be_bytes());
            }
        }
    }
}
