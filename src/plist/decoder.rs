/*!
 Contains logic to parse binary plist data into an [`Item`] graph.

 Decoding runs in stages: validate the `bplist00` header, read the fixed
 32 byte trailer, read the offset table it points at, then resolve objects
 on demand through a slot-per-index cache. Composite objects are resolved
 shallow first, holding only the object table indexes of their children,
 and expanded exactly once afterwards; the cache guarantees that every
 reference to the same index yields the same instance, and an in-flight set
 turns reference cycles into an error instead of infinite recursion.

 Decoding is all-or-nothing: any failure surfaces as a single
 [`BinaryPlistError`] and no partial graph is returned.
*/

use std::rc::Rc;

use crate::{
    error::plist::BinaryPlistError,
    plist::{
        array::BpArray,
        dict::BpDict,
        models::{
            BpString, Item, ItemRef, LENGTH_FOLLOWS, MAGIC, MARKER_DATE, MARKER_FALSE,
            MARKER_FILL, MARKER_NULL, MARKER_TRUE, TRAILER_SIZE, TYPE_ARRAY, TYPE_ASCII_STRING,
            TYPE_DATA, TYPE_DATE, TYPE_DICT, TYPE_INT, TYPE_REAL, TYPE_SET, TYPE_UID,
            TYPE_UTF16_STRING,
        },
        reader::StreamReader,
        set::BpSet,
    },
};

/// The fixed 32 byte footer: 6 reserved bytes, the two field widths, the
/// object count, the root object index, and the offset table position
#[derive(Debug)]
pub(crate) struct Trailer {
    pub offset_size: u8,
    pub ref_size: u8,
    pub object_count: u64,
    pub root_index: u64,
    pub table_start: u64,
}

/// Contains logic and state used to parse a binary plist buffer
#[derive(Debug)]
pub struct BinaryPlistDecoder<'a> {
    /// The buffer we want to parse
    reader: StreamReader<'a>,
    /// Absolute byte offset of every object, indexed by object table index
    offsets: Vec<u64>,
    /// Width in bytes of an object reference
    ref_size: u8,
    /// Resolution cache; each slot fills exactly once
    slots: Vec<Option<ItemRef>>,
    /// Objects currently being expanded, used to reject reference cycles
    in_flight: Vec<bool>,
}

impl<'a> BinaryPlistDecoder<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self {
            reader: StreamReader::new(stream),
            offsets: Vec::new(),
            ref_size: 1,
            slots: Vec::new(),
            in_flight: Vec::new(),
        }
    }

    /// Attempt to decode the buffer into the root item of its object graph
    pub fn decode(&mut self) -> Result<ItemRef, BinaryPlistError> {
        self.validate_header()?;
        let trailer = self.read_trailer()?;
        self.read_offset_table(&trailer)?;

        let root = self.resolve(trailer.root_index)?;
        self.expand(trailer.root_index)?;
        Ok(root)
    }

    fn validate_header(&mut self) -> Result<(), BinaryPlistError> {
        self.reader.seek(0);
        let header = self.reader.read_exact_bytes(MAGIC.len())?;
        if header != MAGIC {
            return Err(BinaryPlistError::BadMagic);
        }
        Ok(())
    }

    fn read_trailer(&mut self) -> Result<Trailer, BinaryPlistError> {
        let len = self.reader.len();
        if len < MAGIC.len() + TRAILER_SIZE {
            return Err(BinaryPlistError::TrailerTooShort(len));
        }

        self.reader.seek(len - TRAILER_SIZE);
        self.reader.skip(6);
        let offset_size = self.reader.read_u8()?;
        let ref_size = self.reader.read_u8()?;
        let object_count = self.reader.read_u64()?;
        let root_index = self.reader.read_u64()?;
        let table_start = self.reader.read_u64()?;

        if !matches!(offset_size, 1 | 2 | 4 | 8) {
            return Err(BinaryPlistError::InvalidTrailerWidth(offset_size));
        }
        if !matches!(ref_size, 1 | 2 | 4) {
            return Err(BinaryPlistError::InvalidTrailerWidth(ref_size));
        }

        // The offset table must fit between the header and the trailer
        let table_end = object_count
            .checked_mul(offset_size as u64)
            .and_then(|bytes| bytes.checked_add(table_start))
            .ok_or(BinaryPlistError::OffsetTableOutOfRange(table_start, len))?;
        if table_end > (len - TRAILER_SIZE) as u64 {
            return Err(BinaryPlistError::OffsetTableOutOfRange(table_start, len));
        }

        Ok(Trailer {
            offset_size,
            ref_size,
            object_count,
            root_index,
            table_start,
        })
    }

    fn read_offset_table(&mut self, trailer: &Trailer) -> Result<(), BinaryPlistError> {
        let count = trailer.object_count as usize;
        self.reader.seek(trailer.table_start as usize);
        self.offsets = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = self.reader.read_uint(trailer.offset_size as usize)?;
            self.offsets.push(offset);
        }
        self.ref_size = trailer.ref_size;
        self.slots = vec![None; count];
        self.in_flight = vec![false; count];
        Ok(())
    }

    /// Return the cached item for an object table index, reading it from the
    /// buffer on first use. Composites come back shallow; see [`Self::expand`].
    fn resolve(&mut self, index: u64) -> Result<ItemRef, BinaryPlistError> {
        if index >= self.offsets.len() as u64 {
            return Err(BinaryPlistError::ObjectOutOfRange(
                index,
                self.offsets.len(),
            ));
        }
        let slot = index as usize;
        if let Some(item) = &self.slots[slot] {
            return Ok(Rc::clone(item));
        }

        self.reader.seek(self.offsets[slot] as usize);
        let marker = self.reader.read_u8()?;
        let item = Rc::new(self.read_object(marker)?);
        self.slots[slot] = Some(Rc::clone(&item));
        Ok(item)
    }

    /// Populate the backing sequence of a composite exactly once, resolving
    /// each stored child index through the cache in index order
    fn expand(&mut self, index: u64) -> Result<(), BinaryPlistError> {
        let item = self.resolve(index)?;
        match item.as_ref() {
            Item::Array(array) => {
                if array.is_expanded() {
                    return Ok(());
                }
                self.enter(index)?;
                for &child in array.child_refs() {
                    let resolved = self.resolve(child)?;
                    self.expand(child)?;
                    array.push_resolved(resolved);
                }
                array.mark_expanded();
                self.leave(index);
            }
            Item::Set(set) => {
                if set.is_expanded() {
                    return Ok(());
                }
                self.enter(index)?;
                for &child in set.child_refs() {
                    let resolved = self.resolve(child)?;
                    self.expand(child)?;
                    set.push_resolved(resolved);
                }
                set.mark_expanded();
                self.leave(index);
            }
            Item::Dict(dict) => {
                if dict.is_expanded() {
                    return Ok(());
                }
                self.enter(index)?;
                for (&key_ref, &value_ref) in
                    dict.key_refs().iter().zip(dict.value_refs().iter())
                {
                    let key = self.resolve(key_ref)?;
                    let text = match key.as_ref() {
                        Item::String(string) => string.as_str().to_string(),
                        _ => return Err(BinaryPlistError::NonStringKey(key_ref)),
                    };
                    let value = self.resolve(value_ref)?;
                    self.expand(value_ref)?;
                    dict.push_resolved(&text, key, value);
                }
                dict.mark_expanded();
                self.leave(index);
            }
            _ => {}
        }
        Ok(())
    }

    fn enter(&mut self, index: u64) -> Result<(), BinaryPlistError> {
        let slot = index as usize;
        if self.in_flight[slot] {
            return Err(BinaryPlistError::SelfReference(index));
        }
        self.in_flight[slot] = true;
        Ok(())
    }

    fn leave(&mut self, index: u64) {
        self.in_flight[index as usize] = false;
    }

    /// Dispatch on a marker byte and read the object's payload. Composite
    /// objects read only their child references here, never their children.
    fn read_object(&mut self, marker: u8) -> Result<Item, BinaryPlistError> {
        match marker >> 4 {
            0x0 => match marker {
                MARKER_NULL | MARKER_FILL => Ok(Item::Null),
                MARKER_FALSE => Ok(Item::Bool(false)),
                MARKER_TRUE => Ok(Item::Bool(true)),
                other => Err(BinaryPlistError::UnknownMarker(other)),
            },
            TYPE_INT => self.read_int(marker & 0x0F),
            TYPE_REAL => self.read_real(marker & 0x0F),
            TYPE_DATE => {
                if marker != MARKER_DATE {
                    return Err(BinaryPlistError::UnknownMarker(marker));
                }
                Ok(Item::Date(f64::from_bits(self.reader.read_u64()?)))
            }
            TYPE_DATA => {
                let length = self.read_length(marker, 1)?;
                Ok(Item::Data(self.reader.read_exact_bytes(length)?.to_vec()))
            }
            TYPE_ASCII_STRING => {
                let length = self.read_length(marker, 1)?;
                let bytes = self.reader.read_exact_bytes(length)?;
                if let Some(byte) = bytes.iter().find(|byte| !byte.is_ascii()) {
                    return Err(BinaryPlistError::NonAsciiString(*byte));
                }
                // One byte per character
                let text: String = bytes.iter().map(|byte| *byte as char).collect();
                Ok(Item::String(BpString::new(text)))
            }
            TYPE_UTF16_STRING => {
                let length = self.read_length(marker, 2)?;
                let bytes = self.reader.read_exact_bytes(length * 2)?;
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                let text =
                    String::from_utf16(&units).map_err(|_| BinaryPlistError::InvalidUtf16)?;
                Ok(Item::String(BpString::new(text)))
            }
            TYPE_UID => {
                let width = (marker & 0x0F) as usize + 1;
                if width > 8 {
                    return Err(BinaryPlistError::InvalidIntWidth(marker & 0x0F));
                }
                Ok(Item::Uid(self.reader.read_uint(width)?))
            }
            TYPE_ARRAY => {
                let length = self.read_length(marker, self.ref_size as usize)?;
                let refs = self.read_refs(length)?;
                Ok(Item::Array(BpArray::unexpanded(refs)))
            }
            TYPE_SET => {
                let length = self.read_length(marker, self.ref_size as usize)?;
                let refs = self.read_refs(length)?;
                Ok(Item::Set(BpSet::unexpanded(refs)))
            }
            TYPE_DICT => {
                let length = self.read_length(marker, 2 * self.ref_size as usize)?;
                let key_refs = self.read_refs(length)?;
                let value_refs = self.read_refs(length)?;
                Ok(Item::Dict(BpDict::unexpanded(key_refs, value_refs)))
            }
            _ => Err(BinaryPlistError::UnknownMarker(marker)),
        }
    }

    fn read_int(&mut self, exponent: u8) -> Result<Item, BinaryPlistError> {
        let width = Self::int_width(exponent)?;
        let value = self.reader.read_uint(width)?;
        // 1, 2, and 4 byte integers are unsigned; only 8 byte integers
        // reinterpret as two's-complement
        Ok(Item::Int(value as i64))
    }

    fn read_real(&mut self, exponent: u8) -> Result<Item, BinaryPlistError> {
        match exponent {
            2 => Ok(Item::Real(f32::from_bits(self.reader.read_u32()?) as f64)),
            3 => Ok(Item::Real(f64::from_bits(self.reader.read_u64()?))),
            other => Err(BinaryPlistError::InvalidRealWidth(other)),
        }
    }

    /// The object length from the marker's low nibble, or from the integer
    /// object that follows when the nibble holds the long-form tag
    ///
    /// A length whose payload of `length * elem_width` bytes cannot fit in
    /// the remaining buffer is rejected here, before anything is allocated
    /// for it, so the length is untrusted input only up to this point.
    fn read_length(&mut self, marker: u8, elem_width: usize) -> Result<usize, BinaryPlistError> {
        let nibble = marker & 0x0F;
        let length = if nibble != LENGTH_FOLLOWS {
            nibble as usize
        } else {
            let int_marker = self.reader.read_u8()?;
            if int_marker >> 4 != TYPE_INT {
                return Err(BinaryPlistError::InvalidLength(int_marker));
            }
            let width = Self::int_width(int_marker & 0x0F)?;
            self.reader.read_uint(width)? as usize
        };

        let end = length
            .checked_mul(elem_width)
            .and_then(|payload| payload.checked_add(self.reader.position()))
            .ok_or(BinaryPlistError::OutOfBounds(
                usize::MAX,
                self.reader.len(),
            ))?;
        if end > self.reader.len() {
            return Err(BinaryPlistError::OutOfBounds(end, self.reader.len()));
        }
        Ok(length)
    }

    fn read_refs(&mut self, count: usize) -> Result<Vec<u64>, BinaryPlistError> {
        let mut refs = Vec::with_capacity(count);
        for _ in 0..count {
            refs.push(self.reader.read_uint(self.ref_size as usize)?);
        }
        Ok(refs)
    }

    fn int_width(exponent: u8) -> Result<usize, BinaryPlistError> {
        match exponent {
            0 => Ok(1),
            1 => Ok(2),
            2 => Ok(4),
            3 => Ok(8),
            other => Err(BinaryPlistError::InvalidIntWidth(other)),
        }
    }
}
