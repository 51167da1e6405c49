/*!
 Errors that can happen when decoding or encoding binary plist data.
*/

use std::fmt::{Display, Formatter, Result};

/// Errors that can happen when decoding or encoding binary plist data
#[derive(Debug)]
pub enum BinaryPlistError {
    /// The buffer does not start with the `bplist00` magic header
    BadMagic,
    /// An index was requested beyond the end of the buffer: `(index, length)`
    OutOfBounds(usize, usize),
    /// The buffer is too small to hold the fixed 32-byte trailer
    TrailerTooShort(usize),
    /// The trailer describes an offset table that falls outside the buffer
    OffsetTableOutOfRange(u64, usize),
    /// An object reference points past the end of the offset table: `(index, count)`
    ObjectOutOfRange(u64, usize),
    /// A marker byte does not correspond to any known object type
    UnknownMarker(u8),
    /// An integer object declares a width other than 1, 2, 4, or 8 bytes
    InvalidIntWidth(u8),
    /// A real object declares a width other than 4 or 8 bytes
    InvalidRealWidth(u8),
    /// The trailer declares an offset or reference width outside the allowed set
    InvalidTrailerWidth(u8),
    /// An object's long-form length is not encoded as an integer object
    InvalidLength(u8),
    /// A dictionary key resolved to something other than a string
    NonStringKey(u64),
    /// An object directly or indirectly contains itself
    SelfReference(u64),
    /// A UTF-16 string payload contains an unpaired surrogate
    InvalidUtf16,
    /// An ASCII string payload contains a byte above 0x7F
    NonAsciiString(u8),
    /// The graph holds more objects than a 4-byte reference can index
    TooManyObjects(usize),
}

impl Display for BinaryPlistError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            BinaryPlistError::BadMagic => write!(fmt, "Buffer is not a bplist00 plist!"),
            BinaryPlistError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of range {len:x}!")
            }
            BinaryPlistError::TrailerTooShort(len) => {
                write!(fmt, "Buffer of {len} bytes cannot hold the 32 byte trailer!")
            }
            BinaryPlistError::OffsetTableOutOfRange(start, len) => {
                write!(fmt, "Offset table at {start:x} is outside of range {len:x}!")
            }
            BinaryPlistError::ObjectOutOfRange(idx, count) => {
                write!(fmt, "Object reference {idx} exceeds object count {count}!")
            }
            BinaryPlistError::UnknownMarker(byte) => {
                write!(fmt, "Unknown object marker: {byte:#04x}!")
            }
            BinaryPlistError::InvalidIntWidth(exp) => {
                write!(fmt, "Invalid integer width exponent: {exp}!")
            }
            BinaryPlistError::InvalidRealWidth(exp) => {
                write!(fmt, "Invalid real width exponent: {exp}!")
            }
            BinaryPlistError::InvalidTrailerWidth(width) => {
                write!(fmt, "Invalid trailer field width: {width}!")
            }
            BinaryPlistError::InvalidLength(byte) => {
                write!(fmt, "Expected an integer length object, found {byte:#04x}!")
            }
            BinaryPlistError::NonStringKey(idx) => {
                write!(fmt, "Dictionary key at object {idx} is not a string!")
            }
            BinaryPlistError::SelfReference(idx) => {
                write!(fmt, "Object {idx} contains itself!")
            }
            BinaryPlistError::InvalidUtf16 => write!(fmt, "Invalid UTF-16 string payload!"),
            BinaryPlistError::NonAsciiString(byte) => {
                write!(fmt, "ASCII string contains non-ASCII byte {byte:#04x}!")
            }
            BinaryPlistError::TooManyObjects(count) => {
                write!(fmt, "Graph of {count} objects exceeds the reference limit!")
            }
        }
    }
}
