/*!
 Contains logic and data structures used to encode and decode Apple binary
 property list (`bplist00`) data.

 ## Overview

 A binary plist is a header, an object table holding each value's serialized
 form, an offset table mapping object indexes to byte offsets, and a fixed
 32 byte trailer. Composite values address their children through
 fixed-width object references, so a sub-object shared by several parents is
 stored once and referenced everywhere.

 ## Usage

 [`decode`] parses a buffer into a graph of [`Item`](models::Item)s;
 [`encode`] serializes a graph back to bytes. Graphs are built with the
 [`BpDict`](dict::BpDict) and [`BpArray`](array::BpArray) façades:

 ```
 use binary_plist::plist::{self, dict::BpDict};

 let dict = BpDict::new().with("key1", "value1").with("key2", 14);
 let bytes = plist::encode(&dict.into_item()).unwrap();

 let root = plist::decode(&bytes).unwrap();
 let decoded = root.as_dict().unwrap();
 assert_eq!(decoded.get_or("key2", 0), 14);
 ```
*/

pub mod array;
pub mod decoder;
pub mod dict;
pub mod encoder;
pub mod models;
pub mod reader;
pub mod set;
mod tests;

use crate::{
    error::plist::BinaryPlistError,
    plist::{decoder::BinaryPlistDecoder, encoder::BinaryPlistEncoder, models::ItemRef},
};

/// Decode a buffer into the root item of its object graph
pub fn decode(stream: &[u8]) -> Result<ItemRef, BinaryPlistError> {
    BinaryPlistDecoder::new(stream).decode()
}

/// Serialize the graph rooted at `root` into binary plist bytes
pub fn encode(root: &ItemRef) -> Result<Vec<u8>, BinaryPlistError> {
    BinaryPlistEncoder::new().encode(root)
}
