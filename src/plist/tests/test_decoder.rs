#[cfg(test)]
mod decoder_tests {
    use crate::{
        error::plist::BinaryPlistError,
        plist::{self, models::Item},
    };

    /// Assemble a buffer from pre-serialized objects with 1 byte offsets
    /// and references
    fn build_plist(objects: &[Vec<u8>], root: u64) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"bplist00");
        let mut offsets = Vec::new();
        for object in objects {
            offsets.push(out.len() as u8);
            out.extend_from_slice(object);
        }
        let table_start = out.len() as u64;
        out.extend_from_slice(&offsets);
        out.extend_from_slice(&[0u8; 6]);
        out.push(1);
        out.push(1);
        out.extend_from_slice(&(objects.len() as u64).to_be_bytes());
        out.extend_from_slice(&root.to_be_bytes());
        out.extend_from_slice(&table_start.to_be_bytes());
        out
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = build_plist(&[vec![0x09]], 0);
        bytes[0] = b'x';

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::BadMagic)));
    }

    #[test]
    fn test_empty_buffer() {
        let result = plist::decode(&[]);
        assert!(matches!(result, Err(BinaryPlistError::OutOfBounds(8, 0))));
    }

    #[test]
    fn test_header_only_buffer() {
        let result = plist::decode(b"bplist00");
        assert!(matches!(
            result,
            Err(BinaryPlistError::TrailerTooShort(8))
        ));
    }

    #[test]
    fn test_offset_table_past_end() {
        let mut bytes = build_plist(&[vec![0x09]], 0);
        // Rewrite the trailer's offset table position to point past the end
        let at = bytes.len() - 8;
        bytes[at..].copy_from_slice(&1000u64.to_be_bytes());

        let result = plist::decode(&bytes);
        assert!(matches!(
            result,
            Err(BinaryPlistError::OffsetTableOutOfRange(1000, _))
        ));
    }

    #[test]
    fn test_invalid_trailer_width() {
        let mut bytes = build_plist(&[vec![0x09]], 0);
        let at = bytes.len() - 26;
        bytes[at] = 3;

        let result = plist::decode(&bytes);
        assert!(matches!(
            result,
            Err(BinaryPlistError::InvalidTrailerWidth(3))
        ));
    }

    #[test]
    fn test_unknown_marker() {
        let bytes = build_plist(&[vec![0x70]], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(
            result,
            Err(BinaryPlistError::UnknownMarker(0x70))
        ));
    }

    #[test]
    fn test_invalid_int_width() {
        // 16 byte integers are not part of the supported width set
        let bytes = build_plist(&[vec![0x14]], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(
            result,
            Err(BinaryPlistError::InvalidIntWidth(4))
        ));
    }

    #[test]
    fn test_root_index_out_of_range() {
        let bytes = build_plist(&[vec![0x09]], 5);

        let result = plist::decode(&bytes);
        assert!(matches!(
            result,
            Err(BinaryPlistError::ObjectOutOfRange(5, 1))
        ));
    }

    #[test]
    fn test_object_offset_past_end() {
        let mut bytes = build_plist(&[vec![0x09]], 0);
        // Rewrite the only offset table entry to point past the end
        let at = bytes.len() - 33;
        bytes[at] = 0xF0;

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::OutOfBounds(..))));
    }

    #[test]
    fn test_truncated_payload() {
        // Data object claiming 255 bytes in a buffer far smaller than that
        let bytes = build_plist(&[vec![0x4F, 0x10, 0xFF]], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::OutOfBounds(..))));
    }

    #[test]
    fn test_utf16_length_overflow_rejected() {
        // Long-form length of 1 << 63: doubling it for the byte count
        // overflows, which must surface as an error rather than a panic
        let mut object = vec![0x6F, 0x13];
        object.extend_from_slice(&(1u64 << 63).to_be_bytes());
        let bytes = build_plist(&[object], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::OutOfBounds(..))));
    }

    #[test]
    fn test_array_count_past_buffer_rejected() {
        // A count this large must be rejected before any backing storage
        // is reserved for it
        let mut object = vec![0xAF, 0x13];
        object.extend_from_slice(&(1u64 << 60).to_be_bytes());
        let bytes = build_plist(&[object], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::OutOfBounds(..))));
    }

    #[test]
    fn test_dict_count_past_buffer_rejected() {
        let mut object = vec![0xDF, 0x13];
        object.extend_from_slice(&(1u64 << 60).to_be_bytes());
        let bytes = build_plist(&[object], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::OutOfBounds(..))));
    }

    #[test]
    fn test_ascii_marker_rejects_non_ascii_bytes() {
        // 0x5 marker whose payload holds a two-byte UTF-8 sequence
        let bytes = build_plist(&[vec![0x52, 0xC3, 0xA9]], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(
            result,
            Err(BinaryPlistError::NonAsciiString(0xC3))
        ));
    }

    #[test]
    fn test_self_referential_array() {
        let bytes = build_plist(&[vec![0xA1, 0x00]], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(
            result,
            Err(BinaryPlistError::SelfReference(0))
        ));
    }

    #[test]
    fn test_mutually_referential_arrays() {
        let bytes = build_plist(&[vec![0xA1, 0x01], vec![0xA1, 0x00]], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::SelfReference(_))));
    }

    #[test]
    fn test_non_string_dictionary_key() {
        // Dict with one entry whose key resolves to an integer
        let dict = vec![0xD1, 0x01, 0x02];
        let key = vec![0x10, 0x05];
        let value = vec![0x09];
        let bytes = build_plist(&[dict, key, value], 0);

        let result = plist::decode(&bytes);
        assert!(matches!(result, Err(BinaryPlistError::NonStringKey(1))));
    }

    #[test]
    fn test_fill_byte_decodes_as_null() {
        let bytes = build_plist(&[vec![0x0F]], 0);

        let root = plist::decode(&bytes).unwrap();
        assert_eq!(*root, Item::Null);
    }

    #[test]
    fn test_hand_assembled_dictionary() {
        let dict = vec![0xD1, 0x01, 0x02];
        let key = vec![0x51, b'a'];
        let value = vec![0x10, 0x2A];
        let bytes = build_plist(&[dict, key, value], 0);

        let root = plist::decode(&bytes).unwrap();
        let decoded = root.as_dict().expect("Not a dictionary");
        assert_eq!(decoded.get_or("a", 0), 42);
    }

    #[test]
    fn test_unsigned_narrow_integer() {
        // A 1 byte 0xFF decodes unsigned, not as -1
        let bytes = build_plist(&[vec![0x10, 0xFF]], 0);

        let root = plist::decode(&bytes).unwrap();
        assert_eq!(root.long_value(), Some(255));
    }

    #[test]
    fn test_duplicate_keys_collapse_to_last() {
        // Both entries share the key text "a"; the later value wins the slot
        let dict = vec![0xD2, 0x01, 0x01, 0x02, 0x03];
        let key = vec![0x51, b'a'];
        let first = vec![0x10, 0x01];
        let second = vec![0x10, 0x02];
        let bytes = build_plist(&[dict, key, first, second], 0);

        let root = plist::decode(&bytes).unwrap();
        let decoded = root.as_dict().expect("Not a dictionary");
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get_or("a", 0), 2);
    }
}
