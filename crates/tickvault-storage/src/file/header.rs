//! Dataset file header format.
//!
//! # Header Layout (64 bytes)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!   0       4   magic ("TVDS")
//!   4       2   format version
//!   6       1   record kind tag
//!   7       1   reserved
//!   8       4   encoded record length
//!  12       8   record count
//!  20       4   checksum (CRC32 of bytes 0..20)
//!  24      40   zero padding
//! ```

use bytes::{Buf, BufMut};
use tickvault_common::{
    CodecError, CodecResult, Record, RecordKind, FILE_FORMAT_VERSION, FILE_HEADER_SIZE,
    FILE_MAGIC,
};

/// Offset of the checksum field in the header.
const CHECKSUM_OFFSET: usize = 20;

/// Decoded dataset file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Kind of the stored records.
    pub kind: RecordKind,
    /// Encoded length of one record in bytes.
    pub record_len: u32,
    /// Number of stored records.
    pub count: u64,
}

impl FileHeader {
    /// Creates an empty header for records of type `R`.
    #[must_use]
    pub fn for_record<R: Record>() -> Self {
        Self {
            kind: R::KIND,
            record_len: R::ENCODED_LEN as u32,
            count: 0,
        }
    }

    /// Encodes the header, computing its checksum.
    #[must_use]
    pub fn encode(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut out = [0u8; FILE_HEADER_SIZE];
        {
            let mut buf = &mut out[..];
            buf.put_slice(&FILE_MAGIC);
            buf.put_u16_le(FILE_FORMAT_VERSION);
            buf.put_u8(self.kind.as_u8());
            buf.put_u8(0);
            buf.put_u32_le(self.record_len);
            buf.put_u64_le(self.count);
        }
        let checksum = crc32fast::hash(&out[..CHECKSUM_OFFSET]);
        out[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
        out
    }

    /// Decodes a header, optionally verifying its checksum.
    pub fn decode(bytes: &[u8], verify_checksum: bool) -> CodecResult<Self> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(CodecError::invalid_header(format!(
                "expected {FILE_HEADER_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let mut buf = &bytes[..FILE_HEADER_SIZE];
        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if magic != FILE_MAGIC {
            return Err(CodecError::invalid_header("bad magic"));
        }

        let version = buf.get_u16_le();
        if version != FILE_FORMAT_VERSION {
            return Err(CodecError::invalid_header(format!(
                "unsupported format version {version}"
            )));
        }

        let kind = RecordKind::from_u8(buf.get_u8())?;
        let _reserved = buf.get_u8();
        let record_len = buf.get_u32_le();
        let count = buf.get_u64_le();
        let stored = buf.get_u32_le();

        if verify_checksum {
            let computed = crc32fast::hash(&bytes[..CHECKSUM_OFFSET]);
            if computed != stored {
                return Err(CodecError::invalid_header(format!(
                    "checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"
                )));
            }
        }

        Ok(Self {
            kind,
            record_len,
            count,
        })
    }

    /// Returns the expected file length for this header.
    #[must_use]
    pub fn file_len(&self) -> u64 {
        FILE_HEADER_SIZE as u64 + self.count * u64::from(self.record_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickvault_common::{Quote, Scalar};

    #[test]
    fn test_encode_decode() {
        let header = FileHeader {
            count: 42,
            ..FileHeader::for_record::<Quote>()
        };
        let bytes = header.encode();
        assert_eq!(&bytes[..4], b"TVDS");
        assert!(bytes[24..].iter().all(|&b| b == 0));

        let decoded = FileHeader::decode(&bytes, true).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.record_len, 40);
        assert_eq!(decoded.file_len(), 64 + 42 * 40);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut bytes = FileHeader::for_record::<Scalar>().encode();
        bytes[12] ^= 0xFF;
        assert!(matches!(
            FileHeader::decode(&bytes, true),
            Err(CodecError::InvalidHeader(_))
        ));
        // Corruption goes unnoticed without verification.
        assert_eq!(FileHeader::decode(&bytes, false).unwrap().count, 0xFF);
    }

    #[test]
    fn test_bad_magic_and_length() {
        let mut bytes = FileHeader::for_record::<Scalar>().encode();
        bytes[0] = b'X';
        assert!(FileHeader::decode(&bytes, false).is_err());
        assert!(FileHeader::decode(&bytes[..10], false).is_err());
    }

    #[test]
    fn test_unknown_kind() {
        let mut bytes = FileHeader::for_record::<Scalar>().encode();
        bytes[6] = 99;
        assert_eq!(
            FileHeader::decode(&bytes, false),
            Err(CodecError::UnknownRecordKind(99))
        );
    }
}
