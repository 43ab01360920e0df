//! Persistence for [`EmojiTable`].
//!
//! Two artifact formats are supported:
//!
//! - The legacy **binary format**, bit-exact with the .NET `BinaryWriter`
//!   layout the dictionaries were originally shipped in. Little-endian
//!   throughout: an `i32` entry count, then per entry an `i32` pattern
//!   length, the raw pattern bytes, a 7-bit varint description length and
//!   the UTF-8 description bytes.
//! - A **compressed format**: the whole table as CBOR, zstd-framed. Smaller
//!   and faster to load; the preferred artifact for the tools.
//!
//! Decoding never yields a partial table. Any truncation, negative length,
//! runaway varint or invalid UTF-8 fails the whole load with
//! [`CodecError::CorruptFile`]. Duplicate patterns inside one artifact are
//! skipped (earlier entry wins) and counted for the caller to report.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::emoji_table::{EmojiPattern, EmojiTable};

/// Errors raised while persisting or restoring an [`EmojiTable`].
#[derive(Debug)]
pub enum CodecError {
    /// The artifact's structure is inconsistent with its own framing.
    CorruptFile(String),
    /// Underlying filesystem failure.
    Io(String),
    /// CBOR or compression layer failure in the compressed format.
    Parse(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::CorruptFile(msg) => write!(f, "Corrupt dictionary file: {}", msg),
            CodecError::Io(msg) => write!(f, "IO error: {}", msg),
            CodecError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

/// Serializes a table into the legacy binary layout.
pub fn encode(table: &EmojiTable) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(table.len() as i32).to_le_bytes());
    for (pattern, text) in table.iter() {
        out.extend_from_slice(&(pattern.len() as i32).to_le_bytes());
        out.extend_from_slice(pattern.as_bytes());
        write_varint(&mut out, text.len() as u32);
        out.extend_from_slice(text.as_bytes());
    }
    out
}

/// Restores a table from the legacy binary layout.
///
/// Returns the table together with the number of duplicate entries that
/// were skipped. The earlier entry wins, matching the merge policy of
/// [`EmojiTable::merge`].
pub fn decode(bytes: &[u8]) -> Result<(EmojiTable, usize), CodecError> {
    let mut cursor = Cursor { bytes, pos: 0 };
    let entry_count = cursor.read_i32()?;
    if entry_count < 0 {
        return Err(CodecError::CorruptFile(format!(
            "negative entry count: {}",
            entry_count
        )));
    }

    let mut table = EmojiTable::new();
    let mut duplicates = 0;
    for _ in 0..entry_count {
        let pattern_len = cursor.read_i32()?;
        if pattern_len < 0 {
            return Err(CodecError::CorruptFile(format!(
                "negative pattern length: {}",
                pattern_len
            )));
        }
        let pattern_bytes = cursor.read_bytes(pattern_len as usize)?;
        let pattern = EmojiPattern::new(pattern_bytes).map_err(|err| {
            CodecError::CorruptFile(format!("bad pattern of length {}: {}", pattern_len, err))
        })?;

        let text_len = cursor.read_varint()?;
        let text_bytes = cursor.read_bytes(text_len as usize)?;
        let text = std::str::from_utf8(text_bytes)
            .map_err(|err| CodecError::CorruptFile(format!("description not UTF-8: {}", err)))?;

        if table.insert(pattern, text).is_err() {
            duplicates += 1;
        }
    }

    Ok((table, duplicates))
}

/// Writes the legacy binary artifact to `path`.
pub fn save<P: AsRef<Path>>(path: P, table: &EmojiTable) -> Result<(), CodecError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&encode(table))?;
    Ok(())
}

/// Loads the legacy binary artifact from `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(EmojiTable, usize), CodecError> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    decode(&bytes)
}

/// Persists the table as zstd-compressed CBOR.
pub fn save_compressed<P: AsRef<Path>>(path: P, table: &EmojiTable) -> Result<(), CodecError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = zstd::Encoder::new(writer, 19)
        .map_err(|err| CodecError::Parse(format!("zstd encoder: {}", err)))?;
    serde_cbor::to_writer(&mut encoder, table)
        .map_err(|err| CodecError::Parse(format!("CBOR serialization: {}", err)))?;
    encoder
        .finish()
        .map_err(|err| CodecError::Parse(format!("zstd finish: {}", err)))?;
    Ok(())
}

/// Restores a table persisted by [`save_compressed`].
pub fn load_compressed<P: AsRef<Path>>(path: P) -> Result<EmojiTable, CodecError> {
    let file = File::open(path)?;
    let decoder = zstd::Decoder::new(BufReader::new(file))
        .map_err(|err| CodecError::Parse(format!("zstd decoder: {}", err)))?;
    serde_cbor::from_reader(decoder)
        .map_err(|err| CodecError::Parse(format!("CBOR deserialization: {}", err)))
}

/// .NET `BinaryWriter` 7-bit encoded int: 7 payload bits per byte, high bit
/// set on every byte except the last, little-endian group order.
fn write_varint(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self.pos.checked_add(len).ok_or_else(|| {
            CodecError::CorruptFile(format!("length overflow at offset {}", self.pos))
        })?;
        if end > self.bytes.len() {
            return Err(CodecError::CorruptFile(format!(
                "unexpected end of file at offset {} (wanted {} bytes)",
                self.pos, len
            )));
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_varint(&mut self) -> Result<u32, CodecError> {
        let mut value: u32 = 0;
        let mut shift = 0;
        // At most 5 bytes encode a 32-bit value.
        for _ in 0..5 {
            let byte = self.read_bytes(1)?[0];
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
        Err(CodecError::CorruptFile(format!(
            "malformed 7-bit length at offset {}",
            self.pos
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> EmojiTable {
        let mut table = EmojiTable::new();
        table
            .insert(
                EmojiPattern::new(&[0xD8, 0x3D, 0xDE, 0x00]).unwrap(),
                "(grinning face)",
            )
            .unwrap();
        table
            .insert(
                EmojiPattern::new(&[0xD8, 0x3C, 0xDD, 0xFA, 0xD8, 0x3C, 0xDD, 0xF8]).unwrap(),
                "(flag: United States)",
            )
            .unwrap();
        table
    }

    #[test]
    fn encode_is_bit_exact() {
        let mut table = EmojiTable::new();
        table
            .insert(
                EmojiPattern::new(&[0xD8, 0x3D, 0xDE, 0x00]).unwrap(),
                "(grinning face)",
            )
            .unwrap();

        let mut expected = vec![
            0x01, 0x00, 0x00, 0x00, // entry count
            0x04, 0x00, 0x00, 0x00, // pattern length
            0xD8, 0x3D, 0xDE, 0x00, // pattern
            0x0F, // description length, one varint byte
        ];
        expected.extend_from_slice(b"(grinning face)");
        assert_eq!(encode(&table), expected);
    }

    #[test]
    fn binary_roundtrip_preserves_table() {
        let table = sample_table();
        let (restored, duplicates) = decode(&encode(&table)).unwrap();
        assert_eq!(duplicates, 0);
        assert_eq!(restored, table);
        assert_eq!(restored.max_len(), 8);
    }

    #[test]
    fn varint_uses_seven_bit_groups() {
        let mut out = Vec::new();
        write_varint(&mut out, 127);
        assert_eq!(out, vec![0x7F]);

        out.clear();
        write_varint(&mut out, 300);
        assert_eq!(out, vec![0xAC, 0x02]);

        let mut cursor = Cursor {
            bytes: &[0xAC, 0x02],
            pos: 0,
        };
        assert_eq!(cursor.read_varint().unwrap(), 300);
    }

    #[test]
    fn truncated_input_is_corrupt() {
        let full = encode(&sample_table());
        for cut in [1, 5, 9, full.len() - 1] {
            let err = decode(&full[..cut]).unwrap_err();
            assert!(
                matches!(err, CodecError::CorruptFile(_)),
                "cut at {} gave {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn negative_counts_are_corrupt() {
        let negative_count = (-1i32).to_le_bytes();
        assert!(matches!(
            decode(&negative_count).unwrap_err(),
            CodecError::CorruptFile(_)
        ));

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&(-4i32).to_le_bytes());
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::CorruptFile(_)
        ));
    }

    #[test]
    fn runaway_varint_is_corrupt() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&[0x00, 0xA9]);
        bytes.extend_from_slice(&[0x80, 0x80, 0x80, 0x80, 0x80]);
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::CorruptFile(_)
        ));
    }

    #[test]
    fn duplicate_entries_keep_earlier_and_count() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        for text in ["(first)", "(second)"] {
            bytes.extend_from_slice(&2i32.to_le_bytes());
            bytes.extend_from_slice(&[0x00, 0xA9]);
            bytes.push(text.len() as u8);
            bytes.extend_from_slice(text.as_bytes());
        }

        let (table, duplicates) = decode(&bytes).unwrap();
        assert_eq!(duplicates, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&[0x00, 0xA9]), Some("(first)"));
    }

    #[test]
    fn compressed_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emoji.zstd");

        let table = sample_table();
        save_compressed(&path, &table).unwrap();
        let restored = load_compressed(&path).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn binary_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emoji.bin");

        let table = sample_table();
        save(&path, &table).unwrap();
        let (restored, duplicates) = load(&path).unwrap();
        assert_eq!(duplicates, 0);
        assert_eq!(restored, table);
    }
}
