//! Emoji dictionary type keyed by owned byte patterns.
//!
//! This module defines [`EmojiPattern`], a content-hashed small-vector byte
//! key, and [`EmojiTable`], the mapping from an emoji's normalized UTF-16
//! byte sequence to its human-readable description.
//!
//! ## Overview
//!
//! `EmojiTable` stores a mapping from pattern keys ([`EmojiPattern`]) to
//! description strings (`Box<str>`), along with:
//!
//! - A **global maximum pattern length** (`max_len`, in bytes)
//! - The **insertion order** of keys, used for deterministic tie-breaking
//!   when iterating patterns longest-first
//!
//! Keys are compared and hashed by content, never by identity, so two
//! patterns built from the same bytes are the same key. All patterns are
//! non-empty and of even byte length: each element of the encoded text is a
//! 2-byte code unit, and most emoji occupy one or more surrogate pairs.
//!
//! ## Example
//! ```
//! use emotext::dictionary_lib::{EmojiPattern, EmojiTable};
//!
//! let mut table = EmojiTable::new();
//! let grinning = EmojiPattern::new(&[0xD8, 0x3D, 0xDE, 0x00]).unwrap();
//! table.insert(grinning, "(grinning face)").unwrap();
//!
//! assert_eq!(table.get(&[0xD8, 0x3D, 0xDE, 0x00]), Some("(grinning face)"));
//! assert_eq!(table.max_len(), 4);
//! ```

use std::borrow::Borrow;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An emoji's on-the-wire byte sequence in normalized (big-endian pair) order.
///
/// Backed by a `SmallVec` so the common case (one surrogate pair to a few
/// joined pairs, up to 16 bytes) stays inline without a heap allocation.
/// Immutable once created; construction rejects empty and odd-length input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmojiPattern(SmallVec<[u8; 16]>);

impl EmojiPattern {
    /// Creates a pattern from normalized bytes.
    ///
    /// Returns [`TableError::InvalidPattern`] when `bytes` is empty or of
    /// odd length, since every element of the source text is a 2-byte
    /// code unit.
    pub fn new(bytes: &[u8]) -> Result<Self, TableError> {
        if bytes.is_empty() || bytes.len() % 2 != 0 {
            return Err(TableError::InvalidPattern);
        }
        Ok(EmojiPattern(SmallVec::from_slice(bytes)))
    }

    /// Builds a pattern from Unicode code points, encoding each as UTF-16
    /// and laying the units out in normalized byte order.
    ///
    /// # Example
    /// ```
    /// use emotext::dictionary_lib::EmojiPattern;
    ///
    /// // U+1F600 GRINNING FACE = surrogate pair D83D DE00
    /// let pattern = EmojiPattern::from_code_points(&[0x1F600]).unwrap();
    /// assert_eq!(pattern.as_bytes(), &[0xD8, 0x3D, 0xDE, 0x00]);
    /// ```
    pub fn from_code_points(code_points: &[u32]) -> Result<Self, TableError> {
        if code_points.is_empty() {
            return Err(TableError::InvalidPattern);
        }
        let mut bytes = SmallVec::new();
        let mut units = [0u16; 2];
        for &cp in code_points {
            let ch = char::from_u32(cp).ok_or(TableError::InvalidPattern)?;
            for unit in ch.encode_utf16(&mut units) {
                bytes.push((*unit >> 8) as u8);
                bytes.push((*unit & 0xFF) as u8);
            }
        }
        Ok(EmojiPattern(bytes))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Pattern length in bytes; always even and non-zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Hash/Eq delegate to the byte slice so `Borrow<[u8]>` lookups agree with
// the key's own hash.
impl Hash for EmojiPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_slice().hash(state);
    }
}

impl PartialEq for EmojiPattern {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

impl Eq for EmojiPattern {}

impl Borrow<[u8]> for EmojiPattern {
    fn borrow(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// Line counts reported by [`EmojiTable::from_listing`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListingStats {
    /// Entries added to the table.
    pub added: usize,
    /// Lines rejected because their pattern was already present.
    pub duplicates: usize,
    /// Lines that could not be parsed.
    pub invalid: usize,
}

/// Mapping from emoji byte patterns to parenthesized descriptions.
///
/// The table is populated once (from a listing file, a merge of several
/// sources, or a persisted artifact) and is read-only during matching and
/// substitution, which is what allows concurrent conversions against a
/// shared table without synchronization.
///
/// # Serialization
///
/// The whole structure derives `serde`, so it can be persisted as
/// zstd-compressed CBOR alongside the bit-exact binary codec format
/// (see [`crate::dictionary_lib::binary_codec`]).
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct EmojiTable {
    map: FxHashMap<EmojiPattern, Box<str>>,
    order: Vec<EmojiPattern>,
    max_len: usize,
}

impl EmojiTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Longest pattern length in bytes, `0` for an empty table.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Looks up a description by pattern bytes without allocating a key.
    pub fn get(&self, pattern: &[u8]) -> Option<&str> {
        self.map.get(pattern).map(|text| text.as_ref())
    }

    /// Inserts a pattern with its description.
    ///
    /// Fails with [`TableError::DuplicateKey`] when the pattern is already
    /// present; the earlier entry wins and the table is left unchanged.
    /// Merging from several sources must surface collisions rather than
    /// silently overwrite.
    pub fn insert(
        &mut self,
        pattern: EmojiPattern,
        text: impl Into<Box<str>>,
    ) -> Result<(), TableError> {
        if self.map.contains_key(pattern.as_bytes()) {
            return Err(TableError::DuplicateKey);
        }
        if pattern.len() > self.max_len {
            self.max_len = pattern.len();
        }
        self.order.push(pattern.clone());
        self.map.insert(pattern, text.into());
        Ok(())
    }

    /// Folds another table into this one, keeping earlier entries on key
    /// collision. Returns the number of rejected duplicates so callers can
    /// report the merge-failure count.
    pub fn merge(&mut self, other: EmojiTable) -> usize {
        let EmojiTable {
            mut map, order, ..
        } = other;
        let mut rejected = 0;
        for key in order {
            if let Some(text) = map.remove(key.as_bytes()) {
                if self.insert(key, text).is_err() {
                    rejected += 1;
                }
            }
        }
        rejected
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&EmojiPattern, &str)> {
        self.order
            .iter()
            .filter_map(|key| self.map.get(key.as_bytes()).map(|text| (key, text.as_ref())))
    }

    /// Entries ordered by pattern length descending, ties broken by
    /// insertion order.
    ///
    /// This ordering is what gives the KMP span finder its
    /// longest-match-first semantics: a longer pattern registers its start
    /// position before any shorter pattern can claim it.
    pub fn ordered_by_len_desc(&self) -> Vec<(&EmojiPattern, &str)> {
        let mut keys: Vec<&EmojiPattern> = self.order.iter().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()));
        keys.into_iter()
            .filter_map(|key| self.map.get(key.as_bytes()).map(|text| (key, text.as_ref())))
            .collect()
    }

    /// Parses a plaintext emoji listing into a table.
    ///
    /// One entry per line: space-separated code points (with or without the
    /// `U+` prefix), a tab, then the short name. Blank lines and lines
    /// starting with `#` are skipped. Descriptions are stored wrapped in
    /// parentheses, matching the convention of the upstream extraction.
    ///
    /// ```text
    /// U+1F600<TAB>grinning face
    /// U+1F1FA U+1F1F8<TAB>flag: United States
    /// ```
    ///
    /// Bad lines are reported on stderr and counted; duplicates keep the
    /// earlier entry. Neither condition aborts the load.
    pub fn from_listing(content: &str) -> (EmojiTable, ListingStats) {
        let mut table = EmojiTable::new();
        let mut stats = ListingStats::default();

        for line in content.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((codes, name)) = line.split_once('\t') else {
                eprintln!("Invalid line format: {}", line);
                stats.invalid += 1;
                continue;
            };

            let mut code_points = Vec::new();
            let mut parse_ok = true;
            for token in codes.split_whitespace() {
                let hex = token.strip_prefix("U+").unwrap_or(token);
                match u32::from_str_radix(hex, 16) {
                    Ok(cp) => code_points.push(cp),
                    Err(_) => {
                        parse_ok = false;
                        break;
                    }
                }
            }

            let name = name.trim();
            if !parse_ok || code_points.is_empty() || name.is_empty() {
                eprintln!("Invalid line format: {}", line);
                stats.invalid += 1;
                continue;
            }

            match EmojiPattern::from_code_points(&code_points) {
                Ok(pattern) => match table.insert(pattern, format!("({})", name)) {
                    Ok(()) => stats.added += 1,
                    Err(_) => stats.duplicates += 1,
                },
                Err(_) => {
                    eprintln!("Invalid line format: {}", line);
                    stats.invalid += 1;
                }
            }
        }

        (table, stats)
    }
}

/// Errors raised while building or mutating an [`EmojiTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The pattern is already present; the earlier entry wins.
    DuplicateKey,
    /// Empty or odd-length pattern, or a code point outside Unicode.
    InvalidPattern,
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::DuplicateKey => write!(f, "pattern already present in table"),
            TableError::InvalidPattern => write!(f, "pattern must be non-empty with even byte length"),
        }
    }
}

impl std::error::Error for TableError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_odd_patterns() {
        assert_eq!(EmojiPattern::new(&[]), Err(TableError::InvalidPattern));
        assert_eq!(
            EmojiPattern::new(&[0xD8, 0x3D, 0xDE]),
            Err(TableError::InvalidPattern)
        );
        assert!(EmojiPattern::new(&[0xD8, 0x3D]).is_ok());
    }

    #[test]
    fn code_points_encode_in_normalized_order() {
        let flag = EmojiPattern::from_code_points(&[0x1F1FA, 0x1F1F8]).unwrap();
        assert_eq!(
            flag.as_bytes(),
            &[0xD8, 0x3C, 0xDD, 0xFA, 0xD8, 0x3C, 0xDD, 0xF8]
        );

        let copyright = EmojiPattern::from_code_points(&[0xA9]).unwrap();
        assert_eq!(copyright.as_bytes(), &[0x00, 0xA9]);
    }

    #[test]
    fn keys_compare_by_content() {
        let a = EmojiPattern::new(&[0xD8, 0x3D, 0xDE, 0x00]).unwrap();
        let b = EmojiPattern::new(&[0xD8, 0x3D, 0xDE, 0x00]).unwrap();
        assert_eq!(a, b);

        let mut table = EmojiTable::new();
        table.insert(a, "(grinning face)").unwrap();
        assert_eq!(table.insert(b, "(other)"), Err(TableError::DuplicateKey));
        assert_eq!(table.get(&[0xD8, 0x3D, 0xDE, 0x00]), Some("(grinning face)"));
    }

    #[test]
    fn ordered_by_len_desc_breaks_ties_by_insertion() {
        let mut table = EmojiTable::new();
        table
            .insert(EmojiPattern::new(&[0x01, 0x02]).unwrap(), "(short a)")
            .unwrap();
        table
            .insert(
                EmojiPattern::new(&[0x0A, 0x0B, 0x0C, 0x0D]).unwrap(),
                "(long)",
            )
            .unwrap();
        table
            .insert(EmojiPattern::new(&[0x03, 0x04]).unwrap(), "(short b)")
            .unwrap();

        let texts: Vec<&str> = table
            .ordered_by_len_desc()
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        assert_eq!(texts, vec!["(long)", "(short a)", "(short b)"]);
        assert_eq!(table.max_len(), 4);
    }

    #[test]
    fn merge_counts_rejected_duplicates() {
        let mut base = EmojiTable::new();
        base.insert(EmojiPattern::new(&[0x01, 0x02]).unwrap(), "(one)")
            .unwrap();

        let mut other = EmojiTable::new();
        other
            .insert(EmojiPattern::new(&[0x01, 0x02]).unwrap(), "(collides)")
            .unwrap();
        other
            .insert(EmojiPattern::new(&[0x03, 0x04]).unwrap(), "(two)")
            .unwrap();

        let rejected = base.merge(other);
        assert_eq!(rejected, 1);
        assert_eq!(base.len(), 2);
        assert_eq!(base.get(&[0x01, 0x02]), Some("(one)"));
        assert_eq!(base.get(&[0x03, 0x04]), Some("(two)"));
    }

    #[test]
    fn from_listing_parses_and_wraps_descriptions() {
        let listing = "\
# comment line
U+1F600\tgrinning face
U+1F1FA U+1F1F8\tflag: United States
1F44D\tthumbs up
U+1F600\tduplicate grinning
not hex\tbroken
missing tab line
";
        let (table, stats) = EmojiTable::from_listing(listing);
        assert_eq!(stats.added, 3);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.invalid, 2);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get(&[0xD8, 0x3D, 0xDE, 0x00]),
            Some("(grinning face)")
        );
        assert_eq!(
            table.get(&[0xD8, 0x3C, 0xDD, 0xFA, 0xD8, 0x3C, 0xDD, 0xF8]),
            Some("(flag: United States)")
        );
    }
}
