//! Emoji-to-text substitution engine.
//!
//! `emotext` locates emoji sequences inside text and replaces each with a
//! human-readable description from a precomputed dictionary. Matching runs
//! over the UTF-16 code units of the input, normalized to big-endian byte
//! order, using one of two strategies:
//!
//! - [`Strategy::PatternMatch`]: exact dictionary search (KMP), longest
//!   match first.
//! - [`Strategy::Heuristic`]: a dictionary-free byte scanner that
//!   recognizes emoji structure; unknown sequences render as `"(NO)"`.
//!
//! # Example
//! ```
//! use emotext::dictionary_lib::{EmojiPattern, EmojiTable};
//! use emotext::{EmojiText, Strategy};
//!
//! let mut table = EmojiTable::new();
//! let grinning = EmojiPattern::from_code_points(&[0x1F600]).unwrap();
//! table.insert(grinning, "(grinning face)").unwrap();
//!
//! let engine = EmojiText::new(table);
//! let out = engine.convert("Hi \u{1F600}!", Strategy::PatternMatch).unwrap();
//! assert_eq!(out.text, "Hi (grinning face)!");
//! assert_eq!(out.not_found, 0);
//! ```

use std::path::Path;
use std::sync::Mutex;

use rayon::prelude::*;

pub mod assembler;
pub mod dictionary_lib;
pub mod matcher;
pub mod utils;

use dictionary_lib::{CodecError, EmojiTable};
use matcher::{HeuristicSpanFinder, KmpSpanFinder, ScanError, SpanFinder};
use utils::{swap_pairs_in_place, utf16le_bytes};

static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

/// Span-finding strategy for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Exact dictionary matching, longest pattern first.
    PatternMatch,
    /// Structural byte scanning; does not consult the dictionary for
    /// span boundaries.
    Heuristic,
}

impl Strategy {
    /// Parses a strategy name as used by the CLI tools.
    pub fn from_str_option(name: &str) -> Option<Strategy> {
        match name {
            "kmp" | "pattern" => Some(Strategy::PatternMatch),
            "heuristic" | "scan" => Some(Strategy::Heuristic),
            _ => None,
        }
    }
}

/// Result of one conversion: the output text and how many recognized spans
/// had no dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub text: String,
    pub not_found: usize,
}

/// Source of an emoji dictionary.
///
/// The shipped implementation reads a plaintext listing; other producers
/// (such as a crawler over the published emoji tables) plug in behind the
/// same seam.
pub trait TableSource {
    fn extract(&self) -> Result<EmojiTable, String>;
}

/// Builds a table from a plaintext emoji listing file.
pub struct ListingSource {
    pub path: std::path::PathBuf,
}

impl TableSource for ListingSource {
    fn extract(&self) -> Result<EmojiTable, String> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| format!("Failed to read {}: {}", self.path.display(), err))?;
        let (table, stats) = EmojiTable::from_listing(&content);
        if stats.invalid > 0 {
            set_last_error(&format!("{} invalid listing lines skipped", stats.invalid));
        }
        Ok(table)
    }
}

/// The conversion engine. Owns a loaded [`EmojiTable`]; the table is
/// read-only after construction, so one engine can serve concurrent
/// conversions without locking.
pub struct EmojiText {
    table: EmojiTable,
    is_parallel: bool,
}

impl EmojiText {
    pub fn new(table: EmojiTable) -> Self {
        EmojiText {
            table,
            is_parallel: true,
        }
    }

    /// Loads an engine from a legacy binary dictionary artifact. Skipped
    /// duplicates are reported through [`get_last_error`].
    pub fn from_binary_path<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let (table, duplicates) = dictionary_lib::binary_codec::load(path)?;
        if duplicates > 0 {
            set_last_error(&format!("{} duplicate dictionary entries skipped", duplicates));
        }
        Ok(EmojiText::new(table))
    }

    /// Loads an engine from a zstd-compressed CBOR dictionary artifact.
    pub fn from_compressed_path<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let table = dictionary_lib::binary_codec::load_compressed(path)?;
        Ok(EmojiText::new(table))
    }

    pub fn table(&self) -> &EmojiTable {
        &self.table
    }

    pub fn get_parallel(&self) -> bool {
        self.is_parallel
    }

    /// Enables or disables rayon parallelism for [`convert_batch`].
    ///
    /// [`convert_batch`]: EmojiText::convert_batch
    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.is_parallel = is_parallel;
    }

    /// Converts one input. Empty input yields empty output with a zero
    /// not-found count.
    pub fn convert(&self, input: &str, strategy: Strategy) -> Result<Conversion, ScanError> {
        if input.is_empty() {
            return Ok(Conversion {
                text: String::new(),
                not_found: 0,
            });
        }

        let mut buffer = utf16le_bytes(input);
        swap_pairs_in_place(&mut buffer);

        let spans = match strategy {
            Strategy::PatternMatch => KmpSpanFinder.find_spans(&buffer, &self.table)?,
            Strategy::Heuristic => HeuristicSpanFinder.find_spans(&buffer, &self.table)?,
        };

        let (text, not_found) = assembler::render(&buffer, &spans, &self.table);
        Ok(Conversion { text, not_found })
    }

    /// Converts a batch of inputs, in parallel when enabled. Each input
    /// succeeds or fails independently.
    pub fn convert_batch(
        &self,
        inputs: &[&str],
        strategy: Strategy,
    ) -> Vec<Result<Conversion, ScanError>> {
        if self.is_parallel {
            inputs
                .par_iter()
                .map(|input| self.convert(input, strategy))
                .collect()
        } else {
            inputs
                .iter()
                .map(|input| self.convert(input, strategy))
                .collect()
        }
    }
}

/// Records a diagnostic message retrievable by [`get_last_error`].
pub fn set_last_error(err_msg: &str) {
    let mut last_error = LAST_ERROR.lock().unwrap();
    *last_error = Some(err_msg.to_string());
}

/// Takes no action on the stored message; returns a copy if one exists.
pub fn get_last_error() -> Option<String> {
    let last_error = LAST_ERROR.lock().unwrap();
    last_error.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictionary_lib::EmojiPattern;

    fn sample_engine() -> EmojiText {
        let mut table = EmojiTable::new();
        table
            .insert(
                EmojiPattern::from_code_points(&[0x1F600]).unwrap(),
                "(grinning face)",
            )
            .unwrap();
        table
            .insert(
                EmojiPattern::from_code_points(&[0x1F1FA, 0x1F1F8]).unwrap(),
                "(flag: United States)",
            )
            .unwrap();
        EmojiText::new(table)
    }

    #[test]
    fn empty_input_converts_to_empty_output() {
        let engine = sample_engine();
        for strategy in [Strategy::PatternMatch, Strategy::Heuristic] {
            let out = engine.convert("", strategy).unwrap();
            assert_eq!(out.text, "");
            assert_eq!(out.not_found, 0);
        }
    }

    #[test]
    fn pattern_match_substitutes_descriptions() {
        let engine = sample_engine();
        let out = engine
            .convert("Go \u{1F1FA}\u{1F1F8}!", Strategy::PatternMatch)
            .unwrap();
        assert_eq!(out.text, "Go (flag: United States)!");
        assert_eq!(out.not_found, 0);
    }

    #[test]
    fn heuristic_flags_unknown_sequences() {
        let engine = sample_engine();
        let out = engine.convert("\u{A9}", Strategy::Heuristic).unwrap();
        assert_eq!(out.text, "(NO)");
        assert_eq!(out.not_found, 1);
    }

    #[test]
    fn strategies_agree_on_dictionary_inputs() {
        let engine = sample_engine();
        let input = "a \u{1F600} b \u{1F1FA}\u{1F1F8} c";
        let kmp = engine.convert(input, Strategy::PatternMatch).unwrap();
        let heuristic = engine.convert(input, Strategy::Heuristic).unwrap();
        assert_eq!(kmp, heuristic);
    }

    #[test]
    fn batch_preserves_input_order() {
        let mut engine = sample_engine();
        let inputs = ["\u{1F600}", "plain", ""];
        for parallel in [true, false] {
            engine.set_parallel(parallel);
            let results = engine.convert_batch(&inputs, Strategy::PatternMatch);
            let texts: Vec<String> = results
                .into_iter()
                .map(|r| r.unwrap().text)
                .collect();
            assert_eq!(texts, vec!["(grinning face)", "plain", ""]);
        }
    }

    #[test]
    fn last_error_roundtrip() {
        set_last_error("boom");
        assert_eq!(get_last_error().as_deref(), Some("boom"));
    }
}
