//! Span finders over normalized UTF-16 byte buffers.
//!
//! A span finder looks at a buffer whose byte pairs have been normalized to
//! big-endian order and reports where emoji sequences sit. Two strategies
//! implement the same contract:
//!
//! - [`KmpSpanFinder`] consults the dictionary and finds exact pattern
//!   occurrences, longest match first.
//! - [`HeuristicSpanFinder`] recognizes emoji structure from byte classes
//!   alone, without touching the dictionary.
//!
//! Both emit spans sorted ascending by start with no overlaps, which is
//! what the assembler's single cursor walk relies on.

pub mod heuristic;
pub mod kmp;

pub use heuristic::HeuristicSpanFinder;
pub use kmp::KmpSpanFinder;

use crate::dictionary_lib::EmojiTable;

/// A half-open byte interval `[start, end)` inside the normalized buffer.
///
/// Spans always cover whole code units, so `start` and `end` are even and
/// `end - start >= 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Fatal scan failures. A conversion that hits one produces no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// The scanner recorded an unequal number of span starts and ends,
    /// so the span list cannot be trusted.
    SpanBookkeeping { starts: usize, ends: usize },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::SpanBookkeeping { starts, ends } => write!(
                f,
                "span bookkeeping mismatch: {} starts, {} ends",
                starts, ends
            ),
        }
    }
}

impl std::error::Error for ScanError {}

/// Strategy seam between the engine and the two scanners.
pub trait SpanFinder {
    /// Reports emoji spans in `buffer`, sorted ascending and
    /// non-overlapping. `buffer` is in normalized (big-endian pair) order.
    fn find_spans(&self, buffer: &[u8], table: &EmojiTable) -> Result<Vec<MatchSpan>, ScanError>;
}
