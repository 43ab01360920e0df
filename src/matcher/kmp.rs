//! Dictionary-driven span finder built on Knuth-Morris-Pratt search.
//!
//! Patterns are searched longest first; the first pattern to claim a start
//! position keeps it, so a longer emoji sequence always beats any of its
//! prefixes. A final pass drops spans that begin inside an earlier kept
//! span, leaving the sorted non-overlapping set the assembler expects.

use std::collections::BTreeMap;

use crate::dictionary_lib::EmojiTable;

use super::{MatchSpan, ScanError, SpanFinder};

pub struct KmpSpanFinder;

impl SpanFinder for KmpSpanFinder {
    fn find_spans(&self, buffer: &[u8], table: &EmojiTable) -> Result<Vec<MatchSpan>, ScanError> {
        // start -> end, kept sorted by start; first writer wins a start.
        let mut found: BTreeMap<usize, usize> = BTreeMap::new();

        for (pattern, _) in table.ordered_by_len_desc() {
            search_into(buffer, pattern.as_bytes(), &mut found);
        }

        let mut spans = Vec::with_capacity(found.len());
        let mut last_end = 0usize;
        for (start, end) in found {
            if start < last_end {
                continue;
            }
            spans.push(MatchSpan { start, end });
            last_end = end;
        }
        Ok(spans)
    }
}

/// Records every occurrence of `pattern` in `text` into `found`, keyed by
/// start offset. Existing entries are never overwritten.
fn search_into(text: &[u8], pattern: &[u8], found: &mut BTreeMap<usize, usize>) {
    let n = text.len();
    let m = pattern.len();
    if m == 0 || m > n {
        return;
    }

    let lps = compute_lps(pattern);
    let mut i = 0;
    let mut j = 0;
    while i < n {
        if pattern[j] == text[i] {
            i += 1;
            j += 1;
        }
        if j == m {
            found.entry(i - j).or_insert(i);
            j = lps[j - 1];
        } else if i < n && pattern[j] != text[i] {
            if j != 0 {
                j = lps[j - 1];
            } else {
                i += 1;
            }
        }
    }
}

/// Longest-proper-prefix-suffix table for the KMP failure function.
fn compute_lps(pattern: &[u8]) -> Vec<usize> {
    let mut lps = vec![0; pattern.len()];
    let mut len = 0;
    let mut i = 1;
    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            lps[i] = len;
            i += 1;
        } else if len != 0 {
            len = lps[len - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }
    lps
}
