//! Output assembly: splices descriptions into the non-emoji text.

use once_cell::sync::Lazy;

use crate::dictionary_lib::EmojiTable;
use crate::matcher::MatchSpan;
use crate::utils::{decode_utf16le, push_swapped, utf16le_bytes};

/// Substituted when a span's bytes are missing from the table. A not-found
/// pattern is reported through the count, never as an error.
static NOT_FOUND_PLACEHOLDER: Lazy<Vec<u8>> = Lazy::new(|| utf16le_bytes("(NO)"));

/// Walks `buffer` with a cursor, restoring non-emoji runs to their original
/// byte order and replacing each span with its description from `table`.
///
/// `spans` must be sorted ascending and non-overlapping, which both span
/// finders guarantee. Returns the assembled text and the number of spans
/// whose pattern was not in the table.
pub fn render(buffer: &[u8], spans: &[MatchSpan], table: &EmojiTable) -> (String, usize) {
    let mut out = Vec::with_capacity(buffer.len());
    let mut not_found = 0usize;
    let mut cursor = 0usize;

    for span in spans {
        let start = span.start.min(buffer.len());
        let end = span.end.min(buffer.len());
        if start < cursor || end <= start {
            continue;
        }
        push_swapped(&mut out, &buffer[cursor..start]);
        match table.get(&buffer[start..end]) {
            Some(text) => out.extend_from_slice(&utf16le_bytes(text)),
            None => {
                out.extend_from_slice(&NOT_FOUND_PLACEHOLDER);
                not_found += 1;
            }
        }
        cursor = end;
    }
    push_swapped(&mut out, &buffer[cursor..]);

    (decode_utf16le(&out), not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary_lib::EmojiPattern;
    use crate::utils::swap_pairs_in_place;

    fn normalized(text: &str) -> Vec<u8> {
        let mut buffer = utf16le_bytes(text);
        swap_pairs_in_place(&mut buffer);
        buffer
    }

    #[test]
    fn substitutes_known_span() {
        let mut table = EmojiTable::new();
        table
            .insert(
                EmojiPattern::new(&[0xD8, 0x3D, 0xDE, 0x00]).unwrap(),
                "(grinning face)",
            )
            .unwrap();

        let buffer = normalized("Hi \u{1F600}!");
        let spans = [MatchSpan { start: 6, end: 10 }];
        let (text, not_found) = render(&buffer, &spans, &table);
        assert_eq!(text, "Hi (grinning face)!");
        assert_eq!(not_found, 0);
    }

    #[test]
    fn unknown_span_gets_placeholder() {
        let table = EmojiTable::new();
        let buffer = normalized("\u{1F600}");
        let spans = [MatchSpan { start: 0, end: 4 }];
        let (text, not_found) = render(&buffer, &spans, &table);
        assert_eq!(text, "(NO)");
        assert_eq!(not_found, 1);
    }

    #[test]
    fn no_spans_is_identity() {
        let table = EmojiTable::new();
        let buffer = normalized("plain text");
        let (text, not_found) = render(&buffer, &[], &table);
        assert_eq!(text, "plain text");
        assert_eq!(not_found, 0);
    }
}
