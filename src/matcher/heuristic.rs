//! Dictionary-free span finder driven by UTF-16 byte structure.
//!
//! The scanner walks the normalized buffer two bytes at a time (four for
//! surrogate pairs) and classifies each code unit by its lead byte:
//!
//! - `0x00` leads: copyright/registered signs and keycap bases.
//! - `0x20..=0x30` leads: general punctuation through the symbol blocks
//!   (dingbats, arrows, misc symbols), plus the ZWJ joiner at U+200D.
//! - `0x32..=0x33` leads: enclosed CJK letters and squared symbols.
//! - `0xD8` leads: high surrogates covering the supplementary emoji planes,
//!   including regional-indicator pairs and skin tone modifiers.
//! - `0xDB 0x40` leads: the tag block used by subdivision flags.
//!
//! A small state machine tracks whether the scanner is inside an emoji
//! sequence (`InEmoji`) or bridging one through a zero-width joiner
//! (`InLink`). Start and end offsets are recorded separately; the counts
//! must balance before a span list is produced.

use crate::dictionary_lib::EmojiTable;

use super::{MatchSpan, ScanError, SpanFinder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InEmoji,
    /// Between a ZWJ and the next emoji component; the open span continues.
    InLink,
}

pub struct HeuristicSpanFinder;

impl SpanFinder for HeuristicSpanFinder {
    fn find_spans(&self, buffer: &[u8], _table: &EmojiTable) -> Result<Vec<MatchSpan>, ScanError> {
        Scan::new(buffer).run()
    }
}

struct Scan<'a> {
    buf: &'a [u8],
    state: ScanState,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl<'a> Scan<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Scan {
            buf,
            state: ScanState::Normal,
            starts: Vec::new(),
            ends: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<MatchSpan>, ScanError> {
        let len = self.buf.len();
        let mut i = 0;
        while i + 1 < len {
            i = match self.state {
                ScanState::Normal => self.step_normal(i),
                ScanState::InEmoji => self.step_in_emoji(i),
                ScanState::InLink => self.step_in_link(i),
            };
        }
        // A sequence still open at the end of the buffer closes on the
        // last byte.
        if self.state == ScanState::InEmoji {
            self.ends.push(len - 1);
        }

        if self.starts.len() != self.ends.len() {
            return Err(ScanError::SpanBookkeeping {
                starts: self.starts.len(),
                ends: self.ends.len(),
            });
        }

        Ok(self
            .starts
            .iter()
            .zip(self.ends.iter())
            .map(|(&start, &end)| MatchSpan {
                start,
                end: end + 1,
            })
            .collect())
    }

    fn step_normal(&mut self, i: usize) -> usize {
        match self.buf[i] {
            0x00 => self.step_zero_lead(i),
            0x20..=0x30 => self.step_symbol_lead(i),
            0x32..=0x33 => self.step_cjk_symbol_lead(i),
            0xD8 if i + 3 < self.buf.len() => self.step_high_surrogate(i),
            _ => {
                self.close_if_open(i);
                i + 2
            }
        }
    }

    fn step_in_emoji(&mut self, i: usize) -> usize {
        let b0 = self.buf[i];
        let b1 = self.buf[i + 1];
        if b0 == 0x00 {
            return self.step_zero_lead(i);
        }
        // ZWJ bridges to the next component of a joined sequence.
        if b0 == 0x20 && b1 == 0x0D {
            self.state = ScanState::InLink;
            return i + 2;
        }
        if (0x20..=0x30).contains(&b0) {
            return self.step_symbol_lead(i);
        }
        if b0 == 0x32 || b0 == 0x33 {
            return self.step_cjk_symbol_lead(i);
        }
        if b0 == 0xD8 && i + 3 < self.buf.len() {
            return self.step_high_surrogate(i);
        }
        // Tag block DB40 DCxx, used by subdivision flag sequences.
        if b0 == 0xDB && i + 3 <= self.buf.len() && b1 == 0x40 && self.buf[i + 2] == 0xDC {
            if i + 4 <= self.buf.len() && (0x20..=0x7E).contains(&self.buf[i + 3]) {
                return i + 4;
            }
            if i + 4 <= self.buf.len() && self.buf[i + 3] == 0x7F {
                // Cancel tag terminates the sequence.
                self.ends.push(i + 3);
                self.state = ScanState::Normal;
                return i + 4;
            }
            self.ends.push(i - 1);
            self.state = ScanState::Normal;
            return i + 2;
        }
        // Variation selector FE0F is absorbed into the open sequence.
        if b0 == 0xFE && b1 == 0x0F {
            return i + 2;
        }
        self.ends.push(i - 1);
        self.state = ScanState::Normal;
        i + 2
    }

    fn step_in_link(&mut self, i: usize) -> usize {
        match self.buf[i] {
            0x00 => self.step_zero_lead(i),
            0x20..=0x30 => self.step_symbol_lead(i),
            0x32..=0x33 => self.step_cjk_symbol_lead(i),
            0xD8 if i + 3 < self.buf.len() => self.step_high_surrogate(i),
            _ => i + 1,
        }
    }

    /// Lead byte `0x00`: copyright/registered signs and keycap sequences.
    fn step_zero_lead(&mut self, i: usize) -> usize {
        let b1 = self.buf[i + 1];
        if b1 == 0xA9 || b1 == 0xAE {
            self.note_start(i);
            self.state = ScanState::InEmoji;
            return i + 2;
        }
        // Keycap: base unit, FE0F, combining enclosing keycap 20E3.
        let keycap_base = b1 == 0x23 || b1 == 0x2A || (0x30..=0x39).contains(&b1);
        if i + 6 <= self.buf.len() && keycap_base && self.buf[i + 2] == 0xFE {
            self.note_start(i);
            self.ends.push(i + 5);
            self.state = ScanState::Normal;
            return i + 6;
        }
        self.close_if_open(i);
        i + 2
    }

    /// Lead bytes `0x20..=0x30`: punctuation and symbol blocks.
    fn step_symbol_lead(&mut self, i: usize) -> usize {
        let b0 = self.buf[i];
        let b1 = self.buf[i + 1];
        let eligible = (b0 == 0x20 && b1 >= 0x0E)
            || (0x21..=0x2F).contains(&b0)
            || (b0 == 0x30 && b1 <= 0x39);
        if eligible {
            self.note_start(i);
            self.state = ScanState::InEmoji;
        } else {
            self.close_if_open(i);
        }
        i + 2
    }

    /// Lead bytes `0x32..=0x33`: enclosed CJK letters and squared symbols.
    fn step_cjk_symbol_lead(&mut self, i: usize) -> usize {
        let b0 = self.buf[i];
        let b1 = self.buf[i + 1];
        if b0 == 0x32 || (b0 == 0x33 && b1 == 0x00) {
            self.note_start(i);
            self.state = ScanState::InEmoji;
        } else {
            self.close_if_open(i);
        }
        i + 2
    }

    /// Lead byte `0xD8`: supplementary-plane surrogate pairs. The caller
    /// guarantees `i + 3 < len`.
    fn step_high_surrogate(&mut self, i: usize) -> usize {
        let b1 = self.buf[i + 1];
        match b1 {
            0x3C => {
                if self.buf[i + 2] == 0xDD && self.buf[i + 3] >= 0xE6 {
                    // Regional indicator; only a full pair forms a flag.
                    if i + 8 <= self.buf.len()
                        && self.buf[i + 4] == 0xD8
                        && self.buf[i + 5] == 0x3C
                        && self.buf[i + 6] == 0xDD
                        && self.buf[i + 7] >= 0xE6
                    {
                        self.note_start(i);
                        self.ends.push(i + 7);
                        self.state = ScanState::Normal;
                        return i + 8;
                    }
                    self.close_if_open(i);
                    return i + 2;
                }
                if self.buf[i + 2] == 0xDF && self.state == ScanState::InEmoji {
                    if self.buf[i + 3] >= 0xFB {
                        // Skin tone modifier D83C DFFB..DFFF extends the
                        // open sequence.
                        return i + 4;
                    }
                    self.ends.push(i - 1);
                    self.state = ScanState::Normal;
                    return i + 2;
                }
                self.note_start(i);
                self.state = ScanState::InEmoji;
                i + 4
            }
            0x3D | 0x3E => {
                self.note_start(i);
                self.state = ScanState::InEmoji;
                i + 4
            }
            _ => {
                self.close_if_open(i);
                i + 2
            }
        }
    }

    /// Registers a span start at `i`, closing a previously open span first.
    /// Inside a ZWJ link the open span simply continues.
    fn note_start(&mut self, i: usize) {
        if self.state != ScanState::InLink {
            if self.state == ScanState::InEmoji {
                self.ends.push(i - 1);
            }
            self.starts.push(i);
        }
    }

    /// Closes the open span just before `i`, if there is one.
    fn close_if_open(&mut self, i: usize) {
        if self.state == ScanState::InEmoji {
            self.ends.push(i - 1);
            self.state = ScanState::Normal;
        }
    }
}
