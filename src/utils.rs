//! Byte-level helpers for the UTF-16 code-unit buffers the engine works on.
//!
//! The conversion pipeline encodes input text as UTF-16LE, swaps every
//! adjacent byte pair once so all pattern tests run against a big-endian
//! layout, and swaps non-emoji runs back when assembling the output.

/// Encodes a string as UTF-16LE bytes, two bytes per code unit.
///
/// # Example
/// ```
/// use emotext::utils::utf16le_bytes;
/// assert_eq!(utf16le_bytes("A"), vec![0x41, 0x00]);
/// ```
pub fn utf16le_bytes(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Decodes UTF-16LE bytes back into a `String`.
///
/// Unpaired surrogates become U+FFFD rather than failing the conversion;
/// a trailing odd byte is ignored.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Swaps every adjacent byte pair in place, normalizing a UTF-16LE buffer
/// to the big-endian layout the span finders and table keys use.
///
/// An odd trailing byte is left untouched.
pub fn swap_pairs_in_place(buf: &mut [u8]) {
    let mut i = 0;
    while i + 1 < buf.len() {
        buf.swap(i, i + 1);
        i += 2;
    }
}

/// Appends `run` to `out` with each byte pair swapped back to the original
/// little-endian order. An odd trailing byte is appended as-is.
pub fn push_swapped(out: &mut Vec<u8>, run: &[u8]) {
    let mut chunks = run.chunks_exact(2);
    for pair in &mut chunks {
        out.push(pair[1]);
        out.push(pair[0]);
    }
    out.extend_from_slice(chunks.remainder());
}

/// Formats a number with thousands separators for tool output.
///
/// # Example
/// ```
/// use emotext::utils::format_thousand;
/// assert_eq!(format_thousand(1234567), "1,234,567");
/// ```
pub fn format_thousand(n: usize) -> String {
    let mut result_str = n.to_string();
    let mut offset = result_str.len() % 3;
    if offset == 0 {
        offset = 3;
    }

    while offset < result_str.len() {
        result_str.insert(offset, ',');
        offset += 4; // Including the added comma
    }
    result_str
}
