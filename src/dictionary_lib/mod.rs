//! Dictionary types and persistence.

pub mod binary_codec;
pub mod emoji_table;

pub use binary_codec::CodecError;
pub use emoji_table::{EmojiPattern, EmojiTable, ListingStats, TableError};
