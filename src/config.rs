//! Codec limits.

use crate::format::MAX_FIELD_INDEX;
use serde::{Deserialize, Serialize};

/// Default recursion limit for nested entities.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default upper bound on a decoded sequence's element count.
pub const DEFAULT_MAX_SEQUENCE_LEN: u64 = 1 << 24;

/// Limits applied at registration, encode and decode time.
///
/// Deserializable so hosts can load it from their own config files; missing
/// keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Highest wire index a schema may declare. Clamped to [`MAX_FIELD_INDEX`].
    pub max_index: u32,
    /// Deepest entity nesting accepted by the encoder and decoder.
    pub max_depth: usize,
    /// Largest element count a decoded sequence may declare.
    pub max_sequence_len: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_index: MAX_FIELD_INDEX,
            max_depth: DEFAULT_MAX_DEPTH,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }
}
