use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

/// Edge length of a canvas tile. The downstream worker shards the canvas with
/// the same value; changing it here without changing it there breaks every
/// `tileX`/`localX` we emit.
pub const TILE_SIZE: i64 = 1000;

pub const DEFAULT_VERSION: &str = "1.0";

/// Largest painted map we unpack, in cells (an 8192x8192 area).
pub const MAX_PAINTED_MAP_CELLS: usize = 1 << 26;

// Characters outside the alphabet are dropped before decoding, padding must
// be complete.
pub const PAINTED_MAP_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);
