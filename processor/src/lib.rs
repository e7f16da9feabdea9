#[macro_use]
extern crate serde_derive;

mod bitmap;
pub mod constants;
pub mod errors;
mod expander;
mod normalizer;
mod record;
mod summarizer;
mod validator;

pub use crate::bitmap::{decode as decode_painted_map, PaintedMap};
pub use crate::expander::{expand_pixels, palette_lookup, tile_coords, TRANSPARENT_COLOR_ID};
pub use crate::normalizer::{normalize, painted_map, select_strategy, FormatVersion, Strategy};
pub use crate::record::{is_present, GuardRecord};
pub use crate::summarizer::{summarize, AreaInfo, GuardInfo, Summary};
pub use crate::validator::validate;
