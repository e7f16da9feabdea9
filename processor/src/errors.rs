use thiserror::Error;

#[derive(Debug, Error)]
pub enum PixelError {
    #[error("malformed pixel: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PaintedMapError {
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("painted map of {width}x{height} cells is too large")]
    TooLarge { width: i64, height: i64 },
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no protection area found in guard data")]
    MissingArea,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing protection area")]
    MissingArea,
    #[error("protection area must be an object")]
    AreaNotObject,
    #[error("missing area fields: {}", .0.join(", "))]
    MissingAreaFields(Vec<&'static str>),
    #[error("originalPixels must be an array")]
    PixelsNotArray,
    #[error("no pixels to process")]
    NoPixels,
    #[error("colors must be an array")]
    ColorsNotArray,
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("protection area bounds are out of range")]
    AreaOutOfRange,
    #[error("protection area must be an object")]
    AreaNotObject,
    #[error("invalid protection area: {0}")]
    InvalidArea(#[from] serde_json::Error),
}
