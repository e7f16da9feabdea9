use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("{path} is not a guard data object: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("could not serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("guard data could not be processed: {0}")]
    NotProcessed(String),
    #[error("nothing to render: {0}")]
    NothingToRender(&'static str),
    #[error("could not save image: {0}")]
    Image(#[from] image::ImageError),
}
