use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mapping file not found: {0}")]
    MappingNotFound(String),

    #[error("Required column '{0}' missing from mapping file")]
    MissingColumn(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Only {found} valid samples, need at least {required} to split")]
    InsufficientSamples { found: usize, required: usize },

    #[error("Dropped {dropped} of {total} rows, exceeding maximum ratio {max_ratio}")]
    DropRatioExceeded {
        dropped: usize,
        total: usize,
        max_ratio: f64,
    },

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Array write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("Archive write error: {0}")]
    NpzWrite(#[from] ndarray_npy::WriteNpzError),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
