use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error(
        "Working canvas {width}x{height} exceeds limits (max dimension {max_dimension}, max area {max_area})"
    )]
    GeometryTooLarge {
        width: u64,
        height: u64,
        max_dimension: u32,
        max_area: u64,
    },

    #[error("Failed to allocate {what} ({bytes} bytes)")]
    AllocationFailure { what: &'static str, bytes: usize },

    #[error("No source image loaded")]
    SourceUnavailable,

    #[error("A render is already in progress")]
    AlreadyProcessing,

    #[error("Render task failed: {0}")]
    RenderTask(String),

    #[error("Pixel access failed: {0}")]
    PixelAccess(String),

    #[error("Invalid source image: {0}")]
    InvalidSource(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OutlineError>;
