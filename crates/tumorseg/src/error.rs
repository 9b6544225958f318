/// Failure of an execution backend to produce a stage result.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("{backend} worker panicked before reporting a result")]
    WorkerPanicked { backend: &'static str },

    #[error("failed to start {backend} worker: {source}")]
    Spawn {
        backend: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced by the pipeline driver and its I/O helpers.
#[derive(thiserror::Error, Debug)]
pub enum SegmentError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: usize, height: usize },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
