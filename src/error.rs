use thiserror::Error;

/// Top-level error type for roof generation.
#[derive(Debug, Error)]
pub enum RooflineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the mesh arena.
///
/// These indicate a construction bug rather than bad input and are never retried.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to mesh operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while computing or consuming a straight skeleton.
#[derive(Debug, Error)]
pub enum SkeletonError {
    #[error("invalid footprint ({points} points): {reason}")]
    InvalidGeometry { points: usize, reason: String },

    #[error("unprocessable footprint: {0}")]
    Degenerate(String),

    #[error("unsupported footprint: {0}")]
    Unsupported(String),
}

/// Errors raised when validating a roof configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{option} = {value} must be {requirement}")]
    OutOfRange {
        option: &'static str,
        value: f64,
        requirement: &'static str,
    },
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`RooflineError`].
pub type Result<T> = std::result::Result<T, RooflineError>;
