use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Source-side failures. Always fatal to the running step.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("page query failed: {0}")]
    Query(String),
}

/// Per-item transform failures. Whether these fail the step or are
/// skipped is decided by the configured [`SkipPolicy`](crate::batch::SkipPolicy).
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("store {store_id}: required associations unavailable: {reason}")]
    Materialize { store_id: i64, reason: String },
}

/// Chunk persist failures. Retried with the same chunk contents before
/// escalating to step failure; never partially applied.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("chunk persist failed: {0}")]
    Database(String),
}

/// Terminal failure of a step, carrying the originating error kind.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("invalid step parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("skip limit {limit} exceeded: {source}")]
    SkipLimitExceeded {
        limit: u32,
        #[source]
        source: TransformError,
    },

    #[error("chunk write failed after {attempts} attempts: {source}")]
    WriteExhausted {
        attempts: u32,
        #[source]
        source: WriteError,
    },
}

impl StepError {
    /// Short name of the originating error kind, for summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameters(_) => "invalid-parameters",
            Self::Read(_) => "read",
            Self::Transform(_) | Self::SkipLimitExceeded { .. } => "transform",
            Self::WriteExhausted { .. } => "write",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker thread failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
