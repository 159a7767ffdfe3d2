use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvoVisError {
    #[error("Missing artifact: {0}")]
    MissingArtifact(String),

    #[error("Malformed record in {file}, row {row}: {reason}")]
    MalformedRecord {
        file: String,
        row: usize,
        reason: String,
    },

    #[error("Structural error: {0}")]
    Structure(String),

    #[error("Lineage lookup failed: {0}")]
    Lookup(String),

    #[error("Invalid generation window: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvoVisError>;
