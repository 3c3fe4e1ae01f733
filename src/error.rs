use thiserror::Error;

/// Failure to read or write the saved-jobs store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read saved jobs from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Saved jobs at {path} are malformed: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize saved jobs for {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write saved jobs to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
