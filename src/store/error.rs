use std::{io, path::PathBuf};

/// Errors raised by the persistence layer
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Reading or writing the library file failed
    #[error("Library I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The library file exists but is not valid
    #[error("Library file {path} is corrupt: {source}")]
    Corrupt {
        /// File read
        path: PathBuf,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The library could not be serialized
    #[error("Failed to encode library: {0}")]
    Encode(#[from] serde_json::Error),

    /// Referenced record does not exist
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind
        kind: &'static str,
        /// Record id
        id: i64,
    },
}
