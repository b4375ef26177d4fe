use snafu::Snafu;
use std::io;
use std::path::PathBuf;

/// Possible errors from document store operations.  A failed existence guard is not an error;
/// it's reported as `TxnOutcome::Aborted`.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("IO error on '{}': {}", path.display(), source))]
    Io { path: PathBuf, source: io::Error },

    #[snafu(display("Failed to create temporary file in '{}': {}", path.display(), source))]
    TempCreate { path: PathBuf, source: io::Error },

    #[snafu(display("Failed to move document into place at '{}': {}", path.display(), source))]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },

    #[snafu(display("Document at '{}' is not valid JSON: {}", path.display(), source))]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Failed to serialize document for '{}': {}", path.display(), source))]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Document at '{}' is not a JSON object", path.display()))]
    NotAnObject { path: PathBuf },

    #[snafu(display("Collection name '{}' has invalid format, should be [a-zA-Z0-9_-]+", name))]
    InvalidCollection { name: String },

    #[snafu(display("Document id '{}' is empty or its filename would exceed {} bytes", id, max))]
    InvalidDocumentId { id: String, max: usize },

    #[snafu(display("Document store integrity violation at {}: {}", path.display(), msg))]
    Corruption { msg: String, path: PathBuf },

    #[snafu(display("Failed to lock '{}': {}", path.display(), source))]
    Lock { path: PathBuf, source: nix::Error },

    #[snafu(display("Document store lock was poisoned by a panicked writer"))]
    Poisoned {},
}

pub type Result<T> = std::result::Result<T, Error>;
