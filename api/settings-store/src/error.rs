use snafu::Snafu;

use crate::store;

/// Possible errors from settings operations.  Each condition is a distinct variant so that
/// callers can tell a document that's gone from one that couldn't be written, and retry as they
/// see fit; nothing here is retried internally.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("Settings '{}' not found", key))]
    NotFound { key: String },

    #[snafu(display("Cannot overwrite existing settings '{}'", key))]
    AlreadyExists { key: String },

    #[snafu(display("Cannot read settings '{}': {}", key, source))]
    ReadFailed { key: String, source: store::Error },

    #[snafu(display("Cannot write settings '{}': {}", key, source))]
    WriteFailed { key: String, source: store::Error },

    // Not recoverable; seeing this means the diff logic is broken.
    #[snafu(display(
        "Settings logic error: item '{}' of '{}' is in neither stored nor working values",
        item,
        key
    ))]
    InternalInconsistency { key: String, item: String },
}

pub type Result<T> = std::result::Result<T, Error>;
