use snafu::Snafu;

use crate::caller::CallError;
use crate::params::ApiError;

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("Invalid {} tag '{}'", kind, tag))]
    InvalidTag { kind: &'static str, tag: String },

    #[snafu(display("Invalid {} id '{}'", kind, id))]
    InvalidId { kind: &'static str, id: String },

    #[snafu(display("Unable to serialize arguments for {}.{}: {}", facade, request, source))]
    SerializeArgs {
        facade: String,
        request: String,
        source: serde_json::Error,
    },

    #[snafu(display("Call to {}.{} failed: {}", facade, request, source))]
    Call {
        facade: String,
        request: String,
        source: CallError,
    },

    #[snafu(display("Unable to deserialize results of {}.{}: {}", facade, request, source))]
    DeserializeResults {
        facade: String,
        request: String,
        source: serde_json::Error,
    },

    #[snafu(display("Expected {} result, got {}", expected, got))]
    ResultCount { expected: usize, got: usize },

    #[snafu(display("Result of {} has neither a value nor an error", request))]
    MissingResult { request: String },

    #[snafu(display("{}", source))]
    Remote { source: ApiError },

    #[snafu(display("Watcher '{}' is stopped", id))]
    WatcherStopped { id: String },

    #[snafu(display("Must specify storage id(s)"))]
    NoStorageIds {},
}

pub type Result<T> = std::result::Result<T, Error>;
