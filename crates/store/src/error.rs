// In crates/store/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Store rejected the command: {0}")]
    Backend(String),

    #[error("Value under `{key}` is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store is misconfigured: {0}")]
    Misconfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;
