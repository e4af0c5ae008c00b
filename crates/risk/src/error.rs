// In crates/risk/src/error.rs

use crate::types::Rejection;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Trade signal was vetoed by risk manager: {reason}")]
    Vetoed { reason: Rejection },

    #[error("Invalid risk parameters: {0}")]
    InvalidParameters(String),
}

impl From<Rejection> for Error {
    fn from(reason: Rejection) -> Self {
        Error::Vetoed { reason }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
