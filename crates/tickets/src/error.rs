// In crates/tickets/src/error.rs

use core_types::TicketStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Ticket {0} not found")]
    NotFound(String),

    #[error("Ticket already {0}")]
    AlreadyResolved(TicketStatus),

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    #[error("Not a valid price: {0:?}")]
    InvalidPrice(String),

    #[error("No unused ticket id found, last tried {0}")]
    IdInUse(String),

    #[error("Failed to index ticket {id} under code {code}: {source}")]
    CodeIndex {
        id: String,
        code: String,
        #[source]
        source: store::Error,
    },

    #[error("Ticket store error: {0}")]
    Store(#[from] store::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
