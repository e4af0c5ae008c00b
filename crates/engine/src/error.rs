// In crates/engine/src/error.rs

use messaging::DeliveryFailure;
use thiserror::Error;

/// Failures the relay cannot turn into a reply. Filtered alerts and bad
/// operator replies are not errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] store::Error),

    #[error("Ticket error: {0}")]
    Tickets(#[from] tickets::Error),

    #[error("Risk configuration error: {0}")]
    Risk(#[from] risk::Error),

    #[error("Notification failed for every recipient ({} tried)", failures.len())]
    Undelivered { failures: Vec<DeliveryFailure> },
}

pub type Result<T> = std::result::Result<T, Error>;
