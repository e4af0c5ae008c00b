// In crates/tickets/src/lib.rs

pub mod book;
pub mod error;
pub mod lifecycle;
pub mod shortcode;

pub use book::TicketBook;
pub use error::{Error, Result};
pub use lifecycle::{apply, parse_stop_price, Transition};
pub use shortcode::{code_for, new_ticket_id, CODE_LEN};
