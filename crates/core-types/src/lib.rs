// In crates/core-types/src/lib.rs

pub mod alert;
pub mod ticket;

// Re-export the most important types for easy access from other crates.
pub use alert::AlertPayload;
pub use ticket::{NewTicket, Ticket, TicketStatus};
