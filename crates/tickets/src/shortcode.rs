// In crates/tickets/src/shortcode.rs

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const CODE_LEN: usize = 3;

/// Derives the reply code of a ticket id.
///
/// The code is the first two and the last hex digit of the id's SHA-256,
/// uppercased: 4096 possible codes. Two pending tickets can share a code;
/// `TicketBook` re-rolls the id when that happens.
pub fn code_for(ticket_id: &str) -> String {
    let digest = hex::encode(Sha256::digest(ticket_id.as_bytes()));
    let mut code = String::with_capacity(CODE_LEN);
    code.push_str(&digest[..2]);
    code.push_str(&digest[digest.len() - 1..]);
    code.to_uppercase()
}

/// A fresh ticket id: the first 8 hex digits of a v4 UUID, uppercased.
pub fn new_ticket_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_digest_head_and_tail() {
        assert_eq!(code_for("A1B2C3D4"), "764");
        assert_eq!(code_for("0C1D2E3F"), "EF1");
        assert_eq!(code_for("AAAA0003"), "01A");
    }

    #[test]
    fn code_is_deterministic_uppercase_hex() {
        let id = new_ticket_id();
        let code = code_for(&id);
        assert_eq!(code, code_for(&id));
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn ids_are_eight_uppercase_hex_digits() {
        let id = new_ticket_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(new_ticket_id(), new_ticket_id());
    }
}
