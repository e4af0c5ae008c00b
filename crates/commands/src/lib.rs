// In crates/commands/src/lib.rs

//! The operator's reply protocol.
//!
//! Replies are short texts typed on a phone. `parse` never fails: anything it
//! does not recognise becomes `Command::Unknown`.

use regex::Regex;
use std::sync::LazyLock;

pub const HELP_TEXT: &str = "Commands:\nY<code>=confirm • N<code>=cancel\nQ<code>=<qty> • S<code>=<stop>\nSTATUS • PAUSE • RESUME • FLAT <SYM>";

static TICKET_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Y|N|Q|S)\s*([A-Z0-9]{3})\s*(?:=\s*([0-9.]+))?$").expect("valid ticket command pattern")
});

static FLAT_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FLAT\s+([A-Z0-9]+)$").expect("valid flat command pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Confirm,
    Cancel,
    SetQty,
    SetStop,
}

impl TicketAction {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "Y" => Some(TicketAction::Confirm),
            "N" => Some(TicketAction::Cancel),
            "Q" => Some(TicketAction::SetQty),
            "S" => Some(TicketAction::SetStop),
            _ => None,
        }
    }
}

/// A reply addressed to one ticket by its short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCommand {
    pub action: TicketAction,
    pub code: String,
    /// The raw text after `=`, digits and dots only.
    pub value: Option<String>,
}

impl TicketCommand {
    /// The value as a whole quantity, if it is one.
    pub fn quantity(&self) -> Option<i64> {
        self.value.as_deref().and_then(|v| v.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Pause,
    Resume,
    Help,
    /// Reminder to flatten a position by hand. Nothing is sent to a broker.
    Flat { symbol: String },
    Ticket(TicketCommand),
    Unknown,
}

pub fn parse(text: &str) -> Command {
    let input = text.trim().to_uppercase();

    match input.as_str() {
        "STATUS" => return Command::Status,
        "PAUSE" => return Command::Pause,
        "RESUME" => return Command::Resume,
        "HELP" => return Command::Help,
        _ => {}
    }

    if let Some(caps) = FLAT_COMMAND.captures(&input) {
        return Command::Flat { symbol: caps[1].to_string() };
    }

    if let Some(caps) = TICKET_COMMAND.captures(&input) {
        if let Some(action) = TicketAction::from_letter(&caps[1]) {
            return Command::Ticket(TicketCommand {
                action,
                code: caps[2].to_string(),
                value: caps.get(3).map(|m| m.as_str().to_string()),
            });
        }
    }

    Command::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(action: TicketAction, code: &str, value: Option<&str>) -> Command {
        Command::Ticket(TicketCommand {
            action,
            code: code.to_string(),
            value: value.map(str::to_string),
        })
    }

    #[test]
    fn admin_words_ignore_case_and_padding() {
        assert_eq!(parse("status"), Command::Status);
        assert_eq!(parse("  Pause "), Command::Pause);
        assert_eq!(parse("RESUME\n"), Command::Resume);
        assert_eq!(parse("help"), Command::Help);
    }

    #[test]
    fn ticket_replies() {
        assert_eq!(parse("YAB2"), ticket(TicketAction::Confirm, "AB2", None));
        assert_eq!(parse("Q7F1=3"), ticket(TicketAction::SetQty, "7F1", Some("3")));
        assert_eq!(parse("S7F1=2450.5"), ticket(TicketAction::SetStop, "7F1", Some("2450.5")));
        assert_eq!(parse("n 0ab"), ticket(TicketAction::Cancel, "0AB", None));
        assert_eq!(parse("q 7f1 = 4"), ticket(TicketAction::SetQty, "7F1", Some("4")));
    }

    #[test]
    fn malformed_values_still_reach_the_ticket() {
        assert_eq!(parse("Q7F1=1.5"), ticket(TicketAction::SetQty, "7F1", Some("1.5")));
        assert_eq!(parse("S7F1=1.2.3"), ticket(TicketAction::SetStop, "7F1", Some("1.2.3")));
    }

    #[test]
    fn quantity_only_for_whole_numbers() {
        let qty = |text| match parse(text) {
            Command::Ticket(cmd) => cmd.quantity(),
            other => panic!("expected a ticket command, got {other:?}"),
        };
        assert_eq!(qty("Q7F1=3"), Some(3));
        assert_eq!(qty("Q7F1=1.5"), None);
        assert_eq!(qty("Q7F1"), None);
    }

    #[test]
    fn flat_takes_a_symbol() {
        assert_eq!(parse("flat mesz5"), Command::Flat { symbol: "MESZ5".into() });
        assert_eq!(parse("FLAT"), Command::Unknown);
    }

    #[test]
    fn everything_else_is_unknown() {
        for text in ["garbage", "", "Y", "YAB", "YABCD", "X7F1", "Q7F1=-3", "S7F1=abc", "STATUS NOW", "🙂"] {
            assert_eq!(parse(text), Command::Unknown, "{text:?}");
        }
    }
}
