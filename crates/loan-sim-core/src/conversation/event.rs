use serde::{Deserialize, Serialize};

use crate::types::{ChatId, MessageId, UserId};

/// Where a user is in the amount → months → repeat dialogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversationState {
    #[default]
    AwaitingAmount,
    AwaitingMonths,
    AwaitingRepeatChoice,
    Ended,
}

impl ConversationState {
    pub fn is_active(self) -> bool {
        self != ConversationState::Ended
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Cancel,
    Other(String),
}

impl Command {
    /// Parse `/name` or `/name@botname`, ignoring any arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word).to_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "cancel" => Command::Cancel,
            _ => Command::Other(name),
        })
    }
}

/// Something the messaging platform delivered on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Text(String),
    /// Inline-keyboard press carrying the button's callback payload.
    Button(String),
    Command(Command),
}

impl Event {
    pub fn cancel() -> Self {
        Event::Command(Command::Cancel)
    }

    pub fn start() -> Self {
        Event::Command(Command::Start)
    }

    /// Classify raw chat text: `/command` or free text.
    pub fn from_text(text: &str) -> Self {
        match Command::parse(text) {
            Some(command) => Event::Command(command),
            None => Event::Text(text.to_string()),
        }
    }
}

/// An [`Event`] together with the platform keys it arrived under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbound {
    pub user_id: UserId,
    pub chat_id: ChatId,
    /// Platform id of the user's message, when there is one (button presses have none).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /Cancel  "), Some(Command::Cancel));
        assert_eq!(Command::parse("/start@SimPrestBot now"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Other("help".into())));
        assert_eq!(Command::parse("1500"), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn test_event_from_text() {
        assert_eq!(Event::from_text("/cancel"), Event::cancel());
        assert_eq!(Event::from_text("2500"), Event::Text("2500".into()));
    }
}
