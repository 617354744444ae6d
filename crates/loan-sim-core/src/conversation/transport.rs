//! Seam to the messaging platform.
//!
//! The platform adapter implements [`Messenger`]; [`deliver`] carries out a
//! [`Transition`]'s actions against it and feeds the ids of sent messages
//! back into the user's session.

use thiserror::Error;

use super::controller::{ConversationController, Transition};
use super::messages::{OutboundAction, OutboundMessage};
use super::session::SessionStore;
use crate::types::{ChatId, MessageId, UserId};
use crate::LoanSimError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    Send(String),

    #[error("edit of message {message_id} failed: {reason}")]
    Edit { message_id: MessageId, reason: String },

    #[error("transport closed")]
    Closed,
}

impl From<TransportError> for LoanSimError {
    fn from(e: TransportError) -> Self {
        LoanSimError::Transport(e.to_string())
    }
}

/// Outbound half of the messaging platform.
pub trait Messenger {
    fn send_text(
        &mut self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageId, TransportError>;

    fn edit_text(
        &mut self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub hidden: usize,
    pub failed: usize,
    /// The messenger reported [`TransportError::Closed`]; later actions were skipped.
    pub closed: bool,
}

/// Execute `transition.outputs` in order.
///
/// A failed send is logged and counted; the remaining actions still run.
/// A failed hide is cosmetic and only logged at debug level. A closed
/// transport stops delivery and counts the skipped sends as failed.
pub fn deliver<S, M>(
    controller: &ConversationController<S>,
    user_id: UserId,
    chat_id: ChatId,
    messenger: &mut M,
    transition: &Transition,
) -> DeliveryReport
where
    S: SessionStore,
    M: Messenger + ?Sized,
{
    let mut report = DeliveryReport::default();

    for (i, action) in transition.outputs.iter().enumerate() {
        match action {
            OutboundAction::Send(message) => match messenger.send_text(chat_id, message) {
                Ok(message_id) => {
                    controller.record_bot_message(user_id, message_id);
                    report.sent += 1;
                }
                Err(TransportError::Closed) => {
                    let skipped = transition.outputs[i..]
                        .iter()
                        .filter(|a| matches!(a, OutboundAction::Send(_)))
                        .count();
                    report.closed = true;
                    report.failed += skipped;
                    tracing::warn!(user_id, chat_id, skipped, "transport closed");
                    break;
                }
                Err(e) => {
                    tracing::warn!(user_id, chat_id, error = %e, "failed to send message");
                    report.failed += 1;
                }
            },
            OutboundAction::Hide { message_id, text } => {
                match messenger.edit_text(chat_id, *message_id, text) {
                    Ok(()) => report.hidden += 1,
                    Err(e) => {
                        tracing::debug!(user_id, message_id, error = %e, "could not hide message");
                    }
                }
            }
        }
    }

    report
}
