use serde::{Deserialize, Serialize};

use crate::error::InputFormatError;
use crate::types::MessageId;

pub const RESTART_PAYLOAD: &str = "restart_bot";
pub const EXIT_PAYLOAD: &str = "exit_bot";

pub const GREETING: &str =
    "Hola 👋 Soy el simulador de préstamos.\nIngresa el monto del préstamo (en soles):";
pub const ASK_AMOUNT: &str = "Ingresa el monto del préstamo:";
pub const ASK_MONTHS: &str = "Ahora ingresa el tiempo en meses:";
pub const ASK_REPEAT: &str = "¿Qué deseas hacer ahora?";
pub const FAREWELL: &str = "Gracias por usar el simulador. 👋";
pub const CANCELLED: &str = "❌ Simulación cancelada.";
pub const HIDDEN: &str = "🕓 Mensaje ocultado por el bot";
pub const START_HINT: &str = "Escribe /start para iniciar una nueva simulación.";
pub const SESSION_LOST: &str =
    "⚠️ No encontré el monto de tu simulación. Empecemos de nuevo.\nIngresa el monto del préstamo:";
pub const CALCULATION_FAILED: &str =
    "❌ No pude calcular la simulación con esos datos. Ingresa el tiempo en meses:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyMarkup {
    /// Rows of inline buttons attached to the message.
    InlineKeyboard(Vec<Vec<InlineButton>>),
    /// Dismiss any custom keyboard the client is showing.
    RemoveKeyboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    pub format: TextFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<ReplyMarkup>,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            markup: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Markdown,
            markup: None,
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// What the messaging collaborator should do on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundAction {
    Send(OutboundMessage),
    /// Overwrite an earlier message with a placeholder. Best effort.
    Hide { message_id: MessageId, text: String },
}

impl OutboundAction {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        OutboundAction::Send(OutboundMessage::plain(text))
    }

    pub(crate) fn hide(message_id: MessageId) -> Self {
        OutboundAction::Hide {
            message_id,
            text: HIDDEN.to_string(),
        }
    }

    /// The text of a `Send`, if this is one.
    pub fn sent_text(&self) -> Option<&str> {
        match self {
            OutboundAction::Send(m) => Some(&m.text),
            OutboundAction::Hide { .. } => None,
        }
    }
}

pub(crate) fn repeat_keyboard() -> ReplyMarkup {
    ReplyMarkup::InlineKeyboard(vec![
        vec![InlineButton {
            label: "🔄 Otra simulación".into(),
            payload: RESTART_PAYLOAD.into(),
        }],
        vec![InlineButton {
            label: "❌ Salir".into(),
            payload: EXIT_PAYLOAD.into(),
        }],
    ])
}

pub(crate) fn invalid_amount(err: &InputFormatError) -> &'static str {
    match err {
        InputFormatError::NotPositive(_) => "❌ El monto debe ser mayor a cero.",
        _ => "❌ Ingresa un número válido para el monto.",
    }
}

pub(crate) fn invalid_months(err: &InputFormatError) -> &'static str {
    match err {
        InputFormatError::NotPositive(_) => "❌ El número de meses debe ser mayor a cero.",
        _ => "❌ Ingresa un número válido de meses.",
    }
}

pub(crate) fn term_too_long(max_months: u32) -> String {
    format!("❌ El plazo máximo es de {max_months} meses. Ingresa el tiempo en meses:")
}
