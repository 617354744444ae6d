//! Multi-step chat dialogue that collects a loan amount and term, runs the
//! amortization calculator and offers another simulation.
//!
//! The state machine is transport-agnostic: inbound platform updates become
//! [`Event`]s, and every transition yields [`OutboundAction`]s for the
//! platform adapter to execute through a [`Messenger`].

pub mod controller;
pub mod event;
pub mod input;
pub mod messages;
pub mod session;
pub mod transport;

pub use controller::{ControllerOptions, ConversationController, Transition};
pub use event::{Command, ConversationState, Event, Inbound};
pub use input::{parse_amount, parse_choice, parse_months, RepeatChoice};
pub use messages::{InlineButton, OutboundAction, OutboundMessage, ReplyMarkup, TextFormat};
pub use session::{ConversationSession, InMemorySessionStore, SessionStore};
pub use transport::{deliver, DeliveryReport, Messenger, TransportError};
