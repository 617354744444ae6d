use chrono::Duration;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

use super::event::{Command, ConversationState, Event, Inbound};
use super::input::{parse_amount, parse_choice, parse_months, RepeatChoice};
use super::messages::{self, OutboundAction, OutboundMessage, ReplyMarkup, EXIT_PAYLOAD, RESTART_PAYLOAD};
use super::session::{InMemorySessionStore, SessionStore};
use crate::amortization::render::render_chat;
use crate::amortization::{compute_with_table, LoanRequest, TierTable, MAX_TERM_MONTHS};
use crate::types::{ChatId, MessageId, Money, UserId};
use crate::LoanSimError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerOptions {
    /// Overwrite the session's messages with a placeholder when the user exits.
    pub hide_on_exit: bool,

    /// Sessions untouched for this many seconds are dropped before each
    /// dispatched event. `None` keeps sessions until the dialogue ends.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
}

/// Result of feeding one event through the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ConversationState,
    pub outputs: Vec<OutboundAction>,
}

impl Transition {
    fn to(next: ConversationState, outputs: Vec<OutboundAction>) -> Self {
        Self { next, outputs }
    }

    fn stay(state: ConversationState) -> Self {
        Self::to(state, Vec::new())
    }
}

/// Drives the amount → months → repeat dialogue for every user.
///
/// The controller owns the per-user session table but performs no I/O; it
/// returns the actions for the messaging collaborator to carry out.
pub struct ConversationController<S: SessionStore = InMemorySessionStore> {
    store: S,
    tiers: TierTable,
    options: ControllerOptions,
    turns: DashMap<UserId, Arc<Mutex<()>>>,
}

impl ConversationController<InMemorySessionStore> {
    pub fn new(options: ControllerOptions) -> Self {
        Self::with_store(InMemorySessionStore::new(), TierTable::standard(), options)
    }
}

impl Default for ConversationController<InMemorySessionStore> {
    fn default() -> Self {
        Self::new(ControllerOptions::default())
    }
}

impl<S: SessionStore> ConversationController<S> {
    pub fn with_store(store: S, tiers: TierTable, options: ControllerOptions) -> Self {
        Self {
            store,
            tiers,
            options,
            turns: DashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Current state for `user_id`; no session means the dialogue has ended.
    pub fn state_of(&self, user_id: UserId) -> ConversationState {
        self.store
            .get(user_id)
            .map(|s| s.state)
            .unwrap_or(ConversationState::Ended)
    }

    /// Look up the user's state, record their message id and run the transition.
    ///
    /// Events for one user are processed one at a time: the state read, the
    /// transition and the commit all happen under that user's turn guard.
    /// Other users proceed in parallel. Callers that drive [`handle`](Self::handle)
    /// directly take on that serialization themselves.
    pub fn dispatch(&self, inbound: &Inbound) -> Transition {
        if let Some(secs) = self.options.idle_timeout_secs {
            self.expire_idle(secs);
        }

        let turn = self.turns.entry(inbound.user_id).or_default().clone();
        let _guard = turn.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(message_id) = inbound.message_id {
            self.record_user_message(inbound.user_id, message_id);
        }
        let state = self.state_of(inbound.user_id);
        self.handle(inbound.user_id, inbound.chat_id, state, &inbound.event)
    }

    /// Drop sessions idle for longer than `max_idle`, along with turn guards
    /// no longer in use. Returns the number of sessions removed.
    pub fn purge_idle(&self, max_idle: Duration) -> usize {
        let purged = self.store.purge_idle(max_idle);
        self.turns.retain(|user_id, turn| {
            Arc::strong_count(turn) > 1 || self.store.get(*user_id).is_some()
        });
        purged
    }

    fn expire_idle(&self, secs: u64) {
        let Some(max_idle) = i64::try_from(secs).ok().and_then(Duration::try_seconds) else {
            return;
        };
        let purged = self.purge_idle(max_idle);
        if purged > 0 {
            tracing::info!(purged, idle_timeout_secs = secs, "expired idle sessions");
        }
    }

    pub fn record_bot_message(&self, user_id: UserId, message_id: MessageId) {
        self.store
            .update(user_id, &mut |s| s.bot_messages.push(message_id));
    }

    pub fn record_user_message(&self, user_id: UserId, message_id: MessageId) {
        self.store
            .update(user_id, &mut |s| s.user_messages.push(message_id));
    }

    /// The transition function. `state` is taken as given; the session table
    /// supplies the stored principal and receives the next state.
    pub fn handle(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        state: ConversationState,
        event: &Event,
    ) -> Transition {
        let transition = match (state, event) {
            (_, Event::Command(Command::Start)) => self.begin(user_id, chat_id),
            (_, Event::Command(Command::Cancel)) => self.cancel(user_id),
            (_, Event::Command(Command::Other(name))) => {
                tracing::debug!(user_id, command = %name, "ignoring unknown command");
                Transition::stay(state)
            }
            (ConversationState::AwaitingAmount, Event::Text(text)) => {
                self.on_amount(user_id, chat_id, text)
            }
            (ConversationState::AwaitingMonths, Event::Text(text)) => {
                self.on_months(user_id, chat_id, text)
            }
            (ConversationState::AwaitingRepeatChoice, Event::Text(text)) => {
                match parse_choice(text) {
                    Some(choice) => self.on_choice(user_id, chat_id, choice),
                    None => Transition::to(state, vec![repeat_prompt()]),
                }
            }
            (ConversationState::AwaitingRepeatChoice, Event::Button(payload)) => {
                match payload.as_str() {
                    RESTART_PAYLOAD => self.on_choice(user_id, chat_id, RepeatChoice::Again),
                    EXIT_PAYLOAD => self.on_choice(user_id, chat_id, RepeatChoice::Exit),
                    other => {
                        tracing::debug!(user_id, payload = other, "ignoring unknown button");
                        Transition::stay(state)
                    }
                }
            }
            (ConversationState::Ended, Event::Text(_) | Event::Button(_)) => Transition::to(
                ConversationState::Ended,
                vec![OutboundAction::text(messages::START_HINT)],
            ),
            (_, Event::Button(payload)) => {
                tracing::debug!(user_id, ?state, %payload, "ignoring stale button");
                Transition::stay(state)
            }
        };

        tracing::debug!(user_id, from = ?state, to = ?transition.next, "conversation transition");
        self.commit(user_id, transition.next);
        transition
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn begin(&self, user_id: UserId, chat_id: ChatId) -> Transition {
        self.store.start(user_id, chat_id);
        Transition::to(
            ConversationState::AwaitingAmount,
            vec![OutboundAction::Send(
                OutboundMessage::plain(messages::GREETING).with_markup(ReplyMarkup::RemoveKeyboard),
            )],
        )
    }

    fn cancel(&self, user_id: UserId) -> Transition {
        self.store.clear(user_id);
        Transition::to(
            ConversationState::Ended,
            vec![OutboundAction::Send(
                OutboundMessage::plain(messages::CANCELLED).with_markup(ReplyMarkup::RemoveKeyboard),
            )],
        )
    }

    fn on_amount(&self, user_id: UserId, chat_id: ChatId, text: &str) -> Transition {
        let principal = match parse_amount(text) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(user_id, error = %e, "rejected amount");
                return Transition::to(
                    ConversationState::AwaitingAmount,
                    vec![OutboundAction::text(messages::invalid_amount(&e))],
                );
            }
        };

        self.store_principal(user_id, chat_id, Some(principal));
        Transition::to(
            ConversationState::AwaitingMonths,
            vec![OutboundAction::text(messages::ASK_MONTHS)],
        )
    }

    fn on_months(&self, user_id: UserId, chat_id: ChatId, text: &str) -> Transition {
        let months = match parse_months(text) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(user_id, error = %e, "rejected term");
                return Transition::to(
                    ConversationState::AwaitingMonths,
                    vec![OutboundAction::text(messages::invalid_months(&e))],
                );
            }
        };

        let Some(principal) = self.store.get(user_id).and_then(|s| s.principal) else {
            let err = LoanSimError::MissingSession { user_id };
            tracing::warn!(user_id, error = %err, "restarting dialogue");
            self.store.start(user_id, chat_id);
            return Transition::to(
                ConversationState::AwaitingAmount,
                vec![OutboundAction::text(messages::SESSION_LOST)],
            );
        };

        if months > MAX_TERM_MONTHS {
            return Transition::to(
                ConversationState::AwaitingMonths,
                vec![OutboundAction::text(messages::term_too_long(MAX_TERM_MONTHS))],
            );
        }

        let result = LoanRequest::new(principal, months)
            .and_then(|request| compute_with_table(&self.tiers, &request));
        match result {
            Ok(result) => {
                // the request is spent once the schedule exists
                self.store_principal(user_id, chat_id, None);
                Transition::to(
                    ConversationState::AwaitingRepeatChoice,
                    vec![
                        OutboundAction::Send(OutboundMessage::markdown(render_chat(&result))),
                        repeat_prompt(),
                    ],
                )
            }
            Err(e) => {
                tracing::warn!(user_id, %principal, months, error = %e, "schedule computation failed");
                Transition::to(
                    ConversationState::AwaitingMonths,
                    vec![OutboundAction::text(messages::CALCULATION_FAILED)],
                )
            }
        }
    }

    fn on_choice(&self, user_id: UserId, chat_id: ChatId, choice: RepeatChoice) -> Transition {
        match choice {
            RepeatChoice::Again => {
                self.store.start(user_id, chat_id);
                Transition::to(
                    ConversationState::AwaitingAmount,
                    vec![OutboundAction::Send(
                        OutboundMessage::plain(messages::ASK_AMOUNT)
                            .with_markup(ReplyMarkup::RemoveKeyboard),
                    )],
                )
            }
            RepeatChoice::Exit => {
                let mut outputs = Vec::new();
                if let Some(session) = self.store.clear(user_id) {
                    if self.options.hide_on_exit {
                        outputs.extend(
                            session
                                .bot_messages
                                .iter()
                                .chain(session.user_messages.iter())
                                .map(|id| OutboundAction::hide(*id)),
                        );
                    }
                }
                outputs.push(OutboundAction::Send(
                    OutboundMessage::plain(messages::FAREWELL)
                        .with_markup(ReplyMarkup::RemoveKeyboard),
                ));
                Transition::to(ConversationState::Ended, outputs)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Session helpers
    // -----------------------------------------------------------------------

    fn store_principal(&self, user_id: UserId, chat_id: ChatId, principal: Option<Money>) {
        if !self.store.update(user_id, &mut |s| s.principal = principal) {
            self.store.start(user_id, chat_id);
            self.store.update(user_id, &mut |s| s.principal = principal);
        }
    }

    fn commit(&self, user_id: UserId, next: ConversationState) {
        if next == ConversationState::Ended {
            self.store.clear(user_id);
        } else {
            self.store.update(user_id, &mut |s| s.state = next);
        }
    }
}

fn repeat_prompt() -> OutboundAction {
    OutboundAction::Send(
        OutboundMessage::plain(messages::ASK_REPEAT).with_markup(messages::repeat_keyboard()),
    )
}
