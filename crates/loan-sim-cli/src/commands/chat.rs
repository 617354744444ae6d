use clap::Args;
use colored::Colorize;
use std::io::{self, BufRead, Write};

use loan_sim_core::conversation::{
    deliver, ControllerOptions, ConversationController, ConversationState, Event, Inbound,
    InMemorySessionStore, InlineButton, Messenger, OutboundMessage, ReplyMarkup, TransportError,
};
use loan_sim_core::{ChatId, MessageId, UserId};

use super::load_tiers;

/// Arguments for the terminal chat simulator
#[derive(Args)]
pub struct ChatArgs {
    /// User id to run the dialogue as
    #[arg(long, default_value_t = 1)]
    pub user_id: UserId,

    /// Chat id (defaults to the user id, as in a private chat)
    #[arg(long)]
    pub chat_id: Option<ChatId>,

    /// Replace the session's messages with a placeholder on exit
    #[arg(long)]
    pub hide_on_exit: bool,

    /// Forget a dialogue left idle for this many seconds
    #[arg(long)]
    pub idle_timeout: Option<u64>,

    /// Path to a JSON tier table replacing the standard one
    #[arg(long)]
    pub tiers: Option<String>,
}

/// Stdout stand-in for the messaging platform.
///
/// Keeps the most recent inline keyboard so a typed digit can press a button.
struct TerminalMessenger<W: Write> {
    out: W,
    next_id: MessageId,
    keyboard: Vec<InlineButton>,
}

impl<W: Write> TerminalMessenger<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            next_id: 0,
            keyboard: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        self.next_id
    }

    /// Map a line of user input to an event, resolving keyboard digits.
    fn read_event(&self, line: &str) -> Event {
        let pressed = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.keyboard.get(i));
        match pressed {
            Some(button) => Event::Button(button.payload.clone()),
            None => Event::from_text(line),
        }
    }
}

impl<W: Write> Messenger for TerminalMessenger<W> {
    fn send_text(
        &mut self,
        _chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageId, TransportError> {
        let emit = |out: &mut W, line: &str| writeln!(out, "{line}").map_err(send_error);

        emit(&mut self.out, &format!("{} {}", "bot>".cyan().bold(), message.text))?;
        match &message.markup {
            Some(ReplyMarkup::InlineKeyboard(rows)) => {
                self.keyboard = rows.iter().flatten().cloned().collect();
                for (i, button) in self.keyboard.iter().enumerate() {
                    emit(&mut self.out, &format!("     [{}] {}", i + 1, button.label))?;
                }
            }
            Some(ReplyMarkup::RemoveKeyboard) => self.keyboard.clear(),
            None => {}
        }
        self.out.flush().map_err(send_error)?;
        Ok(self.allocate_id())
    }

    fn edit_text(
        &mut self,
        _chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        writeln!(self.out, "{}", format!("(message {message_id}: {text})").dimmed()).map_err(
            |e| TransportError::Edit {
                message_id,
                reason: e.to_string(),
            },
        )
    }
}

fn send_error(e: io::Error) -> TransportError {
    match e.kind() {
        io::ErrorKind::BrokenPipe => TransportError::Closed,
        _ => TransportError::Send(e.to_string()),
    }
}

pub fn run_chat(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tiers = load_tiers(args.tiers.as_deref())?;
    let controller = ConversationController::with_store(
        InMemorySessionStore::new(),
        tiers,
        ControllerOptions {
            hide_on_exit: args.hide_on_exit,
            idle_timeout_secs: args.idle_timeout,
        },
    );
    let user_id = args.user_id;
    let chat_id = args.chat_id.unwrap_or(user_id);

    let mut messenger = TerminalMessenger::new(io::stdout());
    let mut next_inbound_id: MessageId = 1000;

    let opening = controller.handle(user_id, chat_id, ConversationState::Ended, &Event::start());
    deliver(&controller, user_id, chat_id, &mut messenger, &opening);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        next_inbound_id += 1;

        let inbound = Inbound {
            user_id,
            chat_id,
            message_id: Some(next_inbound_id),
            event: messenger.read_event(&line),
        };
        let transition = controller.dispatch(&inbound);
        let report = deliver(&controller, user_id, chat_id, &mut messenger, &transition);
        if report.closed {
            break;
        }
        if report.failed > 0 {
            tracing::warn!(failed = report.failed, "some replies could not be shown");
        }

        if transition.next == ConversationState::Ended {
            break;
        }
    }

    tracing::info!(user_id, "chat finished");
    Ok(())
}
