use crate::peer::types::{ChatMessage, Direction, Role};
use crate::ui::{ChatUi, Control};
use std::io::{self, Write};
use tracing::debug;

/// Front end that prints to stdout.
#[derive(Debug, Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }

    fn print(&self, line: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

pub fn format_message(message: &ChatMessage) -> String {
    let who = match message.direction {
        Direction::Sent => "you",
        Direction::Received => "peer",
    };
    format!("[{}] {who}: {}", message.at.format("%H:%M:%S"), message.text)
}

impl ChatUi for ConsoleUi {
    fn update_status(&self, text: &str) {
        self.print(&format!("Status: {text}"));
    }

    fn add_message(&self, message: &ChatMessage) {
        self.print(&format_message(message));
    }

    fn set_chat_enabled(&self, enabled: bool) {
        if enabled {
            self.print("(chat enabled: type a message and press Enter)");
        } else {
            self.print("(chat disabled)");
        }
    }

    fn set_control(&self, control: Control, enabled: bool) {
        debug!(?control, enabled, "control toggled");
    }

    fn show_local_description(&self, role: Role, encoded: &str) {
        let (name, hint) = match role {
            Role::Initiator => ("OFFER", "Send this to your peer, then paste their answer with /answer <blob>"),
            Role::Responder => ("ANSWER", "Send this back to the initiator"),
        };
        self.print(&format!(
            "----- BEGIN {name} -----\n{encoded}\n----- END {name} -----\n{hint}"
        ));
    }
}
