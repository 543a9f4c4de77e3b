//! Top-level composition: one connection manager, one chat log, one front
//! end. All session state changes happen here, one call or event at a time.

use crate::config::AppConfig;
use crate::error::ChatError;
use crate::peer::connection::ConnectionManager;
use crate::peer::data_channel::ChatChannel;
use crate::peer::state::Controls;
use crate::peer::types::{ChatMessage, Direction, PeerEvent, Role};
use crate::session::PeerSession;
use crate::ui::{ChatUi, Control};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

pub const CONNECTED_NOTICE: &str = "Connected to peer. You can now start chatting!";

pub struct Controller {
    manager: ConnectionManager,
    ui: Arc<dyn ChatUi>,
    controls: Controls,
    messages: Vec<ChatMessage>,
}

impl Controller {
    /// Returns the controller and the queue its peer callbacks feed. Every
    /// event from the queue must be handed back to `handle_event`.
    pub fn new(config: AppConfig, ui: Arc<dyn ChatUi>) -> (Self, UnboundedReceiver<PeerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            manager: ConnectionManager::new(config, tx),
            ui,
            controls: Controls::default(),
            messages: Vec::new(),
        };
        (controller, rx)
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn session(&self) -> Option<&PeerSession> {
        self.manager.session()
    }

    pub async fn start_as_initiator(&mut self) {
        self.disable_chat();
        match self.manager.start_as_initiator().await {
            Ok(()) => {
                self.ui.update_status("Creating offer...");
                self.set_control(Control::CreateOffer, false);
            }
            Err(e) => self.report("create offer", e),
        }
    }

    pub async fn respond_to_offer(&mut self, encoded: &str) {
        let previous = self.manager.session().map(|s| s.id().to_string());
        let result = self.manager.respond_to_offer(encoded).await;

        // a failure past the decode step still tore the old session down
        let replaced = self.manager.session().map(PeerSession::id) != previous.as_deref();
        if replaced {
            self.disable_chat();
        }

        match result {
            Ok(()) => {
                self.ui.update_status("Creating answer...");
                self.set_control(Control::CreateAnswer, false);
            }
            Err(e) => self.report("create answer", e),
        }
    }

    pub async fn apply_answer(&mut self, encoded: &str) {
        match self.manager.apply_answer(encoded).await {
            Ok(()) => {
                self.ui.update_status("Connecting...");
                self.set_control(Control::SetAnswer, false);
            }
            Err(e) => self.report("set answer", e),
        }
    }

    /// Sends over the open chat channel. Returns whether anything was sent.
    pub async fn send(&mut self, text: &str) -> bool {
        let Some(channel) = self.manager.session().and_then(PeerSession::channel).cloned() else {
            return false;
        };
        let sent = channel.send(text).await;
        match sent {
            Ok(Some(message)) => {
                self.append(message);
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.report("send message", e);
                false
            }
        }
    }

    /// Closes the session and puts every control back to its initial state.
    pub async fn disconnect(&mut self) {
        self.manager.close_session().await;
        self.disable_chat();
        for control in [Control::CreateOffer, Control::CreateAnswer, Control::SetAnswer] {
            self.set_control(control, true);
        }
        self.ui.update_status("Disconnected");
    }

    pub async fn handle_event(&mut self, event: PeerEvent) {
        if !self.manager.is_current(&event) {
            debug!(?event, "dropping event from a closed session");
            return;
        }

        match event {
            PeerEvent::GatheringComplete { .. } => self.publish_local_description().await,
            PeerEvent::ConnectionState { state, .. } => {
                self.ui.update_status(&format!("Connection state: {state}"));
                match state {
                    RTCPeerConnectionState::Connected => self.enable_chat(),
                    RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Closed => self.disable_chat(),
                    _ => {}
                }
            }
            PeerEvent::DataChannel { channel, .. } => {
                if let Some(session) = self.manager.session_mut() {
                    session.bind_channel(ChatChannel::new(channel)).await;
                }
            }
            PeerEvent::ChannelOpen { .. } => {
                self.ui
                    .update_status("Data channel is open! You are now connected.");
                self.enable_chat();
            }
            PeerEvent::ChannelClose { .. } => {
                self.ui.update_status("Data channel is closed");
                self.disable_chat();
            }
            PeerEvent::Message { text, .. } => {
                self.append(ChatMessage::new(text, Direction::Received));
            }
        }
    }

    async fn publish_local_description(&mut self) {
        match self.manager.local_description_blob().await {
            Ok((role, blob)) => {
                self.ui.show_local_description(role, &blob);
                self.ui.update_status(match role {
                    Role::Initiator => {
                        "Offer created. Share it with your peer and wait for their answer."
                    }
                    Role::Responder => "Answer created. Send it back to the initiator.",
                });
            }
            Err(e) => self.report("publish local description", e),
        }
    }

    fn append(&mut self, message: ChatMessage) {
        self.ui.add_message(&message);
        self.messages.push(message);
    }

    fn enable_chat(&mut self) {
        if self.controls.chat {
            return;
        }
        self.controls.chat = true;
        self.ui.set_chat_enabled(true);
        self.append(ChatMessage::new(CONNECTED_NOTICE, Direction::Received));
    }

    fn disable_chat(&mut self) {
        if !self.controls.chat {
            return;
        }
        self.controls.chat = false;
        self.ui.set_chat_enabled(false);
    }

    fn set_control(&mut self, control: Control, enabled: bool) {
        self.controls.set(control, enabled);
        self.ui.set_control(control, enabled);
    }

    fn report(&self, action: &str, error: ChatError) {
        match &error {
            ChatError::EmptyInput(_) => debug!(action, "empty input"),
            other => warn!(action, error = %other, "action failed"),
        }
        self.ui.update_status(&error.status_text());
    }
}
