use crate::error::Result;
use crate::peer::types::{ChatMessage, Direction, PeerEvent};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::data_channel::RTCDataChannel;

/// Label of the data channel the initiator opens.
pub const CHAT_LABEL: &str = "chat";

/// Chat view of a data channel: text in, text out.
#[derive(Clone)]
pub struct ChatChannel {
    dc: Arc<RTCDataChannel>,
}

impl ChatChannel {
    pub fn new(dc: Arc<RTCDataChannel>) -> Self {
        Self { dc }
    }

    pub fn label(&self) -> &str {
        self.dc.label()
    }

    pub fn ready_state(&self) -> RTCDataChannelState {
        self.dc.ready_state()
    }

    pub fn is_open(&self) -> bool {
        self.ready_state() == RTCDataChannelState::Open
    }

    /// Sends `text` trimmed. Blank text or a channel that is not open is a
    /// no-op and yields `None`; otherwise the message to append as sent.
    pub async fn send(&self, text: &str) -> Result<Option<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() || !self.is_open() {
            trace!(state = %self.ready_state(), "send skipped");
            return Ok(None);
        }

        let n = self.dc.send_text(text.to_string()).await?;
        trace!(bytes = n, "sent chat message");
        Ok(Some(ChatMessage::new(text, Direction::Sent)))
    }

    pub async fn close(&self) {
        if let Err(e) = self.dc.close().await {
            debug!(error = %e, "data channel close failed");
        }
    }
}

/// Forwards the channel's lifecycle and messages into the event queue,
/// tagged with the owning session.
pub fn attach_dc(dc: &Arc<RTCDataChannel>, session: &str, events: &UnboundedSender<PeerEvent>) {
    debug!(session, label = dc.label(), "attaching data channel handlers");

    dc.on_open(Box::new({
        let session = session.to_string();
        let events = events.clone();
        move || {
            debug!(session = %session, "data channel open");
            let _ = events.send(PeerEvent::ChannelOpen {
                session: session.clone(),
            });
            Box::pin(async {})
        }
    }));

    dc.on_close(Box::new({
        let session = session.to_string();
        let events = events.clone();
        move || {
            debug!(session = %session, "data channel closed");
            let _ = events.send(PeerEvent::ChannelClose {
                session: session.clone(),
            });
            Box::pin(async {})
        }
    }));

    dc.on_message(Box::new({
        let session = session.to_string();
        let events = events.clone();
        move |msg: DataChannelMessage| {
            trace!(session = %session, len = msg.data.len(), is_string = msg.is_string, "message");
            let text = String::from_utf8_lossy(&msg.data).into_owned();
            let _ = events.send(PeerEvent::Message {
                session: session.clone(),
                text,
            });
            Box::pin(async {})
        }
    }));
}
