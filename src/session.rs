use crate::peer::data_channel::ChatChannel;
use crate::peer::types::Role;
use std::sync::Arc;
use tracing::{debug, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::RTCPeerConnection;

/// The one live connection of a controller, plus its chat channel once
/// there is one.
pub struct PeerSession {
    id: String,
    role: Role,
    pc: Arc<RTCPeerConnection>,
    channel: Option<ChatChannel>,
}

impl PeerSession {
    pub fn new(id: String, role: Role, pc: Arc<RTCPeerConnection>) -> Self {
        Self {
            id,
            role,
            pc,
            channel: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn peer(&self) -> &Arc<RTCPeerConnection> {
        &self.pc
    }

    pub fn connection_state(&self) -> RTCPeerConnectionState {
        self.pc.connection_state()
    }

    pub fn channel(&self) -> Option<&ChatChannel> {
        self.channel.as_ref()
    }

    /// Binds the session's data channel. A session has at most one; a
    /// second one replaces and closes the first.
    pub async fn bind_channel(&mut self, channel: ChatChannel) {
        if let Some(old) = self.channel.replace(channel) {
            warn!(session = %self.id, label = old.label(), "replacing data channel");
            old.close().await;
        }
    }

    pub async fn close(self) {
        debug!(session = %self.id, "closing peer session");
        if let Some(channel) = &self.channel {
            channel.close().await;
        }
        if let Err(e) = self.pc.close().await {
            warn!(session = %self.id, error = %e, "failed to close peer connection");
        }
    }
}
