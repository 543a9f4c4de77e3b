use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Kind of a negotiation payload. Serialized the way browsers name it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpKind::Offer => f.write_str("offer"),
            SdpKind::Answer => f.write_str("answer"),
        }
    }
}

/// Session description as it travels between the two users.
///
/// Same JSON shape as a browser's `RTCSessionDescription`
/// (`{"type": "offer", "sdp": "v=0..."}`), so blobs pasted from a
/// browser peer decode here and vice versa.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn from_rtc(desc: &RTCSessionDescription) -> Option<Self> {
        let kind = match desc.sdp_type {
            RTCSdpType::Offer => SdpKind::Offer,
            RTCSdpType::Answer => SdpKind::Answer,
            _ => return None,
        };
        Some(Self {
            kind,
            sdp: desc.sdp.clone(),
        })
    }

    /// Parses the SDP body; the transport rejects a malformed one here.
    pub fn into_rtc(self) -> Result<RTCSessionDescription, webrtc::Error> {
        match self.kind {
            SdpKind::Offer => RTCSessionDescription::offer(self.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(self.sdp),
        }
    }
}

/// Which side of the handshake a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

/// One line of the chat log. Never edited once appended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub direction: Direction,
    pub at: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, direction: Direction) -> Self {
        Self {
            text: text.into(),
            direction,
            at: Local::now(),
        }
    }
}

/// ICE server entry as given on the command line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub r#type: IceServerKind,
    pub url: String,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IceServerKind {
    Stun,
    Turn,
}

/// Something the peer connection reported from one of its callbacks.
///
/// Every event carries the id of the session that raised it, so events
/// from a connection that has since been replaced can be told apart.
pub enum PeerEvent {
    /// The `None` candidate arrived: the local description is final.
    GatheringComplete { session: String },
    ConnectionState {
        session: String,
        state: RTCPeerConnectionState,
    },
    /// Remote peer opened a data channel towards us.
    DataChannel {
        session: String,
        channel: Arc<RTCDataChannel>,
    },
    ChannelOpen { session: String },
    ChannelClose { session: String },
    Message { session: String, text: String },
}

impl PeerEvent {
    pub fn session_id(&self) -> &str {
        match self {
            PeerEvent::GatheringComplete { session }
            | PeerEvent::ConnectionState { session, .. }
            | PeerEvent::DataChannel { session, .. }
            | PeerEvent::ChannelOpen { session }
            | PeerEvent::ChannelClose { session }
            | PeerEvent::Message { session, .. } => session,
        }
    }
}

impl fmt::Debug for PeerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerEvent::GatheringComplete { session } => {
                write!(f, "GatheringComplete({session})")
            }
            PeerEvent::ConnectionState { session, state } => {
                write!(f, "ConnectionState({session}, {state})")
            }
            PeerEvent::DataChannel { session, channel } => {
                write!(f, "DataChannel({session}, {})", channel.label())
            }
            PeerEvent::ChannelOpen { session } => write!(f, "ChannelOpen({session})"),
            PeerEvent::ChannelClose { session } => write!(f, "ChannelClose({session})"),
            PeerEvent::Message { session, text } => {
                write!(f, "Message({session}, {} bytes)", text.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_uses_browser_field_names() {
        let desc = SessionDescription {
            kind: SdpKind::Answer,
            sdp: "v=0\r\n".into(),
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["type"], "answer");
        assert_eq!(json["sdp"], "v=0\r\n");
    }

    #[test]
    fn unknown_description_type_is_rejected() {
        let res: Result<SessionDescription, _> =
            serde_json::from_str(r#"{"type":"rollback","sdp":""}"#);
        assert!(res.is_err());
    }

    #[test]
    fn rtc_description_without_offer_or_answer_is_skipped() {
        let desc = RTCSessionDescription::default();
        assert!(SessionDescription::from_rtc(&desc).is_none());
    }
}
