use crate::config::AppConfig;
use crate::error::{ChatError, Result};
use crate::logger::{dump_candidate, dump_selected_pair};
use crate::peer::data_channel::{attach_dc, ChatChannel, CHAT_LABEL};
use crate::peer::ice::{log_candidate_summary, rtc_ice_servers};
use crate::peer::types::{PeerEvent, Role, SessionDescription};
use crate::session::PeerSession;
use crate::signaling;
use crate::utils::random_id;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use webrtc::api::setting_engine::SettingEngine;
use webrtc::api::APIBuilder;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::RTCPeerConnection;

/// Owns the single live peer session and runs the two handshake workflows
/// on it.
pub struct ConnectionManager {
    config: AppConfig,
    events: UnboundedSender<PeerEvent>,
    session: Option<PeerSession>,
}

impl ConnectionManager {
    pub fn new(config: AppConfig, events: UnboundedSender<PeerEvent>) -> Self {
        Self {
            config,
            events,
            session: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&PeerSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut PeerSession> {
        self.session.as_mut()
    }

    /// True when `event` was raised by the live session.
    pub fn is_current(&self, event: &PeerEvent) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.id() == event.session_id())
    }

    /// Initiator: fresh connection, local chat channel, offer committed as
    /// local description. The offer is published once gathering finishes.
    pub async fn start_as_initiator(&mut self) -> Result<()> {
        self.close_session().await;

        let id = random_id();
        info!(session = %id, "starting as initiator");
        let pc = new_peer(&self.config, &id, &self.events).await?;
        // stored before anything else can fail, so the next close reaches it
        let session = self
            .session
            .insert(PeerSession::new(id, Role::Initiator, pc.clone()));

        let dc = pc
            .create_data_channel(CHAT_LABEL, Some(RTCDataChannelInit::default()))
            .await?;
        attach_dc(&dc, session.id(), &self.events);
        session.bind_channel(ChatChannel::new(dc)).await;

        let offer = pc.create_offer(None).await?;
        pc.set_local_description(offer).await?;
        debug!("local offer set, gathering candidates");
        Ok(())
    }

    /// Responder: decodes the pasted offer first, so a bad paste leaves any
    /// existing session untouched.
    pub async fn respond_to_offer(&mut self, encoded: &str) -> Result<()> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(ChatError::EmptyInput("offer"));
        }
        let offer = signaling::decode(encoded)?;

        self.close_session().await;

        let id = random_id();
        info!(session = %id, "responding to offer");
        let pc = new_peer(&self.config, &id, &self.events).await?;
        self.session = Some(PeerSession::new(id, Role::Responder, pc.clone()));

        pc.set_remote_description(offer.into_rtc()?).await?;
        let answer = pc.create_answer(None).await?;
        pc.set_local_description(answer).await?;
        debug!("local answer set, gathering candidates");
        Ok(())
    }

    /// Initiator, last step: the pasted answer goes onto the connection made
    /// by `start_as_initiator`.
    pub async fn apply_answer(&mut self, encoded: &str) -> Result<()> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(ChatError::EmptyInput("answer"));
        }
        let answer = signaling::decode(encoded)?;

        let session = self.session.as_ref().ok_or(ChatError::NoSession)?;
        info!(session = %session.id(), "applying answer");
        session
            .peer()
            .set_remote_description(answer.into_rtc()?)
            .await?;
        Ok(())
    }

    /// Encodes the live session's local description for the user to copy.
    pub async fn local_description_blob(&self) -> Result<(Role, String)> {
        let session = self.session.as_ref().ok_or(ChatError::NoSession)?;
        let local = session
            .peer()
            .local_description()
            .await
            .ok_or(ChatError::MissingLocalDescription)?;
        log_candidate_summary(session.id(), &local.sdp);

        let desc = SessionDescription::from_rtc(&local).ok_or(ChatError::MissingLocalDescription)?;
        let blob = if self.config.compress {
            signaling::encode_compressed(&desc)?
        } else {
            signaling::encode(&desc)?
        };
        debug!(session = %session.id(), len = blob.len(), "local description encoded");
        Ok((session.role(), blob))
    }

    pub async fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }
}

pub fn rtc_config(config: &AppConfig) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: rtc_ice_servers(&config.ice_servers),
        ..Default::default()
    }
}

/// Creates a peer connection whose callbacks feed `events`, tagged with
/// `session`.
pub async fn new_peer(
    config: &AppConfig,
    session: &str,
    events: &UnboundedSender<PeerEvent>,
) -> Result<Arc<RTCPeerConnection>> {
    let mut setting = SettingEngine::default();
    if config.include_loopback {
        setting.set_include_loopback_candidate(true);
    }
    let api = APIBuilder::new().with_setting_engine(setting).build();
    let pc = Arc::new(api.new_peer_connection(rtc_config(config)).await?);

    pc.on_ice_candidate(Box::new({
        let session = session.to_string();
        let events = events.clone();
        move |cand: Option<RTCIceCandidate>| {
            match cand {
                Some(c) => dump_candidate(&session, &c),
                None => {
                    debug!(session = %session, "candidate gathering complete");
                    let _ = events.send(PeerEvent::GatheringComplete {
                        session: session.clone(),
                    });
                }
            }
            Box::pin(async {})
        }
    }));

    // weak: the connection owns this handler
    let weak: Weak<RTCPeerConnection> = Arc::downgrade(&pc);
    pc.on_peer_connection_state_change(Box::new({
        let session = session.to_string();
        let events = events.clone();
        move |state: RTCPeerConnectionState| {
            info!(session = %session, %state, "peer connection state changed");
            if state == RTCPeerConnectionState::Failed {
                if let Some(pc) = weak.upgrade() {
                    let session = session.clone();
                    tokio::spawn(async move {
                        dump_selected_pair(&pc, &session, "failed").await;
                    });
                }
            }
            let _ = events.send(PeerEvent::ConnectionState {
                session: session.clone(),
                state,
            });
            Box::pin(async {})
        }
    }));

    pc.on_data_channel(Box::new({
        let session = session.to_string();
        let events = events.clone();
        move |dc: Arc<RTCDataChannel>| {
            info!(session = %session, label = dc.label(), "remote data channel");
            // handlers go on before the channel can open
            attach_dc(&dc, &session, &events);
            let _ = events.send(PeerEvent::DataChannel {
                session: session.clone(),
                channel: dc,
            });
            Box::pin(async {})
        }
    }));

    Ok(pc)
}
