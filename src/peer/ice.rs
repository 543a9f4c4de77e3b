use crate::error::{ChatError, Result};
use crate::peer::types::{IceServerKind, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::RTCPeerConnection;

pub fn rtc_ice_servers(servers: &[ServerConfig]) -> Vec<RTCIceServer> {
    servers
        .iter()
        .map(|config| RTCIceServer {
            urls: vec![config.url.clone()],
            username: config.username.clone().unwrap_or_default(),
            credential: config.credential.clone().unwrap_or_default(),
        })
        .collect()
}

pub fn validate_servers(servers: &[ServerConfig]) -> Result<()> {
    for server in servers {
        let url = server.url.trim();
        if url.is_empty() || url.ends_with(':') {
            return Err(ChatError::InvalidIceServer {
                url: server.url.clone(),
                reason: "empty address",
            });
        }
        if server.r#type == IceServerKind::Turn
            && (server.username.is_none() || server.credential.is_none())
        {
            return Err(ChatError::InvalidIceServer {
                url: server.url.clone(),
                reason: "TURN servers require username and credential",
            });
        }
    }
    Ok(())
}

/// Candidate counts by type, read from the `a=candidate` lines of an SDP.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSummary {
    pub host: usize,
    pub srflx: usize,
    pub relay: usize,
}

pub fn analyze_candidates(sdp: &str) -> CandidateSummary {
    let mut summary = CandidateSummary::default();
    for line in sdp.lines().filter(|l| l.starts_with("a=candidate:")) {
        if line.contains(" typ host") {
            summary.host += 1;
        } else if line.contains(" typ srflx") || line.contains(" typ prflx") {
            summary.srflx += 1;
        } else if line.contains(" typ relay") {
            summary.relay += 1;
        }
    }
    summary
}

/// Logs what the local description offers the other side.
pub fn log_candidate_summary(session: &str, sdp: &str) {
    let summary = analyze_candidates(sdp);
    info!(
        session,
        host = summary.host,
        srflx = summary.srflx,
        relay = summary.relay,
        "local candidates gathered"
    );
    if summary.host + summary.srflx + summary.relay == 0 {
        warn!(session, "no candidates gathered; the peer will not be able to connect");
    } else if summary.srflx == 0 && summary.relay == 0 {
        warn!(session, "no server-reflexive candidates; peers behind NAT may fail to connect");
    }
}

/// Gathers candidates against a single server and reports whether it
/// answered: a server-reflexive candidate for STUN, a relay one for TURN.
pub async fn check_ice_server_availability(
    config: &ServerConfig,
    wait: Duration,
) -> Result<bool> {
    validate_servers(std::slice::from_ref(config))?;
    info!(url = %config.url, kind = ?config.r#type, "probing ICE server");

    let rtc_config = RTCConfiguration {
        ice_servers: rtc_ice_servers(std::slice::from_ref(config)),
        ..Default::default()
    };
    let api = APIBuilder::new().build();
    let pc = Arc::new(api.new_peer_connection(rtc_config).await?);

    let result = probe(&pc, config.r#type, wait).await;
    if let Err(e) = pc.close().await {
        debug!(error = %e, "probe connection close failed");
    }
    result
}

async fn probe(pc: &Arc<RTCPeerConnection>, kind: IceServerKind, wait: Duration) -> Result<bool> {
    let wanted = match kind {
        IceServerKind::Stun => "typ srflx",
        IceServerKind::Turn => "typ relay",
    };

    let (state_tx, mut state_rx) = mpsc::unbounded_channel();
    pc.on_ice_gathering_state_change(Box::new(move |state| {
        debug!(?state, "probe gathering state");
        let _ = state_tx.send(state);
        Box::pin(async {})
    }));

    let (hit_tx, mut hit_rx) = mpsc::unbounded_channel();
    pc.on_ice_candidate(Box::new(move |cand: Option<RTCIceCandidate>| {
        if let Some(init) = cand.and_then(|c| c.to_json().ok()) {
            debug!(candidate = %init.candidate, "probe candidate");
            if init.candidate.contains(wanted) {
                let _ = hit_tx.send(());
            }
        }
        Box::pin(async {})
    }));

    // a data channel gives the offer something to negotiate
    pc.create_data_channel("probe", None).await?;
    let offer = pc.create_offer(None).await?;
    pc.set_local_description(offer).await?;

    let found = timeout(wait, async {
        tokio::select! {
            hit = hit_rx.recv() => hit.is_some(),
            _ = async {
                while let Some(state) = state_rx.recv().await {
                    if state == RTCIceGathererState::Complete {
                        break;
                    }
                }
            } => {
                // gathering may finish right after the matching candidate
                hit_rx.try_recv().is_ok()
            }
        }
    })
    .await
    .unwrap_or(false);

    info!(found, "probe finished");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stun(url: &str) -> ServerConfig {
        ServerConfig {
            r#type: IceServerKind::Stun,
            url: url.into(),
            username: None,
            credential: None,
        }
    }

    #[test]
    fn stun_servers_map_without_credentials() {
        let servers = rtc_ice_servers(&[stun("stun:stun.l.google.com:19302")]);
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].urls, vec!["stun:stun.l.google.com:19302".to_string()]);
        assert!(servers[0].username.is_empty());
        assert!(servers[0].credential.is_empty());
    }

    #[test]
    fn empty_url_is_invalid() {
        assert!(validate_servers(&[stun("stun:")]).is_err());
        assert!(validate_servers(&[stun("   ")]).is_err());
        assert!(validate_servers(&[stun("stun:stun.ekiga.net")]).is_ok());
    }

    #[test]
    fn turn_needs_both_credentials() {
        let mut turn = ServerConfig {
            r#type: IceServerKind::Turn,
            url: "turn:relay.example.org".into(),
            username: Some("alice".into()),
            credential: None,
        };
        assert!(validate_servers(std::slice::from_ref(&turn)).is_err());
        turn.credential = Some("secret".into());
        assert!(validate_servers(&[turn]).is_ok());
    }

    #[test]
    fn counts_candidate_types() {
        let sdp = "v=0\r\n\
            a=candidate:1 1 udp 2130706431 192.168.1.4 50000 typ host\r\n\
            a=candidate:2 1 udp 1694498815 203.0.113.7 50000 typ srflx raddr 0.0.0.0 rport 0\r\n\
            a=candidate:3 1 udp 16777215 198.51.100.2 3478 typ relay raddr 0.0.0.0 rport 0\r\n\
            a=candidate:4 1 udp 2130706431 10.0.0.2 50001 typ host\r\n\
            a=end-of-candidates\r\n";
        assert_eq!(
            analyze_candidates(sdp),
            CandidateSummary {
                host: 2,
                srflx: 1,
                relay: 1
            }
        );
    }
}
