use crate::error::Result;
use crate::peer::ice::validate_servers;
use crate::peer::types::{IceServerKind, ServerConfig};
use crate::utils::add_ice_url_scheme;
use clap::{Parser, Subcommand};

/// Public STUN servers used when none are given. Discovery only: no
/// credentials, no relaying.
pub const DEFAULT_ICE_SERVERS: &[&str] = &[
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
    "stun:stun2.l.google.com:19302",
    "stun:stun3.l.google.com:19302",
    "stun:stun4.l.google.com:19302",
    "stun:stun.ekiga.net",
    "stun:stun.voipbuster.com",
    "stun:stun.voipstunt.com",
];

/// Log filter used when `RUST_LOG` is not set. Debug builds log this
/// crate at `debug`; the webrtc stack stays at `info` either way.
#[cfg(debug_assertions)]
pub const DEFAULT_LOG_FILTER: &str = "info,pastechat_lib=debug,pastechat=debug";

#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "pastechat", version)]
#[command(about = "Peer-to-peer chat with copy/paste signaling")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// ICE server URL; repeat for several. `stun:` is assumed without a scheme
    #[arg(
        long = "ice-server",
        env = "PASTECHAT_ICE_SERVERS",
        value_delimiter = ',',
        global = true
    )]
    pub ice_servers: Vec<String>,

    /// Username for `turn:` servers
    #[arg(long, env = "PASTECHAT_ICE_USERNAME", global = true)]
    pub ice_username: Option<String>,

    /// Credential for `turn:` servers
    #[arg(
        long,
        env = "PASTECHAT_ICE_CREDENTIAL",
        hide_env_values = true,
        global = true
    )]
    pub ice_credential: Option<String>,

    /// Gzip session descriptions before base64 (shorter blobs)
    #[arg(long, global = true)]
    pub compress: bool,

    /// Also gather loopback candidates (both peers on one machine)
    #[arg(long, global = true)]
    pub include_loopback: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat (default)
    Chat,

    /// Check that a STUN/TURN server answers
    Probe {
        /// Server URL, e.g. stun:stun.l.google.com:19302
        url: String,

        /// Seconds to wait for a matching candidate
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

/// Settings the peer connection is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub ice_servers: Vec<ServerConfig>,
    pub compress: bool,
    pub include_loopback: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ice_servers: DEFAULT_ICE_SERVERS
                .iter()
                .map(|url| server_config(url, None, None))
                .collect(),
            compress: false,
            include_loopback: false,
        }
    }
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = AppConfig {
            compress: args.compress,
            include_loopback: args.include_loopback,
            ..AppConfig::default()
        };

        if !args.ice_servers.is_empty() {
            config.ice_servers = args
                .ice_servers
                .iter()
                .map(|url| {
                    server_config(
                        url,
                        args.ice_username.clone(),
                        args.ice_credential.clone(),
                    )
                })
                .collect();
        }

        validate_servers(&config.ice_servers)?;
        Ok(config)
    }

    /// No ICE servers and loopback candidates on: two peers in one process
    /// can connect without any network.
    pub fn local_only() -> Self {
        Self {
            ice_servers: Vec::new(),
            compress: false,
            include_loopback: true,
        }
    }
}

/// Builds a server entry from a URL as typed by the user. Credentials are
/// attached to TURN entries only.
pub fn server_config(
    url: &str,
    username: Option<String>,
    credential: Option<String>,
) -> ServerConfig {
    let url = url.trim();
    let kind = if url.starts_with("turn:") || url.starts_with("turns:") {
        IceServerKind::Turn
    } else {
        IceServerKind::Stun
    };

    let mut config = ServerConfig {
        r#type: kind,
        url: url.to_string(),
        username: None,
        credential: None,
    };
    config.url = add_ice_url_scheme(&config);
    if kind == IceServerKind::Turn {
        config.username = username;
        config.credential = credential;
    }
    config
}
