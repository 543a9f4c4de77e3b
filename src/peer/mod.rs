pub mod connection;
pub mod data_channel;
pub mod ice;
pub mod state;
pub mod types;

pub use connection::ConnectionManager;
pub use data_channel::ChatChannel;
pub use state::Controls;
pub use types::{ChatMessage, Direction, PeerEvent, Role, SdpKind, ServerConfig, SessionDescription};
