use crate::peer::types::{ChatMessage, Role};

/// Buttons whose enabled state the core drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    CreateOffer,
    CreateAnswer,
    SetAnswer,
}

/// Everything the core needs from a front end. Implementations only render;
/// the core never reads state back through this trait.
pub trait ChatUi: Send + Sync {
    fn update_status(&self, text: &str);

    fn add_message(&self, message: &ChatMessage);

    fn set_chat_enabled(&self, enabled: bool);

    fn set_control(&self, control: Control, enabled: bool);

    /// Shows an encoded local description for the user to copy. `role`
    /// selects the offer slot (initiator) or the answer slot (responder).
    fn show_local_description(&self, role: Role, encoded: &str);
}
