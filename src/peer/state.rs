use crate::ui::Control;

/// Enabled state of the front end's controls, as the core last set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub create_offer: bool,
    pub create_answer: bool,
    pub set_answer: bool,
    pub chat: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            create_offer: true,
            create_answer: true,
            set_answer: true,
            chat: false,
        }
    }
}

impl Controls {
    pub fn is_enabled(&self, control: Control) -> bool {
        match control {
            Control::CreateOffer => self.create_offer,
            Control::CreateAnswer => self.create_answer,
            Control::SetAnswer => self.set_answer,
        }
    }

    pub fn set(&mut self, control: Control, enabled: bool) {
        match control {
            Control::CreateOffer => self.create_offer = enabled,
            Control::CreateAnswer => self.create_answer = enabled,
            Control::SetAnswer => self.set_answer = enabled,
        }
    }
}
