//! Helpers shared by the integration tests.

#![allow(dead_code)]

use pastechat_lib::peer::{ChatMessage, PeerEvent, Role};
use pastechat_lib::ui::{ChatUi, Control};
use pastechat_lib::Controller;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(30);

/// Front end that remembers everything it was told.
#[derive(Default)]
pub struct RecordingUi {
    pub statuses: Mutex<Vec<String>>,
    pub messages: Mutex<Vec<ChatMessage>>,
    pub descriptions: Mutex<Vec<(Role, String)>>,
    pub controls: Mutex<Vec<(Control, bool)>>,
    pub chat_enabled: Mutex<bool>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn last_description(&self) -> Option<(Role, String)> {
        self.descriptions.lock().unwrap().last().cloned()
    }

    pub fn description_count(&self) -> usize {
        self.descriptions.lock().unwrap().len()
    }
}

impl ChatUi for RecordingUi {
    fn update_status(&self, text: &str) {
        self.statuses.lock().unwrap().push(text.to_string());
    }

    fn add_message(&self, message: &ChatMessage) {
        self.messages.lock().unwrap().push(message.clone());
    }

    fn set_chat_enabled(&self, enabled: bool) {
        *self.chat_enabled.lock().unwrap() = enabled;
    }

    fn set_control(&self, control: Control, enabled: bool) {
        self.controls.lock().unwrap().push((control, enabled));
    }

    fn show_local_description(&self, role: Role, encoded: &str) {
        self.descriptions
            .lock()
            .unwrap()
            .push((role, encoded.to_string()));
    }
}

/// Feeds queued peer events to `ctrl` until `done` holds.
pub async fn pump_until(
    ctrl: &mut Controller,
    events: &mut UnboundedReceiver<PeerEvent>,
    mut done: impl FnMut(&Controller) -> bool,
) {
    timeout(WAIT, async {
        while !done(ctrl) {
            let event = events.recv().await.expect("event queue closed");
            ctrl.handle_event(event).await;
        }
    })
    .await
    .expect("timed out waiting for peer events");
}

/// Same as `pump_until`, for two controllers talking to each other.
pub async fn pump_both(
    a: &mut Controller,
    a_events: &mut UnboundedReceiver<PeerEvent>,
    b: &mut Controller,
    b_events: &mut UnboundedReceiver<PeerEvent>,
    mut done: impl FnMut(&Controller, &Controller) -> bool,
) {
    timeout(WAIT, async {
        while !done(a, b) {
            tokio::select! {
                Some(event) = a_events.recv() => a.handle_event(event).await,
                Some(event) = b_events.recv() => b.handle_event(event).await,
            }
        }
    })
    .await
    .expect("timed out waiting for peer events");
}

pub fn channel_open(ctrl: &Controller) -> bool {
    ctrl.session()
        .and_then(|s| s.channel())
        .is_some_and(|c| c.is_open())
}
