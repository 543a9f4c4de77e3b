use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Pasted field was empty after trimming. Carries the field name.
    #[error("Please enter a valid {0}")]
    EmptyInput(&'static str),

    #[error("invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("gzip stream error: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("invalid session description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no active peer connection")]
    NoSession,

    #[error("peer connection has no local description")]
    MissingLocalDescription,

    #[error("invalid ICE server {url}: {reason}")]
    InvalidIceServer { url: String, reason: &'static str },

    #[error(transparent)]
    WebRtc(#[from] webrtc::Error),
}

impl ChatError {
    /// Text shown in the status line when an action fails.
    pub fn status_text(&self) -> String {
        match self {
            ChatError::EmptyInput(_) => self.to_string(),
            other => format!("Error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_reads_as_a_prompt() {
        assert_eq!(
            ChatError::EmptyInput("offer").status_text(),
            "Please enter a valid offer"
        );
    }

    #[test]
    fn other_errors_are_prefixed() {
        assert_eq!(
            ChatError::NoSession.status_text(),
            "Error: no active peer connection"
        );
    }
}
