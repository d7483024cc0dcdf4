use thiserror::Error;

/// Errors produced by the capture pipeline, playback scheduler and live session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LiveAudioError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("malformed audio chunk: {0}")]
    MalformedAudioChunk(String),

    #[error("cannot {action} while {state}")]
    InvalidTransition { state: String, action: &'static str },

    #[error("malformed server message: {0}")]
    MalformedMessage(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("stream failed: {0}")]
    StreamFailed(String),

    #[error("transport failed: {0}")]
    TransportFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl LiveAudioError {
    /// Whether the error means the input or output device could not be acquired.
    ///
    /// These need user action (granting permission, plugging a device in)
    /// and are never retried internally.
    pub fn is_device_acquisition(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::DeviceNotAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquisition_failures_are_classified() {
        assert!(LiveAudioError::PermissionDenied.is_device_acquisition());
        assert!(LiveAudioError::DeviceNotAvailable.is_device_acquisition());
        assert!(!LiveAudioError::MalformedAudioChunk("odd length".into()).is_device_acquisition());
    }

    #[test]
    fn transition_message_names_state_and_action() {
        let err = LiveAudioError::InvalidTransition {
            state: "running".into(),
            action: "start capture",
        };
        assert_eq!(err.to_string(), "cannot start capture while running");
    }
}
