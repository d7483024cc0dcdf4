use crate::models::error::LiveAudioError;
use crate::session::transcript::TranscriptEntry;

/// Event delegate for live session notifications.
///
/// `on_error` may be called from the capture thread. Implementations
/// should marshal to the UI thread if needed.
pub trait LiveSessionDelegate: Send + Sync {
    /// Called when the session opens or closes.
    fn on_active_changed(&self, active: bool);

    /// Called with the entry a transcription fragment was merged into.
    fn on_transcript_updated(&self, entry: &TranscriptEntry);

    /// Called for failures that do not end the session.
    fn on_error(&self, error: &LiveAudioError);
}
