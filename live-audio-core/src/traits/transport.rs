use crate::models::error::LiveAudioError;

/// Outbound side of the realtime connection to the voice service.
///
/// Inbound messages are pushed into `LiveSession::handle_message` by
/// whoever owns the connection.
pub trait LiveTransport: Send + Sync {
    /// Send one realtime audio frame, e.g. mime `audio/pcm;rate=48000`.
    fn send_realtime_audio(&self, mime_type: &str, data: &str) -> Result<(), LiveAudioError>;

    /// Close the connection. Must tolerate repeats.
    fn close(&self);
}
