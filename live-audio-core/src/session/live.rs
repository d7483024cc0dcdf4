use std::sync::Arc;

use parking_lot::Mutex;

use crate::capture::pipeline::{CapturePipeline, FrameCallback};
use crate::models::audio_models::{EncodedFrame, PipelineDiagnostics};
use crate::models::config::{CaptureConfiguration, PlaybackConfiguration};
use crate::models::error::LiveAudioError;
use crate::playback::scheduler::PlaybackScheduler;
use crate::session::messages::ServerMessage;
use crate::session::transcript::{Role, Transcript};
use crate::traits::audio_output::OutputProvider;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::session_delegate::LiveSessionDelegate;
use crate::traits::transport::LiveTransport;

type DelegateSlot = Arc<Mutex<Option<Arc<dyn LiveSessionDelegate>>>>;

/// Real-time voice conversation over a realtime transport.
///
/// Wires a capture pipeline and a playback scheduler to the transport:
/// ```text
/// [Mic] → CapturePipeline → EncodedFrame → LiveTransport::send_realtime_audio
/// ServerMessage → audio parts → PlaybackScheduler → [Speaker]
///               → transcription → Transcript
/// ```
///
/// The transport connection itself is owned by the caller, which forwards
/// inbound messages to `handle_message` and reports connection loss through
/// `on_transport_closed`.
pub struct LiveSession<P: CaptureProvider, O: OutputProvider, T: LiveTransport + 'static> {
    capture: CapturePipeline<P>,
    playback: PlaybackScheduler<O>,
    transport: Arc<T>,
    transcript: Transcript,
    delegate: DelegateSlot,
    active: bool,
}

impl<P: CaptureProvider, O: OutputProvider, T: LiveTransport + 'static> LiveSession<P, O, T> {
    pub fn new(
        mic: P,
        output: O,
        transport: Arc<T>,
        capture_config: CaptureConfiguration,
        playback_config: PlaybackConfiguration,
    ) -> Result<Self, LiveAudioError> {
        let delegate: DelegateSlot = Arc::new(Mutex::new(None));

        let on_frame: FrameCallback = {
            let transport = Arc::clone(&transport);
            let delegate = Arc::clone(&delegate);
            Arc::new(move |frame: &EncodedFrame| {
                if let Err(e) = transport.send_realtime_audio(&frame.mime_type(), &frame.data) {
                    log::warn!("failed to send audio frame: {}", e);
                    if let Some(d) = delegate.lock().as_ref() {
                        d.on_error(&e);
                    }
                }
            })
        };

        Ok(Self {
            capture: CapturePipeline::new(mic, capture_config, on_frame)?,
            playback: PlaybackScheduler::new(output, playback_config)?,
            transport,
            transcript: Transcript::new(),
            delegate,
            active: false,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn LiveSessionDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Seed the transcript with earlier typed conversation.
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Rate outbound frames are tagged with.
    pub fn capture_sample_rate(&self) -> u32 {
        self.capture.sample_rate()
    }

    pub fn capture_diagnostics(&self) -> PipelineDiagnostics {
        self.capture.diagnostics()
    }

    pub fn playback_diagnostics(&self) -> PipelineDiagnostics {
        self.playback.diagnostics()
    }

    /// Start playback, then the microphone.
    ///
    /// Playback goes first so the output device is resumed inside the
    /// caller's user gesture. If the microphone cannot be acquired the
    /// session is torn down again and the device error is returned.
    pub fn open(&mut self) -> Result<(), LiveAudioError> {
        if self.active {
            return Ok(());
        }

        if let Err(e) = self.playback.start() {
            log::error!("failed to open live session output: {}", e);
            self.playback.stop();
            self.transport.close();
            return Err(e);
        }

        if self.capture.state().is_stopped() {
            self.capture.reset()?;
        }
        if let Err(e) = self.capture.start() {
            log::error!("failed to open live session: {}", e);
            self.playback.stop();
            self.transport.close();
            return Err(e);
        }

        self.active = true;
        log::info!(
            "live session opened, sending audio/pcm at {} Hz",
            self.capture.sample_rate()
        );
        self.notify_active(true);
        Ok(())
    }

    /// Route one inbound message. Returns how many audio chunks were scheduled.
    pub fn handle_message(&mut self, message: &ServerMessage) -> usize {
        if !self.active {
            log::debug!("ignoring message for inactive live session");
            return 0;
        }

        let mut scheduled = 0;
        for chunk in message.audio_chunks() {
            if self.playback.play(chunk).is_some() {
                scheduled += 1;
            }
        }

        if let Some(text) = message.output_text() {
            self.record_transcription(Role::Model, text);
        }
        if let Some(text) = message.input_text() {
            self.record_transcription(Role::User, text);
        }

        scheduled
    }

    /// Parse and route one inbound JSON message.
    pub fn handle_json(&mut self, json: &str) -> Result<usize, LiveAudioError> {
        let message = ServerMessage::from_json(json)?;
        Ok(self.handle_message(&message))
    }

    /// The transport reported the connection closed or failed.
    pub fn on_transport_closed(&mut self) {
        log::info!("live transport closed");
        self.close();
    }

    /// Close the transport and stop both audio directions. Idempotent.
    pub fn close(&mut self) {
        if !self.active {
            return;
        }
        self.transport.close();
        self.capture.stop();
        self.playback.stop();
        self.active = false;
        log::info!("live session closed");
        self.notify_active(false);
    }

    fn record_transcription(&mut self, role: Role, text: &str) {
        let entry = self.transcript.append_live(role, text).clone();
        if let Some(d) = self.delegate.lock().as_ref() {
            d.on_transcript_updated(&entry);
        }
    }

    fn notify_active(&self, active: bool) {
        if let Some(d) = self.delegate.lock().as_ref() {
            d.on_active_changed(active);
        }
    }
}

impl<P: CaptureProvider, O: OutputProvider, T: LiveTransport + 'static> Drop for LiveSession<P, O, T> {
    fn drop(&mut self) {
        self.close();
    }
}
