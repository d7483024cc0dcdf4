pub mod audio_output;
pub mod capture_provider;
pub mod session_delegate;
pub mod transport;
