//! Error types for tacet-device.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to enumerate devices.
    #[error("Failed to enumerate audio devices")]
    DevicesError(#[from] cpal::DevicesError),

    /// Failed to read a device name.
    #[error("Failed to get device name")]
    DeviceNameError(#[from] cpal::DeviceNameError),

    /// Failed to get device config.
    #[error("Failed to get audio device config")]
    DeviceConfigError(#[from] cpal::DefaultStreamConfigError),

    /// Failed to build stream.
    #[error("Failed to build audio stream")]
    BuildStreamError(#[from] cpal::BuildStreamError),

    /// Failed to play stream.
    #[error("Failed to play audio stream")]
    PlayStreamError(#[from] cpal::PlayStreamError),

    /// Device not found.
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Device id is malformed or names the wrong direction.
    #[error("Invalid device id '{0}': {1}")]
    InvalidDevice(String, String),

    /// Unsupported sample format for capture.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for tacet_core::Error {
    fn from(e: Error) -> Self {
        tacet_core::Error::Device(e.to_string())
    }
}
