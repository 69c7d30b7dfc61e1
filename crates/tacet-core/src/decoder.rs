//! Decoder collaborator boundary.
//!
//! Codec implementations live outside this crate; a context is handed an
//! [`AudioDecoder`] at construction and [`Context::decode_audio_data`]
//! orchestrates the call, de-interleaving the result into a
//! [`SampleBuffer`].
//!
//! [`Context::decode_audio_data`]: crate::Context::decode_audio_data
//! [`SampleBuffer`]: crate::SampleBuffer

use crate::Result;

/// Raw decoder output: interleaved samples plus stream metadata.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples, `frame_count * channel_count` long.
    pub samples: Vec<f32>,
    /// Sample rate of `samples` (after any resampling the decoder applied).
    pub sample_rate: f64,
    pub channel_count: usize,
    pub frame_count: usize,
}

/// Decoder collaborator.
pub trait AudioDecoder: Send + Sync {
    /// Decode `bytes`, resampling to `target_sample_rate` when given.
    fn decode(&self, bytes: &[u8], target_sample_rate: Option<f64>) -> Result<DecodedAudio>;
}
