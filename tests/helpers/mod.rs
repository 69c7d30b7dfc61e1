//! Shared test fixtures.

use std::sync::Arc;

use tacet::{AudioDecoder, Context, DecodedAudio, RecordingEngine, Result};

/// Context wired to a call-logging engine.
pub fn recording_context() -> (Context, Arc<RecordingEngine>) {
    let engine = Arc::new(RecordingEngine::new());
    let ctx = Context::builder()
        .engine(engine.clone())
        .build()
        .expect("context builds with default config");
    (ctx, engine)
}

/// Decoder stub: bytes become stereo sample pairs scaled to [0, 1], or a
/// decode failure on demand.
pub struct StubDecoder {
    pub fail: bool,
}

impl AudioDecoder for StubDecoder {
    fn decode(&self, bytes: &[u8], target_sample_rate: Option<f64>) -> Result<DecodedAudio> {
        if self.fail {
            return Err(tacet::Error::Decode("unsupported container".into()));
        }
        let samples: Vec<f32> = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        Ok(DecodedAudio {
            frame_count: samples.len() / 2,
            channel_count: 2,
            sample_rate: target_sample_rate.unwrap_or(44100.0),
            samples,
        })
    }
}
