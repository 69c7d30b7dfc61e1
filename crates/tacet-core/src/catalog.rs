//! Node kind catalog.
//!
//! Every concrete node kind is a tag plus a static [`KindDescriptor`]:
//! fixed input/output cardinality and the param set with documented
//! default/min/max. Kind-specific knobs come in as explicit option structs
//! with enumerated fields, validated at construction and again on every
//! setter.

use serde::{Deserialize, Serialize};

use crate::wave::PeriodicWave;
use crate::SampleBuffer;
use crate::{Error, Result};

/// Tag identifying a concrete node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Oscillator,
    Gain,
    BiquadFilter,
    Delay,
    BufferSource,
    Convolver,
    DynamicsCompressor,
    WaveShaper,
    IirFilter,
    Panner,
    StereoPanner,
    ConstantSource,
    ChannelSplitter,
    ChannelMerger,
    Analyser,
    MediaStreamSource,
    Worklet,
    Destination,
    Listener,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Oscillator => "oscillator",
            Self::Gain => "gain",
            Self::BiquadFilter => "biquad-filter",
            Self::Delay => "delay",
            Self::BufferSource => "buffer-source",
            Self::Convolver => "convolver",
            Self::DynamicsCompressor => "dynamics-compressor",
            Self::WaveShaper => "wave-shaper",
            Self::IirFilter => "iir-filter",
            Self::Panner => "panner",
            Self::StereoPanner => "stereo-panner",
            Self::ConstantSource => "constant-source",
            Self::ChannelSplitter => "channel-splitter",
            Self::ChannelMerger => "channel-merger",
            Self::Analyser => "analyser",
            Self::MediaStreamSource => "media-stream-source",
            Self::Worklet => "worklet",
            Self::Destination => "destination",
            Self::Listener => "listener",
        }
    }

    /// Static descriptor for this kind. Splitter/merger/worklet cardinality
    /// here is the default; the per-kind options may override it.
    pub fn descriptor(self) -> &'static KindDescriptor {
        match self {
            Self::Oscillator => &OSCILLATOR,
            Self::Gain => &GAIN,
            Self::BiquadFilter => &BIQUAD,
            Self::Delay => &DELAY,
            Self::BufferSource => &BUFFER_SOURCE,
            Self::Convolver => &CONVOLVER,
            Self::DynamicsCompressor => &COMPRESSOR,
            Self::WaveShaper => &WAVE_SHAPER,
            Self::IirFilter => &IIR,
            Self::Panner => &PANNER,
            Self::StereoPanner => &STEREO_PANNER,
            Self::ConstantSource => &CONSTANT_SOURCE,
            Self::ChannelSplitter => &SPLITTER,
            Self::ChannelMerger => &MERGER,
            Self::Analyser => &ANALYSER,
            Self::MediaStreamSource => &MEDIA_STREAM_SOURCE,
            Self::Worklet => &WORKLET,
            Self::Destination => &DESTINATION,
            Self::Listener => &LISTENER,
        }
    }

    /// Kinds that expose the `start`/`stop` scheduling protocol.
    pub fn is_scheduled_source(self) -> bool {
        matches!(
            self,
            Self::Oscillator | Self::BufferSource | Self::ConstantSource
        )
    }
}

impl core::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared param: name plus default/min/max bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

impl ParamSpec {
    pub const fn new(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            default,
            min,
            max,
        }
    }
}

/// Static description of a node kind.
#[derive(Debug, Clone, Copy)]
pub struct KindDescriptor {
    pub inputs: usize,
    pub outputs: usize,
    pub params: &'static [ParamSpec],
}

const DETUNE_SPAN: f32 = 153_600.0;

static OSCILLATOR: KindDescriptor = KindDescriptor {
    inputs: 0,
    outputs: 1,
    params: &[
        ParamSpec::new("frequency", 440.0, -22_050.0, 22_050.0),
        ParamSpec::new("detune", 0.0, -DETUNE_SPAN, DETUNE_SPAN),
    ],
};

static GAIN: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[ParamSpec::new("gain", 1.0, 0.0, 1000.0)],
};

static BIQUAD: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[
        ParamSpec::new("frequency", 350.0, 10.0, 22_050.0),
        ParamSpec::new("q", 1.0, 1.0e-4, 1000.0),
        ParamSpec::new("gain", 0.0, -40.0, 40.0),
        ParamSpec::new("detune", 0.0, -DETUNE_SPAN, DETUNE_SPAN),
    ],
};

static DELAY: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    // The live max is the node's configured max_delay; this is the ceiling.
    params: &[ParamSpec::new("delay_time", 0.0, 0.0, 180.0)],
};

static BUFFER_SOURCE: KindDescriptor = KindDescriptor {
    inputs: 0,
    outputs: 1,
    params: &[
        ParamSpec::new("playback_rate", 1.0, -64.0, 64.0),
        ParamSpec::new("detune", 0.0, -DETUNE_SPAN, DETUNE_SPAN),
    ],
};

static CONVOLVER: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[],
};

static COMPRESSOR: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[
        ParamSpec::new("threshold", -24.0, -100.0, 0.0),
        ParamSpec::new("knee", 30.0, 0.0, 40.0),
        ParamSpec::new("ratio", 12.0, 1.0, 20.0),
        ParamSpec::new("attack", 0.003, 0.0, 1.0),
        ParamSpec::new("release", 0.25, 0.0, 1.0),
    ],
};

static WAVE_SHAPER: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[],
};

static IIR: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[],
};

static PANNER: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[
        ParamSpec::new("position_x", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("position_y", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("position_z", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("orientation_x", 1.0, f32::MIN, f32::MAX),
        ParamSpec::new("orientation_y", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("orientation_z", 0.0, f32::MIN, f32::MAX),
    ],
};

static STEREO_PANNER: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[ParamSpec::new("pan", 0.0, -1.0, 1.0)],
};

static CONSTANT_SOURCE: KindDescriptor = KindDescriptor {
    inputs: 0,
    outputs: 1,
    params: &[ParamSpec::new("offset", 1.0, -1000.0, 1000.0)],
};

static SPLITTER: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 6,
    params: &[],
};

static MERGER: KindDescriptor = KindDescriptor {
    inputs: 6,
    outputs: 1,
    params: &[],
};

static ANALYSER: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[],
};

static MEDIA_STREAM_SOURCE: KindDescriptor = KindDescriptor {
    inputs: 0,
    outputs: 1,
    params: &[],
};

static WORKLET: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 1,
    params: &[],
};

static DESTINATION: KindDescriptor = KindDescriptor {
    inputs: 1,
    outputs: 0,
    params: &[],
};

static LISTENER: KindDescriptor = KindDescriptor {
    inputs: 0,
    outputs: 0,
    params: &[
        ParamSpec::new("position_x", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("position_y", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("position_z", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("forward_x", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("forward_y", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("forward_z", -1.0, f32::MIN, f32::MAX),
        ParamSpec::new("up_x", 0.0, f32::MIN, f32::MAX),
        ParamSpec::new("up_y", 1.0, f32::MIN, f32::MAX),
        ParamSpec::new("up_z", 0.0, f32::MIN, f32::MAX),
    ],
};

// ============================================================================
// Kind-specific enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
    /// Wavetable from a [`PeriodicWave`].
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BiquadKind {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
    Lowshelf,
    Highshelf,
    Peaking,
    Notch,
    Allpass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Oversample {
    #[default]
    None,
    X2,
    X4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceModel {
    Linear,
    #[default]
    Inverse,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PanningModel {
    #[default]
    EqualPower,
    Hrtf,
}

// ============================================================================
// Per-kind options
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct OscillatorOptions {
    pub waveform: OscillatorWaveform,
    /// Overrides the custom wavetable; forces `waveform` to `Custom`.
    pub periodic_wave: Option<PeriodicWave>,
    pub frequency: Option<f32>,
    pub detune: Option<f32>,
}

impl OscillatorOptions {
    pub fn validate(&self) -> Result<()> {
        if self.waveform == OscillatorWaveform::Custom && self.periodic_wave.is_none() {
            return Err(Error::validation(
                "custom oscillator waveform requires a periodic wave",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GainOptions {
    pub gain: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct BiquadOptions {
    pub kind: BiquadKind,
    pub frequency: Option<f32>,
    pub q: Option<f32>,
    pub gain: Option<f32>,
    pub detune: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct DelayOptions {
    /// Upper bound of the `delay_time` param, seconds in (0, 180].
    pub max_delay: f64,
    pub delay_time: Option<f32>,
}

impl Default for DelayOptions {
    fn default() -> Self {
        Self {
            max_delay: 1.0,
            delay_time: None,
        }
    }
}

impl DelayOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.max_delay.is_finite() || self.max_delay <= 0.0 || self.max_delay > 180.0 {
            return Err(Error::validation(format!(
                "max_delay {} out of range (0, 180] seconds",
                self.max_delay
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BufferSourceOptions {
    pub buffer: Option<SampleBuffer>,
    pub playback_rate: Option<f32>,
    pub detune: Option<f32>,
    pub looping: bool,
    pub loop_start: f64,
    pub loop_end: f64,
}

impl BufferSourceOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.loop_start.is_finite() || self.loop_start < 0.0 {
            return Err(Error::validation(format!(
                "loop_start {} must be non-negative",
                self.loop_start
            )));
        }
        if !self.loop_end.is_finite() || self.loop_end < 0.0 {
            return Err(Error::validation(format!(
                "loop_end {} must be non-negative",
                self.loop_end
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConvolverOptions {
    pub buffer: Option<SampleBuffer>,
    pub normalize: bool,
}

impl Default for ConvolverOptions {
    fn default() -> Self {
        Self {
            buffer: None,
            normalize: true,
        }
    }
}

impl ConvolverOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(buffer) = &self.buffer {
            validate_impulse_channels(buffer.channel_count())?;
        }
        Ok(())
    }
}

/// Impulse responses are mono, stereo or 4-channel ("true" stereo).
pub(crate) fn validate_impulse_channels(channels: usize) -> Result<()> {
    if !matches!(channels, 1 | 2 | 4) {
        return Err(Error::validation(format!(
            "impulse response must have 1, 2 or 4 channels, got {channels}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct CompressorOptions {
    pub threshold: Option<f32>,
    pub knee: Option<f32>,
    pub ratio: Option<f32>,
    pub attack: Option<f32>,
    pub release: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct WaveShaperOptions {
    pub curve: Option<Vec<f32>>,
    pub oversample: Oversample,
}

impl WaveShaperOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(curve) = &self.curve {
            validate_shaper_curve(curve)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_shaper_curve(curve: &[f32]) -> Result<()> {
    if curve.len() < 2 {
        return Err(Error::validation(format!(
            "shaper curve needs at least 2 points, got {}",
            curve.len()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct IirOptions {
    pub feedforward: Vec<f64>,
    pub feedback: Vec<f64>,
}

impl IirOptions {
    pub fn validate(&self) -> Result<()> {
        for (label, coeffs) in [("feedforward", &self.feedforward), ("feedback", &self.feedback)]
        {
            if coeffs.is_empty() || coeffs.len() > 20 {
                return Err(Error::validation(format!(
                    "{label} length {} out of range (1-20)",
                    coeffs.len()
                )));
            }
        }
        if self.feedback[0] == 0.0 {
            return Err(Error::validation("feedback[0] must be non-zero"));
        }
        if self.feedforward.iter().all(|&c| c == 0.0) {
            return Err(Error::validation(
                "feedforward must have at least one non-zero coefficient",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PannerOptions {
    pub distance_model: DistanceModel,
    pub panning_model: PanningModel,
    pub ref_distance: f64,
    pub max_distance: f64,
    pub rolloff_factor: f64,
    pub cone_inner_angle: f64,
    pub cone_outer_angle: f64,
    pub cone_outer_gain: f64,
    pub position: [f32; 3],
    pub orientation: [f32; 3],
}

impl Default for PannerOptions {
    fn default() -> Self {
        Self {
            distance_model: DistanceModel::default(),
            panning_model: PanningModel::default(),
            ref_distance: 1.0,
            max_distance: 10_000.0,
            rolloff_factor: 1.0,
            cone_inner_angle: 360.0,
            cone_outer_angle: 360.0,
            cone_outer_gain: 0.0,
            position: [0.0, 0.0, 0.0],
            orientation: [1.0, 0.0, 0.0],
        }
    }
}

impl PannerOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.ref_distance.is_finite() || self.ref_distance < 0.0 {
            return Err(Error::validation(format!(
                "ref_distance {} must be non-negative",
                self.ref_distance
            )));
        }
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(Error::validation(format!(
                "max_distance {} must be positive",
                self.max_distance
            )));
        }
        if !self.rolloff_factor.is_finite() || self.rolloff_factor < 0.0 {
            return Err(Error::validation(format!(
                "rolloff_factor {} must be non-negative",
                self.rolloff_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.cone_outer_gain) {
            return Err(Error::validation(format!(
                "cone_outer_gain {} out of range [0, 1]",
                self.cone_outer_gain
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StereoPannerOptions {
    pub pan: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantSourceOptions {
    pub offset: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ChannelSplitterOptions {
    pub outputs: usize,
}

impl Default for ChannelSplitterOptions {
    fn default() -> Self {
        Self { outputs: 6 }
    }
}

impl ChannelSplitterOptions {
    pub fn validate(&self) -> Result<()> {
        validate_port_count("splitter outputs", self.outputs)
    }
}

#[derive(Debug, Clone)]
pub struct ChannelMergerOptions {
    pub inputs: usize,
}

impl Default for ChannelMergerOptions {
    fn default() -> Self {
        Self { inputs: 6 }
    }
}

impl ChannelMergerOptions {
    pub fn validate(&self) -> Result<()> {
        validate_port_count("merger inputs", self.inputs)
    }
}

fn validate_port_count(label: &str, count: usize) -> Result<()> {
    if count == 0 || count > 32 {
        return Err(Error::validation(format!(
            "{label} count {count} out of range (1-32)"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AnalyserOptions {
    /// Rounded up to a power of two in [32, 32768].
    pub fft_size: usize,
    pub min_decibels: f64,
    pub max_decibels: f64,
    pub smoothing: f64,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            min_decibels: -100.0,
            max_decibels: -30.0,
            smoothing: 0.8,
        }
    }
}

impl AnalyserOptions {
    pub fn validate(&self) -> Result<()> {
        round_fft_size(self.fft_size)?;
        validate_decibel_range(self.min_decibels, self.max_decibels)?;
        validate_smoothing(self.smoothing)?;
        Ok(())
    }
}

/// Round a requested FFT size up to the next power of two in [32, 32768].
pub fn round_fft_size(requested: usize) -> Result<usize> {
    let rounded = requested.next_power_of_two().max(32);
    if rounded > 32_768 {
        return Err(Error::validation(format!(
            "fft size {requested} exceeds 32768"
        )));
    }
    Ok(rounded)
}

pub(crate) fn validate_decibel_range(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(Error::validation(format!(
            "decibel range [{min}, {max}] requires min < max"
        )));
    }
    Ok(())
}

pub(crate) fn validate_smoothing(smoothing: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&smoothing) {
        return Err(Error::validation(format!(
            "smoothing {smoothing} out of range [0, 1]"
        )));
    }
    Ok(())
}

/// A caller-declared param on a worklet node.
#[derive(Debug, Clone)]
pub struct WorkletParamSpec {
    pub name: String,
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone)]
pub struct WorkletOptions {
    pub inputs: usize,
    pub outputs: usize,
    pub params: Vec<WorkletParamSpec>,
}

impl Default for WorkletOptions {
    fn default() -> Self {
        Self {
            inputs: 1,
            outputs: 1,
            params: Vec::new(),
        }
    }
}

impl WorkletOptions {
    pub fn validate(&self) -> Result<()> {
        if self.inputs > 32 || self.outputs > 32 {
            return Err(Error::validation(format!(
                "worklet port counts {}x{} out of range (max 32)",
                self.inputs, self.outputs
            )));
        }
        if self.inputs == 0 && self.outputs == 0 {
            return Err(Error::validation(
                "worklet needs at least one input or output",
            ));
        }
        for (i, spec) in self.params.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(Error::validation(format!("worklet param {i} has no name")));
            }
            if self.params[..i].iter().any(|p| p.name == spec.name) {
                return Err(Error::validation(format!(
                    "duplicate worklet param name '{}'",
                    spec.name
                )));
            }
            if !(spec.min <= spec.default && spec.default <= spec.max) {
                return Err(Error::validation(format!(
                    "worklet param '{}' default {} outside [{}, {}]",
                    spec.name, spec.default, spec.min, spec.max
                )));
            }
        }
        Ok(())
    }
}
