//! # Tacet - audio graph front end
//!
//! A Web-Audio-style audio graph API: contexts, nodes, automatable params
//! and sample buffers, with rendering, decoding and hardware access
//! delegated to collaborators behind explicit boundaries.
//!
//! ## Architecture
//!
//! Tacet is an umbrella crate that coordinates:
//! - **tacet-core** - the graph model: [`Context`], [`Node`], [`Param`],
//!   [`SampleBuffer`], [`PeriodicWave`], the node kind catalog, and the
//!   engine/decoder/device boundary traits
//! - **tacet-device** - CPAL-backed device enumeration and capture
//!   (`device` feature, enabled by default)
//!
//! ## Quick Start
//!
//! ```ignore
//! use tacet::prelude::*;
//!
//! let ctx = Context::builder().sample_rate(48000.0).build()?;
//!
//! let osc = ctx.create_oscillator(Default::default())?;
//! let gain = ctx.create_gain(GainOptions { gain: Some(0.5) })?;
//! osc.connect(&gain)?.connect(ctx.destination())?;
//!
//! osc.param("frequency")?
//!     .set_value_at_time(220.0, 0.0)?
//!     .linear_ramp_to_value_at_time(880.0, 2.0)?;
//!
//! osc.start()?;
//! ctx.resume()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - graph model plus device glue
//! - `device` - CPAL device provider

/// Re-export of tacet-core for direct access
pub use tacet_core as core;

// Graph model
pub use tacet_core::{
    // Collaborator boundaries
    AudioDecoder,
    AudioListener,
    AutomationEvent,
    BufferId,
    CaptureSink,
    ChannelCountMode,
    ChannelInterpretation,
    Context,
    ContextBuilder,
    ContextConfig,
    ContextId,
    ContextState,
    DecodedAudio,
    DeviceInfo,
    DeviceKind,
    DeviceProvider,
    EngineCall,
    EngineNodeId,

    // Error
    Error,
    IdAllocator,
    Node,
    NodeKind,
    NullEngine,
    OfflineContext,
    Param,
    PeriodicWave,
    PropertyValue,
    RecordingEngine,
    RenderEngine,
    Result,
    SampleBuffer,
    WAVETABLE_SIZE,
};

// Node kind options and enums
pub use tacet_core::{
    AnalyserOptions, BiquadKind, BiquadOptions, BufferSourceOptions, ChannelMergerOptions,
    ChannelSplitterOptions, CompressorOptions, ConstantSourceOptions, ConvolverOptions,
    DelayOptions, DistanceModel, GainOptions, IirOptions, OscillatorOptions, OscillatorWaveform,
    Oversample, PanningModel, PannerOptions, StereoPannerOptions, WaveShaperOptions,
    WorkletOptions, WorkletParamSpec,
};

// Device glue
#[cfg(feature = "device")]
pub use tacet_device as device;

#[cfg(feature = "device")]
pub use tacet_device::CpalDeviceProvider;

/// Prelude for common imports.
pub mod prelude {
    pub use tacet_core::prelude::*;

    #[cfg(feature = "device")]
    pub use tacet_device::CpalDeviceProvider;
}
