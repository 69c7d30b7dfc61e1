//! Audio-graph front end: contexts, nodes, automatable params, sample
//! buffers, and the boundaries to the collaborators that do the actual work.
//!
//! # Primary API
//!
//! - [`Context`] / [`ContextBuilder`]: graph owner, state machine, node
//!   factories
//! - [`OfflineContext`]: fixed-length single-shot rendering
//! - [`Node`]: graph vertex with the connect/disconnect protocol
//! - [`Param`]: bounded scalar with an automation timeline
//! - [`SampleBuffer`]: planar samples with a derived interleaved view
//! - [`PeriodicWave`]: wavetable synthesis from Fourier coefficients
//!
//! # Collaborator boundaries
//!
//! - [`RenderEngine`]: walks the graph and computes samples
//! - [`AudioDecoder`]: turns encoded bytes into samples
//! - [`DeviceProvider`]: hardware enumeration, playback and capture
//!
//! This crate never computes a DSP sample itself; it owns the graph model
//! and guarantees that edits and automation reach the engine boundary in
//! the order the caller issued them.
//!
//! # Example
//!
//! ```ignore
//! use tacet_core::prelude::*;
//!
//! let ctx = Context::builder().sample_rate(48000.0).build()?;
//! let osc = ctx.create_oscillator(Default::default())?;
//! osc.connect(ctx.destination())?;
//! osc.param("frequency")?.set_value(220.0)?;
//! osc.start()?;
//! ctx.resume()?;
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::ContextConfig;

mod ids;
pub use ids::{BufferId, ContextId, IdAllocator};

pub mod engine;
pub use engine::{
    AutomationEvent, EngineCall, EngineNodeId, NullEngine, PropertyValue, RecordingEngine,
    RenderEngine,
};

mod decoder;
pub use decoder::{AudioDecoder, DecodedAudio};

mod device;
pub use device::{CaptureSink, DeviceInfo, DeviceKind, DeviceProvider};

mod buffer;
pub use buffer::SampleBuffer;

mod wave;
pub use wave::{PeriodicWave, WAVETABLE_SIZE};

mod param;
pub use param::Param;

pub mod catalog;
pub use catalog::{
    AnalyserOptions, BiquadKind, BiquadOptions, BufferSourceOptions, ChannelMergerOptions,
    ChannelSplitterOptions, CompressorOptions, ConstantSourceOptions, ConvolverOptions,
    DelayOptions, DistanceModel, GainOptions, IirOptions, KindDescriptor, NodeKind,
    OscillatorOptions, OscillatorWaveform, Oversample, PanningModel, PannerOptions, ParamSpec,
    StereoPannerOptions, WaveShaperOptions, WorkletOptions, WorkletParamSpec,
};

mod node;
pub use node::{ChannelCountMode, ChannelInterpretation, Node};

mod context;
pub use context::{
    AudioListener, Context, ContextBuilder, ContextState, DecodeErrorCallback,
    DecodeSuccessCallback, OfflineContext,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::catalog::{
        AnalyserOptions, BiquadKind, BiquadOptions, BufferSourceOptions, ChannelMergerOptions,
        ChannelSplitterOptions, CompressorOptions, ConstantSourceOptions, ConvolverOptions,
        DelayOptions, GainOptions, IirOptions, NodeKind, OscillatorOptions, OscillatorWaveform,
        Oversample, PannerOptions, StereoPannerOptions, WaveShaperOptions, WorkletOptions,
    };
    pub use crate::{
        Context, ContextBuilder, ContextState, Error, Node, OfflineContext, Param, PeriodicWave,
        Result, SampleBuffer,
    };
}
