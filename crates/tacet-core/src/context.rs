//! Audio contexts - graph owners and node factories.
//!
//! A [`Context`] owns exactly one engine-side graph, created with the
//! context and destroyed at close. It walks the state machine
//! `Suspended -> Running -> Suspended` with `Closed` terminal, builds nodes
//! from the kind catalog, and orchestrates decoding. [`OfflineContext`] is
//! the batch variant: a fixed frame count and a single-shot
//! [`OfflineContext::start_rendering`] pass.
//!
//! # Example
//!
//! ```ignore
//! let ctx = Context::builder().sample_rate(48000.0).build()?;
//! let osc = ctx.create_oscillator(Default::default())?;
//! let gain = ctx.create_gain(GainOptions { gain: Some(0.5) })?;
//! osc.connect(&gain)?.connect(ctx.destination())?;
//! osc.start()?;
//! ctx.resume()?;
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::SampleBuffer;
use crate::catalog::{
    AnalyserOptions, BiquadOptions, BufferSourceOptions, ChannelMergerOptions,
    ChannelSplitterOptions, CompressorOptions, ConstantSourceOptions, ConvolverOptions,
    DelayOptions, GainOptions, IirOptions, NodeKind, OscillatorOptions, OscillatorWaveform,
    PannerOptions, StereoPannerOptions, WaveShaperOptions, WorkletOptions,
};
use crate::config::ContextConfig;
use crate::decoder::AudioDecoder;
use crate::device::{CaptureSink, DeviceInfo, DeviceProvider};
use crate::engine::{NullEngine, PropertyValue, RenderEngine};
use crate::ids::{BufferId, ContextId, IdAllocator};
use crate::node::{KindState, Node};
use crate::param::Param;
use crate::wave::PeriodicWave;
use crate::{Error, Result};

/// Lifecycle state of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

/// State shared between a context and every handle it hands out.
pub(crate) struct ContextShared {
    id: ContextId,
    sample_rate: f64,
    channels: usize,
    offline: bool,
    state: Mutex<ContextState>,
    engine: Arc<dyn RenderEngine>,
    ids: Arc<IdAllocator>,
    registered_buffers: Mutex<HashSet<BufferId>>,
    decoder: Option<Arc<dyn AudioDecoder>>,
    devices: Option<Arc<dyn DeviceProvider>>,
}

impl ContextShared {
    pub(crate) fn id(&self) -> ContextId {
        self.id
    }

    pub(crate) fn engine(&self) -> &Arc<dyn RenderEngine> {
        &self.engine
    }

    pub(crate) fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub(crate) fn current_time(&self) -> f64 {
        self.engine.frames_processed() as f64 / self.sample_rate
    }

    pub(crate) fn ensure_not_closed(&self) -> Result<()> {
        if *self.state.lock() == ContextState::Closed {
            return Err(Error::state(format!("{} is closed", self.id)));
        }
        Ok(())
    }

    /// Transfer a buffer's samples across the boundary at most once per id.
    /// The engine receives a snapshot of the interleaved data as of this
    /// call; later planar mutation is not re-sent.
    pub(crate) fn register_buffer_once(&self, buffer: &SampleBuffer) {
        let mut registered = self.registered_buffers.lock();
        if registered.insert(buffer.id()) {
            let flat = buffer.interleaved();
            self.engine.register_buffer(
                buffer.id(),
                &flat,
                buffer.length(),
                buffer.channel_count(),
            );
            tracing::debug!(buffer = %buffer.id(), frames = buffer.length(), "registered buffer");
        }
    }
}

/// Builder for [`Context`] and [`OfflineContext`].
#[derive(Default)]
pub struct ContextBuilder {
    config: ContextConfig,
    engine: Option<Arc<dyn RenderEngine>>,
    decoder: Option<Arc<dyn AudioDecoder>>,
    devices: Option<Arc<dyn DeviceProvider>>,
    allocator: Option<Arc<IdAllocator>>,
}

impl ContextBuilder {
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    pub fn channels(mut self, channels: usize) -> Self {
        self.config.channels = channels;
        self
    }

    /// Render engine collaborator. Defaults to [`NullEngine`].
    pub fn engine(mut self, engine: Arc<dyn RenderEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Decoder collaborator; without one, `decode_audio_data` fails.
    pub fn decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Device collaborator; without one, device operations fail and
    /// enumeration degrades to an empty list.
    pub fn devices(mut self, devices: Arc<dyn DeviceProvider>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Share an id allocator between contexts so buffer ids stay unique
    /// across them.
    pub fn allocator(mut self, allocator: Arc<IdAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn build(self) -> Result<Context> {
        self.build_inner(false)
    }

    /// Build an offline context rendering exactly `length` frames.
    pub fn build_offline(self, length: usize) -> Result<OfflineContext> {
        if length == 0 {
            return Err(Error::validation("render length must be at least 1 frame"));
        }
        let context = self.build_inner(true)?;
        Ok(OfflineContext {
            context,
            length,
            render_started: AtomicBool::new(false),
        })
    }

    fn build_inner(self, offline: bool) -> Result<Context> {
        self.config.validate()?;

        let ids = self.allocator.unwrap_or_default();
        let engine: Arc<dyn RenderEngine> =
            self.engine.unwrap_or_else(|| Arc::new(NullEngine::new()));

        let shared = Arc::new(ContextShared {
            id: ids.next_context_id(),
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            offline,
            state: Mutex::new(ContextState::Suspended),
            engine,
            ids,
            registered_buffers: Mutex::new(HashSet::new()),
            decoder: self.decoder,
            devices: self.devices,
        });

        let destination = Node::create(
            &shared,
            NodeKind::Destination,
            1,
            0,
            shared.channels,
            &[],
            &[],
            KindState::default(),
        );
        let listener = AudioListener::create(&shared);

        tracing::debug!(
            context = %shared.id,
            sample_rate = shared.sample_rate,
            channels = shared.channels,
            offline,
            "created context"
        );

        Ok(Context {
            shared,
            destination,
            listener,
        })
    }
}

/// Invoked with the decoded buffer when `decode_audio_data` succeeds.
pub type DecodeSuccessCallback = Box<dyn FnOnce(&SampleBuffer) + Send>;
/// Invoked with the failure when `decode_audio_data` fails.
pub type DecodeErrorCallback = Box<dyn FnOnce(&Error) + Send>;

/// Owner of one audio graph.
pub struct Context {
    shared: Arc<ContextShared>,
    destination: Node,
    listener: AudioListener,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Context with default config and a [`NullEngine`].
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn sample_rate(&self) -> f64 {
        self.shared.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.shared.channels
    }

    pub fn state(&self) -> ContextState {
        *self.shared.state.lock()
    }

    /// Seconds consumed by the engine's render cursor.
    pub fn current_time(&self) -> f64 {
        self.shared.current_time()
    }

    /// The terminal node every audible signal path ends at.
    pub fn destination(&self) -> &Node {
        &self.destination
    }

    pub fn listener(&self) -> &AudioListener {
        &self.listener
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    pub fn resume(&self) -> Result<()> {
        self.check_online("resume")?;
        let mut state = self.shared.state.lock();
        match *state {
            ContextState::Closed => Err(Error::state(format!("{} is closed", self.shared.id))),
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                *state = ContextState::Running;
                tracing::debug!(context = %self.shared.id, "resumed");
                Ok(())
            }
        }
    }

    pub fn suspend(&self) -> Result<()> {
        self.check_online("suspend")?;
        let mut state = self.shared.state.lock();
        match *state {
            ContextState::Closed => Err(Error::state(format!("{} is closed", self.shared.id))),
            ContextState::Suspended => Ok(()),
            ContextState::Running => {
                *state = ContextState::Suspended;
                tracing::debug!(context = %self.shared.id, "suspended");
                Ok(())
            }
        }
    }

    /// Tear down; terminal. Every later mutation fails with a state error.
    pub fn close(&self) -> Result<()> {
        self.check_online("close")?;
        let mut state = self.shared.state.lock();
        if *state == ContextState::Closed {
            return Err(Error::state(format!("{} is already closed", self.shared.id)));
        }
        *state = ContextState::Closed;
        tracing::debug!(context = %self.shared.id, "closed");
        Ok(())
    }

    fn check_online(&self, what: &str) -> Result<()> {
        if self.shared.offline {
            return Err(Error::state(format!(
                "{what}() is not available on an offline context"
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Node factories
    // ------------------------------------------------------------------

    fn create_node(
        &self,
        kind: NodeKind,
        overrides: &[(&'static str, f32)],
        state: KindState,
    ) -> Result<Node> {
        self.shared.ensure_not_closed()?;
        let descriptor = kind.descriptor();
        Ok(Node::create(
            &self.shared,
            kind,
            descriptor.inputs,
            descriptor.outputs,
            2,
            overrides,
            &[],
            state,
        ))
    }

    pub fn create_oscillator(&self, options: OscillatorOptions) -> Result<Node> {
        options.validate()?;
        let mut overrides = Vec::new();
        if let Some(frequency) = options.frequency {
            overrides.push(("frequency", frequency));
        }
        if let Some(detune) = options.detune {
            overrides.push(("detune", detune));
        }
        let node = self.create_node(NodeKind::Oscillator, &overrides, KindState::default())?;
        if let Some(wave) = options.periodic_wave {
            node.set_periodic_wave(wave)?;
        } else if options.waveform != OscillatorWaveform::Sine {
            node.set_waveform(options.waveform)?;
        }
        Ok(node)
    }

    pub fn create_gain(&self, options: GainOptions) -> Result<Node> {
        let mut overrides = Vec::new();
        if let Some(gain) = options.gain {
            overrides.push(("gain", gain));
        }
        self.create_node(NodeKind::Gain, &overrides, KindState::default())
    }

    pub fn create_biquad_filter(&self, options: BiquadOptions) -> Result<Node> {
        let mut overrides = Vec::new();
        if let Some(frequency) = options.frequency {
            overrides.push(("frequency", frequency));
        }
        if let Some(q) = options.q {
            overrides.push(("q", q));
        }
        if let Some(gain) = options.gain {
            overrides.push(("gain", gain));
        }
        if let Some(detune) = options.detune {
            overrides.push(("detune", detune));
        }
        let node = self.create_node(NodeKind::BiquadFilter, &overrides, KindState::default())?;
        node.set_filter_type(options.kind)?;
        Ok(node)
    }

    pub fn create_delay(&self, options: DelayOptions) -> Result<Node> {
        options.validate()?;
        let mut overrides = Vec::new();
        if let Some(delay_time) = options.delay_time {
            overrides.push(("delay_time", delay_time));
        }
        let state = KindState {
            max_delay: options.max_delay,
            ..KindState::default()
        };
        let node = self.create_node(NodeKind::Delay, &overrides, state)?;
        node.forward_property("max_delay", PropertyValue::Float(options.max_delay));
        Ok(node)
    }

    pub fn create_buffer_source(&self, options: BufferSourceOptions) -> Result<Node> {
        options.validate()?;
        let mut overrides = Vec::new();
        if let Some(rate) = options.playback_rate {
            overrides.push(("playback_rate", rate));
        }
        if let Some(detune) = options.detune {
            overrides.push(("detune", detune));
        }
        let node = self.create_node(NodeKind::BufferSource, &overrides, KindState::default())?;
        if let Some(buffer) = options.buffer {
            node.set_buffer(buffer)?;
        }
        if options.looping {
            node.set_looping(true)?;
        }
        if options.loop_start != 0.0 || options.loop_end != 0.0 {
            node.set_loop_range(options.loop_start, options.loop_end)?;
        }
        Ok(node)
    }

    pub fn create_convolver(&self, options: ConvolverOptions) -> Result<Node> {
        options.validate()?;
        let state = KindState {
            normalize: options.normalize,
            ..KindState::default()
        };
        let node = self.create_node(NodeKind::Convolver, &[], state)?;
        node.forward_property("normalize", PropertyValue::Bool(options.normalize));
        if let Some(buffer) = options.buffer {
            node.set_buffer(buffer)?;
        }
        Ok(node)
    }

    pub fn create_dynamics_compressor(&self, options: CompressorOptions) -> Result<Node> {
        let mut overrides = Vec::new();
        if let Some(threshold) = options.threshold {
            overrides.push(("threshold", threshold));
        }
        if let Some(knee) = options.knee {
            overrides.push(("knee", knee));
        }
        if let Some(ratio) = options.ratio {
            overrides.push(("ratio", ratio));
        }
        if let Some(attack) = options.attack {
            overrides.push(("attack", attack));
        }
        if let Some(release) = options.release {
            overrides.push(("release", release));
        }
        self.create_node(NodeKind::DynamicsCompressor, &overrides, KindState::default())
    }

    pub fn create_wave_shaper(&self, options: WaveShaperOptions) -> Result<Node> {
        options.validate()?;
        let node = self.create_node(NodeKind::WaveShaper, &[], KindState::default())?;
        if options.oversample != Default::default() {
            node.set_oversample(options.oversample)?;
        }
        if let Some(curve) = options.curve {
            node.set_curve(Some(curve))?;
        }
        Ok(node)
    }

    pub fn create_iir_filter(&self, options: IirOptions) -> Result<Node> {
        options.validate()?;
        let feedforward_f32: Vec<f32> = options.feedforward.iter().map(|&c| c as f32).collect();
        let feedback_f32: Vec<f32> = options.feedback.iter().map(|&c| c as f32).collect();
        let state = KindState {
            feedforward: options.feedforward,
            feedback: options.feedback,
            ..KindState::default()
        };
        let node = self.create_node(NodeKind::IirFilter, &[], state)?;
        node.forward_property("feedforward", PropertyValue::FloatList(feedforward_f32));
        node.forward_property("feedback", PropertyValue::FloatList(feedback_f32));
        Ok(node)
    }

    pub fn create_panner(&self, options: PannerOptions) -> Result<Node> {
        options.validate()?;
        let overrides = [
            ("position_x", options.position[0]),
            ("position_y", options.position[1]),
            ("position_z", options.position[2]),
            ("orientation_x", options.orientation[0]),
            ("orientation_y", options.orientation[1]),
            ("orientation_z", options.orientation[2]),
        ];
        let state = KindState {
            distance_model: options.distance_model,
            panning_model: options.panning_model,
            ref_distance: options.ref_distance,
            max_distance: options.max_distance,
            rolloff_factor: options.rolloff_factor,
            cone_inner_angle: options.cone_inner_angle,
            cone_outer_angle: options.cone_outer_angle,
            cone_outer_gain: options.cone_outer_gain,
            ..KindState::default()
        };
        let node = self.create_node(NodeKind::Panner, &overrides, state)?;
        node.set_distance_model(options.distance_model)?;
        node.set_panning_model(options.panning_model)?;
        node.set_ref_distance(options.ref_distance)?;
        node.set_max_distance(options.max_distance)?;
        node.set_rolloff_factor(options.rolloff_factor)?;
        node.set_cone(
            options.cone_inner_angle,
            options.cone_outer_angle,
            options.cone_outer_gain,
        )?;
        Ok(node)
    }

    pub fn create_stereo_panner(&self, options: StereoPannerOptions) -> Result<Node> {
        let mut overrides = Vec::new();
        if let Some(pan) = options.pan {
            overrides.push(("pan", pan));
        }
        self.create_node(NodeKind::StereoPanner, &overrides, KindState::default())
    }

    pub fn create_constant_source(&self, options: ConstantSourceOptions) -> Result<Node> {
        let mut overrides = Vec::new();
        if let Some(offset) = options.offset {
            overrides.push(("offset", offset));
        }
        self.create_node(NodeKind::ConstantSource, &overrides, KindState::default())
    }

    pub fn create_channel_splitter(&self, options: ChannelSplitterOptions) -> Result<Node> {
        options.validate()?;
        self.shared.ensure_not_closed()?;
        Ok(Node::create(
            &self.shared,
            NodeKind::ChannelSplitter,
            1,
            options.outputs,
            options.outputs,
            &[],
            &[],
            KindState::default(),
        ))
    }

    pub fn create_channel_merger(&self, options: ChannelMergerOptions) -> Result<Node> {
        options.validate()?;
        self.shared.ensure_not_closed()?;
        Ok(Node::create(
            &self.shared,
            NodeKind::ChannelMerger,
            options.inputs,
            1,
            1,
            &[],
            &[],
            KindState::default(),
        ))
    }

    pub fn create_analyser(&self, options: AnalyserOptions) -> Result<Node> {
        options.validate()?;
        let state = KindState {
            fft_size: crate::catalog::round_fft_size(options.fft_size)?,
            min_decibels: options.min_decibels,
            max_decibels: options.max_decibels,
            smoothing: options.smoothing,
            ..KindState::default()
        };
        let node = self.create_node(NodeKind::Analyser, &[], state)?;
        node.set_fft_size(options.fft_size)?;
        node.set_decibel_range(options.min_decibels, options.max_decibels)?;
        node.set_smoothing(options.smoothing)?;
        Ok(node)
    }

    pub fn create_media_stream_source(&self) -> Result<Node> {
        self.create_node(NodeKind::MediaStreamSource, &[], KindState::default())
    }

    /// Generic worklet-style node with caller-declared ports and params.
    pub fn create_worklet_node(&self, options: WorkletOptions) -> Result<Node> {
        options.validate()?;
        self.shared.ensure_not_closed()?;
        Ok(Node::create(
            &self.shared,
            NodeKind::Worklet,
            options.inputs,
            options.outputs,
            2,
            &[],
            &options.params,
            KindState::default(),
        ))
    }

    // ------------------------------------------------------------------
    // Buffers, waves, decoding
    // ------------------------------------------------------------------

    /// Allocate a zeroed sample buffer. No state-machine interaction.
    pub fn create_buffer(
        &self,
        channels: usize,
        length: usize,
        sample_rate: f64,
    ) -> Result<SampleBuffer> {
        SampleBuffer::allocate(self.shared.ids(), channels, length, sample_rate)
    }

    /// Synthesize a periodic wave. No state-machine interaction.
    pub fn create_periodic_wave(
        &self,
        real: &[f32],
        imag: &[f32],
        disable_normalization: bool,
    ) -> Result<PeriodicWave> {
        PeriodicWave::new(real, imag, disable_normalization)
    }

    /// Decode `bytes` through the decoder collaborator into a new buffer.
    ///
    /// On success `on_success` fires and the buffer is returned; on failure
    /// `on_error` fires and the same error is returned. Both completion
    /// paths always fire, never only one.
    pub fn decode_audio_data(
        &self,
        bytes: &[u8],
        on_success: Option<DecodeSuccessCallback>,
        on_error: Option<DecodeErrorCallback>,
    ) -> Result<SampleBuffer> {
        let outcome = self.decode_inner(bytes);
        match outcome {
            Ok(buffer) => {
                if let Some(callback) = on_success {
                    callback(&buffer);
                }
                Ok(buffer)
            }
            Err(err) => {
                if let Some(callback) = on_error {
                    callback(&err);
                }
                Err(err)
            }
        }
    }

    fn decode_inner(&self, bytes: &[u8]) -> Result<SampleBuffer> {
        self.shared.ensure_not_closed()?;
        let decoder = self
            .shared
            .decoder
            .as_ref()
            .ok_or_else(|| Error::Decode("no decoder configured".into()))?;

        let decoded = decoder.decode(bytes, Some(self.shared.sample_rate))?;
        if decoded.channel_count == 0 || decoded.samples.is_empty() {
            return Err(Error::Decode("decoder returned no audio".into()));
        }
        SampleBuffer::from_interleaved(
            self.shared.ids(),
            &decoded.samples,
            decoded.channel_count,
            decoded.sample_rate,
        )
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    /// Enumerate devices through the device collaborator. Failures (and a
    /// missing collaborator) degrade to an empty list with a warning.
    pub fn available_devices(&self) -> Vec<DeviceInfo> {
        let Some(devices) = self.shared.devices.as_ref() else {
            tracing::warn!("no device provider configured; no devices available");
            return Vec::new();
        };
        match devices.enumerate() {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(%err, "device enumeration failed");
                Vec::new()
            }
        }
    }

    pub fn open_device(&self, device: &str) -> Result<()> {
        self.device_provider()?.open(device)
    }

    pub fn close_device(&self, device: &str) -> Result<()> {
        self.device_provider()?.close(device)
    }

    pub fn start_capture(&self, device: &str, sink: CaptureSink) -> Result<()> {
        self.device_provider()?.start_capture(device, sink)
    }

    pub fn stop_capture(&self, device: &str) -> Result<()> {
        self.device_provider()?.stop_capture(device)
    }

    fn device_provider(&self) -> Result<&Arc<dyn DeviceProvider>> {
        self.shared
            .devices
            .as_ref()
            .ok_or_else(|| Error::Device("no device provider configured".into()))
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // The graph dies with its context; node and param handles held
        // elsewhere observe the closed state.
        *self.shared.state.lock() = ContextState::Closed;
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.shared.id)
            .field("sample_rate", &self.shared.sample_rate)
            .field("channels", &self.shared.channels)
            .field("state", &self.state())
            .finish()
    }
}

/// Batch-render context: renders a fixed number of frames exactly once.
pub struct OfflineContext {
    context: Context,
    length: usize,
    render_started: AtomicBool,
}

impl OfflineContext {
    /// Offline context with a [`NullEngine`]; use
    /// [`ContextBuilder::build_offline`] to inject collaborators.
    pub fn new(channels: usize, length: usize, sample_rate: f64) -> Result<Self> {
        Context::builder()
            .channels(channels)
            .sample_rate(sample_rate)
            .build_offline(length)
    }

    /// Total frames this context renders.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Drive the engine's single-shot render and return the result.
    ///
    /// The one legal transition into `Running`; completion closes the
    /// context. A second call - concurrent or later - fails with a state
    /// error before any work.
    pub fn start_rendering(&self) -> Result<SampleBuffer> {
        if self.render_started.swap(true, Ordering::SeqCst) {
            return Err(Error::state("rendering already started"));
        }

        {
            let mut state = self.context.shared.state.lock();
            debug_assert_eq!(*state, ContextState::Suspended);
            *state = ContextState::Running;
        }
        tracing::debug!(
            context = %self.context.shared.id,
            frames = self.length,
            "offline render started"
        );

        let channels = self.context.shared.channels;
        let mut output = vec![0.0f32; self.length * channels];
        self.context
            .shared
            .engine
            .process_graph_once(&mut output, self.length);

        *self.context.shared.state.lock() = ContextState::Closed;
        tracing::debug!(context = %self.context.shared.id, "offline render complete");

        SampleBuffer::from_interleaved(
            self.context.shared.ids(),
            &output,
            channels,
            self.context.shared.sample_rate,
        )
    }
}

impl core::ops::Deref for OfflineContext {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.context
    }
}

impl core::fmt::Debug for OfflineContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OfflineContext")
            .field("id", &self.context.shared.id)
            .field("length", &self.length)
            .field("state", &self.context.state())
            .finish()
    }
}

/// The listener pose: nine automatable params shared by every panner in the
/// graph.
pub struct AudioListener {
    params: Vec<Param>,
}

impl AudioListener {
    fn create(shared: &Arc<ContextShared>) -> Self {
        let id = shared.engine().create_node(NodeKind::Listener);
        let params = NodeKind::Listener
            .descriptor()
            .params
            .iter()
            .map(|spec| {
                Param::create(
                    Arc::clone(shared),
                    id,
                    spec.name,
                    spec.default,
                    spec.min,
                    spec.max,
                    None,
                )
            })
            .collect();
        Self { params }
    }

    pub fn param(&self, name: &str) -> Result<&Param> {
        self.params
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| Error::validation(format!("listener has no param '{name}'")))
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn set_position(&self, x: f32, y: f32, z: f32) -> Result<()> {
        self.param("position_x")?.set_value(x)?;
        self.param("position_y")?.set_value(y)?;
        self.param("position_z")?.set_value(z)?;
        Ok(())
    }

    pub fn set_orientation(&self, forward: [f32; 3], up: [f32; 3]) -> Result<()> {
        for (name, value) in [
            ("forward_x", forward[0]),
            ("forward_y", forward[1]),
            ("forward_z", forward[2]),
            ("up_x", up[0]),
            ("up_y", up[1]),
            ("up_z", up[2]),
        ] {
            self.param(name)?.set_value(value)?;
        }
        Ok(())
    }
}
