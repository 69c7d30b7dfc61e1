//! Graph nodes and the connection protocol.
//!
//! A [`Node`] is a cheap handle over shared state; clones address the same
//! graph vertex. Every edit is validated synchronously, recorded front-side,
//! and mirrored across the engine boundary in issue order. Disconnects are
//! idempotent: repeating one after it already removed the matching edges is
//! a silent no-op, and the engine only hears about edges actually removed.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::catalog::{
    self, BiquadKind, DistanceModel, NodeKind, OscillatorWaveform, Oversample, PanningModel,
    WorkletParamSpec,
};
use crate::context::ContextShared;
use crate::engine::{EngineNodeId, PropertyValue};
use crate::param::Param;
use crate::wave::PeriodicWave;
use crate::{Error, Result, SampleBuffer};

/// How a node derives its processing channel count from its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ChannelCountMode {
    #[default]
    Max,
    ClampedMax,
    Explicit,
}

impl ChannelCountMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::ClampedMax => "clamped-max",
            Self::Explicit => "explicit",
        }
    }
}

/// How input channels map onto processing channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ChannelInterpretation {
    #[default]
    Speakers,
    Discrete,
}

impl ChannelInterpretation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Speakers => "speakers",
            Self::Discrete => "discrete",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ChannelConfig {
    count: usize,
    mode: ChannelCountMode,
    interpretation: ChannelInterpretation,
}

/// Scheduling state of a source-kind node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackState {
    Idle,
    Started,
    Stopped,
}

/// Kind-specific mutable state, validated on every setter.
#[derive(Debug, Clone, Default)]
pub(crate) struct KindState {
    pub(crate) waveform: OscillatorWaveform,
    pub(crate) periodic_wave: Option<PeriodicWave>,
    pub(crate) filter_type: BiquadKind,
    pub(crate) max_delay: f64,
    pub(crate) buffer: Option<SampleBuffer>,
    pub(crate) looping: bool,
    pub(crate) loop_start: f64,
    pub(crate) loop_end: f64,
    pub(crate) normalize: bool,
    pub(crate) curve: Option<Vec<f32>>,
    pub(crate) oversample: Oversample,
    pub(crate) feedforward: Vec<f64>,
    pub(crate) feedback: Vec<f64>,
    pub(crate) distance_model: DistanceModel,
    pub(crate) panning_model: PanningModel,
    pub(crate) ref_distance: f64,
    pub(crate) max_distance: f64,
    pub(crate) rolloff_factor: f64,
    pub(crate) cone_inner_angle: f64,
    pub(crate) cone_outer_angle: f64,
    pub(crate) cone_outer_gain: f64,
    pub(crate) fft_size: usize,
    pub(crate) min_decibels: f64,
    pub(crate) max_decibels: f64,
    pub(crate) smoothing: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum EdgeTarget {
    Node(EngineNodeId),
    Param { node: EngineNodeId, name: String },
}

#[derive(Debug, Clone, PartialEq)]
struct Edge {
    target: EdgeTarget,
    output: usize,
    input: usize,
}

struct NodeInner {
    shared: Arc<ContextShared>,
    id: EngineNodeId,
    kind: NodeKind,
    inputs: usize,
    outputs: usize,
    params: Vec<Param>,
    channel: Mutex<ChannelConfig>,
    state: Mutex<KindState>,
    playback: Mutex<PlaybackState>,
    edges: Mutex<Vec<Edge>>,
}

/// A vertex of the audio graph.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

impl Node {
    /// Allocate the engine-side node, build the declared params (descriptor
    /// specs with option overrides, plus any worklet-declared extras), and
    /// wrap everything into a handle.
    pub(crate) fn create(
        shared: &Arc<ContextShared>,
        kind: NodeKind,
        inputs: usize,
        outputs: usize,
        channel_count: usize,
        overrides: &[(&'static str, f32)],
        extra_params: &[WorkletParamSpec],
        state: KindState,
    ) -> Self {
        let id = shared.engine().create_node(kind);
        tracing::debug!(node = %id, %kind, "created node");

        let mut params = Vec::new();
        for spec in kind.descriptor().params {
            let initial = overrides
                .iter()
                .find(|(name, _)| *name == spec.name)
                .map(|&(_, v)| v);
            // The catalog carries the global delay ceiling; the live bound
            // is this node's configured max_delay.
            let max = if kind == NodeKind::Delay && spec.name == "delay_time" {
                state.max_delay as f32
            } else {
                spec.max
            };
            params.push(Param::create(
                Arc::clone(shared),
                id,
                spec.name,
                spec.default,
                spec.min,
                max,
                initial,
            ));
        }
        for spec in extra_params {
            params.push(Param::create(
                Arc::clone(shared),
                id,
                spec.name.clone(),
                spec.default,
                spec.min,
                spec.max,
                None,
            ));
        }

        Self {
            inner: Arc::new(NodeInner {
                shared: Arc::clone(shared),
                id,
                kind,
                inputs,
                outputs,
                params,
                channel: Mutex::new(ChannelConfig {
                    count: channel_count,
                    mode: ChannelCountMode::default(),
                    interpretation: ChannelInterpretation::default(),
                }),
                state: Mutex::new(state),
                playback: Mutex::new(PlaybackState::Idle),
                edges: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Engine-side identity of this node.
    pub fn engine_id(&self) -> EngineNodeId {
        self.inner.id
    }

    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    pub fn number_of_inputs(&self) -> usize {
        self.inner.inputs
    }

    pub fn number_of_outputs(&self) -> usize {
        self.inner.outputs
    }

    // ------------------------------------------------------------------
    // Params
    // ------------------------------------------------------------------

    /// Look up a declared param by name.
    pub fn param(&self, name: &str) -> Result<&Param> {
        self.inner
            .params
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| {
                Error::validation(format!(
                    "{} node has no param '{name}'",
                    self.inner.kind
                ))
            })
    }

    /// All params, in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.inner.params
    }

    // ------------------------------------------------------------------
    // Channel configuration
    // ------------------------------------------------------------------

    pub fn channel_count(&self) -> usize {
        self.inner.channel.lock().count
    }

    pub fn channel_count_mode(&self) -> ChannelCountMode {
        self.inner.channel.lock().mode
    }

    pub fn channel_interpretation(&self) -> ChannelInterpretation {
        self.inner.channel.lock().interpretation
    }

    pub fn set_channel_count(&self, count: usize) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.reject_fixed_channel_config("channel count")?;
        if count == 0 || count > 32 {
            return Err(Error::validation(format!(
                "channel count {count} out of range (1-32)"
            )));
        }
        self.inner.channel.lock().count = count;
        self.forward_property("channel_count", PropertyValue::Int(count as i64));
        Ok(())
    }

    pub fn set_channel_count_mode(&self, mode: ChannelCountMode) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.reject_fixed_channel_config("channel count mode")?;
        self.inner.channel.lock().mode = mode;
        self.forward_property("channel_count_mode", PropertyValue::Str(mode.as_str().into()));
        Ok(())
    }

    pub fn set_channel_interpretation(&self, interpretation: ChannelInterpretation) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.reject_fixed_channel_config("channel interpretation")?;
        self.inner.channel.lock().interpretation = interpretation;
        self.forward_property(
            "channel_interpretation",
            PropertyValue::Str(interpretation.as_str().into()),
        );
        Ok(())
    }

    fn reject_fixed_channel_config(&self, what: &str) -> Result<()> {
        match self.inner.kind {
            NodeKind::ChannelSplitter | NodeKind::ChannelMerger | NodeKind::Destination => {
                Err(Error::validation(format!(
                    "{} of a {} node is fixed",
                    what, self.inner.kind
                )))
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Connection protocol
    // ------------------------------------------------------------------

    /// Connect output 0 to input 0 of `dest`. Returns `dest` for chaining.
    pub fn connect<'a>(&self, dest: &'a Node) -> Result<&'a Node> {
        self.connect_ports(dest, 0, 0)
    }

    /// Connect a specific output to a specific input of `dest`.
    pub fn connect_ports<'a>(&self, dest: &'a Node, output: usize, input: usize) -> Result<&'a Node> {
        self.inner.shared.ensure_not_closed()?;
        if !Arc::ptr_eq(&self.inner.shared, &dest.inner.shared) {
            return Err(Error::CrossContext {
                source_context: self.inner.shared.id().raw(),
                destination: dest.inner.shared.id().raw(),
            });
        }
        self.check_output(output)?;
        if dest.inner.inputs == 0 {
            return Err(Error::validation(format!(
                "{} node has no inputs to connect to",
                dest.inner.kind
            )));
        }
        if input >= dest.inner.inputs {
            return Err(Error::validation(format!(
                "input index {input} out of range ({} node has {} inputs)",
                dest.inner.kind, dest.inner.inputs
            )));
        }

        let edge = Edge {
            target: EdgeTarget::Node(dest.inner.id),
            output,
            input,
        };
        let mut edges = self.inner.edges.lock();
        if !edges.contains(&edge) {
            edges.push(edge);
            self.inner
                .shared
                .engine()
                .connect_nodes(self.inner.id, dest.inner.id, output, input);
        }
        Ok(dest)
    }

    /// Establish a modulation edge from output 0 onto `param`. The engine
    /// sums this contribution atop the param's scheduled value.
    pub fn connect_param<'a>(&self, param: &'a Param) -> Result<&'a Param> {
        self.connect_param_output(param, 0)
    }

    /// Modulation edge from a specific output onto `param`.
    pub fn connect_param_output<'a>(&self, param: &'a Param, output: usize) -> Result<&'a Param> {
        self.inner.shared.ensure_not_closed()?;
        if !Arc::ptr_eq(&self.inner.shared, param.context()) {
            return Err(Error::CrossContext {
                source_context: self.inner.shared.id().raw(),
                destination: param.context().id().raw(),
            });
        }
        self.check_output(output)?;

        let edge = Edge {
            target: EdgeTarget::Param {
                node: param.owner(),
                name: param.name().to_string(),
            },
            output,
            input: 0,
        };
        let mut edges = self.inner.edges.lock();
        if !edges.contains(&edge) {
            edges.push(edge);
            self.inner.shared.engine().connect_to_param(
                self.inner.id,
                param.owner(),
                param.name(),
                output,
            );
        }
        Ok(param)
    }

    /// Remove all outgoing edges.
    pub fn disconnect(&self) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        let removed = {
            let mut edges = self.inner.edges.lock();
            let had_any = !edges.is_empty();
            edges.clear();
            had_any
        };
        if removed {
            self.inner.shared.engine().disconnect_all(self.inner.id);
        }
        Ok(())
    }

    /// Remove outgoing edges from one output index.
    pub fn disconnect_output(&self, output: usize) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_output(output)?;
        let removed = self.remove_edges(|e| e.output == output);
        if removed {
            self.inner
                .shared
                .engine()
                .disconnect_output(self.inner.id, output);
        }
        Ok(())
    }

    /// Remove all edges to `dest`.
    pub fn disconnect_node(&self, dest: &Node) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        let removed = self.remove_edges(|e| e.target == EdgeTarget::Node(dest.inner.id));
        if removed {
            self.inner
                .shared
                .engine()
                .disconnect_nodes(self.inner.id, dest.inner.id);
        }
        Ok(())
    }

    /// Remove the single edge `self[output] -> dest[input]`.
    pub fn disconnect_node_ports(&self, dest: &Node, output: usize, input: usize) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_output(output)?;
        let removed = self.remove_edges(|e| {
            e.target == EdgeTarget::Node(dest.inner.id) && e.output == output && e.input == input
        });
        if removed {
            self.inner
                .shared
                .engine()
                .disconnect_nodes_port(self.inner.id, dest.inner.id, output, input);
        }
        Ok(())
    }

    /// Remove all modulation edges to `param`.
    pub fn disconnect_param(&self, param: &Param) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        let target = EdgeTarget::Param {
            node: param.owner(),
            name: param.name().to_string(),
        };
        let removed = self.remove_edges(|e| e.target == target);
        if removed {
            self.inner.shared.engine().disconnect_from_param(
                self.inner.id,
                param.owner(),
                param.name(),
            );
        }
        Ok(())
    }

    /// Remove the modulation edge from one output to `param`.
    pub fn disconnect_param_output(&self, param: &Param, output: usize) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_output(output)?;
        let target = EdgeTarget::Param {
            node: param.owner(),
            name: param.name().to_string(),
        };
        let removed = self.remove_edges(|e| e.target == target && e.output == output);
        if removed {
            self.inner.shared.engine().disconnect_param_output(
                self.inner.id,
                param.owner(),
                param.name(),
                output,
            );
        }
        Ok(())
    }

    fn remove_edges(&self, matches: impl Fn(&Edge) -> bool) -> bool {
        let mut edges = self.inner.edges.lock();
        let before = edges.len();
        edges.retain(|e| !matches(e));
        edges.len() != before
    }

    fn check_output(&self, output: usize) -> Result<()> {
        if output >= self.inner.outputs {
            return Err(Error::validation(format!(
                "output index {output} out of range ({} node has {} outputs)",
                self.inner.kind, self.inner.outputs
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Source scheduling
    // ------------------------------------------------------------------

    /// Start playback now. See [`Node::start_at`].
    pub fn start(&self) -> Result<()> {
        self.start_at(0.0)
    }

    /// Schedule playback to start at `when` (seconds on the render clock).
    ///
    /// A buffer-source start registers its buffer with the engine exactly
    /// once per buffer id (a snapshot of the interleaved data; later planar
    /// mutation is not re-sent) and binds it to this node.
    pub fn start_at(&self, when: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_scheduled_source("start")?;
        self.check_when(when)?;

        {
            let mut playback = self.inner.playback.lock();
            match *playback {
                PlaybackState::Idle => *playback = PlaybackState::Started,
                PlaybackState::Started => {
                    return Err(Error::state(format!(
                        "{} node already started",
                        self.inner.kind
                    )))
                }
                PlaybackState::Stopped => {
                    return Err(Error::state(format!(
                        "{} node cannot be restarted after stop",
                        self.inner.kind
                    )))
                }
            }
        }

        if self.inner.kind == NodeKind::BufferSource {
            if let Some(buffer) = self.inner.state.lock().buffer.clone() {
                self.inner.shared.register_buffer_once(&buffer);
                self.inner
                    .shared
                    .engine()
                    .bind_buffer_to_node(self.inner.id, buffer.id());
            }
        }

        self.inner.shared.engine().start_node(self.inner.id, when);
        Ok(())
    }

    /// Stop playback now. See [`Node::stop_at`].
    pub fn stop(&self) -> Result<()> {
        self.stop_at(0.0)
    }

    /// Schedule a deterministic cutoff at `when`, independent of when the
    /// call returns. Restating the cutoff of an already-stopped source is
    /// allowed; stopping a source that never started is a state error.
    pub fn stop_at(&self, when: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_scheduled_source("stop")?;
        self.check_when(when)?;

        {
            let mut playback = self.inner.playback.lock();
            match *playback {
                PlaybackState::Idle => {
                    return Err(Error::state(format!(
                        "{} node stopped before start",
                        self.inner.kind
                    )))
                }
                PlaybackState::Started | PlaybackState::Stopped => {
                    *playback = PlaybackState::Stopped
                }
            }
        }

        self.inner.shared.engine().stop_node(self.inner.id, when);
        Ok(())
    }

    fn check_scheduled_source(&self, what: &str) -> Result<()> {
        if !self.inner.kind.is_scheduled_source() {
            return Err(Error::validation(format!(
                "{} node does not support {what}()",
                self.inner.kind
            )));
        }
        Ok(())
    }

    fn check_when(&self, when: f64) -> Result<()> {
        if !when.is_finite() || when < 0.0 {
            return Err(Error::validation(format!(
                "schedule time {when} must be finite and non-negative"
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Kind-specific properties
    // ------------------------------------------------------------------

    fn check_kind(&self, expected: NodeKind, what: &str) -> Result<()> {
        if self.inner.kind != expected {
            return Err(Error::validation(format!(
                "{what} applies to {expected} nodes, not {}",
                self.inner.kind
            )));
        }
        Ok(())
    }

    pub(crate) fn forward_property(&self, property: &str, value: PropertyValue) {
        self.inner
            .shared
            .engine()
            .set_node_property(self.inner.id, property, value);
    }

    pub fn waveform(&self) -> Result<OscillatorWaveform> {
        self.check_kind(NodeKind::Oscillator, "waveform")?;
        Ok(self.inner.state.lock().waveform)
    }

    /// Select a built-in waveform. `Custom` is reached through
    /// [`Node::set_periodic_wave`] instead.
    pub fn set_waveform(&self, waveform: OscillatorWaveform) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Oscillator, "waveform")?;
        if waveform == OscillatorWaveform::Custom {
            return Err(Error::validation(
                "select a custom waveform by setting a periodic wave",
            ));
        }
        let mut state = self.inner.state.lock();
        state.waveform = waveform;
        state.periodic_wave = None;
        drop(state);
        self.forward_property("waveform", PropertyValue::Str(format!("{waveform:?}").to_lowercase()));
        Ok(())
    }

    /// Use a wavetable; switches the waveform to `Custom`.
    pub fn set_periodic_wave(&self, wave: PeriodicWave) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Oscillator, "periodic wave")?;
        let table = wave.wavetable().to_vec();
        let mut state = self.inner.state.lock();
        state.waveform = OscillatorWaveform::Custom;
        state.periodic_wave = Some(wave);
        drop(state);
        self.forward_property("wavetable", PropertyValue::FloatList(table));
        Ok(())
    }

    pub fn periodic_wave(&self) -> Result<Option<PeriodicWave>> {
        self.check_kind(NodeKind::Oscillator, "periodic wave")?;
        Ok(self.inner.state.lock().periodic_wave.clone())
    }

    pub fn filter_type(&self) -> Result<BiquadKind> {
        self.check_kind(NodeKind::BiquadFilter, "filter type")?;
        Ok(self.inner.state.lock().filter_type)
    }

    pub fn set_filter_type(&self, filter_type: BiquadKind) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::BiquadFilter, "filter type")?;
        self.inner.state.lock().filter_type = filter_type;
        self.forward_property(
            "filter_type",
            PropertyValue::Str(format!("{filter_type:?}").to_lowercase()),
        );
        Ok(())
    }

    /// Upper bound of this delay node's `delay_time` param, seconds.
    pub fn max_delay(&self) -> Result<f64> {
        self.check_kind(NodeKind::Delay, "max delay")?;
        Ok(self.inner.state.lock().max_delay)
    }

    pub fn buffer(&self) -> Result<Option<SampleBuffer>> {
        self.check_buffer_kind()?;
        Ok(self.inner.state.lock().buffer.clone())
    }

    /// Attach a sample buffer.
    ///
    /// On a buffer-source this must happen before `start()`; registration
    /// with the engine is deferred to the first start. On a convolver the
    /// impulse is validated (1/2/4 channels) and registered immediately.
    pub fn set_buffer(&self, buffer: SampleBuffer) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_buffer_kind()?;

        match self.inner.kind {
            NodeKind::BufferSource => {
                if *self.inner.playback.lock() != PlaybackState::Idle {
                    return Err(Error::state(
                        "cannot replace the buffer of a started source",
                    ));
                }
                self.inner.state.lock().buffer = Some(buffer);
            }
            NodeKind::Convolver => {
                catalog::validate_impulse_channels(buffer.channel_count())?;
                self.inner.shared.register_buffer_once(&buffer);
                self.inner
                    .shared
                    .engine()
                    .bind_buffer_to_node(self.inner.id, buffer.id());
                self.inner.state.lock().buffer = Some(buffer);
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    fn check_buffer_kind(&self) -> Result<()> {
        match self.inner.kind {
            NodeKind::BufferSource | NodeKind::Convolver => Ok(()),
            kind => Err(Error::validation(format!(
                "{kind} node does not hold a sample buffer"
            ))),
        }
    }

    pub fn is_looping(&self) -> Result<bool> {
        self.check_kind(NodeKind::BufferSource, "loop")?;
        Ok(self.inner.state.lock().looping)
    }

    pub fn set_looping(&self, looping: bool) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::BufferSource, "loop")?;
        self.inner.state.lock().looping = looping;
        self.forward_property("loop", PropertyValue::Bool(looping));
        Ok(())
    }

    pub fn loop_range(&self) -> Result<(f64, f64)> {
        self.check_kind(NodeKind::BufferSource, "loop range")?;
        let state = self.inner.state.lock();
        Ok((state.loop_start, state.loop_end))
    }

    pub fn set_loop_range(&self, start: f64, end: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::BufferSource, "loop range")?;
        if !start.is_finite() || start < 0.0 || !end.is_finite() || end < 0.0 {
            return Err(Error::validation(format!(
                "loop range [{start}, {end}] must be finite and non-negative"
            )));
        }
        let mut state = self.inner.state.lock();
        state.loop_start = start;
        state.loop_end = end;
        drop(state);
        self.forward_property("loop_start", PropertyValue::Float(start));
        self.forward_property("loop_end", PropertyValue::Float(end));
        Ok(())
    }

    pub fn normalize(&self) -> Result<bool> {
        self.check_kind(NodeKind::Convolver, "normalize")?;
        Ok(self.inner.state.lock().normalize)
    }

    pub fn set_normalize(&self, normalize: bool) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Convolver, "normalize")?;
        self.inner.state.lock().normalize = normalize;
        self.forward_property("normalize", PropertyValue::Bool(normalize));
        Ok(())
    }

    pub fn curve(&self) -> Result<Option<Vec<f32>>> {
        self.check_kind(NodeKind::WaveShaper, "curve")?;
        Ok(self.inner.state.lock().curve.clone())
    }

    /// Set or clear the shaping curve (at least 2 points when present).
    pub fn set_curve(&self, curve: Option<Vec<f32>>) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::WaveShaper, "curve")?;
        if let Some(curve) = &curve {
            catalog::validate_shaper_curve(curve)?;
            self.forward_property("curve", PropertyValue::FloatList(curve.clone()));
        } else {
            self.forward_property("curve", PropertyValue::FloatList(Vec::new()));
        }
        self.inner.state.lock().curve = curve;
        Ok(())
    }

    pub fn oversample(&self) -> Result<Oversample> {
        self.check_kind(NodeKind::WaveShaper, "oversample")?;
        Ok(self.inner.state.lock().oversample)
    }

    pub fn set_oversample(&self, oversample: Oversample) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::WaveShaper, "oversample")?;
        self.inner.state.lock().oversample = oversample;
        let label = match oversample {
            Oversample::None => "none",
            Oversample::X2 => "2x",
            Oversample::X4 => "4x",
        };
        self.forward_property("oversample", PropertyValue::Str(label.into()));
        Ok(())
    }

    pub fn feedforward(&self) -> Result<Vec<f64>> {
        self.check_kind(NodeKind::IirFilter, "feedforward")?;
        Ok(self.inner.state.lock().feedforward.clone())
    }

    pub fn feedback(&self) -> Result<Vec<f64>> {
        self.check_kind(NodeKind::IirFilter, "feedback")?;
        Ok(self.inner.state.lock().feedback.clone())
    }

    pub fn distance_model(&self) -> Result<DistanceModel> {
        self.check_kind(NodeKind::Panner, "distance model")?;
        Ok(self.inner.state.lock().distance_model)
    }

    pub fn set_distance_model(&self, model: DistanceModel) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Panner, "distance model")?;
        self.inner.state.lock().distance_model = model;
        self.forward_property(
            "distance_model",
            PropertyValue::Str(format!("{model:?}").to_lowercase()),
        );
        Ok(())
    }

    pub fn panning_model(&self) -> Result<PanningModel> {
        self.check_kind(NodeKind::Panner, "panning model")?;
        Ok(self.inner.state.lock().panning_model)
    }

    pub fn set_panning_model(&self, model: PanningModel) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Panner, "panning model")?;
        self.inner.state.lock().panning_model = model;
        let label = match model {
            PanningModel::EqualPower => "equalpower",
            PanningModel::Hrtf => "hrtf",
        };
        self.forward_property("panning_model", PropertyValue::Str(label.into()));
        Ok(())
    }

    pub fn ref_distance(&self) -> Result<f64> {
        self.check_kind(NodeKind::Panner, "ref distance")?;
        Ok(self.inner.state.lock().ref_distance)
    }

    pub fn set_ref_distance(&self, distance: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Panner, "ref distance")?;
        if !distance.is_finite() || distance < 0.0 {
            return Err(Error::validation(format!(
                "ref_distance {distance} must be non-negative"
            )));
        }
        self.inner.state.lock().ref_distance = distance;
        self.forward_property("ref_distance", PropertyValue::Float(distance));
        Ok(())
    }

    pub fn max_distance(&self) -> Result<f64> {
        self.check_kind(NodeKind::Panner, "max distance")?;
        Ok(self.inner.state.lock().max_distance)
    }

    pub fn set_max_distance(&self, distance: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Panner, "max distance")?;
        if !distance.is_finite() || distance <= 0.0 {
            return Err(Error::validation(format!(
                "max_distance {distance} must be positive"
            )));
        }
        self.inner.state.lock().max_distance = distance;
        self.forward_property("max_distance", PropertyValue::Float(distance));
        Ok(())
    }

    pub fn rolloff_factor(&self) -> Result<f64> {
        self.check_kind(NodeKind::Panner, "rolloff factor")?;
        Ok(self.inner.state.lock().rolloff_factor)
    }

    pub fn set_rolloff_factor(&self, factor: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Panner, "rolloff factor")?;
        if !factor.is_finite() || factor < 0.0 {
            return Err(Error::validation(format!(
                "rolloff_factor {factor} must be non-negative"
            )));
        }
        self.inner.state.lock().rolloff_factor = factor;
        self.forward_property("rolloff_factor", PropertyValue::Float(factor));
        Ok(())
    }

    /// `(inner_angle, outer_angle, outer_gain)`.
    pub fn cone(&self) -> Result<(f64, f64, f64)> {
        self.check_kind(NodeKind::Panner, "cone")?;
        let state = self.inner.state.lock();
        Ok((
            state.cone_inner_angle,
            state.cone_outer_angle,
            state.cone_outer_gain,
        ))
    }

    pub fn set_cone(&self, inner_angle: f64, outer_angle: f64, outer_gain: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Panner, "cone")?;
        if !(0.0..=1.0).contains(&outer_gain) {
            return Err(Error::validation(format!(
                "cone_outer_gain {outer_gain} out of range [0, 1]"
            )));
        }
        let mut state = self.inner.state.lock();
        state.cone_inner_angle = inner_angle;
        state.cone_outer_angle = outer_angle;
        state.cone_outer_gain = outer_gain;
        drop(state);
        self.forward_property("cone_inner_angle", PropertyValue::Float(inner_angle));
        self.forward_property("cone_outer_angle", PropertyValue::Float(outer_angle));
        self.forward_property("cone_outer_gain", PropertyValue::Float(outer_gain));
        Ok(())
    }

    pub fn fft_size(&self) -> Result<usize> {
        self.check_kind(NodeKind::Analyser, "fft size")?;
        Ok(self.inner.state.lock().fft_size)
    }

    /// Request an FFT size; the stored size rounds up to the next power of
    /// two in [32, 32768].
    pub fn set_fft_size(&self, requested: usize) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Analyser, "fft size")?;
        let rounded = catalog::round_fft_size(requested)?;
        self.inner.state.lock().fft_size = rounded;
        self.forward_property("fft_size", PropertyValue::Int(rounded as i64));
        Ok(())
    }

    pub fn decibel_range(&self) -> Result<(f64, f64)> {
        self.check_kind(NodeKind::Analyser, "decibel range")?;
        let state = self.inner.state.lock();
        Ok((state.min_decibels, state.max_decibels))
    }

    pub fn set_decibel_range(&self, min: f64, max: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Analyser, "decibel range")?;
        catalog::validate_decibel_range(min, max)?;
        let mut state = self.inner.state.lock();
        state.min_decibels = min;
        state.max_decibels = max;
        drop(state);
        self.forward_property("min_decibels", PropertyValue::Float(min));
        self.forward_property("max_decibels", PropertyValue::Float(max));
        Ok(())
    }

    pub fn smoothing(&self) -> Result<f64> {
        self.check_kind(NodeKind::Analyser, "smoothing")?;
        Ok(self.inner.state.lock().smoothing)
    }

    pub fn set_smoothing(&self, smoothing: f64) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        self.check_kind(NodeKind::Analyser, "smoothing")?;
        catalog::validate_smoothing(smoothing)?;
        self.inner.state.lock().smoothing = smoothing;
        self.forward_property("smoothing", PropertyValue::Float(smoothing));
        Ok(())
    }
}

impl core::fmt::Debug for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("inputs", &self.inner.inputs)
            .field("outputs", &self.inner.outputs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::engine::{EngineCall, RecordingEngine};
    use crate::prelude::*;

    fn recording_context() -> (Context, Arc<RecordingEngine>) {
        let engine = Arc::new(RecordingEngine::new());
        let ctx = Context::builder()
            .engine(engine.clone())
            .build()
            .unwrap();
        (ctx, engine)
    }

    #[test]
    fn test_connect_returns_destination_for_chaining() {
        let (ctx, engine) = recording_context();
        let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
        let gain = ctx.create_gain(GainOptions::default()).unwrap();

        osc.connect(&gain).unwrap().connect(ctx.destination()).unwrap();

        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::ConnectNodes { .. })),
            2
        );
    }

    #[test]
    fn test_duplicate_connect_is_single_edge() {
        let (ctx, engine) = recording_context();
        let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
        let gain = ctx.create_gain(GainOptions::default()).unwrap();

        osc.connect(&gain).unwrap();
        osc.connect(&gain).unwrap();

        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::ConnectNodes { .. })),
            1
        );
    }

    #[test]
    fn test_disconnect_all_is_idempotent() {
        let (ctx, engine) = recording_context();
        let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
        let gain = ctx.create_gain(GainOptions::default()).unwrap();

        osc.connect(&gain).unwrap();
        osc.connect(ctx.destination()).unwrap();

        osc.disconnect().unwrap();
        osc.disconnect().unwrap();

        // The engine hears one teardown; the repeat is a front-side no-op.
        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::DisconnectAll { .. })),
            1
        );
    }

    #[test]
    fn test_param_disconnect_is_idempotent() {
        let (ctx, engine) = recording_context();
        let lfo = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
        let gain = ctx.create_gain(GainOptions::default()).unwrap();
        let target = gain.param("gain").unwrap();

        lfo.connect_param(target).unwrap();
        lfo.disconnect_param(target).unwrap();
        lfo.disconnect_param(target).unwrap();

        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::ConnectToParam { .. })),
            1
        );
        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::DisconnectFromParam { .. })),
            1
        );
    }

    #[test]
    fn test_disconnect_specific_edge_only() {
        let (ctx, engine) = recording_context();
        let splitter = ctx
            .create_channel_splitter(ChannelSplitterOptions { outputs: 2 })
            .unwrap();
        let a = ctx.create_gain(GainOptions::default()).unwrap();
        let b = ctx.create_gain(GainOptions::default()).unwrap();

        splitter.connect_ports(&a, 0, 0).unwrap();
        splitter.connect_ports(&b, 1, 0).unwrap();

        splitter.disconnect_output(1).unwrap();
        splitter.disconnect_output(1).unwrap();

        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::DisconnectOutput { output: 1, .. })),
            1
        );

        // The edge to `a` survives; tearing it down still works.
        splitter.disconnect_node_ports(&a, 0, 0).unwrap();
        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::DisconnectNodesPort { .. })),
            1
        );
    }

    #[test]
    fn test_cross_context_connect_rejected() {
        let (ctx_a, _engine_a) = recording_context();
        let (ctx_b, _engine_b) = recording_context();
        let osc = ctx_a
            .create_oscillator(OscillatorOptions::default())
            .unwrap();
        let gain = ctx_b.create_gain(GainOptions::default()).unwrap();

        assert!(matches!(
            osc.connect(&gain),
            Err(Error::CrossContext { .. })
        ));
        assert!(matches!(
            osc.connect_param(gain.param("gain").unwrap()),
            Err(Error::CrossContext { .. })
        ));
    }

    #[test]
    fn test_port_bounds_checked() {
        let (ctx, _engine) = recording_context();
        let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
        let gain = ctx.create_gain(GainOptions::default()).unwrap();

        assert!(osc.connect_ports(&gain, 1, 0).is_err());
        assert!(osc.connect_ports(&gain, 0, 1).is_err());
        // An oscillator has no inputs to connect to.
        assert!(gain.connect(&osc).is_err());
    }

    #[test]
    fn test_source_scheduling_state_machine() {
        let (ctx, _engine) = recording_context();
        let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();

        assert!(matches!(osc.stop(), Err(Error::State(_))));
        osc.start().unwrap();
        assert!(matches!(osc.start(), Err(Error::State(_))));
        osc.stop_at(1.0).unwrap();
        // Restating the cutoff is allowed; restarting is not.
        osc.stop_at(2.0).unwrap();
        assert!(matches!(osc.start(), Err(Error::State(_))));
    }

    #[test]
    fn test_start_rejected_on_non_source() {
        let (ctx, _engine) = recording_context();
        let gain = ctx.create_gain(GainOptions::default()).unwrap();
        assert!(matches!(gain.start(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_splitter_channel_config_is_fixed() {
        let (ctx, _engine) = recording_context();
        let splitter = ctx
            .create_channel_splitter(ChannelSplitterOptions::default())
            .unwrap();
        assert!(splitter.set_channel_count(2).is_err());
        assert!(splitter
            .set_channel_interpretation(crate::ChannelInterpretation::Discrete)
            .is_err());

        let gain = ctx.create_gain(GainOptions::default()).unwrap();
        gain.set_channel_count(4).unwrap();
        assert_eq!(gain.channel_count(), 4);
    }

    #[test]
    fn test_kind_property_guards() {
        let (ctx, _engine) = recording_context();
        let gain = ctx.create_gain(GainOptions::default()).unwrap();

        assert!(gain.set_filter_type(BiquadKind::Highpass).is_err());
        assert!(gain.set_fft_size(1024).is_err());
        assert!(gain.buffer().is_err());
    }

    #[test]
    fn test_analyser_fft_rounds_up() {
        let (ctx, _engine) = recording_context();
        let analyser = ctx.create_analyser(AnalyserOptions::default()).unwrap();

        analyser.set_fft_size(1000).unwrap();
        assert_eq!(analyser.fft_size().unwrap(), 1024);
        assert!(analyser.set_fft_size(65_536).is_err());
        assert!(analyser.set_decibel_range(-30.0, -100.0).is_err());
    }

    #[test]
    fn test_wave_shaper_curve_validation() {
        let (ctx, _engine) = recording_context();
        let shaper = ctx.create_wave_shaper(WaveShaperOptions::default()).unwrap();

        assert!(shaper.set_curve(Some(vec![0.0])).is_err());
        shaper.set_curve(Some(vec![-1.0, 0.0, 1.0])).unwrap();
        assert_eq!(shaper.curve().unwrap().unwrap().len(), 3);
        shaper.set_curve(None).unwrap();
        assert!(shaper.curve().unwrap().is_none());
    }

    #[test]
    fn test_buffer_source_rejects_buffer_swap_after_start() {
        let (ctx, _engine) = recording_context();
        let buffer = ctx.create_buffer(1, 8, 44100.0).unwrap();
        let other = ctx.create_buffer(1, 8, 44100.0).unwrap();
        let source = ctx
            .create_buffer_source(BufferSourceOptions {
                buffer: Some(buffer),
                ..Default::default()
            })
            .unwrap();

        source.start().unwrap();
        assert!(matches!(source.set_buffer(other), Err(Error::State(_))));
    }
}
