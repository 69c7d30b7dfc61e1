//! Render engine boundary.
//!
//! The front end never computes a sample. Every graph edit, automation event
//! and buffer transfer is mirrored across [`RenderEngine`] in the exact order
//! the caller issued it; the engine applies them relative to its render-time
//! cursor. Ids crossing the boundary are opaque.
//!
//! Two implementations ship with the crate: [`NullEngine`] (issues ids,
//! advances the cursor, renders silence) for contexts that only build graphs,
//! and [`RecordingEngine`] (ordered call log) for tests that assert on what
//! reached the boundary.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::catalog::NodeKind;
use crate::ids::BufferId;

/// Opaque engine-side node identity. Unique within the owning graph,
/// assigned at creation and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineNodeId(u64);

impl EngineNodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for EngineNodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// One entry of a param's automation timeline, in the order issued.
///
/// The front end is the producer of these events; interpolation and
/// evaluation happen behind the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AutomationEvent {
    /// Instantaneous set.
    SetValue { value: f32, time: f64 },
    /// Linear ramp from the previous event to `(value, end_time)`.
    LinearRamp { value: f32, end_time: f64 },
    /// Exponential ramp from the previous event to `(value, end_time)`.
    ExponentialRamp { value: f32, end_time: f64 },
    /// Exponential approach toward `target` starting at `start_time`.
    SetTarget {
        target: f32,
        start_time: f64,
        time_constant: f64,
    },
    /// Resample `values` across `duration` starting at `start_time`.
    SetCurve {
        values: Vec<f32>,
        start_time: f64,
        duration: f64,
    },
    /// Discard all events at or after `time`.
    CancelValues { time: f64 },
    /// Discard events at or after `time`, holding the value at `time`.
    CancelAndHold { time: f64 },
}

/// A non-param node property crossing the boundary (filter type, wavetable,
/// shaper curve, IIR coefficients, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
    FloatList(Vec<f32>),
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<f32>> for PropertyValue {
    fn from(v: Vec<f32>) -> Self {
        Self::FloatList(v)
    }
}

/// The render engine collaborator.
///
/// Implementations must apply calls in the order received relative to their
/// render cursor; the front end guarantees it forwards them in issue order.
pub trait RenderEngine: Send + Sync {
    /// Allocate an engine-side node of the given kind.
    fn create_node(&self, kind: NodeKind) -> EngineNodeId;

    fn connect_nodes(&self, src: EngineNodeId, dst: EngineNodeId, output: usize, input: usize);

    fn connect_to_param(&self, src: EngineNodeId, dst: EngineNodeId, param: &str, output: usize);

    /// Remove every outgoing edge of `src`.
    fn disconnect_all(&self, src: EngineNodeId);

    /// Remove outgoing edges from one output index of `src`.
    fn disconnect_output(&self, src: EngineNodeId, output: usize);

    /// Remove all edges from `src` to `dst`.
    fn disconnect_nodes(&self, src: EngineNodeId, dst: EngineNodeId);

    /// Remove the single edge `src[output] -> dst[input]`.
    fn disconnect_nodes_port(
        &self,
        src: EngineNodeId,
        dst: EngineNodeId,
        output: usize,
        input: usize,
    );

    /// Remove modulation edges from `src` to `dst`'s param.
    fn disconnect_from_param(&self, src: EngineNodeId, dst: EngineNodeId, param: &str);

    /// Remove the modulation edge from one output of `src` to `dst`'s param.
    fn disconnect_param_output(
        &self,
        src: EngineNodeId,
        dst: EngineNodeId,
        param: &str,
        output: usize,
    );

    fn set_param_value(&self, node: EngineNodeId, param: &str, value: f32);

    fn schedule_param_event(&self, node: EngineNodeId, param: &str, event: AutomationEvent);

    fn set_node_property(&self, node: EngineNodeId, property: &str, value: PropertyValue);

    /// Transfer raw samples for a buffer id. Idempotent per id; the front end
    /// additionally guarantees at most one call per id.
    fn register_buffer(&self, buffer: BufferId, interleaved: &[f32], frames: usize, channels: usize);

    fn bind_buffer_to_node(&self, node: EngineNodeId, buffer: BufferId);

    fn start_node(&self, node: EngineNodeId, when: f64);

    fn stop_node(&self, node: EngineNodeId, when: f64);

    /// Real-time path: fill `output` (interleaved) with `frames` frames.
    fn render_block(&self, output: &mut [f32], frames: usize);

    /// Offline path: single-shot render of `total_frames` frames into
    /// `output` (interleaved).
    fn process_graph_once(&self, output: &mut [f32], total_frames: usize);

    /// Render-time cursor: frames consumed since the graph was created.
    fn frames_processed(&self) -> u64;
}

/// Engine that renders silence. Issues ids and advances the cursor so the
/// front-end state machine behaves normally without a real renderer.
#[derive(Debug, Default)]
pub struct NullEngine {
    next_node: AtomicU64,
    cursor: AtomicU64,
}

impl NullEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderEngine for NullEngine {
    fn create_node(&self, _kind: NodeKind) -> EngineNodeId {
        EngineNodeId::new(self.next_node.fetch_add(1, Ordering::Relaxed))
    }

    fn connect_nodes(&self, _src: EngineNodeId, _dst: EngineNodeId, _output: usize, _input: usize) {
    }

    fn connect_to_param(
        &self,
        _src: EngineNodeId,
        _dst: EngineNodeId,
        _param: &str,
        _output: usize,
    ) {
    }

    fn disconnect_all(&self, _src: EngineNodeId) {}

    fn disconnect_output(&self, _src: EngineNodeId, _output: usize) {}

    fn disconnect_nodes(&self, _src: EngineNodeId, _dst: EngineNodeId) {}

    fn disconnect_nodes_port(
        &self,
        _src: EngineNodeId,
        _dst: EngineNodeId,
        _output: usize,
        _input: usize,
    ) {
    }

    fn disconnect_from_param(&self, _src: EngineNodeId, _dst: EngineNodeId, _param: &str) {}

    fn disconnect_param_output(
        &self,
        _src: EngineNodeId,
        _dst: EngineNodeId,
        _param: &str,
        _output: usize,
    ) {
    }

    fn set_param_value(&self, _node: EngineNodeId, _param: &str, _value: f32) {}

    fn schedule_param_event(&self, _node: EngineNodeId, _param: &str, _event: AutomationEvent) {}

    fn set_node_property(&self, _node: EngineNodeId, _property: &str, _value: PropertyValue) {}

    fn register_buffer(
        &self,
        _buffer: BufferId,
        _interleaved: &[f32],
        _frames: usize,
        _channels: usize,
    ) {
    }

    fn bind_buffer_to_node(&self, _node: EngineNodeId, _buffer: BufferId) {}

    fn start_node(&self, _node: EngineNodeId, _when: f64) {}

    fn stop_node(&self, _node: EngineNodeId, _when: f64) {}

    fn render_block(&self, output: &mut [f32], frames: usize) {
        output.fill(0.0);
        self.cursor.fetch_add(frames as u64, Ordering::Relaxed);
    }

    fn process_graph_once(&self, output: &mut [f32], total_frames: usize) {
        output.fill(0.0);
        self.cursor.fetch_add(total_frames as u64, Ordering::Relaxed);
    }

    fn frames_processed(&self) -> u64 {
        self.cursor.load(Ordering::Relaxed)
    }
}

/// One call that reached the boundary, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    CreateNode {
        kind: NodeKind,
        id: EngineNodeId,
    },
    ConnectNodes {
        src: EngineNodeId,
        dst: EngineNodeId,
        output: usize,
        input: usize,
    },
    ConnectToParam {
        src: EngineNodeId,
        dst: EngineNodeId,
        param: String,
        output: usize,
    },
    DisconnectAll {
        src: EngineNodeId,
    },
    DisconnectOutput {
        src: EngineNodeId,
        output: usize,
    },
    DisconnectNodes {
        src: EngineNodeId,
        dst: EngineNodeId,
    },
    DisconnectNodesPort {
        src: EngineNodeId,
        dst: EngineNodeId,
        output: usize,
        input: usize,
    },
    DisconnectFromParam {
        src: EngineNodeId,
        dst: EngineNodeId,
        param: String,
    },
    DisconnectParamOutput {
        src: EngineNodeId,
        dst: EngineNodeId,
        param: String,
        output: usize,
    },
    SetParamValue {
        node: EngineNodeId,
        param: String,
        value: f32,
    },
    ScheduleParamEvent {
        node: EngineNodeId,
        param: String,
        event: AutomationEvent,
    },
    SetNodeProperty {
        node: EngineNodeId,
        property: String,
        value: PropertyValue,
    },
    RegisterBuffer {
        buffer: BufferId,
        frames: usize,
        channels: usize,
    },
    BindBufferToNode {
        node: EngineNodeId,
        buffer: BufferId,
    },
    StartNode {
        node: EngineNodeId,
        when: f64,
    },
    StopNode {
        node: EngineNodeId,
        when: f64,
    },
    ProcessGraphOnce {
        total_frames: usize,
    },
}

/// Engine that records every boundary call. Renders silence like
/// [`NullEngine`]; tests assert on [`RecordingEngine::calls`].
#[derive(Debug, Default)]
pub struct RecordingEngine {
    next_node: AtomicU64,
    cursor: AtomicU64,
    calls: Mutex<Vec<EngineCall>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls received so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    /// Number of calls matching a predicate.
    pub fn count_calls(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn push(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }
}

impl RenderEngine for RecordingEngine {
    fn create_node(&self, kind: NodeKind) -> EngineNodeId {
        let id = EngineNodeId::new(self.next_node.fetch_add(1, Ordering::Relaxed));
        self.push(EngineCall::CreateNode { kind, id });
        id
    }

    fn connect_nodes(&self, src: EngineNodeId, dst: EngineNodeId, output: usize, input: usize) {
        self.push(EngineCall::ConnectNodes {
            src,
            dst,
            output,
            input,
        });
    }

    fn connect_to_param(&self, src: EngineNodeId, dst: EngineNodeId, param: &str, output: usize) {
        self.push(EngineCall::ConnectToParam {
            src,
            dst,
            param: param.to_string(),
            output,
        });
    }

    fn disconnect_all(&self, src: EngineNodeId) {
        self.push(EngineCall::DisconnectAll { src });
    }

    fn disconnect_output(&self, src: EngineNodeId, output: usize) {
        self.push(EngineCall::DisconnectOutput { src, output });
    }

    fn disconnect_nodes(&self, src: EngineNodeId, dst: EngineNodeId) {
        self.push(EngineCall::DisconnectNodes { src, dst });
    }

    fn disconnect_nodes_port(
        &self,
        src: EngineNodeId,
        dst: EngineNodeId,
        output: usize,
        input: usize,
    ) {
        self.push(EngineCall::DisconnectNodesPort {
            src,
            dst,
            output,
            input,
        });
    }

    fn disconnect_from_param(&self, src: EngineNodeId, dst: EngineNodeId, param: &str) {
        self.push(EngineCall::DisconnectFromParam {
            src,
            dst,
            param: param.to_string(),
        });
    }

    fn disconnect_param_output(
        &self,
        src: EngineNodeId,
        dst: EngineNodeId,
        param: &str,
        output: usize,
    ) {
        self.push(EngineCall::DisconnectParamOutput {
            src,
            dst,
            param: param.to_string(),
            output,
        });
    }

    fn set_param_value(&self, node: EngineNodeId, param: &str, value: f32) {
        self.push(EngineCall::SetParamValue {
            node,
            param: param.to_string(),
            value,
        });
    }

    fn schedule_param_event(&self, node: EngineNodeId, param: &str, event: AutomationEvent) {
        self.push(EngineCall::ScheduleParamEvent {
            node,
            param: param.to_string(),
            event,
        });
    }

    fn set_node_property(&self, node: EngineNodeId, property: &str, value: PropertyValue) {
        self.push(EngineCall::SetNodeProperty {
            node,
            property: property.to_string(),
            value,
        });
    }

    fn register_buffer(
        &self,
        buffer: BufferId,
        _interleaved: &[f32],
        frames: usize,
        channels: usize,
    ) {
        self.push(EngineCall::RegisterBuffer {
            buffer,
            frames,
            channels,
        });
    }

    fn bind_buffer_to_node(&self, node: EngineNodeId, buffer: BufferId) {
        self.push(EngineCall::BindBufferToNode { node, buffer });
    }

    fn start_node(&self, node: EngineNodeId, when: f64) {
        self.push(EngineCall::StartNode { node, when });
    }

    fn stop_node(&self, node: EngineNodeId, when: f64) {
        self.push(EngineCall::StopNode { node, when });
    }

    fn render_block(&self, output: &mut [f32], frames: usize) {
        output.fill(0.0);
        self.cursor.fetch_add(frames as u64, Ordering::Relaxed);
    }

    fn process_graph_once(&self, output: &mut [f32], total_frames: usize) {
        output.fill(0.0);
        self.cursor.fetch_add(total_frames as u64, Ordering::Relaxed);
        self.push(EngineCall::ProcessGraphOnce { total_frames });
    }

    fn frames_processed(&self) -> u64 {
        self.cursor.load(Ordering::Relaxed)
    }
}
