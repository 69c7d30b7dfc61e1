//! Connection protocol tests.

use crate::helpers::recording_context;
use tacet::{EngineCall, Error, GainOptions, OscillatorOptions};

#[test]
fn test_disconnect_removes_all_outgoing_edges() {
    let (ctx, engine) = recording_context();
    let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();

    osc.connect(&gain).unwrap();
    osc.connect(ctx.destination()).unwrap();

    osc.disconnect().unwrap();
    // Repeating after the edges are gone is a silent no-op.
    osc.disconnect().unwrap();

    assert_eq!(
        engine.count_calls(|c| matches!(c, EngineCall::DisconnectAll { .. })),
        1
    );
}

#[test]
fn test_param_disconnect_twice_is_silent() {
    let (ctx, engine) = recording_context();
    let lfo = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();
    let target = gain.param("gain").unwrap();

    lfo.connect_param(target).unwrap();

    lfo.disconnect_param(target).unwrap();
    lfo.disconnect_param(target).unwrap();

    assert_eq!(
        engine.count_calls(|c| matches!(c, EngineCall::DisconnectFromParam { .. })),
        1
    );
}

#[test]
fn test_modulation_edge_reaches_boundary_with_param_name() {
    let (ctx, engine) = recording_context();
    let lfo = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
    let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();

    lfo.connect_param(osc.param("detune").unwrap()).unwrap();

    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            EngineCall::ConnectToParam { param, dst, .. }
                if param == "detune" && *dst == osc.engine_id()
        )),
        1
    );
}

#[test]
fn test_cross_context_connect_fails() {
    let (ctx_a, _) = recording_context();
    let (ctx_b, engine_b) = recording_context();

    let osc = ctx_a
        .create_oscillator(OscillatorOptions::default())
        .unwrap();
    let gain = ctx_b.create_gain(GainOptions::default()).unwrap();

    assert!(matches!(
        osc.connect(&gain),
        Err(Error::CrossContext { .. })
    ));
    // The failed connect never reached either boundary.
    assert_eq!(
        engine_b.count_calls(|c| matches!(c, EngineCall::ConnectNodes { .. })),
        0
    );
}

#[test]
fn test_graph_edits_arrive_in_issue_order() {
    let (ctx, engine) = recording_context();
    let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();

    osc.connect(&gain).unwrap();
    gain.connect(ctx.destination()).unwrap();
    osc.disconnect_node(&gain).unwrap();

    let edits: Vec<&'static str> = engine
        .calls()
        .iter()
        .filter_map(|c| match c {
            EngineCall::ConnectNodes { .. } => Some("connect"),
            EngineCall::DisconnectNodes { .. } => Some("disconnect"),
            _ => None,
        })
        .collect();
    assert_eq!(edits, ["connect", "connect", "disconnect"]);
}

#[test]
fn test_scheduled_source_start_stop_reaches_engine() {
    let (ctx, engine) = recording_context();
    let source = ctx
        .create_constant_source(Default::default())
        .unwrap();

    source.start_at(0.5).unwrap();
    source.stop_at(2.0).unwrap();

    assert_eq!(
        engine.count_calls(|c| matches!(c, EngineCall::StartNode { when, .. } if *when == 0.5)),
        1
    );
    assert_eq!(
        engine.count_calls(|c| matches!(c, EngineCall::StopNode { when, .. } if *when == 2.0)),
        1
    );

    // Double start is a state error and does not reach the boundary again.
    assert!(matches!(source.start(), Err(Error::State(_))));
    assert_eq!(
        engine.count_calls(|c| matches!(c, EngineCall::StartNode { .. })),
        1
    );
}

#[test]
fn test_mutation_after_close_fails() {
    let (ctx, _) = recording_context();
    let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();

    ctx.close().unwrap();

    assert!(matches!(osc.connect(&gain), Err(Error::State(_))));
    assert!(matches!(osc.disconnect(), Err(Error::State(_))));
    assert!(matches!(osc.start(), Err(Error::State(_))));
}
