//! Offline rendering tests.

use std::sync::Arc;

use tacet::{Context, ContextState, EngineCall, Error, RecordingEngine};

fn offline_setup(length: usize) -> (tacet::OfflineContext, Arc<RecordingEngine>) {
    let engine = Arc::new(RecordingEngine::new());
    let offline = Context::builder()
        .engine(engine.clone())
        .channels(2)
        .build_offline(length)
        .unwrap();
    (offline, engine)
}

#[test]
fn test_render_produces_buffer_of_declared_shape() {
    let (offline, engine) = offline_setup(512);
    assert_eq!(offline.length(), 512);
    assert_eq!(offline.state(), ContextState::Suspended);

    let rendered = offline.start_rendering().unwrap();
    assert_eq!(rendered.length(), 512);
    assert_eq!(rendered.channel_count(), 2);
    assert_eq!(rendered.sample_rate(), offline.sample_rate());
    assert_eq!(offline.state(), ContextState::Closed);

    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            EngineCall::ProcessGraphOnce { total_frames } if *total_frames == 512
        )),
        1
    );
}

#[test]
fn test_second_start_rendering_fails_before_any_work() {
    let (offline, engine) = offline_setup(128);

    offline.start_rendering().unwrap();
    assert!(matches!(offline.start_rendering(), Err(Error::State(_))));

    // The rejected call performed no work at the boundary.
    assert_eq!(
        engine.count_calls(|c| matches!(c, EngineCall::ProcessGraphOnce { .. })),
        1
    );
}

#[test]
fn test_offline_context_builds_graphs_like_any_other() {
    let (offline, engine) = offline_setup(64);
    let osc = offline
        .create_oscillator(Default::default())
        .unwrap();
    osc.connect(offline.destination()).unwrap();
    osc.start().unwrap();

    offline.start_rendering().unwrap();

    let starts_before_render = engine.calls().iter().position(|c| matches!(c, EngineCall::StartNode { .. }))
        < engine
            .calls()
            .iter()
            .position(|c| matches!(c, EngineCall::ProcessGraphOnce { .. }));
    assert!(starts_before_render);
}

#[test]
fn test_transport_transitions_rejected_offline() {
    let (offline, _) = offline_setup(64);
    assert!(matches!(offline.resume(), Err(Error::State(_))));
    assert!(matches!(offline.suspend(), Err(Error::State(_))));
}

#[test]
fn test_graph_edits_rejected_after_render_closes() {
    let (offline, _) = offline_setup(64);
    offline.start_rendering().unwrap();
    assert!(matches!(
        offline.create_gain(Default::default()),
        Err(Error::State(_))
    ));
}

#[test]
fn test_zero_length_render_rejected() {
    assert!(matches!(
        Context::builder().build_offline(0),
        Err(Error::Validation(_))
    ));
}
