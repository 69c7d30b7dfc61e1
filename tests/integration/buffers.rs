//! Sample buffer and registration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::helpers::{recording_context, StubDecoder};
use tacet::{BufferSourceOptions, Context, EngineCall, Error};

#[test]
fn test_copy_to_channel_readback_and_interleaving() {
    let (ctx, _) = recording_context();
    let buffer = ctx.create_buffer(2, 4, 44100.0).unwrap();
    let src = [0.1, 0.2, 0.3, 0.4];

    buffer.copy_to_channel(&src, 0, 0).unwrap();

    let channel = buffer.channel_data(0).unwrap();
    assert_eq!(&channel[..], &src[..]);
    drop(channel);

    let flat = buffer.interleaved();
    for frame in 0..4 {
        assert_eq!(flat[frame * 2], src[frame]);
        assert_eq!(flat[frame * 2 + 1], 0.0);
    }
}

#[test]
fn test_shared_buffer_registers_exactly_once() {
    let (ctx, engine) = recording_context();
    let buffer = ctx.create_buffer(1, 16, 44100.0).unwrap();

    let first = ctx
        .create_buffer_source(BufferSourceOptions {
            buffer: Some(buffer.clone()),
            ..Default::default()
        })
        .unwrap();
    let second = ctx
        .create_buffer_source(BufferSourceOptions {
            buffer: Some(buffer.clone()),
            ..Default::default()
        })
        .unwrap();

    first.start().unwrap();
    second.start().unwrap();

    // One transfer per buffer id; the second source only binds.
    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            EngineCall::RegisterBuffer { buffer: id, .. } if *id == buffer.id()
        )),
        1
    );
    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            EngineCall::BindBufferToNode { buffer: id, .. } if *id == buffer.id()
        )),
        2
    );
}

#[test]
fn test_distinct_buffers_register_separately() {
    let (ctx, engine) = recording_context();
    let a = ctx.create_buffer(1, 8, 44100.0).unwrap();
    let b = ctx.create_buffer(1, 8, 44100.0).unwrap();
    assert_ne!(a.id(), b.id());

    for buffer in [&a, &b] {
        let source = ctx
            .create_buffer_source(BufferSourceOptions {
                buffer: Some(buffer.clone()),
                ..Default::default()
            })
            .unwrap();
        source.start().unwrap();
    }

    assert_eq!(
        engine.count_calls(|c| matches!(c, EngineCall::RegisterBuffer { .. })),
        2
    );
}

#[test]
fn test_registration_happens_before_start() {
    let (ctx, engine) = recording_context();
    let buffer = ctx.create_buffer(1, 8, 44100.0).unwrap();
    let source = ctx
        .create_buffer_source(BufferSourceOptions {
            buffer: Some(buffer),
            ..Default::default()
        })
        .unwrap();
    source.start().unwrap();

    let relevant: Vec<&'static str> = engine
        .calls()
        .iter()
        .filter_map(|c| match c {
            EngineCall::RegisterBuffer { .. } => Some("register"),
            EngineCall::BindBufferToNode { .. } => Some("bind"),
            EngineCall::StartNode { .. } => Some("start"),
            _ => None,
        })
        .collect();
    assert_eq!(relevant, ["register", "bind", "start"]);
}

#[test]
fn test_channel_bounds_are_validated() {
    let (ctx, _) = recording_context();
    let buffer = ctx.create_buffer(2, 4, 44100.0).unwrap();

    assert!(matches!(buffer.channel_data(2), Err(Error::Validation(_))));
    assert!(matches!(
        buffer.copy_to_channel(&[0.0], 5, 0),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_decode_produces_planar_buffer_and_fires_callback() {
    let ctx = Context::builder()
        .decoder(Arc::new(StubDecoder { fail: false }))
        .build()
        .unwrap();

    let fired = Arc::new(AtomicBool::new(false));
    let fired_in_callback = Arc::clone(&fired);
    let buffer = ctx
        .decode_audio_data(
            &[0, 255, 128, 128],
            Some(Box::new(move |_| {
                fired_in_callback.store(true, Ordering::SeqCst)
            })),
            None,
        )
        .unwrap();

    assert!(fired.load(Ordering::SeqCst));
    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.length(), 2);
    // De-interleaved: channel 0 holds frames 0 and 1 of the left samples.
    assert_eq!(buffer.channel_data(0).unwrap()[0], 0.0);
    assert_eq!(buffer.channel_data(1).unwrap()[0], 1.0);
}

#[test]
fn test_decode_failure_rejects_and_fires_error_callback() {
    let ctx = Context::builder()
        .decoder(Arc::new(StubDecoder { fail: true }))
        .build()
        .unwrap();

    let fired = Arc::new(AtomicBool::new(false));
    let fired_in_callback = Arc::clone(&fired);
    let result = ctx.decode_audio_data(
        &[1, 2],
        None,
        Some(Box::new(move |_| {
            fired_in_callback.store(true, Ordering::SeqCst)
        })),
    );

    assert!(fired.load(Ordering::SeqCst));
    assert!(matches!(result, Err(Error::Decode(_))));
}
