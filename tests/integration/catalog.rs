//! Per-kind validation rules.

use approx::assert_abs_diff_eq;

use crate::helpers::recording_context;
use tacet::{
    AnalyserOptions, BiquadKind, BiquadOptions, ChannelMergerOptions, ChannelSplitterOptions,
    DelayOptions, Error, IirOptions, OscillatorOptions, WaveShaperOptions, WorkletOptions,
    WAVETABLE_SIZE,
};

#[test]
fn test_iir_rejects_invalid_coefficients() {
    let (ctx, _) = recording_context();

    // Leading zero feedback coefficient.
    assert!(matches!(
        ctx.create_iir_filter(IirOptions {
            feedforward: vec![1.0],
            feedback: vec![0.0, 0.3],
        }),
        Err(Error::Validation(_))
    ));

    // 21 feedforward coefficients.
    assert!(matches!(
        ctx.create_iir_filter(IirOptions {
            feedforward: vec![1.0; 21],
            feedback: vec![1.0],
        }),
        Err(Error::Validation(_))
    ));

    assert!(ctx
        .create_iir_filter(IirOptions {
            feedforward: vec![0.2, 0.2],
            feedback: vec![1.0, -0.5],
        })
        .is_ok());
}

#[test]
fn test_periodic_wave_normalized_fundamental() {
    let (ctx, _) = recording_context();
    let wave = ctx
        .create_periodic_wave(&[0.0, 0.0], &[0.0, 1.0], false)
        .unwrap();
    let table = wave.wavetable();

    assert_eq!(table.len(), WAVETABLE_SIZE);
    assert_eq!(table[0], 0.0);
    let max = table.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    assert_abs_diff_eq!(max, 1.0, epsilon = 1e-6);
}

#[test]
fn test_periodic_wave_rejects_mismatched_arrays() {
    let (ctx, _) = recording_context();
    assert!(matches!(
        ctx.create_periodic_wave(&[0.0, 1.0, 0.0], &[0.0, 1.0], false),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ctx.create_periodic_wave(&[0.0], &[0.0], false),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_analyser_constraints() {
    let (ctx, _) = recording_context();

    let analyser = ctx
        .create_analyser(AnalyserOptions {
            fft_size: 100,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(analyser.fft_size().unwrap(), 128);

    assert!(matches!(
        ctx.create_analyser(AnalyserOptions {
            min_decibels: -10.0,
            max_decibels: -90.0,
            ..Default::default()
        }),
        Err(Error::Validation(_))
    ));

    assert!(matches!(
        ctx.create_analyser(AnalyserOptions {
            smoothing: 1.5,
            ..Default::default()
        }),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_filter_type_enumeration() {
    let (ctx, _) = recording_context();
    let filter = ctx
        .create_biquad_filter(BiquadOptions {
            kind: BiquadKind::Notch,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(filter.filter_type().unwrap(), BiquadKind::Notch);

    filter.set_filter_type(BiquadKind::Allpass).unwrap();
    assert_eq!(filter.filter_type().unwrap(), BiquadKind::Allpass);
}

#[test]
fn test_shaper_curve_length_rule() {
    let (ctx, _) = recording_context();
    assert!(matches!(
        ctx.create_wave_shaper(WaveShaperOptions {
            curve: Some(vec![1.0]),
            ..Default::default()
        }),
        Err(Error::Validation(_))
    ));
    assert!(ctx
        .create_wave_shaper(WaveShaperOptions {
            curve: Some(vec![-1.0, 1.0]),
            ..Default::default()
        })
        .is_ok());
}

#[test]
fn test_splitter_merger_port_counts() {
    let (ctx, _) = recording_context();

    let splitter = ctx
        .create_channel_splitter(ChannelSplitterOptions { outputs: 4 })
        .unwrap();
    assert_eq!(splitter.number_of_outputs(), 4);
    assert_eq!(splitter.number_of_inputs(), 1);

    let merger = ctx
        .create_channel_merger(ChannelMergerOptions { inputs: 8 })
        .unwrap();
    assert_eq!(merger.number_of_inputs(), 8);
    assert_eq!(merger.number_of_outputs(), 1);

    assert!(matches!(
        ctx.create_channel_splitter(ChannelSplitterOptions { outputs: 0 }),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ctx.create_channel_merger(ChannelMergerOptions { inputs: 33 }),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_delay_time_is_bounded_by_node_max() {
    let (ctx, _) = recording_context();
    let delay = ctx
        .create_delay(DelayOptions {
            max_delay: 2.0,
            delay_time: Some(5.0),
        })
        .unwrap();

    // The configured ceiling, not the catalog ceiling, is the live bound.
    assert_eq!(delay.max_delay().unwrap(), 2.0);
    let param = delay.param("delay_time").unwrap();
    assert_eq!(param.value(), 2.0);

    param.set_value(1.5).unwrap();
    assert_eq!(param.value(), 1.5);
    param.set_value(10.0).unwrap();
    assert_eq!(param.value(), 2.0);
}

#[test]
fn test_oscillator_custom_waveform_rules() {
    let (ctx, _) = recording_context();

    // Custom without a wavetable is rejected.
    assert!(matches!(
        ctx.create_oscillator(OscillatorOptions {
            waveform: tacet::OscillatorWaveform::Custom,
            ..Default::default()
        }),
        Err(Error::Validation(_))
    ));

    let wave = ctx
        .create_periodic_wave(&[0.0, 1.0], &[0.0, 0.0], false)
        .unwrap();
    let osc = ctx
        .create_oscillator(OscillatorOptions {
            periodic_wave: Some(wave),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        osc.waveform().unwrap(),
        tacet::OscillatorWaveform::Custom
    );
}

#[test]
fn test_worklet_port_and_param_rules() {
    let (ctx, _) = recording_context();

    assert!(matches!(
        ctx.create_worklet_node(WorkletOptions {
            inputs: 0,
            outputs: 0,
            params: vec![],
        }),
        Err(Error::Validation(_))
    ));

    let node = ctx
        .create_worklet_node(WorkletOptions {
            inputs: 2,
            outputs: 1,
            params: vec![tacet::WorkletParamSpec {
                name: "mix".into(),
                default: 0.5,
                min: 0.0,
                max: 1.0,
            }],
        })
        .unwrap();
    assert_eq!(node.number_of_inputs(), 2);
    assert_eq!(node.param("mix").unwrap().value(), 0.5);
}
