//! Param automation timeline tests.

use crate::helpers::recording_context;
use tacet::{AutomationEvent, EngineCall, Error, GainOptions, OscillatorOptions};

#[test]
fn test_out_of_range_assignment_clamps_to_nearest_bound() {
    let (ctx, _) = recording_context();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();
    let param = gain.param("gain").unwrap();

    param.set_value(2000.0).unwrap();
    assert_eq!(param.value(), 1000.0);

    param.set_value(-1.0).unwrap();
    assert_eq!(param.value(), 0.0);
}

#[test]
fn test_clamped_value_is_what_crosses_the_boundary() {
    let (ctx, engine) = recording_context();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();
    gain.param("gain").unwrap().set_value(2000.0).unwrap();

    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            EngineCall::SetParamValue { param, value, .. }
                if param == "gain" && *value == 1000.0
        )),
        1
    );
}

#[test]
fn test_full_timeline_arrives_in_issue_order() {
    let (ctx, engine) = recording_context();
    let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
    let freq = osc.param("frequency").unwrap();

    freq.set_value_at_time(440.0, 0.0)
        .unwrap()
        .exponential_ramp_to_value_at_time(880.0, 1.0)
        .unwrap()
        .set_value_curve_at_time(&[880.0, 660.0, 440.0], 1.0, 0.5)
        .unwrap()
        .set_target_at_time(110.0, 2.0, 0.3)
        .unwrap()
        .cancel_and_hold_at_time(3.0)
        .unwrap();

    let events: Vec<AutomationEvent> = engine
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            EngineCall::ScheduleParamEvent { param, event, .. } if param == "frequency" => {
                Some(event)
            }
            _ => None,
        })
        .collect();

    assert_eq!(events.len(), 5);
    assert_eq!(
        events[0],
        AutomationEvent::SetValue {
            value: 440.0,
            time: 0.0
        }
    );
    assert!(matches!(events[1], AutomationEvent::ExponentialRamp { value, end_time }
        if value == 880.0 && end_time == 1.0));
    assert!(matches!(&events[2], AutomationEvent::SetCurve { values, start_time, duration }
        if values.len() == 3 && *start_time == 1.0 && *duration == 0.5));
    assert!(matches!(events[3], AutomationEvent::SetTarget { .. }));
    assert_eq!(events[4], AutomationEvent::CancelAndHold { time: 3.0 });
}

#[test]
fn test_cancellation_is_always_schedulable() {
    let (ctx, engine) = recording_context();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();
    let param = gain.param("gain").unwrap();

    // Cancelling an empty timeline is still forwarded; truncation is
    // deterministic regardless of render timing.
    param.cancel_scheduled_values(0.0).unwrap();
    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            EngineCall::ScheduleParamEvent { event, .. }
                if matches!(event, AutomationEvent::CancelValues { .. })
        )),
        1
    );
}

#[test]
fn test_invalid_automation_arguments() {
    let (ctx, _) = recording_context();
    let osc = ctx.create_oscillator(OscillatorOptions::default()).unwrap();
    let freq = osc.param("frequency").unwrap();

    assert!(matches!(
        freq.exponential_ramp_to_value_at_time(0.0, 1.0),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        freq.set_value_curve_at_time(&[], 0.0, 1.0),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        freq.set_value_curve_at_time(&[1.0, 2.0], 0.0, -1.0),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        freq.set_value_at_time(440.0, f64::INFINITY),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_chaining_returns_the_same_param() {
    let (ctx, _) = recording_context();
    let gain = ctx.create_gain(GainOptions::default()).unwrap();
    let param = gain.param("gain").unwrap();

    let chained = param
        .set_value_at_time(0.0, 0.0)
        .unwrap()
        .linear_ramp_to_value_at_time(1.0, 4.0)
        .unwrap();
    assert_eq!(chained.name(), "gain");
}
