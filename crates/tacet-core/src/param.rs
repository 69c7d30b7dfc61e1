//! Automatable node parameters.
//!
//! A [`Param`] is a bounded scalar owned by a node. Direct assignment clamps
//! silently to the bound it exceeds and applies immediately; the scheduling
//! methods record an ordered automation timeline that is forwarded, in issue
//! order, across the engine boundary. The front end never evaluates the
//! timeline.
//!
//! # Example
//!
//! ```ignore
//! let osc = ctx.create_oscillator(Default::default())?;
//! osc.param("frequency")?
//!     .set_value_at_time(440.0, 0.0)?
//!     .linear_ramp_to_value_at_time(880.0, 2.0)?;
//! ```

use std::sync::Arc;

use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

use crate::context::ContextShared;
use crate::engine::{AutomationEvent, EngineNodeId};
use crate::{Error, Result};

struct ParamInner {
    shared: Arc<ContextShared>,
    owner: EngineNodeId,
    name: String,
    default: f32,
    min: f32,
    max: f32,
    value: AtomicF32,
}

/// A named automatable scalar attached to a node.
#[derive(Clone)]
pub struct Param {
    inner: Arc<ParamInner>,
}

impl Param {
    /// Create the param and push its initial value across the boundary.
    /// `initial` is clamped the same way direct assignment is.
    pub(crate) fn create(
        shared: Arc<ContextShared>,
        owner: EngineNodeId,
        name: impl Into<String>,
        default: f32,
        min: f32,
        max: f32,
        initial: Option<f32>,
    ) -> Self {
        let name = name.into();
        let value = initial.unwrap_or(default).clamp(min, max);
        shared.engine().set_param_value(owner, &name, value);

        Self {
            inner: Arc::new(ParamInner {
                shared,
                owner,
                name,
                default,
                min,
                max,
                value: AtomicF32::new(value),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn value(&self) -> f32 {
        self.inner.value.load(Ordering::Relaxed)
    }

    pub fn default_value(&self) -> f32 {
        self.inner.default
    }

    pub fn min_value(&self) -> f32 {
        self.inner.min
    }

    pub fn max_value(&self) -> f32 {
        self.inner.max
    }

    pub(crate) fn owner(&self) -> EngineNodeId {
        self.inner.owner
    }

    pub(crate) fn context(&self) -> &Arc<ContextShared> {
        &self.inner.shared
    }

    /// Assign immediately. Out-of-range values clamp silently to the nearest
    /// bound; an instantaneous set event at the current time is recorded on
    /// the timeline alongside the immediate write.
    pub fn set_value(&self, value: f32) -> Result<()> {
        self.inner.shared.ensure_not_closed()?;
        if !value.is_finite() {
            return Err(Error::validation(format!(
                "param '{}' value must be finite, got {value}",
                self.inner.name
            )));
        }

        let clamped = value.clamp(self.inner.min, self.inner.max);
        self.inner.value.store(clamped, Ordering::Relaxed);

        let engine = self.inner.shared.engine();
        engine.set_param_value(self.inner.owner, &self.inner.name, clamped);
        engine.schedule_param_event(
            self.inner.owner,
            &self.inner.name,
            AutomationEvent::SetValue {
                value: clamped,
                time: self.inner.shared.current_time(),
            },
        );
        Ok(())
    }

    /// Schedule an instantaneous set.
    pub fn set_value_at_time(&self, value: f32, time: f64) -> Result<&Self> {
        self.check_value(value)?;
        let time = self.check_time(time, "time")?;
        self.submit(AutomationEvent::SetValue { value, time })
    }

    /// Schedule a linear ramp from the previous event to `(value, end_time)`.
    pub fn linear_ramp_to_value_at_time(&self, value: f32, end_time: f64) -> Result<&Self> {
        self.check_value(value)?;
        let end_time = self.check_time(end_time, "end_time")?;
        self.submit(AutomationEvent::LinearRamp { value, end_time })
    }

    /// Schedule an exponential ramp from the previous event to
    /// `(value, end_time)`. The target must be non-zero; whether it shares
    /// sign with the previous event's value is resolved at render time.
    pub fn exponential_ramp_to_value_at_time(&self, value: f32, end_time: f64) -> Result<&Self> {
        self.check_value(value)?;
        if value == 0.0 {
            return Err(Error::validation(format!(
                "param '{}' exponential ramp target must be non-zero",
                self.inner.name
            )));
        }
        let end_time = self.check_time(end_time, "end_time")?;
        self.submit(AutomationEvent::ExponentialRamp { value, end_time })
    }

    /// Schedule an exponential approach toward `target` starting at
    /// `start_time` with the given time constant.
    pub fn set_target_at_time(
        &self,
        target: f32,
        start_time: f64,
        time_constant: f64,
    ) -> Result<&Self> {
        self.check_value(target)?;
        let start_time = self.check_time(start_time, "start_time")?;
        if !time_constant.is_finite() || time_constant < 0.0 {
            return Err(Error::validation(format!(
                "param '{}' time constant {time_constant} must be non-negative",
                self.inner.name
            )));
        }
        self.submit(AutomationEvent::SetTarget {
            target,
            start_time,
            time_constant,
        })
    }

    /// Schedule a curve resampled across `duration` starting at `start_time`.
    pub fn set_value_curve_at_time(
        &self,
        values: &[f32],
        start_time: f64,
        duration: f64,
    ) -> Result<&Self> {
        if values.is_empty() {
            return Err(Error::validation(format!(
                "param '{}' value curve must not be empty",
                self.inner.name
            )));
        }
        for &v in values {
            self.check_value(v)?;
        }
        let start_time = self.check_time(start_time, "start_time")?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::validation(format!(
                "param '{}' curve duration {duration} must be positive",
                self.inner.name
            )));
        }
        self.submit(AutomationEvent::SetCurve {
            values: values.to_vec(),
            start_time,
            duration,
        })
    }

    /// Discard all scheduled events at or after `time`.
    pub fn cancel_scheduled_values(&self, time: f64) -> Result<&Self> {
        let time = self.check_time(time, "time")?;
        self.submit(AutomationEvent::CancelValues { time })
    }

    /// Discard events at or after `time`, holding the value the timeline has
    /// at `time`.
    pub fn cancel_and_hold_at_time(&self, time: f64) -> Result<&Self> {
        let time = self.check_time(time, "time")?;
        self.submit(AutomationEvent::CancelAndHold { time })
    }

    fn submit(&self, event: AutomationEvent) -> Result<&Self> {
        self.inner.shared.ensure_not_closed()?;
        self.inner
            .shared
            .engine()
            .schedule_param_event(self.inner.owner, &self.inner.name, event);
        Ok(self)
    }

    fn check_value(&self, value: f32) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::validation(format!(
                "param '{}' value must be finite, got {value}",
                self.inner.name
            )));
        }
        Ok(())
    }

    fn check_time(&self, time: f64, what: &str) -> Result<f64> {
        if !time.is_finite() || time < 0.0 {
            return Err(Error::validation(format!(
                "param '{}' {what} {time} must be finite and non-negative",
                self.inner.name
            )));
        }
        Ok(time)
    }
}

impl core::fmt::Debug for Param {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Param")
            .field("owner", &self.inner.owner)
            .field("name", &self.inner.name)
            .field("value", &self.value())
            .field("range", &(self.inner.min, self.inner.max))
            .finish()
    }
}
