//! CPAL device provider.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use parking_lot::Mutex;

use tacet_core::{CaptureSink, DeviceInfo, DeviceKind, DeviceProvider};

use crate::error::{Error, Result};

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals. This is safe because
/// streams are only created, stored and dropped behind the provider's mutex.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

unsafe impl Send for StreamHandle {}

/// Device provider over the default cpal host.
///
/// Device ids are stable within one enumeration pass: `in-<index>` /
/// `out-<index>` in cpal's device order.
#[derive(Default)]
pub struct CpalDeviceProvider {
    opened: Mutex<HashSet<String>>,
    captures: Mutex<HashMap<String, StreamHandle>>,
    dropped_deliveries: std::sync::Arc<AtomicU64>,
}

impl CpalDeviceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries discarded because the capture sink was full.
    pub fn dropped_deliveries(&self) -> u64 {
        self.dropped_deliveries.load(Ordering::Relaxed)
    }

    fn enumerate_impl(&self) -> Result<Vec<DeviceInfo>> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        for (i, device) in host.output_devices()?.enumerate() {
            devices.push(DeviceInfo {
                id: format!("out-{i}"),
                kind: DeviceKind::Output,
                label: device.name().unwrap_or_else(|_| "Unknown".to_string()),
            });
        }
        for (i, device) in host.input_devices()?.enumerate() {
            devices.push(DeviceInfo {
                id: format!("in-{i}"),
                kind: DeviceKind::Input,
                label: device.name().unwrap_or_else(|_| "Unknown".to_string()),
            });
        }

        Ok(devices)
    }

    fn find_device(&self, id: &str) -> Result<(cpal::Device, DeviceKind)> {
        let host = cpal::default_host();

        let (kind, index) = if let Some(index) = id.strip_prefix("out-") {
            (DeviceKind::Output, index)
        } else if let Some(index) = id.strip_prefix("in-") {
            (DeviceKind::Input, index)
        } else {
            return Err(Error::InvalidDevice(
                id.to_string(),
                "expected 'in-<n>' or 'out-<n>'".to_string(),
            ));
        };

        let index: usize = index
            .parse()
            .map_err(|_| Error::InvalidDevice(id.to_string(), "index is not a number".to_string()))?;

        let device = match kind {
            DeviceKind::Output => host.output_devices()?.nth(index),
            DeviceKind::Input => host.input_devices()?.nth(index),
        };

        device
            .map(|d| (d, kind))
            .ok_or_else(|| Error::DeviceNotFound(id.to_string()))
    }

    fn start_capture_impl(&self, id: &str, sink: CaptureSink) -> Result<()> {
        let (device, kind) = self.find_device(id)?;
        if kind != DeviceKind::Input {
            return Err(Error::InvalidDevice(
                id.to_string(),
                "capture requires an input device".to_string(),
            ));
        }

        let config = device.default_input_config()?;
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => self.build_capture_stream::<f32>(&device, &config.into(), sink)?,
            cpal::SampleFormat::I16 => self.build_capture_stream::<i16>(&device, &config.into(), sink)?,
            cpal::SampleFormat::U16 => self.build_capture_stream::<u16>(&device, &config.into(), sink)?,
            format => return Err(Error::UnsupportedFormat(format!("{format:?}"))),
        };

        stream.play()?;
        self.captures
            .lock()
            .insert(id.to_string(), StreamHandle(stream));
        tracing::debug!(device = id, "capture started");

        Ok(())
    }

    fn build_capture_stream<T>(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        sink: CaptureSink,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let dropped_in_callback = std::sync::Arc::clone(&self.dropped_deliveries);

        let stream = device.build_input_stream(
            config,
            move |data: &[T], _info: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> = data.iter().map(|&s| f32::from_sample(s)).collect();
                if sink.try_send(samples).is_err() {
                    dropped_in_callback.fetch_add(1, Ordering::Relaxed);
                }
            },
            |err| tracing::warn!(%err, "capture stream error"),
            None,
        )?;

        Ok(stream)
    }
}

impl DeviceProvider for CpalDeviceProvider {
    fn enumerate(&self) -> tacet_core::Result<Vec<DeviceInfo>> {
        self.enumerate_impl().map_err(Into::into)
    }

    fn open(&self, device: &str) -> tacet_core::Result<()> {
        self.find_device(device)?;
        self.opened.lock().insert(device.to_string());
        tracing::debug!(device, "device opened");
        Ok(())
    }

    fn close(&self, device: &str) -> tacet_core::Result<()> {
        self.opened.lock().remove(device);
        // An active capture on the device ends with it.
        self.captures.lock().remove(device);
        tracing::debug!(device, "device closed");
        Ok(())
    }

    fn start_capture(&self, device: &str, sink: CaptureSink) -> tacet_core::Result<()> {
        self.start_capture_impl(device, sink).map_err(Into::into)
    }

    fn stop_capture(&self, device: &str) -> tacet_core::Result<()> {
        if self.captures.lock().remove(device).is_some() {
            tracing::debug!(device, "capture stopped");
        }
        Ok(())
    }
}
