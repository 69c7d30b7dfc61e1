//! Device/IO collaborator boundary.
//!
//! Hardware access is not implemented here; the `tacet-device` crate carries
//! the cpal-backed [`DeviceProvider`]. The context-level helper
//! [`Context::available_devices`] degrades enumeration failures to an empty
//! list with a warning, while open/capture failures stay hard errors.
//!
//! [`Context::available_devices`]: crate::Context::available_devices

use serde::{Deserialize, Serialize};

use crate::Result;

/// Direction of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Input,
    Output,
}

/// One enumerated device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Provider-scoped stable identifier.
    pub id: String,
    pub kind: DeviceKind,
    /// Human-readable name.
    pub label: String,
}

/// Destination for captured samples: one `Vec<f32>` of interleaved samples
/// per delivery, in capture order.
pub type CaptureSink = crossbeam_channel::Sender<Vec<f32>>;

/// Device collaborator.
pub trait DeviceProvider: Send + Sync {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>>;

    fn open(&self, device: &str) -> Result<()>;

    fn close(&self, device: &str) -> Result<()>;

    /// Begin delivering raw samples from an input device into `sink`.
    fn start_capture(&self, device: &str, sink: CaptureSink) -> Result<()>;

    fn stop_capture(&self, device: &str) -> Result<()>;
}
