//! CPAL-backed implementation of tacet's device boundary.
//!
//! Provides [`CpalDeviceProvider`], a [`DeviceProvider`] that enumerates
//! hardware through the default cpal host, tracks opened devices, and feeds
//! captured input samples into a caller-supplied channel.
//!
//! [`DeviceProvider`]: tacet_core::DeviceProvider

mod error;
pub use error::{Error, Result};

mod provider;
pub use provider::CpalDeviceProvider;
