//! Device boundary tests against a stub provider.

use std::sync::Arc;
use std::sync::Mutex;

use crossbeam_channel::bounded;
use tacet::{CaptureSink, Context, DeviceInfo, DeviceKind, DeviceProvider, Error, Result};

struct StubDevices {
    fail_enumerate: bool,
    capturing: Mutex<Vec<String>>,
}

impl StubDevices {
    fn new(fail_enumerate: bool) -> Self {
        Self {
            fail_enumerate,
            capturing: Mutex::new(Vec::new()),
        }
    }
}

impl DeviceProvider for StubDevices {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        if self.fail_enumerate {
            return Err(Error::Device("backend unavailable".into()));
        }
        Ok(vec![
            DeviceInfo {
                id: "out-0".into(),
                kind: DeviceKind::Output,
                label: "Main Out".into(),
            },
            DeviceInfo {
                id: "in-0".into(),
                kind: DeviceKind::Input,
                label: "Mic".into(),
            },
        ])
    }

    fn open(&self, device: &str) -> Result<()> {
        match device {
            "out-0" | "in-0" => Ok(()),
            other => Err(Error::Device(format!("no such device: {other}"))),
        }
    }

    fn close(&self, _device: &str) -> Result<()> {
        Ok(())
    }

    fn start_capture(&self, device: &str, sink: CaptureSink) -> Result<()> {
        if device != "in-0" {
            return Err(Error::Device(format!("not an input device: {device}")));
        }
        // Deliver one batch synchronously; a real provider streams from a
        // hardware callback.
        sink.try_send(vec![0.25, -0.25]).ok();
        self.capturing.lock().unwrap().push(device.to_string());
        Ok(())
    }

    fn stop_capture(&self, device: &str) -> Result<()> {
        self.capturing.lock().unwrap().retain(|d| d != device);
        Ok(())
    }
}

#[test]
fn test_enumeration_lists_provider_devices() {
    let ctx = Context::builder()
        .devices(Arc::new(StubDevices::new(false)))
        .build()
        .unwrap();

    let devices = ctx.available_devices();
    assert_eq!(devices.len(), 2);
    assert!(devices
        .iter()
        .any(|d| d.kind == DeviceKind::Input && d.label == "Mic"));
}

#[test]
fn test_enumeration_failure_degrades_to_empty_list() {
    let ctx = Context::builder()
        .devices(Arc::new(StubDevices::new(true)))
        .build()
        .unwrap();

    // Non-fatal: the failure becomes an empty list, not an error.
    assert!(ctx.available_devices().is_empty());
}

#[test]
fn test_open_of_unknown_device_is_an_error() {
    let ctx = Context::builder()
        .devices(Arc::new(StubDevices::new(false)))
        .build()
        .unwrap();

    ctx.open_device("out-0").unwrap();
    assert!(matches!(ctx.open_device("out-9"), Err(Error::Device(_))));
}

#[test]
fn test_capture_delivers_raw_samples_into_sink() {
    let ctx = Context::builder()
        .devices(Arc::new(StubDevices::new(false)))
        .build()
        .unwrap();

    let (tx, rx) = bounded(8);
    ctx.start_capture("in-0", tx).unwrap();

    let delivery = rx.try_recv().unwrap();
    assert_eq!(delivery, vec![0.25, -0.25]);

    ctx.stop_capture("in-0").unwrap();
    assert!(matches!(
        ctx.start_capture("out-0", bounded(1).0),
        Err(Error::Device(_))
    ));
}
