//! Input backend seam
//!
//! The poller never talks to a device API directly. It consumes a
//! [`InputBackend`], which enumerates devices, yields hotplug and button
//! events, reads snapshots and plays rumble pulses. The production
//! implementation lives in [`super::gilrs_backend`].

use super::device_table::{Device, DeviceId};
use super::snapshot::Snapshot;

/// Device events the poller understands
///
/// Anything else the backend sees (axis motion, repeats, ...) is read through
/// snapshots instead and never surfaces here.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Added(Device),
    Removed(DeviceId),
    ButtonDown { id: DeviceId, button: usize },
    ButtonUp { id: DeviceId, button: usize },
}

impl DeviceEvent {
    pub fn device_id(&self) -> DeviceId {
        match self {
            DeviceEvent::Added(device) => device.id,
            DeviceEvent::Removed(id)
            | DeviceEvent::ButtonDown { id, .. }
            | DeviceEvent::ButtonUp { id, .. } => *id,
        }
    }
}

/// A timed two-motor haptic pulse
///
/// Magnitudes are fractions in [0, 1]. The driver owns the timing; nobody
/// tracks the pulse once it has been handed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumblePulse {
    pub low_frequency: f32,
    pub high_frequency: f32,
    pub duration_ms: u32,
}

impl Default for RumblePulse {
    fn default() -> Self {
        Self {
            low_frequency: 0.0,
            high_frequency: 0.7,
            duration_ms: 500,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Failed to initialize input backend: {0}")]
    InitializationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RumbleError {
    #[error("Device {0} does not support force feedback")]
    Unsupported(DeviceId),

    #[error("Device {0} is not connected")]
    UnknownDevice(DeviceId),

    #[error("Force feedback failed: {0}")]
    Driver(String),
}

/// Device-input service consumed by the poller
pub trait InputBackend {
    /// Devices that are connected right now
    fn connected_devices(&self) -> Vec<Device>;

    /// Next pending event, or `None` once the queue is drained
    fn next_event(&mut self) -> Option<DeviceEvent>;

    /// Current input state of `id`, `None` if the device is gone
    fn snapshot(&self, id: DeviceId) -> Option<Snapshot>;

    /// Starts a rumble pulse on `id`
    fn rumble(&mut self, id: DeviceId, pulse: RumblePulse) -> Result<(), RumbleError>;
}
