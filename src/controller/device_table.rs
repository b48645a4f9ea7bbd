//! Device table - bookkeeping for hotplugged gamepads
//!
//! Holds one [`Device`] record per connected instance id, in the order the
//! devices were added. The first entry is the *primary* device, which is the
//! only one the overlay visualizes.

use std::fmt;

/// Instance identifier assigned by the input backend
///
/// Stable for as long as the device stays connected. Backends may reuse the
/// same id when a device reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A connected input device and its capabilities
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub axis_count: usize,
    pub button_count: usize,
    pub hat_count: usize,
    pub connected: bool,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} ({} axes, {} buttons, {} hats)",
            self.id, self.name, self.axis_count, self.button_count, self.hat_count
        )
    }
}

/// Result of inserting a device into the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The id was not present and got appended
    Inserted,
    /// The id was already present; its record was refreshed in place
    Refreshed,
}

/// Insertion-ordered table of connected devices keyed by [`DeviceId`]
///
/// Only the poller mutates the table. Everyone else gets a shared reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceTable {
    devices: Vec<Device>,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device, never creating a second entry for the same id
    pub fn insert(&mut self, device: Device) -> Insertion {
        match self.devices.iter_mut().find(|d| d.id == device.id) {
            Some(existing) => {
                *existing = device;
                Insertion::Refreshed
            }
            None => {
                self.devices.push(device);
                Insertion::Inserted
            }
        }
    }

    /// Removes the device with `id`, returning it if it was present
    ///
    /// Removing an unknown id leaves the table untouched.
    pub fn remove(&mut self, id: DeviceId) -> Option<Device> {
        let index = self.devices.iter().position(|d| d.id == id)?;
        Some(self.devices.remove(index))
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.get(id).is_some()
    }

    /// The device the overlay visualizes: first live one in insertion order
    pub fn primary(&self) -> Option<&Device> {
        self.devices.iter().find(|d| d.connected)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(id: usize, name: &str) -> Device {
        Device {
            id: DeviceId(id),
            name: name.to_string(),
            axis_count: 6,
            button_count: 11,
            hat_count: 1,
            connected: true,
        }
    }

    #[test]
    fn add_then_remove_yields_empty_table() {
        let mut table = DeviceTable::new();
        table.insert(pad(3, "Xbox Controller"));
        let removed = table.remove(DeviceId(3));

        assert_eq!(removed.map(|d| d.name), Some("Xbox Controller".to_string()));
        assert!(table.is_empty());
        assert_eq!(table, DeviceTable::new());
    }

    #[test]
    fn removing_unknown_id_is_noop() {
        let mut table = DeviceTable::new();
        table.insert(pad(1, "first"));
        table.insert(pad(2, "second"));
        let before = table.clone();

        assert!(table.remove(DeviceId(42)).is_none());
        assert_eq!(table, before);
    }

    #[test]
    fn repeated_insert_refreshes_without_duplicating() {
        let mut table = DeviceTable::new();
        assert_eq!(table.insert(pad(1, "first")), Insertion::Inserted);
        assert_eq!(table.insert(pad(2, "second")), Insertion::Inserted);
        assert_eq!(table.insert(pad(1, "renamed")), Insertion::Refreshed);

        assert_eq!(table.len(), 2);
        assert_eq!(table.primary().map(|d| d.name.as_str()), Some("renamed"));
    }

    #[test]
    fn primary_follows_insertion_order() {
        let mut table = DeviceTable::new();
        assert!(table.primary().is_none());

        table.insert(pad(7, "late id, first added"));
        table.insert(pad(2, "second"));
        assert_eq!(table.primary().map(|d| d.id), Some(DeviceId(7)));

        table.remove(DeviceId(7));
        assert_eq!(table.primary().map(|d| d.id), Some(DeviceId(2)));
    }

    #[test]
    fn primary_skips_devices_that_are_not_live() {
        let mut table = DeviceTable::new();
        table.insert(Device {
            connected: false,
            ..pad(1, "asleep")
        });
        assert!(table.primary().is_none());

        table.insert(pad(2, "awake"));
        assert_eq!(table.primary().map(|d| d.id), Some(DeviceId(2)));
    }
}
