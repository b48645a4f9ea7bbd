use chrono::{DateTime, Local};
use statum::{machine, state};
use std::fmt;
use tracing::{debug, info, warn};

use super::backend::{DeviceEvent, InputBackend, RumblePulse};
use super::device_table::{Device, DeviceTable, Insertion};
use super::snapshot::{button, Snapshot};

// Poller settings
#[derive(Clone, Debug, PartialEq)]
pub struct PollerSettings {
    /// Button index whose press triggers a rumble pulse
    pub rumble_button: usize,
    pub rumble: RumblePulse,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            rumble_button: button::A,
            rumble: RumblePulse::default(),
        }
    }
}

/// What applying one event did to the table
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Inserted,
    Refreshed,
    Removed,
    /// Removal or rumble for an id that is not in the table
    UnknownDevice,
    RumblePlayed,
    RumbleFailed(String),
    NoChange,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub event: DeviceEvent,
    pub outcome: Outcome,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let time = self.timestamp.format("%H:%M:%S.%3f");
        match (&self.event, &self.outcome) {
            (DeviceEvent::Added(device), Outcome::Refreshed) => {
                write!(f, "{} {} reconnected", time, device.name)
            }
            (DeviceEvent::Added(device), _) => write!(f, "{} {} connected", time, device.name),
            (DeviceEvent::Removed(id), Outcome::Removed) => {
                write!(f, "{} Gamepad {} disconnected", time, id)
            }
            (_, Outcome::RumblePlayed) => {
                write!(f, "{} Rumble played on {}", time, self.event.device_id())
            }
            (_, Outcome::RumbleFailed(reason)) => write!(f, "{} Rumble failed: {}", time, reason),
            (event, outcome) => write!(f, "{} {:?} -> {:?}", time, event, outcome),
        }
    }
}

/// Events applied during one poll, in emission order
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// Define poller states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum PollerState {
    Initializing,
    Polling,
}

/// Owns the device table and applies backend events to it once per tick
#[machine]
pub struct Poller<S: PollerState> {
    // Device-input service
    backend: Box<dyn InputBackend>,

    // Poller settings
    settings: PollerSettings,

    // Connected devices, only ever written here
    table: DeviceTable,
}

// Implementation of methods available in all states
impl<S: PollerState> Poller<S> {
    pub fn table(&self) -> &DeviceTable {
        &self.table
    }

    fn apply(&mut self, event: DeviceEvent) -> LogEntry {
        let outcome = match &event {
            DeviceEvent::Added(device) => self.apply_added(device.clone()),
            DeviceEvent::Removed(id) => match self.table.remove(*id) {
                Some(device) => {
                    info!("Joystick {} disconnected ({})", id, device.name);
                    Outcome::Removed
                }
                None => {
                    debug!("Ignoring removal of unknown device {}", id);
                    Outcome::UnknownDevice
                }
            },
            DeviceEvent::ButtonDown { id, button } if *button == self.settings.rumble_button => {
                if !self.table.contains(*id) {
                    warn!("Rumble requested for unknown device {}", id);
                    Outcome::UnknownDevice
                } else {
                    match self.backend.rumble(*id, self.settings.rumble) {
                        Ok(()) => {
                            info!("Rumble effect played on joystick {}", id);
                            Outcome::RumblePlayed
                        }
                        Err(e) => {
                            warn!("Rumble on joystick {} failed: {}", id, e);
                            Outcome::RumbleFailed(e.to_string())
                        }
                    }
                }
            }
            DeviceEvent::ButtonDown { .. } | DeviceEvent::ButtonUp { .. } => Outcome::NoChange,
        };

        LogEntry {
            timestamp: Local::now(),
            event,
            outcome,
        }
    }

    fn apply_added(&mut self, device: Device) -> Outcome {
        let id = device.id;
        match self.table.insert(device) {
            Insertion::Inserted => {
                info!("Joystick {} connected", id);
                Outcome::Inserted
            }
            Insertion::Refreshed => {
                debug!("Joystick {} already known, refreshed", id);
                Outcome::Refreshed
            }
        }
    }
}

// Implementation for Initializing state
impl Poller<Initializing> {
    pub fn create(backend: Box<dyn InputBackend>, settings: Option<PollerSettings>) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating Poller with settings: {:?}", settings);
        Self::new(backend, settings, DeviceTable::new())
    }

    /// Registers every device that is already connected, then starts polling
    pub fn initialize(mut self) -> Poller<Polling> {
        let devices = self.backend.connected_devices();

        if devices.is_empty() {
            warn!("No game controller detected, running in UI-only mode");
        } else {
            info!("Found {} gamepads:", devices.len());
            for (idx, device) in devices.into_iter().enumerate() {
                info!("  [{}] {}", idx, device);
                self.apply_added(device);
            }
        }

        self.transition()
    }
}

// Implementation for Poller in Polling state
impl Poller<Polling> {
    /// Drains every pending event exactly once and applies it in order
    pub fn poll(&mut self) -> (&DeviceTable, EventLog) {
        let mut log = EventLog::default();

        while let Some(event) = self.backend.next_event() {
            debug!("Applying device event: {:?}", event);
            let entry = self.apply(event);
            log.entries.push(entry);
        }

        if !log.is_empty() {
            debug!(
                "Poll applied {} events, {} devices connected",
                log.len(),
                self.table.len()
            );
        }

        (&self.table, log)
    }

    /// Current input state of the primary device
    pub fn primary_snapshot(&self) -> Option<(&Device, Snapshot)> {
        let device = self.table.primary()?;
        let snapshot = self.backend.snapshot(device.id).unwrap_or_else(|| {
            debug!("No live state for {}, rendering it at rest", device.id);
            Snapshot::neutral(device.axis_count, device.button_count, device.hat_count)
        });
        Some((device, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::backend::RumbleError;
    use crate::controller::device_table::DeviceId;
    use crate::controller::snapshot::{axis, HAT_COUNT};
    use std::cell::RefCell;
    use std::collections::{HashSet, VecDeque};
    use std::rc::Rc;

    #[derive(Default)]
    struct Script {
        connected: Vec<Device>,
        pending: VecDeque<DeviceEvent>,
        rumble_capable: HashSet<DeviceId>,
        rumbles: Vec<(DeviceId, RumblePulse)>,
        left_trigger: f32,
    }

    #[derive(Clone, Default)]
    struct ScriptedBackend(Rc<RefCell<Script>>);

    impl InputBackend for ScriptedBackend {
        fn connected_devices(&self) -> Vec<Device> {
            self.0.borrow().connected.clone()
        }

        fn next_event(&mut self) -> Option<DeviceEvent> {
            self.0.borrow_mut().pending.pop_front()
        }

        fn snapshot(&self, id: DeviceId) -> Option<Snapshot> {
            let script = self.0.borrow();
            if !script.connected.iter().any(|d| d.id == id) {
                return None;
            }
            let mut snapshot = Snapshot::neutral(axis::COUNT, button::COUNT, HAT_COUNT);
            snapshot.axes[axis::LEFT_TRIGGER] = script.left_trigger;
            Some(snapshot)
        }

        fn rumble(&mut self, id: DeviceId, pulse: RumblePulse) -> Result<(), RumbleError> {
            let mut script = self.0.borrow_mut();
            if !script.rumble_capable.contains(&id) {
                return Err(RumbleError::Unsupported(id));
            }
            script.rumbles.push((id, pulse));
            Ok(())
        }
    }

    fn pad(id: usize) -> Device {
        Device {
            id: DeviceId(id),
            name: format!("Pad {}", id),
            axis_count: axis::COUNT,
            button_count: button::COUNT,
            hat_count: HAT_COUNT,
            connected: true,
        }
    }

    fn polling(backend: &ScriptedBackend) -> Poller<Polling> {
        Poller::create(Box::new(backend.clone()), None).initialize()
    }

    fn push(backend: &ScriptedBackend, event: DeviceEvent) {
        backend.0.borrow_mut().pending.push_back(event);
    }

    #[test]
    fn initialize_registers_connected_devices() {
        let backend = ScriptedBackend::default();
        backend.0.borrow_mut().connected = vec![pad(4), pad(9)];

        let poller = polling(&backend);

        assert_eq!(poller.table().len(), 2);
        assert_eq!(poller.table().primary().map(|d| d.id), Some(DeviceId(4)));
    }

    #[test]
    fn poll_applies_events_in_order_and_drains_queue() {
        let backend = ScriptedBackend::default();
        let mut poller = polling(&backend);
        push(&backend, DeviceEvent::Added(pad(1)));
        push(&backend, DeviceEvent::Added(pad(2)));
        push(&backend, DeviceEvent::Removed(DeviceId(1)));

        let (table, log) = poller.poll();
        assert_eq!(table.len(), 1);
        assert_eq!(table.primary().map(|d| d.id), Some(DeviceId(2)));
        let outcomes: Vec<_> = log.entries.iter().map(|e| e.outcome.clone()).collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Inserted, Outcome::Inserted, Outcome::Removed]
        );

        let (_, second) = poller.poll();
        assert!(second.is_empty());
    }

    #[test]
    fn add_then_remove_in_one_tick_leaves_table_empty() {
        let backend = ScriptedBackend::default();
        let mut poller = polling(&backend);
        push(&backend, DeviceEvent::Added(pad(5)));
        push(&backend, DeviceEvent::Removed(DeviceId(5)));

        let (table, _) = poller.poll();
        assert!(table.is_empty());
    }

    #[test]
    fn removing_unknown_device_is_logged_not_fatal() {
        let backend = ScriptedBackend::default();
        backend.0.borrow_mut().connected = vec![pad(1)];
        let mut poller = polling(&backend);
        let before = poller.table().clone();
        push(&backend, DeviceEvent::Removed(DeviceId(77)));

        let (table, log) = poller.poll();
        assert_eq!(table, &before);
        assert_eq!(log.entries[0].outcome, Outcome::UnknownDevice);
    }

    #[test]
    fn duplicate_add_does_not_duplicate_device() {
        let backend = ScriptedBackend::default();
        backend.0.borrow_mut().connected = vec![pad(1)];
        let mut poller = polling(&backend);
        push(&backend, DeviceEvent::Added(pad(1)));

        let (table, log) = poller.poll();
        assert_eq!(table.len(), 1);
        assert_eq!(log.entries[0].outcome, Outcome::Refreshed);
    }

    #[test]
    fn rumble_button_requests_pulse_on_emitting_device() {
        let backend = ScriptedBackend::default();
        {
            let mut script = backend.0.borrow_mut();
            script.connected = vec![pad(1), pad(2)];
            script.rumble_capable.insert(DeviceId(2));
        }
        let mut poller = polling(&backend);
        push(
            &backend,
            DeviceEvent::ButtonDown {
                id: DeviceId(2),
                button: button::A,
            },
        );
        push(
            &backend,
            DeviceEvent::ButtonDown {
                id: DeviceId(2),
                button: button::B,
            },
        );

        let (_, log) = poller.poll();
        assert_eq!(log.entries[0].outcome, Outcome::RumblePlayed);
        assert_eq!(log.entries[1].outcome, Outcome::NoChange);
        assert_eq!(
            backend.0.borrow().rumbles,
            vec![(DeviceId(2), RumblePulse::default())]
        );
    }

    #[test]
    fn unsupported_rumble_is_non_fatal() {
        let backend = ScriptedBackend::default();
        backend.0.borrow_mut().connected = vec![pad(1)];
        let mut poller = polling(&backend);
        push(
            &backend,
            DeviceEvent::ButtonDown {
                id: DeviceId(1),
                button: button::A,
            },
        );
        push(&backend, DeviceEvent::Removed(DeviceId(1)));

        let (table, log) = poller.poll();
        assert!(matches!(log.entries[0].outcome, Outcome::RumbleFailed(_)));
        assert_eq!(log.entries[1].outcome, Outcome::Removed);
        assert!(table.is_empty());
    }

    #[test]
    fn rumble_for_device_not_in_table_is_skipped() {
        let backend = ScriptedBackend::default();
        backend.0.borrow_mut().rumble_capable.insert(DeviceId(3));
        let mut poller = polling(&backend);
        push(
            &backend,
            DeviceEvent::ButtonDown {
                id: DeviceId(3),
                button: button::A,
            },
        );

        let (_, log) = poller.poll();
        assert_eq!(log.entries[0].outcome, Outcome::UnknownDevice);
        assert!(backend.0.borrow().rumbles.is_empty());
    }

    #[test]
    fn custom_rumble_button_is_honored() {
        let backend = ScriptedBackend::default();
        {
            let mut script = backend.0.borrow_mut();
            script.connected = vec![pad(1)];
            script.rumble_capable.insert(DeviceId(1));
        }
        let settings = PollerSettings {
            rumble_button: button::Y,
            ..Default::default()
        };
        let mut poller = Poller::create(Box::new(backend.clone()), Some(settings)).initialize();
        push(
            &backend,
            DeviceEvent::ButtonDown {
                id: DeviceId(1),
                button: button::A,
            },
        );
        push(
            &backend,
            DeviceEvent::ButtonDown {
                id: DeviceId(1),
                button: button::Y,
            },
        );

        let (_, log) = poller.poll();
        assert_eq!(log.entries[0].outcome, Outcome::NoChange);
        assert_eq!(log.entries[1].outcome, Outcome::RumblePlayed);
    }

    #[test]
    fn primary_snapshot_reads_first_device() {
        let backend = ScriptedBackend::default();
        {
            let mut script = backend.0.borrow_mut();
            script.connected = vec![pad(8), pad(3)];
            script.left_trigger = 0.5;
        }
        let poller = polling(&backend);

        let (device, snapshot) = poller.primary_snapshot().expect("primary device");
        assert_eq!(device.id, DeviceId(8));
        assert_eq!(snapshot.axis(axis::LEFT_TRIGGER), 0.5);
    }

    #[test]
    fn primary_snapshot_falls_back_to_neutral_state() {
        let backend = ScriptedBackend::default();
        let mut poller = polling(&backend);
        // Known to the table but not to the backend's live state
        push(&backend, DeviceEvent::Added(pad(6)));
        poller.poll();

        let (_, snapshot) = poller.primary_snapshot().expect("primary device");
        assert_eq!(snapshot, Snapshot::neutral(axis::COUNT, button::COUNT, HAT_COUNT));
    }

    #[test]
    fn no_devices_means_no_primary() {
        let backend = ScriptedBackend::default();
        let poller = polling(&backend);
        assert!(poller.primary_snapshot().is_none());
    }
}
