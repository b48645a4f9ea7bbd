use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Repeat, Replay, Ticks};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use super::backend::{BackendError, DeviceEvent, InputBackend, RumbleError, RumblePulse};
use super::device_table::{Device, DeviceId};
use super::snapshot::{axis, button, Hat, Snapshot, HAT_COUNT};

/// [`InputBackend`] on top of gilrs
pub struct GilrsBackend {
    // Gilrs context
    gilrs: Gilrs,

    // Our ids back to gilrs ids
    gamepad_ids: HashMap<DeviceId, GamepadId>,

    // Effects stop when dropped, so the latest pulse per device is kept here
    effects: HashMap<DeviceId, Effect>,
}

impl GilrsBackend {
    pub fn new() -> Result<Self, BackendError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(gilrs::Error::NotImplemented(dummy)) => {
                warn!("gilrs has no backend for this platform, no gamepads will show up");
                dummy
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(BackendError::InitializationError(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            gamepad_ids: HashMap::new(),
            effects: HashMap::new(),
        })
    }

    fn register(&mut self, id: GamepadId) -> DeviceId {
        let device_id = DeviceId(usize::from(id));
        self.gamepad_ids.insert(device_id, id);
        device_id
    }

    // Convert gilrs event to internal event type
    fn convert_gilrs_event(&mut self, id: GamepadId, event: EventType) -> Option<DeviceEvent> {
        let device_id = self.register(id);

        match event {
            EventType::Connected => {
                let gamepad = self.gilrs.gamepad(id);
                let device = describe(device_id, &gamepad);
                info!("Controller connected: {}", device);
                Some(DeviceEvent::Added(device))
            }
            EventType::Disconnected => {
                warn!("Controller {} disconnected", device_id);
                self.effects.remove(&device_id);
                Some(DeviceEvent::Removed(device_id))
            }
            EventType::ButtonPressed(pressed, _) => {
                debug!("Button pressed: {:?} on {}", pressed, device_id);
                map_button(pressed).map(|index| DeviceEvent::ButtonDown {
                    id: device_id,
                    button: index,
                })
            }
            EventType::ButtonReleased(released, _) => {
                debug!("Button released: {:?} on {}", released, device_id);
                map_button(released).map(|index| DeviceEvent::ButtonUp {
                    id: device_id,
                    button: index,
                })
            }
            _ => None,
        }
    }
}

impl InputBackend for GilrsBackend {
    fn connected_devices(&self) -> Vec<Device> {
        self.gilrs
            .gamepads()
            .map(|(id, gamepad)| describe(DeviceId(usize::from(id)), &gamepad))
            .collect()
    }

    fn next_event(&mut self) -> Option<DeviceEvent> {
        // Every gilrs event has to be pulled for the cached state to advance,
        // including the ones we do not surface
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if let Some(converted) = self.convert_gilrs_event(id, event) {
                return Some(converted);
            }
        }
        None
    }

    fn snapshot(&self, id: DeviceId) -> Option<Snapshot> {
        let gamepad_id = self.resolve(id)?;
        let gamepad = self.gilrs.connected_gamepad(gamepad_id)?;
        Some(read_snapshot(&gamepad))
    }

    fn rumble(&mut self, id: DeviceId, pulse: RumblePulse) -> Result<(), RumbleError> {
        let gamepad_id = self.resolve(id).ok_or(RumbleError::UnknownDevice(id))?;
        let supported = self
            .gilrs
            .connected_gamepad(gamepad_id)
            .ok_or(RumbleError::UnknownDevice(id))?
            .is_ff_supported();
        if !supported {
            return Err(RumbleError::Unsupported(id));
        }

        let duration = Ticks::from_ms(pulse.duration_ms);
        let effect = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: to_magnitude(pulse.low_frequency),
                },
                scheduling: replay_for(duration),
                envelope: Default::default(),
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: to_magnitude(pulse.high_frequency),
                },
                scheduling: replay_for(duration),
                envelope: Default::default(),
            })
            .repeat(Repeat::For(duration))
            .gamepads(&[gamepad_id])
            .finish(&mut self.gilrs)
            .map_err(|e| RumbleError::Driver(e.to_string()))?;

        effect
            .play()
            .map_err(|e| RumbleError::Driver(e.to_string()))?;

        // Replacing drops (and stops) any pulse still running on this device
        self.effects.insert(id, effect);
        Ok(())
    }
}

impl GilrsBackend {
    fn resolve(&self, id: DeviceId) -> Option<GamepadId> {
        if let Some(gamepad_id) = self.gamepad_ids.get(&id) {
            return Some(*gamepad_id);
        }
        // Devices found by enumeration were never registered through an event
        self.gilrs
            .gamepads()
            .map(|(gamepad_id, _)| gamepad_id)
            .find(|gamepad_id| usize::from(*gamepad_id) == id.0)
    }
}

fn describe(id: DeviceId, gamepad: &Gamepad<'_>) -> Device {
    let capabilities = Capabilities::probe(
        |axis| gamepad.axis_code(axis).is_some(),
        |button| gamepad.button_code(button).is_some(),
    );

    Device {
        id,
        name: gamepad.name().to_string(),
        axis_count: capabilities.axes,
        button_count: capabilities.buttons,
        hat_count: capabilities.hats,
        connected: gamepad.is_connected(),
    }
}

/// How many of the normalized inputs a pad's mapping actually provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Capabilities {
    axes: usize,
    buttons: usize,
    hats: usize,
}

// Normalized axes with the gilrs sources that can feed them
const AXIS_SOURCES: [(Axis, Option<Button>); axis::COUNT] = [
    (Axis::LeftStickX, None),
    (Axis::LeftStickY, None),
    (Axis::LeftZ, Some(Button::LeftTrigger2)),
    (Axis::RightStickX, None),
    (Axis::RightStickY, None),
    (Axis::RightZ, Some(Button::RightTrigger2)),
];

const DPAD_BUTTONS: [Button; 4] = [
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

impl Capabilities {
    fn probe(has_axis: impl Fn(Axis) -> bool, has_button: impl Fn(Button) -> bool) -> Self {
        let axes = AXIS_SOURCES
            .iter()
            .filter(|(axis, trigger)| has_axis(*axis) || trigger.is_some_and(|b| has_button(b)))
            .count();
        let buttons = BUTTON_INDICES
            .iter()
            .filter(|(gilrs_button, _)| has_button(*gilrs_button))
            .count();
        let hats = if DPAD_BUTTONS.iter().any(|b| has_button(*b)) {
            HAT_COUNT
        } else {
            0
        };

        Self {
            axes,
            buttons,
            hats,
        }
    }
}

fn read_snapshot(gamepad: &Gamepad<'_>) -> Snapshot {
    let mut axes = vec![0.0; axis::COUNT];
    axes[axis::LEFT_STICK_X] = gamepad.value(Axis::LeftStickX);
    axes[axis::LEFT_STICK_Y] = -gamepad.value(Axis::LeftStickY);
    axes[axis::LEFT_TRIGGER] = trigger_value(gamepad, Button::LeftTrigger2, Axis::LeftZ);
    axes[axis::RIGHT_STICK_X] = gamepad.value(Axis::RightStickX);
    axes[axis::RIGHT_STICK_Y] = -gamepad.value(Axis::RightStickY);
    axes[axis::RIGHT_TRIGGER] = trigger_value(gamepad, Button::RightTrigger2, Axis::RightZ);

    let mut buttons = vec![false; button::COUNT];
    for (gilrs_button, index) in BUTTON_INDICES {
        buttons[index] = gamepad.is_pressed(gilrs_button);
    }

    let hat = Hat::from_switches(
        gamepad.is_pressed(Button::DPadUp),
        gamepad.is_pressed(Button::DPadDown),
        gamepad.is_pressed(Button::DPadLeft),
        gamepad.is_pressed(Button::DPadRight),
    );

    Snapshot {
        axes,
        buttons,
        hats: vec![hat; HAT_COUNT],
    }
}

// Analog triggers come through as button values on most mappings, as Z axes on the rest
fn trigger_value(gamepad: &Gamepad<'_>, trigger: Button, fallback: Axis) -> f32 {
    gamepad
        .button_data(trigger)
        .map(|data| data.value())
        .unwrap_or_else(|| gamepad.value(fallback))
}

const BUTTON_INDICES: [(Button, usize); button::COUNT] = [
    (Button::South, button::A),
    (Button::East, button::B),
    (Button::West, button::X),
    (Button::North, button::Y),
    (Button::LeftTrigger, button::LEFT_BUMPER),
    (Button::RightTrigger, button::RIGHT_BUMPER),
    (Button::LeftThumb, button::LEFT_STICK),
    (Button::RightThumb, button::RIGHT_STICK),
    (Button::Select, button::SELECT),
    (Button::Start, button::START),
    (Button::Mode, button::MODE),
];

// Helper function to map gilrs Button to our button index
fn map_button(pressed: Button) -> Option<usize> {
    BUTTON_INDICES
        .iter()
        .find(|(gilrs_button, _)| *gilrs_button == pressed)
        .map(|(_, index)| *index)
}

fn replay_for(duration: Ticks) -> Replay {
    Replay {
        play_for: duration,
        ..Default::default()
    }
}

fn to_magnitude(fraction: f32) -> u16 {
    (fraction.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_face_buttons_by_position() {
        assert_eq!(map_button(Button::South), Some(button::A));
        assert_eq!(map_button(Button::West), Some(button::X));
        assert_eq!(map_button(Button::North), Some(button::Y));
        assert_eq!(map_button(Button::LeftThumb), Some(button::LEFT_STICK));
        assert_eq!(map_button(Button::DPadUp), None);
    }

    #[test]
    fn full_mapping_reports_every_normalized_input() {
        let capabilities = Capabilities::probe(|_| true, |_| true);
        assert_eq!(
            capabilities,
            Capabilities {
                axes: axis::COUNT,
                buttons: button::COUNT,
                hats: HAT_COUNT,
            }
        );
    }

    #[test]
    fn counts_only_what_the_pad_maps() {
        // Digital triggers, no stick clicks, no d-pad
        let capabilities = Capabilities::probe(
            |axis| matches!(axis, Axis::LeftStickX | Axis::LeftStickY | Axis::RightStickX | Axis::RightStickY),
            |button| {
                !matches!(
                    button,
                    Button::LeftThumb
                        | Button::RightThumb
                        | Button::LeftTrigger2
                        | Button::RightTrigger2
                        | Button::DPadUp
                        | Button::DPadDown
                        | Button::DPadLeft
                        | Button::DPadRight
                )
            },
        );

        assert_eq!(capabilities.axes, 4);
        assert_eq!(capabilities.buttons, button::COUNT - 2);
        assert_eq!(capabilities.hats, 0);
    }

    #[test]
    fn trigger_mapped_as_button_counts_as_axis() {
        let capabilities = Capabilities::probe(
            |_| false,
            |button| matches!(button, Button::LeftTrigger2 | Button::DPadLeft),
        );

        assert_eq!(capabilities.axes, 1);
        assert_eq!(capabilities.buttons, 0);
        assert_eq!(capabilities.hats, HAT_COUNT);
    }

    #[test]
    fn magnitude_scales_and_clamps() {
        assert_eq!(to_magnitude(0.0), 0);
        assert_eq!(to_magnitude(1.0), u16::MAX);
        assert_eq!(to_magnitude(2.5), u16::MAX);
        assert_eq!(to_magnitude(-1.0), 0);
        assert!((45_870..=45_880).contains(&to_magnitude(0.7)));
    }
}
