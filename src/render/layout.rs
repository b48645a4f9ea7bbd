//! Fixed overlay layout
//!
//! Every element position was measured against the 600×400 reference
//! controller image. The table is never mutated; resizing only changes the
//! scale it is drawn at.

use crate::controller::snapshot::{axis, button};

pub const BASE_WIDTH: f32 = 600.0;
pub const BASE_HEIGHT: f32 = 400.0;

/// Rectangle in reference-image pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Slot {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    LeftStick,
    RightStick,
    LeftTrigger,
    RightTrigger,
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    LeftBumper,
    RightBumper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpadDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatAxis {
    X,
    Y,
}

/// Hat component and value that light up each d-pad arm
pub const DPAD_DIRECTIONS: [(DpadDirection, HatAxis, i8); 4] = [
    (DpadDirection::Up, HatAxis::Y, 1),
    (DpadDirection::Down, HatAxis::Y, -1),
    (DpadDirection::Left, HatAxis::X, -1),
    (DpadDirection::Right, HatAxis::X, 1),
];

impl DpadDirection {
    pub fn hat_condition(self) -> (HatAxis, i8) {
        DPAD_DIRECTIONS
            .iter()
            .find(|(direction, _, _)| *direction == self)
            .map(|(_, hat_axis, value)| (*hat_axis, *value))
            .unwrap_or((HatAxis::X, 0))
    }
}

/// Which inputs drive an element and how it is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Ellipse displaced by the two axes, lit by the click button
    Stick {
        x_axis: usize,
        y_axis: usize,
        click: usize,
    },
    /// Slot that fills upward with the axis value
    Trigger { axis: usize },
    /// Ellipse lit while the button is held
    FaceButton { button: usize },
    /// Rectangle lit while the button is held
    Bumper { button: usize },
    /// Rectangle lit while hat 0 points this way
    Dpad(DpadDirection),
}

impl ElementId {
    pub fn binding(self) -> Binding {
        match self {
            ElementId::LeftStick => Binding::Stick {
                x_axis: axis::LEFT_STICK_X,
                y_axis: axis::LEFT_STICK_Y,
                click: button::LEFT_STICK,
            },
            ElementId::RightStick => Binding::Stick {
                x_axis: axis::RIGHT_STICK_X,
                y_axis: axis::RIGHT_STICK_Y,
                click: button::RIGHT_STICK,
            },
            ElementId::LeftTrigger => Binding::Trigger {
                axis: axis::LEFT_TRIGGER,
            },
            ElementId::RightTrigger => Binding::Trigger {
                axis: axis::RIGHT_TRIGGER,
            },
            ElementId::ButtonA => Binding::FaceButton { button: button::A },
            ElementId::ButtonB => Binding::FaceButton { button: button::B },
            ElementId::ButtonX => Binding::FaceButton { button: button::X },
            ElementId::ButtonY => Binding::FaceButton { button: button::Y },
            ElementId::DpadUp => Binding::Dpad(DpadDirection::Up),
            ElementId::DpadDown => Binding::Dpad(DpadDirection::Down),
            ElementId::DpadLeft => Binding::Dpad(DpadDirection::Left),
            ElementId::DpadRight => Binding::Dpad(DpadDirection::Right),
            ElementId::LeftBumper => Binding::Bumper {
                button: button::LEFT_BUMPER,
            },
            ElementId::RightBumper => Binding::Bumper {
                button: button::RIGHT_BUMPER,
            },
        }
    }
}

/// Draw order: sticks, triggers, face buttons, d-pad, bumpers
pub static LAYOUT: [(ElementId, Slot); 14] = [
    (ElementId::LeftStick, Slot::new(115.0, 210.0, 30.0, 30.0)),
    (ElementId::RightStick, Slot::new(365.0, 295.0, 30.0, 30.0)),
    (ElementId::LeftTrigger, Slot::new(120.0, 20.0, 50.0, 60.0)),
    (ElementId::RightTrigger, Slot::new(440.0, 20.0, 50.0, 60.0)),
    (ElementId::ButtonA, Slot::new(445.0, 250.0, 30.0, 30.0)),
    (ElementId::ButtonB, Slot::new(485.0, 210.0, 30.0, 30.0)),
    (ElementId::ButtonX, Slot::new(405.0, 210.0, 30.0, 30.0)),
    (ElementId::ButtonY, Slot::new(445.0, 170.0, 30.0, 30.0)),
    (ElementId::DpadUp, Slot::new(195.0, 270.0, 25.0, 25.0)),
    (ElementId::DpadDown, Slot::new(195.0, 320.0, 25.0, 25.0)),
    (ElementId::DpadLeft, Slot::new(170.0, 295.0, 25.0, 25.0)),
    (ElementId::DpadRight, Slot::new(220.0, 295.0, 25.0, 25.0)),
    (ElementId::LeftBumper, Slot::new(120.0, 120.0, 50.0, 20.0)),
    (ElementId::RightBumper, Slot::new(440.0, 120.0, 50.0, 20.0)),
];

#[cfg(test)]
pub fn slot(element: ElementId) -> Option<Slot> {
    LAYOUT
        .iter()
        .find(|(id, _)| *id == element)
        .map(|(_, slot)| *slot)
}
