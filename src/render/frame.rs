use egui::{pos2, vec2, Color32, Pos2, Rect, Vec2};

use super::layout::{Binding, ElementId, HatAxis, Slot, BASE_HEIGHT, BASE_WIDTH, LAYOUT};
use crate::controller::snapshot::Snapshot;

pub const ACTIVE: Color32 = Color32::from_rgb(0, 255, 0);
pub const STICK_IDLE: Color32 = Color32::from_rgb(127, 127, 127);
pub const TRIGGER_SLOT: Color32 = Color32::from_rgb(127, 127, 127);
pub const BUTTON_IDLE: Color32 = Color32::from_rgb(100, 100, 100);
pub const BACKDROP: Color32 = Color32::from_rgb(50, 50, 50);
pub const TEXT: Color32 = Color32::WHITE;

pub const PLACEHOLDER_TEXT: &str = "No gamepad detected";

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Reference pixels a stick moves at full deflection
    pub stick_travel: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { stick_travel: 20.0 }
    }
}

/// Where the reference image lands in the window and how much it is scaled
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub image_rect: Rect,
    /// Uniform factor applied to both axes
    pub scale: f32,
}

impl Viewport {
    /// Fits `image` inside `window` keeping its aspect ratio, centered
    pub fn fit(window: Vec2, image: Vec2) -> Self {
        let ratio = (window.x / image.x).min(window.y / image.y);
        let size = image * ratio;
        let offset = (window - size) / 2.0;
        let image_rect = Rect::from_min_size(offset.to_pos2(), size);
        let scale = (size.x / BASE_WIDTH).min(size.y / BASE_HEIGHT);

        Self { image_rect, scale }
    }

    pub fn to_screen(&self, x: f32, y: f32) -> Pos2 {
        self.image_rect.min + vec2(x, y) * self.scale
    }

    pub fn place(&self, slot: Slot) -> Rect {
        Rect::from_min_size(
            self.to_screen(slot.x, slot.y),
            vec2(slot.w, slot.h) * self.scale,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Ellipse,
    Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Backdrop {
        rect: Rect,
        color: Color32,
    },
    Background {
        rect: Rect,
    },
    Text {
        pos: Pos2,
        text: String,
        color: Color32,
    },
    Shape {
        element: ElementId,
        kind: ShapeKind,
        rect: Rect,
        color: Color32,
    },
}

/// One frame's worth of draw calls, in paint order
#[derive(Clone, Debug, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

#[cfg(test)]
impl DrawList {
    /// Shapes drawn for layout elements, skipping backdrop, image and text
    pub fn element_shapes(&self) -> impl Iterator<Item = (ElementId, ShapeKind, Rect, Color32)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Shape {
                element,
                kind,
                rect,
                color,
            } => Some((*element, *kind, *rect, *color)),
            _ => None,
        })
    }

    pub fn shapes_for(&self, element: ElementId) -> Vec<(ShapeKind, Rect, Color32)> {
        self.element_shapes()
            .filter(|(id, _, _, _)| *id == element)
            .map(|(_, kind, rect, color)| (kind, rect, color))
            .collect()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Builds the overlay for one frame
///
/// `background` is the pixel size of the controller image, if one was
/// loaded. Without it the reference rectangle is fitted instead so element
/// positions stay the same. `snapshot` is the primary device's state, `None`
/// when no device is connected.
pub fn render(
    window: Vec2,
    background: Option<Vec2>,
    snapshot: Option<&Snapshot>,
    settings: &RenderSettings,
) -> DrawList {
    let image_size = background
        .filter(|size| size.x > 0.0 && size.y > 0.0)
        .unwrap_or(vec2(BASE_WIDTH, BASE_HEIGHT));
    let viewport = Viewport::fit(window, image_size);

    let mut commands = vec![DrawCommand::Backdrop {
        rect: Rect::from_min_size(Pos2::ZERO, window),
        color: BACKDROP,
    }];
    if background.is_some() {
        commands.push(DrawCommand::Background {
            rect: viewport.image_rect,
        });
    }

    let Some(snapshot) = snapshot else {
        commands.push(DrawCommand::Text {
            pos: pos2(window.x / 2.0, window.y / 2.0),
            text: PLACEHOLDER_TEXT.to_string(),
            color: TEXT,
        });
        return DrawList { commands };
    };

    for (element, slot) in LAYOUT.iter() {
        draw_element(&mut commands, &viewport, *element, *slot, snapshot, settings);
    }

    DrawList { commands }
}

fn draw_element(
    commands: &mut Vec<DrawCommand>,
    viewport: &Viewport,
    element: ElementId,
    slot: Slot,
    snapshot: &Snapshot,
    settings: &RenderSettings,
) {
    let mut shape = |kind: ShapeKind, slot: Slot, color: Color32| {
        commands.push(DrawCommand::Shape {
            element,
            kind,
            rect: viewport.place(slot),
            color,
        });
    };

    match element.binding() {
        Binding::Stick {
            x_axis,
            y_axis,
            click,
        } => {
            let moved = Slot {
                x: slot.x + (snapshot.axis(x_axis) * settings.stick_travel).trunc(),
                y: slot.y + (snapshot.axis(y_axis) * settings.stick_travel).trunc(),
                ..slot
            };
            let color = lit(snapshot.button(click), STICK_IDLE);
            shape(ShapeKind::Ellipse, moved, color);
        }
        Binding::Trigger { axis } => {
            let fill = trigger_fill_height(snapshot.axis(axis), slot.h);
            shape(ShapeKind::Rect, slot, TRIGGER_SLOT);
            shape(
                ShapeKind::Rect,
                Slot {
                    y: slot.y + (slot.h - fill),
                    h: fill,
                    ..slot
                },
                ACTIVE,
            );
        }
        Binding::FaceButton { button } => {
            shape(ShapeKind::Ellipse, slot, lit(snapshot.button(button), BUTTON_IDLE));
        }
        Binding::Bumper { button } => {
            shape(ShapeKind::Rect, slot, lit(snapshot.button(button), BUTTON_IDLE));
        }
        Binding::Dpad(direction) => {
            let hat = snapshot.hat(0);
            let (hat_axis, wanted) = direction.hat_condition();
            let component = match hat_axis {
                HatAxis::X => hat.x,
                HatAxis::Y => hat.y,
            };
            shape(ShapeKind::Rect, slot, lit(component == wanted, BUTTON_IDLE));
        }
    }
}

/// Height of the lit part of a trigger slot, in reference pixels
///
/// The axis is clamped to [0, 1]; anything that is not a number reads as 0.
pub fn trigger_fill_height(value: f32, slot_height: f32) -> f32 {
    let value = value.max(0.0).min(1.0);
    (value * slot_height).trunc()
}

fn lit(active: bool, idle: Color32) -> Color32 {
    if active {
        ACTIVE
    } else {
        idle
    }
}
