//! # Gamepad Visualizer User Interface
//!
//! The eframe application that ties the poller and the renderer together.
//!
//! ## Tick Model
//!
//! eframe has no timers, so `update` doubles as the tick handler: whenever at
//! least one tick interval has passed since the last poll it drains the
//! device events, and it always asks for a repaint one interval later. Resize
//! events repaint on their own. Polling and painting share the UI thread and
//! never overlap, so the device table needs no locking.
//!
//! ## Painting
//!
//! [`render::frame::render`] produces the draw list; this module only replays
//! it onto the background layer painter, plus a small status overlay with the
//! primary device's name and the most recent hotplug/rumble events.

pub mod background;

use eframe::egui::{self, pos2, Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Vec2};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::controller::poller::{LogEntry, Poller, Polling};
use crate::render::frame::{self as overlay, DrawCommand, RenderSettings, ShapeKind};

use self::background::Background;

const RECENT_EVENTS: usize = 3;
const PLACEHOLDER_FONT_SIZE: f32 = 20.0;
const STATUS_FONT_SIZE: f32 = 13.0;
const STATUS_MARGIN: f32 = 8.0;

pub struct VisualizerUI {
    /// `None` when the input service could not be started
    poller: Option<Poller<Polling>>,

    background: Option<Background>,

    render_settings: RenderSettings,

    tick_interval: Duration,

    last_tick: Option<Instant>,

    /// Latest applied events, oldest first
    recent_events: VecDeque<LogEntry>,
}

impl VisualizerUI {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        poller: Option<Poller<Polling>>,
        config: &Config,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        let background = background::load(&cc.egui_ctx, &config.background_image);

        VisualizerUI {
            poller,
            background,
            render_settings: config.render_settings(),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            last_tick: None,
            recent_events: VecDeque::with_capacity(RECENT_EVENTS),
        }
    }

    fn tick(&mut self) {
        let Some(poller) = self.poller.as_mut() else {
            return;
        };

        let had_devices = !poller.table().is_empty();
        let (table, log) = poller.poll();
        if !log.is_empty() {
            debug!("Tick applied {} events, {} devices", log.len(), table.len());
        }
        if had_devices && table.is_empty() {
            info!("Last gamepad disconnected, showing placeholder");
        }

        remember(&mut self.recent_events, log.entries);
    }
}

/// True once at least `interval` has passed since `last`, or if nothing ran yet
fn tick_due(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    last.map_or(true, |last| now.saturating_duration_since(last) >= interval)
}

// Keeps the newest RECENT_EVENTS entries, dropping the oldest first
fn remember(recent: &mut VecDeque<LogEntry>, entries: impl IntoIterator<Item = LogEntry>) {
    for entry in entries {
        if recent.len() == RECENT_EVENTS {
            recent.pop_front();
        }
        recent.push_back(entry);
    }
}

impl eframe::App for VisualizerUI {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        overlay::BACKDROP.to_normalized_gamma_f32()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if tick_due(self.last_tick, now, self.tick_interval) {
            self.tick();
            self.last_tick = Some(now);
        }
        ctx.request_repaint_after(self.tick_interval);

        let screen = ctx.screen_rect();
        let primary = self
            .poller
            .as_ref()
            .and_then(|poller| poller.primary_snapshot());

        let frame = overlay::render(
            screen.size(),
            self.background.as_ref().map(|background| background.size),
            primary.as_ref().map(|(_, snapshot)| snapshot),
            &self.render_settings,
        );

        let painter = ctx.layer_painter(egui::LayerId::background());
        let (backdrop, elements) = split_layers(&frame.commands);

        // Status text sits under the element shapes so it never hides one
        paint(&painter, screen.min, backdrop, self.background.as_ref());
        let device_name = primary.as_ref().map(|(device, _)| device.name.as_str());
        paint_status(&painter, screen, device_name, &self.recent_events);
        paint(&painter, screen.min, elements, self.background.as_ref());
    }
}

/// Splits a draw list into what goes under the status text and the element shapes on top
fn split_layers(commands: &[DrawCommand]) -> (Vec<&DrawCommand>, Vec<&DrawCommand>) {
    commands
        .iter()
        .partition(|command| !matches!(command, DrawCommand::Shape { .. }))
}

fn paint<'a>(
    painter: &Painter,
    origin: Pos2,
    commands: impl IntoIterator<Item = &'a DrawCommand>,
    background: Option<&Background>,
) {
    let offset = origin.to_vec2();

    for command in commands {
        match command {
            DrawCommand::Backdrop { rect, color } => {
                painter.rect_filled(rect.translate(offset), 0.0, *color);
            }
            DrawCommand::Background { rect } => {
                if let Some(background) = background {
                    painter.image(
                        background.texture.id(),
                        rect.translate(offset),
                        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
            }
            DrawCommand::Text { pos, text, color } => {
                painter.text(
                    *pos + offset,
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(PLACEHOLDER_FONT_SIZE),
                    *color,
                );
            }
            DrawCommand::Shape {
                kind, rect, color, ..
            } => {
                let rect = rect.translate(offset);
                match kind {
                    ShapeKind::Ellipse => {
                        painter.add(Shape::ellipse_filled(rect.center(), rect.size() / 2.0, *color));
                    }
                    ShapeKind::Rect => {
                        painter.rect_filled(rect, 0.0, *color);
                    }
                }
            }
        }
    }
}

fn paint_status(
    painter: &Painter,
    screen: Rect,
    device_name: Option<&str>,
    recent_events: &VecDeque<LogEntry>,
) {
    let font = FontId::proportional(STATUS_FONT_SIZE);

    if let Some(name) = device_name {
        painter.text(
            screen.min + Vec2::splat(STATUS_MARGIN),
            Align2::LEFT_TOP,
            format!("Connected to: {}", name),
            font.clone(),
            overlay::TEXT,
        );
    }

    let line_height = STATUS_FONT_SIZE + 4.0;
    for (row, entry) in recent_events.iter().rev().enumerate() {
        let pos = pos2(
            screen.min.x + STATUS_MARGIN,
            screen.max.y - STATUS_MARGIN - row as f32 * line_height,
        );
        painter.text(
            pos,
            Align2::LEFT_BOTTOM,
            entry.to_string(),
            font.clone(),
            Color32::LIGHT_GRAY,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::backend::DeviceEvent;
    use crate::controller::device_table::DeviceId;
    use crate::controller::poller::Outcome;
    use crate::controller::snapshot::{axis, button, Snapshot, HAT_COUNT};
    use chrono::Local;

    const INTERVAL: Duration = Duration::from_millis(30);

    fn removed(id: usize) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            event: DeviceEvent::Removed(DeviceId(id)),
            outcome: Outcome::Removed,
        }
    }

    fn ids(recent: &VecDeque<LogEntry>) -> Vec<DeviceId> {
        recent.iter().map(|entry| entry.event.device_id()).collect()
    }

    #[test]
    fn element_shapes_are_painted_above_the_status_layer() {
        let snapshot = Snapshot::neutral(axis::COUNT, button::COUNT, HAT_COUNT);
        let frame = overlay::render(
            Vec2::new(600.0, 400.0),
            Some(Vec2::new(600.0, 400.0)),
            Some(&snapshot),
            &RenderSettings::default(),
        );

        let (backdrop, elements) = split_layers(&frame.commands);
        assert_eq!(backdrop.len() + elements.len(), frame.commands.len());
        assert!(matches!(backdrop[0], DrawCommand::Backdrop { .. }));
        assert!(matches!(backdrop[1], DrawCommand::Background { .. }));
        assert!(!elements.is_empty());
        assert!(elements
            .iter()
            .all(|command| matches!(command, DrawCommand::Shape { .. })));
    }

    #[test]
    fn first_tick_is_due_immediately() {
        assert!(tick_due(None, Instant::now(), INTERVAL));
    }

    #[test]
    fn tick_waits_for_a_full_interval() {
        let last = Instant::now();

        assert!(!tick_due(Some(last), last, INTERVAL));
        assert!(!tick_due(
            Some(last),
            last + INTERVAL - Duration::from_millis(1),
            INTERVAL
        ));
        assert!(tick_due(Some(last), last + INTERVAL, INTERVAL));
        assert!(tick_due(Some(last), last + INTERVAL * 3, INTERVAL));
    }

    #[test]
    fn recent_events_keep_only_the_newest() {
        let mut recent = VecDeque::new();

        remember(&mut recent, vec![removed(1), removed(2)]);
        assert_eq!(ids(&recent), vec![DeviceId(1), DeviceId(2)]);

        for id in 3..=6 {
            remember(&mut recent, vec![removed(id)]);
            assert!(recent.len() <= RECENT_EVENTS);
        }
        assert_eq!(ids(&recent), vec![DeviceId(4), DeviceId(5), DeviceId(6)]);
    }

    #[test]
    fn one_large_batch_is_capped_too() {
        let mut recent = VecDeque::new();
        remember(&mut recent, (0..10).map(removed));

        assert_eq!(recent.len(), RECENT_EVENTS);
        assert_eq!(ids(&recent), vec![DeviceId(7), DeviceId(8), DeviceId(9)]);
    }
}
