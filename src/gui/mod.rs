mod stats_panel;
mod trigger;
mod viewport;

pub use stats_panel::{apply_edit, PanelOutput};
pub use trigger::window_rect;
pub use viewport::{to_points, ViewportCtx, WindowPlacer};

use crate::controller::{FrameView, OverlayController, SettingsChange};
use crate::geometry::Point;
use crate::hotkey::{HotkeyControl, HotkeyEvent};
use crate::screens;
use crate::worker::{StatsMessage, StatsWorker};
use eframe::egui;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

const SCREEN_RESCAN: Duration = Duration::from_secs(2);
const IDLE_REPAINT: Duration = Duration::from_millis(250);
const DRAG_REPAINT: Duration = Duration::from_millis(16);

pub struct OverlayApp {
    controller: OverlayController,
    stats_rx: Receiver<StatsMessage>,
    worker: Option<StatsWorker>,
    hotkey: Option<HotkeyControl>,
    hotkey_rx: Option<Receiver<HotkeyEvent>>,
    placer: WindowPlacer,
    pointer_over: bool,
    last_scan: Option<Instant>,
}

impl OverlayApp {
    pub fn new(
        controller: OverlayController,
        stats_rx: Receiver<StatsMessage>,
        worker: Option<StatsWorker>,
        hotkey: Option<(HotkeyControl, Receiver<HotkeyEvent>)>,
    ) -> Self {
        let (hotkey, hotkey_rx) = match hotkey {
            Some((control, rx)) => (Some(control), Some(rx)),
            None => (None, None),
        };
        Self {
            controller,
            stats_rx,
            worker,
            hotkey,
            hotkey_rx,
            placer: WindowPlacer::default(),
            pointer_over: false,
            last_scan: None,
        }
    }

    fn forward(&self, change: SettingsChange) {
        if let (Some(seconds), Some(worker)) = (change.interval, self.worker.as_ref()) {
            worker.set_interval(seconds);
        }
        if let (Some(hotkey), Some(control)) = (change.hotkey, self.hotkey.as_ref()) {
            control.set_hotkey(hotkey);
        }
    }

    fn pump_channels(&mut self, now: Instant) {
        while let Ok(msg) = self.stats_rx.try_recv() {
            self.controller.receive_stats(msg, now);
        }
        let events: Vec<HotkeyEvent> = match self.hotkey_rx.as_ref() {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        };
        for event in events {
            if let Some(hotkey) = self.controller.handle_hotkey(event, now) {
                if let Some(control) = self.hotkey.as_ref() {
                    control.set_hotkey(hotkey);
                }
            }
        }
    }

    fn rescan_screens(&mut self, ctx: &egui::Context, now: Instant, ppp: f32) {
        if self
            .last_scan
            .map(|t| now.duration_since(t) < SCREEN_RESCAN)
            .unwrap_or(false)
        {
            return;
        }
        self.last_scan = Some(now);
        let monitor = ctx
            .input(|i| i.viewport().monitor_size)
            .map(|s| (s.x * ppp, s.y * ppp));
        self.controller.set_screens(screens::enumerate(monitor));
    }

    /// Global cursor in screen pixels, from the platform, the input
    /// listener, or the root window's local pointer.
    fn cursor(&self, ctx: &egui::Context, ppp: f32) -> Option<Point> {
        if let Some(p) = screens::cursor_position() {
            return Some(p);
        }
        let local = ctx.input(|i| {
            let origin = i.viewport().outer_rect.map(|r| r.min);
            i.pointer.latest_pos().zip(origin)
        });
        if let Some((pos, origin)) = local {
            let x = ((origin.x + pos.x) * ppp).round() as i32;
            let y = ((origin.y + pos.y) * ppp).round() as i32;
            return Some(Point::new(x, y));
        }
        self.hotkey.as_ref().and_then(|h| h.cursor())
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, now: Instant, cursor: Option<Point>) {
        let (hovering, primary, secondary_down, secondary_up) = ctx.input(|i| {
            (
                i.pointer.has_pointer(),
                i.pointer.primary_clicked(),
                i.pointer.button_pressed(egui::PointerButton::Secondary),
                i.pointer.button_released(egui::PointerButton::Secondary),
            )
        });

        let over = match (cursor, self.controller.trigger_rect()) {
            (Some(c), Some(trigger)) => trigger.contains(c),
            _ => hovering,
        };
        if over != self.pointer_over {
            self.pointer_over = over;
            if over {
                self.controller.pointer_entered_trigger(now);
            } else {
                self.controller.pointer_left_trigger(now);
            }
        }

        if let Some(c) = cursor {
            self.controller.pointer_moved(c);
        }
        if primary && over {
            self.controller.primary_clicked(now);
        }
        if let Some(c) = cursor {
            if secondary_down && over {
                self.controller.secondary_pressed(c, now);
            }
            if secondary_up && self.controller.is_dragging() {
                self.controller.secondary_released(c, now);
                self.pointer_over = self.controller.pointer_on_trigger();
            }
        }
    }

    fn show_preview(&self, ctx: &egui::Context, view: &FrameView, ppp: f32) {
        let Some(preview) = view.preview else {
            return;
        };
        let rect = to_points(preview.rect, ppp);
        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("tarrow_preview"),
            egui::ViewportBuilder::default()
                .with_title("tarrow preview")
                .with_position(rect.min)
                .with_inner_size(rect.size())
                .with_decorations(false)
                .with_transparent(true)
                .with_always_on_top()
                .with_taskbar(false)
                .with_mouse_passthrough(true),
            |ctx, _class| {
                egui::CentralPanel::default()
                    .frame(egui::Frame::none())
                    .show(ctx, |ui| {
                        let r = ui.max_rect();
                        ui.painter()
                            .rect_filled(r, 6.0, egui::Color32::from_rgba_unmultiplied(90, 160, 230, 110));
                        ui.painter()
                            .rect_stroke(r, 6.0, egui::Stroke::new(2.0, egui::Color32::from_rgb(90, 160, 230)));
                    });
            },
        );
    }

    fn show_panel(&mut self, ctx: &egui::Context, view: &FrameView, ppp: f32) {
        let Some(panel) = view.panel else {
            return;
        };
        let rect = to_points(panel, ppp);
        let capturing = self.hotkey.as_ref().map(|h| h.is_capturing()).unwrap_or(false);
        let settings = self.controller.settings().clone();
        let opacity = view.opacity;
        let output = ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("tarrow_panel"),
            egui::ViewportBuilder::default()
                .with_title("tarrow")
                .with_position(rect.min)
                .with_inner_size(rect.size())
                .with_decorations(false)
                .with_transparent(true)
                .with_always_on_top()
                .with_taskbar(false),
            |ctx, _class| {
                let fill = ctx.style().visuals.panel_fill.gamma_multiply(opacity);
                egui::CentralPanel::default()
                    .frame(egui::Frame::central_panel(&ctx.style()).fill(fill).rounding(8.0))
                    .show(ctx, |ui| {
                        egui::ScrollArea::vertical()
                            .show(ui, |ui| {
                                stats_panel::show(ui, &settings, view.snapshot.as_deref(), view.loading, capturing)
                            })
                            .inner
                    })
                    .inner
            },
        );

        if output.capture_hotkey {
            if let Some(control) = self.hotkey.as_ref() {
                control.capture();
            }
        }
        if let Some(edited) = output.edited {
            let change = self
                .controller
                .update_settings(|s| apply_edit(s, &edited));
            self.forward(change);
        }
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let ppp = ctx.pixels_per_point();

        self.rescan_screens(ctx, now, ppp);
        self.pump_channels(now);
        let cursor = self.cursor(ctx, ppp);
        self.handle_pointer(ctx, now, cursor);
        self.controller.tick(now, cursor);

        let Some(view) = self.controller.view() else {
            ctx.request_repaint_after(IDLE_REPAINT);
            return;
        };

        self.placer.place(ctx, window_rect(&view), ppp);
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| trigger::paint(ui, &view, ppp));

        self.show_preview(ctx, &view, ppp);
        self.show_panel(ctx, &view, ppp);

        let wait = if self.controller.is_dragging() {
            DRAG_REPAINT
        } else {
            self.controller
                .next_deadline()
                .map(|d| d.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_REPAINT)
                .min(IDLE_REPAINT)
        };
        ctx.request_repaint_after(wait);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown();
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }
}
