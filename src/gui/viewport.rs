use crate::geometry::Rect;
use eframe::egui;

/// The slice of `egui::Context` used to move native windows. Tests provide a
/// recording implementation.
pub trait ViewportCtx {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand);
    fn request_repaint(&self);
}

impl ViewportCtx for egui::Context {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand) {
        egui::Context::send_viewport_cmd(self, cmd);
    }

    fn request_repaint(&self) {
        egui::Context::request_repaint(self);
    }
}

/// Screen pixels to egui points.
pub fn to_points(rect: Rect, pixels_per_point: f32) -> egui::Rect {
    let ppp = if pixels_per_point > 0.0 {
        pixels_per_point
    } else {
        1.0
    };
    egui::Rect::from_min_size(
        egui::pos2(rect.x as f32 / ppp, rect.y as f32 / ppp),
        egui::vec2(rect.width as f32 / ppp, rect.height as f32 / ppp),
    )
}

/// Keeps a window on a target rect, sending commands only on change.
#[derive(Debug, Default)]
pub struct WindowPlacer {
    last: Option<(Rect, u32)>,
}

impl WindowPlacer {
    /// Returns `true` when commands were sent.
    pub fn place<C: ViewportCtx + ?Sized>(&mut self, ctx: &C, rect: Rect, pixels_per_point: f32) -> bool {
        let key = (rect, pixels_per_point.to_bits());
        if self.last == Some(key) {
            return false;
        }
        let target = to_points(rect, pixels_per_point);
        tracing::trace!(?rect, "moving window");
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(target.min));
        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(target.size()));
        ctx.request_repaint();
        self.last = Some(key);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
