use crate::controller::FrameView;
use crate::geometry::{Edge, Rect};
use eframe::egui::{self, Color32, Pos2, Shape, Stroke};

const BODY: Color32 = Color32::from_rgb(45, 48, 56);
const ARROW: Color32 = Color32::from_rgb(220, 220, 225);
const ALERT: (u8, u8, u8) = (220, 50, 47);
const PIN: Color32 = Color32::from_rgb(240, 180, 40);

/// The trigger window also has to hold the pin badge, which overhangs the
/// trigger by half its size.
pub fn window_rect(view: &FrameView) -> Rect {
    match view.pin_badge {
        Some(badge) => bounding(view.trigger, badge),
        None => view.trigger,
    }
}

fn bounding(a: Rect, b: Rect) -> Rect {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let right = (a.x + a.width).max(b.x + b.width);
    let bottom = (a.y + a.height).max(b.y + b.height);
    Rect::new(x, y, right - x, bottom - y)
}

fn local(rect: Rect, window: Rect, ppp: f32) -> egui::Rect {
    super::viewport::to_points(
        Rect::new(rect.x - window.x, rect.y - window.y, rect.width, rect.height),
        ppp,
    )
}

/// Arrow pointing into the screen, away from the docked edge.
fn arrow(rect: egui::Rect, edge: Edge) -> Vec<Pos2> {
    let c = rect.center();
    let s = rect.width().min(rect.height()) * 0.3;
    match edge {
        Edge::Right => vec![
            egui::pos2(c.x + s * 0.5, c.y - s),
            egui::pos2(c.x + s * 0.5, c.y + s),
            egui::pos2(c.x - s * 0.5, c.y),
        ],
        Edge::Left => vec![
            egui::pos2(c.x - s * 0.5, c.y - s),
            egui::pos2(c.x - s * 0.5, c.y + s),
            egui::pos2(c.x + s * 0.5, c.y),
        ],
        Edge::Top => vec![
            egui::pos2(c.x - s, c.y - s * 0.5),
            egui::pos2(c.x + s, c.y - s * 0.5),
            egui::pos2(c.x, c.y + s * 0.5),
        ],
        Edge::Bottom => vec![
            egui::pos2(c.x - s, c.y + s * 0.5),
            egui::pos2(c.x + s, c.y + s * 0.5),
            egui::pos2(c.x, c.y - s * 0.5),
        ],
    }
}

pub fn paint(ui: &mut egui::Ui, view: &FrameView, ppp: f32) {
    let window = window_rect(view);
    let body = local(view.trigger, window, ppp);
    let painter = ui.painter();
    let alpha = (view.opacity.clamp(0.0, 1.0) * 255.0) as u8;

    let fill = match view.alert_opacity {
        Some(phase) => Color32::from_rgba_unmultiplied(
            ALERT.0,
            ALERT.1,
            ALERT.2,
            (phase.clamp(0.0, 1.0) * 255.0) as u8,
        ),
        None => Color32::from_rgba_unmultiplied(BODY.r(), BODY.g(), BODY.b(), alpha),
    };
    painter.rect_filled(body, 6.0, fill);

    if view.compact {
        let text = match (&view.snapshot, view.loading) {
            (Some(s), false) => format!("CPU {:.0}%\nRAM {:.0}%", s.cpu_percent, s.memory.percent),
            _ => "…".to_string(),
        };
        painter.text(
            body.center(),
            egui::Align2::CENTER_CENTER,
            text,
            egui::FontId::monospace(12.0),
            ARROW,
        );
    } else {
        painter.add(Shape::convex_polygon(arrow(body, view.edge), ARROW, Stroke::NONE));
        if view.expanded {
            painter.rect_stroke(body, 6.0, Stroke::new(1.0, ARROW.gamma_multiply(0.4)));
        }
    }

    if let Some(badge) = view.pin_badge {
        let badge = local(badge, window, ppp);
        painter.circle_filled(badge.center(), badge.width() * 0.5, PIN);
        painter.circle_filled(badge.center(), badge.width() * 0.2, BODY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_covers_overhanging_badge() {
        let trigger = Rect::new(1890, 510, 30, 60);
        let badge = Rect::new(1882, 502, 16, 16);
        assert_eq!(bounding(trigger, badge), Rect::new(1882, 502, 38, 68));
    }

    #[test]
    fn arrow_points_away_from_edge() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(30.0, 60.0));
        let tip = arrow(rect, Edge::Right)[2];
        assert!(tip.x < rect.center().x);
        let tip = arrow(rect, Edge::Top)[2];
        assert!(tip.y > rect.center().y);
    }
}
