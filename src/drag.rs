use crate::dock::TriggerSizes;
use crate::geometry::{place_on_edge, resolve, Edge, Placement, Point, Rect, Screen};

/// Right-button drag of the trigger.
///
/// The session never touches the dock; it only tracks the placement the
/// trigger would get if released at the current pointer position.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        start: Point,
        candidate: Option<Placement>,
    },
}

/// Where the drag preview should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview {
    pub rect: Rect,
    pub edge: Edge,
}

impl DragSession {
    pub fn is_active(&self) -> bool {
        matches!(self, DragSession::Dragging { .. })
    }

    pub fn start_point(&self) -> Option<Point> {
        match self {
            DragSession::Dragging { start, .. } => Some(*start),
            DragSession::Idle => None,
        }
    }

    pub fn candidate(&self) -> Option<&Placement> {
        match self {
            DragSession::Dragging { candidate, .. } => candidate.as_ref(),
            DragSession::Idle => None,
        }
    }

    /// Enter `Dragging`. Returns `false` if a drag was already in progress.
    pub fn begin(&mut self, point: Point, screens: &[Screen]) -> bool {
        if self.is_active() {
            return false;
        }
        *self = DragSession::Dragging {
            start: point,
            candidate: resolve(point, screens),
        };
        tracing::debug!(x = point.x, y = point.y, "drag started");
        true
    }

    /// Recompute the candidate for a pointer move. No-op while idle.
    pub fn update(&mut self, point: Point, screens: &[Screen]) -> Option<&Placement> {
        match self {
            DragSession::Dragging { candidate, .. } => {
                *candidate = resolve(point, screens);
                candidate.as_ref()
            }
            DragSession::Idle => None,
        }
    }

    /// Leave `Dragging` and return the final placement for the release point.
    pub fn finish(&mut self, point: Point, screens: &[Screen]) -> Option<Placement> {
        if !self.is_active() {
            return None;
        }
        *self = DragSession::Idle;
        let placement = resolve(point, screens);
        tracing::debug!(x = point.x, y = point.y, ?placement, "drag finished");
        placement
    }

    pub fn cancel(&mut self) {
        *self = DragSession::Idle;
    }

    /// Destination preview for the current candidate, sized like a resting
    /// trigger on the candidate edge.
    pub fn preview(&self, screens: &[Screen]) -> Option<Preview> {
        let candidate = self.candidate()?;
        preview_for(candidate, screens)
    }
}

pub fn preview_for(placement: &Placement, screens: &[Screen]) -> Option<Preview> {
    let screen = screens
        .iter()
        .find(|s| s.name == placement.screen)
        .or_else(|| crate::geometry::primary_screen(screens))?;
    let size = TriggerSizes::for_orientation(placement.edge.orientation()).base;
    Some(Preview {
        rect: place_on_edge(screen.geometry, placement.edge, placement.position, size),
        edge: placement.edge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screens() -> Vec<Screen> {
        vec![
            Screen::new("A", Rect::new(0, 0, 1920, 1080)).with_primary(true),
            Screen::new("B", Rect::new(1920, 0, 1920, 1080)),
        ]
    }

    #[test]
    fn preview_shows_destination_not_pointer() {
        let screens = screens();
        let mut drag = DragSession::default();
        assert!(drag.begin(Point::new(1900, 540), &screens));
        drag.update(Point::new(1000, 5), &screens);
        let preview = drag.preview(&screens).expect("preview");
        assert_eq!(preview.edge, Edge::Top);
        assert_eq!(preview.rect.y, 0);
        assert_eq!(preview.rect.size(), TriggerSizes::HORIZONTAL.base);
    }

    #[test]
    fn preview_and_commit_agree_for_same_point() {
        let screens = screens();
        let mut drag = DragSession::default();
        drag.begin(Point::new(10, 10), &screens);
        let point = Point::new(2500, 1070);
        let previewed = drag.update(point, &screens).cloned();
        let committed = drag.finish(point, &screens);
        assert_eq!(previewed, committed);
        assert!(!drag.is_active());
    }

    #[test]
    fn update_and_finish_are_ignored_when_idle() {
        let screens = screens();
        let mut drag = DragSession::default();
        assert!(drag.update(Point::new(1, 1), &screens).is_none());
        assert!(drag.finish(Point::new(1, 1), &screens).is_none());
    }

    #[test]
    fn second_begin_is_rejected() {
        let screens = screens();
        let mut drag = DragSession::default();
        assert!(drag.begin(Point::new(1, 1), &screens));
        assert!(!drag.begin(Point::new(5, 5), &screens));
        assert_eq!(drag.start_point(), Some(Point::new(1, 1)));
    }
}
