use crate::geometry::{
    expand_on_edge, place_on_edge, primary_screen, Edge, Orientation, Placement, Rect, Screen,
    Size,
};

/// Base and hover-expanded trigger sizes for one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSizes {
    pub base: Size,
    pub expanded: Size,
}

impl TriggerSizes {
    pub const VERTICAL: TriggerSizes = TriggerSizes {
        base: Size::new(30, 60),
        expanded: Size::new(40, 80),
    };
    pub const HORIZONTAL: TriggerSizes = TriggerSizes {
        base: Size::new(60, 30),
        expanded: Size::new(80, 40),
    };

    pub fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Vertical => Self::VERTICAL,
            Orientation::Horizontal => Self::HORIZONTAL,
        }
    }

    pub fn swapped(self) -> Self {
        Self {
            base: self.base.transposed(),
            expanded: self.expanded.transposed(),
        }
    }
}

/// Result of committing a new placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockChange {
    pub edge_changed: bool,
    pub orientation_changed: bool,
}

/// Authoritative record of where the trigger lives.
#[derive(Debug, Clone, PartialEq)]
pub struct DockState {
    screen: String,
    edge: Edge,
    position: f64,
    size_class: Orientation,
    sizes: TriggerSizes,
}

pub const DEFAULT_POSITION: f64 = 0.5;

fn sanitize_position(position: f64) -> f64 {
    if position.is_finite() {
        position.clamp(0.0, 1.0)
    } else {
        DEFAULT_POSITION
    }
}

impl DockState {
    pub fn new(screen: impl Into<String>, edge: Edge, position: f64) -> Self {
        let size_class = edge.orientation();
        Self {
            screen: screen.into(),
            edge,
            position: sanitize_position(position),
            size_class,
            sizes: TriggerSizes::for_orientation(size_class),
        }
    }

    /// Restore from persisted values. An unknown or missing screen name is
    /// replaced by the primary screen; edge and position are kept as stored.
    pub fn load(screen_name: Option<&str>, edge: Edge, position: f64, screens: &[Screen]) -> Self {
        let stored = screen_name.and_then(|name| screens.iter().find(|s| s.name == name));
        let screen = match stored {
            Some(screen) => screen.name.clone(),
            None => {
                let fallback = primary_screen(screens)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                if let Some(name) = screen_name.filter(|n| !n.is_empty()) {
                    tracing::info!(stored = name, fallback = %fallback, "stored screen not attached; using primary");
                }
                fallback
            }
        };
        Self::new(screen, edge, position)
    }

    pub fn screen(&self) -> &str {
        &self.screen
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn size_class(&self) -> Orientation {
        self.size_class
    }

    pub fn sizes(&self) -> TriggerSizes {
        self.sizes
    }

    /// Apply a drag-resolved placement. When the trigger moves between a
    /// vertical and a horizontal edge its size pair is swapped first.
    pub fn commit(&mut self, placement: Placement) -> DockChange {
        let orientation = placement.edge.orientation();
        let orientation_changed = orientation != self.size_class;
        if orientation_changed {
            self.sizes = self.sizes.swapped();
            self.size_class = orientation;
        }
        let edge_changed = placement.edge != self.edge;
        tracing::debug!(
            from_screen = %self.screen,
            to_screen = %placement.screen,
            from_edge = %self.edge,
            to_edge = %placement.edge,
            position = placement.position,
            orientation_changed,
            "dock committed"
        );
        self.screen = placement.screen;
        self.edge = placement.edge;
        self.position = sanitize_position(placement.position);
        DockChange {
            edge_changed,
            orientation_changed,
        }
    }

    /// Live screen for this dock, falling back to the primary screen when the
    /// stored one has been disconnected.
    pub fn resolve_screen<'a>(&self, screens: &'a [Screen]) -> Option<&'a Screen> {
        screens
            .iter()
            .find(|s| s.name == self.screen)
            .or_else(|| primary_screen(screens))
    }

    pub fn trigger_rect(&self, screens: &[Screen], expanded: bool) -> Option<Rect> {
        let screen = self.resolve_screen(screens)?;
        let base = place_on_edge(screen.geometry, self.edge, self.position, self.sizes.base);
        if expanded {
            Some(expand_on_edge(base, self.edge, self.sizes.expanded).clamped_into(screen.geometry))
        } else {
            Some(base)
        }
    }
}

impl Default for DockState {
    fn default() -> Self {
        Self::new(String::new(), Edge::Right, DEFAULT_POSITION)
    }
}

/// Pin badge size.
pub const PIN_BADGE: Size = Size::new(16, 16);

/// Where the pin badge sits relative to the trigger: on the corner facing
/// away from the docked edge, overlapping by half its size.
pub fn pin_badge_rect(trigger: Rect, edge: Edge) -> Rect {
    let half = PIN_BADGE.width / 2;
    let (x, y) = match edge {
        Edge::Left => (trigger.x + trigger.width - half, trigger.y - half),
        Edge::Top => (trigger.x - half, trigger.y + trigger.height - half),
        Edge::Right | Edge::Bottom => (trigger.x - half, trigger.y - half),
    };
    Rect::new(x, y, PIN_BADGE.width, PIN_BADGE.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screens() -> Vec<Screen> {
        vec![
            Screen::new("DISPLAY1", Rect::new(0, 0, 1920, 1080)).with_primary(true),
            Screen::new("DISPLAY2", Rect::new(1920, 0, 1920, 1080)),
        ]
    }

    #[test]
    fn load_substitutes_primary_but_keeps_edge_and_position() {
        let dock = DockState::load(Some("HDMI-9"), Edge::Top, 0.8, &screens());
        assert_eq!(dock.screen(), "DISPLAY1");
        assert_eq!(dock.edge(), Edge::Top);
        assert_eq!(dock.position(), 0.8);
        assert_eq!(dock.size_class(), Orientation::Horizontal);
        assert_eq!(dock.sizes(), TriggerSizes::HORIZONTAL);
    }

    #[test]
    fn load_keeps_known_screen() {
        let dock = DockState::load(Some("DISPLAY2"), Edge::Left, 0.1, &screens());
        assert_eq!(dock.screen(), "DISPLAY2");
    }

    #[test]
    fn positions_are_clamped() {
        assert_eq!(DockState::new("a", Edge::Left, 4.0).position(), 1.0);
        assert_eq!(DockState::new("a", Edge::Left, -1.0).position(), 0.0);
        assert_eq!(DockState::new("a", Edge::Left, f64::NAN).position(), 0.5);
    }

    #[test]
    fn commit_across_orientations_swaps_sizes() {
        let mut dock = DockState::new("DISPLAY1", Edge::Right, 0.5);
        let change = dock.commit(Placement {
            screen: "DISPLAY2".into(),
            edge: Edge::Top,
            position: 0.3,
        });
        assert!(change.orientation_changed);
        assert_eq!(dock.size_class(), Orientation::Horizontal);
        assert_eq!(dock.sizes().base, Size::new(60, 30));
        assert_eq!(dock.sizes().expanded, Size::new(80, 40));
        assert_eq!(dock.position(), 0.3);
        assert_eq!(dock.screen(), "DISPLAY2");
    }

    #[test]
    fn commit_same_orientation_keeps_sizes() {
        let mut dock = DockState::new("DISPLAY1", Edge::Right, 0.5);
        let change = dock.commit(Placement {
            screen: "DISPLAY1".into(),
            edge: Edge::Left,
            position: 0.2,
        });
        assert!(change.edge_changed);
        assert!(!change.orientation_changed);
        assert_eq!(dock.sizes(), TriggerSizes::VERTICAL);
    }

    #[test]
    fn trigger_rect_falls_back_to_primary_screen() {
        let dock = DockState::new("GONE", Edge::Right, 0.5);
        let rect = dock.trigger_rect(&screens(), false).expect("rect");
        assert_eq!(rect, Rect::new(1890, 510, 30, 60));
    }

    #[test]
    fn expanded_trigger_stays_on_screen_at_edge_ends() {
        let dock = DockState::new("DISPLAY1", Edge::Right, 0.0);
        let rect = dock.trigger_rect(&screens(), true).expect("rect");
        assert_eq!(rect, Rect::new(1880, 0, 40, 80));
    }

    #[test]
    fn pin_badge_faces_away_from_edge() {
        let trigger = Rect::new(0, 500, 30, 60);
        assert_eq!(pin_badge_rect(trigger, Edge::Left), Rect::new(22, 492, 16, 16));
        let trigger = Rect::new(1890, 500, 30, 60);
        assert_eq!(pin_badge_rect(trigger, Edge::Right), Rect::new(1882, 492, 16, 16));
    }
}
