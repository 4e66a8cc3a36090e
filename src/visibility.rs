use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelVisibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Show,
    Hide,
}

/// Show/hide state of the stats panel plus the two latches that keep it
/// open. The hover delay is not a state here; it is a deferred call to
/// [`VisibilityController::hover_elapsed`].
#[derive(Debug, Clone, Default)]
pub struct VisibilityController {
    state: PanelVisibility,
    pinned: bool,
    hotkey_held: bool,
}

impl VisibilityController {
    pub fn state(&self) -> PanelVisibility {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == PanelVisibility::Visible
    }

    pub fn pinned(&self) -> bool {
        self.pinned
    }

    pub fn hotkey_held(&self) -> bool {
        self.hotkey_held
    }

    fn apply(&mut self, transition: Transition, reason: &'static str) -> Option<Transition> {
        let next = match transition {
            Transition::Show => PanelVisibility::Visible,
            Transition::Hide => PanelVisibility::Hidden,
        };
        if next == self.state {
            return None;
        }
        tracing::debug!(from = ?self.state, to = ?next, reason, pinned = self.pinned, hotkey_held = self.hotkey_held, "panel visibility updated");
        self.state = next;
        Some(transition)
    }

    /// The hover arm delay ran out. Shows the panel only if the pointer is
    /// still on the trigger.
    pub fn hover_elapsed(&mut self, pointer_on_trigger: bool) -> Option<Transition> {
        if pointer_on_trigger {
            self.apply(Transition::Show, "hover")
        } else {
            None
        }
    }

    pub fn hotkey_pressed(&mut self) -> Option<Transition> {
        self.hotkey_held = true;
        self.apply(Transition::Show, "hotkey pressed")
    }

    pub fn hotkey_released(&mut self) -> Option<Transition> {
        self.hotkey_held = false;
        if self.pinned {
            None
        } else {
            self.apply(Transition::Hide, "hotkey released")
        }
    }

    /// Flip the pin latch. Pinning a hidden panel shows it; unpinning leaves
    /// the decision to the next reconciliation tick.
    pub fn toggle_pin(&mut self) -> Option<Transition> {
        self.pinned = !self.pinned;
        tracing::debug!(pinned = self.pinned, "pin toggled");
        if self.pinned {
            self.apply(Transition::Show, "pinned")
        } else {
            None
        }
    }

    pub fn set_pinned(&mut self, pinned: bool) -> Option<Transition> {
        if pinned != self.pinned {
            self.toggle_pin()
        } else {
            None
        }
    }

    /// Explicit show, used after a drag ends while pinned.
    pub fn show(&mut self, reason: &'static str) -> Option<Transition> {
        self.apply(Transition::Show, reason)
    }

    /// Hide regardless of latches; the trigger is about to move.
    pub fn drag_started(&mut self) -> Option<Transition> {
        self.apply(Transition::Hide, "drag started")
    }

    /// Periodic check that hides a visible panel once nothing holds it open.
    /// An unknown cursor position never hides the panel.
    pub fn reconcile(
        &mut self,
        cursor: Option<Point>,
        trigger: Rect,
        panel: Option<Rect>,
    ) -> Option<Transition> {
        if !self.is_visible() || self.pinned || self.hotkey_held {
            return None;
        }
        let cursor = cursor?;
        let over_trigger = trigger.contains(cursor);
        let over_panel = panel.map(|r| r.contains(cursor)).unwrap_or(false);
        if over_trigger || over_panel {
            None
        } else {
            self.apply(Transition::Hide, "cursor outside trigger and panel")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: Rect = Rect::new(1890, 510, 30, 60);
    const PANEL: Rect = Rect::new(1560, 440, 320, 200);

    #[test]
    fn hover_only_shows_when_pointer_remains() {
        let mut vis = VisibilityController::default();
        assert_eq!(vis.hover_elapsed(false), None);
        assert!(!vis.is_visible());
        assert_eq!(vis.hover_elapsed(true), Some(Transition::Show));
        assert!(vis.is_visible());
    }

    #[test]
    fn hotkey_press_and_release() {
        let mut vis = VisibilityController::default();
        assert_eq!(vis.hotkey_pressed(), Some(Transition::Show));
        assert!(vis.hotkey_held());
        assert_eq!(vis.hotkey_released(), Some(Transition::Hide));
        assert!(!vis.hotkey_held());
    }

    #[test]
    fn hotkey_release_keeps_pinned_panel() {
        let mut vis = VisibilityController::default();
        vis.toggle_pin();
        vis.hotkey_pressed();
        assert_eq!(vis.hotkey_released(), None);
        assert!(vis.is_visible());
    }

    #[test]
    fn pin_on_shows_and_pin_off_defers() {
        let mut vis = VisibilityController::default();
        assert_eq!(vis.toggle_pin(), Some(Transition::Show));
        assert_eq!(vis.toggle_pin(), None);
        assert!(vis.is_visible());
        assert!(!vis.pinned());
        let outside = Some(Point::new(10, 10));
        assert_eq!(
            vis.reconcile(outside, TRIGGER, Some(PANEL)),
            Some(Transition::Hide)
        );
    }

    #[test]
    fn reconcile_keeps_panel_while_cursor_inside_either_rect() {
        let mut vis = VisibilityController::default();
        vis.hover_elapsed(true);
        assert_eq!(vis.reconcile(Some(Point::new(1900, 520)), TRIGGER, Some(PANEL)), None);
        assert_eq!(vis.reconcile(Some(Point::new(1600, 500)), TRIGGER, Some(PANEL)), None);
        assert_eq!(vis.reconcile(None, TRIGGER, Some(PANEL)), None);
        assert!(vis.is_visible());
    }

    #[test]
    fn reconcile_respects_latches() {
        let mut vis = VisibilityController::default();
        vis.hotkey_pressed();
        assert_eq!(vis.reconcile(Some(Point::new(0, 0)), TRIGGER, Some(PANEL)), None);
        vis.hotkey_released();
        vis.toggle_pin();
        assert_eq!(vis.reconcile(Some(Point::new(0, 0)), TRIGGER, Some(PANEL)), None);
    }

    #[test]
    fn drag_start_hides_even_when_pinned() {
        let mut vis = VisibilityController::default();
        vis.toggle_pin();
        assert_eq!(vis.drag_started(), Some(Transition::Hide));
        assert!(vis.pinned());
    }
}
