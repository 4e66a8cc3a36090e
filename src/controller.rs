//! Single owner of the overlay's mutable state.
//!
//! Everything here runs on the UI loop: input events, timer ticks and stats
//! hand-offs are all plain method calls taking the current `Instant`, so
//! nothing can fire concurrently.

use crate::alert::{AlertAnimator, AlertEdge, BREATHING_PERIOD};
use crate::dock::{pin_badge_rect, DockState};
use crate::drag::{DragSession, Preview};
use crate::geometry::{
    place_panel, resolve, screen_for_point, Edge, Point, Rect, Screen, Size,
};
use crate::hotkey::{parse_hotkey, Hotkey, HotkeyEvent};
use crate::panel::panel_size;
use crate::scheduler::{Scheduler, TaskKind};
use crate::settings::{DisplayFlags, OverlaySettings};
use crate::stats::StatsSnapshot;
use crate::visibility::{PanelVisibility, Transition, VisibilityController};
use crate::worker::StatsMessage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const HOVER_DELAY: Duration = Duration::from_millis(300);
pub const RECONCILE_PERIOD: Duration = Duration::from_millis(100);
pub const COMPACT_HUD_SIZE: Size = Size::new(140, 48);

/// The compact HUD does not breathe; only the docked arrow renders the alert.
pub const COMPACT_RENDERS_ALERT: bool = false;

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone)]
pub struct FrameView {
    pub trigger: Rect,
    pub edge: Edge,
    pub compact: bool,
    pub expanded: bool,
    pub pinned: bool,
    pub pin_badge: Option<Rect>,
    pub panel: Option<Rect>,
    pub preview: Option<Preview>,
    /// Breathing opacity while the alert is active and rendered.
    pub alert_opacity: Option<f32>,
    pub loading: bool,
    pub snapshot: Option<Arc<StatsSnapshot>>,
    pub flags: DisplayFlags,
    pub opacity: f32,
}

/// Side effects a settings edit requires outside the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsChange {
    pub interval: Option<f32>,
    pub hotkey: Option<Hotkey>,
}

pub struct OverlayController {
    settings: OverlaySettings,
    settings_path: Option<PathBuf>,
    screens: Vec<Screen>,
    dock: DockState,
    drag: DragSession,
    compact_grab: Point,
    visibility: VisibilityController,
    alert: AlertAnimator,
    scheduler: Scheduler,
    pointer_on_trigger: bool,
    hover_expanded: bool,
    cursor: Option<Point>,
    panel_rect: Option<Rect>,
    latest: Option<Arc<StatsSnapshot>>,
    loading: bool,
    arrow_suppressed: bool,
}

impl OverlayController {
    /// `settings_path` of `None` keeps everything in memory.
    pub fn new(
        mut settings: OverlaySettings,
        screens: Vec<Screen>,
        settings_path: Option<PathBuf>,
        now: Instant,
    ) -> Self {
        settings.sanitize();
        let dock = DockState::load(
            Some(settings.screen_name.as_str()),
            settings.edge,
            settings.edge_position,
            &screens,
        );
        let mut scheduler = Scheduler::new();
        scheduler.schedule_every(TaskKind::Reconcile, now, RECONCILE_PERIOD);
        let alert = AlertAnimator::new(settings.alert_threshold);
        tracing::info!(
            screen = dock.screen(),
            edge = %dock.edge(),
            position = dock.position(),
            compact = settings.compact_mode,
            "overlay controller ready"
        );
        Self {
            settings,
            settings_path,
            screens,
            dock,
            drag: DragSession::default(),
            compact_grab: Point::default(),
            visibility: VisibilityController::default(),
            alert,
            scheduler,
            pointer_on_trigger: false,
            hover_expanded: false,
            cursor: None,
            panel_rect: None,
            latest: None,
            loading: true,
            arrow_suppressed: false,
        }
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn dock(&self) -> &DockState {
        &self.dock
    }

    pub fn visibility(&self) -> PanelVisibility {
        self.visibility.state()
    }

    pub fn pinned(&self) -> bool {
        self.visibility.pinned()
    }

    pub fn alert(&self) -> &AlertAnimator {
        &self.alert
    }

    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.scheduler.is_scheduled(kind)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    pub fn pointer_on_trigger(&self) -> bool {
        self.pointer_on_trigger
    }

    pub fn hover_expanded(&self) -> bool {
        self.hover_expanded
    }

    pub fn panel_rect(&self) -> Option<Rect> {
        self.panel_rect
    }

    pub fn arrow_suppressed(&self) -> bool {
        self.arrow_suppressed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn set_screens(&mut self, screens: Vec<Screen>) {
        if screens == self.screens {
            return;
        }
        tracing::debug!(count = screens.len(), "screen layout changed");
        self.screens = screens;
        if self.visibility.is_visible() {
            self.panel_rect = self.compute_panel_rect();
        }
    }

    fn compact_rect(&self) -> Rect {
        let (x, y) = self.settings.compact_hud_pos;
        Rect::from_origin_size(Point::new(x, y), COMPACT_HUD_SIZE)
    }

    pub fn trigger_rect(&self) -> Option<Rect> {
        if self.settings.compact_mode {
            Some(self.compact_rect())
        } else {
            self.dock.trigger_rect(&self.screens, self.hover_expanded)
        }
    }

    /// Edge the panel opens away from.
    fn trigger_edge(&self) -> Edge {
        if self.settings.compact_mode {
            resolve(self.compact_rect().center(), &self.screens)
                .map(|p| p.edge)
                .unwrap_or_default()
        } else {
            self.dock.edge()
        }
    }

    fn work_area(&self) -> Option<Rect> {
        let screen = if self.settings.compact_mode {
            screen_for_point(&self.screens, self.compact_rect().center())
        } else {
            self.dock.resolve_screen(&self.screens)
        };
        screen.map(|s| s.work_area)
    }

    /// Trigger rect the panel is anchored to. Always the collapsed size so
    /// hover expansion never shifts a visible panel.
    fn anchor_rect(&self) -> Option<Rect> {
        if self.settings.compact_mode {
            Some(self.compact_rect())
        } else {
            self.dock.trigger_rect(&self.screens, false)
        }
    }

    fn compute_panel_rect(&self) -> Option<Rect> {
        let trigger = self.anchor_rect()?;
        let work_area = self.work_area()?;
        let size = panel_size(
            &self.settings.display_flags(),
            self.latest.as_deref(),
            self.loading,
        );
        Some(place_panel(trigger, self.trigger_edge(), size, work_area))
    }

    fn apply(&mut self, transition: Option<Transition>) {
        match transition {
            Some(Transition::Show) => self.panel_rect = self.compute_panel_rect(),
            Some(Transition::Hide) => self.panel_rect = None,
            None => {}
        }
    }

    pub fn pointer_entered_trigger(&mut self, now: Instant) {
        if self.pointer_on_trigger {
            return;
        }
        self.pointer_on_trigger = true;
        self.hover_expanded = true;
        if !self.drag.is_active() {
            self.scheduler.schedule_once(TaskKind::Hover, now, HOVER_DELAY);
        }
    }

    pub fn pointer_left_trigger(&mut self, _now: Instant) {
        self.pointer_on_trigger = false;
        self.scheduler.cancel(TaskKind::Hover);
        if !self.drag.is_active() {
            self.hover_expanded = false;
        }
    }

    pub fn pointer_moved(&mut self, point: Point) {
        self.cursor = Some(point);
        if self.drag.is_active() && !self.settings.compact_mode {
            self.drag.update(point, &self.screens);
        }
    }

    /// Primary button on the trigger toggles the pin latch.
    pub fn primary_clicked(&mut self, _now: Instant) {
        if self.drag.is_active() {
            return;
        }
        let transition = self.visibility.toggle_pin();
        self.apply(transition);
    }

    pub fn secondary_pressed(&mut self, point: Point, _now: Instant) {
        self.cursor = Some(point);
        if !self.drag.begin(point, &self.screens) {
            return;
        }
        if self.settings.compact_mode {
            let origin = self.compact_rect().origin();
            self.compact_grab = Point::new(point.x - origin.x, point.y - origin.y);
        } else {
            self.hover_expanded = true;
        }
        self.scheduler.cancel(TaskKind::Hover);
        let transition = self.visibility.drag_started();
        self.apply(transition);
    }

    /// Top-left corner the compact HUD gets when released at `point`.
    fn compact_target(&self, point: Point) -> Rect {
        let origin = Point::new(point.x - self.compact_grab.x, point.y - self.compact_grab.y);
        let rect = Rect::from_origin_size(origin, COMPACT_HUD_SIZE);
        match screen_for_point(&self.screens, point) {
            Some(screen) => rect.clamped_into(screen.geometry),
            None => rect,
        }
    }

    pub fn secondary_released(&mut self, point: Point, now: Instant) {
        self.cursor = Some(point);
        if !self.drag.is_active() {
            return;
        }
        let placement = self.drag.finish(point, &self.screens);
        if self.settings.compact_mode {
            let target = self.compact_target(point);
            self.settings.compact_hud_pos = (target.x, target.y);
        } else {
            match placement {
                Some(placement) => {
                    self.dock.commit(placement);
                }
                None => tracing::warn!("drag released with no screens attached; dock unchanged"),
            }
        }
        self.persist();

        if self.visibility.pinned() {
            let transition = self.visibility.show("drag finished while pinned");
            self.apply(transition);
        }

        let still_over = self
            .trigger_rect()
            .map(|r| r.contains(point))
            .unwrap_or(false);
        self.pointer_on_trigger = still_over;
        if still_over {
            self.hover_expanded = !self.settings.compact_mode;
            self.scheduler.schedule_once(TaskKind::Hover, now, HOVER_DELAY);
        } else {
            self.hover_expanded = false;
            self.scheduler.cancel(TaskKind::Hover);
        }
    }

    /// Returns the new binding when a capture completed.
    pub fn handle_hotkey(&mut self, event: HotkeyEvent, _now: Instant) -> Option<Hotkey> {
        match event {
            HotkeyEvent::Pressed => {
                let transition = self.visibility.hotkey_pressed();
                self.apply(transition);
                None
            }
            HotkeyEvent::Released => {
                let transition = self.visibility.hotkey_released();
                self.apply(transition);
                None
            }
            HotkeyEvent::Captured(name) => {
                let hotkey = parse_hotkey(&name)?;
                self.settings.hotkey = hotkey.to_string();
                self.persist();
                Some(hotkey)
            }
        }
    }

    pub fn receive_stats(&mut self, message: StatsMessage, now: Instant) {
        match message {
            StatsMessage::Snapshot(snapshot) => {
                match self.alert.observe(snapshot.cpu_percent, snapshot.memory.percent) {
                    Some(AlertEdge::Raised) => {
                        self.scheduler
                            .schedule_every(TaskKind::Breathing, now, BREATHING_PERIOD);
                        self.arrow_suppressed = self.settings.compact_mode;
                    }
                    Some(AlertEdge::Cleared) => {
                        self.scheduler.cancel(TaskKind::Breathing);
                        self.arrow_suppressed = false;
                    }
                    None => {}
                }
                self.latest = Some(snapshot);
                if self.visibility.is_visible() {
                    self.panel_rect = self.compute_panel_rect();
                }
            }
            StatsMessage::FirstLoad => {
                if self.loading {
                    tracing::debug!("first stats snapshot ready");
                    self.loading = false;
                    if self.visibility.is_visible() {
                        self.panel_rect = self.compute_panel_rect();
                    }
                }
            }
        }
    }

    /// Run every timer due at `now`. `cursor` is the freshest global pointer
    /// position, if the platform can provide one.
    pub fn tick(&mut self, now: Instant, cursor: Option<Point>) {
        if cursor.is_some() {
            self.cursor = cursor;
        }
        for kind in self.scheduler.take_due(now) {
            match kind {
                TaskKind::Hover => {
                    let transition = self.visibility.hover_elapsed(self.pointer_on_trigger);
                    self.apply(transition);
                }
                TaskKind::Breathing => {
                    self.alert.tick();
                }
                TaskKind::Reconcile => {
                    if let Some(trigger) = self.trigger_rect() {
                        let transition =
                            self.visibility
                                .reconcile(self.cursor, trigger, self.panel_rect);
                        self.apply(transition);
                    }
                }
            }
        }
    }

    /// Apply a settings edit, persist it and report what the caller must
    /// forward to other threads.
    pub fn update_settings<F>(&mut self, edit: F) -> SettingsChange
    where
        F: FnOnce(&mut OverlaySettings),
    {
        let before = self.settings.clone();
        edit(&mut self.settings);
        self.settings.sanitize();

        let mut change = SettingsChange::default();
        if self.settings.update_interval != before.update_interval {
            change.interval = Some(self.settings.update_interval);
        }
        if self.settings.hotkey != before.hotkey {
            match parse_hotkey(&self.settings.hotkey) {
                Some(hotkey) => change.hotkey = Some(hotkey),
                None => {
                    tracing::warn!(hotkey = %self.settings.hotkey, "invalid hotkey; keeping previous binding");
                    self.settings.hotkey = before.hotkey.clone();
                }
            }
        }
        if self.settings.alert_threshold != before.alert_threshold {
            self.alert.set_threshold(self.settings.alert_threshold);
        }
        if self.settings.compact_mode != before.compact_mode {
            self.drag.cancel();
            self.hover_expanded = false;
            self.arrow_suppressed = self.settings.compact_mode && self.alert.active();
        }
        if self.settings != before {
            if self.visibility.is_visible() {
                self.panel_rect = self.compute_panel_rect();
            }
            self.persist();
        }
        change
    }

    fn sync_dock_into_settings(&mut self) {
        self.settings.screen_name = self.dock.screen().to_string();
        self.settings.edge = self.dock.edge();
        self.settings.edge_position = self.dock.position();
    }

    /// Write settings to disk. Failures are logged and otherwise ignored.
    pub fn persist(&mut self) {
        self.sync_dock_into_settings();
        let Some(path) = self.settings_path.as_ref() else {
            return;
        };
        if let Err(e) = self.settings.save_to(path) {
            tracing::warn!("failed to save settings: {e:#}");
        }
    }

    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        self.persist();
        tracing::info!("overlay controller shut down");
    }

    pub fn view(&self) -> Option<FrameView> {
        let trigger = self.trigger_rect()?;
        let edge = self.trigger_edge();
        let compact = self.settings.compact_mode;
        let pinned = self.visibility.pinned();
        let preview = if !self.drag.is_active() {
            None
        } else if compact {
            let point = self.cursor.or_else(|| self.drag.start_point())?;
            Some(Preview {
                rect: self.compact_target(point),
                edge,
            })
        } else {
            self.drag.preview(&self.screens)
        };
        let alert_opacity = if self.alert.active() && (!compact || COMPACT_RENDERS_ALERT) {
            Some(self.alert.phase())
        } else {
            None
        };
        Some(FrameView {
            trigger,
            edge,
            compact,
            expanded: self.hover_expanded,
            pinned,
            pin_badge: pinned.then(|| pin_badge_rect(trigger, edge)),
            panel: self.panel_rect,
            preview,
            alert_opacity,
            loading: self.loading,
            snapshot: self.latest.clone(),
            flags: self.settings.display_flags(),
            opacity: self.settings.overlay_opacity,
        })
    }
}
