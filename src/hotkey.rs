use crate::geometry::Point;
use rdev::{listen, EventType, Key};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotkey {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Default for Hotkey {
    fn default() -> Self {
        Self {
            key: Key::F9,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }
}

impl std::fmt::Display for Hotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        write!(f, "{}", key_name(self.key).unwrap_or("?"))
    }
}

const KEY_NAMES: &[(&str, Key)] = &[
    ("Space", Key::Space),
    ("Tab", Key::Tab),
    ("Enter", Key::Return),
    ("Escape", Key::Escape),
    ("Delete", Key::Delete),
    ("Backspace", Key::Backspace),
    ("CapsLock", Key::CapsLock),
    ("Insert", Key::Insert),
    ("Home", Key::Home),
    ("End", Key::End),
    ("PageUp", Key::PageUp),
    ("PageDown", Key::PageDown),
    ("Left", Key::LeftArrow),
    ("Right", Key::RightArrow),
    ("Up", Key::UpArrow),
    ("Down", Key::DownArrow),
    ("PrintScreen", Key::PrintScreen),
    ("ScrollLock", Key::ScrollLock),
    ("Pause", Key::Pause),
    ("F1", Key::F1),
    ("F2", Key::F2),
    ("F3", Key::F3),
    ("F4", Key::F4),
    ("F5", Key::F5),
    ("F6", Key::F6),
    ("F7", Key::F7),
    ("F8", Key::F8),
    ("F9", Key::F9),
    ("F10", Key::F10),
    ("F11", Key::F11),
    ("F12", Key::F12),
    ("0", Key::Num0),
    ("1", Key::Num1),
    ("2", Key::Num2),
    ("3", Key::Num3),
    ("4", Key::Num4),
    ("5", Key::Num5),
    ("6", Key::Num6),
    ("7", Key::Num7),
    ("8", Key::Num8),
    ("9", Key::Num9),
    ("A", Key::KeyA),
    ("B", Key::KeyB),
    ("C", Key::KeyC),
    ("D", Key::KeyD),
    ("E", Key::KeyE),
    ("F", Key::KeyF),
    ("G", Key::KeyG),
    ("H", Key::KeyH),
    ("I", Key::KeyI),
    ("J", Key::KeyJ),
    ("K", Key::KeyK),
    ("L", Key::KeyL),
    ("M", Key::KeyM),
    ("N", Key::KeyN),
    ("O", Key::KeyO),
    ("P", Key::KeyP),
    ("Q", Key::KeyQ),
    ("R", Key::KeyR),
    ("S", Key::KeyS),
    ("T", Key::KeyT),
    ("U", Key::KeyU),
    ("V", Key::KeyV),
    ("W", Key::KeyW),
    ("X", Key::KeyX),
    ("Y", Key::KeyY),
    ("Z", Key::KeyZ),
];

/// Canonical name for a key, as written to the settings file.
pub fn key_name(key: Key) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(name, _)| *name)
}

fn parse_key(upper: &str) -> Option<Key> {
    let canonical = match upper {
        "RETURN" => "ENTER",
        "ESC" => "ESCAPE",
        "LEFTARROW" => "LEFT",
        "RIGHTARROW" => "RIGHT",
        "UPARROW" => "UP",
        "DOWNARROW" => "DOWN",
        "INS" => "INSERT",
        other => other,
    };
    KEY_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(canonical))
        .map(|(_, key)| *key)
}

/// Parse a hotkey string like "Ctrl+Shift+F9" into a [`Hotkey`].
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" => alt = true,
            "" => {}
            _ => key = Some(parse_key(&upper)?),
        }
    }

    key.map(|key| Hotkey {
        key,
        ctrl,
        shift,
        alt,
    })
}

fn is_modifier(key: Key) -> bool {
    matches!(
        key,
        Key::ControlLeft
            | Key::ControlRight
            | Key::ShiftLeft
            | Key::ShiftRight
            | Key::Alt
            | Key::AltGr
            | Key::MetaLeft
            | Key::MetaRight
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyEvent {
    Pressed,
    Released,
    /// The next key after [`HotkeyControl::capture`], by name.
    Captured(String),
}

/// Latest global pointer position seen by the input listener.
#[derive(Debug, Default)]
pub struct CursorTracker {
    x: AtomicI32,
    y: AtomicI32,
    known: AtomicBool,
}

impl CursorTracker {
    pub fn record(&self, point: Point) {
        self.x.store(point.x, Ordering::Relaxed);
        self.y.store(point.y, Ordering::Relaxed);
        self.known.store(true, Ordering::Release);
    }

    pub fn get(&self) -> Option<Point> {
        if !self.known.load(Ordering::Acquire) {
            return None;
        }
        Some(Point::new(
            self.x.load(Ordering::Relaxed),
            self.y.load(Ordering::Relaxed),
        ))
    }
}

/// Key state tracked by the listener callback. Kept apart from the thread
/// so it can be driven directly.
#[derive(Debug, Default)]
pub struct KeyState {
    ctrl: bool,
    shift: bool,
    alt: bool,
    watch: bool,
    triggered: bool,
}

impl KeyState {
    pub fn handle(&mut self, event: &EventType, hotkey: &Hotkey, capture: &AtomicBool) -> Option<HotkeyEvent> {
        match *event {
            EventType::KeyPress(k) => {
                match k {
                    Key::ControlLeft | Key::ControlRight => self.ctrl = true,
                    Key::ShiftLeft | Key::ShiftRight => self.shift = true,
                    Key::Alt | Key::AltGr => self.alt = true,
                    _ => {}
                }
                if !is_modifier(k) && capture.swap(false, Ordering::SeqCst) {
                    let name = match key_name(k) {
                        Some(name) => name.to_string(),
                        None => format!("{k:?}"),
                    };
                    tracing::info!(key = %name, "hotkey captured");
                    return Some(HotkeyEvent::Captured(name));
                }
                if k == hotkey.key {
                    self.watch = true;
                }
            }
            EventType::KeyRelease(k) => {
                match k {
                    Key::ControlLeft | Key::ControlRight => self.ctrl = false,
                    Key::ShiftLeft | Key::ShiftRight => self.shift = false,
                    Key::Alt | Key::AltGr => self.alt = false,
                    _ => {}
                }
                if k == hotkey.key {
                    self.watch = false;
                }
            }
            _ => return None,
        }

        let combo = self.watch
            && (!hotkey.ctrl || self.ctrl)
            && (!hotkey.shift || self.shift)
            && (!hotkey.alt || self.alt);
        if combo && !self.triggered {
            self.triggered = true;
            tracing::debug!(hotkey = %hotkey, "hotkey pressed");
            Some(HotkeyEvent::Pressed)
        } else if !combo && self.triggered {
            self.triggered = false;
            tracing::debug!(hotkey = %hotkey, "hotkey released");
            Some(HotkeyEvent::Released)
        } else {
            None
        }
    }
}

/// Handle to the running listener.
#[derive(Clone)]
pub struct HotkeyControl {
    hotkey: Arc<Mutex<Hotkey>>,
    capture: Arc<AtomicBool>,
    cursor: Arc<CursorTracker>,
}

impl HotkeyControl {
    /// Consume the next non-modifier key press as a rebinding input.
    pub fn capture(&self) {
        self.capture.store(true, Ordering::SeqCst);
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.load(Ordering::SeqCst)
    }

    pub fn set_hotkey(&self, hotkey: Hotkey) {
        if let Ok(mut guard) = self.hotkey.lock() {
            tracing::info!(hotkey = %hotkey, "hotkey rebound");
            *guard = hotkey;
        }
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor.get()
    }
}

/// Global keyboard/mouse listener on its own thread.
pub struct HotkeyListener;

impl HotkeyListener {
    pub fn start(hotkey: Hotkey) -> anyhow::Result<(HotkeyControl, Receiver<HotkeyEvent>)> {
        let control = HotkeyControl {
            hotkey: Arc::new(Mutex::new(hotkey)),
            capture: Arc::new(AtomicBool::new(false)),
            cursor: Arc::new(CursorTracker::default()),
        };
        let (tx, rx) = channel();
        let thread_control = control.clone();
        tracing::debug!(hotkey = %hotkey, "starting hotkey listener");
        thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || listen_loop(thread_control, tx))
            .map_err(|e| anyhow::anyhow!("spawn hotkey listener thread: {e}"))?;
        Ok((control, rx))
    }
}

fn listen_loop(control: HotkeyControl, tx: Sender<HotkeyEvent>) {
    loop {
        let mut state = KeyState::default();
        let callback_control = control.clone();
        let callback_tx = tx.clone();
        let result = listen(move |event| {
            if let EventType::MouseMove { x, y } = event.event_type {
                callback_control
                    .cursor
                    .record(Point::new(x.round() as i32, y.round() as i32));
                return;
            }
            let hotkey = match callback_control.hotkey.lock() {
                Ok(guard) => *guard,
                Err(_) => return,
            };
            if let Some(out) = state.handle(&event.event_type, &hotkey, &callback_control.capture) {
                let _ = callback_tx.send(out);
            }
        });

        match result {
            Ok(()) => tracing::warn!("hotkey listener exited unexpectedly; restarting shortly"),
            Err(e) => tracing::warn!("hotkey listener failed: {:?}; retrying shortly", e),
        }
        thread::sleep(Duration::from_millis(500));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_roundtrip() {
        for (name, key) in KEY_NAMES {
            assert_eq!(key_name(*key), Some(*name));
            assert_eq!(parse_hotkey(name).map(|h| h.key), Some(*key));
        }
    }

    #[test]
    fn display_matches_parse_input() {
        let hk = parse_hotkey("ctrl+shift+f9").expect("parse");
        assert_eq!(hk.to_string(), "Ctrl+Shift+F9");
    }

    #[test]
    fn held_key_reports_press_once_then_release() {
        let hotkey = Hotkey::default();
        let capture = AtomicBool::new(false);
        let mut state = KeyState::default();
        assert_eq!(
            state.handle(&EventType::KeyPress(Key::F9), &hotkey, &capture),
            Some(HotkeyEvent::Pressed)
        );
        // Auto-repeat.
        assert_eq!(state.handle(&EventType::KeyPress(Key::F9), &hotkey, &capture), None);
        assert_eq!(
            state.handle(&EventType::KeyRelease(Key::F9), &hotkey, &capture),
            Some(HotkeyEvent::Released)
        );
    }

    #[test]
    fn modifiers_are_required() {
        let hotkey = parse_hotkey("Ctrl+S").expect("parse");
        let capture = AtomicBool::new(false);
        let mut state = KeyState::default();
        assert_eq!(state.handle(&EventType::KeyPress(Key::KeyS), &hotkey, &capture), None);
        state.handle(&EventType::KeyRelease(Key::KeyS), &hotkey, &capture);
        state.handle(&EventType::KeyPress(Key::ControlLeft), &hotkey, &capture);
        assert_eq!(
            state.handle(&EventType::KeyPress(Key::KeyS), &hotkey, &capture),
            Some(HotkeyEvent::Pressed)
        );
        assert_eq!(
            state.handle(&EventType::KeyRelease(Key::ControlLeft), &hotkey, &capture),
            Some(HotkeyEvent::Released)
        );
    }

    #[test]
    fn capture_consumes_next_key_once() {
        let hotkey = Hotkey::default();
        let capture = AtomicBool::new(true);
        let mut state = KeyState::default();
        assert_eq!(state.handle(&EventType::KeyPress(Key::ShiftLeft), &hotkey, &capture), None);
        assert_eq!(
            state.handle(&EventType::KeyPress(Key::F9), &hotkey, &capture),
            Some(HotkeyEvent::Captured("F9".into()))
        );
        assert!(!capture.load(Ordering::SeqCst));
        assert_eq!(
            state.handle(&EventType::KeyPress(Key::F9), &hotkey, &capture),
            Some(HotkeyEvent::Pressed)
        );
    }

    #[test]
    fn cursor_tracker_starts_unknown() {
        let tracker = CursorTracker::default();
        assert_eq!(tracker.get(), None);
        tracker.record(Point::new(-5, 12));
        assert_eq!(tracker.get(), Some(Point::new(-5, 12)));
    }
}
