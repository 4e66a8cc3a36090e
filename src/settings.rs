use crate::geometry::Edge;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = ".system_monitor_settings.json";

pub const INTERVAL_RANGE: (f32, f32) = (0.5, 10.0);
pub const OPACITY_RANGE: (f32, f32) = (0.3, 1.0);
pub const THRESHOLD_RANGE: (f32, f32) = (50.0, 100.0);

/// Everything that survives a restart. Missing keys take their defaults so
/// files written by older versions keep loading.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OverlaySettings {
    /// Name of the screen the trigger is docked to.
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub edge: Edge,
    /// Normalised position along the edge, 0 at the left/top end.
    #[serde(default = "default_edge_position")]
    pub edge_position: f64,
    /// Replace the docked arrow with a free-floating HUD.
    #[serde(default)]
    pub compact_mode: bool,
    #[serde(default = "default_compact_hud_pos")]
    pub compact_hud_pos: (i32, i32),
    #[serde(default = "default_true")]
    pub show_cpu: bool,
    #[serde(default = "default_true")]
    pub show_ram: bool,
    #[serde(default = "default_true")]
    pub show_disk: bool,
    #[serde(default = "default_true")]
    pub show_temp: bool,
    #[serde(default = "default_true")]
    pub show_graphs: bool,
    #[serde(default = "default_true")]
    pub show_processes: bool,
    #[serde(default)]
    pub show_history: bool,
    /// Seconds between stats samples.
    #[serde(default = "default_update_interval")]
    pub update_interval: f32,
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f32,
    /// CPU or memory percentage at which the breathing alert starts.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f32,
    /// Key name for the hold-to-show hotkey, e.g. `F9` or `Ctrl+Shift+S`.
    #[serde(default = "default_hotkey")]
    pub hotkey: String,
    /// When enabled the logger starts at debug level.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_true() -> bool {
    true
}

fn default_edge_position() -> f64 {
    0.5
}

fn default_compact_hud_pos() -> (i32, i32) {
    (100, 100)
}

fn default_update_interval() -> f32 {
    2.0
}

fn default_overlay_opacity() -> f32 {
    1.0
}

fn default_alert_threshold() -> f32 {
    crate::alert::DEFAULT_THRESHOLD
}

fn default_hotkey() -> String {
    "F9".into()
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            screen_name: String::new(),
            edge: Edge::Right,
            edge_position: default_edge_position(),
            compact_mode: false,
            compact_hud_pos: default_compact_hud_pos(),
            show_cpu: true,
            show_ram: true,
            show_disk: true,
            show_temp: true,
            show_graphs: true,
            show_processes: true,
            show_history: false,
            update_interval: default_update_interval(),
            overlay_opacity: default_overlay_opacity(),
            alert_threshold: default_alert_threshold(),
            hotkey: default_hotkey(),
            debug_logging: false,
        }
    }
}

fn clamp_or(value: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

/// The boolean switches the panel renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    pub show_cpu: bool,
    pub show_ram: bool,
    pub show_disk: bool,
    pub show_temp: bool,
    pub show_graphs: bool,
    pub show_processes: bool,
    pub show_history: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        OverlaySettings::default().display_flags()
    }
}

impl OverlaySettings {
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut loaded: Self = serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))?;
        loaded.sanitize();
        Ok(loaded)
    }

    /// Load settings, replacing anything unreadable with defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("failed to load settings: {e:#}; using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))
    }

    /// Pull every numeric field back into its allowed range.
    pub fn sanitize(&mut self) {
        self.edge_position = if self.edge_position.is_finite() {
            self.edge_position.clamp(0.0, 1.0)
        } else {
            default_edge_position()
        };
        self.update_interval =
            clamp_or(self.update_interval, INTERVAL_RANGE, default_update_interval());
        self.overlay_opacity =
            clamp_or(self.overlay_opacity, OPACITY_RANGE, default_overlay_opacity());
        self.alert_threshold =
            clamp_or(self.alert_threshold, THRESHOLD_RANGE, default_alert_threshold());
    }

    pub fn display_flags(&self) -> DisplayFlags {
        DisplayFlags {
            show_cpu: self.show_cpu,
            show_ram: self.show_ram,
            show_disk: self.show_disk,
            show_temp: self.show_temp,
            show_graphs: self.show_graphs,
            show_processes: self.show_processes,
            show_history: self.show_history,
        }
    }
}

pub fn settings_path_in(home: &Path) -> PathBuf {
    home.join(SETTINGS_FILE_NAME)
}

/// Settings file in the user's home directory, or the working directory when
/// no home can be resolved.
pub fn default_settings_path() -> PathBuf {
    match dirs_next::home_dir() {
        Some(home) => settings_path_in(&home),
        None => {
            tracing::warn!("home directory unavailable; keeping settings in the working directory");
            PathBuf::from(SETTINGS_FILE_NAME)
        }
    }
}
