use std::fs;
use std::time::Instant;

use tarrow::controller::OverlayController;
use tarrow::geometry::{Edge, Rect, Screen};
use tarrow::settings::{settings_path_in, OverlaySettings, SETTINGS_FILE_NAME};

fn single() -> Vec<Screen> {
    vec![Screen::new("DISPLAY1", Rect::new(0, 0, 1920, 1080)).with_primary(true)]
}

#[test]
fn path_uses_dotfile_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = settings_path_in(dir.path());
    assert_eq!(path.file_name().unwrap(), SETTINGS_FILE_NAME);
}

#[test]
fn out_of_range_values_are_clamped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = settings_path_in(dir.path());
    fs::write(
        &path,
        r#"{"edge":"top","edge_position":3.5,"update_interval":0.01,"overlay_opacity":0.0,"alert_threshold":250}"#,
    )
    .unwrap();
    let s = OverlaySettings::load_from(&path).unwrap();
    assert_eq!(s.edge, Edge::Top);
    assert_eq!(s.edge_position, 1.0);
    assert_eq!(s.update_interval, 0.5);
    assert_eq!(s.overlay_opacity, 0.3);
    assert_eq!(s.alert_threshold, 100.0);
}

#[test]
fn malformed_file_yields_defaults_and_is_rewritten_on_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = settings_path_in(dir.path());
    fs::write(&path, "{ not json").unwrap();
    let settings = OverlaySettings::load_or_default(&path);
    assert_eq!(settings, OverlaySettings::default());

    let mut c = OverlayController::new(settings, single(), Some(path.clone()), Instant::now());
    c.update_settings(|s| s.show_history = true);
    let reloaded = OverlaySettings::load_from(&path).unwrap();
    assert!(reloaded.show_history);
    assert_eq!(reloaded.screen_name, "DISPLAY1");
}

#[test]
fn unwritable_path_does_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").unwrap();
    // Parent is a regular file, so every save fails.
    let path = blocker.join("settings.json");
    let mut c = OverlayController::new(OverlaySettings::default(), single(), Some(path.clone()), Instant::now());
    c.update_settings(|s| s.show_cpu = false);
    c.shutdown();
    assert!(!c.settings().show_cpu);
    assert!(!path.exists());
}
