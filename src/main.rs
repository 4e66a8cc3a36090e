use tarrow::controller::OverlayController;
use tarrow::gui::OverlayApp;
use tarrow::hotkey::{parse_hotkey, HotkeyListener};
use tarrow::logging;
use tarrow::screens;
use tarrow::settings::{default_settings_path, OverlaySettings};
use tarrow::stats::SysinfoSource;
use tarrow::worker::StatsWorker;

use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;

fn log_dir() -> Option<PathBuf> {
    let dir = dirs_next::data_local_dir()?.join("tarrow");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

fn main() -> anyhow::Result<()> {
    let settings_path = default_settings_path();
    let loaded = OverlaySettings::load_from(&settings_path);
    let debug = loaded.as_ref().map(|s| s.debug_logging).unwrap_or(false);
    let _log_guard = logging::init(debug, log_dir().as_deref());

    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("using default settings: {e:#}");
            OverlaySettings::default()
        }
    };
    tracing::info!(path = %settings_path.display(), "starting tarrow");

    let (worker, stats_rx) = StatsWorker::spawn(SysinfoSource::new(), settings.update_interval)?;

    let hotkey = parse_hotkey(&settings.hotkey).unwrap_or_else(|| {
        tracing::warn!(hotkey = %settings.hotkey, "unrecognised hotkey; falling back to default");
        Default::default()
    });
    let listener = match HotkeyListener::start(hotkey) {
        Ok(listener) => Some(listener),
        Err(e) => {
            tracing::warn!("hotkey listener unavailable: {e:#}");
            None
        }
    };

    let controller = OverlayController::new(
        settings,
        screens::enumerate(None),
        Some(settings_path),
        Instant::now(),
    );
    let initial = controller
        .view()
        .map(|v| tarrow::gui::to_points(tarrow::gui::window_rect(&v), 1.0))
        .unwrap_or_else(|| egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(30.0, 60.0)));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("tarrow")
            .with_position(initial.min)
            .with_inner_size(initial.size())
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_always_on_top()
            .with_taskbar(false),
        ..Default::default()
    };

    eframe::run_native(
        "tarrow",
        native_options,
        Box::new(move |_cc| Box::new(OverlayApp::new(controller, stats_rx, Some(worker), listener))),
    )
    .map_err(|e| anyhow::anyhow!("failed to open overlay window: {e}"))?;
    Ok(())
}
