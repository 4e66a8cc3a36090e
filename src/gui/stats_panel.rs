use crate::settings::{DisplayFlags, OverlaySettings, INTERVAL_RANGE, OPACITY_RANGE, THRESHOLD_RANGE};
use crate::stats::{format_bytes, ProcessUsage, StatsSnapshot};
use eframe::egui::{self, Color32, RichText};

/// What the user asked for while the panel was drawn.
#[derive(Debug, Default)]
pub struct PanelOutput {
    pub edited: Option<OverlaySettings>,
    pub capture_hotkey: bool,
}

/// Copy the fields the settings section can edit. Dock placement is owned
/// by the controller and never overwritten from here.
pub fn apply_edit(target: &mut OverlaySettings, edited: &OverlaySettings) {
    target.show_cpu = edited.show_cpu;
    target.show_ram = edited.show_ram;
    target.show_disk = edited.show_disk;
    target.show_temp = edited.show_temp;
    target.show_graphs = edited.show_graphs;
    target.show_processes = edited.show_processes;
    target.show_history = edited.show_history;
    target.update_interval = edited.update_interval;
    target.overlay_opacity = edited.overlay_opacity;
    target.alert_threshold = edited.alert_threshold;
    target.compact_mode = edited.compact_mode;
    target.debug_logging = edited.debug_logging;
}

fn bar_color(percent: f32, threshold: f32) -> Color32 {
    if percent >= threshold {
        Color32::from_rgb(220, 50, 47)
    } else if percent >= threshold * 0.75 {
        Color32::from_rgb(230, 160, 40)
    } else {
        Color32::from_rgb(80, 170, 110)
    }
}

fn metric_row(ui: &mut egui::Ui, label: &str, percent: f32, detail: String, flags: &DisplayFlags, threshold: f32) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).strong());
        ui.label(format!("{percent:.1}%"));
        ui.label(RichText::new(detail).weak());
    });
    if flags.show_graphs {
        ui.add(
            egui::ProgressBar::new((percent / 100.0).clamp(0.0, 1.0))
                .fill(bar_color(percent, threshold))
                .desired_height(8.0),
        );
    }
}

fn process_list(ui: &mut egui::Ui, title: &str, list: &[ProcessUsage], by_cpu: bool) {
    if list.is_empty() {
        return;
    }
    ui.separator();
    ui.label(RichText::new(title).strong());
    egui::Grid::new(title).num_columns(2).show(ui, |ui| {
        for p in list {
            ui.label(p.name.as_str());
            let value = if by_cpu { p.cpu_percent } else { p.memory_percent };
            ui.label(format!("{value:.1}%"));
            ui.end_row();
        }
    });
}

fn history(ui: &mut egui::Ui, snapshot: &StatsSnapshot) {
    ui.separator();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), 50.0), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 2.0, Color32::from_black_alpha(60));
    for (series, color) in [
        (&snapshot.cpu_history, Color32::from_rgb(90, 160, 230)),
        (&snapshot.memory_history, Color32::from_rgb(200, 120, 220)),
    ] {
        if series.len() < 2 {
            continue;
        }
        let step = rect.width() / (series.len() - 1) as f32;
        let points = series
            .iter()
            .enumerate()
            .map(|(i, v)| {
                egui::pos2(
                    rect.left() + i as f32 * step,
                    rect.bottom() - rect.height() * (v / 100.0).clamp(0.0, 1.0),
                )
            })
            .collect();
        painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, color)));
    }
}

fn metrics(ui: &mut egui::Ui, snapshot: &StatsSnapshot, flags: &DisplayFlags, threshold: f32) {
    if flags.show_cpu {
        metric_row(ui, "CPU", snapshot.cpu_percent, String::new(), flags, threshold);
    }
    if flags.show_ram {
        let m = &snapshot.memory;
        let detail = format!("{} / {}", format_bytes(m.used), format_bytes(m.total));
        metric_row(ui, "RAM", m.percent, detail, flags, threshold);
    }
    if flags.show_disk {
        let d = &snapshot.disk;
        let detail = format!("{} free", format_bytes(d.free));
        metric_row(ui, "Disk", d.percent, detail, flags, 100.0);
    }
    if flags.show_temp {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Temp").strong());
            ui.label(snapshot.temperature_label());
        });
    }
    if flags.show_processes {
        process_list(ui, "Top CPU", &snapshot.top_cpu, true);
        process_list(ui, "Top memory", &snapshot.top_memory, false);
    }
    if flags.show_history {
        history(ui, snapshot);
    }
}

fn settings_section(ui: &mut egui::Ui, edit: &mut OverlaySettings, capturing: bool, out: &mut PanelOutput) -> bool {
    let mut changed = false;
    egui::CollapsingHeader::new("Settings").show(ui, |ui| {
        changed |= ui.checkbox(&mut edit.show_cpu, "CPU").changed();
        changed |= ui.checkbox(&mut edit.show_ram, "Memory").changed();
        changed |= ui.checkbox(&mut edit.show_disk, "Disk").changed();
        changed |= ui.checkbox(&mut edit.show_temp, "Temperature").changed();
        changed |= ui.checkbox(&mut edit.show_graphs, "Bars").changed();
        changed |= ui.checkbox(&mut edit.show_processes, "Top processes").changed();
        changed |= ui.checkbox(&mut edit.show_history, "History").changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut edit.update_interval, INTERVAL_RANGE.0..=INTERVAL_RANGE.1)
                    .step_by(0.1)
                    .text("Interval (s)"),
            )
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut edit.overlay_opacity, OPACITY_RANGE.0..=OPACITY_RANGE.1).text("Opacity"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut edit.alert_threshold, THRESHOLD_RANGE.0..=THRESHOLD_RANGE.1)
                    .text("Alert at %"),
            )
            .changed();
        changed |= ui.checkbox(&mut edit.compact_mode, "Compact HUD").changed();
        changed |= ui.checkbox(&mut edit.debug_logging, "Debug logging (restart)").changed();
        ui.horizontal(|ui| {
            ui.label("Hotkey:");
            let label = if capturing {
                "Press a key…".to_string()
            } else {
                edit.hotkey.clone()
            };
            if ui.button(label).clicked() && !capturing {
                out.capture_hotkey = true;
            }
        });
    });
    changed
}

pub fn show(ui: &mut egui::Ui, settings: &OverlaySettings, snapshot: Option<&StatsSnapshot>, loading: bool, capturing: bool) -> PanelOutput {
    let mut out = PanelOutput::default();
    let flags = settings.display_flags();
    match snapshot {
        Some(snapshot) if !loading => {
            ui.horizontal(|ui| {
                ui.heading("System");
                ui.label(RichText::new(snapshot.taken_at.format("%H:%M:%S").to_string()).weak());
            });
            ui.separator();
            metrics(ui, snapshot, &flags, settings.alert_threshold);
        }
        _ => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label("Loading stats…");
            });
        }
    }
    ui.separator();
    let mut edit = settings.clone();
    if settings_section(ui, &mut edit, capturing, &mut out) {
        out.edited = Some(edit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_leaves_dock_fields_alone() {
        let mut target = OverlaySettings {
            screen_name: "DISPLAY2".into(),
            edge_position: 0.3,
            ..OverlaySettings::default()
        };
        let edited = OverlaySettings {
            screen_name: "stale".into(),
            edge_position: 0.9,
            show_cpu: false,
            update_interval: 4.0,
            ..OverlaySettings::default()
        };
        apply_edit(&mut target, &edited);
        assert_eq!(target.screen_name, "DISPLAY2");
        assert_eq!(target.edge_position, 0.3);
        assert!(!target.show_cpu);
        assert_eq!(target.update_interval, 4.0);
    }

    #[test]
    fn bar_turns_red_at_threshold() {
        assert_eq!(bar_color(95.0, 95.0), Color32::from_rgb(220, 50, 47));
        assert_eq!(bar_color(10.0, 95.0), Color32::from_rgb(80, 170, 110));
    }
}
