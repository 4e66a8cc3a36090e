use crate::geometry::Size;
use crate::settings::DisplayFlags;
use crate::stats::StatsSnapshot;

pub const PANEL_WIDTH: i32 = 320;
pub const PANEL_MAX_HEIGHT: i32 = 500;
const HEADER_HEIGHT: i32 = 80;
const ROW_WITH_BAR: i32 = 50;
const ROW_PLAIN: i32 = 40;
const PROCESS_HEADER: i32 = 60;
const PROCESS_ROW: i32 = 20;
const HISTORY_HEIGHT: i32 = 70;
const LOADING_SIZE: Size = Size::new(PANEL_WIDTH, 200);

/// Panel size for the current content, capped at [`PANEL_MAX_HEIGHT`].
pub fn panel_size(flags: &DisplayFlags, snapshot: Option<&StatsSnapshot>, loading: bool) -> Size {
    let Some(snapshot) = snapshot.filter(|_| !loading) else {
        return LOADING_SIZE;
    };
    let bar_row = if flags.show_graphs {
        ROW_WITH_BAR
    } else {
        ROW_PLAIN
    };
    let mut height = HEADER_HEIGHT;
    for shown in [flags.show_cpu, flags.show_ram, flags.show_disk] {
        if shown {
            height += bar_row;
        }
    }
    if flags.show_temp {
        height += ROW_PLAIN;
    }
    if flags.show_processes {
        for list in [&snapshot.top_cpu, &snapshot.top_memory] {
            if !list.is_empty() {
                height += PROCESS_HEADER + PROCESS_ROW * list.len() as i32;
            }
        }
    }
    if flags.show_history {
        height += HISTORY_HEIGHT;
    }
    Size::new(PANEL_WIDTH, height.min(PANEL_MAX_HEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ProcessUsage;

    fn flags() -> DisplayFlags {
        DisplayFlags {
            show_cpu: true,
            show_ram: true,
            show_disk: true,
            show_temp: false,
            show_graphs: true,
            show_processes: false,
            show_history: false,
        }
    }

    #[test]
    fn loading_uses_placeholder_size() {
        assert_eq!(panel_size(&flags(), None, true), LOADING_SIZE);
        let snapshot = StatsSnapshot::default();
        assert_eq!(panel_size(&flags(), Some(&snapshot), true), LOADING_SIZE);
    }

    #[test]
    fn three_bars_without_processes() {
        let snapshot = StatsSnapshot::default();
        assert_eq!(panel_size(&flags(), Some(&snapshot), false), Size::new(320, 230));
        let plain = DisplayFlags {
            show_graphs: false,
            ..flags()
        };
        assert_eq!(panel_size(&plain, Some(&snapshot), false), Size::new(320, 200));
    }

    #[test]
    fn process_lists_grow_and_cap() {
        let p = ProcessUsage {
            name: "x".into(),
            cpu_percent: 5.0,
            memory_percent: 5.0,
        };
        let snapshot = StatsSnapshot {
            top_cpu: vec![p.clone(), p.clone(), p.clone()],
            top_memory: vec![p.clone(), p],
            ..StatsSnapshot::default()
        };
        let with_procs = DisplayFlags {
            show_processes: true,
            ..flags()
        };
        assert_eq!(
            panel_size(&with_procs, Some(&snapshot), false).height,
            230 + 120 + 100
        );
        let everything = DisplayFlags {
            show_processes: true,
            show_history: true,
            show_temp: true,
            ..flags()
        };
        assert_eq!(
            panel_size(&everything, Some(&snapshot), false).height,
            PANEL_MAX_HEIGHT
        );
    }
}
