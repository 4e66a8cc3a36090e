use crate::geometry::{Point, Rect, Screen};

/// Ensure exactly one screen carries the primary flag (the first one when
/// the platform reported none).
pub fn normalize_primary(screens: &mut [Screen]) {
    let primary = screens.iter().position(|s| s.primary).unwrap_or(0);
    for (i, screen) in screens.iter_mut().enumerate() {
        screen.primary = i == primary;
    }
}

/// Attached displays. `fallback_size` is used where the platform offers no
/// enumeration; it should be the monitor size reported by the windowing
/// layer.
pub fn enumerate(fallback_size: Option<(f32, f32)>) -> Vec<Screen> {
    #[cfg(windows)]
    {
        let mut screens = enumerate_monitors();
        if !screens.is_empty() {
            normalize_primary(&mut screens);
            return screens;
        }
    }

    let (width, height) = fallback_size.unwrap_or((1920.0, 1080.0));
    vec![Screen::new("primary", Rect::new(0, 0, width as i32, height as i32)).with_primary(true)]
}

pub fn cursor_position() -> Option<Point> {
    #[cfg(windows)]
    {
        return resolve_cursor_position();
    }

    #[cfg(not(windows))]
    {
        None
    }
}

#[cfg(windows)]
fn resolve_cursor_position() -> Option<Point> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    let mut point = POINT::default();
    if unsafe { GetCursorPos(&mut point) }.is_ok() {
        Some(Point::new(point.x, point.y))
    } else {
        None
    }
}

#[cfg(windows)]
fn enumerate_monitors() -> Vec<Screen> {
    use std::mem;
    use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
    use windows::Win32::Graphics::Gdi::{
        EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFOEXW,
        MONITORINFOF_PRIMARY,
    };

    fn to_rect(rc: RECT) -> Rect {
        Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top)
    }

    extern "system" fn monitor_enum_proc(
        monitor: HMONITOR,
        _hdc: HDC,
        _rc_clip: *mut RECT,
        data: LPARAM,
    ) -> BOOL {
        let screens = unsafe { &mut *(data.0 as *mut Vec<Screen>) };
        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;
        if unsafe { GetMonitorInfoW(monitor, &mut info.monitorInfo as *mut _ as *mut _) }.as_bool()
        {
            let len = info
                .szDevice
                .iter()
                .position(|c| *c == 0)
                .unwrap_or(info.szDevice.len());
            let name = String::from_utf16_lossy(&info.szDevice[..len]);
            let primary = info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0;
            screens.push(
                Screen::new(name, to_rect(info.monitorInfo.rcMonitor))
                    .with_work_area(to_rect(info.monitorInfo.rcWork))
                    .with_primary(primary),
            );
        }
        BOOL(1)
    }

    let mut screens = Vec::new();
    unsafe {
        let _ = EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(monitor_enum_proc),
            LPARAM(&mut screens as *mut Vec<Screen> as isize),
        );
    }
    tracing::debug!(count = screens.len(), "enumerated monitors");
    screens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_screen_becomes_primary_when_none_flagged() {
        let mut screens = vec![
            Screen::new("a", Rect::new(0, 0, 10, 10)),
            Screen::new("b", Rect::new(10, 0, 10, 10)),
        ];
        normalize_primary(&mut screens);
        assert!(screens[0].primary);
        assert!(!screens[1].primary);
    }

    #[test]
    fn only_one_primary_survives() {
        let mut screens = vec![
            Screen::new("a", Rect::new(0, 0, 10, 10)),
            Screen::new("b", Rect::new(10, 0, 10, 10)).with_primary(true),
            Screen::new("c", Rect::new(20, 0, 10, 10)).with_primary(true),
        ];
        normalize_primary(&mut screens);
        let flags: Vec<_> = screens.iter().map(|s| s.primary).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[cfg(not(windows))]
    #[test]
    fn fallback_uses_reported_size() {
        let screens = enumerate(Some((2560.0, 1440.0)));
        assert_eq!(screens.len(), 1);
        assert_eq!(screens[0].geometry, Rect::new(0, 0, 2560, 1440));
        assert!(screens[0].primary);
    }
}
