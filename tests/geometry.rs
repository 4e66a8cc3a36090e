use tarrow::dock::DockState;
use tarrow::geometry::{place_panel, resolve, Edge, Point, Rect, Screen, Size};

fn layout() -> Vec<Screen> {
    vec![
        Screen::new("LEFT", Rect::new(-1280, 200, 1280, 1024)),
        Screen::new("MAIN", Rect::new(0, 0, 1920, 1080))
            .with_work_area(Rect::new(0, 0, 1920, 1040))
            .with_primary(true),
        Screen::new("TALL", Rect::new(1920, -400, 1080, 1920)),
    ]
}

fn flush(rect: Rect, screen: Rect, edge: Edge) -> bool {
    match edge {
        Edge::Left => rect.left() == screen.left(),
        Edge::Right => rect.right() == screen.right(),
        Edge::Top => rect.top() == screen.top(),
        Edge::Bottom => rect.bottom() == screen.bottom(),
    }
}

fn inside(rect: Rect, bounds: Rect) -> bool {
    rect.left() >= bounds.left()
        && rect.top() >= bounds.top()
        && rect.right() <= bounds.right()
        && rect.bottom() <= bounds.bottom()
}

#[test]
fn any_point_docks_flush_inside_its_screen() {
    let screens = layout();
    for x in (-2000..3600).step_by(97) {
        for y in (-900..2100).step_by(89) {
            let point = Point::new(x, y);
            let placement = resolve(point, &screens).unwrap();
            assert!((0.0..=1.0).contains(&placement.position));
            assert_eq!(resolve(point, &screens), Some(placement.clone()));
            let chosen = screens.iter().find(|s| s.name == placement.screen).unwrap();
            let chosen_dist = chosen.geometry.distance_sq(point);
            for other in &screens {
                assert!(
                    chosen_dist <= other.geometry.distance_sq(point),
                    "{point:?}: {} is closer than {}",
                    other.name,
                    chosen.name
                );
            }

            let mut dock = DockState::load(Some("MAIN"), Edge::Right, 0.5, &screens);
            dock.commit(placement.clone());
            let screen = screens.iter().find(|s| s.name == placement.screen).unwrap();
            for expanded in [false, true] {
                let trigger = dock.trigger_rect(&screens, expanded).unwrap();
                assert!(inside(trigger, screen.geometry), "{point:?} -> {trigger:?}");
                assert!(flush(trigger, screen.geometry, placement.edge), "{point:?} -> {trigger:?}");
            }
        }
    }
}

#[test]
fn panel_stays_in_work_area_for_every_edge() {
    let screens = layout();
    let main = &screens[1];
    let panel = Size::new(320, 500);
    for edge in Edge::ALL {
        for position in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let dock = DockState::load(Some("MAIN"), edge, position, &screens);
            let trigger = dock.trigger_rect(&screens, true).unwrap();
            let rect = place_panel(trigger, edge, panel, main.work_area);
            assert!(inside(rect, main.work_area), "{edge} {position}: {rect:?}");
            assert_eq!(rect.size(), panel);
        }
    }
}

#[test]
fn off_screen_point_goes_to_nearest_screen() {
    let screens = layout();
    let placement = resolve(Point::new(-1500, 600), &screens).unwrap();
    assert_eq!(placement.screen, "LEFT");
    assert_eq!(placement.edge, Edge::Left);

    let placement = resolve(Point::new(2460, -500), &screens).unwrap();
    assert_eq!(placement.screen, "TALL");
    assert_eq!(placement.edge, Edge::Top);
}
