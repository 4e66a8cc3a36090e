use serde::{Deserialize, Serialize};

/// A point in virtual desktop coordinates (all monitors share one space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Axis aligned rectangle. `right()`/`bottom()` are the last pixel that is
/// still inside, matching how window managers report monitor bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Squared distance from `point` to the closest pixel of the rectangle,
    /// computed per axis. Zero for points inside.
    pub fn distance_sq(&self, point: Point) -> i64 {
        let dx = (self.left() - point.x).max(point.x - self.right()).max(0) as i64;
        let dy = (self.top() - point.y).max(point.y - self.bottom()).max(0) as i64;
        dx * dx + dy * dy
    }

    pub fn moved_to(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Shift the rectangle so it lies inside `bounds`. Each side is handled
    /// on its own; when the rectangle is larger than `bounds` the left/top
    /// side wins.
    pub fn clamped_into(&self, bounds: Rect) -> Self {
        let mut x = self.x;
        let mut y = self.y;
        if x + self.width - 1 > bounds.right() {
            x = bounds.right() - self.width + 1;
        }
        if x < bounds.left() {
            x = bounds.left();
        }
        if y + self.height - 1 > bounds.bottom() {
            y = bounds.bottom() - self.height + 1;
        }
        if y < bounds.top() {
            y = bounds.top();
        }
        self.moved_to(Point::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Left => write!(f, "left"),
            Edge::Right => write!(f, "right"),
            Edge::Top => write!(f, "top"),
            Edge::Bottom => write!(f, "bottom"),
        }
    }
}

/// Which way the trigger is laid out. Left/right docks stand upright,
/// top/bottom docks lie flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Edge {
    /// Declaration order; also the tie-break order for nearest-edge lookup.
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    pub fn orientation(self) -> Orientation {
        match self {
            Edge::Left | Edge::Right => Orientation::Vertical,
            Edge::Top | Edge::Bottom => Orientation::Horizontal,
        }
    }

    /// True for the edges whose boundary sits at the far end of their axis.
    fn is_far(self) -> bool {
        matches!(self, Edge::Right | Edge::Bottom)
    }

    /// Absolute distance from `point` to this edge's boundary line of `rect`.
    pub fn distance(self, rect: Rect, point: Point) -> i32 {
        match self {
            Edge::Left => (point.x - rect.left()).abs(),
            Edge::Right => (point.x - rect.right()).abs(),
            Edge::Top => (point.y - rect.top()).abs(),
            Edge::Bottom => (point.y - rect.bottom()).abs(),
        }
    }
}

impl Orientation {
    /// Length of `size` measured along an edge with this orientation.
    pub fn along(self, size: Size) -> i32 {
        match self {
            Orientation::Vertical => size.height,
            Orientation::Horizontal => size.width,
        }
    }

    /// Length of `size` measured across (perpendicular to) the edge.
    pub fn across(self, size: Size) -> i32 {
        match self {
            Orientation::Vertical => size.width,
            Orientation::Horizontal => size.height,
        }
    }

    /// Normalised position of `point` along an edge of `rect`.
    pub fn ratio(self, rect: Rect, point: Point) -> f64 {
        let (offset, length) = match self {
            Orientation::Vertical => (point.y - rect.top(), rect.height),
            Orientation::Horizontal => (point.x - rect.left(), rect.width),
        };
        if length <= 0 {
            return 0.0;
        }
        (offset as f64 / length as f64).clamp(0.0, 1.0)
    }

    /// Compose a point from an along-edge and an across-edge coordinate.
    fn compose(self, along: i32, across: i32) -> Point {
        match self {
            Orientation::Vertical => Point::new(across, along),
            Orientation::Horizontal => Point::new(along, across),
        }
    }
}

/// A physical display in the virtual desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub name: String,
    pub geometry: Rect,
    /// Geometry minus task bars and docks.
    pub work_area: Rect,
    pub primary: bool,
}

impl Screen {
    pub fn new(name: impl Into<String>, geometry: Rect) -> Self {
        Self {
            name: name.into(),
            geometry,
            work_area: geometry,
            primary: false,
        }
    }

    pub fn with_work_area(mut self, work_area: Rect) -> Self {
        self.work_area = work_area;
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }
}

/// The designated primary screen, or the first enumerated one.
pub fn primary_screen(screens: &[Screen]) -> Option<&Screen> {
    screens.iter().find(|s| s.primary).or_else(|| screens.first())
}

/// Where a point would dock: which screen, which edge, and how far along it.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub screen: String,
    pub edge: Edge,
    pub position: f64,
}

/// Pick the screen a point belongs to. Points outside every screen go to the
/// screen whose rectangle is closest; ties keep the first enumerated screen.
pub fn screen_for_point(screens: &[Screen], point: Point) -> Option<&Screen> {
    if let Some(inside) = screens.iter().find(|s| s.geometry.contains(point)) {
        return Some(inside);
    }
    let mut best: Option<(&Screen, i64)> = None;
    for screen in screens {
        let dist = screen.geometry.distance_sq(point);
        match best {
            Some((_, current)) if current <= dist => {}
            _ => best = Some((screen, dist)),
        }
    }
    best.map(|(screen, _)| screen)
}

/// Nearest boundary of `rect` to `point`, ties resolved in [`Edge::ALL`] order.
pub fn nearest_edge(rect: Rect, point: Point) -> Edge {
    let mut best = Edge::Left;
    let mut best_dist = i32::MAX;
    for edge in Edge::ALL {
        let dist = edge.distance(rect, point);
        if dist < best_dist {
            best = edge;
            best_dist = dist;
        }
    }
    best
}

/// Resolve a desktop point to a docking placement. Returns `None` only when
/// there are no screens at all.
pub fn resolve(point: Point, screens: &[Screen]) -> Option<Placement> {
    let screen = screen_for_point(screens, point)?;
    let edge = nearest_edge(screen.geometry, point);
    let position = edge.orientation().ratio(screen.geometry, point);
    Some(Placement {
        screen: screen.name.clone(),
        edge,
        position,
    })
}

/// Rectangle of a widget of `size` docked flush against `edge` of `bounds`,
/// `position` of the way along the edge's free span.
pub fn place_on_edge(bounds: Rect, edge: Edge, position: f64, size: Size) -> Rect {
    let orientation = edge.orientation();
    let bounds_size = bounds.size();
    let span = (orientation.along(bounds_size) - orientation.along(size)).max(0);
    let start = match orientation {
        Orientation::Vertical => bounds.top(),
        Orientation::Horizontal => bounds.left(),
    };
    let along = start + (position.clamp(0.0, 1.0) * span as f64) as i32;
    let across = if edge.is_far() {
        let far = match orientation {
            Orientation::Vertical => bounds.right(),
            Orientation::Horizontal => bounds.bottom(),
        };
        far - orientation.across(size) + 1
    } else {
        match orientation {
            Orientation::Vertical => bounds.left(),
            Orientation::Horizontal => bounds.top(),
        }
    };
    Rect::from_origin_size(orientation.compose(along, across), size)
}

/// Grow a docked rectangle to `size`, keeping it centred along the edge and
/// flush against the screen boundary.
pub fn expand_on_edge(rect: Rect, edge: Edge, size: Size) -> Rect {
    let orientation = edge.orientation();
    let grow_along = orientation.along(size) - orientation.along(rect.size());
    let grow_across = orientation.across(size) - orientation.across(rect.size());
    let (along_start, across_start) = match orientation {
        Orientation::Vertical => (rect.y, rect.x),
        Orientation::Horizontal => (rect.x, rect.y),
    };
    let along = along_start - grow_along / 2;
    let across = if edge.is_far() {
        across_start - grow_across
    } else {
        across_start
    };
    Rect::from_origin_size(orientation.compose(along, across), size)
}

/// Gap between the trigger and the panel.
pub const PANEL_GAP: i32 = 10;

/// Place the panel next to the trigger on the side facing away from `edge`,
/// centred on the trigger, then pull it fully inside `work_area`.
pub fn place_panel(trigger: Rect, edge: Edge, panel: Size, work_area: Rect) -> Rect {
    let center = trigger.center();
    let origin = match edge {
        Edge::Right => Point::new(
            trigger.x - panel.width - PANEL_GAP,
            center.y - panel.height / 2,
        ),
        Edge::Left => Point::new(
            trigger.x + trigger.width + PANEL_GAP,
            center.y - panel.height / 2,
        ),
        Edge::Top => Point::new(
            center.x - panel.width / 2,
            trigger.y + trigger.height + PANEL_GAP,
        ),
        Edge::Bottom => Point::new(
            center.x - panel.width / 2,
            trigger.y - panel.height - PANEL_GAP,
        ),
    };
    Rect::from_origin_size(origin, panel).clamped_into(work_area)
}
