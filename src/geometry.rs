/* ------------------------------------------------------------------------------
 * Point struct
 * ------------------------------------------------------------------------------ */
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
pub fn distance_between_points(p1: Point, p2: Point) -> f32 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).sqrt()
}

/* ------------------------------------------------------------------------------
 * Segment intersection
 * ------------------------------------------------------------------------------ */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Orientation of the ordered point triple P -> Q -> R.
///
/// Sign of the cross product (Q - P) x (R - Q); exact zero is collinear.
pub fn orientation(p: Point, q: Point, r: Point) -> Orientation {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val == 0.0 {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Checks if point Q lies on segment PR. Only meaningful when P, Q and R
/// are already known to be collinear.
pub fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x)
        && q.x >= p.x.min(r.x)
        && q.y <= p.y.max(r.y)
        && q.y >= p.y.min(r.y)
}

/// Checks if segment P1-Q1 intersects segment P2-Q2.
///
/// Standard orientation-based test: the general case compares the four
/// orientations, the four special cases handle collinear endpoints.
pub fn segments_intersect(p1: Point, q1: Point, p2: Point, q2: Point) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    // General case
    if o1 != o2 && o3 != o4 {
        return true;
    }

    // P1, Q1, P2 are collinear and P2 lies on segment P1-Q1
    if o1 == Orientation::Collinear && on_segment(p1, p2, q1) {
        return true;
    }
    // P1, Q1, Q2 are collinear and Q2 lies on segment P1-Q1
    if o2 == Orientation::Collinear && on_segment(p1, q2, q1) {
        return true;
    }
    // P2, Q2, P1 are collinear and P1 lies on segment P2-Q2
    if o3 == Orientation::Collinear && on_segment(p2, p1, q2) {
        return true;
    }
    // P2, Q2, Q1 are collinear and Q1 lies on segment P2-Q2
    if o4 == Orientation::Collinear && on_segment(p2, q1, q2) {
        return true;
    }

    false
}
