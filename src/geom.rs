//! Geometric primitives, like points, vectors, segments and rays.
//!
//! Everything here is an immutable value type. The one sign convention that
//! everything else relies on is [`orientation`]: a positive signed area means
//! that the third point is to the left of the directed line through the first
//! two.

use std::cell::OnceCell;
use std::f64::consts::TAU;

use arrayvec::ArrayVec;

use crate::num::Tolerance;

/// The largest vector dimension we support.
pub const MAX_DIM: usize = 3;

/// A two-dimensional point.
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    ///
    /// Larger values are "up", so that angles increase counter-clockwise.
    pub y: f64,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(x.is_finite());
        debug_assert!(y.is_finite());
        Point { x, y }
    }

    /// The Euclidean distance between two points.
    pub fn distance_to(&self, other: &Point) -> f64 {
        dist2(self, other).sqrt()
    }

    /// Translates this point by a two-dimensional vector.
    pub fn offset(&self, v: &Vector) -> Result<Point, DimensionMismatch> {
        match v.components() {
            &[dx, dy] => Ok(Point::new(self.x + dx, self.y + dy)),
            other => Err(DimensionMismatch {
                expected: 2,
                found: other.len(),
            }),
        }
    }

    /// Are both coordinates finite?
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Converts to a `kurbo` point, for drawing and line intersection.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Two operands of a vector operation had different dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimensionMismatch {
    /// The dimension that the operation needed.
    pub expected: usize,
    /// The dimension that it got.
    pub found: usize,
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected a vector of dimension {}, found dimension {}",
            self.expected, self.found
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// An immutable vector with a dimension fixed at construction.
///
/// The norm is computed lazily and then cached; vectors produced by
/// [`Vector::normalize`] are born with their norm already known.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Vector {
    values: ArrayVec<f64, MAX_DIM>,
    #[serde(skip)]
    norm: OnceCell<f64>,
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl std::fmt::Debug for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{:?}>", self.values.as_slice())
    }
}

impl Vector {
    /// Creates a vector from its components.
    ///
    /// # Panics
    ///
    /// Panics if there are more than [`MAX_DIM`] components.
    pub fn new(values: &[f64]) -> Self {
        let Ok(values) = ArrayVec::<f64, MAX_DIM>::try_from(values) else {
            panic!(
                "vectors have at most {MAX_DIM} components, got {}",
                values.len()
            );
        };
        Vector {
            values,
            norm: OnceCell::new(),
        }
    }

    /// A two-dimensional vector.
    pub fn xy(x: f64, y: f64) -> Self {
        Vector::new(&[x, y])
    }

    /// The unit vector `(cos θ, sin θ)`.
    pub fn from_angle(theta: f64) -> Self {
        let ret = Vector::xy(theta.cos(), theta.sin());
        let _ = ret.norm.set(1.0);
        ret
    }

    /// The number of components.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// All of the components, in order.
    pub fn components(&self) -> &[f64] {
        &self.values
    }

    /// The Euclidean norm.
    pub fn norm(&self) -> f64 {
        *self
            .norm
            .get_or_init(|| self.values.iter().map(|v| v * v).sum::<f64>().sqrt())
    }

    /// Returns the unit vector pointing in the same direction, or `None` for
    /// the zero vector.
    pub fn normalize(&self) -> Option<Vector> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        let inv = 1.0 / norm;
        let ret = Vector {
            values: self.values.iter().map(|v| v * inv).collect(),
            norm: OnceCell::new(),
        };
        let _ = ret.norm.set(1.0);
        Some(ret)
    }

    /// Component-wise sum, failing if the dimensions differ.
    pub fn checked_add(&self, other: &Vector) -> Result<Vector, DimensionMismatch> {
        if self.dimension() != other.dimension() {
            return Err(DimensionMismatch {
                expected: self.dimension(),
                found: other.dimension(),
            });
        }
        Ok(Vector {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a + b)
                .collect(),
            norm: OnceCell::new(),
        })
    }

    /// Multiplies every component by `factor`.
    pub fn scale(&self, factor: f64) -> Vector {
        let ret = Vector {
            values: self.values.iter().map(|v| v * factor).collect(),
            norm: OnceCell::new(),
        };
        if let Some(norm) = self.norm.get() {
            let _ = ret.norm.set(norm * factor.abs());
        }
        ret
    }
}

impl std::ops::Add for &Vector {
    type Output = Vector;

    /// # Panics
    ///
    /// Panics if the dimensions differ. Use [`Vector::checked_add`] if that
    /// might happen.
    fn add(self, rhs: &Vector) -> Vector {
        match self.checked_add(rhs) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl std::ops::Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.scale(rhs)
    }
}

/// Which side of a directed line a point is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// The point is to the right of the line (a clockwise turn).
    Right,
    /// The three points are collinear.
    Collinear,
    /// The point is to the left of the line (a counter-clockwise turn).
    Left,
}

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive if `c` is to the left of the directed line from `a` to `b`.
#[inline]
pub fn area2(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// The sign of [`area2`].
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let area = area2(a, b, c);
    if area > 0.0 {
        Orientation::Left
    } else if area < 0.0 {
        Orientation::Right
    } else {
        Orientation::Collinear
    }
}

/// Is `c` strictly to the left of the directed line from `a` to `b`?
#[inline]
pub fn left(a: &Point, b: &Point, c: &Point) -> bool {
    area2(a, b, c) > 0.0
}

/// The squared distance between two points.
#[inline]
pub fn dist2(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// The angle of `point`, as seen from `origin`, in `[0, 2π)`.
///
/// Angles start at the positive horizontal axis and increase counter-clockwise,
/// so a full sweep is a single ascending pass.
pub fn angle_from_origin(origin: &Point, point: &Point) -> f64 {
    let angle = (point.y - origin.y).atan2(point.x - origin.x);
    let angle = if angle < 0.0 { angle + TAU } else { angle };
    // -tiny + TAU can round up to TAU itself.
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// The distance of `point` from `origin`.
pub fn distance_from_origin(origin: &Point, point: &Point) -> f64 {
    dist2(origin, point).sqrt()
}

/// A line segment between two points.
///
/// The endpoints are unordered as far as equality is concerned: the segment
/// from `a` to `b` is equal to the segment from `b` to `a`.
#[derive(Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// The first endpoint, in input order.
    pub p0: Point,
    /// The second endpoint, in input order.
    pub p1: Point,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        (self.p0 == other.p0 && self.p1 == other.p1)
            || (self.p0 == other.p1 && self.p1 == other.p0)
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?} -- {:?}]", self.p0, self.p1)
    }
}

impl Segment {
    /// Create a new segment.
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Segment {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// Both endpoints, in input order.
    pub fn endpoints(&self) -> (Point, Point) {
        (self.p0, self.p1)
    }

    /// The endpoint with the larger `y` coordinate (ties go to the smaller `x`).
    pub fn upper(&self) -> Point {
        if upper_first(&self.p0, &self.p1) {
            self.p0
        } else {
            self.p1
        }
    }

    /// The endpoint that isn't [`Segment::upper`].
    pub fn lower(&self) -> Point {
        if upper_first(&self.p0, &self.p1) {
            self.p1
        } else {
            self.p0
        }
    }

    /// Given one endpoint, returns the other one.
    pub fn adj(&self, p: &Point) -> Point {
        if *p == self.p0 {
            self.p1
        } else {
            self.p0
        }
    }

    /// Is `p` exactly one of our endpoints?
    pub fn contains_endpoint(&self, p: &Point) -> bool {
        *p == self.p0 || *p == self.p1
    }

    /// The length of this segment.
    pub fn length(&self) -> f64 {
        self.p0.distance_to(&self.p1)
    }

    /// Which side of this segment (directed from `p0` to `p1`) `p` is on.
    pub fn orientation_of(&self, p: &Point) -> Orientation {
        orientation(&self.p0, &self.p1, p)
    }

    /// Is `p` strictly to the left of this segment, directed from `p0` to `p1`?
    pub fn has_left(&self, p: &Point) -> bool {
        left(&self.p0, &self.p1, p)
    }

    /// Is `p` on the line through this segment?
    pub fn is_collinear_with(&self, p: &Point) -> bool {
        area2(&self.p0, &self.p1, p) == 0.0
    }

    /// Is `p` on this segment, endpoints included?
    pub fn has_inside(&self, p: &Point) -> bool {
        if !self.is_collinear_with(p) {
            return false;
        }
        let between = |a: f64, b: f64, x: f64| (a <= x && x <= b) || (b <= x && x <= a);
        if self.p0.x != self.p1.x {
            between(self.p0.x, self.p1.x, p.x)
        } else {
            between(self.p0.y, self.p1.y, p.y)
        }
    }

    /// Do the interiors of the two segments cross?
    ///
    /// Touching doesn't count: if any endpoint of either segment is collinear
    /// with the other segment, the answer is `false`.
    pub fn intersects_interior(&self, other: &Segment) -> bool {
        if self.is_collinear_with(&other.p0)
            || self.is_collinear_with(&other.p1)
            || other.is_collinear_with(&self.p0)
            || other.is_collinear_with(&self.p1)
        {
            return false;
        }

        (self.has_left(&other.p0) ^ self.has_left(&other.p1))
            && (other.has_left(&self.p0) ^ other.has_left(&self.p1))
    }

    /// Do the two segments have any point in common?
    pub fn intersects(&self, other: &Segment) -> bool {
        self.intersects_interior(other)
            || self.has_inside(&other.p0)
            || self.has_inside(&other.p1)
            || other.has_inside(&self.p0)
            || other.has_inside(&self.p1)
    }

    /// Converts to a `kurbo` line.
    pub fn to_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.p0.to_kurbo(), self.p1.to_kurbo())
    }
}

// Upper means larger y; ties go to smaller x.
fn upper_first(a: &Point, b: &Point) -> bool {
    a.y > b.y || (a.y == b.y && a.x <= b.x)
}

/// A half-line, starting at `origin` and heading off in `direction`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Point,
    direction: Vector,
}

impl Ray {
    /// Creates a ray. The direction is normalized.
    ///
    /// Fails unless `direction` is a non-zero, two-dimensional vector.
    pub fn new(origin: Point, direction: &Vector) -> Result<Self, DimensionMismatch> {
        if direction.dimension() != 2 {
            return Err(DimensionMismatch {
                expected: 2,
                found: direction.dimension(),
            });
        }
        let direction = direction.normalize().ok_or(DimensionMismatch {
            expected: 2,
            found: 0,
        })?;
        Ok(Ray { origin, direction })
    }

    /// The ray leaving `origin` at angle `theta`.
    pub fn from_angle(origin: Point, theta: f64) -> Self {
        Ray {
            origin,
            direction: Vector::from_angle(theta),
        }
    }

    /// Where this ray starts.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The (unit) direction of this ray.
    pub fn direction(&self) -> &Vector {
        &self.direction
    }

    /// The angle of this ray, in `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        let c = self.direction.components();
        angle_from_origin(&Point::new(0.0, 0.0), &Point::new(c[0], c[1]))
    }

    /// Points this ray in a new direction, keeping the origin.
    pub fn rotate_to(&mut self, theta: f64) {
        self.direction = Vector::from_angle(theta);
    }

    /// The point at distance `t` along this ray.
    pub fn at(&self, t: f64) -> Point {
        let c = self.direction.components();
        Point::new(self.origin.x + t * c[0], self.origin.y + t * c[1])
    }

    /// Does this ray pass through `p`?
    ///
    /// We walk `p`'s distance along the ray and check that we end up at `p`,
    /// up to `tol` (relative to that distance, once it exceeds one).
    pub fn contains(&self, p: &Point, tol: Tolerance) -> bool {
        let d = self.origin.distance_to(p);
        self.at(d).distance_to(p) <= tol.eps() * d.max(1.0)
    }

    // A finite stand-in for this ray that reaches past every point of `seg`.
    fn truncated(&self, seg: &Segment) -> Segment {
        let reach = self
            .origin
            .distance_to(&seg.p0)
            .max(self.origin.distance_to(&seg.p1));
        Segment::new(self.origin, self.at(2.0 * reach + 1.0))
    }

    /// Does this ray meet the segment?
    pub fn intersects(&self, seg: &Segment) -> bool {
        self.truncated(seg).intersects(seg)
    }

    /// The first point where this ray meets the segment, if it does.
    ///
    /// If the segment lies along the ray, this is its endpoint closest to the origin.
    pub fn hit(&self, seg: &Segment) -> Option<Point> {
        let reach = self.truncated(seg);
        if !reach.intersects(seg) {
            return None;
        }
        match reach.to_kurbo().crossing_point(seg.to_kurbo()) {
            Some(p) if p.is_finite() => Some(p.into()),
            _ => {
                let d0 = dist2(&self.origin, &seg.p0);
                let d1 = dist2(&self.origin, &seg.p1);
                Some(if d0 <= d1 { seg.p0 } else { seg.p1 })
            }
        }
    }
}
