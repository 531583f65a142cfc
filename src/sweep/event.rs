//! Sweep events, and the order in which the sweep visits them.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use crate::{
    geom::{angle_from_origin, distance_from_origin, orientation, Orientation, Point, Segment},
    num::{CheapOrderedFloat, Tolerance},
    segments::SegIdx,
};

/// What happens to a segment at an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    /// The sweep ray starts crossing the segment.
    Insert,
    /// The sweep ray stops crossing the segment.
    Delete,
}

/// An angular position at which a segment enters or leaves the status structure.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    /// Entering or leaving.
    pub kind: EventKind,
    /// The segment that enters or leaves.
    pub seg: SegIdx,
    /// The endpoint of the segment where this happens.
    pub point: Point,
    /// The angle of `point`, seen from the origin, in `[0, 2π)`.
    pub angle: f64,
    /// The distance of `point` from the origin.
    pub distance: f64,
}

impl Event {
    fn new(kind: EventKind, seg: SegIdx, origin: &Point, point: Point, tol: Tolerance) -> Self {
        let angle = angle_from_origin(origin, &point);
        // Something just short of a full turn is a tie with angle zero, and
        // should be ordered as one.
        let angle = if TAU - angle < tol.eps() { 0.0 } else { angle };
        Event {
            kind,
            seg,
            point,
            angle,
            distance: distance_from_origin(origin, &point),
        }
    }

    /// Builds the insert and delete events for a segment.
    ///
    /// The sweep turns counter-clockwise, so the insert endpoint is the one
    /// that the ray reaches first. A segment pointing straight at the origin
    /// is crossed by only one ray; then the endpoint nearer to the origin is
    /// the insert endpoint.
    pub fn pair(seg_idx: SegIdx, seg: &Segment, origin: &Point, tol: Tolerance) -> [Event; 2] {
        let (start, end) = oriented_endpoints(seg, origin);
        [
            Event::new(EventKind::Insert, seg_idx, origin, start, tol),
            Event::new(EventKind::Delete, seg_idx, origin, end, tol),
        ]
    }

    /// The order in which the sweep processes events.
    ///
    /// Smaller angles come first. Angles that agree up to `tol` are ties, and
    /// within a tie inserts go before deletes. Inserts are then ordered by
    /// increasing distance and deletes by decreasing distance. Anything still
    /// tied is ordered by segment index, so that the order is deterministic.
    pub fn sweep_order(&self, other: &Event, tol: Tolerance) -> Ordering {
        tol.cmp(self.angle, other.angle).then_with(|| {
            let dist = |ev: &Event| CheapOrderedFloat::from(ev.distance);
            let by_kind = match (self.kind, other.kind) {
                (EventKind::Insert, EventKind::Delete) => Ordering::Less,
                (EventKind::Delete, EventKind::Insert) => Ordering::Greater,
                (EventKind::Insert, EventKind::Insert) => dist(self).cmp(&dist(other)),
                (EventKind::Delete, EventKind::Delete) => dist(other).cmp(&dist(self)),
            };
            by_kind.then(self.seg.cmp(&other.seg))
        })
    }
}

/// A segment's endpoints, ordered so that the sweep meets the first one first.
///
/// For a segment that doesn't point at the origin, the origin is to the left
/// of the directed segment from the first endpoint to the second.
pub fn oriented_endpoints(seg: &Segment, origin: &Point) -> (Point, Point) {
    let (p0, p1) = seg.endpoints();
    match orientation(origin, &p0, &p1) {
        Orientation::Left => (p0, p1),
        Orientation::Right => (p1, p0),
        Orientation::Collinear => {
            if distance_from_origin(origin, &p0) <= distance_from_origin(origin, &p1) {
                (p0, p1)
            } else {
                (p1, p0)
            }
        }
    }
}
