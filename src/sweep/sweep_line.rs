//! The live state of a radial sweep: the ray, and the segments crossing it.

use crate::{
    geom::{dist2, orientation, Orientation, Point, Ray, Segment},
    segments::{SegIdx, Segments},
    status::{StatusError, StatusTree},
    Error,
};

use super::event::oriented_endpoints;

/// A segment in the status structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Entry {
    // Ordered as the sweep meets them: the origin is to the left of `start -> end`.
    start: Point,
    end: Point,
    // A point of the segment that was on the sweep ray when it was inserted.
    anchor: Point,
}

impl Entry {
    fn new(seg: &Segment, origin: &Point, anchor: Point) -> Self {
        let (start, end) = oriented_endpoints(seg, origin);
        Entry { start, end, anchor }
    }

    fn is_radial(&self, origin: &Point) -> bool {
        orientation(origin, &self.start, &self.end) == Orientation::Collinear
    }
}

/// Is `new` closer to the origin than `old`, along the current sweep ray?
///
/// Both segments must cross `ray`, and `new.anchor` must be on it. The answer
/// says nothing about any other ray, so it must not be remembered.
pub(crate) fn is_closer(ray: &Ray, new: &Entry, old: &Entry) -> bool {
    let origin = ray.origin();
    if !old.is_radial(&origin) {
        // The origin is to the left of `old`, so anything on its left is in front of it.
        match orientation(&old.start, &old.end, &new.anchor) {
            Orientation::Left => return true,
            Orientation::Right => return false,
            Orientation::Collinear => {}
        }
        // They meet on the ray (most likely at a shared endpoint). Whichever
        // one is in front just after the ray is the closer one.
        match orientation(&old.start, &old.end, &new.end) {
            Orientation::Left => return true,
            Orientation::Right => return false,
            Orientation::Collinear => {}
        }
    }

    let old_point = if old.is_radial(&origin) {
        old.start
    } else {
        ray.hit(&Segment::new(old.start, old.end))
            .unwrap_or(old.anchor)
    };
    dist2(&origin, &new.anchor) < dist2(&origin, &old_point)
}

/// The sweep ray, together with the segments currently crossing it.
///
/// The segments are kept in a [`StatusTree`] ordered by distance from the
/// origin along the ray, so the nearest one is always at the minimum.
#[derive(Clone)]
pub struct SweepLine<'segs> {
    segments: &'segs Segments,
    status: StatusTree<SegIdx, Entry>,
    ray: Ray,
    check_invariants: bool,
}

impl std::fmt::Debug for SweepLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepLine")
            .field("ray", &self.ray)
            .field("active", &self.status.ids_in_order())
            .finish()
    }
}

impl<'segs> SweepLine<'segs> {
    /// Creates an empty sweep line, with the ray pointing at angle zero.
    ///
    /// If `check_invariants` is set, the status structure is validated after
    /// every change. (It's always set if the `slow-asserts` feature is on.)
    pub fn new(origin: Point, segments: &'segs Segments, check_invariants: bool) -> Self {
        SweepLine {
            segments,
            status: StatusTree::with_capacity(segments.len()),
            ray: Ray::from_angle(origin, 0.0),
            check_invariants: check_invariants || cfg!(feature = "slow-asserts"),
        }
    }

    /// The current sweep ray.
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Points the ray at a new angle.
    pub fn rotate_to(&mut self, angle: f64) {
        self.ray.rotate_to(angle);
    }

    /// The number of segments crossing the ray.
    pub fn len(&self) -> usize {
        self.status.len()
    }

    /// Is the ray crossing no segments at all?
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    /// Is this segment crossing the ray?
    pub fn contains(&self, seg: SegIdx) -> bool {
        self.status.contains(seg)
    }

    /// The segments crossing the ray, nearest first.
    pub fn active(&self) -> Vec<SegIdx> {
        self.status.ids_in_order()
    }

    /// The segment nearest to the origin along the ray, if there is one.
    pub fn nearest(&self) -> Option<SegIdx> {
        self.status.minimum().map(|n| self.status.id(n))
    }

    /// Adds a segment, which must cross the ray at `anchor`.
    pub fn insert(&mut self, seg: SegIdx, anchor: Point) -> Result<(), Error> {
        let entry = Entry::new(&self.segments[seg], &self.ray.origin(), anchor);
        let ray = &self.ray;
        self.status
            .insert_by(seg, entry, |new, old| is_closer(ray, new, old))
            .map_err(status_error)?;
        tracing::trace!(?seg, ?anchor, active = self.status.len(), "insert");
        self.check()
    }

    /// Removes a segment.
    pub fn remove(&mut self, seg: SegIdx) -> Result<(), Error> {
        self.status.remove(seg).map_err(status_error)?;
        tracing::trace!(?seg, active = self.status.len(), "remove");
        self.check()
    }

    fn check(&self) -> Result<(), Error> {
        if self.check_invariants {
            self.status.validate().map_err(Error::CorruptStatus)?;
        }
        Ok(())
    }
}

fn status_error(e: StatusError<SegIdx>) -> Error {
    match e {
        StatusError::MissingId(seg) => Error::UnknownSegment(seg),
        StatusError::DuplicateId(seg) => Error::DuplicateSegment(seg),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn entry(origin: Point, p0: (f64, f64), p1: (f64, f64), anchor: (f64, f64)) -> Entry {
        Entry::new(&Segment::new(p0, p1), &origin, anchor.into())
    }

    #[test]
    fn closer_along_ray() {
        let o = Point::new(0.0, 0.0);
        let ray = Ray::from_angle(o, 0.0);
        let wall = entry(o, (10.0, -10.0), (10.0, 10.0), (10.0, 0.0));
        let blocker = entry(o, (5.0, -1.0), (5.0, 1.0), (5.0, 0.0));
        assert!(is_closer(&ray, &blocker, &wall));
        assert!(!is_closer(&ray, &wall, &blocker));

        // The input orientation of the old segment doesn't matter.
        let flipped = entry(o, (10.0, 10.0), (10.0, -10.0), (10.0, 0.0));
        assert!(is_closer(&ray, &blocker, &flipped));
    }

    #[test]
    fn shared_endpoint() {
        // Two walls meeting at a corner, just as the ray reaches the corner.
        let o = Point::new(0.0, 0.0);
        let ray = Ray::from_angle(o, std::f64::consts::FRAC_PI_4);
        let right = entry(o, (10.0, -10.0), (10.0, 10.0), (10.0, 0.0));
        let top = entry(o, (10.0, 10.0), (-10.0, 10.0), (10.0, 10.0));
        assert!(is_closer(&ray, &top, &right));

        // A spike going outwards from the corner is behind the top wall.
        let spike = entry(o, (10.0, 10.0), (15.0, 20.0), (10.0, 10.0));
        assert!(!is_closer(&ray, &spike, &top));
        assert!(is_closer(&ray, &top, &spike));
    }

    #[test]
    fn radial() {
        let o = Point::new(0.0, 0.0);
        let ray = Ray::from_angle(o, std::f64::consts::FRAC_PI_4);
        let near = entry(o, (2.0, 2.0), (1.0, 1.0), (1.0, 1.0));
        let far = entry(o, (3.0, 3.0), (4.0, 4.0), (3.0, 3.0));
        assert!(!is_closer(&ray, &far, &near));
        assert!(is_closer(&ray, &near, &far));
    }

    #[test]
    fn insert_and_remove() {
        let o = Point::new(0.0, 0.0);
        let mut segs = Segments::default();
        let wall = segs.add((10.0, -10.0), (10.0, 10.0));
        let blocker = segs.add((5.0, -1.0), (5.0, 1.0));

        let mut line = SweepLine::new(o, &segs, true);
        assert_eq!(line.nearest(), None);
        line.insert(wall, Point::new(10.0, 0.0)).unwrap();
        line.insert(blocker, Point::new(5.0, 0.0)).unwrap();
        assert_eq!(line.active(), vec![blocker, wall]);
        assert_eq!(line.nearest(), Some(blocker));

        assert_matches!(
            line.insert(wall, Point::new(10.0, 0.0)),
            Err(Error::DuplicateSegment(s)) if s == wall
        );
        line.remove(blocker).unwrap();
        assert_eq!(line.nearest(), Some(wall));
        assert_matches!(line.remove(blocker), Err(Error::UnknownSegment(s)) if s == blocker);
        assert_eq!(line.len(), 1);
    }
}
