use crate::geom::{Point, Segment};

/// An index into our segment arena.
///
/// Throughout this library, we assign identities to segments, so that we may
/// consider segments as different even if they have the same endpoints.
///
/// This index is used to identify a segment, whose data can be retrieved by looking
/// it up in [`Segments`]. (Of course, this index-as-identifier breaks down if there are
/// multiple `Segments` in flight. Just be careful not to mix them up.)
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SegIdx(pub usize);

impl std::fmt::Debug for SegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

/// An arena of line segments.
///
/// Segments are indexed by [`SegIdx`] in the order they were added, and can be
/// retrieved by indexing (i.e. with square brackets).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Segments {
    segs: Vec<Segment>,
}

fn pairs<T>(xs: &[T]) -> impl Iterator<Item = (&T, &T)> {
    xs.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
}

impl Segments {
    /// The number of line segments in this arena.
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Is this arena empty?
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// Iterate over all indices that can be used to index into this arena.
    pub fn indices(&self) -> impl Iterator<Item = SegIdx> {
        (0..self.segs.len()).map(SegIdx)
    }

    /// Iterate over all segments in this arena.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segs.iter()
    }

    /// Iterate over indices and segments together.
    pub fn iter(&self) -> impl Iterator<Item = (SegIdx, &Segment)> + '_ {
        self.segs.iter().enumerate().map(|(i, s)| (SegIdx(i), s))
    }

    /// Add a segment, returning its index.
    pub fn push(&mut self, seg: Segment) -> SegIdx {
        self.segs.push(seg);
        SegIdx(self.segs.len() - 1)
    }

    /// Add the segment between two points, returning its index.
    pub fn add(&mut self, p0: impl Into<Point>, p1: impl Into<Point>) -> SegIdx {
        self.push(Segment::new(p0, p1))
    }

    /// Add one segment for every consecutive pair of points.
    ///
    /// Unlike a polyline, the pairs don't share points: `[a, b, c, d]` gives
    /// the segments `a -- b` and `c -- d`. A trailing unpaired point is ignored.
    pub fn add_pairs<P: Into<Point>>(&mut self, ps: impl IntoIterator<Item = P>) {
        let ps: Vec<Point> = ps.into_iter().map(|p| p.into()).collect();
        for (p, q) in pairs(&ps) {
            self.add(*p, *q);
        }
    }

    /// Add a closed polyline: one segment per side, including the closing one.
    pub fn add_cycle<P: Into<Point>>(&mut self, ps: impl IntoIterator<Item = P>) {
        let ps: Vec<Point> = ps.into_iter().map(|p| p.into()).collect();
        if ps.len() <= 1 {
            return;
        }
        for (p, q) in ps.iter().zip(ps.iter().cycle().skip(1)) {
            self.add(*p, *q);
        }
    }

    /// Are all the endpoints finite?
    pub fn all_finite(&self) -> bool {
        self.segs.iter().all(|s| s.p0.is_finite() && s.p1.is_finite())
    }

    /// Does any coordinate of any endpoint contain a NaN?
    pub fn any_nan(&self) -> bool {
        self.segs
            .iter()
            .flat_map(|s| [s.p0.x, s.p0.y, s.p1.x, s.p1.y])
            .any(f64::is_nan)
    }

    /// The smallest axis-aligned rectangle containing every segment, together with `extra`.
    pub fn bounding_box(&self, extra: Point) -> kurbo::Rect {
        self.segs
            .iter()
            .flat_map(|s| [s.p0, s.p1])
            .fold(
                kurbo::Rect::from_points(extra.to_kurbo(), extra.to_kurbo()),
                |rect, p| rect.union_pt(p.to_kurbo()),
            )
    }
}

impl FromIterator<Segment> for Segments {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Segments {
            segs: iter.into_iter().collect(),
        }
    }
}

impl Extend<Segment> for Segments {
    fn extend<I: IntoIterator<Item = Segment>>(&mut self, iter: I) {
        self.segs.extend(iter);
    }
}

impl std::ops::Index<SegIdx> for Segments {
    type Output = Segment;

    fn index(&self, index: SegIdx) -> &Self::Output {
        &self.segs[index.0]
    }
}
