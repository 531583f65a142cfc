use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::{
    geom::{Point, Ray},
    heap::{Heap, Polarity},
    num::Tolerance,
    segments::{SegIdx, Segments},
    Error,
};

use super::{
    event::{oriented_endpoints, Event, EventKind},
    observer::SweepObserver,
    sweep_line::SweepLine,
};

/// Knobs for a visibility sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SweepOptions {
    /// Event angles closer than this are considered equal.
    pub tolerance: Tolerance,
    /// Validate the status structure after every change, failing with
    /// [`Error::CorruptStatus`] if it's broken.
    ///
    /// This makes every step linear instead of logarithmic. The `slow-asserts`
    /// feature turns it on unconditionally.
    pub check_invariants: bool,
}

type EventQueue = Heap<Event, Box<dyn Fn(&Event, &Event) -> Ordering>>;

/// Runs a radial sweep one event at a time.
///
/// Most callers want [`crate::visible_segments`] instead; this is for when
/// you want to watch the sweep's progress.
pub struct Sweeper<'segs> {
    segments: &'segs Segments,
    line: SweepLine<'segs>,
    queue: EventQueue,
    tolerance: Tolerance,
    visible: BTreeSet<SegIdx>,
    events_processed: usize,
}

impl std::fmt::Debug for Sweeper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper")
            .field("line", &self.line)
            .field("queue", &self.queue)
            .field("visible", &self.visible)
            .finish()
    }
}

impl<'segs> Sweeper<'segs> {
    /// Prepares a sweep around `origin`.
    ///
    /// This checks the input, queues up the events and inserts every segment
    /// that crosses the initial ray (the one at angle zero).
    pub fn new(
        origin: Point,
        segments: &'segs Segments,
        options: &SweepOptions,
        observer: &mut impl SweepObserver,
    ) -> Result<Self, Error> {
        check_input(&origin, segments)?;

        let tol = options.tolerance;
        let mut events = Vec::with_capacity(2 * segments.len());
        let mut seeds = Vec::new();
        for (idx, seg) in segments.iter() {
            let [insert, delete] = Event::pair(idx, seg, &origin, tol);
            // If the ray leaves the segment before it enters it, the segment
            // wraps around angle zero and is already crossing the initial ray.
            if delete.sweep_order(&insert, tol) == Ordering::Less {
                seeds.push(idx);
            }
            events.push(insert);
            events.push(delete);
        }

        let mut line = SweepLine::new(origin, segments, options.check_invariants);
        observer.ray_moved(line.ray());
        let initial_ray = Ray::from_angle(origin, 0.0);
        for &idx in &seeds {
            let seg = &segments[idx];
            // A segment that only gets within tolerance of the initial ray
            // is anchored at the endpoint where the sweep leaves it.
            let anchor = initial_ray
                .hit(seg)
                .unwrap_or_else(|| oriented_endpoints(seg, &origin).1);
            line.insert(idx, anchor)?;
            observer.plot(idx, seg);
        }

        let cmp: Box<dyn Fn(&Event, &Event) -> Ordering> =
            Box::new(move |a: &Event, b: &Event| a.sweep_order(b, tol));
        let queue = Heap::from_vec(Polarity::Min, cmp, events);

        tracing::debug!(
            segments = segments.len(),
            events = queue.len(),
            seeded = seeds.len(),
            "starting radial sweep"
        );

        Ok(Sweeper {
            segments,
            line,
            queue,
            tolerance: tol,
            visible: BTreeSet::new(),
            events_processed: 0,
        })
    }

    /// The current sweep line.
    pub fn line(&self) -> &SweepLine<'segs> {
        &self.line
    }

    /// The number of events that haven't been processed yet.
    pub fn remaining_events(&self) -> usize {
        self.queue.len()
    }

    /// The event that [`Sweeper::step`] will process next.
    pub fn peek(&self) -> Option<&Event> {
        self.queue.peek()
    }

    /// The segments found to be visible so far, in index order.
    pub fn visible(&self) -> impl Iterator<Item = SegIdx> + '_ {
        self.visible.iter().copied()
    }

    /// Processes the next event, returning it. Returns `None` once the events run out.
    ///
    /// The ray turns to the event's angle and the event is applied. Events at
    /// the same angle (up to the tolerance) form a group, inserts first. The
    /// nearest segment is only recorded at two points in a group: once all
    /// of its inserts are in, which is the view exactly along the ray, and
    /// once all of its deletes are out, which is the view until the next
    /// group. In between, the status structure is half-updated.
    pub fn step(&mut self, observer: &mut impl SweepObserver) -> Result<Option<Event>, Error> {
        let Some(ev) = self.queue.try_pop() else {
            return Ok(None);
        };
        tracing::trace!(kind = ?ev.kind, seg = ?ev.seg, angle = ev.angle, "event");

        self.line.rotate_to(ev.angle);
        observer.ray_moved(self.line.ray());
        self.apply(&ev, observer)?;

        let group_continues = self.queue.peek().is_some_and(|next| {
            next.kind == ev.kind && self.tolerance.approx_eq(next.angle, ev.angle)
        });
        if !group_continues {
            self.record_nearest(observer);
        }
        self.events_processed += 1;
        Ok(Some(ev))
    }

    fn apply(&mut self, ev: &Event, observer: &mut impl SweepObserver) -> Result<(), Error> {
        let seg = &self.segments[ev.seg];
        match ev.kind {
            EventKind::Insert => {
                self.line.insert(ev.seg, ev.point)?;
                observer.plot(ev.seg, seg);
            }
            EventKind::Delete => {
                self.line.remove(ev.seg)?;
                observer.hide(ev.seg, seg);
            }
        }
        Ok(())
    }

    /// Runs the sweep to the end, returning the visible segments in index order.
    pub fn finish(mut self, observer: &mut impl SweepObserver) -> Result<Vec<SegIdx>, Error> {
        // The last group's read also covers the wrap-around to the first
        // group, since by then the status structure holds exactly the
        // segments that crossed the initial ray.
        while self.step(observer)?.is_some() {}

        tracing::debug!(
            events = self.events_processed,
            visible = self.visible.len(),
            "finished radial sweep"
        );
        Ok(self.visible.into_iter().collect())
    }

    fn record_nearest(&mut self, observer: &mut impl SweepObserver) {
        if let Some(idx) = self.line.nearest() {
            if self.visible.insert(idx) {
                tracing::trace!(?idx, "visible");
                observer.highlight(idx, &self.segments[idx]);
            }
        }
    }
}

pub(crate) fn check_input(origin: &Point, segments: &Segments) -> Result<(), Error> {
    if origin.x.is_nan() || origin.y.is_nan() || segments.any_nan() {
        return Err(Error::NaN);
    }
    if !origin.is_finite() || !segments.all_finite() {
        return Err(Error::Infinity);
    }
    if let Some((idx, _)) = segments.iter().find(|(_, seg)| seg.has_inside(origin)) {
        return Err(Error::ContainsOrigin(idx));
    }
    Ok(())
}

/// Finds every segment that is the nearest obstruction along some ray from `origin`.
///
/// The result is sorted by index, with no duplicates.
pub fn sweep(
    origin: Point,
    segments: &Segments,
    options: &SweepOptions,
    mut observer: impl SweepObserver,
) -> Result<Vec<SegIdx>, Error> {
    Sweeper::new(origin, segments, options, &mut observer)?.finish(&mut observer)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;
    use kurbo::ParamCurveNearest;

    use crate::geom::{angle_from_origin, Segment};

    fn checked() -> SweepOptions {
        SweepOptions {
            check_invariants: true,
            ..SweepOptions::default()
        }
    }

    fn run(origin: (f64, f64), segs: &Segments) -> Vec<SegIdx> {
        sweep(origin.into(), segs, &checked(), ()).unwrap()
    }

    fn idxs(xs: &[usize]) -> Vec<SegIdx> {
        xs.iter().copied().map(SegIdx).collect()
    }

    fn room() -> Segments {
        let mut segs = Segments::default();
        segs.add_cycle([(10.0, -10.0), (10.0, 10.0), (-10.0, 10.0), (-10.0, -10.0)]);
        segs
    }

    // Casts a ray between every pair of angularly adjacent endpoints.
    fn brute_force(origin: Point, segs: &Segments) -> Vec<SegIdx> {
        let mut angles: Vec<f64> = segs
            .segments()
            .flat_map(|s| [s.p0, s.p1])
            .map(|p| angle_from_origin(&origin, &p))
            .collect();
        angles.sort_by(f64::total_cmp);
        angles.dedup();

        let mut visible = BTreeSet::new();
        for (i, &a) in angles.iter().enumerate() {
            let b = angles.get(i + 1).copied().unwrap_or(angles[0] + TAU);
            let ray = Ray::from_angle(origin, (a + b) / 2.0);
            let nearest = segs
                .iter()
                .filter_map(|(idx, s)| ray.hit(s).map(|p| (origin.distance_to(&p), idx)))
                .min_by(|x, y| x.0.total_cmp(&y.0));
            if let Some((_, idx)) = nearest {
                visible.insert(idx);
            }
        }
        visible.into_iter().collect()
    }

    #[test]
    fn empty() {
        assert_eq!(run((0.0, 0.0), &Segments::default()), vec![]);
    }

    #[test]
    fn square_room() {
        assert_eq!(run((0.0, 0.0), &room()), idxs(&[0, 1, 2, 3]));
        assert_eq!(run((3.0, -7.0), &room()), idxs(&[0, 1, 2, 3]));
    }

    #[test]
    fn wall_behind_a_wide_blocker() {
        let mut segs = room();
        // This covers the whole angular extent of the right wall.
        segs.add((5.0, -5.5), (5.0, 5.5));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[1, 2, 3, 4]));
    }

    #[test]
    fn wall_behind_a_short_blocker() {
        let mut segs = room();
        segs.add((5.0, -1.0), (5.0, 1.0));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[0, 1, 2, 3, 4]));
    }

    #[test]
    fn collinear_at_the_same_angle() {
        let mut segs = Segments::default();
        segs.add((1.0, 1.0), (2.0, 2.0));
        segs.add((3.0, 3.0), (4.0, 4.0));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[0]));

        // Listing them the other way around changes nothing.
        let mut segs = Segments::default();
        segs.add((4.0, 4.0), (3.0, 3.0));
        segs.add((2.0, 2.0), (1.0, 1.0));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[1]));
    }

    #[test]
    fn single_segment() {
        let mut segs = Segments::default();
        segs.add((1.0, 1.0), (2.0, 1.0));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[0]));
    }

    #[test]
    fn zero_length() {
        let mut segs = Segments::default();
        segs.add((1.0, 1.0), (1.0, 1.0));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[0]));

        // Hidden behind a wall.
        segs.add((0.5, -1.0), (0.5, 2.0));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[1]));
    }

    #[test]
    fn hidden_behind_a_nearer_segment() {
        let mut segs = Segments::default();
        segs.add((2.0, 1.0), (1.0, 2.0));
        segs.add((4.0, 2.5), (2.5, 4.0));
        assert_eq!(run((0.0, 0.0), &segs), idxs(&[0]));
    }

    // Sweeps the segments, and again with their order reversed, and checks
    // that both agree (once the indices are translated back).
    fn run_both_ways(origin: (f64, f64), segs: &[Segment]) -> Vec<SegIdx> {
        let forward: Segments = segs.iter().cloned().collect();
        let backward: Segments = segs.iter().rev().cloned().collect();
        let n = segs.len();

        let visible = run(origin, &forward);
        let mut reversed: Vec<_> = run(origin, &backward)
            .into_iter()
            .map(|idx| SegIdx(n - 1 - idx.0))
            .collect();
        reversed.sort();
        assert_eq!(visible, reversed);
        visible
    }

    #[test]
    fn shared_insert_endpoint() {
        // Both start at (5, 1), but the second one is in front of the first
        // at every angle.
        let hidden = Segment::new((5.0, 1.0), (9.0, 3.0));
        let wall = Segment::new((5.0, 1.0), (5.0, 5.0));
        assert_eq!(run_both_ways((0.0, 0.0), &[hidden, wall]), idxs(&[1]));
    }

    #[test]
    fn shared_delete_endpoint() {
        let wall = Segment::new((5.0, -3.0), (5.0, 1.0));
        let hidden = Segment::new((9.0, -1.0), (5.0, 1.0));
        assert_eq!(run_both_ways((0.0, 0.0), &[wall, hidden]), idxs(&[0]));
    }

    #[test]
    fn shared_endpoint_off_center() {
        let hidden = Segment::new((1.0, -5.0), (2.0, 0.0));
        let wall = Segment::new((1.0, 1.0), (1.0, -5.0));
        assert_eq!(run_both_ways((0.5, 0.25), &[hidden, wall]), idxs(&[1]));
    }

    #[test]
    fn chain_of_segments() {
        // A zig-zag, every part of which can be seen.
        let mut segs = Vec::new();
        let pts = [(8.0, -6.0), (6.0, -2.0), (9.0, 1.0), (5.0, 4.0), (7.0, 8.0)];
        for w in pts.windows(2) {
            segs.push(Segment::new(w[0], w[1]));
        }
        assert_eq!(run_both_ways((0.0, 0.0), &segs), idxs(&[0, 1, 2, 3]));
    }

    #[test]
    fn bad_input() {
        let mut segs = Segments::default();
        segs.add((-1.0, 0.0), (1.0, 0.0));
        assert_matches!(
            sweep(Point::new(0.0, 0.0), &segs, &SweepOptions::default(), ()),
            Err(Error::ContainsOrigin(SegIdx(0)))
        );
        // The origin being an endpoint counts too.
        assert_matches!(
            sweep(Point::new(1.0, 0.0), &segs, &SweepOptions::default(), ()),
            Err(Error::ContainsOrigin(SegIdx(0)))
        );

        let mut segs = room();
        segs.push(Segment {
            p0: Point { x: 1.0, y: f64::NAN },
            p1: Point { x: 2.0, y: 2.0 },
        });
        assert_matches!(
            sweep(Point::new(0.0, 0.0), &segs, &SweepOptions::default(), ()),
            Err(Error::NaN)
        );

        let segs = room();
        let origin = Point {
            x: f64::INFINITY,
            y: 0.0,
        };
        assert_matches!(
            sweep(origin, &segs, &SweepOptions::default(), ()),
            Err(Error::Infinity)
        );
    }

    #[test]
    fn stepping() {
        #[derive(Default)]
        struct Counter {
            rays: usize,
            plotted: Vec<SegIdx>,
            hidden: Vec<SegIdx>,
            highlighted: Vec<SegIdx>,
        }

        impl SweepObserver for Counter {
            fn ray_moved(&mut self, _ray: &Ray) {
                self.rays += 1;
            }
            fn plot(&mut self, idx: SegIdx, _seg: &Segment) {
                self.plotted.push(idx);
            }
            fn hide(&mut self, idx: SegIdx, _seg: &Segment) {
                self.hidden.push(idx);
            }
            fn highlight(&mut self, idx: SegIdx, _seg: &Segment) {
                self.highlighted.push(idx);
            }
        }

        let segs = room();
        let mut obs = Counter::default();
        let mut sweeper =
            Sweeper::new(Point::new(0.0, 0.0), &segs, &checked(), &mut obs).unwrap();
        // The right wall crosses the initial ray.
        assert_eq!(sweeper.line().active(), idxs(&[0]));
        assert_eq!(sweeper.remaining_events(), 8);
        assert_eq!(sweeper.peek().map(|ev| ev.kind), Some(EventKind::Insert));

        // At the top-right corner, the top wall comes in before the right
        // wall goes out. Along the ray through the corner, the top wall is
        // the one in front.
        let ev = sweeper.step(&mut obs).unwrap().unwrap();
        assert_eq!(ev.kind, EventKind::Insert);
        assert_eq!(ev.seg, SegIdx(1));
        assert_eq!(sweeper.visible().collect::<Vec<_>>(), idxs(&[1]));

        let ev = sweeper.step(&mut obs).unwrap().unwrap();
        assert_eq!(ev.kind, EventKind::Delete);
        assert_eq!(ev.seg, SegIdx(0));
        assert_eq!(sweeper.line().active(), idxs(&[1]));

        let visible = sweeper.finish(&mut obs).unwrap();
        assert_eq!(visible, idxs(&[0, 1, 2, 3]));
        assert_eq!(obs.rays, 9);
        assert_eq!(obs.plotted, idxs(&[0, 1, 2, 3, 0]));
        assert_eq!(obs.hidden, idxs(&[0, 1, 2, 3]));
        assert_eq!(obs.highlighted, idxs(&[1, 2, 3, 0]));
    }

    #[test]
    fn default_options() {
        let opts = SweepOptions::default();
        assert_eq!(opts.tolerance, Tolerance::DEFAULT);
        assert!(!opts.check_invariants);
    }

    fn far_from_origin(seg: &Segment, origin: Point) -> bool {
        let nearest = seg.to_kurbo().nearest(origin.to_kurbo(), 1e-9);
        nearest.distance_sq > 1.0
    }

    // Do `a` and `b` meet only at one shared endpoint, or not at all?
    fn touch_at_most_at_an_endpoint(a: &Segment, b: &Segment) -> bool {
        let shared = [a.p0, a.p1].into_iter().filter(|p| b.contains_endpoint(p)).count();
        match shared {
            0 => !a.intersects(b),
            1 => {
                let a_other = if b.contains_endpoint(&a.p0) { a.p1 } else { a.p0 };
                let b_other = if a.contains_endpoint(&b.p0) { b.p1 } else { b.p0 };
                !a.intersects_interior(b) && !b.has_inside(&a_other) && !a.has_inside(&b_other)
            }
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn matches_brute_force(
            origin in (-100.0..100.0, -100.0..100.0),
            raw in prop::collection::vec(
                (
                    prop::option::of(0usize..32),
                    (-100.0..100.0, -100.0..100.0),
                    (-100.0..100.0, -100.0..100.0),
                ),
                1..12
            )
        ) {
            let origin = Point::from(origin);
            let mut segs: Vec<Segment> = Vec::new();
            for (share, p0, p1) in raw {
                // Sometimes start at an endpoint of an earlier segment.
                let p0 = match share {
                    Some(i) if !segs.is_empty() => {
                        let s = &segs[i % segs.len()];
                        if i % 2 == 0 { s.p0 } else { s.p1 }
                    }
                    _ => p0.into(),
                };
                let seg = Segment::new(p0, p1);
                if seg.length() < 1.0 || !far_from_origin(&seg, origin) {
                    continue;
                }
                if !segs.iter().all(|other| touch_at_most_at_an_endpoint(other, &seg)) {
                    continue;
                }
                segs.push(seg);
            }

            let visible = run_both_ways((origin.x, origin.y), &segs);
            let all: Segments = segs.into_iter().collect();
            prop_assert_eq!(visible, brute_force(origin, &all));
        }
    }
}
