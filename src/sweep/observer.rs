use crate::{geom::Ray, geom::Segment, segments::SegIdx};

/// Hooks for watching a sweep as it runs, for drawing or animating it.
///
/// Every method has a default that does nothing, and `()` implements this
/// trait with all the defaults. The sweep's result never depends on the
/// observer.
pub trait SweepObserver {
    /// The sweep ray now points somewhere new.
    fn ray_moved(&mut self, _ray: &Ray) {}

    /// A segment entered the status structure.
    fn plot(&mut self, _idx: SegIdx, _seg: &Segment) {}

    /// A segment left the status structure.
    fn hide(&mut self, _idx: SegIdx, _seg: &Segment) {}

    /// A segment was found to be visible (for the first time).
    fn highlight(&mut self, _idx: SegIdx, _seg: &Segment) {}
}

impl SweepObserver for () {}

impl<O: SweepObserver + ?Sized> SweepObserver for &mut O {
    fn ray_moved(&mut self, ray: &Ray) {
        (**self).ray_moved(ray);
    }

    fn plot(&mut self, idx: SegIdx, seg: &Segment) {
        (**self).plot(idx, seg);
    }

    fn hide(&mut self, idx: SegIdx, seg: &Segment) {
        (**self).hide(idx, seg);
    }

    fn highlight(&mut self, idx: SegIdx, seg: &Segment) {
        (**self).highlight(idx, seg);
    }
}
