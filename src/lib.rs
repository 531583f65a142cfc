#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
#[cfg(feature = "debug-svg")]
pub mod debug_svg;
pub mod geom;
pub mod heap;
pub mod input;
mod num;
mod segments;
pub mod status;
pub mod sweep;

#[cfg(feature = "generators")]
pub mod generators;

pub use geom::{Point, Ray, Segment, Vector};
pub use input::Scene;
pub use num::{CheapOrderedFloat, Tolerance};
pub use segments::{SegIdx, Segments};
pub use sweep::{SweepObserver, SweepOptions};

use status::InvariantViolation;

/// The input was faulty, or the sweep went wrong.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// At least one of the inputs was infinite.
    Infinity,
    /// At least one of the inputs was not a number.
    NaN,
    /// A segment passes through the origin, so it's unclear what it hides.
    ContainsOrigin(SegIdx),
    /// Not enough points to make an origin and a segment.
    TooFewPoints {
        /// How many points there were.
        found: usize,
    },
    /// Tried to remove a segment that wasn't crossing the sweep ray.
    UnknownSegment(SegIdx),
    /// Tried to add a segment that was already crossing the sweep ray.
    DuplicateSegment(SegIdx),
    /// The status structure stopped being a red-black tree.
    CorruptStatus(InvariantViolation<SegIdx>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Infinity => write!(f, "one of the inputs was infinite"),
            Error::NaN => write!(f, "one of the inputs had a NaN"),
            Error::ContainsOrigin(idx) => write!(f, "segment {idx:?} contains the origin"),
            Error::TooFewPoints { found } => {
                write!(f, "need at least 3 points, but there were only {found}")
            }
            Error::UnknownSegment(idx) => {
                write!(f, "segment {idx:?} isn't in the status structure")
            }
            Error::DuplicateSegment(idx) => {
                write!(f, "segment {idx:?} is already in the status structure")
            }
            Error::CorruptStatus(e) => write!(f, "corrupt status structure: {e}"),
        }
    }
}

impl std::error::Error for Error {}

/// Finds the segments that are visible from `origin`.
///
/// A segment is visible if it's the first thing hit by some ray leaving
/// `origin`. The result is sorted by index.
///
/// ```
/// use raysweeper::{visible_segments, Point, SegIdx, Segments};
///
/// let mut segs = Segments::default();
/// let near = segs.add((2.0, -1.0), (2.0, 1.0));
/// let far = segs.add((4.0, -1.0), (4.0, 1.0));
/// assert_eq!(visible_segments(Point::new(0.0, 0.0), &segs).unwrap(), vec![near]);
/// # let _ = far;
/// ```
pub fn visible_segments(origin: Point, segments: &Segments) -> Result<Vec<SegIdx>, Error> {
    sweep::sweep(origin, segments, &SweepOptions::default(), ())
}

/// Like [`visible_segments`], but with options and an observer.
pub fn visible_segments_with(
    origin: Point,
    segments: &Segments,
    options: &SweepOptions,
    observer: impl SweepObserver,
) -> Result<Vec<SegIdx>, Error> {
    sweep::sweep(origin, segments, options, observer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_with_pillar() {
        let mut segs = Segments::default();
        segs.add_cycle([(10.0, -10.0), (10.0, 10.0), (-10.0, 10.0), (-10.0, -10.0)]);
        // A square pillar that hides the top-right corner.
        segs.add_cycle([(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]);

        let visible = visible_segments(Point::new(0.0, 0.0), &segs).unwrap();
        insta::assert_debug_snapshot!(visible, @r"
        [
            s_0,
            s_1,
            s_2,
            s_3,
            s_4,
            s_7,
        ]
        ");
    }

    #[test]
    fn checked_and_unchecked_agree() {
        let mut segs = Segments::default();
        segs.add_cycle([(3.0, 0.5), (7.0, 2.0), (1.0, 8.0), (-6.0, 3.0), (-2.0, -9.0)]);
        segs.add((2.0, -1.0), (2.0, 1.0));
        segs.add((-1.0, 2.0), (1.0, 2.5));

        let origin = Point::new(0.0, 0.0);
        let options = SweepOptions {
            check_invariants: true,
            ..Default::default()
        };
        assert_eq!(
            visible_segments(origin, &segs),
            visible_segments_with(origin, &segs, &options, ())
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::ContainsOrigin(SegIdx(4)).to_string(),
            "segment s_4 contains the origin"
        );
    }
}
