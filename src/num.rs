//! Floating-point ordering and tolerance helpers.

use std::cmp::Ordering;
use std::hash::Hash;

/// A wrapper for `f64` that implements `Ord`.
///
/// Unlike the more principled wrappers in the `ordered_float` crate, this
/// one doesn't order NaNs or guard against them on construction: NaNs compare
/// as equal to everything. We reject non-finite input before it gets anywhere
/// near a comparison, so that never matters in practice.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CheapOrderedFloat(f64);

impl CheapOrderedFloat {
    /// Retrieve the inner `f64`.
    pub fn into_inner(self) -> f64 {
        self.0
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(value: f64) -> Self {
        CheapOrderedFloat(value)
    }
}

impl Hash for CheapOrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

// Now comes the fishy stuff.
impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 < other.0 {
            Ordering::Less
        } else if self.0 > other.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// An absolute tolerance for deciding when two angles (or distances) are "the same".
///
/// Geometric predicates are exact under real arithmetic, but we evaluate them
/// in floating point. Event angles that differ by less than the tolerance are
/// treated as ties and resolved by the sweep's tie-break rules.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tolerance(f64);

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::DEFAULT
    }
}

impl Tolerance {
    /// The tolerance used unless you ask for something else.
    pub const DEFAULT: Tolerance = Tolerance(1e-7);

    /// Creates a new tolerance.
    ///
    /// `eps` should be finite and non-negative.
    pub fn new(eps: f64) -> Self {
        debug_assert!(eps.is_finite() && eps >= 0.0);
        Tolerance(eps)
    }

    /// The raw tolerance.
    pub fn eps(self) -> f64 {
        self.0
    }

    /// Are `a` and `b` within tolerance of one another?
    #[inline]
    pub fn approx_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.0
    }

    /// Compares `a` and `b`, declaring them equal if they're within tolerance.
    ///
    /// This is not a total order (it isn't transitive), so don't sort with it
    /// unless you're happy with the consequences.
    #[inline]
    pub fn cmp(self, a: f64, b: f64) -> Ordering {
        if self.approx_eq(a, b) {
            Ordering::Equal
        } else {
            CheapOrderedFloat(a).cmp(&CheapOrderedFloat(b))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    // Kind of like Arbitrary, but
    // - it's a local trait, so we can impl it for whatever we want, and
    // - it only returns "reasonable" values.
    pub trait Reasonable {
        type Strategy: Strategy<Value = Self>;
        fn reasonable() -> Self::Strategy;
    }

    impl<S: Reasonable, T: Reasonable> Reasonable for (S, T) {
        type Strategy = (S::Strategy, T::Strategy);

        fn reasonable() -> Self::Strategy {
            (S::reasonable(), T::reasonable())
        }
    }

    impl Reasonable for f64 {
        type Strategy = BoxedStrategy<f64>;

        fn reasonable() -> Self::Strategy {
            (-1e3..1e3).boxed()
        }
    }

    #[test]
    fn tolerance_ties() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.approx_eq(1.0, 1.0 + 5e-8));
        assert!(!tol.approx_eq(1.0, 1.0 + 2e-7));
        assert_eq!(tol.cmp(0.5, 0.5 + 1e-9), Ordering::Equal);
        assert_eq!(tol.cmp(0.5, 0.6), Ordering::Less);
        assert_eq!(tol.cmp(0.6, 0.5), Ordering::Greater);
    }

    proptest! {
        #[test]
        fn cheap_ordering_matches_partial_cmp(a in f64::reasonable(), b in f64::reasonable()) {
            prop_assert_eq!(
                Some(CheapOrderedFloat::from(a).cmp(&CheapOrderedFloat::from(b))),
                a.partial_cmp(&b)
            );
        }
    }
}
