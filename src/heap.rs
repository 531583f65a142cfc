//! A binary heap with a caller-supplied ordering.
//!
//! `std::collections::BinaryHeap` wants an `Ord` element type, which doesn't
//! fit the sweep's event order: that one depends on a tolerance and is
//! only "mostly" transitive. This heap takes the comparison as a closure
//! instead, and can be either a min-heap or a max-heap.

use std::cmp::Ordering;

/// Which end of the order a [`Heap`] keeps at its root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Polarity {
    /// The smallest element comes out first.
    Min,
    /// The largest element comes out first.
    Max,
}

/// Turns a key-extraction function into a comparator.
///
/// ```
/// use raysweeper::heap::{by_key, Heap};
///
/// let mut heap = Heap::min_by(by_key(|s: &&'static str| s.len()));
/// heap.extend(["three", "a", "to"]);
/// assert_eq!(heap.pop(), "a");
/// ```
pub fn by_key<T, K: Ord>(key: impl Fn(&T) -> K) -> impl Fn(&T, &T) -> Ordering {
    move |a, b| key(a).cmp(&key(b))
}

/// A binary heap over a growable vector.
///
/// The children of `data[i]` live at `2i + 1` and `2i + 2`.
#[derive(Clone)]
pub struct Heap<T, C> {
    data: Vec<T>,
    polarity: Polarity,
    cmp: C,
}

/// A heap that uses its elements' natural order.
pub type OrdHeap<T> = Heap<T, fn(&T, &T) -> Ordering>;

impl<T: Ord> OrdHeap<T> {
    /// A min-heap in the natural order.
    pub fn min() -> Self {
        Heap::new(Polarity::Min, T::cmp as fn(&T, &T) -> Ordering)
    }

    /// A max-heap in the natural order.
    pub fn max() -> Self {
        Heap::new(Polarity::Max, T::cmp as fn(&T, &T) -> Ordering)
    }
}

impl<T, C: Fn(&T, &T) -> Ordering> Heap<T, C> {
    /// Creates an empty heap.
    pub fn new(polarity: Polarity, cmp: C) -> Self {
        Heap {
            data: Vec::new(),
            polarity,
            cmp,
        }
    }

    /// Creates an empty min-heap ordered by `cmp`.
    pub fn min_by(cmp: C) -> Self {
        Heap::new(Polarity::Min, cmp)
    }

    /// Creates an empty max-heap ordered by `cmp`.
    pub fn max_by(cmp: C) -> Self {
        Heap::new(Polarity::Max, cmp)
    }

    /// Builds a heap out of a vector in linear time.
    pub fn from_vec(polarity: Polarity, cmp: C, data: Vec<T>) -> Self {
        let mut ret = Heap {
            data,
            polarity,
            cmp,
        };
        for idx in (0..ret.data.len() / 2).rev() {
            ret.sink(idx);
        }
        ret
    }

    /// Which end of the order comes out first.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Are we empty?
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Adds an element.
    pub fn insert(&mut self, element: T) {
        self.data.push(element);
        self.promote(self.data.len() - 1);
    }

    /// The element that [`Heap::pop`] would return, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// Removes and returns the root: the minimum for a min-heap, the maximum
    /// for a max-heap.
    ///
    /// # Panics
    ///
    /// Panics if the heap is empty. See [`Heap::try_pop`] for a non-panicking version.
    pub fn pop(&mut self) -> T {
        match self.try_pop() {
            Some(top) => top,
            None => panic!("popped from an empty heap"),
        }
    }

    /// Removes and returns the root, or `None` if we're empty.
    pub fn try_pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let top = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sink(0);
        }
        Some(top)
    }

    /// Pops everything, in order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut ret = Vec::with_capacity(self.len());
        while let Some(x) = self.try_pop() {
            ret.push(x);
        }
        ret
    }

    // Should `a` sit above `b`? Ties count as "yes" for a min-heap; the
    // polarity flag flips the answer for a max-heap.
    fn above(&self, a: &T, b: &T) -> bool {
        ((self.cmp)(a, b) != Ordering::Greater) ^ (self.polarity == Polarity::Max)
    }

    fn promote(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.above(&self.data[parent], &self.data[idx]) {
                break;
            }
            self.data.swap(parent, idx);
            idx = parent;
        }
    }

    fn sink(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            if left >= self.data.len() {
                break;
            }
            let right = left + 1;
            let child = if right < self.data.len() && self.above(&self.data[right], &self.data[left])
            {
                right
            } else {
                left
            };

            if self.above(&self.data[idx], &self.data[child]) {
                break;
            }
            self.data.swap(idx, child);
            idx = child;
        }
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        for idx in 1..self.data.len() {
            let parent = (idx - 1) / 2;
            let ord = (self.cmp)(&self.data[parent], &self.data[idx]);
            match self.polarity {
                Polarity::Min => assert_ne!(ord, Ordering::Greater),
                Polarity::Max => assert_ne!(ord, Ordering::Less),
            }
        }
    }
}

impl<T, C: Fn(&T, &T) -> Ordering> Extend<T> for Heap<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for Heap<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap")
            .field("polarity", &self.polarity)
            .field("data", &self.data)
            .finish()
    }
}
