/// Generates the boilerplate for an arena that is indexed by a dedicated
/// newtype instead of a bare `usize`.
///
/// Both types must already be declared, as `struct $vec_name<T> { inner: Vec<T> }`
/// and `struct $idx_name(usize)`. Mixing up indices into different arenas is
/// then a type error.
macro_rules! impl_typed_vec {
    ($vec_name:ident, $idx_name:ident, $dbg_prefix:expr) => {
        impl std::fmt::Debug for $idx_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", $dbg_prefix, self.0)
            }
        }

        #[allow(dead_code)]
        impl<T> $vec_name<T> {
            /// Creates an empty arena with room for `cap` elements.
            pub fn with_capacity(cap: usize) -> Self {
                Self {
                    inner: Vec::with_capacity(cap),
                }
            }

            /// The number of slots in this arena, including any that the
            /// owner considers vacant.
            pub fn len(&self) -> usize {
                self.inner.len()
            }

            /// Are there no slots at all?
            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }

            /// Appends an element, returning the index that refers to it.
            pub fn push(&mut self, elt: T) -> $idx_name {
                self.inner.push(elt);
                $idx_name(self.inner.len() - 1)
            }

            /// Returns the element at `idx`, if the index is in bounds.
            pub fn get(&self, idx: $idx_name) -> Option<&T> {
                self.inner.get(idx.0)
            }

            /// Iterates over indices and elements.
            pub fn iter(&self) -> impl Iterator<Item = ($idx_name, &T)> + '_ {
                self.inner
                    .iter()
                    .enumerate()
                    .map(|(idx, t)| ($idx_name(idx), t))
            }

            /// Removes the element at `idx`, moving the last element into its slot.
            pub fn swap_remove(&mut self, idx: $idx_name) -> T {
                self.inner.swap_remove(idx.0)
            }

            /// Removes every element, keeping the allocation.
            pub fn clear(&mut self) {
                self.inner.clear();
            }
        }

        impl<T> Default for $vec_name<T> {
            fn default() -> Self {
                Self { inner: Vec::new() }
            }
        }

        impl<T> std::ops::Index<$idx_name> for $vec_name<T> {
            type Output = T;

            fn index(&self, index: $idx_name) -> &Self::Output {
                &self.inner[index.0]
            }
        }

        impl<T> std::ops::IndexMut<$idx_name> for $vec_name<T> {
            fn index_mut(&mut self, index: $idx_name) -> &mut T {
                &mut self.inner[index.0]
            }
        }

        impl<T: std::fmt::Debug> std::fmt::Debug for $vec_name<T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_map().entries(self.iter()).finish()
            }
        }
    };
}
