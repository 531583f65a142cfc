//! The sweep's status structure: a red-black tree under a caller-supplied order.
//!
//! The order between elements isn't a fixed property of the payload type. In
//! the visibility sweep, "closer to the origin" only makes sense for two
//! segments that both cross the current sweep ray, and the answer is only
//! valid while they do. So instead of requiring `P: Ord`, insertion takes a
//! comparison closure that sees whatever context it needs. Nothing about a
//! comparison is cached in the tree: the tree's shape is the only record of
//! past comparisons, and it stays valid for as long as the order between the
//! elements that are actually present doesn't change.
//!
//! Nodes live in an arena and refer to one another by [`NodeIdx`]. An absent
//! child or parent is `None`; absent nodes count as black.
//!
//! Each element has an id, and the tree keeps a map from ids to nodes so that
//! removal doesn't need to search (which would be impossible anyway, since the
//! order that placed an element may no longer be computable).

use std::collections::HashMap;
use std::hash::Hash;

/// An index of a node in a [`StatusTree`].
///
/// Node indices are invalidated by [`StatusTree::remove`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdx(usize);

#[derive(Clone)]
struct NodeVec<T> {
    inner: Vec<T>,
}

impl_typed_vec!(NodeVec, NodeIdx, "n");

/// The color of a red-black tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Color {
    /// Red nodes never have red children.
    Red,
    /// Every root-to-leaf path passes through the same number of black nodes.
    Black,
}

#[derive(Clone, Debug)]
struct Node<I, P> {
    id: I,
    payload: P,
    color: Color,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
    parent: Option<NodeIdx>,
}

/// Something went wrong with an id passed to a [`StatusTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusError<I> {
    /// Tried to remove (or look up) an id that isn't in the tree.
    MissingId(I),
    /// Tried to insert an id that's already in the tree.
    DuplicateId(I),
}

impl<I: std::fmt::Debug> std::fmt::Display for StatusError<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusError::MissingId(id) => write!(f, "id {id:?} is not in the tree"),
            StatusError::DuplicateId(id) => write!(f, "id {id:?} is already in the tree"),
        }
    }
}

impl<I: std::fmt::Debug> std::error::Error for StatusError<I> {}

/// A broken red-black tree property, naming the nodes (by id) where it's broken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation<I> {
    /// The root is red.
    RedRoot(I),
    /// These red nodes have a red child, but black heights are fine.
    RedRed(Vec<I>),
    /// These nodes have subtrees with different black heights, but there are no red-red edges.
    Unbalanced(Vec<I>),
    /// Both of the above.
    Both {
        /// Red nodes with a red child.
        red_red: Vec<I>,
        /// Nodes whose subtrees have different black heights.
        unbalanced: Vec<I>,
    },
    /// The parent/child links or the id map disagree at this node.
    Links(I),
}

impl<I: std::fmt::Debug> std::fmt::Display for InvariantViolation<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::RedRoot(id) => write!(f, "the root {id:?} is red"),
            InvariantViolation::RedRed(ids) => write!(f, "red nodes with red children: {ids:?}"),
            InvariantViolation::Unbalanced(ids) => {
                write!(f, "nodes with unequal black heights: {ids:?}")
            }
            InvariantViolation::Both {
                red_red,
                unbalanced,
            } => write!(
                f,
                "red nodes with red children: {red_red:?}; nodes with unequal black heights: {unbalanced:?}"
            ),
            InvariantViolation::Links(id) => write!(f, "inconsistent links at {id:?}"),
        }
    }
}

impl<I: std::fmt::Debug> std::error::Error for InvariantViolation<I> {}

/// A red-black tree of `(id, payload)` pairs, ordered by a comparison supplied at insertion time.
#[derive(Clone)]
pub struct StatusTree<I, P> {
    nodes: NodeVec<Node<I, P>>,
    root: Option<NodeIdx>,
    index: HashMap<I, NodeIdx>,
}

impl<I: Copy + Eq + Hash, P> Default for StatusTree<I, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Copy + Eq + Hash, P: Ord> StatusTree<I, P> {
    /// Inserts an element, using the payload's natural order.
    pub fn insert(&mut self, id: I, payload: P) -> Result<NodeIdx, StatusError<I>> {
        self.insert_by(id, payload, |new, old| new < old)
    }
}

impl<I: Copy + Eq + Hash, P> StatusTree<I, P> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: NodeVec::default(),
            root: None,
            index: HashMap::new(),
        }
    }

    /// Creates an empty tree with room for `cap` elements.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            nodes: NodeVec::with_capacity(cap),
            root: None,
            index: HashMap::with_capacity(cap),
        }
    }

    /// The number of elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Are we empty?
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.root = None;
    }

    /// The id stored at a node.
    pub fn id(&self, node: NodeIdx) -> I {
        self.nodes[node].id
    }

    /// The payload stored at a node.
    pub fn payload(&self, node: NodeIdx) -> &P {
        &self.nodes[node].payload
    }

    /// The color of a node.
    pub fn color(&self, node: NodeIdx) -> Color {
        self.nodes[node].color
    }

    /// Finds the node holding `id`.
    pub fn search(&self, id: I) -> Option<NodeIdx> {
        self.index.get(&id).copied()
    }

    /// Is `id` in the tree?
    pub fn contains(&self, id: I) -> bool {
        self.index.contains_key(&id)
    }

    /// Inserts an element.
    ///
    /// `is_less(new, existing)` decides whether the new payload goes to the
    /// left of an existing one. It is only ever called with the new payload
    /// as its first argument.
    pub fn insert_by(
        &mut self,
        id: I,
        payload: P,
        mut is_less: impl FnMut(&P, &P) -> bool,
    ) -> Result<NodeIdx, StatusError<I>> {
        if self.index.contains_key(&id) {
            return Err(StatusError::DuplicateId(id));
        }

        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(c) = cur {
            parent = Some(c);
            go_left = is_less(&payload, &self.nodes[c].payload);
            cur = if go_left {
                self.nodes[c].left
            } else {
                self.nodes[c].right
            };
        }

        let z = self.nodes.push(Node {
            id,
            payload,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        });
        match parent {
            None => self.root = Some(z),
            Some(p) if go_left => self.nodes[p].left = Some(z),
            Some(p) => self.nodes[p].right = Some(z),
        }
        self.index.insert(id, z);
        self.insert_fixup(z);
        Ok(z)
    }

    /// Removes the element with the given id, returning its payload.
    pub fn remove(&mut self, id: I) -> Result<P, StatusError<I>> {
        let z = self.search(id).ok_or(StatusError::MissingId(id))?;

        // y is the node that physically leaves the tree: z itself if it has
        // a free child slot, otherwise z's successor (which has no left child).
        let y = match (self.nodes[z].left, self.nodes[z].right) {
            (Some(_), Some(r)) => self.subtree_min(r),
            _ => z,
        };
        let x = self.nodes[y].left.or(self.nodes[y].right);
        let x_parent = self.nodes[y].parent;

        if let Some(x) = x {
            self.nodes[x].parent = x_parent;
        }
        self.replace_child(x_parent, y, x);

        if y != z {
            // Move the successor's element into z's node; y now carries the
            // element that's being removed.
            self.swap_elements(y, z);
            let moved = self.nodes[z].id;
            self.index.insert(moved, z);
        }

        if self.nodes[y].color == Color::Black {
            self.delete_fixup(x, x_parent);
        }

        self.index.remove(&id);
        Ok(self.free_slot(y).payload)
    }

    /// The leftmost node, or `None` if the tree is empty.
    pub fn minimum(&self) -> Option<NodeIdx> {
        self.root.map(|r| self.subtree_min(r))
    }

    /// The rightmost node, or `None` if the tree is empty.
    pub fn maximum(&self) -> Option<NodeIdx> {
        self.root.map(|r| self.subtree_max(r))
    }

    /// The node following `node` in order.
    pub fn successor(&self, node: NodeIdx) -> Option<NodeIdx> {
        if let Some(r) = self.nodes[node].right {
            return Some(self.subtree_min(r));
        }
        let mut x = node;
        let mut y = self.nodes[x].parent;
        while let Some(p) = y {
            if self.nodes[p].right != Some(x) {
                break;
            }
            x = p;
            y = self.nodes[p].parent;
        }
        y
    }

    /// The node preceding `node` in order.
    pub fn predecessor(&self, node: NodeIdx) -> Option<NodeIdx> {
        if let Some(l) = self.nodes[node].left {
            return Some(self.subtree_max(l));
        }
        let mut x = node;
        let mut y = self.nodes[x].parent;
        while let Some(p) = y {
            if self.nodes[p].left != Some(x) {
                break;
            }
            x = p;
            y = self.nodes[p].parent;
        }
        y
    }

    /// Iterates over ids and payloads, in order.
    pub fn iter(&self) -> Iter<'_, I, P> {
        Iter {
            tree: self,
            next: self.minimum(),
        }
    }

    /// All the ids, in order.
    pub fn ids_in_order(&self) -> Vec<I> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Checks the red-black properties and the consistency of the links.
    ///
    /// This walks the whole tree, so it's meant for tests and debugging.
    pub fn validate(&self) -> Result<(), InvariantViolation<I>> {
        let Some(root) = self.root else {
            let stray = self
                .nodes
                .iter()
                .map(|(_, n)| n.id)
                .next()
                .or_else(|| self.index.keys().next().copied());
            return match stray {
                Some(id) => Err(InvariantViolation::Links(id)),
                None => Ok(()),
            };
        };

        for (idx, node) in self.nodes.iter() {
            let linked_from_parent = match node.parent {
                None => self.root == Some(idx),
                Some(p) => self
                    .nodes
                    .get(p)
                    .is_some_and(|p| p.left == Some(idx) || p.right == Some(idx)),
            };
            let children_agree = [node.left, node.right]
                .into_iter()
                .flatten()
                .all(|c| self.nodes.get(c).is_some_and(|c| c.parent == Some(idx)));
            if !linked_from_parent || !children_agree || self.search(node.id) != Some(idx) {
                return Err(InvariantViolation::Links(node.id));
            }
        }
        if self.index.len() != self.nodes.len() {
            return Err(InvariantViolation::Links(self.nodes[root].id));
        }

        if self.nodes[root].color == Color::Red {
            return Err(InvariantViolation::RedRoot(self.nodes[root].id));
        }

        let mut red_red = Vec::new();
        let mut unbalanced = Vec::new();
        self.black_height(Some(root), &mut red_red, &mut unbalanced);
        match (red_red.is_empty(), unbalanced.is_empty()) {
            (true, true) => Ok(()),
            (false, true) => Err(InvariantViolation::RedRed(red_red)),
            (true, false) => Err(InvariantViolation::Unbalanced(unbalanced)),
            (false, false) => Err(InvariantViolation::Both {
                red_red,
                unbalanced,
            }),
        }
    }

    /// Like [`StatusTree::validate`], but panics on failure.
    pub fn check_invariants(&self)
    where
        I: std::fmt::Debug,
    {
        if let Err(e) = self.validate() {
            panic!("corrupt status tree: {e}");
        }
    }

    fn node_color(&self, node: Option<NodeIdx>) -> Color {
        node.map_or(Color::Black, |n| self.nodes[n].color)
    }

    fn subtree_min(&self, mut node: NodeIdx) -> NodeIdx {
        while let Some(l) = self.nodes[node].left {
            node = l;
        }
        node
    }

    fn subtree_max(&self, mut node: NodeIdx) -> NodeIdx {
        while let Some(r) = self.nodes[node].right {
            node = r;
        }
        node
    }

    // Points `parent`'s link to `old` (or the root, if `parent` is None) at `new`.
    fn replace_child(&mut self, parent: Option<NodeIdx>, old: NodeIdx, new: Option<NodeIdx>) {
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
    }

    fn rotate_left(&mut self, x: NodeIdx) {
        let Some(y) = self.nodes[x].right else {
            panic!("left rotation around {x:?}, which has no right child");
        };
        let y_left = self.nodes[y].left;
        self.nodes[x].right = y_left;
        if let Some(b) = y_left {
            self.nodes[b].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeIdx) {
        let Some(y) = self.nodes[x].left else {
            panic!("right rotation around {x:?}, which has no left child");
        };
        let y_right = self.nodes[y].right;
        self.nodes[x].left = y_right;
        if let Some(b) = y_right {
            self.nodes[b].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn insert_fixup(&mut self, mut z: NodeIdx) {
        while let Some(mut p) = self.nodes[z].parent {
            if self.nodes[p].color == Color::Black {
                break;
            }
            // A red node is never the root, so p has a parent.
            let Some(g) = self.nodes[p].parent else {
                break;
            };

            if self.nodes[g].left == Some(p) {
                let uncle = self.nodes[g].right;
                if let Some(u) = uncle.filter(|&u| self.nodes[u].color == Color::Red) {
                    self.nodes[p].color = Color::Black;
                    self.nodes[u].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    if self.nodes[p].right == Some(z) {
                        self.rotate_left(p);
                        std::mem::swap(&mut z, &mut p);
                    }
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.nodes[g].left;
                if let Some(u) = uncle.filter(|&u| self.nodes[u].color == Color::Red) {
                    self.nodes[p].color = Color::Black;
                    self.nodes[u].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    if self.nodes[p].left == Some(z) {
                        self.rotate_right(p);
                        std::mem::swap(&mut z, &mut p);
                    }
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_left(g);
                }
            }
        }
        if let Some(r) = self.root {
            self.nodes[r].color = Color::Black;
        }
    }

    // `x` carries an extra black. Since it might be absent, we track its parent separately.
    fn delete_fixup(&mut self, mut x: Option<NodeIdx>, mut parent: Option<NodeIdx>) {
        while x != self.root && self.node_color(x) == Color::Black {
            let Some(p) = parent else {
                break;
            };

            if self.nodes[p].left == x {
                let Some(mut w) = self.nodes[p].right else {
                    panic!("doubly-black node under {p:?} has no sibling");
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    let Some(new_w) = self.nodes[p].right else {
                        panic!("doubly-black node under {p:?} has no sibling");
                    };
                    w = new_w;
                }
                let (wl, wr) = (self.nodes[w].left, self.nodes[w].right);
                if self.node_color(wl) == Color::Black && self.node_color(wr) == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.node_color(wr) == Color::Black {
                        if let Some(wl) = wl {
                            self.nodes[wl].color = Color::Black;
                        }
                        self.nodes[w].color = Color::Red;
                        self.rotate_right(w);
                        let Some(new_w) = self.nodes[p].right else {
                            panic!("doubly-black node under {p:?} has no sibling");
                        };
                        w = new_w;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    if let Some(wr) = self.nodes[w].right {
                        self.nodes[wr].color = Color::Black;
                    }
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let Some(mut w) = self.nodes[p].left else {
                    panic!("doubly-black node under {p:?} has no sibling");
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    let Some(new_w) = self.nodes[p].left else {
                        panic!("doubly-black node under {p:?} has no sibling");
                    };
                    w = new_w;
                }
                let (wl, wr) = (self.nodes[w].left, self.nodes[w].right);
                if self.node_color(wl) == Color::Black && self.node_color(wr) == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.node_color(wl) == Color::Black {
                        if let Some(wr) = wr {
                            self.nodes[wr].color = Color::Black;
                        }
                        self.nodes[w].color = Color::Red;
                        self.rotate_left(w);
                        let Some(new_w) = self.nodes[p].left else {
                            panic!("doubly-black node under {p:?} has no sibling");
                        };
                        w = new_w;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    if let Some(wl) = self.nodes[w].left {
                        self.nodes[wl].color = Color::Black;
                    }
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        if let Some(x) = x {
            self.nodes[x].color = Color::Black;
        }
    }

    fn swap_elements(&mut self, a: NodeIdx, b: NodeIdx) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (first, second) = self.nodes.inner.split_at_mut(hi);
        let (x, y) = (&mut first[lo], &mut second[0]);
        std::mem::swap(&mut x.id, &mut y.id);
        std::mem::swap(&mut x.payload, &mut y.payload);
    }

    // Removes a node that is no longer linked into the tree. The arena's last
    // node moves into the vacated slot, so everything pointing at it gets updated.
    fn free_slot(&mut self, idx: NodeIdx) -> Node<I, P> {
        let last = NodeIdx(self.nodes.len() - 1);
        if idx != last {
            let Node {
                id,
                left,
                right,
                parent,
                ..
            } = self.nodes[last];
            self.replace_child(parent, last, Some(idx));
            if let Some(l) = left {
                self.nodes[l].parent = Some(idx);
            }
            if let Some(r) = right {
                self.nodes[r].parent = Some(idx);
            }
            self.index.insert(id, idx);
        }
        self.nodes.swap_remove(idx)
    }

    fn black_height(
        &self,
        node: Option<NodeIdx>,
        red_red: &mut Vec<I>,
        unbalanced: &mut Vec<I>,
    ) -> usize {
        let Some(n) = node else {
            return 1;
        };
        let node = &self.nodes[n];
        if node.color == Color::Red
            && (self.node_color(node.left) == Color::Red
                || self.node_color(node.right) == Color::Red)
        {
            red_red.push(node.id);
        }
        let lh = self.black_height(node.left, red_red, unbalanced);
        let rh = self.black_height(node.right, red_red, unbalanced);
        if lh != rh {
            unbalanced.push(node.id);
        }
        lh.max(rh) + usize::from(node.color == Color::Black)
    }

    fn fmt_subtree(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        node: Option<NodeIdx>,
        depth: usize,
    ) -> std::fmt::Result
    where
        I: std::fmt::Debug,
    {
        if let Some(n) = node {
            let node = &self.nodes[n];
            let color = match node.color {
                Color::Red => 'R',
                Color::Black => 'B',
            };
            writeln!(f, "{:indent$}{:?} {color}", "", node.id, indent = 3 * depth)?;
            self.fmt_subtree(f, node.left, depth + 1)?;
            self.fmt_subtree(f, node.right, depth + 1)?;
        }
        Ok(())
    }
}

impl<I: Copy + Eq + Hash + std::fmt::Debug, P> std::fmt::Debug for StatusTree<I, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "(size = {})", self.len())?;
        self.fmt_subtree(f, self.root, 0)
    }
}

/// An in-order iterator over a [`StatusTree`].
pub struct Iter<'a, I, P> {
    tree: &'a StatusTree<I, P>,
    next: Option<NodeIdx>,
}

impl<'a, I: Copy + Eq + Hash, P> Iterator for Iter<'a, I, P> {
    type Item = (I, &'a P);

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = self.tree.successor(cur);
        let node = &self.tree.nodes[cur];
        Some((node.id, &node.payload))
    }
}
