use std::fmt;

use rand::Rng;

/// Fixed-width set of node indices backed by a single `u128` bitmask.
/// Equality and hashing are by membership only, so insertion order never matters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeSet(u128);

impl NodeSet {
    /// Largest node count a `NodeSet` can describe.
    pub const CAPACITY: usize = 128;

    /// Create an empty set.
    pub const fn empty() -> Self {
        NodeSet(0)
    }

    /// Create the set `{0, .., n-1}`. `n` is clamped to `CAPACITY`.
    pub fn full(n: usize) -> Self {
        if n >= Self::CAPACITY {
            NodeSet(u128::MAX)
        } else {
            NodeSet((1u128 << n) - 1)
        }
    }

    /// Insert a node. Returns `true` if it was not present before.
    /// Indices at or above `CAPACITY` are ignored.
    pub fn insert(&mut self, node: usize) -> bool {
        if node >= Self::CAPACITY {
            return false;
        }
        let was_absent = !self.contains(node);
        self.0 |= 1u128 << node;
        was_absent
    }

    /// Remove a node. Returns `true` if it was present.
    pub fn remove(&mut self, node: usize) -> bool {
        if !self.contains(node) {
            return false;
        }
        self.0 &= !(1u128 << node);
        true
    }

    pub fn contains(&self, node: usize) -> bool {
        node < Self::CAPACITY && self.0 & (1u128 << node) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: NodeSet) -> NodeSet {
        NodeSet(self.0 | other.0)
    }

    pub fn intersection(self, other: NodeSet) -> NodeSet {
        NodeSet(self.0 & other.0)
    }

    pub fn difference(self, other: NodeSet) -> NodeSet {
        NodeSet(self.0 & !other.0)
    }

    pub fn is_subset(&self, other: &NodeSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn is_disjoint(&self, other: &NodeSet) -> bool {
        self.0 & other.0 == 0
    }

    /// Lowest node index in the set.
    pub fn first(&self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// The `k`-th smallest member, if the set has more than `k` members.
    pub fn nth(&self, k: usize) -> Option<usize> {
        self.iter().nth(k)
    }

    /// Pick a member uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        self.nth(rng.gen_range(0..self.len()))
    }

    /// Iterate members in ascending index order.
    pub fn iter(&self) -> NodeSetIter {
        NodeSetIter { remaining: self.0 }
    }
}

/// Ascending iterator over the members of a `NodeSet`.
#[derive(Debug, Clone)]
pub struct NodeSetIter {
    remaining: u128,
}

impl Iterator for NodeSetIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for NodeSetIter {}

impl IntoIterator for NodeSet {
    type Item = usize;
    type IntoIter = NodeSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &NodeSet {
    type Item = usize;
    type IntoIter = NodeSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<usize> for NodeSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = NodeSet::empty();
        for node in iter {
            set.insert(node);
        }
        set
    }
}

impl From<u128> for NodeSet {
    /// Allow for explicit conversion from a raw bitmask.
    fn from(bits: u128) -> Self {
        NodeSet(bits)
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, node) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        f.write_str("}")
    }
}

/// Identity of a belief state in the search tree.
/// Two states share a tree node iff both their infected and resistant sets are equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    infected: NodeSet,
    resistant: NodeSet,
}

impl StateKey {
    pub fn new(infected: NodeSet, resistant: NodeSet) -> Self {
        StateKey {
            infected,
            resistant,
        }
    }

    pub fn infected(&self) -> NodeSet {
        self.infected
    }

    pub fn resistant(&self) -> NodeSet {
        self.resistant
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(infected={}, resistant={})",
            self.infected, self.resistant
        )
    }
}
