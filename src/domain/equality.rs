//! Equality, merge and deletion contracts, plus structural tree equality.
//!
//! The set algorithms take caller-supplied predicates. The functions here are
//! the defaults: compare raw values, keep the left value, always delete.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use generational_arena::Index;
use itertools::Itertools;
use siphasher::sip128::{Hasher128, SipHasher24};

use crate::domain::arena::Tree;
use crate::domain::node_ref::NodeRef;

/// Default matching predicate: nodes match when their values are equal.
/// Children are ignored.
pub fn value_equality<T: PartialEq, P>(left: NodeRef<'_, T, P>, right: NodeRef<'_, T, P>) -> bool {
    left.value() == right.value()
}

/// Default merge for union: the left operand's value wins.
pub fn keep_left<T: Clone>(left: &T, _right: &T) -> T {
    left.clone()
}

pub fn keep_right<T: Clone>(_left: &T, right: &T) -> T {
    right.clone()
}

/// Default deletion test for difference: a matched leaf is always deleted.
pub fn always_delete<T>(_left: &T, _right: &T) -> bool {
    true
}

/// Deletion test that only removes a matched leaf when both values are equal.
pub fn delete_if_equal<T: PartialEq>(left: &T, right: &T) -> bool {
    left == right
}

/// Deterministic hash of a single value (128-bit SipHash-2-4 with fixed keys,
/// folded to 64 bits).
pub fn value_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = SipHasher24::new();
    value.hash(&mut hasher);
    let hash = hasher.finish128();
    hash.h1 ^ hash.h2
}

impl<T, P> NodeRef<'_, T, P> {
    /// Order-independent hash of the subtree.
    ///
    /// The node's value hash plus the sum of its children's structural hashes,
    /// children sorted by hash first. Siblings may be permuted freely without
    /// changing the result.
    pub fn structural_hash(&self) -> u64
    where
        T: Hash,
    {
        let mut hashes: HashMap<Index, u64> = HashMap::new();
        for node in self.post_order() {
            let combined = node
                .children()
                .filter_map(|child| hashes.remove(&child.index()))
                .sorted_unstable()
                .fold(value_hash(node.value()), u64::wrapping_add);
            hashes.insert(node.index(), combined);
        }
        hashes.remove(&self.index()).unwrap_or_default()
    }

    /// Hash-based deep equality: equal values, equal child counts and equal
    /// structural hashes.
    ///
    /// Sibling order is ignored. Two different trees may collide on the hash;
    /// use [`NodeRef::exact_eq`] when that matters.
    pub fn structural_eq<Q>(&self, other: &NodeRef<'_, T, Q>) -> bool
    where
        T: PartialEq + Hash,
    {
        self.value() == other.value()
            && self.child_count() == other.child_count()
            && self.structural_hash() == other.structural_hash()
    }

    /// Exact deep equality, sibling order ignored.
    ///
    /// Children are paired as multisets: every child must find a distinct,
    /// exactly equal partner on the other side.
    pub fn exact_eq<Q>(&self, other: &NodeRef<'_, T, Q>) -> bool
    where
        T: PartialEq,
    {
        if self.value() != other.value() || self.child_count() != other.child_count() {
            return false;
        }
        let mut pool: Vec<NodeRef<'_, T, Q>> = other.children().collect();
        self.children().all(|child| {
            match pool.iter().position(|candidate| child.exact_eq(candidate)) {
                Some(position) => {
                    pool.swap_remove(position);
                    true
                }
                None => false,
            }
        })
    }
}

impl<T: PartialEq + Hash, P> PartialEq for Tree<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.root().structural_eq(&other.root())
    }
}

impl<T: Eq + Hash, P> Eq for Tree<T, P> {}

impl<T: Hash, P> Hash for Tree<T, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.root().structural_hash());
    }
}
