//! Structural set algebra: union, intersection and difference of two trees.
//!
//! All three walk both trees in lock step. Children of `self` are paired with
//! children of `other` through the matching predicate, with
//! [`select_candidate`] resolving ambiguous pools. Results are always fresh
//! trees; kept subtrees are deep-copied out of the operands. Union folds a
//! child into an equal sibling where the policy forbids repeats.

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::Tree;
use crate::domain::equality::{always_delete, keep_left, value_equality};
use crate::domain::node_ref::NodeRef;
use crate::domain::policy::ChildPolicy;
use crate::domain::similarity::select_candidate;

/// Child of `at` that `value` would duplicate under the policy.
fn clashing_child<T, P>(out: &Tree<T, P>, at: Index, value: &T) -> Option<Index>
where
    T: PartialEq,
    P: ChildPolicy,
{
    if out.admits_under(at, value) {
        return None;
    }
    out.entry(at)
        .children
        .iter()
        .copied()
        .find(|&child| out.entry(child).value == *value)
}

/// Copies `source` under `at`, folding it into an equal sibling the policy
/// would otherwise reject.
fn absorb<T, P>(out: &mut Tree<T, P>, at: Index, source: NodeRef<'_, T, P>)
where
    T: Clone + PartialEq,
    P: ChildPolicy,
{
    match clashing_child(out, at, source.value()) {
        Some(existing) => {
            for child in source.children() {
                absorb(out, existing, child);
            }
        }
        None => {
            out.graft_unchecked(at, source);
        }
    }
}

fn union_children<T, P, E, M>(
    out: &mut Tree<T, P>,
    at: Index,
    left: NodeRef<'_, T, P>,
    right: NodeRef<'_, T, P>,
    equality: &E,
    merge: &M,
) where
    T: Clone + PartialEq,
    P: ChildPolicy,
    E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
    M: Fn(&T, &T) -> T,
{
    let mut pool: Vec<NodeRef<'_, T, P>> = right.children().collect();
    for child in left.children() {
        let paired = select_candidate(child, &pool, equality)
            .filter(|selection| equality(child, pool[selection.position]));
        match paired {
            Some(selection) => {
                let candidate = pool.remove(selection.position);
                let value = merge(child.value(), candidate.value());
                let merged = match clashing_child(out, at, &value) {
                    Some(existing) => {
                        trace!("merged value repeats a sibling, unioned into it");
                        existing
                    }
                    None => out.attach(at, value),
                };
                union_children(out, merged, child, candidate, equality, merge);
            }
            None => absorb(out, at, child),
        }
    }
    for leftover in pool {
        absorb(out, at, leftover);
    }
}

fn intersection_children<T, P, E>(
    out: &mut Tree<T, P>,
    at: Index,
    left: NodeRef<'_, T, P>,
    right: NodeRef<'_, T, P>,
    equality: &E,
) where
    T: Clone + PartialEq,
    P: ChildPolicy,
    E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
{
    let mut pool: Vec<NodeRef<'_, T, P>> = right.children().collect();
    for child in left.children() {
        let Some(selection) = select_candidate(child, &pool, equality) else {
            continue;
        };
        let candidate = pool.remove(selection.position);
        if !equality(child, candidate) {
            continue;
        }
        let kept = out.attach(at, child.value().clone());
        intersection_children(out, kept, child, candidate, equality);
    }
}

fn difference_children<T, P, E, D>(
    out: &mut Tree<T, P>,
    at: Index,
    left: NodeRef<'_, T, P>,
    right: NodeRef<'_, T, P>,
    traversal: &E,
    deletion: &D,
) where
    T: Clone + PartialEq,
    P: ChildPolicy,
    E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
    D: Fn(&T, &T) -> bool,
{
    let mut pool: Vec<NodeRef<'_, T, P>> = right.children().collect();
    for child in left.children() {
        match select_candidate(child, &pool, traversal) {
            Some(selection) => {
                let candidate = pool.remove(selection.position);
                difference_node(out, at, child, candidate, traversal, deletion);
            }
            None => {
                out.graft_unchecked(at, child);
            }
        }
    }
}

/// Difference of one matched pair, attached under `at` unless it is deleted.
fn difference_node<T, P, E, D>(
    out: &mut Tree<T, P>,
    at: Index,
    left: NodeRef<'_, T, P>,
    right: NodeRef<'_, T, P>,
    traversal: &E,
    deletion: &D,
) where
    T: Clone + PartialEq,
    P: ChildPolicy,
    E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
    D: Fn(&T, &T) -> bool,
{
    if !traversal(left, right) {
        out.attach(at, left.value().clone());
        return;
    }
    if left.is_leaf() {
        if !deletion(left.value(), right.value()) {
            out.attach(at, left.value().clone());
        }
        return;
    }
    let node = out.attach(at, left.value().clone());
    difference_children(out, node, left, right, traversal, deletion);
    if out.entry(node).children.is_empty() && deletion(left.value(), right.value()) {
        out.prune(node);
    }
}

impl<'a, T, P> NodeRef<'a, T, P>
where
    T: Clone + PartialEq,
    P: ChildPolicy,
{
    /// Union under raw value equality, keeping this side's values.
    pub fn union(&self, other: NodeRef<'_, T, P>) -> Option<Tree<T, P>> {
        self.union_with(other, value_equality, keep_left)
    }

    /// Union of this subtree and `other`.
    ///
    /// `None` when the two roots do not match. Otherwise the result root holds
    /// `merge(self, other)`; matched children are unioned recursively, all
    /// unmatched children of either side are copied over unchanged. Under
    /// [`UniqueChildren`](crate::domain::UniqueChildren) a merged or copied
    /// child equal to an existing sibling is unioned into that sibling.
    #[instrument(level = "debug", skip_all, fields(policy = P::NAME))]
    pub fn union_with<E, M>(&self, other: NodeRef<'_, T, P>, equality: E, merge: M) -> Option<Tree<T, P>>
    where
        E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
        M: Fn(&T, &T) -> T,
    {
        if !equality(*self, other) {
            debug!("roots do not match, no union");
            return None;
        }
        let mut out = Tree::new(merge(self.value(), other.value()));
        let root = out.root;
        union_children(&mut out, root, *self, other, &equality, &merge);
        debug!(nodes = out.node_count(), "union built");
        Some(out)
    }

    /// Intersection under raw value equality.
    pub fn intersection<'b>(&self, other: impl Into<Option<NodeRef<'b, T, P>>>) -> Option<Tree<T, P>>
    where
        T: 'b,
        P: 'b,
    {
        self.intersection_with(other, value_equality)
    }

    /// Intersection of this subtree and `other`.
    ///
    /// `None` when `other` is absent or the roots do not match. The result keeps
    /// this side's values and only the paths present, pairwise, in both trees.
    #[instrument(level = "debug", skip_all, fields(policy = P::NAME))]
    pub fn intersection_with<'b, E>(
        &self,
        other: impl Into<Option<NodeRef<'b, T, P>>>,
        equality: E,
    ) -> Option<Tree<T, P>>
    where
        T: 'b,
        P: 'b,
        E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
    {
        let other = other.into()?;
        if !equality(*self, other) {
            debug!("roots do not match, no intersection");
            return None;
        }
        let mut out = Tree::new(self.value().clone());
        let root = out.root;
        intersection_children(&mut out, root, *self, other, &equality);
        debug!(nodes = out.node_count(), "intersection built");
        Some(out)
    }

    /// Difference under raw value equality, deleting every matched leaf.
    pub fn difference(&self, other: NodeRef<'_, T, P>) -> Option<Tree<T, P>> {
        self.difference_by(other, value_equality, always_delete)
    }

    /// Difference with a custom traversal predicate, deleting every matched leaf.
    pub fn difference_with<E>(&self, other: NodeRef<'_, T, P>, traversal: E) -> Option<Tree<T, P>>
    where
        E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
    {
        self.difference_by(other, traversal, always_delete)
    }

    /// Removes from this subtree what `other` covers.
    ///
    /// `traversal` decides which nodes line up; `deletion` decides whether a
    /// lined-up node with nothing left below it disappears. Children of this
    /// side with no partner are kept as they are. `None` means the whole
    /// subtree was deleted, which is a regular outcome.
    #[instrument(level = "debug", skip_all, fields(policy = P::NAME))]
    pub fn difference_by<E, D>(&self, other: NodeRef<'_, T, P>, traversal: E, deletion: D) -> Option<Tree<T, P>>
    where
        E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
        D: Fn(&T, &T) -> bool,
    {
        if !traversal(*self, other) {
            debug!("roots do not line up, value kept");
            return Some(Tree::new(self.value().clone()));
        }
        if self.is_leaf() {
            return (!deletion(self.value(), other.value())).then(|| Tree::new(self.value().clone()));
        }
        let mut out = Tree::new(self.value().clone());
        let root = out.root;
        difference_children(&mut out, root, *self, other, &traversal, &deletion);
        if out.root().is_leaf() && deletion(self.value(), other.value()) {
            debug!("difference emptied the root, deleted");
            return None;
        }
        debug!(nodes = out.node_count(), "difference built");
        Some(out)
    }
}

impl<T, P> Tree<T, P>
where
    T: Clone + PartialEq,
    P: ChildPolicy,
{
    /// See [`NodeRef::union`].
    pub fn union(&self, other: &Tree<T, P>) -> Option<Tree<T, P>> {
        self.root().union(other.root())
    }

    /// See [`NodeRef::intersection`].
    pub fn intersection(&self, other: &Tree<T, P>) -> Option<Tree<T, P>> {
        self.root().intersection(other.root())
    }

    /// See [`NodeRef::difference`].
    pub fn difference(&self, other: &Tree<T, P>) -> Option<Tree<T, P>> {
        self.root().difference(other.root())
    }

    /// See [`NodeRef::similarity`].
    pub fn similarity(&self, other: &Tree<T, P>) -> i64 {
        self.root().similarity(other.root())
    }
}
