//! Similarity scoring and candidate selection.
//!
//! The score is a signed overlap measure between two subtrees. It is also the
//! tie-break the set algorithms use when several children of the other tree
//! match one child of this tree.

use tracing::trace;

use crate::domain::equality::value_equality;
use crate::domain::node_ref::NodeRef;
use crate::domain::policy::{ChildPolicy, TieBreak};

/// Size of the multiset intersection of two value collections.
///
/// A value present twice on both sides counts twice; every match consumes
/// one entry of `right`.
pub fn shared_values_count<'a, T>(
    left: impl IntoIterator<Item = &'a T>,
    right: impl IntoIterator<Item = &'a T>,
) -> usize
where
    T: PartialEq + 'a,
{
    let mut pool: Vec<&T> = right.into_iter().collect();
    left.into_iter()
        .filter(|value| match pool.iter().position(|candidate| candidate == value) {
            Some(position) => {
                pool.swap_remove(position);
                true
            }
            None => false,
        })
        .count()
}

/// Outcome of narrowing a candidate pool to one partner.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Selection {
    /// Position of the chosen candidate in the pool
    pub position: usize,
    /// Similarity against the chosen candidate, when it was computed on the way
    pub score: Option<i64>,
}

/// Picks the partner for `child` among `pool` entries matching `equality(candidate, child)`.
///
/// No match gives `None`, a single match is taken as is. Several matches are
/// resolved through the policy's tie-break: the most similar candidate (first
/// seen on ties) or simply the first match.
pub(crate) fn select_candidate<T, P, E>(
    child: NodeRef<'_, T, P>,
    pool: &[NodeRef<'_, T, P>],
    equality: &E,
) -> Option<Selection>
where
    T: PartialEq,
    P: ChildPolicy,
    E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
{
    let mut matching = pool
        .iter()
        .enumerate()
        .filter(|(_, candidate)| equality(**candidate, child))
        .map(|(position, _)| position);

    match P::TIE_BREAK {
        TieBreak::FirstMatch => matching.next().map(|position| Selection {
            position,
            score: None,
        }),
        TieBreak::MostSimilar => {
            let positions: Vec<usize> = matching.collect();
            match positions.as_slice() {
                [] => None,
                [position] => Some(Selection {
                    position: *position,
                    score: None,
                }),
                _ => {
                    trace!(candidates = positions.len(), "ambiguous match, scoring candidates");
                    best_of(
                        positions
                            .iter()
                            .map(|&position| (position, similarity_score(child, pool[position], equality))),
                    )
                    .map(|(position, score)| Selection {
                        position,
                        score: Some(score),
                    })
                }
            }
        }
    }
}

/// Highest scored entry; the first one wins on ties.
fn best_of<K>(scored: impl IntoIterator<Item = (K, i64)>) -> Option<(K, i64)> {
    scored.into_iter().fold(None, |best, (key, score)| match best {
        Some((_, top)) if top >= score => best,
        _ => Some((key, score)),
    })
}

/// Similarity of `this` against `other` under `equality`.
///
/// 1. one point when the two nodes match,
/// 2. minus one point per child value not shared between the two child lists,
/// 3. plus the recursive score of every greedily paired child,
/// 4. minus the descendant count of every child of `other` left unpaired.
///
/// Pairing walks `this`'s children in order and consumes candidates, so the
/// total depends on that order and is not a globally optimal assignment.
pub fn similarity_score<T, P, E>(this: NodeRef<'_, T, P>, other: NodeRef<'_, T, P>, equality: &E) -> i64
where
    T: PartialEq,
    P: ChildPolicy,
    E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
{
    let mut score = i64::from(equality(this, other));

    let shared = shared_values_count(
        this.children().map(|child| child.value()),
        other.children().map(|child| child.value()),
    ) as i64;
    score -= this.child_count() as i64 - shared;
    score -= other.child_count() as i64 - shared;

    let mut pool: Vec<NodeRef<'_, T, P>> = other.children().collect();
    for child in this.children() {
        if let Some(selection) = select_candidate(child, &pool, equality) {
            let candidate = pool.remove(selection.position);
            score += selection
                .score
                .unwrap_or_else(|| similarity_score(child, candidate, equality));
        }
    }

    let leftover: i64 = pool
        .iter()
        .map(|node| node.descendant_count() as i64)
        .sum();
    score - leftover
}

impl<'a, T: PartialEq, P: ChildPolicy> NodeRef<'a, T, P> {
    /// Similarity under raw value equality.
    pub fn similarity(&self, other: NodeRef<'_, T, P>) -> i64 {
        similarity_score(*self, other, &value_equality)
    }

    pub fn similarity_with<E>(&self, other: NodeRef<'_, T, P>, equality: E) -> i64
    where
        E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
    {
        similarity_score(*self, other, &equality)
    }

    /// Candidate with the highest similarity to this node, first seen on ties.
    pub fn most_similar<'c, I>(&self, candidates: I) -> Option<NodeRef<'c, T, P>>
    where
        I: IntoIterator<Item = NodeRef<'c, T, P>>,
    {
        self.most_similar_with(candidates, value_equality)
    }

    pub fn most_similar_with<'c, I, E>(&self, candidates: I, equality: E) -> Option<NodeRef<'c, T, P>>
    where
        I: IntoIterator<Item = NodeRef<'c, T, P>>,
        E: Fn(NodeRef<'_, T, P>, NodeRef<'_, T, P>) -> bool,
    {
        best_of(
            candidates
                .into_iter()
                .map(|candidate| (candidate, similarity_score(*self, candidate, &equality))),
        )
        .map(|(candidate, _)| candidate)
    }
}
