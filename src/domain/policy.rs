//! Child-insertion policies.
//!
//! A tree is generic over its policy. The policy decides whether a value may be
//! attached next to a set of existing siblings, and how the set algorithms
//! resolve a pool with more than one matching candidate.

use std::fmt::Debug;

/// How an ambiguous candidate pool is narrowed to a single partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Score every candidate with the similarity measure and keep the best,
    /// first seen wins on ties.
    MostSimilar,
    /// Siblings are distinct, take the first candidate found.
    FirstMatch,
}

pub trait ChildPolicy: Debug + Default + Clone + Copy + 'static {
    /// Short name, used in logs and CLI output.
    const NAME: &'static str;

    const TIE_BREAK: TieBreak;

    /// Whether `value` may be attached under a parent whose children hold `siblings`.
    ///
    /// Only `T`'s own equality is consulted, never an injected predicate.
    fn admits<'a, T>(siblings: impl IntoIterator<Item = &'a T>, value: &T) -> bool
    where
        T: PartialEq + 'a;
}

/// Accepts every insertion. Siblings may repeat values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unrestricted;

impl ChildPolicy for Unrestricted {
    const NAME: &'static str = "unrestricted";
    const TIE_BREAK: TieBreak = TieBreak::MostSimilar;

    fn admits<'a, T>(_siblings: impl IntoIterator<Item = &'a T>, _value: &T) -> bool
    where
        T: PartialEq + 'a,
    {
        true
    }
}

/// Rejects an insertion whose value already exists among the siblings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueChildren;

impl ChildPolicy for UniqueChildren {
    const NAME: &'static str = "unique";
    const TIE_BREAK: TieBreak = TieBreak::FirstMatch;

    fn admits<'a, T>(siblings: impl IntoIterator<Item = &'a T>, value: &T) -> bool
    where
        T: PartialEq + 'a,
    {
        !siblings.into_iter().any(|sibling| sibling == value)
    }
}
