//! Similarity scores and most-similar selection.

use rstest::rstest;

use settree::domain::{shared_values_count, BasicTree, NodeRef};

fn flat(root: i32, children: &[i32]) -> BasicTree<i32> {
    let mut tree = BasicTree::new(root);
    let id = tree.root_id();
    tree.add_children(id, children.iter().copied()).unwrap();
    tree
}

/// 0 -> {1, 2}, 1 -> {3, 4}
fn nested() -> BasicTree<i32> {
    let mut tree = BasicTree::new(0);
    let root = tree.root_id();
    let one = tree.add_child(root, 1).unwrap().unwrap();
    tree.add_child(root, 2).unwrap();
    tree.add_children(one, [3, 4]).unwrap();
    tree
}

#[rstest]
#[case::identical_leaves(flat(7, &[]), flat(7, &[]), 1)]
#[case::different_leaves(flat(7, &[]), flat(8, &[]), 0)]
#[case::one_shared_child(flat(0, &[1, 2]), flat(0, &[2, 3]), 0)]
#[case::disjoint_children(flat(0, &[1]), flat(0, &[2]), -1)]
#[case::identical_nested(nested(), nested(), 5)]
fn given_two_trees_when_scoring_then_matches_expected(
    #[case] left: BasicTree<i32>,
    #[case] right: BasicTree<i32>,
    #[case] expected: i64,
) {
    assert_eq!(left.similarity(&right), expected);
}

#[test]
fn given_unmatched_subtree_on_other_side_when_scoring_then_descendants_penalized() {
    let left = BasicTree::new(0);
    let mut right = BasicTree::new(0);
    let root = right.root_id();
    let one = right.add_child(root, 1).unwrap().unwrap();
    right.add_child(one, 2).unwrap();

    // 1 for the root, -1 for the unshared child, -1 for its descendant
    assert_eq!(left.similarity(&right), -1);
}

#[test]
fn given_candidates_when_picking_most_similar_then_highest_score_wins() {
    let target = flat(0, &[1, 2]);
    let candidates = [flat(0, &[9]), flat(0, &[1, 2]), flat(0, &[1])];

    let best = target
        .root()
        .most_similar(candidates.iter().map(|tree| tree.root()))
        .unwrap();

    assert!(best.same_node(&candidates[1].root()));
}

#[test]
fn given_tied_candidates_when_picking_most_similar_then_first_seen_wins() {
    let target = flat(0, &[]);
    let candidates = [flat(0, &[]), flat(0, &[])];

    let best = target
        .root()
        .most_similar(candidates.iter().map(|tree| tree.root()))
        .unwrap();

    assert!(best.same_node(&candidates[0].root()));
    assert!(target.root().most_similar(Vec::<NodeRef<'_, i32>>::new()).is_none());
}

#[test]
fn given_custom_equality_when_picking_most_similar_then_predicate_changes_winner() {
    let target = flat(0, &[1]);
    let candidates = [flat(0, &[2]), flat(2, &[3])];
    let same_parity = |a: NodeRef<'_, i32>, b: NodeRef<'_, i32>| a.value() % 2 == b.value() % 2;

    let by_value = target
        .root()
        .most_similar(candidates.iter().map(|tree| tree.root()))
        .unwrap();
    assert!(by_value.same_node(&candidates[0].root()));

    // 0{2} scores -1 either way; 2{3} rises from -2 to 0 once 3 pairs with 1
    let by_parity = target
        .root()
        .most_similar_with(candidates.iter().map(|tree| tree.root()), same_parity)
        .unwrap();
    assert!(by_parity.same_node(&candidates[1].root()));
}

#[test]
fn given_custom_equality_when_scoring_then_predicate_decides_base_point() {
    let left = flat(1, &[]);
    let right = flat(2, &[]);
    let anything = |_: NodeRef<'_, i32>, _: NodeRef<'_, i32>| true;
    assert_eq!(left.root().similarity_with(right.root(), anything), 1);
}

#[test]
fn given_repeated_values_when_counting_shared_then_multiset_semantics() {
    assert_eq!(shared_values_count(&[1, 1, 2], &[1, 2, 2]), 2);
    assert_eq!(shared_values_count(&[1, 1], &[1, 1]), 2);
}
