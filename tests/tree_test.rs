//! Node entity: construction, navigation, mutation and copies.

use rstest::{fixture, rstest};

use settree::domain::{BasicTree, NodeId, TreeError};
use settree::util::testing;

/// 0 -> {1, 2}, 1 -> {3, 4}
#[fixture]
fn sample() -> BasicTree<i32> {
    testing::init_test_setup();
    let mut tree = BasicTree::new(0);
    let root = tree.root_id();
    let one = tree.add_child(root, 1).unwrap().unwrap();
    tree.add_child(root, 2).unwrap();
    tree.add_children(one, [3, 4]).unwrap();
    tree
}

fn child_values(tree: &BasicTree<i32>, id: NodeId) -> Vec<i32> {
    tree.node(id).unwrap().children().map(|n| *n.value()).collect()
}

#[rstest]
fn given_every_node_when_inspected_then_depth_zero_iff_root(sample: BasicTree<i32>) {
    for node in sample.root().bfs() {
        assert_eq!(node.depth() == 0, node.is_root());
        assert_eq!(node.is_leaf(), node.child_count() == 0);
    }
}

#[rstest]
#[case(0, 1)]
#[case(1, 2)]
fn given_valid_index_when_get_child_then_returns_child(
    sample: BasicTree<i32>,
    #[case] index: usize,
    #[case] expected: i32,
) {
    let child = sample.get_child(sample.root_id(), index).unwrap();
    assert_eq!(*child.value(), expected);
    assert_eq!(child.parent().unwrap().id(), sample.root_id());
}

#[rstest]
fn given_index_past_end_when_get_child_then_out_of_range(sample: BasicTree<i32>) {
    let err = sample.get_child(sample.root_id(), 2).unwrap_err();
    assert_eq!(err, TreeError::IndexOutOfRange { index: 2, count: 2 });
}

#[rstest]
fn given_index_past_end_when_removing_then_tree_unchanged(mut sample: BasicTree<i32>) {
    let root = sample.root_id();
    assert!(sample.remove_child_at(root, 5).is_err());
    assert_eq!(sample.node_count(), 5);
}

#[rstest]
fn given_subtree_when_removed_by_index_then_descendants_are_gone(mut sample: BasicTree<i32>) {
    let root = sample.root_id();
    let removed = sample.remove_child_at(root, 0).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(child_values(&sample, root), vec![2]);
    assert_eq!(sample.node_count(), 2);
}

#[test]
fn given_repeated_values_when_removing_by_node_then_all_equal_children_go() {
    let mut tree = BasicTree::new(0);
    let root = tree.root_id();
    let ids = tree.add_children(root, [7, 8, 7, 7]).unwrap();
    let first = ids[0].unwrap();

    let removed = tree.remove_child(root, first).unwrap();

    assert_eq!(removed, 3);
    assert_eq!(child_values(&tree, root), vec![8]);
    assert!(!tree.contains(first));
}

#[test]
fn given_value_when_removing_children_by_value_then_only_equal_children_go() {
    let mut tree = BasicTree::new(0);
    let root = tree.root_id();
    tree.add_children(root, [7, 8, 7]).unwrap();
    let nine = tree.add_child(root, 9).unwrap().unwrap();
    tree.add_child(nine, 7).unwrap();

    assert_eq!(tree.remove_children_by_value(root, &7).unwrap(), 2);
    assert_eq!(child_values(&tree, root), vec![8, 9]);
    // only direct children are considered
    assert_eq!(child_values(&tree, nine), vec![7]);
    assert_eq!(tree.remove_children_by_value(root, &42).unwrap(), 0);
    assert_eq!(tree.node_count(), 4);
}

#[test]
fn given_node_from_elsewhere_when_removing_by_node_then_match_is_by_value() {
    let mut tree = BasicTree::new(0);
    let root = tree.root_id();
    let a = tree.add_child(root, 1).unwrap().unwrap();
    tree.add_child(root, 2).unwrap();
    let nested = tree.add_child(a, 2).unwrap().unwrap();

    assert_eq!(tree.remove_child(root, nested).unwrap(), 1);
    assert_eq!(child_values(&tree, root), vec![1]);
    assert!(tree.contains(nested));
}

#[rstest]
fn given_basic_tree_when_setting_sibling_value_then_accepted(mut sample: BasicTree<i32>) {
    let two = sample.get_child(sample.root_id(), 1).unwrap().id();
    assert!(sample.set_value(two, 1).unwrap());
    assert_eq!(child_values(&sample, sample.root_id()), vec![1, 1]);
}

#[rstest]
fn given_copy_when_mutated_then_original_untouched(sample: BasicTree<i32>) {
    let mut copy = sample.root().copy();
    assert_eq!(copy, sample);
    assert!(!copy.root().same_node(&sample.root()));

    let root = copy.root_id();
    copy.add_child(root, 99).unwrap();
    copy.remove_child_at(root, 0).unwrap();

    assert_eq!(sample.node_count(), 5);
    assert_eq!(child_values(&sample, sample.root_id()), vec![1, 2]);
    assert_ne!(copy, sample);
}

#[rstest]
fn given_subtree_when_copied_under_own_descendant_then_copy_is_finite(mut sample: BasicTree<i32>) {
    let one = sample.get_child(sample.root_id(), 0).unwrap().id();
    let three = sample.get_child(one, 0).unwrap().id();

    let copied = sample.copy_subtree(one, three).unwrap().unwrap();

    assert_eq!(sample.node_count(), 8);
    let copied = sample.node(copied).unwrap();
    assert_eq!(copied.depth(), 3);
    assert_eq!(copied.descendant_count(), 2);
}

#[rstest]
fn given_other_tree_when_grafting_then_subtree_is_deep_copied(mut sample: BasicTree<i32>) {
    let mut other = BasicTree::new(10);
    let root = other.root_id();
    other.add_children(root, [11, 12]).unwrap();

    let target = sample.root_id();
    let grafted = sample.graft(target, other.root()).unwrap().unwrap();

    assert_eq!(sample.node(grafted).unwrap().descendant_count(), 2);
    assert_eq!(other.node_count(), 3);
}

#[rstest]
fn given_removed_node_when_used_as_handle_then_not_found(mut sample: BasicTree<i32>) {
    let root = sample.root_id();
    let two = sample.get_child(root, 1).unwrap().id();
    sample.remove_child_at(root, 1).unwrap();

    assert!(matches!(sample.add_child(two, 5), Err(TreeError::NodeNotFound(_))));
    assert!(matches!(sample.set_value(two, 5), Err(TreeError::NodeNotFound(_))));
}

#[rstest]
fn given_tree_when_counting_descendants_then_whole_subtree_counts(sample: BasicTree<i32>) {
    assert_eq!(sample.root().descendant_count(), 4);
    assert_eq!(sample.get_child(sample.root_id(), 0).unwrap().descendant_count(), 2);
}

#[rstest]
fn given_deep_node_when_asking_root_then_walks_up(sample: BasicTree<i32>) {
    let leaf = sample
        .root()
        .get_child(0)
        .and_then(|one| one.get_child(1))
        .unwrap();
    assert_eq!(*leaf.value(), 4);
    assert!(leaf.root().same_node(&sample.root()));
}
