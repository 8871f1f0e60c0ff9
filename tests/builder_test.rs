//! Building trees from indented outlines.

use rstest::rstest;

use settree::domain::{BasicTree, TreeBuilder, TreeError, Unrestricted};

fn build(outline: &str) -> Result<BasicTree<String>, TreeError> {
    TreeBuilder::new().build::<Unrestricted>(outline)
}

#[test]
fn given_nested_outline_when_building_then_indentation_gives_depth() {
    let outline = r#"
# groceries
fruit
    apple
        red
        green
    pear

"#;
    let tree = build(outline).unwrap();

    assert_eq!(tree.root().value(), "fruit");
    assert_eq!(tree.node_count(), 5);
    let apple = tree.root().get_child(0).unwrap();
    assert_eq!(apple.value(), "apple");
    assert_eq!(apple.child_count(), 2);
    assert_eq!(apple.get_child(1).unwrap().depth(), 2);
}

#[test]
fn given_tabs_when_building_then_tab_width_applies() {
    let tree = TreeBuilder::new()
        .with_tab_width(2)
        .build::<Unrestricted>("a\n\tb\n  c\n")
        .unwrap();
    // a tab of width 2 and two spaces are the same level
    assert_eq!(tree.root().child_count(), 2);
}

#[rstest]
#[case::empty("", TreeError::EmptyOutline)]
#[case::only_comments("# nothing\n\n", TreeError::EmptyOutline)]
#[case::indented_root("  a\n", TreeError::IndentedRoot { line: 1 })]
#[case::second_root("a\n  b\nc\n", TreeError::MultipleRoots { line: 3 })]
fn given_malformed_outline_when_building_then_error(#[case] outline: &str, #[case] expected: TreeError) {
    assert_eq!(build(outline).unwrap_err(), expected);
}

#[test]
fn given_repeated_siblings_when_building_basic_then_kept() {
    let tree = build("a\n  b\n  b\n").unwrap();
    assert_eq!(tree.root().child_count(), 2);
}

#[test]
fn given_built_tree_when_written_back_then_outline_round_trips() {
    let tree = build("a\n    b\n        c\n    d\n").unwrap();
    let again = build(&tree.to_outline()).unwrap();
    assert!(again.root().exact_eq(&tree.root()));
}
