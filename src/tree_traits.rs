//! Terminal rendering of trees through `termtree`.

use std::fmt;

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::domain::{NodeRef, Tree};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> TermTree<String>;
}

impl<T: fmt::Display, P> TreeNodeConvert for NodeRef<'_, T, P> {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> TermTree<String> {
        fn build<T: fmt::Display, P>(node: NodeRef<'_, T, P>) -> TermTree<String> {
            let leaves: Vec<_> = node.children().map(build).collect();
            TermTree::new(node.value().to_string()).with_leaves(leaves)
        }
        build(*self)
    }
}

impl<T: fmt::Display, P> TreeNodeConvert for Tree<T, P> {
    fn to_tree_string(&self) -> TermTree<String> {
        self.root().to_tree_string()
    }
}

impl<T: fmt::Display, P> fmt::Display for Tree<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BasicTree;

    #[test]
    fn given_tree_when_rendered_then_children_are_listed_under_root() {
        let mut tree = BasicTree::new("fruit");
        let root = tree.root_id();
        tree.add_children(root, ["apple", "pear"]).unwrap();

        let rendered = tree.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "fruit");
        assert!(lines[1].ends_with("apple"));
        assert!(lines[2].ends_with("pear"));
    }
}
