//! Read-only view of a single node.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use generational_arena::Index;

use crate::domain::arena::{NodeId, Tree, TreeNode};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::policy::Unrestricted;

/// Borrowed handle to one node of a [`Tree`].
///
/// Holding a `NodeRef` keeps the tree immutably borrowed, so the node can
/// never go stale while the handle is alive.
pub struct NodeRef<'a, T, P = Unrestricted> {
    tree: &'a Tree<T, P>,
    index: Index,
}

impl<T, P> Clone for NodeRef<'_, T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for NodeRef<'_, T, P> {}

impl<T: fmt::Debug, P> fmt::Debug for NodeRef<'_, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("value", self.value())
            .field("children", &self.child_count())
            .finish()
    }
}

impl<'a, T, P> NodeRef<'a, T, P> {
    pub(crate) fn new(tree: &'a Tree<T, P>, index: Index) -> Self {
        Self { tree, index }
    }

    fn entry(&self) -> &'a TreeNode<T> {
        self.tree.entry(self.index)
    }

    pub(crate) fn index(&self) -> Index {
        self.index
    }

    pub fn id(&self) -> NodeId {
        NodeId(self.index)
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'a Tree<T, P> {
        self.tree
    }

    pub fn value(&self) -> &'a T {
        &self.entry().value
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T, P>> {
        self.entry()
            .parent
            .map(|parent| NodeRef::new(self.tree, parent))
    }

    /// Children in insertion order.
    pub fn children(&self) -> Children<'a, T, P> {
        Children {
            tree: self.tree,
            inner: self.entry().children.iter(),
        }
    }

    pub fn child_count(&self) -> usize {
        self.entry().children.len()
    }

    pub fn get_child(&self, index: usize) -> TreeResult<NodeRef<'a, T, P>> {
        let children = &self.entry().children;
        children
            .get(index)
            .map(|&child| NodeRef::new(self.tree, child))
            .ok_or(TreeError::IndexOutOfRange {
                index,
                count: children.len(),
            })
    }

    pub fn is_root(&self) -> bool {
        self.entry().parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.entry().children.is_empty()
    }

    /// Distance to the root; the root has depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = *self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Number of nodes below this one, not counting itself.
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<Index> = self.entry().children.clone();
        while let Some(next) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.tree.entry(next).children);
        }
        count
    }

    /// Topmost ancestor, or the node itself when it is the root.
    pub fn root(&self) -> NodeRef<'a, T, P> {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Identity comparison: same tree, same slot.
    pub fn same_node(&self, other: &NodeRef<'_, T, P>) -> bool {
        ptr::eq(self.tree, other.tree) && self.index == other.index
    }

    /// Deep copy of this subtree as a new, independently owned tree.
    pub fn copy(&self) -> Tree<T, P>
    where
        T: Clone,
    {
        let mut tree = Tree::new(self.value().clone());
        let root = tree.root;
        for child in self.children() {
            tree.graft_unchecked(root, child);
        }
        tree
    }
}

/// Iterator over the children of a node, see [`NodeRef::children`].
pub struct Children<'a, T, P> {
    tree: &'a Tree<T, P>,
    inner: slice::Iter<'a, Index>,
}

impl<'a, T, P> Iterator for Children<'a, T, P> {
    type Item = NodeRef<'a, T, P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|&child| NodeRef::new(self.tree, child))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, P> DoubleEndedIterator for Children<'_, T, P> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|&child| NodeRef::new(self.tree, child))
    }
}

impl<T, P> ExactSizeIterator for Children<'_, T, P> {}

impl<T, P> FusedIterator for Children<'_, T, P> {}
