use std::fmt;
use std::marker::PhantomData;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node_ref::NodeRef;
use crate::domain::policy::{ChildPolicy, UniqueChildren, Unrestricted};

/// Stable handle to a node inside one [`Tree`].
///
/// Handles are generational: once a node is removed its handle never resolves
/// again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}@{}", slot, generation)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode<T> {
    /// Payload of this node
    pub(crate) value: T,
    /// Index of parent node in the arena, None for the root
    pub(crate) parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub(crate) children: Vec<Index>,
}

/// Arena-based tree, generic over its payload and its child-insertion policy.
///
/// The arena owns every node. Parent links are plain indices, so there is no
/// ownership cycle between a node and its children. A tree always has a root;
/// the root itself can never be removed.
pub struct Tree<T, P = Unrestricted> {
    /// Arena storage for all tree nodes
    pub(crate) arena: Arena<TreeNode<T>>,
    /// Index of the root node
    pub(crate) root: Index,
    policy: PhantomData<P>,
}

/// Tree whose siblings may repeat values.
pub type BasicTree<T> = Tree<T, Unrestricted>;

/// Tree that refuses duplicate-valued siblings.
pub type UniqueTree<T> = Tree<T, UniqueChildren>;

impl<T: Clone, P> Clone for Tree<T, P> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            policy: PhantomData,
        }
    }
}

impl<T: fmt::Debug, P: ChildPolicy> fmt::Debug for Tree<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("policy", &P::NAME)
            .field("root", &self.root)
            .field("arena", &self.arena)
            .finish()
    }
}

impl<T: Default, P> Default for Tree<T, P> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, P> Tree<T, P> {
    pub fn new(value: T) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            value,
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root,
            policy: PhantomData,
        }
    }

    pub fn root(&self) -> NodeRef<'_, T, P> {
        NodeRef::new(self, self.root)
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(self.root)
    }

    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node(&self, id: NodeId) -> TreeResult<NodeRef<'_, T, P>> {
        if self.arena.contains(id.0) {
            Ok(NodeRef::new(self, id.0))
        } else {
            Err(TreeError::NodeNotFound(id))
        }
    }

    /// Child of `parent` at `index`, range checked.
    pub fn get_child(&self, parent: NodeId, index: usize) -> TreeResult<NodeRef<'_, T, P>> {
        self.node(parent)?.get_child(index)
    }

    pub(crate) fn entry(&self, index: Index) -> &TreeNode<T> {
        &self.arena[index]
    }

    fn entry_ref(&self, id: NodeId) -> TreeResult<&TreeNode<T>> {
        self.arena.get(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> TreeResult<&mut TreeNode<T>> {
        self.arena.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    /// Attaches a new node under `parent` without consulting the policy.
    ///
    /// Callers check the policy themselves, see `admits_under`.
    pub(crate) fn attach(&mut self, parent: Index, value: T) -> Index {
        let node = TreeNode {
            value,
            parent: Some(parent),
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }

        node_idx
    }

    /// Removes a whole subtree from the arena. The caller unlinks it from its parent.
    fn discard(&mut self, index: Index) -> Option<T> {
        let removed = self.arena.remove(index)?;
        let mut stack = removed.children;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.arena.remove(next) {
                stack.extend(node.children);
            }
        }
        Some(removed.value)
    }

    /// Unlinks a non-root node from its parent and discards its subtree.
    pub(crate) fn prune(&mut self, index: Index) -> Option<T> {
        if index == self.root {
            return None;
        }
        let parent = self.arena.get(index)?.parent;
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p)) {
            parent.children.retain(|&child| child != index);
        }
        self.discard(index)
    }

    /// Deep-copies `source` as a new child of `parent`, bypassing the policy.
    pub(crate) fn graft_unchecked<Q>(&mut self, parent: Index, source: NodeRef<'_, T, Q>) -> Index
    where
        T: Clone,
    {
        let top = self.attach(parent, source.value().clone());
        let mut stack = vec![(source, top)];
        while let Some((src, dst)) = stack.pop() {
            for child in src.children() {
                let copied = self.attach(dst, child.value().clone());
                stack.push((child, copied));
            }
        }
        top
    }
}

impl<T: PartialEq, P: ChildPolicy> Tree<T, P> {
    pub(crate) fn admits_under(&self, parent: Index, value: &T) -> bool {
        let siblings = self.arena[parent]
            .children
            .iter()
            .map(|&child| &self.arena[child].value);
        P::admits(siblings, value)
    }

    /// Appends a child holding `value` to `parent`.
    ///
    /// Returns `Ok(None)` when the policy refuses the value (a duplicate sibling
    /// under [`UniqueChildren`]). `Err` is reserved for a stale handle.
    #[instrument(level = "trace", skip(self, value), fields(policy = P::NAME))]
    pub fn add_child(&mut self, parent: NodeId, value: T) -> TreeResult<Option<NodeId>> {
        self.entry_ref(parent)?;
        if !self.admits_under(parent.0, &value) {
            trace!("sibling with equal value exists, child rejected");
            return Ok(None);
        }
        Ok(Some(NodeId(self.attach(parent.0, value))))
    }

    /// Repeated [`Tree::add_child`]; one entry per value, `None` where rejected.
    pub fn add_children<I>(&mut self, parent: NodeId, values: I) -> TreeResult<Vec<Option<NodeId>>>
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .map(|value| self.add_child(parent, value))
            .collect()
    }

    /// Replaces the value of `id`.
    ///
    /// Returns `Ok(false)` when a sibling already holds an equal value and the
    /// policy forbids duplicates. The node's own current value is not a conflict.
    #[instrument(level = "trace", skip(self, value), fields(policy = P::NAME))]
    pub fn set_value(&mut self, id: NodeId, value: T) -> TreeResult<bool> {
        if let Some(parent) = self.entry_ref(id)?.parent {
            let siblings = self.arena[parent]
                .children
                .iter()
                .filter(|&&child| child != id.0)
                .map(|&child| &self.arena[child].value);
            if !P::admits(siblings, &value) {
                trace!("sibling with equal value exists, value kept");
                return Ok(false);
            }
        }
        self.entry_mut(id)?.value = value;
        Ok(true)
    }

    /// Removes the child of `parent` at `index` with its whole subtree and
    /// returns the removed child's value.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> TreeResult<T> {
        let children = &mut self.entry_mut(parent)?.children;
        let count = children.len();
        if index >= count {
            return Err(TreeError::IndexOutOfRange { index, count });
        }
        let child = children.remove(index);
        self.discard(child)
            .ok_or(TreeError::NodeNotFound(NodeId(child)))
    }

    /// Removes every child of `parent` whose value equals the value of `node`.
    ///
    /// Removal is by value, not identity: `node` may live anywhere in the tree.
    /// Returns the number of children removed.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> TreeResult<usize> {
        let target = &self.entry_ref(node)?.value;
        let split = self.split_children(parent, |value| value == target)?;
        self.drop_children(parent, split)
    }

    /// Removes every child of `parent` whose value equals `value`.
    #[instrument(level = "trace", skip(self, value))]
    pub fn remove_children_by_value(&mut self, parent: NodeId, value: &T) -> TreeResult<usize> {
        let split = self.split_children(parent, |candidate| candidate == value)?;
        self.drop_children(parent, split)
    }

    fn split_children(
        &self,
        parent: NodeId,
        doomed: impl Fn(&T) -> bool,
    ) -> TreeResult<(Vec<Index>, Vec<Index>)> {
        Ok(self
            .entry_ref(parent)?
            .children
            .iter()
            .copied()
            .partition(|&child| doomed(&self.arena[child].value)))
    }

    fn drop_children(
        &mut self,
        parent: NodeId,
        (doomed, kept): (Vec<Index>, Vec<Index>),
    ) -> TreeResult<usize> {
        self.entry_mut(parent)?.children = kept;
        for &child in &doomed {
            self.discard(child);
        }
        Ok(doomed.len())
    }

    /// Deep-copies the subtree at `node` under `new_parent` in this same tree.
    ///
    /// The copy is taken before anything is attached, so `new_parent` may lie
    /// inside the copied subtree.
    pub fn copy_subtree(&mut self, node: NodeId, new_parent: NodeId) -> TreeResult<Option<NodeId>>
    where
        T: Clone,
    {
        let detached = self.node(node)?.copy();
        self.graft(new_parent, detached.root())
    }

    /// Deep-copies `source` (from another tree) as a child of `parent`.
    ///
    /// Every inserted node goes through the policy; a rejected top node yields
    /// `Ok(None)`, rejected descendants are skipped with their subtrees.
    #[instrument(level = "trace", skip(self, source), fields(policy = P::NAME))]
    pub fn graft<Q>(&mut self, parent: NodeId, source: NodeRef<'_, T, Q>) -> TreeResult<Option<NodeId>>
    where
        T: Clone,
    {
        let Some(top) = self.add_child(parent, source.value().clone())? else {
            return Ok(None);
        };
        let mut stack = vec![(source, top.0)];
        while let Some((src, dst)) = stack.pop() {
            for child in src.children() {
                if !self.admits_under(dst, child.value()) {
                    trace!("duplicate sibling skipped while grafting");
                    continue;
                }
                let copied = self.attach(dst, child.value().clone());
                stack.push((child, copied));
            }
        }
        Ok(Some(top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (BasicTree<i32>, NodeId, NodeId) {
        let mut tree = BasicTree::new(0);
        let root = tree.root_id();
        let one = tree.add_child(root, 1).unwrap().unwrap();
        let two = tree.add_child(root, 2).unwrap().unwrap();
        tree.add_children(one, [3, 4]).unwrap();
        (tree, one, two)
    }

    #[test]
    fn given_new_tree_when_inspected_then_single_root() {
        let tree = BasicTree::new("root");
        assert_eq!(tree.node_count(), 1);
        assert!(tree.root().is_root());
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn given_child_when_added_then_parent_link_is_consistent() {
        let (tree, one, _) = sample();
        let child = tree.node(one).unwrap();
        assert_eq!(child.parent().unwrap().id(), tree.root_id());
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn given_subtree_when_removed_by_index_then_descendants_leave_arena() {
        let (mut tree, one, _) = sample();
        let removed = tree.remove_child_at(tree.root_id(), 0).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(tree.node_count(), 2);
        assert!(!tree.contains(one));
        assert!(matches!(tree.node(one), Err(TreeError::NodeNotFound(_))));
    }

    #[test]
    fn given_bad_index_when_removing_then_out_of_range() {
        let (mut tree, _, _) = sample();
        let err = tree.remove_child_at(tree.root_id(), 2).unwrap_err();
        assert_eq!(err, TreeError::IndexOutOfRange { index: 2, count: 2 });
    }

    #[test]
    fn given_root_when_pruned_then_refused() {
        let (mut tree, _, _) = sample();
        let root = tree.root;
        assert!(tree.prune(root).is_none());
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn given_leaf_when_pruned_then_unlinked_from_parent() {
        let (mut tree, _, two) = sample();
        assert_eq!(tree.prune(two.0), Some(2));
        assert_eq!(tree.root().child_count(), 1);
    }
}
