//! Lazy traversals over a subtree.
//!
//! Each traversal owns its own work-list, so several can run over the same
//! subtree side by side. They borrow the tree immutably: mutating while a
//! traversal is alive does not compile.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::Tree;
use crate::domain::node_ref::NodeRef;

/// Selects a traversal order for [`NodeRef::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    DepthFirst,
    BreadthFirst,
}

/// FIFO traversal: a node, then its children in order, level by level.
pub struct BreadthFirst<'a, T, P> {
    tree: &'a Tree<T, P>,
    start: Index,
    queue: VecDeque<Index>,
}

impl<'a, T, P> BreadthFirst<'a, T, P> {
    fn new(start: NodeRef<'a, T, P>) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(start.index());
        Self {
            tree: start.tree(),
            start: start.index(),
            queue,
        }
    }

    /// Drops the current position and starts over from the start node.
    pub fn restart(&mut self) {
        self.queue.clear();
        self.queue.push_back(self.start);
    }
}

impl<'a, T, P> Iterator for BreadthFirst<'a, T, P> {
    type Item = NodeRef<'a, T, P>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        self.queue
            .extend(self.tree.entry(current).children.iter().copied());
        Some(NodeRef::new(self.tree, current))
    }
}

impl<T, P> FusedIterator for BreadthFirst<'_, T, P> {}

/// LIFO traversal: pop a node, push all its children in order.
///
/// Because the children are pushed front to back, siblings come out back to
/// front: for `0 -> {1, 2}` the order is `0, 2, 1`. Use [`PostOrder`] or walk
/// [`NodeRef::children`] when insertion order matters.
pub struct DepthFirst<'a, T, P> {
    tree: &'a Tree<T, P>,
    start: Index,
    stack: Vec<Index>,
}

impl<'a, T, P> DepthFirst<'a, T, P> {
    fn new(start: NodeRef<'a, T, P>) -> Self {
        Self {
            tree: start.tree(),
            start: start.index(),
            stack: vec![start.index()],
        }
    }

    /// Drops the current position and starts over from the start node.
    pub fn restart(&mut self) {
        self.stack.clear();
        self.stack.push(self.start);
    }
}

impl<'a, T, P> Iterator for DepthFirst<'a, T, P> {
    type Item = NodeRef<'a, T, P>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.entry(current).children.iter().copied());
        Some(NodeRef::new(self.tree, current))
    }
}

impl<T, P> FusedIterator for DepthFirst<'_, T, P> {}

/// Children-before-parent traversal, siblings in insertion order.
pub struct PostOrder<'a, T, P> {
    tree: &'a Tree<T, P>,
    start: Index,
    stack: Vec<(Index, bool)>,
}

impl<'a, T, P> PostOrder<'a, T, P> {
    fn new(start: NodeRef<'a, T, P>) -> Self {
        Self {
            tree: start.tree(),
            start: start.index(),
            stack: vec![(start.index(), false)],
        }
    }

    pub fn restart(&mut self) {
        self.stack.clear();
        self.stack.push((self.start, false));
    }
}

impl<'a, T, P> Iterator for PostOrder<'a, T, P> {
    type Item = NodeRef<'a, T, P>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(NodeRef::new(self.tree, current));
            }
            self.stack.push((current, true));
            for &child in self.tree.entry(current).children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

impl<T, P> FusedIterator for PostOrder<'_, T, P> {}

/// Either traversal, chosen at runtime through [`SearchKind`].
pub enum Search<'a, T, P> {
    DepthFirst(DepthFirst<'a, T, P>),
    BreadthFirst(BreadthFirst<'a, T, P>),
}

impl<T, P> Search<'_, T, P> {
    pub fn kind(&self) -> SearchKind {
        match self {
            Search::DepthFirst(_) => SearchKind::DepthFirst,
            Search::BreadthFirst(_) => SearchKind::BreadthFirst,
        }
    }

    pub fn restart(&mut self) {
        match self {
            Search::DepthFirst(inner) => inner.restart(),
            Search::BreadthFirst(inner) => inner.restart(),
        }
    }
}

impl<'a, T, P> Iterator for Search<'a, T, P> {
    type Item = NodeRef<'a, T, P>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Search::DepthFirst(inner) => inner.next(),
            Search::BreadthFirst(inner) => inner.next(),
        }
    }
}

impl<'a, T, P> NodeRef<'a, T, P> {
    /// Fresh breadth-first traversal starting at this node.
    #[instrument(level = "trace", skip(self))]
    pub fn bfs(&self) -> BreadthFirst<'a, T, P> {
        BreadthFirst::new(*self)
    }

    /// Fresh depth-first traversal starting at this node.
    #[instrument(level = "trace", skip(self))]
    pub fn dfs(&self) -> DepthFirst<'a, T, P> {
        DepthFirst::new(*self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn post_order(&self) -> PostOrder<'a, T, P> {
        PostOrder::new(*self)
    }

    pub fn search(&self, kind: SearchKind) -> Search<'a, T, P> {
        match kind {
            SearchKind::DepthFirst => Search::DepthFirst(self.dfs()),
            SearchKind::BreadthFirst => Search::BreadthFirst(self.bfs()),
        }
    }
}
