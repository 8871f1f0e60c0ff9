//! Tree builder for indented outlines.
//!
//! One value per line, indentation gives the depth:
//!
//! ```text
//! # comments and blank lines are ignored
//! fruit
//!   apple
//!     red
//!   pear
//! ```

use std::fmt::Display;

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, Tree};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::policy::ChildPolicy;

/// Default number of columns a tab counts for.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Constructs trees of strings from outline text.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    tab_width: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    fn indent_of(&self, line: &str) -> usize {
        line.chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { self.tab_width } else { 1 })
            .sum()
    }

    /// Significant lines as `(line number, indent, value)`.
    fn entries<'a>(&'a self, outline: &'a str) -> impl Iterator<Item = (usize, usize, String)> + 'a {
        outline.lines().enumerate().filter_map(move |(number, raw)| {
            let value = raw.trim();
            if value.is_empty() || value.starts_with('#') {
                return None;
            }
            Some((number + 1, self.indent_of(raw), value.to_string()))
        })
    }

    /// Build a tree from an outline.
    ///
    /// A line becomes a child of the closest preceding line with a smaller
    /// indent. The first significant line is the root and must not be
    /// indented; any later line without a shallower predecessor would be a
    /// second root and is rejected.
    #[instrument(level = "debug", skip(self, outline), fields(policy = P::NAME))]
    pub fn build<P: ChildPolicy>(&self, outline: &str) -> TreeResult<Tree<String, P>> {
        let mut entries = self.entries(outline);
        let (line, indent, value) = entries.next().ok_or(TreeError::EmptyOutline)?;
        if indent > 0 {
            return Err(TreeError::IndentedRoot { line });
        }

        let mut tree = Tree::<String, P>::new(value);
        let mut open: Vec<(usize, NodeId)> = vec![(indent, tree.root_id())];

        for (line, indent, value) in entries {
            while open.last().is_some_and(|&(depth, _)| depth >= indent) {
                open.pop();
            }
            let Some(&(_, parent)) = open.last() else {
                return Err(TreeError::MultipleRoots { line });
            };
            let shown = value.clone();
            match tree.add_child(parent, value)? {
                Some(id) => open.push((indent, id)),
                None => return Err(TreeError::DuplicateSibling { line, value: shown }),
            }
        }

        debug!(nodes = tree.node_count(), "outline parsed");
        Ok(tree)
    }
}

impl<T: Display, P> Tree<T, P> {
    /// Outline text with two spaces per level, readable by [`TreeBuilder::build`].
    ///
    /// Values that are blank, start with `#` or span lines do not read back.
    pub fn to_outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            out.push_str(&format!("{:width$}{}\n", "", node.value(), width = depth * 2));
            stack.extend(node.children().rev().map(|child| (child, depth + 1)));
        }
        out
    }
}
