//! Generic arena trees with structural set algebra.
//!
//! A [`Tree`](domain::Tree) owns its nodes in an arena. Two trees can be
//! combined with [`union`](domain::NodeRef::union_with),
//! [`intersection`](domain::NodeRef::intersection_with) and
//! [`difference`](domain::NodeRef::difference_by), each driven by a caller
//! supplied matching predicate, and compared with a
//! [`similarity`](domain::NodeRef::similarity_with) score.
//!
//! ```
//! use settree::domain::BasicTree;
//!
//! let mut left = BasicTree::new(0);
//! let root = left.root_id();
//! left.add_children(root, [1, 2]).unwrap();
//!
//! let mut right = BasicTree::new(0);
//! let root = right.root_id();
//! right.add_children(root, [2, 3]).unwrap();
//!
//! let union = left.union(&right).unwrap();
//! assert_eq!(union.root().child_count(), 3);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
