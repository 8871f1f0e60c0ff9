//! Domain layer: trees, traversals and structural set algebra
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod algebra;
pub mod arena;
pub mod builder;
pub mod equality;
pub mod error;
pub mod node_ref;
pub mod policy;
pub mod similarity;
pub mod traversal;

pub use arena::{BasicTree, NodeId, Tree, UniqueTree};
pub use builder::{TreeBuilder, DEFAULT_TAB_WIDTH};
pub use equality::{always_delete, delete_if_equal, keep_left, keep_right, value_equality, value_hash};
pub use error::{TreeError, TreeResult};
pub use node_ref::{Children, NodeRef};
pub use policy::{ChildPolicy, TieBreak, UniqueChildren, Unrestricted};
pub use similarity::{shared_values_count, similarity_score};
pub use traversal::{BreadthFirst, DepthFirst, PostOrder, Search, SearchKind};
