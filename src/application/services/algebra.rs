//! Tree algebra service
//!
//! Loads outline files into string trees and runs union, intersection,
//! difference and similarity with predicates taken from the settings.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::{DeletionRule, MergeStrategy, Settings, ValueMatching};
use crate::domain::{ChildPolicy, NodeRef, Tree, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Node matching predicate for string trees.
fn matcher<P>(matching: ValueMatching) -> impl Fn(NodeRef<'_, String, P>, NodeRef<'_, String, P>) -> bool {
    move |left: NodeRef<'_, String, P>, right: NodeRef<'_, String, P>| {
        matching.matches(left.value(), right.value())
    }
}

fn merger(merge: MergeStrategy) -> impl Fn(&String, &String) -> String {
    move |left: &String, right: &String| merge.apply(left, right)
}

fn deleter(deletion: DeletionRule) -> impl Fn(&String, &String) -> bool {
    move |left: &String, right: &String| deletion.deletes(left, right)
}

/// Service running the set algebra over outline files.
pub struct AlgebraService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl AlgebraService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and parse an outline file.
    #[instrument(level = "debug", skip(self), fields(policy = P::NAME))]
    pub fn load<P: ChildPolicy>(&self, path: &Path) -> ApplicationResult<Tree<String, P>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("outline not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read outline", path)?;
        let tree = TreeBuilder::new()
            .with_tab_width(self.settings.tab_width)
            .build::<P>(&content)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("parse outline {}", path.display()),
                source: Box::new(e),
            })?;
        debug!("loaded {} nodes from {}", tree.node_count(), path.display());
        Ok(tree)
    }

    /// Write a tree as outline text.
    pub fn save<P>(&self, tree: &Tree<String, P>, path: &Path) -> ApplicationResult<()> {
        debug!("save: {}", path.display());
        self.fs
            .write(path, &tree.to_outline())
            .with_path_context("write outline", path)
    }

    /// Union of two outline files; `None` when the roots do not match.
    pub fn union<P: ChildPolicy>(&self, left: &Path, right: &Path) -> ApplicationResult<Option<Tree<String, P>>> {
        let (left, right) = (self.load::<P>(left)?, self.load::<P>(right)?);
        Ok(left.root().union_with(
            right.root(),
            matcher(self.settings.matching),
            merger(self.settings.merge),
        ))
    }

    /// Intersection of two outline files; `None` when the roots do not match.
    pub fn intersection<P: ChildPolicy>(
        &self,
        left: &Path,
        right: &Path,
    ) -> ApplicationResult<Option<Tree<String, P>>> {
        let (left, right) = (self.load::<P>(left)?, self.load::<P>(right)?);
        Ok(left
            .root()
            .intersection_with(right.root(), matcher(self.settings.matching)))
    }

    /// `left` minus `right`; `None` when everything was deleted.
    pub fn difference<P: ChildPolicy>(
        &self,
        left: &Path,
        right: &Path,
    ) -> ApplicationResult<Option<Tree<String, P>>> {
        let (left, right) = (self.load::<P>(left)?, self.load::<P>(right)?);
        Ok(left.root().difference_by(
            right.root(),
            matcher(self.settings.matching),
            deleter(self.settings.deletion),
        ))
    }

    pub fn similarity<P: ChildPolicy>(&self, left: &Path, right: &Path) -> ApplicationResult<i64> {
        let (left, right) = (self.load::<P>(left)?, self.load::<P>(right)?);
        let score = left
            .root()
            .similarity_with(right.root(), matcher(self.settings.matching));
        debug!(score, "similarity computed");
        Ok(score)
    }
}
