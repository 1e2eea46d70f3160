//! Depth-first traversal of the resolved dependency graph.

use crate::error::Result;
use crate::matcher::WildcardMatcher;
use crate::types::{Coordinate, DependencyNode};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Callbacks invoked while walking the graph.
///
/// `can_continue` is consulted after every edge visit and is the only
/// cancellation mechanism: returning `false` stops the traversal
/// immediately, including siblings that were already collected for
/// recursion.
pub trait DependencyVisitor {
    fn can_continue(&self) -> bool {
        true
    }

    /// Called once per node (after deduplication).
    fn visit_component(&mut self, node: &DependencyNode) {
        match node {
            DependencyNode::Unresolved { coordinate } => {
                self.visit_unresolved_component(coordinate)
            }
            DependencyNode::Resolved {
                coordinate,
                repository,
                ..
            } => self.visit_resolved_component(coordinate, repository.as_deref()),
        }
    }

    fn visit_unresolved_component(&mut self, coordinate: &Coordinate) {
        warn!("Unresolved component {coordinate}");
    }

    fn visit_resolved_component(&mut self, _coordinate: &Coordinate, _repository: Option<&str>) {}

    /// Called once per outgoing edge, before any filtering.
    fn visit_dependency(&mut self, edge: &DependencyNode) {
        if !edge.is_resolved() {
            warn!("Unresolved dependency {}", edge.coordinate());
        }
    }
}

/// Traversal limits and module filters.
#[derive(Debug, Clone, Default)]
pub struct TraversalOptions {
    /// Children deeper than this are not recursed into. `None` = unlimited.
    pub max_depth: Option<usize>,
    /// Recurse only into the root's direct dependencies; their children are
    /// still visited as leaves but never expanded further.
    pub ignore_transitive: bool,
    /// Wildcard patterns selecting modules to visit. Empty = all modules.
    pub include_modules: Vec<String>,
    /// Wildcard patterns selecting modules to skip.
    pub exclude_modules: Vec<String>,
}

/// Depth-first walk with deduplication, depth limiting and module filters.
///
/// A node reachable over several paths (diamonds, cycles) is visited and
/// queried at most once: the seen set is keyed on the node's coordinate.
pub struct DependencyTraversal<'a, V: DependencyVisitor> {
    visitor: &'a mut V,
    max_depth: Option<usize>,
    include: WildcardMatcher,
    exclude: WildcardMatcher,
    seen: HashSet<Coordinate>,
}

impl<'a, V: DependencyVisitor> DependencyTraversal<'a, V> {
    pub fn visit(root: &DependencyNode, visitor: &'a mut V, options: &TraversalOptions) -> Result<()> {
        // `ignore_transitive` visits grandchildren as leaves but never
        // expands them; that is a depth limit of 1, and the stricter of the
        // two bounds wins when both are configured.
        let max_depth = if options.ignore_transitive {
            Some(options.max_depth.map_or(1, |d| d.min(1)))
        } else {
            options.max_depth
        };

        let mut traversal = Self {
            visitor,
            max_depth,
            include: WildcardMatcher::new(&options.include_modules)?,
            exclude: WildcardMatcher::new(&options.exclude_modules)?,
            seen: HashSet::new(),
        };
        traversal.visit_node(root, 0);
        Ok(())
    }

    fn visit_node(&mut self, node: &DependencyNode, depth: usize) {
        if !self.seen.insert(node.coordinate().clone()) {
            return;
        }

        self.visitor.visit_component(node);
        let DependencyNode::Resolved { dependencies, .. } = node else {
            return;
        };

        let mut next: Vec<&DependencyNode> = Vec::new();
        for dependency in dependencies {
            self.visitor.visit_dependency(dependency);
            if !self.visitor.can_continue() {
                return;
            }

            if !dependency.is_resolved() {
                continue;
            }
            if let Some(max_depth) = self.max_depth {
                if depth > max_depth {
                    continue;
                }
            }
            if !self.selected(dependency) {
                continue;
            }
            next.push(dependency);
        }

        for dependency in next {
            self.visit_node(dependency, depth + 1);
            if !self.visitor.can_continue() {
                break;
            }
        }
    }

    /// Include gate first (an empty include list admits everything), then
    /// exclusion on the admitted modules. Patterns match `group:artifact`.
    fn selected(&self, node: &DependencyNode) -> bool {
        let module = node.coordinate().module();
        if !self.include.is_empty() && !self.include.matches(&module) {
            debug!("Skipping {module}: matches no include pattern");
            return false;
        }
        if self.exclude.matches(&module) {
            debug!("Excluding {module}: matches an exclude pattern");
            return false;
        }
        true
    }
}
