//! Component dependency resolution.

use std::collections::HashMap;

use tracing::debug;

use strata_core::Component;

use crate::error::{IacError, IacResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Read-only view over a component set, rebuilt for every computation.
#[derive(Debug)]
pub struct ComponentGraph<'a> {
    by_path: HashMap<&'a str, &'a Component>,
}

impl<'a> ComponentGraph<'a> {
    pub fn new(components: &'a [Component]) -> Self {
        let by_path = components.iter().map(|c| (c.path.as_str(), c)).collect();
        Self { by_path }
    }

    pub fn get(&self, path: &str) -> Option<&'a Component> {
        self.by_path.get(path).copied()
    }

    /// Direct dependencies of `current_path`, in declared order.
    ///
    /// An undeclared `current_path` has no dependencies. Fails if any cycle
    /// is reachable from `current_path`, or if one of its direct
    /// dependencies is not declared.
    pub fn resolve(&self, current_path: &str) -> IacResult<Vec<&'a Component>> {
        let Some(current) = self.get(current_path) else {
            debug!("{:?} is not a declared component", current_path);
            return Ok(Vec::new());
        };

        let mut marks = HashMap::new();
        self.visit(current, &mut marks)?;

        let deps = current
            .depends_on
            .iter()
            .map(|dep| {
                self.get(dep).ok_or_else(|| IacError::MissingDependency {
                    component: current.path.clone(),
                    dependency: dep.clone(),
                })
            })
            .collect::<IacResult<Vec<_>>>()?;

        debug!(
            "Direct dependencies of {}: {:?}",
            current.path,
            deps.iter().map(|c| c.path.as_str()).collect::<Vec<_>>()
        );
        Ok(deps)
    }

    fn visit(
        &self,
        component: &'a Component,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> IacResult<()> {
        match marks.get(component.path.as_str()) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(IacError::CircularDependency(component.path.clone()))
            }
            None => {}
        }

        marks.insert(component.path.as_str(), Mark::InProgress);
        for dep in &component.depends_on {
            // Dangling references are reported for the current component only
            if let Some(next) = self.get(dep) {
                self.visit(next, marks)?;
            }
        }
        marks.insert(component.path.as_str(), Mark::Done);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(path: &str, deps: &[&str]) -> Component {
        Component::new(path, format!("/p/terraform/{path}")).depends_on(deps.iter().copied())
    }

    fn paths(deps: &[&Component]) -> Vec<String> {
        deps.iter().map(|c| c.path.clone()).collect()
    }

    #[test]
    fn test_direct_dependencies_only() {
        let components = vec![
            component("vpc", &[]),
            component("subnets", &["vpc"]),
            component("app", &["subnets"]),
        ];
        let graph = ComponentGraph::new(&components);

        assert_eq!(paths(&graph.resolve("app").unwrap()), vec!["subnets"]);
        assert_eq!(paths(&graph.resolve("subnets").unwrap()), vec!["vpc"]);
        assert!(graph.resolve("vpc").unwrap().is_empty());
    }

    #[test]
    fn test_declared_order_is_kept() {
        let components = vec![
            component("a", &[]),
            component("b", &[]),
            component("c", &[]),
            component("app", &["c", "a", "b"]),
        ];
        let graph = ComponentGraph::new(&components);
        assert_eq!(paths(&graph.resolve("app").unwrap()), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_undeclared_current_path_has_no_dependencies() {
        let components = vec![component("vpc", &[])];
        let graph = ComponentGraph::new(&components);
        assert!(graph.resolve("elsewhere").unwrap().is_empty());
        assert!(graph.resolve("").unwrap().is_empty());
    }

    #[test]
    fn test_cycle_detected_from_every_member() {
        let components = vec![
            component("a", &["b"]),
            component("b", &["c"]),
            component("c", &["a"]),
        ];
        let graph = ComponentGraph::new(&components);

        for path in ["a", "b", "c"] {
            let err = graph.resolve(path).unwrap_err();
            assert!(
                err.to_string().contains("circular dependency"),
                "{path}: {err}"
            );
        }
    }

    #[test]
    fn test_transitive_cycle_aborts_resolution() {
        let components = vec![
            component("x", &["y"]),
            component("y", &["x"]),
            component("lib", &["x"]),
            component("app", &["lib"]),
        ];
        let graph = ComponentGraph::new(&components);
        let err = graph.resolve("app").unwrap_err();
        assert!(matches!(err, IacError::CircularDependency(_)));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let components = vec![component("a", &["a"])];
        let graph = ComponentGraph::new(&components);
        assert!(matches!(
            graph.resolve("a"),
            Err(IacError::CircularDependency(p)) if p == "a"
        ));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let components = vec![
            component("base", &[]),
            component("left", &["base"]),
            component("right", &["base"]),
            component("top", &["left", "right"]),
        ];
        let graph = ComponentGraph::new(&components);
        assert_eq!(paths(&graph.resolve("top").unwrap()), vec!["left", "right"]);
    }

    #[test]
    fn test_missing_dependency() {
        let components = vec![component("app", &["vpc", "ghost"]), component("vpc", &[])];
        let graph = ComponentGraph::new(&components);

        let err = graph.resolve("app").unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_unrelated_cycle_is_ignored() {
        let components = vec![
            component("x", &["y"]),
            component("y", &["x"]),
            component("app", &[]),
        ];
        let graph = ComponentGraph::new(&components);
        assert!(graph.resolve("app").unwrap().is_empty());
    }
}
