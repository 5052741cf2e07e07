//! Module dependency resolution
//!
//! Computes the installation order for a requested module set by walking the
//! dependency closure depth-first. Cycle detection uses a per-path ancestor
//! set, distinct from the visited set, so diamond-shaped graphs (two modules
//! sharing a dependency) are never flagged as cyclic.
//!
//! The resolver is pure: it reads only the catalog, performs no I/O, and is
//! safe to call repeatedly and concurrently.

use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::catalog::ModuleCatalog;
use crate::lifecycle::ProvisionError;

/// Dependency resolution result
///
/// `install_order` lists every module whose full dependency closure
/// resolved, dependencies strictly before dependents. Failed branches leave
/// their modules out of the order and record them in the diagnostic sets.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Modules in installation order (dependencies first)
    pub install_order: Vec<String>,
    /// Modules participating in a dependency cycle
    pub circular_dependencies: BTreeSet<String>,
    /// Referenced modules absent from the catalog
    pub missing_dependencies: BTreeSet<String>,
}

impl ResolutionResult {
    /// Whether every requested module resolved
    ///
    /// Derived, never stored: true exactly when both diagnostic sets are
    /// empty.
    pub fn success(&self) -> bool {
        self.circular_dependencies.is_empty() && self.missing_dependencies.is_empty()
    }

    /// Removal order: the reverse of the installation order
    pub fn uninstall_order(&self) -> Vec<String> {
        let mut order = self.install_order.clone();
        order.reverse();
        order
    }

    /// Convert a failed resolution into its fatal error
    ///
    /// Cycles take precedence over missing dependencies when both are
    /// present. Returns `None` for a successful resolution.
    pub fn to_error(&self) -> Option<ProvisionError> {
        if !self.circular_dependencies.is_empty() {
            return Some(ProvisionError::CyclicDependency(
                self.circular_dependencies.iter().cloned().collect(),
            ));
        }
        self.missing_dependencies
            .iter()
            .next()
            .map(|id| ProvisionError::MissingDependency(id.clone()))
    }
}

/// Dependency resolver over an injected catalog
pub struct DependencyResolver<'a> {
    catalog: &'a ModuleCatalog,
}

struct ResolveState {
    order: Vec<String>,
    /// Modules whose full closure is already placed in the output
    resolved: HashSet<String>,
    /// Modules whose resolution has started (successful or not)
    visited: HashSet<String>,
    circular: BTreeSet<String>,
    missing: BTreeSet<String>,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver over the given catalog
    pub fn new(catalog: &'a ModuleCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve the requested modules into an installation order
    ///
    /// Requested ids are processed in request order and dependencies in
    /// declared order, so the result is deterministic. Each requested id
    /// resolves independently: a failed branch records its diagnostics but
    /// does not stop resolution of unrelated requests.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> ResolutionResult {
        let mut state = ResolveState {
            order: Vec::new(),
            resolved: HashSet::new(),
            visited: HashSet::new(),
            circular: BTreeSet::new(),
            missing: BTreeSet::new(),
        };
        let mut ancestors: Vec<String> = Vec::new();

        for module_id in requested {
            self.visit(module_id.as_ref(), &mut ancestors, &mut state);
        }

        debug!(
            "Resolved {} of {} requested modules: {:?}",
            state.order.len(),
            requested.len(),
            state.order
        );

        ResolutionResult {
            install_order: state.order,
            circular_dependencies: state.circular,
            missing_dependencies: state.missing,
        }
    }

    /// Walk one module's dependency closure; returns whether it resolved
    fn visit(&self, module_id: &str, ancestors: &mut Vec<String>, state: &mut ResolveState) -> bool {
        if state.resolved.contains(module_id) {
            // Already placed by an earlier branch (diamond dependency).
            return true;
        }

        if let Some(position) = ancestors.iter().position(|a| a == module_id) {
            // True cycle on the current path; record the cycle slice.
            for member in &ancestors[position..] {
                state.circular.insert(member.clone());
            }
            state.circular.insert(module_id.to_string());
            return false;
        }

        if state.visited.contains(module_id) {
            // Resolution already started and failed on another branch.
            return false;
        }
        state.visited.insert(module_id.to_string());

        let descriptor = match self.catalog.get(module_id) {
            Some(descriptor) => descriptor,
            None => {
                state.missing.insert(module_id.to_string());
                return false;
            }
        };

        ancestors.push(module_id.to_string());
        let mut all_ok = true;
        for dependency in &descriptor.dependencies {
            // Keep walking after a failure so every missing or cyclic
            // dependency in the closure is reported, not just the first.
            if !self.visit(dependency, ancestors, state) {
                all_ok = false;
            }
        }
        ancestors.pop();

        if all_ok {
            state.order.push(module_id.to_string());
            state.resolved.insert(module_id.to_string());
        }
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleDescriptor;

    fn catalog(entries: &[(&str, &[&str])]) -> ModuleCatalog {
        let descriptors = entries
            .iter()
            .map(|(id, deps)| {
                ModuleDescriptor::new(*id, deps.iter().map(|d| d.to_string()).collect())
            })
            .collect();
        ModuleCatalog::from_descriptors(descriptors).unwrap()
    }

    #[test]
    fn dependency_precedes_dependent() {
        let catalog = catalog(&[("a", &[]), ("b", &["a"])]);
        let result = DependencyResolver::new(&catalog).resolve(&["b"]);

        assert!(result.success());
        assert_eq!(result.install_order, vec!["a", "b"]);
    }

    #[test]
    fn diamond_places_shared_dependency_once() {
        let catalog = catalog(&[("c", &[]), ("a", &["c"]), ("b", &["c"])]);
        let result = DependencyResolver::new(&catalog).resolve(&["a", "b"]);

        assert!(result.success());
        assert_eq!(result.install_order, vec!["c", "a", "b"]);
    }

    #[test]
    fn two_cycle_reports_both_members() {
        let catalog = catalog(&[("x", &["y"]), ("y", &["x"])]);
        let result = DependencyResolver::new(&catalog).resolve(&["x"]);

        assert!(!result.success());
        assert!(result.circular_dependencies.contains("x"));
        assert!(result.circular_dependencies.contains("y"));
        assert!(result.install_order.is_empty());
    }

    #[test]
    fn missing_dependency_is_reported_and_isolated() {
        let catalog = catalog(&[("m", &["z"]), ("ok", &[])]);
        let result = DependencyResolver::new(&catalog).resolve(&["m", "ok"]);

        assert!(!result.success());
        assert!(result.missing_dependencies.contains("z"));
        // The unrelated request still resolves.
        assert_eq!(result.install_order, vec!["ok"]);
    }

    #[test]
    fn uninstall_order_is_reversed() {
        let catalog = catalog(&[("a", &[]), ("b", &["a"])]);
        let result = DependencyResolver::new(&catalog).resolve(&["b"]);

        assert_eq!(result.uninstall_order(), vec!["b", "a"]);
    }

    #[test]
    fn resolve_is_deterministic() {
        let catalog = catalog(&[
            ("base", &[]),
            ("auth", &["base"]),
            ("shop", &["base", "auth"]),
            ("forum", &["base"]),
        ]);
        let resolver = DependencyResolver::new(&catalog);
        let first = resolver.resolve(&["shop", "forum"]);
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&["shop", "forum"]).install_order, first.install_order);
        }
        assert_eq!(first.install_order, vec!["base", "auth", "shop", "forum"]);
    }

    #[test]
    fn cycle_error_takes_precedence() {
        let catalog = catalog(&[("x", &["y"]), ("y", &["x"]), ("m", &["gone"])]);
        let result = DependencyResolver::new(&catalog).resolve(&["x", "m"]);

        assert!(matches!(
            result.to_error(),
            Some(ProvisionError::CyclicDependency(_))
        ));
    }
}
