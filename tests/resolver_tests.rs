//! Dependency resolver tests
//!
//! Ordering guarantees, cycle detection, missing-dependency reporting, and
//! failure isolation between independent requests.

mod common;

use app_provisioner::DependencyResolver;
use common::catalog;

#[test]
fn request_order_breaks_ties() {
    let catalog = catalog(&[("a", &[]), ("b", &["a"]), ("c", &["a"])]);
    let resolver = DependencyResolver::new(&catalog);

    let result = resolver.resolve(&["b", "c"]);
    assert!(result.success());
    assert_eq!(result.install_order, vec!["a", "b", "c"]);

    let result = resolver.resolve(&["c", "b"]);
    assert_eq!(result.install_order, vec!["a", "c", "b"]);
}

#[test]
fn deep_chain_resolves_leaf_first() {
    let catalog = catalog(&[
        ("base", &[]),
        ("auth", &["base"]),
        ("catalog", &["auth"]),
        ("checkout", &["catalog", "auth"]),
    ]);
    let result = DependencyResolver::new(&catalog).resolve(&["checkout"]);

    assert!(result.success());
    assert_eq!(
        result.install_order,
        vec!["base", "auth", "catalog", "checkout"]
    );
}

#[test]
fn duplicate_requests_resolve_once() {
    let catalog = catalog(&[("a", &[]), ("b", &["a"])]);
    let result = DependencyResolver::new(&catalog).resolve(&["b", "b", "a"]);

    assert!(result.success());
    assert_eq!(result.install_order, vec!["a", "b"]);
}

#[test]
fn two_module_cycle_reports_both_and_installs_nothing() {
    let catalog = catalog(&[("x", &["y"]), ("y", &["x"])]);
    let result = DependencyResolver::new(&catalog).resolve(&["x"]);

    assert!(!result.success());
    assert!(result.circular_dependencies.contains("x"));
    assert!(result.circular_dependencies.contains("y"));
    assert!(result.install_order.is_empty());
}

#[test]
fn longer_cycle_reports_every_member() {
    let catalog = catalog(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
    let result = DependencyResolver::new(&catalog).resolve(&["a"]);

    assert!(!result.success());
    for id in ["a", "b", "c"] {
        assert!(result.circular_dependencies.contains(id), "missing {}", id);
    }
}

#[test]
fn module_above_a_cycle_is_not_ordered() {
    let catalog = catalog(&[("w", &["x"]), ("x", &["y"]), ("y", &["x"])]);
    let result = DependencyResolver::new(&catalog).resolve(&["w"]);

    assert!(!result.success());
    assert!(!result.install_order.contains(&"w".to_string()));
    assert!(result.circular_dependencies.contains("x"));
    assert!(result.circular_dependencies.contains("y"));
    // w itself is not part of the cycle.
    assert!(!result.circular_dependencies.contains("w"));
}

#[test]
fn missing_dependency_is_reported() {
    let catalog = catalog(&[("m", &["z"])]);
    let result = DependencyResolver::new(&catalog).resolve(&["m"]);

    assert!(!result.success());
    assert!(result.missing_dependencies.contains("z"));
    assert!(result.install_order.is_empty());
}

#[test]
fn unknown_requested_module_is_reported_missing() {
    let catalog = catalog(&[("a", &[])]);
    let result = DependencyResolver::new(&catalog).resolve(&["ghost"]);

    assert!(!result.success());
    assert!(result.missing_dependencies.contains("ghost"));
}

#[test]
fn all_missing_dependencies_are_collected() {
    let catalog = catalog(&[("m", &["z1", "z2"])]);
    let result = DependencyResolver::new(&catalog).resolve(&["m"]);

    assert!(result.missing_dependencies.contains("z1"));
    assert!(result.missing_dependencies.contains("z2"));
}

#[test]
fn diamond_dependency_is_not_a_cycle() {
    let catalog = catalog(&[("c", &[]), ("a", &["c"]), ("b", &["c"])]);
    let result = DependencyResolver::new(&catalog).resolve(&["a", "b"]);

    assert!(result.success());
    assert_eq!(
        result
            .install_order
            .iter()
            .filter(|m| m.as_str() == "c")
            .count(),
        1
    );
    assert_eq!(result.install_order, vec!["c", "a", "b"]);
}

#[test]
fn failed_branch_does_not_stop_unrelated_requests() {
    let catalog = catalog(&[("broken", &["gone"]), ("x", &["y"]), ("y", &["x"]), ("ok", &[])]);
    let result = DependencyResolver::new(&catalog).resolve(&["broken", "x", "ok"]);

    assert!(!result.success());
    assert_eq!(result.install_order, vec!["ok"]);
    assert!(result.missing_dependencies.contains("gone"));
    assert!(result.circular_dependencies.contains("x"));
}
