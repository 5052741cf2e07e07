//! Service template tests
//!
//! Template loading and expansion against the resolver.

mod common;

use tempfile::TempDir;

use app_provisioner::{DependencyResolver, ExpandOptions, ProvisionError, ServiceTemplate};
use common::catalog;

#[test]
fn template_loads_from_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pharmacy-portal.toml");
    std::fs::write(
        &path,
        r#"
        template_id = "pharmacy-portal"
        service_group = "pharmacy"
        global_core_apps = ["accounts", "settings"]
        core_apps = ["shop"]
        extension_apps = ["groupbuy"]
        "#,
    )
    .unwrap();

    let template = ServiceTemplate::from_file(&path).unwrap();
    assert_eq!(template.template_id, "pharmacy-portal");
    assert_eq!(template.service_group, "pharmacy");
    assert_eq!(template.core_apps, vec!["shop"]);
}

#[test]
fn template_with_empty_id_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
        template_id = ""
        service_group = "retail"
        "#,
    )
    .unwrap();

    let result = ServiceTemplate::from_file(&path);
    assert!(matches!(result, Err(ProvisionError::LoadError { .. })));
}

#[test]
fn expansion_feeds_the_resolver_deterministically() {
    let catalog = catalog(&[
        ("accounts", &[]),
        ("settings", &["accounts"]),
        ("shop", &["accounts"]),
        ("groupbuy", &["shop"]),
        ("analytics", &[]),
    ]);
    let template = ServiceTemplate {
        template_id: "pharmacy-portal".to_string(),
        service_group: "pharmacy".to_string(),
        global_core_apps: vec!["accounts".to_string(), "settings".to_string()],
        core_apps: vec!["shop".to_string()],
        extension_apps: vec!["groupbuy".to_string()],
    };
    let options = ExpandOptions::default()
        .with_extensions()
        .with_additional_extensions(vec!["analytics".to_string()])
        .skipping(vec!["settings".to_string()]);

    let requested = template.expand(&options);
    assert_eq!(requested, vec!["accounts", "shop", "groupbuy", "analytics"]);

    let resolution = DependencyResolver::new(&catalog).resolve(&requested);
    assert!(resolution.success());
    assert_eq!(
        resolution.install_order,
        vec!["accounts", "shop", "groupbuy", "analytics"]
    );
}
