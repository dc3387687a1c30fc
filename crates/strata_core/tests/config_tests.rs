//! Integration tests for project configuration loading.

use std::fs;
use std::path::Path;

use strata_core::{CoreError, Project};
use strata_runner::OsFileSystem;
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_context_file_wins_over_root_entry() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("strata.yaml"),
        "contexts:\n  prod:\n    terraform:\n      backend:\n        type: s3\n",
    );
    write(
        &dir.path().join("contexts/prod/strata.yaml"),
        "terraform:\n  backend:\n    type: azurerm\n    prefix: team\n",
    );

    let project = Project::new(dir.path(), "prod").unwrap();
    let config = project.load_context_config(&OsFileSystem).unwrap();

    assert_eq!(config.terraform.backend.kind, "azurerm");
    assert_eq!(config.terraform.backend.prefix(), "team");
}

#[test]
fn test_root_entry_used_without_context_file() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("strata.yaml"),
        "contexts:\n  prod:\n    terraform:\n      binary: tofu\n      backend:\n        type: kubernetes\n",
    );

    let prod = Project::new(dir.path(), "prod")
        .unwrap()
        .load_context_config(&OsFileSystem)
        .unwrap();
    assert_eq!(prod.terraform.binary, "tofu");
    assert_eq!(prod.terraform.backend.kind, "kubernetes");

    // Unknown context falls back to defaults
    let other = Project::new(dir.path(), "other")
        .unwrap()
        .load_context_config(&OsFileSystem)
        .unwrap();
    assert_eq!(other.terraform.backend.kind, "local");
}

#[test]
fn test_invalid_context_config_reports_path() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("contexts/local/strata.yaml"), "terraform: 42\n");

    let err = Project::new(dir.path(), "local")
        .unwrap()
        .load_context_config(&OsFileSystem)
        .unwrap_err();

    match err {
        CoreError::InvalidConfig { path, .. } => {
            assert!(path.ends_with("contexts/local/strata.yaml"));
        }
        other => panic!("Expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn test_blueprint_loading() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("contexts/local/blueprint.yaml"),
        r#"
terraform:
  - path: network/vpc
  - path: network/subnets
    dependsOn: [network/vpc]
  - path: app
    dependsOn: [network/subnets]
    parallelism: 5
"#,
    );

    let project = Project::new(dir.path(), "local").unwrap();
    let blueprint = project.load_blueprint(&OsFileSystem).unwrap();

    assert_eq!(blueprint.components().len(), 3);
    let app = blueprint.get("app").unwrap();
    assert_eq!(app.depends_on, vec!["network/subnets"]);
    assert_eq!(app.parallelism, Some(5));
    assert_eq!(app.full_path, dir.path().join("terraform").join("app"));
}

#[test]
fn test_missing_blueprint_is_empty() {
    let dir = tempdir().unwrap();
    let project = Project::new(dir.path(), "local").unwrap();
    assert!(project.load_blueprint(&OsFileSystem).unwrap().components().is_empty());
}
