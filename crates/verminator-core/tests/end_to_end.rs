//! End-to-end tests over documents on disk
//!
//! These tests load a release matrix and instance files from a temporary
//! workspace, validate them and write the results back.

mod test_support;

use pretty_assertions::assert_eq;
use std::path::Path;
use test_support::{workspace, write_file};
use verminator_core::document::{self, discover_instance_files};
use verminator_core::{
    ErrorKind, InstanceValidator, ProductInstance, ReleaseCompatibilityMeta, Settings,
    ValidationWarning, ValidatorOptions, VersionIdentifier, VersionRange,
};

fn v(s: &str) -> VersionIdentifier {
    VersionIdentifier::parse(s).expect("valid version")
}

fn r(min: &str, max: &str) -> VersionRange {
    VersionRange::parse(min, max).expect("valid range")
}

fn load_meta(root: &Path) -> ReleaseCompatibilityMeta {
    ReleaseCompatibilityMeta::load(&root.join("releases_meta.yml"), Settings::default())
        .expect("Failed to load release matrix")
}

#[test]
fn test_discover_instance_files() {
    let dir = workspace();
    let files = discover_instance_files(dir.path()).unwrap();
    let relative: Vec<String> = files
        .iter()
        .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(relative, vec!["app/1.0/app.yml", "tool/1.3/tool.yaml"]);

    let single = dir.path().join("app/1.0/app.yml");
    assert_eq!(discover_instance_files(&single).unwrap(), vec![single]);

    let err = discover_instance_files(&dir.path().join("missing")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_compatible_versions_from_file() {
    let dir = workspace();
    let meta = load_meta(dir.path());
    let compatible = meta.get_compatible_versions(&v("tool-1.3.2-final")).unwrap();

    assert_eq!(compatible["tdc"], vec![r("tdc-1.0.0-final", "tdc-1.0.0-final")]);
    assert_eq!(compatible["tool"], vec![r("tool-1.3.2-final", "tool-1.3.2-final")]);
    assert_eq!(compatible["app"], vec![r("app-1.0.0-final", "app-1.0.0-final")]);
    assert_eq!(
        meta.release_names().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["tdc-1.0.0-final", "tdc-1.1.0-final"]
    );
}

#[test]
fn test_validate_repair_and_save() {
    let dir = workspace();
    let meta = load_meta(dir.path());
    let validator = InstanceValidator::new(&meta, Settings::default(), ValidatorOptions::default());
    let path = dir.path().join("app/1.0/app.yml");

    let report = validator.validate(ProductInstance::load(&path).unwrap()).unwrap();
    assert_eq!(
        report.warnings,
        vec![ValidationWarning::DependencyRepaired {
            release: v("app-1.0.0-final"),
            instance_type: "tool".to_string(),
            declared: r("tool-1.0.0-final", "tool-2.0.0-final"),
            repaired: r("tool-1.3.0-final", "tool-1.3.5-final"),
        }]
    );

    document::save_instance(&path, &report.instance.to_document()).unwrap();
    let reloaded = ProductInstance::load(&path).unwrap();
    assert_eq!(reloaded, report.instance);

    // a repaired instance validates cleanly
    let second = validator.validate(reloaded).unwrap();
    assert!(second.warnings.is_empty());
}

#[test]
fn test_clean_instance_has_no_warnings() {
    let dir = workspace();
    let meta = load_meta(dir.path());
    let instance = ProductInstance::load(&dir.path().join("tool/1.3/tool.yaml")).unwrap();
    let report = InstanceValidator::new(&meta, Settings::default(), ValidatorOptions::default())
        .validate(instance.clone())
        .unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.instance, instance);
}

#[test]
fn test_create_release_and_write_back() {
    let dir = workspace();
    let path = dir.path().join("tool/1.3/tool.yaml");
    let mut instance = ProductInstance::load(&path).unwrap();

    let release = instance.create_release(&v("tool-1.4.0-final"), None).unwrap();
    assert!(release.is_final());
    assert_eq!(release.image_version()["TOOL_IMAGE"], v("tool-1.4.0-final"));
    assert_eq!(release.image_version()["JDK_IMAGE"], v("1.8"));
    assert_eq!(
        release.dependency("tdc").unwrap().range,
        r("tdc-1.0.0-final", "tdc-1.0.0-final")
    );

    let out = dir.path().join("out/tool.yaml");
    document::save_instance(&out, &instance.to_document()).unwrap();
    let doc = document::load_instance(&out).unwrap();
    let versions: Vec<&str> = doc.releases.iter().map(|r| r.release_version.as_str()).collect();
    assert_eq!(versions, vec!["tool-1.3.2-final", "tool-1.4.0-final"]);
    assert_eq!(doc.releases[1].image_version["JDK_IMAGE"], "1.8");
}

#[test]
fn test_clone_tracks_own_product_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "x.yml",
        r#"
instance-type: x
major-version: "1"
min-tdc-version: tdc-1.0.0-final
max-tdc-version: tdc-1.0.0-final
hot-fix-ranges:
  - {min: x-1.2, max: x-1.3}
releases:
  - release-version: x-1.2.0-final
    dependencies:
      - {type: x-base, min-version: x-1.2.0-final, max-version: x-1.2.0-final}
    final: true
"#,
    );

    let mut instance = ProductInstance::load(&path).unwrap();
    let release = instance.create_release(&v("x-1.3.0-final"), None).unwrap();
    assert_eq!(
        release.dependency("x-base").unwrap().range,
        r("x-1.3.0-final", "x-1.3.0-final")
    );
}

#[test]
fn test_load_errors_carry_paths() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yml");
    let err = ProductInstance::load(&missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("missing.yml"));

    let bad = write_file(dir.path(), "bad.yml", "Releases:\n  - release_name: tdc-1.0.0-beta\n");
    let err = ReleaseCompatibilityMeta::load(&bad, Settings::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
