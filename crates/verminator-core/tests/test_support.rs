//! Shared test support utilities for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small release matrix certifying `tool` and `app` against two platform releases
pub const RELEASES_META: &str = r#"
Releases:
  - release_name: tdc-1.0.0-final
    products:
      - {min: tool-1.3.0-final, max: tool-1.3.5-final}
      - {min: app-1.0.0-final, max: app-1.0.0-final}
  - release_name: tdc-1.1.0-final
    products:
      - {min: tool-1.3.4-final, max: tool-1.4.0-final}
      - {min: app-1.1.0-final, max: app-1.1.0-final}
"#;

/// An `app` instance whose `tool` dependency is wider than the matrix allows
pub const APP_INSTANCE: &str = r#"
instance-type: app
major-version: "1.0"
min-tdc-version: tdc-1.0.0-final
max-tdc-version: tdc-1.0.0-final
hot-fix-ranges:
  - {min: app-1.0, max: app-1.0}
images:
  - {variable: APP_IMAGE, name: app}
releases:
  - release-version: app-1.0.0-final
    image-version: {APP_IMAGE: app-1.0.0-final}
    dependencies:
      - {type: tool, min-version: tool-1.0.0-final, max-version: tool-2.0.0-final}
    final: true
"#;

/// A `tool` instance with two release lines
pub const TOOL_INSTANCE: &str = r#"
instance-type: tool
major-version: "1.3"
min-tdc-version: tdc-1.0.0-final
max-tdc-version: tdc-1.1.0-final
hot-fix-ranges:
  - {min: tool-1.3, max: tool-1.4}
images:
  - {variable: TOOL_IMAGE, name: tool}
  - {variable: JDK_IMAGE, name: jdk}
releases:
  - release-version: tool-1.3.2-final
    image-version: {TOOL_IMAGE: tool-1.3.2-final, JDK_IMAGE: '1.8'}
    dependencies:
      - {type: tdc, min-version: tdc-1.0.0-final, max-version: tdc-1.0.0-final}
    final: true
"#;

/// Write `content` to `relative` under `dir`, creating parents
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// A temporary workspace holding the matrix and both instances
pub fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_file(dir.path(), "releases_meta.yml", RELEASES_META);
    write_file(dir.path(), "app/1.0/app.yml", APP_INSTANCE);
    write_file(dir.path(), "tool/1.3/tool.yaml", TOOL_INSTANCE);
    write_file(dir.path(), ".git/config.yml", "not: an instance");
    write_file(dir.path(), "tool/README.md", "# tool");
    dir
}
