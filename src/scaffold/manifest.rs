// src/scaffold/manifest.rs
//! The new app's `package.json`: initial write and post-install fixups.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ui;

pub const MANIFEST: &str = "package.json";

/// Keys are written in declaration order.
#[derive(Debug, Serialize)]
struct InitialManifest<'a> {
    name: &'a str,
    version: &'a str,
    private: bool,
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// Write `{ name, version: "0.1.0", private: true }` into `root`.
pub fn write_initial(root: &Path, app_name: &str) -> Result<()> {
    write_json(
        &root.join(MANIFEST),
        &InitialManifest {
            name: app_name,
            version: "0.1.0",
            private: true,
        },
    )
}

/// Turn `deps[name]` into a caret range. Versions that would not form a
/// valid range are kept as they are.
pub fn make_caret_range(dependencies: &mut Map<String, Value>, name: &str) -> Result<()> {
    let version = match dependencies.get(name) {
        Some(Value::String(v)) => v.clone(),
        _ => {
            return Err(Error::validation(format!(
                "Missing {name} dependency in package.json"
            )));
        }
    };

    let patched = format!("^{version}");
    if semver::VersionReq::parse(&patched).is_err() {
        ui::error(&format!(
            "Unable to patch {name} dependency version because version {version} will become invalid {patched}"
        ));
        return Ok(());
    }
    dependencies.insert(name.to_string(), Value::String(patched));
    Ok(())
}

/// After install: check the scripts package is a dependency and relax
/// `react`/`react-dom` to caret ranges. Key order in the file is kept.
pub fn set_caret_range_for_runtime_deps(root: &Path, package_name: &str) -> Result<()> {
    let path = root.join(MANIFEST);
    let mut manifest: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;

    let Some(dependencies) = manifest.get_mut("dependencies").and_then(Value::as_object_mut) else {
        return Err(Error::validation("Missing dependencies in package.json"));
    };
    if !dependencies.contains_key(package_name) {
        return Err(Error::validation(format!(
            "Unable to find {package_name} in package.json"
        )));
    }
    make_caret_range(dependencies, "react")?;
    make_caret_range(dependencies, "react-dom")?;

    write_json(&path, &manifest)
}

#[derive(Debug, Deserialize)]
struct EngineManifest {
    engines: Option<Engines>,
}

#[derive(Debug, Deserialize)]
struct Engines {
    node: Option<String>,
}

/// Check the running node against the `engines.node` range of the installed
/// scripts package. Packages without the field, and ranges this checker
/// cannot read, are accepted.
pub fn check_node_version(root: &Path, package_name: &str, node: &semver::Version) -> Result<()> {
    let path = root.join("node_modules").join(package_name).join(MANIFEST);
    if !path.is_file() {
        return Ok(());
    }
    let manifest: EngineManifest = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let Some(range) = manifest.engines.and_then(|e| e.node) else {
        return Ok(());
    };

    let Ok(req) = semver::VersionReq::parse(&range) else {
        debug!("cannot evaluate engines.node `{range}`, skipping the check");
        return Ok(());
    };
    if !req.matches(node) {
        return Err(Error::validation(format!(
            "You are running Node {node}.\nCreate React App requires Node {range} or higher.\nPlease update your version of Node."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn initial_manifest_layout() {
        let tmp = TempDir::new().unwrap();
        write_initial(tmp.path(), "my-app").unwrap();

        let text = fs::read_to_string(tmp.path().join(MANIFEST)).unwrap();
        assert_eq!(
            text,
            "{\n  \"name\": \"my-app\",\n  \"version\": \"0.1.0\",\n  \"private\": true\n}\n"
        );
    }

    #[test]
    fn runtime_deps_get_caret_ranges() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(MANIFEST),
            json!({
                "name": "my-app",
                "dependencies": { "react": "18.2.0", "react-dom": "18.2.0", "react-scripts": "5.0.1" }
            })
            .to_string(),
        )
        .unwrap();

        set_caret_range_for_runtime_deps(tmp.path(), "react-scripts").unwrap();

        let value: Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join(MANIFEST)).unwrap()).unwrap();
        assert_eq!(value["dependencies"]["react"], "^18.2.0");
        assert_eq!(value["dependencies"]["react-dom"], "^18.2.0");
        assert_eq!(value["dependencies"]["react-scripts"], "5.0.1");
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["name", "dependencies"]);
    }

    #[test]
    fn missing_scripts_dependency_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST), r#"{ "dependencies": { "react": "18.2.0" } }"#).unwrap();
        assert!(set_caret_range_for_runtime_deps(tmp.path(), "react-scripts").is_err());
    }

    #[test]
    fn invalid_caret_range_is_left_alone() {
        let mut deps = json!({ "react": "next" }).as_object().unwrap().clone();
        make_caret_range(&mut deps, "react").unwrap();
        assert_eq!(deps["react"], "next");
        assert!(make_caret_range(&mut deps, "react-dom").is_err());
    }

    #[test]
    fn node_engine_range_is_enforced() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("node_modules/react-scripts");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join(MANIFEST), r#"{ "engines": { "node": ">=14.0.0" } }"#).unwrap();

        assert!(check_node_version(tmp.path(), "react-scripts", &semver::Version::new(18, 1, 0)).is_ok());
        assert!(check_node_version(tmp.path(), "react-scripts", &semver::Version::new(12, 0, 0)).is_err());
        // not installed: nothing to check
        assert!(check_node_version(tmp.path(), "other", &semver::Version::new(1, 0, 0)).is_ok());
    }
}
