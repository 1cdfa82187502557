// src/scaffold/packages.rs
//! Turning `--scripts-version` / `--template` into installable package
//! specifiers, and finding out what a specifier actually installs.

use path_absolutize::Absolutize;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_SCRIPTS: &str = "react-scripts";
pub const DEFAULT_TEMPLATE: &str = "cra-template";

static TARBALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.+\.(tgz|tar\.gz)$").expect("valid regex"));
static TARBALL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+/(.+?)(?:-\d+.+)?\.(tgz|tar\.gz)$").expect("valid regex"));
static GIT_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^/]+)\.git(#.*)?$").expect("valid regex"));
static TEMPLATE_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(@[^/]+/)?([^@]+)?(@.+)?$").expect("valid regex"));

/// Name (and version, when known) of an installable package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    name: String,
    version: Option<String>,
}

/// Strict semver, tolerating a leading `v` or `=`.
fn valid_semver(version: &str) -> Option<semver::Version> {
    semver::Version::parse(version.trim().trim_start_matches(['v', '='])).ok()
}

fn file_spec(path: &str, original_dir: &Path) -> Result<String> {
    let abs = Path::new(path).absolutize_from(original_dir)?;
    Ok(format!("file:{}", abs.display()))
}

/// The scripts package to install for `--scripts-version`.
///
/// - a semver version pins `react-scripts@<version>`
/// - `@tag` becomes `react-scripts@tag`
/// - `file:<path>` is resolved against the directory the tool was run from
/// - anything else (a package name, a tarball, a URL) is used as is
pub fn install_package(version: Option<&str>, original_dir: &Path) -> Result<String> {
    let Some(version) = version.filter(|v| !v.is_empty()) else {
        return Ok(DEFAULT_SCRIPTS.to_string());
    };
    if let Some(valid) = valid_semver(version) {
        return Ok(format!("{DEFAULT_SCRIPTS}@{valid}"));
    }
    if version.starts_with('@') && !version.contains('/') {
        return Ok(format!("{DEFAULT_SCRIPTS}{version}"));
    }
    if let Some(path) = version.strip_prefix("file:") {
        return file_spec(path, original_dir);
    }
    Ok(version.to_string())
}

/// The template package to install for `--template`.
///
/// Bare names are prefixed with `cra-template-` unless they already carry
/// the prefix; scopes and versions are kept.
pub fn template_install_package(template: Option<&str>, original_dir: &Path) -> Result<String> {
    let Some(template) = template.filter(|t| !t.is_empty()) else {
        return Ok(DEFAULT_TEMPLATE.to_string());
    };
    if let Some(path) = template.strip_prefix("file:") {
        return file_spec(path, original_dir);
    }
    if template.contains("://") || TARBALL.is_match(template) {
        return Ok(template.to_string());
    }

    let caps = TEMPLATE_SPEC.captures(template);
    let group = |i: usize| {
        caps.as_ref()
            .and_then(|c| c.get(i))
            .map_or("", |m| m.as_str())
    };
    let (scope, name, version) = (group(1), group(2), group(3));

    let spec = if name == DEFAULT_TEMPLATE || name.starts_with(&format!("{DEFAULT_TEMPLATE}-")) {
        format!("{scope}{name}{version}")
    } else if !version.is_empty() && scope.is_empty() && name.is_empty() {
        format!("{version}/{DEFAULT_TEMPLATE}")
    } else {
        format!("{scope}{DEFAULT_TEMPLATE}-{name}{version}")
    };
    Ok(spec)
}

/// Work out the package name (and version) a specifier installs.
pub fn package_info(spec: &str) -> Result<PackageInfo> {
    if TARBALL.is_match(spec) {
        return match tarball_info(spec) {
            Ok(info) => Ok(info),
            Err(err) => {
                println!("Could not extract the package name from the archive: {err}");
                let assumed = TARBALL_NAME
                    .captures(spec)
                    .and_then(|c| c.get(1))
                    .map_or(String::new(), |m| m.as_str().to_string());
                println!("Based on the filename, assuming it is \"{assumed}\"");
                Ok(PackageInfo {
                    name: assumed,
                    version: None,
                })
            }
        };
    }
    if spec.starts_with("git+") {
        let name = GIT_NAME
            .captures(spec)
            .and_then(|c| c.get(1))
            .map_or(String::new(), |m| m.as_str().to_string());
        return Ok(PackageInfo { name, version: None });
    }
    if let Some(path) = spec.strip_prefix("file:") {
        return read_manifest(&Path::new(path).join("package.json"));
    }
    // `name@version`; a leading `@` belongs to the scope
    if let Some(at) = spec.get(1..).and_then(|rest| rest.find('@')).map(|i| i + 1) {
        return Ok(PackageInfo {
            name: spec[..at].to_string(),
            version: Some(spec[at + 1..].to_string()),
        });
    }
    Ok(PackageInfo {
        name: spec.to_string(),
        version: None,
    })
}

fn read_manifest(path: &Path) -> Result<PackageInfo> {
    let manifest: Manifest = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(PackageInfo {
        name: manifest.name,
        version: manifest.version,
    })
}

/// Download (for URLs) and unpack a tarball, then read its `package.json`.
fn tarball_info(spec: &str) -> Result<PackageInfo> {
    let tmp = tempfile::Builder::new().prefix("h0-package-").tempdir()?;

    let archive = if spec.starts_with("http") {
        debug!("downloading {spec}");
        let bytes = reqwest::blocking::get(spec)?.error_for_status()?.bytes()?;
        let file = tmp.path().join("package.tgz");
        fs::write(&file, &bytes)?;
        file
    } else {
        Path::new(spec).to_path_buf()
    };

    let unpacked = tmp.path().join("package");
    fs::create_dir_all(&unpacked)?;
    let status = Command::new("tar")
        .arg("-xzf")
        .arg(&archive)
        .arg("-C")
        .arg(&unpacked)
        .arg("--strip-components=1")
        .status()?;
    if !status.success() {
        return Err(Error::Process {
            command: format!("tar -xzf {}", archive.display()),
        });
    }

    let info = read_manifest(&unpacked.join("package.json"))?;
    tmp.close()?;
    Ok(info)
}
