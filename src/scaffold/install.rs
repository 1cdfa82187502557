// src/scaffold/install.rs
//! Package-manager selection, the connectivity probe and the install step.

use std::net::ToSocketAddrs;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::npm::command_stdout;
use crate::ui;

const YARN_REGISTRY: &str = "registry.yarnpkg.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    /// Yarn when the tool itself was launched through yarn (`yarn create`),
    /// unless npm is forced.
    pub fn detect(user_agent: Option<&str>, use_npm: bool) -> Self {
        if !use_npm && user_agent.is_some_and(|ua| ua.starts_with("yarn")) {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    pub fn command(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarnpkg",
        }
    }
}

/// Arguments for installing `dependencies` into `root`.
pub fn install_args(
    manager: PackageManager,
    root: &Path,
    dependencies: &[String],
    verbose: bool,
    is_online: bool,
) -> Vec<String> {
    let mut args: Vec<String> = match manager {
        PackageManager::Yarn => {
            let mut args = vec!["add".to_string(), "--exact".to_string()];
            if !is_online {
                args.push("--offline".to_string());
            }
            args.extend(dependencies.iter().cloned());
            // yarn accepts an explicit cwd; npm relies on the cwd check instead
            args.push("--cwd".to_string());
            args.push(root.display().to_string());
            args
        }
        PackageManager::Npm => {
            let mut args: Vec<String> = ["install", "--no-audit", "--save", "--save-exact", "--loglevel", "error"]
                .into_iter()
                .map(String::from)
                .collect();
            args.extend(dependencies.iter().cloned());
            args
        }
    };
    if verbose {
        args.push("--verbose".to_string());
    }
    args
}

/// Install `dependencies`, streaming the package manager's output straight
/// to the terminal. A non-zero exit is a [`Error::Process`].
pub fn install(
    manager: PackageManager,
    root: &Path,
    dependencies: &[String],
    verbose: bool,
    is_online: bool,
) -> Result<()> {
    if manager == PackageManager::Yarn && !is_online {
        ui::warning("You appear to be offline.");
        ui::warning("Falling back to the local Yarn cache.");
        println!();
    }

    let args = install_args(manager, root, dependencies, verbose, is_online);
    let command = format!("{} {}", manager.command(), args.join(" "));
    debug!("running `{command}` in {:?}", root);

    let status = Command::new(manager.command())
        .args(&args)
        .current_dir(root)
        .status()
        .map_err(|e| {
            debug!("could not start {}: {e}", manager.command());
            Error::Process {
                command: command.clone(),
            }
        })?;
    if !status.success() {
        return Err(Error::Process { command });
    }
    Ok(())
}

fn can_resolve(host: &str) -> bool {
    match (host, 80).to_socket_addrs() {
        Ok(mut addrs) => addrs.next().is_some(),
        Err(e) => {
            debug!("could not resolve {host}: {e}");
            false
        }
    }
}

/// `https_proxy` from the environment, else npm's configured proxy.
fn proxy() -> Option<String> {
    if let Ok(proxy) = std::env::var("https_proxy") {
        return Some(proxy);
    }
    command_stdout("npm", &["config", "get", "https-proxy"]).filter(|p| p != "null" && !p.is_empty())
}

/// Host part of a proxy URL such as `http://proxy.corp:8080`.
pub fn proxy_host(proxy: &str) -> Option<String> {
    url::Url::parse(proxy)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Whether the yarn registry looks reachable. npm is always assumed online.
///
/// Behind a proxy external names usually do not resolve, so resolving the
/// proxy host counts as being online.
pub fn check_if_online(manager: PackageManager) -> bool {
    if manager == PackageManager::Npm {
        return true;
    }
    if can_resolve(YARN_REGISTRY) {
        return true;
    }
    match proxy().as_deref().and_then(proxy_host) {
        Some(host) => can_resolve(&host),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps() -> Vec<String> {
        vec!["react".into(), "react-dom".into(), "react-scripts".into()]
    }

    #[test]
    fn yarn_is_detected_from_user_agent() {
        let ua = Some("yarn/1.22.19 npm/? node/v18.0.0 linux x64");
        assert_eq!(PackageManager::detect(ua, false), PackageManager::Yarn);
        assert_eq!(PackageManager::detect(ua, true), PackageManager::Npm);
        assert_eq!(PackageManager::detect(Some("npm/9.0.0"), false), PackageManager::Npm);
        assert_eq!(PackageManager::detect(None, false), PackageManager::Npm);
    }

    #[test]
    fn npm_install_args() {
        let args = install_args(PackageManager::Npm, Path::new("/app"), &deps(), false, true);
        assert_eq!(
            args,
            [
                "install", "--no-audit", "--save", "--save-exact", "--loglevel", "error", "react",
                "react-dom", "react-scripts"
            ]
        );
    }

    #[test]
    fn yarn_offline_install_args() {
        let args = install_args(PackageManager::Yarn, Path::new("/app"), &deps(), true, false);
        assert_eq!(
            args,
            [
                "add", "--exact", "--offline", "react", "react-dom", "react-scripts", "--cwd", "/app",
                "--verbose"
            ]
        );
    }

    #[test]
    fn npm_is_always_online() {
        assert!(check_if_online(PackageManager::Npm));
    }

    #[test]
    fn proxy_host_parsing() {
        assert_eq!(proxy_host("http://proxy.corp:8080").as_deref(), Some("proxy.corp"));
        assert_eq!(proxy_host("not a url"), None);
    }
}
