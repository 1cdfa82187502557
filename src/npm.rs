// src/npm.rs
//! Small probes around the node toolchain: versions and the npm cwd check.

use owo_colors::OwoColorize;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Run `program args...` and return trimmed stdout, or `None` if the program
/// is missing or exits unsuccessfully.
pub fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        debug!("`{program} {}` exited with {}", args.join(" "), output.status);
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub fn npm_version() -> Option<String> {
    command_stdout("npm", &["--version"])
}

pub fn yarn_version() -> Option<String> {
    command_stdout("yarnpkg", &["--version"])
}

/// `node --version` without the leading `v`.
pub fn node_version() -> Option<String> {
    command_stdout("node", &["--version"]).map(|v| v.trim_start_matches('v').to_string())
}

/// Parse loose versions such as `v14.17.0` or `6.14.4-beta` into semver,
/// keeping only `major.minor.patch` (missing parts are zero).
pub fn coerce_version(raw: &str) -> Option<semver::Version> {
    let digits = raw.trim().trim_start_matches('v');
    let mut parts = digits
        .split(|c: char| !c.is_ascii_digit())
        .take_while(|p| !p.is_empty())
        .take(3)
        .map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().and_then(|p| p.ok()).unwrap_or(0);
    let patch = parts.next().and_then(|p| p.ok()).unwrap_or(0);
    Some(semver::Version::new(major, minor, patch))
}

/// Find the directory npm reports in the `; cwd = ` line of `npm config list`.
pub fn npm_reported_cwd(config_list: &str) -> Option<&str> {
    const PREFIX: &str = "; cwd = ";
    config_list
        .lines()
        .find_map(|line| line.strip_prefix(PREFIX))
        .map(str::trim_end)
}

/// Make sure a freshly spawned npm runs in `cwd`. Misconfigured shells (an
/// AutoRun entry on Windows) can silently move it elsewhere.
///
/// Passes when npm is not installed or does not report its cwd.
pub fn check_npm_can_read_cwd(cwd: &Path) -> Result<()> {
    let Some(output) = Command::new("npm").args(["config", "list"]).current_dir(cwd).output().ok() else {
        return Ok(());
    };
    let text = String::from_utf8_lossy(&output.stdout);
    let Some(npm_cwd) = npm_reported_cwd(&text) else {
        return Ok(());
    };
    if Path::new(npm_cwd) == cwd {
        return Ok(());
    }

    let mut message = format!(
        "Could not start an npm process in the right directory.\n\n\
         The current directory is: {}\n\
         However, a newly started npm process runs in: {}\n\n\
         This is probably caused by a misconfigured system terminal shell.",
        cwd.display().bold(),
        npm_cwd.bold()
    );
    if cfg!(windows) {
        message.push_str(&format!(
            "\nOn Windows, this can usually be fixed by running:\n\n  \
             {} delete \"HKCU\\Software\\Microsoft\\Command Processor\" /v AutoRun /f\n  \
             {} delete \"HKLM\\Software\\Microsoft\\Command Processor\" /v AutoRun /f\n\n\
             Try to run the above two lines in the terminal.",
            "reg".cyan(),
            "reg".cyan()
        ));
    }
    Err(Error::validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_loose_versions() {
        assert_eq!(coerce_version("v14.17.0"), Some(semver::Version::new(14, 17, 0)));
        assert_eq!(coerce_version("6.14.4-beta.1"), Some(semver::Version::new(6, 14, 4)));
        assert_eq!(coerce_version("18"), Some(semver::Version::new(18, 0, 0)));
        assert_eq!(coerce_version("15.0.0-nightly2020"), Some(semver::Version::new(15, 0, 0)));
        assert_eq!(coerce_version("latest"), None);
    }

    #[test]
    fn reads_cwd_from_npm_config_list() {
        let out = "; \"user\" config from /home/me/.npmrc\n\n; node bin location = /usr/bin/node\n; cwd = /home/me/app\n; HOME = /home/me\n";
        assert_eq!(npm_reported_cwd(out), Some("/home/me/app"));
        assert_eq!(npm_reported_cwd("; nothing here\n"), None);
    }
}
