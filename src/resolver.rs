// src/resolver.rs
//! Target path resolution, directory safety checks and package-name rules.

use owo_colors::OwoColorize;
use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Join `name` onto `root` and normalize the result (`.`/`..` segments are
/// resolved lexically, nothing is touched on disk).
///
/// - `root`: project root, e.g. `/proj`
/// - `name`: relative target, e.g. `src/pages/Foo` or `../other-app`
///
/// The same inputs always give the same path.
pub fn resolve_target(root: &Path, name: &str) -> Result<PathBuf> {
    let joined = root.join(name);
    Ok(joined.absolutize_from(root)?.to_path_buf())
}

/// A page name becomes a directory under `src/pages` and part of a route
/// path, so it is limited to ASCII letters, digits, `_` and `-`.
pub fn validate_page_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("The page name must not be empty."));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(Error::validation(format!(
            "Cannot use \"{name}\" as a page name: `{bad}` is not allowed. Use letters, digits, `_` or `-`."
        )));
    }
    Ok(())
}

/// Entries that may already exist in a directory we are about to fill.
const VALID_FILES: &[&str] = &[
    ".DS_Store",
    ".git",
    ".gitattributes",
    ".gitignore",
    ".gitlab-ci.yml",
    ".hg",
    ".hgcheck",
    ".hgignore",
    ".idea",
    ".npmignore",
    ".travis.yml",
    "docs",
    "LICENSE",
    "README.md",
    "mkdocs.yml",
    "Thumbs.db",
];

/// Logs left behind by a failed earlier install; removed, not reported.
const ERROR_LOG_PATTERNS: &[&str] = &["npm-debug.log", "yarn-error.log", "yarn-debug.log"];

fn is_error_log(file: &str) -> bool {
    ERROR_LOG_PATTERNS.iter().any(|p| file.starts_with(p))
}

fn is_allowed(file: &str) -> bool {
    VALID_FILES.contains(&file)
        // IntelliJ IDEA creates module files before the generator runs
        || file.ends_with(".iml")
        || is_error_log(file)
}

/// Entries of `dir` that would conflict with generated files, sorted.
/// A directory that does not exist has no conflicts.
pub fn find_conflicts(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut conflicts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if !is_allowed(&name) {
            conflicts.push(name);
        }
    }
    conflicts.sort();
    Ok(conflicts)
}

/// Check that `dir` is empty apart from allow-listed files.
///
/// On conflict the offending entries are printed and `false` is returned.
/// On success, stale npm/yarn error logs in `dir` are deleted.
pub fn is_safe_to_create(dir: &Path) -> Result<bool> {
    let conflicts = find_conflicts(dir)?;
    if !conflicts.is_empty() {
        println!(
            "The directory {} contains files that could conflict:",
            dir.display().green()
        );
        println!();
        for file in &conflicts {
            if dir.join(file).is_dir() {
                println!("  {}", format!("{file}/").blue());
            } else {
                println!("  {file}");
            }
        }
        println!();
        println!("Either try using a new directory name, or remove the files listed above.");
        return Ok(false);
    }

    if dir.exists() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if is_error_log(&entry.file_name().to_string_lossy()) {
                debug!("removing stale log {:?}", entry.path());
                if entry.file_type()?.is_dir() {
                    fs::remove_dir_all(entry.path())?;
                } else {
                    fs::remove_file(entry.path())?;
                }
            }
        }
    }
    Ok(true)
}

const BLACKLISTED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

const CORE_MODULES: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

/// Names that would collide with the dependencies a new React app installs.
pub const RESERVED_DEPENDENCIES: &[&str] = &["react", "react-dom", "react-scripts"];

const MAX_NAME_LENGTH: usize = 214;

/// Characters `encodeURIComponent` leaves alone.
fn is_url_safe(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.!~*'()".contains(c))
}

/// Problems that make `name` unusable as a new npm package name. Empty means
/// the name is fine.
pub fn package_name_problems(name: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if name.is_empty() {
        problems.push("name length must be greater than zero".to_string());
        return problems;
    }
    if name.starts_with('.') {
        problems.push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        problems.push("name cannot start with an underscore".to_string());
    }
    if name.trim() != name {
        problems.push("name cannot contain leading or trailing spaces".to_string());
    }
    let lower = name.to_lowercase();
    if BLACKLISTED_NAMES.contains(&lower.as_str()) {
        problems.push(format!("{lower} is a blacklisted name"));
    }
    if CORE_MODULES.contains(&lower.as_str()) {
        problems.push(format!("{lower} is a core module name"));
    }
    if name.len() > MAX_NAME_LENGTH {
        problems.push(format!(
            "name can no longer contain more than {MAX_NAME_LENGTH} characters"
        ));
    }
    if lower != name {
        problems.push("name can no longer contain capital letters".to_string());
    }
    let last_segment = name.rsplit('/').next().unwrap_or(name);
    if last_segment.contains(['~', '\'', '!', '(', ')', '*']) {
        problems.push("name can no longer contain special characters (\"~'!()*\")".to_string());
    }
    if !is_url_safe(name) {
        let scoped_ok = name
            .strip_prefix('@')
            .and_then(|rest| rest.split_once('/'))
            .is_some_and(|(scope, pkg)| {
                !scope.is_empty() && !pkg.is_empty() && is_url_safe(scope) && is_url_safe(pkg)
            });
        if !scoped_ok {
            problems.push("name can only contain URL-friendly characters".to_string());
        }
    }
    problems
}

/// Reject names npm would refuse, and names that shadow the app's own
/// dependencies.
pub fn validate_package_name(name: &str) -> Result<()> {
    let problems = package_name_problems(name);
    if !problems.is_empty() {
        let list: Vec<String> = problems.iter().map(|p| format!("  * {p}")).collect();
        return Err(Error::validation(format!(
            "Cannot create a project named \"{name}\" because of npm naming restrictions:\n\n{}\n\nPlease choose a different project name.",
            list.join("\n")
        )));
    }

    if RESERVED_DEPENDENCIES.contains(&name) {
        let list: Vec<String> = RESERVED_DEPENDENCIES.iter().map(|d| format!("  {d}")).collect();
        return Err(Error::validation(format!(
            "Cannot create a project named \"{name}\" because a dependency with the same name exists.\nDue to the way npm works, the following names are not allowed:\n\n{}\n\nPlease choose a different project name.",
            list.join("\n")
        )));
    }
    Ok(())
}
