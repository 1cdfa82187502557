// src/scaffold/mod.rs
//! The `create-app` run: bootstrap a React app in a fresh directory with the
//! scripts and template packages installed through npm or yarn.

pub mod install;
pub mod manifest;
pub mod packages;

use owo_colors::OwoColorize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::npm::{self, coerce_version};
use crate::resolver::{is_safe_to_create, resolve_target, validate_package_name};
use crate::ui;
use install::PackageManager;
use packages::PackageInfo;

const MIN_NODE_MAJOR: u64 = 14;
const MIN_NPM_MAJOR: u64 = 6;
/// Last scripts release that still ran on old node and npm.
const LEGACY_SCRIPTS: &str = "react-scripts@0.9.x";
const TEMPLATES_MIN_VERSION: semver::Version = semver::Version::new(3, 3, 0);

/// How a run ended when nothing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    /// The user chose not to continue with a deprecated scripts package
    Declined,
}

/// Options for one `create-app` run.
#[derive(Debug, Clone, Default)]
pub struct CreateAppConfig {
    pub project_name: String,
    /// Where the tool was started; relative names and `file:` specifiers
    /// resolve against it
    pub original_dir: PathBuf,
    pub verbose: bool,
    pub template: Option<String>,
    pub scripts_version: Option<String>,
    pub use_npm: bool,
    /// Value of `npm_config_user_agent`
    pub user_agent: Option<String>,
}

pub fn run(config: &CreateAppConfig) -> Result<Outcome> {
    let root = resolve_target(&config.original_dir, &config.project_name)?;
    let app_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::validation(format!("Invalid project directory: {}", root.display())))?;

    validate_package_name(&app_name)?;
    fs::create_dir_all(&root)?;
    if !is_safe_to_create(&root)? {
        return Err(Error::validation(format!(
            "Refusing to create {app_name} in a directory with conflicting files"
        )));
    }

    println!();
    println!("Creating a new React app in {}.", root.display().green());
    println!();
    manifest::write_initial(&root, &app_name)?;

    match bootstrap(config, &root, &app_name) {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            rollback(&root, &app_name, &err)?;
            Err(err)
        }
    }
}

/// Everything after the initial manifest. Any failure in here is rolled back.
fn bootstrap(config: &CreateAppConfig, root: &Path, app_name: &str) -> Result<Outcome> {
    let manager = PackageManager::detect(config.user_agent.as_deref(), config.use_npm);
    debug!("using {manager:?}");

    let mut scripts_version = config.scripts_version.clone();
    if manager == PackageManager::Npm {
        npm::check_npm_can_read_cwd(root)?;
    }
    if !node_is_supported() {
        ui::warning(&format!(
            "You are using an unsupported Node version. Please update to Node {MIN_NODE_MAJOR} or higher for a better, fully supported experience.\n\n\
             Falling back to {LEGACY_SCRIPTS}, which supports older Node versions."
        ));
        scripts_version = Some(LEGACY_SCRIPTS.to_string());
    }
    if manager == PackageManager::Npm && !npm_is_supported() {
        ui::warning(&format!(
            "You are using an outdated npm version. Please update to npm {MIN_NPM_MAJOR} or higher for a better, fully supported experience.\n\n\
             Falling back to {LEGACY_SCRIPTS}."
        ));
        scripts_version = Some(LEGACY_SCRIPTS.to_string());
    }

    let scripts_spec = packages::install_package(scripts_version.as_deref(), &config.original_dir)?;
    let template_spec = packages::template_install_package(config.template.as_deref(), &config.original_dir)?;
    let scripts = packages::package_info(&scripts_spec)?;
    let template = packages::package_info(&template_spec)?;
    debug!("scripts {scripts:?}, template {template:?}");

    if scripts.name.starts_with("react-scripts-ts") && !confirm_deprecated_ts()? {
        return Ok(Outcome::Declined);
    }

    let is_online = install::check_if_online(manager);
    let supports_templates = supports_templates(scripts.version.as_deref());

    let mut dependencies = vec!["react".to_string(), "react-dom".to_string(), scripts_spec];
    if supports_templates {
        dependencies.push(template_spec);
        println!(
            "Installing packages. This might take a couple of minutes.\nInstalling {}, {}, {} and {}...",
            "react".cyan(),
            "react-dom".cyan(),
            scripts.name.cyan(),
            template.name.cyan()
        );
    } else {
        println!(
            "Installing packages. This might take a couple of minutes.\nInstalling {}, {} and {}...",
            "react".cyan(),
            "react-dom".cyan(),
            scripts.name.cyan()
        );
        ui::warning(&format!(
            "The --template option is not supported by {} {}; the default app template is used.",
            scripts.name,
            scripts.version.as_deref().unwrap_or("")
        ));
    }
    println!();

    install::install(manager, root, &dependencies, config.verbose, is_online)?;

    if let Some(node) = npm::node_version().as_deref().and_then(coerce_version) {
        manifest::check_node_version(root, &scripts.name, &node)?;
    }
    manifest::set_caret_range_for_runtime_deps(root, &scripts.name)?;
    execute_init_script(root, app_name, config, &scripts, &template.name)?;

    info!("created {app_name} in {:?}", root);
    Ok(Outcome::Created)
}

fn node_is_supported() -> bool {
    npm::node_version()
        .as_deref()
        .and_then(coerce_version)
        .is_some_and(|v| v.major >= MIN_NODE_MAJOR)
}

fn npm_is_supported() -> bool {
    npm::npm_version()
        .as_deref()
        .and_then(coerce_version)
        .is_some_and(|v| v.major >= MIN_NPM_MAJOR)
}

fn confirm_deprecated_ts() -> Result<bool> {
    println!(
        "{}",
        "The react-scripts-ts package is deprecated. TypeScript is now supported natively in Create React App. \
         You can use the --template typescript option instead when generating your app to include TypeScript support."
            .yellow()
    );
    let keep = dialoguer::Confirm::new()
        .with_prompt("Would you like to continue using react-scripts-ts?")
        .default(false)
        .interact()?;
    Ok(keep)
}

/// Scripts versions from 3.3.0 on install templates. A version that cannot
/// be read is assumed to be recent enough.
pub fn supports_templates(version: Option<&str>) -> bool {
    match version.and_then(|v| semver::Version::parse(v).ok()) {
        Some(v) => v >= TEMPLATES_MIN_VERSION,
        None => true,
    }
}

/// The JSON argument vector handed to the scripts package's `init.js`.
pub fn init_script_args(root: &Path, app_name: &str, verbose: bool, original_dir: &Path, template: &str) -> String {
    json!([
        root.display().to_string(),
        app_name,
        verbose,
        original_dir.display().to_string(),
        template
    ])
    .to_string()
}

fn execute_init_script(
    root: &Path,
    app_name: &str,
    config: &CreateAppConfig,
    scripts: &PackageInfo,
    template_name: &str,
) -> Result<()> {
    let source = format!(
        "const init = require('{}/scripts/init.js'); init.apply(null, JSON.parse(process.argv[1]));",
        scripts.name
    );
    let args = init_script_args(root, app_name, config.verbose, &config.original_dir, template_name);
    debug!("running {}/scripts/init.js with {args}", scripts.name);

    let status = Command::new("node")
        .args(["-e", &source, "--", &args])
        .current_dir(root)
        .status()?;
    if !status.success() {
        return Err(Error::Process {
            command: format!("node {}/scripts/init.js", scripts.name),
        });
    }
    Ok(())
}

const GENERATED: &[&str] = &[manifest::MANIFEST, "node_modules"];

/// Remove what this run generated. The target itself goes away only when
/// nothing else is left in it.
pub fn rollback(root: &Path, app_name: &str, err: &Error) -> Result<()> {
    println!();
    println!("Aborting installation.");
    if err.is_process() {
        println!("  {err}");
    } else {
        println!("{}", "Unexpected error. Please report it as a bug:".red());
        println!("{err}");
    }
    println!();

    for name in GENERATED {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        println!("Deleting generated file... {}", name.cyan());
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }

    if root.is_dir() && fs::read_dir(root)?.next().is_none() {
        let parent = root.parent().map(|p| p.display().to_string()).unwrap_or_default();
        println!(
            "Deleting {} from {}",
            format!("{app_name}/").cyan(),
            parent.cyan()
        );
        fs::remove_dir(root)?;
    }
    println!("Done.");
    Ok(())
}

fn version_or_missing(version: Option<String>) -> String {
    version.unwrap_or_else(|| "Not Found".to_string())
}

/// Environment report for `--info`.
pub fn env_info() -> String {
    format!(
        "  System:\n    OS: {}\n    CPU: {}\n  Binaries:\n    Node: {}\n    Yarn: {}\n    npm: {}\n",
        std::env::consts::OS,
        std::env::consts::ARCH,
        version_or_missing(npm::node_version()),
        version_or_missing(npm::yarn_version()),
        version_or_missing(npm::npm_version()),
    )
}
