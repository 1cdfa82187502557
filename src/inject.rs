// src/inject.rs
//! The `create-h0-template` run: register a route and drop a page template
//! into an existing H0 front-end project.

use owo_colors::OwoColorize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{lower_first, CliVersion, InjectFile, RouteEntry, TemplateName};
use crate::resolver::{is_safe_to_create, resolve_target, validate_page_name};
use crate::splice::inject_route;
use crate::templates::{h0_placeholders, TemplateStore};
use crate::{npm, ui};

/// Pages live here, relative to the project root.
pub const PAGE_DIR: &str = "src/pages";
/// Every generated route is registered under this prefix.
pub const ROUTE_PREFIX: &str = "/aps";

/// Everything one injection needs, resolved from the command line once.
#[derive(Debug, Clone)]
pub struct InjectConfig {
    /// Project root (the directory the tool was started in)
    pub root: PathBuf,
    pub app_name: String,
    pub template: TemplateName,
    pub template_version: Option<String>,
    pub cli_version: CliVersion,
    pub sub_module: String,
    pub template_root: PathBuf,
    /// Run `npm config list` to make sure npm sees the same cwd
    pub check_npm: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectOutcome {
    pub page_dir: PathBuf,
    /// The route file that was rewritten, if a route was registered
    pub route_file: Option<PathBuf>,
}

pub fn run(config: &InjectConfig) -> Result<InjectOutcome> {
    // 0) the name ends up in a directory path and in the route file
    validate_page_name(&config.app_name)?;
    let name = config.template.page_name(&config.app_name);
    debug!(
        "injecting {} as {:?} (template version {:?}, {:?})",
        config.template, name, config.template_version, config.cli_version
    );

    // 1) the template must exist before anything is touched
    let store = TemplateStore::new(&config.template_root);
    let template = store.descriptor(
        config.template.as_str(),
        h0_placeholders(&config.sub_module, &lower_first(&name)),
    )?;

    // 2) the project has to look like an H0 project
    if !config.root.join(PAGE_DIR).is_dir() {
        return Err(Error::validation(format!(
            "The directory structure is not right! Expected {PAGE_DIR} under {}",
            config.root.display()
        )));
    }
    let page_dir = resolve_target(&config.root, &format!("{PAGE_DIR}/{name}"))?;
    if !is_safe_to_create(&page_dir)? {
        return Err(Error::validation(format!(
            "Refusing to inject into {}",
            page_dir.display()
        )));
    }

    // 3) regenerate the route file in memory; parse failures abort here
    let route_update = plan_route_update(config, &name)?;

    ui::info(&format!("\nInject code in {}.\n", page_dir.display().green()));
    if config.check_npm {
        npm::check_npm_can_read_cwd(&config.root)?;
    }

    // 4) copy the template, then write the route file
    store.copy_template(&template, &page_dir)?;
    if let Some(file) = &route_update {
        fs::write(&file.path, &file.code)?;
        info!("registered {ROUTE_PREFIX}/{name} in {:?}", file.path);
    }

    ui::success("Finish");
    Ok(InjectOutcome {
        page_dir,
        route_file: route_update.map(|f| f.path),
    })
}

/// Build the regenerated route file for `name`, or `None` when there is no
/// route file or it has no recognizable route table.
fn plan_route_update(config: &InjectConfig, name: &str) -> Result<Option<InjectFile>> {
    let route_file = config.root.join(config.cli_version.route_file());
    if !route_file.is_file() {
        ui::error(&format!(
            "The route file lost! ({} not found, the route is not registered)",
            config.cli_version.route_file()
        ));
        return Ok(None);
    }

    let entry = RouteEntry::for_page(ROUTE_PREFIX, name);
    let shape = config.cli_version.route_shape();
    let key = config.cli_version.route_key();

    match inject_route(&route_file, shape, key, &entry)? {
        Some(code) => Ok(Some(InjectFile {
            path: route_file,
            code,
        })),
        None => {
            ui::warning(&format!(
                "No `{key}` route table found in {}, the route is not registered.",
                route_file.display()
            ));
            Ok(None)
        }
    }
}
