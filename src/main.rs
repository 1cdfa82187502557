// src/main.rs

use clap::{CommandFactory, FromArgMatches, Parser};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

use h0_scaffold::inject::{self, InjectConfig};
use h0_scaffold::logger::init_logger;
use h0_scaffold::model::{CliVersion, TemplateName};
use h0_scaffold::ui;

const ISSUES_URL: &str = "https://github.com/44856/create-h0-template/issues/new";
const DEFAULT_TEMPLATE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "create-h0-template",
    about = "Inject a page template and its route into an H0 front-end project",
    ignore_errors = true,
    disable_version_flag = true
)]
struct InjectArgs {
    /// Page name, e.g. `orderList`
    #[arg(value_name = "app-name")]
    app_name: Option<String>,

    /// One of the supported templates (see below)
    #[arg(value_name = "template-name")]
    template_name: Option<String>,

    #[arg(long, value_name = "VERSION")]
    template_version: Option<String>,

    /// Which route file layout the project uses
    #[arg(short = 'c', long, value_enum, default_value_t = CliVersion::HzeroJs)]
    cli_version: CliVersion,

    /// Sub-module used in the templates' i18n keys
    #[arg(long, default_value = "aps")]
    sub_module: String,

    /// Directory holding the template sources
    #[arg(long, env = "H0_TEMPLATE_ROOT", value_name = "DIR")]
    template_root: Option<PathBuf>,

    /// Print debug diagnostics
    #[arg(long)]
    verbose: bool,

    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn after_help() -> String {
    format!(
        "Only {} are supported.\n\nIf you have any problems, do not hesitate to file an issue:\n  {}",
        TemplateName::supported_list().green(),
        ISSUES_URL.cyan()
    )
}

fn usage_hint(what: &str, example: &str) {
    eprintln!("Please specify the {}:", what.green());
    eprintln!(
        "  {} {} {}",
        "create-h0-template".cyan(),
        "<app-name> <template-name>".green(),
        "[options]".dimmed()
    );
    eprintln!();
    eprintln!("For example:");
    eprintln!("  {} {}", "create-h0-template".cyan(), example.green());
    eprintln!();
    eprintln!("Run {} to see all options.", "create-h0-template --help".cyan());
}

fn main() -> ExitCode {
    // 1) parse the command line; the help footer lists the templates
    let command = InjectArgs::command()
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(after_help());
    let args = InjectArgs::from_arg_matches(&command.get_matches()).unwrap_or_else(|e| e.exit());
    init_logger(args.verbose);

    // 2) both positionals are required
    let Some(app_name) = args.app_name.filter(|s| !s.is_empty()) else {
        usage_hint("page name", "orderList listPage");
        return ExitCode::FAILURE;
    };
    let Some(template_name) = args.template_name.filter(|s| !s.is_empty()) else {
        usage_hint("template name", &format!("{app_name} listPage"));
        return ExitCode::FAILURE;
    };
    let template = match template_name.parse::<TemplateName>() {
        Ok(t) => t,
        Err(message) => {
            ui::error(&format!("{message}, only {} are supported", TemplateName::supported_list()));
            return ExitCode::FAILURE;
        }
    };

    // 3) run against the current directory
    let root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            ui::fatal(&e.into());
            return ExitCode::FAILURE;
        }
    };
    let config = InjectConfig {
        root,
        app_name,
        template,
        template_version: args.template_version,
        cli_version: args.cli_version,
        sub_module: args.sub_module,
        template_root: args
            .template_root
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_ROOT)),
        check_npm: true,
    };

    match inject::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            ui::fatal(&err);
            ExitCode::FAILURE
        }
    }
}
