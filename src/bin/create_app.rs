// src/bin/create_app.rs

use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;

use h0_scaffold::logger::init_logger;
use h0_scaffold::scaffold::{self, CreateAppConfig};
use h0_scaffold::ui;

const ISSUES_URL: &str = "https://gitee.com/tyttyty/create-template/issues/new";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "create-app",
    version,
    about = "Bootstrap a new React app",
    ignore_errors = true,
    disable_version_flag = true,
    after_help = format!(
        "Only {} is required.\n\nIf you have any problems, do not hesitate to file an issue:\n  {}",
        "<project-directory>".green(),
        ISSUES_URL.cyan()
    )
)]
struct CreateAppArgs {
    #[arg(value_name = "project-directory")]
    project_directory: Option<String>,

    /// Print additional logs
    #[arg(long)]
    verbose: bool,

    /// Print environment debug info
    #[arg(long)]
    info: bool,

    /// Template for the created project
    #[arg(long, value_name = "path-to-template")]
    template: Option<String>,

    /// Use a non-standard version of react-scripts
    #[arg(long, value_name = "alternative-package")]
    scripts_version: Option<String>,

    #[arg(long)]
    use_npm: bool,

    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> ExitCode {
    let args = CreateAppArgs::parse();
    init_logger(args.verbose);

    if args.info {
        println!("{}", "\nEnvironment Info:".bold());
        println!("\n  current version of {}: {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        println!("  running from {}", std::env::current_exe().map(|p| p.display().to_string()).unwrap_or_default());
        print!("{}", scaffold::env_info());
        return ExitCode::SUCCESS;
    }

    let Some(project_name) = args.project_directory.filter(|s| !s.is_empty()) else {
        eprintln!("Please specify the project directory:");
        eprintln!("  {} {}", "create-app".cyan(), "<project-directory>".green());
        eprintln!();
        eprintln!("For example:");
        eprintln!("  {} {}", "create-app".cyan(), "my-react-app".green());
        eprintln!();
        eprintln!("Run {} to see all options.", "create-app --help".cyan());
        return ExitCode::FAILURE;
    };

    let original_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            ui::fatal(&e.into());
            return ExitCode::FAILURE;
        }
    };
    let config = CreateAppConfig {
        project_name,
        original_dir,
        verbose: args.verbose,
        template: args.template,
        scripts_version: args.scripts_version,
        use_npm: args.use_npm,
        user_agent: std::env::var("npm_config_user_agent").ok(),
    };

    match scaffold::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            ui::fatal(&err);
            ExitCode::FAILURE
        }
    }
}
