// src/ui.rs
//! Status lines for the user.

use owo_colors::OwoColorize;

pub fn info(message: &str) {
    println!("{message}");
}

pub fn success(message: &str) {
    println!("   {} {message}", "✓".green().bold());
}

pub fn warning(message: &str) {
    println!("{}", message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

/// `Error: <message>` in red, used by both binaries before exiting with 1.
pub fn fatal(err: &crate::error::Error) {
    eprintln!("{}", format!("Error: {err}").red());
}
