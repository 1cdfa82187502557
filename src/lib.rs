// src/lib.rs
//! Scaffolding for H0 front-end projects.
//!
//! Two binaries share this library:
//! - `create-h0-template` copies a page template into an existing project and
//!   registers its route in the project's route table (see [`inject`])
//! - `create-app` bootstraps a new React app through npm or yarn (see
//!   [`scaffold`])

pub mod error;
pub mod inject;
pub mod logger;
pub mod model;
pub mod npm;
pub mod parser;
pub mod resolver;
pub mod scaffold;
pub mod splice;
pub mod synth;
pub mod templates;
pub mod ui;

pub use error::{Error, Result};
