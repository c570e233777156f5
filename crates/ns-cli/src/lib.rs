//! Nutrition tracker CLI library.
//!
//! This crate provides the CLI interface for the nutrition tracker.

mod cli;
pub mod commands;
mod config;
pub mod widget;

pub use cli::{Cli, Commands, ProfileAction};
pub use config::Config;
