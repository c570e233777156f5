use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ns_cli::commands::{add, edit, log, lookup, meal, profile, today};
use ns_cli::{Cli, Commands, Config, ProfileAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ns_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ns_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout stays parseable with --json
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Add(args) => add::run(&mut out, &mut db, args)?,
        Commands::Edit(args) => edit::run(&mut out, &mut db, args)?,
        Commands::Delete { id } => edit::delete(&mut out, &mut db, *id)?,
        Commands::Log { json } => log::run(&mut out, &db, config.label_locale, *json)?,
        Commands::Today { json } => today::run(&mut out, &db, &config.widget_path, *json)?,
        Commands::Meal { category } => meal::run(&mut out, &db, *category)?,
        Commands::Profile { action } => match action {
            ProfileAction::Show { json } => profile::show(&mut out, &db, *json)?,
            ProfileAction::Set(args) => profile::set(&mut out, &mut db, args)?,
        },
        Commands::Goal => profile::goal(&mut out, &db)?,
        Commands::Remind => profile::remind(&mut out, &db)?,
        Commands::Scan(args) => lookup::scan(&mut out, &mut db, &config, args)?,
        Commands::Search(args) => lookup::search(&mut out, &mut db, &config, args)?,
        Commands::Analyze(args) => lookup::analyze(&mut out, &mut db, &config, args)?,
    }

    Ok(())
}
