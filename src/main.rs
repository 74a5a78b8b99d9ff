//! Stencil - mark fields in free text, save a template, fill it in.
//!
//! # Usage
//!
//! ```bash
//! stencil
//! stencil letter.txt
//! stencil --role filler template-letter.json
//! stencil --no-picker --export-dir ~/forms --save
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use stencil::app::App;
use stencil::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use stencil::session::Role;

/// A terminal template editor
#[derive(Parser, Debug)]
#[command(name = "stencil", version, about, long_about = None)]
struct Cli {
    /// Text file to import, or a .json template to load
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Start as the template author or the form filler
    #[arg(long, value_enum)]
    role: Option<Role>,

    /// Directory for exported text and saved templates
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Save straight into the export directory instead of asking for a path
    #[arg(long)]
    no_picker: bool,

    /// Write logs to a file (the terminal is busy with the UI)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Where log lines go. Without `--log-file` they are dropped; the alternate
/// screen owns the terminal while the app runs.
fn log_writer(log_file: Option<&Path>) -> Result<BoxMakeWriter> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(std::io::sink)),
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_writer(log_file)?)
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;
    tracing::debug!(?effective, "effective flags");

    if let Some(file) = &cli.file
        && !file.exists()
    {
        anyhow::bail!("File not found: {}", file.display());
    }

    let mut app = App::new()
        .with_role(effective.role.unwrap_or_default())
        .with_initial_file(cli.file)
        .with_export_dir(effective.export_dir.unwrap_or_else(|| PathBuf::from(".")))
        .with_picker(!effective.no_picker)
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    app.run().context("Application error")
}
