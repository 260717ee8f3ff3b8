//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ToolConfig;

/// uam - consolidate the device model database used for user-agent parsing.
///
/// Robot Mode: Use --robot or --format json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "uam", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "UAM_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (YAML or TOML)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Model store to load
    #[arg(long = "in", short = 'i', global = true, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Where to write the consolidated store
    #[arg(long = "out", short = 'o', global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Where to write the report
    #[arg(long, global = true, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Parser rules file for recognizing devices in raw user agents
    #[arg(long, short = 'r', global = true, value_name = "FILE")]
    pub regexes: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }

    /// Apply path flags on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut ToolConfig) {
        if let Some(path) = &self.input {
            config.models.clone_from(path);
        }
        if let Some(path) = &self.output {
            config.output.clone_from(path);
        }
        if let Some(path) = &self.csv {
            config.csv.clone_from(path);
        }
        if let Some(path) = &self.regexes {
            config.regexes = Some(path.clone());
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Store ===
    /// Resolve aliases, deduplicate by name, sort and save the store
    Clean,

    /// Add user agents or tab-separated rows, then clean
    Add(AddArgs),

    /// Write a tab-separated report of the store or of a user-agent list
    Report(ReportArgs),

    // === Lists ===
    /// Order a user-agent list, browsers first
    Sort(SortArgs),

    // === Configuration ===
    /// Show the effective configuration
    Config(ConfigArgs),

    // === Utilities ===
    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

/// Arguments for adding bulk input.
///
/// # Examples
///
/// ```bash
/// # One raw user agent per line
/// uam add useragents.txt --regexes regexes.yaml
///
/// # Edited report rows, with set/move/delete/replace in _command
/// uam add models.csv -i models.yaml -o models.yaml
/// ```
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// File of user agents or tab-separated rows
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Report on the devices recognized in this user-agent list instead of the store
    #[arg(long, short = 'u', value_name = "FILE")]
    pub useragents: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SortArgs {
    /// User-agent list, one per line
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Drop repeated user agents
    #[arg(long)]
    pub uniq: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show configuration file path
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
