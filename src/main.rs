//! uam - device model database consolidation CLI.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};

use clap::Parser;
use console::style;
use serde::Serialize;

use uam::cli::{self, Cli, Commands};
use uam::config::{self, ToolConfig};
use uam::error::{ModelsError, Result};
use uam::import::ImportOptions;
use uam::logging::init_logging;
use uam::session::{self, RunSummary};
use uam::ualist;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }
    if cli.no_color || !io::stderr().is_terminal() {
        console::set_colors_enabled_stderr(false);
    }
    init_logging(cli.use_json(), cli.verbose, cli.quiet, !cli.no_color);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::Clean) => cmd_clean(cli),
        Some(Commands::Add(args)) => cmd_add(cli, args),
        Some(Commands::Report(args)) => cmd_report(cli, args),
        Some(Commands::Sort(args)) => cmd_sort(cli, args),
        Some(Commands::Config(args)) => cmd_config(cli, args),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(cli, args),
    }
}

fn effective_config(cli: &Cli) -> Result<ToolConfig> {
    let mut config = config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

// === Quick Start (Robot Mode Optimized) ===

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(
            cli,
            &RobotQuickStart {
                tool: "uam",
                version: build_info::VERSION,
                description: "Consolidates brand/model device databases for user-agent parsing",
                commands: RobotCommands {
                    clean: "uam clean -i models.yaml -o models.yaml",
                    add: "uam add <FILE> --regexes regexes.yaml",
                    report: "uam report [--useragents FILE] --csv models.csv",
                    sort: "uam sort <FILE> [--uniq] [-o OUT]",
                    config: "uam config",
                },
                output_modes: OutputModes {
                    human: "--format=text (default)",
                    robot: "--robot or --format=json",
                    compact: "--format=json-compact",
                },
            },
        );
    } else {
        println!(
            "{} {} - device model consolidation\n",
            style("uam").bold().cyan(),
            build_info::VERSION
        );
        println!("{}", style("QUICK START").bold().underlined());
        println!();
        println!("  {}  Resolve, dedup and sort the store", style("uam clean").green());
        println!("  {}  Add user agents or rows", style("uam add new.txt").green());
        println!("  {}  Write the TSV report", style("uam report").green());
        println!("  {}  Order a user-agent list", style("uam sort uas.txt").green());
        println!("  {}  Show effective config", style("uam config").green());
        println!();
        println!("{}", style("ROBOT MODE").bold().underlined());
        println!();
        println!("  {}  JSON output", style("uam --robot <command>").cyan());
        println!();
        println!("Run {} for full help", style("uam --help").yellow());
    }
    Ok(())
}

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    commands: RobotCommands,
    output_modes: OutputModes,
}

#[derive(Serialize)]
struct RobotCommands {
    clean: &'static str,
    add: &'static str,
    report: &'static str,
    sort: &'static str,
    config: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

// === Store Commands ===

fn cmd_clean(cli: &Cli) -> Result<()> {
    let config = effective_config(cli)?;
    let summary = session::run_clean(&config)?;
    print_summary(cli, &summary);
    Ok(())
}

fn cmd_add(cli: &Cli, args: &cli::AddArgs) -> Result<()> {
    let config = effective_config(cli)?;
    let options = ImportOptions {
        progress: !args.no_progress && !cli.quiet && !cli.use_json() && io::stderr().is_terminal(),
    };
    let summary = session::run_add(&config, &args.file, options)?;
    print_summary(cli, &summary);
    Ok(())
}

fn cmd_report(cli: &Cli, args: &cli::ReportArgs) -> Result<()> {
    let config = effective_config(cli)?;
    let rows = session::run_report(&config, args.useragents.as_deref())?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "csv": config.csv,
                "rows": rows,
                "ok": true
            }),
        );
    } else if !cli.quiet {
        println!("Wrote {rows} rows to {}", config.csv.display());
    }
    Ok(())
}

fn cmd_sort(cli: &Cli, args: &cli::SortArgs) -> Result<()> {
    let Some(output) = &cli.output else {
        let lines = ualist::read_list(&args.file)?;
        let (sorted, _) = ualist::sort_user_agents(&lines, args.uniq);
        print!("{}", ualist::render_list(&sorted));
        return Ok(());
    };

    let summary = ualist::sort_file(&args.file, output, args.uniq)?;
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "output": output,
                "summary": summary,
                "ok": true
            }),
        );
    } else if !cli.quiet {
        println!(
            "Wrote {} user agents to {} ({} duplicates dropped)",
            summary.written,
            output.display(),
            summary.duplicates
        );
    }
    Ok(())
}

fn print_summary(cli: &Cli, summary: &RunSummary) {
    if cli.use_json() {
        output_json(cli, summary);
        return;
    }
    if cli.quiet {
        return;
    }

    println!(
        "{} {} models ({} brands) to {}",
        style("Saved").green().bold(),
        summary.models,
        summary.brands,
        summary.output.display()
    );
    if let Some(import) = &summary.import {
        println!(
            "  read {}: added {}, duplicates {}, rejected {}",
            import.entries, import.added, import.duplicates, import.rejected
        );
        if import.commands > 0 {
            println!(
                "  commands {}: removed {}, skipped directives {}",
                import.commands, import.removed, import.skipped_directives
            );
        }
    }
    let consolidation = &summary.consolidation;
    println!(
        "  aliased {}, dangling {}",
        consolidation.dedup.aliased, consolidation.dangling
    );
    for diag in &consolidation.dedup.diagnostics {
        for m in &diag.mismatches {
            println!(
                "  {} {} differs for \"{}\" \"{}\" ({} !== {})",
                style("!").yellow().bold(),
                m.field,
                diag.brand,
                diag.model,
                m.expected,
                m.found
            );
        }
    }
}

// === Configuration ===

fn cmd_config(cli: &Cli, args: &cli::ConfigArgs) -> Result<()> {
    let config = effective_config(cli)?;

    if args.path {
        let candidates = config::default_config_paths();
        if cli.use_json() {
            output_json(
                cli,
                &serde_json::json!({
                    "source": config.source,
                    "search": candidates,
                }),
            );
        } else {
            match &config.source {
                Some(path) => println!("{}", path.display()),
                None => {
                    println!("(no config file; using defaults)");
                    for candidate in &candidates {
                        println!("  searched: {}", candidate.display());
                    }
                }
            }
        }
        return Ok(());
    }

    if cli.use_json() {
        output_json(cli, &config);
    } else {
        let text = serde_yaml::to_string(&config)
            .map_err(|e| ModelsError::Other(format!("Failed to render config: {e}")))?;
        print!("{text}");
    }
    Ok(())
}

// === Utilities ===

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "version": build_info::VERSION,
                "git_sha": build_info::git_sha(),
                "git_dirty": build_info::git_dirty() == "true",
                "build_timestamp": build_info::build_timestamp(),
                "rustc_version": build_info::rustc_semver(),
                "target": build_info::target(),
            }),
        );
    } else {
        println!("uam {}", build_info::VERSION);
        println!(
            "git: {}{}",
            build_info::git_sha(),
            if build_info::git_dirty() == "true" {
                " (dirty)"
            } else {
                ""
            }
        );
        println!("built: {}", build_info::build_timestamp());
        println!("rustc: {}", build_info::rustc_semver());
        println!("target: {}", build_info::target());
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(_cli: &Cli, args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "uam", &mut io::stdout());
    Ok(())
}

fn output_json<T: Serialize>(cli: &Cli, data: &T) {
    let json = if cli.use_compact_json() {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{}: {e}", style("Error").red().bold()),
    }
}

fn output_error(cli: &Cli, error: &ModelsError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}: {}", style("Error").red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", style("Hint").yellow(), suggestion);
        }
    }
}
