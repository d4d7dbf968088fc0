//! filterctl - Filter Rule Tool for VoltageEMS
//!
//! Creates, validates and compiles filter rules from the command line.

mod commands;
mod input;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use voltage_filter::{FilterCompiler, FilterConfig};

use crate::commands::{CompileArgs, OutputFormat};

#[derive(Parser)]
#[command(name = "filterctl")]
#[command(about = "VoltageEMS filter rule tool")]
#[command(long_about = "VoltageEMS filter rule tool

Commands:
  compile     Compile the rules of a data source into a filter
  rules       Create default rules from an attribute list
  normalize   Validate a rule list and print it in canonical form

Examples:
  filterctl compile --source buildings.yaml --format text
  filterctl compile --source buildings.yaml --rules saved.json --inc-time
  filterctl rules --attributes attributes.yaml --custom
  filterctl normalize --rules saved.json

Input files may be YAML (.yaml, .yml) or JSON (.json).")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Compiler configuration file (.toml, .yaml, .json)
    #[arg(short = 'c', long = "config", global = true, env = "VOLTAGE_FILTER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the rules of a data source into a filter
    Compile {
        /// Data source file
        #[arg(short, long)]
        source: PathBuf,

        /// Rule list used instead of the data source's rules
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Add the data source's time range
        #[arg(long)]
        inc_time: bool,

        /// Add the data source's dimension filters
        #[arg(long)]
        inc_dimensions: bool,

        /// Coordinate system of spatial predicates
        #[arg(long)]
        srs_name: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Create default rules from an attribute list
    Rules {
        /// Attribute list file
        #[arg(short, long)]
        attributes: PathBuf,

        /// Create custom rules with operator choice
        #[arg(long)]
        custom: bool,
    },

    /// Validate a rule list and print it in canonical form
    Normalize {
        /// Rule list file
        #[arg(short, long)]
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Logs go to stderr so stdout stays machine-readable
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = FilterConfig::load(cli.config.as_deref())?;
    debug!("Filter configuration: {:?}", config);

    let output = match cli.command {
        Commands::Compile {
            source,
            rules,
            inc_time,
            inc_dimensions,
            srs_name,
            format,
        } => commands::compile(
            &FilterCompiler::new(config),
            CompileArgs {
                source: &source,
                rules: rules.as_deref(),
                inc_time,
                inc_dimensions,
                srs_name: srs_name.as_deref(),
                format,
            },
        )?,
        Commands::Rules { attributes, custom } => commands::rules(&attributes, custom)?,
        Commands::Normalize { rules } => commands::normalize(&rules)?,
    };

    println!("{}", output);
    Ok(())
}
