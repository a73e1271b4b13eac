//! hclsec cli interface

use clap::{Parser, Subcommand, ValueEnum};
use hclsec::rule::Severity;
use std::fmt::Formatter;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; hclsec ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a configuration for security issues
    ///
    /// Exits with status 1 when anything was found
    Scan(ScanCommand),

    /// List all built-in rules
    Rules(RulesCommand),

    /// Evaluate an hcl expression in the root module
    #[command(alias = "eval")]
    Evaluate(EvaluateCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct ScanCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Number of worker threads (defaults to available parallelism)
    #[clap(short = 'j', long = "jobs")]
    pub jobs: Option<NonZeroUsize>,

    /// Skip a rule, by id or short code
    #[clap(long = "exclude")]
    pub exclude: Vec<String>,

    /// Only report findings of at least this severity
    #[clap(long = "minimum-severity")]
    pub minimum_severity: Option<Severity>,
}

#[derive(Parser, Debug)]
pub struct RulesCommand {
    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct EvaluateCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// HCL expression to evaluate
    pub expression: String,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Root module directory (defaults to the work directory)
    #[clap(short = 'd', long = "dir")]
    pub directory: Option<PathBuf>,

    /// Set a root module variable (string value)
    #[clap(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,

    /// Load root module variables from a .tfvars file
    #[clap(long = "var-file")]
    pub variable_files: Vec<PathBuf>,
}

fn parse_variable(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{input}'")),
    }
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Loaded modules and their documents
    Documents,
    /// The evaluation context built from them
    Context,
}
