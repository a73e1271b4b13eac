mod cli;

use hclsec::context::EvaluationContext;
use hclsec::modules::ModuleTree;
use hclsec::scanner::{ScanOptions, Scanner};
use hclsec::value::Literal;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLSEC_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(2);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(2);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Scan(scan_cli) => scan(scan_cli),
        cli::Command::Rules(rules_cli) => rules(rules_cli),
        cli::Command::Evaluate(evaluate_cli) => evaluate(evaluate_cli).map(|()| true),
        cli::Command::Dev(dev_cli) => dev(dev_cli).map(|()| true),
    };

    match command_result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            for error in e.chain() {
                eprintln!("{error}")
            }
            std::process::exit(2);
        }
    }
}

/// Returns `false` when there are findings or faults
pub fn scan(cli: cli::ScanCommand) -> anyhow::Result<bool> {
    let registry = hclsec::rules::registry()?.install()?;

    let tree = load(&cli.input)?;
    let context = EvaluationContext::with_inputs(&tree, inputs(&cli.input)?)?;

    let options = ScanOptions {
        parallelism: cli.jobs,
        excluded_rules: cli.exclude,
        minimum_severity: cli.minimum_severity,
    };
    let report = Scanner::new(registry).with_options(options).scan(&context)?;

    for fault in &report.faults {
        eprintln!("{fault}");
    }

    output(&cli.output, &report)?;
    Ok(report.findings.is_empty() && report.faults.is_empty())
}

pub fn rules(cli: cli::RulesCommand) -> anyhow::Result<bool> {
    let registry = hclsec::rules::registry()?;

    output(&cli.output, &registry.rules())?;
    Ok(true)
}

pub fn evaluate(cli: cli::EvaluateCommand) -> anyhow::Result<()> {
    let tree = load(&cli.input)?;
    let context = EvaluationContext::with_inputs(&tree, inputs(&cli.input)?)?;

    let expr: hcl_edit::expr::Expression = cli.expression.parse()?;
    let value = context.evaluate_in_context(&expr.into());

    output(&cli.output, &value)?;
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<ModuleTree> {
    let directory = match &input.directory {
        Some(directory) => directory.clone(),
        None => std::env::current_dir()?,
    };

    let tree = ModuleTree::load(&directory)?;
    anyhow::ensure!(tree.root().documents.source_count() > 0, "No files loaded");

    Ok(tree)
}

/// `--var-file`s in order, then `--var`s
fn inputs(input: &cli::InputArgs) -> anyhow::Result<indexmap::IndexMap<String, Literal>> {
    let mut inputs = indexmap::IndexMap::new();

    for file_path in &input.variable_files {
        inputs.extend(hclsec::hcl_documents::load_variable_file(file_path)?);
    }

    for (name, value) in &input.variables {
        inputs.insert(name.clone(), Literal::String(value.clone()));
    }

    Ok(inputs)
}

fn output<T: serde::Serialize>(output: &cli::OutputArgs, value: &T) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (hclsec-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let tree = load(&cli.input)?;

    match cli.command {
        Documents => println!("{tree:#?}"),
        Context => {
            let context = EvaluationContext::with_inputs(&tree, inputs(&cli.input)?)?;
            println!("{context:#?}")
        }
    }

    Ok(())
}
