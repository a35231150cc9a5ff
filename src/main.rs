use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod collect;
mod config;
mod diagnostics;
mod output;
mod pipeline;
mod schema;
mod stats;
mod tree;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "schema-filter")]
#[command(about = "Build module/sub-module filter specs from package schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a filter spec for each schema (stops at the first failure).
    Build {
        /// Schema files. Defaults to ./kube.json and ./azure-native.json.
        schemas: Vec<PathBuf>,

        /// JSON config listing inputs; replaces positional schemas.
        #[arg(long, conflicts_with = "schemas")]
        config: Option<PathBuf>,

        /// Appended to the schema file stem to name the output. A config file's
        /// own suffix takes precedence.
        #[arg(long, default_value = config::DEFAULT_SUFFIX, allow_hyphen_values = true)]
        suffix: String,

        /// Output path (single schema only).
        #[arg(short = 'o', long, conflicts_with_all = ["config", "stdout"])]
        out: Option<PathBuf>,

        /// Print filter specs to stdout instead of writing files.
        #[arg(long)]
        stdout: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Build {
            schemas,
            config: config_path,
            suffix,
            out,
            stdout,
        } => {
            // 1) Resolve the explicit input list.
            let mut run_config = match config_path {
                Some(path) => config::ConfigSpec::load(&path)?.validate_and_build(&suffix)?,
                None if schemas.is_empty() => {
                    let defaults: Vec<PathBuf> =
                        config::DEFAULT_SCHEMAS.into_iter().map(PathBuf::from).collect();
                    config::RunConfig::from_paths(&defaults, &suffix)?
                }
                None => config::RunConfig::from_paths(&schemas, &suffix)?,
            };

            if let Some(out) = out {
                let [input] = run_config.inputs.as_mut_slice() else {
                    anyhow::bail!(
                        "{}",
                        diagnostics::error_message("--out requires exactly one schema")
                    );
                };
                input.output = out;
            }

            // 2) Process inputs in order.
            let sink = if stdout {
                pipeline::Sink::Stdout
            } else {
                pipeline::Sink::Files
            };
            let reports = pipeline::run(&run_config, sink)?;

            for report in &reports {
                tracing::debug!(
                    schema = %report.schema.display(),
                    nodes = report.stats.total(),
                    "filter spec ready"
                );
            }
            let total: usize = reports.iter().map(|r| r.stats.total()).sum();
            let written = reports.iter().filter(|r| r.output.is_some()).count();
            tracing::info!(
                schemas = reports.len(),
                written,
                nodes = total,
                "done"
            );
        }
    }

    Ok(())
}
