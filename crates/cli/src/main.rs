use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use stockres_cli::{DemandReport, Scenario, render};
use stockres_engine::{EngineConfig, FallbackPolicy};
use stockres_observability::LogFormat;

#[derive(Parser)]
#[command(name = "stockres")]
#[command(about = "Rule-driven stock reservation over scenario files")]
struct Args {
    /// Log output format (json or compact); logs go to stderr
    #[arg(long, global = true, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a scenario and validate its locations, products and rules
    Validate {
        /// Path to a .toml or .json scenario
        scenario: PathBuf,
    },
    /// Allocate the scenario's demands and print the results as JSON
    Allocate {
        /// Path to a .toml or .json scenario
        scenario: PathBuf,

        /// Only allocate the demand with this name
        #[arg(long)]
        demand: Option<String>,

        /// Override the fallback policy (last_declared or first_declared)
        #[arg(long)]
        fallback_policy: Option<FallbackPolicy>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    stockres_observability::init_with(args.log_format);

    match args.command {
        Command::Validate { scenario } => {
            let loaded = load(&scenario)?;
            println!(
                "{}: {} locations, {} rules, {} demands",
                scenario.display(),
                loaded.tree.len(),
                loaded.rules.len(),
                loaded.demands.len()
            );
        }
        Command::Allocate {
            scenario,
            demand,
            fallback_policy,
            pretty,
        } => {
            let mut loaded = load(&scenario)?;
            if std::env::var_os(EngineConfig::FALLBACK_POLICY_ENV).is_some() {
                loaded.config.fallback_policy = EngineConfig::from_env().fallback_policy;
            }
            if let Some(policy) = fallback_policy {
                loaded.config.fallback_policy = policy;
            }

            let selected: Vec<_> = match &demand {
                Some(name) => match loaded.demand(name) {
                    Some(named) => vec![named],
                    None => bail!("no demand named '{name}' in {}", scenario.display()),
                },
                None => loaded.demands.iter().collect(),
            };

            let allocator = loaded.allocator();
            let mut reports = Vec::with_capacity(selected.len());
            for named in selected {
                let result = allocator
                    .allocate(&named.demand)
                    .with_context(|| format!("allocating demand '{}'", named.name))?;
                reports.push(DemandReport::new(&loaded, &named.name, &result));
            }
            println!("{}", render(&reports, pretty)?);
        }
    }
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<Scenario> {
    Scenario::load(path).with_context(|| format!("loading scenario {}", path.display()))
}
