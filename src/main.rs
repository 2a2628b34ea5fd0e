use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::future::try_join_all;
use kube::Client;
use tokio::task;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ccr::cluster::{self, KubeReportRepository, KubeResourceStore};
use ccr::config::{Config, OutputFormat};
use ccr::engine::ComplianceEngine;
use ccr::formatter::Formatter;
use ccr::spec::{self, Spec};

/// Aggregates cluster scan reports into per-control compliance reports
#[derive(Parser, Debug)]
#[command(name = "ccr", version)]
struct Args {
    /// Compliance spec file to evaluate, may be repeated
    #[arg(short, long = "spec", value_name = "FILE")]
    specs: Vec<PathBuf>,

    /// Skip the specs bundled with the binary
    #[arg(long)]
    no_bundled: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    output: OutputFormat,

    /// Evaluate without publishing the compliance reports
    #[arg(long)]
    dry_run: bool,

    /// Only display controls with failures
    #[arg(long)]
    failed_only: bool,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            spec_files: args.specs,
            bundled_specs: !args.no_bundled,
            output: args.output,
            dry_run: args.dry_run,
            failed_only: args.failed_only,
        }
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_specs(config: &Config) -> Result<Vec<Spec>> {
    let mut specs = if config.bundled_specs {
        spec::load_bundled_specs()?
    } else {
        Vec::new()
    };
    for path in config.spec_files.iter() {
        specs.push(spec::load_spec_file(path)?);
    }
    Ok(specs)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);
    let config: Config = args.into();

    let specs = load_specs(&config)?;
    if specs.is_empty() {
        bail!("no compliance spec to evaluate");
    }

    let client = Client::try_default()
        .await
        .context("Unable to create the kube client")?;
    match cluster::missing_report_kinds(&client).await {
        Ok(missing) => missing
            .iter()
            .for_each(|kind| warn!(%kind, "custom resource not served by the cluster")),
        Err(e) => warn!(error = %e, "unable to discover report custom resources"),
    }

    let engine = Arc::new(ComplianceEngine::new(
        Arc::new(KubeResourceStore::new(client.clone())),
        Arc::new(KubeReportRepository::new(client)),
    ));
    let now = chrono::Utc::now();
    let runs: Vec<_> = specs
        .into_iter()
        .map(|spec| {
            let engine = engine.clone();
            let dry_run = config.dry_run;
            task::spawn(async move {
                let result = if dry_run {
                    engine.evaluate(&spec, now).await
                } else {
                    engine.run(&spec, now).await
                };
                (spec.name, result)
            })
        })
        .collect();
    let outcomes = try_join_all(runs).await?;

    let total = outcomes.len();
    let mut failed = 0;
    for (name, outcome) in outcomes {
        match outcome {
            Ok(report) => println!("{}", Formatter::new(config.clone(), report)),
            Err(e) => {
                error!(spec = %name, error = %e, "compliance run failed");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} compliance specs failed", failed, total);
    }
    Ok(())
}
