//! # DMDiag CLI
//!
//! Runs diagnostic collections over captured dump directories and renders
//! the canonical snapshot plus the issue summary.

mod sources;

use clap::{Parser, Subcommand};
use dmdiag_core::issues::{IssueSummary, Severity};
use dmdiag_core::pool::{self, PoolConfig};
use dmdiag_core::target::is_local_target;
use dmdiag_core::types::DiagnosticSnapshot;
use dmdiag_core::{CollectorConfig, DiagnosticCollector};
use sources::FileSources;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dmdiag", version, about = "Device-management diagnostic collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect a snapshot from one or more dump directories
    Collect {
        /// Dump directories (dsregcmd.txt, win32apps.json, ...)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target identity recorded on the snapshot
        #[arg(long, default_value = "")]
        target: String,

        /// Include User-context app fragments
        #[arg(long)]
        include_user_apps: bool,

        /// Emit the full snapshot as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Maximum concurrent collections when several inputs are given
        #[arg(long)]
        workers: Option<usize>,

        /// Wall-clock budget in seconds for the whole batch
        #[arg(long, default_value_t = 60)]
        batch_timeout: u64,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            2
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Collect {
            inputs,
            target,
            include_user_apps,
            json,
            workers,
            batch_timeout,
        } => {
            let snapshots = collect_all(
                &inputs,
                &target,
                include_user_apps,
                workers,
                Duration::from_secs(batch_timeout),
            )?;

            let mut worst = 0;
            for (input, snapshot) in &snapshots {
                match snapshot {
                    Some(snapshot) => {
                        if json {
                            println!("{}", serde_json::to_string_pretty(snapshot)?);
                        } else {
                            print!("{}", render_summary(snapshot));
                        }

                        let has_errors = snapshot
                            .issues
                            .iter()
                            .any(|i| i.severity == Severity::Error);
                        if has_errors {
                            worst = worst.max(1);
                        }
                    }
                    None => {
                        eprintln!(
                            "error: collection for {} did not complete in time",
                            input.display()
                        );
                        worst = worst.max(1);
                    }
                }
            }

            Ok(worst)
        }
    }
}

/// Run one collection per input, fanning out through the worker pool when
/// more than one dump directory was given.
fn collect_all(
    inputs: &[PathBuf],
    target: &str,
    include_user_apps: bool,
    workers: Option<usize>,
    batch_timeout: Duration,
) -> Result<Vec<(PathBuf, Option<DiagnosticSnapshot>)>, Box<dyn std::error::Error>> {
    let make_config = |input: &PathBuf| {
        if !sources::looks_like_dump_dir(input) {
            log::warn!("{} does not look like a dump directory", input.display());
        }
        let mut config = CollectorConfig::new(target);
        if include_user_apps {
            config = config.with_user_apps();
        }
        log::debug!("collecting from {}", input.display());
        config
    };

    if inputs.len() == 1 {
        let input = inputs[0].clone();
        let collector = DiagnosticCollector::new(make_config(&input))?;
        let snapshot = collector.collect(&FileSources::new(&input));
        return Ok(vec![(input, Some(snapshot))]);
    }

    let pool_config = PoolConfig {
        max_workers: workers.unwrap_or_else(|| num_cpus::get().min(8)),
        batch_timeout,
    };

    let ledger = dmdiag_core::issues::IssueLedger::new();
    let tasks: Vec<_> = inputs
        .iter()
        .map(|input| {
            let input = input.clone();
            let config = make_config(&input);
            move || {
                DiagnosticCollector::new(config)
                    .map(|collector| collector.collect(&FileSources::new(&input)))
            }
        })
        .collect();

    let results = pool::run_batch(tasks, &pool_config, &ledger);

    for issue in ledger.snapshot() {
        eprintln!("{}", issue);
    }

    let mut out = Vec::with_capacity(inputs.len());
    for (input, slot) in inputs.iter().zip(results) {
        let snapshot = match slot {
            Some(Ok(snapshot)) => Some(snapshot),
            Some(Err(e)) => return Err(e.into()),
            None => None,
        };
        out.push((input.clone(), snapshot));
    }

    Ok(out)
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "YES"
    } else {
        "NO"
    }
}

/// Human-readable run summary: the canonical facts first, then every
/// accumulated issue by severity and phase, then an explicit clean-run
/// line when nothing was recorded.
fn render_summary(snapshot: &DiagnosticSnapshot) -> String {
    let mut out = String::new();

    let locality = if is_local_target(&snapshot.target) {
        "local"
    } else {
        "remote"
    };
    let target = if snapshot.target.is_empty() {
        "(this host)"
    } else {
        snapshot.target.as_str()
    };
    out.push_str(&format!("Target: {} [{}]\n", target, locality));

    out.push_str(&format!(
        "Join state: AzureAdJoined={} DomainJoined={} WorkplaceJoined={}\n",
        yes_no(snapshot.join_state.azure_ad_joined),
        yes_no(snapshot.join_state.domain_joined),
        yes_no(snapshot.join_state.workplace_joined),
    ));

    if let Some(tenant) = &snapshot.join_state.tenant_name {
        out.push_str(&format!("Tenant: {}\n", tenant));
    }

    out.push_str(&format!("Classification: {}\n", snapshot.classification));

    if let Some(provider) = &snapshot.mdm_provider_id {
        out.push_str(&format!("MDM provider: {}\n", provider));
    }

    if !snapshot.apps.is_empty() {
        out.push_str(&format!("Apps ({}):\n", snapshot.app_count()));
        for record in snapshot.apps.values() {
            out.push_str(&format!(
                "  {} [{}] {}\n",
                record.app_id,
                record.context.as_str(),
                record.install_state
            ));
        }
    }

    if !snapshot.report.is_empty() {
        out.push_str(&format!(
            "Report: {} policies, {} certificates\n",
            snapshot.report.policies.len(),
            snapshot.report.certificates.len()
        ));
    }

    let summary = IssueSummary {
        errors: snapshot
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count(),
        warnings: snapshot
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count(),
    };

    if summary.is_clean() {
        out.push_str(&format!("{}\n", summary));
    } else {
        out.push_str(&format!("Issues ({}):\n", summary));
        for issue in &snapshot.issues {
            out.push_str(&format!("  {}\n", issue));
        }
    }

    out
}
