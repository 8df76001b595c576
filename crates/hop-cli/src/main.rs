//! hop - jump to frequently used directories

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use hop_config::{load_config, HopConfig};
use hop_core::{
    normalize_path, FrecencyIndex, PersistentStore, Query, ResolveOptions, Resolver,
};
use hop_telemetry::{init_file_subscriber, init_subscriber, TelemetryConfig};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

mod commands;
mod completion;
mod recorder;
mod shell;

use commands::{Cli, Mode};
use completion::{parse_tag, CompletionAdapter, Tagged};
use recorder::{detached_args, spawn_detached, VisitRecorder};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mode = cli.mode();

    if let Mode::Init(shell) = mode {
        print!("{}", shell::init_script(shell));
        return ExitCode::SUCCESS;
    }

    if mode.is_background() {
        run_background(&cli, mode).await;
        return ExitCode::SUCCESS;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(resolved) => with_cli_overrides(resolved.config, &cli),
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };
    init_subscriber(&telemetry_config(&config));

    let result = match mode {
        Mode::Jump(terms) => run_jump(&config, &terms),
        Mode::Stat => run_stat(&config),
        Mode::Purge => run_purge(&config),
        Mode::Adjust { step, increase } => run_adjust(&config, step, increase),
        Mode::Add { .. } | Mode::Complete { .. } | Mode::Init(_) => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Recording and completion: diagnostics go to the log file only and the
/// exit status is always success.
async fn run_background(cli: &Cli, mode: Mode) {
    let loaded = load_config(cli.config.as_deref());
    let config = match &loaded {
        Ok(resolved) => with_cli_overrides(resolved.config.clone(), cli),
        Err(_) => with_cli_overrides(HopConfig::default(), cli),
    };
    init_file_subscriber(&telemetry_config(&config), &config.log_file());

    if let Err(e) = loaded {
        warn!(error = %format!("{:#}", e), "config unusable, skipping");
        return;
    }

    let result = match mode {
        Mode::Add { path, detach } => run_add(cli, &config, path, detach).await,
        Mode::Complete { partial, indexed } => run_completion(&config, &partial, indexed),
        _ => Ok(()),
    };

    if let Err(e) = result {
        warn!(error = %format!("{:#}", e), "background command failed");
    }
}

fn with_cli_overrides(mut config: HopConfig, cli: &Cli) -> HopConfig {
    if let Some(data_file) = &cli.data_file {
        config.data_file = Some(data_file.clone());
    }
    config
}

fn telemetry_config(config: &HopConfig) -> TelemetryConfig {
    TelemetryConfig {
        level: config.log_level.clone(),
        json_output: config.log_json,
    }
}

fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
}

fn load_index(config: &HopConfig) -> Result<FrecencyIndex> {
    let store = PersistentStore::new(config.data_file());
    let records = store
        .load_or_recover()
        .with_context(|| format!("Failed to read store: {}", store.path().display()))?;
    Ok(FrecencyIndex::from_records(records, config.weights))
}

async fn run_add(cli: &Cli, config: &HopConfig, path: PathBuf, detach: bool) -> Result<()> {
    let cwd = current_dir();

    if detach {
        let normalized = normalize_path(&path, &cwd)?;
        let exe = env::current_exe().context("Failed to locate the hop executable")?;
        let args = detached_args(&normalized, cli.config.as_deref(), cli.data_file.as_deref());
        spawn_detached(&exe, &args).context("Failed to spawn detached recorder")?;
        return Ok(());
    }

    let recorder = VisitRecorder::new(
        PersistentStore::new(config.data_file()),
        config.weights,
        config.path_filter()?,
    );
    recorder.dispatch(path, cwd).await?;
    Ok(())
}

fn run_completion(config: &HopConfig, partial: &str, indexed: bool) -> Result<()> {
    let index = load_index(config)?;
    let resolver = Resolver::new(
        &index,
        ResolveOptions {
            exclude: None,
            skip_missing: config.skip_missing,
        },
    );
    let case = config.matching.case;

    // A selected tag completes to its bare path.
    let output = match parse_tag(partial) {
        Tagged::Path(path) => CompletionAdapter::new(false).render(partial, &[path.to_string()]),
        Tagged::Nth { query, n } => {
            let selected: Vec<String> = resolver
                .resolve_nth(&Query::parse(query, case), n)
                .into_iter()
                .collect();
            CompletionAdapter::new(false).render(partial, &selected)
        }
        Tagged::Plain(query) => {
            let ranked =
                resolver.resolve_ranked(&Query::parse(query, case), config.completion_limit);
            CompletionAdapter::new(indexed).render(partial, &ranked)
        }
    };

    print!("{}", output);
    Ok(())
}

fn run_jump(config: &HopConfig, terms: &[String]) -> Result<()> {
    if terms.iter().all(|t| t.trim().is_empty()) {
        bail!("missing directory query (see `hop --help`)");
    }

    let index = load_index(config)?;
    let cwd = current_dir();
    let resolver = Resolver::new(
        &index,
        ResolveOptions {
            exclude: normalize_path(&cwd, Path::new("/")).ok(),
            skip_missing: config.skip_missing,
        },
    );
    let case = config.matching.case;

    let joined = terms.join(" ");
    let target = match parse_tag(&joined) {
        Tagged::Path(path) => path.to_string(),
        Tagged::Nth { query, n } => resolver.resolve_nth(&Query::parse(query, case), n)?,
        Tagged::Plain(_) => resolver.resolve(&Query::new(terms, case))?,
    };

    println!("{}", target);
    Ok(())
}

fn run_stat(config: &HopConfig) -> Result<()> {
    let index = load_index(config)?;
    let mut ranked = index.ranked();
    ranked.reverse();

    for candidate in &ranked {
        println!(
            "{}:\t{}",
            format!("{:.1}", candidate.score).yellow(),
            candidate.path
        );
    }

    println!("{}", "_".repeat(40).dimmed());
    println!();
    println!("{:.1}:\t total weight", index.total_weight());
    println!("{}:\t number of entries", index.len());
    println!("data:\t {}", config.data_file().display());
    Ok(())
}

fn run_purge(config: &HopConfig) -> Result<()> {
    let store = PersistentStore::new(config.data_file());
    let purged = store
        .purge_missing(config.weights)
        .with_context(|| format!("Failed to purge store: {}", store.path().display()))?;

    println!(
        "{} {} {}",
        "Purged".cyan().bold(),
        purged,
        if purged == 1 { "entry" } else { "entries" }
    );
    Ok(())
}

fn run_adjust(config: &HopConfig, step: Option<f64>, increase: bool) -> Result<()> {
    let cwd = current_dir();
    let path = normalize_path(&cwd, &cwd)?;
    let step = step.unwrap_or(config.weights.adjust_step).abs();
    let delta = if increase { step } else { -step };

    let store = PersistentStore::new(config.data_file());
    let weight = store
        .update(config.weights, |index| index.adjust(&path, delta, Utc::now()))
        .with_context(|| format!("Failed to update store: {}", store.path().display()))?;

    println!(
        "{}:\t{}",
        format!("{:.1}", weight.unwrap_or_default()).yellow(),
        path
    );
    Ok(())
}
