//! batchbench: batched-insert load harness.
//!
//! Runs the configured number of insert operations across worker threads
//! against the in-memory reference store and prints the final report.
//! Settings come from defaults, an optional `--config` TOML file, then
//! flags.

mod commands;
mod config;

use std::path::Path;
use std::process;
use std::sync::Arc;

use batchbench_core::TransactionalStore;
use batchbench_harness::{run, MemStore, RowTemplate, RunConfig};
use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use config::Settings;

fn main() {
    let matches = build_cli().get_matches();

    // Logs go to stderr so a piped report stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match resolve_settings(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    let store = match MemStore::new(&settings.table).with_abort_rate(settings.abort_rate) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let run_config = RunConfig {
        threads: settings.threads,
        ops: settings.ops,
        batch_size: settings.batch_size,
        starting_key: settings.starting_key,
        template: RowTemplate {
            key_prefix: settings.key_prefix.clone(),
            ..RowTemplate::default()
        },
    };

    let report = match run(Arc::new(store) as Arc<dyn TransactionalStore>, &run_config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("failed to serialize report: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", report);
    }
}

/// Defaults → config file → flags.
fn resolve_settings(matches: &ArgMatches) -> anyhow::Result<Settings> {
    let mut settings = match matches.get_one::<String>("config") {
        Some(path) => Settings::from_file(Path::new(path))?,
        None => Settings::default(),
    };
    settings.apply_matches(matches);
    Ok(settings)
}
