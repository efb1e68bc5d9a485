//! Load configuration
//!
//! A flat settings struct with the same surface as the CLI flags. Values
//! come from defaults, then an optional TOML file, then the flags; last
//! writer wins.
//!
//! # Example file
//!
//! ```toml
//! threads = 8
//! ops = 100000
//! batch_size = 32
//! starting_key = 0
//! table = "usertable"
//! key_prefix = "user"
//! abort_rate = 0.05
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

/// Resolved harness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Number of worker threads.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Total operations across all workers.
    #[serde(default = "default_ops")]
    pub ops: u64,
    /// Rows buffered per transaction before an implicit flush.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Seed for the shared key sequence.
    #[serde(default)]
    pub starting_key: u64,
    /// Target table name.
    #[serde(default = "default_table")]
    pub table: String,
    /// Primary-key prefix.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Injected commit-abort probability for the in-memory store.
    #[serde(default)]
    pub abort_rate: f64,
}

fn default_threads() -> usize {
    1
}

fn default_ops() -> u64 {
    1
}

fn default_batch_size() -> usize {
    1
}

fn default_table() -> String {
    "usertable".to_string()
}

fn default_key_prefix() -> String {
    "user".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            ops: default_ops(),
            batch_size: default_batch_size(),
            starting_key: 0,
            table: default_table(),
            key_prefix: default_key_prefix(),
            abort_rate: 0.0,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Overlay CLI flags onto these settings.
    pub fn apply_matches(&mut self, matches: &ArgMatches) {
        if let Some(&threads) = matches.get_one::<usize>("threads") {
            self.threads = threads;
        }
        if let Some(&ops) = matches.get_one::<u64>("ops") {
            self.ops = ops;
        }
        if let Some(&batch_size) = matches.get_one::<usize>("batch-size") {
            self.batch_size = batch_size;
        }
        if let Some(&starting_key) = matches.get_one::<u64>("starting-key") {
            self.starting_key = starting_key;
        }
        if let Some(table) = matches.get_one::<String>("table") {
            self.table = table.clone();
        }
        if let Some(prefix) = matches.get_one::<String>("key-prefix") {
            self.key_prefix = prefix.clone();
        }
        if let Some(&rate) = matches.get_one::<f64>("abort-rate") {
            self.abort_rate = rate;
        }
    }
}
