//! Clap command definition.
//!
//! Builder-style argument tree for the `batchbench` binary. Flags override
//! values loaded from an optional TOML config file.

use clap::{value_parser, Arg, Command};

/// Build the complete CLI command.
pub fn build_cli() -> Command {
    Command::new("batchbench")
        .about("Batched-insert load harness for transactional key-value stores")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file; flags override values from the file"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_parser(value_parser!(usize))
                .help("Number of worker threads (default: 1)"),
        )
        .arg(
            Arg::new("ops")
                .long("ops")
                .value_parser(value_parser!(u64))
                .help("Total operations across all workers (default: 1)"),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .value_parser(value_parser!(usize))
                .help("Rows buffered per transaction before an implicit flush (default: 1)"),
        )
        .arg(
            Arg::new("starting-key")
                .long("starting-key")
                .value_parser(value_parser!(u64))
                .help("Seed for the shared key sequence (default: 0)"),
        )
        .arg(
            Arg::new("table")
                .long("table")
                .help("Target table name (default: usertable)"),
        )
        .arg(
            Arg::new("key-prefix")
                .long("key-prefix")
                .help("Primary-key prefix (default: user)"),
        )
        .arg(
            Arg::new("abort-rate")
                .long("abort-rate")
                .value_parser(value_parser!(f64))
                .help("Probability in [0,1] that the in-memory store aborts a commit (default: 0)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Emit the final report as JSON"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_all_flags() {
        let matches = build_cli()
            .try_get_matches_from([
                "batchbench",
                "--threads",
                "4",
                "--ops",
                "1000",
                "--batch-size",
                "16",
                "--starting-key",
                "500",
                "--table",
                "loadtable",
                "--key-prefix",
                "row",
                "--abort-rate",
                "0.1",
                "--json",
            ])
            .unwrap();

        assert_eq!(matches.get_one::<usize>("threads"), Some(&4));
        assert_eq!(matches.get_one::<u64>("ops"), Some(&1000));
        assert_eq!(matches.get_one::<usize>("batch-size"), Some(&16));
        assert_eq!(matches.get_one::<u64>("starting-key"), Some(&500));
        assert_eq!(
            matches.get_one::<String>("table").map(String::as_str),
            Some("loadtable")
        );
        assert!(matches.get_flag("json"));
    }

    #[test]
    fn test_cli_rejects_non_numeric_threads() {
        assert!(build_cli()
            .try_get_matches_from(["batchbench", "--threads", "many"])
            .is_err());
    }
}
