// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI (command line interface) of the converter binary.

use std::path::PathBuf;

use crate::{publisher::DEFAULT_OUTPUT_DIR, summary::Coloring};

pub use clap::Parser;

/// Converts MSTest TRX reports into JUnit XML and tallies the results.
#[derive(Clone, Debug, clap::Parser)]
#[command(
    name = "mstest-junit",
    version,
    about = "Converts MSTest TRX reports into JUnit XML and tallies the \
             results"
)]
pub struct Cli {
    /// Glob pattern(s) selecting the TRX reports to convert, resolved
    /// against the workspace.
    #[arg(value_name = "PATTERN", required = true)]
    pub patterns: Vec<String>,

    /// Directory the patterns are resolved against.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    /// Workspace-relative directory receiving the converted JUnit files.
    #[arg(
        short,
        long,
        value_name = "NAME",
        default_value = DEFAULT_OUTPUT_DIR,
    )]
    pub output_dir: String,

    /// Leave the converted JUnit files in place, instead of removing them
    /// once their results are tallied.
    #[arg(long)]
    pub keep_output: bool,

    /// Indicate that the surrounding build already failed for unrelated
    /// reasons, suppressing the "no results" error.
    #[arg(long)]
    pub build_failed: bool,

    /// Build timestamp (seconds since the Unix epoch) stamped on the
    /// produced suites. Current time, if omitted.
    #[arg(long, value_name = "EPOCH")]
    pub timestamp: Option<u64>,

    /// Write the aggregated result as JSON into the given file.
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Seed the aggregation from a summary JSON written by an earlier run
    /// of the same build.
    #[arg(long, value_name = "FILE")]
    pub merge: Option<PathBuf>,

    /// Coloring policy for the console output.
    #[arg(long, value_name = "auto|always|never", default_value = "auto")]
    pub color: Coloring,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn applies_defaults() {
        let cli =
            Cli::try_parse_from(["mstest-junit", "**/*.trx"]).unwrap();

        assert_eq!(cli.patterns, ["**/*.trx"]);
        assert_eq!(cli.workspace, PathBuf::from("."));
        assert_eq!(cli.output_dir, DEFAULT_OUTPUT_DIR);
        assert!(!cli.keep_output);
        assert!(!cli.build_failed);
        assert_eq!(cli.timestamp, None);
        assert_eq!(cli.color, Coloring::Auto);
    }

    #[test]
    fn requires_at_least_one_pattern() {
        assert!(Cli::try_parse_from(["mstest-junit"]).is_err());
    }

    #[test]
    fn parses_every_option() {
        let cli = Cli::try_parse_from([
            "mstest-junit",
            "-w",
            "/builds/42",
            "-o",
            "converted",
            "--keep-output",
            "--build-failed",
            "--timestamp",
            "1700000000",
            "--summary",
            "out.json",
            "--merge",
            "prev.json",
            "--color",
            "never",
            "results/*.trx",
            "extra/*.trx",
        ])
        .unwrap();

        assert_eq!(cli.patterns, ["results/*.trx", "extra/*.trx"]);
        assert_eq!(cli.workspace, PathBuf::from("/builds/42"));
        assert_eq!(cli.output_dir, "converted");
        assert!(cli.keep_output);
        assert!(cli.build_failed);
        assert_eq!(cli.timestamp, Some(1_700_000_000));
        assert_eq!(cli.summary, Some(PathBuf::from("out.json")));
        assert_eq!(cli.merge, Some(PathBuf::from("prev.json")));
        assert_eq!(cli.color, Coloring::Never);
    }
}
