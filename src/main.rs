// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{
    fs, io, process,
    time::{Duration, SystemTime},
};

use mstest_junit::{
    cli::{Cli, Parser as _},
    summary::Styles,
    AggregatedResult, Error, Outcome, Publisher, Result,
};

fn main() {
    let cli = Cli::parse();

    let mut styles = Styles::new();
    styles.apply_coloring(cli.color);

    let code = match run(&cli, &styles) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("{}", styles.err(err.to_string()));
            Outcome::Failure.exit_code()
        }
    };
    process::exit(code);
}

fn run(cli: &Cli, styles: &Styles) -> Result<Outcome> {
    let prior = cli.merge.as_deref().map(read_prior).transpose()?;

    let mut publisher = Publisher::new(cli.patterns.clone())
        .workspace(cli.workspace.clone())
        .output_dir(cli.output_dir.clone())
        .keep_output(cli.keep_output);
    if let Some(secs) = cli.timestamp {
        publisher = publisher
            .timestamp(SystemTime::UNIX_EPOCH + Duration::from_secs(secs));
    }

    let publication =
        publisher.publish(prior, cli.build_failed, &mut io::stderr())?;

    println!("{}", styles.summary(&publication.result));

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&publication.result)
            .map_err(Error::transformation)?;
        fs::write(path, json)?;
    }

    Ok(publication.outcome)
}

/// Reads a summary JSON written by an earlier run of the same build.
fn read_prior(path: &std::path::Path) -> Result<AggregatedResult> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| Error::malformed(path, e))
}
