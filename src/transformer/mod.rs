// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Transformation of TRX source reports into JUnit aggregate documents.
//!
//! The transformation is a one-shot, stateless mapping: the same source
//! bytes (and the same build timestamp) always produce the same output
//! bytes. Conversion may run on a different machine than the tallying
//! that follows it, so its input and output are plain serializable
//! messages: a [`ConversionRequest`] goes in, a [`ConversionSummary`]
//! comes out, and nothing else crosses the boundary.

pub mod junit;
pub mod trx;

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sanitizer,
};

/// Conversion work order: which reports to read, and where the produced
/// aggregate documents go.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConversionRequest {
    /// Directory the report paths are relative to.
    pub root: PathBuf,

    /// Source reports to convert, relative to [`root`](Self::root).
    pub reports: Vec<PathBuf>,

    /// Existing directory receiving one output document per report.
    pub output_dir: PathBuf,
}

/// Outcome of a whole conversion batch.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConversionSummary {
    /// Written aggregate documents, in input order.
    pub documents: Vec<PathBuf>,

    /// Total number of test results encountered across the batch.
    pub cases: usize,
}

/// TRX → JUnit schema transformer.
#[derive(Clone, Copy, Debug)]
pub struct Transformer {
    /// Build timestamp stamped on every produced `testsuite`.
    timestamp: SystemTime,
}

impl Transformer {
    /// Creates a [`Transformer`] stamping suites with the given build
    /// `timestamp`.
    #[must_use]
    pub const fn new(timestamp: SystemTime) -> Self {
        Self { timestamp }
    }

    /// Converts every report of the `request`, one output document per
    /// source report.
    ///
    /// Output documents are named `TEST-<n>-<stem>.xml` (a batch-unique
    /// index plus the source file stem), so two `results.trx` files from
    /// different directories never collide.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`], if a source report can't be read or an output
    ///   document can't be written.
    /// - [`Error::MalformedSource`], if a report doesn't parse even after
    ///   sanitization. One bad report fails the whole batch.
    /// - [`Error::TransformationSystem`], if JUnit XML can't be produced
    ///   for a parsed report, which points at this program rather than at
    ///   the input.
    pub fn execute(&self, request: &ConversionRequest) -> Result<ConversionSummary> {
        let mut documents = Vec::with_capacity(request.reports.len());
        let mut cases = 0;

        for (index, report) in request.reports.iter().enumerate() {
            let source = request.root.join(report);
            let target = request
                .output_dir
                .join(output_name(index, report));

            cases += self.convert_file(&source, &target)?;
            documents.push(target);
        }

        Ok(ConversionSummary { documents, cases })
    }

    /// Converts a single report: read, sanitize, parse, emit.
    fn convert_file(&self, source: &Path, target: &Path) -> Result<usize> {
        let bytes = fs::read(source)?;
        let text = String::from_utf8_lossy(&bytes);
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);
        let sanitized = sanitizer::sanitize(text);

        let doc = trx::parse(&sanitized)
            .map_err(|e| Error::malformed(source, e))?;
        let report = junit::build_report(&doc, self.timestamp);

        let mut out = Vec::new();
        report
            .write_xml(&mut out)
            .map_err(Error::transformation)?;
        fs::write(target, out)?;

        Ok(doc.results.len())
    }
}

/// Collision-free file name for the `index`-th output document.
fn output_name(index: usize, report: &Path) -> String {
    let stem = report
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_owned());
    format!("TEST-{}-{stem}.xml", index + 1)
}
