// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Orchestration of the whole conversion-and-aggregation pipeline.
//!
//! A [`Publisher`] runs the strictly sequential pipeline of one build
//! invocation: locate the source reports, convert them into an output
//! area, tally the produced documents into the build's result and
//! classify it. The output area lives only as long as the invocation,
//! removed on success and on every failure path alike, unless the caller
//! explicitly asks to keep it.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use itertools::Itertools as _;
use smart_default::SmartDefault;

use crate::{
    aggregator,
    error::Result,
    locator,
    outcome::{self, Outcome},
    report::AggregatedResult,
    transformer::{ConversionRequest, Transformer},
};

/// Default name of the build-scoped output area.
pub const DEFAULT_OUTPUT_DIR: &str = "generatedJUnitFiles";

/// Everything one pipeline invocation hands back to the host.
#[derive(Clone, Debug)]
pub struct Publication {
    /// Build's cumulative result, including whatever earlier passes
    /// contributed.
    pub result: AggregatedResult,

    /// Classification of [`result`](Self::result) for the host's build
    /// status machinery.
    pub outcome: Outcome,
}

/// Runner of the conversion-and-aggregation pipeline.
#[derive(Clone, Debug, SmartDefault)]
pub struct Publisher {
    /// Directory the [`patterns`](Self::patterns) are resolved against.
    #[default(PathBuf::from("."))]
    pub workspace: PathBuf,

    /// Glob patterns of the source reports to convert.
    pub patterns: Vec<String>,

    /// Name of the output area receiving the converted documents,
    /// relative to the [`workspace`](Self::workspace).
    #[default(DEFAULT_OUTPUT_DIR.to_owned())]
    pub output_dir: String,

    /// Build timestamp stamped on every produced suite.
    #[default(SystemTime::now())]
    pub timestamp: SystemTime,

    /// Leaves the output area in place after aggregation, instead of
    /// removing it.
    pub keep_output: bool,
}

impl Publisher {
    /// Creates a [`Publisher`] converting reports matching the given
    /// `patterns`.
    #[must_use]
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the directory the patterns are resolved against.
    #[must_use]
    pub fn workspace(mut self, path: impl Into<PathBuf>) -> Self {
        self.workspace = path.into();
        self
    }

    /// Sets the workspace-relative name of the output area.
    #[must_use]
    pub fn output_dir(mut self, name: impl Into<String>) -> Self {
        self.output_dir = name.into();
        self
    }

    /// Sets the build timestamp stamped on every produced suite.
    #[must_use]
    pub fn timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Leaves the converted documents in place after aggregation.
    #[must_use]
    pub fn keep_output(mut self, keep: bool) -> Self {
        self.keep_output = keep;
        self
    }

    /// Runs the pipeline once, merging into `prior` when earlier passes of
    /// the same build produced one already.
    ///
    /// Diagnostics (file counts, suppression notices) go to the given
    /// `logger`, one line per event.
    ///
    /// # Errors
    ///
    /// Any [`Error`] of the underlying steps. Notably,
    /// [`Error::NoReportsFound`] is raised even when `build_already_failed`
    /// is set: a misconfigured pattern deserves its own message, while only
    /// the less actionable [`Error::EmptyResult`] is suppressed on an
    /// already failed build.
    ///
    /// [`Error`]: crate::Error
    /// [`Error::EmptyResult`]: crate::Error::EmptyResult
    /// [`Error::NoReportsFound`]: crate::Error::NoReportsFound
    pub fn publish(
        &self,
        prior: Option<AggregatedResult>,
        build_already_failed: bool,
        logger: &mut dyn io::Write,
    ) -> Result<Publication> {
        let reports = locator::locate(&self.workspace, &self.patterns)?;
        writeln!(
            logger,
            "Processing test results in {} file(s): {}",
            reports.len(),
            reports.iter().map(|p| p.display()).join(", "),
        )?;

        let area = OutputArea::acquire(self.workspace.join(&self.output_dir))?;

        let summary = Transformer::new(self.timestamp).execute(
            &ConversionRequest {
                root: self.workspace.clone(),
                reports,
                output_dir: area.path().to_owned(),
            },
        )?;

        let result = aggregator::collect(
            &summary.documents,
            prior,
            build_already_failed,
        )?;
        if result.has_no_outcome() && build_already_failed {
            writeln!(
                logger,
                "None of the test reports contained any result, leaving the \
                 already failed build as is",
            )?;
        }

        let outcome = outcome::resolve(Some(&result), build_already_failed);

        if self.keep_output {
            let kept = area.keep();
            writeln!(logger, "Keeping converted reports in {}", kept.display())?;
        }

        Ok(Publication { result, outcome })
    }
}

/// Scoped build-relative directory receiving converted documents.
///
/// Dropping the guard removes the directory with everything in it, on
/// successful and failed publications alike, so converted files never leak
/// into a subsequent build. [`keep()`](Self::keep) disarms the cleanup.
#[derive(Debug)]
struct OutputArea {
    path: PathBuf,
    armed: bool,
}

impl OutputArea {
    /// Creates the directory at `path` (and its missing parents) and arms
    /// its removal.
    fn acquire(path: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&path)?;
        Ok(Self { path, armed: true })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Disarms the cleanup, returning the path of the kept directory.
    fn keep(mut self) -> PathBuf {
        self.armed = false;
        self.path.clone()
    }
}

impl Drop for OutputArea {
    fn drop(&mut self) {
        if self.armed {
            // Best-effort: a leftover area mustn't fail the publication.
            drop(fs::remove_dir_all(&self.path));
        }
    }
}
