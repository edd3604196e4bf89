// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Consolidated error handling types for the whole conversion pipeline.

use std::{fmt, io, path::PathBuf};

use derive_more::{Display, Error};

/// Top-level error of a report publishing run.
///
/// Every variant is fatal: it aborts the remaining pipeline steps and no
/// partial [`AggregatedResult`] is handed to the caller. Failing tests are
/// not represented here at all, as they're data, reflected in an
/// [`AggregatedResult`] and classified by an [`Outcome`].
///
/// [`AggregatedResult`]: crate::report::AggregatedResult
/// [`Outcome`]: crate::outcome::Outcome
#[derive(Debug, Display, Error)]
pub enum Error {
    /// No source report matched the configured pattern.
    ///
    /// Zero matches is a configuration mistake, not an empty success, so it
    /// aborts the run before anything is converted.
    #[display("No test report files were found. Configuration error?")]
    NoReportsFound,

    /// A configured glob pattern couldn't be compiled.
    #[display("Invalid test report pattern: {_0}")]
    InvalidPattern(globwalk::GlobError),

    /// JUnit XML couldn't be produced or read back.
    ///
    /// This indicates a broken installation rather than bad input data, and
    /// so is kept apart from [`Error::MalformedSource`].
    #[display("Failed to produce a JUnit report: {_0}")]
    TransformationSystem(#[error(not(source))] String),

    /// Aggregation finished with neither passed nor failed tests.
    #[display("None of the test reports contained any result")]
    EmptyResult,

    /// A source report couldn't be interpreted, even after sanitization.
    ///
    /// A single bad document fails the whole batch, so a partial (and
    /// misleading) result is never presented.
    #[display("Malformed test report `{}`: {reason}", path.display())]
    MalformedSource {
        /// Path of the offending source report.
        path: PathBuf,

        /// Human-readable description of what couldn't be interpreted.
        #[error(not(source))]
        reason: String,
    },

    /// I/O error while reading reports or preparing the output area.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),
}

impl Error {
    /// Creates an [`Error::TransformationSystem`] from any displayable cause.
    #[must_use]
    pub fn transformation(cause: impl fmt::Display) -> Self {
        Self::TransformationSystem(cause.to_string())
    }

    /// Creates an [`Error::MalformedSource`] for the given report `path`.
    #[must_use]
    pub fn malformed(path: impl Into<PathBuf>, cause: impl fmt::Display) -> Self {
        Self::MalformedSource {
            path: path.into(),
            reason: cause.to_string(),
        }
    }
}

/// Result of a report publishing operation.
pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<globwalk::GlobError> for Error {
    fn from(err: globwalk::GlobError) -> Self {
        Self::InvalidPattern(err)
    }
}
