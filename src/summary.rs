// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rendering of an aggregated result as a terminal summary.

use std::{borrow::Cow, str::FromStr};

use console::Style;
use itertools::Itertools as _;

use crate::report::AggregatedResult;

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] decide, whether output should
    /// be colored.
    #[default]
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

/// [`Style`]s for terminal output.
#[derive(Debug)]
pub struct Styles {
    /// [`Style`] for rendering passed counts.
    pub ok: Style,

    /// [`Style`] for rendering skipped counts.
    pub skipped: Style,

    /// [`Style`] for rendering errors and failed counts.
    pub err: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether the terminal is detected as supporting colors.
    pub is_present: bool,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            ok: Style::new().green(),
            skipped: Style::new().cyan(),
            err: Style::new().red(),
            bold: Style::new().bold(),
            is_present: console::colors_enabled(),
        }
    }
}

impl Styles {
    /// Creates new [`Styles`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the given `color` policy on top of the detected terminal.
    pub fn apply_coloring(&mut self, color: Coloring) {
        match color {
            Coloring::Auto => {}
            Coloring::Always => self.is_present = true,
            Coloring::Never => self.is_present = false,
        }
    }

    /// If terminal is present colors `input` with [`Styles::ok`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        if self.is_present {
            self.ok.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }

    /// If terminal is present colors `input` with [`Styles::skipped`] color
    /// or leaves "as is" otherwise.
    #[must_use]
    pub fn skipped<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        if self.is_present {
            self.skipped.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }

    /// If terminal is present colors `input` with [`Styles::err`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        if self.is_present {
            self.err.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }

    /// If terminal is present makes `input` __bold__ or leaves "as is"
    /// otherwise.
    #[must_use]
    pub fn bold<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        if self.is_present {
            self.bold.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }

    /// Renders the summary of the given aggregated `result`.
    #[must_use]
    pub fn summary(&self, result: &AggregatedResult) -> String {
        let suites = maybe_plural("suite", result.suites().count());
        let tests = maybe_plural("test", result.total());
        let stats = self.format_stats(result);
        let took = humantime::format_duration(result.duration());

        format!("{suites}\n{tests}{stats}\nin {took}")
    }

    /// Formats the per-status counts of the given `result`.
    ///
    /// Zero counts are omitted, so an all-green run reads as just
    /// "N passed".
    #[must_use]
    fn format_stats(&self, result: &AggregatedResult) -> Cow<'static, str> {
        let failed = result.failed() + result.errored();
        let formatted = [
            (result.passed() > 0)
                .then(|| {
                    self.bold(self.ok(format!("{} passed", result.passed())))
                })
                .unwrap_or_default(),
            (result.skipped() > 0)
                .then(|| {
                    self.bold(
                        self.skipped(format!("{} skipped", result.skipped())),
                    )
                })
                .unwrap_or_default(),
            (failed > 0)
                .then(|| self.bold(self.err(format!("{failed} failed"))))
                .unwrap_or_default(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .join(&self.bold(", "));

        (!formatted.is_empty())
            .then(|| {
                self.bold(format!(
                    " {}{}{}",
                    self.bold("("),
                    formatted,
                    self.bold(")"),
                ))
                .into_owned()
                .into()
            })
            .unwrap_or_default()
    }
}

/// Pluralizes `name`, when `num` asks for it.
fn maybe_plural(name: &str, num: usize) -> String {
    format!("{num} {name}{}", (num != 1).then_some("s").unwrap_or_default())
}
