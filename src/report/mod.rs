// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Test outcome data model: cases, suites and the build-scoped
//! [`AggregatedResult`] they accumulate into.
//!
//! Everything here is plain serializable data, because results may be
//! parsed on one machine and tallied on another. Only paths, buffers and
//! these structures cross that boundary.

use std::time::Duration;

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Final status of a single executed test case.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TestStatus {
    /// Test ran and succeeded.
    Passed,

    /// Test ran and its assertion(s) failed.
    Failed,

    /// Test was not executed (or was inconclusive), which is not a failure.
    Skipped,

    /// Test aborted with an infrastructure error rather than an assertion.
    ///
    /// Never produced by the TRX conversion itself, but preserved when found
    /// in aggregate documents or merged in from an earlier pass.
    Errored,
}

/// Single test case extracted from an aggregate report document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CaseResult {
    /// Test name, as reported by the test runner.
    pub name: String,

    /// Name of the class (suite) the test belongs to.
    pub classname: String,

    /// Final [`TestStatus`] of the case.
    pub status: TestStatus,

    /// Wall-clock time the case took to execute.
    pub duration: Duration,

    /// Failure (or error) message, when the runner recorded one.
    pub message: Option<String>,

    /// Captured stack trace accompanying a failure.
    pub stack_trace: Option<String>,
}

impl CaseResult {
    /// Indicates whether this case counts towards the failed tally.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, TestStatus::Failed)
    }
}

/// Ordered group of [`CaseResult`]s sharing a suite (class) name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SuiteResult {
    /// Suite (class) name.
    pub name: String,

    /// Cases of this suite, in document order.
    pub cases: Vec<CaseResult>,
}

impl SuiteResult {
    /// Creates an empty [`SuiteResult`] with the given `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Counts cases of this suite having the given `status`.
    #[must_use]
    pub fn count(&self, status: TestStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }
}

/// Build-scoped accumulation of test outcomes across one or more
/// conversion passes.
///
/// Merging is append-only: a later batch adds new [`CaseResult`]s to the
/// suites already present (or introduces new suites), never replacing or
/// dropping earlier entries. Counts are always derived from the stored
/// cases, so `total() == passed() + failed() + skipped() + errored()`
/// holds by construction.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AggregatedResult {
    /// Suites in first-seen order.
    suites: LinkedHashMap<String, SuiteResult>,
}

impl AggregatedResult {
    /// Creates an empty [`AggregatedResult`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a whole batch of suites to this result.
    ///
    /// Suites are matched by name: cases of an already-known suite are
    /// appended to it, unknown suites are added at the end.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = SuiteResult>) {
        for suite in batch {
            self.suites
                .entry(suite.name.clone())
                .or_insert_with(|| SuiteResult::new(suite.name.clone()))
                .cases
                .extend(suite.cases);
        }
    }

    /// Iterates over the accumulated suites in first-seen order.
    pub fn suites(&self) -> impl Iterator<Item = &SuiteResult> {
        self.suites.values()
    }

    /// Iterates over all accumulated cases, suite by suite.
    pub fn cases(&self) -> impl Iterator<Item = &CaseResult> {
        self.suites.values().flat_map(|s| s.cases.iter())
    }

    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Number of skipped cases.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    /// Number of errored cases.
    #[must_use]
    pub fn errored(&self) -> usize {
        self.count(TestStatus::Errored)
    }

    /// Total number of accumulated cases.
    #[must_use]
    pub fn total(&self) -> usize {
        self.cases().count()
    }

    /// Indicates whether no case has been accumulated at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.values().all(|s| s.cases.is_empty())
    }

    /// Indicates whether this result carries neither passed nor failed
    /// cases, which callers treat as "contained no result".
    #[must_use]
    pub fn has_no_outcome(&self) -> bool {
        self.passed() == 0 && self.failed() == 0
    }

    /// Summed wall-clock duration of all accumulated cases.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.cases().map(|c| c.duration).sum()
    }

    fn count(&self, status: TestStatus) -> usize {
        self.cases().filter(|c| c.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, status: TestStatus) -> CaseResult {
        CaseResult {
            name: name.to_owned(),
            classname: "Tests.Sample".to_owned(),
            status,
            duration: Duration::from_millis(120),
            message: None,
            stack_trace: None,
        }
    }

    fn suite(name: &str, cases: Vec<CaseResult>) -> SuiteResult {
        SuiteResult {
            name: name.to_owned(),
            cases,
        }
    }

    #[test]
    fn counts_always_sum_to_total() {
        let mut result = AggregatedResult::new();
        result.merge([suite(
            "Tests.Sample",
            vec![
                case("a", TestStatus::Passed),
                case("b", TestStatus::Failed),
                case("c", TestStatus::Skipped),
                case("d", TestStatus::Errored),
            ],
        )]);

        assert_eq!(
            result.total(),
            result.passed() + result.failed() + result.skipped() + result.errored(),
        );
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn merge_appends_instead_of_replacing() {
        let mut result = AggregatedResult::new();
        result.merge([suite("Tests.Sample", vec![case("a", TestStatus::Passed)])]);
        result.merge([suite("Tests.Sample", vec![case("b", TestStatus::Failed)])]);

        let all = result.cases().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(all, ["a", "b"]);
        assert_eq!(result.suites().count(), 1);
    }

    #[test]
    fn merge_totals_are_order_independent() {
        let b1 = suite("One", vec![case("a", TestStatus::Passed)]);
        let b2 = suite("Two", vec![case("b", TestStatus::Failed)]);

        let mut forward = AggregatedResult::new();
        forward.merge([b1.clone()]);
        forward.merge([b2.clone()]);

        let mut at_once = AggregatedResult::new();
        at_once.merge([b2, b1]);

        assert_eq!(forward.passed(), at_once.passed());
        assert_eq!(forward.failed(), at_once.failed());
        assert_eq!(forward.total(), at_once.total());
    }

    #[test]
    fn suites_keep_first_seen_order() {
        let mut result = AggregatedResult::new();
        result.merge([
            suite("Zeta", vec![case("z", TestStatus::Passed)]),
            suite("Alpha", vec![case("a", TestStatus::Passed)]),
        ]);
        result.merge([suite("Zeta", vec![case("z2", TestStatus::Passed)])]);

        let names = result.suites().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Zeta", "Alpha"]);
    }

    #[test]
    fn skipped_only_result_has_no_outcome() {
        let mut result = AggregatedResult::new();
        result.merge([suite("Tests", vec![case("s", TestStatus::Skipped)])]);

        assert!(!result.is_empty());
        assert!(result.has_no_outcome());
    }

    #[test]
    fn roundtrips_through_json() {
        let mut result = AggregatedResult::new();
        result.merge([suite(
            "Tests.Sample",
            vec![case("a", TestStatus::Passed), case("b", TestStatus::Failed)],
        )]);

        let json = serde_json::to_string(&result).unwrap();
        let back: AggregatedResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
