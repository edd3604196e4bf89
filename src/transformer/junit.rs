// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Emission of [JUnit XML][1] aggregate documents.
//!
//! [1]: https://llg.cubic.org/docs/junit

use std::time::SystemTime;

use junit_report::{
    Duration, Report, TestCase, TestCaseBuilder, TestSuiteBuilder,
};
use linked_hash_map::LinkedHashMap;

use super::trx::{TrxDocument, TrxOutcome, TrxResult};

/// Type reported on `failure` elements produced from a failed result.
const FAILURE_TYPE: &str = "Failed";

/// Suite name used for results whose run declares no class name at all.
const ORPHAN_SUITE: &str = "(unattributed)";

/// Builds a JUnit [`Report`] out of a parsed TRX document.
///
/// Results are grouped into one `testsuite` per class name, in first-seen
/// order; results without a resolvable class fall into a suite named after
/// the test run. Every suite is stamped with the host-supplied build
/// `timestamp`.
#[must_use]
pub fn build_report(doc: &TrxDocument, timestamp: SystemTime) -> Report {
    let mut grouped: LinkedHashMap<String, Vec<&TrxResult>> =
        LinkedHashMap::new();
    for result in &doc.results {
        let suite = result
            .class_name
            .clone()
            .unwrap_or_else(|| fallback_suite(&doc.run_name));
        grouped.entry(suite).or_insert_with(Vec::new).push(result);
    }

    let mut report = Report::new();
    for (suite_name, results) in grouped {
        let mut suite = TestSuiteBuilder::new(&suite_name)
            .set_timestamp(timestamp.into())
            .build();
        for result in results {
            suite.add_testcase(build_case(result));
        }
        report.add_testsuite(suite);
    }
    report
}

/// Maps one TRX result onto a JUnit `testcase`.
///
/// `Passed` becomes a success, `Failed` a failure carrying the recorded
/// message (with the stack trace mirrored into `system-err`), and every
/// other outcome a skip. Durations cross the schema boundary here, in this
/// one [`Duration::try_from`] call; the aggregate schema then renders them
/// as fractional seconds.
fn build_case(result: &TrxResult) -> TestCase {
    let duration =
        Duration::try_from(result.duration).unwrap_or(Duration::ZERO);

    match result.outcome {
        TrxOutcome::Passed => {
            TestCaseBuilder::success(&result.test_name, duration).build()
        }
        TrxOutcome::Failed => {
            let mut case = TestCaseBuilder::failure(
                &result.test_name,
                duration,
                FAILURE_TYPE,
                result.message.as_deref().unwrap_or_default(),
            )
            .build();
            if let Some(stack) = &result.stack_trace {
                case.set_system_err(stack);
            }
            case
        }
        TrxOutcome::Skipped => {
            TestCaseBuilder::skipped(&result.test_name).build()
        }
    }
}

fn fallback_suite(run_name: &str) -> String {
    if run_name.is_empty() {
        ORPHAN_SUITE.to_owned()
    } else {
        run_name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use super::*;

    fn result(
        name: &str,
        class: Option<&str>,
        outcome: TrxOutcome,
    ) -> TrxResult {
        TrxResult {
            test_name: name.to_owned(),
            class_name: class.map(ToOwned::to_owned),
            outcome,
            duration: StdDuration::from_millis(250),
            message: (outcome == TrxOutcome::Failed)
                .then(|| "assert X==Y".to_owned()),
            stack_trace: None,
        }
    }

    fn doc(results: Vec<TrxResult>) -> TrxDocument {
        TrxDocument {
            run_name: "run".to_owned(),
            results,
        }
    }

    fn render(report: &Report) -> String {
        let mut out = Vec::new();
        report.write_xml(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn groups_one_suite_per_class() {
        let report = build_report(
            &doc(vec![
                result("a", Some("Tests.One"), TrxOutcome::Passed),
                result("b", Some("Tests.Two"), TrxOutcome::Passed),
                result("c", Some("Tests.One"), TrxOutcome::Passed),
            ]),
            SystemTime::UNIX_EPOCH,
        );

        let suites = report.testsuites();
        assert_eq!(suites.len(), 2);
        assert_eq!(suites[0].name(), "Tests.One");
        assert_eq!(suites[1].name(), "Tests.Two");
    }

    #[test]
    fn classless_results_fall_back_to_the_run_name() {
        let report = build_report(
            &doc(vec![result("a", None, TrxOutcome::Passed)]),
            SystemTime::UNIX_EPOCH,
        );

        assert_eq!(report.testsuites()[0].name(), "run");
    }

    #[test]
    fn maps_outcomes_onto_case_kinds() {
        let report = build_report(
            &doc(vec![
                result("ok", Some("T"), TrxOutcome::Passed),
                result("bad", Some("T"), TrxOutcome::Failed),
                result("meh", Some("T"), TrxOutcome::Skipped),
            ]),
            SystemTime::UNIX_EPOCH,
        );

        let xml = render(&report);
        assert!(xml.contains("<failure"));
        assert!(xml.contains("assert X==Y"));
        assert!(xml.contains("<skipped"));
    }

    #[test]
    fn failed_stack_trace_lands_in_system_err() {
        let mut failed = result("bad", Some("T"), TrxOutcome::Failed);
        failed.stack_trace = Some("at T.bad()".to_owned());
        let report =
            build_report(&doc(vec![failed]), SystemTime::UNIX_EPOCH);

        assert!(render(&report).contains("at T.bad()"));
    }

    #[test]
    fn output_is_reparsable_xml() {
        let report = build_report(
            &doc(vec![result("a", Some("T"), TrxOutcome::Passed)]),
            SystemTime::UNIX_EPOCH,
        );

        let xml = render(&report);
        let mut reader = quick_xml::Reader::from_str(&xml);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("emitted XML didn't re-parse: {e}"),
            }
        }
    }
}
