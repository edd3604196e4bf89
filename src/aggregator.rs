// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tallying of aggregate documents into a build-scoped result.
//!
//! This is the controller side of the pipeline: it receives only the
//! paths of the documents a conversion batch produced, parses them back
//! into structured [`CaseResult`]s and merges those into the build's
//! [`AggregatedResult`].

use std::{fmt, fs, path::PathBuf, time::Duration};

use quick_xml::{events::Event, Reader};

use crate::{
    error::{Error, Result},
    report::{AggregatedResult, CaseResult, SuiteResult, TestStatus},
};

/// Parses the given aggregate `documents` and merges them into `prior`.
///
/// With no `prior` result (the first conversion pass of a build) a fresh
/// [`AggregatedResult`] is seeded from the batch; otherwise the batch is
/// appended to what earlier passes accumulated, so counts only ever grow.
///
/// # Errors
///
/// - [`Error::Io`], if a document can't be read back.
/// - [`Error::TransformationSystem`], if a document doesn't parse: these
///   files were produced by this very pipeline, so a bad one means a
///   broken installation, not bad user input.
/// - [`Error::EmptyResult`], if the merged result holds neither passed
///   nor failed cases, unless `build_already_failed` is set, in which
///   case the error is suppressed and the (empty) result returned as is,
///   so a confusing secondary message never masks the build's real
///   failure.
pub fn collect(
    documents: &[PathBuf],
    prior: Option<AggregatedResult>,
    build_already_failed: bool,
) -> Result<AggregatedResult> {
    let mut result = prior.unwrap_or_default();

    for path in documents {
        let text = fs::read_to_string(path)?;
        let suites = parse_document(&text).map_err(|e| {
            Error::transformation(format_args!("`{}`: {e}", path.display()))
        })?;
        result.merge(suites);
    }

    if result.has_no_outcome() && !build_already_failed {
        return Err(Error::EmptyResult);
    }
    Ok(result)
}

/// Failure to parse an aggregate document.
#[derive(Debug)]
struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ParseError {
    fn new(cause: impl fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// Pull-parses one JUnit document into its suites.
fn parse_document(xml: &str) -> std::result::Result<Vec<SuiteResult>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut suites: Vec<SuiteResult> = Vec::new();
    let mut case: Option<CaseResult> = None;
    let mut in_system_err = false;

    loop {
        let event = reader.read_event().map_err(ParseError::new)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"testsuite" => {
                        let name = attr(e, "name")?.unwrap_or_default();
                        suites.push(SuiteResult::new(name));
                    }
                    b"testcase" => {
                        let suite_name = suites
                            .last()
                            .map(|s| s.name.clone())
                            .unwrap_or_default();
                        let parsed = CaseResult {
                            name: attr(e, "name")?.ok_or_else(|| {
                                ParseError::new("`testcase` without a `name`")
                            })?,
                            classname: attr(e, "classname")?
                                .unwrap_or(suite_name),
                            status: TestStatus::Passed,
                            duration: attr(e, "time")?
                                .and_then(|t| t.trim().parse::<f64>().ok())
                                .map_or(Duration::ZERO, Duration::from_secs_f64),
                            message: None,
                            stack_trace: None,
                        };
                        if is_empty {
                            push_case(&mut suites, parsed)?;
                        } else {
                            case = Some(parsed);
                        }
                    }
                    b"failure" => {
                        mark(&mut case, TestStatus::Failed, attr(e, "message")?);
                    }
                    b"error" => {
                        mark(&mut case, TestStatus::Errored, attr(e, "message")?);
                    }
                    b"skipped" => {
                        mark(&mut case, TestStatus::Skipped, None);
                    }
                    b"system-err" if !is_empty => in_system_err = true,
                    _ => {}
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"testcase" => {
                    if let Some(done) = case.take() {
                        push_case(&mut suites, done)?;
                    }
                }
                b"system-err" => in_system_err = false,
                _ => {}
            },
            Event::Text(ref t) => {
                if in_system_err {
                    if let Some(c) = case.as_mut() {
                        let text = t.unescape().map_err(ParseError::new)?;
                        match &mut c.stack_trace {
                            Some(existing) => existing.push_str(&text),
                            slot @ None => *slot = Some(text.into_owned()),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(suites)
}

fn push_case(
    suites: &mut Vec<SuiteResult>,
    case: CaseResult,
) -> std::result::Result<(), ParseError> {
    suites
        .last_mut()
        .ok_or_else(|| ParseError::new("`testcase` outside of a `testsuite`"))?
        .cases
        .push(case);
    Ok(())
}

fn mark(case: &mut Option<CaseResult>, status: TestStatus, message: Option<String>) {
    if let Some(c) = case.as_mut() {
        c.status = status;
        if message.is_some() {
            c.message = message;
        }
    }
}

/// Reads an (unescaped) attribute value off an element.
fn attr(
    e: &quick_xml::events::BytesStart<'_>,
    name: &str,
) -> std::result::Result<Option<String>, ParseError> {
    e.try_get_attribute(name)
        .map_err(ParseError::new)?
        .map(|a| {
            a.unescape_value()
                .map(std::borrow::Cow::into_owned)
                .map_err(ParseError::new)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::TempDir;

    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<testsuites>
  <testsuite name="App.Tests.Math" tests="3" failures="1">
    <testcase name="adds" time="1.25"/>
    <testcase name="divides" time="0.04">
      <failure type="Failed" message="assert X==Y"/>
      <system-err>at App.Tests.Math.divides()</system-err>
    </testcase>
    <testcase name="ignored">
      <skipped/>
    </testcase>
  </testsuite>
</testsuites>
"#;

    fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn seeds_a_fresh_result() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "TEST-1-a.xml", DOC);

        let result = collect(&[doc], None, false).unwrap();

        assert_eq!(result.passed(), 1);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.skipped(), 1);
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn carries_failure_details() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "TEST-1-a.xml", DOC);

        let result = collect(&[doc], None, false).unwrap();
        let failed = result.cases().find(|c| c.is_failure()).unwrap();

        assert_eq!(failed.name, "divides");
        assert_eq!(failed.message.as_deref(), Some("assert X==Y"));
        assert_eq!(
            failed.stack_trace.as_deref(),
            Some("at App.Tests.Math.divides()"),
        );
        assert_eq!(failed.duration, Duration::from_millis(40));
    }

    #[test]
    fn merges_into_a_prior_result() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "TEST-1-a.xml", DOC);

        let first = collect(&[doc.clone()], None, false).unwrap();
        let merged = collect(&[doc], Some(first.clone()), false).unwrap();

        assert_eq!(merged.total(), 2 * first.total());
        assert_eq!(merged.passed(), 2 * first.passed());
        assert_eq!(merged.suites().count(), 1);
    }

    #[test]
    fn no_outcome_at_all_is_fatal() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(
            &dir,
            "TEST-1-a.xml",
            r#"<testsuite name="T"><testcase name="s"><skipped/></testcase></testsuite>"#,
        );

        let err = collect(&[doc], None, false).unwrap_err();
        assert!(matches!(err, Error::EmptyResult));
    }

    #[test]
    fn empty_result_is_suppressed_when_build_already_failed() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(
            &dir,
            "TEST-1-a.xml",
            r#"<testsuite name="T"></testsuite>"#,
        );

        let result = collect(&[doc], None, true).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn unparsable_document_is_a_system_fault() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "TEST-1-a.xml", "<testsuite><broken");

        let err = collect(&[doc], None, false).unwrap_err();
        assert!(matches!(err, Error::TransformationSystem(_)));
    }

    #[test]
    fn error_elements_are_preserved_as_errored() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(
            &dir,
            "TEST-1-a.xml",
            r#"<testsuite name="T">
                 <testcase name="boom"><error type="Crash" message="oops"/></testcase>
                 <testcase name="fine"/>
               </testsuite>"#,
        );

        let result = collect(&[doc], None, false).unwrap();
        assert_eq!(result.errored(), 1);
        assert_eq!(result.passed(), 1);
    }
}
