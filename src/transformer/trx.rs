// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pull-parsing of TRX source reports.
//!
//! Only the parts of the schema the conversion needs are read: the
//! `TestRun` name, the `TestDefinitions` (to resolve a result's class
//! name through its `testId`) and the `Results/UnitTestResult` entries
//! with their `Output/ErrorInfo` payload.

use std::{borrow::Cow, collections::HashMap, fmt, time::Duration};

use derive_more::{Display, Error};
use lazy_regex::regex_captures;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

/// Failure to interpret a TRX document.
#[derive(Debug, Display, Error)]
#[display("{_0}")]
pub struct TrxError(#[error(not(source))] String);

impl TrxError {
    fn new(cause: impl fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// Outcome attribute of a `UnitTestResult`, folded to what the aggregate
/// schema distinguishes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrxOutcome {
    /// `Passed`.
    Passed,

    /// `Failed`.
    Failed,

    /// Everything else (`NotExecuted`, `Inconclusive`, `Timeout`,
    /// `Aborted`, unknown values): not executed to completion, which is
    /// not the same thing as failed.
    Skipped,
}

impl TrxOutcome {
    fn from_attr(value: &str) -> Self {
        match value {
            "Passed" => Self::Passed,
            "Failed" => Self::Failed,
            _ => Self::Skipped,
        }
    }
}

/// Single `UnitTestResult`, with its class name already resolved through
/// the run's `TestDefinitions`.
#[derive(Clone, Debug)]
pub struct TrxResult {
    /// `testName` attribute.
    pub test_name: String,

    /// Class name of the test's definition, when the run declares one.
    pub class_name: Option<String>,

    /// Folded `outcome` attribute.
    pub outcome: TrxOutcome,

    /// Parsed `duration` attribute. Zero when absent or unreadable.
    pub duration: Duration,

    /// `Output/ErrorInfo/Message` text.
    pub message: Option<String>,

    /// `Output/ErrorInfo/StackTrace` text.
    pub stack_trace: Option<String>,
}

/// Parsed TRX document.
#[derive(Clone, Debug)]
pub struct TrxDocument {
    /// `name` attribute of the `TestRun` root.
    pub run_name: String,

    /// Results in document order.
    pub results: Vec<TrxResult>,
}

/// Fields of a `UnitTestResult` collected while its subtree is parsed.
#[derive(Debug)]
struct PendingResult {
    test_name: String,
    test_id: Option<String>,
    outcome: TrxOutcome,
    duration: Duration,
    message: Option<String>,
    stack_trace: Option<String>,
}

/// Text-bearing element currently being read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TextTarget {
    None,
    Message,
    StackTrace,
}

/// Parses a sanitized TRX document.
///
/// # Errors
///
/// [`TrxError`], if the document isn't well-formed XML or a
/// `UnitTestResult` lacks its mandatory attributes. A document that is
/// well-formed but carries no results parses fine and yields an empty
/// result list; whether that's acceptable is decided downstream, where
/// the whole batch's tally is known.
pub fn parse(xml: &str) -> Result<TrxDocument, TrxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut run_name = String::new();
    let mut definitions: HashMap<String, String> = HashMap::new();
    let mut raw: Vec<PendingResult> = Vec::new();

    let mut unit_test_id: Option<String> = None;
    let mut pending: Option<PendingResult> = None;
    let mut in_error_info = false;
    let mut target = TextTarget::None;

    loop {
        let event = reader.read_event().map_err(TrxError::new)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"TestRun" => {
                        run_name = attr(e, "name")?.unwrap_or_default();
                    }
                    b"UnitTest" if !is_empty => {
                        unit_test_id = attr(e, "id")?;
                    }
                    b"TestMethod" => {
                        if let (Some(id), Some(class)) =
                            (unit_test_id.clone(), attr(e, "className")?)
                        {
                            definitions.insert(id, class);
                        }
                    }
                    b"UnitTestResult" => {
                        let result = begin_result(e)?;
                        if is_empty {
                            raw.push(result);
                        } else {
                            pending = Some(result);
                        }
                    }
                    b"ErrorInfo" if !is_empty => in_error_info = true,
                    b"Message" if in_error_info && !is_empty => {
                        target = TextTarget::Message;
                    }
                    b"StackTrace" if in_error_info && !is_empty => {
                        target = TextTarget::StackTrace;
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"UnitTest" => unit_test_id = None,
                b"UnitTestResult" => {
                    if let Some(result) = pending.take() {
                        raw.push(result);
                    }
                }
                b"ErrorInfo" => in_error_info = false,
                b"Message" | b"StackTrace" => target = TextTarget::None,
                _ => {}
            },
            Event::Text(ref t) => {
                if target != TextTarget::None {
                    let text = t.unescape().map_err(TrxError::new)?;
                    push_text(&mut pending, target, &text);
                }
            }
            Event::CData(t) => {
                if target != TextTarget::None {
                    let bytes = t.into_inner();
                    let text = String::from_utf8_lossy(&bytes);
                    push_text(&mut pending, target, &text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let results = raw
        .into_iter()
        .map(|r| TrxResult {
            class_name: r
                .test_id
                .as_ref()
                .and_then(|id| definitions.get(id).cloned()),
            test_name: r.test_name,
            outcome: r.outcome,
            duration: r.duration,
            message: r.message,
            stack_trace: r.stack_trace,
        })
        .collect();

    Ok(TrxDocument { run_name, results })
}

/// Reads the attributes of a `UnitTestResult` opening tag.
fn begin_result(e: &BytesStart<'_>) -> Result<PendingResult, TrxError> {
    let test_name = attr(e, "testName")?
        .ok_or_else(|| TrxError::new("`UnitTestResult` without a `testName`"))?;
    let outcome = attr(e, "outcome")?
        .map_or(TrxOutcome::Skipped, |o| TrxOutcome::from_attr(&o));
    let duration = attr(e, "duration")?
        .and_then(|d| parse_duration(&d))
        .unwrap_or(Duration::ZERO);

    Ok(PendingResult {
        test_name,
        test_id: attr(e, "testId")?,
        outcome,
        duration,
        message: None,
        stack_trace: None,
    })
}

fn push_text(pending: &mut Option<PendingResult>, target: TextTarget, text: &str) {
    let Some(result) = pending.as_mut() else {
        return;
    };
    let slot = match target {
        TextTarget::Message => &mut result.message,
        TextTarget::StackTrace => &mut result.stack_trace,
        TextTarget::None => return,
    };
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_owned()),
    }
}

/// Reads an (unescaped) attribute value off an element.
fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, TrxError> {
    e.try_get_attribute(name)
        .map_err(TrxError::new)?
        .map(|a| {
            a.unescape_value()
                .map(Cow::into_owned)
                .map_err(TrxError::new)
        })
        .transpose()
}

/// Parses a TRX `hh:mm:ss.fffffff` duration string.
///
/// Fractional digits beyond nanosecond precision are truncated. Returns
/// [`None`] on any other shape, which callers treat as a zero duration:
/// a report with a garbled duration is still worth converting.
fn parse_duration(value: &str) -> Option<Duration> {
    let (_, hours, minutes, seconds, fraction) =
        regex_captures!(r"^(\d+):(\d{2}):(\d{2})(?:\.(\d+))?$", value.trim())?;

    let hours = hours.parse::<u64>().ok()?;
    let minutes = minutes.parse::<u64>().ok()?;
    let seconds = seconds.parse::<u64>().ok()?;

    let nanos = if fraction.is_empty() {
        0
    } else {
        let digits = fraction.chars().take(9).collect::<String>();
        let scale = 10_u32.pow(9 - digits.len() as u32);
        digits.parse::<u32>().ok()? * scale
    };

    Some(
        Duration::from_secs((hours * 60 + minutes) * 60 + seconds)
            + Duration::from_nanos(u64::from(nanos)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TestRun id="abc" name="nightly run" xmlns="http://microsoft.com/schemas/VisualStudio/TeamTest/2010">
  <TestDefinitions>
    <UnitTest id="t-1" name="adds">
      <TestMethod codeBase="App.dll" className="App.Tests.Math" name="adds"/>
    </UnitTest>
    <UnitTest id="t-2" name="divides">
      <TestMethod codeBase="App.dll" className="App.Tests.Math" name="divides"/>
    </UnitTest>
  </TestDefinitions>
  <Results>
    <UnitTestResult testId="t-1" testName="adds" outcome="Passed" duration="00:00:01.2500000"/>
    <UnitTestResult testId="t-2" testName="divides" outcome="Failed" duration="00:00:00.0400000">
      <Output>
        <ErrorInfo>
          <Message>assert X==Y</Message>
          <StackTrace>at App.Tests.Math.divides()</StackTrace>
        </ErrorInfo>
      </Output>
    </UnitTestResult>
    <UnitTestResult testName="ignored" outcome="NotExecuted"/>
  </Results>
</TestRun>
"#;

    #[test]
    fn parses_run_name_and_results() {
        let doc = parse(SAMPLE).unwrap();

        assert_eq!(doc.run_name, "nightly run");
        assert_eq!(doc.results.len(), 3);
    }

    #[test]
    fn resolves_class_names_through_definitions() {
        let doc = parse(SAMPLE).unwrap();

        assert_eq!(doc.results[0].class_name.as_deref(), Some("App.Tests.Math"));
        assert_eq!(doc.results[2].class_name, None);
    }

    #[test]
    fn folds_outcomes() {
        let doc = parse(SAMPLE).unwrap();

        assert_eq!(doc.results[0].outcome, TrxOutcome::Passed);
        assert_eq!(doc.results[1].outcome, TrxOutcome::Failed);
        assert_eq!(doc.results[2].outcome, TrxOutcome::Skipped);
    }

    #[test]
    fn carries_error_info_text() {
        let doc = parse(SAMPLE).unwrap();
        let failed = &doc.results[1];

        assert_eq!(failed.message.as_deref(), Some("assert X==Y"));
        assert_eq!(
            failed.stack_trace.as_deref(),
            Some("at App.Tests.Math.divides()"),
        );
    }

    #[test]
    fn parses_durations() {
        assert_eq!(
            parse_duration("00:00:01.2500000"),
            Some(Duration::from_millis(1250)),
        );
        assert_eq!(parse_duration("01:02:03"), Some(Duration::from_secs(3723)));
        assert_eq!(parse_duration("garbage"), None);
    }

    #[test]
    fn unknown_outcomes_fold_to_skipped() {
        for raw in ["NotExecuted", "Inconclusive", "Timeout", "Aborted", "???"] {
            assert_eq!(TrxOutcome::from_attr(raw), TrxOutcome::Skipped);
        }
    }

    #[test]
    fn missing_test_name_is_an_error() {
        let xml = r#"<TestRun><Results><UnitTestResult outcome="Passed"/></Results></TestRun>"#;
        assert!(parse(xml).is_err());
    }

    #[test]
    fn truncated_document_is_an_error() {
        let xml = "<TestRun><Results><UnitTestResult ";
        assert!(parse(xml).is_err());
    }

    #[test]
    fn resultless_document_parses_empty() {
        let doc = parse("<TestRun name=\"empty\"/>").unwrap();
        assert!(doc.results.is_empty());
    }
}
