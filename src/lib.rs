// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Conversion of [MSTest] TRX test reports into [JUnit XML][1], with
//! build-scoped aggregation of the results.
//!
//! The pipeline a [`Publisher`] runs is strictly sequential: [`locator`]
//! resolves the configured glob patterns into source reports,
//! [`sanitizer`] scrubs XML-illegal content out of them, [`transformer`]
//! rewrites each one as a JUnit document into a scoped output area,
//! [`aggregator`] tallies those documents into the build's cumulative
//! [`AggregatedResult`] and [`outcome`] classifies it. Running the
//! pipeline again within the same build appends to the previous result,
//! so pass/fail counts accumulate instead of resetting.
//!
//! [1]: https://llg.cubic.org/docs/junit
//! [MSTest]: https://learn.microsoft.com/visualstudio/test/vstest-console-options

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(non_ascii_idents, unsafe_code)]

pub mod aggregator;
pub mod cli;
pub mod error;
pub mod locator;
pub mod outcome;
pub mod publisher;
pub mod report;
pub mod sanitizer;
pub mod summary;
pub mod transformer;

pub use self::{
    error::{Error, Result},
    outcome::Outcome,
    publisher::{Publication, Publisher},
    report::{AggregatedResult, CaseResult, SuiteResult, TestStatus},
    sanitizer::sanitize,
    transformer::Transformer,
};
