// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Classification of an aggregated result into a final build status.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::report::AggregatedResult;

/// Coarse-grained build status derived from an [`AggregatedResult`].
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
pub enum Outcome {
    /// All aggregated tests passed (or there was nothing to report on an
    /// already-failed build).
    #[display("success")]
    Success,

    /// At least one aggregated test failed.
    ///
    /// Failing tests are data, not an error of this pipeline, so they
    /// degrade the build instead of aborting it.
    #[display("unstable")]
    Unstable,

    /// The pipeline itself aborted with a fatal [`Error`].
    ///
    /// Never produced by [`resolve()`]: it only ever classifies, while
    /// fatal conditions are raised earlier as errors and mapped onto this
    /// variant by the caller.
    ///
    /// [`Error`]: crate::Error
    #[display("failure")]
    Failure,
}

impl Outcome {
    /// Process exit code conventionally reported for this [`Outcome`].
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Unstable => 1,
            Self::Failure => 2,
        }
    }
}

/// Classifies the given [`AggregatedResult`].
///
/// An absent (or outcome-free) `result` on a build that already failed for
/// unrelated reasons is a no-op [`Outcome::Success`]: there is nothing to
/// add on top of the failure the host knows about already. Otherwise any
/// failed (or errored) case makes the build [`Outcome::Unstable`].
#[must_use]
pub fn resolve(
    result: Option<&AggregatedResult>,
    build_already_failed: bool,
) -> Outcome {
    let Some(result) = result else {
        return Outcome::Success;
    };
    if build_already_failed && result.has_no_outcome() {
        return Outcome::Success;
    }
    if result.failed() + result.errored() > 0 {
        Outcome::Unstable
    } else {
        Outcome::Success
    }
}
