// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Discovery of candidate source report files.

use std::path::{Path, PathBuf};

use itertools::Itertools as _;

use crate::error::{Error, Result};

/// Resolves the given glob `patterns` against the `root` directory.
///
/// Matching is recursive and case-insensitive on the pattern (report
/// extensions show up as both `.trx` and `.TRX` in the wild, depending on
/// the platform producing them). Returned paths are relative to `root` and
/// sorted lexicographically, so repeated runs over the same tree see the
/// same order.
///
/// # Errors
///
/// - [`Error::InvalidPattern`], if a pattern doesn't compile.
/// - [`Error::NoReportsFound`], if nothing matches: an empty match set is
///   a configuration mistake, never an empty success.
pub fn locate(
    root: impl AsRef<Path>,
    patterns: &[impl AsRef<str>],
) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    let walker = globwalk::GlobWalkerBuilder::from_patterns(root, patterns)
        .case_insensitive(true)
        .build()?;

    let found = walker
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf)
        })
        .sorted()
        .collect::<Vec<_>>();

    if found.is_empty() {
        return Err(Error::NoReportsFound);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &TempDir, rel: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "<TestRun/>").unwrap();
    }

    #[test]
    fn finds_reports_in_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "results/b.trx");
        touch(&dir, "results/a.trx");
        touch(&dir, "other.txt");

        let found = locate(dir.path(), &["*.trx"]).unwrap();

        assert_eq!(
            found,
            [
                PathBuf::from("results/a.trx"),
                PathBuf::from("results/b.trx"),
            ],
        );
    }

    #[test]
    fn matches_extensions_case_insensitively() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "RUN.TRX");

        let found = locate(dir.path(), &["*.trx"]).unwrap();
        assert_eq!(found, [PathBuf::from("RUN.TRX")]);
    }

    #[test]
    fn accepts_multiple_patterns() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "one.trx");
        touch(&dir, "two.xml");

        let found = locate(dir.path(), &["*.trx", "two.*"]).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn zero_matches_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "unrelated.log");

        let err = locate(dir.path(), &["*.trx"]).unwrap_err();
        assert!(matches!(err, Error::NoReportsFound));
    }

    #[test]
    fn directories_never_match() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("fake.trx")).unwrap();

        let err = locate(dir.path(), &["*.trx"]).unwrap_err();
        assert!(matches!(err, Error::NoReportsFound));
    }
}
