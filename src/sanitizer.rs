// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scrubbing of XML-illegal content from captured test output.
//!
//! Test runners happily write whatever a test printed straight into their
//! report, raw control bytes included, and an XML parser meeting such a
//! byte aborts with a fatal error. [`sanitize()`] makes a report safely
//! parsable while leaving every legal character exactly where it was.

use std::borrow::Cow;

use lazy_regex::regex_replace_all;

/// Placeholder substituted for every illegal character.
///
/// A single space keeps the document the same length, so offsets into the
/// surrounding text stay valid.
const PLACEHOLDER: char = ' ';

/// Replaces XML 1.0–illegal content in `input` with a space placeholder.
///
/// Two kinds of content are scrubbed:
/// - raw characters outside the XML 1.0 character range (`0x00`–`0x08`,
///   `0x0B`, `0x0C`, `0x0E`–`0x1F`, `U+FFFE`, `U+FFFF`);
/// - numeric character references (`&#2;`, `&#x1F;`, …) resolving to such
///   a character, which appear pre-escaped in captured output and blow up
///   only once the document is re-parsed.
///
/// Legal whitespace (tab, newline, carriage return) and all other legal
/// characters are left untouched, inside CDATA sections and plain text
/// alike. Sanitizing an already-clean document borrows the input back
/// unchanged, which also makes the operation idempotent.
#[must_use]
pub fn sanitize(input: &str) -> Cow<'_, str> {
    let scrubbed: Cow<'_, str> = if input.chars().any(is_illegal) {
        input
            .chars()
            .map(|c| if is_illegal(c) { PLACEHOLDER } else { c })
            .collect::<String>()
            .into()
    } else {
        Cow::Borrowed(input)
    };

    let replaced = regex_replace_all!(
        r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));",
        scrubbed.as_ref(),
        |whole: &str, hex: &str, dec: &str| {
            if reference_is_illegal(hex, dec) {
                PLACEHOLDER.to_string()
            } else {
                whole.to_owned()
            }
        },
    );

    match replaced {
        Cow::Owned(s) => Cow::Owned(s),
        Cow::Borrowed(_) => scrubbed,
    }
}

/// Checks whether `c` is outside the XML 1.0 character range.
const fn is_illegal(c: char) -> bool {
    matches!(
        c,
        '\u{00}'..='\u{08}'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{0E}'..='\u{1F}'
            | '\u{FFFE}'
            | '\u{FFFF}',
    )
}

/// Decodes a captured numeric character reference and checks whether it
/// denotes an illegal character.
///
/// References that don't decode to a character at all (surrogates,
/// out-of-range code points) count as illegal too.
fn reference_is_illegal(hex: &str, dec: &str) -> bool {
    let code = if hex.is_empty() {
        dec.parse::<u32>().ok()
    } else {
        u32::from_str_radix(hex, 16).ok()
    };
    code.map_or(true, |c| char::from_u32(c).map_or(true, is_illegal))
}
