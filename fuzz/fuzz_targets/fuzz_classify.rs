// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use orgonizer::fsops::decode_sample;
use orgonizer::organizer::extension_of;
use orgonizer::{classify, CategoryLabel};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    file_name: &'a str,
    sample: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let text = decode_sample(input.sample);
    assert!(!text.contains(char::REPLACEMENT_CHARACTER));

    let label = classify(&text);
    assert!(matches!(
        label,
        CategoryLabel::Resume | CategoryLabel::JobApplication | CategoryLabel::Others
    ));

    if let Some(ext) = extension_of(input.file_name) {
        assert!(!ext.contains('.'));
    }
});
