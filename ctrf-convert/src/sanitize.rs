// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalization of free text taken from JUnit reports.
//!
//! Text read from test output is arbitrary: it can contain terminal control sequences, byte-order
//! marks, and (in its original UTF-16 or ill-formed UTF-8 form) unpaired surrogates. Everything
//! placed into a CTRF report passes through [`sanitize`] so the output is valid, printable JSON.
//!
//! Rust strings are always well-formed UTF-8 and so cannot hold an unpaired surrogate. Surrogates
//! are replaced at the boundaries where text enters as UTF-16 or raw bytes: see
//! [`sanitize_utf16`] and [`sanitize_lossy`].

use unicode_normalization::{IsNormalized, UnicodeNormalization, is_nfc_quick};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Sanitizes text for inclusion in a report.
///
/// * Byte-order marks are removed.
/// * C0 control characters other than tab, newline and carriage return, as well as DEL, are
///   replaced with a space.
/// * The result is normalized to NFC.
///
/// Returns `None` if the input is `None`, or if the result is empty or all whitespace.
///
/// This function is idempotent: `sanitize(sanitize(s).as_deref()) == sanitize(s)`.
pub fn sanitize(text: Option<&str>) -> Option<String> {
    let text = text?;

    let cleaned: String = text
        .chars()
        .filter(|&c| c != BYTE_ORDER_MARK)
        .map(|c| if is_replaced_control(c) { ' ' } else { c })
        .collect();

    let normalized = if is_nfc_quick(cleaned.chars()) == IsNormalized::Yes {
        cleaned
    } else {
        cleaned.nfc().collect()
    };

    if normalized.trim().is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Sanitizes UTF-16 text, replacing unpaired surrogates with U+FFFD.
///
/// Valid surrogate pairs are decoded into the supplementary characters they encode.
pub fn sanitize_utf16(units: &[u16]) -> Option<String> {
    let decoded: String = char::decode_utf16(units.iter().copied())
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    sanitize(Some(&decoded))
}

/// Sanitizes bytes that are expected to be UTF-8.
///
/// Ill-formed sequences, including UTF-8 encoded surrogates, are replaced with U+FFFD.
pub fn sanitize_lossy(bytes: &[u8]) -> Option<String> {
    sanitize(Some(&String::from_utf8_lossy(bytes)))
}

/// Splits captured output into sanitized, trimmed lines.
///
/// Lines that are empty after trimming and sanitization are dropped. Returns `None`, never an
/// empty list, if no lines remain.
pub fn to_lines(text: Option<&str>) -> Option<Vec<String>> {
    let text = text?;
    if text.trim().is_empty() {
        return None;
    }

    let lines: Vec<String> = text
        .split('\n')
        .filter_map(|line| sanitize(Some(line.trim())))
        .collect();

    if lines.is_empty() { None } else { Some(lines) }
}

fn is_replaced_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}
