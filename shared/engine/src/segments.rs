//! Parsing primitives for semi-structured BOM codes.
//!
//! A MasterCode such as `O-61025-01-71815-01` is a dash-delimited sequence of
//! segments. Rules read individual segments by position and must treat a
//! missing segment as "use the fallback" rather than an error.

use regex::Regex;
use std::sync::OnceLock;

fn digit_run_regex() -> &'static Regex {
    static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();
    DIGIT_RUN.get_or_init(|| Regex::new(r"[0-9]+").expect("static digit run pattern"))
}

fn digit_pair_regex() -> &'static Regex {
    static DIGIT_PAIR: OnceLock<Regex> = OnceLock::new();
    DIGIT_PAIR.get_or_init(|| Regex::new(r"[0-9]([0-9])").expect("static digit pair pattern"))
}

/// Uppercase, trim, split on `-` and trim each piece.
///
/// An empty code yields a single empty segment.
pub fn split_segments(code: &str) -> Vec<String> {
    code.to_uppercase()
        .trim()
        .split('-')
        .map(|segment| segment.trim().to_string())
        .collect()
}

/// Concatenation of at most the first `count` segments.
pub fn join_leading(segments: &[String], count: usize) -> String {
    segments.iter().take(count).map(String::as_str).collect()
}

/// Sum of the first two digit runs in `segment`, modulo 10; 0 without digits.
///
/// Only the last digit of a run affects a sum modulo 10, so runs of any length
/// are handled without parsing them as integers.
pub fn extract_n2(segment: &str) -> u8 {
    digit_run_regex()
        .find_iter(segment)
        .take(2)
        .filter_map(|run| run.as_str().bytes().last())
        .map(|digit| digit - b'0')
        .fold(0, |acc, digit| (acc + digit) % 10)
}

/// Second digit of the first "digit immediately followed by digit" match.
pub fn first_digit_pair(code: &str) -> Option<char> {
    digit_pair_regex()
        .captures(code)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
}

/// Position value of a revision token.
///
/// Blank or missing tokens are 1, purely numeric tokens are their integer
/// value, tokens starting with an ASCII letter map to that letter's alphabet
/// position (`A` = 1) and anything else is 1. Returns `None` only when a
/// numeric token does not fit in a `u64`.
pub fn alpha_to_pos(token: Option<&str>) -> Option<u64> {
    let token = match token.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Some(1),
    };

    if token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse().ok();
    }

    match token.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => {
            Some(u64::from(first.to_ascii_uppercase() as u8 - b'A') + 1)
        }
        _ => Some(1),
    }
}
