//! Line-based output comparison.
//!
//! Both texts are split into lines, every line is trimmed and lines that end
//! up empty are dropped. What remains must match exactly and in order, so the
//! comparison ignores trailing whitespace, blank-line padding and `\r\n` vs
//! `\n`, but still cares about token order, casing and number formatting.

use std::fmt;

use itertools::{EitherOrBoth, Itertools};

pub fn normalize(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn matches(expected: &str, actual: &str) -> bool {
    first_mismatch(expected, actual).is_none()
}

/// First normalized line where the two texts disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// Index into the normalized line sequence.
    pub line: usize,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |line: &Option<String>| match line {
            Some(line) => format!("{line:?}"),
            None => "<end of output>".to_string(),
        };
        write!(
            f,
            "line {}: expected {}, got {}",
            self.line + 1,
            show(&self.expected),
            show(&self.actual)
        )
    }
}

pub fn first_mismatch(expected: &str, actual: &str) -> Option<Mismatch> {
    normalize(expected)
        .into_iter()
        .zip_longest(normalize(actual))
        .enumerate()
        .find_map(|(line, pair)| match pair {
            EitherOrBoth::Both(e, a) if e == a => None,
            EitherOrBoth::Both(e, a) => Some(Mismatch {
                line,
                expected: Some(e.to_string()),
                actual: Some(a.to_string()),
            }),
            EitherOrBoth::Left(e) => Some(Mismatch {
                line,
                expected: Some(e.to_string()),
                actual: None,
            }),
            EitherOrBoth::Right(a) => Some(Mismatch {
                line,
                expected: None,
                actual: Some(a.to_string()),
            }),
        })
}
