//! Text-level cleanup applied to a dump before tokenization.
//!
//! Removes constructs the state machine cannot skip on its own: line comments,
//! dollar-quoted function bodies, volatile `now()` / `timezone(...)` calls whose
//! brackets would confuse column-block tracking, and every `CONSTRAINT` clause
//! that is not a `<table>_pkey` primary key. String literals are matched first
//! and blanked to `''`, so text inside them never reaches the other rules or
//! the tokenizer.

use regex::bytes::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Deepest bracket nesting matched inside a removed call or constraint.
const MAX_NESTING: usize = 4;

/// Dollar-quote tags removed with their body. pg_dump picks `$$`, then pads
/// with underscores until the tag does not occur in the body.
const DOLLAR_TAGS: &[&str] = &[
    "", "_", "__", "___", "____", "_____", "body", "function", "func", "procedure", "proc",
];

/// Standard (`'it''s'`) and escape (`E'it\'s'`) string literals.
const LITERAL: &str = r"\b[eE]'(?:[^'\\]|\\(?s:.)|'')*'|'(?:[^']|'')*'";

/// One alternation so all removals happen in a single left-to-right pass.
static NOISE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let group = bracketed(MAX_NESTING);
    let mut pattern = vec![
        format!("(?i)(?P<literal>{LITERAL})"),
        r"--[^\n]*".to_string(),
    ];
    pattern.extend(
        DOLLAR_TAGS
            .iter()
            .map(|tag| format!(r"\${tag}\$(?s:.*?)\${tag}\$")),
    );
    pattern.push(format!(r"\b(?:timezone|now){group}"));
    pattern.push(format!(
        r#"\bconstraint\s+(?P<name>"?[\w.$]+"?)(?:{LITERAL}|[^(),;']|{group})*"#
    ));
    Regex::new(&pattern.join("|")).expect("valid regex")
});

/// A balanced `( ... )` group nested at most `depth` levels deep. Brackets
/// inside quoted literals do not count.
fn bracketed(depth: usize) -> String {
    let quoted = r"'(?:[^']|'')*'";
    (1..depth).fold(format!(r"\((?:{quoted}|[^()'])*\)"), |inner, _| {
        format!(r"\((?:{quoted}|[^()']|{inner})*\)")
    })
}

/// Strip noise from `input`. Never fails; returns the input untouched when
/// nothing matched.
pub fn sanitize(input: &[u8]) -> Cow<'_, [u8]> {
    NOISE_REGEX.replace_all(input, |caps: &Captures<'_>| {
        if caps.name("literal").is_some() {
            return b"''".to_vec();
        }
        match caps.name("name") {
            Some(name) if is_primary_key_name(name.as_bytes()) => caps[0].to_vec(),
            _ => Vec::new(),
        }
    })
}

fn is_primary_key_name(name: &[u8]) -> bool {
    let name: Vec<u8> = name
        .iter()
        .filter(|byte| **byte != b'"')
        .map(u8::to_ascii_lowercase)
        .collect();
    name.len() > "_pkey".len() && name.ends_with(b"_pkey")
}
