//! Narrow grammars for perception replies.
//!
//! Every reply is untrusted free text. Each parser accepts exactly one shape
//! and reports anything else as a mismatch; callers pick the safe default.
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::errors::{TinderError, TinderResult};
use crate::vision::types::{ResourceCount, SlotIndex};

const AFFIRMATIVE: &str = "yes";

fn signed_integer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+$").expect("valid regex"))
}

fn unsigned_integer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("valid regex"))
}

fn json_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// A single signed integer, nothing else besides surrounding whitespace.
pub fn parse_integer(text: &str) -> TinderResult<i64> {
    let trimmed = text.trim();
    if !signed_integer().is_match(trimmed) {
        return Err(TinderError::PerceptionParse(format!("expected an integer, got {:?}", truncate(trimmed, 40))));
    }
    trimmed
        .parse::<i64>()
        .map_err(|e| TinderError::PerceptionParse(e.to_string()))
}

/// Slot answer: `-1`, any mismatch, or an out-of-range value is `None`.
pub fn parse_slot(text: &str, slot_count: u32) -> Option<SlotIndex> {
    let raw = parse_integer(text).ok()?;
    SlotIndex::new(raw, slot_count)
}

/// Count answer: a single non-negative integer, otherwise `Unknown`.
pub fn parse_count(text: &str) -> ResourceCount {
    let trimmed = text.trim();
    if !unsigned_integer().is_match(trimmed) {
        return ResourceCount::Unknown;
    }
    trimmed
        .parse::<u32>()
        .map(ResourceCount::Known)
        .unwrap_or(ResourceCount::Unknown)
}

/// Case-insensitive presence of the affirmative token anywhere in the text.
pub fn parse_affirmative(text: &str) -> bool {
    text.to_lowercase().contains(AFFIRMATIVE)
}

/// A JSON object of a known schema. Tolerates prose or code fences around
/// the object, never a different schema.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> TinderResult<T> {
    if let Ok(value) = serde_json::from_str::<T>(text.trim()) {
        return Ok(value);
    }
    let object = json_object()
        .find(text)
        .ok_or_else(|| TinderError::PerceptionParse("no JSON object in reply".into()))?;
    serde_json::from_str::<T>(object.as_str()).map_err(|e| TinderError::PerceptionParse(e.to_string()))
}

/// Shorten provider text for log lines.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}
