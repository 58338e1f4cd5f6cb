//! Validating parsers for text-generation replies.
//!
//! Replies are untrusted: they may carry prose around the payload, code
//! fences, or keys in any case. Extraction takes the first balanced
//! bracket-matched span (string-literal aware) and parses only that. Name
//! lists are the exception: prose often brackets words, so every `[` span
//! is tried in turn.

use crate::{Identity, Ink};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplyError {
    #[error("no JSON payload in reply")]
    NoPayload,
    #[error("malformed JSON payload: {0}")]
    InvalidJson(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// First balanced `open`..`close` span of `text`, ignoring brackets inside
/// string literals.
pub fn extract_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + ch.len_utf8();
                return Some(&text[start..end]);
            }
        }
    }
    None
}

/// Balanced spans starting at each `open` in turn.
fn balanced_spans(text: &str, open: char, close: char) -> impl Iterator<Item = &str> {
    text.match_indices(open)
        .filter_map(move |(start, _)| extract_balanced(&text[start..], open, close))
}

pub fn parse_first_object(text: &str) -> Result<Map<String, Value>, ReplyError> {
    let raw = extract_balanced(text, '{', '}').ok_or(ReplyError::NoPayload)?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ReplyError::NoPayload),
        Err(err) => Err(ReplyError::InvalidJson(err.to_string())),
    }
}

/// Case-insensitive field lookup trying each alias in turn.
pub fn field_ci<'a>(map: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(alias))
            .map(|(_, value)| value)
    })
}

fn string_items(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Object(map) => field_ci(map, &["name"])
                .and_then(Value::as_str)
                .map(|text| text.trim().to_string()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect()
}

/// Accepts only a reply naming exactly two distinct canonical inks.
pub fn parse_identity_reply(text: &str) -> Result<Identity, ReplyError> {
    let map = parse_first_object(text)?;
    let value = field_ci(&map, &["inks", "colors", "colours"])
        .ok_or(ReplyError::MissingField("inks"))?;
    let names = string_items(value);
    let mut inks = BTreeSet::new();
    for name in &names {
        let ink = Ink::from_name(name)
            .ok_or_else(|| ReplyError::InvalidValue(format!("unknown ink {name:?}")))?;
        inks.insert(ink);
    }
    if inks.len() != 2 || names.len() != 2 {
        return Err(ReplyError::InvalidValue(format!(
            "expected two distinct inks, got {names:?}"
        )));
    }
    Identity::new(inks).ok_or(ReplyError::MissingField("inks"))
}

/// Names from the first bracketed span that parses as a JSON array holding
/// names, or from a `cards`/`names` field of the first object.
pub fn parse_name_list(text: &str) -> Result<Vec<String>, ReplyError> {
    let listed = balanced_spans(text, '[', ']')
        .filter_map(|raw| match serde_json::from_str(raw) {
            Ok(value @ Value::Array(_)) => Some(string_items(&value)),
            _ => None,
        })
        .find(|names| !names.is_empty());
    if let Some(names) = listed {
        return Ok(names);
    }
    let map = parse_first_object(text)?;
    let value = field_ci(&map, &["cards", "names", "synergy"])
        .ok_or(ReplyError::MissingField("cards"))?;
    Ok(string_items(value))
}

/// One turn of the iterative builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AgentAction {
    Search { query: String },
    AddCards { cards: Vec<(String, u32)> },
    Finalize,
}

impl AgentAction {
    pub fn parse(text: &str) -> Result<Self, ReplyError> {
        let map = parse_first_object(text)?;
        let action = field_ci(&map, &["action", "type"])
            .and_then(Value::as_str)
            .ok_or(ReplyError::MissingField("action"))?
            .trim()
            .to_ascii_lowercase()
            .replace('-', "_");
        match action.as_str() {
            "search" => {
                let query = field_ci(&map, &["query", "text"])
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|query| !query.is_empty())
                    .ok_or(ReplyError::MissingField("query"))?;
                Ok(Self::Search {
                    query: query.to_string(),
                })
            }
            "add" | "add_cards" | "add_items" => {
                let items = field_ci(&map, &["cards", "items"])
                    .and_then(Value::as_array)
                    .ok_or(ReplyError::MissingField("cards"))?;
                let mut cards = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Object(entry) = item else {
                        return Err(ReplyError::InvalidValue(item.to_string()));
                    };
                    let name = field_ci(entry, &["name"])
                        .and_then(Value::as_str)
                        .ok_or(ReplyError::MissingField("name"))?;
                    let count = field_ci(entry, &["count", "copies"])
                        .and_then(Value::as_u64)
                        .unwrap_or(1);
                    cards.push((name.trim().to_string(), count.min(u32::MAX as u64) as u32));
                }
                Ok(Self::AddCards { cards })
            }
            "finalize" | "finish" | "done" => Ok(Self::Finalize),
            other => Err(ReplyError::InvalidValue(format!("unknown action {other:?}"))),
        }
    }
}
