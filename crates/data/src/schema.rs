//! Mapping of raw search-index payloads onto `CardCandidate`.
//!
//! Payloads come from whatever ingestion filled the index, so field names
//! are matched case-insensitively with a few aliases and scalar fields
//! accept either their native JSON type or a string rendering.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use inkdeck_core::{field_ci, CardCandidate, Format, FormatWindow, Ink, DEFAULT_MAX_COPIES};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const NAME_FIELDS: &[&str] = &["name", "full_name", "fullName", "title"];
const COST_FIELDS: &[&str] = &["cost", "ink_cost", "inkCost"];
const INK_FIELDS: &[&str] = &["inks", "ink", "colors", "color"];
const INKABLE_FIELDS: &[&str] = &["inkable", "inkwell", "usable_as_resource"];
const TEXT_FIELDS: &[&str] = &["text", "body_text", "ability_text", "abilities"];
const SUBTYPE_FIELDS: &[&str] = &["subtypes", "classifications", "traits"];
const MAX_COPIES_FIELDS: &[&str] = &["max_copies", "maxCopies", "copy_limit"];
const LINK_FIELDS: &[&str] = &["link", "url", "image"];
const LEGALITY_FIELDS: &[&str] = &["legality", "legalities", "formats"];

fn as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Value::String(text) => text
            .split(|ch| ch == ',' || ch == '/' || ch == ';')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_u64().map(|n| n != 0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "inkable" => Some(true),
            "false" | "no" | "0" | "uninkable" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_date(value: Option<&Value>) -> anyhow::Result<Option<NaiveDate>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => {
            let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .with_context(|| format!("parse date {text:?}"))?;
            Ok(Some(date))
        }
        Some(other) => bail!("unexpected date value {other}"),
    }
}

fn window(format: Format, bounds: &Value) -> anyhow::Result<Option<FormatWindow>> {
    match bounds {
        Value::Bool(false) => Ok(None),
        Value::Bool(true) | Value::Null => Ok(Some(FormatWindow::unbounded(format))),
        Value::String(status) if status.eq_ignore_ascii_case("legal") => {
            Ok(Some(FormatWindow::unbounded(format)))
        }
        Value::String(_) => Ok(None),
        Value::Object(map) => Ok(Some(FormatWindow {
            format,
            from: as_date(field_ci(map, &["from", "start", "legal_from"]))?,
            until: as_date(field_ci(map, &["until", "end", "legal_until"]))?,
        })),
        other => bail!("unexpected legality value {other}"),
    }
}

/// Accepts `{"core": true, "infinity": {"from": ..., "until": ...}}`, a
/// list of `{"format": ..., "from": ..., "until": ...}`, or a plain list of
/// format names a card is legal in. Unknown formats are ignored. `None`
/// means the payload carried no legality data at all.
fn parse_legality(value: &Value) -> anyhow::Result<Option<Vec<FormatWindow>>> {
    let mut windows = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, bounds) in map {
                let Some(format) = Format::from_name(key) else {
                    continue;
                };
                if let Some(window) = window(format, bounds)? {
                    windows.push(window);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let format = match item {
                    Value::String(name) => Format::from_name(name),
                    Value::Object(map) => field_ci(map, &["format", "name"])
                        .and_then(Value::as_str)
                        .and_then(Format::from_name),
                    other => bail!("unexpected legality entry {other}"),
                };
                let Some(format) = format else {
                    continue;
                };
                let window = match item {
                    Value::Object(_) => window(format, item)?,
                    _ => Some(FormatWindow::unbounded(format)),
                };
                if let Some(window) = window {
                    windows.push(window);
                }
            }
        }
        Value::String(_) => {
            for name in as_text_list(value) {
                if let Some(format) = Format::from_name(&name) {
                    windows.push(FormatWindow::unbounded(format));
                }
            }
        }
        Value::Null => return Ok(None),
        other => bail!("unexpected legality value {other}"),
    }
    Ok(Some(windows))
}

pub fn candidate_from_map(map: &Map<String, Value>) -> anyhow::Result<CardCandidate> {
    let name = field_ci(map, NAME_FIELDS)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .context("payload has no name")?
        .to_string();

    let mut inks = BTreeSet::new();
    for raw in field_ci(map, INK_FIELDS).map(as_text_list).unwrap_or_default() {
        let ink = Ink::from_name(&raw).with_context(|| format!("{name}: unknown ink {raw:?}"))?;
        inks.insert(ink);
    }
    if inks.is_empty() {
        bail!("{name}: payload has no ink");
    }

    let legality = match field_ci(map, LEGALITY_FIELDS) {
        Some(value) => parse_legality(value).with_context(|| format!("{name}: legality"))?,
        None => None,
    };

    Ok(CardCandidate {
        cost: field_ci(map, COST_FIELDS).and_then(as_u32),
        inks,
        inkable: field_ci(map, INKABLE_FIELDS)
            .and_then(as_bool)
            .unwrap_or(false),
        text: field_ci(map, TEXT_FIELDS)
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => as_text_list(other).join(" "),
            })
            .unwrap_or_default(),
        subtypes: field_ci(map, SUBTYPE_FIELDS)
            .map(as_text_list)
            .unwrap_or_default()
            .into_iter()
            .collect(),
        max_copies: field_ci(map, MAX_COPIES_FIELDS)
            .and_then(as_u32)
            .filter(|max| *max > 0)
            .unwrap_or(DEFAULT_MAX_COPIES),
        link: field_ci(map, LINK_FIELDS)
            .and_then(Value::as_str)
            .map(str::to_string),
        legality,
        name,
    })
}

pub fn candidate_from_payload(payload: &Value) -> anyhow::Result<CardCandidate> {
    match payload {
        Value::Object(map) => candidate_from_map(map),
        other => bail!("payload is not an object: {other}"),
    }
}
