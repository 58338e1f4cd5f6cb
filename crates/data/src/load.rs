use crate::schema::candidate_from_payload;
use anyhow::Context;
use inkdeck_core::{BuildConfig, CardCandidate};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const BUILD_CONFIG_FILE: &str = "build_config.json";

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

/// Reads `build_config.json` from `dir`. A missing file means defaults;
/// sections left out of the file keep their defaults too.
pub fn load_build_config(dir: &Path) -> anyhow::Result<BuildConfig> {
    let path = dir.join(BUILD_CONFIG_FILE);
    if !path.exists() {
        return Ok(BuildConfig::default());
    }
    load_json(&path)
}

/// Reads a JSON array of raw card payloads, skipping entries that cannot
/// be mapped and returning their errors alongside.
pub fn load_candidates(path: &Path) -> anyhow::Result<(Vec<CardCandidate>, Vec<String>)> {
    let payloads: Vec<serde_json::Value> = load_json(path)?;
    let mut cards = Vec::with_capacity(payloads.len());
    let mut warnings = Vec::new();
    for (idx, payload) in payloads.iter().enumerate() {
        match candidate_from_payload(payload) {
            Ok(card) => cards.push(card),
            Err(err) => warnings.push(format!("entry {idx}: {err:#}")),
        }
    }
    Ok((cards, warnings))
}
