use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::replace::ReplacementSet;

#[derive(Debug, Deserialize)]
struct RulesFile {
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    find: String,
    #[serde(default)]
    with: String,
}

/// Loads an ordered replacement set from a rules file, JSON or YAML by
/// extension. File order becomes application order.
pub fn load_rules(path: &Path) -> Result<ReplacementSet> {
    let data = fs::read(path).with_context(|| format!("reading rules {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let parsed: RulesFile = if is_json {
        serde_json::from_slice(&data)
            .with_context(|| format!("parsing rules {}", path.display()))?
    } else {
        serde_yaml::from_slice(&data)
            .with_context(|| format!("parsing rules {}", path.display()))?
    };
    let mut set = ReplacementSet::new();
    for rule in parsed.rules {
        set.push(&rule.find, &rule.with)
            .with_context(|| format!("invalid rule in {}", path.display()))?;
    }
    Ok(set)
}
