use crate::domain::time::parse_expiration;
use crate::domain::{Label, TargetError};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TargetDefinition {
    pub id: String,
    #[serde(default)]
    pub expiration: Value,
}

impl TargetDefinition {
    pub fn into_label(self) -> Label {
        let expiration = parse_expiration(&self.expiration);
        Label::new(self.id, expiration)
    }
}

/// Turn definitions into labels, rejecting empty and repeated ids.
///
/// A bad `expiration` is not an error; it renders as expired.
pub fn build_labels(definitions: Vec<TargetDefinition>) -> Result<Vec<Label>, TargetError> {
    let mut seen = HashSet::new();
    let mut labels = Vec::with_capacity(definitions.len());

    for def in definitions {
        if def.id.trim().is_empty() {
            return Err(TargetError::InvalidDefinition(
                "target id must not be empty".to_string(),
            ));
        }
        if !seen.insert(def.id.clone()) {
            return Err(TargetError::DuplicateId(def.id));
        }
        labels.push(def.into_label());
    }

    Ok(labels)
}

pub fn parse_targets(content: &str) -> Result<Vec<Label>> {
    let definitions: Vec<TargetDefinition> =
        serde_json::from_str(content).context("Targets file must be a JSON array of targets")?;
    Ok(build_labels(definitions)?)
}

pub fn load_targets(path: &Path) -> Result<Vec<Label>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read targets from {}", path.display()))?;
    parse_targets(&content)
}
