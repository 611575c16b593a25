use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::{AlertSource, CulturalAlert, Severity};

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerEntry {
    pub keyword: String,
    pub category: String,
    pub severity: String,
    pub risk_weight: u32,
    pub alert_message: String,
}

struct CompiledTrigger {
    entry: TriggerEntry,
    severity: Severity,
    pattern: Regex,
}

/// Keyword table compiled to word-boundary patterns once at load time.
pub struct TriggerTable {
    triggers: Vec<CompiledTrigger>,
}

impl TriggerTable {
    pub async fn load(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|err| {
            format!("failed to read trigger table {}: {}", path.display(), err)
        })?;
        let entries: Vec<TriggerEntry> = serde_json::from_str(&contents)
            .map_err(|err| format!("failed to parse trigger table: {}", err))?;
        let table = Self::from_entries(entries)?;
        info!(count = table.len(), path = %path.display(), "loaded cultural triggers");
        Ok(table)
    }

    pub fn from_entries(entries: Vec<TriggerEntry>) -> Result<Self, String> {
        if entries.is_empty() {
            return Err("trigger table is empty".to_string());
        }
        let mut triggers = Vec::with_capacity(entries.len());
        for entry in entries {
            let keyword = crate::text::matching_text(entry.keyword.trim());
            if keyword.is_empty() {
                return Err("trigger table contains an empty keyword".to_string());
            }
            let severity = Severity::from_str(&entry.severity).ok_or_else(|| {
                format!(
                    "unknown severity {:?} for trigger {:?}",
                    entry.severity, entry.keyword
                )
            })?;
            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&keyword)))
                .map_err(|err| format!("invalid trigger {:?}: {}", entry.keyword, err))?;
            triggers.push(CompiledTrigger {
                entry,
                severity,
                pattern,
            });
        }
        Ok(Self { triggers })
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .triggers
            .iter()
            .map(|trigger| trigger.entry.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// One alert per distinct table entry found in `text` (already lowercased).
    pub fn detect(&self, text: &str) -> Vec<CulturalAlert> {
        self.triggers
            .iter()
            .filter(|trigger| trigger.pattern.is_match(text))
            .map(|trigger| CulturalAlert {
                keyword: trigger.entry.keyword.clone(),
                category: trigger.entry.category.clone(),
                severity: trigger.severity,
                weight: trigger.entry.risk_weight,
                message: trigger.entry.alert_message.clone(),
                source: AlertSource::Text,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(keyword: &str, severity: &str, weight: u32) -> TriggerEntry {
        TriggerEntry {
            keyword: keyword.to_string(),
            category: "Religious".to_string(),
            severity: severity.to_string(),
            risk_weight: weight,
            alert_message: format!("{} is sensitive", keyword),
        }
    }

    #[test]
    fn matches_whole_words_only() {
        let table = TriggerTable::from_entries(vec![entry("beef", "critical", 40)]).expect("table");
        assert_eq!(table.detect("try our beef burger").len(), 1);
        assert!(table.detect("beefy gains").is_empty());
    }

    #[test]
    fn duplicate_mentions_collapse_to_one_alert() {
        let table = TriggerTable::from_entries(vec![entry("pork", "high", 30)]).expect("table");
        assert_eq!(table.detect("pork ribs and pork belly").len(), 1);
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(TriggerTable::from_entries(Vec::new()).is_err());
        assert!(TriggerTable::from_entries(vec![entry("x", "spicy", 5)]).is_err());
    }
}
