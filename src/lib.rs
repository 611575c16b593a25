pub mod analyzer;
pub mod api;
pub mod cache;
pub mod config;
pub mod cultural;
pub mod image;
pub mod persona;
pub mod scoring;
pub mod text;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

pub use analyzer::{AnalysisOutcome, AnalysisReport, Analyzer, Stage};
pub use config::AnalyzerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    YouTube,
    TikTok,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Instagram,
        Platform::YouTube,
        Platform::TikTok,
        Platform::Twitter,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "instagram" | "ig" | "insta" => Some(Platform::Instagram),
            "youtube" | "yt" => Some(Platform::YouTube),
            "tiktok" | "tik tok" => Some(Platform::TikTok),
            "twitter" | "x" => Some(Platform::Twitter),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::YouTube => "YouTube",
            Platform::TikTok => "TikTok",
            Platform::Twitter => "Twitter",
        }
    }

    /// Lowercase key used by persona platform-affinity maps.
    pub fn key(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::TikTok => "tiktok",
            Platform::Twitter => "twitter",
        }
    }
}

/// One campaign submitted for analysis. Created per request and never mutated by the pipeline.
#[derive(Debug, Clone)]
pub struct CampaignContent {
    pub caption: String,
    pub image: Option<Vec<u8>>,
    pub platform: Platform,
    /// `YYYY-MM-DD`; blank means no festival check.
    pub posting_date: Option<String>,
    pub influencer: bool,
    pub persona_ids: Vec<String>,
}

impl Default for CampaignContent {
    fn default() -> Self {
        Self {
            caption: String::new(),
            image: None,
            platform: Platform::Instagram,
            posting_date: None,
            influencer: false,
            persona_ids: Vec::new(),
        }
    }
}

impl CampaignContent {
    pub fn new(caption: impl Into<String>, platform: Platform) -> Self {
        Self {
            caption: caption.into(),
            platform,
            ..Self::default()
        }
    }

    pub fn has_caption(&self) -> bool {
        !self.caption.trim().is_empty()
    }

    pub fn has_image(&self) -> bool {
        self.image.as_ref().map(|bytes| !bytes.is_empty()).unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.has_caption() && !self.has_image() {
            return Err(AnalysisError::Validation(
                "at least one of caption or image must be provided".to_string(),
            ));
        }
        if let Some(date) = self.posting_date.as_deref().map(str::trim) {
            if !date.is_empty() && cultural::parse_posting_date(date).is_none() {
                return Err(AnalysisError::Validation(format!(
                    "posting date must be YYYY-MM-DD, got {:?}",
                    date
                )));
            }
        }
        for id in &self.persona_ids {
            if !is_valid_persona_id(id) {
                return Err(AnalysisError::Validation(format!(
                    "malformed persona id: {:?}",
                    id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("analysis failed: {0}")]
    Internal(String),
}

/// Persona ids are lowercase slugs such as `gen_z_metro`.
pub fn is_valid_persona_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 64
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-')
}

/// Clamps a 0-100 score. Non-finite values are logged and replaced by 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        warn!("NaN score clamped to 0");
        return 0.0;
    }
    value.max(0.0).min(100.0)
}

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

pub fn clamp_signed(value: f64, bound: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(-bound).min(bound)
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

pub fn normalize_text(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Appends suggestions that are not already present (case and whitespace insensitive),
/// keeping at most 10.
pub fn merge_suggestions(base: &mut Vec<String>, extras: &[String]) {
    let mut seen: HashSet<String> = base.iter().map(|s| normalize_text(s)).collect();
    for suggestion in extras {
        let normalized = normalize_text(suggestion);
        if normalized.is_empty() || seen.contains(&normalized) {
            continue;
        }
        base.push(suggestion.clone());
        seen.insert(normalized);
    }
    if base.len() > 10 {
        base.truncate(10);
    }
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parsing_is_case_insensitive() {
        assert_eq!(Platform::from_str("TikTok"), Some(Platform::TikTok));
        assert_eq!(Platform::from_str(" youtube "), Some(Platform::YouTube));
        assert_eq!(Platform::from_str("linkedin"), None);
    }

    #[test]
    fn merge_suggestions_dedups_and_caps() {
        let mut base = vec!["Keep it short".to_string()];
        let extras: Vec<String> = (0..12).map(|i| format!("tip {}", i)).collect();
        merge_suggestions(&mut base, &["keep  it SHORT".to_string()]);
        assert_eq!(base.len(), 1);
        merge_suggestions(&mut base, &extras);
        assert_eq!(base.len(), 10);
    }

    #[test]
    fn content_requires_caption_or_image() {
        let content = CampaignContent::new("   ", Platform::Twitter);
        assert!(content.validate().is_err());
        let mut with_image = content.clone();
        with_image.image = Some(vec![1, 2, 3]);
        assert!(with_image.validate().is_ok());
    }

    #[test]
    fn malformed_dates_and_persona_ids_are_rejected() {
        let mut content = CampaignContent::new("New drop", Platform::Instagram);
        content.posting_date = Some("23/09/2025".to_string());
        assert!(matches!(content.validate(), Err(AnalysisError::Validation(_))));
        content.posting_date = Some(" ".to_string());
        assert!(content.validate().is_ok());
        content.persona_ids = vec!["Gen Z!".to_string()];
        assert!(content.validate().is_err());
    }

    #[test]
    fn clamp_score_handles_nan() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(140.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
    }
}
