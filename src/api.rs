use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::CacheStats;
use crate::image::decode_image_payload;
use crate::persona::PersonaSummary;
use crate::{AnalysisOutcome, AnalysisReport, Analyzer, CampaignContent, Platform};

#[derive(Debug, Default, Deserialize)]
pub struct ApiAnalysisRequest {
    pub caption: Option<String>,
    /// Base64 or a `data:` URI.
    pub image: Option<String>,
    pub platform: Option<String>,
    #[serde(alias = "date")]
    pub posting_date: Option<String>,
    pub influencer: Option<bool>,
    #[serde(alias = "personas")]
    pub persona_ids: Option<Vec<String>>,
    pub request_id: Option<String>,
}

impl ApiAnalysisRequest {
    pub fn into_content(self) -> Result<CampaignContent, String> {
        let platform = match self.platform.as_deref().map(str::trim) {
            None | Some("") => Platform::Instagram,
            Some(value) => Platform::from_str(value).ok_or_else(|| {
                format!(
                    "invalid platform: {} (expected one of {})",
                    value,
                    Platform::ALL
                        .iter()
                        .map(|platform| platform.key())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })?,
        };

        let image = match self.image.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(payload) => Some(decode_image_payload(payload)?),
        };

        let persona_ids = self
            .persona_ids
            .unwrap_or_default()
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        Ok(CampaignContent {
            caption: self.caption.unwrap_or_default(),
            image,
            platform,
            posting_date: self
                .posting_date
                .map(|date| date.trim().to_string())
                .filter(|date| !date.is_empty()),
            influencer: self.influencer.unwrap_or(false),
            persona_ids,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalysisResponse {
    pub request_id: String,
    pub cached: bool,
    pub degraded: bool,
    #[serde(flatten)]
    pub report: Arc<AnalysisReport>,
}

impl ApiAnalysisResponse {
    pub fn from_outcome(outcome: AnalysisOutcome, request_id: String) -> Self {
        Self {
            request_id,
            cached: outcome.cached,
            degraded: outcome.degraded,
            report: outcome.report,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiPersonaList {
    pub total: usize,
    pub categories: Vec<String>,
    pub personas: Vec<PersonaSummary>,
}

/// Loaded table sizes and cache counters reported by the health endpoint.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub triggers: usize,
    pub trigger_categories: Vec<String>,
    pub festivals: usize,
    pub personas: usize,
    pub historical_campaigns: usize,
    pub image_enabled: bool,
    pub cache: CacheStats,
}

impl ApiHealth {
    pub async fn from_analyzer(analyzer: &Analyzer) -> Self {
        let cultural = analyzer.cultural();
        Self {
            status: "ok",
            triggers: cultural.triggers().len(),
            trigger_categories: cultural.triggers().categories(),
            festivals: cultural.calendar().festivals().len(),
            personas: analyzer.personas().len(),
            historical_campaigns: analyzer.history().len(),
            image_enabled: analyzer.image_enabled(),
            cache: analyzer.cache_stats().await,
        }
    }
}
