use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::Platform;

const HIGH_VIRALITY: f64 = 60.0;
const HIGH_BACKLASH: f64 = 50.0;

/// One past campaign as stored in the history table.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalCampaign {
    pub brand: String,
    pub campaign_name: String,
    pub platform: String,
    #[serde(default)]
    pub backlash_occurred: bool,
    pub virality_score: f64,
    pub outcome: String,
    #[serde(default)]
    pub lessons_learned: String,
}

impl HistoricalCampaign {
    fn had_backlash(&self) -> bool {
        self.backlash_occurred || self.outcome.eq_ignore_ascii_case("backlash")
    }
}

/// A past campaign whose outcome profile resembles the analyzed one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarCampaign {
    pub brand: String,
    pub campaign: String,
    pub outcome: String,
    pub lesson: String,
    /// 0, 50 or 100: one half each for matching virality and backlash profile.
    pub similarity: u8,
}

#[derive(Debug, Clone)]
struct Entry {
    platform: Platform,
    campaign: HistoricalCampaign,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignHistory {
    entries: Vec<Entry>,
}

impl CampaignHistory {
    pub async fn load(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|err| {
            format!("failed to read campaign history {}: {}", path.display(), err)
        })?;
        let campaigns: Vec<HistoricalCampaign> = serde_json::from_str(&contents)
            .map_err(|err| format!("failed to parse campaign history: {}", err))?;
        let history = Self::from_campaigns(campaigns)?;
        info!(count = history.len(), path = %path.display(), "loaded campaign history");
        Ok(history)
    }

    pub fn from_campaigns(campaigns: Vec<HistoricalCampaign>) -> Result<Self, String> {
        if campaigns.is_empty() {
            return Err("campaign history is empty".to_string());
        }
        let mut entries = Vec::with_capacity(campaigns.len());
        for campaign in campaigns {
            let platform = Platform::from_str(&campaign.platform).ok_or_else(|| {
                format!(
                    "unknown platform {:?} for campaign {:?}",
                    campaign.platform, campaign.campaign_name
                )
            })?;
            if !campaign.virality_score.is_finite() {
                return Err(format!(
                    "campaign {:?} has a non-numeric virality score",
                    campaign.campaign_name
                ));
            }
            entries.push(Entry { platform, campaign });
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `limit` campaigns on the same platform, best match first.
    /// Ties keep table order.
    pub fn similar(
        &self,
        platform: Platform,
        virality: f64,
        backlash: f64,
        limit: usize,
    ) -> Vec<SimilarCampaign> {
        let high_virality = virality >= HIGH_VIRALITY;
        let high_backlash = backlash >= HIGH_BACKLASH;
        let mut ranked: Vec<(u8, &HistoricalCampaign)> = self
            .entries
            .iter()
            .filter(|entry| entry.platform == platform)
            .map(|entry| {
                let campaign = &entry.campaign;
                let mut similarity = 0;
                if (campaign.virality_score >= HIGH_VIRALITY) == high_virality {
                    similarity += 50;
                }
                if campaign.had_backlash() == high_backlash {
                    similarity += 50;
                }
                (similarity, campaign)
            })
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked
            .into_iter()
            .take(limit)
            .map(|(similarity, campaign)| SimilarCampaign {
                brand: campaign.brand.clone(),
                campaign: campaign.campaign_name.clone(),
                outcome: campaign.outcome.clone(),
                lesson: campaign.lessons_learned.clone(),
                similarity,
            })
            .collect()
    }
}
