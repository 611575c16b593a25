use serde::{Deserialize, Serialize};

use crate::cultural::{CulturalAlert, Severity};
use crate::scoring::{FusedSignals, TpbScores};
use crate::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformFactors {
    pub instagram: f64,
    pub youtube: f64,
    pub tiktok: f64,
    pub twitter: f64,
}

impl Default for PlatformFactors {
    fn default() -> Self {
        Self {
            instagram: 1.05,
            youtube: 1.0,
            tiktok: 1.10,
            twitter: 1.05,
        }
    }
}

impl PlatformFactors {
    pub fn for_platform(&self, platform: Platform) -> f64 {
        match platform {
            Platform::Instagram => self.instagram,
            Platform::YouTube => self.youtube,
            Platform::TikTok => self.tiktok,
            Platform::Twitter => self.twitter,
        }
    }
}

/// Surface statistics of the raw caption used by the fatigue model.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ContentStats {
    pub word_count: usize,
    pub hashtag_count: usize,
}

impl ContentStats {
    pub fn from_caption(caption: &str) -> Self {
        Self {
            word_count: caption.split_whitespace().count(),
            hashtag_count: caption.matches('#').count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    VeryHigh,
    High,
    Moderate,
    Low,
    VeryLow,
    Critical,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::VeryHigh => "very_high",
            Band::High => "high",
            Band::Moderate => "moderate",
            Band::Low => "low",
            Band::VeryLow => "very_low",
            Band::Critical => "critical",
        }
    }

    fn potential(score: f64) -> Self {
        if score >= 75.0 {
            Band::VeryHigh
        } else if score >= 60.0 {
            Band::High
        } else if score >= 45.0 {
            Band::Moderate
        } else if score >= 30.0 {
            Band::Low
        } else {
            Band::VeryLow
        }
    }

    fn backlash(score: f64) -> Self {
        if score >= 70.0 {
            Band::Critical
        } else if score >= 50.0 {
            Band::High
        } else if score >= 30.0 {
            Band::Moderate
        } else if score >= 15.0 {
            Band::Low
        } else {
            Band::VeryLow
        }
    }

    fn fatigue(score: f64) -> Self {
        if score >= 70.0 {
            Band::Critical
        } else if score >= 55.0 {
            Band::High
        } else if score >= 40.0 {
            Band::Moderate
        } else if score >= 25.0 {
            Band::Low
        } else {
            Band::VeryLow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposurePattern {
    ControversialViral,
    PositiveViral,
    Controversial,
    Normal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeScores {
    pub virality: f64,
    pub virality_band: Band,
    pub backlash_risk: f64,
    pub backlash_band: Band,
    pub backlash_risk_factors: Vec<String>,
    pub exposure_intensity: f64,
    pub exposure_band: Band,
    pub exposure_pattern: ExposurePattern,
    pub ad_fatigue_risk: f64,
    pub fatigue_band: Band,
}

impl OutcomeScores {
    /// False when any score is NaN or infinite.
    pub fn is_well_formed(&self) -> bool {
        [
            self.virality,
            self.backlash_risk,
            self.ad_fatigue_risk,
            self.exposure_intensity,
        ]
        .iter()
        .all(|value| value.is_finite())
    }
}

#[derive(Debug, Clone)]
pub struct OutcomePredictor {
    platforms: PlatformFactors,
}

impl OutcomePredictor {
    pub fn new(platforms: PlatformFactors) -> Self {
        Self { platforms }
    }

    pub fn virality(&self, tpb: &TpbScores, fused: &FusedSignals, platform: Platform) -> f64 {
        let polarity = fused.polarity;
        let mut score = tpb.behavioral_intention * 0.7;
        score += (fused.emotions.len() as f64 * 3.0).min(15.0);
        score += (fused.emc - 50.0).max(0.0) * 0.1;
        if polarity.abs() > 0.5 {
            score += 8.0;
        }
        if polarity > 0.6 {
            score += 12.0;
        } else if polarity > 0.3 {
            score += 8.0;
        }
        if polarity < -0.6 {
            score -= 18.0;
        } else if polarity < -0.3 {
            score -= 10.0;
        }
        crate::clamp_score(score * self.platforms.for_platform(platform))
    }

    pub fn backlash(
        &self,
        fused: &FusedSignals,
        intent: f64,
        alerts: &[CulturalAlert],
    ) -> (f64, Vec<String>) {
        let has_critical = alerts
            .iter()
            .any(|alert| alert.severity == Severity::Critical);
        let has_high = alerts.iter().any(|alert| alert.severity == Severity::High);
        let severity_multiplier = if has_critical {
            1.5
        } else if has_high {
            1.3
        } else {
            1.0
        };
        let cultural_risk = alerts.iter().map(|alert| alert.weight as f64).sum::<f64>()
            * severity_multiplier;
        let cultural_component = (cultural_risk / 150.0 * 100.0).min(100.0) * 0.30;

        let intent_risk = if intent < -50.0 {
            100.0
        } else if intent < -20.0 {
            80.0
        } else if intent < 0.0 {
            60.0
        } else if intent < 20.0 {
            40.0
        } else {
            20.0
        };
        let intent_component = intent_risk * 0.40;

        let emc_component = if fused.emc > 70.0 {
            (fused.emc - 70.0) / 30.0 * 100.0 * 0.15
        } else {
            0.0
        };
        let sentiment_component = if fused.polarity < 0.0 {
            fused.polarity.abs() * 100.0 * 0.15
        } else {
            0.0
        };

        let mut factors = Vec::new();
        if cultural_risk > 30.0 {
            factors.push("cultural_risk".to_string());
        }
        if intent < -20.0 {
            factors.push("manipulative_intent".to_string());
        }
        if fused.emc > 70.0 {
            factors.push("excessive_emc".to_string());
        }
        if fused.polarity < -0.3 {
            factors.push("negative_sentiment".to_string());
        }
        if has_critical {
            factors.push("critical_alert".to_string());
        }
        if fused.subjectivity > 0.85 {
            factors.push("high_subjectivity".to_string());
        }

        let mut backlash =
            cultural_component + intent_component + emc_component + sentiment_component;
        if factors.len() >= 3 {
            backlash *= 1.3;
        }
        (crate::clamp_score(backlash), factors)
    }

    pub fn ad_fatigue(&self, exposure: f64, stats: ContentStats, subjectivity: f64) -> f64 {
        let mut fatigue = 30.0;
        if stats.word_count > 100 {
            fatigue += 25.0;
        } else if stats.word_count > 50 {
            fatigue += 15.0;
        }
        fatigue += stats.hashtag_count.saturating_sub(5) as f64 * 2.0;
        if subjectivity > 0.7 {
            fatigue += 20.0;
        }
        fatigue += exposure * 0.3;
        crate::clamp_score(fatigue)
    }

    pub fn predict(
        &self,
        tpb: &TpbScores,
        fused: &FusedSignals,
        intent: f64,
        alerts: &[CulturalAlert],
        stats: ContentStats,
        platform: Platform,
    ) -> OutcomeScores {
        let virality = self.virality(tpb, fused, platform);
        let (backlash_risk, backlash_risk_factors) = self.backlash(fused, intent, alerts);

        let exposure_intensity = crate::clamp_score(virality * 0.6 + backlash_risk * 0.4);
        let exposure_pattern = if virality > 60.0 && backlash_risk > 60.0 {
            ExposurePattern::ControversialViral
        } else if virality > 60.0 {
            ExposurePattern::PositiveViral
        } else if backlash_risk > 60.0 {
            ExposurePattern::Controversial
        } else {
            ExposurePattern::Normal
        };
        let ad_fatigue_risk = self.ad_fatigue(exposure_intensity, stats, fused.subjectivity);

        OutcomeScores {
            virality,
            virality_band: Band::potential(virality),
            backlash_risk,
            backlash_band: Band::backlash(backlash_risk),
            backlash_risk_factors,
            exposure_intensity,
            exposure_band: Band::potential(exposure_intensity),
            exposure_pattern,
            ad_fatigue_risk,
            fatigue_band: Band::fatigue(ad_fatigue_risk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cultural::AlertSource;
    use crate::scoring::{AnalysisMode, RiskSource, TpbWeights};
    use crate::text::Emotion;

    fn fused(polarity: f64, subjectivity: f64, emc: f64, emotions: Vec<Emotion>) -> FusedSignals {
        FusedSignals {
            mode: AnalysisMode::TextOnly,
            emc,
            nam: 0.0,
            scs: 0.0,
            text_emc: emc,
            text_scs: 0.0,
            image_emc: None,
            image_scs: None,
            polarity,
            subjectivity,
            emotions,
            modality_agreement: 0.0,
            cultural_symbols: Vec::new(),
            primary_risk_source: RiskSource::Text,
            conflict: false,
        }
    }

    fn alert(weight: u32, severity: Severity) -> CulturalAlert {
        CulturalAlert {
            keyword: "fair skin".to_string(),
            category: "Colorism".to_string(),
            severity,
            weight,
            message: String::new(),
            source: AlertSource::Text,
        }
    }

    #[test]
    fn authentic_post_has_low_backlash() {
        let predictor = OutcomePredictor::new(PlatformFactors::default());
        let signals = fused(0.5618, 0.5, 42.99, vec![Emotion::Joy, Emotion::Pride]);
        let tpb = TpbScores::from_components(&TpbWeights::default(), 84.79, 100.0, 70.0);
        let outcome = predictor.predict(
            &tpb,
            &signals,
            78.4,
            &[],
            ContentStats::default(),
            Platform::Instagram,
        );
        assert!((outcome.backlash_risk - 8.0).abs() < 1e-6);
        assert!(outcome.virality > 80.0);
        assert_eq!(outcome.exposure_pattern, ExposurePattern::PositiveViral);
        assert_eq!(outcome.backlash_band, Band::VeryLow);
    }

    #[test]
    fn compound_risk_factors_amplify_backlash() {
        let predictor = OutcomePredictor::new(PlatformFactors::default());
        let signals = fused(0.7175, 0.75, 53.5, vec![Emotion::Urgency]);
        let alerts = vec![
            alert(40, Severity::Critical),
            alert(40, Severity::Critical),
            alert(70, Severity::Critical),
        ];
        let (backlash, factors) = predictor.backlash(&signals, -31.74, &alerts);
        assert_eq!(factors.len(), 3);
        assert!((backlash - 80.6).abs() < 1e-6);
    }

    #[test]
    fn fatigue_penalises_length_and_hashtags() {
        let predictor = OutcomePredictor::new(PlatformFactors::default());
        let stats = ContentStats {
            word_count: 120,
            hashtag_count: 9,
        };
        let fatigue = predictor.ad_fatigue(50.0, stats, 0.8);
        assert!((fatigue - (30.0 + 25.0 + 8.0 + 20.0 + 15.0)).abs() < 1e-6);
        let caption = ContentStats::from_caption("#one #two hello world");
        assert_eq!(caption.word_count, 4);
        assert_eq!(caption.hashtag_count, 2);
    }
}
