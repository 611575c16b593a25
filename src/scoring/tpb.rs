use serde::{Deserialize, Serialize};

use crate::scoring::FusedSignals;
use crate::text::Emotion;
use crate::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TpbWeights {
    pub attitude: f64,
    pub subjective_norms: f64,
    pub perceived_control: f64,
}

impl Default for TpbWeights {
    fn default() -> Self {
        Self {
            attitude: 0.40,
            subjective_norms: 0.35,
            perceived_control: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMultipliers {
    pub instagram: f64,
    pub youtube: f64,
    pub tiktok: f64,
    pub twitter: f64,
}

impl Default for PlatformMultipliers {
    fn default() -> Self {
        Self {
            instagram: 1.3,
            youtube: 1.0,
            tiktok: 1.4,
            twitter: 1.2,
        }
    }
}

impl PlatformMultipliers {
    pub fn for_platform(&self, platform: Platform) -> f64 {
        match platform {
            Platform::Instagram => self.instagram,
            Platform::YouTube => self.youtube,
            Platform::TikTok => self.tiktok,
            Platform::Twitter => self.twitter,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TpbScores {
    pub attitude: f64,
    pub subjective_norms: f64,
    pub perceived_control: f64,
    pub behavioral_intention: f64,
}

impl TpbScores {
    /// Clamps each component and recombines them into behavioral intention.
    pub fn from_components(
        weights: &TpbWeights,
        attitude: f64,
        subjective_norms: f64,
        perceived_control: f64,
    ) -> Self {
        let attitude = crate::clamp_score(attitude);
        let subjective_norms = crate::clamp_score(subjective_norms);
        let perceived_control = crate::clamp_score(perceived_control);
        let behavioral_intention = crate::clamp_score(
            attitude * weights.attitude
                + subjective_norms * weights.subjective_norms
                + perceived_control * weights.perceived_control,
        );
        Self {
            attitude,
            subjective_norms,
            perceived_control,
            behavioral_intention,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TpbScorer {
    weights: TpbWeights,
    platforms: PlatformMultipliers,
}

impl TpbScorer {
    pub fn new(weights: TpbWeights, platforms: PlatformMultipliers) -> Self {
        Self { weights, platforms }
    }

    pub fn weights(&self) -> &TpbWeights {
        &self.weights
    }

    pub fn attitude(&self, fused: &FusedSignals, intent: f64) -> f64 {
        let positivity = (fused.polarity + 1.0) / 2.0 * 100.0;
        let intent_component = (intent + 100.0) / 2.0;
        let mut boost = 0.0;
        if fused.has(Emotion::Pride) {
            boost += 10.0;
        }
        if fused.has(Emotion::Nostalgia) {
            boost += 10.0;
        }
        for emotion in [Emotion::Joy, Emotion::Inspiration, Emotion::Humor] {
            if fused.has(emotion) {
                boost += 5.0;
            }
        }
        positivity * 0.5 + fused.emc * 0.3 + intent_component * 0.2 + boost
    }

    pub fn subjective_norms(
        &self,
        fused: &FusedSignals,
        platform: Platform,
        influencer: bool,
    ) -> f64 {
        let mut norms = 50.0;
        if influencer {
            norms += 25.0;
        }
        if fused.has(Emotion::Pride) {
            norms += 10.0;
        }
        if fused.has(Emotion::Nostalgia) {
            norms += 5.0;
        }
        norms -= (fused.scs * 0.1).min(10.0);
        norms * self.platforms.for_platform(platform)
    }

    pub fn perceived_control(&self, fused: &FusedSignals) -> f64 {
        let mut control = 70.0;
        if fused.subjectivity > 0.7 {
            control -= 10.0;
        }
        if fused.nam > 50.0 {
            control -= 15.0;
        }
        if fused.polarity < -0.2 {
            control -= 20.0;
        }
        control
    }

    pub fn score(
        &self,
        fused: &FusedSignals,
        intent: f64,
        platform: Platform,
        influencer: bool,
    ) -> TpbScores {
        TpbScores::from_components(
            &self.weights,
            self.attitude(fused, intent),
            self.subjective_norms(fused, platform, influencer),
            self.perceived_control(fused),
        )
    }
}
