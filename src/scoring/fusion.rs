use serde::{Deserialize, Serialize};

use crate::image::ImageSignals;
use crate::text::{Emotion, TextSignals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    TextOnly,
    ImageOnly,
    Multimodal,
}

impl AnalysisMode {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::TextOnly => "text_only",
            AnalysisMode::ImageOnly => "image_only",
            AnalysisMode::Multimodal => "multimodal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSource {
    Text,
    Image,
    Equal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionWeights {
    pub text_emc: f64,
    pub image_emc: f64,
    pub conflict_threshold: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            text_emc: 0.6,
            image_emc: 0.4,
            conflict_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FusedSignals {
    pub mode: AnalysisMode,
    pub emc: f64,
    pub nam: f64,
    pub scs: f64,
    pub text_emc: f64,
    pub text_scs: f64,
    pub image_emc: Option<f64>,
    pub image_scs: Option<f64>,
    pub polarity: f64,
    pub subjectivity: f64,
    pub emotions: Vec<Emotion>,
    pub modality_agreement: f64,
    pub cultural_symbols: Vec<String>,
    pub primary_risk_source: RiskSource,
    pub conflict: bool,
}

impl FusedSignals {
    pub fn has(&self, emotion: Emotion) -> bool {
        self.emotions.contains(&emotion)
    }

    pub fn has_image(&self) -> bool {
        self.image_emc.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct FusionScorer {
    weights: FusionWeights,
}

impl FusionScorer {
    pub fn new(weights: FusionWeights) -> Self {
        Self { weights }
    }

    /// Text-weighted EMC, worst-case SCS, text-only NAM.
    /// Without an image the text scores pass through.
    pub fn fuse(
        &self,
        text: &TextSignals,
        text_scs: f64,
        image: Option<&ImageSignals>,
        mode: AnalysisMode,
    ) -> FusedSignals {
        let text_emotions = text.emotion_labels();
        let Some(image) = image else {
            return FusedSignals {
                mode: AnalysisMode::TextOnly,
                emc: crate::clamp_score(text.emc_score),
                nam: crate::clamp_score(text.nam_score),
                scs: crate::clamp_score(text_scs),
                text_emc: text.emc_score,
                text_scs,
                image_emc: None,
                image_scs: None,
                polarity: text.sentiment.polarity,
                subjectivity: text.sentiment.subjectivity,
                emotions: text_emotions,
                modality_agreement: 0.0,
                cultural_symbols: Vec::new(),
                primary_risk_source: RiskSource::Text,
                conflict: false,
            };
        };

        // An image without any readable text carries the whole emotional signal.
        let emc = if text.is_empty() {
            image.visual_emc
        } else {
            text.emc_score * self.weights.text_emc + image.visual_emc * self.weights.image_emc
        };
        let scs = text_scs.max(image.visual_scs);
        let primary_risk_source = if text_scs > image.visual_scs {
            RiskSource::Text
        } else if image.visual_scs > text_scs {
            RiskSource::Image
        } else {
            RiskSource::Equal
        };

        let mut emotions = text_emotions.clone();
        emotions.extend(image.emotions.iter().copied());
        emotions.sort();
        emotions.dedup();
        let both = text_emotions
            .iter()
            .filter(|emotion| image.emotions.contains(emotion))
            .count();
        let modality_agreement = both as f64 / emotions.len().max(1) as f64;

        let mut cultural_symbols = image.cultural_symbols.clone();
        cultural_symbols.sort();
        cultural_symbols.dedup();

        let text_polarity = text.sentiment.polarity;
        let conflict = !text.is_empty()
            && text_polarity * image.polarity < 0.0
            && (text_polarity - image.polarity).abs() > self.weights.conflict_threshold;
        let polarity = if text.is_empty() {
            image.polarity
        } else {
            text_polarity
        };

        FusedSignals {
            mode,
            emc: crate::clamp_score(emc),
            nam: crate::clamp_score(text.nam_score),
            scs: crate::clamp_score(scs),
            text_emc: text.emc_score,
            text_scs,
            image_emc: Some(image.visual_emc),
            image_scs: Some(image.visual_scs),
            polarity,
            subjectivity: text.sentiment.subjectivity,
            emotions,
            modality_agreement,
            cultural_symbols,
            primary_risk_source,
            conflict,
        }
    }
}
