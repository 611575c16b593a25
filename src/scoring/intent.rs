use serde::{Deserialize, Serialize};

use crate::scoring::FusedSignals;
use crate::text::mentions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentCategory {
    Authentic,
    Neutral,
    Manipulative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    pub fn label(self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }
}

struct ManipulationRule {
    kind: &'static str,
    penalty: u32,
    cues: &'static [&'static str],
    companions: &'static [&'static str],
}

const MANIPULATION_RULES: &[ManipulationRule] = &[
    ManipulationRule {
        kind: "insecurity_exploitation",
        penalty: 40,
        cues: &[
            "dont let", "stop letting", "hold you back", "holding you back", "problem", "issue",
            "struggle", "suffering",
        ],
        companions: &[
            "transform", "change", "finally", "guaranteed", "secret", "solution", "answer",
            "fix", "cure",
        ],
    },
    ManipulationRule {
        kind: "fear_based_selling",
        penalty: 35,
        cues: &[
            "miss out", "left behind", "before its too late", "running out", "limited",
            "last chance", "dont wait", "act now",
        ],
        companions: &["now", "today", "hurry", "quick", "fast", "immediate"],
    },
    ManipulationRule {
        kind: "shame_based_marketing",
        penalty: 45,
        cues: &[
            "embarrassed", "ashamed", "hide", "ugly", "unattractive", "disgusting", "gross",
            "inferior",
        ],
        companions: &["finally", "no more", "say goodbye", "never again", "transform"],
    },
    ManipulationRule {
        kind: "false_causation",
        penalty: 50,
        cues: &[
            "because of your", "due to your", "reason you", "thats why you", "if only you",
        ],
        companions: &[
            "job", "career", "marriage", "success", "failure", "rejection", "relationship",
            "money", "wealth",
        ],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct ManipulationPattern {
    pub kind: String,
    pub penalty: u32,
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerceivedIntent {
    pub score: f64,
    pub category: IntentCategory,
    pub interpretation: String,
    pub authenticity: f64,
    pub manipulation_risk: f64,
    pub patterns: Vec<ManipulationPattern>,
    pub ambiguity_factor: Level,
    pub confidence: Level,
}

impl PerceivedIntent {
    pub fn recommendations(&self) -> Vec<String> {
        let mut tips = Vec::new();
        if self.score < -20.0 {
            tips.push("Content may be perceived as manipulative or insincere".to_string());
            tips.push("Consider reducing emotional intensity and sales language".to_string());
        }
        if self.authenticity < 40.0 {
            tips.push(
                "Use more genuine, relatable language aligned with cultural values".to_string(),
            );
        }
        if self.manipulation_risk > 60.0 {
            tips.push("Reduce excessive emotional appeals".to_string());
        }
        if self.ambiguity_factor == Level::High {
            tips.push("Reduce abstract language and open-ended statements".to_string());
        }
        tips
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentWeights {
    pub positivity: f64,
    pub cultural_safety: f64,
    pub emc_appropriateness: f64,
    pub manipulation_scs: f64,
    pub manipulation_emc: f64,
    pub manipulation_subjectivity: f64,
}

impl Default for IntentWeights {
    fn default() -> Self {
        Self {
            positivity: 0.3,
            cultural_safety: 0.4,
            emc_appropriateness: 0.3,
            manipulation_scs: 0.4,
            manipulation_emc: 0.3,
            manipulation_subjectivity: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentCalculator {
    weights: IntentWeights,
}

impl IntentCalculator {
    pub fn new(weights: IntentWeights) -> Self {
        Self { weights }
    }

    /// EMC between 40 and 70 reads as engaging without trying too hard.
    pub fn emc_appropriateness(emc: f64) -> f64 {
        if emc < 40.0 {
            emc / 40.0 * 100.0
        } else if emc <= 70.0 {
            100.0
        } else {
            (100.0 - (emc - 70.0) / 30.0 * 100.0).max(0.0)
        }
    }

    pub fn authenticity(&self, fused: &FusedSignals) -> f64 {
        let positivity = (fused.polarity + 1.0) / 2.0 * 100.0;
        crate::clamp_score(
            positivity * self.weights.positivity
                + (100.0 - fused.scs) * self.weights.cultural_safety
                + Self::emc_appropriateness(fused.emc) * self.weights.emc_appropriateness,
        )
    }

    /// `text` is the lowercased caption (plus any OCR text).
    pub fn detect_patterns(&self, text: &str, fused: &FusedSignals) -> Vec<ManipulationPattern> {
        let mut patterns = Vec::new();
        if !text.trim().is_empty() {
            for rule in MANIPULATION_RULES {
                let cues: Vec<&str> = rule
                    .cues
                    .iter()
                    .copied()
                    .filter(|cue| mentions(text, cue))
                    .collect();
                let companions: Vec<&str> = rule
                    .companions
                    .iter()
                    .copied()
                    .filter(|companion| mentions(text, companion))
                    .collect();
                if cues.is_empty() || companions.is_empty() {
                    continue;
                }
                patterns.push(ManipulationPattern {
                    kind: rule.kind.to_string(),
                    penalty: rule.penalty,
                    matched: cues
                        .into_iter()
                        .chain(companions)
                        .take(5)
                        .map(str::to_string)
                        .collect(),
                });
            }
        }
        // Cheerful framing of culturally risky content.
        if fused.scs > 50.0 && fused.polarity > 0.3 {
            patterns.push(ManipulationPattern {
                kind: "positive_harmful_framing".to_string(),
                penalty: 25,
                matched: vec!["high_scs_positive_sentiment".to_string()],
            });
        }
        patterns
    }

    pub fn manipulation_risk(&self, fused: &FusedSignals, patterns: &[ManipulationPattern]) -> f64 {
        let excessive_emc = if fused.emc > 70.0 {
            (fused.emc - 70.0) / 30.0 * 100.0
        } else {
            0.0
        };
        let penalty: u32 = patterns.iter().map(|pattern| pattern.penalty).sum();
        crate::clamp_score(
            fused.scs * self.weights.manipulation_scs
                + excessive_emc * self.weights.manipulation_emc
                + fused.subjectivity * 100.0 * self.weights.manipulation_subjectivity
                + penalty as f64,
        )
    }

    pub fn calculate(&self, fused: &FusedSignals, text: &str) -> PerceivedIntent {
        let authenticity = self.authenticity(fused);
        let patterns = self.detect_patterns(text, fused);
        let manipulation_risk = self.manipulation_risk(fused, &patterns);
        let score = crate::clamp_signed(authenticity - manipulation_risk, 100.0);

        let (category, interpretation) = if score >= 50.0 {
            (
                IntentCategory::Authentic,
                "Highly Authentic - Likely perceived as genuine and values-aligned",
            )
        } else if score >= 20.0 {
            (
                IntentCategory::Authentic,
                "Moderately Authentic - Generally perceived as sincere",
            )
        } else if score >= -20.0 {
            (
                IntentCategory::Neutral,
                "Neutral - Mixed signals, interpretation varies by audience",
            )
        } else if score >= -50.0 {
            (
                IntentCategory::Manipulative,
                "Moderately Manipulative - May be perceived as sales-focused",
            )
        } else {
            (
                IntentCategory::Manipulative,
                "Highly Manipulative - Likely perceived as insincere or exploitative",
            )
        };

        let ambiguity_factor = if fused.nam > 60.0 {
            Level::High
        } else if fused.nam > 30.0 {
            Level::Medium
        } else {
            Level::Low
        };
        let uncertainty = fused.nam * 0.6 + fused.scs * 0.4;
        let confidence = if uncertainty < 30.0 {
            Level::High
        } else if uncertainty < 60.0 {
            Level::Medium
        } else {
            Level::Low
        };

        PerceivedIntent {
            score,
            category,
            interpretation: interpretation.to_string(),
            authenticity,
            manipulation_risk,
            patterns,
            ambiguity_factor,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{AnalysisMode, RiskSource};

    fn fused(polarity: f64, subjectivity: f64, emc: f64, nam: f64, scs: f64) -> FusedSignals {
        FusedSignals {
            mode: AnalysisMode::TextOnly,
            emc,
            nam,
            scs,
            text_emc: emc,
            text_scs: scs,
            image_emc: None,
            image_scs: None,
            polarity,
            subjectivity,
            emotions: Vec::new(),
            modality_agreement: 0.0,
            cultural_symbols: Vec::new(),
            primary_risk_source: RiskSource::Text,
            conflict: false,
        }
    }

    #[test]
    fn clean_positive_content_is_authentic() {
        let calculator = IntentCalculator::new(IntentWeights::default());
        let intent = calculator.calculate(&fused(0.5618, 0.5, 50.0, 0.0, 0.0), "celebrate diwali");
        assert!((intent.authenticity - 93.427).abs() < 1e-2);
        assert!((intent.manipulation_risk - 15.0).abs() < 1e-6);
        assert_eq!(intent.category, IntentCategory::Authentic);
        assert_eq!(intent.confidence, Level::High);
    }

    #[test]
    fn risky_positive_framing_is_penalised() {
        let calculator = IntentCalculator::new(IntentWeights::default());
        let intent = calculator.calculate(&fused(0.7, 0.75, 55.0, 0.0, 100.0), "fair skin now");
        assert!(intent
            .patterns
            .iter()
            .any(|pattern| pattern.kind == "positive_harmful_framing"));
        assert!(intent.score < -20.0);
        assert_eq!(intent.category, IntentCategory::Manipulative);
    }

    #[test]
    fn fear_selling_needs_urgency() {
        let calculator = IntentCalculator::new(IntentWeights::default());
        let neutral = fused(0.0, 0.0, 20.0, 0.0, 0.0);
        assert!(calculator.detect_patterns("limited stock", &neutral).is_empty());
        let found = calculator.detect_patterns("limited stock, hurry", &neutral);
        assert_eq!(found[0].kind, "fear_based_selling");
        assert_eq!(found[0].penalty, 35);
    }

    #[test]
    fn emc_appropriateness_bands() {
        assert!((IntentCalculator::emc_appropriateness(20.0) - 50.0).abs() < 1e-6);
        assert!((IntentCalculator::emc_appropriateness(55.0) - 100.0).abs() < 1e-6);
        assert!((IntentCalculator::emc_appropriateness(85.0) - 50.0).abs() < 1e-6);
        assert_eq!(IntentCalculator::emc_appropriateness(100.0), 0.0);
    }
}
