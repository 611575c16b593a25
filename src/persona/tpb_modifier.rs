use serde::Serialize;

use crate::persona::{ContentProfile, Persona};
use crate::scoring::{TpbScores, TpbWeights};

/// Persona-adjusted TPB scores and the modifiers that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaTpb {
    pub scores: TpbScores,
    pub attitude_modifier: f64,
    pub norms_modifier: f64,
    pub control_modifier: f64,
    pub modifications_applied: Vec<String>,
    pub base_intention: f64,
}

const VALUE_CONFLICTS: &[(&[&str], &[&str])] = &[
    (&["tradition", "family"], &["freedom", "independence"]),
    (&["success", "achievement"], &["community", "collective"]),
    (&["innovation", "change"], &["stability", "tradition"]),
];

#[derive(Debug, Clone, Default)]
pub struct PersonaTpbModifier;

impl PersonaTpbModifier {
    pub fn new() -> Self {
        Self
    }

    pub fn modify(
        &self,
        base: &TpbScores,
        weights: &TpbWeights,
        persona: &Persona,
        content: &ContentProfile,
    ) -> PersonaTpb {
        let attitude_modifier = self.attitude_modifier(persona, content);
        let norms_modifier = self.norms_modifier(persona, content);
        let control_modifier = self.control_modifier(persona, content);

        let scores = TpbScores::from_components(
            weights,
            base.attitude * (1.0 + attitude_modifier),
            base.subjective_norms * (1.0 + norms_modifier),
            base.perceived_control * (1.0 + control_modifier),
        );

        let modifications_applied = [
            ("Attitude", attitude_modifier),
            ("Norms", norms_modifier),
            ("Control", control_modifier),
        ]
        .iter()
        .filter(|(_, modifier)| modifier.abs() > 0.05)
        .map(|(name, modifier)| format!("{}: {:+.2}", name, modifier))
        .collect();

        PersonaTpb {
            scores,
            attitude_modifier: crate::round_to(attitude_modifier, 2),
            norms_modifier: crate::round_to(norms_modifier, 2),
            control_modifier: crate::round_to(control_modifier, 2),
            modifications_applied,
            base_intention: base.behavioral_intention,
        }
    }

    /// In `[-0.5, 0.5]`: value overlap, OCEAN cues, interest overlap and age bracket.
    pub fn attitude_modifier(&self, persona: &Persona, content: &ContentProfile) -> f64 {
        let traits = &persona.psychographics;
        let mut modifier = 0.0;

        if !content.values.is_empty() && !traits.core_values.is_empty() {
            let shared = traits
                .core_values
                .iter()
                .filter(|value| content.values.contains(value))
                .count();
            if shared > 0 {
                modifier += shared as f64 / traits.core_values.len() as f64 * 0.2;
            } else if VALUE_CONFLICTS.iter().any(|(held, opposed)| {
                traits.core_values.iter().any(|value| held.contains(&value.as_str()))
                    && content.values.iter().any(|value| opposed.contains(&value.as_str()))
            }) {
                modifier -= 0.15;
            }
        }

        if content.is_creative {
            modifier += (traits.openness - 0.5) * 0.15;
        }
        if content.is_detailed {
            modifier += (traits.conscientiousness - 0.5) * 0.1;
        }
        if content.is_social {
            modifier += (traits.extraversion - 0.5) * 0.1;
        }

        if !content.topics.is_empty() && !traits.interests.is_empty() {
            let shared = traits
                .interests
                .iter()
                .filter(|interest| content.topics.contains(interest))
                .count();
            if shared > 0 {
                modifier += shared as f64 / traits.interests.len() as f64 * 0.15;
            } else if content.count_mentions(&persona.behavioral_triggers.ignore) > 0 {
                modifier -= 0.15;
            }
        }

        if content.is_creative {
            if persona.demographics.is_young() {
                modifier += 0.05;
            } else if persona.demographics.is_senior() {
                modifier -= 0.05;
            }
        }
        crate::clamp_signed(modifier, 0.5)
    }

    /// In `[-0.5, 0.5]`: collectivism, family themes, status, sharing, platform and income bracket.
    pub fn norms_modifier(&self, persona: &Persona, content: &ContentProfile) -> f64 {
        let profile = &persona.cultural_profile;
        let mut modifier = 0.0;

        let collectivism = 100.0 - profile.individualism;
        if collectivism > 60.0 {
            modifier += 0.2;
        } else if collectivism < 40.0 {
            modifier -= 0.15;
        }

        let family_theme = content
            .themes
            .iter()
            .any(|theme| theme == "family" || theme == "relationships");
        if family_theme && profile.family_orientation > 70.0 {
            modifier += 0.15;
        }

        if content.is_aspirational || content.is_premium {
            modifier += (profile.status_consciousness - 50.0) / 100.0 * 0.15;
            if persona.demographics.is_affluent() {
                modifier += 0.05;
            }
        }

        modifier += match persona.media_behavior.sharing_propensity.as_str() {
            "never" => -0.2,
            "selective" => -0.05,
            "frequent" => 0.1,
            "viral" => 0.2,
            _ => 0.0,
        };
        modifier += (persona.media_behavior.affinity(content.platform) - 0.5) * 0.3;
        crate::clamp_signed(modifier, 0.5)
    }

    /// In `[-0.3, 0.3]`: engagement style, ad receptivity, platform familiarity and content load.
    pub fn control_modifier(&self, persona: &Persona, content: &ContentProfile) -> f64 {
        let media = &persona.media_behavior;
        let mut modifier = match media.engagement_style.as_str() {
            "passive" => -0.15,
            "reactive" => -0.05,
            "proactive" => 0.1,
            "creator" => 0.15,
            _ => 0.0,
        };
        modifier += match media.ad_receptivity.as_str() {
            "ad_blocker" => -0.15,
            "tolerant" => -0.05,
            "receptive" => 0.05,
            "engaged" => 0.1,
            _ => 0.0,
        };

        let affinity = media.affinity(content.platform);
        if affinity > 0.7 {
            modifier += 0.1;
        } else if affinity < 0.3 {
            modifier -= 0.1;
        }

        if content.is_complex && matches!(media.engagement_style.as_str(), "passive" | "reactive") {
            modifier -= 0.1;
        }
        if persona.psychographics.conscientiousness > 0.6 && content.nam > 50.0 {
            modifier -= 0.1;
        }
        if content.is_premium && persona.demographics.is_low_income() {
            modifier -= 0.1;
        }
        crate::clamp_signed(modifier, 0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::fixtures::persona;
    use crate::scoring::{AnalysisMode, FusedSignals, RiskSource};
    use crate::text::MoralFraming;
    use crate::Platform;

    fn content(text: &str, nam: f64, platform: Platform) -> ContentProfile {
        let fused = FusedSignals {
            mode: AnalysisMode::TextOnly,
            emc: 40.0,
            nam,
            scs: 0.0,
            text_emc: 40.0,
            text_scs: 0.0,
            image_emc: None,
            image_scs: None,
            polarity: 0.2,
            subjectivity: 0.4,
            emotions: Vec::new(),
            modality_agreement: 0.0,
            cultural_symbols: Vec::new(),
            primary_risk_source: RiskSource::Text,
            conflict: false,
        };
        ContentProfile::build(
            text,
            text.split_whitespace().count(),
            &MoralFraming::default(),
            &fused,
            &[],
            platform,
        )
    }

    #[test]
    fn modifiers_stay_bounded() {
        let modifier = PersonaTpbModifier::new();
        let mut persona = persona("gen_z_metro");
        persona.cultural_profile.individualism = 10.0;
        persona.cultural_profile.family_orientation = 90.0;
        persona.media_behavior.sharing_propensity = "viral".to_string();
        let profile = content(
            "Premium family dream upgrade for the whole home",
            0.0,
            Platform::Instagram,
        );
        let norms = modifier.norms_modifier(&persona, &profile);
        assert!((norms - 0.5).abs() < 1e-9);
        let control = modifier.control_modifier(&persona, &profile);
        assert!(control <= 0.3 && control >= -0.3);
    }

    #[test]
    fn low_income_persona_loses_control_on_premium_content() {
        let modifier = PersonaTpbModifier::new();
        let mut persona = persona("nccs_d_rural");
        persona.demographics.income_level = "D".to_string();
        persona.media_behavior.engagement_style = "reactive".to_string();
        persona.media_behavior.ad_receptivity = "receptive".to_string();
        let premium = content("An exclusive luxury watch", 0.0, Platform::YouTube);
        let plain = content("A sturdy watch", 0.0, Platform::YouTube);
        let delta = modifier.control_modifier(&persona, &plain)
            - modifier.control_modifier(&persona, &premium);
        assert!((delta - 0.1).abs() < 1e-9);
    }

    #[test]
    fn modified_intention_is_recomputed() {
        let modifier = PersonaTpbModifier::new();
        let weights = TpbWeights::default();
        let base = TpbScores::from_components(&weights, 60.0, 60.0, 60.0);
        let persona = persona("gen_z_metro");
        let profile = content("Hey, new drop on the app", 0.0, Platform::Instagram);
        let adjusted = modifier.modify(&base, &weights, &persona, &profile);
        let expected = adjusted.scores.attitude * 0.40
            + adjusted.scores.subjective_norms * 0.35
            + adjusted.scores.perceived_control * 0.25;
        assert!((adjusted.scores.behavioral_intention - expected).abs() < 1e-9);
        assert!((adjusted.base_intention - 60.0).abs() < 1e-9);
        assert!(!adjusted.modifications_applied.is_empty());
    }
}
