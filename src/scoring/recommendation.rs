use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cultural::{AlertSource, CulturalAlert, FestivalAlert, Severity};
use crate::scoring::{CampaignHistory, OutcomeScores, SimilarCampaign, TpbScores};
use crate::Platform;

const SIMILAR_CAMPAIGNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Go,
    Caution,
    Stop,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Go => "go",
            Verdict::Caution => "caution",
            Verdict::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub verdict: Verdict,
    pub action: String,
    pub message: String,
    pub reasoning: Vec<String>,
    pub suggestions: Vec<String>,
    pub similar_campaigns: Vec<SimilarCampaign>,
}

pub struct RecommendationInputs<'a> {
    pub platform: Platform,
    /// `None` when outcome scoring could not produce usable numbers.
    pub outcome: Option<&'a OutcomeScores>,
    pub alerts: &'a [CulturalAlert],
    pub festival_alerts: &'a [FestivalAlert],
    pub intent: f64,
    pub tpb: &'a TpbScores,
    pub polarity: f64,
    pub subjectivity: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    history: Arc<CampaignHistory>,
}

impl RecommendationEngine {
    pub fn new(history: Arc<CampaignHistory>) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &CampaignHistory {
        &self.history
    }

    /// First match wins: Stop, then Caution, then Go.
    pub fn verdict(backlash: f64, alerts: &[CulturalAlert]) -> Verdict {
        if backlash >= 70.0 || alerts.iter().any(CulturalAlert::is_critical) {
            Verdict::Stop
        } else if backlash >= 40.0
            || alerts
                .iter()
                .any(|alert| alert.weight >= 15 || alert.severity == Severity::High)
        {
            Verdict::Caution
        } else {
            Verdict::Go
        }
    }

    pub fn recommend(&self, inputs: &RecommendationInputs) -> Recommendation {
        let Some(outcome) = inputs.outcome.filter(|outcome| outcome.is_well_formed()) else {
            tracing::warn!("outcome scores unavailable, defaulting to caution");
            let mut suggestions = Vec::new();
            crate::merge_suggestions(&mut suggestions, &self.alert_suggestions(inputs));
            return Recommendation {
                verdict: Verdict::Caution,
                action: "Review Required".to_string(),
                message: "Outcome scores unavailable. Review the content manually before posting."
                    .to_string(),
                reasoning: vec!["Outcome scores could not be computed".to_string()],
                suggestions,
                similar_campaigns: Vec::new(),
            };
        };

        let verdict = Self::verdict(outcome.backlash_risk, inputs.alerts);
        let action = match verdict {
            Verdict::Stop => "Do Not Post",
            Verdict::Caution => "Review Required",
            Verdict::Go if outcome.virality >= 70.0 && outcome.backlash_risk < 25.0 => {
                "Excellent - Post Now!"
            }
            Verdict::Go if outcome.virality >= 55.0 => "Good to Post",
            Verdict::Go => "Safe to Post",
        };

        Recommendation {
            verdict,
            action: action.to_string(),
            message: message(verdict, outcome),
            reasoning: self.reasoning(inputs, outcome),
            suggestions: self.suggestions(verdict, inputs, outcome),
            similar_campaigns: self.history.similar(
                inputs.platform,
                outcome.virality,
                outcome.backlash_risk,
                SIMILAR_CAMPAIGNS,
            ),
        }
    }

    fn reasoning(&self, inputs: &RecommendationInputs, outcome: &OutcomeScores) -> Vec<String> {
        let mut reasoning = Vec::new();
        let intention = inputs.tpb.behavioral_intention;
        if intention >= 75.0 {
            reasoning.push(format!(
                "High TPB behavioral intention ({:.0}%) indicates strong sharing likelihood",
                intention
            ));
        } else if intention >= 50.0 {
            reasoning.push(format!(
                "Moderate TPB behavioral intention ({:.0}%) suggests decent engagement potential",
                intention
            ));
        } else if intention < 40.0 {
            reasoning.push(format!(
                "Low TPB behavioral intention ({:.0}%) indicates limited engagement potential",
                intention
            ));
        }

        let intent = inputs.intent;
        reasoning.push(if intent >= 50.0 {
            format!("Positive perceived intent ({:.0}) suggests authentic messaging", intent)
        } else if intent >= 0.0 {
            format!(
                "Neutral perceived intent ({:.0}) - content may lack clear authenticity signals",
                intent
            )
        } else if intent >= -50.0 {
            format!(
                "Negative perceived intent ({:.0}) - risk of being perceived as manipulative",
                intent
            )
        } else {
            format!(
                "Highly negative perceived intent ({:.0}) - likely to be seen as manipulative",
                intent
            )
        });

        if inputs.alerts.is_empty() {
            reasoning.push("No cultural sensitivity issues detected".to_string());
        } else {
            let critical = count_severity(inputs.alerts, Severity::Critical);
            let high = count_severity(inputs.alerts, Severity::High);
            if critical > 0 {
                reasoning.push(format!(
                    "{} critical cultural sensitivity alert(s) detected",
                    critical
                ));
            }
            if high > 0 {
                reasoning.push(format!(
                    "{} high-severity cultural sensitivity alert(s) detected",
                    high
                ));
            }
            if critical == 0 && high == 0 {
                reasoning.push(format!(
                    "{} cultural sensitivity alert(s) detected (medium/low severity)",
                    inputs.alerts.len()
                ));
            }
        }

        let virality = outcome.virality;
        if virality >= 75.0 {
            reasoning.push(format!("Very high virality potential ({:.0}%)", virality));
        } else if virality >= 60.0 {
            reasoning.push(format!("High virality potential ({:.0}%)", virality));
        } else if virality < 40.0 {
            reasoning.push(format!("Limited virality potential ({:.0}%)", virality));
        }

        let backlash = outcome.backlash_risk;
        reasoning.push(if backlash >= 70.0 {
            format!(
                "Critical backlash risk ({:.0}%) - high likelihood of negative reaction",
                backlash
            )
        } else if backlash >= 50.0 {
            format!(
                "High backlash risk ({:.0}%) - significant risk of negative reaction",
                backlash
            )
        } else if backlash >= 30.0 {
            format!("Moderate backlash risk ({:.0}%)", backlash)
        } else {
            format!("Low backlash risk ({:.0}%)", backlash)
        });

        if inputs.polarity > 0.5 {
            reasoning.push("Strong positive sentiment detected".to_string());
        } else if inputs.polarity < -0.3 {
            reasoning.push("Negative sentiment detected - may trigger backlash".to_string());
        }
        reasoning
    }

    fn alert_suggestions(&self, inputs: &RecommendationInputs) -> Vec<String> {
        let mut suggestions = Vec::new();
        let keywords = |severity: Severity| -> Vec<String> {
            inputs
                .alerts
                .iter()
                .filter(|alert| alert.severity == severity && alert.source != AlertSource::Festival)
                .map(|alert| alert.keyword.clone())
                .collect()
        };
        let critical = keywords(Severity::Critical);
        if !critical.is_empty() {
            suggestions.push(format!(
                "Remove or rephrase critical triggers: {}",
                critical.join(", ")
            ));
        }
        let high = keywords(Severity::High);
        if !high.is_empty() {
            suggestions.push(format!(
                "Consider revising high-risk references: {}",
                high.join(", ")
            ));
        }
        suggestions.extend(
            inputs
                .alerts
                .iter()
                .filter(|alert| !alert.message.is_empty())
                .take(3)
                .map(|alert| alert.message.clone()),
        );

        let categories: BTreeSet<&str> = inputs
            .alerts
            .iter()
            .map(|alert| alert.category.as_str())
            .collect();
        for category in categories {
            if let Some(tip) = category_tip(category) {
                suggestions.push(tip.to_string());
            }
        }

        for festival in inputs.festival_alerts {
            suggestions.push(format!(
                "Reschedule away from {} or remove: {}",
                festival.festival,
                festival.conflicts.join(", ")
            ));
        }
        suggestions
    }

    fn suggestions(
        &self,
        verdict: Verdict,
        inputs: &RecommendationInputs,
        outcome: &OutcomeScores,
    ) -> Vec<String> {
        let mut suggestions = Vec::new();
        if verdict != Verdict::Go {
            let mut tips = self.alert_suggestions(inputs);
            if inputs.intent < 0.0 {
                tips.push(
                    "Increase authenticity by adding genuine storytelling or user testimonials"
                        .to_string(),
                );
                tips.push(
                    "Reduce promotional language and focus on value-driven messaging".to_string(),
                );
            }
            if inputs.polarity < 0.0 {
                tips.push(
                    "Reframe negative messaging with positive or solution-oriented language"
                        .to_string(),
                );
            }
            if inputs.subjectivity > 0.7 {
                tips.push("Balance subjective claims with objective facts or data".to_string());
            }
            if inputs.tpb.attitude < 50.0 {
                tips.push(
                    "Enhance emotional appeal to improve audience attitude toward sharing"
                        .to_string(),
                );
            }
            if outcome.backlash_risk >= 70.0 {
                tips.push(
                    "Consider major content revision or alternative messaging approach".to_string(),
                );
                tips.push("Test content with focus groups before posting".to_string());
            } else if outcome.backlash_risk >= 50.0 {
                tips.push("Review content with cultural sensitivity experts".to_string());
            }
            crate::merge_suggestions(&mut suggestions, &tips);
        }
        crate::merge_suggestions(&mut suggestions, &[weakest_axis_tip(outcome).to_string()]);
        suggestions
    }
}

fn count_severity(alerts: &[CulturalAlert], severity: Severity) -> usize {
    alerts
        .iter()
        .filter(|alert| alert.severity == severity)
        .count()
}

fn category_tip(category: &str) -> Option<&'static str> {
    match category {
        "Religious" => {
            Some("Avoid religious references or ensure they are respectful and inclusive")
        }
        "Colorism" => Some("Remove skin tone references and focus on inclusive beauty standards"),
        "Geopolitical" => Some("Avoid geopolitical topics that may polarize audiences"),
        "Caste" => Some("Remove caste references; they read as exclusionary to most audiences"),
        "Gender" => Some("Avoid gender stereotypes and show all genders with equal agency"),
        "Regional" => Some("Avoid regional stereotypes and represent every region respectfully"),
        "Compound Pattern" => Some(
            "Rework the product framing so it does not tie self-worth to skin tone or body shape",
        ),
        _ => None,
    }
}

/// Tip for the outcome axis in the worst shape (virality low, backlash or fatigue high).
fn weakest_axis_tip(outcome: &OutcomeScores) -> &'static str {
    let axes = [
        (outcome.virality, "Sharpen the hook with a clear emotional payoff to lift shareability"),
        (
            100.0 - outcome.backlash_risk,
            "Soften polarizing references to reduce backlash exposure",
        ),
        (
            100.0 - outcome.ad_fatigue_risk,
            "Shorten the caption and trim hashtags to reduce ad fatigue",
        ),
    ];
    axes.iter()
        .fold(axes[0], |weakest, axis| if axis.0 < weakest.0 { *axis } else { weakest })
        .1
}

fn message(verdict: Verdict, outcome: &OutcomeScores) -> String {
    let backlash = outcome.backlash_risk;
    let virality = outcome.virality;
    match verdict {
        Verdict::Stop if backlash >= 70.0 => format!(
            "Critical backlash risk detected ({:.0}%). Major content revision required before posting.",
            backlash
        ),
        Verdict::Stop => {
            "Critical issues detected. Do not post without addressing cultural sensitivity concerns."
                .to_string()
        }
        Verdict::Caution if backlash >= 50.0 => format!(
            "Moderate to high backlash risk ({:.0}%). Review and revise content before posting.",
            backlash
        ),
        Verdict::Caution => {
            "Some concerns detected. Review cultural sensitivity alerts and consider revisions."
                .to_string()
        }
        Verdict::Go if virality >= 75.0 => format!(
            "Content shows strong viral potential ({:.0}%) with minimal risk. Excellent candidate for posting!",
            virality
        ),
        Verdict::Go if virality >= 60.0 => format!(
            "Content shows good viral potential ({:.0}%) with low risk. Safe to post!",
            virality
        ),
        Verdict::Go => {
            "Content is safe to post with minimal risk, though viral potential is moderate."
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Band, ExposurePattern, HistoricalCampaign, TpbWeights};

    fn outcome(virality: f64, backlash: f64, fatigue: f64) -> OutcomeScores {
        OutcomeScores {
            virality,
            virality_band: Band::Moderate,
            backlash_risk: backlash,
            backlash_band: Band::Moderate,
            backlash_risk_factors: Vec::new(),
            exposure_intensity: virality * 0.6 + backlash * 0.4,
            exposure_band: Band::Moderate,
            exposure_pattern: ExposurePattern::Normal,
            ad_fatigue_risk: fatigue,
            fatigue_band: Band::Moderate,
        }
    }

    fn alert(category: &str, severity: Severity, weight: u32) -> CulturalAlert {
        CulturalAlert {
            keyword: "kashmir".to_string(),
            category: category.to_string(),
            severity,
            weight,
            message: "sensitive".to_string(),
            source: AlertSource::Text,
        }
    }

    fn inputs<'a>(
        outcome: Option<&'a OutcomeScores>,
        alerts: &'a [CulturalAlert],
        tpb: &'a TpbScores,
    ) -> RecommendationInputs<'a> {
        RecommendationInputs {
            platform: Platform::Instagram,
            outcome,
            alerts,
            festival_alerts: &[],
            intent: 40.0,
            tpb,
            polarity: 0.4,
            subjectivity: 0.4,
        }
    }

    #[test]
    fn verdict_priority_order() {
        assert_eq!(RecommendationEngine::verdict(72.0, &[]), Verdict::Stop);
        let critical = [alert("Geopolitical", Severity::Critical, 40)];
        assert_eq!(RecommendationEngine::verdict(5.0, &critical), Verdict::Stop);
        assert_eq!(RecommendationEngine::verdict(45.0, &[]), Verdict::Caution);
        let medium = [alert("Regional", Severity::Medium, 15)];
        assert_eq!(RecommendationEngine::verdict(10.0, &medium), Verdict::Caution);
        let low = [alert("Lifestyle", Severity::Low, 5)];
        assert_eq!(RecommendationEngine::verdict(10.0, &low), Verdict::Go);
    }

    #[test]
    fn malformed_outcome_defaults_to_caution() {
        let tpb = TpbScores::from_components(&TpbWeights::default(), 80.0, 80.0, 70.0);
        let broken = outcome(f64::NAN, 10.0, 30.0);
        let engine = RecommendationEngine::default();
        let recommendation = engine.recommend(&inputs(Some(&broken), &[], &tpb));
        assert_eq!(recommendation.verdict, Verdict::Caution);
        assert!(recommendation.similar_campaigns.is_empty());
        assert_eq!(engine.recommend(&inputs(None, &[], &tpb)).verdict, Verdict::Caution);
    }

    #[test]
    fn stop_carries_trigger_and_category_tips() {
        let tpb = TpbScores::from_components(&TpbWeights::default(), 40.0, 50.0, 60.0);
        let scores = outcome(30.0, 75.0, 40.0);
        let alerts = [alert("Geopolitical", Severity::Critical, 40)];
        let recommendation =
            RecommendationEngine::default().recommend(&inputs(Some(&scores), &alerts, &tpb));
        assert_eq!(recommendation.verdict, Verdict::Stop);
        assert_eq!(recommendation.action, "Do Not Post");
        assert!(recommendation.message.starts_with("Critical backlash risk detected (75%)"));
        assert_eq!(
            recommendation.suggestions[0],
            "Remove or rephrase critical triggers: kashmir"
        );
        assert!(recommendation
            .suggestions
            .iter()
            .any(|tip| tip.contains("geopolitical")));
        assert!(recommendation.suggestions.len() <= 10);
    }

    #[test]
    fn go_keeps_only_the_weakest_axis_tip() {
        let tpb = TpbScores::from_components(&TpbWeights::default(), 85.0, 100.0, 70.0);
        let scores = outcome(86.0, 8.0, 62.0);
        let recommendation =
            RecommendationEngine::default().recommend(&inputs(Some(&scores), &[], &tpb));
        assert_eq!(recommendation.verdict, Verdict::Go);
        assert_eq!(recommendation.action, "Excellent - Post Now!");
        assert_eq!(
            recommendation.suggestions,
            vec!["Shorten the caption and trim hashtags to reduce ad fatigue".to_string()]
        );
    }

    #[test]
    fn similar_campaigns_follow_the_outcome_profile() {
        let campaign = |name: &str, virality: f64, outcome: &str| HistoricalCampaign {
            brand: "Brand".to_string(),
            campaign_name: name.to_string(),
            platform: "Instagram".to_string(),
            backlash_occurred: outcome == "Backlash",
            virality_score: virality,
            outcome: outcome.to_string(),
            lessons_learned: String::new(),
        };
        let history = CampaignHistory::from_campaigns(vec![
            campaign("calm", 30.0, "Success"),
            campaign("uproar", 85.0, "Backlash"),
            campaign("viral", 90.0, "Success"),
        ])
        .expect("history");
        let engine = RecommendationEngine::new(Arc::new(history));
        let tpb = TpbScores::from_components(&TpbWeights::default(), 40.0, 50.0, 60.0);
        let scores = outcome(80.0, 75.0, 40.0);

        let recommendation = engine.recommend(&inputs(Some(&scores), &[], &tpb));
        let names: Vec<&str> = recommendation
            .similar_campaigns
            .iter()
            .map(|similar| similar.campaign.as_str())
            .collect();
        assert_eq!(names, vec!["uproar", "viral", "calm"]);
        assert_eq!(recommendation.similar_campaigns[0].similarity, 100);
        assert_eq!(engine.history().len(), 3);
    }
}
