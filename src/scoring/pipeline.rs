use std::sync::Arc;
use tracing::debug;

use crate::analyzer::Stage;
use crate::config::ScoringConfig;
use crate::cultural::{CulturalAlert, CulturalReport};
use crate::image::ImageSignals;
use crate::scoring::{
    AnalysisMode, CampaignHistory, ContentStats, FusedSignals, FusionScorer, IntentCalculator,
    OutcomePredictor, OutcomeScores, PerceivedIntent, Recommendation, RecommendationEngine,
    RecommendationInputs, TpbScorer, TpbScores,
};
use crate::text::TextSignals;
use crate::Platform;

pub struct ScoringInput<'a> {
    pub text: &'a TextSignals,
    pub cultural: &'a CulturalReport,
    pub image: Option<&'a ImageSignals>,
    pub mode: AnalysisMode,
    /// Lowercased caption plus OCR text, used for manipulation cues.
    pub matching_text: &'a str,
    pub platform: Platform,
    pub influencer: bool,
    pub stats: ContentStats,
}

#[derive(Debug, Clone)]
pub struct ScoringOutput {
    pub fused: FusedSignals,
    pub intent: PerceivedIntent,
    pub tpb: TpbScores,
    pub outcome: OutcomeScores,
    pub recommendation: Recommendation,
    /// Cultural alerts followed by image alerts.
    pub alerts: Vec<CulturalAlert>,
}

#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    fusion: FusionScorer,
    intent: IntentCalculator,
    tpb: TpbScorer,
    outcome: OutcomePredictor,
    recommendation: RecommendationEngine,
}

impl ScoringPipeline {
    pub fn new(
        fusion: FusionScorer,
        intent: IntentCalculator,
        tpb: TpbScorer,
        outcome: OutcomePredictor,
        recommendation: RecommendationEngine,
    ) -> Self {
        Self {
            fusion,
            intent,
            tpb,
            outcome,
            recommendation,
        }
    }

    pub fn from_config(config: &ScoringConfig, history: Arc<CampaignHistory>) -> Self {
        Self::new(
            FusionScorer::new(config.fusion.clone()),
            IntentCalculator::new(config.intent.clone()),
            TpbScorer::new(config.tpb.clone(), config.norms_platforms.clone()),
            OutcomePredictor::new(config.virality_platforms.clone()),
            RecommendationEngine::new(history),
        )
    }

    pub fn tpb(&self) -> &TpbScorer {
        &self.tpb
    }

    pub fn history(&self) -> &CampaignHistory {
        self.recommendation.history()
    }

    /// Runs fusion through recommendation, reporting each stage to `observe` before it starts.
    pub fn run(&self, input: &ScoringInput, observe: &mut dyn FnMut(Stage)) -> ScoringOutput {
        observe(Stage::Fusion);
        let fused = self.fusion.fuse(
            input.text,
            input.cultural.scs_score,
            input.image,
            input.mode,
        );

        observe(Stage::Intent);
        let intent = self.intent.calculate(&fused, input.matching_text);

        observe(Stage::Behavior);
        let tpb = self
            .tpb
            .score(&fused, intent.score, input.platform, input.influencer);

        let mut alerts = input.cultural.alerts.clone();
        if let Some(image) = input.image {
            alerts.extend(image.alerts());
        }

        observe(Stage::Outcome);
        let outcome = self.outcome.predict(
            &tpb,
            &fused,
            intent.score,
            &alerts,
            input.stats,
            input.platform,
        );

        observe(Stage::Recommendation);
        let recommendation = self.recommendation.recommend(&RecommendationInputs {
            platform: input.platform,
            outcome: Some(&outcome),
            alerts: &alerts,
            festival_alerts: &input.cultural.festival_alerts,
            intent: intent.score,
            tpb: &tpb,
            polarity: fused.polarity,
            subjectivity: fused.subjectivity,
        });

        debug!(
            mode = fused.mode.label(),
            intent = intent.score,
            intention = tpb.behavioral_intention,
            virality = outcome.virality,
            backlash = outcome.backlash_risk,
            verdict = recommendation.verdict.label(),
            "scoring pipeline finished"
        );

        ScoringOutput {
            fused,
            intent,
            tpb,
            outcome,
            recommendation,
            alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cultural::{AlertSource, Severity};
    use crate::scoring::Verdict;
    use crate::text::TextAnalyzer;

    #[test]
    fn stages_are_reported_in_order() {
        let analyzer = TextAnalyzer::with_lexicon().expect("analyzer");
        let text = analyzer.analyze("A warm family dinner");
        let cultural = CulturalReport::default();
        let pipeline = ScoringPipeline::from_config(&ScoringConfig::default(), Arc::default());
        let mut seen = Vec::new();
        let output = pipeline.run(
            &ScoringInput {
                text: &text,
                cultural: &cultural,
                image: None,
                mode: AnalysisMode::TextOnly,
                matching_text: "a warm family dinner",
                platform: Platform::YouTube,
                influencer: false,
                stats: ContentStats::from_caption("A warm family dinner"),
            },
            &mut |stage| seen.push(stage),
        );
        assert_eq!(
            seen,
            vec![
                Stage::Fusion,
                Stage::Intent,
                Stage::Behavior,
                Stage::Outcome,
                Stage::Recommendation
            ]
        );
        assert!(output.alerts.is_empty());
    }

    #[test]
    fn critical_alert_stops_even_with_low_backlash() {
        let analyzer = TextAnalyzer::with_lexicon().expect("analyzer");
        let text = analyzer.analyze("Visit kashmir");
        let cultural = CulturalReport {
            scs_score: 50.0,
            alerts: vec![CulturalAlert {
                keyword: "kashmir".to_string(),
                category: "Geopolitical".to_string(),
                severity: Severity::Critical,
                weight: 40,
                message: "Geopolitically sensitive".to_string(),
                source: AlertSource::Text,
            }],
            ..CulturalReport::default()
        };
        let pipeline = ScoringPipeline::from_config(&ScoringConfig::default(), Arc::default());
        let output = pipeline.run(
            &ScoringInput {
                text: &text,
                cultural: &cultural,
                image: None,
                mode: AnalysisMode::TextOnly,
                matching_text: "visit kashmir",
                platform: Platform::Instagram,
                influencer: false,
                stats: ContentStats::from_caption("Visit kashmir"),
            },
            &mut |_| {},
        );
        assert_eq!(output.recommendation.verdict, Verdict::Stop);
        assert_eq!(output.alerts.len(), 1);
    }
}
