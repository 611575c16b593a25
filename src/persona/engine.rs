use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::persona::{
    ContentProfile, PersonaAction, PersonaCatalog, PersonaTpb, PersonaTpbModifier,
    ResonanceBreakdown, ResonanceCalculator,
};
use crate::scoring::{TpbScores, TpbWeights};

#[derive(Debug, Clone, Serialize)]
pub struct PersonaResult {
    pub persona_id: String,
    pub persona_name: String,
    pub avatar_emoji: String,
    pub tagline: String,
    pub category: String,
    pub resonance_score: f64,
    pub predicted_action: PersonaAction,
    pub dominant_emotion: String,
    pub engagement_likelihood: f64,
    pub share_likelihood: f64,
    pub friction_points: Vec<String>,
    pub opportunity_notes: Vec<String>,
    pub breakdown: ResonanceBreakdown,
    pub tpb: PersonaTpb,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonaAnalysis {
    /// In request order, without unknown or repeated ids.
    pub results: Vec<PersonaResult>,
    pub best_fit: Vec<String>,
    pub worst_fit: Vec<String>,
    pub average_resonance: f64,
    pub resonance_variance: f64,
    pub universal_appeal: f64,
    pub omitted: Vec<String>,
}

impl PersonaAnalysis {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub struct PersonaEngine {
    catalog: Arc<PersonaCatalog>,
    resonance: ResonanceCalculator,
    modifier: PersonaTpbModifier,
}

impl PersonaEngine {
    pub fn new(catalog: Arc<PersonaCatalog>) -> Self {
        Self {
            catalog,
            resonance: ResonanceCalculator::new(),
            modifier: PersonaTpbModifier::new(),
        }
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    pub fn analyze(
        &self,
        ids: &[String],
        content: &ContentProfile,
        base_tpb: &TpbScores,
        weights: &TpbWeights,
    ) -> PersonaAnalysis {
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        let mut omitted = Vec::new();

        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            let Some(persona) = self.catalog.get(id) else {
                warn!(persona = %id, "unknown persona id, skipping");
                omitted.push(id.clone());
                continue;
            };
            let breakdown = self.resonance.calculate(content, persona);
            let tpb = self.modifier.modify(base_tpb, weights, persona, content);
            results.push(PersonaResult {
                persona_id: persona.id.clone(),
                persona_name: persona.name.clone(),
                avatar_emoji: persona.avatar_emoji.clone(),
                tagline: persona.tagline.clone(),
                category: persona.category.clone(),
                resonance_score: breakdown.resonance_score,
                predicted_action: breakdown.predicted_action,
                dominant_emotion: breakdown.dominant_emotion.clone(),
                engagement_likelihood: breakdown.engagement_likelihood,
                share_likelihood: breakdown.share_likelihood,
                friction_points: breakdown.friction_points.clone(),
                opportunity_notes: breakdown.opportunity_notes.clone(),
                breakdown,
                tpb,
            });
        }

        let analysis = aggregate(results, omitted);
        debug!(
            personas = analysis.results.len(),
            omitted = analysis.omitted.len(),
            average = analysis.average_resonance,
            "persona resonance scored"
        );
        analysis
    }
}

fn aggregate(results: Vec<PersonaResult>, omitted: Vec<String>) -> PersonaAnalysis {
    if results.is_empty() {
        return PersonaAnalysis {
            results,
            best_fit: Vec::new(),
            worst_fit: Vec::new(),
            average_resonance: 0.0,
            resonance_variance: 0.0,
            universal_appeal: 0.0,
            omitted,
        };
    }

    let scores: Vec<f64> = results.iter().map(|result| result.resonance_score).collect();
    let count = scores.len() as f64;
    let average = scores.iter().sum::<f64>() / count;
    let variance = scores
        .iter()
        .map(|score| (score - average).powi(2))
        .sum::<f64>()
        / count;

    let mut ranked: Vec<&PersonaResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.resonance_score
            .partial_cmp(&a.resonance_score)
            .unwrap_or(Ordering::Equal)
    });
    let best_fit = ranked
        .iter()
        .take(3)
        .map(|result| result.persona_id.clone())
        .collect();
    let worst_fit = ranked
        .iter()
        .rev()
        .take(3)
        .map(|result| result.persona_id.clone())
        .collect();

    PersonaAnalysis {
        best_fit,
        worst_fit,
        average_resonance: crate::round_to(average, 2),
        resonance_variance: crate::round_to(variance, 2),
        universal_appeal: crate::round_to((100.0 - variance / 10.0).max(0.0), 2),
        results,
        omitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::fixtures::persona;
    use crate::scoring::{AnalysisMode, FusedSignals, RiskSource};
    use crate::text::{Emotion, MoralFraming};
    use crate::Platform;

    fn engine() -> PersonaEngine {
        let mut traditional = persona("boomer_traditional");
        traditional.cultural_profile.traditionalism = 85.0;
        traditional.cultural_profile.religious_sensitivity = 80.0;
        traditional.media_behavior.engagement_style = "passive".to_string();
        let catalog = PersonaCatalog::from_personas(vec![persona("gen_z_metro"), traditional])
            .expect("catalog");
        PersonaEngine::new(Arc::new(catalog))
    }

    fn profile(scs: f64) -> ContentProfile {
        let fused = FusedSignals {
            mode: AnalysisMode::TextOnly,
            emc: 50.0,
            nam: 5.0,
            scs,
            text_emc: 50.0,
            text_scs: scs,
            image_emc: None,
            image_scs: None,
            polarity: 0.4,
            subjectivity: 0.5,
            emotions: vec![Emotion::Joy],
            modality_agreement: 0.0,
            cultural_symbols: Vec::new(),
            primary_risk_source: RiskSource::Text,
            conflict: false,
        };
        ContentProfile::build(
            "new music trend for fun friends",
            6,
            &MoralFraming::default(),
            &fused,
            &[],
            Platform::Instagram,
        )
    }

    #[test]
    fn unknown_ids_are_omitted_not_fatal() {
        let engine = engine();
        let base = TpbScores::from_components(&TpbWeights::default(), 70.0, 70.0, 70.0);
        let ids = vec![
            "gen_z_metro".to_string(),
            "martian_voter".to_string(),
            "gen_z_metro".to_string(),
        ];
        let analysis = engine.analyze(&ids, &profile(0.0), &base, &TpbWeights::default());
        assert_eq!(analysis.results.len(), 1);
        assert_eq!(analysis.omitted, vec!["martian_voter".to_string()]);
        assert_eq!(analysis.resonance_variance, 0.0);
        assert_eq!(analysis.universal_appeal, 100.0);
    }

    #[test]
    fn ranks_best_and_worst_fit() {
        let engine = engine();
        let base = TpbScores::from_components(&TpbWeights::default(), 70.0, 70.0, 70.0);
        let ids = vec!["boomer_traditional".to_string(), "gen_z_metro".to_string()];
        let analysis = engine.analyze(&ids, &profile(70.0), &base, &TpbWeights::default());
        assert_eq!(analysis.results[0].persona_id, "boomer_traditional");
        assert_eq!(analysis.best_fit[0], "gen_z_metro");
        assert_eq!(analysis.worst_fit[0], "boomer_traditional");
        assert!(analysis.universal_appeal <= 100.0 && analysis.universal_appeal >= 0.0);
        for result in &analysis.results {
            assert!((0.0..=100.0).contains(&result.resonance_score));
        }
    }
}
