use serde::Serialize;
use std::collections::BTreeMap;

use crate::persona::{ContentProfile, Persona};
use crate::text::Emotion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaAction {
    Share,
    Engage,
    Ignore,
    Report,
}

impl PersonaAction {
    /// `report` needs a poor cultural fit; otherwise weak resonance is ignored.
    pub fn from_scores(resonance: f64, cultural_fit: f64) -> Self {
        if resonance >= 70.0 {
            PersonaAction::Share
        } else if resonance >= 50.0 {
            PersonaAction::Engage
        } else if resonance >= 30.0 || cultural_fit >= 50.0 {
            PersonaAction::Ignore
        } else {
            PersonaAction::Report
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PersonaAction::Share => "share",
            PersonaAction::Engage => "engage",
            PersonaAction::Ignore => "ignore",
            PersonaAction::Report => "report",
        }
    }
}

const PREDICTED_EMOTIONS: [&str; 7] = [
    "joy",
    "interest",
    "skepticism",
    "anger",
    "fear",
    "indifference",
    "excitement",
];

const ACTIONS: [&str; 5] = ["like", "share", "comment", "ignore", "report"];

#[derive(Debug, Clone, Serialize)]
pub struct ResonanceBreakdown {
    pub resonance_score: f64,
    pub value_alignment: f64,
    pub tone_match: f64,
    pub interest_relevance: f64,
    pub cultural_fit: f64,
    pub platform_fit: f64,
    pub emotional_resonance: f64,
    pub personality_modifier: f64,
    pub weighted_sum: f64,
    pub predicted_emotions: BTreeMap<String, f64>,
    pub dominant_emotion: String,
    pub emotional_intensity: f64,
    pub predicted_actions: BTreeMap<String, f64>,
    pub most_likely_action: String,
    pub predicted_action: PersonaAction,
    pub engagement_likelihood: f64,
    pub share_likelihood: f64,
    pub friction_points: Vec<String>,
    pub opportunity_notes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResonanceCalculator;

impl ResonanceCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, content: &ContentProfile, persona: &Persona) -> ResonanceBreakdown {
        let value_alignment = self.value_alignment(content, persona);
        let tone_match = self.tone_match(content, persona);
        let interest_relevance = self.interest_relevance(content, persona);
        let cultural_fit = self.cultural_fit(content, persona);
        let platform_fit = persona.media_behavior.affinity(content.platform) * 100.0;
        let emotional_resonance = self.emotional_resonance(content, persona);

        let weighted_sum = value_alignment * 0.25
            + tone_match * 0.20
            + interest_relevance * 0.20
            + cultural_fit * 0.15
            + platform_fit * 0.10
            + emotional_resonance * 0.10;
        let personality_modifier = self.personality_modifier(content, persona);
        let resonance_score = reported_resonance(weighted_sum * personality_modifier);

        let predicted_emotions = self.predict_emotions(content, persona);
        let (dominant_emotion, _) = strongest(&PREDICTED_EMOTIONS, &predicted_emotions);
        let emotional_intensity = (predicted_emotions.values().sum::<f64>() * 40.0).min(100.0);

        let predicted_actions = self.predict_actions(content, persona, resonance_score);
        let (most_likely_action, _) = strongest(&ACTIONS, &predicted_actions);

        let engagement_likelihood = match persona.media_behavior.engagement_style.as_str() {
            "proactive" => (resonance_score * 1.2).min(100.0),
            "passive" => resonance_score * 0.7,
            "creator" => (resonance_score * 1.3).min(100.0),
            _ => resonance_score,
        };
        let share_base = resonance_score * 0.8;
        let share_likelihood = match persona.media_behavior.sharing_propensity.as_str() {
            "viral" => (share_base * 1.5).min(100.0),
            "frequent" => (share_base * 1.2).min(100.0),
            "never" => share_base * 0.3,
            _ => share_base,
        };

        ResonanceBreakdown {
            resonance_score,
            value_alignment: crate::round_to(value_alignment, 2),
            tone_match: crate::round_to(tone_match, 2),
            interest_relevance: crate::round_to(interest_relevance, 2),
            cultural_fit,
            platform_fit: crate::round_to(platform_fit, 2),
            emotional_resonance: crate::round_to(emotional_resonance, 2),
            personality_modifier: crate::round_to(personality_modifier, 3),
            weighted_sum: crate::round_to(weighted_sum, 2),
            dominant_emotion: dominant_emotion.to_string(),
            emotional_intensity: crate::round_to(emotional_intensity, 2),
            predicted_emotions,
            most_likely_action: most_likely_action.to_string(),
            predicted_actions,
            predicted_action: PersonaAction::from_scores(resonance_score, cultural_fit),
            engagement_likelihood: crate::round_to(engagement_likelihood, 2),
            share_likelihood: crate::round_to(share_likelihood, 2),
            friction_points: self.friction_points(content, persona),
            opportunity_notes: self.opportunity_notes(content, persona),
        }
    }

    pub fn value_alignment(&self, content: &ContentProfile, persona: &Persona) -> f64 {
        let values = &persona.psychographics.core_values;
        if values.is_empty() {
            return 50.0;
        }
        let matches = values
            .iter()
            .filter(|value| content.addresses_value(value))
            .count();
        let mut score = matches as f64 / values.len() as f64 * 100.0;
        let overlap = content
            .moral_categories
            .iter()
            .filter(|category| values.iter().any(|value| value.eq_ignore_ascii_case(category)))
            .count();
        if overlap > 0 {
            score = (score + overlap as f64 * 10.0).min(100.0);
        }
        score
    }

    pub fn tone_match(&self, content: &ContentProfile, persona: &Persona) -> f64 {
        const FORMAL: [&str; 5] = ["please", "kindly", "respectfully", "sincerely", "regards"];
        const CASUAL: [&str; 7] = ["hey", "hi", "lol", "haha", "cool", "awesome", "yeah"];
        let formal = FORMAL
            .iter()
            .filter(|word| crate::text::mentions_word(&content.text, word))
            .count();
        let casual = CASUAL
            .iter()
            .filter(|word| crate::text::mentions_word(&content.text, word))
            .count();

        let mut score = 50.0;
        match persona.cultural_profile.communication_formality.as_str() {
            "formal" if formal > casual => score += 20.0,
            "casual" if casual > formal => score += 20.0,
            "mixed" => score += 10.0,
            _ => {}
        }
        if content.has(Emotion::Humor) && !persona.cultural_profile.humor_styles.is_empty() {
            score += 15.0;
        }
        if content.polarity > 0.3 {
            score += 10.0;
        } else if content.polarity < -0.3 {
            score -= 15.0;
        }
        crate::clamp_score(score)
    }

    pub fn interest_relevance(&self, content: &ContentProfile, persona: &Persona) -> f64 {
        let interests = &persona.psychographics.interests;
        if interests.is_empty() {
            return 50.0;
        }
        let matches = interests
            .iter()
            .filter(|interest| content.addresses_interest(interest))
            .count();
        (matches as f64 / interests.len() as f64 * 100.0).min(100.0)
    }

    /// Safe content fits everyone; risky content loses traditional and devout personas first.
    pub fn cultural_fit(&self, content: &ContentProfile, persona: &Persona) -> f64 {
        let sensitivity = persona.cultural_profile.sensitivity();
        if content.scs < 20.0 {
            90.0
        } else if content.scs < 40.0 {
            if sensitivity < 50.0 {
                75.0
            } else {
                50.0
            }
        } else if sensitivity < 30.0 {
            60.0
        } else if sensitivity < 60.0 {
            30.0
        } else {
            10.0
        }
    }

    pub fn emotional_resonance(&self, content: &ContentProfile, persona: &Persona) -> f64 {
        if content.emotions.is_empty() {
            return 50.0;
        }
        let triggers = &persona.behavioral_triggers;
        let mut score = 50.0;
        for emotion in &content.emotions {
            if triggers.emotional.contains_key(emotion.label()) {
                score += 10.0;
            }
        }
        score += content.count_mentions(&triggers.engagement) as f64 * 5.0;
        score.min(100.0)
    }

    pub fn personality_modifier(&self, content: &ContentProfile, persona: &Persona) -> f64 {
        let traits = &persona.psychographics;
        let mut modifier = 1.0;
        if content.is_creative {
            modifier *= 1.0 + crate::clamp01(traits.openness) * 0.2;
        }
        if content.is_detailed {
            modifier *= 1.0 + crate::clamp01(traits.conscientiousness) * 0.15;
        }
        if content.is_social {
            modifier *= 1.0 + crate::clamp01(traits.extraversion) * 0.15;
        }
        if content.is_warm {
            modifier *= 1.0 + crate::clamp01(traits.agreeableness) * 0.1;
        }
        if content.has(Emotion::Fear) || content.has(Emotion::Urgency) {
            modifier *= 1.0 + crate::clamp01(traits.neuroticism) * 0.1;
        }
        modifier.max(0.8).min(1.5)
    }

    pub fn predict_emotions(
        &self,
        content: &ContentProfile,
        persona: &Persona,
    ) -> BTreeMap<String, f64> {
        let mut scores: BTreeMap<&'static str, f64> =
            PREDICTED_EMOTIONS.iter().map(|emotion| (*emotion, 0.0)).collect();

        for emotion in &content.emotions {
            match emotion {
                Emotion::Joy | Emotion::Anger | Emotion::Fear => {
                    scores.insert(emotion.label(), 0.6);
                }
                Emotion::Humor => bump(&mut scores, "joy", 0.4),
                Emotion::Nostalgia => bump(&mut scores, "interest", 0.3),
                Emotion::Pride => bump(&mut scores, "joy", 0.3),
                Emotion::Inspiration => bump(&mut scores, "excitement", 0.4),
                Emotion::Urgency => bump(&mut scores, "excitement", 0.3),
                _ => {}
            }
        }

        let triggers = &persona.behavioral_triggers;
        for (kind, keywords) in &triggers.emotional {
            let hits = content.count_mentions(keywords) as f64;
            if hits == 0.0 {
                continue;
            }
            match kind.as_str() {
                "joy" | "happiness" => bump(&mut scores, "joy", (hits * 0.2).min(0.4)),
                "anger" | "frustration" => bump(&mut scores, "anger", (hits * 0.2).min(0.4)),
                "fear" | "anxiety" => bump(&mut scores, "fear", (hits * 0.2).min(0.4)),
                _ => bump(&mut scores, "interest", (hits * 0.1).min(0.3)),
            }
        }

        let engagement = content.count_mentions(&triggers.engagement) as f64;
        if engagement > 0.0 {
            bump(&mut scores, "interest", (engagement * 0.15).min(0.4));
            bump(&mut scores, "excitement", (engagement * 0.1).min(0.3));
        }
        let friction = content.count_mentions(&triggers.friction) as f64;
        if friction > 0.0 {
            bump(&mut scores, "skepticism", (friction * 0.2).min(0.5));
            bump(&mut scores, "anger", (friction * 0.15).min(0.4));
        }

        if content.polarity > 0.3 {
            bump(&mut scores, "joy", 0.3);
            bump(&mut scores, "excitement", 0.2);
        } else if content.polarity < -0.3 {
            bump(&mut scores, "anger", 0.2);
            bump(&mut scores, "skepticism", 0.2);
        } else {
            bump(&mut scores, "indifference", 0.2);
        }

        let traits = &persona.psychographics;
        if traits.neuroticism > 0.6 {
            scale(&mut scores, "fear", 1.2);
            scale(&mut scores, "anger", 1.1);
        }
        if traits.extraversion > 0.7 {
            scale(&mut scores, "joy", 1.2);
            scale(&mut scores, "excitement", 1.2);
        }
        if traits.openness < 0.4 {
            bump(&mut scores, "skepticism", 0.2);
        }

        for value in scores.values_mut() {
            *value = value.min(1.0);
        }
        if scores.values().all(|value| *value < 0.1) {
            scores.insert("indifference", 0.6);
        }
        scores
            .into_iter()
            .map(|(emotion, value)| (emotion.to_string(), crate::round_to(value, 2)))
            .collect()
    }

    pub fn predict_actions(
        &self,
        content: &ContentProfile,
        persona: &Persona,
        resonance: f64,
    ) -> BTreeMap<String, f64> {
        let media = &persona.media_behavior;
        let triggers = &persona.behavioral_triggers;
        let factor = resonance / 100.0;

        let mut like = factor
            * match media.engagement_style.as_str() {
                "passive" => 0.3,
                "reactive" => 0.6,
                "proactive" => 0.8,
                "creator" => 0.7,
                _ => 0.0,
            };
        if content.polarity > 0.3 {
            like += 0.1;
        }

        let share_base = match media.sharing_propensity.as_str() {
            "never" => 0.05,
            "frequent" => 0.6,
            "viral" => 0.8,
            _ => 0.3,
        };
        let share_hits = content.count_mentions(&triggers.share) as f64;
        let mut share = share_base * factor;
        if share_hits > 0.0 {
            share += (share_hits * 0.1).min(0.3);
        }

        let comment_base = match media.comment_likelihood.as_str() {
            "never" => 0.02,
            "rare" => 0.15,
            "sometimes" => 0.4,
            "often" => 0.7,
            _ => 0.2,
        };
        let mut comment = comment_base * factor;
        if matches!(media.engagement_style.as_str(), "proactive" | "creator") {
            comment += 0.15;
        }

        let mut ignore = 1.0 - factor;
        let ignore_hits = content.count_mentions(&triggers.ignore) as f64;
        if ignore_hits > 0.0 {
            ignore += (ignore_hits * 0.15).min(0.4);
        }
        if media.engagement_style == "passive" {
            ignore += 0.2;
        }

        let mut report = 0.02;
        let report_hits = content.count_mentions(&triggers.report) as f64;
        if report_hits > 0.0 {
            report += (report_hits * 0.2).min(0.6);
        }
        if content.scs > 60.0 {
            report += 0.2;
        }
        if persona.cultural_profile.traditionalism > 70.0 {
            report *= 1.5;
        }

        let like = crate::clamp01(like);
        let share = crate::clamp01(share);
        let comment = crate::clamp01(comment);
        let mut ignore = crate::clamp01(ignore);
        let report = crate::clamp01(report);
        if like + share + comment > 0.5 {
            ignore *= 0.5;
        }

        [
            ("like", like),
            ("share", share),
            ("comment", comment),
            ("ignore", ignore),
            ("report", report),
        ]
        .into_iter()
        .map(|(action, value)| (action.to_string(), crate::round_to(value, 2)))
        .collect()
    }

    /// Alert categories that collide with who the persona is, plus its own friction and
    /// report triggers.
    pub fn friction_points(&self, content: &ContentProfile, persona: &Persona) -> Vec<String> {
        let profile = &persona.cultural_profile;
        let values = &persona.psychographics.core_values;
        let holds = |value: &str| values.iter().any(|held| held == value);
        let mut points = Vec::new();

        for category in &content.alert_categories {
            let point = match category.as_str() {
                "Religious" if profile.religious_sensitivity >= 60.0 => Some(
                    "Religious references clash with high religious sensitivity".to_string(),
                ),
                "Colorism" | "Compound Pattern"
                    if holds("diversity") || holds("authenticity") || holds("respect") =>
                {
                    Some("Skin-tone or body framing contradicts inclusive values".to_string())
                }
                "Gender" if holds("freedom") || holds("progress") => {
                    Some("Gender stereotypes conflict with progressive values".to_string())
                }
                "Festival Timing" | "Religious" | "Caste" if profile.traditionalism >= 60.0 => Some(
                    format!("{} concerns weigh heavily on a traditional outlook", category),
                ),
                "Regional" if profile.regional_identity >= 60.0 => {
                    Some("Regional references touch a strong regional identity".to_string())
                }
                _ if profile.sensitivity() >= 50.0 => {
                    Some(format!("{} sensitivities may alienate this persona", category))
                }
                _ => None,
            };
            if let Some(point) = point {
                points.push(point);
            }
        }

        let triggers = &persona.behavioral_triggers;
        for trigger in triggers.friction.iter().filter(|term| content.mentions(term)) {
            points.push(format!("Contains friction trigger: {}", trigger));
        }
        for trigger in triggers.report.iter().filter(|term| content.mentions(term)) {
            points.push(format!("Contains report trigger: {}", trigger));
        }
        points.dedup();
        points
    }

    /// Persona values and interests the campaign leaves untouched.
    pub fn opportunity_notes(&self, content: &ContentProfile, persona: &Persona) -> Vec<String> {
        let psychographics = &persona.psychographics;
        let mut notes: Vec<String> = psychographics
            .core_values
            .iter()
            .filter(|value| !content.addresses_value(value))
            .take(3)
            .map(|value| format!("Speak to the value of {}", value.replace('_', " ")))
            .collect();
        notes.extend(
            psychographics
                .interests
                .iter()
                .filter(|interest| !content.addresses_interest(interest))
                .take(3)
                .map(|interest| format!("Tie in an interest in {}", interest.replace('_', " "))),
        );
        notes
    }
}

fn bump(scores: &mut BTreeMap<&'static str, f64>, emotion: &str, amount: f64) {
    if let Some(value) = scores.get_mut(emotion) {
        *value += amount;
    }
}

fn scale(scores: &mut BTreeMap<&'static str, f64>, emotion: &str, factor: f64) {
    if let Some(value) = scores.get_mut(emotion) {
        *value *= factor;
    }
}

/// First entry in `order` holding the largest value.
fn strongest<'a>(order: &[&'a str], scores: &BTreeMap<String, f64>) -> (&'a str, f64) {
    let mut best = (order[0], f64::MIN);
    for key in order {
        let value = scores.get(*key).copied().unwrap_or(0.0);
        if value > best.1 {
            best = (*key, value);
        }
    }
    best
}

/// Clamped and rounded once, so actions and likelihoods use the same value that is reported.
fn reported_resonance(raw: f64) -> f64 {
    crate::round_to(crate::clamp_score(raw), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::fixtures::persona;
    use crate::scoring::{AnalysisMode, FusedSignals, RiskSource};
    use crate::text::MoralFraming;
    use crate::Platform;

    fn profile(text: &str, polarity: f64, scs: f64, emotions: Vec<Emotion>) -> ContentProfile {
        let fused = FusedSignals {
            mode: AnalysisMode::TextOnly,
            emc: 45.0,
            nam: 10.0,
            scs,
            text_emc: 45.0,
            text_scs: scs,
            image_emc: None,
            image_scs: None,
            polarity,
            subjectivity: 0.5,
            emotions,
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
            Platform::Instagram,
        )
    }

    #[test]
    fn action_thresholds() {
        assert_eq!(PersonaAction::from_scores(72.0, 90.0), PersonaAction::Share);
        assert_eq!(PersonaAction::from_scores(55.0, 90.0), PersonaAction::Engage);
        assert_eq!(PersonaAction::from_scores(35.0, 10.0), PersonaAction::Ignore);
        assert_eq!(PersonaAction::from_scores(20.0, 10.0), PersonaAction::Report);
        assert_eq!(PersonaAction::from_scores(20.0, 60.0), PersonaAction::Ignore);
    }

    #[test]
    fn action_uses_the_reported_score() {
        let reported = reported_resonance(69.996);
        assert_eq!(reported, 70.0);
        assert_eq!(PersonaAction::from_scores(reported, 90.0), PersonaAction::Share);
        assert_eq!(reported_resonance(140.0), 100.0);

        let calculator = ResonanceCalculator::new();
        let native = persona("gen_z_metro");
        let content = profile("A relatable trend for music lovers", 0.5, 10.0, vec![Emotion::Joy]);
        let breakdown = calculator.calculate(&content, &native);
        assert_eq!(
            breakdown.predicted_action,
            PersonaAction::from_scores(breakdown.resonance_score, breakdown.cultural_fit)
        );
        let engagement = (breakdown.resonance_score * 1.2).min(100.0);
        assert!((breakdown.engagement_likelihood - crate::round_to(engagement, 2)).abs() < 1e-9);
    }

    #[test]
    fn cultural_fit_ladder() {
        let calculator = ResonanceCalculator::new();
        let progressive = persona("gen_z_metro");
        let mut devout = persona("values_devout");
        devout.cultural_profile.traditionalism = 85.0;
        devout.cultural_profile.religious_sensitivity = 90.0;
        let safe = profile("hello", 0.0, 10.0, Vec::new());
        let risky = profile("hello", 0.0, 80.0, Vec::new());
        assert_eq!(calculator.cultural_fit(&safe, &devout), 90.0);
        assert_eq!(calculator.cultural_fit(&risky, &progressive), 60.0);
        assert_eq!(calculator.cultural_fit(&risky, &devout), 10.0);
    }

    #[test]
    fn resonance_stays_in_range_and_uses_triggers() {
        let calculator = ResonanceCalculator::new();
        let native = persona("gen_z_metro");
        let content = profile(
            "A new relatable trend drop for fun music lovers, share with friends",
            0.6,
            0.0,
            vec![Emotion::Joy, Emotion::Humor],
        );
        let breakdown = calculator.calculate(&content, &native);
        assert!((0.0..=100.0).contains(&breakdown.resonance_score));
        assert!(breakdown.personality_modifier > 1.0 && breakdown.personality_modifier <= 1.5);
        assert_eq!(breakdown.dominant_emotion, "joy");
        assert!((breakdown.platform_fit - 100.0).abs() < 1e-9);
        assert!(breakdown.emotional_resonance >= 60.0);
        assert!(breakdown.engagement_likelihood >= breakdown.resonance_score);
    }

    #[test]
    fn friction_and_opportunities() {
        let calculator = ResonanceCalculator::new();
        let native = persona("gen_z_metro");
        let mut content = profile("A preachy message", -0.4, 45.0, Vec::new());
        content.alert_categories = vec!["Colorism".to_string()];
        let friction = calculator.friction_points(&content, &native);
        assert!(friction.iter().any(|point| point.contains("inclusive values")));
        assert!(friction.iter().any(|point| point.contains("preachy")));
        let notes = calculator.opportunity_notes(&content, &native);
        assert!(notes.iter().any(|note| note.contains("freedom")));
        assert!(notes.len() <= 6);
    }
}
