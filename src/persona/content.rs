use serde::Serialize;
use std::collections::BTreeSet;

use crate::cultural::CulturalAlert;
use crate::scoring::FusedSignals;
use crate::text::{mentions, mentions_word, Emotion, MoralFraming};
use crate::Platform;

const VALUE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "family",
        &["family", "families", "parent", "mother", "father", "children", "home", "together"],
    ),
    ("success", &["success", "achieve", "achievement", "win", "victory", "excellence", "best"]),
    ("tradition", &["tradition", "heritage", "culture", "custom", "ritual", "ancient"]),
    ("freedom", &["freedom", "liberty", "independent", "choice", "free"]),
    ("authenticity", &["authentic", "genuine", "real", "honest", "truth", "transparent"]),
    ("diversity", &["diverse", "diversity", "inclusive", "inclusion", "different", "variety"]),
    ("sustainability", &["sustainab", "eco", "green", "environment", "planet", "nature"]),
    ("creativity", &["creativ", "art", "innovative", "original"]),
    ("community", &["community", "together", "collective", "society", "social", "unity"]),
    ("quality", &["quality", "premium", "excellence", "superior", "finest", "best"]),
    ("innovation", &["innovat", "new", "modern", "future", "advanced"]),
    ("trust", &["trust", "reliable", "dependable", "honest", "integrity"]),
    ("respect", &["respect", "honor", "dignity", "esteem"]),
    ("progress", &["progress", "growth", "development", "improve", "better", "forward"]),
];

const INTEREST_KEYWORDS: &[(&str, &[&str])] = &[
    ("technology", &["tech", "digital", "app", "software", "ai", "gadget", "device", "online"]),
    ("fashion", &["fashion", "style", "clothing", "outfit", "trend", "wear", "dress", "look"]),
    ("sports", &["sport", "game", "fitness", "athletic", "team", "match", "cricket"]),
    ("travel", &["travel", "trip", "journey", "destination", "explore", "adventure", "vacation"]),
    ("food", &["food", "eat", "cook", "recipe", "taste", "delicious", "meal", "cuisine", "burger"]),
    ("music", &["music", "song", "sing", "artist", "band", "concert", "listen"]),
    ("entertainment", &["entertainment", "movie", "show", "watch", "fun", "enjoy"]),
    ("health", &["health", "wellness", "fitness", "exercise", "workout"]),
    ("beauty", &["beauty", "makeup", "skincare", "cosmetic", "glow", "beautiful"]),
    ("education", &["learn", "education", "study", "knowledge", "skill", "course", "teach"]),
    ("finance", &["money", "financ", "invest", "save", "bank", "wealth"]),
    ("gaming", &["gaming", "gamer", "console", "esports"]),
    ("activism", &["activism", "cause", "movement", "justice", "rights"]),
    ("social_media", &["social", "post", "share", "follow", "viral", "trending"]),
];

const CREATIVE_CUES: &[&str] =
    &["new", "innovative", "unique", "creative", "original", "different"];
const DETAIL_CUES: &[&str] = &["detail", "fact", "proven", "research", "study", "data"];
const SOCIAL_CUES: &[&str] = &["share", "together", "community", "join", "connect", "social"];
const WARM_CUES: &[&str] = &["care", "help", "support", "kind", "love", "together", "family"];
const ASPIRATIONAL_CUES: &[&str] = &[
    "luxury", "premium", "exclusive", "elite", "dream", "aspire", "success", "upgrade", "lifestyle",
];
const PREMIUM_CUES: &[&str] =
    &["premium", "luxury", "exclusive", "limited edition", "designer", "elite"];
const FAMILY_CUES: &[&str] = &["family", "mother", "father", "parent", "children", "home"];
const RELATIONSHIP_CUES: &[&str] = &["friend", "love", "partner", "relationship", "couple"];

fn any_cue(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| mentions(text, cue))
}

fn tagged(text: &str, table: &[(&'static str, &[&str])]) -> Vec<String> {
    table
        .iter()
        .filter(|(tag, keywords)| mentions_word(text, tag) || any_cue(text, keywords))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// Keyword list for a known value or interest tag.
fn keywords_for<'a>(
    table: &'a [(&'static str, &'a [&'a str])],
    tag: &str,
) -> Option<&'a [&'a str]> {
    table
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, keywords)| *keywords)
}

/// Campaign signals reduced to the tags and flags persona scoring works from.
#[derive(Debug, Clone, Serialize)]
pub struct ContentProfile {
    /// Lowercased caption plus OCR text, apostrophes removed.
    pub text: String,
    pub platform: Platform,
    pub polarity: f64,
    pub emotions: Vec<Emotion>,
    pub emc: f64,
    pub nam: f64,
    pub scs: f64,
    pub word_count: usize,
    pub moral_categories: Vec<String>,
    pub alert_categories: Vec<String>,
    pub values: Vec<String>,
    pub topics: Vec<String>,
    pub themes: Vec<String>,
    pub is_creative: bool,
    pub is_detailed: bool,
    pub is_social: bool,
    pub is_warm: bool,
    pub is_aspirational: bool,
    pub is_premium: bool,
    pub is_complex: bool,
}

impl ContentProfile {
    pub fn build(
        matching_text: &str,
        word_count: usize,
        framing: &MoralFraming,
        fused: &FusedSignals,
        alerts: &[CulturalAlert],
        platform: Platform,
    ) -> Self {
        let text = matching_text.to_string();
        let mut themes = Vec::new();
        if any_cue(&text, FAMILY_CUES) {
            themes.push("family".to_string());
        }
        if any_cue(&text, RELATIONSHIP_CUES) {
            themes.push("relationships".to_string());
        }
        let alert_categories: BTreeSet<String> =
            alerts.iter().map(|alert| alert.category.clone()).collect();

        Self {
            platform,
            polarity: fused.polarity,
            emotions: fused.emotions.clone(),
            emc: fused.emc,
            nam: fused.nam,
            scs: fused.scs,
            word_count,
            moral_categories: framing
                .categories
                .iter()
                .map(|category| category.label().to_string())
                .collect(),
            alert_categories: alert_categories.into_iter().collect(),
            values: tagged(&text, VALUE_KEYWORDS),
            topics: tagged(&text, INTEREST_KEYWORDS),
            themes,
            is_creative: any_cue(&text, CREATIVE_CUES),
            is_detailed: any_cue(&text, DETAIL_CUES),
            is_social: any_cue(&text, SOCIAL_CUES) || fused.has(Emotion::Joy),
            is_warm: any_cue(&text, WARM_CUES),
            is_aspirational: any_cue(&text, ASPIRATIONAL_CUES),
            is_premium: any_cue(&text, PREMIUM_CUES),
            is_complex: word_count > 80 || fused.nam > 50.0,
            text,
        }
    }

    pub fn has(&self, emotion: Emotion) -> bool {
        self.emotions.contains(&emotion)
    }

    pub fn mentions(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        !term.is_empty() && mentions(&self.text, &term)
    }

    /// Counts the terms the text mentions.
    pub fn count_mentions(&self, terms: &[String]) -> usize {
        terms.iter().filter(|term| self.mentions(term)).count()
    }

    /// True when the persona value tag is spoken to by the text.
    pub fn addresses_value(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        if self.values.contains(&value) || self.mentions(&value) {
            return true;
        }
        keywords_for(VALUE_KEYWORDS, &value)
            .map(|keywords| any_cue(&self.text, keywords))
            .unwrap_or(false)
    }

    pub fn addresses_interest(&self, interest: &str) -> bool {
        let interest = interest.to_lowercase();
        if self.topics.contains(&interest) || self.mentions(&interest.replace('_', " ")) {
            return true;
        }
        keywords_for(INTEREST_KEYWORDS, &interest)
            .map(|keywords| any_cue(&self.text, keywords))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{AnalysisMode, RiskSource};

    fn fused(polarity: f64, emotions: Vec<Emotion>) -> FusedSignals {
        FusedSignals {
            mode: AnalysisMode::TextOnly,
            emc: 45.0,
            nam: 10.0,
            scs: 0.0,
            text_emc: 45.0,
            text_scs: 0.0,
            image_emc: None,
            image_scs: None,
            polarity,
            subjectivity: 0.5,
            emotions,
            modality_agreement: 0.0,
            cultural_symbols: Vec::new(),
            primary_risk_source: RiskSource::Text,
            conflict: false,
        }
    }

    #[test]
    fn tags_values_topics_and_flags() {
        let profile = ContentProfile::build(
            "celebrating indias diversity with family and a new playlist of music",
            11,
            &MoralFraming::default(),
            &fused(0.5, vec![Emotion::Joy]),
            &[],
            Platform::Instagram,
        );
        assert!(profile.values.contains(&"diversity".to_string()));
        assert!(profile.values.contains(&"family".to_string()));
        assert!(profile.topics.contains(&"music".to_string()));
        assert!(profile.themes.contains(&"family".to_string()));
        assert!(profile.is_creative);
        assert!(profile.is_social);
        assert!(!profile.is_premium);
        assert!(profile.addresses_value("diversity"));
        assert!(!profile.addresses_interest("finance"));
    }
}
