//! Text signal extraction: sentiment, emotions, moral framing and narrative ambiguity.

pub mod ambiguity;
pub mod emotion;
pub mod moral;
pub mod sentiment;

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub use ambiguity::{AmbiguityReport, ClarityMetrics, OpennessMetrics};
pub use emotion::{Emotion, EmotionDetector, EmotionHit};
pub use moral::{MoralFraming, MoralViolation, MoralViolations};
pub use sentiment::{LexiconSentiment, SentimentAnalyzer, SentimentLabel, SentimentScores};

/// Lowercases and drops apostrophes so "India's" and "indias" match the same keywords.
pub fn matching_text(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|ch| *ch != '\'' && *ch != '\u{2019}')
        .collect()
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

/// True when `term` occurs in `text` starting at a word boundary
/// ("celebrat" matches "celebration").
pub fn mentions(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    text.match_indices(term).any(|(idx, _)| {
        text[..idx]
            .chars()
            .next_back()
            .map_or(true, |ch| !is_word_char(ch))
    })
}

/// True when `term` occurs in `text` as a whole word or phrase.
pub fn mentions_word(text: &str, term: &str) -> bool {
    count_words(text, term) > 0
}

pub fn count_words(text: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    text.match_indices(term)
        .filter(|(idx, matched)| {
            let before_ok = text[..*idx]
                .chars()
                .next_back()
                .map_or(true, |ch| !is_word_char(ch));
            let after_ok = text[idx + matched.len()..]
                .chars()
                .next()
                .map_or(true, |ch| !is_word_char(ch));
            before_ok && after_ok
        })
        .count()
}

pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '-'))
        .filter(|token| !token.is_empty())
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct TextSignals {
    pub cleaned_text: String,
    pub word_count: usize,
    pub hashtag_count: usize,
    pub sentiment: SentimentScores,
    pub emotions: Vec<EmotionHit>,
    pub moral_framing: MoralFraming,
    pub moral_violations: MoralViolations,
    pub arousal: f64,
    pub emc_score: f64,
    pub emc_components: BTreeMap<String, f64>,
    pub ambiguity: AmbiguityReport,
    pub nam_score: f64,
}

impl TextSignals {
    pub fn empty() -> Self {
        Self {
            cleaned_text: String::new(),
            word_count: 0,
            hashtag_count: 0,
            sentiment: SentimentScores::neutral(),
            emotions: Vec::new(),
            moral_framing: MoralFraming::default(),
            moral_violations: MoralViolations::default(),
            arousal: 0.0,
            emc_score: 0.0,
            emc_components: BTreeMap::new(),
            ambiguity: AmbiguityReport::default(),
            nam_score: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    pub fn emotion_labels(&self) -> Vec<Emotion> {
        self.emotions.iter().map(|hit| hit.emotion).collect()
    }

    pub fn has_emotion(&self, emotion: Emotion) -> bool {
        self.emotions.iter().any(|hit| hit.emotion == emotion)
    }
}

pub struct TextAnalyzer {
    sentiment: Arc<dyn SentimentAnalyzer>,
    emotions: EmotionDetector,
    url_re: Regex,
    mention_re: Regex,
    hashtag_re: Regex,
}

impl TextAnalyzer {
    pub fn new(sentiment: Arc<dyn SentimentAnalyzer>) -> Result<Self, String> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|err| format!("invalid text pattern {}: {}", pattern, err))
        };
        Ok(Self {
            sentiment,
            emotions: EmotionDetector::default(),
            url_re: compile(r"https?://\S+")?,
            mention_re: compile(r"@\w+")?,
            hashtag_re: compile(r"#(\w+)")?,
        })
    }

    pub fn with_lexicon() -> Result<Self, String> {
        Self::new(Arc::new(LexiconSentiment::default()))
    }

    /// Strips URLs and @mentions, keeps hashtag words and collapses whitespace.
    pub fn clean(&self, text: &str) -> String {
        let without_urls = self.url_re.replace_all(text, "");
        let without_mentions = self.mention_re.replace_all(&without_urls, "");
        let hashtags = self.hashtag_re.replace_all(&without_mentions, "$1");
        hashtags.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn analyze(&self, raw: &str) -> TextSignals {
        let cleaned = self.clean(raw);
        if cleaned.is_empty() {
            return TextSignals::empty();
        }
        let matching = matching_text(&cleaned);
        let sentiment = self.sentiment.analyze(&cleaned);
        let emotions = self.emotions.detect(&matching);
        let moral_framing = moral::detect_framing(&matching);
        let moral_violations = moral::detect_violations(&matching);

        let arousal = (sentiment.polarity.abs() + sentiment.subjectivity * 0.5).min(1.0);
        let (emc_score, emc_components) =
            emc_score(&sentiment, emotions.len(), &moral_framing, &moral_violations, arousal);

        let ambiguity = ambiguity::measure(&cleaned, raw, &matching, sentiment.subjectivity);
        let nam_score = ambiguity.nam_score;

        debug!(
            polarity = sentiment.polarity,
            emotions = emotions.len(),
            emc = emc_score,
            nam = nam_score,
            "text signals extracted"
        );

        TextSignals {
            word_count: cleaned.split_whitespace().count(),
            hashtag_count: raw.matches('#').count(),
            cleaned_text: cleaned,
            sentiment,
            emotions,
            moral_framing,
            moral_violations,
            arousal,
            emc_score,
            emc_components,
            ambiguity,
            nam_score,
        }
    }
}

fn emc_score(
    sentiment: &SentimentScores,
    emotion_count: usize,
    framing: &MoralFraming,
    violations: &MoralViolations,
    arousal: f64,
) -> (f64, BTreeMap<String, f64>) {
    let sentiment_component = sentiment.polarity.abs() * 40.0;
    let emotion_component = (emotion_count as f64 / 7.0 * 15.0).min(15.0);

    let keyword_score = (framing.keyword_count as f64 / 10.0 * 100.0).min(100.0);
    let keyword_component = keyword_score * 0.6 + framing.alignment_score * 0.4;
    let violation_score = (violations.total_score as f64 / 140.0 * 100.0).min(100.0);
    let moral_component = (keyword_component * 0.4 + violation_score * 0.6) * 0.25;

    let arousal_component = arousal * 20.0;

    let mut emc = sentiment_component + emotion_component + moral_component + arousal_component;
    if violations.total_score > 20 {
        emc *= 1.3;
    }

    let mut components = BTreeMap::new();
    components.insert("sentiment".to_string(), sentiment_component);
    components.insert("emotion".to_string(), emotion_component);
    components.insert("moral".to_string(), moral_component);
    components.insert("arousal".to_string(), arousal_component);
    (crate::clamp_score(emc), components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_respects_word_starts() {
        assert!(mentions("celebrating indias diversity", "india"));
        assert!(mentions("a new whitening cream", "white"));
        assert!(!mentions("totally unfair", "fair"));
        assert!(!mentions_word("whitening", "white"));
        assert!(mentions_word("fair skin", "fair"));
    }

    #[test]
    fn clean_removes_urls_and_mentions() {
        let analyzer = TextAnalyzer::with_lexicon().expect("analyzer");
        let cleaned = analyzer.clean("Hi @brand see https://x.co/a #Diwali   vibes");
        assert_eq!(cleaned, "Hi see Diwali vibes");
    }

    #[test]
    fn empty_text_yields_zero_scores() {
        let analyzer = TextAnalyzer::with_lexicon().expect("analyzer");
        let signals = analyzer.analyze("   ");
        assert!(signals.is_empty());
        assert_eq!(signals.emc_score, 0.0);
        assert_eq!(signals.nam_score, 0.0);
    }
}
