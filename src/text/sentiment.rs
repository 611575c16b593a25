use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.05 {
            SentimentLabel::Positive
        } else if polarity < -0.05 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentScores {
    pub polarity: f64,
    pub subjectivity: f64,
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub label: SentimentLabel,
}

impl SentimentScores {
    pub fn neutral() -> Self {
        Self {
            polarity: 0.0,
            subjectivity: 0.0,
            compound: 0.0,
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// Capability boundary for polarity/subjectivity scoring.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> SentimentScores;
}

const NEGATORS: &[&str] = &[
    "not", "no", "never", "dont", "cant", "wont", "isnt", "without", "nor", "hardly",
];
const INTENSIFIERS: &[&str] = &[
    "very",
    "really",
    "so",
    "extremely",
    "super",
    "truly",
    "absolutely",
    "incredibly",
    "most",
    "totally",
];

/// (term, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    ("amazing", 0.6, 0.9),
    ("awesome", 0.7, 0.9),
    ("beautiful", 0.85, 1.0),
    ("beauty", 0.5, 0.6),
    ("best", 0.8, 0.3),
    ("better", 0.5, 0.5),
    ("blessed", 0.6, 0.7),
    ("brave", 0.6, 0.8),
    ("bright", 0.7, 0.8),
    ("brilliant", 0.9, 1.0),
    ("celebrate", 0.5, 0.6),
    ("celebrating", 0.5, 0.6),
    ("celebration", 0.5, 0.6),
    ("cheerful", 0.7, 0.8),
    ("comfortable", 0.4, 0.7),
    ("confident", 0.5, 0.7),
    ("cool", 0.35, 0.65),
    ("delicious", 1.0, 1.0),
    ("delight", 0.7, 0.8),
    ("diversity", 0.3, 0.4),
    ("elegant", 0.6, 0.8),
    ("enjoy", 0.4, 0.5),
    ("excellent", 1.0, 1.0),
    ("excited", 0.4, 0.75),
    ("exciting", 0.3, 0.8),
    ("fair", 0.7, 0.9),
    ("fantastic", 0.4, 0.9),
    ("favourite", 0.5, 1.0),
    ("favorite", 0.5, 1.0),
    ("fresh", 0.3, 0.5),
    ("fun", 0.3, 0.2),
    ("glad", 0.5, 1.0),
    ("glorious", 0.8, 0.9),
    ("good", 0.7, 0.6),
    ("gorgeous", 0.7, 1.0),
    ("grateful", 0.6, 0.8),
    ("great", 0.8, 0.75),
    ("happiness", 0.8, 1.0),
    ("happy", 0.8, 1.0),
    ("harmony", 0.5, 0.5),
    ("healthy", 0.5, 0.5),
    ("hope", 0.3, 0.5),
    ("incredible", 0.9, 0.9),
    ("inspiring", 0.6, 0.7),
    ("joy", 0.8, 0.8),
    ("joyful", 0.8, 0.9),
    ("kind", 0.6, 0.9),
    ("lovely", 0.5, 0.75),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("lucky", 0.33, 1.0),
    ("magical", 0.5, 0.8),
    ("nice", 0.6, 1.0),
    ("peace", 0.4, 0.5),
    ("perfect", 1.0, 1.0),
    ("pleasant", 0.7, 0.9),
    ("positive", 0.2, 0.5),
    ("precious", 0.6, 0.8),
    ("pretty", 0.25, 1.0),
    ("proud", 0.8, 1.0),
    ("safe", 0.5, 0.5),
    ("smart", 0.2, 0.6),
    ("special", 0.4, 0.6),
    ("strong", 0.4, 0.7),
    ("stunning", 0.8, 0.9),
    ("success", 0.5, 0.6),
    ("successful", 0.75, 0.95),
    ("superb", 1.0, 1.0),
    ("sweet", 0.35, 0.65),
    ("thank", 0.4, 0.5),
    ("thanks", 0.4, 0.5),
    ("together", 0.2, 0.3),
    ("trusted", 0.5, 0.6),
    ("unique", 0.4, 0.9),
    ("warm", 0.6, 0.6),
    ("welcome", 0.8, 0.9),
    ("wonderful", 1.0, 1.0),
    ("worth", 0.3, 0.1),
    ("angry", -0.5, 1.0),
    ("annoying", -0.8, 0.9),
    ("ashamed", -0.6, 0.8),
    ("awful", -1.0, 1.0),
    ("bad", -0.7, 0.67),
    ("boring", -1.0, 1.0),
    ("broken", -0.4, 0.4),
    ("cheap", 0.4, 0.7),
    ("crap", -0.8, 0.8),
    ("cruel", -1.0, 1.0),
    ("dark", -0.15, 0.4),
    ("dead", -0.2, 0.4),
    ("depressing", -0.6, 0.8),
    ("difficult", -0.5, 1.0),
    ("dirty", -0.6, 0.8),
    ("disappointed", -0.75, 0.75),
    ("disappointing", -0.6, 0.7),
    ("disgusting", -1.0, 1.0),
    ("dull", -0.3, 0.6),
    ("embarrassed", -0.5, 0.8),
    ("embarrassing", -0.5, 0.8),
    ("evil", -1.0, 1.0),
    ("fail", -0.5, 0.3),
    ("failure", -0.32, 0.3),
    ("fake", -0.5, 1.0),
    ("fat", -0.2, 0.4),
    ("fear", -0.4, 0.6),
    ("gross", -0.6, 0.7),
    ("hate", -0.8, 0.9),
    ("horrible", -1.0, 1.0),
    ("hurt", -0.5, 0.6),
    ("inferior", -0.5, 0.6),
    ("insane", -0.5, 1.0),
    ("lonely", -0.5, 1.0),
    ("lose", -0.4, 0.4),
    ("mad", -0.62, 1.0),
    ("miserable", -1.0, 1.0),
    ("nasty", -1.0, 1.0),
    ("offensive", -0.6, 0.8),
    ("pathetic", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("problem", -0.3, 0.4),
    ("rude", -0.6, 0.8),
    ("sad", -0.5, 1.0),
    ("scared", -0.5, 0.7),
    ("shame", -0.5, 0.7),
    ("shameful", -0.7, 0.8),
    ("sick", -0.71, 0.86),
    ("stupid", -0.8, 1.0),
    ("terrible", -1.0, 1.0),
    ("tired", -0.4, 0.7),
    ("ugly", -0.7, 1.0),
    ("unacceptable", -0.7, 0.8),
    ("unfair", -0.5, 0.9),
    ("unhappy", -0.6, 0.9),
    ("upset", -0.5, 0.7),
    ("useless", -0.5, 0.2),
    ("worried", -0.4, 0.7),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("worthless", -0.8, 0.8),
    ("wrong", -0.5, 0.9),
];

/// Word-level lexicon scorer blending a mean-polarity score with a compound valence score.
pub struct LexiconSentiment {
    terms: HashMap<&'static str, (f64, f64)>,
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self {
            terms: LEXICON
                .iter()
                .map(|(term, polarity, subjectivity)| (*term, (*polarity, *subjectivity)))
                .collect(),
        }
    }
}

impl LexiconSentiment {
    pub fn term(&self, word: &str) -> Option<(f64, f64)> {
        self.terms.get(word).copied()
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    fn analyze(&self, text: &str) -> SentimentScores {
        let lowered = super::matching_text(text);
        let tokens: Vec<&str> = lowered
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.is_empty() {
            return SentimentScores::neutral();
        }

        let mut polarities = Vec::new();
        let mut subjectivities = Vec::new();
        let mut valence_sum = 0.0;
        let mut positive = 0.0;
        let mut negative = 0.0;
        let mut neutral = 0.0;

        for (idx, token) in tokens.iter().enumerate() {
            let Some((polarity, subjectivity)) = self.term(token) else {
                neutral += 1.0;
                continue;
            };
            let mut adjusted = polarity;
            if idx > 0 && INTENSIFIERS.contains(&tokens[idx - 1]) {
                adjusted *= 1.3;
            }
            let window_start = idx.saturating_sub(3);
            if tokens[window_start..idx]
                .iter()
                .any(|prev| NEGATORS.contains(prev))
            {
                adjusted *= -0.5;
            }
            let adjusted = crate::clamp_signed(adjusted, 1.0);
            polarities.push(adjusted);
            subjectivities.push(subjectivity);

            let valence = adjusted * 4.0;
            valence_sum += valence;
            if valence > 0.0 {
                positive += valence;
            } else if valence < 0.0 {
                negative += -valence;
            } else {
                neutral += 1.0;
            }
        }

        if polarities.is_empty() {
            return SentimentScores::neutral();
        }

        let exclamations = text.matches('!').count().min(4) as f64;
        if valence_sum != 0.0 {
            valence_sum += valence_sum.signum() * 0.292 * exclamations;
        }
        let compound = valence_sum / (valence_sum * valence_sum + 15.0).sqrt();
        let mean_polarity = polarities.iter().sum::<f64>() / polarities.len() as f64;
        let subjectivity = subjectivities.iter().sum::<f64>() / subjectivities.len() as f64;
        let polarity = crate::clamp_signed(0.4 * mean_polarity + 0.6 * compound, 1.0);

        let total = positive + negative + neutral;
        let (positive, negative, neutral) = if total > 0.0 {
            (positive / total, negative / total, neutral / total)
        } else {
            (0.0, 0.0, 1.0)
        };

        SentimentScores {
            polarity,
            subjectivity: crate::clamp01(subjectivity),
            compound,
            positive,
            negative,
            neutral,
            label: SentimentLabel::from_polarity(polarity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celebratory_caption_is_positive() {
        let scores =
            LexiconSentiment::default().analyze("Celebrating India's diversity this Diwali!");
        assert!((scores.polarity - 0.5618).abs() < 1e-3);
        assert!((scores.subjectivity - 0.5).abs() < 1e-6);
        assert_eq!(scores.label, SentimentLabel::Positive);
    }

    #[test]
    fn negation_flips_polarity() {
        let analyzer = LexiconSentiment::default();
        let plain = analyzer.analyze("this is good");
        let negated = analyzer.analyze("this is not good");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
    }

    #[test]
    fn unmatched_text_is_neutral() {
        let scores = LexiconSentiment::default().analyze("tuesday schedule update");
        assert_eq!(scores.polarity, 0.0);
        assert_eq!(scores.label, SentimentLabel::Neutral);
    }
}
