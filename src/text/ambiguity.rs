use serde::Serialize;

use super::mentions;

const ABSTRACT_KEYWORDS: &[&str] = &[
    "thing", "things", "something", "anything", "everything", "maybe", "perhaps", "possibly",
    "might", "could", "would", "some", "any", "many", "few", "several", "various", "kind of",
    "sort of", "type of", "like", "seems", "appears", "suggests", "implies", "indicates",
    "concept", "idea", "notion", "sense", "feeling", "essence", "nature", "quality", "aspect",
    "element", "generally", "usually", "often", "sometimes", "rarely", "basically",
    "essentially", "fundamentally", "somewhat", "rather", "quite", "fairly", "pretty", "best",
    "better", "great", "amazing", "incredible", "big", "huge", "massive", "enormous", "more",
    "most", "less", "least",
];

const OPEN_ENDED_PHRASES: &[&str] = &[
    "what do you think",
    "how do you feel",
    "tell us",
    "share your",
    "let us know",
    "comment below",
    "your thoughts",
    "your opinion",
    "what if",
    "imagine",
    "consider",
    "think about",
    "wonder",
    "curious",
    "explore",
    "discover",
    "find out",
];

const METAPHOR_INDICATORS: &[&str] = &[
    "like", "as if", "as though", "reminds", "symbolizes", "represents", "embodies", "reflects",
    "mirrors", "journey", "path", "bridge", "door", "window", "light", "darkness", "shadow",
    "wave", "storm", "seed", "root", "flower", "tree", "river", "ocean",
];

const AMBIGUOUS_PRONOUNS: &[&str] = &["it", "this", "that", "these", "those", "they", "them"];

#[derive(Debug, Clone, Serialize)]
pub struct ClarityMetrics {
    pub clarity_score: f64,
    pub abstract_ratio: f64,
    pub question_count: usize,
    pub open_ended_indicators: usize,
    pub word_count: usize,
}

impl Default for ClarityMetrics {
    fn default() -> Self {
        Self {
            clarity_score: 100.0,
            abstract_ratio: 0.0,
            question_count: 0,
            open_ended_indicators: 0,
            word_count: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OpennessMetrics {
    pub openness_score: f64,
    pub metaphor_count: usize,
    pub ambiguous_pronouns: usize,
    pub multiple_interpretations: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AmbiguityReport {
    pub nam_score: f64,
    pub abstract_component: f64,
    pub question_component: f64,
    pub metaphor_component: f64,
    pub clarity_component: f64,
    pub clarity: ClarityMetrics,
    pub openness: OpennessMetrics,
}

pub fn clarity(cleaned: &str, raw: &str, matching: &str) -> ClarityMetrics {
    let word_count = cleaned.split_whitespace().count();
    if word_count == 0 {
        return ClarityMetrics::default();
    }
    let abstract_count = ABSTRACT_KEYWORDS
        .iter()
        .filter(|keyword| mentions(matching, keyword))
        .count();
    let abstract_ratio = abstract_count as f64 / word_count as f64;
    let question_count = raw.matches('?').count();
    let open_ended_indicators = OPEN_ENDED_PHRASES
        .iter()
        .filter(|phrase| mentions(matching, phrase))
        .count();

    let clarity_score = (100.0
        - abstract_ratio * 100.0 * 0.5
        - question_count as f64 * 10.0
        - open_ended_indicators as f64 * 15.0)
        .max(0.0);

    ClarityMetrics {
        clarity_score,
        abstract_ratio,
        question_count,
        open_ended_indicators,
        word_count,
    }
}

pub fn openness(matching: &str, subjectivity: f64) -> OpennessMetrics {
    let metaphor_count = METAPHOR_INDICATORS
        .iter()
        .filter(|indicator| mentions(matching, indicator))
        .count();
    let padded = format!(" {} ", matching.split_whitespace().collect::<Vec<_>>().join(" "));
    let ambiguous_pronouns = AMBIGUOUS_PRONOUNS
        .iter()
        .map(|pronoun| padded.matches(&format!(" {} ", pronoun)).count())
        .sum::<usize>();

    let openness_score = (metaphor_count as f64 * 15.0
        + (ambiguous_pronouns as f64 * 5.0).min(30.0)
        + subjectivity * 40.0)
        .min(100.0);

    OpennessMetrics {
        openness_score,
        metaphor_count,
        ambiguous_pronouns,
        multiple_interpretations: subjectivity > 0.6 || metaphor_count > 2,
    }
}

/// Narrative ambiguity: abstract language, open questions, metaphor density and inverse clarity.
pub fn measure(cleaned: &str, raw: &str, matching: &str, subjectivity: f64) -> AmbiguityReport {
    let clarity = clarity(cleaned, raw, matching);
    if clarity.word_count == 0 {
        return AmbiguityReport::default();
    }
    let openness = openness(matching, subjectivity);

    let abstract_component = (clarity.abstract_ratio * 100.0).min(100.0) * 0.30;
    let prompts = (clarity.question_count + clarity.open_ended_indicators) as f64;
    let question_component = (prompts / 3.0).min(1.0) * 100.0 * 0.25;
    let metaphor_component = (openness.metaphor_count as f64 / 5.0).min(1.0) * 100.0 * 0.20;
    let clarity_component = (100.0 - clarity.clarity_score) * 0.25;

    let nam_score = crate::clamp_score(
        abstract_component + question_component + metaphor_component + clarity_component,
    );

    AmbiguityReport {
        nam_score,
        abstract_component,
        question_component,
        metaphor_component,
        clarity_component,
        clarity,
        openness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_statement_has_no_ambiguity() {
        let text = "flat 20 percent off on running shoes";
        let report = measure(text, text, text, 0.0);
        assert_eq!(report.nam_score, 0.0);
        assert_eq!(report.clarity.clarity_score, 100.0);
    }

    #[test]
    fn open_questions_raise_nam() {
        let text = "what if life is like a river? what do you think?";
        let report = measure(text, text, text, 0.3);
        assert_eq!(report.clarity.question_count, 2);
        assert_eq!(report.clarity.open_ended_indicators, 2);
        assert!(report.nam_score > 40.0);
        assert!(report.openness.metaphor_count >= 2);
    }
}
