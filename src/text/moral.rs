use serde::Serialize;
use std::collections::BTreeSet;

use super::{mentions, mentions_word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoralCategory {
    Values,
    Duty,
    Family,
    Community,
    Justice,
    Tradition,
    Progress,
}

impl MoralCategory {
    pub const ALL: [MoralCategory; 7] = [
        MoralCategory::Values,
        MoralCategory::Duty,
        MoralCategory::Family,
        MoralCategory::Community,
        MoralCategory::Justice,
        MoralCategory::Tradition,
        MoralCategory::Progress,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MoralCategory::Values => "values",
            MoralCategory::Duty => "duty",
            MoralCategory::Family => "family",
            MoralCategory::Community => "community",
            MoralCategory::Justice => "justice",
            MoralCategory::Tradition => "tradition",
            MoralCategory::Progress => "progress",
        }
    }

    /// Relative weight of the category in Indian cultural framing.
    pub fn weight(self) -> f64 {
        match self {
            MoralCategory::Family => 1.5,
            MoralCategory::Duty => 1.4,
            MoralCategory::Tradition => 1.3,
            MoralCategory::Community => 1.2,
            MoralCategory::Values => 1.1,
            MoralCategory::Justice => 1.0,
            MoralCategory::Progress => 0.9,
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            MoralCategory::Values => &[
                "value", "principle", "ethics", "moral", "integrity", "honesty", "truth",
                "authentic", "genuine",
            ],
            MoralCategory::Duty => &[
                "duty", "responsibility", "dharma", "karma", "should", "must", "ought",
                "deserve", "commitment", "devotion", "loyalty",
            ],
            MoralCategory::Family => &[
                "family", "parent", "mother", "father", "children", "son", "daughter",
                "brother", "sister", "home", "together", "unity", "bond", "care", "love",
                "respect", "elder", "generation",
            ],
            MoralCategory::Community => &[
                "community", "society", "social", "collective", "together", "unity",
                "harmony", "peace", "nation", "country", "people", "everyone", "we", "our",
            ],
            MoralCategory::Justice => &[
                "justice", "fair", "fairness", "equal", "equality", "right", "rights",
                "wrong", "injustice", "unfair", "discrimination", "bias", "freedom",
                "liberty",
            ],
            MoralCategory::Tradition => &[
                "tradition", "culture", "heritage", "custom", "ritual", "ceremony",
                "festival", "celebration", "ancient", "legacy", "roots", "sacred", "holy",
                "spiritual", "religious", "faith",
            ],
            MoralCategory::Progress => &[
                "progress", "development", "growth", "future", "modern", "innovation",
                "change", "transform", "improve", "better", "forward",
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MoralFraming {
    pub categories: Vec<MoralCategory>,
    pub keywords: Vec<String>,
    pub keyword_count: usize,
    pub alignment_score: f64,
}

impl MoralFraming {
    pub fn has(&self, category: MoralCategory) -> bool {
        self.categories.contains(&category)
    }
}

pub fn detect_framing(text: &str) -> MoralFraming {
    let mut categories = Vec::new();
    let mut keywords = BTreeSet::new();
    for category in MoralCategory::ALL {
        let mut hit = false;
        for keyword in category.keywords() {
            if mentions_word(text, keyword) {
                keywords.insert(keyword.to_string());
                hit = true;
            }
        }
        if hit {
            categories.push(category);
        }
    }
    let weighted: f64 = categories.iter().map(|category| category.weight()).sum();
    MoralFraming {
        keyword_count: keywords.len(),
        keywords: keywords.into_iter().collect(),
        alignment_score: (weighted / 6.0 * 100.0).min(100.0),
        categories,
    }
}

struct ViolationRule {
    kind: &'static str,
    weight: u32,
    keywords: &'static [&'static str],
    contexts: &'static [&'static str],
}

const VIOLATION_RULES: &[ViolationRule] = &[
    ViolationRule {
        kind: "dignity",
        weight: 30,
        keywords: &[
            "dark skin", "fat", "ugly", "inferior", "worthless", "disgusting", "gross",
            "shameful", "embarrassing",
        ],
        contexts: &[
            "problem", "issue", "fix", "change", "transform", "solution", "cure", "treatment",
        ],
    },
    ViolationRule {
        kind: "discrimination_normalization",
        weight: 35,
        keywords: &[
            "employers prefer", "society wants", "everyone knows", "people like",
            "nobody wants", "everyone prefers",
        ],
        contexts: &[
            "fair", "light", "white", "slim", "thin", "tall", "beautiful", "attractive",
        ],
    },
    ViolationRule {
        kind: "victim_blaming",
        weight: 40,
        keywords: &[
            "your fault", "youre responsible", "you let", "dont let", "because of you",
            "due to your", "if only you",
        ],
        contexts: &[
            "job", "rejection", "marriage", "failure", "problem", "issue", "struggle",
        ],
    },
    ViolationRule {
        kind: "stereotype",
        weight: 30,
        keywords: &[
            "real men", "real women", "good wife", "good husband", "proper woman",
            "proper man", "like a man", "like a woman",
        ],
        contexts: &[
            "should", "must", "need to", "have to", "supposed to", "expected to",
        ],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct MoralViolation {
    pub kind: String,
    pub weight: u32,
    pub keyword: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MoralViolations {
    pub violations: Vec<MoralViolation>,
    pub total_score: u32,
}

impl MoralViolations {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A rule fires once when any of its keywords co-occurs with any of its context words.
pub fn detect_violations(text: &str) -> MoralViolations {
    let mut violations = Vec::new();
    for rule in VIOLATION_RULES {
        let keyword = rule.keywords.iter().find(|keyword| mentions(text, keyword));
        let context = rule.contexts.iter().find(|context| mentions(text, context));
        if let (Some(keyword), Some(context)) = (keyword, context) {
            violations.push(MoralViolation {
                kind: rule.kind.to_string(),
                weight: rule.weight,
                keyword: keyword.to_string(),
                context: context.to_string(),
            });
        }
    }
    let total_score = violations.iter().map(|violation| violation.weight).sum();
    MoralViolations {
        violations,
        total_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_and_tradition_framing() {
        let framing = detect_framing("bring the family together for a festival of tradition");
        assert!(framing.has(MoralCategory::Family));
        assert!(framing.has(MoralCategory::Tradition));
        assert!(framing.has(MoralCategory::Community));
        let expected = (1.5 + 1.2 + 1.3) / 6.0 * 100.0;
        assert!((framing.alignment_score - expected).abs() < 1e-6);
    }

    #[test]
    fn victim_blaming_needs_context() {
        assert!(detect_violations("dont let it go").is_empty());
        let found = detect_violations("dont let dark skin cost you the job");
        assert_eq!(found.violations.len(), 1);
        assert_eq!(found.violations[0].kind, "victim_blaming");
        assert_eq!(found.total_score, 40);
    }
}
