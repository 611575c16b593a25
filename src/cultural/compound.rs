use crate::text::mentions;

use super::{AlertSource, CulturalAlert, Severity};

pub struct HarmfulPattern {
    pub name: &'static str,
    pub primary: &'static [&'static str],
    pub amplifiers: &'static [&'static str],
    pub solutions: &'static [&'static str],
    pub multiplier: f64,
    pub base_score: f64,
}

pub const HARMFUL_PATTERNS: &[HarmfulPattern] = &[
    HarmfulPattern {
        name: "colorism_discrimination",
        primary: &["dark skin", "dusky", "wheatish", "kaali", "dark complexion"],
        amplifiers: &[
            "hold back", "hold you back", "problem", "barrier", "obstacle", "job", "career",
            "marriage", "success", "confidence",
        ],
        solutions: &[
            "fairness", "whitening", "brightening", "lighter", "fair skin", "serum", "cream",
            "treatment",
        ],
        multiplier: 2.5,
        base_score: 40.0,
    },
    HarmfulPattern {
        name: "colorism_beauty",
        primary: &["fair skin", "gori", "white", "light skin", "pale"],
        amplifiers: &[
            "beautiful", "pretty", "attractive", "gorgeous", "stunning", "desirable", "perfect",
        ],
        solutions: &["cream", "serum", "treatment", "product"],
        multiplier: 2.0,
        base_score: 35.0,
    },
    HarmfulPattern {
        name: "body_shaming",
        primary: &["fat", "thin", "skinny", "overweight", "underweight", "body"],
        amplifiers: &[
            "problem", "ugly", "shame", "embarrass", "unattractive", "disgusting", "gross",
        ],
        solutions: &["lose weight", "gain weight", "slim", "diet", "transform"],
        multiplier: 2.0,
        base_score: 30.0,
    },
];

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Primary harm term plus at least one amplifier or "solution" term.
pub fn detect(text: &str) -> Vec<CulturalAlert> {
    let mut alerts = Vec::new();
    for pattern in HARMFUL_PATTERNS {
        if !pattern.primary.iter().any(|term| mentions(text, term)) {
            continue;
        }
        let amplifiers = pattern
            .amplifiers
            .iter()
            .filter(|term| mentions(text, term))
            .count();
        let solutions = pattern
            .solutions
            .iter()
            .filter(|term| mentions(text, term))
            .count();
        let factor = amplifiers + solutions;
        if factor == 0 {
            continue;
        }
        let weight = pattern.base_score * pattern.multiplier * factor.min(2) as f64;
        alerts.push(CulturalAlert {
            keyword: title_case(pattern.name),
            category: "Compound Pattern".to_string(),
            severity: Severity::Critical,
            weight: weight as u32,
            message: format!(
                "Harmful compound pattern detected: {}",
                pattern.name.replace('_', " ")
            ),
            source: AlertSource::Compound,
        });
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorism_beauty_with_product() {
        let alerts = detect("fair skin is the key to beauty! get our whitening cream now.");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].keyword, "Colorism Beauty");
        assert_eq!(alerts[0].weight, 70);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn primary_alone_is_not_compound() {
        assert!(detect("a pale blue sky").is_empty());
    }

    #[test]
    fn factor_caps_at_two() {
        let alerts = detect("dark skin holding back your career? try our fairness cream");
        let discrimination = alerts
            .iter()
            .find(|alert| alert.keyword == "Colorism Discrimination")
            .expect("discrimination pattern");
        assert_eq!(discrimination.weight, 200);
    }
}
