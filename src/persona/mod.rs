//! Audience personas and content-to-persona resonance.

pub mod content;
pub mod engine;
pub mod resonance;
pub mod tpb_modifier;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::info;

pub use content::ContentProfile;
pub use engine::{PersonaAnalysis, PersonaEngine, PersonaResult};
pub use resonance::{PersonaAction, ResonanceBreakdown, ResonanceCalculator};
pub use tpb_modifier::{PersonaTpb, PersonaTpbModifier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    /// Inclusive `[min, max]` age bracket.
    pub age_range: [u32; 2],
    pub gender: String,
    pub location_type: String,
    #[serde(default)]
    pub region: Option<String>,
    /// NCCS income grade (A1 .. E).
    pub income_level: String,
    pub education: String,
    pub language_primary: String,
}

impl Demographics {
    pub fn is_young(&self) -> bool {
        self.age_range[0] < 30
    }

    pub fn is_senior(&self) -> bool {
        self.age_range[0] >= 45
    }

    pub fn is_affluent(&self) -> bool {
        matches!(self.income_level.as_str(), "A1" | "A2")
    }

    pub fn is_low_income(&self) -> bool {
        matches!(self.income_level.as_str(), "C" | "D" | "E")
    }
}

/// OCEAN traits are in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Psychographics {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
    pub core_values: Vec<String>,
    pub interests: Vec<String>,
    pub decision_style: String,
}

impl Psychographics {
    pub fn traits(&self) -> [(&'static str, f64); 5] {
        [
            ("openness", self.openness),
            ("conscientiousness", self.conscientiousness),
            ("extraversion", self.extraversion),
            ("agreeableness", self.agreeableness),
            ("neuroticism", self.neuroticism),
        ]
    }
}

/// Cultural dimensions are on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CulturalProfile {
    pub individualism: f64,
    pub traditionalism: f64,
    pub religious_sensitivity: f64,
    pub regional_identity: f64,
    pub family_orientation: f64,
    pub status_consciousness: f64,
    #[serde(default)]
    pub humor_styles: Vec<String>,
    pub communication_formality: String,
}

impl CulturalProfile {
    /// Mean of traditionalism and religious sensitivity.
    pub fn sensitivity(&self) -> f64 {
        (self.traditionalism + self.religious_sensitivity) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaBehavior {
    pub platform_affinity: BTreeMap<String, f64>,
    pub engagement_style: String,
    pub sharing_propensity: String,
    pub comment_likelihood: String,
    pub ad_receptivity: String,
}

impl MediaBehavior {
    /// Affinity in `[0, 1]`; platforms missing from the map count as 0.5.
    pub fn affinity(&self, platform: crate::Platform) -> f64 {
        self.platform_affinity
            .get(platform.key())
            .copied()
            .map(crate::clamp01)
            .unwrap_or(0.5)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralTriggers {
    pub engagement: Vec<String>,
    pub share: Vec<String>,
    pub friction: Vec<String>,
    pub ignore: Vec<String>,
    pub report: Vec<String>,
    pub emotional: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub category: String,
    pub avatar_emoji: String,
    pub market_size_percent: f64,
    pub demographics: Demographics,
    pub psychographics: Psychographics,
    pub cultural_profile: CulturalProfile,
    pub media_behavior: MediaBehavior,
    #[serde(default)]
    pub behavioral_triggers: BehavioralTriggers,
}

/// Compact listing used by the personas endpoint and CLI.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub category: String,
    pub avatar_emoji: String,
    pub market_size_percent: f64,
}

impl From<&Persona> for PersonaSummary {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.clone(),
            name: persona.name.clone(),
            tagline: persona.tagline.clone(),
            category: persona.category.clone(),
            avatar_emoji: persona.avatar_emoji.clone(),
            market_size_percent: persona.market_size_percent,
        }
    }
}

/// Read-only persona catalog, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
    index: HashMap<String, usize>,
}

impl PersonaCatalog {
    pub async fn load(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|err| {
            format!("failed to read persona catalog {}: {}", path.display(), err)
        })?;
        let personas: Vec<Persona> = serde_json::from_str(&contents).map_err(|err| {
            format!("failed to parse persona catalog {}: {}", path.display(), err)
        })?;
        let catalog = Self::from_personas(personas)?;
        info!(
            path = %path.display(),
            personas = catalog.len(),
            "persona catalog loaded"
        );
        Ok(catalog)
    }

    /// Rejects an empty catalog, malformed or duplicate ids, and OCEAN traits outside `[0, 1]`.
    pub fn from_personas(personas: Vec<Persona>) -> Result<Self, String> {
        if personas.is_empty() {
            return Err("persona catalog is empty".to_string());
        }
        let mut index = HashMap::with_capacity(personas.len());
        for (position, persona) in personas.iter().enumerate() {
            if !crate::is_valid_persona_id(&persona.id) {
                return Err(format!("persona id {:?} is malformed", persona.id));
            }
            if index.insert(persona.id.clone(), position).is_some() {
                return Err(format!("duplicate persona id {:?}", persona.id));
            }
            for (name, value) in persona.psychographics.traits() {
                if !(0.0..=1.0).contains(&value) {
                    return Err(format!(
                        "persona {:?} has {} {} outside [0, 1]",
                        persona.id, name, value
                    ));
                }
            }
        }
        Ok(Self { personas, index })
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.index.get(id).map(|position| &self.personas[*position])
    }

    pub fn all(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        self.personas
            .iter()
            .map(|persona| persona.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Persona> {
        self.personas
            .iter()
            .filter(|persona| persona.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Case-insensitive match against name, tagline and category.
    pub fn search(&self, query: &str) -> Vec<&Persona> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.personas.iter().collect();
        }
        self.personas
            .iter()
            .filter(|persona| {
                persona.name.to_lowercase().contains(&query)
                    || persona.tagline.to_lowercase().contains(&query)
                    || persona.category.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<PersonaSummary> {
        self.personas.iter().map(PersonaSummary::from).collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn persona(id: &str) -> Persona {
        Persona {
            id: id.to_string(),
            name: "The Digital Native".to_string(),
            tagline: "Always online".to_string(),
            category: "generational".to_string(),
            avatar_emoji: "📱".to_string(),
            market_size_percent: 8.5,
            demographics: Demographics {
                age_range: [18, 26],
                gender: "all".to_string(),
                location_type: "metro".to_string(),
                region: None,
                income_level: "A2".to_string(),
                education: "graduate".to_string(),
                language_primary: "hinglish".to_string(),
            },
            psychographics: Psychographics {
                openness: 0.76,
                conscientiousness: 0.51,
                extraversion: 0.71,
                agreeableness: 0.66,
                neuroticism: 0.5,
                core_values: vec![
                    "freedom".to_string(),
                    "authenticity".to_string(),
                    "diversity".to_string(),
                    "creativity".to_string(),
                ],
                interests: vec![
                    "technology".to_string(),
                    "fashion".to_string(),
                    "music".to_string(),
                ],
                decision_style: "social-proof".to_string(),
            },
            cultural_profile: CulturalProfile {
                individualism: 70.0,
                traditionalism: 22.4,
                religious_sensitivity: 29.2,
                regional_identity: 41.8,
                family_orientation: 47.9,
                status_consciousness: 55.4,
                humor_styles: vec!["memes".to_string()],
                communication_formality: "casual".to_string(),
            },
            media_behavior: MediaBehavior {
                platform_affinity: [
                    ("instagram".to_string(), 1.0),
                    ("youtube".to_string(), 0.87),
                    ("tiktok".to_string(), 0.83),
                    ("twitter".to_string(), 0.48),
                ]
                .into_iter()
                .collect(),
                engagement_style: "proactive".to_string(),
                sharing_propensity: "frequent".to_string(),
                comment_likelihood: "often".to_string(),
                ad_receptivity: "tolerant".to_string(),
            },
            behavioral_triggers: BehavioralTriggers {
                engagement: vec!["trend".to_string(), "relatable".to_string()],
                share: vec!["relatable".to_string()],
                friction: vec!["preachy".to_string()],
                ignore: vec!["boring".to_string()],
                report: vec!["offensive".to_string()],
                emotional: [("joy".to_string(), vec!["fun".to_string()])]
                    .into_iter()
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::persona;
    use super::*;

    #[test]
    fn catalog_rejects_duplicates_and_empty() {
        assert!(PersonaCatalog::from_personas(Vec::new()).is_err());
        let err =
            PersonaCatalog::from_personas(vec![persona("gen_z_metro"), persona("gen_z_metro")])
                .unwrap_err();
        assert!(err.contains("duplicate"));
        assert!(PersonaCatalog::from_personas(vec![persona("Gen Z")]).is_err());
    }

    #[test]
    fn catalog_rejects_ocean_traits_out_of_range() {
        let mut loud = persona("gen_z_metro");
        loud.psychographics.extraversion = 7.1;
        let err = PersonaCatalog::from_personas(vec![loud]).unwrap_err();
        assert!(err.contains("extraversion"));

        let mut calm = persona("gen_z_metro");
        calm.psychographics.neuroticism = -0.2;
        assert!(PersonaCatalog::from_personas(vec![calm]).is_err());

        let mut unknown = persona("gen_z_metro");
        unknown.psychographics.openness = f64::NAN;
        assert!(PersonaCatalog::from_personas(vec![unknown]).is_err());

        let mut edge = persona("gen_z_metro");
        edge.psychographics.openness = 1.0;
        edge.psychographics.agreeableness = 0.0;
        assert!(PersonaCatalog::from_personas(vec![edge]).is_ok());
    }

    #[test]
    fn lookup_and_search() {
        let catalog =
            PersonaCatalog::from_personas(vec![persona("gen_z_metro"), persona("gen_z_tier2")])
                .expect("catalog");
        assert!(catalog.get("gen_z_tier2").is_some());
        assert!(catalog.get("unknown").is_none());
        assert_eq!(catalog.search("digital").len(), 2);
        assert_eq!(catalog.categories(), vec!["generational".to_string()]);
        let native = catalog.get("gen_z_metro").expect("persona");
        assert_eq!(native.media_behavior.affinity(crate::Platform::Twitter), 0.48);
    }
}
