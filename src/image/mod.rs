//! Optional visual signals from an external image-understanding capability.

pub mod vision;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cultural::{AlertSource, CulturalAlert, Severity};
use crate::text::Emotion;

pub use vision::VisionClient;

#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> Result<ImageSignals, String>;
}

/// Runs the capability under a single deadline; expiry is reported as an error.
pub async fn analyze_with_timeout(
    analyzer: &dyn ImageAnalyzer,
    image: &[u8],
    timeout: Duration,
) -> Result<ImageSignals, String> {
    match tokio::time::timeout(timeout, analyzer.analyze(image)).await {
        Ok(result) => result,
        Err(_) => Err(format!(
            "image analysis timed out after {}ms",
            timeout.as_millis()
        )),
    }
}

/// Accepts plain base64 or a `data:<mime>;base64,` URI.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, String> {
    let trimmed = payload.trim();
    let data = if trimmed.starts_with("data:") {
        trimmed
            .find(',')
            .map(|idx| &trimmed[idx + 1..])
            .ok_or_else(|| "image data URI is missing its payload".to_string())?
    } else {
        trimmed
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|err| format!("image is not valid base64: {}", err))?;
    if bytes.is_empty() {
        return Err("image payload is empty".to_string());
    }
    Ok(bytes)
}

pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// Loose shape of the capability's JSON answer; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawImageAnalysis {
    pub visual_emotions: Vec<String>,
    pub cultural_symbols: Vec<String>,
    pub sensitivity_flags: Vec<RawFlag>,
    pub text_overlay: String,
    pub extracted_text: String,
    pub brand_elements: Vec<String>,
    pub festival_references: Vec<String>,
    pub skin_tone_representation: String,
    pub emotional_tone: String,
    pub tone_polarity: Option<f64>,
    pub visual_style: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Detailed {
        element: Option<String>,
        category: Option<String>,
        severity: Option<String>,
        message: Option<String>,
    },
    Label(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualFlag {
    pub element: String,
    pub category: String,
    pub severity: Severity,
    pub weight: u32,
    pub message: String,
}

impl VisualFlag {
    fn from_raw(raw: RawFlag) -> Option<Self> {
        let (element, category, severity, message) = match raw {
            RawFlag::Label(label) => (label, None, None, None),
            RawFlag::Detailed {
                element,
                category,
                severity,
                message,
            } => (
                element.unwrap_or_else(|| "visual_element".to_string()),
                category,
                severity,
                message,
            ),
        };
        let element = element.trim().to_string();
        if element.is_empty() {
            return None;
        }
        let description =
            format!("{} {}", element, category.as_deref().unwrap_or("")).to_lowercase();
        let severity = severity
            .as_deref()
            .and_then(Severity::from_str)
            .unwrap_or_else(|| classify_flag(&description));
        Some(Self {
            category: category
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| "Visual".to_string()),
            weight: severity.visual_weight(),
            message: message
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| format!("Visual sensitivity detected: {}", element)),
            element,
            severity,
        })
    }

    pub fn to_alert(&self) -> CulturalAlert {
        CulturalAlert {
            keyword: self.element.clone(),
            category: self.category.clone(),
            severity: self.severity,
            weight: self.weight,
            message: self.message.clone(),
            source: AlertSource::Image,
        }
    }
}

fn classify_flag(description: &str) -> Severity {
    let has_any = |words: &[&str]| words.iter().any(|word| description.contains(word));
    if has_any(&["colorism", "fair skin", "skin whitening", "religious conflict"]) {
        Severity::Critical
    } else if has_any(&["religious", "political", "caste", "communal"]) {
        Severity::High
    } else if has_any(&["appropriation", "stereotype", "insensitive"]) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

const CONTROVERSIAL_SYMBOLS: &[&str] = &["beef", "pork", "alcohol", "religious conflict"];

#[derive(Debug, Clone, Serialize)]
pub struct ImageSignals {
    pub emotions: Vec<Emotion>,
    pub raw_emotions: Vec<String>,
    pub cultural_symbols: Vec<String>,
    pub festival_references: Vec<String>,
    pub brand_elements: Vec<String>,
    pub flags: Vec<VisualFlag>,
    pub extracted_text: String,
    pub emotional_tone: String,
    pub skin_tone_representation: String,
    pub visual_style: String,
    pub polarity: f64,
    pub visual_emc: f64,
    pub visual_scs: f64,
    pub brand_safe: bool,
}

impl ImageSignals {
    pub fn from_raw(raw: RawImageAnalysis) -> Self {
        let mut emotions: Vec<Emotion> = raw
            .visual_emotions
            .iter()
            .filter_map(|label| Emotion::from_str(label))
            .collect();
        emotions.sort();
        emotions.dedup();

        let flags: Vec<VisualFlag> = raw
            .sensitivity_flags
            .into_iter()
            .filter_map(VisualFlag::from_raw)
            .collect();

        let extracted_text = if raw.extracted_text.trim().is_empty() {
            raw.text_overlay.trim().to_string()
        } else {
            raw.extracted_text.trim().to_string()
        };

        let tone = raw.emotional_tone.to_lowercase();
        let polarity = raw
            .tone_polarity
            .map(|value| crate::clamp_signed(value, 1.0))
            .unwrap_or_else(|| tone_polarity(&tone));

        let mut visual_emc = (raw.visual_emotions.len() as f64 * 10.0).min(40.0);
        let tone_has = |words: &[&str]| words.iter().any(|word| tone.contains(word));
        if tone_has(&["strong", "intense", "powerful", "vibrant"]) {
            visual_emc += 30.0;
        } else if tone_has(&["moderate", "positive", "warm"]) {
            visual_emc += 20.0;
        } else if tone_has(&["subtle", "calm", "gentle"]) {
            visual_emc += 10.0;
        }
        let framing = raw.cultural_symbols.len() + raw.festival_references.len();
        visual_emc += (framing as f64 * 10.0).min(30.0);

        let mut visual_scs: f64 = flags.iter().map(|flag| flag.weight as f64).sum();
        let skin = raw.skin_tone_representation.to_lowercase();
        if ["only fair", "only light", "lack of diversity", "lightening", "whitening", "colorism"]
            .iter()
            .any(|word| skin.contains(word))
        {
            visual_scs += 35.0;
        } else if ["predominantly fair", "mostly light", "lacking diversity"]
            .iter()
            .any(|word| skin.contains(word))
        {
            visual_scs += 20.0;
        }
        visual_scs += raw
            .cultural_symbols
            .iter()
            .filter(|symbol| {
                let symbol = symbol.to_lowercase();
                CONTROVERSIAL_SYMBOLS.iter().any(|word| symbol.contains(word))
            })
            .count() as f64
            * 25.0;

        let brand_safe = !flags.iter().any(|flag| flag.severity.is_severe());

        Self {
            emotions,
            raw_emotions: raw.visual_emotions,
            cultural_symbols: raw.cultural_symbols,
            festival_references: raw.festival_references,
            brand_elements: raw.brand_elements,
            flags,
            extracted_text,
            emotional_tone: raw.emotional_tone,
            skin_tone_representation: raw.skin_tone_representation,
            visual_style: raw.visual_style,
            polarity,
            visual_emc: crate::clamp_score(visual_emc),
            visual_scs: crate::clamp_score(visual_scs),
            brand_safe,
        }
    }

    pub fn alerts(&self) -> Vec<CulturalAlert> {
        self.flags.iter().map(VisualFlag::to_alert).collect()
    }
}

fn tone_polarity(tone: &str) -> f64 {
    const POSITIVE: &[&str] = &[
        "positive", "joy", "happy", "warm", "celebrat", "uplifting", "cheerful", "festive",
        "hopeful",
    ];
    const NEGATIVE: &[&str] = &[
        "negative", "sad", "dark", "angry", "somber", "gloomy", "fear", "tense", "disturbing",
    ];
    let positive = POSITIVE.iter().filter(|word| tone.contains(*word)).count() as f64;
    let negative = NEGATIVE.iter().filter(|word| tone.contains(*word)).count() as f64;
    if positive + negative == 0.0 {
        return 0.0;
    }
    crate::clamp_signed((positive - negative) / (positive + negative) * 0.6, 1.0)
}
