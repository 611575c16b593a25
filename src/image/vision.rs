use async_trait::async_trait;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ImageConfig;

use super::{sniff_mime, ImageAnalyzer, ImageSignals, RawImageAnalysis};

/// OpenAI-compatible chat/completions client for multimodal image analysis.
#[derive(Clone)]
pub struct VisionClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl VisionClient {
    /// Returns `None` when disabled or no API key is configured.
    pub fn from_config(config: &ImageConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.api_key.clone()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms.max(1)))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageAnalyzer for VisionClient {
    async fn analyze(&self, image: &[u8]) -> Result<ImageSignals, String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let data_url = format!(
            "data:{};base64,{}",
            sniff_mime(image),
            base64::engine::general_purpose::STANDARD.encode(image)
        );
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: 0.2,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: vec![ContentPart::Text {
                        text: system_prompt(),
                    }],
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: vec![
                        ContentPart::Text {
                            text: "Analyze this marketing image.".to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: data_url },
                        },
                    ],
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("vision request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("vision API error: {}", status));
            }
            return Err(format!("vision API error: {} {}", status, detail));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| format!("vision response parse failed: {}", err))?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| "vision response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string();

        let json =
            extract_json(&content).ok_or_else(|| "vision response missing JSON".to_string())?;
        let raw: RawImageAnalysis = serde_json::from_str(&json)
            .map_err(|err| format!("vision JSON parse failed: {}", err))?;
        debug!(model = %self.model, "vision analysis parsed");

        Ok(ImageSignals::from_raw(raw))
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

fn system_prompt() -> String {
    let prompt = r#"You analyze marketing images for the Indian market and answer in strict JSON.
Return a single JSON object with these fields:
- visual_emotions (array: joy, pride, nostalgia, inspiration, humor, sadness, anger, fear, surprise, disgust)
- cultural_symbols (array: diya, rangoli, temple, mosque, flag, food items, ...)
- sensitivity_flags (array of {"element", "category", "severity": critical|high|medium|low, "message"})
- extracted_text (all readable text in the image, empty string if none)
- brand_elements (array)
- festival_references (array: Diwali, Eid, Holi, ...)
- skin_tone_representation (short description, mention colorism or lack of diversity if present)
- emotional_tone (short description)
- tone_polarity (-1..1)
- visual_style (short description)
Rules:
- Output JSON only, no markdown or commentary.
- Flag colorism, religious imagery, political references, caste cues and stereotypes.
"#;
    prompt.to_string()
}

fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}
