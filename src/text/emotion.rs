use serde::{Deserialize, Serialize};

use super::mentions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Pride,
    Nostalgia,
    Humor,
    Inspiration,
    Urgency,
}

impl Emotion {
    pub const ALL: [Emotion; 11] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Disgust,
        Emotion::Pride,
        Emotion::Nostalgia,
        Emotion::Humor,
        Emotion::Inspiration,
        Emotion::Urgency,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "joy" | "happiness" | "happy" | "celebration" | "celebratory" => Some(Emotion::Joy),
            "sadness" | "sad" | "melancholy" => Some(Emotion::Sadness),
            "anger" | "angry" => Some(Emotion::Anger),
            "fear" | "anxiety" => Some(Emotion::Fear),
            "surprise" | "wonder" | "excitement" => Some(Emotion::Surprise),
            "disgust" => Some(Emotion::Disgust),
            "pride" | "patriotism" => Some(Emotion::Pride),
            "nostalgia" | "nostalgic" => Some(Emotion::Nostalgia),
            "humor" | "humour" | "playful" => Some(Emotion::Humor),
            "inspiration" | "inspiring" | "hope" | "aspiration" => Some(Emotion::Inspiration),
            "urgency" => Some(Emotion::Urgency),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Disgust => "disgust",
            Emotion::Pride => "pride",
            Emotion::Nostalgia => "nostalgia",
            Emotion::Humor => "humor",
            Emotion::Inspiration => "inspiration",
            Emotion::Urgency => "urgency",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Emotion::Joy => &[
                "happy", "joy", "celebrate", "celebrating", "celebration", "fun", "great",
                "awesome", "smile", "laugh", "blessed", "grateful", "delight", "cheer",
            ],
            Emotion::Sadness => &[
                "sad", "cry", "tears", "miss you", "lonely", "heartbroken", "grief", "loss",
            ],
            Emotion::Anger => &[
                "angry", "furious", "rage", "outrage", "frustrated", "hate", "disgust",
                "offensive", "unacceptable", "wrong", "injustice", "unfair",
            ],
            Emotion::Fear => &[
                "fear", "afraid", "scared", "worry", "anxious", "threat", "danger", "risk",
                "unsafe", "panic", "miss out", "lose", "limited", "last chance", "running out",
            ],
            Emotion::Surprise => &[
                "surprise", "wow", "unexpected", "shocking", "unbelievable", "omg", "reveal",
            ],
            Emotion::Disgust => &["gross", "disgusting", "nasty", "yuck", "revolting", "filthy"],
            Emotion::Pride => &[
                "proud", "pride", "honor", "glory", "achievement", "success", "victory",
                "indian", "india", "nation", "national", "patriotic", "heritage", "culture",
                "legacy", "dignity",
            ],
            Emotion::Nostalgia => &[
                "remember", "memories", "childhood", "throwback", "tradition", "heritage",
                "vintage", "classic", "old days", "grandma", "nani", "dadi",
            ],
            Emotion::Humor => &[
                "funny", "hilarious", "lol", "haha", "joke", "comedy", "witty", "playful",
                "lmao", "rofl",
            ],
            Emotion::Inspiration => &[
                "inspire", "motivate", "empower", "hope", "dream", "aspire", "courage",
                "brave", "strength", "believe", "faith", "determined",
            ],
            Emotion::Urgency => &[
                "now", "today", "hurry", "quick", "fast", "immediate", "urgent", "asap",
                "limited time", "act now", "dont wait", "dont miss", "last chance",
                "ending soon", "expires", "deadline", "flash sale", "only today",
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmotionHit {
    pub emotion: Emotion,
    pub intensity: f64,
    pub matched: Vec<String>,
}

/// Keyword-list emotion detector; expects text already passed through `matching_text`.
#[derive(Debug, Clone, Default)]
pub struct EmotionDetector;

impl EmotionDetector {
    pub fn detect(&self, text: &str) -> Vec<EmotionHit> {
        let mut hits = Vec::new();
        for emotion in Emotion::ALL {
            let matched: Vec<String> = emotion
                .keywords()
                .iter()
                .filter(|keyword| mentions(text, keyword))
                .map(|keyword| keyword.to_string())
                .collect();
            if matched.is_empty() {
                continue;
            }
            hits.push(EmotionHit {
                emotion,
                intensity: (matched.len() as f64 / 3.0).min(1.0),
                matched,
            });
        }
        hits
    }
}
