use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::scoring::{
    FusionWeights, IntentWeights, PlatformFactors, PlatformMultipliers, TpbWeights,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub triggers_file: String,
    pub festivals_file: String,
    pub personas_file: String,
    pub campaigns_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            triggers_file: "cultural_triggers.json".to_string(),
            festivals_file: "festivals.json".to_string(),
            personas_file: "personas.json".to_string(),
            campaigns_file: "historical_campaigns.json".to_string(),
        }
    }
}

impl DataConfig {
    pub fn triggers_path(&self) -> PathBuf {
        self.dir.join(&self.triggers_file)
    }

    pub fn festivals_path(&self) -> PathBuf {
        self.dir.join(&self.festivals_file)
    }

    pub fn personas_path(&self) -> PathBuf {
        self.dir.join(&self.personas_file)
    }

    pub fn campaigns_path(&self) -> PathBuf {
        self.dir.join(&self.campaigns_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 512,
            ttl_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub enabled: bool,
    pub api_base: String,
    pub model: String,
    pub timeout_ms: u64,
    /// Never written to disk; read from `VISION_API_KEY` or `GEMINI_API_KEY`.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_ms: 10_000,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FestivalConfig {
    pub window_days: i64,
    pub critical_within_days: i64,
}

impl Default for FestivalConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            critical_within_days: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Weights for every scoring stage. Changing these changes product behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub fusion: FusionWeights,
    pub intent: IntentWeights,
    pub tpb: TpbWeights,
    pub norms_platforms: PlatformMultipliers,
    pub virality_platforms: PlatformFactors,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub image: ImageConfig,
    pub festival: FestivalConfig,
    pub scoring: ScoringConfig,
    pub server: ServerConfig,
}

impl AnalyzerConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                AnalyzerConfig::default()
            }
        } else {
            AnalyzerConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| format!("failed to create config dir: {}", err))?;
            }
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.image.api_key = env::var("VISION_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|value| !value.trim().is_empty());
        if let Ok(base) = env::var("VISION_API_BASE") {
            if !base.trim().is_empty() {
                self.image.api_base = base;
            }
        }
        if let Ok(model) = env::var("VISION_MODEL") {
            if !model.trim().is_empty() {
                self.image.model = model;
            }
        }
        if let Ok(timeout) = env::var("VISION_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.image.timeout_ms = value;
            }
        }
        if let Ok(capacity) = env::var("CACHE_CAPACITY") {
            if let Ok(value) = capacity.parse::<usize>() {
                self.cache.capacity = value;
            }
        }
        if let Ok(ttl) = env::var("CACHE_TTL_SECONDS") {
            if let Ok(value) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = value;
            }
        }
        if let Ok(dir) = env::var("DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data.dir = PathBuf::from(dir);
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ANALYZER_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/analyzer.toml")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: AnalyzerConfig = toml::from_str("[cache]\ncapacity = 8\nttl_seconds = 5\n")
            .expect("parse partial config");
        assert_eq!(config.cache.capacity, 8);
        assert_eq!(config.festival.window_days, 7);
        assert_eq!(config.image.timeout_ms, 10_000);
        assert!((config.scoring.tpb.attitude - 0.40).abs() < 1e-9);
    }

    #[test]
    fn scoring_weights_are_overridable() {
        let config: AnalyzerConfig = toml::from_str(concat!(
            "[scoring.norms_platforms]\n",
            "instagram = 1.1\nyoutube = 1.0\ntiktok = 1.2\ntwitter = 1.0\n",
        ))
        .expect("parse scoring config");
        assert!((config.scoring.norms_platforms.instagram - 1.1).abs() < 1e-9);
        assert!((config.scoring.fusion.text_emc - 0.6).abs() < 1e-9);
    }

    #[test]
    fn api_key_is_never_serialized() {
        let mut config = AnalyzerConfig::default();
        config.image.api_key = Some("secret".to_string());
        let payload = toml::to_string_pretty(&config).expect("serialize");
        assert!(!payload.contains("secret"));
    }
}
