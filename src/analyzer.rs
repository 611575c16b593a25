use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cache::{fingerprint, CacheStats, ResponseCache};
use crate::config::AnalyzerConfig;
use crate::cultural::{CulturalAlert, CulturalReport, CulturalScorer};
use crate::image::{analyze_with_timeout, ImageAnalyzer, ImageSignals, VisionClient};
use crate::persona::{ContentProfile, PersonaAnalysis, PersonaCatalog, PersonaEngine};
use crate::scoring::{
    AnalysisMode, CampaignHistory, ContentStats, FusedSignals, OutcomeScores, PerceivedIntent,
    Recommendation, ScoringInput, ScoringPipeline, TpbScores,
};
use crate::text::{matching_text, TextAnalyzer, TextSignals};
use crate::{AnalysisError, CampaignContent, Platform};

/// Pipeline stages in execution order, reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    Image,
    TextSignals,
    Cultural,
    Fusion,
    Intent,
    Behavior,
    Outcome,
    Recommendation,
    Personas,
    Complete,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Validating => "Validating request",
            Stage::Image => "Analyzing image",
            Stage::TextSignals => "Extracting text signals",
            Stage::Cultural => "Checking cultural sensitivity",
            Stage::Fusion => "Fusing signals",
            Stage::Intent => "Estimating perceived intent",
            Stage::Behavior => "Scoring planned behavior",
            Stage::Outcome => "Predicting outcomes",
            Stage::Recommendation => "Building recommendation",
            Stage::Personas => "Scoring personas",
            Stage::Complete => "Complete",
        }
    }

    /// Short event name used on the progress stream.
    pub fn event(self) -> &'static str {
        match self {
            Stage::Validating => "start",
            Stage::Image => "image",
            Stage::TextSignals => "text",
            Stage::Cultural => "cultural",
            Stage::Fusion => "fusion",
            Stage::Intent => "intent",
            Stage::Behavior => "tpb",
            Stage::Outcome => "outcome",
            Stage::Recommendation => "recommendation",
            Stage::Personas => "personas",
            Stage::Complete => "done",
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            Stage::Validating => 0,
            Stage::Image => 10,
            Stage::TextSignals => 25,
            Stage::Cultural => 35,
            Stage::Fusion => 45,
            Stage::Intent => 55,
            Stage::Behavior => 65,
            Stage::Outcome => 75,
            Stage::Recommendation => 85,
            Stage::Personas => 92,
            Stage::Complete => 100,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub fingerprint: String,
    pub generated_at: String,
    pub analysis_mode: AnalysisMode,
    pub platform: Platform,
    pub text: TextSignals,
    pub cultural: CulturalReport,
    pub image: Option<ImageSignals>,
    /// Cultural alerts followed by image alerts.
    pub alerts: Vec<CulturalAlert>,
    pub fused: FusedSignals,
    pub intent: PerceivedIntent,
    pub tpb: TpbScores,
    pub outcome: OutcomeScores,
    pub recommendation: Recommendation,
    pub personas: Option<PersonaAnalysis>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: Arc<AnalysisReport>,
    pub cached: bool,
    /// True when an image was supplied but its analysis failed or timed out.
    pub degraded: bool,
}

pub struct Analyzer {
    text: TextAnalyzer,
    cultural: CulturalScorer,
    image: Option<Arc<dyn ImageAnalyzer>>,
    image_timeout: Duration,
    scoring: ScoringPipeline,
    personas: PersonaEngine,
    cache: ResponseCache<AnalysisReport>,
}

impl Analyzer {
    pub fn new(
        text: TextAnalyzer,
        cultural: CulturalScorer,
        scoring: ScoringPipeline,
        personas: PersonaEngine,
        config: &AnalyzerConfig,
    ) -> Self {
        Self {
            text,
            cultural,
            image: None,
            image_timeout: Duration::from_millis(config.image.timeout_ms.max(1)),
            scoring,
            personas,
            cache: ResponseCache::new(&config.cache),
        }
    }

    /// Loads every table from disk; a missing or malformed table is fatal.
    pub async fn from_config(config: &AnalyzerConfig) -> Result<Self, String> {
        let text = TextAnalyzer::with_lexicon()?;
        let cultural = CulturalScorer::load(&config.data, config.festival.clone()).await?;
        let catalog = PersonaCatalog::load(&config.data.personas_path()).await?;
        let history = CampaignHistory::load(&config.data.campaigns_path()).await?;
        let scoring = ScoringPipeline::from_config(&config.scoring, Arc::new(history));
        let analyzer = Self::new(
            text,
            cultural,
            scoring,
            PersonaEngine::new(Arc::new(catalog)),
            config,
        );

        let image: Option<Arc<dyn ImageAnalyzer>> = match VisionClient::from_config(&config.image) {
            Some(client) => {
                info!(model = client.model(), "image analysis enabled");
                Some(Arc::new(client))
            }
            None => {
                info!("image analysis disabled; images will be ignored");
                None
            }
        };
        Ok(analyzer.with_image_analyzer(image))
    }

    pub fn with_image_analyzer(mut self, image: Option<Arc<dyn ImageAnalyzer>>) -> Self {
        self.image = image;
        self
    }

    pub fn with_image_timeout(mut self, timeout: Duration) -> Self {
        self.image_timeout = timeout;
        self
    }

    pub fn personas(&self) -> &PersonaCatalog {
        self.personas.catalog()
    }

    pub fn cultural(&self) -> &CulturalScorer {
        &self.cultural
    }

    pub fn history(&self) -> &CampaignHistory {
        self.scoring.history()
    }

    pub fn image_enabled(&self) -> bool {
        self.image.is_some()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn analyze(
        &self,
        content: CampaignContent,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        self.analyze_with_progress(content, |_| {}).await
    }

    pub async fn analyze_with_progress<F>(
        &self,
        content: CampaignContent,
        mut progress: F,
    ) -> Result<AnalysisOutcome, AnalysisError>
    where
        F: FnMut(Stage) + Send,
    {
        progress(Stage::Validating);
        content.validate()?;

        let key = fingerprint(&content);
        if let Some(report) = self.cache.get(&key).await {
            info!(fingerprint = %key, "serving cached analysis");
            progress(Stage::Complete);
            return Ok(AnalysisOutcome {
                report,
                cached: true,
                degraded: false,
            });
        }

        let mut warnings = Vec::new();
        let mut degraded = false;
        let image = match content.image.as_deref().filter(|bytes| !bytes.is_empty()) {
            Some(bytes) => match self.image.as_ref() {
                Some(analyzer) => {
                    progress(Stage::Image);
                    match analyze_with_timeout(analyzer.as_ref(), bytes, self.image_timeout).await {
                        Ok(signals) => Some(signals),
                        Err(err) => {
                            warn!(error = %err, "image analysis failed, continuing without it");
                            warnings.push(format!("image analysis unavailable: {}", err));
                            degraded = true;
                            None
                        }
                    }
                }
                None => {
                    warnings.push("image analysis is not configured; image ignored".to_string());
                    None
                }
            },
            None => None,
        };

        let ocr_text = image
            .as_ref()
            .map(|signals| signals.extracted_text.trim())
            .unwrap_or("");
        // Without a caption the image's own text stands in for it.
        let text_source = if content.has_caption() {
            content.caption.as_str()
        } else {
            ocr_text
        };
        let cultural_source = [content.caption.trim(), ocr_text]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        progress(Stage::TextSignals);
        let text = self.text.analyze(text_source);

        progress(Stage::Cultural);
        let cultural = self
            .cultural
            .score(&cultural_source, content.posting_date.as_deref());
        warnings.extend(cultural.warnings.iter().cloned());

        let mode = match (&image, content.has_caption()) {
            (Some(_), true) => AnalysisMode::Multimodal,
            (Some(_), false) => AnalysisMode::ImageOnly,
            (None, _) => AnalysisMode::TextOnly,
        };
        if image.is_none() && !content.has_caption() {
            warnings.push("no analyzable text or image signals; scores are neutral".to_string());
        }

        let matching = matching_text(&cultural_source);
        let output = self.scoring.run(
            &ScoringInput {
                text: &text,
                cultural: &cultural,
                image: image.as_ref(),
                mode,
                matching_text: &matching,
                platform: content.platform,
                influencer: content.influencer,
                stats: ContentStats::from_caption(text_source),
            },
            &mut |stage| progress(stage),
        );

        let personas = if content.persona_ids.is_empty() {
            None
        } else {
            progress(Stage::Personas);
            let profile = ContentProfile::build(
                &matching,
                text.word_count,
                &text.moral_framing,
                &output.fused,
                &output.alerts,
                content.platform,
            );
            let analysis = self.personas.analyze(
                &content.persona_ids,
                &profile,
                &output.tpb,
                self.scoring.tpb().weights(),
            );
            if !analysis.omitted.is_empty() {
                warnings.push(format!(
                    "unknown persona ids skipped: {}",
                    analysis.omitted.join(", ")
                ));
            }
            Some(analysis)
        };

        let report = Arc::new(AnalysisReport {
            fingerprint: key.clone(),
            generated_at: Utc::now().to_rfc3339(),
            analysis_mode: output.fused.mode,
            platform: content.platform,
            text,
            cultural,
            image,
            alerts: output.alerts,
            fused: output.fused,
            intent: output.intent,
            tpb: output.tpb,
            outcome: output.outcome,
            recommendation: output.recommendation,
            personas,
            warnings,
        });

        info!(
            fingerprint = %key,
            mode = report.analysis_mode.label(),
            verdict = report.recommendation.verdict.label(),
            backlash = report.outcome.backlash_risk,
            degraded,
            "analysis complete"
        );

        if !degraded {
            self.cache.insert(key, Arc::clone(&report)).await;
        }
        progress(Stage::Complete);
        Ok(AnalysisOutcome {
            report,
            cached: false,
            degraded,
        })
    }
}
