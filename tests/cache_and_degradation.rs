use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use campaign_risk::image::{ImageAnalyzer, ImageSignals, RawImageAnalysis};
use campaign_risk::scoring::AnalysisMode;
use campaign_risk::{Analyzer, AnalyzerConfig, CampaignContent, Platform};

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

struct StubImageAnalyzer {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubImageAnalyzer {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAnalyzer for StubImageAnalyzer {
    async fn analyze(&self, _image: &[u8]) -> Result<ImageSignals, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(ImageSignals::from_raw(RawImageAnalysis {
                visual_emotions: vec!["joy".to_string()],
                cultural_symbols: vec!["diya".to_string()],
                emotional_tone: "warm".to_string(),
                tone_polarity: Some(0.6),
                extracted_text: "Festive offers inside".to_string(),
                ..RawImageAnalysis::default()
            })),
            Behavior::Fail => Err("quota exceeded".to_string()),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err("unreachable".to_string())
            }
        }
    }
}

fn config() -> AnalyzerConfig {
    let mut config = AnalyzerConfig::default();
    config.data.dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    config
}

async fn analyzer_with(stub: &Arc<StubImageAnalyzer>) -> Analyzer {
    Analyzer::from_config(&config())
        .await
        .expect("analyzer")
        .with_image_analyzer(Some(Arc::clone(stub) as Arc<dyn ImageAnalyzer>))
        .with_image_timeout(Duration::from_millis(50))
}

fn campaign(with_image: bool) -> CampaignContent {
    let mut content = CampaignContent::new(
        "Light up your home this Diwali with our new lamps",
        Platform::Instagram,
    );
    content.posting_date = Some("2025-10-18".to_string());
    if with_image {
        content.image = Some(vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4]);
    }
    content
}

#[tokio::test]
async fn cache_hit_skips_image_capability_and_returns_same_report() {
    let stub = StubImageAnalyzer::new(Behavior::Succeed);
    let analyzer = analyzer_with(&stub).await;

    let first = analyzer.analyze(campaign(true)).await.expect("first");
    assert!(!first.cached);
    assert!(!first.degraded);
    assert_eq!(first.report.analysis_mode, AnalysisMode::Multimodal);
    assert_eq!(stub.calls(), 1);

    let second = analyzer.analyze(campaign(true)).await.expect("second");
    assert!(second.cached);
    assert!(Arc::ptr_eq(&first.report, &second.report));
    assert_eq!(stub.calls(), 1);

    let first_json = serde_json::to_string(first.report.as_ref()).expect("json");
    let second_json = serde_json::to_string(second.report.as_ref()).expect("json");
    assert_eq!(first_json, second_json);

    let stats = analyzer.cache_stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn failed_image_analysis_degrades_to_text_only() {
    let stub = StubImageAnalyzer::new(Behavior::Fail);
    let analyzer = analyzer_with(&stub).await;

    let degraded = analyzer.analyze(campaign(true)).await.expect("degraded");
    assert!(degraded.degraded);
    assert!(degraded.report.image.is_none());
    assert_eq!(degraded.report.analysis_mode, AnalysisMode::TextOnly);
    assert!(degraded
        .report
        .warnings
        .iter()
        .any(|warning| warning.contains("quota exceeded")));

    let text_only = analyzer.analyze(campaign(false)).await.expect("text only");
    let a = &degraded.report;
    let b = &text_only.report;
    assert!((a.tpb.behavioral_intention - b.tpb.behavioral_intention).abs() < 1e-6);
    assert!((a.tpb.attitude - b.tpb.attitude).abs() < 1e-6);
    assert!((a.outcome.virality - b.outcome.virality).abs() < 1e-6);
    assert!((a.outcome.backlash_risk - b.outcome.backlash_risk).abs() < 1e-6);
    assert!((a.outcome.ad_fatigue_risk - b.outcome.ad_fatigue_risk).abs() < 1e-6);
    assert_eq!(a.recommendation.verdict, b.recommendation.verdict);
    assert_eq!(a.alerts.len(), b.alerts.len());
}

#[tokio::test]
async fn degraded_responses_are_not_cached() {
    let stub = StubImageAnalyzer::new(Behavior::Fail);
    let analyzer = analyzer_with(&stub).await;

    let first = analyzer.analyze(campaign(true)).await.expect("first");
    let second = analyzer.analyze(campaign(true)).await.expect("second");
    assert!(first.degraded && second.degraded);
    assert!(!second.cached);
    assert_eq!(stub.calls(), 2);
    assert_eq!(analyzer.cache_stats().await.entries, 0);
}

#[tokio::test]
async fn image_timeout_is_bounded() {
    let stub = StubImageAnalyzer::new(Behavior::Hang);
    let analyzer = analyzer_with(&stub).await;

    let started = std::time::Instant::now();
    let outcome = analyzer.analyze(campaign(true)).await.expect("analysis");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(outcome.degraded);
    assert!(outcome
        .report
        .warnings
        .iter()
        .any(|warning| warning.contains("timed out")));
}

#[tokio::test]
async fn image_only_request_uses_extracted_text() {
    let stub = StubImageAnalyzer::new(Behavior::Succeed);
    let analyzer = analyzer_with(&stub).await;
    let mut content = campaign(true);
    content.caption = String::new();

    let report = analyzer.analyze(content).await.expect("analysis").report;
    assert_eq!(report.analysis_mode, AnalysisMode::ImageOnly);
    assert!(report.text.word_count > 0);
    assert!(report.fused.image_emc.is_some());
}

#[tokio::test]
async fn image_without_capability_is_ignored_but_not_degraded() {
    let analyzer = Analyzer::from_config(&config()).await.expect("analyzer");
    let outcome = analyzer.analyze(campaign(true)).await.expect("analysis");
    assert!(!outcome.degraded);
    assert_eq!(outcome.report.analysis_mode, AnalysisMode::TextOnly);
    assert!(!outcome.report.warnings.is_empty());
}

#[tokio::test]
async fn captions_differing_only_in_case_are_cached_separately() {
    let analyzer = Analyzer::from_config(&config()).await.expect("analyzer");
    let title = CampaignContent::new("Great Diwali Offers", Platform::Instagram);
    let shouted = CampaignContent::new("GREAT DIWALI OFFERS", Platform::Instagram);

    let first = analyzer.analyze(title).await.expect("first");
    let second = analyzer.analyze(shouted).await.expect("second");
    assert!(!second.cached);
    assert_eq!(first.report.text.cleaned_text, "Great Diwali Offers");
    assert_eq!(second.report.text.cleaned_text, "GREAT DIWALI OFFERS");
    assert_eq!(analyzer.cache_stats().await.entries, 2);

    let spaced = CampaignContent::new("  Great   Diwali Offers ", Platform::Instagram);
    assert!(analyzer.analyze(spaced).await.expect("third").cached);
}
