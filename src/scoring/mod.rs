pub mod fusion;
pub mod history;
pub mod intent;
pub mod outcome;
pub mod pipeline;
pub mod recommendation;
pub mod tpb;

pub use fusion::{AnalysisMode, FusedSignals, FusionScorer, FusionWeights, RiskSource};
pub use history::{CampaignHistory, HistoricalCampaign, SimilarCampaign};
pub use intent::{
    IntentCalculator, IntentCategory, IntentWeights, Level, ManipulationPattern, PerceivedIntent,
};
pub use outcome::{
    Band, ContentStats, ExposurePattern, OutcomePredictor, OutcomeScores, PlatformFactors,
};
pub use pipeline::{ScoringInput, ScoringOutput, ScoringPipeline};
pub use recommendation::{Recommendation, RecommendationEngine, RecommendationInputs, Verdict};
pub use tpb::{PlatformMultipliers, TpbScorer, TpbScores, TpbWeights};
