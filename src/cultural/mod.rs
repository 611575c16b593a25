//! Socio-cultural sensitivity scoring for the Indian market.

pub mod compound;
pub mod festival;
pub mod triggers;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::{DataConfig, FestivalConfig};

pub use festival::{parse_posting_date, Festival, FestivalAlert, FestivalCalendar};
pub use triggers::{TriggerEntry, TriggerTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" | "moderate" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Weight given to a visual flag of this severity.
    pub fn visual_weight(self) -> u32 {
        match self {
            Severity::Critical => 40,
            Severity::High => 30,
            Severity::Medium => 20,
            Severity::Low => 10,
        }
    }

    pub fn is_severe(self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSource {
    Text,
    Compound,
    Festival,
    Image,
}

#[derive(Debug, Clone, Serialize)]
pub struct CulturalAlert {
    pub keyword: String,
    pub category: String,
    pub severity: Severity,
    pub weight: u32,
    pub message: String,
    pub source: AlertSource,
}

impl CulturalAlert {
    /// Critical by label or by weight; either forces a Stop verdict.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical || self.weight >= 35
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CulturalReport {
    pub scs_score: f64,
    /// Text, compound and festival alerts in detection order.
    pub alerts: Vec<CulturalAlert>,
    pub festival_alerts: Vec<FestivalAlert>,
    pub total_risk_weight: u32,
    pub norm_violations: usize,
    pub severity_breakdown: BTreeMap<String, usize>,
    pub warnings: Vec<String>,
}

impl CulturalReport {
    pub fn critical_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|alert| alert.severity == Severity::Critical)
            .count()
    }
}

pub fn severity_breakdown(alerts: &[CulturalAlert]) -> BTreeMap<String, usize> {
    let mut breakdown: BTreeMap<String, usize> = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ]
    .iter()
    .map(|severity| (severity.label().to_string(), 0))
    .collect();
    for alert in alerts {
        *breakdown.entry(alert.severity.label().to_string()).or_insert(0) += 1;
    }
    breakdown
}

pub struct CulturalScorer {
    triggers: TriggerTable,
    calendar: FestivalCalendar,
    config: FestivalConfig,
}

impl CulturalScorer {
    pub fn new(triggers: TriggerTable, calendar: FestivalCalendar, config: FestivalConfig) -> Self {
        Self {
            triggers,
            calendar,
            config,
        }
    }

    pub async fn load(data: &DataConfig, config: FestivalConfig) -> Result<Self, String> {
        let triggers = TriggerTable::load(&data.triggers_path()).await?;
        let calendar = FestivalCalendar::load(&data.festivals_path()).await?;
        Ok(Self::new(triggers, calendar, config))
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub fn calendar(&self) -> &FestivalCalendar {
        &self.calendar
    }

    /// Scores `text` (caption plus any OCR text) and checks festival timing for `posting_date`.
    pub fn score(&self, text: &str, posting_date: Option<&str>) -> CulturalReport {
        let mut report = CulturalReport {
            severity_breakdown: severity_breakdown(&[]),
            ..CulturalReport::default()
        };
        let matching = crate::text::matching_text(text);

        let date = match posting_date.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => match parse_posting_date(raw) {
                Some(date) => Some(date),
                None => {
                    warn!(date = %raw, "malformed posting date, festival check skipped");
                    report.warnings.push(format!(
                        "posting date {:?} is not YYYY-MM-DD; festival check skipped",
                        raw
                    ));
                    None
                }
            },
            None => None,
        };

        if matching.trim().is_empty() {
            return report;
        }

        let mut alerts = compound::detect(&matching);
        alerts.extend(self.triggers.detect(&matching));
        if let Some(date) = date {
            report.festival_alerts = self.calendar.check(date, &matching, &self.config);
        }
        alerts.extend(report.festival_alerts.iter().map(FestivalAlert::to_alert));

        report.total_risk_weight = alerts.iter().map(|alert| alert.weight).sum();
        report.norm_violations = alerts
            .iter()
            .filter(|alert| alert.severity.is_severe())
            .count();
        report.scs_score = crate::clamp_score(
            report.total_risk_weight as f64 + 10.0 * report.norm_violations as f64,
        );
        report.severity_breakdown = severity_breakdown(&alerts);
        report.alerts = alerts;

        debug!(
            scs = report.scs_score,
            alerts = report.alerts.len(),
            festival_alerts = report.festival_alerts.len(),
            "cultural sensitivity scored"
        );
        report
    }
}
