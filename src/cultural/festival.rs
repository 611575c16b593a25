use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::config::FestivalConfig;
use crate::text::mentions;

use super::{AlertSource, CulturalAlert, Severity};

#[derive(Debug, Clone, Deserialize)]
struct FestivalRecord {
    name: String,
    #[serde(default)]
    dates: Vec<String>,
    #[serde(default)]
    sensitivity_keywords: Vec<String>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Festival {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub sensitivity_keywords: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FestivalAlert {
    pub festival: String,
    pub festival_date: NaiveDate,
    pub days_away: i64,
    pub severity: Severity,
    pub weight: u32,
    pub conflicts: Vec<String>,
    pub message: String,
    pub description: String,
}

impl FestivalAlert {
    pub fn to_alert(&self) -> CulturalAlert {
        CulturalAlert {
            keyword: self.festival.clone(),
            category: "Festival Timing".to_string(),
            severity: self.severity,
            weight: self.weight,
            message: self.message.clone(),
            source: AlertSource::Festival,
        }
    }
}

pub fn parse_posting_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub struct FestivalCalendar {
    festivals: Vec<Festival>,
}

impl FestivalCalendar {
    pub fn new(festivals: Vec<Festival>) -> Self {
        Self { festivals }
    }

    pub async fn load(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|err| {
            format!("failed to read festival calendar {}: {}", path.display(), err)
        })?;
        let records: Vec<FestivalRecord> = serde_json::from_str(&contents)
            .map_err(|err| format!("failed to parse festival calendar: {}", err))?;
        let calendar = Self::from_records(records);
        info!(count = calendar.festivals.len(), "loaded festival calendar");
        Ok(calendar)
    }

    fn from_records(records: Vec<FestivalRecord>) -> Self {
        let festivals = records
            .into_iter()
            .map(|record| {
                let dates = record
                    .dates
                    .iter()
                    .filter_map(|raw| {
                        let parsed = parse_posting_date(raw);
                        if parsed.is_none() {
                            warn!(
                                festival = %record.name,
                                date = %raw,
                                "skipping malformed festival date"
                            );
                        }
                        parsed
                    })
                    .collect();
                Festival {
                    name: record.name,
                    dates,
                    sensitivity_keywords: record
                        .sensitivity_keywords
                        .iter()
                        .map(|keyword| keyword.to_lowercase())
                        .collect(),
                    description: record.description,
                }
            })
            .collect();
        Self { festivals }
    }

    pub fn festivals(&self) -> &[Festival] {
        &self.festivals
    }

    /// Festivals within the window of `date` whose sensitivity keywords appear in `text`.
    pub fn check(
        &self,
        date: NaiveDate,
        text: &str,
        config: &FestivalConfig,
    ) -> Vec<FestivalAlert> {
        let mut alerts = Vec::new();
        if text.trim().is_empty() {
            return alerts;
        }
        for festival in &self.festivals {
            let nearest = festival
                .dates
                .iter()
                .map(|festival_date| (*festival_date, (*festival_date - date).num_days().abs()))
                .filter(|(_, days)| *days <= config.window_days)
                .min_by_key(|(_, days)| *days);
            let Some((festival_date, days_away)) = nearest else {
                continue;
            };
            let conflicts: Vec<String> = festival
                .sensitivity_keywords
                .iter()
                .filter(|keyword| mentions(text, keyword))
                .cloned()
                .collect();
            if conflicts.is_empty() {
                continue;
            }
            let (severity, weight) = if days_away <= config.critical_within_days {
                (Severity::Critical, 35)
            } else {
                (Severity::High, 25)
            };
            alerts.push(FestivalAlert {
                message: format!(
                    "Posting near {} ({} days away) with potentially sensitive content: {}",
                    festival.name,
                    days_away,
                    conflicts.join(", ")
                ),
                festival: festival.name.clone(),
                festival_date,
                days_away,
                severity,
                weight,
                conflicts,
                description: festival.description.clone(),
            });
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> FestivalCalendar {
        FestivalCalendar::from_records(vec![FestivalRecord {
            name: "Navratri".to_string(),
            dates: vec!["2025-09-22".to_string(), "not-a-date".to_string()],
            sensitivity_keywords: vec!["beef".to_string(), "alcohol".to_string()],
            description: "Nine nights".to_string(),
        }])
    }

    #[test]
    fn close_conflict_is_critical() {
        let date = parse_posting_date("2025-09-23").expect("date");
        let alerts = calendar().check(date, "new beef burger", &FestivalConfig::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].weight, 35);
        assert_eq!(
            alerts[0].message,
            "Posting near Navratri (1 days away) with potentially sensitive content: beef"
        );
    }

    #[test]
    fn outside_window_or_without_conflict_is_silent() {
        let config = FestivalConfig::default();
        let far = parse_posting_date("2025-10-15").expect("date");
        assert!(calendar().check(far, "beef", &config).is_empty());
        let near = parse_posting_date("2025-09-27").expect("date");
        assert!(calendar().check(near, "garba night", &config).is_empty());
        let high = calendar().check(near, "beef", &config);
        assert_eq!(high[0].severity, Severity::High);
        assert_eq!(high[0].weight, 25);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(parse_posting_date("23/09/2025").is_none());
        assert_eq!(calendar().festivals()[0].dates.len(), 1);
    }
}
