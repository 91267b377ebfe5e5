use crate::core::metrics::{self, BusinessStats, HistoryChange, KeywordRollup, KeywordSummary};
use crate::core::registry::RankRegistry;
use crate::core::timeseries::{AlignOptions, AlignedSeries};
use crate::domain::model::Business;
use crate::domain::ports::Storage;
use crate::utils::error::{RankError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(RankError::ConfigValidationError {
                field: "report.formats".to_string(),
                message: format!("Unsupported format '{}'. Valid formats: csv, json", other),
            }),
        }
    }

    pub fn parse_all(values: &[String]) -> Result<Vec<Self>> {
        values.iter().map(|v| Self::parse(v)).collect()
    }
}

fn opt_to_field<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| RankError::IoError(e.into_error()))
}

/// 排名表：每個關鍵字一行
pub fn rankings_csv(business: &Business) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "keyword_id",
        "term",
        "current_position",
        "previous_position",
        "trend",
        "change",
        "change_text",
        "tier",
        "best_position",
        "average_position",
        "checks_recorded",
        "last_checked",
    ])?;

    for keyword in business.keywords() {
        let summary = metrics::summarize_keyword(keyword);
        let trend = opt_to_field(summary.trend.map(|t| t.as_str()));
        writer.write_record([
            summary.keyword_id.clone(),
            summary.term.clone(),
            opt_to_field(summary.current_position),
            opt_to_field(summary.previous_position),
            trend,
            opt_to_field(summary.change),
            metrics::describe_change(summary.current_position, summary.previous_position),
            summary.tier.to_string(),
            opt_to_field(summary.best_position),
            opt_to_field(summary.average_position),
            summary.checks_recorded.to_string(),
            opt_to_field(summary.last_checked.map(format_timestamp)),
        ])?;
    }

    finish_csv(writer)
}

/// Aligned chart rows: one column per keyword, left blank where the keyword
/// has no sample in that row.
pub fn series_csv(series: &AlignedSeries<'_>) -> Result<Vec<u8>> {
    let keywords = series.keywords();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["timestamp".to_string(), "time".to_string()];
    header.extend(keywords.iter().map(|k| k.term().to_string()));
    writer.write_record(&header)?;

    for row in series {
        let mut record = vec![format_timestamp(row.timestamp), row.label()];
        record.extend(
            keywords
                .iter()
                .map(|k| opt_to_field(row.position_for_keyword(k.id()))),
        );
        writer.write_record(&record)?;
    }

    finish_csv(writer)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordReport {
    #[serde(flatten)]
    pub summary: KeywordSummary,
    pub change_text: String,
    pub history: Vec<HistoryChange>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessReport<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub domain: &'a str,
    pub created_at: DateTime<Utc>,
    pub stats: BusinessStats,
    pub rollup: KeywordRollup,
    pub ranked_percentage: u32,
    pub keywords: Vec<KeywordReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary<'a> {
    pub generated_at: DateTime<Utc>,
    pub registry_version: u64,
    pub tracking: bool,
    pub selected_business_id: Option<&'a str>,
    pub businesses: Vec<BusinessReport<'a>>,
}

pub fn build_summary(registry: &RankRegistry) -> ReportSummary<'_> {
    let businesses = registry
        .list_businesses()
        .iter()
        .map(|business| {
            let rollup = metrics::rollup(business.keywords());
            BusinessReport {
                id: business.id(),
                name: business.name(),
                domain: business.domain(),
                created_at: business.created_at(),
                stats: metrics::business_stats(business),
                rollup,
                ranked_percentage: rollup.ranked_percentage(),
                keywords: business
                    .keywords()
                    .iter()
                    .map(|keyword| {
                        let summary = metrics::summarize_keyword(keyword);
                        let change_text = metrics::describe_change(
                            summary.current_position,
                            summary.previous_position,
                        );
                        KeywordReport {
                            summary,
                            change_text,
                            history: metrics::history_changes(
                                keyword.tracking_history().as_slice(),
                            ),
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    ReportSummary {
        generated_at: registry.now(),
        registry_version: registry.version(),
        tracking: registry.is_tracking(),
        selected_business_id: registry.selected_business_id(),
        businesses,
    }
}

pub fn summary_json(registry: &RankRegistry) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&build_summary(registry))?)
}

pub struct ReportWriter<S: Storage> {
    storage: S,
    align: AlignOptions,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            align: AlignOptions::exact(),
        }
    }

    pub fn with_alignment(mut self, align: AlignOptions) -> Self {
        self.align = align;
        self
    }

    /// Writes the requested formats and returns the relative paths written.
    pub async fn export(
        &self,
        registry: &RankRegistry,
        formats: &[ReportFormat],
    ) -> Result<Vec<String>> {
        let mut written = Vec::new();

        if formats.contains(&ReportFormat::Csv) {
            for business in registry.list_businesses() {
                let dir = format!("business-{}", business.id());

                let path = format!("{}/rankings.csv", dir);
                self.storage.write_file(&path, &rankings_csv(business)?).await?;
                written.push(path);

                let series = AlignedSeries::with_options(business.keywords(), self.align);
                let path = format!("{}/series.csv", dir);
                self.storage.write_file(&path, &series_csv(&series)?).await?;
                written.push(path);
            }
        }

        if formats.contains(&ReportFormat::Json) {
            let path = "summary.json".to_string();
            self.storage.write_file(&path, &summary_json(registry)?).await?;
            written.push(path);
        }

        tracing::info!("📁 Wrote {} report files", written.len());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::ids::SequentialIdGenerator;
    use crate::app::seed::seed_demo_data;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn demo_registry() -> RankRegistry {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 8, 12, 0, 0).unwrap(),
        ));
        let mut registry = RankRegistry::with_deps(clock, Arc::new(SequentialIdGenerator::new()));
        seed_demo_data(&mut registry).unwrap();
        registry
    }

    #[test]
    fn test_parse_formats() {
        let formats = ReportFormat::parse_all(&["CSV".to_string(), "json".to_string()]).unwrap();
        assert_eq!(formats, vec![ReportFormat::Csv, ReportFormat::Json]);
        assert!(ReportFormat::parse("xml").is_err());
    }

    #[test]
    fn test_rankings_csv_rows() {
        let registry = demo_registry();
        let business = &registry.list_businesses()[0];
        let csv = String::from_utf8(rankings_csv(business).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("keyword_id,term,current_position"));
        assert!(lines[1].contains("best coffee shop,3,3,unchanged,0,No change,top-3,3,4,4,"));
    }

    #[test]
    fn test_series_csv_leaves_gaps_blank() {
        let registry = demo_registry();
        let business = &registry.list_businesses()[0];
        let series = AlignedSeries::new(business.keywords());
        let csv = String::from_utf8(series_csv(&series).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "timestamp,time,best coffee shop,local cafe near me");
        // 24h, 12h, 6h and now
        assert_eq!(lines.len(), 5);
        // 6 hours ago only "best coffee shop" was checked
        assert!(lines[3].ends_with(",3,"));
    }

    #[test]
    fn test_summary_json_shape() {
        let registry = demo_registry();
        let bytes = summary_json(&registry).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["businesses"].as_array().unwrap().len(), 2);
        let first = &value["businesses"][0];
        assert_eq!(first["stats"]["totalKeywords"], 2);
        assert_eq!(first["rollup"]["averagePosition"], 5);
        assert_eq!(first["rankedPercentage"], 100);
        assert_eq!(first["keywords"][0]["term"], "best coffee shop");
        assert_eq!(first["keywords"][0]["history"][0]["change"], 0);
        assert_eq!(first["keywords"][0]["history"][1]["change"], 1);
    }
}
