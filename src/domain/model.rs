use crate::core::keywords::KeywordRegistry;
use crate::domain::history::TrackingHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One timestamped position sample. Position 1 is the top result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankObservation {
    pub timestamp: DateTime<Utc>,
    pub position: u32,
}

impl RankObservation {
    pub fn new(timestamp: DateTime<Utc>, position: u32) -> Self {
        Self {
            timestamp,
            position,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    id: String,
    term: String,
    current_position: Option<u32>,
    previous_position: Option<u32>,
    tracking_history: TrackingHistory,
    last_checked: Option<DateTime<Utc>>,
}

impl Keyword {
    pub(crate) fn new(id: String, term: String) -> Self {
        Self {
            id,
            term,
            current_position: None,
            previous_position: None,
            tracking_history: TrackingHistory::new(),
            last_checked: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn current_position(&self) -> Option<u32> {
        self.current_position
    }

    pub fn previous_position(&self) -> Option<u32> {
        self.previous_position
    }

    pub fn tracking_history(&self) -> &TrackingHistory {
        &self.tracking_history
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    pub fn is_ranked(&self) -> bool {
        self.current_position.is_some()
    }

    /// 唯一會改動排名狀態的地方
    ///
    /// `previous_position` lags `current_position` by exactly one update and
    /// is carried over from the cached value, not re-read from the history.
    pub(crate) fn apply_observation(&mut self, observation: RankObservation) {
        self.previous_position = self.current_position;
        self.current_position = Some(observation.position);
        self.last_checked = Some(observation.timestamp);
        self.tracking_history.append(observation);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    id: String,
    name: String,
    domain: String,
    pub(crate) keywords: KeywordRegistry,
    created_at: DateTime<Utc>,
}

impl Business {
    pub(crate) fn new(id: String, name: String, domain: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            domain,
            keywords: KeywordRegistry::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn keywords(&self) -> &[Keyword] {
        self.keywords.as_slice()
    }

    pub fn keyword(&self, keyword_id: &str) -> Option<&Keyword> {
        self.keywords.get(keyword_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Unchanged,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Unchanged => "unchanged",
        }
    }
}

/// Display classification of a position, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionTier {
    #[serde(rename = "unranked")]
    Unranked,
    #[serde(rename = "top-3")]
    Top3,
    #[serde(rename = "top-10")]
    Top10,
    #[serde(rename = "ranked-other")]
    RankedOther,
}

impl PositionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionTier::Unranked => "unranked",
            PositionTier::Top3 => "top-3",
            PositionTier::Top10 => "top-10",
            PositionTier::RankedOther => "ranked-other",
        }
    }
}

impl fmt::Display for PositionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Business,
    Keyword,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Business => f.write_str("business"),
            EntityKind::Keyword => f.write_str("keyword"),
        }
    }
}

/// 註冊表變更通知，展示層據此重新繪製
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegistryEvent {
    #[serde(rename_all = "camelCase")]
    BusinessAdded { business_id: String },
    #[serde(rename_all = "camelCase")]
    BusinessRemoved { business_id: String },
    #[serde(rename_all = "camelCase")]
    BusinessSelected { business_id: String },
    #[serde(rename_all = "camelCase")]
    KeywordAdded {
        business_id: String,
        keyword_id: String,
    },
    #[serde(rename_all = "camelCase")]
    KeywordRemoved {
        business_id: String,
        keyword_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ObservationRecorded {
        business_id: String,
        keyword_id: String,
        position: u32,
    },
    TrackingToggled { enabled: bool },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_apply_observation_lags_previous_by_one() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut keyword = Keyword::new("1".to_string(), "best coffee shop".to_string());
        assert!(!keyword.is_ranked());
        assert!(keyword.last_checked().is_none());

        keyword.apply_observation(RankObservation::new(t0, 5));
        assert_eq!(keyword.current_position(), Some(5));
        assert_eq!(keyword.previous_position(), None);

        let t1 = t0 + Duration::hours(12);
        keyword.apply_observation(RankObservation::new(t1, 4));
        assert_eq!(keyword.current_position(), Some(4));
        assert_eq!(keyword.previous_position(), Some(5));
        assert_eq!(keyword.last_checked(), Some(t1));
        assert_eq!(keyword.tracking_history().len(), 2);
    }

    #[test]
    fn test_keyword_serializes_camel_case() {
        let keyword = Keyword::new("7".to_string(), "dentist near me".to_string());
        let value = serde_json::to_value(&keyword).unwrap();
        assert_eq!(value["term"], "dentist near me");
        assert!(value["currentPosition"].is_null());
        assert_eq!(value["trackingHistory"], serde_json::json!([]));
    }

    #[test]
    fn test_position_tier_labels() {
        assert_eq!(PositionTier::Top3.to_string(), "top-3");
        assert_eq!(
            serde_json::to_value(PositionTier::RankedOther).unwrap(),
            "ranked-other"
        );
    }
}
