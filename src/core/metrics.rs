//! 排名統計：純函式，不改動任何狀態
//!
//! Lower position numbers are better ranks, so a drop in the number is an
//! improvement.

use crate::domain::model::{Business, Keyword, PositionTier, RankObservation, TrendDirection};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub fn trend_direction(current: Option<u32>, previous: Option<u32>) -> Option<TrendDirection> {
    let (current, previous) = (current?, previous?);
    Some(match current.cmp(&previous) {
        std::cmp::Ordering::Less => TrendDirection::Improving,
        std::cmp::Ordering::Greater => TrendDirection::Declining,
        std::cmp::Ordering::Equal => TrendDirection::Unchanged,
    })
}

/// `previous - current`; positive means the keyword moved up.
pub fn position_change(current: Option<u32>, previous: Option<u32>) -> Option<i64> {
    Some(i64::from(previous?) - i64::from(current?))
}

pub fn describe_change(current: Option<u32>, previous: Option<u32>) -> String {
    match position_change(current, previous) {
        Some(diff) if diff > 0 => format!("+{} positions", diff),
        Some(diff) if diff < 0 => format!("{} positions", diff),
        _ => "No change".to_string(),
    }
}

pub fn best_position(history: &[RankObservation]) -> Option<u32> {
    history.iter().map(|o| o.position).min()
}

pub fn average_position(history: &[RankObservation]) -> Option<u32> {
    let sum: u64 = history.iter().map(|o| u64::from(o.position)).sum();
    round_half_up(sum, history.len() as u64)
}

pub fn position_tier(position: Option<u32>) -> PositionTier {
    match position {
        None => PositionTier::Unranked,
        Some(p) if p <= 3 => PositionTier::Top3,
        Some(p) if p <= 10 => PositionTier::Top10,
        Some(_) => PositionTier::RankedOther,
    }
}

fn round_half_up(sum: u64, count: u64) -> Option<u32> {
    if count == 0 {
        return None;
    }
    let rounded = (2 * sum + count) / (2 * count);
    Some(u32::try_from(rounded).unwrap_or(u32::MAX))
}

/// One history entry together with its movement relative to the entry
/// recorded just before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryChange {
    pub timestamp: DateTime<Utc>,
    pub position: u32,
    pub change: i64,
}

/// 最新的在前；最舊一筆的變化為 0
pub fn history_changes(history: &[RankObservation]) -> Vec<HistoryChange> {
    history
        .iter()
        .enumerate()
        .rev()
        .map(|(index, entry)| {
            let change = index
                .checked_sub(1)
                .map(|prev| i64::from(history[prev].position) - i64::from(entry.position))
                .unwrap_or(0);
            HistoryChange {
                timestamp: entry.timestamp,
                position: entry.position,
                change,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSummary {
    pub keyword_id: String,
    pub term: String,
    pub current_position: Option<u32>,
    pub previous_position: Option<u32>,
    pub trend: Option<TrendDirection>,
    pub change: Option<i64>,
    pub tier: PositionTier,
    pub best_position: Option<u32>,
    pub average_position: Option<u32>,
    pub checks_recorded: usize,
    pub last_checked: Option<DateTime<Utc>>,
}

pub fn summarize_keyword(keyword: &Keyword) -> KeywordSummary {
    let current = keyword.current_position();
    let previous = keyword.previous_position();
    let history = keyword.tracking_history().as_slice();

    KeywordSummary {
        keyword_id: keyword.id().to_string(),
        term: keyword.term().to_string(),
        current_position: current,
        previous_position: previous,
        trend: trend_direction(current, previous),
        change: position_change(current, previous),
        tier: position_tier(current),
        best_position: best_position(history),
        average_position: average_position(history),
        checks_recorded: history.len(),
        last_checked: keyword.last_checked(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessStats {
    pub total_keywords: usize,
    pub ranked_keywords: usize,
    pub top_ten_rankings: usize,
}

pub fn business_stats(business: &Business) -> BusinessStats {
    let rollup = rollup(business.keywords());
    BusinessStats {
        total_keywords: rollup.total_keywords,
        ranked_keywords: rollup.ranked_keywords,
        top_ten_rankings: rollup.top_ten_rankings,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRollup {
    pub total_keywords: usize,
    pub ranked_keywords: usize,
    pub top_ten_rankings: usize,
    pub improving_keywords: usize,
    /// 0 when no keyword is ranked yet.
    pub average_position: u32,
}

impl KeywordRollup {
    pub fn ranked_percentage(&self) -> u32 {
        if self.total_keywords == 0 {
            return 0;
        }
        round_half_up(self.ranked_keywords as u64 * 100, self.total_keywords as u64).unwrap_or(0)
    }
}

pub fn rollup<'a>(keywords: impl IntoIterator<Item = &'a Keyword>) -> KeywordRollup {
    let mut stats = KeywordRollup::default();
    let mut ranked_sum: u64 = 0;

    for keyword in keywords {
        stats.total_keywords += 1;

        let current = keyword.current_position();
        if let Some(position) = current {
            stats.ranked_keywords += 1;
            ranked_sum += u64::from(position);
        }
        if matches!(current, Some(position) if position <= 10) {
            stats.top_ten_rankings += 1;
        }
        if trend_direction(current, keyword.previous_position()) == Some(TrendDirection::Improving)
        {
            stats.improving_keywords += 1;
        }
    }

    stats.average_position = round_half_up(ranked_sum, stats.ranked_keywords as u64).unwrap_or(0);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keywords::KeywordRegistry;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn history(positions: &[u32]) -> Vec<RankObservation> {
        positions
            .iter()
            .enumerate()
            .map(|(i, &p)| RankObservation::new(t0() + Duration::hours(i as i64), p))
            .collect()
    }

    fn registry_with(histories: &[&[u32]]) -> KeywordRegistry {
        let mut registry = KeywordRegistry::new();
        for (i, positions) in histories.iter().enumerate() {
            let id = (i + 1).to_string();
            registry.add(id.clone(), &format!("keyword {}", i + 1)).unwrap();
            for (h, &p) in positions.iter().enumerate() {
                registry
                    .record_observation(&id, p, t0() + Duration::hours(h as i64))
                    .unwrap();
            }
        }
        registry
    }

    #[test]
    fn test_trend_direction() {
        assert_eq!(trend_direction(Some(3), Some(5)), Some(TrendDirection::Improving));
        assert_eq!(trend_direction(Some(8), Some(2)), Some(TrendDirection::Declining));
        assert_eq!(trend_direction(Some(4), Some(4)), Some(TrendDirection::Unchanged));
        assert_eq!(trend_direction(Some(4), None), None);
        assert_eq!(trend_direction(None, Some(4)), None);
    }

    #[test]
    fn test_position_change_and_text() {
        assert_eq!(position_change(Some(3), Some(5)), Some(2));
        assert_eq!(position_change(Some(9), Some(5)), Some(-4));
        assert_eq!(position_change(None, Some(5)), None);

        assert_eq!(describe_change(Some(3), Some(5)), "+2 positions");
        assert_eq!(describe_change(Some(9), Some(5)), "-4 positions");
        assert_eq!(describe_change(Some(5), Some(5)), "No change");
        assert_eq!(describe_change(Some(5), None), "No change");
    }

    #[test]
    fn test_best_and_average_position() {
        let seeded = history(&[5, 4, 3, 3]);
        assert_eq!(best_position(&seeded), Some(3));
        assert_eq!(average_position(&seeded), Some(4));

        // 2.5 rounds up
        assert_eq!(average_position(&history(&[2, 3])), Some(3));
        assert_eq!(average_position(&history(&[8, 7, 7])), Some(7));

        assert_eq!(best_position(&[]), None);
        assert_eq!(average_position(&[]), None);
    }

    #[test]
    fn test_position_tier_boundaries() {
        assert_eq!(position_tier(None), PositionTier::Unranked);
        assert_eq!(position_tier(Some(1)), PositionTier::Top3);
        assert_eq!(position_tier(Some(3)), PositionTier::Top3);
        assert_eq!(position_tier(Some(4)), PositionTier::Top10);
        assert_eq!(position_tier(Some(10)), PositionTier::Top10);
        assert_eq!(position_tier(Some(11)), PositionTier::RankedOther);
    }

    #[test]
    fn test_history_changes_newest_first() {
        let changes = history_changes(&history(&[8, 7, 9]));
        let positions: Vec<(u32, i64)> = changes.iter().map(|c| (c.position, c.change)).collect();
        assert_eq!(positions, vec![(9, -2), (7, 1), (8, 0)]);
        assert!(history_changes(&[]).is_empty());
    }

    #[test]
    fn test_summarize_keyword() {
        let registry = registry_with(&[&[5, 4, 3, 3], &[]]);

        let summary = summarize_keyword(registry.get("1").unwrap());
        assert_eq!(summary.current_position, Some(3));
        assert_eq!(summary.previous_position, Some(3));
        assert_eq!(summary.trend, Some(TrendDirection::Unchanged));
        assert_eq!(summary.best_position, Some(3));
        assert_eq!(summary.average_position, Some(4));
        assert_eq!(summary.tier, PositionTier::Top3);
        assert_eq!(summary.checks_recorded, 4);

        let unranked = summarize_keyword(registry.get("2").unwrap());
        assert_eq!(unranked.tier, PositionTier::Unranked);
        assert_eq!(unranked.trend, None);
        assert_eq!(unranked.best_position, None);
        assert!(unranked.last_checked.is_none());
    }

    #[test]
    fn test_rollup_counts() {
        let registry = registry_with(&[&[5, 3], &[8, 12], &[15], &[]]);
        let stats = rollup(&registry);

        assert_eq!(stats.total_keywords, 4);
        assert_eq!(stats.ranked_keywords, 3);
        assert_eq!(stats.top_ten_rankings, 1);
        assert_eq!(stats.improving_keywords, 1);
        // (3 + 12 + 15) / 3
        assert_eq!(stats.average_position, 10);
        assert_eq!(stats.ranked_percentage(), 75);
    }

    #[test]
    fn test_rollup_empty_and_unranked() {
        let empty = rollup(&KeywordRegistry::new());
        assert_eq!(empty, KeywordRollup::default());
        assert_eq!(empty.ranked_percentage(), 0);

        let unranked = rollup(&registry_with(&[&[], &[]]));
        assert_eq!(unranked.total_keywords, 2);
        assert_eq!(unranked.average_position, 0);
        assert_eq!(unranked.ranked_percentage(), 0);
    }
}
