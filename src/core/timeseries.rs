//! 多條排名曲線的時間對齊
//!
//! Rows are keyed on exact timestamp equality unless a tolerance window is
//! requested. A keyword with no sample in a row is left out of that row; it
//! is never interpolated, carried forward or zero-filled.

use crate::domain::model::Keyword;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignOptions {
    tolerance: Option<Duration>,
}

impl AlignOptions {
    pub fn exact() -> Self {
        Self::default()
    }

    /// Group samples into fixed windows of `tolerance` width, aligned to the
    /// Unix epoch. A zero or negative width means exact matching.
    pub fn with_tolerance(tolerance: Duration) -> Self {
        if tolerance <= Duration::zero() {
            return Self::exact();
        }
        Self {
            tolerance: Some(tolerance),
        }
    }

    pub fn from_millis(tolerance_ms: u64) -> Self {
        match i64::try_from(tolerance_ms) {
            Ok(ms) => Self::with_tolerance(Duration::milliseconds(ms)),
            Err(_) => Self::exact(),
        }
    }

    pub fn tolerance(&self) -> Option<Duration> {
        self.tolerance
    }

    fn bucket(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let Some(width) = self.tolerance else {
            return timestamp;
        };
        let width_ms = width.num_milliseconds().max(1);
        let start_ms = timestamp.timestamp_millis().div_euclid(width_ms) * width_ms;
        DateTime::from_timestamp_millis(start_ms).unwrap_or(timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint<'a> {
    pub keyword_id: &'a str,
    pub term: &'a str,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRow<'a> {
    pub timestamp: DateTime<Utc>,
    /// 依關鍵字加入順序排列
    pub points: Vec<SeriesPoint<'a>>,
}

impl<'a> AlignedRow<'a> {
    /// Looks a point up by term. Terms are not unique within a business, so
    /// this returns the earliest-added keyword with that term; use
    /// [`AlignedRow::position_for_keyword`] when terms may repeat.
    pub fn position(&self, term: &str) -> Option<u32> {
        self.points
            .iter()
            .find(|p| p.term == term)
            .map(|p| p.position)
    }

    pub fn position_for_keyword(&self, keyword_id: &str) -> Option<u32> {
        self.points
            .iter()
            .find(|p| p.keyword_id == keyword_id)
            .map(|p| p.position)
    }

    pub fn label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// keyword id → position
    pub fn to_map(&self) -> BTreeMap<&'a str, u32> {
        self.points.iter().map(|p| (p.keyword_id, p.position)).collect()
    }
}

struct IndexedKeyword<'a> {
    keyword: &'a Keyword,
    samples: BTreeMap<DateTime<Utc>, u32>,
}

/// Aligned view over a set of keyword histories.
///
/// Only the sorted bucket keys are computed up front; rows are built on
/// demand by [`AlignedSeries::iter`], which can be called any number of
/// times.
pub struct AlignedSeries<'a> {
    keywords: Vec<IndexedKeyword<'a>>,
    buckets: Vec<DateTime<Utc>>,
}

impl<'a> AlignedSeries<'a> {
    pub fn new(keywords: impl IntoIterator<Item = &'a Keyword>) -> Self {
        Self::with_options(keywords, AlignOptions::exact())
    }

    pub fn with_options(
        keywords: impl IntoIterator<Item = &'a Keyword>,
        options: AlignOptions,
    ) -> Self {
        let mut buckets = BTreeSet::new();
        let keywords: Vec<IndexedKeyword<'a>> = keywords
            .into_iter()
            .map(|keyword| {
                let mut samples = BTreeMap::new();
                for observation in keyword.tracking_history() {
                    let key = options.bucket(observation.timestamp);
                    buckets.insert(key);
                    // 同一時間點有多筆時取第一筆
                    samples.entry(key).or_insert(observation.position);
                }
                IndexedKeyword { keyword, samples }
            })
            .collect();

        Self {
            keywords,
            buckets: buckets.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn keywords(&self) -> Vec<&'a Keyword> {
        self.keywords.iter().map(|k| k.keyword).collect()
    }

    pub fn terms(&self) -> Vec<&'a str> {
        self.keywords.iter().map(|k| k.keyword.term()).collect()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.buckets
    }

    pub fn iter(&self) -> AlignedRows<'_, 'a> {
        AlignedRows {
            series: self,
            next: 0,
        }
    }

    fn row_at(&self, index: usize) -> Option<AlignedRow<'a>> {
        let timestamp = *self.buckets.get(index)?;
        let points = self
            .keywords
            .iter()
            .filter_map(|indexed| {
                indexed.samples.get(&timestamp).map(|&position| SeriesPoint {
                    keyword_id: indexed.keyword.id(),
                    term: indexed.keyword.term(),
                    position,
                })
            })
            .collect();
        Some(AlignedRow { timestamp, points })
    }
}

pub struct AlignedRows<'s, 'a> {
    series: &'s AlignedSeries<'a>,
    next: usize,
}

impl<'s, 'a> Iterator for AlignedRows<'s, 'a> {
    type Item = AlignedRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.series.row_at(self.next)?;
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.series.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AlignedRows<'_, '_> {}

impl<'s, 'a> IntoIterator for &'s AlignedSeries<'a> {
    type Item = AlignedRow<'a>;
    type IntoIter = AlignedRows<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
