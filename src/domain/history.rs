use crate::domain::model::RankObservation;
use serde::Serialize;

/// 單一關鍵字的排名紀錄，只能追加
///
/// Insertion order is chronological order. Entries are never reordered,
/// edited or pruned once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrackingHistory {
    observations: Vec<RankObservation>,
}

impl TrackingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, observation: RankObservation) {
        self.observations.push(observation);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn latest(&self) -> Option<&RankObservation> {
        self.observations.last()
    }

    /// 最近 `n` 筆，依時間先後排列
    pub fn recent(&self, n: usize) -> &[RankObservation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankObservation> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[RankObservation] {
        &self.observations
    }
}

impl<'a> IntoIterator for &'a TrackingHistory {
    type Item = &'a RankObservation;
    type IntoIter = std::slice::Iter<'a, RankObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
