use crate::domain::model::{EntityKind, Keyword, RankObservation};
use crate::utils::error::{RankError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_position};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Keywords of a single business, in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct KeywordRegistry {
    keywords: Vec<Keyword>,
}

impl KeywordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn as_slice(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyword> {
        self.keywords.iter()
    }

    pub fn get(&self, keyword_id: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.id() == keyword_id)
    }

    pub fn contains(&self, keyword_id: &str) -> bool {
        self.get(keyword_id).is_some()
    }

    /// 新增關鍵字；驗證失敗時不會改動任何狀態
    pub fn add(&mut self, id: String, term: &str) -> Result<&Keyword> {
        let term = validate_non_empty_string("term", term)?;
        if self.contains(&id) {
            return Err(RankError::validation(
                "keyword_id",
                format!("Keyword id '{}' is already used in this business", id),
            ));
        }

        self.keywords.push(Keyword::new(id, term.to_string()));
        let index = self.keywords.len() - 1;
        Ok(&self.keywords[index])
    }

    /// Removing an id that is not present is a `NotFound` error, also on
    /// repeated calls with the same id.
    pub fn remove(&mut self, keyword_id: &str) -> Result<Keyword> {
        let index = self
            .keywords
            .iter()
            .position(|k| k.id() == keyword_id)
            .ok_or_else(|| RankError::not_found(EntityKind::Keyword, keyword_id))?;
        Ok(self.keywords.remove(index))
    }

    pub fn record_observation(
        &mut self,
        keyword_id: &str,
        position: u32,
        at: DateTime<Utc>,
    ) -> Result<&Keyword> {
        let position = validate_position("position", position)?;
        let keyword = self
            .keywords
            .iter_mut()
            .find(|k| k.id() == keyword_id)
            .ok_or_else(|| RankError::not_found(EntityKind::Keyword, keyword_id))?;

        keyword.apply_observation(RankObservation::new(at, position));
        Ok(keyword)
    }
}

impl<'a> IntoIterator for &'a KeywordRegistry {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_add_trims_term_and_starts_unranked() {
        let mut registry = KeywordRegistry::new();
        let keyword = registry.add("1".to_string(), "  best pizza near me ").unwrap();

        assert_eq!(keyword.term(), "best pizza near me");
        assert!(keyword.current_position().is_none());
        assert!(keyword.previous_position().is_none());
        assert!(keyword.tracking_history().is_empty());
        assert!(keyword.last_checked().is_none());
    }

    #[test]
    fn test_add_blank_term_leaves_registry_unchanged() {
        let mut registry = KeywordRegistry::new();
        registry.add("1".to_string(), "coffee").unwrap();

        let err = registry.add("2".to_string(), "   ").unwrap_err();
        assert!(matches!(err, RankError::ValidationError { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_duplicate_id_is_rejected() {
        let mut registry = KeywordRegistry::new();
        registry.add("1".to_string(), "coffee").unwrap();
        assert!(registry.add("1".to_string(), "tea").is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_twice_is_not_found() {
        let mut registry = KeywordRegistry::new();
        registry.add("1".to_string(), "coffee").unwrap();
        registry.add("2".to_string(), "tea").unwrap();

        let removed = registry.remove("1").unwrap();
        assert_eq!(removed.term(), "coffee");

        for _ in 0..2 {
            let err = registry.remove("1").unwrap_err();
            assert!(matches!(
                err,
                RankError::NotFound {
                    kind: EntityKind::Keyword,
                    ..
                }
            ));
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("2").map(|k| k.term()), Some("tea"));
    }

    #[test]
    fn test_record_observation_appends_and_lags() {
        let mut registry = KeywordRegistry::new();
        registry.add("1".to_string(), "coffee").unwrap();

        registry.record_observation("1", 9, t0()).unwrap();
        let keyword = registry
            .record_observation("1", 4, t0() + Duration::minutes(5))
            .unwrap();

        assert_eq!(keyword.current_position(), Some(4));
        assert_eq!(keyword.previous_position(), Some(9));
        assert_eq!(keyword.tracking_history().len(), 2);
        assert_eq!(keyword.last_checked(), Some(t0() + Duration::minutes(5)));
    }

    #[test]
    fn test_record_observation_rejects_zero_position() {
        let mut registry = KeywordRegistry::new();
        registry.add("1".to_string(), "coffee").unwrap();

        let err = registry.record_observation("1", 0, t0()).unwrap_err();
        assert!(matches!(err, RankError::ValidationError { .. }));
        let keyword = registry.get("1").unwrap();
        assert!(keyword.tracking_history().is_empty());
        assert!(keyword.current_position().is_none());
    }

    #[test]
    fn test_record_observation_unknown_keyword() {
        let mut registry = KeywordRegistry::new();
        let err = registry.record_observation("missing", 3, t0()).unwrap_err();
        assert!(matches!(err, RankError::NotFound { .. }));
    }
}
