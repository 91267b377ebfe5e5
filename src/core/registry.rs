use crate::adapters::clock::SystemClock;
use crate::adapters::ids::SequentialIdGenerator;
use crate::core::metrics::{self, BusinessStats, KeywordRollup};
use crate::domain::model::{Business, EntityKind, Keyword, RegistryEvent};
use crate::domain::ports::{ChangeListener, Clock, IdGenerator};
use crate::utils::error::{RankError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 追蹤目標：哪個商家的哪個關鍵字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedKeyword {
    pub business_id: String,
    pub keyword_id: String,
    pub domain: String,
    pub term: String,
}

/// Owns every business and its keywords.
///
/// The methods on this type are the whole mutation surface. Each successful
/// mutation bumps [`RankRegistry::version`] and is announced to the
/// registered [`ChangeListener`]s; failed operations leave state and version
/// untouched.
pub struct RankRegistry {
    businesses: Vec<Business>,
    selected: Option<String>,
    tracking: bool,
    version: u64,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl Default for RankRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RankRegistry {
    pub fn new() -> Self {
        Self::with_deps(Arc::new(SystemClock), Arc::new(SequentialIdGenerator::new()))
    }

    pub fn with_deps(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            businesses: Vec::new(),
            selected: None,
            tracking: false,
            version: 0,
            clock,
            ids,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn commit(&mut self, event: RegistryEvent) {
        self.version += 1;
        tracing::debug!("registry v{}: {:?}", self.version, event);
        for listener in &self.listeners {
            listener.on_change(&event, self.version);
        }
    }

    // --- businesses ---

    pub fn add_business(&mut self, name: &str, domain: &str) -> Result<&Business> {
        let name = validate_non_empty_string("name", name)?;
        let domain = validate_non_empty_string("domain", domain)?;

        let id = self.ids.next_id();
        let business = Business::new(
            id.clone(),
            name.to_string(),
            domain.to_string(),
            self.clock.now(),
        );
        tracing::info!("🏢 Now tracking rankings for {} ({})", name, domain);

        self.businesses.push(business);
        self.selected = Some(id.clone());
        self.commit(RegistryEvent::BusinessAdded { business_id: id });

        let index = self.businesses.len() - 1;
        Ok(&self.businesses[index])
    }

    /// Drops the business together with all of its keywords. When it was the
    /// active selection, the first remaining business becomes selected.
    pub fn remove_business(&mut self, business_id: &str) -> Result<Business> {
        let index = self.business_index(business_id)?;
        let removed = self.businesses.remove(index);

        if self.selected.as_deref() == Some(business_id) {
            self.selected = self.businesses.first().map(|b| b.id().to_string());
        }
        self.commit(RegistryEvent::BusinessRemoved {
            business_id: business_id.to_string(),
        });
        Ok(removed)
    }

    /// Unknown ids are reported as `NotFound` and the selection stays as it
    /// was.
    pub fn select_business(&mut self, business_id: &str) -> Result<&Business> {
        let index = self.business_index(business_id)?;
        self.selected = Some(business_id.to_string());
        self.commit(RegistryEvent::BusinessSelected {
            business_id: business_id.to_string(),
        });
        Ok(&self.businesses[index])
    }

    pub fn list_businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn business(&self, business_id: &str) -> Result<&Business> {
        self.businesses
            .iter()
            .find(|b| b.id() == business_id)
            .ok_or_else(|| RankError::not_found(EntityKind::Business, business_id))
    }

    pub fn selected_business_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_business(&self) -> Option<&Business> {
        let id = self.selected.as_deref()?;
        self.businesses.iter().find(|b| b.id() == id)
    }

    pub fn selected_keywords(&self) -> &[Keyword] {
        self.selected_business()
            .map(|b| b.keywords())
            .unwrap_or(&[])
    }

    pub fn business_stats(&self, business_id: &str) -> Result<BusinessStats> {
        Ok(metrics::business_stats(self.business(business_id)?))
    }

    pub fn keyword_rollup(&self, business_id: &str) -> Result<KeywordRollup> {
        Ok(metrics::rollup(self.business(business_id)?.keywords()))
    }

    fn business_index(&self, business_id: &str) -> Result<usize> {
        self.businesses
            .iter()
            .position(|b| b.id() == business_id)
            .ok_or_else(|| RankError::not_found(EntityKind::Business, business_id))
    }

    // --- keywords ---

    pub fn add_keyword(&mut self, business_id: &str, term: &str) -> Result<&Keyword> {
        let index = self.business_index(business_id)?;
        let id = self.ids.next_id();
        let keyword_id = self.businesses[index]
            .keywords
            .add(id, term)?
            .id()
            .to_string();
        tracing::debug!(
            "➕ Keyword \"{}\" added to {}",
            term.trim(),
            self.businesses[index].name()
        );

        self.commit(RegistryEvent::KeywordAdded {
            business_id: business_id.to_string(),
            keyword_id: keyword_id.clone(),
        });
        self.keyword_in(index, &keyword_id)
    }

    pub fn remove_keyword(&mut self, business_id: &str, keyword_id: &str) -> Result<Keyword> {
        let index = self.business_index(business_id)?;
        let removed = self.businesses[index].keywords.remove(keyword_id)?;
        tracing::debug!("➖ Keyword \"{}\" removed from tracking", removed.term());

        self.commit(RegistryEvent::KeywordRemoved {
            business_id: business_id.to_string(),
            keyword_id: keyword_id.to_string(),
        });
        Ok(removed)
    }

    /// Looks a keyword up across every business.
    pub fn keyword(&self, keyword_id: &str) -> Result<(&Business, &Keyword)> {
        self.businesses
            .iter()
            .find_map(|b| b.keyword(keyword_id).map(|k| (b, k)))
            .ok_or_else(|| RankError::not_found(EntityKind::Keyword, keyword_id))
    }

    /// 記錄一次排名檢查結果，時間戳為當下
    pub fn record_observation(&mut self, keyword_id: &str, position: u32) -> Result<&Keyword> {
        let now = self.clock.now();
        self.record_observation_at(keyword_id, position, now)
    }

    /// Replays a sample at a given instant. Used for seeding history.
    pub(crate) fn record_observation_at(
        &mut self,
        keyword_id: &str,
        position: u32,
        at: DateTime<Utc>,
    ) -> Result<&Keyword> {
        let index = self
            .businesses
            .iter()
            .position(|b| b.keywords.contains(keyword_id))
            .ok_or_else(|| RankError::not_found(EntityKind::Keyword, keyword_id))?;

        let business_id = self.businesses[index].id().to_string();
        self.businesses[index]
            .keywords
            .record_observation(keyword_id, position, at)?;
        tracing::debug!("🔎 Keyword {} found at position {}", keyword_id, position);

        self.commit(RegistryEvent::ObservationRecorded {
            business_id,
            keyword_id: keyword_id.to_string(),
            position,
        });
        self.keyword_in(index, keyword_id)
    }

    fn keyword_in(&self, index: usize, keyword_id: &str) -> Result<&Keyword> {
        self.businesses[index]
            .keyword(keyword_id)
            .ok_or_else(|| RankError::not_found(EntityKind::Keyword, keyword_id))
    }

    // --- tracking toggle ---

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn set_tracking(&mut self, enabled: bool) {
        if self.tracking == enabled {
            return;
        }
        self.tracking = enabled;
        if enabled {
            tracing::info!("▶️ Tracking started");
        } else {
            tracing::info!("⏸️ Tracking paused");
        }
        self.commit(RegistryEvent::TrackingToggled { enabled });
    }

    pub fn toggle_tracking(&mut self) -> bool {
        self.set_tracking(!self.tracking);
        self.tracking
    }

    /// Keywords handed to the periodic driver: the selected business only,
    /// or every business when `all_businesses` is set.
    pub fn tracked_keywords(&self, all_businesses: bool) -> Vec<TrackedKeyword> {
        let businesses: Vec<&Business> = if all_businesses {
            self.businesses.iter().collect()
        } else {
            self.selected_business().into_iter().collect()
        };

        businesses
            .into_iter()
            .flat_map(|b| {
                b.keywords().iter().map(move |k| TrackedKeyword {
                    business_id: b.id().to_string(),
                    keyword_id: k.id().to_string(),
                    domain: b.domain().to_string(),
                    term: k.term().to_string(),
                })
            })
            .collect()
    }
}
