use crate::core::registry::RankRegistry;
use crate::domain::ports::RankChecker;
use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub checked: usize,
    pub failed: usize,
    /// 追蹤暫停時整輪略過
    pub skipped: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub checked: usize,
    pub failed: usize,
}

/// 定時排名檢查
///
/// The registry itself has no timer. This driver reads the tracking flag on
/// every tick and, when it is set, asks the [`RankChecker`] for a position
/// for each tracked keyword and records it.
pub struct AutoTracker<R: RankChecker> {
    checker: R,
    interval: Duration,
    all_businesses: bool,
}

impl<R: RankChecker> AutoTracker<R> {
    pub fn new(checker: R, interval: Duration) -> Self {
        Self {
            checker,
            interval,
            all_businesses: false,
        }
    }

    pub fn track_all_businesses(mut self, all: bool) -> Self {
        self.all_businesses = all;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Manual one-off check, independent of the tracking flag.
    pub async fn check_keyword(
        &self,
        registry: &mut RankRegistry,
        keyword_id: &str,
    ) -> Result<u32> {
        let (domain, term) = {
            let (business, keyword) = registry.keyword(keyword_id)?;
            (business.domain().to_string(), keyword.term().to_string())
        };

        let position = self.checker.check_position(&domain, &term).await?;
        registry.record_observation(keyword_id, position)?;
        tracing::info!("🔎 \"{}\" found at position {}", term, position);
        Ok(position)
    }

    pub async fn tick(&self, registry: &mut RankRegistry) -> TickReport {
        if !registry.is_tracking() {
            tracing::debug!("Tracking paused, skipping round");
            return TickReport {
                skipped: true,
                ..TickReport::default()
            };
        }

        let mut report = TickReport::default();
        for target in registry.tracked_keywords(self.all_businesses) {
            let outcome = match self
                .checker
                .check_position(&target.domain, &target.term)
                .await
            {
                Ok(position) => registry
                    .record_observation(&target.keyword_id, position)
                    .map(|_| position),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(position) => {
                    report.checked += 1;
                    tracing::debug!("\"{}\" on {} -> #{}", target.term, target.domain, position);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "⚠️ Rank check for \"{}\" failed: {} ({})",
                        target.term,
                        e,
                        e.recovery_suggestion()
                    );
                }
            }
        }

        tracing::info!(
            "📈 Tracking round done: {} checked, {} failed",
            report.checked,
            report.failed
        );
        report
    }

    /// Runs rounds until `max_ticks` is reached (when given) or `shutdown`
    /// resolves. The first round starts immediately.
    pub async fn run_until<F>(
        &self,
        registry: &mut RankRegistry,
        max_ticks: Option<u64>,
        shutdown: F,
    ) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let mut summary = RunSummary::default();
        if max_ticks == Some(0) {
            return summary;
        }

        let mut ticker = tokio::time::interval(self.interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Tracking loop stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.tick(registry).await;
                    summary.ticks += 1;
                    summary.checked += report.checked;
                    summary.failed += report.failed;

                    if max_ticks.is_some_and(|max| summary.ticks >= max) {
                        break;
                    }
                }
            }
        }

        summary
    }

    pub async fn run(&self, registry: &mut RankRegistry, ticks: u64) -> RunSummary {
        self.run_until(registry, Some(ticks), std::future::pending())
            .await
    }
}
