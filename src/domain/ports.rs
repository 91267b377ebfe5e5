use crate::domain::model::RegistryEvent;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Only uniqueness is guaranteed; the format of the ids is up to the
/// implementation.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// 排名來源：模擬器或真正的搜尋 API
#[async_trait]
pub trait RankChecker: Send + Sync {
    async fn check_position(&self, domain: &str, term: &str) -> Result<u32>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &RegistryEvent, version: u64);
}
