use crate::domain::model::RegistryEvent;
use crate::domain::ports::ChangeListener;

/// Writes every registry change to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl ChangeListener for TracingListener {
    fn on_change(&self, event: &RegistryEvent, version: u64) {
        match event {
            RegistryEvent::ObservationRecorded {
                keyword_id,
                position,
                ..
            } => {
                tracing::info!(version, keyword_id = %keyword_id, position, "ranking recorded");
            }
            other => tracing::debug!(version, "registry changed: {:?}", other),
        }
    }
}
