use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::cache::{PermissionCache, PermissionDataset};

/// Change notification delivered by the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionChangeEvent {
    /// A row in one dataset's table changed.
    Dataset(PermissionDataset),
    /// Unscoped change; every cached entry must be dropped.
    All,
}

/// Source of change notifications.
///
/// The transport is an adapter concern (Postgres notify, websocket,
/// polling); services only see the broadcast receiver.
pub trait PermissionChangeSource: Send + Sync {
    /// Returns a fresh receiver for the event feed.
    fn subscribe(&self) -> broadcast::Receiver<PermissionChangeEvent>;
}

/// Applies change events to the cache until the event channel closes.
///
/// Subscribe before spawning so no event is lost between startup and the
/// first poll. A lagged receiver has missed events, so the whole cache is
/// dropped rather than guessing which datasets changed.
pub async fn run_invalidation_listener(
    cache: Arc<dyn PermissionCache>,
    mut receiver: broadcast::Receiver<PermissionChangeEvent>,
) {
    loop {
        match receiver.recv().await {
            Ok(PermissionChangeEvent::Dataset(dataset)) => {
                debug!(?dataset, "invalidating cached dataset after change event");
                cache.invalidate_dataset(dataset).await;
            }
            Ok(PermissionChangeEvent::All) => {
                debug!("invalidating entire permission cache after unscoped change event");
                cache.invalidate_all().await;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "change event receiver lagged; dropping entire cache");
                cache.invalidate_all().await;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
