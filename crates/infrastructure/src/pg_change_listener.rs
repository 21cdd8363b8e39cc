use freightdesk_application::{PermissionChangeEvent, PermissionChangeSource, PermissionDataset};
use freightdesk_core::{AppError, AppResult};
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const CHANNEL: &str = "permission_changed";
const BROADCAST_CAPACITY: usize = 64;

/// Bridges `pg_notify` on the `permission_changed` channel onto a broadcast
/// feed of change events.
///
/// The notification payload is the name of the table that changed; an
/// unknown payload maps to an unscoped event so stale entries are never
/// kept on a guess. A dropped database connection is retried by the
/// forwarding task; subscribers see no events while it reconnects, which
/// is safe because cache entries still expire on their own.
pub struct PgChangeListener {
    sender: broadcast::Sender<PermissionChangeEvent>,
}

impl PgChangeListener {
    /// Connects to the notification channel and spawns the forwarding task.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let mut listener = PgListener::connect(database_url).await.map_err(|error| {
            AppError::Internal(format!("failed to connect change listener: {error}"))
        })?;
        listener.listen(CHANNEL).await.map_err(|error| {
            AppError::Internal(format!("failed to listen on '{CHANNEL}': {error}"))
        })?;

        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        let forwarder = sender.clone();
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        let event = map_payload(notification.payload());
                        debug!(payload = notification.payload(), ?event, "change notification");
                        if forwarder.send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        // recv re-establishes the connection internally; a
                        // reconnect may have missed notifications.
                        warn!(%error, "change listener connection error");
                        if forwarder.send(PermissionChangeEvent::All).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self { sender })
    }
}

fn map_payload(payload: &str) -> PermissionChangeEvent {
    match payload {
        "role_permission_templates" => {
            PermissionChangeEvent::Dataset(PermissionDataset::RoleTemplates)
        }
        "user_permissions" => PermissionChangeEvent::Dataset(PermissionDataset::UserOverrides),
        "profiles" => PermissionChangeEvent::Dataset(PermissionDataset::Profiles),
        "projects" => PermissionChangeEvent::Dataset(PermissionDataset::Projects),
        "menu_config" => PermissionChangeEvent::Dataset(PermissionDataset::MenuConfig),
        other => {
            warn!(payload = other, "unknown change payload; treating as unscoped");
            PermissionChangeEvent::All
        }
    }
}

impl PermissionChangeSource for PgChangeListener {
    fn subscribe(&self) -> broadcast::Receiver<PermissionChangeEvent> {
        self.sender.subscribe()
    }
}
