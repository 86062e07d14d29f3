use crate::{
    error::{AppError, Result},
    models::notification::*,
    services::{
        queue::{MessageHandler, QueueTransport},
        Database,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Persistence boundary for notification rows, kept narrow so the
/// dispatcher can be exercised without a live database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: Notification) -> Result<()>;
}

#[async_trait]
impl NotificationStore for Database {
    async fn insert(&self, notification: Notification) -> Result<()> {
        let id = notification.id.clone();
        self.create("notification", &id, &notification).await
    }
}

/// The single boundary every triggering action calls through. Enforces the
/// no-self-notification rule and the contract that a notification failure
/// never fails the primary action.
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    queue: Arc<dyn QueueTransport>,
    queue_enabled: bool,
    consumer_started: Arc<AtomicBool>,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        queue: Arc<dyn QueueTransport>,
        queue_enabled: bool,
    ) -> Self {
        Self {
            store,
            queue,
            queue_enabled,
            consumer_started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Produce a notification for a completed domain action. Never returns
    /// an error: failures are logged and swallowed here so callers report
    /// the primary action's own outcome.
    pub async fn dispatch(&self, payload: NotificationPayload) {
        if let Some(sender_id) = &payload.sender_id {
            if *sender_id == payload.recipient_id {
                debug!("Skipping self-notification for user {}", sender_id);
                return;
            }
        }

        let result = if self.queue_enabled && self.queue.is_connected() {
            match self.queue.publish(&payload).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    warn!("Queue publish failed, persisting directly: {}", e);
                    self.persist(payload).await
                }
            }
        } else {
            self.persist(payload).await
        };

        if let Err(e) = result {
            warn!("Failed to deliver notification: {}", e);
        }
    }

    async fn persist(&self, payload: NotificationPayload) -> Result<()> {
        self.store.insert(build_notification(payload)).await
    }

    /// Register the background consumer. Lazy and once per process: later
    /// calls are no-ops.
    pub fn start_consumer(&self) {
        if self.consumer_started.swap(true, Ordering::SeqCst) {
            return;
        }

        let store = self.store.clone();
        let handler: MessageHandler = Arc::new(move |payload| {
            let store = store.clone();
            Box::pin(async move { process_message(store.as_ref(), payload).await })
        });

        let queue = self.queue.clone();
        tokio::spawn(async move {
            info!("Notification consumer started");
            if let Err(e) = queue.consume(handler).await {
                error!("Notification consumer stopped: {}", e);
            }
        });
    }
}

fn build_notification(payload: NotificationPayload) -> Notification {
    Notification {
        id: Uuid::new_v4().to_string(),
        recipient_id: payload.recipient_id,
        sender_id: payload.sender_id,
        kind: payload.kind,
        entity_id: payload.entity_id,
        entity_type: payload.entity_type,
        message: payload.message,
        is_read: false,
        created_at: Utc::now(),
    }
}

/// Turn one delivered queue message into a persisted notification row.
/// Shape problems are not retriable and are acknowledged by returning Ok;
/// persistence failures propagate so the transport requeues the message.
pub async fn process_message(
    store: &dyn NotificationStore,
    payload: NotificationPayload,
) -> Result<()> {
    if payload.recipient_id.is_empty() {
        error!("Dropping notification message without a recipient");
        return Ok(());
    }

    store.insert(build_notification(payload)).await
}

/// Notification CRUD used by the read/write endpoints, plus access to the
/// dispatch boundary for the triggering action services.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
    dispatcher: NotificationDispatcher,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>, dispatcher: NotificationDispatcher) -> Result<Self> {
        Ok(Self { db, dispatcher })
    }

    pub async fn dispatch(&self, payload: NotificationPayload) {
        self.dispatcher.dispatch(payload).await
    }

    pub async fn list_notifications(
        &self,
        recipient_id: &str,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<NotificationPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.db.config.default_notifications_per_page)
            .min(100);
        let offset = (page - 1) * limit;

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM notification
                    WHERE recipient_id = $recipient_id
                    ORDER BY created_at DESC
                    LIMIT $limit START $offset
                "#,
                json!({
                    "recipient_id": recipient_id,
                    "limit": limit,
                    "offset": offset
                }),
            )
            .await?;
        let notifications: Vec<Notification> = response.take(0)?;

        let total = self
            .db
            .count(
                "SELECT count() AS count FROM notification WHERE recipient_id = $recipient_id GROUP ALL",
                json!({ "recipient_id": recipient_id }),
            )
            .await? as usize;

        Ok(NotificationPage {
            notifications,
            current_page: page,
            total_pages: (total + limit - 1) / limit,
            total_notifications: total,
        })
    }

    pub async fn unread_count(&self, recipient_id: &str) -> Result<i64> {
        self.db
            .count(
                r#"
                    SELECT count() AS count FROM notification
                    WHERE recipient_id = $recipient_id AND is_read = false
                    GROUP ALL
                "#,
                json!({ "recipient_id": recipient_id }),
            )
            .await
    }

    pub async fn mark_as_read(&self, notification_id: &str, recipient_id: &str) -> Result<Notification> {
        let mut notification: Notification = self
            .db
            .get_by_id("notification", notification_id)
            .await?
            .filter(|n: &Notification| n.recipient_id == recipient_id)
            .ok_or_else(|| AppError::not_found("Notification"))?;

        self.db
            .update_merge("notification", notification_id, json!({ "is_read": true }))
            .await?;

        notification.is_read = true;
        Ok(notification)
    }

    pub async fn mark_all_as_read(&self, recipient_id: &str) -> Result<()> {
        self.db
            .query_with_params(
                r#"
                    UPDATE notification SET is_read = true
                    WHERE recipient_id = $recipient_id AND is_read = false
                "#,
                json!({ "recipient_id": recipient_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_notification(&self, notification_id: &str, recipient_id: &str) -> Result<()> {
        let _: Notification = self
            .db
            .get_by_id("notification", notification_id)
            .await?
            .filter(|n: &Notification| n.recipient_id == recipient_id)
            .ok_or_else(|| AppError::not_found("Notification"))?;

        self.db.delete_by_id("notification", notification_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::queue::MockQueueTransport;

    fn payload(sender: &str, recipient: &str) -> NotificationPayload {
        NotificationPayload {
            recipient_id: recipient.to_string(),
            sender_id: Some(sender.to_string()),
            kind: NotificationKind::PoemLiked,
            entity_id: Some("P1".to_string()),
            entity_type: EntityKind::Poem,
            message: "A님이 회원님의 시를 좋아합니다.".to_string(),
        }
    }

    fn dispatcher(
        store: MockNotificationStore,
        queue: MockQueueTransport,
        queue_enabled: bool,
    ) -> NotificationDispatcher {
        NotificationDispatcher::new(Arc::new(store), Arc::new(queue), queue_enabled)
    }

    #[tokio::test]
    async fn self_notification_is_skipped() {
        // No expectations: any store insert or queue publish would panic.
        let store = MockNotificationStore::new();
        let queue = MockQueueTransport::new();

        dispatcher(store, queue, true).dispatch(payload("A", "A")).await;
    }

    #[tokio::test]
    async fn dispatch_routes_through_the_queue_when_connected() {
        let store = MockNotificationStore::new();
        let mut queue = MockQueueTransport::new();
        queue.expect_is_connected().return_const(true);
        queue
            .expect_publish()
            .times(1)
            .withf(|p| p.recipient_id == "B" && p.kind == NotificationKind::PoemLiked)
            .returning(|_| Ok(()));

        dispatcher(store, queue, true).dispatch(payload("A", "B")).await;
    }

    #[tokio::test]
    async fn queue_failure_falls_back_to_direct_persistence() {
        let mut store = MockNotificationStore::new();
        store
            .expect_insert()
            .times(1)
            .withf(|n| n.recipient_id == "B" && !n.is_read)
            .returning(|_| Ok(()));

        let mut queue = MockQueueTransport::new();
        queue.expect_is_connected().return_const(true);
        queue
            .expect_publish()
            .times(1)
            .returning(|_| Err(AppError::transport("broker unreachable")));

        // Returns () either way: the primary action must not observe this.
        dispatcher(store, queue, true).dispatch(payload("A", "B")).await;
    }

    #[tokio::test]
    async fn dispatch_persists_directly_when_queueing_is_disabled() {
        let mut store = MockNotificationStore::new();
        store.expect_insert().times(1).returning(|_| Ok(()));
        let queue = MockQueueTransport::new();

        dispatcher(store, queue, false).dispatch(payload("A", "B")).await;
    }

    #[tokio::test]
    async fn dispatch_swallows_persistence_failure() {
        let mut store = MockNotificationStore::new();
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::internal("db timeout")));
        let queue = MockQueueTransport::new();

        dispatcher(store, queue, false).dispatch(payload("A", "B")).await;
    }

    #[tokio::test]
    async fn like_payload_creates_expected_notification_row() {
        let mut store = MockNotificationStore::new();
        store
            .expect_insert()
            .times(1)
            .withf(|n| {
                n.recipient_id == "B"
                    && n.sender_id.as_deref() == Some("A")
                    && n.kind == NotificationKind::PoemLiked
                    && n.entity_id.as_deref() == Some("P1")
                    && n.entity_type == EntityKind::Poem
                    && !n.is_read
            })
            .returning(|_| Ok(()));

        process_message(&store, payload("A", "B")).await.unwrap();
    }

    #[tokio::test]
    async fn message_without_recipient_is_acked_and_dropped() {
        // Returning Ok without inserting acknowledges the message so the
        // broker does not redeliver it forever.
        let store = MockNotificationStore::new();

        let mut bad = payload("A", "B");
        bad.recipient_id = String::new();

        process_message(&store, bad).await.unwrap();
    }

    #[tokio::test]
    async fn failed_persistence_is_retried_until_one_row_lands() {
        let mut store = MockNotificationStore::new();
        let mut attempts = 0;
        store.expect_insert().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(AppError::internal("db timeout"))
            } else {
                Ok(())
            }
        });

        // First delivery nacks, redelivery succeeds: one persisted row.
        assert!(process_message(&store, payload("A", "B")).await.is_err());
        assert!(process_message(&store, payload("A", "B")).await.is_ok());
    }

    #[tokio::test]
    async fn consumer_registration_happens_once() {
        let store = MockNotificationStore::new();
        let mut queue = MockQueueTransport::new();
        queue.expect_consume().times(1).returning(|_| Ok(()));

        let dispatcher = dispatcher(store, queue, true);
        dispatcher.start_consumer();
        dispatcher.start_consumer();

        // Yield so the spawned consumer task runs before the mock drops.
        tokio::task::yield_now().await;
    }
}
