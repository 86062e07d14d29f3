use crate::{
    error::{AppError, Result},
    models::notification::NotificationPayload,
};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Boxed async handler invoked once per delivered message. Returning `Err`
/// negatively acknowledges the message and puts it back for redelivery.
pub type MessageHandler = Arc<
    dyn Fn(NotificationPayload) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync,
>;

/// Narrow transport boundary over the message broker. Carries no business
/// logic; the notification service decides what flows through it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Establish the connection and the named durable queue. Idempotent:
    /// calling on an already-connected transport is a no-op.
    async fn connect(&self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Serialize and enqueue one message. Fails with a transport error
    /// when no connection exists.
    async fn publish(&self, payload: &NotificationPayload) -> Result<()>;

    /// Drain the queue, invoking `handler` once per delivered message.
    /// Handler success acknowledges; handler failure requeues the message.
    /// Runs until the connection is closed.
    async fn consume(&self, handler: MessageHandler) -> Result<()>;

    /// Release the connection. Safe to call multiple times.
    async fn close(&self) -> Result<()>;
}

/// Queue transport over a Redis list. `BRPOPLPUSH` moves each message into
/// a processing list so an acknowledged message can be removed and a
/// rejected one pushed back, giving at-least-once delivery.
pub struct RedisQueue {
    url: String,
    queue_name: String,
    processing_name: String,
    connection: Mutex<Option<ConnectionManager>>,
    connected: std::sync::atomic::AtomicBool,
}

const CONSUME_BLOCK_SECONDS: f64 = 5.0;
const NACK_REDELIVERY_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

impl RedisQueue {
    pub fn new(url: &str, queue_name: &str) -> Self {
        Self {
            url: url.to_string(),
            queue_name: queue_name.to_string(),
            processing_name: format!("{}:processing", queue_name),
            connection: Mutex::new(None),
            connected: std::sync::atomic::AtomicBool::new(false),
        }
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        self.connection
            .lock()
            .await
            .clone()
            .ok_or_else(|| AppError::transport("Queue connection is not initialized"))
    }
}

#[async_trait]
impl QueueTransport for RedisQueue {
    async fn connect(&self) -> Result<()> {
        let mut guard = self.connection.lock().await;
        if guard.is_some() {
            debug!("Queue transport already connected");
            return Ok(());
        }

        let client = redis::Client::open(self.url.as_str())?;
        let manager = ConnectionManager::new(client).await?;
        *guard = Some(manager);
        self.connected
            .store(true, std::sync::atomic::Ordering::SeqCst);

        info!("Queue transport connected ({})", self.queue_name);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn publish(&self, payload: &NotificationPayload) -> Result<()> {
        let mut conn = self.connection().await?;
        let body = serde_json::to_string(payload)?;

        let _: i64 = conn.lpush(&self.queue_name, body).await?;
        debug!("Published message to {}", self.queue_name);
        Ok(())
    }

    async fn consume(&self, handler: MessageHandler) -> Result<()> {
        let mut conn = self.connection().await?;
        info!("Consuming from queue {}", self.queue_name);

        loop {
            if !self.is_connected() {
                return Ok(());
            }

            let delivered: Option<String> = conn
                .brpoplpush(&self.queue_name, &self.processing_name, CONSUME_BLOCK_SECONDS)
                .await?;

            let raw = match delivered {
                Some(raw) => raw,
                None => continue,
            };

            let payload: NotificationPayload = match serde_json::from_str(&raw) {
                Ok(payload) => payload,
                Err(e) => {
                    // Malformed payloads are not retriable: ack and drop.
                    error!("Dropping malformed queue message: {}", e);
                    let _: i64 = conn.lrem(&self.processing_name, 1, &raw).await?;
                    continue;
                }
            };

            match handler(payload).await {
                Ok(()) => {
                    let _: i64 = conn.lrem(&self.processing_name, 1, &raw).await?;
                }
                Err(e) => {
                    warn!("Message handler failed, requeueing: {}", e);
                    let _: i64 = conn.lrem(&self.processing_name, 1, &raw).await?;
                    let _: i64 = conn.rpush(&self.queue_name, &raw).await?;
                    // Keeps a persistently failing message from hot-looping
                    // between pop and requeue.
                    tokio::time::sleep(NACK_REDELIVERY_DELAY).await;
                }
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.connection.lock().await;
        if guard.take().is_some() {
            info!("Queue transport closed");
        }
        self.connected
            .store(false, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::{EntityKind, NotificationKind};

    fn sample_payload() -> NotificationPayload {
        NotificationPayload {
            recipient_id: "B".to_string(),
            sender_id: Some("A".to_string()),
            kind: NotificationKind::PoemLiked,
            entity_id: Some("P1".to_string()),
            entity_type: EntityKind::Poem,
            message: "A liked your poem".to_string(),
        }
    }

    #[tokio::test]
    async fn publish_without_connection_is_a_transport_error() {
        let queue = RedisQueue::new("redis://127.0.0.1:1", "notification_queue");

        let err = queue.publish(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn consume_without_connection_is_a_transport_error() {
        let queue = RedisQueue::new("redis://127.0.0.1:1", "notification_queue");
        let handler: MessageHandler = Arc::new(|_| Box::pin(async { Ok(()) }));

        let err = queue.consume(handler).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn close_is_safe_to_call_repeatedly() {
        let queue = RedisQueue::new("redis://127.0.0.1:1", "notification_queue");
        queue.close().await.unwrap();
        queue.close().await.unwrap();
        assert!(!queue.is_connected());
    }
}
