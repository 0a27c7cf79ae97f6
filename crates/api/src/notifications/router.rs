//! Event-to-email routing.

use std::sync::Arc;

use fitback_db::repositories::UserRepo;
use fitback_db::DbPool;
use fitback_events::bus::{FEEDBACK_APPROVED, FEEDBACK_REJECTED};
use fitback_events::{templates, DomainEvent, EmailMessage, Mailer};
use tokio::sync::broadcast;

/// Turns review decisions into emails to the feedback owner.
///
/// Delivery is best effort: a failed send is logged and the loop moves on.
pub struct NotificationRouter {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](fitback_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Handle one event. Events without an email attached are ignored.
    pub async fn route_event(
        &self,
        event: &DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(message) = self.render(event).await? else {
            return Ok(());
        };
        self.mailer.send(&message).await?;
        tracing::debug!(
            event_type = %event.event_type,
            to = %message.to,
            "Notification email sent"
        );
        Ok(())
    }

    async fn render(&self, event: &DomainEvent) -> Result<Option<EmailMessage>, sqlx::Error> {
        let event_type = event.event_type.as_str();
        if event_type != FEEDBACK_APPROVED && event_type != FEEDBACK_REJECTED {
            return Ok(None);
        }
        let Some(owner_id) = event.subject_user_id else {
            tracing::warn!(event_type, "Review event without an owner, skipping");
            return Ok(None);
        };
        let Some(owner) = UserRepo::find_by_id(&self.pool, owner_id).await? else {
            return Ok(None);
        };

        let brand = event.payload_str("brand").unwrap_or("your item");
        let message = if event_type == FEEDBACK_APPROVED {
            let amount = event.payload_i64("amount").unwrap_or_default();
            templates::feedback_approved_email(&owner.email, &owner.name, brand, amount)
        } else {
            let notes = event.payload_str("notes").unwrap_or_default();
            templates::feedback_rejected_email(&owner.email, &owner.name, brand, notes)
        };
        Ok(Some(message))
    }
}
