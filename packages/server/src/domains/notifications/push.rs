use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, info, warn};

use super::Device;
use crate::common::{FairytaleId, UserId};
use crate::kernel::{BaseFairytaleNotifier, BasePushNotificationService};

pub const FAIRYTALE_GENERATED: &str = "FAIRYTALE_GENERATED";

/// Title, body and data payload for a "fairytale ready" push.
pub fn fairytale_completed_message(
    fairytale_id: FairytaleId,
    fairytale_name: &str,
) -> (String, String, serde_json::Value) {
    let title = "Your fairytale is ready!".to_string();
    let body = format!("'{}' has finished generating.", fairytale_name);
    let data = json!({
        "id": fairytale_id.to_string(),
        "type": FAIRYTALE_GENERATED,
        "targetId": fairytale_id.to_string(),
        "message": body,
        "isRead": false,
        "createdAt": Utc::now().to_rfc3339(),
    });
    (title, body, data)
}

/// Sends completion pushes to every device the user has registered.
pub struct PushNotifier {
    pool: PgPool,
    push: Arc<dyn BasePushNotificationService>,
}

impl PushNotifier {
    pub fn new(pool: PgPool, push: Arc<dyn BasePushNotificationService>) -> Self {
        Self { pool, push }
    }
}

/// One push per token. Returns (sent, failed); a bad token never stops the rest.
pub async fn deliver_to_tokens(
    push: &dyn BasePushNotificationService,
    tokens: &[String],
    title: &str,
    body: &str,
    data: &serde_json::Value,
) -> (usize, usize) {
    let mut sent = 0;
    let mut failed = 0;

    for token in tokens {
        match push
            .send_notification(token, title, body, data.clone())
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => {
                error!(push_token = %token, error = %e, "Failed to send push to device");
                failed += 1;
            }
        }
    }

    (sent, failed)
}

#[async_trait]
impl BaseFairytaleNotifier for PushNotifier {
    async fn notify_completed(
        &self,
        user_id: UserId,
        fairytale_id: FairytaleId,
        fairytale_name: &str,
    ) -> Result<()> {
        let devices = Device::find_by_user_id(user_id, &self.pool).await?;
        if devices.is_empty() {
            warn!(user_id = %user_id, "No devices registered, skipping push");
            return Ok(());
        }

        let tokens: Vec<String> = devices.into_iter().map(|d| d.push_token).collect();
        let (title, body, data) = fairytale_completed_message(fairytale_id, fairytale_name);
        let (sent, failed) =
            deliver_to_tokens(self.push.as_ref(), &tokens, &title, &body, &data).await;

        info!(
            user_id = %user_id,
            fairytale_id = %fairytale_id,
            sent,
            failed,
            total = tokens.len(),
            "Fairytale completion pushes sent"
        );
        Ok(())
    }
}
