use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::kernel::BasePushNotificationService;

const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Expo push notification client.
pub struct ExpoClient {
    client: Client,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExpoMessage {
    to: String,
    title: String,
    body: String,
    data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<String>,
}

impl ExpoMessage {
    fn new(push_token: &str, title: &str, body: &str, data: serde_json::Value) -> Self {
        Self {
            to: push_token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
            sound: Some("default".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpoResponse {
    data: ExpoTickets,
}

/// Expo answers a single message with one ticket and a list of messages
/// with a list of tickets.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpoTickets {
    One(ExpoTicket),
    Many(Vec<ExpoTicket>),
}

impl ExpoTickets {
    fn into_vec(self) -> Vec<ExpoTicket> {
        match self {
            ExpoTickets::One(t) => vec![t],
            ExpoTickets::Many(ts) => ts,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpoTicket {
    status: String,
    message: Option<String>,
}

impl ExpoClient {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            access_token,
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<ExpoTicket>> {
        let mut request = self.client.post(EXPO_PUSH_URL).json(body);

        // Optional; raises Expo's rate limits
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Expo push request failed");
            anyhow::bail!("Expo push API error {}: {}", status, body);
        }

        let expo_response: ExpoResponse = response.json().await?;
        Ok(expo_response.data.into_vec())
    }
}

#[async_trait]
impl BasePushNotificationService for ExpoClient {
    async fn send_notification(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()> {
        debug!(push_token, "Sending Expo push notification");

        let tickets = self
            .post(&ExpoMessage::new(push_token, title, body, data))
            .await?;

        if let Some(ticket) = tickets.iter().find(|t| t.status == "error") {
            anyhow::bail!(
                "Expo ticket error: {}",
                ticket.message.as_deref().unwrap_or("unknown")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_batch_tickets_parse() {
        let one: ExpoResponse =
            serde_json::from_str(r#"{"data":{"status":"ok","id":"abc"}}"#).unwrap();
        assert_eq!(one.data.into_vec().len(), 1);

        let many: ExpoResponse = serde_json::from_str(
            r#"{"data":[{"status":"ok"},{"status":"error","message":"DeviceNotRegistered"}]}"#,
        )
        .unwrap();
        let tickets = many.data.into_vec();
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[1].message.as_deref(), Some("DeviceNotRegistered"));
    }

    #[test]
    fn message_carries_default_sound() {
        let msg = ExpoMessage::new("ExponentPushToken[x]", "t", "b", serde_json::json!({}));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sound"], "default");
        assert_eq!(json["to"], "ExponentPushToken[x]");
    }
}
