use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::Client;
use aws_sdk_sns::config::{Credentials, Region};
use serde::Deserialize;

use super::error::DispatchError;
use super::traits::NotificationChannel;

/// SNS settings, built once at startup and injected into
/// [`SnsChannel::new`].
#[derive(Debug, Deserialize, Clone)]
pub struct SnsConfig {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

/// Topic-based pub/sub broadcast channel. The recipient is a topic ARN.
pub struct SnsChannel {
    client: Client,
}

impl SnsChannel {
    pub fn new(config: &SnsConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            config.session_token.clone(),
            None,
            "autoverse",
        );
        let conf = aws_sdk_sns::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(conf),
        }
    }
}

#[async_trait]
impl NotificationChannel for SnsChannel {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), DispatchError> {
        if recipient.trim().is_empty() {
            return Err(DispatchError::InvalidRecipient(
                "topic ARN cannot be empty".into(),
            ));
        }

        let response = self
            .client
            .publish()
            .topic_arn(recipient)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        tracing::debug!(message_id = ?response.message_id(), "published SNS notification");
        Ok(())
    }
}
