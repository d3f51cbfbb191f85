use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use super::error::DispatchError;
use super::traits::NotificationChannel;

/// SMTP relay settings, built once at startup and injected into
/// [`SmtpChannel::new`].
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    /// Sender address for outbound mail.
    pub from: String,
}

/// Direct email relay channel. The recipient is an email address.
pub struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpChannel {
    pub fn new(config: &SmtpConfig) -> Result<Self, DispatchError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| DispatchError::Configuration(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        if let Some(port) = config.port {
            builder = builder.port(port);
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl NotificationChannel for SmtpChannel {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), DispatchError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| DispatchError::Configuration(format!("bad sender: {e}")))?,
            )
            .to(recipient
                .parse::<lettre::message::Mailbox>()
                .map_err(|e| DispatchError::InvalidRecipient(e.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DispatchError::InvalidMessage(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        Ok(())
    }
}
