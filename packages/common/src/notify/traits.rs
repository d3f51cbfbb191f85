use async_trait::async_trait;

use super::error::DispatchError;

/// Outbound notification transport.
///
/// Channels are interchangeable at this contract's level: deliver a plain
/// subject+body to a destination (an email address for SMTP, a topic ARN
/// for SNS). A single attempt is made per call; callers needing retry
/// loop with backoff themselves. Transport failures come back as
/// [`DispatchError`]; nothing is raised past this boundary.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), DispatchError>;
}
