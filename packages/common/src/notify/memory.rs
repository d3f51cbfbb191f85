use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::error::DispatchError;
use super::traits::NotificationChannel;

/// A notification delivered through [`MemoryChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

/// Recording channel for tests and local development.
#[derive(Default)]
pub struct MemoryChannel {
    sent: Mutex<Vec<SentNotification>>,
    failing: AtomicBool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every `send` fails with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All notifications delivered so far, in order.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationChannel for MemoryChannel {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), DispatchError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DispatchError::Transport(
                "simulated transport failure".into(),
            ));
        }

        self.sent.lock().unwrap().push(SentNotification {
            subject: subject.to_string(),
            body: body.to_string(),
            recipient: recipient.to_string(),
        });

        Ok(())
    }
}
