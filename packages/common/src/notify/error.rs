use std::fmt;

/// Errors that can occur while dispatching a notification.
#[derive(Debug)]
pub enum DispatchError {
    /// The recipient address/topic is not valid for the channel.
    InvalidRecipient(String),
    /// The message could not be assembled.
    InvalidMessage(String),
    /// The transport rejected the message or the connection failed.
    Transport(String),
    /// The channel could not be constructed from its configuration.
    Configuration(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRecipient(msg) => write!(f, "invalid recipient: {msg}"),
            Self::InvalidMessage(msg) => write!(f, "invalid message: {msg}"),
            Self::Transport(msg) => write!(f, "notification transport error: {msg}"),
            Self::Configuration(msg) => write!(f, "notification configuration error: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}
