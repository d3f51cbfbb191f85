mod error;
mod traits;

pub mod memory;
#[cfg(feature = "smtp")]
pub mod smtp;
#[cfg(feature = "sns")]
pub mod sns;

pub use error::DispatchError;
pub use traits::NotificationChannel;
