pub mod auth;
pub mod listing;
pub mod location;
pub mod shared;
