pub mod listing;
pub mod location;
pub mod seller;
