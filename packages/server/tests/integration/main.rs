mod common;

mod auth;
mod enquiry;
mod listing;
