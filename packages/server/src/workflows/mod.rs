pub mod enquiry;
pub mod submission;
