pub mod annotation;
pub mod session;
pub mod submission;
