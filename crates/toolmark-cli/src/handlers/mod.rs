pub mod annotate;
pub mod config;
pub mod detect;
pub mod import;
pub mod rlhf;
pub mod session;
pub mod stats;
