mod annotation;
mod rlhf;
mod session;
mod stats;

pub use annotation::*;
pub use rlhf::*;
pub use session::*;
pub use stats::*;
