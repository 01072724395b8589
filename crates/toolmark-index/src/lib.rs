// SQLite session store
// Sessions are kept whole as JSON; annotations reference tool calls by position.
// Preference-data submissions keep their type-specific payload as JSON.

mod db;
mod error;
mod queries;
mod schema;

// Public API
pub use db::{Database, SubmissionColumn};
pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
