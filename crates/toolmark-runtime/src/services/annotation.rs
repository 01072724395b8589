use crate::services::session::not_found;
use crate::{Error, Result};
use toolmark_index::Database;
use toolmark_types::{NewAnnotation, ToolCallAnnotation};

pub struct AnnotationService<'a> {
    db: &'a Database,
    annotator: &'a str,
}

impl<'a> AnnotationService<'a> {
    pub fn new(db: &'a Database, annotator: &'a str) -> Self {
        Self { db, annotator }
    }

    /// Validate the target tool call and store the annotation
    pub fn create(&self, new: NewAnnotation) -> Result<ToolCallAnnotation> {
        let session = self
            .db
            .get_session(&new.session_id)?
            .ok_or_else(|| not_found(&new.session_id))?;

        let message = session
            .messages
            .get(new.message_index)
            .ok_or_else(|| Error::InvalidOperation("invalid message index".to_string()))?;

        if new.tool_call_index >= message.tool_calls().len() {
            return Err(Error::InvalidOperation(
                "invalid tool call index".to_string(),
            ));
        }

        let record = ToolCallAnnotation::from_new(new, self.annotator);
        self.db.insert_annotation(&record)?;

        tracing::info!(
            session_id = %record.session_id,
            message_index = record.message_index,
            tool_call_index = record.tool_call_index,
            correctness = %record.correctness,
            "stored annotation"
        );

        Ok(record)
    }

    pub fn list(&self, session_id: Option<&str>) -> Result<Vec<ToolCallAnnotation>> {
        Ok(self.db.list_annotations(session_id)?)
    }
}
