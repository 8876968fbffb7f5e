//! Typed repository for application documents.
//!
//! Application ids are the deterministic pair id `"{job_id}_{applicant_id}"`;
//! the conditional create inside the apply commit is what makes duplicate
//! applications impossible, not a separate existence check.

use std::collections::HashMap;

use cc_models::{Application, ApplicationStatus};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    CollectionSelector, Document, FieldReference, Filter, FromStoreValue, Order, StructuredQuery,
    ToStoreValue, Value,
};

/// Collection holding application documents.
pub const APPLICATIONS: &str = "applications";

/// Repository for application documents.
#[derive(Clone)]
pub struct ApplicationRepository {
    client: StoreClient,
}

impl ApplicationRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Get an application by id.
    pub async fn get(&self, application_id: &str) -> StoreResult<Option<Application>> {
        match self.client.get_document(APPLICATIONS, application_id).await? {
            Some(doc) => Ok(Some(document_to_application(&doc)?)),
            None => Ok(None),
        }
    }

    /// List applications for one job, newest first.
    pub async fn list_by_job(&self, job_id: &str) -> StoreResult<Vec<Application>> {
        self.list_filtered("job_id", job_id).await
    }

    /// List applications submitted by one applicant, newest first.
    pub async fn list_by_applicant(&self, applicant_id: &str) -> StoreResult<Vec<Application>> {
        self.list_filtered("applicant_id", applicant_id).await
    }

    /// List the most recent applications across all jobs (admin stats).
    pub async fn list_recent(&self, limit: i32) -> StoreResult<Vec<Application>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: APPLICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: None,
            order_by: Some(vec![Order {
                field: FieldReference {
                    field_path: "created_at".to_string(),
                },
                direction: "DESCENDING".to_string(),
            }]),
            start_at: None,
            limit: Some(limit),
        };

        let docs = self.client.run_query(query).await?;
        docs.iter().map(document_to_application).collect()
    }

    async fn list_filtered(&self, field: &str, value: &str) -> StoreResult<Vec<Application>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: APPLICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(field, Value::StringValue(value.to_string()))),
            order_by: Some(vec![Order {
                field: FieldReference {
                    field_path: "created_at".to_string(),
                },
                direction: "DESCENDING".to_string(),
            }]),
            start_at: None,
            limit: None,
        };

        let docs = self.client.run_query(query).await?;
        docs.iter().map(document_to_application).collect()
    }
}

// =============================================================================
// Document conversion
// =============================================================================

pub(crate) fn application_to_fields(app: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("job_id".to_string(), app.job_id.to_store_value());
    fields.insert(
        "applicant_id".to_string(),
        app.applicant_id.to_store_value(),
    );
    fields.insert("resume".to_string(), app.resume.to_store_value());
    fields.insert(
        "cover_letter".to_string(),
        app.cover_letter.to_store_value(),
    );
    fields.insert("status".to_string(), app.status.as_str().to_store_value());
    fields.insert("notes".to_string(), app.notes.to_store_value());
    fields.insert("created_at".to_string(), app.created_at.to_store_value());
    fields.insert("updated_at".to_string(), app.updated_at.to_store_value());
    fields
}

pub(crate) fn document_to_application(doc: &Document) -> StoreResult<Application> {
    let id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("application document has no name"))?
        .to_string();

    let get_string = |name: &str| -> Option<String> {
        doc.field(name).and_then(String::from_store_value)
    };

    let status = get_string("status")
        .as_deref()
        .unwrap_or("pending")
        .parse::<ApplicationStatus>()
        .map_err(StoreError::invalid_document)?;

    Ok(Application {
        id,
        job_id: get_string("job_id").unwrap_or_default(),
        applicant_id: get_string("applicant_id").unwrap_or_default(),
        resume: get_string("resume"),
        cover_letter: get_string("cover_letter"),
        status,
        notes: get_string("notes"),
        created_at: doc
            .field("created_at")
            .and_then(FromStoreValue::from_store_value)
            .unwrap_or_else(chrono::Utc::now),
        updated_at: doc
            .field("updated_at")
            .and_then(FromStoreValue::from_store_value)
            .unwrap_or_else(chrono::Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_fields_round_trip() {
        let app = Application::new("job-1", "user-2", Some("/uploads/cv.pdf".into()), None);

        let doc = Document {
            name: Some(format!(
                "projects/p/databases/d/documents/applications/{}",
                app.id
            )),
            fields: Some(application_to_fields(&app)),
            create_time: None,
            update_time: None,
        };

        let back = document_to_application(&doc).unwrap();
        assert_eq!(back.id, "job-1_user-2");
        assert_eq!(back.job_id, "job-1");
        assert_eq!(back.applicant_id, "user-2");
        assert_eq!(back.status, ApplicationStatus::Pending);
        assert_eq!(back.resume.as_deref(), Some("/uploads/cv.pdf"));
    }

    #[test]
    fn bad_status_is_invalid_document() {
        let app = Application::new("job-1", "user-2", None, None);
        let mut fields = application_to_fields(&app);
        fields.insert("status".to_string(), "shortlisted".to_store_value());

        let doc = Document {
            name: Some("projects/p/databases/d/documents/applications/x".to_string()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };

        assert!(matches!(
            document_to_application(&doc),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
