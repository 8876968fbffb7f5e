//! Typed repository for job documents.

use std::collections::HashMap;

use tracing::info;

use cc_models::{Job, JobType, Salary};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    CollectionSelector, Document, FieldReference, Filter, FromStoreValue, MapValue, Order,
    StructuredQuery, ToStoreValue, Value,
};

/// Collection holding job documents.
pub const JOBS: &str = "jobs";

/// Server-side filters for job queries. Substring matching on
/// title/location/company happens in the API layer; the store only
/// supports equality filters.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub job_type: Option<JobType>,
    pub is_featured: Option<bool>,
    /// Only active jobs unless explicitly disabled (admin views).
    pub include_inactive: bool,
    pub limit: i32,
}

/// Repository for job documents.
#[derive(Clone)]
pub struct JobRepository {
    client: StoreClient,
}

impl JobRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Create a new job document.
    pub async fn create(&self, job: &Job) -> StoreResult<()> {
        self.client
            .create_document(JOBS, &job.id, job_to_fields(job))
            .await?;
        info!(job_id = %job.id, owner = %job.posted_by, "Created job");
        Ok(())
    }

    /// Get a job by id.
    pub async fn get(&self, job_id: &str) -> StoreResult<Option<Job>> {
        match self.client.get_document(JOBS, job_id).await? {
            Some(doc) => Ok(Some(document_to_job(&doc)?)),
            None => Ok(None),
        }
    }

    /// Replace the stored job with the given state.
    pub async fn update(&self, job: &Job) -> StoreResult<()> {
        let fields = job_to_fields(job);
        let mask: Vec<String> = fields.keys().cloned().collect();
        self.client
            .update_document(JOBS, &job.id, fields, Some(mask))
            .await?;
        Ok(())
    }

    /// Record a detail view. The mask covers only the counter and the
    /// timestamp, so a page view cannot clobber concurrent writes to
    /// `applicants` or any other field.
    pub async fn increment_view_count(&self, job_id: &str, view_count: u32) -> StoreResult<()> {
        let fields = view_count_fields(view_count, chrono::Utc::now());
        let mask: Vec<String> = fields.keys().cloned().collect();
        self.client
            .update_document(JOBS, job_id, fields, Some(mask))
            .await?;
        Ok(())
    }

    /// Query jobs, newest first, with equality filters pushed down.
    pub async fn query(&self, params: &JobQuery) -> StoreResult<Vec<Job>> {
        let mut filters = Vec::new();
        if !params.include_inactive {
            filters.push(Filter::eq("is_active", Value::BooleanValue(true)));
        }
        if let Some(job_type) = params.job_type {
            filters.push(Filter::eq(
                "job_type",
                Value::StringValue(job_type.as_str().to_string()),
            ));
        }
        if let Some(is_featured) = params.is_featured {
            filters.push(Filter::eq("is_featured", Value::BooleanValue(is_featured)));
        }

        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: JOBS.to_string(),
                all_descendants: None,
            }],
            r#where: Filter::and(filters),
            order_by: Some(vec![Order {
                field: FieldReference {
                    field_path: "created_at".to_string(),
                },
                direction: "DESCENDING".to_string(),
            }]),
            start_at: None,
            limit: Some(params.limit),
        };

        let docs = self.client.run_query(query).await?;
        docs.iter().map(document_to_job).collect()
    }

    /// List jobs owned by one user, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Job>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: JOBS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "posted_by",
                Value::StringValue(owner_id.to_string()),
            )),
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
        docs.iter().map(document_to_job).collect()
    }
}

// =============================================================================
// Document conversion
// =============================================================================

pub(crate) fn job_to_fields(job: &Job) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), job.title.to_store_value());
    fields.insert("company".to_string(), job.company.to_store_value());
    fields.insert("location".to_string(), job.location.to_store_value());
    fields.insert("description".to_string(), job.description.to_store_value());
    fields.insert(
        "requirements".to_string(),
        job.requirements.to_store_value(),
    );
    fields.insert(
        "salary".to_string(),
        match &job.salary {
            Some(s) => salary_to_value(s),
            None => Value::NullValue(()),
        },
    );
    fields.insert(
        "job_type".to_string(),
        job.job_type.as_str().to_store_value(),
    );
    fields.insert("posted_by".to_string(), job.posted_by.to_store_value());
    fields.insert("applicants".to_string(), job.applicants.to_store_value());
    fields.insert("is_active".to_string(), job.is_active.to_store_value());
    fields.insert("is_featured".to_string(), job.is_featured.to_store_value());
    fields.insert("view_count".to_string(), job.view_count.to_store_value());
    fields.insert("created_at".to_string(), job.created_at.to_store_value());
    fields.insert("updated_at".to_string(), job.updated_at.to_store_value());
    fields
}

pub(crate) fn document_to_job(doc: &Document) -> StoreResult<Job> {
    let id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("job document has no name"))?
        .to_string();

    let get_string = |name: &str| -> Option<String> {
        doc.field(name).and_then(String::from_store_value)
    };

    let job_type = get_string("job_type")
        .as_deref()
        .unwrap_or("Full-time")
        .parse::<JobType>()
        .map_err(StoreError::invalid_document)?;

    Ok(Job {
        id,
        title: get_string("title").unwrap_or_default(),
        company: get_string("company").unwrap_or_default(),
        location: get_string("location").unwrap_or_default(),
        description: get_string("description").unwrap_or_default(),
        requirements: doc
            .field("requirements")
            .and_then(Vec::from_store_value)
            .unwrap_or_default(),
        salary: doc.field("salary").and_then(value_to_salary),
        job_type,
        posted_by: get_string("posted_by").unwrap_or_default(),
        applicants: doc
            .field("applicants")
            .and_then(Vec::from_store_value)
            .unwrap_or_default(),
        is_active: doc
            .field("is_active")
            .and_then(bool::from_store_value)
            .unwrap_or(true),
        is_featured: doc
            .field("is_featured")
            .and_then(bool::from_store_value)
            .unwrap_or(false),
        view_count: doc
            .field("view_count")
            .and_then(u32::from_store_value)
            .unwrap_or(0),
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

pub(crate) fn view_count_fields(
    view_count: u32,
    updated_at: chrono::DateTime<chrono::Utc>,
) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("view_count".to_string(), view_count.to_store_value());
    fields.insert("updated_at".to_string(), updated_at.to_store_value());
    fields
}

fn salary_to_value(salary: &Salary) -> Value {
    let mut fields = HashMap::new();
    fields.insert("min".to_string(), salary.min.to_store_value());
    fields.insert("max".to_string(), salary.max.to_store_value());
    fields.insert("currency".to_string(), salary.currency.to_store_value());
    Value::MapValue(MapValue { fields: Some(fields) })
}

fn value_to_salary(value: &Value) -> Option<Salary> {
    let Value::MapValue(map) = value else {
        return None;
    };
    let fields = map.fields.as_ref()?;
    Some(Salary {
        min: fields.get("min").and_then(i64::from_store_value),
        max: fields.get("max").and_then(i64::from_store_value),
        currency: fields
            .get("currency")
            .and_then(String::from_store_value)
            .unwrap_or_else(|| "USD".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_fields_round_trip() {
        let mut job = Job::new("Backend Engineer", "Acme", "Remote", "Build APIs", "user-1");
        job.requirements = vec!["Rust".to_string(), "SQL".to_string()];
        job.salary = Some(Salary {
            min: Some(80_000),
            max: Some(120_000),
            currency: "USD".to_string(),
        });
        job.job_type = JobType::Remote;
        job.applicants = vec!["app-1".to_string()];

        let doc = Document {
            name: Some(format!("projects/p/databases/d/documents/jobs/{}", job.id)),
            fields: Some(job_to_fields(&job)),
            create_time: None,
            update_time: None,
        };

        let back = document_to_job(&doc).unwrap();
        assert_eq!(back.title, job.title);
        assert_eq!(back.job_type, JobType::Remote);
        assert_eq!(back.salary.as_ref().unwrap().min, Some(80_000));
        assert_eq!(back.applicants, job.applicants);
        assert!(back.is_active);
    }

    #[test]
    fn view_count_patch_touches_only_counter_and_timestamp() {
        let fields = view_count_fields(42, chrono::Utc::now());
        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["updated_at", "view_count"]);
        assert!(matches!(
            fields.get("view_count"),
            Some(Value::IntegerValue(v)) if v == "42"
        ));
    }

    #[test]
    fn missing_salary_is_none() {
        let job = Job::new("T", "C", "L", "D", "u");
        let doc = Document {
            name: Some("projects/p/databases/d/documents/jobs/j1".to_string()),
            fields: Some(job_to_fields(&job)),
            create_time: None,
            update_time: None,
        };
        assert!(document_to_job(&doc).unwrap().salary.is_none());
    }
}
