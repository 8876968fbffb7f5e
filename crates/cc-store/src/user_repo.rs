//! Typed repository for user documents.
//!
//! Email uniqueness is enforced at the storage layer: registration writes
//! the user document and an `email_index` entry in one atomic commit, with
//! an exists=false precondition on the index entry.

use std::collections::HashMap;

use tracing::info;

use cc_models::{Education, Experience, Role, User};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    CollectionSelector, Document, Filter, FromStoreValue, MapValue, Order, FieldReference,
    StructuredQuery, ToStoreValue, Value, Write,
};

/// Collection holding user documents.
pub const USERS: &str = "users";
/// Collection mapping lowercased email to user id.
pub const EMAIL_INDEX: &str = "email_index";

/// Repository for user documents.
#[derive(Clone)]
pub struct UserRepository {
    client: StoreClient,
}

impl UserRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Register a new user. The email-index entry and the user document
    /// are written atomically; an existing email rejects the whole commit.
    pub async fn register(&self, user: &User) -> StoreResult<()> {
        let email_key = User::email_key(&user.email);

        let mut index_fields = HashMap::new();
        index_fields.insert("user_id".to_string(), user.id.to_store_value());

        let writes = vec![
            Write::create(
                self.client.full_document_name(EMAIL_INDEX, &email_key),
                index_fields,
            ),
            Write::create(
                self.client.full_document_name(USERS, &user.id),
                user_to_fields(user),
            ),
        ];

        match self.client.commit(writes).await {
            Ok(_) => {
                info!(user_id = %user.id, "Registered user");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                Err(StoreError::AlreadyExists(format!("{}/{}", EMAIL_INDEX, email_key)))
            }
            Err(e) => Err(e),
        }
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: &str) -> StoreResult<Option<User>> {
        match self.client.get_document(USERS, user_id).await? {
            Some(doc) => Ok(Some(document_to_user(&doc)?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email via the email index.
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email_key = User::email_key(email);
        let index = self.client.get_document(EMAIL_INDEX, &email_key).await?;

        let user_id = match index.as_ref().and_then(|d| d.field("user_id")) {
            Some(v) => match String::from_store_value(v) {
                Some(id) => id,
                None => return Ok(None),
            },
            None => return Ok(None),
        };

        self.get(&user_id).await
    }

    /// Replace the mutable profile fields of a user.
    pub async fn update(&self, user: &User) -> StoreResult<()> {
        let fields = user_to_fields(user);
        let mask: Vec<String> = fields.keys().cloned().collect();
        self.client
            .update_document(USERS, &user.id, fields, Some(mask))
            .await?;
        Ok(())
    }

    /// Overwrite the stored credential hash.
    pub async fn set_password_hash(&self, user_id: &str, password_hash: &str) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("password_hash".to_string(), password_hash.to_store_value());
        fields.insert("updated_at".to_string(), chrono::Utc::now().to_store_value());

        self.client
            .update_document(
                USERS,
                user_id,
                fields,
                Some(vec!["password_hash".to_string(), "updated_at".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Store the reference path of an uploaded resume.
    pub async fn set_resume(&self, user_id: &str, resume_path: &str) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("resume".to_string(), resume_path.to_store_value());
        fields.insert("updated_at".to_string(), chrono::Utc::now().to_store_value());

        self.client
            .update_document(
                USERS,
                user_id,
                fields,
                Some(vec!["resume".to_string(), "updated_at".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// List users, newest first, optionally restricted to one role.
    /// Substring filters on name/email are applied by the caller.
    pub async fn list(&self, role: Option<Role>, limit: i32) -> StoreResult<Vec<User>> {
        let mut query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: USERS.to_string(),
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

        if let Some(role) = role {
            query.r#where = Some(Filter::eq(
                "role",
                Value::StringValue(role.as_str().to_string()),
            ));
        }

        let docs = self.client.run_query(query).await?;
        docs.iter().map(document_to_user).collect()
    }
}

// =============================================================================
// Document conversion
// =============================================================================

pub(crate) fn user_to_fields(user: &User) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), user.name.to_store_value());
    fields.insert("email".to_string(), user.email.to_store_value());
    fields.insert(
        "password_hash".to_string(),
        user.password_hash.to_store_value(),
    );
    fields.insert(
        "role".to_string(),
        user.role.as_str().to_store_value(),
    );
    fields.insert("resume".to_string(), user.resume.to_store_value());
    fields.insert("skills".to_string(), user.skills.to_store_value());
    fields.insert(
        "education".to_string(),
        Value::ArrayValue(crate::types::ArrayValue {
            values: Some(user.education.iter().map(education_to_value).collect()),
        }),
    );
    fields.insert(
        "experience".to_string(),
        Value::ArrayValue(crate::types::ArrayValue {
            values: Some(user.experience.iter().map(experience_to_value).collect()),
        }),
    );
    fields.insert("bio".to_string(), user.bio.to_store_value());
    fields.insert("location".to_string(), user.location.to_store_value());
    fields.insert("phone".to_string(), user.phone.to_store_value());
    fields.insert("created_at".to_string(), user.created_at.to_store_value());
    fields.insert("updated_at".to_string(), user.updated_at.to_store_value());
    fields
}

pub(crate) fn document_to_user(doc: &Document) -> StoreResult<User> {
    let id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("user document has no name"))?
        .to_string();

    let get_string = |name: &str| -> Option<String> {
        doc.field(name).and_then(String::from_store_value)
    };

    let role = get_string("role")
        .as_deref()
        .unwrap_or("seeker")
        .parse::<Role>()
        .map_err(StoreError::invalid_document)?;

    Ok(User {
        id,
        name: get_string("name").unwrap_or_default(),
        email: get_string("email").unwrap_or_default(),
        password_hash: get_string("password_hash").unwrap_or_default(),
        role,
        resume: get_string("resume"),
        skills: doc
            .field("skills")
            .and_then(Vec::from_store_value)
            .unwrap_or_default(),
        education: doc
            .field("education")
            .map(values_to_education)
            .unwrap_or_default(),
        experience: doc
            .field("experience")
            .map(values_to_experience)
            .unwrap_or_default(),
        bio: get_string("bio"),
        location: get_string("location"),
        phone: get_string("phone"),
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

fn education_to_value(e: &Education) -> Value {
    let mut fields = HashMap::new();
    fields.insert("institution".to_string(), e.institution.to_store_value());
    fields.insert("degree".to_string(), e.degree.to_store_value());
    fields.insert("field".to_string(), e.field.to_store_value());
    fields.insert("start_year".to_string(), e.start_year.to_store_value());
    fields.insert("end_year".to_string(), e.end_year.to_store_value());
    Value::MapValue(MapValue { fields: Some(fields) })
}

fn experience_to_value(e: &Experience) -> Value {
    let mut fields = HashMap::new();
    fields.insert("company".to_string(), e.company.to_store_value());
    fields.insert("position".to_string(), e.position.to_store_value());
    fields.insert("start_date".to_string(), e.start_date.to_store_value());
    fields.insert("end_date".to_string(), e.end_date.to_store_value());
    fields.insert("description".to_string(), e.description.to_store_value());
    Value::MapValue(MapValue { fields: Some(fields) })
}

fn values_to_education(value: &Value) -> Vec<Education> {
    let Value::ArrayValue(arr) = value else {
        return Vec::new();
    };
    arr.values
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| {
            let Value::MapValue(map) = v else { return None };
            let fields = map.fields.as_ref()?;
            Some(Education {
                institution: fields.get("institution").and_then(String::from_store_value),
                degree: fields.get("degree").and_then(String::from_store_value),
                field: fields.get("field").and_then(String::from_store_value),
                start_year: fields.get("start_year").and_then(i32::from_store_value),
                end_year: fields.get("end_year").and_then(i32::from_store_value),
            })
        })
        .collect()
}

fn values_to_experience(value: &Value) -> Vec<Experience> {
    let Value::ArrayValue(arr) = value else {
        return Vec::new();
    };
    arr.values
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| {
            let Value::MapValue(map) = v else { return None };
            let fields = map.fields.as_ref()?;
            Some(Experience {
                company: fields.get("company").and_then(String::from_store_value),
                position: fields.get("position").and_then(String::from_store_value),
                start_date: fields.get("start_date").and_then(FromStoreValue::from_store_value),
                end_date: fields.get("end_date").and_then(FromStoreValue::from_store_value),
                description: fields.get("description").and_then(String::from_store_value),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let mut user = User::new("Alice", "Alice@X.com", "$argon2id$hash", Role::Recruiter);
        user.skills = vec!["hiring".to_string()];
        user.education = vec![Education {
            institution: Some("MIT".to_string()),
            degree: Some("BSc".to_string()),
            field: Some("CS".to_string()),
            start_year: Some(2015),
            end_year: Some(2019),
        }];
        user
    }

    #[test]
    fn user_fields_round_trip() {
        let user = sample_user();
        let fields = user_to_fields(&user);

        let doc = Document {
            name: Some(format!("projects/p/databases/d/documents/users/{}", user.id)),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };

        let back = document_to_user(&doc).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.email, user.email);
        assert_eq!(back.role, Role::Recruiter);
        assert_eq!(back.password_hash, user.password_hash);
        assert_eq!(back.skills, user.skills);
        assert_eq!(back.education.len(), 1);
        assert_eq!(back.education[0].institution.as_deref(), Some("MIT"));
    }

    #[test]
    fn unknown_role_is_invalid_document() {
        let user = sample_user();
        let mut fields = user_to_fields(&user);
        fields.insert("role".to_string(), "superuser".to_store_value());

        let doc = Document {
            name: Some("projects/p/databases/d/documents/users/u1".to_string()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };

        assert!(matches!(
            document_to_user(&doc),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
