//! Firestore REST API wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Firestore document value types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ReferenceValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    /// Create time
    pub create_time: Option<String>,
    /// Update time
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Document id: the last path segment of the resource name.
    pub fn doc_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    /// Look up a field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|f| f.get(name))
    }
}

/// List documents response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    pub documents: Option<Vec<Document>>,
    pub next_page_token: Option<String>,
}

// ============================================================================
// Structured Query Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<Cursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_filter: Option<CompositeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
}

impl Filter {
    /// Equality filter on a single field.
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self {
            composite_filter: None,
            field_filter: Some(FieldFilter {
                field: FieldReference { field_path: field.into() },
                op: "EQUAL".to_string(),
                value,
            }),
        }
    }

    /// AND-composite of multiple filters. A single filter passes through.
    pub fn and(mut filters: Vec<Filter>) -> Option<Self> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Self {
                composite_filter: Some(CompositeFilter {
                    op: "AND".to_string(),
                    filters,
                }),
                field_filter: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFilter {
    pub op: String,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<bool>,
}

// ============================================================================
// Commit Types (atomic multi-document writes)
// ============================================================================

/// A single write operation in an atomic commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    /// Update or insert a document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Document>,

    /// Delete a document by full resource name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    /// Field mask for partial updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,

    /// Precondition for the write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_document: Option<Precondition>,
}

impl Write {
    /// Insert a document, failing the whole commit if it already exists.
    pub fn create(name: String, fields: HashMap<String, Value>) -> Self {
        Self {
            update: Some(Document {
                name: Some(name),
                fields: Some(fields),
                create_time: None,
                update_time: None,
            }),
            delete: None,
            update_mask: None,
            current_document: Some(Precondition {
                exists: Some(false),
                update_time: None,
            }),
        }
    }

    /// Merge the given fields into an existing document.
    pub fn update(name: String, fields: HashMap<String, Value>) -> Self {
        let mask: Vec<String> = fields.keys().cloned().collect();
        Self {
            update: Some(Document {
                name: Some(name),
                fields: Some(fields),
                create_time: None,
                update_time: None,
            }),
            delete: None,
            update_mask: Some(DocumentMask { field_paths: mask }),
            current_document: Some(Precondition {
                exists: Some(true),
                update_time: None,
            }),
        }
    }

    /// Delete a document (no-op if absent).
    pub fn delete(name: String) -> Self {
        Self {
            update: None,
            delete: Some(name),
            update_mask: None,
            current_document: None,
        }
    }
}

/// Document field mask for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

/// Precondition for a write operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precondition {
    /// Document must (not) exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,

    /// Document must have this update time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    pub writes: Vec<Write>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    #[serde(default)]
    pub write_results: Option<Vec<WriteResult>>,
    #[serde(default)]
    pub commit_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    #[serde(default)]
    pub update_time: Option<String>,
}

// ============================================================================
// Value conversions
// ============================================================================

/// Convert Rust types to store values.
pub trait ToStoreValue {
    fn to_store_value(&self) -> Value;
}

impl ToStoreValue for String {
    fn to_store_value(&self) -> Value {
        Value::StringValue(self.clone())
    }
}

impl ToStoreValue for &str {
    fn to_store_value(&self) -> Value {
        Value::StringValue((*self).to_string())
    }
}

impl ToStoreValue for i64 {
    fn to_store_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToStoreValue for u32 {
    fn to_store_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToStoreValue for i32 {
    fn to_store_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToStoreValue for f64 {
    fn to_store_value(&self) -> Value {
        Value::DoubleValue(*self)
    }
}

impl ToStoreValue for bool {
    fn to_store_value(&self) -> Value {
        Value::BooleanValue(*self)
    }
}

impl ToStoreValue for DateTime<Utc> {
    fn to_store_value(&self) -> Value {
        Value::TimestampValue(self.to_rfc3339())
    }
}

impl<T: ToStoreValue> ToStoreValue for Option<T> {
    fn to_store_value(&self) -> Value {
        match self {
            Some(v) => v.to_store_value(),
            None => Value::NullValue(()),
        }
    }
}

impl<T: ToStoreValue> ToStoreValue for Vec<T> {
    fn to_store_value(&self) -> Value {
        Value::ArrayValue(ArrayValue {
            values: Some(self.iter().map(|v| v.to_store_value()).collect()),
        })
    }
}

impl<T: ToStoreValue> ToStoreValue for HashMap<String, T> {
    fn to_store_value(&self) -> Value {
        Value::MapValue(MapValue {
            fields: Some(
                self.iter()
                    .map(|(k, v)| (k.clone(), v.to_store_value()))
                    .collect(),
            ),
        })
    }
}

/// Convert store values back to Rust types.
pub trait FromStoreValue: Sized {
    fn from_store_value(value: &Value) -> Option<Self>;
}

impl FromStoreValue for String {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromStoreValue for i64 {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl FromStoreValue for u32 {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as u32),
            _ => None,
        }
    }
}

impl FromStoreValue for i32 {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as i32),
            _ => None,
        }
    }
}

impl FromStoreValue for f64 {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::DoubleValue(f) => Some(*f),
            Value::IntegerValue(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromStoreValue for bool {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromStoreValue for DateTime<Utc> {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampValue(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.into()),
            _ => None,
        }
    }
}

impl<T: FromStoreValue> FromStoreValue for Vec<T> {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::ArrayValue(arr) => Some(
                arr.values
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(T::from_store_value)
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_values_are_strings_on_the_wire() {
        let v = 42i64.to_store_value();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"integerValue":"42"}"#);
    }

    #[test]
    fn timestamp_round_trip() {
        let now = Utc::now();
        let v = now.to_store_value();
        let back = DateTime::<Utc>::from_store_value(&v).unwrap();
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn string_vec_round_trip() {
        let skills = vec!["rust".to_string(), "sql".to_string()];
        let v = skills.to_store_value();
        let back: Vec<String> = Vec::from_store_value(&v).unwrap();
        assert_eq!(back, skills);
    }

    #[test]
    fn filter_and_collapses_single() {
        let f = Filter::and(vec![Filter::eq("role", Value::StringValue("admin".into()))]).unwrap();
        assert!(f.composite_filter.is_none());
        assert!(f.field_filter.is_some());

        let f = Filter::and(vec![
            Filter::eq("role", Value::StringValue("admin".into())),
            Filter::eq("is_active", Value::BooleanValue(true)),
        ])
        .unwrap();
        assert_eq!(f.composite_filter.unwrap().filters.len(), 2);
    }

    #[test]
    fn write_create_has_exists_false_precondition() {
        let w = Write::create("projects/p/databases/d/documents/users/u1".into(), HashMap::new());
        assert_eq!(w.current_document.unwrap().exists, Some(false));
    }

    #[test]
    fn doc_id_extracts_last_segment() {
        let doc = Document {
            name: Some("projects/p/databases/d/documents/jobs/job-1".into()),
            fields: None,
            create_time: None,
            update_time: None,
        };
        assert_eq!(doc.doc_id(), Some("job-1"));
    }
}
