//! Typed repository for notification documents.

use std::collections::HashMap;

use cc_models::{Notification, NotificationKind, RelatedKind};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    CollectionSelector, Document, FieldReference, Filter, FromStoreValue, Order, StructuredQuery,
    ToStoreValue, Value,
};

/// Collection holding notification documents.
pub const NOTIFICATIONS: &str = "notifications";

/// Repository for notification documents.
#[derive(Clone)]
pub struct NotificationRepository {
    client: StoreClient,
}

impl NotificationRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Get a notification by id.
    pub async fn get(&self, notification_id: &str) -> StoreResult<Option<Notification>> {
        match self
            .client
            .get_document(NOTIFICATIONS, notification_id)
            .await?
        {
            Some(doc) => Ok(Some(document_to_notification(&doc)?)),
            None => Ok(None),
        }
    }

    /// List notifications addressed to one recipient, newest first.
    pub async fn list_by_recipient(&self, recipient_id: &str) -> StoreResult<Vec<Notification>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: NOTIFICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "recipient_id",
                Value::StringValue(recipient_id.to_string()),
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
        docs.iter().map(document_to_notification).collect()
    }

    /// Flip the read flag.
    pub async fn mark_read(&self, notification_id: &str) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("read".to_string(), true.to_store_value());
        fields.insert("updated_at".to_string(), chrono::Utc::now().to_store_value());

        self.client
            .update_document(
                NOTIFICATIONS,
                notification_id,
                fields,
                Some(vec!["read".to_string(), "updated_at".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Delete a notification.
    pub async fn delete(&self, notification_id: &str) -> StoreResult<()> {
        self.client
            .delete_document(NOTIFICATIONS, notification_id)
            .await
    }
}

// =============================================================================
// Document conversion
// =============================================================================

pub(crate) fn notification_to_fields(n: &Notification) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("recipient_id".to_string(), n.recipient_id.to_store_value());
    fields.insert("title".to_string(), n.title.to_store_value());
    fields.insert("message".to_string(), n.message.to_store_value());
    fields.insert("kind".to_string(), n.kind.as_str().to_store_value());
    fields.insert("related_id".to_string(), n.related_id.to_store_value());
    fields.insert(
        "related_kind".to_string(),
        match n.related_kind {
            Some(kind) => kind.as_str().to_store_value(),
            None => Value::NullValue(()),
        },
    );
    fields.insert("read".to_string(), n.read.to_store_value());
    fields.insert("created_at".to_string(), n.created_at.to_store_value());
    fields.insert("updated_at".to_string(), n.updated_at.to_store_value());
    fields
}

pub(crate) fn document_to_notification(doc: &Document) -> StoreResult<Notification> {
    let id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("notification document has no name"))?
        .to_string();

    let get_string = |name: &str| -> Option<String> {
        doc.field(name).and_then(String::from_store_value)
    };

    let kind = get_string("kind")
        .as_deref()
        .unwrap_or("system")
        .parse::<NotificationKind>()
        .map_err(StoreError::invalid_document)?;

    let related_kind = match get_string("related_kind") {
        Some(s) => Some(
            s.parse::<RelatedKind>()
                .map_err(StoreError::invalid_document)?,
        ),
        None => None,
    };

    Ok(Notification {
        id,
        recipient_id: get_string("recipient_id").unwrap_or_default(),
        title: get_string("title").unwrap_or_default(),
        message: get_string("message").unwrap_or_default(),
        kind,
        related_id: get_string("related_id"),
        related_kind,
        read: doc
            .field("read")
            .and_then(bool::from_store_value)
            .unwrap_or(false),
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
    fn notification_fields_round_trip() {
        let n = Notification::new(
            "recruiter-1",
            "New Job Application",
            "Alice has applied for the position: Backend Engineer",
            NotificationKind::Application,
        )
        .related_to("job-1_user-2", RelatedKind::Application);

        let doc = Document {
            name: Some(format!(
                "projects/p/databases/d/documents/notifications/{}",
                n.id
            )),
            fields: Some(notification_to_fields(&n)),
            create_time: None,
            update_time: None,
        };

        let back = document_to_notification(&doc).unwrap();
        assert_eq!(back.recipient_id, "recruiter-1");
        assert_eq!(back.kind, NotificationKind::Application);
        assert_eq!(back.related_kind, Some(RelatedKind::Application));
        assert!(!back.read);
    }

    #[test]
    fn missing_related_fields_stay_none() {
        let n = Notification::new("u", "T", "M", NotificationKind::System);
        let doc = Document {
            name: Some("projects/p/databases/d/documents/notifications/n1".to_string()),
            fields: Some(notification_to_fields(&n)),
            create_time: None,
            update_time: None,
        };
        let back = document_to_notification(&doc).unwrap();
        assert!(back.related_id.is_none());
        assert!(back.related_kind.is_none());
    }
}
