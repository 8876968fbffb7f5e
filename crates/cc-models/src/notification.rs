//! Notification model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Application,
    Job,
    #[default]
    System,
    Message,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Application => "application",
            NotificationKind::Job => "job",
            NotificationKind::System => "system",
            NotificationKind::Message => "message",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" => Ok(NotificationKind::Application),
            "job" => Ok(NotificationKind::Job),
            "system" => Ok(NotificationKind::System),
            "message" => Ok(NotificationKind::Message),
            other => Err(format!("unknown notification kind: {}", other)),
        }
    }
}

/// Entity kind a notification relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelatedKind {
    Job,
    Application,
    User,
}

impl RelatedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelatedKind::Job => "Job",
            RelatedKind::Application => "Application",
            RelatedKind::User => "User",
        }
    }
}

impl std::str::FromStr for RelatedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Job" => Ok(RelatedKind::Job),
            "Application" => Ok(RelatedKind::Application),
            "User" => Ok(RelatedKind::User),
            other => Err(format!("unknown related kind: {}", other)),
        }
    }
}

/// A one-way system-generated message addressed to a single recipient.
/// Only the `read` flag is mutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub related_id: Option<String>,
    #[serde(default)]
    pub related_kind: Option<RelatedKind>,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread notification.
    pub fn new(
        recipient_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            recipient_id: recipient_id.into(),
            title: title.into(),
            message: message.into(),
            kind,
            related_id: None,
            related_kind: None,
            read: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the related entity reference.
    pub fn related_to(mut self, id: impl Into<String>, kind: RelatedKind) -> Self {
        self.related_id = Some(id.into());
        self.related_kind = Some(kind);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_is_unread() {
        let n = Notification::new("user-1", "Hi", "Body", NotificationKind::Application);
        assert!(!n.read);
        assert!(n.related_id.is_none());
    }

    #[test]
    fn related_to_builder() {
        let n = Notification::new("user-1", "Hi", "Body", NotificationKind::Application)
            .related_to("app-1", RelatedKind::Application);
        assert_eq!(n.related_id.as_deref(), Some("app-1"));
        assert_eq!(n.related_kind, Some(RelatedKind::Application));
    }

    #[test]
    fn related_kind_wire_format() {
        let json = serde_json::to_string(&RelatedKind::Application).unwrap();
        assert_eq!(json, "\"Application\"");
    }
}
