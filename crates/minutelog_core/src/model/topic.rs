//! Topic / info item / detail domain records.
//!
//! # Responsibility
//! - Define the three nested record kinds handled by the timestamp backfill.
//! - Provide the minimal shape validation that normal write paths enforce.
//!
//! # Invariants
//! - Record ids are opaque strings minted by the system the data was
//!   imported from; they are stable across revisions.
//! - `created_at`/`updated_at` are optional: absent before the backfill ran
//!   and after the reversal pass removed them.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Topic record. Exists embedded inside minutes and as a flat,
/// id-addressable row (the authoritative copy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub subject: String,
    /// Unix epoch milliseconds. Assigned by the timestamp backfill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Unix epoch milliseconds. Assigned by the timestamp backfill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub info_items: Vec<InfoItem>,
}

/// Info item record. Exists only nested inside topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoItem {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub details: Vec<Detail>,
}

/// Detail record. Leaf, nested inside info items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Shape violations rejected by validated write paths.
///
/// Historic imported data legitimately contains empty strings, which is why
/// the migration uses the raw write path instead of this validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValidationError {
    EmptyRecordId { kind: &'static str },
    EmptySubject { topic_id: String },
    EmptyItemText { item_id: String },
    EmptyDetailText { detail_id: String },
}

impl Display for TopicValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRecordId { kind } => write!(f, "{kind} record has an empty id"),
            Self::EmptySubject { topic_id } => {
                write!(f, "topic `{topic_id}` has an empty subject")
            }
            Self::EmptyItemText { item_id } => {
                write!(f, "info item `{item_id}` has an empty text")
            }
            Self::EmptyDetailText { detail_id } => {
                write!(f, "detail `{detail_id}` has an empty text")
            }
        }
    }
}

impl Error for TopicValidationError {}

impl Topic {
    /// Creates a topic with no info items and no timestamps.
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            created_at: None,
            updated_at: None,
            info_items: Vec::new(),
        }
    }

    /// Checks this topic and every nested record against the normal-path
    /// shape rules.
    pub fn validate(&self) -> Result<(), TopicValidationError> {
        if self.id.is_empty() {
            return Err(TopicValidationError::EmptyRecordId { kind: "topic" });
        }
        if self.subject.is_empty() {
            return Err(TopicValidationError::EmptySubject {
                topic_id: self.id.clone(),
            });
        }
        for item in &self.info_items {
            item.validate()?;
        }
        Ok(())
    }
}

impl InfoItem {
    /// Creates an info item with no details and no timestamps.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            created_at: None,
            updated_at: None,
            details: Vec::new(),
        }
    }

    fn validate(&self) -> Result<(), TopicValidationError> {
        if self.id.is_empty() {
            return Err(TopicValidationError::EmptyRecordId { kind: "info item" });
        }
        if self.text.is_empty() {
            return Err(TopicValidationError::EmptyItemText {
                item_id: self.id.clone(),
            });
        }
        for detail in &self.details {
            detail.validate()?;
        }
        Ok(())
    }
}

impl Detail {
    /// Creates a detail with no timestamps.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            created_at: None,
            updated_at: None,
        }
    }

    fn validate(&self) -> Result<(), TopicValidationError> {
        if self.id.is_empty() {
            return Err(TopicValidationError::EmptyRecordId { kind: "detail" });
        }
        if self.text.is_empty() {
            return Err(TopicValidationError::EmptyDetailText {
                detail_id: self.id.clone(),
            });
        }
        Ok(())
    }
}
