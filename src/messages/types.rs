use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::error::MessagesError;
use crate::core::shared::schema::messages;

/// Stored folder of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Folder {
    #[default]
    Inbox,
    Sent,
    Drafts,
    Archive,
    Trash,
    Spam,
}

impl std::fmt::Display for Folder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbox => write!(f, "inbox"),
            Self::Sent => write!(f, "sent"),
            Self::Drafts => write!(f, "drafts"),
            Self::Archive => write!(f, "archive"),
            Self::Trash => write!(f, "trash"),
            Self::Spam => write!(f, "spam"),
        }
    }
}

impl std::str::FromStr for Folder {
    type Err = MessagesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Self::Inbox),
            "sent" => Ok(Self::Sent),
            "drafts" => Ok(Self::Drafts),
            "archive" => Ok(Self::Archive),
            "trash" => Ok(Self::Trash),
            "spam" => Ok(Self::Spam),
            other => Err(MessagesError::Validation(format!("unknown folder: {other}"))),
        }
    }
}

/// What the mailbox sidebar lists: every folder plus the virtual `starred`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Inbox,
    Sent,
    Drafts,
    Archive,
    Trash,
    Spam,
    Starred,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub subject: String,
    pub content: String,
    pub folder: String,
    pub is_read: bool,
    pub is_starred: bool,
    pub is_archived: bool,
    pub is_spam: bool,
    pub deleted_by_users: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub subject: String,
    pub content: String,
    pub folder: Folder,
    pub is_read: bool,
    pub is_starred: bool,
    pub is_archived: bool,
    pub is_spam: bool,
    pub deleted_by_users: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            subject: row.subject,
            content: row.content,
            folder: row.folder.parse().unwrap_or_default(),
            is_read: row.is_read,
            is_starred: row.is_starred,
            is_archived: row.is_archived,
            is_spam: row.is_spam,
            deleted_by_users: row.deleted_by_users,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Message {
    pub fn is_participant(&self, user: Uuid) -> bool {
        self.sender_id == user || self.recipient_id == Some(user)
    }

    pub fn is_recipient(&self, user: Uuid) -> bool {
        self.recipient_id == Some(user)
    }

    pub fn deleted_by(&self, user: Uuid) -> bool {
        self.deleted_by_users.contains(&user)
    }

    pub fn participants(&self) -> Vec<Uuid> {
        let mut users = vec![self.sender_id];
        if let Some(recipient) = self.recipient_id.filter(|r| *r != self.sender_id) {
            users.push(recipient);
        }
        users
    }

    /// Folder a trashed message returns to.
    pub fn restore_folder(&self) -> Folder {
        if self.recipient_id.is_none() {
            Folder::Drafts
        } else {
            Folder::Inbox
        }
    }
}

/// Outcome of a delete request by one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAction {
    MoveToTrash,
    HideFor(Vec<Uuid>),
    Remove,
}

/// First delete moves to trash; from trash the user is added to
/// `deleted_by_users`, and the row goes once every participant has deleted it.
pub fn delete_action(message: &Message, user: Uuid) -> DeleteAction {
    if message.folder != Folder::Trash {
        return DeleteAction::MoveToTrash;
    }
    let mut deleted = message.deleted_by_users.clone();
    if !deleted.contains(&user) {
        deleted.push(user);
    }
    if message.participants().iter().all(|p| deleted.contains(p)) {
        DeleteAction::Remove
    } else {
        DeleteAction::HideFor(deleted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCounts {
    /// Unread only.
    pub inbox: usize,
    pub sent: usize,
    pub drafts: usize,
    pub archive: usize,
    pub trash: usize,
    pub spam: usize,
    pub starred: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageListQuery {
    pub folder: Option<View>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeMessageRequest {
    pub recipient_id: Option<Uuid>,
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMessageRequest {
    pub is_read: Option<bool>,
    pub is_starred: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_spam: Option<bool>,
    pub folder: Option<Folder>,
    pub recipient_id: Option<Uuid>,
    pub recipient_email: Option<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    /// Sends a draft.
    #[serde(default)]
    pub send: bool,
}

impl UpdateMessageRequest {
    pub fn edits_draft(&self) -> bool {
        self.subject.is_some()
            || self.content.is_some()
            || self.recipient_id.is_some()
            || self.recipient_email.is_some()
            || self.send
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    MarkRead,
    MarkUnread,
    Star,
    Unstar,
    Archive,
    Unarchive,
    Spam,
    NotSpam,
    Restore,
    Delete,
}

impl BulkAction {
    /// Flag/folder changes equivalent to the action. `Delete` and `Restore`
    /// depend on the message and are handled separately.
    pub fn as_update(self) -> Option<UpdateMessageRequest> {
        let mut update = UpdateMessageRequest::default();
        match self {
            Self::MarkRead => update.is_read = Some(true),
            Self::MarkUnread => update.is_read = Some(false),
            Self::Star => update.is_starred = Some(true),
            Self::Unstar => update.is_starred = Some(false),
            Self::Archive => update.is_archived = Some(true),
            Self::Unarchive => update.is_archived = Some(false),
            Self::Spam => update.is_spam = Some(true),
            Self::NotSpam => update.is_spam = Some(false),
            Self::Restore | Self::Delete => return None,
        }
        Some(update)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkMessagesRequest {
    pub ids: Vec<Uuid>,
    pub action: BulkAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkMessagesResponse {
    pub processed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersEmailsRequest {
    pub user_ids: Vec<Uuid>,
}

pub type UsersEmailsResponse = HashMap<Uuid, String>;
