use chrono::Utc;
use diesel::dsl::not;
use diesel::pg::Pg;
use diesel::prelude::*;
use log::{error, info, warn};
use uuid::Uuid;

use super::error::MessagesError;
use super::types::*;
use crate::core::shared::schema::{messages, users};
use crate::core::shared::utils::{DbConn, DbPool};

const DEFAULT_PER_PAGE: usize = 50;
const MAX_PER_PAGE: usize = 200;

pub struct MessagesService {
    pool: DbPool,
}

impl MessagesService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, MessagesError> {
        self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            MessagesError::Connection
        })
    }

    pub async fn list_messages(
        &self,
        user: Uuid,
        query: MessageListQuery,
    ) -> Result<MessageListResponse, MessagesError> {
        let mut conn = self.conn()?;
        let view = query.folder.unwrap_or_default();
        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let page = query.page.unwrap_or(1).max(1);
        let (limit, offset) = page_window(page, per_page);

        let total = count_rows(&mut conn, view_query(view, user))?;
        let rows: Vec<MessageRow> = view_query(view, user)
            .order(messages::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(MessageRow::as_select())
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to list {view:?} of {user}: {e}");
                MessagesError::from(e)
            })?;

        Ok(MessageListResponse {
            messages: rows.into_iter().map(Message::from).collect(),
            total,
            page,
            per_page,
        })
    }

    pub async fn counts(&self, user: Uuid) -> Result<MessageCounts, MessagesError> {
        let mut conn = self.conn()?;
        let unread_inbox = view_query(View::Inbox, user).filter(messages::is_read.eq(false));
        Ok(MessageCounts {
            inbox: count_rows(&mut conn, unread_inbox)?,
            sent: count_rows(&mut conn, view_query(View::Sent, user))?,
            drafts: count_rows(&mut conn, view_query(View::Drafts, user))?,
            archive: count_rows(&mut conn, view_query(View::Archive, user))?,
            trash: count_rows(&mut conn, view_query(View::Trash, user))?,
            spam: count_rows(&mut conn, view_query(View::Spam, user))?,
            starred: count_rows(&mut conn, view_query(View::Starred, user))?,
        })
    }

    pub async fn compose(
        &self,
        user: Uuid,
        request: ComposeMessageRequest,
    ) -> Result<Message, MessagesError> {
        let mut conn = self.conn()?;
        let recipient_id = resolve_recipient(
            &mut conn,
            request.recipient_id,
            request.recipient_email.as_deref(),
        )?;

        if !request.draft && recipient_id.is_none() {
            return Err(MessagesError::Validation("a recipient is required".to_string()));
        }

        let now = Utc::now();
        let row = MessageRow {
            id: Uuid::new_v4(),
            sender_id: user,
            recipient_id,
            subject: request.subject,
            content: request.content,
            folder: (if request.draft { Folder::Drafts } else { Folder::Inbox }).to_string(),
            is_read: false,
            is_starred: false,
            is_archived: false,
            is_spam: false,
            deleted_by_users: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(messages::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to store message from {user}: {e}");
                MessagesError::from(e)
            })?;

        if request.draft {
            info!("Saved draft {} for {user}", row.id);
        } else {
            info!("Message {} sent from {user}", row.id);
        }
        Ok(row.into())
    }

    /// Opening a received message marks it read.
    pub async fn get_message(&self, user: Uuid, id: Uuid) -> Result<Message, MessagesError> {
        let mut conn = self.conn()?;
        let mut message = load_for_user(&mut conn, id, user)?;

        if message.is_recipient(user) && !message.is_read {
            message.is_read = true;
            save(&mut conn, &mut message)?;
        }
        Ok(message)
    }

    pub async fn update_message(
        &self,
        user: Uuid,
        id: Uuid,
        request: UpdateMessageRequest,
    ) -> Result<Message, MessagesError> {
        let mut conn = self.conn()?;
        let mut message = load_for_user(&mut conn, id, user)?;
        let recipient_id = resolve_recipient(
            &mut conn,
            request.recipient_id,
            request.recipient_email.as_deref(),
        )?;

        apply_update(&mut message, &request, recipient_id, user)?;
        save(&mut conn, &mut message)?;
        Ok(message)
    }

    pub async fn delete_message(&self, user: Uuid, id: Uuid) -> Result<DeleteAction, MessagesError> {
        let mut conn = self.conn()?;
        let mut message = load_for_user(&mut conn, id, user)?;
        let action = delete_action(&message, user);
        apply_delete(&mut conn, &mut message, &action)?;
        Ok(action)
    }

    /// Best effort: each id is handled on its own and failures are counted.
    pub async fn bulk(
        &self,
        user: Uuid,
        request: BulkMessagesRequest,
    ) -> Result<BulkMessagesResponse, MessagesError> {
        let mut conn = self.conn()?;
        let mut response = BulkMessagesResponse::default();

        for id in request.ids {
            match bulk_one(&mut conn, id, user, request.action) {
                Ok(()) => response.processed += 1,
                Err(e) => {
                    warn!("Bulk {:?} failed for message {id}: {e}", request.action);
                    response.failed += 1;
                }
            }
        }
        Ok(response)
    }

    pub async fn users_emails(&self, ids: &[Uuid]) -> Result<UsersEmailsResponse, MessagesError> {
        if ids.is_empty() {
            return Ok(UsersEmailsResponse::new());
        }
        let mut conn = self.conn()?;
        let rows: Vec<(Uuid, String)> = users::table
            .filter(users::id.eq_any(ids))
            .select((users::id, users::email))
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to look up user emails: {e}");
                MessagesError::from(e)
            })?;
        Ok(rows.into_iter().collect())
    }
}

pub type MessageQuery = messages::BoxedQuery<'static, Pg>;

fn folder_names(folders: &[Folder]) -> Vec<String> {
    folders.iter().map(ToString::to_string).collect()
}

/// Messages `user` sees in `view`: a participant who has not deleted them.
pub fn view_query(view: View, user: Uuid) -> MessageQuery {
    let mailbox = messages::table
        .filter(
            messages::sender_id
                .eq(user)
                .or(messages::recipient_id.eq(user)),
        )
        .filter(not(messages::deleted_by_users.contains(vec![user])))
        .into_boxed();
    let trash = Folder::Trash.to_string();

    match view {
        View::Inbox => mailbox
            .filter(messages::recipient_id.eq(user))
            .filter(not(messages::folder.eq_any(folder_names(&[
                Folder::Drafts,
                Folder::Trash,
                Folder::Spam,
            ]))))
            .filter(messages::is_archived.eq(false))
            .filter(messages::is_spam.eq(false)),
        View::Sent => mailbox
            .filter(messages::sender_id.eq(user))
            .filter(not(messages::folder.eq_any(folder_names(&[Folder::Drafts, Folder::Trash])))),
        View::Drafts => mailbox
            .filter(messages::sender_id.eq(user))
            .filter(messages::folder.eq(Folder::Drafts.to_string())),
        View::Archive => mailbox
            .filter(messages::is_archived.eq(true))
            .filter(messages::folder.ne(trash)),
        View::Trash => mailbox.filter(messages::folder.eq(trash)),
        View::Spam => mailbox
            .filter(messages::recipient_id.eq(user))
            .filter(
                messages::is_spam
                    .eq(true)
                    .or(messages::folder.eq(Folder::Spam.to_string())),
            )
            .filter(messages::folder.ne(trash)),
        View::Starred => mailbox
            .filter(messages::is_starred.eq(true))
            .filter(messages::folder.ne(trash)),
    }
}

/// LIMIT and OFFSET of a 1-based page.
pub fn page_window(page: usize, per_page: usize) -> (i64, i64) {
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    (
        i64::try_from(per_page).unwrap_or(i64::MAX),
        i64::try_from(offset).unwrap_or(i64::MAX),
    )
}

fn count_rows(conn: &mut PgConnection, query: MessageQuery) -> Result<usize, MessagesError> {
    let count: i64 = query.count().get_result(conn).map_err(|e| {
        error!("Failed to count messages: {e}");
        MessagesError::from(e)
    })?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn bulk_one(
    conn: &mut PgConnection,
    id: Uuid,
    user: Uuid,
    action: BulkAction,
) -> Result<(), MessagesError> {
    let mut message = load_for_user(conn, id, user)?;
    match action {
        BulkAction::Delete => {
            let delete = delete_action(&message, user);
            apply_delete(conn, &mut message, &delete)
        }
        BulkAction::Restore => {
            if message.folder != Folder::Trash {
                return Err(MessagesError::Validation("message is not in trash".to_string()));
            }
            message.folder = message.restore_folder();
            save(conn, &mut message)
        }
        other => {
            let update = other.as_update().unwrap_or_default();
            apply_update(&mut message, &update, None, user)?;
            save(conn, &mut message)
        }
    }
}

/// Applies flag, folder and draft changes in memory.
pub fn apply_update(
    message: &mut Message,
    request: &UpdateMessageRequest,
    recipient_id: Option<Uuid>,
    user: Uuid,
) -> Result<(), MessagesError> {
    if request.edits_draft() {
        if message.sender_id != user || message.folder != Folder::Drafts {
            return Err(MessagesError::Forbidden(
                "only the author can edit a draft".to_string(),
            ));
        }
        if let Some(subject) = &request.subject {
            message.subject = subject.clone();
        }
        if let Some(content) = &request.content {
            message.content = content.clone();
        }
        if recipient_id.is_some() {
            message.recipient_id = recipient_id;
        }
        if request.send {
            if message.recipient_id.is_none() {
                return Err(MessagesError::Validation("a recipient is required".to_string()));
            }
            message.folder = Folder::Inbox;
            message.is_read = false;
            message.created_at = Utc::now();
        }
    }

    if let Some(folder) = request.folder {
        if folder == Folder::Drafts && message.folder != Folder::Drafts {
            return Err(MessagesError::Validation(
                "a sent message cannot become a draft".to_string(),
            ));
        }
        if message.folder == Folder::Drafts && folder != Folder::Drafts && folder != Folder::Trash {
            return Err(MessagesError::Validation(
                "send the draft instead of moving it".to_string(),
            ));
        }
        message.folder = folder;
    }

    if let Some(is_read) = request.is_read {
        message.is_read = is_read;
    }
    if let Some(is_starred) = request.is_starred {
        message.is_starred = is_starred;
    }
    if let Some(is_archived) = request.is_archived {
        message.is_archived = is_archived;
    }
    if let Some(is_spam) = request.is_spam {
        message.is_spam = is_spam;
        if !is_spam && message.folder == Folder::Spam {
            message.folder = Folder::Inbox;
        }
    }
    Ok(())
}

fn apply_delete(
    conn: &mut PgConnection,
    message: &mut Message,
    action: &DeleteAction,
) -> Result<(), MessagesError> {
    match action {
        DeleteAction::MoveToTrash => {
            message.folder = Folder::Trash;
            save(conn, message)
        }
        DeleteAction::HideFor(hidden) => {
            message.deleted_by_users = hidden.clone();
            save(conn, message)
        }
        DeleteAction::Remove => {
            diesel::delete(messages::table.filter(messages::id.eq(message.id))).execute(conn)?;
            info!("Message {} removed after every participant deleted it", message.id);
            Ok(())
        }
    }
}

fn load_for_user(conn: &mut PgConnection, id: Uuid, user: Uuid) -> Result<Message, MessagesError> {
    let message: Message = messages::table
        .filter(messages::id.eq(id))
        .select(MessageRow::as_select())
        .first(conn)
        .optional()?
        .map(Message::from)
        .ok_or_else(|| MessagesError::NotFound(id.to_string()))?;

    if !message.is_participant(user) || message.deleted_by(user) {
        return Err(MessagesError::NotFound(id.to_string()));
    }
    Ok(message)
}

fn save(conn: &mut PgConnection, message: &mut Message) -> Result<(), MessagesError> {
    message.updated_at = Utc::now();
    diesel::update(messages::table.filter(messages::id.eq(message.id)))
        .set((
            messages::recipient_id.eq(message.recipient_id),
            messages::subject.eq(&message.subject),
            messages::content.eq(&message.content),
            messages::folder.eq(message.folder.to_string()),
            messages::is_read.eq(message.is_read),
            messages::is_starred.eq(message.is_starred),
            messages::is_archived.eq(message.is_archived),
            messages::is_spam.eq(message.is_spam),
            messages::deleted_by_users.eq(&message.deleted_by_users),
            messages::created_at.eq(message.created_at),
            messages::updated_at.eq(message.updated_at),
        ))
        .execute(conn)
        .map_err(|e| {
            error!("Failed to save message {}: {e}", message.id);
            MessagesError::from(e)
        })?;
    Ok(())
}

fn resolve_recipient(
    conn: &mut PgConnection,
    recipient_id: Option<Uuid>,
    recipient_email: Option<&str>,
) -> Result<Option<Uuid>, MessagesError> {
    if let Some(id) = recipient_id {
        let exists: bool =
            diesel::select(diesel::dsl::exists(users::table.filter(users::id.eq(id))))
                .get_result(conn)?;
        if !exists {
            return Err(MessagesError::Validation(format!("unknown recipient {id}")));
        }
        return Ok(Some(id));
    }

    match recipient_email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) => users::table
            .filter(users::email.ilike(email))
            .select(users::id)
            .first::<Uuid>(conn)
            .optional()?
            .map(Some)
            .ok_or_else(|| MessagesError::Validation(format!("unknown recipient {email}"))),
        None => Ok(None),
    }
}
