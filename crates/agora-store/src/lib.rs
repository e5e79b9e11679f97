//! Agora Storage Layer
//!
//! Implements the domain store traits on SQLite.
//!
//! # Architecture
//!
//! - One keyed row per (item, voter) in the `votes` table; the primary key
//!   keeps the upvoter and downvoter sets structurally disjoint
//! - Counters (reputation, answer_count, contribution counts) are mutated
//!   with `UPDATE ... SET x = x + ?` statements, never read-modify-write,
//!   so concurrent mutations of the same row cannot lose updates
//! - Question deletion cascades to answers and their votes in one transaction
//!
//! # Examples
//!
//! ```no_run
//! use agora_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for account/content/notification operations
//! ```

#![warn(missing_docs)]

use agora_domain::traits::{AccountStore, ContentStore, NotificationStore};
use agora_domain::{
    Account, AccountCounter, AccountId, Answer, Authorship, ContentId, ItemKind, Notification,
    NotificationId, NotificationKind, Question, VoteDirection, VoteSets,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of the Agora store traits
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a `SqliteStore` across
/// request handlers behind a mutex, or give each worker its own instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert a 128-bit id to bytes for storage
    fn id_bytes(value: u128) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    /// Convert stored bytes back to a 128-bit id
    fn id_value(bytes: &[u8]) -> Result<u128, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for id, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(u128::from_be_bytes(arr))
    }

    fn column_id(bytes: &[u8], idx: usize) -> Result<u128, rusqlite::Error> {
        Self::id_value(bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Blob, Box::new(e))
        })
    }

    /// Encode authorship into its (kind, ref) column pair
    fn authorship_to_columns(author: &Authorship) -> (&'static str, Option<String>) {
        match author {
            Authorship::Account(id) => ("account", Some(id.to_string())),
            Authorship::Anonymous(token) => ("anonymous", Some(token.clone())),
            Authorship::Withheld => ("withheld", None),
        }
    }

    /// Decode an authorship column pair
    fn columns_to_authorship(
        kind: &str,
        reference: Option<String>,
    ) -> Result<Authorship, StoreError> {
        match (kind, reference) {
            ("account", Some(s)) => AccountId::from_string(&s)
                .map(Authorship::Account)
                .map_err(StoreError::InvalidData),
            ("anonymous", Some(token)) => Ok(Authorship::Anonymous(token)),
            ("withheld", _) => Ok(Authorship::Withheld),
            (other, _) => Err(StoreError::InvalidData(format!(
                "Unknown authorship kind: {}",
                other
            ))),
        }
    }

    fn item_kind_to_str(kind: ItemKind) -> &'static str {
        match kind {
            ItemKind::Question => "question",
            ItemKind::Answer => "answer",
        }
    }

    fn direction_to_str(direction: VoteDirection) -> &'static str {
        match direction {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }

    fn notification_kind_to_str(kind: NotificationKind) -> &'static str {
        match kind {
            NotificationKind::Accept => "accept",
            NotificationKind::Answer => "answer",
            NotificationKind::Follow => "follow",
        }
    }

    fn str_to_notification_kind(s: &str) -> Result<NotificationKind, StoreError> {
        match s {
            "accept" => Ok(NotificationKind::Accept),
            "answer" => Ok(NotificationKind::Answer),
            "follow" => Ok(NotificationKind::Follow),
            _ => Err(StoreError::InvalidData(format!(
                "Unknown notification kind: {}",
                s
            ))),
        }
    }

    fn row_to_question(row: &rusqlite::Row<'_>) -> Result<Question, rusqlite::Error> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let author_kind: String = row.get(4)?;
        let author_ref: Option<String> = row.get(5)?;
        let real_author_bytes: Vec<u8> = row.get(6)?;
        let tags_json: String = row.get(3)?;

        let author = Self::columns_to_authorship(&author_kind, author_ref).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Question {
            id: ContentId::from_value(Self::column_id(&id_bytes, 0)?),
            title: row.get(1)?,
            body: row.get(2)?,
            tags,
            author,
            real_author: AccountId::from_value(Self::column_id(&real_author_bytes, 6)?),
            is_accepted: row.get(7)?,
            answer_count: row.get(8)?,
            view_count: row.get(9)?,
            created_at: row.get::<_, i64>(10)? as u64,
        })
    }

    fn row_to_answer(row: &rusqlite::Row<'_>) -> Result<Answer, rusqlite::Error> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let question_bytes: Vec<u8> = row.get(1)?;
        let author_kind: String = row.get(3)?;
        let author_ref: Option<String> = row.get(4)?;
        let real_author_bytes: Vec<u8> = row.get(5)?;

        let author = Self::columns_to_authorship(&author_kind, author_ref).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Answer {
            id: ContentId::from_value(Self::column_id(&id_bytes, 0)?),
            question_id: ContentId::from_value(Self::column_id(&question_bytes, 1)?),
            body: row.get(2)?,
            author,
            real_author: AccountId::from_value(Self::column_id(&real_author_bytes, 5)?),
            is_accepted: row.get(6)?,
            created_at: row.get::<_, i64>(7)? as u64,
        })
    }
}

const QUESTION_COLUMNS: &str = "id, title, body, tags, author_kind, author_ref, real_author, \
                                is_accepted, answer_count, view_count, created_at";
const ANSWER_COLUMNS: &str =
    "id, question_id, body, author_kind, author_ref, real_author, is_accepted, created_at";

impl AccountStore for SqliteStore {
    type Error = StoreError;

    fn insert_account(&mut self, account: &Account) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO accounts (id, handle, contact, reputation, questions_asked, answers_given,
                                   accepted_answers, suspended_from, suspended_until,
                                   suspension_reason, banned, moderator)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                &Self::id_bytes(account.id.value()),
                &account.handle,
                &account.contact,
                account.reputation,
                account.questions_asked,
                account.answers_given,
                account.accepted_answers,
                account.suspended_from.map(|t| t as i64),
                account.suspended_until.map(|t| t as i64),
                &account.suspension_reason,
                account.banned,
                account.moderator,
            ],
        )?;
        Ok(())
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>, Self::Error> {
        let account = self
            .conn
            .query_row(
                "SELECT id, handle, contact, reputation, questions_asked, answers_given,
                        accepted_answers, suspended_from, suspended_until, suspension_reason,
                        banned, moderator
                 FROM accounts WHERE id = ?1",
                params![&Self::id_bytes(id.value())],
                |row| {
                    let id_bytes: Vec<u8> = row.get(0)?;
                    let suspended_from: Option<i64> = row.get(7)?;
                    let suspended_until: Option<i64> = row.get(8)?;

                    Ok(Account {
                        id: AccountId::from_value(Self::column_id(&id_bytes, 0)?),
                        handle: row.get(1)?,
                        contact: row.get(2)?,
                        reputation: row.get(3)?,
                        questions_asked: row.get(4)?,
                        answers_given: row.get(5)?,
                        accepted_answers: row.get(6)?,
                        suspended_from: suspended_from.map(|t| t as u64),
                        suspended_until: suspended_until.map(|t| t as u64),
                        suspension_reason: row.get(9)?,
                        banned: row.get(10)?,
                        moderator: row.get(11)?,
                    })
                },
            )
            .optional()?;

        Ok(account)
    }

    fn adjust_reputation(&mut self, id: AccountId, delta: i64) -> Result<(), Self::Error> {
        let changed = self.conn.execute(
            "UPDATE accounts SET reputation = reputation + ?1 WHERE id = ?2",
            params![delta, &Self::id_bytes(id.value())],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("account {}", id)));
        }
        Ok(())
    }

    fn adjust_counter(
        &mut self,
        id: AccountId,
        counter: AccountCounter,
        delta: i64,
    ) -> Result<(), Self::Error> {
        let sql = match counter {
            AccountCounter::QuestionsAsked => {
                "UPDATE accounts SET questions_asked = questions_asked + ?1 WHERE id = ?2"
            }
            AccountCounter::AnswersGiven => {
                "UPDATE accounts SET answers_given = answers_given + ?1 WHERE id = ?2"
            }
            AccountCounter::AcceptedAnswers => {
                "UPDATE accounts SET accepted_answers = accepted_answers + ?1 WHERE id = ?2"
            }
        };
        let changed = self
            .conn
            .execute(sql, params![delta, &Self::id_bytes(id.value())])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("account {}", id)));
        }
        Ok(())
    }
}

impl ContentStore for SqliteStore {
    type Error = StoreError;

    fn insert_question(&mut self, question: &Question) -> Result<(), Self::Error> {
        let (author_kind, author_ref) = Self::authorship_to_columns(&question.author);
        let tags = serde_json::to_string(&question.tags)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO questions (id, title, body, tags, author_kind, author_ref, real_author,
                                    is_accepted, answer_count, view_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &Self::id_bytes(question.id.value()),
                &question.title,
                &question.body,
                &tags,
                author_kind,
                &author_ref,
                &Self::id_bytes(question.real_author.value()),
                question.is_accepted,
                question.answer_count,
                question.view_count,
                question.created_at as i64,
            ],
        )?;
        Ok(())
    }

    fn get_question(&self, id: ContentId) -> Result<Option<Question>, Self::Error> {
        let question = self
            .conn
            .query_row(
                &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS),
                params![&Self::id_bytes(id.value())],
                Self::row_to_question,
            )
            .optional()?;
        Ok(question)
    }

    fn insert_answer(&mut self, answer: &Answer) -> Result<(), Self::Error> {
        let (author_kind, author_ref) = Self::authorship_to_columns(&answer.author);

        self.conn.execute(
            "INSERT INTO answers (id, question_id, body, author_kind, author_ref, real_author,
                                  is_accepted, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &Self::id_bytes(answer.id.value()),
                &Self::id_bytes(answer.question_id.value()),
                &answer.body,
                author_kind,
                &author_ref,
                &Self::id_bytes(answer.real_author.value()),
                answer.is_accepted,
                answer.created_at as i64,
            ],
        )?;
        Ok(())
    }

    fn get_answer(&self, id: ContentId) -> Result<Option<Answer>, Self::Error> {
        let answer = self
            .conn
            .query_row(
                &format!("SELECT {} FROM answers WHERE id = ?1", ANSWER_COLUMNS),
                params![&Self::id_bytes(id.value())],
                Self::row_to_answer,
            )
            .optional()?;
        Ok(answer)
    }

    fn answers_for_question(&self, question_id: ContentId) -> Result<Vec<Answer>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM answers WHERE question_id = ?1 ORDER BY created_at, id",
            ANSWER_COLUMNS
        ))?;

        let answers = stmt
            .query_map(
                params![&Self::id_bytes(question_id.value())],
                Self::row_to_answer,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(answers)
    }

    fn item_exists(&self, kind: ItemKind, id: ContentId) -> Result<bool, Self::Error> {
        let sql = match kind {
            ItemKind::Question => "SELECT 1 FROM questions WHERE id = ?1",
            ItemKind::Answer => "SELECT 1 FROM answers WHERE id = ?1",
        };
        let exists: bool = self
            .conn
            .query_row(sql, params![&Self::id_bytes(id.value())], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn update_body(
        &mut self,
        kind: ItemKind,
        id: ContentId,
        body: &str,
    ) -> Result<bool, Self::Error> {
        let sql = match kind {
            ItemKind::Question => "UPDATE questions SET body = ?1 WHERE id = ?2",
            ItemKind::Answer => "UPDATE answers SET body = ?1 WHERE id = ?2",
        };
        let changed = self
            .conn
            .execute(sql, params![body, &Self::id_bytes(id.value())])?;
        Ok(changed > 0)
    }

    fn delete_answer(&mut self, id: ContentId) -> Result<bool, Self::Error> {
        let id_bytes = Self::id_bytes(id.value());
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM votes WHERE item_kind = 'answer' AND item_id = ?1",
            params![&id_bytes],
        )?;
        let deleted = tx.execute("DELETE FROM answers WHERE id = ?1", params![&id_bytes])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn delete_question_cascade(&mut self, id: ContentId) -> Result<bool, Self::Error> {
        let id_bytes = Self::id_bytes(id.value());
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM votes WHERE item_kind = 'answer'
               AND item_id IN (SELECT id FROM answers WHERE question_id = ?1)",
            params![&id_bytes],
        )?;
        tx.execute(
            "DELETE FROM votes WHERE item_kind = 'question' AND item_id = ?1",
            params![&id_bytes],
        )?;
        tx.execute(
            "DELETE FROM answers WHERE question_id = ?1",
            params![&id_bytes],
        )?;
        let deleted = tx.execute("DELETE FROM questions WHERE id = ?1", params![&id_bytes])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    fn adjust_answer_count(
        &mut self,
        question_id: ContentId,
        delta: i64,
    ) -> Result<(), Self::Error> {
        let changed = self.conn.execute(
            "UPDATE questions SET answer_count = answer_count + ?1 WHERE id = ?2",
            params![delta, &Self::id_bytes(question_id.value())],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("question {}", question_id)));
        }
        Ok(())
    }

    fn set_answer_accepted(&mut self, id: ContentId, accepted: bool) -> Result<(), Self::Error> {
        let changed = self.conn.execute(
            "UPDATE answers SET is_accepted = ?1 WHERE id = ?2",
            params![accepted, &Self::id_bytes(id.value())],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("answer {}", id)));
        }
        Ok(())
    }

    fn accepted_answer_count(&self, question_id: ContentId) -> Result<u64, Self::Error> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM answers WHERE question_id = ?1 AND is_accepted = 1",
            params![&Self::id_bytes(question_id.value())],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn set_question_accepted(&mut self, id: ContentId, accepted: bool) -> Result<(), Self::Error> {
        let changed = self.conn.execute(
            "UPDATE questions SET is_accepted = ?1 WHERE id = ?2",
            params![accepted, &Self::id_bytes(id.value())],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("question {}", id)));
        }
        Ok(())
    }

    fn remove_vote_in_direction(
        &mut self,
        kind: ItemKind,
        id: ContentId,
        voter: AccountId,
        direction: VoteDirection,
    ) -> Result<bool, Self::Error> {
        let removed = self.conn.execute(
            "DELETE FROM votes
             WHERE item_kind = ?1 AND item_id = ?2 AND voter = ?3 AND direction = ?4",
            params![
                Self::item_kind_to_str(kind),
                &Self::id_bytes(id.value()),
                &Self::id_bytes(voter.value()),
                Self::direction_to_str(direction),
            ],
        )?;
        Ok(removed > 0)
    }

    fn put_vote(
        &mut self,
        kind: ItemKind,
        id: ContentId,
        voter: AccountId,
        direction: VoteDirection,
    ) -> Result<(), Self::Error> {
        // One keyed row per (item, voter): the upsert flips an opposite-direction
        // vote in the same statement, so the sets can never overlap.
        self.conn.execute(
            "INSERT INTO votes (item_kind, item_id, voter, direction)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(item_kind, item_id, voter) DO UPDATE SET
             direction = excluded.direction",
            params![
                Self::item_kind_to_str(kind),
                &Self::id_bytes(id.value()),
                &Self::id_bytes(voter.value()),
                Self::direction_to_str(direction),
            ],
        )?;
        Ok(())
    }

    fn vote_sets(&self, kind: ItemKind, id: ContentId) -> Result<VoteSets, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT voter, direction FROM votes
             WHERE item_kind = ?1 AND item_id = ?2 ORDER BY voter",
        )?;

        let rows = stmt
            .query_map(
                params![Self::item_kind_to_str(kind), &Self::id_bytes(id.value())],
                |row| {
                    let voter_bytes: Vec<u8> = row.get(0)?;
                    let direction: String = row.get(1)?;
                    Ok((Self::column_id(&voter_bytes, 0)?, direction))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut sets = VoteSets::default();
        for (voter, direction) in rows {
            match direction.as_str() {
                "up" => sets.upvotes.push(AccountId::from_value(voter)),
                "down" => sets.downvotes.push(AccountId::from_value(voter)),
                other => {
                    return Err(StoreError::InvalidData(format!(
                        "Unknown vote direction: {}",
                        other
                    )))
                }
            }
        }
        Ok(sets)
    }
}

impl NotificationStore for SqliteStore {
    type Error = StoreError;

    fn insert_notification(&mut self, notification: &Notification) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO notifications (id, recipient, sender, kind, title, message,
                                        question_id, answer_id, read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &Self::id_bytes(notification.id.value()),
                &Self::id_bytes(notification.recipient.value()),
                notification.sender.map(|s| Self::id_bytes(s.value())),
                Self::notification_kind_to_str(notification.kind),
                &notification.title,
                &notification.message,
                notification.question_id.map(|q| Self::id_bytes(q.value())),
                notification.answer_id.map(|a| Self::id_bytes(a.value())),
                notification.read,
                notification.created_at as i64,
            ],
        )?;
        Ok(())
    }

    fn notifications_for(&self, recipient: AccountId) -> Result<Vec<Notification>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient, sender, kind, title, message, question_id, answer_id,
                    read, created_at
             FROM notifications WHERE recipient = ?1
             ORDER BY created_at DESC, id DESC",
        )?;

        let notifications = stmt
            .query_map(params![&Self::id_bytes(recipient.value())], |row| {
                let id_bytes: Vec<u8> = row.get(0)?;
                let recipient_bytes: Vec<u8> = row.get(1)?;
                let sender_bytes: Option<Vec<u8>> = row.get(2)?;
                let kind_str: String = row.get(3)?;
                let question_bytes: Option<Vec<u8>> = row.get(6)?;
                let answer_bytes: Option<Vec<u8>> = row.get(7)?;

                let kind = Self::str_to_notification_kind(&kind_str).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;

                let sender = match sender_bytes {
                    Some(b) => Some(AccountId::from_value(Self::column_id(&b, 2)?)),
                    None => None,
                };
                let question_id = match question_bytes {
                    Some(b) => Some(ContentId::from_value(Self::column_id(&b, 6)?)),
                    None => None,
                };
                let answer_id = match answer_bytes {
                    Some(b) => Some(ContentId::from_value(Self::column_id(&b, 7)?)),
                    None => None,
                };

                Ok(Notification {
                    id: NotificationId::from_value(Self::column_id(&id_bytes, 0)?),
                    recipient: AccountId::from_value(Self::column_id(&recipient_bytes, 1)?),
                    sender,
                    kind,
                    title: row.get(4)?,
                    message: row.get(5)?,
                    question_id,
                    answer_id,
                    read: row.get(8)?,
                    created_at: row.get::<_, i64>(9)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    fn mark_read(
        &mut self,
        id: NotificationId,
        recipient: AccountId,
    ) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE notifications SET read = 1 WHERE id = ?1 AND recipient = ?2",
            params![
                &Self::id_bytes(id.value()),
                &Self::id_bytes(recipient.value())
            ],
        )?;
        Ok(changed > 0)
    }
}
