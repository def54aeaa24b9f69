// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use simulado_core::Award;
use simulado_core::Date;
use simulado_core::ExamError;
use simulado_core::ExamSession;
use simulado_core::NewSession;
use simulado_core::QuestionId;
use simulado_core::SessionId;
use simulado_core::SessionQuestionLink;
use simulado_core::SessionState;
use simulado_core::Timestamp;

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sessions (
    session_id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    disciplines TEXT NOT NULL,
    languages TEXT NOT NULL,
    years TEXT NOT NULL,
    requested_count INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    elapsed_ms INTEGER,
    state TEXT NOT NULL DEFAULT 'created'
);

CREATE INDEX IF NOT EXISTS sessions_by_owner ON sessions (owner_id);

CREATE TABLE IF NOT EXISTS session_questions (
    session_id INTEGER NOT NULL REFERENCES sessions (session_id) ON DELETE CASCADE,
    question_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    area TEXT NOT NULL,
    answer TEXT,
    correct INTEGER,
    answered_at TEXT,
    PRIMARY KEY (session_id, question_id),
    UNIQUE (session_id, position)
);

CREATE TABLE IF NOT EXISTS daily_quota (
    user_id TEXT NOT NULL,
    day TEXT NOT NULL,
    delivered INTEGER NOT NULL,
    PRIMARY KEY (user_id, day)
);

CREATE TABLE IF NOT EXISTS points (
    user_id TEXT PRIMARY KEY,
    total INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS point_awards (
    session_id INTEGER PRIMARY KEY REFERENCES sessions (session_id),
    user_id TEXT NOT NULL,
    base INTEGER NOT NULL,
    bonus INTEGER NOT NULL,
    awarded_at TEXT NOT NULL
);
";

const SESSION_COLUMNS: &str = "session_id, owner_id, name, disciplines, languages, years, \
     requested_count, created_at, elapsed_ms, state";

const LINK_COLUMNS: &str =
    "session_id, question_id, position, area, answer, correct, answered_at";

pub(crate) trait OrStorage<T> {
    fn or_storage(self) -> Result<T, ExamError>;
}

impl<T> OrStorage<T> for rusqlite::Result<T> {
    fn or_storage(self) -> Result<T, ExamError> {
        self.map_err(|e| ExamError::Storage(e.to_string()))
    }
}

fn storage(msg: impl Into<String>) -> ExamError {
    ExamError::Storage(msg.into())
}

/// The SQLite store for sessions, progress, quotas and points.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(path: &Path) -> Result<Self, ExamError> {
        let conn = Connection::open(path).or_storage()?;
        conn.busy_timeout(Duration::from_secs(5)).or_storage()?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, ExamError> {
        Self::init(Connection::open_in_memory().or_storage()?)
    }

    fn init(conn: Connection) -> Result<Self, ExamError> {
        conn.execute_batch(SCHEMA).or_storage()?;
        Ok(Self { conn })
    }

    /// Run `f` in an immediate transaction. Commits if `f` succeeds, rolls
    /// back otherwise.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&Tx<'_>) -> Result<T, ExamError>,
    ) -> Result<T, ExamError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .or_storage()?;
        let tx = Tx { tx };
        let value = f(&tx)?;
        tx.tx.commit().or_storage()?;
        Ok(value)
    }
}

/// An open transaction.
pub struct Tx<'a> {
    tx: Transaction<'a>,
}

impl Tx<'_> {
    // Quota

    pub fn quota_used(&self, user_id: &str, day: Date) -> Result<usize, ExamError> {
        let delivered: Option<i64> = self
            .tx
            .query_row(
                "SELECT delivered FROM daily_quota WHERE user_id = ?1 AND day = ?2",
                params![user_id, day.to_string()],
                |row| row.get(0),
            )
            .optional()
            .or_storage()?;
        Ok(delivered.unwrap_or(0).max(0) as usize)
    }

    pub fn add_quota(&self, user_id: &str, day: Date, delivered: usize) -> Result<(), ExamError> {
        self.tx
            .execute(
                "INSERT INTO daily_quota (user_id, day, delivered) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, day) DO UPDATE SET delivered = delivered + excluded.delivered",
                params![user_id, day.to_string(), delivered as i64],
            )
            .or_storage()?;
        Ok(())
    }

    // Sessions

    pub fn count_sessions(&self, owner_id: &str) -> Result<usize, ExamError> {
        let count: i64 = self
            .tx
            .query_row(
                "SELECT COUNT(*) FROM sessions WHERE owner_id = ?1",
                params![owner_id],
                |row| row.get(0),
            )
            .or_storage()?;
        Ok(count as usize)
    }

    pub fn insert_session(
        &self,
        request: &NewSession,
        name: &str,
        created_at: Timestamp,
    ) -> Result<SessionId, ExamError> {
        let disciplines = to_json(&request.disciplines)?;
        let languages = to_json(&request.languages)?;
        let years = to_json(&request.years)?;
        self.tx
            .execute(
                "INSERT INTO sessions
                 (owner_id, name, disciplines, languages, years, requested_count, created_at, state)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    request.owner_id,
                    name,
                    disciplines,
                    languages,
                    years,
                    request.count as i64,
                    created_at.to_string(),
                    SessionState::Created.as_str(),
                ],
            )
            .or_storage()?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn get_session(&self, session_id: SessionId) -> Result<Option<ExamSession>, ExamError> {
        let row: Option<SessionRow> = self
            .tx
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
                params![session_id],
                SessionRow::read,
            )
            .optional()
            .or_storage()?;
        row.map(SessionRow::into_session).transpose()
    }

    /// The owner's sessions, newest first.
    pub fn list_sessions(&self, owner_id: &str) -> Result<Vec<ExamSession>, ExamError> {
        let mut stmt = self
            .tx
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE owner_id = ?1
                 ORDER BY created_at DESC, session_id DESC"
            ))
            .or_storage()?;
        let rows = stmt
            .query_map(params![owner_id], SessionRow::read)
            .or_storage()?
            .collect::<rusqlite::Result<Vec<SessionRow>>>()
            .or_storage()?;
        rows.into_iter().map(SessionRow::into_session).collect()
    }

    /// Move a `created` session to `in_progress`. Returns whether it moved.
    pub fn mark_in_progress(&self, session_id: SessionId) -> Result<bool, ExamError> {
        let changed = self
            .tx
            .execute(
                "UPDATE sessions SET state = ?2 WHERE session_id = ?1 AND state = ?3",
                params![
                    session_id,
                    SessionState::InProgress.as_str(),
                    SessionState::Created.as_str()
                ],
            )
            .or_storage()?;
        Ok(changed == 1)
    }

    /// Compare-and-swap the session into `finalized`. Returns `true` only
    /// for the call that performed the transition.
    pub fn finalize_session(&self, session_id: SessionId) -> Result<bool, ExamError> {
        let changed = self
            .tx
            .execute(
                "UPDATE sessions SET state = ?2 WHERE session_id = ?1 AND state != ?2",
                params![session_id, SessionState::Finalized.as_str()],
            )
            .or_storage()?;
        Ok(changed == 1)
    }

    pub fn set_elapsed(&self, session_id: SessionId, elapsed_ms: i64) -> Result<bool, ExamError> {
        let changed = self
            .tx
            .execute(
                "UPDATE sessions SET elapsed_ms = ?2 WHERE session_id = ?1",
                params![session_id, elapsed_ms],
            )
            .or_storage()?;
        Ok(changed == 1)
    }

    // Links

    pub fn insert_link(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        position: usize,
        area: &str,
    ) -> Result<(), ExamError> {
        self.tx
            .execute(
                "INSERT INTO session_questions (session_id, question_id, position, area)
                 VALUES (?1, ?2, ?3, ?4)",
                params![session_id, question_id.get(), position as i64, area],
            )
            .or_storage()?;
        Ok(())
    }

    /// All links of a session, in question order.
    pub fn links(&self, session_id: SessionId) -> Result<Vec<SessionQuestionLink>, ExamError> {
        let mut stmt = self
            .tx
            .prepare(&format!(
                "SELECT {LINK_COLUMNS} FROM session_questions WHERE session_id = ?1
                 ORDER BY position"
            ))
            .or_storage()?;
        let rows = stmt
            .query_map(params![session_id], LinkRow::read)
            .or_storage()?
            .collect::<rusqlite::Result<Vec<LinkRow>>>()
            .or_storage()?;
        rows.into_iter().map(LinkRow::into_link).collect()
    }

    pub fn link_for(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
    ) -> Result<Option<SessionQuestionLink>, ExamError> {
        let row: Option<LinkRow> = self
            .tx
            .query_row(
                &format!(
                    "SELECT {LINK_COLUMNS} FROM session_questions
                     WHERE session_id = ?1 AND question_id = ?2"
                ),
                params![session_id, question_id.get()],
                LinkRow::read,
            )
            .optional()
            .or_storage()?;
        row.map(LinkRow::into_link).transpose()
    }

    /// Write the answer, its correctness and its timestamp in one statement.
    /// Refuses to touch links of finalized sessions.
    pub fn record_answer(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        answer: &str,
        correct: bool,
        answered_at: Timestamp,
    ) -> Result<bool, ExamError> {
        let changed = self
            .tx
            .execute(
                "UPDATE session_questions
                 SET answer = ?3, correct = ?4, answered_at = ?5
                 WHERE session_id = ?1 AND question_id = ?2
                 AND EXISTS (
                     SELECT 1 FROM sessions WHERE session_id = ?1 AND state != ?6
                 )",
                params![
                    session_id,
                    question_id.get(),
                    answer,
                    correct,
                    answered_at.to_string(),
                    SessionState::Finalized.as_str(),
                ],
            )
            .or_storage()?;
        Ok(changed == 1)
    }

    // Points

    /// Record the award for a session and credit it to the user. Returns
    /// `false`, crediting nothing, if the session was already awarded.
    pub fn award(
        &self,
        user_id: &str,
        session_id: SessionId,
        award: Award,
        awarded_at: Timestamp,
    ) -> Result<bool, ExamError> {
        let inserted = self
            .tx
            .execute(
                "INSERT INTO point_awards (session_id, user_id, base, bonus, awarded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (session_id) DO NOTHING",
                params![
                    session_id,
                    user_id,
                    award.base,
                    award.bonus,
                    awarded_at.to_string()
                ],
            )
            .or_storage()?;
        if inserted == 0 {
            return Ok(false);
        }
        self.tx
            .execute(
                "INSERT INTO points (user_id, total) VALUES (?1, 0)
                 ON CONFLICT (user_id) DO NOTHING",
                params![user_id],
            )
            .or_storage()?;
        self.tx
            .execute(
                "UPDATE points SET total = total + ?2 WHERE user_id = ?1",
                params![user_id, award.points()],
            )
            .or_storage()?;
        Ok(true)
    }

    pub fn points(&self, user_id: &str) -> Result<i64, ExamError> {
        let total: Option<i64> = self
            .tx
            .query_row(
                "SELECT total FROM points WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .or_storage()?;
        Ok(total.unwrap_or(0))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ExamError> {
    serde_json::to_string(value).map_err(|e| storage(format!("failed to encode column: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, ExamError> {
    serde_json::from_str(text).map_err(|e| storage(format!("failed to decode column: {e}")))
}

fn parse_timestamp(text: String) -> Result<Timestamp, ExamError> {
    Timestamp::try_from(text).map_err(|e| storage(e.to_string()))
}

struct SessionRow {
    id: i64,
    owner_id: String,
    name: String,
    disciplines: String,
    languages: String,
    years: String,
    requested_count: i64,
    created_at: String,
    elapsed_ms: Option<i64>,
    state: String,
}

impl SessionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SessionRow {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            disciplines: row.get(3)?,
            languages: row.get(4)?,
            years: row.get(5)?,
            requested_count: row.get(6)?,
            created_at: row.get(7)?,
            elapsed_ms: row.get(8)?,
            state: row.get(9)?,
        })
    }

    fn into_session(self) -> Result<ExamSession, ExamError> {
        Ok(ExamSession {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            disciplines: from_json(&self.disciplines)?,
            languages: from_json(&self.languages)?,
            years: from_json(&self.years)?,
            requested_count: self.requested_count.max(0) as usize,
            created_at: parse_timestamp(self.created_at)?,
            elapsed: self.elapsed_ms.map(chrono::Duration::milliseconds),
            state: SessionState::try_from(self.state).map_err(|e| storage(e.to_string()))?,
        })
    }
}

struct LinkRow {
    session_id: i64,
    question_id: i64,
    position: i64,
    area: String,
    answer: Option<String>,
    correct: Option<bool>,
    answered_at: Option<String>,
}

impl LinkRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(LinkRow {
            session_id: row.get(0)?,
            question_id: row.get(1)?,
            position: row.get(2)?,
            area: row.get(3)?,
            answer: row.get(4)?,
            correct: row.get(5)?,
            answered_at: row.get(6)?,
        })
    }

    fn into_link(self) -> Result<SessionQuestionLink, ExamError> {
        Ok(SessionQuestionLink {
            session_id: self.session_id,
            question_id: QuestionId::new(self.question_id),
            position: self.position.max(0) as usize,
            area: self.area,
            answer: self.answer,
            correct: self.correct,
            answered_at: self.answered_at.map(parse_timestamp).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::helper::timestamp;

    fn day(d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(2025, 10, d).unwrap())
    }

    fn new_session(owner: &str) -> NewSession {
        NewSession {
            owner_id: owner.to_string(),
            name: "Revisão".to_string(),
            disciplines: vec!["matematica".to_string()],
            languages: vec!["ingles".to_string()],
            years: vec![2021, 2022],
            count: 3,
        }
    }

    #[test]
    fn test_quota_is_per_user_and_day() -> Result<(), ExamError> {
        let mut db = Database::in_memory()?;
        db.transaction(|tx| {
            tx.add_quota("ana", day(1), 10)?;
            tx.add_quota("ana", day(1), 5)?;
            tx.add_quota("ana", day(2), 1)?;
            tx.add_quota("bia", day(1), 7)?;
            assert_eq!(tx.quota_used("ana", day(1))?, 15);
            assert_eq!(tx.quota_used("ana", day(2))?, 1);
            assert_eq!(tx.quota_used("bia", day(1))?, 7);
            assert_eq!(tx.quota_used("bia", day(3))?, 0);
            Ok(())
        })
    }

    #[test]
    fn test_session_round_trip() -> Result<(), ExamError> {
        let mut db = Database::in_memory()?;
        let created_at = timestamp("2025-10-01T09:00:00.000");
        db.transaction(|tx| {
            let id = tx.insert_session(&new_session("ana"), "Revisão", created_at)?;
            tx.insert_link(id, QuestionId::new(10), 0, "matematica")?;
            tx.insert_link(id, QuestionId::new(7), 1, "ingles")?;

            let session = tx.get_session(id)?.expect("session exists");
            assert_eq!(session.owner_id, "ana");
            assert_eq!(session.years, vec![2021, 2022]);
            assert_eq!(session.created_at, created_at);
            assert_eq!(session.elapsed, None);
            assert_eq!(session.state, SessionState::Created);

            let links = tx.links(id)?;
            let order: Vec<i64> = links.iter().map(|l| l.question_id.get()).collect();
            assert_eq!(order, vec![10, 7]);
            assert!(tx.get_session(id + 1)?.is_none());
            Ok(())
        })
    }

    #[test]
    fn test_duplicate_link_is_rejected() -> Result<(), ExamError> {
        let mut db = Database::in_memory()?;
        let result = db.transaction(|tx| {
            let id = tx.insert_session(&new_session("ana"), "x", timestamp("2025-10-01T09:00:00.000"))?;
            tx.insert_link(id, QuestionId::new(1), 0, "matematica")?;
            tx.insert_link(id, QuestionId::new(1), 1, "matematica")
        });
        assert!(matches!(result, Err(ExamError::Storage(_))));
        // The failed transaction left nothing behind.
        db.transaction(|tx| {
            assert_eq!(tx.count_sessions("ana")?, 0);
            Ok(())
        })
    }

    #[test]
    fn test_finalize_swaps_once() -> Result<(), ExamError> {
        let mut db = Database::in_memory()?;
        db.transaction(|tx| {
            let id = tx.insert_session(&new_session("ana"), "x", timestamp("2025-10-01T09:00:00.000"))?;
            assert!(tx.mark_in_progress(id)?);
            assert!(!tx.mark_in_progress(id)?);
            assert!(tx.finalize_session(id)?);
            assert!(!tx.finalize_session(id)?);
            assert!(!tx.mark_in_progress(id)?);
            Ok(())
        })
    }

    #[test]
    fn test_answer_refused_after_finalize() -> Result<(), ExamError> {
        let mut db = Database::in_memory()?;
        let at = timestamp("2025-10-01T09:05:00.000");
        db.transaction(|tx| {
            let id = tx.insert_session(&new_session("ana"), "x", at)?;
            tx.insert_link(id, QuestionId::new(3), 0, "matematica")?;
            assert!(tx.record_answer(id, QuestionId::new(3), "B", false, at)?);
            tx.finalize_session(id)?;
            assert!(!tx.record_answer(id, QuestionId::new(3), "A", true, at)?);
            let link = tx.link_for(id, QuestionId::new(3))?.expect("link exists");
            assert_eq!(link.answer.as_deref(), Some("B"));
            assert_eq!(link.correct, Some(false));
            assert_eq!(link.answered_at, Some(at));
            Ok(())
        })
    }

    #[test]
    fn test_award_is_recorded_once() -> Result<(), ExamError> {
        let mut db = Database::in_memory()?;
        let at = timestamp("2025-10-01T10:00:00.000");
        let perfect = Award { base: 40, bonus: 50 };
        db.transaction(|tx| {
            let id = tx.insert_session(&new_session("ana"), "x", at)?;
            assert_eq!(tx.points("ana")?, 0);
            assert!(tx.award("ana", id, perfect, at)?);
            assert!(!tx.award("ana", id, perfect, at)?);
            assert_eq!(tx.points("ana")?, 90);
            Ok(())
        })
    }

    #[test]
    fn test_elapsed() -> Result<(), ExamError> {
        let mut db = Database::in_memory()?;
        db.transaction(|tx| {
            let id = tx.insert_session(&new_session("ana"), "x", timestamp("2025-10-01T09:00:00.000"))?;
            assert!(tx.set_elapsed(id, 90_500)?);
            let session = tx.get_session(id)?.expect("session exists");
            assert_eq!(session.elapsed, Some(chrono::Duration::milliseconds(90_500)));
            assert!(!tx.set_elapsed(id + 1, 1)?);
            Ok(())
        })
    }
}
