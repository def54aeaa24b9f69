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

//! The exam session manager.
//!
//! Every operation runs in a single database transaction while holding the
//! connection lock, so checks and the writes that depend on them cannot
//! interleave with another request.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use chrono::Duration;
use simulado_core::Award;
use simulado_core::Catalog;
use simulado_core::Category;
use simulado_core::Date;
use simulado_core::ExamError;
use simulado_core::ExamSession;
use simulado_core::Limits;
use simulado_core::NewSession;
use simulado_core::Question;
use simulado_core::QuestionId;
use simulado_core::ScoreSummary;
use simulado_core::SessionId;
use simulado_core::Timestamp;
use simulado_core::rng::TinyRng;
use simulado_core::selector::candidate_pool;
use simulado_core::selector::select_balanced;
use simulado_core::selector::validate_count;
use simulado_core::types::session::truncate_name;

use crate::db::Database;
use crate::db::Tx;

pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// A question of a session at a given position, as needed to resume.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionQuestion {
    pub position: usize,
    pub total: usize,
    pub question: Question,
    pub saved_answer: Option<String>,
    /// Positions the user has answered so far.
    pub answered: Vec<usize>,
}

pub struct Exams {
    catalog: Arc<Catalog>,
    db: Mutex<Database>,
    limits: Limits,
    clock: Clock,
    seed: Option<u64>,
}

impl Exams {
    pub fn new(catalog: Arc<Catalog>, db: Database, limits: Limits) -> Self {
        Self {
            catalog,
            db: Mutex::new(db),
            limits,
            clock: Arc::new(Timestamp::now),
            seed: None,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Draw every selection from this seed instead of the system time.
    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn now(&self) -> Timestamp {
        (self.clock)()
    }

    fn rng(&self) -> TinyRng {
        let seed = self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        });
        TinyRng::from_seed(seed)
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>, ExamError> {
        self.db
            .lock()
            .map_err(|_| ExamError::Storage("database lock poisoned".to_string()))
    }

    /// Check the user's quota, draw a balanced selection and charge the
    /// quota for it, all inside `tx`.
    #[allow(clippy::too_many_arguments)]
    fn draw<'c>(
        &'c self,
        tx: &Tx<'_>,
        user_id: &str,
        today: Date,
        categories: &[Category],
        years: &[u16],
        count: usize,
        rng: &mut TinyRng,
    ) -> Result<Vec<&'c Question>, ExamError> {
        if tx.quota_used(user_id, today)? >= self.limits.daily_quota {
            return Err(ExamError::QuotaExceeded);
        }
        let pool = candidate_pool(&self.catalog, categories, years);
        let selected = select_balanced(&pool, categories, count, rng);
        if !selected.is_empty() {
            tx.add_quota(user_id, today, selected.len())?;
        }
        log::debug!(
            "Selected {} of {} requested questions for {user_id} from a pool of {}",
            selected.len(),
            count,
            pool.len()
        );
        Ok(selected)
    }

    /// Select up to `count` questions balanced across the given disciplines
    /// and languages, charging the user's daily quota.
    ///
    /// Returns fewer than `count` questions when the matching pool is
    /// smaller, and none when nothing matches.
    pub fn select_balanced(
        &self,
        disciplines: &[String],
        languages: &[String],
        count: usize,
        user_id: &str,
    ) -> Result<Vec<Question>, ExamError> {
        validate_count(count, &self.limits)?;
        let categories = Category::from_filters(disciplines, languages);
        let today = self.now().date();
        let mut rng = self.rng();
        let mut db = self.db()?;
        db.transaction(|tx| {
            let selected = self.draw(tx, user_id, today, &categories, &[], count, &mut rng)?;
            Ok(selected.into_iter().cloned().collect())
        })
    }

    /// Create a session with its questions. Either the session and all of
    /// its links are stored, or nothing is.
    pub fn create_session(&self, request: NewSession) -> Result<ExamSession, ExamError> {
        let now = self.now();
        let name = truncate_name(&request.name, self.limits.name_length);
        let categories = Category::from_filters(&request.disciplines, &request.languages);
        let mut rng = self.rng();
        let mut db = self.db()?;
        let session = db.transaction(|tx| {
            if tx.count_sessions(&request.owner_id)? >= self.limits.max_sessions {
                return Err(ExamError::SessionLimitExceeded);
            }
            validate_count(request.count, &self.limits)?;
            let selected = self.draw(
                tx,
                &request.owner_id,
                now.date(),
                &categories,
                &request.years,
                request.count,
                &mut rng,
            )?;
            if selected.is_empty() {
                return Err(ExamError::NoQuestionsFound);
            }
            let session_id = tx.insert_session(&request, &name, now)?;
            for (position, question) in selected.iter().enumerate() {
                tx.insert_link(session_id, question.id, position, question.area())?;
            }
            log::info!(
                "Creating session {session_id} for {} with {} questions",
                request.owner_id,
                selected.len()
            );
            require_session(tx, session_id)
        })?;
        Ok(session)
    }

    pub fn get_session(&self, session_id: SessionId) -> Result<ExamSession, ExamError> {
        self.db()?.transaction(|tx| require_session(tx, session_id))
    }

    /// The owner's sessions, newest first.
    pub fn list_sessions(&self, owner_id: &str) -> Result<Vec<ExamSession>, ExamError> {
        self.db()?.transaction(|tx| tx.list_sessions(owner_id))
    }

    /// The session's questions in their fixed order.
    pub fn session_questions(&self, session_id: SessionId) -> Result<Vec<Question>, ExamError> {
        let links = self.db()?.transaction(|tx| {
            require_session(tx, session_id)?;
            tx.links(session_id)
        })?;
        links
            .iter()
            .map(|link| self.catalog.by_id(link.question_id).cloned())
            .collect()
    }

    /// The saved answers of a session, by question.
    pub fn answers(&self, session_id: SessionId) -> Result<HashMap<QuestionId, String>, ExamError> {
        let links = self.db()?.transaction(|tx| {
            require_session(tx, session_id)?;
            tx.links(session_id)
        })?;
        Ok(links
            .into_iter()
            .filter_map(|link| link.answer.map(|answer| (link.question_id, answer)))
            .collect())
    }

    /// The question at `index` of the session, with the answer saved for it.
    pub fn question_at(&self, session_id: SessionId, index: usize) -> Result<SessionQuestion, ExamError> {
        let links = self.db()?.transaction(|tx| {
            require_session(tx, session_id)?;
            tx.links(session_id)
        })?;
        let total = links.len();
        let link = links
            .get(index)
            .ok_or(ExamError::OutOfRange { index, total })?;
        let question = self.catalog.by_id(link.question_id)?.clone();
        let answered = links
            .iter()
            .filter(|l| l.is_answered())
            .map(|l| l.position)
            .collect();
        Ok(SessionQuestion {
            position: link.position,
            total,
            question,
            saved_answer: link.answer.clone(),
            answered,
        })
    }

    /// Save the user's answer to a question of the session. Returns whether
    /// the answer is correct.
    pub fn record_answer(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        answer: &str,
    ) -> Result<bool, ExamError> {
        let now = self.now();
        let mut db = self.db()?;
        db.transaction(|tx| {
            let session = require_session(tx, session_id)?;
            if session.state.is_finalized() {
                return Err(ExamError::SessionFinalized);
            }
            if tx.link_for(session_id, question_id)?.is_none() {
                return Err(ExamError::NotFound(format!(
                    "question {question_id} in session {session_id}"
                )));
            }
            let correct = self.catalog.by_id(question_id)?.is_correct(answer);
            if !tx.record_answer(session_id, question_id, answer, correct, now)? {
                return Err(ExamError::SessionFinalized);
            }
            if tx.mark_in_progress(session_id)? {
                log::debug!("Session {session_id} is now in progress");
            }
            Ok(correct)
        })
    }

    pub fn set_elapsed(&self, session_id: SessionId, elapsed: Duration) -> Result<(), ExamError> {
        if elapsed < Duration::zero() {
            return Err(ExamError::InvalidRequest(
                "elapsed time cannot be negative".to_string(),
            ));
        }
        let mut db = self.db()?;
        db.transaction(|tx| {
            if !tx.set_elapsed(session_id, elapsed.num_milliseconds())? {
                return Err(ExamError::NotFound(format!("session {session_id}")));
            }
            Ok(())
        })
    }

    pub fn elapsed(&self, session_id: SessionId) -> Result<Option<Duration>, ExamError> {
        Ok(self.get_session(session_id)?.elapsed)
    }

    /// Finalize the session, scoring it and awarding its owner's points.
    ///
    /// Only the call that moves the session into the finalized state scores
    /// and awards; later calls do nothing. Returns whether this call
    /// finalized the session.
    pub fn finalize(&self, session_id: SessionId) -> Result<bool, ExamError> {
        let now = self.now();
        let mut db = self.db()?;
        let finalized = db.transaction(|tx| {
            if !tx.finalize_session(session_id)? {
                require_session(tx, session_id)?;
                return Ok(None);
            }
            let session = require_session(tx, session_id)?;
            let summary = ScoreSummary::from_links(&tx.links(session_id)?);
            let award = Award::for_result(&summary);
            let awarded = tx.award(&session.owner_id, session_id, award, now)?;
            Ok(Some((session.owner_id, award, awarded)))
        })?;
        match finalized {
            Some((owner_id, award, true)) => {
                log::info!(
                    "Finalized session {session_id}: awarded {} points to {owner_id}",
                    award.points()
                );
                Ok(true)
            }
            Some((owner_id, _, false)) => {
                log::warn!(
                    "Finalized session {session_id}, but {owner_id} was already awarded for it"
                );
                Ok(true)
            }
            None => {
                log::debug!("Session {session_id} was already finalized");
                Ok(false)
            }
        }
    }

    /// Per-area and overall results of the session, finalized or not.
    pub fn compute_result(&self, session_id: SessionId) -> Result<ScoreSummary, ExamError> {
        let links = self.db()?.transaction(|tx| {
            require_session(tx, session_id)?;
            tx.links(session_id)
        })?;
        Ok(ScoreSummary::from_links(&links))
    }

    pub fn points(&self, user_id: &str) -> Result<i64, ExamError> {
        self.db()?.transaction(|tx| tx.points(user_id))
    }

    /// Questions delivered to the user today.
    pub fn quota_used(&self, user_id: &str) -> Result<usize, ExamError> {
        let today = self.now().date();
        self.db()?.transaction(|tx| tx.quota_used(user_id, today))
    }
}

fn require_session(tx: &Tx<'_>, session_id: SessionId) -> Result<ExamSession, ExamError> {
    tx.get_session(session_id)?
        .ok_or_else(|| ExamError::NotFound(format!("session {session_id}")))
}
