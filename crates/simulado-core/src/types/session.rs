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

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::Duration;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::question::QuestionId;
use crate::types::timestamp::Timestamp;

pub type SessionId = i64;

/// Where a session is in its lifecycle. `Finalized` is terminal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Created,
    InProgress,
    Finalized,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::InProgress => "in_progress",
            SessionState::Finalized => "finalized",
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, SessionState::Finalized)
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl TryFrom<String> for SessionState {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "created" => Ok(SessionState::Created),
            "in_progress" => Ok(SessionState::InProgress),
            "finalized" => Ok(SessionState::Finalized),
            _ => fail(format!("invalid session state: {value}")),
        }
    }
}

/// A practice exam owned by one user.
#[derive(Clone, Debug, PartialEq)]
pub struct ExamSession {
    pub id: SessionId,
    pub owner_id: String,
    pub name: String,
    pub disciplines: Vec<String>,
    pub languages: Vec<String>,
    pub years: Vec<u16>,
    /// The number of questions asked for. The session may hold fewer.
    pub requested_count: usize,
    pub created_at: Timestamp,
    pub elapsed: Option<Duration>,
    pub state: SessionState,
}

/// One question of a session, in its fixed position, with the user's
/// progress on it.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionQuestionLink {
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub position: usize,
    /// Scoring group, copied from the question at creation time.
    pub area: String,
    pub answer: Option<String>,
    pub correct: Option<bool>,
    pub answered_at: Option<Timestamp>,
}

impl SessionQuestionLink {
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// The caller's parameters for a new session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewSession {
    pub owner_id: String,
    pub name: String,
    pub disciplines: Vec<String>,
    pub languages: Vec<String>,
    pub years: Vec<u16>,
    pub count: usize,
}

/// Truncate a session name to at most `max_chars` characters.
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    name.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            SessionState::Created,
            SessionState::InProgress,
            SessionState::Finalized,
        ] {
            let parsed = SessionState::try_from(state.as_str().to_string()).unwrap();
            assert_eq!(parsed, state);
        }
        assert!(SessionState::try_from("done".to_string()).is_err());
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Simulado", 30), "Simulado");
        let long = "Simulado de revisão para o ENEM de novembro";
        let truncated = truncate_name(long, 30);
        assert_eq!(truncated.chars().count(), 30);
        assert_eq!(truncated, "Simulado de revisão para o ENE");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        let name = "ççççç";
        assert_eq!(truncate_name(name, 3), "ççç");
    }
}
