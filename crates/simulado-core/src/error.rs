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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::string::FromUtf8Error;

/// A free-form error for the ambient plumbing: I/O, parsing, configuration.
#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(msg: impl Into<String>) -> Self {
        ErrorReport {
            message: msg.into(),
        }
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport {
            message: format!("I/O error: {value:#?}"),
        }
    }
}

impl From<FromUtf8Error> for ErrorReport {
    fn from(value: FromUtf8Error) -> Self {
        ErrorReport {
            message: format!("UTF-8 conversion error: {value:#?}"),
        }
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport {
            message: format!("JSON error: {value}"),
        }
    }
}

impl From<ExamError> for ErrorReport {
    fn from(value: ExamError) -> Self {
        ErrorReport {
            message: value.to_string(),
        }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {
    fn description(&self) -> &str {
        &self.message
    }
}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(msg: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport {
        message: msg.into(),
    })
}

/// The failures an exam operation can report to its caller.
///
/// The same logical failure always maps to the same variant, so callers can
/// translate these into stable user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamError {
    /// The request is malformed or out of range.
    InvalidRequest(String),
    /// A session, question or link does not exist.
    NotFound(String),
    /// A question position outside the session.
    OutOfRange { index: usize, total: usize },
    /// The user already owns the maximum number of sessions.
    SessionLimitExceeded,
    /// The user has received the maximum number of questions today.
    QuotaExceeded,
    /// The selection produced no questions for the requested filters.
    NoQuestionsFound,
    /// The session is finalized and can no longer be mutated.
    SessionFinalized,
    /// The question corpus could not be loaded.
    LoadError(String),
    /// The persistence layer failed.
    Storage(String),
}

impl Display for ExamError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ExamError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            ExamError::NotFound(what) => write!(f, "not found: {what}"),
            ExamError::OutOfRange { index, total } => {
                write!(f, "question {index} is out of range, the session has {total}")
            }
            ExamError::SessionLimitExceeded => {
                write!(f, "the maximum number of exam sessions has been reached")
            }
            ExamError::QuotaExceeded => {
                write!(f, "the daily question quota has been reached")
            }
            ExamError::NoQuestionsFound => {
                write!(f, "no questions found for the selected criteria")
            }
            ExamError::SessionFinalized => write!(f, "the exam session is already finalized"),
            ExamError::LoadError(msg) => write!(f, "failed to load questions: {msg}"),
            ExamError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl Error for ExamError {}
