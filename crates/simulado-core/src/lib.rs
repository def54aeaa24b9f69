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

//! simulado-core: the practice-exam core, free of I/O.
//!
//! - Question catalog and category filters
//! - Balanced selection with exhaustion backfill
//! - Session and progress types
//! - Area-grouped scoring and the points rule

pub mod catalog;
pub mod error;
pub mod limits;
pub mod points;
pub mod rng;
pub mod scoring;
pub mod selector;
pub mod types;

// Re-exports for convenience
pub use catalog::{Catalog, Skipped};
pub use error::{ErrorReport, ExamError, Fallible, fail};
pub use limits::Limits;
pub use points::Award;
pub use scoring::{AreaScore, ScoreSummary};
pub use types::category::Category;
pub use types::date::Date;
pub use types::question::{Alternative, Question, QuestionId};
pub use types::session::{ExamSession, NewSession, SessionId, SessionQuestionLink, SessionState};
pub use types::timestamp::Timestamp;
