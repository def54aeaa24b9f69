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

//! Balanced question selection.
//!
//! Questions are drawn round-robin across the requested categories, one per
//! slot, so every category gets its turn in the order the caller listed
//! them. A slot whose category has run dry is skipped. Whatever is still
//! missing afterwards is drawn from the rest of the pool regardless of
//! category, so the result only falls short of the requested count when the
//! pool as a whole is too small.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::error::ExamError;
use crate::limits::Limits;
use crate::limits::MAX_QUESTIONS;
use crate::rng::TinyRng;
use crate::rng::sample;
use crate::types::category::Category;
use crate::types::question::Question;
use crate::types::question::QuestionId;

/// Check a requested question count against the limits. The count never
/// exceeds `MAX_QUESTIONS`, whatever the configured limit says.
pub fn validate_count(count: usize, limits: &Limits) -> Result<(), ExamError> {
    let max = limits.max_questions.min(MAX_QUESTIONS);
    if count == 0 || count > max {
        return Err(ExamError::InvalidRequest(format!(
            "question count must be between 1 and {max}, got {count}"
        )));
    }
    Ok(())
}

/// The questions eligible for a selection: those matching any category and,
/// when `years` is non-empty, published in one of those years.
pub fn candidate_pool<'a>(
    catalog: &'a Catalog,
    categories: &[Category],
    years: &[u16],
) -> Vec<&'a Question> {
    catalog
        .filter_categories(categories)
        .into_iter()
        .filter(|q| years.is_empty() || years.contains(&q.year))
        .collect()
}

/// Draw up to `count` distinct questions from `pool`, balanced across
/// `categories`. Returns `min(count, pool size)` questions; an empty result
/// when there are no categories or the pool is empty.
pub fn select_balanced<'a>(
    pool: &[&'a Question],
    categories: &[Category],
    count: usize,
    rng: &mut TinyRng,
) -> Vec<&'a Question> {
    if categories.is_empty() || pool.is_empty() {
        return Vec::new();
    }

    let mut used: HashSet<QuestionId> = HashSet::new();
    let mut result: Vec<&'a Question> = Vec::with_capacity(count.min(pool.len()));

    for slot in 0..count {
        let category = &categories[slot % categories.len()];
        let candidates: Vec<&'a Question> = pool
            .iter()
            .copied()
            .filter(|q| !used.contains(&q.id) && category.matches(q))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let pick = candidates[rng.generate(candidates.len())];
        used.insert(pick.id);
        result.push(pick);
    }

    if result.len() < count {
        let remaining: Vec<&'a Question> = pool
            .iter()
            .copied()
            .filter(|q| !used.contains(&q.id))
            .collect();
        let needed = count - result.len();
        for question in sample(remaining, needed, rng) {
            // The pool may list a question twice if the caller built it by
            // hand; ids stay unique in the result.
            if used.insert(question.id) {
                result.push(question);
            }
        }
    }

    result
}
