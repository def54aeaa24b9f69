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

use std::collections::HashMap;

use crate::error::ExamError;
use crate::types::category::Category;
use crate::types::question::Question;
use crate::types::question::QuestionId;

/// The in-memory question corpus. Loaded once, never mutated.
#[derive(Debug, Default)]
pub struct Catalog {
    questions: Vec<Question>,
    by_id: HashMap<QuestionId, usize>,
    by_unique_id: HashMap<String, usize>,
}

/// A record that was left out of the catalog, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub unique_id: String,
    pub reason: String,
}

impl Catalog {
    /// Build a catalog from already-parsed questions.
    ///
    /// Questions are ordered by their unique id so that seeded selection is
    /// reproducible regardless of the order the store returned them in. A
    /// question whose numeric id repeats an earlier one is skipped.
    pub fn new(questions: Vec<Question>) -> (Self, Vec<Skipped>) {
        let mut questions = questions;
        questions.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));

        let mut catalog = Catalog::default();
        let mut skipped = Vec::new();
        for question in questions {
            if catalog.by_id.contains_key(&question.id) {
                skipped.push(Skipped {
                    reason: format!("duplicate question id {}", question.id),
                    unique_id: question.unique_id,
                });
                continue;
            }
            let idx = catalog.questions.len();
            catalog.by_id.insert(question.id, idx);
            catalog.by_unique_id.insert(question.unique_id.clone(), idx);
            catalog.questions.push(question);
        }
        (catalog, skipped)
    }

    /// Parse a set of `(unique id, JSON text)` records. Records that fail to
    /// parse are skipped and reported, never fatal.
    pub fn parse<'a>(records: impl Iterator<Item = (&'a str, &'a str)>) -> (Self, Vec<Skipped>) {
        let mut questions = Vec::new();
        let mut skipped = Vec::new();
        for (unique_id, text) in records {
            match serde_json::from_str::<Question>(text) {
                Ok(mut question) => {
                    question.unique_id = unique_id.to_string();
                    questions.push(question);
                }
                Err(e) => skipped.push(Skipped {
                    unique_id: unique_id.to_string(),
                    reason: format!("malformed question record: {e}"),
                }),
            }
        }
        let (catalog, duplicates) = Catalog::new(questions);
        skipped.extend(duplicates);
        (catalog, skipped)
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn by_id(&self, id: QuestionId) -> Result<&Question, ExamError> {
        self.by_id
            .get(&id)
            .map(|idx| &self.questions[*idx])
            .ok_or_else(|| ExamError::NotFound(format!("question {id}")))
    }

    pub fn by_unique_id(&self, unique_id: &str) -> Result<&Question, ExamError> {
        self.by_unique_id
            .get(unique_id)
            .map(|idx| &self.questions[*idx])
            .ok_or_else(|| ExamError::NotFound(format!("question '{unique_id}'")))
    }

    /// Questions whose discipline is one of `disciplines` or whose language
    /// is one of `languages`, compared case-insensitively.
    pub fn filter(&self, disciplines: &[String], languages: &[String]) -> Vec<&Question> {
        self.filter_categories(&Category::from_filters(disciplines, languages))
    }

    /// Questions matching any of the given categories, in catalog order.
    pub fn filter_categories(&self, categories: &[Category]) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| categories.iter().any(|c| c.matches(q)))
            .collect()
    }

    pub fn filter_category(&self, category: &Category) -> Vec<&Question> {
        self.filter_categories(std::slice::from_ref(category))
    }
}
