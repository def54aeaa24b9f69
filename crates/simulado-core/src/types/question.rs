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

use serde::Deserialize;
use serde::Serialize;

/// The numeric identity of a question. Unique across the catalog.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(i64);

impl QuestionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for QuestionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A single exam question, as stored in the corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    /// The natural key: the record's path relative to the corpus root.
    /// Assigned by the loader, not read from the record.
    #[serde(default, skip_deserializing)]
    pub unique_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: u32,
    pub year: u16,
    /// Set when the question belongs to a foreign-language track.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub discipline: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub files: Vec<String>,
    pub correct_alternative: String,
    #[serde(default)]
    pub alternatives_introduction: String,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub letter: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

impl Question {
    pub fn has_discipline(&self, name: &str) -> bool {
        same_tag(&self.discipline, name)
    }

    pub fn has_language(&self, name: &str) -> bool {
        self.language.as_deref().is_some_and(|l| same_tag(l, name))
    }

    /// The tag a session groups this question under when scoring: the
    /// language track if there is one, otherwise the discipline.
    pub fn area(&self) -> &str {
        match self.language.as_deref() {
            Some(language) if !language.trim().is_empty() => language,
            _ => &self.discipline,
        }
    }

    /// Whether `answer` is the correct alternative. Case-insensitive.
    pub fn is_correct(&self, answer: &str) -> bool {
        same_tag(&self.correct_alternative, answer)
    }
}

/// Case-insensitive comparison of tags and answers.
pub fn same_tag(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
