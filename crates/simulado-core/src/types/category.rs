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

use crate::types::question::Question;

/// The unit the selector balances across.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Category {
    Discipline(String),
    Language(String),
}

impl Category {
    /// Disciplines first, then languages, in the order given. This order
    /// drives the round-robin.
    pub fn from_filters(disciplines: &[String], languages: &[String]) -> Vec<Category> {
        disciplines
            .iter()
            .map(|d| Category::Discipline(d.clone()))
            .chain(languages.iter().map(|l| Category::Language(l.clone())))
            .collect()
    }

    pub fn matches(&self, question: &Question) -> bool {
        match self {
            Category::Discipline(name) => question.has_discipline(name),
            Category::Language(name) => question.has_language(name),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Discipline(name) => write!(f, "discipline:{name}"),
            Category::Language(name) => write!(f, "language:{name}"),
        }
    }
}
