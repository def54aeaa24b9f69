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

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::session::SessionQuestionLink;

/// The area questions without a tag are grouped under.
pub const UNTAGGED_AREA: &str = "Outros";

/// Results for one area of a session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AreaScore {
    pub area: String,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub percentage: f64,
}

/// Per-area and overall results of a session. Derived on demand, never
/// stored.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreSummary {
    /// Sorted by descending total, then by area name.
    pub areas: Vec<AreaScore>,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub percentage: f64,
}

impl ScoreSummary {
    pub fn from_links(links: &[SessionQuestionLink]) -> Self {
        let mut groups: BTreeMap<&str, (usize, usize, usize)> = BTreeMap::new();
        for link in links {
            let area = if link.area.trim().is_empty() {
                UNTAGGED_AREA
            } else {
                link.area.as_str()
            };
            let entry = groups.entry(area).or_default();
            entry.0 += 1;
            if link.is_answered() {
                entry.1 += 1;
            }
            if link.correct == Some(true) {
                entry.2 += 1;
            }
        }

        let mut areas: Vec<AreaScore> = groups
            .into_iter()
            .map(|(area, (total, answered, correct))| AreaScore {
                area: area.to_string(),
                total,
                answered,
                correct,
                percentage: percentage(correct, total),
            })
            .collect();
        areas.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.area.cmp(&b.area)));

        let total = areas.iter().map(|a| a.total).sum();
        let answered = areas.iter().map(|a| a.answered).sum();
        let correct = areas.iter().map(|a| a.correct).sum();
        ScoreSummary {
            areas,
            total,
            answered,
            correct,
            percentage: percentage(correct, total),
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// `correct / total` as a percentage rounded to two decimals, or 0 for an
/// empty group.
pub fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = correct as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}
