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

use crate::scoring::ScoreSummary;

/// Points for each correct answer in a finalized session.
pub const POINTS_PER_CORRECT: i64 = 10;

/// Extra points for a session with every question answered correctly.
pub const PERFECT_BONUS: i64 = 50;

/// The points a finalized session earns its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Award {
    pub base: i64,
    pub bonus: i64,
}

impl Award {
    /// The award for a scored session: `POINTS_PER_CORRECT` for each correct
    /// answer, plus `PERFECT_BONUS` when every question is correct.
    pub fn for_result(summary: &ScoreSummary) -> Self {
        let base = POINTS_PER_CORRECT * summary.correct as i64;
        let bonus = if summary.is_perfect() { PERFECT_BONUS } else { 0 };
        Award { base, bonus }
    }

    pub fn points(&self) -> i64 {
        self.base + self.bonus
    }
}
