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

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

/// No session or selection call may ever hold more questions than this.
pub const MAX_QUESTIONS: usize = 180;

/// The business limits applied by the session manager and selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Most questions a single session or selection call may request.
    pub max_questions: usize,
    /// Questions a user may receive per day.
    pub daily_quota: usize,
    /// Sessions a user may hold.
    pub max_sessions: usize,
    /// Session names are truncated to this many characters.
    pub name_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_questions: MAX_QUESTIONS,
            daily_quota: 450,
            max_sessions: 10,
            name_length: 30,
        }
    }
}

impl Limits {
    /// Reject limits that would let a session exceed `MAX_QUESTIONS`.
    pub fn validate(&self) -> Fallible<()> {
        if !(1..=MAX_QUESTIONS).contains(&self.max_questions) {
            return fail(format!(
                "max_questions must be between 1 and {MAX_QUESTIONS}, got {}",
                self.max_questions
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Limits::default().validate().is_ok());
    }

    #[test]
    fn test_max_questions_bounds() {
        let limits = |max_questions| Limits {
            max_questions,
            ..Limits::default()
        };
        assert!(limits(1).validate().is_ok());
        assert!(limits(MAX_QUESTIONS).validate().is_ok());
        assert!(limits(0).validate().is_err());
        assert!(limits(MAX_QUESTIONS + 1).validate().is_err());
    }
}
