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

use std::fs::create_dir_all;
use std::fs::write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use chrono::NaiveDateTime;
use simulado_core::Catalog;
use simulado_core::Fallible;
use simulado_core::Limits;
use simulado_core::Timestamp;
use tempfile::TempDir;
use tempfile::tempdir;

use crate::db::Database;
use crate::exams::Exams;

pub fn timestamp(s: &str) -> Timestamp {
    Timestamp::new(NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f").unwrap())
}

/// A question record in the corpus format. Every fixture question's
/// correct alternative is "A".
pub fn question_json(id: i64, discipline: &str, language: Option<&str>, year: u16) -> String {
    let language = match language {
        Some(l) => format!("\"{l}\""),
        None => "null".to_string(),
    };
    format!(
        r#"{{
  "id": {id},
  "title": "Questão {id} - ENEM {year}",
  "index": {id},
  "year": {year},
  "language": {language},
  "discipline": "{discipline}",
  "context": "Enunciado da questão {id}.",
  "files": [],
  "correctAlternative": "A",
  "alternativesIntroduction": "Assinale a alternativa correta.",
  "alternatives": [
    {{ "letter": "A", "text": "Certa", "file": null, "isCorrect": true }},
    {{ "letter": "B", "text": "Errada", "file": null, "isCorrect": false }}
  ]
}}"#
    )
}

/// A group of fixture questions: discipline, optional language, how many.
pub type Group<'a> = (&'a str, Option<&'a str>, usize);

/// Build a catalog in memory. Ids are assigned consecutively from 1, in
/// group order.
pub fn catalog_of(groups: &[Group<'_>]) -> Catalog {
    let mut records = Vec::new();
    let mut id = 0;
    for (discipline, language, count) in groups {
        for _ in 0..*count {
            id += 1;
            records.push((
                format!("2023/{id:04}.json"),
                question_json(id, discipline, *language, 2023),
            ));
        }
    }
    let (catalog, skipped) = Catalog::parse(records.iter().map(|(p, t)| (p.as_str(), t.as_str())));
    assert!(skipped.is_empty());
    catalog
}

/// Write a corpus to disk, laid out as `<year>/<discipline>/<id>.json`.
pub fn write_corpus(root: &Path, groups: &[Group<'_>]) -> Fallible<()> {
    let mut id = 0;
    for (discipline, language, count) in groups {
        for _ in 0..*count {
            id += 1;
            let dir = root.join("2022").join(discipline);
            create_dir_all(&dir)?;
            write(dir.join(format!("{id}.json")), question_json(id, discipline, *language, 2022))?;
        }
    }
    Ok(())
}

pub fn create_tmp_directory() -> Fallible<TempDir> {
    Ok(tempdir()?)
}

/// A settable clock for tests.
pub struct TestClock {
    now: Arc<Mutex<Timestamp>>,
}

impl TestClock {
    pub fn new(now: &str) -> Self {
        Self {
            now: Arc::new(Mutex::new(timestamp(now))),
        }
    }

    pub fn set(&self, now: &str) {
        *self.now.lock().unwrap() = timestamp(now);
    }

    pub fn source(&self) -> impl Fn() -> Timestamp + Send + Sync + 'static {
        let now = self.now.clone();
        move || *now.lock().unwrap()
    }
}

/// An in-memory service over `groups`, with a fixed seed and clock.
pub fn exams_over(groups: &[Group<'_>], limits: Limits, clock: &TestClock) -> Fallible<Exams> {
    let db = Database::in_memory()?;
    Ok(Exams::new(Arc::new(catalog_of(groups)), db, limits)
        .with_clock(clock.source())
        .with_seed(20251017))
}
