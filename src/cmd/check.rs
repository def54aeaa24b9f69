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

use simulado_core::Catalog;
use simulado_core::Fallible;
use simulado_core::Limits;

use crate::collection::Collection;

pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    println!("Collection: {}", collection.directory.display());
    print!("{}", render_overview(collection.exams.catalog()));
    print!("{}", render_limits(&collection.config.limits));
    Ok(())
}

/// A summary of the corpus: how many questions per discipline, language
/// track and year.
fn render_overview(catalog: &Catalog) -> String {
    let mut disciplines: BTreeMap<String, usize> = BTreeMap::new();
    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    let mut years: BTreeMap<u16, usize> = BTreeMap::new();
    for question in catalog.all() {
        *disciplines.entry(question.discipline.to_lowercase()).or_default() += 1;
        if let Some(language) = &question.language {
            *languages.entry(language.to_lowercase()).or_default() += 1;
        }
        *years.entry(question.year).or_default() += 1;
    }

    let mut out = format!("{} questions\n", catalog.len());
    out.push_str("\nDisciplines:\n");
    for (name, count) in &disciplines {
        out.push_str(&format!("  {name}: {count}\n"));
    }
    if !languages.is_empty() {
        out.push_str("\nLanguages:\n");
        for (name, count) in &languages {
            out.push_str(&format!("  {name}: {count}\n"));
        }
    }
    out.push_str("\nYears:\n");
    for (year, count) in &years {
        out.push_str(&format!("  {year}: {count}\n"));
    }
    out
}

fn render_limits(limits: &Limits) -> String {
    format!(
        "\nLimits:\n  questions per exam: {}\n  daily quota: {}\n  exams per user: {}\n",
        limits.max_questions, limits.daily_quota, limits.max_sessions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::catalog_of;

    #[test]
    fn test_render_overview() {
        let catalog = catalog_of(&[
            ("matematica", None, 2),
            ("linguagens", Some("ingles"), 1),
        ]);
        let out = render_overview(&catalog);
        assert!(out.starts_with("3 questions\n"));
        assert!(out.contains("  matematica: 2\n"));
        assert!(out.contains("  linguagens: 1\n"));
        assert!(out.contains("Languages:\n  ingles: 1\n"));
        assert!(out.contains("  2023: 3\n"));
    }

    #[test]
    fn test_render_limits() {
        let out = render_limits(&Limits::default());
        assert!(out.contains("  questions per exam: 180\n"));
        assert!(out.contains("  daily quota: 450\n"));
        assert!(out.contains("  exams per user: 10\n"));
    }
}
