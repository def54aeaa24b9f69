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

use std::fs::read_to_string;
use std::path::Path;

use simulado_core::Catalog;
use simulado_core::ExamError;
use simulado_core::Skipped;
use walkdir::WalkDir;

/// Load every `*.json` question record under `directory` into a catalog.
///
/// Files that cannot be read or parsed are skipped with a warning. Only a
/// missing or unreadable root is an error.
pub fn load_catalog(directory: &Path) -> Result<Catalog, ExamError> {
    if !directory.is_dir() {
        return Err(ExamError::LoadError(format!(
            "'{}' is not a directory",
            directory.display()
        )));
    }

    let mut records: Vec<(String, String)> = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ExamError::LoadError(e.to_string()));
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let unique_id = relative_id(directory, path);
        match read_to_string(path) {
            Ok(text) => records.push((unique_id, text)),
            Err(e) => log::warn!("Skipping {unique_id}: {e}"),
        }
    }

    let (catalog, skipped) = Catalog::parse(records.iter().map(|(p, t)| (p.as_str(), t.as_str())));
    for Skipped { unique_id, reason } in skipped {
        log::warn!("Skipping {unique_id}: {reason}");
    }
    log::debug!(
        "Loaded {} questions from {}",
        catalog.len(),
        directory.display()
    );
    Ok(catalog)
}

/// The path of `path` relative to `root`, with `/` separators on every
/// platform.
fn relative_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<String>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use simulado_core::Fallible;
    use simulado_core::QuestionId;

    use super::*;
    use crate::helper::create_tmp_directory;
    use crate::helper::question_json;
    use crate::helper::write_corpus;

    #[test]
    fn test_load_tree() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        write_corpus(
            dir.path(),
            &[("matematica", None, 3), ("linguagens", Some("espanhol"), 2)],
        )?;
        let catalog = load_catalog(dir.path())?;
        assert_eq!(catalog.len(), 5);
        let question = catalog.by_unique_id("2022/matematica/1.json")?;
        assert_eq!(question.id, QuestionId::new(1));
        assert_eq!(question.year, 2022);
        let spanish = catalog.filter(&[], &["ESPANHOL".to_string()]);
        assert_eq!(spanish.len(), 2);
        Ok(())
    }

    #[test]
    fn test_bad_files_are_skipped() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        write_corpus(dir.path(), &[("historia", None, 2)])?;
        let nested = dir.path().join("2021").join("broken");
        create_dir_all(&nested)?;
        write(nested.join("truncated.json"), "{ \"id\": 99, \"year\": ")?;
        write(nested.join("notes.txt"), "not a question")?;
        // Same id as an existing question.
        write(nested.join("dup.json"), question_json(1, "historia", None, 2021))?;

        let catalog = load_catalog(dir.path())?;
        assert_eq!(catalog.len(), 2);
        assert!(catalog.by_unique_id("2021/broken/truncated.json").is_err());
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_a_load_error() {
        let result = load_catalog(Path::new("./does-not-exist-anywhere"));
        assert!(matches!(result, Err(ExamError::LoadError(_))));
    }

    #[test]
    fn test_relative_id() {
        let root = Path::new("/corpus");
        assert_eq!(
            relative_id(root, Path::new("/corpus/2020/fisica/7.json")),
            "2020/fisica/7.json"
        );
    }
}
