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

use std::env::current_dir;
use std::path::PathBuf;
use std::sync::Arc;

use simulado_core::Fallible;
use simulado_core::fail;

use crate::config::Config;
use crate::corpus::load_catalog;
use crate::db::Database;
use crate::exams::Exams;

/// The name of the database file in a collection directory.
pub const DATABASE_FILE: &str = "simulado.db";

/// A collection directory: the question corpus, its configuration and the
/// session database.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub exams: Exams,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory = directory.canonicalize()?;
        let config = Config::load(&directory)?;
        log::debug!("Using limits {:?}", config.limits);
        let catalog = load_catalog(&directory)?;
        let db = Database::new(&directory.join(DATABASE_FILE))?;
        log::debug!("Opened collection at {}", directory.display());
        let exams = Exams::new(Arc::new(catalog), db, config.limits);
        Ok(Collection {
            directory,
            config,
            exams,
        })
    }
}
