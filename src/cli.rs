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

use clap::Parser;
use simulado_core::Fallible;

use crate::cmd::check::check_collection;
use crate::cmd::result::ResultFormat;
use crate::cmd::result::print_points;
use crate::cmd::result::print_result;
use crate::cmd::session::CreateArgs;
use crate::cmd::session::answer_question;
use crate::cmd::session::create_session;
use crate::cmd::session::draw_questions;
use crate::cmd::session::elapsed;
use crate::cmd::session::finalize_session;
use crate::cmd::session::list_sessions;
use crate::cmd::session::show_question;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Load the question corpus and report what it contains.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Draw a balanced set of questions without creating an exam. Counts against the daily quota.
    Draw {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The user to draw questions for.
        #[arg(long)]
        user: String,
        /// A discipline to draw questions from. Repeat for several.
        #[arg(long = "discipline")]
        disciplines: Vec<String>,
        /// A language track to draw questions from. Repeat for several.
        #[arg(long = "language")]
        languages: Vec<String>,
        /// How many questions to draw.
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Create a practice exam.
    Create {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The user who owns the exam.
        #[arg(long)]
        user: String,
        /// A name for the exam. Truncated to the configured length.
        #[arg(long, default_value = "Simulado")]
        name: String,
        /// A discipline to draw questions from. Repeat for several.
        #[arg(long = "discipline")]
        disciplines: Vec<String>,
        /// A language track to draw questions from. Repeat for several.
        #[arg(long = "language")]
        languages: Vec<String>,
        /// Only draw questions from this year. Repeat for several. By default, all years are used.
        #[arg(long = "year")]
        years: Vec<u16>,
        /// How many questions to draw.
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// List a user's exams, newest first.
    List {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The user whose exams to list.
        #[arg(long)]
        user: String,
    },
    /// Show a question of an exam. Past the last question, the exam is finalized and scored.
    Show {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        session: i64,
        /// Zero-based question position.
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    /// Answer a question of an exam.
    Answer {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        session: i64,
        #[arg(long)]
        question: i64,
        /// The letter of the chosen alternative.
        #[arg(long)]
        answer: String,
    },
    /// Show or set the time spent on an exam.
    Elapsed {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        session: i64,
        /// Set the elapsed time, in seconds.
        #[arg(long, allow_negative_numbers = true)]
        set: Option<i64>,
    },
    /// Finalize an exam and award its points.
    Finalize {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        session: i64,
    },
    /// Print the results of an exam.
    Result {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        session: i64,
        /// Which output format to use.
        #[arg(long, default_value_t = ResultFormat::Text)]
        format: ResultFormat,
        /// Also list the saved answers, by question.
        #[arg(long)]
        answers: bool,
    },
    /// Print a user's point balance.
    Points {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The user whose points to print.
        #[arg(long)]
        user: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Check { directory } => check_collection(directory),
        Command::Draw {
            directory,
            user,
            disciplines,
            languages,
            count,
        } => draw_questions(directory, &user, &disciplines, &languages, count),
        Command::Create {
            directory,
            user,
            name,
            disciplines,
            languages,
            years,
            count,
        } => create_session(
            directory,
            CreateArgs {
                user,
                name,
                disciplines,
                languages,
                years,
                count,
            },
        ),
        Command::List { directory, user } => list_sessions(directory, &user),
        Command::Show {
            directory,
            session,
            index,
        } => show_question(directory, session, index),
        Command::Answer {
            directory,
            session,
            question,
            answer,
        } => answer_question(directory, session, question, &answer),
        Command::Elapsed {
            directory,
            session,
            set,
        } => elapsed(directory, session, set),
        Command::Finalize { directory, session } => finalize_session(directory, session),
        Command::Result {
            directory,
            session,
            format,
            answers,
        } => print_result(directory, session, format, answers),
        Command::Points { directory, user } => print_points(directory, &user),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Command::command().debug_assert();
    }

    #[test]
    fn test_every_user_flag_is_documented() {
        let cli = Command::command();
        for sub in cli.get_subcommands() {
            if let Some(user) = sub.get_arguments().find(|a| a.get_id() == "user") {
                assert!(
                    user.get_help().is_some(),
                    "--user of `{}` has no help text",
                    sub.get_name()
                );
            }
        }
    }
}
