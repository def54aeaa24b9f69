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

use chrono::Duration;
use simulado_core::ExamError;
use simulado_core::ExamSession;
use simulado_core::Fallible;
use simulado_core::NewSession;
use simulado_core::QuestionId;
use simulado_core::SessionId;
use simulado_core::fail;

use crate::cmd::result::render_text;
use crate::collection::Collection;
use crate::exams::SessionQuestion;

pub struct CreateArgs {
    pub user: String,
    pub name: String,
    pub disciplines: Vec<String>,
    pub languages: Vec<String>,
    pub years: Vec<u16>,
    pub count: usize,
}

pub fn draw_questions(
    directory: Option<String>,
    user: &str,
    disciplines: &[String],
    languages: &[String],
    count: usize,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let questions = collection
        .exams
        .select_balanced(disciplines, languages, count, user)?;
    if questions.is_empty() {
        println!("No questions match.");
    }
    for question in &questions {
        println!(
            "{:>6}  {:<16}  {}  {}",
            question.id,
            question.area(),
            question.year,
            question.title
        );
    }
    let used = collection.exams.quota_used(user)?;
    let quota = collection.exams.limits().daily_quota;
    println!("{user} has received {used} of {quota} questions today.");
    Ok(())
}

pub fn create_session(directory: Option<String>, args: CreateArgs) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let session = collection.exams.create_session(NewSession {
        owner_id: args.user,
        name: args.name,
        disciplines: args.disciplines,
        languages: args.languages,
        years: args.years,
        count: args.count,
    })?;
    let linked = collection.exams.session_questions(session.id)?.len();
    println!(
        "Created session {} ('{}') with {linked} of {} requested questions.",
        session.id, session.name, session.requested_count
    );
    Ok(())
}

pub fn list_sessions(directory: Option<String>, user: &str) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let sessions = collection.exams.list_sessions(user)?;
    if sessions.is_empty() {
        println!("No sessions.");
    }
    for session in &sessions {
        println!("{}", render_session_line(session));
    }
    Ok(())
}

pub fn show_question(directory: Option<String>, session_id: SessionId, index: usize) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    match collection.exams.question_at(session_id, index) {
        Ok(question) => {
            print!("{}", render_question(&question));
            Ok(())
        }
        Err(ExamError::OutOfRange { .. }) => {
            // Past the last question: the exam is over.
            collection.exams.finalize(session_id)?;
            println!("Exam complete.\n");
            print!("{}", render_text(&collection.exams.compute_result(session_id)?));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn answer_question(
    directory: Option<String>,
    session_id: SessionId,
    question_id: i64,
    answer: &str,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let correct =
        collection
            .exams
            .record_answer(session_id, QuestionId::new(question_id), answer)?;
    println!("{}", if correct { "Correct." } else { "Incorrect." });
    Ok(())
}

pub fn elapsed(directory: Option<String>, session_id: SessionId, set: Option<i64>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    if let Some(seconds) = set {
        let Some(duration) = Duration::try_seconds(seconds) else {
            return fail(format!("elapsed time out of range: {seconds} seconds"));
        };
        collection.exams.set_elapsed(session_id, duration)?;
    }
    match collection.exams.elapsed(session_id)? {
        Some(elapsed) => println!("{}", format_duration(elapsed)),
        None => println!("No time recorded."),
    }
    Ok(())
}

pub fn finalize_session(directory: Option<String>, session_id: SessionId) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    if collection.exams.finalize(session_id)? {
        let owner = collection.exams.get_session(session_id)?.owner_id;
        let points = collection.exams.points(&owner)?;
        println!("Session {session_id} finalized. {owner} now has {points} points.");
    } else {
        println!("Session {session_id} was already finalized.");
    }
    Ok(())
}

fn render_session_line(session: &ExamSession) -> String {
    let elapsed = session
        .elapsed
        .map(format_duration)
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>4}  {}  {:<30}  {:>3} questions  {:<11}  {}",
        session.id,
        session.created_at,
        session.name,
        session.requested_count,
        session.state,
        elapsed
    )
}

fn render_question(q: &SessionQuestion) -> String {
    let question = &q.question;
    let mut out = format!(
        "Question {} of {} (id {}, {} {})\n",
        q.position + 1,
        q.total,
        question.id,
        question.area(),
        question.year
    );
    if !question.title.is_empty() {
        out.push_str(&format!("{}\n", question.title));
    }
    if !question.context.is_empty() {
        out.push_str(&format!("\n{}\n", question.context));
    }
    for file in &question.files {
        out.push_str(&format!("[{file}]\n"));
    }
    if !question.alternatives_introduction.is_empty() {
        out.push_str(&format!("\n{}\n", question.alternatives_introduction));
    }
    out.push('\n');
    for alternative in &question.alternatives {
        let marker = match &q.saved_answer {
            Some(answer) if answer.eq_ignore_ascii_case(&alternative.letter) => "*",
            _ => " ",
        };
        out.push_str(&format!(
            "{marker} {}) {}\n",
            alternative.letter, alternative.text
        ));
    }
    out.push_str(&format!("\nAnswered: {} of {}\n", q.answered.len(), q.total));
    out
}

/// Format a duration as `HH:MM:SS`.
fn format_duration(d: Duration) -> String {
    let total = d.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
