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

use clap::ValueEnum;
use simulado_core::Fallible;
use simulado_core::QuestionId;
use simulado_core::ScoreSummary;

use crate::collection::Collection;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum ResultFormat {
    /// A plain text table.
    Text,
    /// JSON, for other programs.
    Json,
}

impl Display for ResultFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultFormat::Text => write!(f, "text"),
            ResultFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_result(
    directory: Option<String>,
    session_id: i64,
    format: ResultFormat,
    with_answers: bool,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let summary = collection.exams.compute_result(session_id)?;
    let answers = if with_answers {
        let mut answers: Vec<(QuestionId, String)> =
            collection.exams.answers(session_id)?.into_iter().collect();
        answers.sort();
        Some(answers)
    } else {
        None
    };
    match format {
        ResultFormat::Text => {
            print!("{}", render_text(&summary));
            if let Some(answers) = &answers {
                println!();
                for (question_id, answer) in answers {
                    println!("{question_id:>6}  {answer}");
                }
            }
        }
        ResultFormat::Json => {
            let mut value = serde_json::to_value(&summary)?;
            if let (Some(answers), Some(object)) = (&answers, value.as_object_mut()) {
                let answers: serde_json::Map<String, serde_json::Value> = answers
                    .iter()
                    .map(|(id, answer)| (id.to_string(), answer.clone().into()))
                    .collect();
                object.insert("answers".to_string(), answers.into());
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

pub fn print_points(directory: Option<String>, user: &str) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let points = collection.exams.points(user)?;
    println!("{user}: {points} points");
    Ok(())
}

pub fn render_text(summary: &ScoreSummary) -> String {
    let width = summary
        .areas
        .iter()
        .map(|a| a.area.chars().count())
        .chain(std::iter::once("Total".len()))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$}  {:>5}  {:>8}  {:>7}  {:>7}\n",
        "Area", "Total", "Answered", "Correct", "%"
    ));
    for area in &summary.areas {
        out.push_str(&format!(
            "{:<width$}  {:>5}  {:>8}  {:>7}  {:>7.2}\n",
            area.area, area.total, area.answered, area.correct, area.percentage
        ));
    }
    out.push_str(&format!(
        "{:<width$}  {:>5}  {:>8}  {:>7}  {:>7.2}\n",
        "Total", summary.total, summary.answered, summary.correct, summary.percentage
    ));
    out
}
