//! Line-based terminal prompts.
//!
//! Questions are written to the output stream and answered one line each.
//! Choice questions take a list number or the choice value itself; file
//! choices also accept any path. A blank line is passed through as an
//! empty answer so the engine asks again.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use colored::Colorize;

use sitekit_core::{Answer, Answers, Choice, Question, QuestionKind};

/// Longest choice label printed as-is.
const MAX_LABEL: usize = 83;
/// Length a longer label is cut to before the ellipsis.
const CUT_LABEL: usize = 80;

/// Keep long site labels on one terminal line.
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL {
        let cut: String = label.chars().take(CUT_LABEL).collect();
        format!("{cut}...")
    } else {
        label.to_string()
    }
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn ask_all(&mut self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::new();
        for question in questions {
            let answer = self.ask(question)?;
            answers.insert(question.name(), answer);
        }
        Ok(answers)
    }

    fn ask(&mut self, question: &Question) -> Result<Answer> {
        let choices = question.choices().unwrap_or_default();
        if question.kind() == QuestionKind::SingleChoice && choices.is_empty() {
            bail!("nothing to choose from for {}", question.name());
        }

        if question.kind().has_choices() {
            self.list_choices(choices)?;
        }

        loop {
            let line = self.read_answer(question)?;
            match resolve(question.kind(), choices, &line) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.output, "{}", format!("'{line}' is not one of the choices").red())?,
            }
        }
    }

    fn list_choices(&mut self, choices: &[Choice]) -> Result<()> {
        if choices.is_empty() {
            writeln!(self.output, "  (none found; type a path)")?;
        }
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {}", i + 1, truncate_label(&choice.name))?;
        }
        Ok(())
    }

    fn read_answer(&mut self, question: &Question) -> Result<String> {
        let hint = match question.kind() {
            QuestionKind::MultiChoice => " (comma-separated)".to_string(),
            _ => question
                .default_value()
                .filter(|_| question.kind() == QuestionKind::Input)
                .map(|d| format!(" ({d})"))
                .unwrap_or_default(),
        };
        write!(self.output, "{} {}{}: ", "?".green().bold(), question.message().bold(), hint)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            bail!("input closed while waiting for {}", question.name());
        }
        Ok(line.trim().to_string())
    }
}

/// Map a typed line onto an answer, or `None` when it names no choice.
fn resolve(kind: QuestionKind, choices: &[Choice], line: &str) -> Option<Answer> {
    match kind {
        QuestionKind::Input | QuestionKind::Password => Some(Answer::Text(line.to_string())),
        _ if line.is_empty() => Some(match kind {
            QuestionKind::MultiChoice => Answer::Selection(Vec::new()),
            _ => Answer::Text(String::new()),
        }),
        QuestionKind::SingleChoice => pick(choices, line).map(Answer::Text),
        QuestionKind::FileChoice => Some(Answer::Text(
            pick(choices, line).unwrap_or_else(|| line.to_string()),
        )),
        QuestionKind::MultiChoice => line
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| pick(choices, item))
            .collect::<Option<Vec<_>>>()
            .map(Answer::Selection),
    }
}

/// A 1-based list number or an exact choice value.
fn pick(choices: &[Choice], item: &str) -> Option<String> {
    if let Ok(n) = item.parse::<usize>() {
        if let Some(choice) = n.checked_sub(1).and_then(|i| choices.get(i)) {
            return Some(choice.value.clone());
        }
    }
    choices
        .iter()
        .find(|c| c.value == item)
        .map(|c| c.value.clone())
}
