//! Folding prompt answers into a new [`WorkflowState`].
//!
//! Answers are normalised before they land. An echoed default or a value
//! that does not parse for its field clears the field, so the engine asks
//! again. A blank string, an empty selection, or no answer at all leaves
//! whatever the field already held.

use std::collections::BTreeMap;

use crate::types::{Field, Question, SettingKind, WorkflowState};

/// Raw input collected by a front-end for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Selection(Vec<String>),
}

/// Answers keyed by the field each question asked for.
pub type Answers = BTreeMap<Field, Answer>;

impl WorkflowState {
    /// Return the state that results from answering `questions` with `answers`.
    ///
    /// Only fields named by `questions` are touched. `self` is left as is.
    pub fn with_answers(&self, questions: &[Question], answers: &Answers) -> WorkflowState {
        let mut next = self.clone();
        for question in questions {
            let reply = answers
                .get(&question.name())
                .map_or(Reply::Skipped, |answer| normalize(question, answer));
            if let Reply::Given(answer) = reply {
                next.assign(question.name(), answer);
            }
        }
        next
    }

    fn assign(&mut self, field: Field, answer: Option<Answer>) {
        match field {
            Field::Task => {
                self.task = answer
                    .as_ref()
                    .and_then(single_text)
                    .and_then(|t| t.parse().ok());
            }
            Field::Settings => {
                self.settings = answer.as_ref().and_then(parse_settings);
            }
            _ => {
                let value = answer.as_ref().and_then(single_text).map(str::to_string);
                match field {
                    Field::UserKey => self.user_key = value,
                    Field::UserSecret => self.user_secret = value,
                    Field::PartnerId => self.partner_id = value,
                    Field::SourceApiKey => self.source_api_key = value,
                    Field::SourceFile => self.source_file = value,
                    Field::DestinationApiKey => self.destination_api_key = value,
                    Field::Task | Field::Settings => {}
                }
            }
        }
    }
}

/// What one answer does to its field.
enum Reply {
    /// Nothing typed: the field keeps its value.
    Skipped,
    /// Overwrite the field; `None` clears it.
    Given(Option<Answer>),
}

fn normalize(question: &Question, answer: &Answer) -> Reply {
    match answer {
        Answer::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                Reply::Skipped
            } else if question.default_value() == Some(text) {
                Reply::Given(None)
            } else {
                Reply::Given(Some(Answer::Text(text.to_string())))
            }
        }
        Answer::Selection(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            if items.is_empty() {
                Reply::Skipped
            } else {
                Reply::Given(Some(Answer::Selection(items)))
            }
        }
    }
}

fn single_text(answer: &Answer) -> Option<&str> {
    match answer {
        Answer::Text(text) => Some(text),
        Answer::Selection(items) if items.len() == 1 => Some(&items[0]),
        Answer::Selection(_) => None,
    }
}

fn parse_settings(answer: &Answer) -> Option<Vec<SettingKind>> {
    let kinds = match answer {
        Answer::Text(text) => SettingKind::parse_list(text).ok()?,
        Answer::Selection(items) => items
            .iter()
            .map(|item| item.parse())
            .collect::<Result<Vec<SettingKind>, _>>()
            .ok()?,
    };
    let mut unique = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }
    (!unique.is_empty()).then_some(unique)
}
