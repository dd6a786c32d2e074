//! Domain types for the settings workflow.
//!
//! Everything here is plain data. Serialized names are camelCase so the same
//! values travel unchanged through CLI flags, resume tokens and JSON output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// A named category of remote configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    Schema,
    Screensets,
    Policies,
}

impl SettingKind {
    /// Every kind, in the order they are offered to the operator.
    pub fn all() -> &'static [SettingKind] {
        &[
            SettingKind::Schema,
            SettingKind::Screensets,
            SettingKind::Policies,
        ]
    }

    /// Stable token used in flags, file names and serialized state.
    pub fn token(self) -> &'static str {
        match self {
            SettingKind::Schema => "schema",
            SettingKind::Screensets => "screensets",
            SettingKind::Policies => "policies",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            SettingKind::Schema => "Schema",
            SettingKind::Screensets => "Screen-sets",
            SettingKind::Policies => "Policies",
        }
    }

    /// Parse a comma-separated list such as `schema,policies`.
    ///
    /// Blank entries are skipped; an unknown token fails the whole list.
    pub fn parse_list(s: &str) -> Result<Vec<SettingKind>, ParseError> {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(SettingKind::from_str)
            .collect()
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for SettingKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schema" => Ok(SettingKind::Schema),
            "screensets" | "screen-sets" => Ok(SettingKind::Screensets),
            "policies" => Ok(SettingKind::Policies),
            other => Err(ParseError::UnknownValue {
                what: "setting",
                value: other.to_string(),
                expected: "schema, screensets, policies",
            }),
        }
    }
}

/// What the operator wants to do with the selected settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Export,
    Import,
    Copy,
    Validate,
}

impl Task {
    pub fn all() -> &'static [Task] {
        &[Task::Export, Task::Import, Task::Copy, Task::Validate]
    }

    pub fn token(self) -> &'static str {
        match self {
            Task::Export => "export",
            Task::Import => "import",
            Task::Copy => "copy",
            Task::Validate => "validate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Task::Export => "Export settings to files",
            Task::Import => "Import a setting from a file",
            Task::Copy => "Copy settings between sites",
            Task::Validate => "Compare settings between sites",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Task {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "export" => Ok(Task::Export),
            "import" => Ok(Task::Import),
            "copy" => Ok(Task::Copy),
            "validate" => Ok(Task::Validate),
            other => Err(ParseError::UnknownValue {
                what: "task",
                value: other.to_string(),
                expected: "export, import, copy, validate",
            }),
        }
    }
}

/// A workflow state field that a question can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    UserKey,
    UserSecret,
    PartnerId,
    Task,
    Settings,
    SourceApiKey,
    SourceFile,
    DestinationApiKey,
}

impl Field {
    /// The camelCase name shared by the CLI flag and the serialized state.
    pub fn key(self) -> &'static str {
        match self {
            Field::UserKey => "userKey",
            Field::UserSecret => "userSecret",
            Field::PartnerId => "partnerId",
            Field::Task => "task",
            Field::Settings => "settings",
            Field::SourceApiKey => "sourceApiKey",
            Field::SourceFile => "sourceFile",
            Field::DestinationApiKey => "destinationApiKey",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Workflow state
// ---------------------------------------------------------------------------

/// Everything the operator has supplied so far.
///
/// Front-ends own this value. The engine only borrows it; new input is folded
/// in with [`WorkflowState::with_answers`], which returns a fresh state.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub settings: Option<Vec<SettingKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub finished: bool,
}

impl WorkflowState {
    /// Both credential halves, if both are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.user_key, &self.user_secret) {
            (Some(key), Some(secret)) => Some(Credentials::new(key.clone(), secret.clone())),
            _ => None,
        }
    }

    /// Textual value of a field, in the form a CLI flag would accept.
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::UserKey => self.user_key.clone(),
            Field::UserSecret => self.user_secret.clone(),
            Field::PartnerId => self.partner_id.clone(),
            Field::Task => self.task.map(|t| t.token().to_string()),
            Field::Settings => self.settings.as_ref().map(|kinds| {
                kinds
                    .iter()
                    .map(|k| k.token())
                    .collect::<Vec<_>>()
                    .join(",")
            }),
            Field::SourceApiKey => self.source_api_key.clone(),
            Field::SourceFile => self.source_file.clone(),
            Field::DestinationApiKey => self.destination_api_key.clone(),
        }
    }

    /// Copy of the state with the secret removed, safe to print or share.
    pub fn without_secret(&self) -> WorkflowState {
        WorkflowState {
            user_secret: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowState")
            .field("user_key", &self.user_key)
            .field("user_secret", &self.user_secret.as_ref().map(|_| "***"))
            .field("task", &self.task)
            .field("settings", &self.settings)
            .field("partner_id", &self.partner_id)
            .field("source_api_key", &self.source_api_key)
            .field("source_file", &self.source_file)
            .field("destination_api_key", &self.destination_api_key)
            .field("finished", &self.finished)
            .finish()
    }
}

/// `settings` arrives either as one token (single-select answers) or a list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<SettingKind>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(SettingKind),
        Many(Vec<SettingKind>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(kind)) => Some(vec![kind]),
        Some(OneOrMany::Many(kinds)) => Some(kinds),
    })
}

/// Platform credentials. The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_key: String,
    pub user_secret: String,
}

impl Credentials {
    pub fn new(user_key: impl Into<String>, user_secret: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            user_secret: user_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_key", &self.user_key)
            .field("user_secret", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Partners and sites
// ---------------------------------------------------------------------------

/// A site (API key) the operator can read from or write to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub api_key: String,
    #[serde(default)]
    pub base_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Site {
    /// `apiKey (baseDomain, description)`, description omitted when blank.
    pub fn label(&self) -> String {
        match self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(description) => format!("{} ({}, {})", self.api_key, self.base_domain, description),
            None => format!("{} ({})", self.api_key, self.base_domain),
        }
    }
}

/// A partner account and the sites it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerSites {
    #[serde(rename = "partnerID", deserialize_with = "id_as_string")]
    pub partner_id: String,
    #[serde(default)]
    pub sites: Vec<Site>,
}

/// The platform reports partner IDs as numbers; the workflow treats them as text.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected partner ID string or number, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    Input,
    Password,
    SingleChoice,
    MultiChoice,
    FileChoice,
}

impl QuestionKind {
    pub fn has_choices(self) -> bool {
        matches!(
            self,
            QuestionKind::SingleChoice | QuestionKind::MultiChoice | QuestionKind::FileChoice
        )
    }
}

/// One selectable option: `name` is shown, `value` is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub value: String,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A choice whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value,
        }
    }
}

/// A single piece of input the engine still needs.
///
/// Built only through the kind-specific constructors, so `choices` is present
/// exactly when the kind is a choice kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    name: Field,
    kind: QuestionKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    choices: Option<Vec<Choice>>,
}

impl Question {
    fn new(name: Field, kind: QuestionKind, message: &str, choices: Option<Vec<Choice>>) -> Self {
        Self {
            name,
            kind,
            message: message.to_string(),
            default: None,
            choices,
        }
    }

    pub fn input(name: Field, message: &str) -> Self {
        Self::new(name, QuestionKind::Input, message, None)
    }

    pub fn password(name: Field, message: &str) -> Self {
        Self::new(name, QuestionKind::Password, message, None)
    }

    pub fn single_choice(name: Field, message: &str, choices: Vec<Choice>) -> Self {
        Self::new(name, QuestionKind::SingleChoice, message, Some(choices))
    }

    pub fn multi_choice(name: Field, message: &str, choices: Vec<Choice>) -> Self {
        Self::new(name, QuestionKind::MultiChoice, message, Some(choices))
    }

    pub fn file_choice(name: Field, message: &str, files: Vec<String>) -> Self {
        let choices = files.into_iter().map(Choice::plain).collect();
        Self::new(name, QuestionKind::FileChoice, message, Some(choices))
    }

    /// Attach a placeholder. Echoing it back counts as no answer.
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default.filter(|d| !d.is_empty());
        self
    }

    pub fn name(&self) -> Field {
        self.name
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn choices(&self) -> Option<&[Choice]> {
        self.choices.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Diff report
// ---------------------------------------------------------------------------

/// Which side(s) of a comparison a run of lines belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Present only in the destination.
    Added,
    /// Present only in the source.
    Removed,
    Unchanged,
}

/// A contiguous run of lines with the same [`DiffKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffPart {
    pub kind: DiffKind,
    /// Number of lines in the run.
    pub count: usize,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviated_value: Option<String>,
}

impl DiffPart {
    /// What a report should print: the abbreviation when there is one.
    pub fn display_value(&self) -> &str {
        self.abbreviated_value.as_deref().unwrap_or(&self.value)
    }
}

/// Line counts after pairing removals with additions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffCounts {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl DiffCounts {
    pub fn is_different(&self) -> bool {
        self.added > 0 || self.removed > 0 || self.changed > 0
    }
}

/// Comparison of one setting kind between source and destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDiff {
    pub setting: SettingKind,
    pub diff: Vec<DiffPart>,
    pub source_value: Value,
    pub destination_value: Value,
    pub is_different: bool,
    pub counts: DiffCounts,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// What a front-end should show after one workflow turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "params", rename_all = "camelCase")]
pub enum View {
    /// More input is needed; nothing was changed remotely.
    Prompt { questions: Vec<Question> },
    /// The requested action completed.
    Info { message: String },
    /// Comparison report for the validate task.
    #[serde(rename = "validate")]
    ValidateResult { diffs: Vec<SettingDiff> },
}

impl View {
    pub fn prompt(question: Question) -> Self {
        View::Prompt {
            questions: vec![question],
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        View::Info {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_kind_parses_aliases_and_lists() {
        assert_eq!("Screen-Sets".parse::<SettingKind>().unwrap(), SettingKind::Screensets);
        assert_eq!(
            SettingKind::parse_list("schema, policies,").unwrap(),
            vec![SettingKind::Schema, SettingKind::Policies]
        );
        assert!(SettingKind::parse_list("schema,bogus").is_err());
    }

    #[test]
    fn unknown_task_names_expected_values() {
        let err = "deploy".parse::<Task>().unwrap_err();
        assert!(err.to_string().contains("export, import, copy, validate"));
    }

    #[test]
    fn choices_present_only_for_choice_kinds() {
        let input = Question::input(Field::PartnerId, "Partner ID");
        assert!(input.choices().is_none());
        assert!(!input.kind().has_choices());

        let files = Question::file_choice(Field::SourceFile, "File", vec!["a.json".into()]);
        assert_eq!(files.choices().map(<[Choice]>::len), Some(1));
        assert!(files.kind().has_choices());
    }

    #[test]
    fn empty_default_is_dropped() {
        let q = Question::input(Field::UserKey, "User key").with_default(Some(String::new()));
        assert_eq!(q.default_value(), None);
    }

    #[test]
    fn state_accepts_single_setting_token() {
        let state: WorkflowState =
            serde_json::from_str(r#"{"task":"import","settings":"policies"}"#).unwrap();
        assert_eq!(state.settings, Some(vec![SettingKind::Policies]));
        assert_eq!(state.task, Some(Task::Import));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let state = WorkflowState {
            user_key: Some("key".into()),
            user_secret: Some("hunter2".into()),
            ..WorkflowState::default()
        };
        let printed = format!("{state:?} {:?}", state.credentials().unwrap());
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn partner_id_accepts_numbers() {
        let partners: Vec<PartnerSites> = serde_json::from_str(
            r#"[{"partnerID":12345,"sites":[{"apiKey":"3_abc","baseDomain":"example.com"}]}]"#,
        )
        .unwrap();
        assert_eq!(partners[0].partner_id, "12345");
        assert_eq!(partners[0].sites[0].label(), "3_abc (example.com)");
    }

    #[test]
    fn view_serializes_with_tag_and_params() {
        let json = serde_json::to_value(View::info("copy successful")).unwrap();
        assert_eq!(json["view"], "info");
        assert_eq!(json["params"]["message"], "copy successful");
    }
}
