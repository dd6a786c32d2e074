//! Questions the engine asks, one builder per readiness gap.

use sitekit_core::{Choice, Field, PartnerSites, Question, SettingKind, Site, Task, View, WorkflowState};

/// Above this many partners the listing is assumed truncated by the
/// platform, so the operator types the ID instead of picking one.
pub const MAX_LISTED_PARTNERS: usize = 10;

pub fn credentials(state: &WorkflowState) -> View {
    View::Prompt {
        questions: vec![
            Question::input(Field::UserKey, "Gigya user key").with_default(state.user_key.clone()),
            Question::password(Field::UserSecret, "Gigya user secret")
                .with_default(state.user_secret.clone()),
        ],
    }
}

pub fn partner(partners: &[PartnerSites]) -> View {
    const MESSAGE: &str = "Gigya partner ID";
    if (2..=MAX_LISTED_PARTNERS).contains(&partners.len()) {
        let choices = partners
            .iter()
            .map(|p| Choice::plain(p.partner_id.clone()))
            .collect();
        View::prompt(Question::single_choice(Field::PartnerId, MESSAGE, choices))
    } else {
        View::prompt(Question::input(Field::PartnerId, MESSAGE))
    }
}

pub fn task() -> View {
    let choices = Task::all()
        .iter()
        .map(|t| Choice::new(t.label(), t.token()))
        .collect();
    View::prompt(Question::single_choice(Field::Task, "Task", choices))
}

/// Multi-choice, or single-choice when the task works on one kind at a time.
pub fn settings(single: bool) -> View {
    let choices = SettingKind::all()
        .iter()
        .map(|k| Choice::new(k.label(), k.token()))
        .collect();
    if single {
        View::prompt(Question::single_choice(Field::Settings, "Setting", choices))
    } else {
        View::prompt(Question::multi_choice(Field::Settings, "Settings", choices))
    }
}

pub fn source_site(sites: &[Site]) -> View {
    View::prompt(Question::single_choice(
        Field::SourceApiKey,
        "Source site",
        site_choices(sites),
    ))
}

pub fn destination_site(sites: &[Site]) -> View {
    View::prompt(Question::single_choice(
        Field::DestinationApiKey,
        "Destination site",
        site_choices(sites),
    ))
}

pub fn source_file(files: Vec<String>) -> View {
    View::prompt(Question::file_choice(Field::SourceFile, "Settings file", files))
}

fn site_choices(sites: &[Site]) -> Vec<Choice> {
    sites
        .iter()
        .map(|site| Choice::new(site.label(), site.api_key.clone()))
        .collect()
}
