//! The logged in user's start page; lets them pick the language.

use itertools::Itertools;

use crate::acontext::PageContext;
use crate::controller::{AccessLevel, MainState, Page};
use crate::error::PageError;
use crate::event::{EventScope, EventTable, ValidationErrors};
use crate::lang_en_de::Lang;
use crate::language::Language;
use crate::pages::PageId;
use crate::webutils::html_escape;

pub struct DashboardPage {
    events: EventTable,
}

impl DashboardPage {
    pub fn new() -> Self {
        DashboardPage {
            events: EventTable::new().on("set-language", set_language),
        }
    }
}

/// `<option>` elements for the language switcher, the active one
/// selected.
fn language_options(context: &PageContext) -> String {
    let active = context.lang();
    Lang::members()
        .map(|lang| {
            let code = lang.as_str();
            let selected = if lang == active { " selected" } else { "" };
            let label = html_escape(&context.text(&format!("language-{code}"))).into_owned();
            format!("<option value=\"{code}\"{selected}>{label}</option>")
        })
        .join("")
}

impl Page for DashboardPage {
    fn id(&self) -> PageId { PageId::Dashboard }
    fn template(&self) -> &str { "dashboard.html" }
    fn access(&self) -> AccessLevel { AccessLevel::User }
    fn events(&self) -> &EventTable { &self.events }

    fn prepare(&self, main: &mut MainState, context: &PageContext) -> Result<(), PageError> {
        main.messages.insert("status", "");
        main.data.insert("language-options", language_options(context));
        Ok(())
    }
}

fn set_language(scope: &mut EventScope<'_>) -> Result<(), PageError> {
    let request = scope.request;
    let mut errors = ValidationErrors::new();
    let Some(code) = request.required("language", &mut errors) else {
        return Err(errors.into())
    };
    let Some(lang) = Lang::maybe_from_start(code) else {
        errors.add("language", "error-unknown-language");
        return Err(errors.into())
    };
    scope.context.session_mut().lang = Some(lang.as_str().into());
    scope.context.reload_dictionary();
    let status = scope.context.text("language-changed");
    scope.main.fields.insert("status", status);
    scope.main.data.insert("language-options", language_options(scope.context));
    Ok(())
}
