//! The per-page controller: a page's state bag, its optional event
//! handler run, and the render of the bag into a `Response`.

use std::path::Path;

use kstring::KString;
use tracing::{debug, warn};

use crate::acontext::{DictionarySource, PageContext};
use crate::config::SITE_NAME;
use crate::datamap::DataMap;
use crate::error::PageError;
use crate::event::{EventOutcome, EventScope, EventTable, ValidationErrors};
use crate::language::Language;
use crate::pages::PageId;
use crate::render::{Layer, RenderData, RenderEngine};
use crate::response::Response;
use crate::webutils::{html_escape, html_escape_inert};

/// The selector full page content goes into, unless the page says
/// otherwise.
pub const CONTENT_TARGET: &str = "#content";

/// What a page and its event handler build up during a request.
#[derive(Debug, Clone, Default)]
pub struct MainState {
    /// What an event handler reports, e.g. a `status` text over the
    /// page's default message. Outranks `messages`, is outranked by
    /// `data`: a handler that changes values `prepare` put into
    /// `data` updates them there.
    pub fields: DataMap,
    /// Status messages (already translated or dictionary tokens).
    pub messages: DataMap,
    /// Page data.
    pub data: DataMap,
    pub response: Response,
}

impl MainState {
    pub fn new() -> Self {
        let mut state = MainState::default();
        state.response.set_show(true).set_in(CONTENT_TARGET);
        state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    Public,
    User,
    Admin,
}

/// One page of the site. Implementations are stateless; everything
/// per request lives in `MainState` and `PageContext`.
pub trait Page: Send + Sync {
    fn id(&self) -> PageId;

    /// Path relative to the template store.
    fn template(&self) -> &str;

    fn access(&self) -> AccessLevel {
        AccessLevel::Public
    }

    /// Shared fragments first, then the page's own file, so that the
    /// page can override shared entries.
    fn dictionary_sources(&self, dictionary_dir: &Path) -> Vec<DictionarySource> {
        vec![
            DictionarySource::Dir(dictionary_dir.join("common")),
            DictionarySource::File(
                dictionary_dir.join("pages").join(format!("{}.json", self.id().as_str()))),
        ]
    }

    fn events(&self) -> &EventTable;

    /// Fill in the page data; runs before any event handler.
    fn prepare(&self, _main: &mut MainState, _context: &PageContext) -> Result<(), PageError> {
        Ok(())
    }
}

pub struct MainController<'p> {
    page: &'p dyn Page,
    state: MainState,
    outcome: EventOutcome,
    invalid: Option<ValidationErrors>,
}

impl<'p> MainController<'p> {
    /// Prepare the page and run the event handler, if the request
    /// carries an event the page knows.
    pub fn construct(page: &'p dyn Page, context: &mut PageContext) -> Result<Self, PageError> {
        let mut state = MainState::new();
        page.prepare(&mut state, context)?;
        let mut invalid = None;
        let outcome = match context.event().cloned() {
            None => EventOutcome::NoEvent,
            Some(request) => {
                let name = KString::from_ref(request.name());
                match page.events().get(&name) {
                    None => {
                        warn!("page {:?}: no handler for event {name:?}", page.id());
                        EventOutcome::Ignored(name)
                    }
                    Some(handler) => {
                        state.response.set_event(name.as_str());
                        let mut scope = EventScope {
                            main: &mut state,
                            request: &request,
                            context,
                        };
                        match handler(&mut scope) {
                            Ok(()) => (),
                            Err(PageError::Validation(errors)) => {
                                debug!("event {name:?}: {errors}");
                                invalid = Some(errors);
                            }
                            Err(e) => return Err(e),
                        }
                        EventOutcome::Executed(name)
                    }
                }
            }
        };
        Ok(MainController { page, state, outcome, invalid })
    }

    pub fn outcome(&self) -> &EventOutcome {
        &self.outcome
    }

    pub fn state(&self) -> &MainState {
        &self.state
    }

    /// The render data for this page, all layers filled.
    pub fn render_data(&self, context: &PageContext) -> RenderData {
        let mut data = RenderData::new();
        data.extend(Layer::Inputs, &context.inputs())
            .extend(Layer::Messages, &self.state.messages)
            .extend(Layer::EventFields, &self.state.fields)
            .extend(Layer::Data, &self.state.data)
            .extend(Layer::Dictionary, context.dictionary().entries())
            .extend(Layer::Control, &control_values(self.page.id(), context));
        data
    }

    pub fn process(self, context: &PageContext, engine: &RenderEngine) -> Response {
        if let Some(errors) = &self.invalid {
            return validation_response(errors, context);
        }
        if self.state.response.is_complete_non_html() {
            return self.state.response
        }
        let html = engine.render(self.page.template(), &self.render_data(context));
        let mut response = self.state.response;
        response.set_html(html);
        response
    }
}

/// Values every template may use; they override all other layers.
pub fn control_values(page: PageId, context: &PageContext) -> DataMap {
    let site_name = context.config().lookup_string(SITE_NAME)
        .unwrap_or_else(|| "pagehost".into());
    DataMap::new()
        .with("nonce", context.nonce())
        .with("lang", context.lang().as_str())
        .with("page", page.as_str())
        .with("path", html_escape_inert(context.path()).into_owned())
        .with("site-name", html_escape(&site_name).into_owned())
        .with("user", html_escape_inert(context.user().unwrap_or("")).into_owned())
}

pub fn validation_response(errors: &ValidationErrors, context: &PageContext) -> Response {
    let mut response = Response::new();
    response.set_json(errors.to_payload(|key| context.text(key)))
        .set_error(true)
        .set_show(true)
        .set_type_target("form");
    response
}
