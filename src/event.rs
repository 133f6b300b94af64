//! Named user actions and the handlers registered for them.
//!
//! A request carrying an `event` parameter becomes an [`EventRequest`].
//! Each page builds its [`EventTable`] once at startup; at request time
//! the name is looked up there. A name without a handler is reported as
//! [`EventOutcome::Ignored`] and otherwise changes nothing.

use std::collections::HashMap;
use std::fmt;

use kstring::KString;
use serde::Serialize;
use serde_json::json;

use crate::acontext::PageContext;
use crate::controller::MainState;
use crate::error::PageError;

pub const EVENT_PARAM: &str = "event";

#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    name: KString,
    input: HashMap<String, String>,
}

impl EventRequest {
    pub fn new(name: &str, input: HashMap<String, String>) -> Self {
        EventRequest { name: KString::from_ref(name), input }
    }

    /// Split request parameters into the event name and the rest.
    /// No (or an empty) `event` parameter means no event.
    pub fn from_params(params: &[(String, String)]) -> Option<Self> {
        let name = params.iter()
            .find(|(k, _)| k == EVENT_PARAM)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())?;
        let input = params.iter()
            .filter(|(k, _)| k != EVENT_PARAM)
            .cloned()
            .collect();
        Some(EventRequest::new(name, input))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &HashMap<String, String> {
        &self.input
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.input.get(field).map(String::as_str)
    }

    /// The trimmed value of a field that must be present and non-empty.
    pub fn required<'s>(&'s self, field: &str, errors: &mut ValidationErrors) -> Option<&'s str> {
        match self.get(field).map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                errors.add(field, "error-required");
                None
            }
        }
    }
}

/// Everything a handler may look at or change.
pub struct EventScope<'a> {
    pub main: &'a mut MainState,
    pub request: &'a EventRequest,
    pub context: &'a mut PageContext,
}

pub type EventHandler = fn(&mut EventScope<'_>) -> Result<(), PageError>;

#[derive(Clone, Default)]
pub struct EventTable {
    handlers: HashMap<KString, EventHandler>,
}

impl fmt::Debug for EventTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(|k| k.as_str()).collect();
        names.sort();
        f.debug_tuple("EventTable").field(&names).finish()
    }
}

impl EventTable {
    pub fn new() -> Self {
        EventTable::default()
    }

    /// Chaining. Registering a name twice replaces the handler.
    pub fn on(mut self, name: &'static str, handler: EventHandler) -> Self {
        if self.handlers.insert(KString::from_static(name), handler).is_some() {
            tracing::warn!("event {name:?} registered twice, old handler dropped");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<EventHandler> {
        self.handlers.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    NoEvent,
    Executed(KString),
    Ignored(KString),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    /// Dictionary key; translated when the error response is built.
    pub message: String,
}

/// Per-field validation failures collected by a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors::default()
    }

    pub fn add(&mut self, field: &str, message: &str) -> &mut Self {
        self.0.push(FieldError { field: field.into(), message: message.into() });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Err` if anything was collected.
    pub fn into_result(self) -> Result<(), PageError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PageError::Validation(self))
        }
    }

    /// The JSON payload, with messages passed through `translate`.
    pub fn to_payload(&self, translate: impl Fn(&str) -> String) -> serde_json::Value {
        let errors: Vec<_> = self.0.iter()
            .map(|e| json!({"field": e.field, "message": translate(&e.message)}))
            .collect();
        json!({ "errors": errors })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}
