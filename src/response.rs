//! What to send back for a request, and where the client should put it.
//!
//! One `Response` exists per request. The page owns it, the event
//! handler mutates it through the page state, and the dispatcher reads
//! it once. Every field starts out unset, and unset fields are `null`
//! on the wire.

use serde::Serialize;
use serde_json::Value;
use strum_macros::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Pre-rendered markup, injected at the `in` selector.
    Html(String),
    /// Structured payload, interpreted client side via `typeTarget`.
    Json(Value),
}

impl Content {
    pub fn as_html(&self) -> Option<&str> {
        match self {
            Content::Html(s) => Some(s),
            Content::Json(_) => None,
        }
    }

    fn to_wire(&self) -> Value {
        match self {
            Content::Html(s) => Value::String(s.clone()),
            Content::Json(v) => v.clone(),
        }
    }
}

/// `nav` is either a plain "navigate" flag or a target path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Nav {
    Flag(bool),
    To(String),
}

impl Nav {
    pub fn target(&self) -> Option<&str> {
        match self {
            Nav::Flag(_) => None,
            Nav::To(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    content: Option<Content>,
    show: Option<bool>,
    target: Option<String>,
    type_target: Option<String>,
    refresh: Option<bool>,
    nav: Option<Nav>,
    mail: Option<bool>,
    output_format: Option<OutputFormat>,
    is_error: Option<bool>,
    event: Option<String>,
}

/// The wire form, field names as the client script expects them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse<'r> {
    show: Option<bool>,
    #[serde(rename = "in")]
    target: Option<&'r str>,
    type_target: Option<&'r str>,
    content: Option<Value>,
    refresh: Option<bool>,
    nav: Option<&'r Nav>,
    output_format: Option<OutputFormat>,
    mail: Option<bool>,
    event: Option<&'r str>,
    is_error: Option<bool>,
}

impl Response {
    pub fn new() -> Self {
        Response::default()
    }

    // Setters, chainable.

    pub fn set_content(&mut self, content: Content) -> &mut Self {
        self.content = Some(content);
        self
    }
    pub fn set_html(&mut self, html: impl Into<String>) -> &mut Self {
        self.set_content(Content::Html(html.into()))
            .set_output_format(OutputFormat::Html)
    }
    pub fn set_json(&mut self, payload: Value) -> &mut Self {
        self.set_content(Content::Json(payload))
            .set_output_format(OutputFormat::Json)
    }
    pub fn set_show(&mut self, show: bool) -> &mut Self {
        self.show = Some(show);
        self
    }
    /// The container selector (`in` on the wire).
    pub fn set_in(&mut self, target: impl Into<String>) -> &mut Self {
        self.target = Some(target.into());
        self
    }
    pub fn set_type_target(&mut self, type_target: impl Into<String>) -> &mut Self {
        self.type_target = Some(type_target.into());
        self
    }
    pub fn set_refresh(&mut self, refresh: bool) -> &mut Self {
        self.refresh = Some(refresh);
        self
    }
    pub fn set_nav(&mut self, nav: Nav) -> &mut Self {
        self.nav = Some(nav);
        self
    }
    pub fn set_nav_to(&mut self, path: impl Into<String>) -> &mut Self {
        self.set_nav(Nav::To(path.into()))
    }
    pub fn set_mail(&mut self, mail: bool) -> &mut Self {
        self.mail = Some(mail);
        self
    }
    pub fn set_output_format(&mut self, format: OutputFormat) -> &mut Self {
        self.output_format = Some(format);
        self
    }
    pub fn set_error(&mut self, is_error: bool) -> &mut Self {
        self.is_error = Some(is_error);
        self
    }
    pub fn set_event(&mut self, event: impl Into<String>) -> &mut Self {
        self.event = Some(event.into());
        self
    }

    // Getters; all of them work on a response nobody has touched.

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }
    pub fn html(&self) -> Option<&str> {
        self.content.as_ref().and_then(Content::as_html)
    }
    pub fn show(&self) -> bool {
        self.show.unwrap_or(false)
    }
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
    pub fn type_target(&self) -> Option<&str> {
        self.type_target.as_deref()
    }
    pub fn refresh(&self) -> bool {
        self.refresh.unwrap_or(false)
    }
    pub fn nav(&self) -> Option<&Nav> {
        self.nav.as_ref()
    }
    pub fn mail(&self) -> bool {
        self.mail.unwrap_or(false)
    }
    /// Unset means HTML.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format.unwrap_or(OutputFormat::Html)
    }
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Complete and not meant to be wrapped into a page: a JSON
    /// payload is present.
    pub fn is_complete_non_html(&self) -> bool {
        self.output_format == Some(OutputFormat::Json)
            && matches!(self.content, Some(Content::Json(_)))
    }

    pub fn to_wire(&self) -> Value {
        let wire = WireResponse {
            show: self.show,
            target: self.target.as_deref(),
            type_target: self.type_target.as_deref(),
            content: self.content.as_ref().map(Content::to_wire),
            refresh: self.refresh,
            nav: self.nav.as_ref(),
            output_format: self.output_format,
            mail: self.mail,
            event: self.event.as_deref(),
            is_error: self.is_error,
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }
}
