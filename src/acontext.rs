//! Everything belonging to one request: request data, snapshots of
//! the config and the session, the dictionary, and the CSP nonce.
//!
//! Built fresh for every request and dropped at its end. Changes to
//! the config or session snapshots are flagged so the dispatcher can
//! write them back.

use std::path::PathBuf;

use anyhow::{Result, Context, anyhow};
use chrono::NaiveDate;
use rouille::Request;
use serde_json::Value;

use crate::config::{Config, ConfigChanges, DEFAULT_LANGUAGE};
use crate::datamap::DataMap;
use crate::error::PageError;
use crate::dictionary::Dictionary;
use crate::event::{EventRequest, EVENT_PARAM};
use crate::http_request_method::HttpRequestMethod;
use crate::lang_en_de::Lang;
use crate::language::Language;
use crate::render::translate_token;
use crate::rouille_util::{is_partial_request, request_params};
use crate::session::SessionData;
use crate::webutils::html_escape_inert;

/// The parts of the HTTP request the pages work with.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInfo {
    pub method: HttpRequestMethod,
    /// Path only, percent-decoded.
    pub path: String,
    /// Query parameters, then body parameters.
    pub params: Vec<(String, String)>,
    /// Wants a JSON fragment instead of a document.
    pub partial: bool,
}

impl RequestInfo {
    pub fn from_request(request: &Request) -> Result<Self> {
        let method = HttpRequestMethod::from_str(request.method())?;
        let params = request_params(request).with_context(
            || anyhow!("reading parameters of {} {}", request.method(), request.raw_url()))?;
        Ok(RequestInfo {
            method,
            path: request.url(),
            params,
            partial: is_partial_request(request),
        })
    }

    pub fn get(method: HttpRequestMethod, path: &str) -> Self {
        RequestInfo {
            method,
            path: path.to_string(),
            params: Vec::new(),
            partial: false,
        }
    }
}

/// A dictionary source, in the order it is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    Dir(PathBuf),
    File(PathBuf),
}

pub struct PageContext {
    request: RequestInfo,
    event: Option<EventRequest>,
    config: Config,
    config_changes: ConfigChanges,
    session: SessionData,
    session_changed: bool,
    dictionary_sources: Vec<DictionarySource>,
    dictionary: Dictionary,
    nonce: String,
    today: NaiveDate,
}

impl PageContext {
    pub fn new(
        request: RequestInfo,
        config: Config,
        session: SessionData,
        nonce: String,
        today: NaiveDate,
    ) -> Self {
        let event = EventRequest::from_params(&request.params);
        PageContext {
            request,
            event,
            config,
            config_changes: ConfigChanges::default(),
            session,
            session_changed: false,
            dictionary_sources: Vec::new(),
            dictionary: Dictionary::new(),
            nonce,
            today,
        }
    }

    pub fn request(&self) -> &RequestInfo { &self.request }
    pub fn method(&self) -> HttpRequestMethod { self.request.method }
    pub fn path(&self) -> &str { &self.request.path }
    pub fn is_partial(&self) -> bool { self.request.partial }
    pub fn event(&self) -> Option<&EventRequest> { self.event.as_ref() }
    pub fn nonce(&self) -> &str { &self.nonce }
    pub fn today(&self) -> NaiveDate { self.today }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.params.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Request parameters as render data, HTML-escaped with braces
    /// escaped as well, without the event name.
    pub fn inputs(&self) -> DataMap {
        let mut m = DataMap::new();
        for (k, v) in &self.request.params {
            if k != EVENT_PARAM {
                m.insert(k, html_escape_inert(v).into_owned());
            }
        }
        m
    }

    pub fn config(&self) -> &Config { &self.config }
    /// Set `path` in this request's config snapshot and record the
    /// change for the write-back.
    pub fn set_config(&mut self, path: &str, value: Value) -> Result<(), PageError> {
        self.config.set(path, value.clone())?;
        self.config_changes.set(path, value);
        Ok(())
    }
    /// The recorded changes are only applied while setup is pending.
    pub fn require_setup_pending(&mut self) {
        self.config_changes.require_setup_pending();
    }
    /// The config changes made so far, if any.
    pub fn take_config_changes(&mut self) -> Option<ConfigChanges> {
        if self.config_changes.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.config_changes))
        }
    }

    pub fn session(&self) -> &SessionData { &self.session }
    pub fn session_mut(&mut self) -> &mut SessionData {
        self.session_changed = true;
        &mut self.session
    }
    pub fn take_changed_session(&mut self) -> Option<SessionData> {
        if self.session_changed {
            self.session_changed = false;
            Some(self.session.clone())
        } else {
            None
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.session.user.as_deref()
    }

    /// Session preference, then configured default, then English.
    /// Computed on every call, since a handler may change the
    /// preference.
    pub fn lang(&self) -> Lang {
        Lang::resolve(self.session.lang.as_deref(),
                      self.config.lookup_str(DEFAULT_LANGUAGE))
    }

    pub fn dictionary(&self) -> &Dictionary { &self.dictionary }
    pub fn dictionary_sources(&self) -> &[DictionarySource] { &self.dictionary_sources }

    /// Load `sources` in order into a fresh dictionary for the
    /// current language.
    pub fn load_dictionary(&mut self, sources: Vec<DictionarySource>) {
        self.dictionary_sources = sources;
        self.reload_dictionary();
    }

    /// Rebuild the dictionary from the recorded sources, e.g. after
    /// the language changed.
    pub fn reload_dictionary(&mut self) {
        let lang = self.lang();
        let mut dictionary = Dictionary::new();
        for source in &self.dictionary_sources {
            match source {
                DictionarySource::Dir(dir) => {
                    dictionary.load_all(dir, &self.config, lang);
                }
                DictionarySource::File(file) => {
                    dictionary.load(file, &self.config, lang);
                }
            }
        }
        self.dictionary = dictionary;
    }

    pub fn translate(&self, key: &str) -> String {
        translate_token(&self.dictionary, key)
    }

    /// Like `translate` but gives the bare key for unknown keys.
    pub fn text(&self, key: &str) -> String {
        self.dictionary.text_or_key(key).to_string()
    }
}
