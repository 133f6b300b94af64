//! From an HTTP request to the HTTP response: route, gate, controller,
//! then either the wire JSON or the full document.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use rouille::Request;
use tracing::{debug, error, info_span, warn};

use crate::acontext::{PageContext, RequestInfo};
use crate::config::Config;
use crate::controller::{MainController, Page};
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::layout;
use crate::middleware::{gate, Gate};
use crate::pages::PageId;
use crate::random_util::{csp_nonce, randomidstring};
use crate::render::RenderEngine;
use crate::response::{Nav, Response};
use crate::router::{Resolved, Router};
use crate::security::add_security_headers;
use crate::session::SessionStore;
use crate::template_store::TemplateStore;
use crate::webutils::{errorpage_from_status, htmlresponse, jsonresponse, redirect};

/// Everything shared between requests.
pub struct App {
    config: RwLock<Config>,
    /// Where config changes are saved, if anywhere.
    config_file: Option<PathBuf>,
    sessions: SessionStore,
    templates: TemplateStore,
    dictionary_dir: PathBuf,
    router: Router,
}

impl App {
    /// Templates and dictionaries are taken from `templates/` and
    /// `dictionary/` below `datadir`.
    pub fn new(datadir: &Path, config: Config, config_file: Option<PathBuf>) -> Self {
        App::with_router(datadir, config, config_file, Router::with_all_pages())
    }

    pub fn with_router(
        datadir: &Path,
        config: Config,
        config_file: Option<PathBuf>,
        router: Router,
    ) -> Self {
        App {
            config: RwLock::new(config),
            config_file,
            sessions: SessionStore::new(),
            templates: TemplateStore::new(datadir.join("templates")),
            dictionary_dir: datadir.join("dictionary"),
            router,
        }
    }

    pub fn config(&self) -> Config {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle `request` for the session with id `session_id`.
    pub fn dispatch(&self, request: &Request, session_id: &str) -> rouille::Response {
        let info = match RequestInfo::from_request(request) {
            Ok(info) => info,
            Err(e) => {
                warn!("{} {}: {e:#}", request.method(), request.raw_url());
                return errorpage_from_status(HttpResponseStatusCode::BadRequest400)
            }
        };
        let nonce = match csp_nonce() {
            Ok(nonce) => nonce,
            Err(e) => {
                error!("no randomness for the CSP nonce: {e}");
                return errorpage_from_status(HttpResponseStatusCode::InternalServerError500)
            }
        };
        let today = chrono::Local::now().date_naive();
        self.respond(info, session_id, nonce, today)
    }

    /// `dispatch` with the per-request values given; errors end up as
    /// a redirect to the not-found page.
    pub fn respond(
        &self,
        info: RequestInfo,
        session_id: &str,
        nonce: String,
        today: NaiveDate,
    ) -> rouille::Response {
        let span = info_span!("request", method = info.method.as_str(), path = %info.path);
        let _enter = span.enter();
        match self.handle(info, session_id, nonce, today) {
            Ok(response) => response,
            Err(e) => {
                let id = randomidstring().unwrap_or_else(|_| "-".into());
                error!("error id {id}: {e:#}");
                redirect(HttpResponseStatusCode::Found302, &PageId::NotFound.path())
            }
        }
    }

    fn page(&self, id: PageId) -> Result<Arc<dyn Page>> {
        self.router.entry(id)
            .map(|entry| entry.page.clone())
            .ok_or_else(|| anyhow!("no route entry for {id:?}"))
    }

    fn handle(
        &self,
        info: RequestInfo,
        session_id: &str,
        nonce: String,
        today: NaiveDate,
    ) -> Result<rouille::Response> {
        let config = self.config();
        let id = match self.router.resolve(&info.path) {
            Resolved::Root =>
                return Ok(redirect(HttpResponseStatusCode::Found302, &config.entry_route())),
            Resolved::Page(id) => id,
            Resolved::Unknown(key) => {
                debug!("no page {key:?}");
                PageId::NotFound
            }
        };
        let Some(entry) = self.router.entry(id) else {
            bail!("route {id:?} resolved without an entry")
        };
        if !entry.methods.contains(info.method) {
            return Ok(errorpage_from_status(HttpResponseStatusCode::MethodNotAllowed405))
        }

        let session = self.sessions.snapshot(session_id);
        let mut context = PageContext::new(info, config, session, nonce, today);

        let (page, status) = match gate(id, entry.page.access(), &context) {
            Gate::Proceed => {
                let status = if id == PageId::NotFound {
                    HttpResponseStatusCode::NotFound404
                } else {
                    HttpResponseStatusCode::OK200
                };
                (entry.page.clone(), status)
            }
            Gate::Substitute(other) =>
                (self.page(other)?, HttpResponseStatusCode::NotFound404),
            Gate::Redirect(target) => {
                debug!("gate: redirect to {target}");
                return Ok(if context.is_partial() {
                    let mut response = Response::new();
                    response.set_nav_to(target);
                    jsonresponse(&response.to_wire())
                } else {
                    redirect(HttpResponseStatusCode::Found302, &target)
                })
            }
        };

        context.load_dictionary(page.dictionary_sources(&self.dictionary_dir));
        let engine = RenderEngine::new(&self.templates);
        let controller = MainController::construct(&*page, &mut context)?;
        let outcome = controller.outcome().clone();
        let response = controller.process(&context, &engine);
        self.write_back(&mut context, session_id)?;

        if context.is_partial() || response.is_complete_non_html() {
            return Ok(jsonresponse(&response.to_wire()))
        }
        if let Some(target) = response.nav().and_then(Nav::target) {
            return Ok(redirect(HttpResponseStatusCode::SeeOther303, target))
        }
        let html = layout::document(&engine, &context, page.id(), &outcome,
                                    response.html().unwrap_or(""));
        let mut http_response = htmlresponse(status, html);
        add_security_headers(&mut http_response, context.nonce());
        Ok(http_response)
    }

    /// Config changes are replayed and saved under the config's write
    /// lock and become visible only after a successful save. The
    /// session is stored last.
    fn write_back(&self, context: &mut PageContext, session_id: &str) -> Result<()> {
        if let Some(changes) = context.take_config_changes() {
            let mut live = self.config.write().unwrap_or_else(|e| e.into_inner());
            let mut updated = live.clone();
            changes.apply_to(&mut updated)?;
            if let Some(path) = &self.config_file {
                updated.save(path)?;
            }
            *live = updated;
        }
        if let Some(session) = context.take_changed_session() {
            self.sessions.store(session_id, session);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use serde_json::{json, Value};
    use crate::config::{ADMIN_PANEL, DEBUG_PANEL};
    use crate::error::PageError;
    use crate::event::{EventScope, EventTable};
    use crate::hash_util::create_password_hash;
    use crate::http_request_method::{HttpRequestMethod, MethodSet};
    use crate::pages::all_pages;
    use crate::pages::setup::SetupPage;
    use crate::session::SessionData;
    use crate::webutils::response_header;

    fn datadir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let t = dir.path().join("templates");
        let d = dir.path().join("dictionary");
        fs::create_dir_all(&t).unwrap();
        fs::create_dir_all(d.join("common")).unwrap();
        fs::create_dir_all(d.join("pages")).unwrap();
        fs::write(t.join("home.html"), "Go to {{sys-home}} ({{greeting}})").unwrap();
        fs::write(t.join("not-found.html"), "<h1>{{not-found-title}}</h1>").unwrap();
        fs::write(t.join("dashboard.html"), "Hello {{user}}").unwrap();
        fs::write(d.join("common").join("base.json"), r#"{
            "translations": {"en": {"not-found-title": "Nothing here", "greeting": "hi"},
                             "de": {"not-found-title": "Nichts hier", "greeting": "hallo"}}
        }"#).unwrap();
        fs::write(d.join("pages").join("home.json"),
                  r#"{"fixed": {"const": {"sys-home": "app.host.entry"}}}"#).unwrap();
        dir
    }

    fn config() -> Config {
        Config::from_value(json!({
            "app": {"host": {"entry": "/home"}, "setup": {"complete": true}},
            "auth": {"users": {"alice": create_password_hash("pw").unwrap()}, "admins": []}
        }))
    }

    fn info(method: HttpRequestMethod, path: &str, params: &[(&str, &str)]) -> RequestInfo {
        let mut info = RequestInfo::get(method, path);
        info.params = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        info
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
    }

    fn body(response: rouille::Response) -> String {
        let (mut reader, _) = response.data.into_reader_and_size();
        let mut s = String::new();
        std::io::Read::read_to_string(&mut reader, &mut s).unwrap();
        s
    }

    fn get(app: &App, path: &str) -> rouille::Response {
        app.respond(info(HttpRequestMethod::GET, path, &[]), "sid", "N".into(), today())
    }

    #[test]
    fn t_root_redirects() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let r = get(&app, "/");
        assert_eq!(r.status_code, 302);
        assert_eq!(response_header(&r, "Location"), Some("/home"));

        let mut c = config();
        c.set("app.host.entry", json!("/calendar")).unwrap();
        let app = App::new(dir.path(), c, None);
        let r = get(&app, "/");
        assert_eq!(response_header(&r, "Location"), Some("/calendar"));
    }

    #[test]
    fn t_full_page() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let r = get(&app, "/HOME");
        assert_eq!(r.status_code, 200);
        let csp = response_header(&r, "Content-Security-Policy").unwrap().to_string();
        assert!(csp.contains("'nonce-N'"));
        assert_eq!(response_header(&r, "X-Frame-Options"), Some("DENY"));
        let html = body(r);
        assert!(html.contains("<main id=\"content\">Go to /home (hi)</main>"));
        assert!(html.contains("<script nonce=\"N\""));
    }

    #[test]
    fn t_unknown_event_same_as_none() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let plain = body(get(&app, "/home"));
        let with_event = body(app.respond(
            info(HttpRequestMethod::POST, "/home", &[("event", "login")]),
            "sid", "N".into(), today()));
        assert_eq!(plain, with_event);
    }

    #[test]
    fn t_setup_gate() {
        let dir = datadir();
        let app = App::new(dir.path(), Config::new(), None);
        let r = get(&app, "/home");
        assert_eq!(r.status_code, 302);
        assert_eq!(response_header(&r, "Location"), Some("/setup"));
        assert_eq!(get(&app, "/setup").status_code, 200);
    }

    #[test]
    fn t_not_found_and_methods() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let r = get(&app, "/nowhere");
        assert_eq!(r.status_code, 404);
        assert!(body(r).contains("<h1>Nothing here</h1>"));

        let r = app.respond(info(HttpRequestMethod::PUT, "/home", &[]), "sid",
                            "N".into(), today());
        assert_eq!(r.status_code, 405);
    }

    #[test]
    fn t_auth_and_session() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let r = get(&app, "/dashboard");
        assert_eq!(response_header(&r, "Location"), Some("/user-access"));

        let r = app.respond(
            info(HttpRequestMethod::POST, "/user-access",
                 &[("event", "login"), ("user", "alice"), ("password", "pw")]),
            "sid", "N".into(), today());
        assert_eq!(r.status_code, 303);
        assert_eq!(response_header(&r, "Location"), Some("/dashboard"));
        assert!(app.sessions().snapshot("sid").is_authenticated());

        let r = get(&app, "/dashboard");
        assert_eq!(r.status_code, 200);
        assert!(body(r).contains("Hello alice"));

        // not an admin
        let r = get(&app, "/admin");
        assert_eq!(r.status_code, 404);
        assert!(body(r).contains("Nothing here"));
    }

    #[test]
    fn t_language_change_persists() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        app.sessions().store("sid", SessionData {
            user: Some("alice".into()), lang: None
        });
        let mut i = info(HttpRequestMethod::POST, "/dashboard",
                         &[("event", "set-language"), ("language", "de")]);
        i.partial = true;
        let r = app.respond(i, "sid", "N".into(), today());
        assert_eq!(r.status_code, 200);
        assert_eq!(app.sessions().snapshot("sid").lang.as_deref(), Some("de"));
        assert!(body(get(&app, "/home")).contains("(hallo)"));
    }

    #[test]
    fn t_validation_error_json() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let r = app.respond(
            info(HttpRequestMethod::POST, "/user-access",
                 &[("event", "login"), ("user", "alice"), ("password", "wrong")]),
            "sid", "N".into(), today());
        let wire: Value = serde_json::from_str(&body(r)).unwrap();
        assert_eq!(wire["isError"], json!(true));
        assert_eq!(wire["typeTarget"], json!("form"));
        assert_eq!(wire["content"]["errors"][0]["field"], json!("password"));
    }

    #[test]
    fn t_config_saved() -> anyhow::Result<()> {
        let dir = datadir();
        let file = dir.path().join("config.json");
        let app = App::new(dir.path(), Config::new(), Some(file.clone()));
        let r = app.respond(
            info(HttpRequestMethod::POST, "/setup",
                 &[("event", "save"), ("site-name", "S"), ("user", "root"),
                   ("password", "password1"), ("password-repeat", "password1")]),
            "sid", "N".into(), today());
        assert_eq!(r.status_code, 303);
        assert!(app.config().is_setup_complete());
        assert!(Config::open(&file)?.is_setup_complete());
        assert_eq!(get(&app, "/admin").status_code, 200);
        Ok(())
    }

    fn context(app: &App, path: &str, params: &[(&str, &str)]) -> PageContext {
        PageContext::new(info(HttpRequestMethod::POST, path, params), app.config(),
                         SessionData::default(), "N".into(), today())
    }

    #[test]
    fn t_overlapping_config_updates() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let mut a = context(&app, "/admin", &[]);
        let mut b = context(&app, "/admin", &[]);
        a.set_config(DEBUG_PANEL, json!(true)).unwrap();
        b.set_config(ADMIN_PANEL, json!(true)).unwrap();
        app.write_back(&mut a, "a").unwrap();
        app.write_back(&mut b, "b").unwrap();
        let live = app.config();
        assert!(live.flag(DEBUG_PANEL));
        assert!(live.flag(ADMIN_PANEL));
    }

    #[test]
    fn t_overlapping_setup_saves() {
        let dir = datadir();
        let app = App::new(dir.path(), Config::new(), None);
        let page = SetupPage::new();
        let run = |user: &str| {
            let mut ctx = context(&app, "/setup",
                                  &[("event", "save"), ("site-name", "S"), ("user", user),
                                    ("password", "password1"),
                                    ("password-repeat", "password1")]);
            let c = MainController::construct(&page, &mut ctx).unwrap();
            assert!(c.state().response.nav().is_some());
            ctx
        };
        // both started before either was written back
        let mut first = run("first");
        let mut second = run("second");
        app.write_back(&mut first, "a").unwrap();
        assert!(app.write_back(&mut second, "b").is_err());

        let live = app.config();
        assert!(live.is_admin("first"));
        assert!(!live.is_admin("second"));
        assert!(live.password_hash("second").is_none());
        assert!(app.sessions().snapshot("a").is_authenticated());
        assert!(!app.sessions().snapshot("b").is_authenticated());
    }

    #[test]
    fn t_failed_config_save() {
        let dir = datadir();
        let file = dir.path().join("missing-dir").join("config.json");
        let app = App::new(dir.path(), Config::new(), Some(file));
        let r = app.respond(
            info(HttpRequestMethod::POST, "/setup",
                 &[("event", "save"), ("site-name", "S"), ("user", "root"),
                   ("password", "password1"), ("password-repeat", "password1")]),
            "sid", "N".into(), today());
        assert_eq!(r.status_code, 302);
        assert_eq!(response_header(&r, "Location"), Some("/not-found"));
        assert!(!app.config().is_setup_complete());
        assert!(!app.sessions().snapshot("sid").is_authenticated());
    }

    #[test]
    fn t_shipped_data_resolves_all_tokens() {
        let datadir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let mut config = config();
        config.set("auth.admins", json!(["alice"])).unwrap();
        let app = App::new(&datadir, config, None);
        for lang in ["en", "de"] {
            app.sessions().store("sid", SessionData {
                user: Some("alice".into()), lang: Some(lang.into())
            });
            for path in ["/home", "/user-access", "/dashboard", "/calendar", "/admin",
                         "/not-found", "/setup"] {
                let html = body(get(&app, path));
                assert!(!html.contains("{{"), "{lang} {path}: {html}");
            }
        }
        let app = App::new(&datadir, Config::new(), None);
        let html = body(get(&app, "/setup"));
        assert!(!html.contains("{{"), "{html}");
    }

    struct TestHome {
        events: EventTable,
    }

    fn payload(scope: &mut EventScope<'_>) -> Result<(), PageError> {
        scope.main.response.set_json(json!({"a": 1}));
        Ok(())
    }

    fn fail(_: &mut EventScope<'_>) -> Result<(), PageError> {
        Err(PageError::Other(anyhow!("boom")))
    }

    impl Page for TestHome {
        fn id(&self) -> PageId { PageId::Home }
        fn template(&self) -> &str { "home.html" }
        fn events(&self) -> &EventTable { &self.events }
    }

    fn test_app(dir: &Path) -> App {
        let mut router = Router::new();
        for page in all_pages() {
            router.add(page, MethodSet::pages());
        }
        router.add(Arc::new(TestHome {
            events: EventTable::new().on("payload", payload).on("fail", fail)
        }), MethodSet::pages());
        App::with_router(dir, config(), None, router)
    }

    #[test]
    fn t_partial_json_payload() {
        let dir = datadir();
        let app = test_app(dir.path());
        let mut i = info(HttpRequestMethod::POST, "/home", &[("event", "payload")]);
        i.partial = true;
        let r = app.respond(i, "sid", "N".into(), today());
        assert_eq!(r.status_code, 200);
        assert!(response_header(&r, "Content-Security-Policy").is_none());
        let wire: Value = serde_json::from_str(&body(r)).unwrap();
        assert_eq!(wire["content"], json!({"a": 1}));
        assert_eq!(wire["outputFormat"], json!("json"));
        assert_eq!(wire["event"], json!("payload"));
    }

    #[test]
    fn t_partial_html() {
        let dir = datadir();
        let app = test_app(dir.path());
        let mut i = info(HttpRequestMethod::GET, "/home", &[]);
        i.partial = true;
        let wire: Value = serde_json::from_str(
            &body(app.respond(i, "sid", "N".into(), today()))).unwrap();
        assert_eq!(wire["content"], json!("Go to /home (hi)"));
        assert_eq!(wire["in"], json!("#content"));
        assert_eq!(wire["show"], json!(true));
    }

    #[test]
    fn t_fatal_error_redirects() {
        let dir = datadir();
        let app = test_app(dir.path());
        let r = app.respond(info(HttpRequestMethod::POST, "/home", &[("event", "fail")]),
                            "sid", "N".into(), today());
        assert_eq!(r.status_code, 302);
        assert_eq!(response_header(&r, "Location"), Some("/not-found"));
    }

    #[test]
    fn t_dispatch_fake_http() {
        let dir = datadir();
        let app = App::new(dir.path(), config(), None);
        let request = Request::fake_http(
            "POST", "/calendar",
            vec![("Content-Type".into(), "application/x-www-form-urlencoded".into()),
                 ("X-Requested-With".into(), "XMLHttpRequest".into())],
            b"event=month&month=2024-03".to_vec());
        let r = app.dispatch(&request, "sid");
        let wire: Value = serde_json::from_str(&body(r)).unwrap();
        assert_eq!(wire["typeTarget"], json!("table"));
        assert_eq!(wire["content"]["month"], json!("2024-03"));
    }
}
