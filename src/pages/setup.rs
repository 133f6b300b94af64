//! First run: site name, default language and the admin account.

use anyhow::{Context, anyhow};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::acontext::PageContext;
use crate::config::{ADMINS, DEFAULT_LANGUAGE, SETUP_COMPLETE, SITE_NAME, USERS};
use crate::controller::{MainState, Page};
use crate::error::PageError;
use crate::event::{EventScope, EventTable, ValidationErrors};
use crate::hash_util::create_password_hash;
use crate::lang_en_de::Lang;
use crate::language::Language;
use crate::pages::PageId;

const MIN_PASSWORD_LEN: usize = 8;

pub struct SetupPage {
    events: EventTable,
}

impl SetupPage {
    pub fn new() -> Self {
        SetupPage { events: EventTable::new().on("save", save) }
    }
}

impl Page for SetupPage {
    fn id(&self) -> PageId { PageId::Setup }
    fn template(&self) -> &str { "setup.html" }
    fn events(&self) -> &EventTable { &self.events }

    fn prepare(&self, main: &mut MainState, context: &PageContext) -> Result<(), PageError> {
        let status = if context.config().is_setup_complete() {
            context.text("setup-already-complete")
        } else {
            String::new()
        };
        main.messages.insert("status", status);
        Ok(())
    }
}

fn save(scope: &mut EventScope<'_>) -> Result<(), PageError> {
    let request = scope.request;
    let mut errors = ValidationErrors::new();
    if scope.context.config().is_setup_complete() {
        errors.add("site-name", "setup-already-complete");
        return Err(errors.into())
    }
    let site_name = request.required("site-name", &mut errors);
    let user = request.required("user", &mut errors);
    let password = request.required("password", &mut errors);
    if let Some(p) = password {
        if p.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", "error-password-too-short");
        }
    }
    if password.is_some() && request.get("password") != request.get("password-repeat") {
        errors.add("password-repeat", "error-password-mismatch");
    }
    let lang = match request.get("language").filter(|s| !s.trim().is_empty()) {
        None => Lang::default(),
        Some(code) => Lang::maybe_from_start(code).unwrap_or_else(|| {
            errors.add("language", "error-unknown-language");
            Lang::default()
        }),
    };
    let (Some(site_name), Some(user), Some(password)) = (site_name, user, password) else {
        return Err(errors.into())
    };
    errors.into_result()?;

    let hash = create_password_hash(password)
        .with_context(|| anyhow!("hashing the password of {user:?}"))?;
    let context = &mut *scope.context;
    context.require_setup_pending();
    context.set_config(SITE_NAME, Value::String(site_name.into()))?;
    context.set_config(DEFAULT_LANGUAGE, Value::String(lang.as_str().into()))?;
    let mut users = Map::new();
    users.insert(user.to_string(), Value::String(hash));
    context.set_config(USERS, Value::Object(users))?;
    context.set_config(ADMINS, json!([user]))?;
    context.set_config(SETUP_COMPLETE, Value::Bool(true))?;
    let entry = context.config().entry_route();
    info!("setup complete, admin user {user:?}");

    scope.context.session_mut().user = Some(user.to_string());
    scope.main.response.set_nav_to(entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::acontext::RequestInfo;
    use crate::config::Config;
    use crate::controller::MainController;
    use crate::hash_util::verify_password;
    use crate::http_request_method::HttpRequestMethod;
    use crate::session::SessionData;

    fn run(params: &[(&str, &str)], config: Config) -> (PageContext, Option<String>) {
        let mut req = RequestInfo::get(HttpRequestMethod::POST, "/setup");
        req.params = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let mut ctx = PageContext::new(req, config, SessionData::default(), "n".into(),
                                       NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let page = SetupPage::new();
        let c = MainController::construct(&page, &mut ctx).unwrap();
        let nav = c.state().response.nav().and_then(|n| n.target()).map(String::from);
        (ctx, nav)
    }

    const GOOD: &[(&str, &str)] = &[
        ("event", "save"), ("site-name", "My Site"), ("user", "admin"),
        ("password", "long enough"), ("password-repeat", "long enough"), ("language", "de"),
    ];

    #[test]
    fn t_save() {
        let (mut ctx, nav) = run(GOOD, Config::new());
        assert_eq!(nav.as_deref(), Some("/home"));
        let mut config = Config::new();
        ctx.take_config_changes().unwrap().apply_to(&mut config).unwrap();
        assert!(config.is_setup_complete());
        assert_eq!(config.lookup_str(SITE_NAME), Some("My Site"));
        assert_eq!(config.lookup_str(DEFAULT_LANGUAGE), Some("de"));
        assert!(config.is_admin("admin"));
        assert!(verify_password("long enough", config.password_hash("admin").unwrap()).unwrap());
        assert_eq!(ctx.user(), Some("admin"));
    }

    #[test]
    fn t_save_invalid() {
        let (mut ctx, nav) = run(&[("event", "save"), ("site-name", "S"), ("user", "admin"),
                                   ("password", "short"), ("password-repeat", "short")],
                                 Config::new());
        assert_eq!(nav, None);
        assert!(ctx.take_config_changes().is_none());
        assert_eq!(ctx.user(), None);
    }

    #[test]
    fn t_save_only_once() {
        let mut done = Config::new();
        done.set(SETUP_COMPLETE, Value::Bool(true)).unwrap();
        let (mut ctx, nav) = run(GOOD, done);
        assert_eq!(nav, None);
        assert!(ctx.take_config_changes().is_none());
    }
}
