//! Login and logout.

use tracing::{info, warn};

use crate::acontext::PageContext;
use crate::controller::{MainState, Page};
use crate::error::PageError;
use crate::event::{EventScope, EventTable, ValidationErrors};
use crate::hash_util::verify_password;
use crate::pages::PageId;

pub struct UserAccessPage {
    events: EventTable,
}

impl UserAccessPage {
    pub fn new() -> Self {
        UserAccessPage {
            events: EventTable::new()
                .on("login", login)
                .on("logout", logout),
        }
    }
}

impl Page for UserAccessPage {
    fn id(&self) -> PageId { PageId::UserAccess }
    fn template(&self) -> &str { "user-access.html" }
    fn events(&self) -> &EventTable { &self.events }

    fn prepare(&self, main: &mut MainState, context: &PageContext) -> Result<(), PageError> {
        let (status, form) = if context.session().is_authenticated() {
            ("status-logged-in", "logout-form")
        } else {
            ("status-logged-out", "login-form")
        };
        main.messages.insert("login-status", context.text(status));
        main.data.insert("form", context.text(form));
        Ok(())
    }
}

fn login(scope: &mut EventScope<'_>) -> Result<(), PageError> {
    let request = scope.request;
    let mut errors = ValidationErrors::new();
    let user = request.required("user", &mut errors);
    let password = request.required("password", &mut errors);
    let (Some(user), Some(password)) = (user, password) else {
        return Err(errors.into())
    };
    let ok = match scope.context.config().password_hash(user) {
        Some(hash) => verify_password(password, hash).unwrap_or_else(|e| {
            warn!("user {user:?}: {e}");
            false
        }),
        None => false,
    };
    if !ok {
        info!("failed login for {user:?}");
        errors.add("password", "error-login-failed");
        return Err(errors.into())
    }
    info!("user {user:?} logged in");
    scope.context.session_mut().user = Some(user.to_string());
    scope.main.response.set_nav_to(PageId::Dashboard.path());
    Ok(())
}

fn logout(scope: &mut EventScope<'_>) -> Result<(), PageError> {
    if let Some(user) = scope.context.session_mut().user.take() {
        info!("user {user:?} logged out");
    }
    let entry = scope.context.config().entry_route();
    scope.main.response.set_nav_to(entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use crate::acontext::RequestInfo;
    use crate::config::Config;
    use crate::controller::MainController;
    use crate::event::EventOutcome;
    use crate::hash_util::create_password_hash;
    use crate::http_request_method::HttpRequestMethod;
    use crate::session::SessionData;

    fn context(params: &[(&str, &str)], session: SessionData) -> PageContext {
        let mut req = RequestInfo::get(HttpRequestMethod::POST, "/user-access");
        req.params = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let config = Config::from_value(json!({
            "auth": {"users": {"alice": create_password_hash("pw").unwrap()}}
        }));
        PageContext::new(req, config, session, "n".into(),
                         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn t_login() {
        let page = UserAccessPage::new();
        let mut ctx = context(&[("event", "login"), ("user", "alice"), ("password", "pw")],
                              SessionData::default());
        let c = MainController::construct(&page, &mut ctx).unwrap();
        assert_eq!(c.outcome(), &EventOutcome::Executed("login".into()));
        assert_eq!(c.state().response.nav().and_then(|n| n.target()), Some("/dashboard"));
        assert_eq!(ctx.take_changed_session().and_then(|s| s.user).as_deref(), Some("alice"));
    }

    #[test]
    fn t_login_failed() {
        let page = UserAccessPage::new();
        for params in [&[("event", "login"), ("user", "alice"), ("password", "no")][..],
                       &[("event", "login"), ("user", "bob"), ("password", "pw")][..],
                       &[("event", "login"), ("user", "alice")][..]] {
            let mut ctx = context(params, SessionData::default());
            let c = MainController::construct(&page, &mut ctx).unwrap();
            assert!(!ctx.session().is_authenticated());
            let store = crate::template_store::TemplateStore::new("/nonexistent");
            let r = c.process(&ctx, &crate::render::RenderEngine::new(&store));
            assert!(r.is_error());
            assert_eq!(r.type_target(), Some("form"));
        }
    }

    #[test]
    fn t_logout() {
        let page = UserAccessPage::new();
        let session = SessionData { user: Some("alice".into()), lang: Some("de".into()) };
        let mut ctx = context(&[("event", "logout")], session);
        let c = MainController::construct(&page, &mut ctx).unwrap();
        assert_eq!(c.state().response.nav().and_then(|n| n.target()), Some("/home"));
        let s = ctx.take_changed_session().unwrap();
        assert_eq!(s.user, None);
        assert_eq!(s.lang.as_deref(), Some("de"));
    }
}
