//! The pages of the site. The set is closed: every route key is a
//! `PageId`, and `all_pages` has exactly one page per id.

use std::sync::Arc;

use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::controller::Page;

pub mod admin;
pub mod calendar;
pub mod dashboard;
pub mod home;
pub mod not_found;
pub mod setup;
pub mod user_access;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PageId {
    Setup,
    Home,
    UserAccess,
    Dashboard,
    Calendar,
    Admin,
    NotFound,
}

impl PageId {
    /// The route key.
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// The path the page is served at.
    pub fn path(self) -> String {
        format!("/{}", self.as_str())
    }
}

pub fn all_pages() -> Vec<Arc<dyn Page>> {
    vec![
        Arc::new(setup::SetupPage::new()),
        Arc::new(home::HomePage::new()),
        Arc::new(user_access::UserAccessPage::new()),
        Arc::new(dashboard::DashboardPage::new()),
        Arc::new(calendar::CalendarPage::new()),
        Arc::new(admin::AdminPage::new()),
        Arc::new(not_found::NotFoundPage::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn t_page_ids() {
        assert_eq!(PageId::UserAccess.as_str(), "user-access");
        assert_eq!(PageId::from_str("not-found").unwrap(), PageId::NotFound);
        assert!(PageId::from_str("Home").is_err());
        assert_eq!(PageId::Calendar.path(), "/calendar");
    }

    #[test]
    fn t_one_page_per_id() {
        let pages = all_pages();
        assert_eq!(pages.len(), PageId::iter().count());
        for id in PageId::iter() {
            assert_eq!(pages.iter().filter(|p| p.id() == id).count(), 1, "{id:?}");
        }
    }
}
