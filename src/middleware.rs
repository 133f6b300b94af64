//! The gate every page request passes before its controller is built.

use crate::acontext::PageContext;
use crate::controller::AccessLevel;
use crate::pages::PageId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Proceed,
    /// Serve this page instead, without redirecting.
    Substitute(PageId),
    Redirect(String),
}

/// Setup first, then authentication. Admin pages are not revealed to
/// users without admin rights; they get the not-found page.
pub fn gate(page: PageId, access: AccessLevel, context: &PageContext) -> Gate {
    if !context.config().is_setup_complete() {
        return if page == PageId::Setup {
            Gate::Proceed
        } else {
            Gate::Redirect(PageId::Setup.path())
        }
    }
    match access {
        AccessLevel::Public => Gate::Proceed,
        AccessLevel::User | AccessLevel::Admin => match context.user() {
            None => Gate::Redirect(PageId::UserAccess.path()),
            Some(user) => {
                if access == AccessLevel::Admin && !context.config().is_admin(user) {
                    tracing::info!("user {user:?} is not an admin, hiding {page:?}");
                    Gate::Substitute(PageId::NotFound)
                } else {
                    Gate::Proceed
                }
            }
        }
    }
}
