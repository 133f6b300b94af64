//! Route keys (the lower-cased first path segment) to pages.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use kstring::KString;

use crate::controller::Page;
use crate::http_request_method::MethodSet;
use crate::pages::{all_pages, PageId};
use crate::str_util::first_path_segment;

#[derive(Clone)]
pub struct RouteEntry {
    pub methods: MethodSet,
    pub page: Arc<dyn Page>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// `/`, only ever redirected.
    Root,
    Page(PageId),
    /// No page for the key; served by the not-found page.
    Unknown(String),
}

pub struct Router {
    /// Keys are stored lower-cased.
    routes: HashMap<KString, RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Router { routes: HashMap::new() }
    }

    /// A router with every page of the site.
    pub fn with_all_pages() -> Self {
        let mut router = Router::new();
        for page in all_pages() {
            router.add(page, MethodSet::pages());
        }
        router
    }

    pub fn add(&mut self, page: Arc<dyn Page>, methods: MethodSet) -> &mut Self {
        let key = KString::from_ref(page.id().as_str());
        if self.routes.insert(key, RouteEntry { methods, page }).is_some() {
            tracing::warn!("duplicate route entry, old one dropped");
        }
        self
    }

    pub fn resolve(&self, path: &str) -> Resolved {
        match first_path_segment(path) {
            None => Resolved::Root,
            Some(segment) => {
                let key = segment.to_lowercase();
                match PageId::from_str(&key) {
                    Ok(id) if self.routes.contains_key(key.as_str()) => Resolved::Page(id),
                    _ => Resolved::Unknown(key),
                }
            }
        }
    }

    pub fn entry(&self, id: PageId) -> Option<&RouteEntry> {
        self.routes.get(id.as_str())
    }
}
