//! Template files below a base directory.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::io_util::read_to_string_if_exists;

pub const NOT_FOUND_TEMPLATE: &str = "not-found.html";

/// Used when not even the not-found template is present.
pub const BUILTIN_NOT_FOUND: &str = "<section class=\"not-found\">\
                                     <h1>{{not-found-title}}</h1>\
                                     <p>{{not-found-text}}</p></section>\n";

#[derive(Debug, Clone)]
pub struct TemplateStore {
    basepath: PathBuf,
}

impl TemplateStore {
    pub fn new(basepath: impl Into<PathBuf>) -> Self {
        TemplateStore { basepath: basepath.into() }
    }

    pub fn basepath(&self) -> &Path {
        &self.basepath
    }

    /// Only plain relative paths are accepted; `..`, absolute paths
    /// and prefixes give `None`.
    pub fn full_path(&self, template: &str) -> Option<PathBuf> {
        let rel = Path::new(template);
        if rel.as_os_str().is_empty() {
            return None
        }
        for c in rel.components() {
            match c {
                Component::Normal(_) | Component::CurDir => (),
                _ => return None,
            }
        }
        Some(self.basepath.join(rel))
    }

    /// The raw template text, if the template exists and is readable.
    pub fn get(&self, template: &str) -> Option<String> {
        let path = self.full_path(template)?;
        match read_to_string_if_exists(&path) {
            Ok(v) => v,
            Err(e) => {
                warn!("template {template:?}: {e:#}");
                None
            }
        }
    }

    /// The template text, or the canonical not-found template.
    pub fn get_or_not_found(&self, template: &str) -> String {
        if let Some(s) = self.get(template) {
            return s
        }
        warn!("template {template:?} not found, using {NOT_FOUND_TEMPLATE:?}");
        self.get(NOT_FOUND_TEMPLATE).unwrap_or_else(|| BUILTIN_NOT_FOUND.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn t_get_and_fallback() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("pages"))?;
        fs::write(dir.path().join("pages/home.html"), "home")?;
        let store = TemplateStore::new(dir.path());
        assert_eq!(store.get("pages/home.html").as_deref(), Some("home"));
        assert_eq!(store.get("pages/none.html"), None);
        assert_eq!(store.get_or_not_found("pages/none.html"), BUILTIN_NOT_FOUND);
        fs::write(dir.path().join(NOT_FOUND_TEMPLATE), "nf")?;
        assert_eq!(store.get_or_not_found("pages/none.html"), "nf");
        Ok(())
    }

    #[test]
    fn t_full_path_rejects_escapes() {
        let store = TemplateStore::new("/srv/templates");
        assert_eq!(store.full_path("a/b.html"),
                   Some(PathBuf::from("/srv/templates/a/b.html")));
        assert_eq!(store.full_path("../etc/passwd"), None);
        assert_eq!(store.full_path("/etc/passwd"), None);
        assert_eq!(store.full_path(""), None);
    }
}
