//! Per-request dictionaries assembled from JSON fragments.
//!
//! A fragment looks like
//!
//! ```json
//! {"fixed": {"files": {"logo": "/static/logo.svg"},
//!            "const": {"sys-home": "app.host.entry"}},
//!  "translations": {"en": {"greeting": "Hello"},
//!                   "de": {"greeting": "Hallo"}}}
//! ```
//!
//! `fixed.files` is copied as is, `fixed.const` values are dotted
//! config paths whose values are copied (unresolvable paths are
//! skipped), and only the section of `translations` for the active
//! language is merged. Loading is cumulative: later fragments win.
//! A missing or broken fragment changes nothing.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::datamap::{DataMap, DataValue};
use crate::easy_fs::sorted_files_with_extension;
use crate::io_util::read_to_string_if_exists;
use crate::lang_en_de::Lang;
use crate::language::Language;

/// What happened to a fragment. Only informational; none of these
/// are errors to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Merged { entries: usize },
    Missing,
    Invalid,
}

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: DataMap,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    pub fn entries(&self) -> &DataMap {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.entries.get(key)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.entries.get_text(key)
    }

    /// The translation for `key`, or the key itself.
    pub fn text_or_key<'s>(&'s self, key: &'s str) -> &'s str {
        self.get_text(key).unwrap_or(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<DataValue>) {
        self.entries.insert(key, value);
    }

    /// Merge one already parsed fragment; returns the number of
    /// entries taken from it.
    pub fn merge_value(&mut self, fragment: &Value, config: &Config, lang: Lang) -> usize {
        let mut n = 0;
        let fixed = fragment.get("fixed");
        if let Some(Value::Object(files)) = fixed.and_then(|f| f.get("files")) {
            for (k, v) in files {
                if let Some(s) = v.as_str() {
                    self.entries.insert(k, s);
                    n += 1;
                }
            }
        }
        if let Some(Value::Object(consts)) = fixed.and_then(|f| f.get("const")) {
            for (k, v) in consts {
                let resolved = v.as_str().and_then(|path| config.lookup_string(path));
                if let Some(s) = resolved {
                    self.entries.insert(k, s);
                    n += 1;
                } else {
                    debug!("dictionary const {k:?}: unresolved config path {v}");
                }
            }
        }
        if let Some(Value::Object(trans)) = fragment.get("translations")
            .and_then(|t| t.get(lang.as_str()))
        {
            for (k, v) in trans {
                if let Some(v) = DataValue::from_json(v) {
                    self.entries.insert(k, v);
                    n += 1;
                }
            }
        }
        n
    }

    /// Merge the fragment at `path`.
    pub fn load(&mut self, path: impl AsRef<Path>, config: &Config, lang: Lang) -> LoadOutcome {
        let path = path.as_ref();
        let text = match read_to_string_if_exists(path) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("dictionary {path:?} not present");
                return LoadOutcome::Missing
            }
            Err(e) => {
                warn!("dictionary {path:?}: {e:#}");
                return LoadOutcome::Missing
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(fragment) => LoadOutcome::Merged {
                entries: self.merge_value(&fragment, config, lang)
            },
            Err(e) => {
                warn!("dictionary {path:?} is not valid JSON: {e}");
                LoadOutcome::Invalid
            }
        }
    }

    /// Merge every `*.json` file in `dir`, in file name order.
    /// Returns how many files were merged.
    pub fn load_all(&mut self, dir: impl AsRef<Path>, config: &Config, lang: Lang) -> usize {
        let dir = dir.as_ref();
        let paths = match sorted_files_with_extension(dir, "json") {
            Ok(paths) => paths,
            Err(e) => {
                debug!("dictionary directory: {e:#}");
                return 0
            }
        };
        paths.iter()
            .filter(|p| matches!(self.load(p, config, lang), LoadOutcome::Merged { .. }))
            .count()
    }
}
