//! Global configuration as a JSON tree, addressed with dotted paths
//! like `app.host.entry`.
//!
//! How the file gets onto the disk is somebody else's business; this
//! only reads one JSON document (or starts empty), answers lookups
//! and records changes made by the setup and admin pages.

use std::path::Path;

use anyhow::{Result, Context, anyhow};
use serde_json::{Map, Value};

use crate::error::PageError;
use crate::io_util::read_to_string_if_exists;
use crate::str_util::dotted_parts;

pub const ENTRY_ROUTE: &str = "app.host.entry";
pub const DEFAULT_ENTRY_ROUTE: &str = "/home";
pub const SETUP_COMPLETE: &str = "app.setup.complete";
pub const DEFAULT_LANGUAGE: &str = "app.language.default";
pub const SITE_NAME: &str = "app.site.name";
pub const DEBUG_PANEL: &str = "app.debug.panel";
pub const ADMIN_PANEL: &str = "app.admin.panel";
pub const USERS: &str = "auth.users";
pub const ADMINS: &str = "auth.admins";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    root: Value,
}

impl Config {
    pub fn new() -> Self {
        Config { root: Value::Object(Map::new()) }
    }

    /// A non-object root is treated as empty.
    pub fn from_value(root: Value) -> Self {
        if root.is_object() {
            Config { root }
        } else {
            Config::new()
        }
    }

    /// Read the config file; a missing file gives an empty config,
    /// invalid JSON is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string_if_exists(path)? {
            Some(s) => {
                let root: Value = serde_json::from_str(&s).with_context(
                    || anyhow!("parsing config file {:?}", path))?;
                Ok(Config::from_value(root))
            }
            None => {
                tracing::info!("config file {path:?} not present, starting empty");
                Ok(Config::new())
            }
        }
    }

    /// Write the config back to `path` (via a temporary file in the
    /// same directory, renamed into place).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let s = serde_json::to_string_pretty(&self.root)?;
        std::fs::write(&tmp, s).with_context(
            || anyhow!("writing {:?}", tmp))?;
        std::fs::rename(&tmp, path).with_context(
            || anyhow!("renaming {:?} to {:?}", tmp, path))?;
        Ok(())
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut cur = &self.root;
        for part in dotted_parts(path)? {
            cur = cur.as_object()?.get(part)?;
        }
        Some(cur)
    }

    /// Scalars as their string form (numbers and booleans included);
    /// objects, arrays and null give `None`.
    pub fn lookup_string(&self, path: &str) -> Option<String> {
        match self.lookup(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None
        }
    }

    pub fn lookup_str(&self, path: &str) -> Option<&str> {
        self.lookup(path)?.as_str()
    }

    /// True only for a JSON `true` (or the string `"true"`).
    pub fn flag(&self, path: &str) -> bool {
        match self.lookup(path) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false
        }
    }

    pub fn entry_route(&self) -> String {
        self.lookup_str(ENTRY_ROUTE)
            .filter(|s| s.starts_with('/'))
            .unwrap_or(DEFAULT_ENTRY_ROUTE)
            .to_string()
    }

    pub fn is_setup_complete(&self) -> bool {
        self.flag(SETUP_COMPLETE)
    }

    /// The stored password hash of `user`. User names may contain
    /// dots, so this does not go through a dotted path.
    pub fn password_hash(&self, user: &str) -> Option<&str> {
        self.lookup(USERS)?.get(user)?.as_str()
    }

    pub fn is_admin(&self, user: &str) -> bool {
        match self.lookup(ADMINS) {
            Some(Value::Array(admins)) => admins.iter().any(|a| a.as_str() == Some(user)),
            _ => false
        }
    }

    /// Set the value at `path`, creating intermediate objects.
    /// Replacing a non-object on the way is an error.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), PageError> {
        let parts = dotted_parts(path).ok_or_else(
            || PageError::Config(format!("invalid config path {path:?}")))?;
        let Some((last, init)) = parts.split_last() else {
            return Err(PageError::Config(format!("empty config path {path:?}")))
        };
        let mut cur = &mut self.root;
        for part in init {
            let obj = cur.as_object_mut().ok_or_else(
                || PageError::Config(format!("{path:?}: {part:?} is not inside an object")))?;
            cur = obj.entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        let obj = cur.as_object_mut().ok_or_else(
            || PageError::Config(format!("{path:?}: parent of {last:?} is not an object")))?;
        obj.insert(last.to_string(), value);
        Ok(())
    }
}

/// The sets a request made on its config snapshot, replayed against
/// the shared config under its write lock. Paths not recorded here
/// are left as the shared config has them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigChanges {
    sets: Vec<(String, Value)>,
    setup_pending: bool,
}

impl ConfigChanges {
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn set(&mut self, path: &str, value: Value) {
        self.sets.push((path.to_string(), value));
    }

    /// Refuse to apply once setup has been completed in the meantime.
    pub fn require_setup_pending(&mut self) {
        self.setup_pending = true;
    }

    /// All or nothing: on error `config` is unchanged.
    pub fn apply_to(&self, config: &mut Config) -> Result<(), PageError> {
        if self.setup_pending && config.is_setup_complete() {
            return Err(PageError::Config("setup was completed by another request".into()))
        }
        let mut updated = config.clone();
        for (path, value) in &self.sets {
            updated.set(path, value.clone())?;
        }
        *config = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> Config {
        Config::from_value(json!({
            "app": {
                "host": { "entry": "/dashboard" },
                "setup": { "complete": true },
                "port": 8080,
            },
            "list": [1, 2],
        }))
    }

    #[test]
    fn t_lookup() {
        let c = config();
        assert_eq!(c.lookup_str("app.host.entry"), Some("/dashboard"));
        assert_eq!(c.lookup_string("app.port").as_deref(), Some("8080"));
        assert_eq!(c.lookup_string("app.setup.complete").as_deref(), Some("true"));
        assert_eq!(c.lookup_string("app.host"), None);
        assert_eq!(c.lookup("app.host.missing"), None);
        assert_eq!(c.lookup("list.0"), None);
        assert_eq!(c.lookup("app..host"), None);
        assert!(c.flag("app.setup.complete"));
        assert!(!c.flag("app.port"));
        assert_eq!(c.entry_route(), "/dashboard");
    }

    #[test]
    fn t_defaults() {
        let c = Config::from_value(json!("not an object"));
        assert_eq!(c, Config::new());
        assert_eq!(c.entry_route(), DEFAULT_ENTRY_ROUTE);
        assert!(!c.is_setup_complete());
    }

    #[test]
    fn t_set() {
        let mut c = config();
        c.set("app.setup.complete", json!(false)).unwrap();
        assert!(!c.is_setup_complete());
        c.set("auth.users.alice", json!("abc")).unwrap();
        assert_eq!(c.lookup_str("auth.users.alice"), Some("abc"));
        assert!(c.set("app.port.x", json!(1)).is_err());
        assert!(c.set("", json!(1)).is_err());
    }

    #[test]
    fn t_users() {
        let c = Config::from_value(json!({
            "auth": {"users": {"a.b": "d1", "c": 3}, "admins": ["a.b"]}
        }));
        assert_eq!(c.password_hash("a.b"), Some("d1"));
        assert_eq!(c.password_hash("c"), None);
        assert_eq!(c.password_hash("x"), None);
        assert!(c.is_admin("a.b"));
        assert!(!c.is_admin("c"));
    }

    #[test]
    fn t_open() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let p = dir.path().join("config.json");
        assert_eq!(Config::open(&p)?, Config::new());
        std::fs::write(&p, r#"{"app":{"host":{"entry":"/x"}}}"#)?;
        assert_eq!(Config::open(&p)?.entry_route(), "/x");
        std::fs::write(&p, "{nope")?;
        assert!(Config::open(&p).is_err());

        let mut c = Config::new();
        c.set("app.site.name", json!("Site"))?;
        c.save(&p)?;
        assert_eq!(Config::open(&p)?, c);
        Ok(())
    }

    #[test]
    fn t_changes_replayed() {
        let base = Config::new();
        let mut a = ConfigChanges::default();
        a.set(DEBUG_PANEL, json!(true));
        let mut b = ConfigChanges::default();
        b.set(ADMIN_PANEL, json!(true));
        let mut live = base.clone();
        a.apply_to(&mut live).unwrap();
        b.apply_to(&mut live).unwrap();
        assert!(live.flag(DEBUG_PANEL));
        assert!(live.flag(ADMIN_PANEL));
    }

    #[test]
    fn t_changes_setup_pending() {
        let mut first = ConfigChanges::default();
        first.require_setup_pending();
        first.set(USERS, json!({"a": "h"}));
        first.set(SETUP_COMPLETE, json!(true));
        let mut second = first.clone();
        second.set(USERS, json!({"b": "h"}));

        let mut live = Config::new();
        first.apply_to(&mut live).unwrap();
        assert!(matches!(second.apply_to(&mut live), Err(PageError::Config(_))));
        assert_eq!(live.password_hash("a"), Some("h"));
        assert_eq!(live.password_hash("b"), None);
    }

    #[test]
    fn t_changes_all_or_nothing() {
        let mut c = ConfigChanges::default();
        c.set(SITE_NAME, json!("S"));
        c.set("app.site.name.x", json!(1));
        let mut live = Config::new();
        assert!(c.apply_to(&mut live).is_err());
        assert_eq!(live, Config::new());
    }
}
