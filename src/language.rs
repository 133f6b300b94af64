use crate::str_util::str_take;

pub trait Language: Clone + Copy + PartialEq + Eq + Default + Send + Sync {
    type MemberIter: Iterator<Item = Self>;

    fn maybe_from(s: &str) -> Option<Self> where Self: Sized;

    /// Accepts longer locale strings like `de_CH` or `de-CH`.
    fn maybe_from_start(s: &str) -> Option<Self> {
        let (start, ok) = str_take(s, 2);
        if ! ok { return None }
        Self::maybe_from(&start.to_ascii_lowercase())
    }

    /// 2-letter lower-case language code, also the key of the
    /// `translations` section in dictionary files.
    fn as_str(self) -> &'static str;

    /// In the order in which they should be listed in the language
    /// switcher.
    fn members() -> Self::MemberIter;

    fn strs() -> &'static [&'static str];

    /// The active language for a request: the session preference if
    /// it names a known language, else the configured default, else
    /// `Default::default()`. Evaluated per request, never cached.
    fn resolve(session_pref: Option<&str>, configured_default: Option<&str>) -> Self {
        session_pref.and_then(Self::maybe_from_start)
            .or_else(|| configured_default.and_then(Self::maybe_from_start))
            .unwrap_or_default()
    }
}
