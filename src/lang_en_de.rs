//! Implementation of `Language` for English and German (in that
//! priority order).

use std::iter::Copied;
use std::slice;

use crate::language::Language;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Lang {
    En,
    De,
}

const MEMBERS: &[Lang] = &[Lang::En, Lang::De];
const STRS: &[&str] = &["en", "de"];

impl Language for Lang {
    type MemberIter = Copied<slice::Iter<'static, Lang>>;

    fn maybe_from(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Lang::En),
            "de" => Some(Lang::De),
            _ => None
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::De => "de",
        }
    }

    fn members() -> Self::MemberIter {
        MEMBERS.iter().copied()
    }

    fn strs() -> &'static [&'static str] {
        STRS
    }
}

impl Default for Lang {
    fn default() -> Self {
        MEMBERS[0]
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Lang::maybe_from_start(s).unwrap_or_default()
    }
}
