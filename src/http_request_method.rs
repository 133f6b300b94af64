//! HTTP request methods, and the sets of them a route accepts.

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethod {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl HttpRequestMethod {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(Self::GET),
            "HEAD" => Ok(Self::HEAD),
            "POST" => Ok(Self::POST),
            "PUT" => Ok(Self::PUT),
            "PATCH" => Ok(Self::PATCH),
            "DELETE" => Ok(Self::DELETE),
            "OPTIONS" => Ok(Self::OPTIONS),
            "CONNECT" => Ok(Self::CONNECT),
            "TRACE" => Ok(Self::TRACE),
            _ => bail!("invalid http request method {s:?}")
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::PATCH => "PATCH",
            Self::DELETE => "DELETE",
            Self::OPTIONS => "OPTIONS",
            Self::CONNECT => "CONNECT",
            Self::TRACE => "TRACE",
        }
    }

    pub fn is_post(self) -> bool {
        matches!(self, Self::POST)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of methods, e.g. the ones a route entry accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSet(u16);

impl MethodSet {
    pub const fn empty() -> Self {
        MethodSet(0)
    }

    /// What every page route takes: GET, HEAD, POST.
    pub fn pages() -> Self {
        MethodSet::empty()
            .with(HttpRequestMethod::GET)
            .with(HttpRequestMethod::HEAD)
            .with(HttpRequestMethod::POST)
    }

    pub fn with(self, method: HttpRequestMethod) -> Self {
        MethodSet(self.0 | method.bit())
    }

    pub fn contains(self, method: HttpRequestMethod) -> bool {
        self.0 & method.bit() != 0
    }
}
