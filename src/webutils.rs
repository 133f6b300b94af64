use std::borrow::Cow;

use rouille::{Response, ResponseBody};
use serde_json::Value;

use crate::http_response_status_codes::HttpResponseStatusCode;


pub fn errorpage_from_status(status: HttpResponseStatusCode) -> Response {
    let title = status.title();
    let explanation = html_escape(status.desc());
    let resp = format!("<html><head><title>{title}</title></head><body><h1>{title}</h1>\
                        <p>{explanation}</p></body></html>\n");
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"), Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(resp),
        upgrade: None,
    }
}

pub fn htmlresponse(status: HttpResponseStatusCode, body: String) -> Response {
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"),
                       Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(body),
        upgrade: None,
    }
}

pub fn jsonresponse(value: &Value) -> Response {
    Response::json(value)
}

/// Redirect to `target`; `status` must be a redirect.
pub fn redirect(status: HttpResponseStatusCode, target: &str) -> Response {
    match status {
        HttpResponseStatusCode::SeeOther303 => Response::redirect_303(target.to_string()),
        _ => {
            debug_assert!(status.is_redirect(), "not a redirect: {status:?}");
            Response::redirect_302(target.to_string())
        }
    }
}

fn escape_chars(s: &str, braces: bool) -> Cow<str> {
    let special = |c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')
        || (braces && matches!(c, '{' | '}'));
    if !s.contains(special) {
        return Cow::Borrowed(s)
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' if braces => out.push_str("&#123;"),
            '}' if braces => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape text for use in HTML element content and attribute values.
pub fn html_escape(s: &str) -> Cow<str> {
    escape_chars(s, false)
}

/// `html_escape` that also escapes braces, for request values put
/// into render data: they can't form `{{key}}` tokens then.
pub fn html_escape_inert(s: &str) -> Cow<str> {
    escape_chars(s, true)
}

/// The header value, if `response` carries the header.
pub fn response_header<'r>(response: &'r Response, name: &str) -> Option<&'r str> {
    response.headers.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_ref())
}
