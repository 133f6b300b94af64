use anyhow::{Result, anyhow, Context};
use rouille::Request;
use rouille::input::post::raw_urlencoded_post_input;
use serde_json::Value;

use crate::url_encoding::parse_query_string;

pub const PARTIAL_HEADER: &str = "X-Page-Request";

/// True for requests made by the client script that want a JSON
/// fragment instead of a full document.
pub fn is_partial_request(request: &Request) -> bool {
    request.header("X-Requested-With")
        .map_or(false, |v| v.eq_ignore_ascii_case("XMLHttpRequest"))
        || request.header(PARTIAL_HEADER)
        .map_or(false, |v| v.eq_ignore_ascii_case("partial"))
}

fn content_type(request: &Request) -> Option<String> {
    request.header("Content-Type").map(|ct| {
        ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
    })
}

/// Query parameters followed by the parameters in the body (form
/// encoded or a flat JSON object). Reads the body, so call at most
/// once per request.
pub fn request_params(request: &Request) -> Result<Vec<(String, String)>> {
    let mut params = parse_query_string(request.raw_query_string())
        .with_context(|| anyhow!("decoding query string"))?;
    if request.method() != "POST" {
        return Ok(params)
    }
    match content_type(request).as_deref() {
        Some("application/x-www-form-urlencoded") => {
            let form = raw_urlencoded_post_input(request).map_err(
                |e| anyhow!("reading form data: {e}"))?;
            params.extend(form);
        }
        Some("application/json") => {
            let value: Value = rouille::input::json_input(request).map_err(
                |e| anyhow!("reading JSON body: {e}"))?;
            if let Value::Object(obj) = value {
                for (k, v) in obj {
                    let v = match v {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    params.push((k, v));
                }
            }
        }
        _ => (),
    }
    Ok(params)
}
