use pct_str::{PctStr, InvalidPctString};

// Own error type owning the string, so that it can travel in
// anyhow::Result without borrowing from the request.

#[derive(Debug, thiserror::Error)]
#[error("url decoding error: {0}")]
pub struct UrlDecodingError(Box<String>);

impl From<InvalidPctString<&str>> for UrlDecodingError {
    fn from(e: InvalidPctString<&str>) -> Self {
        Self(Box::new(format!("{}", e)))
    }
}

pub fn url_decode(s: &str) -> Result<String, UrlDecodingError> {
    let p = PctStr::new(s)?;
    Ok(p.decode())
}

/// Decoding for `application/x-www-form-urlencoded` data and query
/// strings, where `+` stands for a space.
pub fn form_decode(s: &str) -> Result<String, UrlDecodingError> {
    if s.contains('+') {
        url_decode(&s.replace('+', "%20"))
    } else {
        url_decode(s)
    }
}

/// `a=1&b=x+y&flag` to `[("a","1"), ("b","x y"), ("flag","")]`.
pub fn parse_query_string(s: &str) -> Result<Vec<(String, String)>, UrlDecodingError> {
    let mut v = Vec::new();
    for partraw in s.split('&') {
        if partraw.is_empty() {
            continue
        }
        if let Some((key, val)) = partraw.split_once('=') {
            v.push((form_decode(key)?, form_decode(val)?));
        } else {
            v.push((form_decode(partraw)?, String::new()));
        }
    }
    Ok(v)
}
