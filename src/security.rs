//! Response headers for full page builds.

use std::borrow::Cow;

use itertools::Itertools;
use rouille::Response;

/// Sent with every full page, regardless of content.
pub const HARDENING_HEADERS: &[(&str, &str)] = &[
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("Permissions-Policy", "camera=(), microphone=(), geolocation=()"),
    ("Cross-Origin-Opener-Policy", "same-origin"),
];

/// The Content-Security-Policy for a page whose inline scripts and
/// styles carry `nonce`.
pub fn content_security_policy(nonce: &str) -> String {
    [
        "default-src 'self'".to_string(),
        format!("script-src 'self' 'nonce-{nonce}'"),
        format!("style-src 'self' 'nonce-{nonce}'"),
        "img-src 'self' data:".to_string(),
        "object-src 'none'".to_string(),
        "base-uri 'self'".to_string(),
        "form-action 'self'".to_string(),
        "frame-ancestors 'none'".to_string(),
    ].iter().join("; ")
}

pub fn add_security_headers(response: &mut Response, nonce: &str) {
    response.headers.push((Cow::from("Content-Security-Policy"),
                           Cow::from(content_security_policy(nonce))));
    for (k, v) in HARDENING_HEADERS {
        response.headers.push((Cow::from(*k), Cow::from(*v)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webutils::response_header;

    #[test]
    fn t_csp() {
        let csp = content_security_policy("abc=");
        assert!(csp.starts_with("default-src 'self'; script-src 'self' 'nonce-abc='; "));
        assert!(csp.contains("style-src 'self' 'nonce-abc='"));
        assert!(csp.ends_with("frame-ancestors 'none'"));
    }

    #[test]
    fn t_add_security_headers() {
        let mut r = Response::text("x");
        add_security_headers(&mut r, "n1");
        assert!(response_header(&r, "content-security-policy").unwrap().contains("'nonce-n1'"));
        assert_eq!(response_header(&r, "X-Frame-Options"), Some("DENY"));
        assert_eq!(response_header(&r, "X-Content-Type-Options"), Some("nosniff"));
    }
}
