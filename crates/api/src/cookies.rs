//! Cookie reading and writing without a cookie-jar dependency.
//!
//! The session subsystem needs exactly three cookie behaviours: read a
//! named cookie from the `Cookie` header, issue an httpOnly path-scoped
//! cookie with a max-age, and clear one. Values are opaque tokens we
//! mint ourselves, so no quoting or encoding is involved.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Read a named cookie from the request headers.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get_all(COOKIE).iter().find_map(|value| {
        let value = value.to_str().ok()?;
        value.split(';').find_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            (k == name).then_some(v)
        })
    })
}

/// Build a `Set-Cookie` value for an httpOnly, path-scoped cookie.
pub fn build_cookie(name: &str, value: &str, path: &str, max_age_secs: i64) -> String {
    format!("{name}={value}; Path={path}; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax")
}

/// Build a `Set-Cookie` value that expires a cookie immediately.
pub fn clear_cookie(name: &str, path: &str) -> String {
    format!("{name}=; Path={path}; Max-Age=0; HttpOnly; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn finds_cookie_among_several() {
        let headers = headers_with_cookie("a=1; ob_session=tok-123; b=2");
        assert_eq!(get_cookie(&headers, "ob_session"), Some("tok-123"));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn exact_name_match_only() {
        let headers = headers_with_cookie("onb_abc=x; onb_abcdef=y");
        assert_eq!(get_cookie(&headers, "onb_abc"), Some("x"));
        assert_eq!(get_cookie(&headers, "onb_abcdef"), Some("y"));
    }

    #[test]
    fn searches_across_multiple_cookie_headers() {
        let mut headers = headers_with_cookie("a=1");
        headers.append(COOKIE, HeaderValue::from_static("ob_session=t"));
        assert_eq!(get_cookie(&headers, "ob_session"), Some("t"));
    }

    #[test]
    fn built_cookie_carries_scope_and_lifetime() {
        let cookie = build_cookie("onb_x", "1", "/api/session", 3590);
        assert!(cookie.contains("Path=/api/session"));
        assert!(cookie.contains("Max-Age=3590"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn cleared_cookie_has_zero_max_age() {
        let cookie = clear_cookie("facebook_oauth_state", "/api/oauth/facebook/callback");
        assert!(cookie.starts_with("facebook_oauth_state=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
