//! Share credentials on the wire.
//!
//! A share travels in two carriers: cookies persisted by the browser across
//! requests, and headers that live for exactly one request. This module only
//! converts between those carriers and [`ShareCredentials`]; it never decides
//! whether a credential is trustworthy.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderName, HeaderValue};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};
use tracing::warn;

use crate::constants::{
    SHARE_ALBUM_ID_COOKIE, SHARE_ALBUM_ID_HEADER, SHARE_ALLOW_DOWNLOAD_COOKIE,
    SHARE_ALLOW_DOWNLOAD_HEADER, SHARE_KEY_COOKIE, SHARE_KEY_HEADER,
};
use crate::share::ShareContext;

const SHARE_COOKIES: [&str; 3] = [
    SHARE_KEY_COOKIE,
    SHARE_ALBUM_ID_COOKIE,
    SHARE_ALLOW_DOWNLOAD_COOKIE,
];

/// What a carrier holds. `allow_download` is `None` when the carrier had no
/// opinion, which readers treat as "allowed".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareCredentials {
    pub share_key: String,
    pub album_id: String,
    pub allow_download: Option<bool>,
}

impl From<&ShareContext> for ShareCredentials {
    fn from(ctx: &ShareContext) -> Self {
        Self {
            share_key: ctx.share_key.clone(),
            album_id: ctx.album_id.clone(),
            allow_download: Some(ctx.allow_download),
        }
    }
}

/// Cookie lifetime in seconds: time left until expiry, at least one second,
/// or the default TTL for shares that never expire.
pub fn cookie_max_age(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    default_ttl_hours: i64,
) -> i64 {
    match expires_at {
        Some(expires_at) => (expires_at - now)
            .num_milliseconds()
            .div_euclid(1000)
            .max(1),
        None => default_ttl_hours * 60 * 60,
    }
}

fn share_cookie(
    name: &'static str,
    value: String,
    max_age: time::Duration,
    secure: bool,
) -> Cookie<'static> {
    // Client code reads these, so no HttpOnly.
    Cookie::build((name, value))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .http_only(false)
        .max_age(max_age)
        .build()
}

pub fn issue_cookies(
    credentials: &ShareCredentials,
    max_age_seconds: i64,
    secure: bool,
) -> Vec<Cookie<'static>> {
    let max_age = time::Duration::seconds(max_age_seconds);
    let mut cookies = vec![
        share_cookie(
            SHARE_KEY_COOKIE,
            credentials.share_key.clone(),
            max_age,
            secure,
        ),
        share_cookie(
            SHARE_ALBUM_ID_COOKIE,
            credentials.album_id.clone(),
            max_age,
            secure,
        ),
    ];

    if let Some(allow_download) = credentials.allow_download {
        cookies.push(share_cookie(
            SHARE_ALLOW_DOWNLOAD_COOKIE,
            allow_download.to_string(),
            max_age,
            secure,
        ));
    }

    cookies
}

/// Deletion cookies for every share cookie, whether or not the client has them.
pub fn removal_cookies(secure: bool) -> Vec<Cookie<'static>> {
    SHARE_COOKIES
        .into_iter()
        .map(|name| share_cookie(name, String::new(), time::Duration::ZERO, secure))
        .collect()
}

pub fn append_set_cookies(headers: &mut HeaderMap, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => warn!("Dropping unencodable cookie {}", cookie.name()),
        }
    }
}

fn parse_allow_download(value: &str) -> bool {
    value != "false"
}

pub fn read_cookies(jar: &CookieJar) -> ShareCredentials {
    let value = |name: &str| jar.get(name).map(|c| c.value().to_string());

    ShareCredentials {
        share_key: value(SHARE_KEY_COOKIE).unwrap_or_default(),
        album_id: value(SHARE_ALBUM_ID_COOKIE).unwrap_or_default(),
        allow_download: value(SHARE_ALLOW_DOWNLOAD_COOKIE).map(|v| parse_allow_download(&v)),
    }
}

pub fn read_headers(headers: &HeaderMap) -> ShareCredentials {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    ShareCredentials {
        share_key: value(SHARE_KEY_HEADER).unwrap_or_default(),
        album_id: value(SHARE_ALBUM_ID_HEADER).unwrap_or_default(),
        allow_download: value(SHARE_ALLOW_DOWNLOAD_HEADER).map(|v| parse_allow_download(&v)),
    }
}

fn header_value(name: &str, value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| {
        warn!("Share header {} carried an unencodable value", name);
        HeaderValue::from_static("")
    })
}

/// Overwrites the share headers. An unknown allow-download drops that header.
pub fn write_headers(headers: &mut HeaderMap, credentials: &ShareCredentials) {
    headers.insert(
        HeaderName::from_static(SHARE_KEY_HEADER),
        header_value(SHARE_KEY_HEADER, &credentials.share_key),
    );
    headers.insert(
        HeaderName::from_static(SHARE_ALBUM_ID_HEADER),
        header_value(SHARE_ALBUM_ID_HEADER, &credentials.album_id),
    );

    match credentials.allow_download {
        Some(allow_download) => {
            headers.insert(
                HeaderName::from_static(SHARE_ALLOW_DOWNLOAD_HEADER),
                HeaderValue::from_static(if allow_download { "true" } else { "false" }),
            );
        }
        None => {
            headers.remove(SHARE_ALLOW_DOWNLOAD_HEADER);
        }
    }
}

pub fn strip_headers(headers: &mut HeaderMap) {
    headers.remove(SHARE_KEY_HEADER);
    headers.remove(SHARE_ALBUM_ID_HEADER);
    headers.remove(SHARE_ALLOW_DOWNLOAD_HEADER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use chrono::Duration;

    fn credentials() -> ShareCredentials {
        ShareCredentials {
            share_key: "key-123".to_string(),
            album_id: "album-9".to_string(),
            allow_download: Some(false),
        }
    }

    #[test]
    fn test_max_age_from_expiry() {
        let now = Utc::now();
        assert_eq!(cookie_max_age(Some(now + Duration::seconds(90)), now, 240), 90);
        assert_eq!(
            cookie_max_age(Some(now + Duration::milliseconds(1999)), now, 240),
            1
        );
    }

    #[test]
    fn test_max_age_never_below_one_second() {
        let now = Utc::now();
        assert_eq!(cookie_max_age(Some(now + Duration::milliseconds(300)), now, 240), 1);
        assert_eq!(cookie_max_age(Some(now), now, 240), 1);
    }

    #[test]
    fn test_max_age_default_without_expiry() {
        assert_eq!(cookie_max_age(None, Utc::now(), 240), 864_000);
    }

    #[test]
    fn test_issued_cookie_attributes() {
        let cookies = issue_cookies(&credentials(), 120, true);
        assert_eq!(cookies.len(), 3);

        for cookie in &cookies {
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.http_only(), Some(false));
            assert_eq!(cookie.max_age(), Some(time::Duration::seconds(120)));
        }

        assert_eq!(cookies[0].name(), SHARE_KEY_COOKIE);
        assert_eq!(cookies[0].value(), "key-123");
        assert_eq!(cookies[1].value(), "album-9");
        assert_eq!(cookies[2].value(), "false");
    }

    #[test]
    fn test_unknown_allow_download_issues_two_cookies() {
        let creds = ShareCredentials {
            allow_download: None,
            ..credentials()
        };
        assert_eq!(issue_cookies(&creds, 10, false).len(), 2);
    }

    #[test]
    fn test_removal_cookies_expire_immediately() {
        let cookies = removal_cookies(false);
        assert_eq!(cookies.len(), 3);
        for cookie in cookies {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
            assert_eq!(cookie.path(), Some("/"));
        }
    }

    #[test]
    fn test_set_cookie_headers_read_back() {
        let mut response_headers = HeaderMap::new();
        append_set_cookies(&mut response_headers, &issue_cookies(&credentials(), 60, false));
        assert_eq!(response_headers.get_all(SET_COOKIE).iter().count(), 3);

        // Browser echo: name=value pairs only.
        let echoed = response_headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| {
                let raw = v.to_str().unwrap();
                raw.split(';').next().unwrap().to_string()
            })
            .collect::<Vec<_>>()
            .join("; ");
        let mut request_headers = HeaderMap::new();
        request_headers.insert(COOKIE, HeaderValue::from_str(&echoed).unwrap());

        let jar = CookieJar::from_headers(&request_headers);
        assert_eq!(read_cookies(&jar), credentials());
    }

    #[test]
    fn test_headers_overwrite_and_strip() {
        let mut headers = HeaderMap::new();
        headers.insert(SHARE_KEY_HEADER, HeaderValue::from_static("spoofed"));
        headers.insert(SHARE_ALLOW_DOWNLOAD_HEADER, HeaderValue::from_static("true"));

        let creds = ShareCredentials {
            allow_download: None,
            ..credentials()
        };
        write_headers(&mut headers, &creds);
        assert_eq!(read_headers(&headers), creds);

        strip_headers(&mut headers);
        assert_eq!(read_headers(&headers), ShareCredentials::default());
    }

    #[test]
    fn test_allow_download_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(SHARE_ALLOW_DOWNLOAD_HEADER, HeaderValue::from_static("nope"));
        assert_eq!(read_headers(&headers).allow_download, Some(true));

        headers.insert(SHARE_ALLOW_DOWNLOAD_HEADER, HeaderValue::from_static("false"));
        assert_eq!(read_headers(&headers).allow_download, Some(false));
    }
}
