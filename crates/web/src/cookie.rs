//! Cookies as parsed from a `Cookie` request header and as written with
//! `Set-Cookie` response headers.

use std::fmt;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::debug;

/// How long a "permanent" cookie lives.
pub const PERMANENT_COOKIE_LIFETIME: Duration = Duration::from_secs(20 * 365 * 24 * 60 * 60);

const ROOT_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
    domain: Option<String>,
    /// `None` means the cookie never expires (a session cookie).
    expires: Option<SystemTime>,
    secure: bool,
    http_only: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CookieError {
    #[error("invalid cookie name: {name:?}")]
    InvalidName { name: String },

    #[error("invalid value for cookie {name:?}")]
    InvalidValue { name: String },
}

impl CookieError {
    pub fn invalid_name<S: ToString>(name: S) -> Self {
        Self::InvalidName { name: name.to_string() }
    }

    pub fn invalid_value<S: ToString>(name: S) -> Self {
        Self::InvalidValue { name: name.to_string() }
    }
}

impl Cookie {
    /// Creates a cookie without validating `name` or `value`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Creates a cookie, rejecting names and values that can't be carried in
    /// a cookie header.
    pub fn try_new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, CookieError> {
        let cookie = Self::new(name, value);

        if !is_valid_name(&cookie.name) {
            return Err(CookieError::invalid_name(&cookie.name));
        }
        if !is_valid_value(&cookie.value) {
            return Err(CookieError::invalid_value(&cookie.name));
        }
        Ok(cookie)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires(mut self, expires: SystemTime) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn expires(&self) -> Option<SystemTime> {
        self.expires
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Renders the value of a `Set-Cookie` header:
    /// `name=value[; expires=<IMF-fixdate>][; path=..][; domain=..][; secure][; httponly]`.
    pub fn to_set_cookie(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = self.expires {
            write!(f, "; expires={}", httpdate::fmt_http_date(expires))?;
        }
        if let Some(path) = &self.path {
            write!(f, "; path={path}")?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; domain={domain}")?;
        }
        if self.secure {
            f.write_str("; secure")?;
        }
        if self.http_only {
            f.write_str("; httponly")?;
        }
        Ok(())
    }
}

/// Parses a `Cookie` request header.
///
/// Pairs are separated by `"; "` and must split on `=` into exactly two
/// parts; anything else, and any pair that fails validation, is skipped.
/// Every parsed cookie carries the path `/`. When a name repeats, the last
/// value wins.
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    let mut cookies: Vec<Cookie> = Vec::new();

    for pair in header.split("; ") {
        let parts = pair.split('=').collect::<Vec<_>>();
        let [name, value] = parts.as_slice() else {
            debug!(pair, "skip malformed cookie pair");
            continue;
        };

        let cookie = match Cookie::try_new(*name, *value) {
            Ok(cookie) => cookie.with_path(ROOT_PATH),
            Err(e) => {
                debug!(error = %e, "skip invalid cookie");
                continue;
            }
        };

        match cookies.iter_mut().find(|existing| existing.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => cookies.push(cookie),
        }
    }

    cookies
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('$')
        && name.chars().all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c))
}

fn is_valid_value(value: &str) -> bool {
    value.chars().all(|c| !c.is_control() && !c.is_whitespace() && c != ';' && c != ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_several_pairs() {
        let cookies = parse_cookie_header("ss-id=0SJVAVnpdJc2kWkz8DXS; ss-pid=dOFpDDkr; API-SESSION-ID=17-4ab0");

        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[2].name(), "API-SESSION-ID");
        assert_eq!(cookies[2].value(), "17-4ab0");
        assert!(cookies.iter().all(|cookie| cookie.path() == Some("/")));
    }

    #[test]
    fn parse_skips_malformed_pairs() {
        let cookies = parse_cookie_header("novalue; a=b=c; =empty-name; ok=1");

        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name(), "ok");
    }

    #[test]
    fn parse_last_duplicate_wins() {
        let cookies = parse_cookie_header("id=first; other=x; id=second");

        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name(), "id");
        assert_eq!(cookies[0].value(), "second");
    }

    #[test]
    fn try_new_validates() {
        assert_eq!(Cookie::try_new("a b", "v"), Err(CookieError::invalid_name("a b")));
        assert_eq!(Cookie::try_new("$Version", "1"), Err(CookieError::invalid_name("$Version")));
        assert_eq!(Cookie::try_new("name", "a,b"), Err(CookieError::invalid_value("name")));
        assert!(Cookie::try_new("name", "").is_ok());
    }

    #[test]
    fn set_cookie_minimal() {
        assert_eq!(Cookie::new("session", "abc").to_set_cookie(), "session=abc");
    }

    #[test]
    fn set_cookie_with_every_attribute() {
        let expires = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        let cookie = Cookie::new("id", "42")
            .with_expires(expires)
            .with_path("/")
            .with_domain("localhost")
            .with_secure(true)
            .with_http_only(true);

        assert_eq!(
            cookie.to_set_cookie(),
            "id=42; expires=Sun, 06 Nov 1994 08:49:37 GMT; path=/; domain=localhost; secure; httponly"
        );
    }
}
