//! URL handling for request adapters: resolution against the local
//! authority, path and query splitting, percent decoding.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::params::ValueMap;

/// Authority root-relative URLs are resolved against.
pub const LOCAL_AUTHORITY: &str = "http://localhost";

/// Turns the wire URL into an absolute one. An empty URL means `/`.
pub(crate) fn resolve(url: &str) -> String {
    if url.is_empty() {
        format!("{LOCAL_AUTHORITY}/")
    } else if url.starts_with('/') {
        format!("{LOCAL_AUTHORITY}{url}")
    } else {
        url.to_string()
    }
}

/// Splits an absolute URL into its path and optional query, dropping any fragment.
pub(crate) fn split(absolute: &str) -> (&str, Option<&str>) {
    let without_fragment = absolute.split('#').next().unwrap_or(absolute);

    let after_scheme = match without_fragment.find("://") {
        Some(pos) => &without_fragment[pos + 3..],
        None => without_fragment,
    };
    let path_and_query = match after_scheme.find(['/', '?']) {
        Some(pos) => &after_scheme[pos..],
        None => "",
    };

    match path_and_query.split_once('?') {
        Some(("", query)) => ("/", Some(query)),
        Some((path, query)) => (path, Some(query)),
        None if path_and_query.is_empty() => ("/", None),
        None => (path_and_query, None),
    }
}

/// Decodes a query string component: `+` is a space, then percent escapes.
pub(crate) fn decode_component(component: &str) -> String {
    let component = component.replace('+', " ");
    percent_decode_str(&component).decode_utf8_lossy().into_owned()
}

/// Decodes percent escapes in a path; `+` is kept as is.
pub(crate) fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

/// Parses `a=1&b=2`. A key without `=` gets an empty value, empty segments are skipped.
pub(crate) fn parse_query(query: &str) -> ValueMap {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
        .map(|(key, value)| (decode_component(key), decode_component(value)))
        .collect()
}

/// Removes the handler mount path from the front of `path`.
///
/// The comparison ignores ASCII case and leading or trailing slashes, and only
/// matches whole segments: `/api/ping` loses `api`, `/apiary` does not.
pub(crate) fn strip_handler_path(path: &str, handler_path: &str) -> String {
    let handler_path = handler_path.trim_matches('/');
    let trimmed = path.trim_start_matches('/');

    if handler_path.is_empty() {
        return path.to_string();
    }

    let stripped = trimmed
        .get(..handler_path.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(handler_path))
        .map(|_| &trimmed[handler_path.len()..])
        .filter(|rest| rest.is_empty() || rest.starts_with('/'));

    match stripped {
        Some(rest) if rest.is_empty() => "/".to_string(),
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

/// The last non-empty segment of `path`.
pub(crate) fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute() {
        assert_eq!(resolve(""), "http://localhost/");
        assert_eq!(resolve("/api/ping"), "http://localhost/api/ping");
        assert_eq!(resolve("https://example.org/x"), "https://example.org/x");
    }

    #[test]
    fn split_path_and_query() {
        assert_eq!(split("http://localhost/api/ping?format=json#top"), ("/api/ping", Some("format=json")));
        assert_eq!(split("http://localhost"), ("/", None));
        assert_eq!(split("http://localhost?a=1"), ("/", Some("a=1")));
        assert_eq!(split("http://localhost/"), ("/", None));
    }

    #[test]
    fn parse_query_pairs() {
        let query = parse_query("format=json&test=name");

        assert_eq!(query.len(), 2);
        assert_eq!(query.get("format"), Some("json"));
        assert_eq!(query.get("test"), Some("name"));
    }

    #[test]
    fn parse_query_edge_cases() {
        let query = parse_query("flag&&name=a+b%26c&empty=");

        assert_eq!(query.len(), 3);
        assert_eq!(query.get("flag"), Some(""));
        assert_eq!(query.get("name"), Some("a b&c"));
        assert_eq!(query.get("empty"), Some(""));
    }

    #[test]
    fn decode_path_keeps_plus() {
        assert_eq!(decode_path("/files/a+b%20c"), "/files/a+b c");
    }

    #[test]
    fn strip_handler_path_by_segment() {
        assert_eq!(strip_handler_path("/api/ping", "api"), "/ping");
        assert_eq!(strip_handler_path("/API/ping", "/api/"), "/ping");
        assert_eq!(strip_handler_path("/api", "api"), "/");
        assert_eq!(strip_handler_path("/apiary", "api"), "/apiary");
        assert_eq!(strip_handler_path("/other/ping", "api"), "/other/ping");
        assert_eq!(strip_handler_path("/ping", ""), "/ping");
    }

    #[test]
    fn last_segment_of_path() {
        assert_eq!(last_segment("/api/users/42"), "42");
        assert_eq!(last_segment("/api/ping/"), "ping");
        assert_eq!(last_segment("/"), "");
    }
}
