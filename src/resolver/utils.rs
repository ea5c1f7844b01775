//! Shared helpers for resolver modules: static regexes and link absolutization.

use url::Url;

use super::ResolveError;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> regex::Regex {
    regex::Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Resolves a possibly relative link against `base_url`.
///
/// Absolute http(s) links pass through; `//host/...` becomes `https://host/...`.
///
/// # Errors
///
/// Returns [`ResolveError::Decode`] if `base_url` is not a URL or the join fails.
pub fn absolutize_url(link: &str, base_url: &str) -> Result<String, ResolveError> {
    if link.starts_with("http://") || link.starts_with("https://") {
        return Ok(link.to_string());
    }
    if link.starts_with("//") {
        return Ok(format!("https:{link}"));
    }
    Url::parse(base_url)
        .and_then(|base| base.join(link))
        .map(String::from)
        .map_err(|_| ResolveError::decode(link, base_url))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize_url_joins_root_relative_link() {
        let url = absolutize_url("/files/42/manual.pdf", "https://www.kiatechinfo.com").unwrap();
        assert_eq!(url, "https://www.kiatechinfo.com/files/42/manual.pdf");
    }

    #[test]
    fn test_absolutize_url_keeps_absolute_link() {
        let url = absolutize_url("https://cdn.example/a.pdf", "https://base.example").unwrap();
        assert_eq!(url, "https://cdn.example/a.pdf");
    }

    #[test]
    fn test_absolutize_url_scheme_relative_link() {
        let url = absolutize_url("//cdn.example/a.pdf", "http://base.example").unwrap();
        assert_eq!(url, "https://cdn.example/a.pdf");
    }

    #[test]
    fn test_absolutize_url_invalid_base_is_decode_error() {
        let err = absolutize_url("/a.pdf", "not a base").unwrap_err();
        assert!(matches!(err, ResolveError::Decode { .. }));
    }
}
