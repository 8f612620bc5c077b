//! URL classification for `href` / `src` values.

use url::Url;

/// Schemes an absolute URL may carry and still be embedded.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "data"];

/// Prefixes that mark a relative reference; these are accepted unparsed.
const RELATIVE_PREFIXES: &[&str] = &["/", "./", "../"];

/// Returns `true` if `url` is safe to embed in an `href` or `src` attribute.
///
/// Relative references (`/`, `./`, `../`) are always accepted. Anything else
/// must parse as an absolute URL with an `http`, `https` or `data` scheme.
/// Parse failures count as unsafe.
///
/// ```
/// use rich_content::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/a.png"));
/// assert!(is_valid_url("../img/cat.png"));
/// assert!(!is_valid_url("javascript:alert(1)"));
/// assert!(!is_valid_url(""));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if RELATIVE_PREFIXES.iter().any(|p| url.starts_with(p)) {
        return true;
    }
    match Url::parse(url) {
        Ok(parsed) => ALLOWED_SCHEMES.contains(&parsed.scheme()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(is_valid_url("https://x.com"));
        assert!(is_valid_url("http://example.org/path?q=1#frag"));
    }

    #[test]
    fn accepts_data_urls() {
        assert!(is_valid_url("data:image/png;base64,iVBORw0KGgo="));
    }

    #[test]
    fn accepts_relative_references() {
        assert!(is_valid_url("/a/b"));
        assert!(is_valid_url("./local.png"));
        assert!(is_valid_url("../up/one.html"));
        assert!(is_valid_url("//cdn.example.com/x.js"));
    }

    #[test]
    fn rejects_script_schemes() {
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("JavaScript:alert(1)"));
        assert!(!is_valid_url("vbscript:msgbox(1)"));
        assert!(!is_valid_url("  javascript:alert(1)"));
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(!is_valid_url("ftp://x.com"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("file:///etc/passwd"));
    }

    #[test]
    fn rejects_empty_and_unparseable() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("page.html"));
    }
}
