//! URL discovery in plain text.
//!
//! The pattern is a heuristic: it accepts `http://` and `https://` followed
//! by letters, digits, any character in the ASCII range `$`..=`_`, the
//! literals `@ . & + ! * ( ) ,`, or percent-encoded octets. The `$-_` range
//! covers `/ : ; = ? [ ]` and friends, so trailing punctuation such as `,`
//! `)` or `.` is swallowed, while `#`, `~`, whitespace and non-ASCII stop a
//! match. Tests below pin both sides of that behavior.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("URL pattern is valid")
});

/// A URL-shaped substring found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch<'t> {
    /// The matched text.
    pub url: &'t str,
    /// Byte range of the match in the scanned text.
    pub span: Range<usize>,
}

/// Find every URL-shaped substring in `text`, left to right.
pub fn find_urls(text: &str) -> impl Iterator<Item = UrlMatch<'_>> {
    URL_PATTERN.find_iter(text).map(|m| UrlMatch {
        url: m.as_str(),
        span: m.range(),
    })
}

/// Surrounding text for a match: `radius` characters on each side of the
/// byte range `span` (match included), newlines collapsed to spaces, trimmed.
pub fn context_window(text: &str, span: Range<usize>, radius: usize) -> String {
    let before = &text[..span.start];
    let start = before
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let start = if radius == 0 { span.start } else { start };

    let after = &text[span.end..];
    let end = after
        .char_indices()
        .nth(radius)
        .map(|(i, _)| span.end + i)
        .unwrap_or(text.len());

    text[start..end]
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn urls(text: &str) -> Vec<&str> {
        find_urls(text).map(|m| m.url).collect()
    }

    #[test]
    fn test_finds_http_and_https() {
        assert_eq!(
            urls("see http://example.com/path and https://rust-lang.org/learn now"),
            vec!["http://example.com/path", "https://rust-lang.org/learn"]
        );
    }

    #[test]
    fn test_query_strings_and_percent_escapes() {
        assert_eq!(
            urls("go to https://x.test/search?q=a%20b&lang=en today"),
            vec!["https://x.test/search?q=a%20b&lang=en"]
        );
    }

    #[test]
    fn test_trailing_punctuation_is_included() {
        assert_eq!(urls("(see http://example.com/a)."), vec!["http://example.com/a)."]);
        assert_eq!(urls("http://a.test, http://b.test"), vec!["http://a.test,", "http://b.test"]);
    }

    #[test]
    fn test_stops_at_fragment_and_tilde() {
        assert_eq!(urls("http://a.test/page#top"), vec!["http://a.test/page"]);
        assert_eq!(urls("http://a.test/~user"), vec!["http://a.test/"]);
    }

    #[test]
    fn test_stops_at_whitespace_and_non_ascii() {
        assert_eq!(urls("http://a.test/café x"), vec!["http://a.test/caf"]);
    }

    #[test]
    fn test_requires_scheme_and_body() {
        assert!(urls("ftp://files.test www.example.com http://").is_empty());
        assert!(urls("HTTP://EXAMPLE.COM").is_empty());
    }

    #[test]
    fn test_match_spans() {
        let text = "abc https://x.test def";
        let m = find_urls(text).next().unwrap();
        assert_eq!(m.span, 4..18);
        assert_eq!(&text[m.span.clone()], m.url);
    }

    #[test]
    fn test_context_window() {
        let text = "Visit our site http://example.com/path for details.";
        let m = find_urls(text).next().unwrap();
        assert_eq!(
            context_window(text, m.span, 10),
            "our site http://example.com/path for detai"
        );
    }

    #[test]
    fn test_context_window_collapses_newlines_and_trims() {
        let text = "line one\nhttp://a.test\nline two";
        let m = find_urls(text).next().unwrap();
        assert_eq!(context_window(text, m.span, 4), "one http://a.test lin");

        let text = "\n\nhttp://a.test\n";
        let m = find_urls(text).next().unwrap();
        assert_eq!(context_window(text, m.span, 10), "http://a.test");
    }

    #[test]
    fn test_context_window_counts_chars_not_bytes() {
        let text = "ééé http://a.test ààà";
        let m = find_urls(text).next().unwrap();
        assert_eq!(context_window(text, m.span, 2), "é http://a.test à");
    }

    #[test]
    fn test_context_window_zero_radius() {
        let text = "x http://a.test y";
        let m = find_urls(text).next().unwrap();
        assert_eq!(context_window(text, m.span, 0), "http://a.test");
    }

    proptest! {
        #[test]
        fn prop_matches_start_with_scheme(s in "\\PC{0,80}") {
            for m in find_urls(&s) {
                prop_assert!(m.url.starts_with("http://") || m.url.starts_with("https://"));
                prop_assert_eq!(&s[m.span.clone()], m.url);
            }
        }

        #[test]
        fn prop_embedded_url_is_found(
            prefix in "[a-z ]{0,20}",
            host in "[a-z]{1,12}",
            path in "[a-z0-9/]{0,20}",
        ) {
            let url = format!("https://{host}.test/{path}");
            let text = format!("{prefix} {url} end");
            prop_assert_eq!(urls(&text), vec![url.as_str()]);
        }

        #[test]
        fn prop_window_contains_match(
            before in "[a-z\\n]{0,30}",
            after in "[a-z\\n]{0,30}",
            radius in 0usize..15,
        ) {
            let text = format!("{before} http://a.test/x {after}");
            let m = find_urls(&text).next().unwrap();
            let window = context_window(&text, m.span, radius);
            prop_assert!(window.contains("http://a.test/x"));
            prop_assert!(!window.contains('\n'));
        }
    }
}
