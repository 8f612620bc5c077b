//! Derived views over HTML: plain text, summaries, reading time, images,
//! links and aggregate statistics.
//!
//! Every function accepts `&str` or `None`; absent or empty input yields an
//! empty result rather than an error.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{Html, node::Node};

/// Default reading speed, in characters per minute.
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Default summary length, in characters.
pub const DEFAULT_SUMMARY_LENGTH: usize = 150;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("valid img pattern"));

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid img src pattern")
});

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\shref\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a\s*>"#)
        .expect("valid anchor pattern")
});

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<pre\b[^>]*>\s*<code\b").expect("valid code block pattern")
});

/// A hyperlink found in content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    /// Plain text of the anchor's content.
    pub text: String,
    pub href: String,
}

/// Aggregate statistics for a piece of content.
///
/// `word_count` equals `text_length`: text is measured in characters so that
/// CJK content, which has no word separators, is counted sensibly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentStats {
    pub text_length: usize,
    pub word_count: usize,
    /// Minutes, see [`calculate_reading_time`].
    pub reading_time: usize,
    pub image_count: usize,
    pub link_count: usize,
    pub code_block_count: usize,
    pub summary: String,
}

fn present<'a>(html: impl Into<Option<&'a str>>) -> Option<&'a str> {
    html.into().filter(|h| !h.is_empty())
}

/// Returns the text content of `html`, trimmed.
///
/// `<img>` tags are removed before the markup is parsed so nothing
/// downstream sees an image reference while the text is built.
///
/// ```
/// use rich_content::extract_text;
///
/// assert_eq!(extract_text(r#"<img src="x.png"><p>hi</p>"#), "hi");
/// assert_eq!(extract_text(None), "");
/// ```
pub fn extract_text<'a>(html: impl Into<Option<&'a str>>) -> String {
    let Some(html) = present(html) else {
        return String::new();
    };
    let without_images = IMG_TAG.replace_all(html, "");
    let fragment = Html::parse_fragment(&without_images);

    let mut text = String::new();
    collect_text(fragment.tree.root(), &mut text);
    text.trim().to_string()
}

fn collect_text(node: NodeRef<Node>, out: &mut String) {
    match node.value() {
        Node::Document | Node::Fragment | Node::Element(_) => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
        Node::Text(text) => out.push_str(text),
        _ => {}
    }
}

/// Estimated reading time in minutes: characters divided by
/// `words_per_minute`, rounded up, at least 1.
///
/// Absent or empty input reads in 0 minutes. A `words_per_minute` of 0 is
/// treated as 1.
pub fn calculate_reading_time<'a>(
    html: impl Into<Option<&'a str>>,
    words_per_minute: usize,
) -> usize {
    let Some(html) = present(html) else {
        return 0;
    };
    let length = extract_text(html).chars().count();
    length.div_ceil(words_per_minute.max(1)).max(1)
}

/// The text of `html` cut to `max_length` characters, with `...` appended
/// when anything was cut.
pub fn extract_summary<'a>(html: impl Into<Option<&'a str>>, max_length: usize) -> String {
    let text = extract_text(html);
    if text.chars().count() <= max_length {
        return text;
    }
    let mut summary: String = text.chars().take(max_length).collect();
    summary.push_str("...");
    summary
}

/// Returns `true` if `html` has no visible text.
pub fn is_empty<'a>(html: impl Into<Option<&'a str>>) -> bool {
    extract_text(html).is_empty()
}

/// The `src` of every `<img>`, in document order.
pub fn extract_images<'a>(html: impl Into<Option<&'a str>>) -> Vec<String> {
    let Some(html) = present(html) else {
        return Vec::new();
    };
    IMG_SRC
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Every `<a href=...>` with its text, in document order.
pub fn extract_links<'a>(html: impl Into<Option<&'a str>>) -> Vec<Link> {
    let Some(html) = present(html) else {
        return Vec::new();
    };
    ANCHOR
        .captures_iter(html)
        .map(|caps| Link {
            text: extract_text(&caps[2]),
            href: caps[1].to_string(),
        })
        .collect()
}

/// Collects all derived views of `html` at once, using the default reading
/// speed and summary length.
pub fn get_content_stats<'a>(html: impl Into<Option<&'a str>>) -> ContentStats {
    let Some(html) = present(html) else {
        return ContentStats::default();
    };
    let text_length = extract_text(html).chars().count();
    ContentStats {
        text_length,
        word_count: text_length,
        reading_time: calculate_reading_time(html, DEFAULT_WORDS_PER_MINUTE),
        image_count: extract_images(html).len(),
        link_count: extract_links(html).len(),
        code_block_count: CODE_BLOCK.find_iter(html).count(),
        summary: extract_summary(html, DEFAULT_SUMMARY_LENGTH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_skips_images_and_tags() {
        assert_eq!(extract_text(r#"<img src="x.png"><p>hi</p>"#), "hi");
        assert_eq!(extract_text("<p>a <b>b</b></p><p>c</p>"), "a bc");
    }

    #[test]
    fn text_decodes_entities() {
        assert_eq!(extract_text("<p>&lt;tag&gt; &amp; &quot;q&quot; &#39;s&#39;</p>"), "<tag> & \"q\" 's'");
    }

    #[test]
    fn absent_input_defaults() {
        assert_eq!(extract_text(None), "");
        assert_eq!(extract_summary(None, 10), "");
        assert_eq!(calculate_reading_time(None, 200), 0);
        assert!(is_empty(None));
        assert!(extract_images(None).is_empty());
        assert!(extract_links("").is_empty());
        assert_eq!(get_content_stats(None), ContentStats::default());
    }

    #[test]
    fn reading_time_counts_characters() {
        let html = format!("<p>{}</p>", "字".repeat(400));
        assert_eq!(calculate_reading_time(html.as_str(), 200), 2);
        assert_eq!(calculate_reading_time("<p>a</p>", 200), 1);
        assert_eq!(calculate_reading_time("<p>abc</p>", 0), 3);
    }

    #[test]
    fn summary_truncates_with_ellipsis() {
        let html = format!("<p>{}</p>", "a".repeat(200));
        let summary = extract_summary(html.as_str(), 150);
        assert_eq!(summary.chars().count(), 153);
        assert!(summary.ends_with("..."));
        assert_eq!(extract_summary("<p>short</p>", 150), "short");
    }

    #[test]
    fn summary_cuts_on_characters_not_bytes() {
        assert_eq!(extract_summary("<p>你好世界</p>", 2), "你好...");
    }

    #[test]
    fn emptiness_ignores_markup_and_nbsp() {
        assert!(is_empty("<p>&nbsp;</p><p> </p>"));
        assert!(is_empty(r#"<img src="/a.png">"#));
        assert!(!is_empty("<p>x</p>"));
    }

    #[test]
    fn images_in_order() {
        let html = r#"<img src="/a.png"><p>t</p><IMG alt="b" src='https://x.com/b.jpg'><img data-src="/no.png">"#;
        assert_eq!(extract_images(html), vec!["/a.png", "https://x.com/b.jpg"]);
    }

    #[test]
    fn links_with_text() {
        let html = r#"<p><a href="/one">One</a> and <a class="x" href="https://two.example"><b>Two</b></a></p>"#;
        assert_eq!(
            extract_links(html),
            vec![
                Link { text: "One".into(), href: "/one".into() },
                Link { text: "Two".into(), href: "https://two.example".into() },
            ]
        );
    }

    #[test]
    fn stats_aggregate_everything() {
        let html = concat!(
            r#"<p>Hello <a href="/x">link</a></p>"#,
            r#"<img src="/a.png">"#,
            r#"<pre><code class="language-rust">fn x() {}</code></pre>"#,
        );
        let stats = get_content_stats(html);
        assert_eq!(stats.text_length, "Hello linkfn x() {}".chars().count());
        assert_eq!(stats.word_count, stats.text_length);
        assert_eq!(stats.reading_time, 1);
        assert_eq!(stats.image_count, 1);
        assert_eq!(stats.link_count, 1);
        assert_eq!(stats.code_block_count, 1);
        assert_eq!(stats.summary, "Hello linkfn x() {}");
    }
}
