//! Conversion of the Markdown subset produced by the editor and by AI
//! assistants into HTML fragments.
//!
//! Rules run in a fixed order and later rules rely on earlier ones having
//! consumed their syntax. Converted code (fenced and inline) is parked behind
//! placeholders until the end so no later rule can rewrite it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::policy::{INLINE_CODE_CLASS, QUOTE_CLASS};
use crate::url::is_valid_url;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("valid pattern ", stringify!($name))));
    };
}

pattern!(CODE_FENCE, r"(?s)```([A-Za-z0-9_+#-]*)[^\n]*\n(.*?)```");
pattern!(INLINE_CODE, r"`([^`\n]+)`");
pattern!(HEADING, r"(?m)^(#{1,6})[ \t]+(.+)$");
pattern!(BOLD, r"\*\*([^*\s](?:[^*\n]*[^*\s])?)\*\*");
pattern!(ITALIC, r"\*([^*\s](?:[^*\n]*[^*\s])?)\*");
pattern!(LINK, r#"(!?)\[([^\]\n]*)\]\(([^)\s]+)(?:\s+"[^"\n]*")?\)"#);
pattern!(IMAGE, r#"!\[([^\]\n]*)\]\(([^)\s]+)(?:\s+"[^"\n]*")?\)"#);
pattern!(BLOCKQUOTE, r"(?m)^>[ \t]?(.*)$");
pattern!(ORDERED_ITEM, r"^\s*\d+\.\s+(.*)$");
pattern!(UNORDERED_ITEM, r"^\s*[-*+]\s+(.*)$");
pattern!(PLACEHOLDER, "\u{E000}[BI]([0-9]+)\u{E001}");

pattern!(DETECT_HEADING, r"(?m)^#{1,6}\s+\S");
pattern!(DETECT_BOLD, r"\*\*[^*\n]+\*\*");
pattern!(DETECT_ITALIC, r"\*[^*\n]+\*");
pattern!(DETECT_UNORDERED, r"(?m)^\s*[-*+]\s+\S");
pattern!(DETECT_ORDERED, r"(?m)^\s*\d+\.\s+\S");
pattern!(DETECT_QUOTE, r"(?m)^>\s?");
pattern!(DETECT_INLINE_CODE, r"`[^`\n]+`");
pattern!(DETECT_LINK, r"\[[^\]\n]+\]\([^)\n]+\)");
pattern!(DETECT_IMAGE, r"!\[[^\]\n]*\]\([^)\n]+\)");

/// Line prefixes that mark a line as block-level, ending any open paragraph.
const BLOCK_PREFIXES: &[&str] = &[
    "<h1",
    "<h2",
    "<h3",
    "<h4",
    "<h5",
    "<h6",
    "<ul",
    "<ol",
    "<li",
    "<blockquote",
    "<pre",
    "<table",
    "<div",
    "<hr",
    "<p>",
    "<p ",
    "\u{E000}B",
];

/// Returns `true` if `text` looks like Markdown rather than HTML.
///
/// A fenced code block decides it alone. Otherwise one match of any of the
/// heading, emphasis, list, blockquote, inline-code, link or image patterns
/// is enough, so HTML containing a stray `*` or `# ` is routed as Markdown.
pub fn looks_like_markdown(text: &str) -> bool {
    if text.contains("```") {
        return true;
    }
    [
        &DETECT_HEADING,
        &DETECT_BOLD,
        &DETECT_ITALIC,
        &DETECT_UNORDERED,
        &DETECT_ORDERED,
        &DETECT_QUOTE,
        &DETECT_INLINE_CODE,
        &DETECT_LINK,
        &DETECT_IMAGE,
    ]
    .iter()
    .any(|re| re.is_match(text))
}

/// Converts Markdown to HTML.
///
/// The output is not sanitized; pass it through
/// [`sanitize_html`](crate::sanitize_html) before rendering.
///
/// ```
/// use rich_content::markdown_to_html;
///
/// assert_eq!(
///     markdown_to_html("# Title\n\n**bold** and *italic*"),
///     "<h1>Title</h1>\n<p><strong>bold</strong> and <em>italic</em></p>"
/// );
/// ```
pub fn markdown_to_html(markdown: &str) -> String {
    let text: String = markdown
        .replace("\r\n", "\n")
        .chars()
        .filter(|c| *c != PLACEHOLDER_OPEN && *c != PLACEHOLDER_CLOSE)
        .collect();
    let mut fragments: Vec<String> = Vec::new();

    let text = CODE_FENCE.replace_all(&text, |caps: &Captures| {
        let lang = match &caps[1] {
            "" => "text",
            lang => lang,
        };
        let code = caps[2].strip_suffix('\n').unwrap_or(&caps[2]);
        fragments.push(format!(
            "<pre><code class=\"language-{lang}\">{}</code></pre>",
            html_escape::encode_text(code)
        ));
        format!("\n{PLACEHOLDER_OPEN}B{}{PLACEHOLDER_CLOSE}\n", fragments.len() - 1)
    });

    let text = INLINE_CODE.replace_all(&text, |caps: &Captures| {
        fragments.push(format!(
            "<code class=\"{INLINE_CODE_CLASS}\">{}</code>",
            html_escape::encode_text(&caps[1])
        ));
        format!("{PLACEHOLDER_OPEN}I{}{PLACEHOLDER_CLOSE}", fragments.len() - 1)
    });

    let text = HEADING.replace_all(&text, |caps: &Captures| {
        let level = caps[1].len();
        format!("<h{level}>{}</h{level}>", caps[2].trim())
    });

    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");

    let text = LINK.replace_all(&text, |caps: &Captures| {
        if &caps[1] == "!" {
            return caps[0].to_string();
        }
        let (label, url) = (&caps[2], &caps[3]);
        if is_valid_url(url) {
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>",
                html_escape::encode_double_quoted_attribute(url)
            )
        } else {
            tracing::debug!("Markdown link with unsafe URL rendered as text: {url}");
            label.to_string()
        }
    });

    let text = IMAGE.replace_all(&text, |caps: &Captures| {
        let (alt, src) = (&caps[1], &caps[2]);
        if is_valid_url(src) {
            format!(
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                html_escape::encode_double_quoted_attribute(src),
                html_escape::encode_double_quoted_attribute(alt)
            )
        } else {
            tracing::debug!("Markdown image with unsafe URL dropped: {src}");
            String::new()
        }
    });

    let text = BLOCKQUOTE.replace_all(
        &text,
        format!("<blockquote class=\"{QUOTE_CLASS}\">$1</blockquote>").as_str(),
    );

    let lines = group_lists(&text);
    let html = group_paragraphs(&lines).join("\n");

    PLACEHOLDER
        .replace_all(&html, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| fragments.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }
}

/// Folds each maximal run of same-kind list lines into one list element.
fn group_lists(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current: Option<(ListKind, Vec<String>)> = None;

    fn flush(out: &mut Vec<String>, current: &mut Option<(ListKind, Vec<String>)>) {
        if let Some((kind, items)) = current.take() {
            let tag = kind.tag();
            let items: String = items.iter().map(|i| format!("<li>{i}</li>")).collect();
            out.push(format!("<{tag}>{items}</{tag}>"));
        }
    }

    for line in text.lines() {
        let item = if let Some(caps) = ORDERED_ITEM.captures(line) {
            Some((ListKind::Ordered, caps[1].trim().to_string()))
        } else {
            UNORDERED_ITEM
                .captures(line)
                .map(|caps| (ListKind::Unordered, caps[1].trim().to_string()))
        };

        match item {
            Some((kind, item)) => match current.as_mut() {
                Some((open, items)) if *open == kind => items.push(item),
                _ => {
                    flush(&mut out, &mut current);
                    current = Some((kind, vec![item]));
                }
            },
            None => {
                flush(&mut out, &mut current);
                out.push(line.to_string());
            }
        }
    }
    flush(&mut out, &mut current);
    out
}

/// Wraps runs of plain lines in `<p>`, splitting on blank and block-level lines.
fn group_paragraphs(lines: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    fn flush(out: &mut Vec<String>, paragraph: &mut Vec<&str>) {
        if !paragraph.is_empty() {
            out.push(format!("<p>{}</p>", paragraph.join(" ")));
            paragraph.clear();
        }
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut out, &mut paragraph);
        } else if BLOCK_PREFIXES.iter().any(|p| line.starts_with(p)) {
            flush(&mut out, &mut paragraph);
            out.push(line.to_string());
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut out, &mut paragraph);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_emphasis() {
        assert_eq!(
            markdown_to_html("# Title\n\n**bold** and *italic*"),
            "<h1>Title</h1>\n<p><strong>bold</strong> and <em>italic</em></p>"
        );
        assert_eq!(markdown_to_html("###### tiny"), "<h6>tiny</h6>");
    }

    #[test]
    fn fenced_code_is_escaped_and_verbatim() {
        let md = "```rust\nfn main() {\n    let x = a < b && *p*;\n}\n```";
        assert_eq!(
            markdown_to_html(md),
            "<pre><code class=\"language-rust\">fn main() {\n    let x = a &lt; b &amp;&amp; *p*;\n}</code></pre>"
        );
    }

    #[test]
    fn fence_without_language_is_text() {
        assert_eq!(
            markdown_to_html("```\nplain\n```"),
            "<pre><code class=\"language-text\">plain</code></pre>"
        );
    }

    #[test]
    fn inline_code_is_protected_from_emphasis() {
        assert_eq!(
            markdown_to_html("use `**kwargs` here"),
            "<p>use <code class=\"rich-text-inline-code\">**kwargs</code> here</p>"
        );
    }

    #[test]
    fn links_require_safe_urls() {
        assert_eq!(
            markdown_to_html("[home](https://x.com)"),
            "<p><a href=\"https://x.com\" target=\"_blank\" rel=\"noopener noreferrer\">home</a></p>"
        );
        assert_eq!(markdown_to_html("[bad](javascript:void)"), "<p>bad</p>");
    }

    #[test]
    fn images_are_not_eaten_by_the_link_rule() {
        assert_eq!(
            markdown_to_html("![cat](/cat.png)"),
            "<p><img src=\"/cat.png\" alt=\"cat\" loading=\"lazy\"></p>"
        );
        assert_eq!(markdown_to_html("a ![x](ftp://h/x.png) b"), "<p>a  b</p>");
    }

    #[test]
    fn blockquotes() {
        assert_eq!(
            markdown_to_html("> wise words"),
            "<blockquote class=\"rich-text-quote\">wise words</blockquote>"
        );
    }

    #[test]
    fn list_runs_become_single_lists() {
        assert_eq!(
            markdown_to_html("- a\n- b\n\n1. one\n2. two\n* c"),
            "<ul><li>a</li><li>b</li></ul>\n<ol><li>one</li><li>two</li></ol>\n<ul><li>c</li></ul>"
        );
    }

    #[test]
    fn paragraphs_join_lines_and_split_on_blocks() {
        assert_eq!(
            markdown_to_html("line one\nline two\n## Next\ntail"),
            "<p>line one line two</p>\n<h2>Next</h2>\n<p>tail</p>"
        );
    }

    #[test]
    fn detection_heuristic() {
        assert!(looks_like_markdown("```\ncode\n```"));
        assert!(looks_like_markdown("# heading"));
        assert!(looks_like_markdown("some **bold** text"));
        assert!(looks_like_markdown("- item"));
        assert!(looks_like_markdown("see [docs](/docs)"));
        assert!(!looks_like_markdown("<p>Plain <strong>html</strong></p>"));
        assert!(!looks_like_markdown("no markup at all"));
    }
}
