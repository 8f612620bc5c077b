//! Canonical presentation classes and the outer content container.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::markdown::{looks_like_markdown, markdown_to_html};
use crate::policy::{
    CODE_BLOCK_CLASS, CONTENT_CLASS, IMAGE_CLASS, INLINE_CODE_CLASS, LINK_CLASS, QUOTE_CLASS,
    TABLE_CLASS, TABLE_WRAPPER_CLASS,
};
use crate::sanitizer::sanitize_uncached;
use crate::sanitizer::tokenizer::{Token, Tokenizer, parse_attributes};
use crate::url::is_valid_url;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<pre\b([^>]*)>(\s*<code\b[^>]*>.*?</code>\s*)</pre\s*>")
        .expect("valid code-block pattern")
});

static INTER_TAG_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("valid whitespace pattern"));

static CODE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{E000}C([0-9]+)\u{E001}").expect("valid placeholder pattern")
});

type Attributes = Vec<(String, Option<String>)>;

/// Styles `html` for display; the uncached core of
/// [`ContentProcessor::add_content_styles`](crate::ContentProcessor::add_content_styles).
pub(crate) fn style_content(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    if html.contains(CONTENT_CLASS) {
        tracing::debug!("Content already styled, sanitizing only");
        return sanitize_uncached(html);
    }

    if looks_like_markdown(html) {
        tracing::debug!("Routing content through the Markdown converter");
        return wrap(&sanitize_uncached(&markdown_to_html(html)));
    }

    let input: String = html
        .chars()
        .filter(|c| *c != PLACEHOLDER_OPEN && *c != PLACEHOLDER_CLOSE)
        .collect();

    // Code whitespace is significant: park whole blocks before collapsing.
    let mut blocks: Vec<String> = Vec::new();
    let protected = CODE_BLOCK.replace_all(&input, |caps: &Captures| {
        let mut attributes = attributes_of(&caps[1]);
        add_class(&mut attributes, CODE_BLOCK_CLASS);
        blocks.push(format!("{}{}</pre>", render("pre", &attributes), &caps[2]));
        format!("{PLACEHOLDER_OPEN}C{}{PLACEHOLDER_CLOSE}", blocks.len() - 1)
    });

    let collapsed = INTER_TAG_WHITESPACE.replace_all(protected.trim(), "><");
    let styled = style_elements(&collapsed);

    let restored = CODE_PLACEHOLDER.replace_all(&styled, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|i| blocks.get(i))
            .cloned()
            .unwrap_or_default()
    });

    wrap(&sanitize_uncached(&restored))
}

fn wrap(html: &str) -> String {
    format!("<div class=\"{CONTENT_CLASS}\">{html}</div>")
}

/// Adds presentation classes and link/image defaults, drops elements with
/// unsafe URLs and wraps bare tables.
fn style_elements(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut dropped_anchors = 0usize;
    let mut table_wrapped: Vec<bool> = Vec::new();

    for token in Tokenizer::new(html) {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Markup(markup) => out.push_str(markup),
            Token::StrayLt => out.push('<'),
            Token::Tag(tag) if tag.closing => match tag.name.as_str() {
                "a" if dropped_anchors > 0 => dropped_anchors -= 1,
                "table" => {
                    out.push_str("</table>");
                    if table_wrapped.pop() == Some(true) {
                        out.push_str("</div>");
                    }
                }
                name => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            },
            Token::Tag(tag) => {
                let mut attributes = attributes_of(tag.attributes);
                match tag.name.as_str() {
                    "code" => {
                        if get(&attributes, "class").is_none() {
                            add_class(&mut attributes, INLINE_CODE_CLASS);
                        }
                    }
                    "blockquote" => add_class(&mut attributes, QUOTE_CLASS),
                    "img" => {
                        if !is_valid_url(get(&attributes, "src").unwrap_or_default()) {
                            tracing::debug!("Dropping image with unsafe or missing src");
                            continue;
                        }
                        add_class(&mut attributes, IMAGE_CLASS);
                        set_default(&mut attributes, "loading", "lazy");
                    }
                    "a" => {
                        if !is_valid_url(get(&attributes, "href").unwrap_or_default()) {
                            tracing::debug!("Dropping anchor with unsafe or missing href");
                            dropped_anchors += 1;
                            continue;
                        }
                        add_class(&mut attributes, LINK_CLASS);
                        set_default(&mut attributes, "target", "_blank");
                        set_default(&mut attributes, "rel", "noopener noreferrer");
                    }
                    "table" => {
                        add_class(&mut attributes, TABLE_CLASS);
                        let wrapped = ends_with_table_wrapper(&out);
                        if !wrapped {
                            out.push_str(&format!("<div class=\"{TABLE_WRAPPER_CLASS}\">"));
                        }
                        table_wrapped.push(!wrapped);
                    }
                    _ => {}
                }
                out.push_str(&render(&tag.name, &attributes));
            }
        }
    }

    out
}

/// Returns `true` if the last thing written is an opening wrapper `<div>`.
fn ends_with_table_wrapper(out: &str) -> bool {
    let trimmed = out.trim_end();
    let Some(start) = trimmed.rfind("<div") else {
        return false;
    };
    let last_tag = &trimmed[start..];
    last_tag.ends_with('>')
        && !last_tag[..last_tag.len() - 1].contains('>')
        && attributes_of(&last_tag[4..last_tag.len() - 1])
            .iter()
            .any(|(name, value)| {
                name == "class"
                    && value
                        .as_deref()
                        .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == TABLE_WRAPPER_CLASS))
            })
}

fn attributes_of(raw: &str) -> Attributes {
    parse_attributes(raw)
        .into_iter()
        .map(|a| (a.name, a.value.map(Cow::into_owned)))
        .collect()
}

fn get<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_deref().unwrap_or_default())
}

fn set_default(attributes: &mut Attributes, name: &str, value: &str) {
    if get(attributes, name).is_none() {
        attributes.push((name.to_string(), Some(value.to_string())));
    }
}

fn add_class(attributes: &mut Attributes, class: &str) {
    match attributes.iter_mut().find(|(n, _)| n == "class") {
        Some((_, value)) => {
            let current = value.get_or_insert_with(String::new);
            if !current.split_ascii_whitespace().any(|c| c == class) {
                if !current.trim().is_empty() {
                    current.push(' ');
                }
                current.push_str(class);
            }
        }
        None => attributes.push(("class".to_string(), Some(class.to_string()))),
    }
}

fn render(name: &str, attributes: &Attributes) -> String {
    let mut tag = format!("<{name}");
    for (attribute, value) in attributes {
        tag.push(' ');
        tag.push_str(attribute);
        if let Some(value) = value {
            tag.push_str("=\"");
            tag.push_str(&html_escape::encode_double_quoted_attribute(value));
            tag.push('"');
        }
    }
    tag.push('>');
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(style_content("   "), "");
    }

    #[test]
    fn wraps_in_content_container() {
        assert_eq!(
            style_content("<p>hello</p>"),
            "<div class=\"rich-text-content\"><p>hello</p></div>"
        );
    }

    #[test]
    fn collapses_whitespace_between_tags() {
        assert_eq!(
            style_content("<p>a</p>\n\n   <p>b</p>"),
            "<div class=\"rich-text-content\"><p>a</p><p>b</p></div>"
        );
    }

    #[test]
    fn inline_code_quotes_and_images_get_classes() {
        let out = style_content(
            r#"<p><code>x</code></p><blockquote>q</blockquote><p><img src="/a.png" alt="a"></p>"#,
        );
        assert!(out.contains(r#"<code class="rich-text-inline-code">x</code>"#));
        assert!(out.contains(r#"<blockquote class="rich-text-quote">q</blockquote>"#));
        assert!(out.contains(
            r#"<img src="/a.png" alt="a" class="rich-text-image" loading="lazy">"#
        ));
    }

    #[test]
    fn classed_inline_code_is_left_alone() {
        let out = style_content(r#"<p><code class="language-rust">x</code></p>"#);
        assert!(out.contains(r#"<code class="language-rust">x</code>"#));
    }

    #[test]
    fn links_get_defaults_and_unsafe_ones_are_unwrapped() {
        let out = style_content(
            r#"<p><a href="https://x.com">ok</a> <a href="ftp://x.com">bad</a></p>"#,
        );
        assert!(out.contains(
            r#"<a href="https://x.com" class="rich-text-link" target="_blank" rel="noopener noreferrer">ok</a>"#
        ));
        assert!(out.contains("bad</p>"));
        assert!(!out.contains("ftp://"));
    }

    #[test]
    fn images_with_unsafe_src_are_dropped() {
        let out = style_content(r#"<p>x<img src="ftp://h/a.png"></p>"#);
        assert_eq!(out, "<div class=\"rich-text-content\"><p>x</p></div>");
    }

    #[test]
    fn tables_are_wrapped_once() {
        let out = style_content("<table><tr><td>1</td></tr></table>");
        assert_eq!(
            out,
            "<div class=\"rich-text-content\"><div class=\"rich-text-table-wrapper\"><table class=\"rich-text-table\"><tr><td>1</td></tr></table></div></div>"
        );

        let pre_wrapped = style_content(
            "<div class=\"rich-text-table-wrapper\"><table><tr><td>1</td></tr></table></div>",
        );
        assert_eq!(pre_wrapped.matches("rich-text-table-wrapper").count(), 1);
    }

    #[test]
    fn code_block_interior_is_preserved() {
        let html = "<p>a</p>   <pre><code class=\"language-py\">def f():\n\n\n\n    return  1\n</code></pre>";
        let out = style_content(html);
        assert!(out.contains(
            "<pre class=\"rich-text-code-block\"><code class=\"language-py\">def f():\n\n\n\n    return  1\n</code></pre>"
        ));
    }

    #[test]
    fn markdown_is_converted_then_sanitized() {
        let out = style_content("# Hi\n\n<script>x</script>**there**");
        assert_eq!(
            out,
            "<div class=\"rich-text-content\"><h1>Hi</h1>\n<p><strong>there</strong></p></div>"
        );
    }

    #[test]
    fn already_styled_content_is_only_sanitized() {
        let styled = style_content("<p>hello</p>");
        assert_eq!(style_content(&styled), styled);
    }
}
