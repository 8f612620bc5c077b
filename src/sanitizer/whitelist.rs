//! Structural tag whitelist.

use super::Sanitizer;
use super::attributes::clean_attributes;
use super::tokenizer::{Token, Tokenizer};
use crate::policy::{VOID_ELEMENTS, is_allowed_tag};

/// Sanitizer that keeps only whitelisted tags and rewrites their attributes.
///
/// Disallowed tags are removed but the text they enclose survives. Closing
/// tags lose any attributes, void elements lose their closing tags, comments
/// and declarations are dropped, and a `<` that starts no tag is escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagWhitelistSanitizer;

impl Sanitizer for TagWhitelistSanitizer {
    fn sanitize(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());

        for token in Tokenizer::new(html) {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::StrayLt => out.push_str("&lt;"),
                Token::Markup(markup) => {
                    tracing::trace!("Dropping markup {markup}");
                }
                Token::Tag(tag) if !is_allowed_tag(&tag.name) => {
                    tracing::trace!("Dropping disallowed tag <{}>", tag.name);
                }
                Token::Tag(tag) if tag.closing => {
                    if !VOID_ELEMENTS.contains(&tag.name.as_str()) {
                        out.push_str("</");
                        out.push_str(&tag.name);
                        out.push('>');
                    }
                }
                Token::Tag(tag) => {
                    let attributes = clean_attributes(tag.attributes, &tag.name);
                    out.push('<');
                    out.push_str(&tag.name);
                    if !attributes.is_empty() {
                        out.push(' ');
                        out.push_str(&attributes);
                    }
                    out.push('>');
                }
            }
        }

        out
    }
}
