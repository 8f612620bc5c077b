//! Per-tag attribute filtering.

use crate::policy::{self, AttributeKind};
use crate::sanitizer::style::clean_style;
use crate::sanitizer::tokenizer::parse_attributes;
use crate::url::is_valid_url;

/// Rewrites a raw attribute string so that only attributes allowed on `tag`
/// remain, each cleaned according to its [`AttributeKind`].
///
/// The result is a space-separated list of `name="value"` pairs and bare
/// boolean names, without a leading space. Values are entity-decoded before
/// inspection and re-escaped on output. Unknown attributes are dropped.
///
/// ```
/// use rich_content::clean_attributes;
///
/// assert_eq!(
///     clean_attributes(r#"href="javascript:alert(1)" class="rich-text-link evil""#, "a"),
///     r#"class="rich-text-link""#
/// );
/// ```
pub fn clean_attributes(raw: &str, tag: &str) -> String {
    let tag = tag.to_ascii_lowercase();
    let mut cleaned: Vec<String> = Vec::new();

    for attribute in parse_attributes(raw) {
        let Some(kind) = policy::attribute_kind(&tag, &attribute.name) else {
            tracing::trace!("Dropping attribute {} on <{tag}>", attribute.name);
            continue;
        };
        let name = attribute.name;

        let value = match (kind, attribute.value) {
            (AttributeKind::Boolean, _) => {
                cleaned.push(name);
                continue;
            }
            // Every other kind needs a value.
            (_, None) => continue,
            (AttributeKind::Class, Some(value)) => clean_class(&value),
            (AttributeKind::Style, Some(value)) => clean_style(&value),
            (AttributeKind::Url, Some(value)) => {
                let url = value.trim();
                if is_valid_url(url) {
                    url.to_string()
                } else {
                    tracing::debug!("Dropping unsafe {name} on <{tag}>: {url}");
                    continue;
                }
            }
            (AttributeKind::PassThrough, Some(value)) => value.into_owned(),
        };

        // An emptied class or style list carries nothing worth keeping.
        if value.is_empty() && matches!(kind, AttributeKind::Class | AttributeKind::Style) {
            continue;
        }

        cleaned.push(format!(
            "{name}=\"{}\"",
            html_escape::encode_double_quoted_attribute(&value)
        ));
    }

    cleaned.join(" ")
}

/// Keeps allowed class tokens, deduplicated, in their original order.
fn clean_class(value: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for class in value.split_ascii_whitespace() {
        if policy::is_allowed_class(class) && !kept.contains(&class) {
            kept.push(class);
        }
    }
    kept.join(" ")
}
