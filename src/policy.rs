//! Fixed markup policy: which tags, attributes, classes and style properties
//! survive sanitization.
//!
//! All tables are process-wide constants; nothing here is mutated at runtime.

/// Class carried by the single outer content container.
pub const CONTENT_CLASS: &str = "rich-text-content";
/// Class added to `<pre>` elements holding a code block.
pub const CODE_BLOCK_CLASS: &str = "rich-text-code-block";
/// Class added to inline `<code>` elements.
pub const INLINE_CODE_CLASS: &str = "rich-text-inline-code";
/// Class added to `<blockquote>` elements.
pub const QUOTE_CLASS: &str = "rich-text-quote";
/// Class added to `<a>` elements.
pub const LINK_CLASS: &str = "rich-text-link";
/// Class added to `<img>` elements.
pub const IMAGE_CLASS: &str = "rich-text-image";
/// Class of the scrollable `<div>` wrapped around tables.
pub const TABLE_WRAPPER_CLASS: &str = "rich-text-table-wrapper";
/// Class added to `<table>` elements.
pub const TABLE_CLASS: &str = "rich-text-table";

/// Tags allowed through the whitelist scanner.
pub const ALLOWED_TAGS: &[&str] = &[
    "div", "p", "span", "br", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "strong", "b",
    "em", "i", "u", "s", "blockquote", "code", "pre", "a", "img", "table", "thead", "tbody", "tr",
    "th", "td", "hr", "mark", "sub", "sup", "label", "input",
];

/// Classes that survive attribute filtering, besides `language-*`.
pub const ALLOWED_CLASSES: &[&str] = &[
    CONTENT_CLASS,
    CODE_BLOCK_CLASS,
    INLINE_CODE_CLASS,
    QUOTE_CLASS,
    LINK_CLASS,
    IMAGE_CLASS,
    TABLE_WRAPPER_CLASS,
    TABLE_CLASS,
    "rich-text-task-list",
    "rich-text-task-item",
    "rich-text-highlight",
];

/// CSS properties permitted inside a `style` attribute.
pub const ALLOWED_STYLE_PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "font-size",
    "font-weight",
    "font-style",
    "text-decoration",
    "text-align",
    "width",
    "height",
    "max-width",
    "max-height",
    "margin",
    "padding",
    "display",
    "float",
];

/// Substrings that disqualify a style value regardless of its property.
pub const FORBIDDEN_STYLE_VALUES: &[&str] = &["url(", "expression", "javascript:", "import"];

/// Elements removed wholesale, content included, before the whitelist runs.
pub const DANGEROUS_ELEMENTS: &[&str] = &["script", "iframe", "object", "embed"];

/// Elements that never take a closing tag.
pub const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Elements kept by the empty-tag pruner even when they have no content.
pub const PRUNE_EXEMPT: &[&str] = &["td", "th"];

/// How an allowed attribute's value is cleaned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    /// Space-separated class list filtered against [`ALLOWED_CLASSES`].
    Class,
    /// CSS declaration block filtered by [`clean_style`](crate::clean_style).
    Style,
    /// `href` / `src`; dropped unless [`is_valid_url`](crate::is_valid_url) accepts it.
    Url,
    /// Copied verbatim.
    PassThrough,
    /// Value-less flag such as `checked`.
    Boolean,
}

const CLASS: (&str, AttributeKind) = ("class", AttributeKind::Class);
const STYLE: (&str, AttributeKind) = ("style", AttributeKind::Style);

/// Attribute allowlist for tags without an explicit entry.
const DEFAULT_ATTRIBUTES: &[(&str, AttributeKind)] = &[CLASS];

const ANCHOR_ATTRIBUTES: &[(&str, AttributeKind)] = &[
    ("href", AttributeKind::Url),
    ("target", AttributeKind::PassThrough),
    ("rel", AttributeKind::PassThrough),
    CLASS,
];

const IMAGE_ATTRIBUTES: &[(&str, AttributeKind)] = &[
    ("src", AttributeKind::Url),
    ("alt", AttributeKind::PassThrough),
    ("loading", AttributeKind::PassThrough),
    ("width", AttributeKind::PassThrough),
    ("height", AttributeKind::PassThrough),
    CLASS,
    STYLE,
];

const CODE_ATTRIBUTES: &[(&str, AttributeKind)] =
    &[CLASS, ("data-language", AttributeKind::PassThrough)];

const BLOCK_ATTRIBUTES: &[(&str, AttributeKind)] = &[CLASS, STYLE];

const HEADING_ATTRIBUTES: &[(&str, AttributeKind)] =
    &[CLASS, STYLE, ("id", AttributeKind::PassThrough)];

const INLINE_ATTRIBUTES: &[(&str, AttributeKind)] =
    &[CLASS, STYLE, ("data-color", AttributeKind::PassThrough)];

const CELL_ATTRIBUTES: &[(&str, AttributeKind)] = &[
    CLASS,
    STYLE,
    ("colspan", AttributeKind::PassThrough),
    ("rowspan", AttributeKind::PassThrough),
    ("data-align", AttributeKind::PassThrough),
];

const LIST_ATTRIBUTES: &[(&str, AttributeKind)] =
    &[CLASS, ("data-type", AttributeKind::PassThrough)];

const LIST_ITEM_ATTRIBUTES: &[(&str, AttributeKind)] = &[
    CLASS,
    ("data-type", AttributeKind::PassThrough),
    ("data-checked", AttributeKind::PassThrough),
];

const INPUT_ATTRIBUTES: &[(&str, AttributeKind)] = &[
    ("type", AttributeKind::PassThrough),
    ("checked", AttributeKind::Boolean),
    ("disabled", AttributeKind::Boolean),
    CLASS,
];

/// Returns `true` if `tag` (lower-case) may appear in sanitized output.
pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

/// Returns the attribute allowlist for `tag` (lower-case).
pub fn allowed_attributes(tag: &str) -> &'static [(&'static str, AttributeKind)] {
    match tag {
        "a" => ANCHOR_ATTRIBUTES,
        "img" => IMAGE_ATTRIBUTES,
        "code" | "pre" => CODE_ATTRIBUTES,
        "div" | "p" | "table" => BLOCK_ATTRIBUTES,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => HEADING_ATTRIBUTES,
        "span" | "mark" => INLINE_ATTRIBUTES,
        "td" | "th" => CELL_ATTRIBUTES,
        "ul" | "ol" => LIST_ATTRIBUTES,
        "li" => LIST_ITEM_ATTRIBUTES,
        "input" => INPUT_ATTRIBUTES,
        _ => DEFAULT_ATTRIBUTES,
    }
}

/// Looks up how `attribute` is treated on `tag`, or `None` if it is not allowed.
pub fn attribute_kind(tag: &str, attribute: &str) -> Option<AttributeKind> {
    allowed_attributes(tag)
        .iter()
        .find(|(name, _)| *name == attribute)
        .map(|(_, kind)| *kind)
}

/// Returns `true` if a single class token survives filtering.
///
/// `language-*` classes are accepted when the suffix is a plain identifier
/// (`language-rust`, `language-c++`, `language-objective-c`).
pub fn is_allowed_class(class: &str) -> bool {
    if ALLOWED_CLASSES.contains(&class) {
        return true;
    }
    match class.strip_prefix("language-") {
        Some(lang) => {
            !lang.is_empty()
                && lang
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#'))
        }
        None => false,
    }
}
