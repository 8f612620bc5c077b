//! # rich_content
//!
//! Sanitization, normalization and derived views for untrusted rich content:
//! HTML from a WYSIWYG editor or Markdown written by people and AI
//! assistants.
//!
//! ## Overview
//!
//! - [`sanitize_html`] strips script-capable elements, event handlers and
//!   `javascript:` URIs, then enforces a fixed tag / attribute / class /
//!   style allowlist and prunes elements left empty.
//! - [`markdown_to_html`] converts the supported Markdown subset to HTML.
//! - [`add_content_styles`] prepares content for rendering: converts Markdown
//!   when detected, adds canonical `rich-text-*` classes, sanitizes, and wraps
//!   the result in one `rich-text-content` container.
//! - [`extract_text`], [`extract_summary`], [`calculate_reading_time`],
//!   [`extract_images`], [`extract_links`] and [`get_content_stats`] derive
//!   plain views from HTML.
//!
//! Sanitizing and styling results are memoized in a bounded, time-expiring
//! [`ResultCache`] owned by a [`ContentProcessor`].
//!
//! ## Quick start
//!
//! ```
//! use rich_content::ContentProcessor;
//!
//! let processor = ContentProcessor::new();
//! let html = processor.add_content_styles("# Hello\n\nSome **bold** text");
//! assert_eq!(
//!     html,
//!     "<div class=\"rich-text-content\"><h1>Hello</h1>\n<p>Some <strong>bold</strong> text</p></div>"
//! );
//! ```
//!
//! The free functions [`sanitize_html`], [`add_content_styles`] and
//! [`clear_cache`] use a process-wide processor; see [`init()`] and
//! [`global()`].

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod markdown;
pub mod policy;
pub mod processor;
pub mod sanitizer;
mod styler;
pub mod url;

pub use cache::ResultCache;
pub use config::ContentProcessorBuilder;
pub use error::{Result, RichContentError};
pub use extract::{
    ContentStats, Link, calculate_reading_time, extract_images, extract_links, extract_summary,
    extract_text, get_content_stats, is_empty,
};
pub use markdown::{looks_like_markdown, markdown_to_html};
pub use processor::ContentProcessor;
pub use sanitizer::{
    EmptyTagPruner, HtmlSanitizer, RegexSanitizer, Sanitizer, SanitizerPipeline,
    TagWhitelistSanitizer, clean_attributes, clean_style, validate_and_clean_html,
};
pub use self::url::is_valid_url;

use std::sync::OnceLock;

static GLOBAL: OnceLock<ContentProcessor> = OnceLock::new();

/// Register the process-wide [`ContentProcessor`].
///
/// Call once at application startup to configure the instance used by the
/// free functions. Without it, [`global()`] lazily creates a processor with
/// default settings.
///
/// Returns [`RichContentError::AlreadyInitialized`] if a global processor
/// already exists, whether from an earlier `init` or from a call to
/// [`global()`].
pub fn init(builder: ContentProcessorBuilder) -> Result<&'static ContentProcessor> {
    let processor = builder.build()?;
    GLOBAL
        .set(processor)
        .map_err(|_| RichContentError::AlreadyInitialized)?;
    Ok(global())
}

/// The process-wide [`ContentProcessor`], created with defaults on first use
/// unless [`init()`] registered one.
pub fn global() -> &'static ContentProcessor {
    GLOBAL.get_or_init(ContentProcessor::new)
}

/// [`ContentProcessor::sanitize_html`] on the [`global()`] processor.
pub fn sanitize_html(html: &str) -> String {
    global().sanitize_html(html)
}

/// [`ContentProcessor::add_content_styles`] on the [`global()`] processor.
pub fn add_content_styles(html: &str) -> String {
    global().add_content_styles(html)
}

/// [`ContentProcessor::clear_cache`] on the [`global()`] processor.
pub fn clear_cache() {
    global().clear_cache();
}
