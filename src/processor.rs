//! The cached entry points for sanitizing and styling content.

use crate::cache::ResultCache;
use crate::config::ContentProcessorBuilder;
use crate::sanitizer::sanitize_uncached;
use crate::styler::style_content;

const SANITIZE_PREFIX: &str = "sanitize:";
const STYLES_PREFIX: &str = "styles:";

/// Owns the result cache and exposes the cached transforms.
///
/// A processor is `Send + Sync`; share one behind an `Arc` (or use the
/// process-wide [`global()`](crate::global) instance) so concurrent callers
/// benefit from the same cache.
///
/// ```
/// use rich_content::ContentProcessor;
///
/// let processor = ContentProcessor::new();
/// let html = processor.sanitize_html(r#"<p onclick="x()">hi<script>evil()</script></p>"#);
/// assert_eq!(html, "<p>hi</p>");
/// ```
#[derive(Debug)]
pub struct ContentProcessor {
    cache: ResultCache,
}

impl ContentProcessor {
    /// A processor with the default cache capacity and TTL.
    pub fn new() -> Self {
        Self {
            cache: ResultCache::default(),
        }
    }

    /// Shorthand for [`ContentProcessorBuilder::new`].
    pub fn builder() -> ContentProcessorBuilder {
        ContentProcessorBuilder::new()
    }

    pub(crate) fn with_cache(cache: ResultCache) -> Self {
        Self { cache }
    }

    /// Removes script-capable markup and everything outside the tag,
    /// attribute, class and style allowlists.
    ///
    /// The output contains no `<script>`, `<iframe>`, `<object>` or `<embed>`,
    /// no `on*=` handler and no `javascript:`, and sanitizing it again returns
    /// it unchanged.
    pub fn sanitize_html(&self, html: &str) -> String {
        self.cached(SANITIZE_PREFIX, html, sanitize_uncached)
    }

    /// Prepares content for display: converts Markdown if the heuristic
    /// detects it, adds the canonical presentation classes, sanitizes, and
    /// wraps everything in a single `rich-text-content` container.
    ///
    /// Input that already carries the container class is only sanitized.
    /// Whitespace inside `<pre><code>` blocks is never altered.
    pub fn add_content_styles(&self, html: &str) -> String {
        self.cached(STYLES_PREFIX, html, style_content)
    }

    /// Drops every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Content cache cleared");
    }

    /// The underlying cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn cached(&self, prefix: &str, input: &str, transform: fn(&str) -> String) -> String {
        if input.is_empty() {
            return String::new();
        }
        let key = format!("{prefix}{input}");
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {prefix} ({} bytes)", input.len());
            return hit;
        }
        tracing::debug!("Cache miss for {prefix} ({} bytes)", input.len());
        let result = transform(input);
        self.cache.set(key, result.clone());
        result
    }
}

impl Default for ContentProcessor {
    fn default() -> Self {
        Self::new()
    }
}
