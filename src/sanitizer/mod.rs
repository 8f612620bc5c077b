//! HTML sanitizer pipeline.
//!
//! Sanitizers implement the [`Sanitizer`] trait and are composed into a
//! [`SanitizerPipeline`] that runs them sequentially. [`HtmlSanitizer`] wires
//! the built-in stages together:
//!
//! 1. [`RegexSanitizer::dangerous_markup`] -- coarse strip of script-capable
//!    elements, event handlers and `javascript:`.
//! 2. [`TagWhitelistSanitizer`] -- structural tag and attribute whitelist.
//! 3. [`EmptyTagPruner`] -- removes elements left empty.
//!
//! The coarse phase runs first so that a flaw in the structural scan cannot
//! bring back a payload it already removed.

mod attributes;
mod prune;
mod regex;
mod style;
pub(crate) mod tokenizer;
mod whitelist;

use std::sync::LazyLock;

pub use self::regex::RegexSanitizer;
pub use attributes::clean_attributes;
pub use prune::EmptyTagPruner;
pub use style::clean_style;
pub use whitelist::TagWhitelistSanitizer;

/// Upper bound on full-pipeline rounds in [`HtmlSanitizer`].
const MAX_ROUNDS: usize = 64;

/// Trait for HTML content sanitizers.
///
/// Each sanitizer receives an HTML string and returns a transformed version.
/// Implementations must be `Send + Sync` so a single instance can be shared
/// across threads.
pub trait Sanitizer: Send + Sync {
    /// Transform the given HTML content, returning the sanitized result.
    fn sanitize(&self, html: &str) -> String;
}

/// An ordered chain of [`Sanitizer`] implementations applied sequentially.
///
/// Each sanitizer receives the output of the previous one. An empty pipeline
/// is a no-op.
pub struct SanitizerPipeline {
    sanitizers: Vec<Box<dyn Sanitizer>>,
}

impl SanitizerPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            sanitizers: Vec::new(),
        }
    }

    /// Append a sanitizer to the end of the pipeline.
    pub fn add(&mut self, sanitizer: impl Sanitizer + 'static) {
        self.sanitizers.push(Box::new(sanitizer));
    }

    /// Run the full pipeline on the given HTML, returning the final result.
    pub fn sanitize(&self, html: &str) -> String {
        self.sanitizers
            .iter()
            .fold(html.to_string(), |acc, s| s.sanitize(&acc))
    }

    /// Returns `true` if no sanitizers have been added.
    pub fn is_empty(&self) -> bool {
        self.sanitizers.is_empty()
    }
}

impl Default for SanitizerPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// The complete untrusted-markup sanitizer.
///
/// Runs its pipeline repeatedly until the output stops changing. Removing a
/// tag can join surrounding text into something the coarse phase forbids
/// (`java<x>script:`), so a single round is not enough for
/// `sanitize(sanitize(x)) == sanitize(x)`. After the first round every
/// effective round only deletes, which bounds the loop by the input length;
/// [`MAX_ROUNDS`] caps it for pathological input.
pub struct HtmlSanitizer {
    pipeline: SanitizerPipeline,
}

impl HtmlSanitizer {
    /// Coarse strip, then whitelist, then empty-tag pruning.
    pub fn new() -> Self {
        let mut pipeline = SanitizerPipeline::new();
        pipeline.add(RegexSanitizer::dangerous_markup());
        pipeline.add(TagWhitelistSanitizer);
        pipeline.add(EmptyTagPruner);
        Self { pipeline }
    }

    /// Whitelist and empty-tag pruning only, without the coarse strip.
    pub fn structural() -> Self {
        let mut pipeline = SanitizerPipeline::new();
        pipeline.add(TagWhitelistSanitizer);
        pipeline.add(EmptyTagPruner);
        Self { pipeline }
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for HtmlSanitizer {
    fn sanitize(&self, html: &str) -> String {
        let mut current = self.pipeline.sanitize(html);
        for _ in 1..MAX_ROUNDS {
            let next = self.pipeline.sanitize(&current);
            if next == current {
                return current;
            }
            current = next;
        }
        tracing::debug!("Sanitizer did not settle after {MAX_ROUNDS} rounds");
        current
    }
}

static FULL: LazyLock<HtmlSanitizer> = LazyLock::new(HtmlSanitizer::new);
static STRUCTURAL: LazyLock<HtmlSanitizer> = LazyLock::new(HtmlSanitizer::structural);

/// Applies the tag whitelist and empty-tag pruning to `html`.
///
/// ```
/// use rich_content::validate_and_clean_html;
///
/// assert_eq!(
///     validate_and_clean_html("<p></p><p>&nbsp;</p><p>hi</p>"),
///     "<p>hi</p>"
/// );
/// ```
pub fn validate_and_clean_html(html: &str) -> String {
    STRUCTURAL.sanitize(html)
}

/// Runs the full sanitizer without consulting any cache.
pub(crate) fn sanitize_uncached(html: &str) -> String {
    FULL.sanitize(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_empty_is_empty() {
        assert!(SanitizerPipeline::new().is_empty());
        assert!(SanitizerPipeline::default().is_empty());
    }

    #[test]
    fn pipeline_not_empty_after_add() {
        let mut pipeline = SanitizerPipeline::new();
        pipeline.add(EmptyTagPruner);
        assert!(!pipeline.is_empty());
    }

    #[test]
    fn pipeline_with_no_sanitizers_returns_original() {
        let pipeline = SanitizerPipeline::new();
        assert_eq!(pipeline.sanitize("<p>original</p>"), "<p>original</p>");
    }

    #[test]
    fn pipeline_chains_sanitizers_in_order() {
        let mut pipeline = SanitizerPipeline::new();
        pipeline.add(RegexSanitizer::new(vec![("(?i)<blink>", "<b>"), ("(?i)</blink>", "</b>")]));
        pipeline.add(TagWhitelistSanitizer);
        assert_eq!(pipeline.sanitize("<BLINK>hey</BLINK>"), "<b>hey</b>");
    }

    #[test]
    fn coarse_phase_removes_script_content() {
        let out = sanitize_uncached("<p>hi</p><script>document.cookie</script>");
        assert_eq!(out, "<p>hi</p>");
    }

    #[test]
    fn structural_only_keeps_script_text() {
        // Without the coarse phase the tag is stripped but its text survives.
        let out = validate_and_clean_html("<script>x()</script>");
        assert_eq!(out, "x()");
    }

    #[test]
    fn tag_removal_cannot_assemble_javascript_uri() {
        let out = sanitize_uncached("<p>java<x>script:alert(1)</p>");
        assert_eq!(out, "<p>alert(1)</p>");
    }

    #[test]
    fn pruning_cannot_assemble_javascript_uri() {
        let out = sanitize_uncached("<p>java<b>java<b>javascript:</b>script:</b>script:ok</p>");
        assert!(!out.to_ascii_lowercase().contains("javascript:"));
        assert_eq!(sanitize_uncached(&out), out);
    }

    #[test]
    fn unquoted_handlers_are_dropped_by_the_whitelist() {
        let out = sanitize_uncached("<img src=/a.png onerror=alert(1)>");
        assert_eq!(out, r#"<img src="/a.png">"#);
    }
}
