//! Regex-based rewriting, used for the coarse first sanitization phase.

use regex::Regex;

use super::Sanitizer;
use crate::policy::DANGEROUS_ELEMENTS;

/// Sanitizer that applies a series of regex find-and-replace rules.
///
/// Rules are applied in order; each rule operates on the output of the
/// previous one. A rule with an empty replacement is a removal and is
/// re-applied until it no longer matches, so that deleting one match cannot
/// splice together a new one (`jajavascript:vascript:`).
///
/// # Example
///
/// ```
/// use rich_content::{RegexSanitizer, Sanitizer};
///
/// let sanitizer = RegexSanitizer::new(vec![(r"(?i)<marquee\b[^>]*>", "")]);
/// assert_eq!(sanitizer.sanitize("<MARQUEE loop>hi"), "hi");
/// ```
pub struct RegexSanitizer {
    rules: Vec<(Regex, String)>,
}

impl RegexSanitizer {
    /// Create a new `RegexSanitizer` from a list of `(pattern, replacement)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if any regex pattern is invalid. Use [`try_new`](Self::try_new)
    /// for a fallible alternative.
    pub fn new(rules: Vec<(&str, &str)>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| {
                (
                    Regex::new(pattern).expect("invalid regex pattern"),
                    replacement.to_string(),
                )
            })
            .collect();
        Self { rules }
    }

    /// Fallible constructor that returns a [`regex::Error`] for invalid patterns.
    pub fn try_new(rules: Vec<(&str, &str)>) -> Result<Self, regex::Error> {
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, replacement.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The coarse strip applied before the structural whitelist.
    ///
    /// Removes `<script>`, `<iframe>`, `<object>` and `<embed>` elements
    /// together with their content (and any unpaired opening or closing tag
    /// of those elements), quoted `on*=` event-handler attributes, and every
    /// literal `javascript:`. All matching is case-insensitive.
    pub fn dangerous_markup() -> Self {
        let mut patterns: Vec<String> = Vec::new();
        for element in DANGEROUS_ELEMENTS {
            patterns.push(format!(r"(?is)<{element}\b[^>]*>.*?</{element}\s*>"));
        }
        for element in DANGEROUS_ELEMENTS {
            patterns.push(format!(r"(?i)</?{element}\b[^>]*>"));
        }
        patterns.push(r#"(?i)\bon[a-z0-9_-]+\s*=\s*(?:"[^"]*"|'[^']*')"#.to_string());
        patterns.push(r"(?i)javascript:".to_string());

        Self::new(patterns.iter().map(|p| (p.as_str(), "")).collect())
    }
}

impl Sanitizer for RegexSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.rules
            .iter()
            .fold(html.to_string(), |mut acc, (re, replacement)| {
                if replacement.is_empty() {
                    // Each round removes at least one non-empty match, so this terminates.
                    while re.is_match(&acc) {
                        acc = re.replace_all(&acc, "").into_owned();
                    }
                    acc
                } else {
                    re.replace_all(&acc, replacement.as_str()).into_owned()
                }
            })
    }
}
