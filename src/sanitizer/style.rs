//! Inline `style` declaration filtering.

use crate::policy::{ALLOWED_STYLE_PROPERTIES, FORBIDDEN_STYLE_VALUES};

/// Filters a CSS declaration block down to the allowed properties.
///
/// Each `property: value` pair is kept only if the property is in the
/// allowlist and the value carries none of the forbidden injection patterns
/// (`url(`, `expression`, `javascript:`, `import`). Survivors are joined
/// with `"; "`. Returns an empty string when nothing survives.
///
/// ```
/// use rich_content::clean_style;
///
/// assert_eq!(
///     clean_style("color:red;background:url(javascript:alert(1))"),
///     "color: red"
/// );
/// ```
pub fn clean_style(raw: &str) -> String {
    raw.split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            if !ALLOWED_STYLE_PROPERTIES.contains(&property.as_str()) {
                return None;
            }
            let lowered = value.to_ascii_lowercase();
            if FORBIDDEN_STYLE_VALUES.iter().any(|bad| lowered.contains(bad)) {
                tracing::trace!("Dropping style declaration {property}: {value}");
                return None;
            }
            Some(format!("{property}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
