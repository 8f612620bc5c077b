//! Removal of elements left empty after sanitization.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Sanitizer;
use crate::policy::{PRUNE_EXEMPT, VOID_ELEMENTS};

/// Upper bound on pruning passes.
const MAX_PASSES: usize = 32;

static EMPTY_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<([a-zA-Z][a-zA-Z0-9]*)(?:\s[^>]*)?>(?:\s|&nbsp;|\u{a0})*</([a-zA-Z][a-zA-Z0-9]*)\s*>",
    )
    .expect("valid empty-element pattern")
});

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline pattern"));

pub(crate) static PRE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<pre\b[^>]*>.*?</pre\s*>").expect("valid pre-block pattern")
});

/// Sanitizer that strips elements containing only whitespace or `&nbsp;`
/// and collapses runs of three or more newlines to two.
///
/// Passes repeat until the document stops shrinking, so `<p><b> </b></p>`
/// disappears entirely. `<pre>` regions are left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyTagPruner;

impl EmptyTagPruner {
    fn pass(html: &str) -> String {
        map_outside_pre(html, |segment| {
            let pruned = EMPTY_ELEMENT.replace_all(segment, |caps: &Captures| {
                let open = caps[1].to_ascii_lowercase();
                let close = caps[2].to_ascii_lowercase();
                if open == close
                    && !PRUNE_EXEMPT.contains(&open.as_str())
                    && !VOID_ELEMENTS.contains(&open.as_str())
                {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            });
            EXCESS_NEWLINES.replace_all(&pruned, "\n\n").into_owned()
        })
    }
}

impl Sanitizer for EmptyTagPruner {
    fn sanitize(&self, html: &str) -> String {
        let mut current = html.to_string();
        for _ in 0..MAX_PASSES {
            let next = Self::pass(&current);
            if next.len() >= current.len() {
                return current;
            }
            current = next;
        }
        tracing::debug!("Empty-tag pruning stopped after {MAX_PASSES} passes");
        current
    }
}

/// Applies `f` to every part of `html` outside `<pre>` elements, copying the
/// `<pre>` elements through verbatim.
pub(crate) fn map_outside_pre(html: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for m in PRE_BLOCK.find_iter(html) {
        out.push_str(&f(&html[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&f(&html[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prune(html: &str) -> String {
        EmptyTagPruner.sanitize(html)
    }

    #[test]
    fn removes_whitespace_and_nbsp_only_elements() {
        assert_eq!(prune("<p></p><p>&nbsp;</p><p>hi</p>"), "<p>hi</p>");
    }

    #[test]
    fn reaches_a_fixed_point_on_nested_empties() {
        assert_eq!(prune("<div><p><strong> </strong></p></div>x"), "x");
    }

    #[test]
    fn keeps_void_elements_and_table_cells() {
        assert_eq!(prune("<p><br></p>"), "<p><br></p>");
        assert_eq!(
            prune("<tr><td></td><td>1</td></tr>"),
            "<tr><td></td><td>1</td></tr>"
        );
    }

    #[test]
    fn leaves_mismatched_pairs_alone() {
        assert_eq!(prune("<b> </i>"), "<b> </i>");
    }

    #[test]
    fn collapses_blank_lines_outside_pre() {
        assert_eq!(prune("a\n\n\n\nb"), "a\n\nb");
        let code = "<pre><code>x\n\n\n\ny<span> </span></code></pre>";
        assert_eq!(prune(code), code);
    }
}
