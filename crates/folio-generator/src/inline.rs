//! Stylesheet placement.
//!
//! Decides whether the generated stylesheet is inlined into each page or
//! linked as an external file, and injects the matching tag.

use folio_core::InlinePolicy;

/// Where the stylesheet ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Embedded in a `<style>` element.
    Inline,

    /// Referenced through `<link rel="stylesheet">`.
    Linked,
}

/// Apply the inlining policy to a stylesheet of `css_len` bytes.
#[must_use]
pub fn decide(policy: InlinePolicy, css_len: usize, limit: usize) -> Placement {
    match policy {
        InlinePolicy::Always => Placement::Inline,
        InlinePolicy::Never => Placement::Linked,
        InlinePolicy::Auto if css_len <= limit && limit > 0 => Placement::Inline,
        InlinePolicy::Auto => Placement::Linked,
    }
}

/// Build a `<style>` element. A literal `</style` inside the CSS would
/// close the element early, so it is escaped.
#[must_use]
pub fn style_tag(css: &str) -> String {
    format!("<style>{}</style>", css.replace("</style", "<\\/style"))
}

/// Build a `<link>` element for an external stylesheet.
#[must_use]
pub fn link_tag(href: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{href}">"#)
}

/// Insert `tag` just before `</head>`, or at the top of the document when
/// the page has no head.
#[must_use]
pub fn inject(html: &str, tag: &str) -> String {
    match find_ascii_case_insensitive(html, "</head>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..at]);
            out.push_str(tag);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{tag}{html}"),
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
