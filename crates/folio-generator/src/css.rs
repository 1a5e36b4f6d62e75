//! Stylesheet model and rendering.

/// A single CSS rule, optionally wrapped in a media query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Full selector, already escaped.
    pub selector: String,

    /// Property/value pairs, in order.
    pub declarations: Vec<(String, String)>,

    /// Media query condition, without `@media`.
    pub media: Option<String>,
}

impl Rule {
    /// Create a rule without a media query.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
            media: None,
        }
    }

    /// Add a declaration.
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.declarations.push((property.into(), value.into()));
        self
    }

    /// Wrap the rule in a media query.
    #[must_use]
    pub fn in_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }
}

/// An ordered list of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    /// Create an empty stylesheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// The rules in output order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the stylesheet has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the rule generated for a class name.
    #[must_use]
    pub fn rule_for(&self, class: &str) -> Option<&Rule> {
        let needle = format!(".{}", escape_class(class));
        self.rules.iter().find(|r| {
            r.selector.match_indices(&needle).any(|(at, _)| {
                let rest = &r.selector[at + needle.len()..];
                (at == 0 || r.selector[..at].ends_with(' '))
                    && (rest.is_empty() || rest.starts_with([':', ' ']))
            })
        })
    }

    /// Render to CSS text. Consecutive rules sharing a media query share
    /// one `@media` block.
    #[must_use]
    pub fn render(&self, minify: bool) -> String {
        let mut out = String::new();
        let mut i = 0;

        while i < self.rules.len() {
            let media = self.rules[i].media.as_deref();
            let end = self.rules[i..]
                .iter()
                .position(|r| r.media.as_deref() != media)
                .map_or(self.rules.len(), |n| i + n);

            match media {
                None => {
                    for rule in &self.rules[i..end] {
                        write_rule(&mut out, rule, minify, "");
                    }
                }
                Some(query) if minify => {
                    out.push_str(&format!("@media {query}{{"));
                    for rule in &self.rules[i..end] {
                        write_rule(&mut out, rule, true, "");
                    }
                    out.push('}');
                }
                Some(query) => {
                    out.push_str(&format!("@media {query} {{\n"));
                    for rule in &self.rules[i..end] {
                        write_rule(&mut out, rule, false, "  ");
                    }
                    out.push_str("}\n");
                }
            }

            i = end;
        }

        out
    }
}

fn write_rule(out: &mut String, rule: &Rule, minify: bool, indent: &str) {
    if minify {
        let body = rule
            .declarations
            .iter()
            .map(|(p, v)| format!("{p}:{v}"))
            .collect::<Vec<_>>()
            .join(";");
        out.push_str(&format!("{}{{{body}}}", rule.selector));
    } else {
        out.push_str(&format!("{indent}{} {{\n", rule.selector));
        for (property, value) in &rule.declarations {
            out.push_str(&format!("{indent}  {property}: {value};\n"));
        }
        out.push_str(&format!("{indent}}}\n"));
    }
}

/// Escape a class name for use in a selector.
///
/// A digit cannot start an identifier, nor follow a leading hyphen, so it
/// is written as a hex code point escape terminated by a space
/// (`2xl` becomes `\32 xl`).
#[must_use]
pub fn escape_class(class: &str) -> String {
    let mut escaped = String::with_capacity(class.len() + 4);
    for (i, c) in class.chars().enumerate() {
        let leading = i == 0 || (i == 1 && class.starts_with('-'));
        if c.is_ascii_digit() && leading {
            escaped.push_str(&format!("\\{:x} ", u32::from(c)));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Stylesheet {
        let mut sheet = Stylesheet::new();
        sheet.push(Rule::new(".text-accent").with("color", "#0d7490"));
        sheet.push(
            Rule::new(".md\\:text-accent")
                .with("color", "#0d7490")
                .in_media("(min-width: 768px)"),
        );
        sheet.push(
            Rule::new(".md\\:bg-accent")
                .with("background-color", "#0d7490")
                .in_media("(min-width: 768px)"),
        );
        sheet
    }

    #[test]
    fn test_escape_class() {
        assert_eq!(escape_class("bg-accent"), "bg-accent");
        assert_eq!(escape_class("md:hover:bg-accent"), "md\\:hover\\:bg-accent");
        assert_eq!(escape_class("text-text/50"), "text-text\\/50");
    }

    #[test]
    fn test_escape_class_leading_digit() {
        assert_eq!(escape_class("2xl:bg-accent"), "\\32 xl\\:bg-accent");
        assert_eq!(escape_class("-2"), "-\\32 ");
        assert_eq!(escape_class("p-2"), "p-2");
    }

    #[test]
    fn test_rule_for_leading_digit() {
        let mut sheet = Stylesheet::new();
        sheet.push(
            Rule::new(".\\32 xl\\:bg-accent")
                .with("background-color", "#0d7490")
                .in_media("(min-width: 1536px)"),
        );
        assert!(sheet.rule_for("2xl:bg-accent").is_some());
    }

    #[test]
    fn test_render_pretty() {
        let css = sample().render(false);
        assert_eq!(
            css,
            ".text-accent {\n  color: #0d7490;\n}\n\
             @media (min-width: 768px) {\n  \
             .md\\:text-accent {\n    color: #0d7490;\n  }\n  \
             .md\\:bg-accent {\n    background-color: #0d7490;\n  }\n}\n"
        );
    }

    #[test]
    fn test_render_minified_groups_media() {
        let css = sample().render(true);
        assert_eq!(
            css,
            ".text-accent{color:#0d7490}@media (min-width: 768px){.md\\:text-accent{color:#0d7490}.md\\:bg-accent{background-color:#0d7490}}"
        );
    }

    #[test]
    fn test_rule_for() {
        let sheet = sample();
        assert!(sheet.rule_for("text-accent").is_some());
        assert!(sheet.rule_for("md:bg-accent").is_some());
        assert!(sheet.rule_for("bg-accent").is_none());
    }

    #[test]
    fn test_empty_render() {
        assert_eq!(Stylesheet::new().render(false), "");
        assert!(Stylesheet::new().is_empty());
    }
}
