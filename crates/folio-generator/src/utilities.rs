//! Token-driven utility class generation.
//!
//! Each token category owns one or more class prefixes (`bg-`, `text-`,
//! `shadow-`, ...). A candidate such as `md:hover:bg-accent/50` is split into
//! variants, a utility and an optional opacity modifier, then resolved
//! against the token set. Candidates that do not resolve produce nothing.

use std::collections::{BTreeMap, BTreeSet};

use folio_core::{Color, DarkMode, DesignTokens};
use tracing::{debug, info, trace};

use crate::css::{Rule, Stylesheet, escape_class};

/// Responsive breakpoints, ascending.
const BREAKPOINTS: &[(&str, &str)] = &[
    ("sm", "640px"),
    ("md", "768px"),
    ("lg", "1024px"),
    ("xl", "1280px"),
    ("2xl", "1536px"),
];

/// Pseudo-class variants and the selector suffix they add.
const PSEUDO_CLASSES: &[(&str, &str)] = &[
    ("hover", ":hover"),
    ("focus", ":focus"),
    ("focus-visible", ":focus-visible"),
    ("active", ":active"),
    ("visited", ":visited"),
    ("disabled", ":disabled"),
    ("first", ":first-child"),
    ("last", ":last-child"),
];

/// Directions for the built-in `bg-gradient-to-*` utilities.
const GRADIENT_DIRECTIONS: &[(&str, &str)] = &[
    ("t", "to top"),
    ("tr", "to top right"),
    ("r", "to right"),
    ("br", "to bottom right"),
    ("b", "to bottom"),
    ("bl", "to bottom left"),
    ("l", "to left"),
    ("tl", "to top left"),
];

/// Utility families in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Family {
    BackgroundColor,
    TextColor,
    BorderColor,
    Fill,
    Stroke,
    GradientFrom,
    GradientTo,
    BackgroundImage,
    GradientDirection,
    BoxShadow,
    FontFamily,
    MaxWidth,
    LineHeight,
}

/// Color families: prefix, family, property.
const COLOR_FAMILIES: &[(&str, Family, &str)] = &[
    ("bg-", Family::BackgroundColor, "background-color"),
    ("text-", Family::TextColor, "color"),
    ("border-", Family::BorderColor, "border-color"),
    ("fill-", Family::Fill, "fill"),
    ("stroke-", Family::Stroke, "stroke"),
    ("from-", Family::GradientFrom, "--gradient-from"),
    ("to-", Family::GradientTo, "--gradient-to"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Pseudo(&'static str),
    Dark,
    Breakpoint(usize),
}

/// Ordering key: plain rules, then pseudo-classes, then dark, then
/// breakpoints ascending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    breakpoint: usize,
    dark: bool,
    pseudo: usize,
    family: Family,
    class: String,
}

/// Output of a generation pass.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCss {
    /// Generated rules in deterministic order.
    pub stylesheet: Stylesheet,

    /// Candidates that produced a rule, sorted.
    pub matched: Vec<String>,

    /// Number of candidates that produced nothing.
    pub unmatched: usize,
}

/// Generates utility rules from design tokens.
#[derive(Debug, Clone, Copy)]
pub struct UtilityGenerator<'a> {
    tokens: &'a DesignTokens,
}

impl<'a> UtilityGenerator<'a> {
    /// Create a generator over a token set.
    #[must_use]
    pub fn new(tokens: &'a DesignTokens) -> Self {
        Self { tokens }
    }

    /// Generate the stylesheet for a set of candidates.
    pub fn generate<'c, I>(&self, candidates: I) -> GeneratedCss
    where
        I: IntoIterator<Item = &'c str>,
    {
        let unique: BTreeSet<&str> = candidates.into_iter().collect();
        let mut resolved: Vec<(SortKey, Rule)> = Vec::new();
        let mut unmatched = 0;

        for candidate in &unique {
            match self.resolve_keyed(candidate) {
                Some(entry) => resolved.push(entry),
                None => {
                    trace!(candidate, "no utility for candidate");
                    unmatched += 1;
                }
            }
        }

        resolved.sort_by(|a, b| a.0.cmp(&b.0));

        let mut stylesheet = Stylesheet::new();
        let mut matched = Vec::with_capacity(resolved.len());
        for (key, rule) in resolved {
            matched.push(key.class);
            stylesheet.push(rule);
        }
        matched.sort();

        info!(
            utilities = stylesheet.len(),
            unmatched, "generated utility stylesheet"
        );

        GeneratedCss {
            stylesheet,
            matched,
            unmatched,
        }
    }

    /// Resolve one candidate to its rule.
    #[must_use]
    pub fn resolve(&self, candidate: &str) -> Option<Rule> {
        self.resolve_keyed(candidate).map(|(_, rule)| rule)
    }

    fn resolve_keyed(&self, candidate: &str) -> Option<(SortKey, Rule)> {
        let mut parts: Vec<&str> = candidate.split(':').collect();
        let utility = parts.pop().filter(|u| !u.is_empty())?;

        let mut variants = Vec::with_capacity(parts.len());
        for name in parts {
            let variant = parse_variant(name)?;
            if variants.contains(&variant)
                || (matches!(variant, Variant::Breakpoint(_))
                    && variants.iter().any(|v| matches!(v, Variant::Breakpoint(_))))
            {
                debug!(candidate, "repeated variant");
                return None;
            }
            variants.push(variant);
        }

        let (utility, opacity) = split_modifier(utility)?;
        let (family, declarations) = self.declarations(utility, opacity)?;

        let mut selector = format!(".{}", escape_class(candidate));
        let mut media: Vec<String> = Vec::new();
        let mut key = SortKey {
            breakpoint: 0,
            dark: false,
            pseudo: 0,
            family,
            class: candidate.to_string(),
        };

        for variant in &variants {
            match variant {
                Variant::Pseudo(suffix) => {
                    selector.push_str(suffix);
                    key.pseudo += 1;
                }
                Variant::Breakpoint(index) => {
                    media.insert(0, format!("(min-width: {})", BREAKPOINTS[*index].1));
                    key.breakpoint = index + 1;
                }
                Variant::Dark => key.dark = true,
            }
        }

        if key.dark {
            match self.tokens.dark_mode() {
                DarkMode::Class => selector = format!(".dark {selector}"),
                DarkMode::Media => media.push("(prefers-color-scheme: dark)".to_string()),
            }
        }

        let mut rule = Rule::new(selector);
        rule.declarations = declarations;
        if !media.is_empty() {
            rule = rule.in_media(media.join(" and "));
        }

        Some((key, rule))
    }

    fn declarations(
        &self,
        utility: &str,
        opacity: Option<f32>,
    ) -> Option<(Family, Vec<(String, String)>)> {
        for (prefix, family, property) in COLOR_FAMILIES {
            let Some(name) = utility.strip_prefix(prefix) else {
                continue;
            };
            let Some(raw) = self.tokens.colors.get(name) else {
                continue;
            };
            let value = match opacity {
                None => raw.clone(),
                Some(alpha) => Color::parse(raw).ok()?.with_opacity(alpha)?,
            };
            return Some((*family, color_declarations(*family, property, value)));
        }

        // Everything below rejects opacity modifiers.
        if opacity.is_some() {
            return None;
        }

        if let Some(name) = utility.strip_prefix("bg-") {
            if let Some(image) = self.tokens.background_image.get(name) {
                return Some((
                    Family::BackgroundImage,
                    vec![("background-image".to_string(), image.clone())],
                ));
            }
            if let Some(direction) = name.strip_prefix("gradient-to-")
                && let Some((_, css)) = GRADIENT_DIRECTIONS.iter().find(|(d, _)| *d == direction)
            {
                return Some((
                    Family::GradientDirection,
                    vec![(
                        "background-image".to_string(),
                        format!("linear-gradient({css}, var(--gradient-stops))"),
                    )],
                ));
            }
        }

        let lookup = |prefix: &str,
                      family: Family,
                      property: &str,
                      map: &BTreeMap<String, String>| {
            utility
                .strip_prefix(prefix)
                .and_then(|name| map.get(name))
                .map(|value| (family, vec![(property.to_string(), value.clone())]))
        };

        if let Some(found) = lookup(
            "shadow-",
            Family::BoxShadow,
            "box-shadow",
            &self.tokens.box_shadow,
        ) {
            return Some(found);
        }

        if let Some(stack) = utility
            .strip_prefix("font-")
            .and_then(|name| self.tokens.font_family.get(name))
        {
            return Some((
                Family::FontFamily,
                vec![("font-family".to_string(), font_stack(stack))],
            ));
        }

        lookup("max-w-", Family::MaxWidth, "max-width", &self.tokens.max_width).or_else(|| {
            lookup(
                "leading-",
                Family::LineHeight,
                "line-height",
                &self.tokens.line_height,
            )
        })
    }
}

fn parse_variant(name: &str) -> Option<Variant> {
    if name == "dark" {
        return Some(Variant::Dark);
    }
    if let Some(index) = BREAKPOINTS.iter().position(|(bp, _)| *bp == name) {
        return Some(Variant::Breakpoint(index));
    }
    PSEUDO_CLASSES
        .iter()
        .find(|(variant, _)| *variant == name)
        .map(|(_, suffix)| Variant::Pseudo(*suffix))
}

/// Split `name/50` into `name` and an opacity of 0.5.
fn split_modifier(utility: &str) -> Option<(&str, Option<f32>)> {
    match utility.rsplit_once('/') {
        None => Some((utility, None)),
        Some((name, modifier)) => {
            let percent: u8 = modifier.parse().ok()?;
            if percent > 100 || name.is_empty() {
                return None;
            }
            Some((name, Some(f32::from(percent) / 100.0)))
        }
    }
}

fn color_declarations(family: Family, property: &str, value: String) -> Vec<(String, String)> {
    match family {
        Family::GradientFrom => vec![
            ("--gradient-from".to_string(), value),
            ("--gradient-to".to_string(), "transparent".to_string()),
            (
                "--gradient-stops".to_string(),
                "var(--gradient-from), var(--gradient-to)".to_string(),
            ),
        ],
        _ => vec![(property.to_string(), value)],
    }
}

/// Render a font stack, quoting names that are not plain identifiers.
fn font_stack(stack: &[String]) -> String {
    stack
        .iter()
        .map(|family| {
            let family = family.trim();
            let identifier = family
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                && !family.starts_with(|c: char| c.is_ascii_digit());
            if identifier {
                family.to_string()
            } else {
                format!("\"{}\"", family.replace('"', "\\\""))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
