//! Design tokens.
//!
//! A token set maps names to values per category. The stylesheet generator
//! derives one family of utility classes per category, so names only need to
//! be unique within their category. Token files are TOML, which rejects
//! duplicate keys at parse time.

use std::{collections::BTreeMap, fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    color::Color,
    error::{CoreError, Result},
};

/// How `dark:` variants are activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
    /// Follow `prefers-color-scheme: dark`.
    #[default]
    Media,

    /// Apply when an ancestor carries the `dark` class.
    Class,
}

impl fmt::Display for DarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Media => "media",
            Self::Class => "class",
        })
    }
}

/// Token categories, in the order utilities are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenCategory {
    Colors,
    BackgroundImage,
    BoxShadow,
    FontFamily,
    MaxWidth,
    LineHeight,
}

impl TokenCategory {
    /// All categories in emission order.
    pub const ALL: [TokenCategory; 6] = [
        Self::Colors,
        Self::BackgroundImage,
        Self::BoxShadow,
        Self::FontFamily,
        Self::MaxWidth,
        Self::LineHeight,
    ];

    /// Key used in token files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Colors => "colors",
            Self::BackgroundImage => "background_image",
            Self::BoxShadow => "box_shadow",
            Self::FontFamily => "font_family",
            Self::MaxWidth => "max_width",
            Self::LineHeight => "line_height",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete set of design tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignTokens {
    /// Dark-mode strategy. Unset means `media`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<DarkMode>,

    /// Color name to CSS color.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,

    /// Name to `background-image` value (gradients).
    #[serde(default)]
    pub background_image: BTreeMap<String, String>,

    /// Name to `box-shadow` value.
    #[serde(default)]
    pub box_shadow: BTreeMap<String, String>,

    /// Name to ordered font fallback list.
    #[serde(default)]
    pub font_family: BTreeMap<String, Vec<String>>,

    /// Name to CSS length.
    #[serde(default)]
    pub max_width: BTreeMap<String, String>,

    /// Name to unitless line-height ratio.
    #[serde(default)]
    pub line_height: BTreeMap<String, String>,
}

/// Generic font families accepted as the final fallback.
const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
    "math",
    "emoji",
    "fangsong",
];

const LENGTH_UNITS: &[&str] = &[
    "px", "rem", "em", "%", "ch", "ex", "vw", "vh", "vmin", "vmax", "svh", "lvh", "dvh", "pt",
    "pc", "cm", "mm", "in",
];

const LENGTH_KEYWORDS: &[&str] = &["none", "max-content", "min-content", "fit-content"];

const IMAGE_FUNCTIONS: &[&str] = &[
    "linear-gradient(",
    "radial-gradient(",
    "conic-gradient(",
    "repeating-linear-gradient(",
    "repeating-radial-gradient(",
    "repeating-conic-gradient(",
    "url(",
];

fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl DesignTokens {
    /// The site's canonical token set.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            dark_mode: Some(DarkMode::Class),
            colors: map(&[
                ("background", "#fafafa"),
                ("text", "#1a1a1a"),
                ("accent", "#0d7490"),
                ("accent-hover", "#0e7490"),
                ("accent-dark", "#06b6d4"),
                ("backend-from", "#3b82f6"),
                ("backend-to", "#2563eb"),
                ("data-from", "#a855f7"),
                ("data-to", "#7c3aed"),
                ("devops-from", "#10b981"),
                ("devops-to", "#059669"),
                ("frontend-from", "#f97316"),
                ("frontend-to", "#ea580c"),
                ("optimization-from", "#ec4899"),
                ("optimization-to", "#db2777"),
            ]),
            background_image: map(&[
                (
                    "gradient-hero",
                    "linear-gradient(135deg, #0d7490 0%, #06b6d4 100%)",
                ),
                (
                    "gradient-backend",
                    "linear-gradient(135deg, #3b82f6 0%, #2563eb 100%)",
                ),
                (
                    "gradient-data",
                    "linear-gradient(135deg, #a855f7 0%, #7c3aed 100%)",
                ),
                (
                    "gradient-devops",
                    "linear-gradient(135deg, #10b981 0%, #059669 100%)",
                ),
                (
                    "gradient-frontend",
                    "linear-gradient(135deg, #f97316 0%, #ea580c 100%)",
                ),
                (
                    "gradient-optimization",
                    "linear-gradient(135deg, #ec4899 0%, #db2777 100%)",
                ),
            ]),
            box_shadow: map(&[
                ("glow-teal", "0 0 20px rgba(13, 116, 144, 0.3)"),
                ("glow-blue", "0 0 20px rgba(59, 130, 246, 0.3)"),
                ("glow-purple", "0 0 20px rgba(168, 85, 247, 0.3)"),
            ]),
            font_family: BTreeMap::from([(
                "sans".to_string(),
                [
                    "Inter",
                    "system-ui",
                    "-apple-system",
                    "BlinkMacSystemFont",
                    "Segoe UI",
                    "Roboto",
                    "sans-serif",
                ]
                .iter()
                .map(ToString::to_string)
                .collect(),
            )]),
            max_width: map(&[("content", "720px")]),
            line_height: map(&[("relaxed", "1.65")]),
        }
    }

    /// Load a token set from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Token file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse token file: {}", path.display()),
                e,
            )
        })
    }

    /// Parse a token set from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the token set to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CoreError::config_with_source("Failed to serialize design tokens", e))
    }

    /// Effective dark-mode strategy.
    #[must_use]
    pub fn dark_mode(&self) -> DarkMode {
        self.dark_mode.unwrap_or_default()
    }

    /// Entries of one category with values rendered as CSS text.
    ///
    /// Font stacks are joined with `", "`.
    #[must_use]
    pub fn entries(&self, category: TokenCategory) -> BTreeMap<&str, String> {
        fn plain(m: &BTreeMap<String, String>) -> BTreeMap<&str, String> {
            m.iter().map(|(k, v)| (k.as_str(), v.clone())).collect()
        }

        match category {
            TokenCategory::Colors => plain(&self.colors),
            TokenCategory::BackgroundImage => plain(&self.background_image),
            TokenCategory::BoxShadow => plain(&self.box_shadow),
            TokenCategory::MaxWidth => plain(&self.max_width),
            TokenCategory::LineHeight => plain(&self.line_height),
            TokenCategory::FontFamily => self
                .font_family
                .iter()
                .map(|(k, v)| (k.as_str(), v.join(", ")))
                .collect(),
        }
    }

    /// Total number of tokens across categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
            + self.background_image.len()
            + self.box_shadow.len()
            + self.font_family.len()
            + self.max_width.len()
            + self.line_height.len()
    }

    /// Whether the set declares no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layer `overlay` on top of this set.
    ///
    /// Overlay entries replace entries of the same name in the same
    /// category. Returns the `category.name` keys whose values changed.
    pub fn extend(&mut self, overlay: &DesignTokens) -> Vec<String> {
        fn merge<V: Clone + PartialEq>(
            category: TokenCategory,
            base: &mut BTreeMap<String, V>,
            overlay: &BTreeMap<String, V>,
            overridden: &mut Vec<String>,
        ) {
            for (name, value) in overlay {
                if let Some(previous) = base.insert(name.clone(), value.clone())
                    && previous != *value
                {
                    overridden.push(format!("{category}.{name}"));
                }
            }
        }

        let mut overridden = Vec::new();
        merge(
            TokenCategory::Colors,
            &mut self.colors,
            &overlay.colors,
            &mut overridden,
        );
        merge(
            TokenCategory::BackgroundImage,
            &mut self.background_image,
            &overlay.background_image,
            &mut overridden,
        );
        merge(
            TokenCategory::BoxShadow,
            &mut self.box_shadow,
            &overlay.box_shadow,
            &mut overridden,
        );
        merge(
            TokenCategory::FontFamily,
            &mut self.font_family,
            &overlay.font_family,
            &mut overridden,
        );
        merge(
            TokenCategory::MaxWidth,
            &mut self.max_width,
            &overlay.max_width,
            &mut overridden,
        );
        merge(
            TokenCategory::LineHeight,
            &mut self.line_height,
            &overlay.line_height,
            &mut overridden,
        );

        if let Some(mode) = overlay.dark_mode {
            if self.dark_mode.is_some_and(|m| m != mode) {
                overridden.push("dark_mode".to_string());
            }
            self.dark_mode = Some(mode);
        }

        overridden
    }

    /// Validate every token value.
    ///
    /// Returns non-fatal warnings; the first invalid value is an error.
    pub fn validate(&self) -> Result<Vec<String>> {
        for category in TokenCategory::ALL {
            for name in self.entries(category).keys() {
                validate_name(category, name)?;
            }
        }

        for (name, value) in &self.colors {
            Color::parse(value).map_err(|e| {
                CoreError::invalid_token("color", name.as_str(), e.to_string())
            })?;
        }

        for (name, value) in &self.background_image {
            let lower = value.trim().to_ascii_lowercase();
            if !IMAGE_FUNCTIONS.iter().any(|f| lower.starts_with(f)) || !balanced(value) {
                return Err(CoreError::invalid_token(
                    "background image",
                    name.as_str(),
                    format!("'{value}' is not a gradient or url() image"),
                ));
            }
        }

        for (name, value) in &self.box_shadow {
            if value.trim().is_empty() || !balanced(value) {
                return Err(CoreError::invalid_token(
                    "shadow",
                    name.as_str(),
                    format!("'{value}' is not a shadow expression"),
                ));
            }
        }

        for (name, stack) in &self.font_family {
            match stack.last() {
                None => {
                    return Err(CoreError::invalid_token(
                        "font family",
                        name.as_str(),
                        "font stack is empty",
                    ));
                }
                Some(last) if !GENERIC_FAMILIES.contains(&last.trim()) => {
                    return Err(CoreError::invalid_token(
                        "font family",
                        name.as_str(),
                        format!("last fallback '{last}' is not a generic family"),
                    ));
                }
                Some(_) => {}
            }
            if stack.iter().any(|f| f.trim().is_empty()) {
                return Err(CoreError::invalid_token(
                    "font family",
                    name.as_str(),
                    "font stack contains an empty name",
                ));
            }
        }

        for (name, value) in &self.max_width {
            if !is_length(value) {
                return Err(CoreError::invalid_token(
                    "max width",
                    name.as_str(),
                    format!("'{value}' is not a CSS length"),
                ));
            }
        }

        for (name, value) in &self.line_height {
            if !value.trim().parse::<f64>().is_ok_and(|v| v > 0.0) {
                return Err(CoreError::invalid_token(
                    "line height",
                    name.as_str(),
                    format!("'{value}' is not a positive unitless number"),
                ));
            }
        }

        let warnings = self
            .colors
            .keys()
            .filter(|name| self.background_image.contains_key(*name))
            .map(|name| {
                format!(
                    "token '{name}' is both a color and a background image; \
                     bg-{name} resolves to the color"
                )
            })
            .collect();

        Ok(warnings)
    }
}

fn validate_name(category: TokenCategory, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !name.starts_with('-');
    if valid {
        Ok(())
    } else {
        Err(CoreError::invalid_token(
            category.as_str(),
            name,
            "names may only contain ASCII letters, digits, '-' and '_'",
        ))
    }
}

fn balanced(value: &str) -> bool {
    let mut depth = 0i32;
    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn is_length(value: &str) -> bool {
    let value = value.trim();
    if value == "0" || LENGTH_KEYWORDS.contains(&value) {
        return true;
    }
    LENGTH_UNITS.iter().any(|unit| {
        value
            .strip_suffix(unit)
            .is_some_and(|n| !n.is_empty() && n.parse::<f64>().is_ok())
    })
}

/// Differences between two token sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenDiff {
    /// `(category, name)` present only on the left.
    pub only_left: Vec<(TokenCategory, String)>,

    /// `(category, name)` present only on the right.
    pub only_right: Vec<(TokenCategory, String)>,

    /// `(category, name, left value, right value)` declared on both sides
    /// with different values.
    pub changed: Vec<(TokenCategory, String, String, String)>,

    /// Effective dark-mode strategies, when they differ.
    pub dark_mode: Option<(DarkMode, DarkMode)>,
}

impl TokenDiff {
    /// Compare two token sets.
    #[must_use]
    pub fn between(left: &DesignTokens, right: &DesignTokens) -> Self {
        let mut diff = Self::default();

        for category in TokenCategory::ALL {
            let l = left.entries(category);
            let r = right.entries(category);

            for (name, lv) in &l {
                match r.get(name) {
                    None => diff.only_left.push((category, (*name).to_string())),
                    Some(rv) if rv != lv => diff.changed.push((
                        category,
                        (*name).to_string(),
                        lv.clone(),
                        rv.clone(),
                    )),
                    Some(_) => {}
                }
            }
            for name in r.keys().filter(|name| !l.contains_key(*name)) {
                diff.only_right.push((category, (*name).to_string()));
            }
        }

        if left.dark_mode() != right.dark_mode() {
            diff.dark_mode = Some((left.dark_mode(), right.dark_mode()));
        }

        diff
    }

    /// Whether the two sets are equivalent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.only_left.is_empty()
            && self.only_right.is_empty()
            && self.changed.is_empty()
            && self.dark_mode.is_none()
    }
}

impl fmt::Display for TokenDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (category, name) in &self.only_left {
            writeln!(f, "  - {category}.{name} (left only)")?;
        }
        for (category, name) in &self.only_right {
            writeln!(f, "  + {category}.{name} (right only)")?;
        }
        for (category, name, left, right) in &self.changed {
            writeln!(f, "  ~ {category}.{name}: {left} -> {right}")?;
        }
        if let Some((left, right)) = self.dark_mode {
            writeln!(f, "  ~ dark_mode: {left} -> {right}")?;
        }
        Ok(())
    }
}
