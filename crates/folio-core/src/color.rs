//! CSS color value parsing.
//!
//! Only the syntax is checked. Hex colors are decoded so the stylesheet
//! generator can apply opacity modifiers (`bg-accent/50`).

use std::fmt;

use thiserror::Error;

/// Color parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Empty value.
    #[error("empty color value")]
    Empty,

    /// Malformed hex literal.
    #[error("invalid hex color '{0}'")]
    Hex(String),

    /// Malformed color function.
    #[error("invalid color function '{0}'")]
    Function(String),

    /// Not a recognized color keyword.
    #[error("unknown color keyword '{0}'")]
    Keyword(String),
}

/// Functions accepted as color values.
const COLOR_FUNCTIONS: &[&str] = &[
    "rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch", "oklab", "oklch", "color",
];

/// CSS-wide and special keywords accepted as color values.
const SPECIAL_KEYWORDS: &[&str] = &["transparent", "currentcolor", "inherit", "initial", "unset"];

/// The CSS named colors, sorted for binary search.
const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen",
];

/// A parsed color value.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// A hex literal, decoded to channels.
    Rgba { r: u8, g: u8, b: u8, a: u8 },

    /// A functional notation such as `rgba(13, 116, 144, 0.3)`, kept verbatim.
    Function(String),

    /// A named color or CSS-wide keyword, lowercased.
    Keyword(String),
}

impl Color {
    /// Parse a CSS color value.
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ColorError::Empty);
        }

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::Hex(value.to_string()));
        }

        if let Some(open) = value.find('(') {
            let name = value[..open].trim().to_ascii_lowercase();
            if !COLOR_FUNCTIONS.contains(&name.as_str()) || !value.ends_with(')') {
                return Err(ColorError::Function(value.to_string()));
            }
            let args = &value[open + 1..value.len() - 1];
            if !valid_function_args(&name, args) {
                return Err(ColorError::Function(value.to_string()));
            }
            return Ok(Self::Function(value.to_string()));
        }

        let keyword = value.to_ascii_lowercase();
        if SPECIAL_KEYWORDS.contains(&keyword.as_str())
            || NAMED_COLORS.binary_search(&keyword.as_str()).is_ok()
        {
            Ok(Self::Keyword(keyword))
        } else {
            Err(ColorError::Keyword(value.to_string()))
        }
    }

    /// Render the color with the given opacity (0.0 to 1.0).
    ///
    /// Returns `None` for colors whose channels are not known statically.
    #[must_use]
    pub fn with_opacity(&self, opacity: f32) -> Option<String> {
        match self {
            Self::Rgba { r, g, b, .. } => {
                let opacity = opacity.clamp(0.0, 1.0);
                Some(format!("rgb({r} {g} {b} / {})", trim_float(opacity)))
            }
            Self::Keyword(k) if k == "transparent" => Some("transparent".to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgba { r, g, b, a: 255 } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Rgba { r, g, b, a } => write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}"),
            Self::Function(s) | Self::Keyword(s) => f.write_str(s),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Color::Rgba {
            r: nibble(0)?,
            g: nibble(1)?,
            b: nibble(2)?,
            a: 255,
        }),
        4 => Some(Color::Rgba {
            r: nibble(0)?,
            g: nibble(1)?,
            b: nibble(2)?,
            a: nibble(3)?,
        }),
        6 => Some(Color::Rgba {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: 255,
        }),
        8 => Some(Color::Rgba {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: byte(6)?,
        }),
        _ => None,
    }
}

fn valid_function_args(name: &str, args: &str) -> bool {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    match name {
        "rgb" | "rgba" | "hsl" | "hsla" | "hwb" | "lab" | "lch" | "oklab" | "oklch" => {
            (3..=4).contains(&parts.len()) && parts.iter().all(|p| is_numeric_arg(p))
        }
        // color(display-p3 1 0 0)
        _ => parts.len() >= 4,
    }
}

fn is_numeric_arg(arg: &str) -> bool {
    if arg.eq_ignore_ascii_case("none") {
        return true;
    }
    let number = ["%", "deg", "grad", "rad", "turn"]
        .iter()
        .find_map(|unit| arg.strip_suffix(unit))
        .unwrap_or(arg);
    number.parse::<f64>().is_ok()
}

fn trim_float(value: f32) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digit_hex() {
        let color = Color::parse("#0d7490").unwrap();
        assert_eq!(
            color,
            Color::Rgba {
                r: 13,
                g: 116,
                b: 144,
                a: 255
            }
        );
        assert_eq!(color.to_string(), "#0d7490");
    }

    #[test]
    fn test_parse_short_hex() {
        let color = Color::parse("#fff").unwrap();
        assert_eq!(color.to_string(), "#ffffff");

        let color = Color::parse("#0008").unwrap();
        assert_eq!(color.to_string(), "#00000088");
    }

    #[test]
    fn test_parse_invalid_hex() {
        assert!(matches!(Color::parse("#12345"), Err(ColorError::Hex(_))));
        assert!(matches!(Color::parse("#ggg"), Err(ColorError::Hex(_))));
        assert!(matches!(Color::parse("#"), Err(ColorError::Hex(_))));
    }

    #[test]
    fn test_parse_functions() {
        assert!(Color::parse("rgba(13, 116, 144, 0.3)").is_ok());
        assert!(Color::parse("rgb(13 116 144 / 30%)").is_ok());
        assert!(Color::parse("hsl(190deg 84% 31%)").is_ok());
        assert!(Color::parse("oklch(0.7 0.1 200)").is_ok());
        assert!(Color::parse("color(display-p3 1 0 0)").is_ok());
    }

    #[test]
    fn test_parse_invalid_functions() {
        assert!(Color::parse("rgb(1, 2)").is_err());
        assert!(Color::parse("rgb(a, b, c)").is_err());
        assert!(Color::parse("rgb(1, 2, 3").is_err());
        assert!(Color::parse("linear-gradient(red, blue)").is_err());
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            Color::parse("Transparent").unwrap(),
            Color::Keyword("transparent".to_string())
        );
        assert!(matches!(
            Color::parse("tealish"),
            Err(ColorError::Keyword(_))
        ));
        assert_eq!(Color::parse("  "), Err(ColorError::Empty));
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(NAMED_COLORS.len(), 148);
        assert!(NAMED_COLORS.windows(2).all(|w| w[0] < w[1]));

        for name in [
            "rebeccapurple",
            "SlateGray",
            "lightgoldenrodyellow",
            "aliceblue",
            "yellowgreen",
        ] {
            assert_eq!(
                Color::parse(name).unwrap(),
                Color::Keyword(name.to_ascii_lowercase())
            );
        }
        assert!(matches!(
            Color::parse("rebeccapurples"),
            Err(ColorError::Keyword(_))
        ));
    }

    #[test]
    fn test_with_opacity() {
        let color = Color::parse("#0d7490").unwrap();
        assert_eq!(color.with_opacity(0.5).unwrap(), "rgb(13 116 144 / 0.5)");
        assert_eq!(color.with_opacity(1.0).unwrap(), "rgb(13 116 144 / 1)");
        assert_eq!(color.with_opacity(0.0).unwrap(), "rgb(13 116 144 / 0)");

        let func = Color::parse("rgba(1, 2, 3, 0.5)").unwrap();
        assert!(func.with_opacity(0.5).is_none());
    }
}
