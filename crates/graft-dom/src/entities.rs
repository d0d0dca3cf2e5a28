//! HTML entity to Unicode conversion.
//!
//! Converts named HTML entities to their Unicode equivalents before XML
//! parsing. Standard XML entities (amp, lt, gt, quot, apos) are preserved
//! as-is so they reach the parser as entity references.

use std::sync::LazyLock;

use regex::Regex;

/// Regex pattern for matching named HTML entities.
static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z]+);").expect("invalid entity regex"));

/// Regex recognizing a well-formed entity reference body at a position.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("invalid ref regex")
});

/// Convert HTML entities to Unicode characters.
///
/// Replaces named HTML entities (e.g., `&nbsp;`, `&mdash;`) with their
/// Unicode equivalents and escapes bare ampersands that do not start a
/// well-formed reference, so the XML reader never chokes on prose text.
/// Standard XML entities (amp, lt, gt, quot, apos) are left unchanged.
pub fn convert_html_entities(html: &str) -> String {
    let converted = ENTITY_PATTERN.replace_all(html, |caps: &regex::Captures| {
        let entity_name = &caps[1];
        entity_to_unicode(entity_name)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_owned())
    });
    escape_bare_ampersands(&converted)
}

/// Replace every `&` that does not start a well-formed reference with `&amp;`.
fn escape_bare_ampersands(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if REFERENCE.is_match(after) {
            out.push('&');
        } else {
            out.push_str("&amp;");
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Decode a single entity reference body (without `&` and `;`).
///
/// Handles the standard XML entities and numeric character references;
/// unknown entities are preserved literally.
pub fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        // Numeric character references
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity - preserve as-is
        _ => format!("&{entity};"),
    }
}

/// Map HTML entity name to Unicode character.
fn entity_to_unicode(name: &str) -> Option<&'static str> {
    Some(match name {
        // Common entities
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",

        // Arrows
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "harr" => "\u{2194}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",

        // Math symbols
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "plusmn" => "\u{00b1}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",

        // Legal symbols
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",

        // Currency
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",

        // Misc symbols
        "deg" => "\u{00b0}",
        "para" => "\u{00b6}",
        "sect" => "\u{00a7}",
        "dagger" => "\u{2020}",
        "Dagger" => "\u{2021}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "iexcl" => "\u{00a1}",
        "iquest" => "\u{00bf}",

        // Fractions
        "frac14" => "\u{00bc}",
        "frac12" => "\u{00bd}",
        "frac34" => "\u{00be}",

        // Superscripts
        "sup1" => "\u{00b9}",
        "sup2" => "\u{00b2}",
        "sup3" => "\u{00b3}",

        // Other
        "acute" => "\u{00b4}",
        "micro" => "\u{00b5}",
        "middot" => "\u{00b7}",
        "cedil" => "\u{00b8}",
        "ordf" => "\u{00aa}",
        "ordm" => "\u{00ba}",

        // Unknown entity - return None to preserve as-is
        _ => return None,
    })
}
