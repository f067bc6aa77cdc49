//! Helpers for reading loosely typed OpenStreetMap tag maps.
//!
//! Provider tags are free-form strings. Every lookup here returns an explicit
//! absence (`None` or [`TagBool::Unknown`]) instead of relying on truthiness,
//! so a value such as `"0"` is read as a real value rather than as missing.

use std::collections::BTreeMap;

use serde::Serialize;

/// Raw provider tag map, ordered for deterministic iteration.
pub type TagMap = BTreeMap<String, String>;

/// Tri-state reading of a boolean-like tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagBool {
    /// The tag affirms the property.
    True,
    /// The tag denies the property.
    False,
    /// The tag is absent or its value is not boolean-like.
    #[default]
    Unknown,
}

impl TagBool {
    /// Normalise a raw tag value.
    ///
    /// Matching ignores ASCII case and surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::TagBool;
    ///
    /// assert_eq!(TagBool::parse(" Yes "), TagBool::True);
    /// assert_eq!(TagBool::parse("0"), TagBool::False);
    /// assert_eq!(TagBool::parse("limited"), TagBool::Unknown);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "yes" | "y" | "true" | "1" | "on" | "designated" | "permissive" => Self::True,
            "no" | "n" | "false" | "0" | "off" => Self::False,
            _ => Self::Unknown,
        }
    }

    /// Read `key` from `tags`, yielding [`TagBool::Unknown`] when absent.
    #[must_use]
    pub fn from_tag(tags: &TagMap, key: &str) -> Self {
        tags.get(key).map_or(Self::Unknown, |value| Self::parse(value))
    }

    /// Collapse to an optional boolean for output payloads.
    #[must_use]
    pub const fn as_option(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }
}

/// Return the trimmed value of `key` when present and non-blank.
#[must_use]
pub fn non_blank<'a>(tags: &'a TagMap, key: &str) -> Option<&'a str> {
    tags.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// Return the first non-blank value among `keys`, in order.
#[must_use]
pub fn first_non_blank<'a>(tags: &'a TagMap, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| non_blank(tags, key))
}

/// Whether any of `keys` carries a non-blank value.
#[must_use]
pub fn has_any(tags: &TagMap, keys: &[&str]) -> bool {
    first_non_blank(tags, keys).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[rstest]
    #[case("yes", TagBool::True)]
    #[case("TRUE", TagBool::True)]
    #[case(" 1 ", TagBool::True)]
    #[case("designated", TagBool::True)]
    #[case("No", TagBool::False)]
    #[case("0", TagBool::False)]
    #[case("off", TagBool::False)]
    #[case("", TagBool::Unknown)]
    #[case("limited", TagBool::Unknown)]
    #[case("wlan", TagBool::Unknown)]
    fn parses_boolean_like_values(#[case] raw: &str, #[case] expected: TagBool) {
        assert_eq!(TagBool::parse(raw), expected);
    }

    #[rstest]
    fn zero_is_a_present_value_not_an_absence() {
        let map = tags(&[("capacity", "0")]);
        assert_eq!(non_blank(&map, "capacity"), Some("0"));
        assert_eq!(TagBool::from_tag(&map, "capacity"), TagBool::False);
        assert_eq!(TagBool::from_tag(&map, "missing"), TagBool::Unknown);
    }

    #[rstest]
    fn first_non_blank_skips_blank_entries() {
        let map = tags(&[("phone", "  "), ("contact:phone", "+52 55 1234 5678")]);
        assert_eq!(
            first_non_blank(&map, &["phone", "contact:phone"]),
            Some("+52 55 1234 5678")
        );
        assert!(!has_any(&map, &["email"]));
    }
}
