//! Category token resolution.
//!
//! A user-facing category token becomes one or more OpenStreetMap tag pairs
//! that the provider query ORs together. The catalogue is an immutable value
//! built once at start-up and handed to [`CategoryResolver`]; nothing here
//! reads ambient global state.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use super::Error;

mod builtin;

#[cfg(test)]
mod tests;

/// One `key=value` tag selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagPair {
    key: String,
    value: String,
}

/// Reasons a `key=value` string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagPairError {
    /// No `=` separator.
    #[error("tag '{0}' must be written as key=value")]
    MissingSeparator(String),
    /// Key side is blank.
    #[error("tag '{0}' has an empty key")]
    EmptyKey(String),
    /// Value side is blank.
    #[error("tag '{0}' has an empty value")]
    EmptyValue(String),
}

impl TagPair {
    /// Build a tag pair from already separated parts.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::TagPair;
    ///
    /// let pair = TagPair::new("amenity", "cafe").expect("valid pair");
    /// assert_eq!(pair.to_string(), "amenity=cafe");
    /// ```
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, TagPairError> {
        let key = key.into().trim().to_owned();
        let value = value.into().trim().to_owned();
        if key.is_empty() {
            return Err(TagPairError::EmptyKey(format!("{key}={value}")));
        }
        if value.is_empty() {
            return Err(TagPairError::EmptyValue(format!("{key}={value}")));
        }
        Ok(Self { key, value })
    }

    /// Build a pair from literals known to be non-blank.
    pub(crate) fn from_static(key: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
        }
    }

    /// Tag key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Tag value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl FromStr for TagPair {
    type Err = TagPairError;

    /// Split on the first `=`; any further `=` belongs to the value.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (key, value) = trimmed
            .split_once('=')
            .ok_or_else(|| TagPairError::MissingSeparator(trimmed.to_owned()))?;
        if key.trim().is_empty() {
            return Err(TagPairError::EmptyKey(trimmed.to_owned()));
        }
        if value.trim().is_empty() {
            return Err(TagPairError::EmptyValue(trimmed.to_owned()));
        }
        Self::new(key, value)
    }
}

impl TryFrom<String> for TagPair {
    type Error = TagPairError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TagPair> for String {
    fn from(value: TagPair) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A named category with its synonyms and ORed tag pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Canonical category name, used as the output label.
    pub name: String,
    /// Alternative tokens, including translations.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Tag pairs in query order; a place matching any of them qualifies.
    pub tags: Vec<TagPair>,
}

/// Errors raised while assembling a catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    /// The catalogue file is not valid JSON for the expected shape.
    #[error("category catalogue is not valid JSON: {0}")]
    Json(String),
    /// The catalogue defines no rules.
    #[error("category catalogue must define at least one category")]
    Empty,
    /// A rule has a blank name.
    #[error("category names must not be blank")]
    BlankName,
    /// A rule has no tag pairs.
    #[error("category '{0}' must list at least one tag")]
    NoTags(String),
    /// Two rules claim the same name or synonym.
    #[error("category token '{token}' is claimed by both '{first}' and '{second}'")]
    DuplicateToken {
        /// Normalised token.
        token: String,
        /// Rule that claimed it first.
        first: String,
        /// Rule that claimed it again.
        second: String,
    },
}

/// Immutable lookup table from category tokens to rules.
#[derive(Debug, Clone)]
pub struct CategoryCatalogue {
    rules: Vec<CategoryRule>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct CatalogueFile {
    categories: Vec<CategoryRule>,
}

impl CategoryCatalogue {
    /// Build a catalogue, rejecting blank names, empty tag lists, and tokens
    /// claimed by more than one rule.
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self, CatalogueError> {
        if rules.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut index = HashMap::new();
        for (position, rule) in rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(CatalogueError::BlankName);
            }
            if rule.tags.is_empty() {
                return Err(CatalogueError::NoTags(rule.name.clone()));
            }
            let tokens = std::iter::once(&rule.name).chain(rule.synonyms.iter());
            for token in tokens {
                let normalised = normalise_dictionary_token(token);
                if normalised.is_empty() {
                    continue;
                }
                match index.get(&normalised) {
                    Some(&existing) if existing != position => {
                        let first: &CategoryRule = &rules[existing];
                        return Err(CatalogueError::DuplicateToken {
                            token: normalised,
                            first: first.name.clone(),
                            second: rule.name.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        index.insert(normalised, position);
                    }
                }
            }
        }

        Ok(Self { rules, index })
    }

    /// Catalogue shipped with the service.
    ///
    /// Built-in rules are checked by tests, so indexing keeps the first claim
    /// instead of failing.
    #[must_use]
    pub fn builtin() -> Self {
        let rules = builtin::rules();
        let mut index = HashMap::new();
        for (position, rule) in rules.iter().enumerate() {
            for token in std::iter::once(&rule.name).chain(rule.synonyms.iter()) {
                index
                    .entry(normalise_dictionary_token(token))
                    .or_insert(position);
            }
        }
        Self { rules, index }
    }

    /// Parse a catalogue from `{"categories": [{"name", "synonyms", "tags"}]}`.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::CategoryCatalogue;
    ///
    /// let json = r#"{"categories":[{"name":"cafe","tags":["amenity=cafe"]}]}"#;
    /// let catalogue = CategoryCatalogue::from_json(json).expect("valid catalogue");
    /// assert!(catalogue.lookup("CAFE").is_some());
    /// ```
    pub fn from_json(raw: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile =
            serde_json::from_str(raw).map_err(|err| CatalogueError::Json(err.to_string()))?;
        Self::new(file.categories)
    }

    /// Find the rule claiming `token`, ignoring case and accents.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&CategoryRule> {
        self.index
            .get(&normalise_dictionary_token(token))
            .and_then(|&position| self.rules.get(position))
    }

    /// All rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

/// How category tokens are interpreted; fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverMode {
    /// Tokens are names or synonyms looked up in the catalogue.
    #[default]
    Dictionary,
    /// Tokens are literal `key=value` tag selectors.
    Raw,
}

impl FromStr for ResolverMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dictionary" => Ok(Self::Dictionary),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown category mode '{other}'")),
        }
    }
}

/// Output of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    /// Label echoed in results and used in cache keys.
    pub label: String,
    /// Tag pairs ORed in the provider query.
    pub tags: Vec<TagPair>,
}

/// Resolves category tokens against an injected catalogue.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    mode: ResolverMode,
    catalogue: Arc<CategoryCatalogue>,
}

impl CategoryResolver {
    /// Create a resolver for `mode` backed by `catalogue`.
    pub fn new(mode: ResolverMode, catalogue: Arc<CategoryCatalogue>) -> Self {
        Self { mode, catalogue }
    }

    /// Active resolution mode.
    #[must_use]
    pub const fn mode(&self) -> ResolverMode {
        self.mode
    }

    /// Resolve a raw request token.
    ///
    /// Tokens are percent-decoded and trimmed first, so `amenity%3Dcafe`
    /// and `amenity=cafe` resolve identically.
    ///
    /// # Errors
    /// [`ErrorCode::UnknownCategory`](super::ErrorCode::UnknownCategory) in
    /// dictionary mode when no rule claims the token;
    /// [`ErrorCode::InvalidCategoryFormat`](super::ErrorCode::InvalidCategoryFormat)
    /// in raw mode when the token is not `key=value`.
    pub fn resolve(&self, token: &str) -> Result<ResolvedCategory, Error> {
        let decoded = decode_token(token);
        match self.mode {
            ResolverMode::Dictionary => {
                let rule = self.catalogue.lookup(&decoded).ok_or_else(|| {
                    Error::unknown_category(format!("no category named '{decoded}'"))
                })?;
                Ok(ResolvedCategory {
                    label: rule.name.clone(),
                    tags: rule.tags.clone(),
                })
            }
            ResolverMode::Raw => {
                let pair: TagPair = decoded
                    .parse()
                    .map_err(|err: TagPairError| Error::invalid_category_format(err.to_string()))?;
                Ok(ResolvedCategory {
                    label: pair.to_string(),
                    tags: vec![pair],
                })
            }
        }
    }
}

/// Percent-decode and trim a request token.
pub(crate) fn decode_token(raw: &str) -> String {
    percent_decode_str(raw.trim())
        .decode_utf8_lossy()
        .trim()
        .to_owned()
}

/// Lowercase, fold Spanish accents, and join words with `_`.
pub(crate) fn normalise_dictionary_token(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().map(fold_char).collect::<String>())
        .collect::<Vec<_>>()
        .join("_")
        .replace('-', "_")
}

fn fold_char(c: char) -> char {
    match c.to_lowercase().next().unwrap_or(c) {
        'á' | 'à' | 'ä' => 'a',
        'é' | 'è' | 'ë' => 'e',
        'í' | 'ì' | 'ï' => 'i',
        'ó' | 'ò' | 'ö' => 'o',
        'ú' | 'ù' | 'ü' => 'u',
        'ñ' => 'n',
        other => other,
    }
}
