//! Request parameters.
//!
//! Parameters are an insertion-ordered map from key to rendered value. Keys
//! may be plain (`"q"`) or typed (`"age::int"`); the typed form is what ezi
//! servers use to convert values before filtering or creating records. The
//! typed builders on [`Params`] render values the way the server parses them.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Separates a parameter name from its type in a typed key.
pub const TYPE_DELIMITER: &str = "::";

/// `strftime` format for `date` values, e.g. `21/11/2006 16:30`.
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Parameter names that identify the record a call targets.
pub const PRIMARY_KEY_NAMES: [&str; 2] = ["pk", "id"];

/// Value types a typed key may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Int,
    Str,
    Bool,
    Date,
    /// Primary key of a related record.
    ForeignKey,
    Float,
}

impl ParamType {
    /// Returns the suffix used after [`TYPE_DELIMITER`].
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Str => "str",
            ParamType::Bool => "bool",
            ParamType::Date => "date",
            ParamType::ForeignKey => "fk",
            ParamType::Float => "fl",
        }
    }

    /// Parses a type suffix.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "int" => Some(ParamType::Int),
            "str" => Some(ParamType::Str),
            "bool" => Some(ParamType::Bool),
            "date" => Some(ParamType::Date),
            "fk" => Some(ParamType::ForeignKey),
            "fl" => Some(ParamType::Float),
            _ => None,
        }
    }
}

/// Builds `name::type`.
pub fn typed_key(name: &str, ty: ParamType) -> String {
    format!("{name}{TYPE_DELIMITER}{}", ty.as_str())
}

/// Splits a key into its name and, if present and recognised, its type.
pub fn split_key(key: &str) -> (&str, Option<ParamType>) {
    match key.split_once(TYPE_DELIMITER) {
        Some((name, suffix)) => (name, ParamType::from_suffix(suffix)),
        None => (key, None),
    }
}

/// Returns `true` if `key` marks the record identifier.
///
/// Matches `pk` and `id`, bare or typed as `int`.
pub fn is_primary_key(key: &str) -> bool {
    let (name, ty) = split_key(key);
    if !PRIMARY_KEY_NAMES.contains(&name) {
        return false;
    }
    match key.split_once(TYPE_DELIMITER) {
        None => true,
        Some(_) => ty == Some(ParamType::Int),
    }
}

/// Insertion-ordered request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(IndexMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a raw key/value pair.
    ///
    /// Re-inserting an existing key replaces its value and keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    /// Builder form of [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn int(self, name: &str, value: i64) -> Self {
        self.with(typed_key(name, ParamType::Int), value)
    }

    pub fn str(self, name: &str, value: impl Into<String>) -> Self {
        let value: String = value.into();
        self.with(typed_key(name, ParamType::Str), value)
    }

    /// Booleans travel as `1` / `0`.
    pub fn bool(self, name: &str, value: bool) -> Self {
        self.with(typed_key(name, ParamType::Bool), u8::from(value))
    }

    pub fn date(self, name: &str, value: NaiveDateTime) -> Self {
        self.with(
            typed_key(name, ParamType::Date),
            value.format(DATE_FORMAT),
        )
    }

    pub fn foreign_key(self, name: &str, pk: i64) -> Self {
        self.with(typed_key(name, ParamType::ForeignKey), pk)
    }

    pub fn float(self, name: &str, value: f64) -> Self {
        self.with(typed_key(name, ParamType::Float), value)
    }

    /// Sets the record identifier as `pk::int`.
    pub fn pk(self, pk: i64) -> Self {
        self.int(PRIMARY_KEY_NAMES[0], pk)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the first primary-key value, if any.
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key_entry().map(|(_, value)| value)
    }

    /// Returns the key and value of the first primary-key marker. Later
    /// markers are ordinary fields.
    pub fn primary_key_entry(&self) -> Option<(&str, &str)> {
        self.iter().find(|(key, _)| is_primary_key(key))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn typed_builders_render_server_formats() {
        let when = NaiveDate::from_ymd_opt(2006, 11, 21)
            .unwrap()
            .and_hms_opt(16, 30, 0)
            .unwrap();
        let params = Params::new()
            .int("age", 21)
            .str("name", "Ada")
            .bool("active", true)
            .bool("archived", false)
            .date("joined", when)
            .foreign_key("team", 4)
            .float("score", 2.5);

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("age::int", "21"),
                ("name::str", "Ada"),
                ("active::bool", "1"),
                ("archived::bool", "0"),
                ("joined::date", "21/11/2006 16:30"),
                ("team::fk", "4"),
                ("score::fl", "2.5"),
            ]
        );
    }

    #[test]
    fn reinserting_keeps_position() {
        let params = Params::new().with("a", 1).with("b", 2).with("a", 3);
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn primary_key_markers() {
        assert!(is_primary_key("pk"));
        assert!(is_primary_key("id"));
        assert!(is_primary_key("pk::int"));
        assert!(is_primary_key("id::int"));
        assert!(!is_primary_key("pk::str"));
        assert!(!is_primary_key("pk::bogus"));
        assert!(!is_primary_key("person_id"));
        assert!(!is_primary_key("team::fk"));
    }

    #[test]
    fn split_key_recognises_types() {
        assert_eq!(split_key("age::int"), ("age", Some(ParamType::Int)));
        assert_eq!(split_key("age::nope"), ("age", None));
        assert_eq!(split_key("q"), ("q", None));
    }

    #[test]
    fn primary_key_returns_first_marker() {
        let params = Params::new().with("x", 5).pk(7).with("id", 9);
        assert_eq!(params.primary_key(), Some("7"));
        assert_eq!(Params::new().with("x", 1).primary_key(), None);
        assert_eq!(params.primary_key_entry(), Some(("pk::int", "7")));
    }

    #[test]
    fn collects_from_pairs() {
        let params: Params = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some("2"));
    }
}
