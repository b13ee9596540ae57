use std::collections::BTreeMap;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(serde_json::Number),
    List(Vec<String>),
}

impl ParamValue {
    /// The value as a scalar string, `None` for lists.
    pub fn as_scalar(&self) -> Option<String> {
        match self {
            ParamValue::Text(text) => Some(text.clone()),
            ParamValue::Number(number) => Some(number.to_string()),
            ParamValue::List(_) => None,
        }
    }

    /// Every value carried, one element for scalars.
    pub fn values(&self) -> Vec<String> {
        match self {
            ParamValue::List(items) => items.clone(),
            scalar => scalar.as_scalar().into_iter().collect(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Read-only view over the parameters of the inbound request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParameters {
    values: BTreeMap<String, ParamValue>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        Self { values }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Scalar value of `key` as text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(ParamValue::as_scalar)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flattens the parameters into query string pairs, lists as `key[]`.
    pub fn query_pairs(&self, except: &[&str]) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in self.values.iter().filter(|(key, _)| !except.contains(&key.as_str())) {
            match value {
                ParamValue::List(items) => {
                    pairs.extend(items.iter().map(|item| (format!("{key}[]"), item.clone())));
                }
                scalar => {
                    if let Some(text) = scalar.as_scalar() {
                        pairs.push((key.clone(), text));
                    }
                }
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Accepts exactly `asc` or `desc`.
    pub fn parse_exact(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// The query capabilities a repository type opts into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const SORT: Capabilities = Capabilities(1);
    pub const SEARCH: Capabilities = Capabilities(1 << 1);
    pub const FILTER: Capabilities = Capabilities(1 << 2);
    pub const PAGINATE: Capabilities = Capabilities(1 << 3);
    pub const ALL: Capabilities = Capabilities(0b1111);

    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Self) -> Self::Output {
        Capabilities(self.0 | rhs.0)
    }
}

/// A filter declaration: the request key to read and the field it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDeclaration {
    pub request_key: String,
    pub field: String,
}

impl FilterDeclaration {
    pub fn keyed(request_key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            request_key: request_key.into(),
            field: field.into(),
        }
    }
}

impl From<&str> for FilterDeclaration {
    fn from(field: &str) -> Self {
        Self::keyed(field, field)
    }
}

impl From<(&str, &str)> for FilterDeclaration {
    fn from((request_key, field): (&str, &str)) -> Self {
        Self::keyed(request_key, field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationMode {
    /// Counts the matching rows and reports the last page.
    #[default]
    Full,
    /// Only reports whether another page exists.
    Simple,
}

/// Which of the model's default global scopes a repository drops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GlobalScopeExclusion {
    #[default]
    None,
    All,
    Named(Vec<String>),
}

impl GlobalScopeExclusion {
    pub fn excludes(&self, scope: &str) -> bool {
        match self {
            GlobalScopeExclusion::None => false,
            GlobalScopeExclusion::All => true,
            GlobalScopeExclusion::Named(names) => names.iter().any(|name| name == scope),
        }
    }
}

/// Multi-locale text storage attached to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationTable {
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub locale_column: &'static str,
    /// Translated text columns that may be sorted or searched on.
    pub columns: &'static [&'static str],
}

impl TranslationTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(&name)
    }
}

/// How a named relation joins back to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `owner.foreign_key -> related.owner_key`
    BelongsTo {
        related_table: &'static str,
        foreign_key: &'static str,
        owner_key: &'static str,
    },
    /// `related.foreign_key -> owner.key`
    HasMany {
        related_table: &'static str,
        foreign_key: &'static str,
    },
    BelongsToMany {
        pivot_table: &'static str,
        foreign_pivot_key: &'static str,
        related_pivot_key: &'static str,
        related_table: &'static str,
        related_key: &'static str,
    },
}

impl RelationKind {
    pub fn label(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo { .. } => "belongs-to",
            RelationKind::HasMany { .. } => "has-many",
            RelationKind::BelongsToMany { .. } => "belongs-to-many",
        }
    }
}
