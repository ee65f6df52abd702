//! User-supplied search predicates and their translation into storage
//! predicates.
//!
//! A [`FilterSet`] is a named bag of loosely-typed values, already split out
//! of the request by the transport layer. [`FilterSet::translate`] checks
//! each value's shape and produces typed [`FilmPredicate`]s. Genre names are
//! left unresolved; the film workflow resolves them to IDs before querying.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::DbId;

pub const FILTER_TITLE: &str = "title";
pub const FILTER_RELEASE_DATE: &str = "release_date";
pub const FILTER_GENRES: &str = "genres";

/// Date format accepted by the `release_date` filter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A field-attributed filter failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FilterError {
    pub field: String,
    pub message: String,
}

impl FilterError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        FilterValue::List(value)
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(value: [&str; N]) -> Self {
        FilterValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

/// A storage-level predicate over the `films` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilmPredicate {
    /// `title LIKE '%value%'`.
    TitleContains(String),
    ReleasedOn(NaiveDate),
    /// Inclusive on both ends.
    ReleasedBetween(NaiveDate, NaiveDate),
    /// Membership by lower-cased genre name, not yet resolved.
    GenreNames(Vec<String>),
    /// Membership in the film-genre join by resolved genre ID.
    GenreIds(Vec<DbId>),
}

/// Named filter values keyed by filter field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    values: BTreeMap<String, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Translate every entry into a storage predicate.
    ///
    /// Output order follows key order, so equal filter sets always yield the
    /// same predicate list.
    pub fn translate(&self) -> Result<Vec<FilmPredicate>, FilterError> {
        self.values
            .iter()
            .map(|(key, value)| translate_one(key, value))
            .collect()
    }
}

fn translate_one(key: &str, value: &FilterValue) -> Result<FilmPredicate, FilterError> {
    match key {
        FILTER_TITLE => match value {
            FilterValue::Text(title) => Ok(FilmPredicate::TitleContains(title.clone())),
            FilterValue::List(_) => Err(FilterError::new(FILTER_TITLE, "must be a single string")),
        },
        FILTER_RELEASE_DATE => match value {
            FilterValue::Text(date) => Ok(FilmPredicate::ReleasedOn(parse_date(date)?)),
            FilterValue::List(dates) if dates.len() == 2 => {
                let from = parse_date(&dates[0])?;
                let to = parse_date(&dates[1])?;
                if from > to {
                    return Err(FilterError::new(
                        FILTER_RELEASE_DATE,
                        "the first date must not be after the second date",
                    ));
                }
                Ok(FilmPredicate::ReleasedBetween(from, to))
            }
            FilterValue::List(_) => Err(FilterError::new(
                FILTER_RELEASE_DATE,
                "must be a date or a [from, to] date pair",
            )),
        },
        FILTER_GENRES => match value {
            FilterValue::List(names) if !names.is_empty() => Ok(FilmPredicate::GenreNames(
                names.iter().map(|n| normalize_genre_name(n)).collect(),
            )),
            FilterValue::List(_) => Err(FilterError::new(FILTER_GENRES, "must not be empty")),
            FilterValue::Text(_) => Err(FilterError::new(
                FILTER_GENRES,
                "must be a list of genre names",
            )),
        },
        other => Err(FilterError::new(other, "unknown field")),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, FilterError> {
    crate::validation::parse_date(raw).ok_or_else(|| {
        FilterError::new(
            FILTER_RELEASE_DATE,
            format!("invalid date '{raw}', expected YYYY-MM-DD"),
        )
    })
}

/// Genre names are compared lower-cased and trimmed, on write and on lookup.
pub fn normalize_genre_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Build a `LIKE` pattern matching `needle` anywhere, escaping `\`, `%` and `_`.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
