//! `field.direction` sort specifiers validated against an allow-list.

use std::fmt;

/// Lower-case literal accepted for ascending order.
pub const ORDER_ASC: &str = "asc";

/// Lower-case literal accepted for descending order.
pub const ORDER_DESC: &str = "desc";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    #[error("malformed sort parameter, should be field.direction")]
    Malformed,

    #[error("malformed direction in sort parameter, should be asc or desc")]
    MalformedOrderDirection,

    #[error("unknown field '{0}' in sort parameter")]
    UnknownSortField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Upper-case SQL keyword.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A parsed ordering directive.
///
/// The field is guaranteed to be a member of the allow-list it was parsed
/// against, so storage layers may map it onto a column without re-checking
/// user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    field: String,
    direction: SortDirection,
}

impl SortOption {
    /// Parse `raw` against `allowed`.
    ///
    /// Checks run in a fixed order: shape, then direction, then field.
    pub fn parse(raw: &str, allowed: &[&str]) -> Result<Self, SortError> {
        let mut parts = raw.split('.');
        let (field, order) = match (parts.next(), parts.next(), parts.next()) {
            (Some(field), Some(order), None) => (field, order),
            _ => return Err(SortError::Malformed),
        };

        let direction = match order {
            ORDER_ASC => SortDirection::Asc,
            ORDER_DESC => SortDirection::Desc,
            _ => return Err(SortError::MalformedOrderDirection),
        };

        if !allowed.contains(&field) {
            return Err(SortError::UnknownSortField(field.to_string()));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }

    /// Like [`SortOption::parse`], substituting `default` when `raw` is empty.
    pub fn parse_or_default(raw: &str, allowed: &[&str], default: &str) -> Result<Self, SortError> {
        let raw = if raw.is_empty() { default } else { raw };
        Self::parse(raw, allowed)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Normalized upper-case direction (`ASC` / `DESC`).
    pub fn order(&self) -> &'static str {
        self.direction.as_sql()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.order())
    }
}
