//! Query construction: sort parsing, filter translation, pagination math and
//! the [`FilterSortLimit`] descriptor that carries them to storage.

pub mod filter;
pub mod pagination;
pub mod sort;

pub use filter::{FilmPredicate, FilterError, FilterSet, FilterValue};
pub use pagination::{PageError, Pagination, DEFAULT_LIMIT, MAX_LIMIT};
pub use sort::{SortDirection, SortError, SortOption};

/// An immutable list-query descriptor.
///
/// Assembled by [`FilterSortLimitBuilder`] from parts that were validated by
/// their own producers. `offset` of `None` means the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSortLimit {
    pub sort: Option<SortOption>,
    pub filter: FilterSet,
    pub limit: i64,
    pub offset: Option<i64>,
}

impl FilterSortLimit {
    pub fn builder() -> FilterSortLimitBuilder {
        FilterSortLimitBuilder::default()
    }

    /// Offset to hand to storage, `0` when unset.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

/// Chained-setter builder for [`FilterSortLimit`]. Performs no validation.
#[derive(Debug, Clone, Default)]
pub struct FilterSortLimitBuilder {
    sort: Option<SortOption>,
    filter: FilterSet,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl FilterSortLimitBuilder {
    pub fn sort(mut self, sort: SortOption) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn filter(mut self, filter: FilterSet) -> Self {
        self.filter = filter;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: Option<i64>) -> Self {
        self.offset = offset;
        self
    }

    pub fn build(self) -> FilterSortLimit {
        FilterSortLimit {
            sort: self.sort,
            filter: self.filter,
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
            offset: self.offset,
        }
    }
}
