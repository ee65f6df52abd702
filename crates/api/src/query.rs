//! Query-string parsing for film listings.
//!
//! [`FilmListParams`] is deserialized by axum's `Query` extractor and turned
//! into a [`FilterSortLimit`] here, so handlers never touch raw strings.

use cinelog_core::error::CoreError;
use cinelog_core::film::{FilmError, DEFAULT_FILM_SORT, FILM_SORT_FIELDS};
use cinelog_core::query::filter::{
    normalize_genre_name, FILTER_GENRES, FILTER_RELEASE_DATE, FILTER_TITLE,
};
use cinelog_core::query::pagination::{resolve_limit, resolve_offset};
use cinelog_core::query::{FilterSet, FilterSortLimit, PageError, SortOption, DEFAULT_LIMIT, MAX_LIMIT};
use cinelog_core::validation::{find_item_out_of_bounds, split_date_filter};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

/// Separator between genre names in the `genres` parameter.
const GENRE_SEPARATOR: char = ',';

/// Query parameters for `GET /api/v1/films`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FilmListParams {
    /// `field.direction`, e.g. `title.asc`.
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[validate(length(min = 3, max = 30))]
    pub title: Option<String>,
    /// `YYYY-MM-DD` or `YYYY-MM-DD:YYYY-MM-DD`.
    pub release_date: Option<String>,
    /// Comma-separated genre names.
    pub genres: Option<String>,
}

fn page_error(err: PageError) -> AppError {
    CoreError::validation(err.field(), err.to_string()).into()
}

impl FilmListParams {
    /// Validate every parameter and assemble the list query.
    pub fn into_query(self) -> Result<FilterSortLimit, AppError> {
        self.validate()?;

        let sort = SortOption::parse_or_default(
            self.sort.as_deref().unwrap_or_default(),
            FILM_SORT_FIELDS,
            DEFAULT_FILM_SORT,
        )
        .map_err(FilmError::from)?;

        let limit = resolve_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT).map_err(page_error)?;
        let offset = resolve_offset(self.offset).map_err(page_error)?;

        let mut filter = FilterSet::new();

        if let Some(title) = self.title {
            filter.insert(FILTER_TITLE, title);
        }

        if let Some(raw) = self.release_date.as_deref() {
            let mut dates = split_date_filter(raw)
                .map_err(|message| CoreError::validation(FILTER_RELEASE_DATE, message))?;
            if dates.len() == 1 {
                filter.insert(FILTER_RELEASE_DATE, dates.remove(0));
            } else {
                filter.insert(FILTER_RELEASE_DATE, dates);
            }
        }

        if let Some(raw) = self.genres.as_deref() {
            let names = split_genres(raw);
            if names.is_empty() {
                return Err(CoreError::validation(FILTER_GENRES, "must not be empty").into());
            }
            if let Some(bad) = find_item_out_of_bounds(&names, 3, 100) {
                return Err(CoreError::validation(
                    FILTER_GENRES,
                    format!("genre '{bad}' must be between 3 and 100 characters"),
                )
                .into());
            }
            filter.insert(FILTER_GENRES, names);
        }

        Ok(FilterSortLimit::builder()
            .sort(sort)
            .filter(filter)
            .limit(limit)
            .offset(offset)
            .build())
    }
}

fn split_genres(raw: &str) -> Vec<String> {
    raw.split(GENRE_SEPARATOR)
        .map(normalize_genre_name)
        .filter(|name| !name.is_empty())
        .collect()
}
