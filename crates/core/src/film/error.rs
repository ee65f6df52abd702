use crate::error::CoreError;
use crate::query::filter::FilterError;
use crate::query::sort::SortError;
use crate::types::FilmId;

use super::store::StoreError;

/// Failures of the film workflow.
///
/// Variants ending in `Failed` wrap a storage fault and are surfaced to
/// clients as internal errors; the rest are caller mistakes.
#[derive(Debug, thiserror::Error)]
pub enum FilmError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("film with title '{0}' already exists")]
    DuplicateTitle(String),

    #[error("film {0} not found")]
    NotFound(FilmId),

    #[error("access denied, you do not have permission to modify this film")]
    Permission,

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("failed to check film existence")]
    CheckExistenceFailed(#[source] StoreError),

    #[error("failed to look up genres by name")]
    GetGenresByNamesFailed(#[source] StoreError),

    #[error("failed to create genre")]
    CreateGenreFailed(#[source] StoreError),

    #[error("failed to look up casts by name")]
    GetCastsByNamesFailed(#[source] StoreError),

    #[error("failed to create cast")]
    CreateCastFailed(#[source] StoreError),

    #[error("failed to find film")]
    FilmFindFailed(#[source] StoreError),

    #[error("failed to list films")]
    FilmFindAllFailed(#[source] StoreError),

    #[error("failed to count films")]
    FilmCountFailed(#[source] StoreError),

    #[error("failed to create film")]
    FilmCreateFailed(#[source] StoreError),

    #[error("failed to update film")]
    FilmUpdateFailed(#[source] StoreError),

    #[error("failed to delete film")]
    FilmDeleteFailed(#[source] StoreError),
}

impl FilmError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The underlying storage fault, if this error wraps one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            FilmError::CheckExistenceFailed(e)
            | FilmError::GetGenresByNamesFailed(e)
            | FilmError::CreateGenreFailed(e)
            | FilmError::GetCastsByNamesFailed(e)
            | FilmError::CreateCastFailed(e)
            | FilmError::FilmFindFailed(e)
            | FilmError::FilmFindAllFailed(e)
            | FilmError::FilmCountFailed(e)
            | FilmError::FilmCreateFailed(e)
            | FilmError::FilmUpdateFailed(e)
            | FilmError::FilmDeleteFailed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.store_error().is_some() || matches!(self, FilmError::UnknownOperation(_))
    }
}

impl From<FilterError> for FilmError {
    fn from(err: FilterError) -> Self {
        FilmError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<SortError> for FilmError {
    fn from(err: SortError) -> Self {
        FilmError::validation("sort", err.to_string())
    }
}

impl From<FilmError> for CoreError {
    fn from(err: FilmError) -> Self {
        match err {
            FilmError::Validation { field, message } => CoreError::Validation { field, message },
            FilmError::DuplicateTitle(title) => {
                CoreError::validation("title", format!("film with title '{title}' already exists"))
            }
            FilmError::NotFound(id) => CoreError::NotFound {
                entity: "Film",
                id: id.to_string(),
            },
            FilmError::Permission => CoreError::Forbidden(FilmError::Permission.to_string()),
            other => {
                let detail = match other.store_error() {
                    Some(source) => format!("{other}: {source}"),
                    None => other.to_string(),
                };
                CoreError::Internal(detail)
            }
        }
    }
}
