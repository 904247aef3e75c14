use crate::entity::FolderId;

/// Errors from the blob store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("content type {0:?} is not accepted")]
    ContentTypeNotAllowed(String),

    #[error("could not determine the content type of {0}")]
    UnknownContentType(String),

    #[error("no object at {0}")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors from catalog operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("request body cannot be empty")]
    EmptyPatch,

    #[error("folder {0} is not empty")]
    FolderNotEmpty(FolderId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("catalog backend error: {0}")]
    Backend(String),
}

impl CatalogError {
    pub(crate) fn folder_not_found(id: FolderId) -> Self {
        Self::NotFound {
            kind: "folder",
            id: id.to_string(),
        }
    }

    pub(crate) fn model_not_found(id: crate::entity::ModelId) -> Self {
        Self::NotFound {
            kind: "model",
            id: id.to_string(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
