//! CRUD seam over folders and models.
//!
//! Methods return `Send` futures so callers can drive them from a
//! multi-threaded runtime. Implementations decide storage; the contract is:
//!
//! * listings filter by parent (folders) or folder (models), `None` = root
//! * patches with no fields are rejected with [`CatalogError::EmptyPatch`]
//! * a folder can only be deleted when it has no sub-folders and no models
//! * breadcrumbs are ordered root first, ending with the requested folder

use std::cmp::Ordering;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::entity::{
    Folder, FolderId, FolderPatch, FolderSummary, Model, ModelId, ModelPatch, NewFolder, NewModel,
};
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Sort {
    pub const NAME_ASC: Self = Self {
        key: SortKey::Name,
        order: SortOrder::Asc,
    };
    pub const NEWEST_FIRST: Self = Self {
        key: SortKey::CreatedAt,
        order: SortOrder::Desc,
    };

    pub fn sort_folders(self, folders: &mut [Folder]) {
        folders.sort_by(|a, b| {
            let ord = match self.key {
                SortKey::Name => compare_names(&a.name, &b.name),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            self.order.apply(ord.then_with(|| a.id.cmp(&b.id)))
        });
    }

    pub fn sort_models(self, models: &mut [Model]) {
        models.sort_by(|a, b| {
            let ord = match self.key {
                SortKey::Name => compare_names(&a.name, &b.name),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            self.order.apply(ord.then_with(|| a.id.cmp(&b.id)))
        });
    }
}

/// Case-insensitive name order, falling back to byte order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Reject blank names before they reach storage.
pub(crate) fn validate_name(name: &str, what: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{what} name is required")));
    }
    Ok(())
}

pub trait Catalog: Send + Sync {
    fn list_folders(
        &self,
        parent: Option<FolderId>,
        sort: Sort,
    ) -> impl Future<Output = CatalogResult<Vec<Folder>>> + Send;

    fn list_models(
        &self,
        folder: Option<FolderId>,
        sort: Sort,
    ) -> impl Future<Output = CatalogResult<Vec<Model>>> + Send;

    fn get_folder(&self, id: FolderId) -> impl Future<Output = CatalogResult<Folder>> + Send;

    fn get_model(&self, id: ModelId) -> impl Future<Output = CatalogResult<Model>> + Send;

    fn create_folder(&self, new: NewFolder) -> impl Future<Output = CatalogResult<Folder>> + Send;

    fn create_model(&self, new: NewModel) -> impl Future<Output = CatalogResult<Model>> + Send;

    fn update_folder(
        &self,
        id: FolderId,
        patch: FolderPatch,
    ) -> impl Future<Output = CatalogResult<Folder>> + Send;

    fn update_model(
        &self,
        id: ModelId,
        patch: ModelPatch,
    ) -> impl Future<Output = CatalogResult<Model>> + Send;

    fn delete_folder(&self, id: FolderId) -> impl Future<Output = CatalogResult<()>> + Send;

    /// Remove a model record and return it so the caller can release its blobs.
    fn delete_model(&self, id: ModelId) -> impl Future<Output = CatalogResult<Model>> + Send;

    fn breadcrumbs(&self, id: FolderId) -> impl Future<Output = CatalogResult<Vec<Folder>>> + Send;

    /// Every folder as `(id, name)`, ordered by name.
    fn all_folders(&self) -> impl Future<Output = CatalogResult<Vec<FolderSummary>>> + Send;

    /// Public models, newest first, skipping `offset` and returning at most `limit`.
    fn public_models(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = CatalogResult<Vec<Model>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_names_ignores_case() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("Zebra", "aardvark"), Ordering::Greater);
        assert_ne!(compare_names("a", "A"), Ordering::Equal);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Chairs", "folder").is_ok());
        assert_eq!(
            validate_name("  ", "folder"),
            Err(CatalogError::Validation("folder name is required".into()))
        );
    }
}
