//! In-process [`Catalog`] backed by hash maps.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::catalog::{Catalog, Sort, compare_names, validate_name};
use crate::entity::{
    Folder, FolderId, FolderPatch, FolderSummary, Model, ModelId, ModelPatch, NewFolder, NewModel,
};
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Default)]
struct Tables {
    folders: HashMap<FolderId, Folder>,
    models: HashMap<ModelId, Model>,
}

impl Tables {
    fn folder(&self, id: FolderId) -> CatalogResult<&Folder> {
        self.folders
            .get(&id)
            .ok_or_else(|| CatalogError::folder_not_found(id))
    }

    fn check_parent(&self, parent: Option<FolderId>) -> CatalogResult<()> {
        match parent {
            Some(id) => self.folder(id).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Ancestor chain from `id` up to the root, `id` first.
    fn ancestry(&self, id: FolderId) -> CatalogResult<Vec<Folder>> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if chain.iter().any(|f: &Folder| f.id == current) {
                return Err(CatalogError::Backend(format!(
                    "folder hierarchy loops at {current}"
                )));
            }
            let folder = self.folder(current)?;
            cursor = folder.parent_id;
            chain.push(folder.clone());
        }
        Ok(chain)
    }
}

/// Thread-safe in-memory catalog. Creation times are strictly increasing.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: RwLock<Tables>,
    last_created: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let mut last = self.last_created.lock();
        let now = Utc::now();
        let stamp = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }

    pub fn folder_count(&self) -> usize {
        self.tables.read().folders.len()
    }

    pub fn model_count(&self) -> usize {
        self.tables.read().models.len()
    }
}

impl Catalog for MemoryCatalog {
    async fn list_folders(&self, parent: Option<FolderId>, sort: Sort) -> CatalogResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .tables
            .read()
            .folders
            .values()
            .filter(|f| f.parent_id == parent)
            .cloned()
            .collect();
        sort.sort_folders(&mut folders);
        Ok(folders)
    }

    async fn list_models(&self, folder: Option<FolderId>, sort: Sort) -> CatalogResult<Vec<Model>> {
        let mut models: Vec<Model> = self
            .tables
            .read()
            .models
            .values()
            .filter(|m| m.folder_id == folder)
            .cloned()
            .collect();
        sort.sort_models(&mut models);
        Ok(models)
    }

    async fn get_folder(&self, id: FolderId) -> CatalogResult<Folder> {
        self.tables.read().folder(id).cloned()
    }

    async fn get_model(&self, id: ModelId) -> CatalogResult<Model> {
        self.tables
            .read()
            .models
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::model_not_found(id))
    }

    async fn create_folder(&self, new: NewFolder) -> CatalogResult<Folder> {
        validate_name(&new.name, "folder")?;
        let created_at = self.next_created_at();
        let mut tables = self.tables.write();
        tables.check_parent(new.parent_id)?;
        let folder = Folder {
            id: Uuid::new_v4(),
            name: new.name,
            parent_id: new.parent_id,
            description: new.description,
            is_public: false,
            created_at,
        };
        tables.folders.insert(folder.id, folder.clone());
        tracing::info!("created folder {} ({})", folder.name, folder.id);
        Ok(folder)
    }

    async fn create_model(&self, new: NewModel) -> CatalogResult<Model> {
        validate_name(&new.name, "model")?;
        if new.model_url.trim().is_empty() {
            return Err(CatalogError::Validation("model_url is required".into()));
        }
        let created_at = self.next_created_at();
        let mut tables = self.tables.write();
        tables.check_parent(new.folder_id)?;
        let model = Model {
            id: Uuid::new_v4(),
            name: new.name,
            model_url: new.model_url,
            thumbnail_url: new.thumbnail_url,
            folder_id: new.folder_id,
            is_public: false,
            view_settings: None,
            created_at,
        };
        tables.models.insert(model.id, model.clone());
        tracing::info!("created model {} ({})", model.name, model.id);
        Ok(model)
    }

    async fn update_folder(&self, id: FolderId, patch: FolderPatch) -> CatalogResult<Folder> {
        if patch.is_empty() {
            return Err(CatalogError::EmptyPatch);
        }
        if let Some(name) = &patch.name {
            validate_name(name, "folder")?;
        }
        let mut tables = self.tables.write();
        tables.folder(id)?;
        if let Some(Some(parent)) = patch.parent_id {
            // Moving under itself or a descendant would detach a subtree.
            if tables.ancestry(parent)?.iter().any(|f| f.id == id) {
                return Err(CatalogError::Validation(
                    "a folder cannot be moved into itself".into(),
                ));
            }
        }
        let folder = tables
            .folders
            .get_mut(&id)
            .ok_or_else(|| CatalogError::folder_not_found(id))?;
        patch.apply(folder);
        Ok(folder.clone())
    }

    async fn update_model(&self, id: ModelId, patch: ModelPatch) -> CatalogResult<Model> {
        if patch.is_empty() {
            return Err(CatalogError::EmptyPatch);
        }
        if let Some(name) = &patch.name {
            validate_name(name, "model")?;
        }
        let mut tables = self.tables.write();
        if let Some(folder) = patch.folder_id {
            tables.check_parent(folder)?;
        }
        let model = tables
            .models
            .get_mut(&id)
            .ok_or_else(|| CatalogError::model_not_found(id))?;
        patch.apply(model);
        Ok(model.clone())
    }

    async fn delete_folder(&self, id: FolderId) -> CatalogResult<()> {
        let mut tables = self.tables.write();
        tables.folder(id)?;
        let has_children = tables.folders.values().any(|f| f.parent_id == Some(id));
        let has_models = tables.models.values().any(|m| m.folder_id == Some(id));
        if has_children || has_models {
            return Err(CatalogError::FolderNotEmpty(id));
        }
        tables.folders.remove(&id);
        tracing::info!("deleted folder {id}");
        Ok(())
    }

    async fn delete_model(&self, id: ModelId) -> CatalogResult<Model> {
        let removed = self
            .tables
            .write()
            .models
            .remove(&id)
            .ok_or_else(|| CatalogError::model_not_found(id))?;
        tracing::info!("deleted model {id}");
        Ok(removed)
    }

    async fn breadcrumbs(&self, id: FolderId) -> CatalogResult<Vec<Folder>> {
        let mut chain = self.tables.read().ancestry(id)?;
        chain.reverse();
        Ok(chain)
    }

    async fn all_folders(&self) -> CatalogResult<Vec<FolderSummary>> {
        let mut all: Vec<FolderSummary> = self
            .tables
            .read()
            .folders
            .values()
            .map(|f| FolderSummary {
                id: f.id,
                name: f.name.clone(),
            })
            .collect();
        all.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn public_models(&self, offset: usize, limit: usize) -> CatalogResult<Vec<Model>> {
        let mut models: Vec<Model> = self
            .tables
            .read()
            .models
            .values()
            .filter(|m| m.is_public)
            .cloned()
            .collect();
        Sort::NEWEST_FIRST.sort_models(&mut models);
        Ok(models.into_iter().skip(offset).take(limit).collect())
    }
}
