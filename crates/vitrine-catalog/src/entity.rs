//! Catalog records and their create/patch payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use vitrine_core::ViewSettings;

pub type FolderId = Uuid;
pub type ModelId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    pub model_url: String,
    pub thumbnail_url: String,
    pub folder_id: Option<FolderId>,
    pub is_public: bool,
    /// Raw stored blob; decode with [`Model::view_settings`].
    pub view_settings: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Stored view, decoded leniently. `None` when nothing was saved.
    pub fn view_settings(&self) -> Option<ViewSettings> {
        self.view_settings
            .as_ref()
            .filter(|v| !v.is_null())
            .map(ViewSettings::from_value)
    }

    pub fn has_thumbnail(&self) -> bool {
        !vitrine_core::thumbnail::is_placeholder(Some(&self.thumbnail_url))
    }
}

/// `(id, name)` pair for folder pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub id: FolderId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFolder {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewModel {
    pub name: String,
    pub model_url: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Partial folder update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<FolderId>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl FolderPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.parent_id.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
    }

    pub(crate) fn apply(&self, folder: &mut Folder) {
        if let Some(name) = &self.name {
            folder.name.clone_from(name);
        }
        if let Some(parent) = self.parent_id {
            folder.parent_id = parent;
        }
        if let Some(description) = &self.description {
            folder.description.clone_from(description);
        }
        if let Some(is_public) = self.is_public {
            folder.is_public = is_public;
        }
    }
}

/// Partial model update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Option<FolderId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub view_settings: Option<Option<serde_json::Value>>,
}

impl ModelPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.thumbnail_url.is_none()
            && self.folder_id.is_none()
            && self.is_public.is_none()
            && self.view_settings.is_none()
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn move_to(folder: Option<FolderId>) -> Self {
        Self {
            folder_id: Some(folder),
            ..Default::default()
        }
    }

    pub fn publish(is_public: bool) -> Self {
        Self {
            is_public: Some(is_public),
            ..Default::default()
        }
    }

    pub fn save_view(settings: &ViewSettings) -> Self {
        Self {
            view_settings: Some(Some(settings.to_value())),
            ..Default::default()
        }
    }

    pub fn clear_view() -> Self {
        Self {
            view_settings: Some(None),
            ..Default::default()
        }
    }

    pub fn thumbnail(url: impl Into<String>) -> Self {
        Self {
            thumbnail_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub(crate) fn apply(&self, model: &mut Model) {
        if let Some(name) = &self.name {
            model.name.clone_from(name);
        }
        if let Some(url) = &self.thumbnail_url {
            model.thumbnail_url.clone_from(url);
        }
        if let Some(folder) = self.folder_id {
            model.folder_id = folder;
        }
        if let Some(is_public) = self.is_public {
            model.is_public = is_public;
        }
        if let Some(settings) = &self.view_settings {
            model.view_settings.clone_from(settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_null_vs_absent() {
        let moved: ModelPatch = serde_json::from_value(json!({ "folder_id": null })).unwrap();
        assert_eq!(moved.folder_id, Some(None));
        assert!(!moved.is_empty());

        let empty: ModelPatch = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());

        let cleared: ModelPatch = serde_json::from_value(json!({ "view_settings": null })).unwrap();
        assert_eq!(cleared, ModelPatch::clear_view());
    }

    #[test]
    fn test_folder_patch_is_empty() {
        assert!(FolderPatch::default().is_empty());
        let p: FolderPatch = serde_json::from_value(json!({ "parent_id": null })).unwrap();
        assert_eq!(p.parent_id, Some(None));
    }
}
