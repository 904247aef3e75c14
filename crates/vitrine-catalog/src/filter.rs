//! Client-side narrowing and ordering of the model grid.
//!
//! The search text matches a model's name, or the name or description of
//! any folder on its ancestor chain, case-insensitively.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{SortOrder, compare_names};
use crate::entity::{Folder, FolderId, Model};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    All,
    Public,
    Private,
}

impl Visibility {
    fn admits(self, is_public: bool) -> bool {
        match self {
            Self::All => true,
            Self::Public => is_public,
            Self::Private => !is_public,
        }
    }
}

/// Filter on whether a real thumbnail exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFilter {
    #[default]
    Any,
    Yes,
    No,
}

/// Creation-time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateWindow {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "365d")]
    Year,
}

impl DateWindow {
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let span = match self {
            Self::All => return None,
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
            Self::Year => Duration::days(365),
        };
        Some(now - span)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSortKey {
    #[default]
    Name,
    CreatedAt,
    Visibility,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryFilter {
    pub query: String,
    pub visibility: Visibility,
    pub thumbnail: ThumbnailFilter,
    /// Restrict to these folders; empty means every folder.
    pub folders: HashSet<FolderId>,
    pub window: DateWindow,
    pub sort_by: GridSortKey,
    pub sort_order: SortOrder,
}

impl GalleryFilter {
    /// Models passing every filter, in grid order.
    pub fn apply(
        &self,
        models: &[Model],
        folders: &HashMap<FolderId, Folder>,
        now: DateTime<Utc>,
    ) -> Vec<Model> {
        let query = self.query.trim().to_lowercase();
        let cutoff = self.window.cutoff(now);

        let mut out: Vec<Model> = models
            .iter()
            .filter(|m| self.visibility.admits(m.is_public))
            .filter(|m| {
                self.folders.is_empty()
                    || m.folder_id.is_some_and(|f| self.folders.contains(&f))
            })
            .filter(|m| match self.thumbnail {
                ThumbnailFilter::Any => true,
                ThumbnailFilter::Yes => m.has_thumbnail(),
                ThumbnailFilter::No => !m.has_thumbnail(),
            })
            .filter(|m| cutoff.is_none_or(|c| m.created_at >= c))
            .filter(|m| {
                query.is_empty()
                    || m.name.to_lowercase().contains(&query)
                    || folder_chain_matches(m.folder_id, folders, &query)
            })
            .cloned()
            .collect();

        let order = self.sort_order;
        out.sort_by(|a, b| {
            let ord = match self.sort_by {
                GridSortKey::Name => compare_names(&a.name, &b.name),
                GridSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                GridSortKey::Visibility => a.is_public.cmp(&b.is_public),
            };
            order.apply(ord)
        });
        out
    }
}

fn folder_chain_matches(
    start: Option<FolderId>,
    folders: &HashMap<FolderId, Folder>,
    query: &str,
) -> bool {
    let mut cursor = start;
    let mut hops = 0;
    while let Some(folder) = cursor.and_then(|id| folders.get(&id)) {
        let hit = folder.name.to_lowercase().contains(query)
            || folder
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(query));
        if hit {
            return true;
        }
        hops += 1;
        if hops > folders.len() {
            break;
        }
        cursor = folder.parent_id;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn folder(name: &str, parent: Option<FolderId>, description: Option<&str>) -> Folder {
        Folder {
            id: Uuid::new_v4(),
            name: name.into(),
            parent_id: parent,
            description: description.map(Into::into),
            is_public: false,
            created_at: Utc::now(),
        }
    }

    fn model(name: &str, folder: Option<FolderId>, is_public: bool, age_days: i64) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: name.into(),
            model_url: format!("memory://blobs/{name}.glb"),
            thumbnail_url: crate::upload::placeholder_thumbnail(name),
            folder_id: folder,
            is_public,
            view_settings: None,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn names(models: &[Model]) -> Vec<&str> {
        models.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_query_matches_folder_chain() {
        let furniture = folder("Furniture", None, Some("indoor props"));
        let chairs = folder("Chairs", Some(furniture.id), None);
        let map: HashMap<_, _> = [furniture.clone(), chairs.clone()]
            .into_iter()
            .map(|f| (f.id, f))
            .collect();
        let models = vec![
            model("Stool", Some(chairs.id), false, 0),
            model("Rock", None, false, 0),
        ];

        let by_ancestor = GalleryFilter {
            query: "furn".into(),
            ..Default::default()
        };
        assert_eq!(names(&by_ancestor.apply(&models, &map, Utc::now())), ["Stool"]);

        let by_description = GalleryFilter {
            query: "PROPS".into(),
            ..Default::default()
        };
        assert_eq!(names(&by_description.apply(&models, &map, Utc::now())), ["Stool"]);
    }

    #[test]
    fn test_visibility_and_window() {
        let models = vec![
            model("old public", None, true, 40),
            model("new public", None, true, 1),
            model("new private", None, false, 1),
        ];
        let filter = GalleryFilter {
            visibility: Visibility::Public,
            window: DateWindow::Month,
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(&models, &HashMap::new(), Utc::now())), ["new public"]);
    }

    #[test]
    fn test_thumbnail_filter() {
        let mut with_thumb = model("b", None, false, 0);
        with_thumb.thumbnail_url = "https://cdn.example/t.png".into();
        let models = vec![model("a", None, false, 0), with_thumb];
        let yes = GalleryFilter {
            thumbnail: ThumbnailFilter::Yes,
            ..Default::default()
        };
        assert_eq!(names(&yes.apply(&models, &HashMap::new(), Utc::now())), ["b"]);
    }

    #[test]
    fn test_sort_orders() {
        let models = vec![
            model("b", None, true, 2),
            model("A", None, false, 1),
            model("c", None, false, 3),
        ];
        let by_name_desc = GalleryFilter {
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(names(&by_name_desc.apply(&models, &HashMap::new(), Utc::now())), ["c", "b", "A"]);

        let newest_first = GalleryFilter {
            sort_by: GridSortKey::CreatedAt,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(names(&newest_first.apply(&models, &HashMap::new(), Utc::now())), ["A", "b", "c"]);
    }
}
