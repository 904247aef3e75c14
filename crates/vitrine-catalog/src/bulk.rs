//! Concurrent per-item actions over a gallery selection.
//!
//! Every item is issued at once; the caller waits for all of them to
//! settle, then refreshes exactly once, whatever the outcome.

use std::fmt;
use std::future::Future;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::entity::{FolderId, FolderPatch, ModelId, ModelPatch};
use crate::error::CatalogError;
use crate::gallery::delete_model_and_blobs;
use crate::store::ObjectStore;

/// A selected gallery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Folder(FolderId),
    Model(ModelId),
}

impl ItemRef {
    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(id) => write!(f, "folder {id}"),
            Self::Model(id) => write!(f, "model {id}"),
        }
    }
}

/// Outcome counts of a bulk action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub succeeded: usize,
    /// Items the action succeeded on, in request order.
    pub done: Vec<ItemRef>,
    pub failed: usize,
    pub errors: Vec<(ItemRef, CatalogError)>,
}

impl BulkReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// User-facing summary, e.g. `"3 succeeded, 2 failed"`.
    pub fn summary(&self) -> String {
        if self.failed > 0 {
            format!("{} succeeded, {} failed", self.succeeded, self.failed)
        } else {
            format!("{} succeeded", self.succeeded)
        }
    }
}

/// Run `action` on every item concurrently, then call `refresh` once.
pub async fn run_bulk<F, Fut>(items: &[ItemRef], action: F, refresh: impl FnOnce()) -> BulkReport
where
    F: Fn(ItemRef) -> Fut,
    Fut: Future<Output = Result<(), CatalogError>>,
{
    let results = join_all(items.iter().map(|&item| action(item))).await;

    let mut report = BulkReport::default();
    for (&item, result) in items.iter().zip(results) {
        match result {
            Ok(()) => {
                report.succeeded += 1;
                report.done.push(item);
            }
            Err(e) => {
                tracing::warn!("bulk action failed for {item}: {e}");
                report.failed += 1;
                report.errors.push((item, e));
            }
        }
    }
    tracing::info!("bulk action over {} item(s): {}", items.len(), report.summary());
    refresh();
    report
}

pub async fn delete_items<C: Catalog, S: ObjectStore>(
    catalog: &C,
    store: &S,
    items: &[ItemRef],
    refresh: impl FnOnce(),
) -> BulkReport {
    run_bulk(
        items,
        |item| async move {
            match item {
                ItemRef::Folder(id) => catalog.delete_folder(id).await,
                ItemRef::Model(id) => delete_model_and_blobs(catalog, store, id).await.map(|_| ()),
            }
        },
        refresh,
    )
    .await
}

pub async fn move_items<C: Catalog>(
    catalog: &C,
    items: &[ItemRef],
    target: Option<FolderId>,
    refresh: impl FnOnce(),
) -> BulkReport {
    run_bulk(
        items,
        |item| async move {
            match item {
                ItemRef::Folder(id) => {
                    let patch = FolderPatch {
                        parent_id: Some(target),
                        ..Default::default()
                    };
                    catalog.update_folder(id, patch).await.map(|_| ())
                }
                ItemRef::Model(id) => catalog
                    .update_model(id, ModelPatch::move_to(target))
                    .await
                    .map(|_| ()),
            }
        },
        refresh,
    )
    .await
}

pub async fn set_public<C: Catalog>(
    catalog: &C,
    items: &[ItemRef],
    is_public: bool,
    refresh: impl FnOnce(),
) -> BulkReport {
    run_bulk(
        items,
        |item| async move {
            match item {
                ItemRef::Folder(id) => {
                    let patch = FolderPatch {
                        is_public: Some(is_public),
                        ..Default::default()
                    };
                    catalog.update_folder(id, patch).await.map(|_| ())
                }
                ItemRef::Model(id) => catalog
                    .update_model(id, ModelPatch::publish(is_public))
                    .await
                    .map(|_| ()),
            }
        },
        refresh,
    )
    .await
}
