//! Read-side gallery workflows built on a [`Catalog`].

use futures_util::future::try_join;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Sort};
use crate::entity::{Folder, FolderId, Model, ModelId};
use crate::error::CatalogResult;
use crate::store::ObjectStore;

/// Page size of the public gallery.
pub const PUBLIC_PAGE_SIZE: usize = 20;

/// Contents of one folder (or the root) as shown in the grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryContents {
    pub folders: Vec<Folder>,
    pub models: Vec<Model>,
}

/// Sub-folders and models of `folder`, both ordered by name.
pub async fn gallery_contents<C: Catalog>(
    catalog: &C,
    folder: Option<FolderId>,
) -> CatalogResult<GalleryContents> {
    let (folders, models) = try_join(
        catalog.list_folders(folder, Sort::NAME_ASC),
        catalog.list_models(folder, Sort::NAME_ASC),
    )
    .await?;
    Ok(GalleryContents { folders, models })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPage {
    pub models: Vec<Model>,
    pub next_page: Option<u32>,
}

impl PublicPage {
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}

/// One page of the public gallery. Fetches one extra row to detect more pages.
pub async fn public_page<C: Catalog>(catalog: &C, page: u32) -> CatalogResult<PublicPage> {
    let offset = page as usize * PUBLIC_PAGE_SIZE;
    let mut models = catalog.public_models(offset, PUBLIC_PAGE_SIZE + 1).await?;
    let has_more = models.len() > PUBLIC_PAGE_SIZE;
    models.truncate(PUBLIC_PAGE_SIZE);
    Ok(PublicPage {
        models,
        next_page: has_more.then_some(page + 1),
    })
}

/// Delete a model's blobs and then its record.
///
/// The thumbnail blob is only deleted when it is not a placeholder. Blob
/// failures are logged and do not keep the record alive.
pub async fn delete_model_and_blobs<C: Catalog, S: ObjectStore>(
    catalog: &C,
    store: &S,
    id: ModelId,
) -> CatalogResult<Model> {
    let model = catalog.get_model(id).await?;
    let mut urls = vec![model.model_url.as_str()];
    if model.has_thumbnail() {
        urls.push(model.thumbnail_url.as_str());
    }
    for url in urls {
        if let Err(e) = store.delete(url).await {
            tracing::warn!("could not delete blob {url} of model {id}: {e}");
        }
    }
    catalog.delete_model(id).await
}
