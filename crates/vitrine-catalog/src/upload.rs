//! Model and thumbnail upload workflows.
//!
//! # Naming
//!
//! ```text
//! model blob key    = models/<upload-uuid>-<file name, whitespace runs replaced by "_">
//! display name      = file name without a trailing ".glb"
//! placeholder thumb = /placeholder.svg?width=400&height=400&query=<url-encoded name>
//! thumbnail key     = thumbnails/<model-id>-<millis>.<ext>
//! thumbnail url     = <stored url>?v=<millis>
//! ```

use futures_util::future::join_all;
use image::ImageFormat;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::entity::{FolderId, Model, ModelId, ModelPatch, NewModel};
use crate::error::{CatalogError, StoreError};
use crate::store::ObjectStore;

const GLB_EXTENSION: &str = ".glb";
const GLB_MAGIC: &[u8; 4] = b"glTF";

pub const GLB_CONTENT_TYPE: &str = "model/gltf-binary";

/// Only binary glTF files are accepted as models.
pub fn is_glb(file_name: &str) -> bool {
    file_name.ends_with(GLB_EXTENSION)
}

/// File name made safe for use in a blob key.
pub fn blob_key(file_name: &str) -> String {
    file_name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Blob key for an uploaded model file. `upload` is fresh per upload, so
/// two files with the same name never share a blob.
pub fn model_key(file_name: &str, upload: Uuid) -> String {
    format!("models/{upload}-{}", blob_key(file_name))
}

/// File name inside a model key, without the per-upload prefix.
pub fn stored_file_name(key_file: &str) -> &str {
    match key_file.split_at_checked(36) {
        Some((prefix, rest)) if Uuid::parse_str(prefix).is_ok() => {
            rest.strip_prefix('-').unwrap_or(rest)
        }
        _ => key_file,
    }
}

/// Model name shown in the gallery.
pub fn display_name(file_name: &str) -> &str {
    file_name.strip_suffix(GLB_EXTENSION).unwrap_or(file_name)
}

/// Placeholder thumbnail URL for a model that has not been captured yet.
pub fn placeholder_thumbnail(name: &str) -> String {
    format!(
        "{}?width=400&height=400&query={}",
        vitrine_core::thumbnail::PLACEHOLDER_PATH,
        urlencoding::encode(name)
    )
}

/// Extension for a thumbnail file: from its name, else its content type, else `png`.
pub fn thumbnail_extension(file_name: &str, content_type: Option<&str>) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let from_type = content_type
        .and_then(|t| t.split_once('/'))
        .map(|(_, sub)| sub.to_ascii_lowercase());
    let ext: String = from_name
        .or(from_type)
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if ext.is_empty() { "png".to_string() } else { ext }
}

pub fn thumbnail_key(model_id: ModelId, millis: i64, ext: &str) -> String {
    format!("thumbnails/{model_id}-{millis}.{ext}")
}

/// Content type from magic bytes: `glTF` binaries and the allowed image formats.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(GLB_MAGIC) {
        return Some(GLB_CONTENT_TYPE);
    }
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<Model>,
    /// Files that were not `.glb`.
    pub skipped: Vec<String>,
    pub failed: Vec<(String, CatalogError)>,
}

impl UploadReport {
    /// The single uploaded model, which the gallery opens right away.
    pub fn single_upload(&self) -> Option<&Model> {
        match self.uploaded.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

async fn upload_model<C: Catalog, S: ObjectStore>(
    catalog: &C,
    store: &S,
    file: UploadFile,
    folder: Option<FolderId>,
) -> Result<Model, CatalogError> {
    let stored = store
        .put(&model_key(&file.name, Uuid::new_v4()), file.bytes, GLB_CONTENT_TYPE)
        .await?;
    let name = display_name(&file.name);
    catalog
        .create_model(NewModel {
            name: name.to_string(),
            model_url: stored.url,
            thumbnail_url: placeholder_thumbnail(name),
            folder_id: folder,
        })
        .await
}

/// Upload `.glb` files concurrently into `folder`, skipping anything else.
pub async fn upload_models<C: Catalog, S: ObjectStore>(
    catalog: &C,
    store: &S,
    files: Vec<UploadFile>,
    folder: Option<FolderId>,
) -> UploadReport {
    let mut report = UploadReport::default();
    let mut pending = Vec::new();
    for file in files {
        if is_glb(&file.name) {
            pending.push(file);
        } else {
            tracing::warn!("skipping non-GLB file: {}", file.name);
            report.skipped.push(file.name);
        }
    }

    let names: Vec<String> = pending.iter().map(|f| f.name.clone()).collect();
    let results = join_all(
        pending
            .into_iter()
            .map(|file| upload_model(catalog, store, file, folder)),
    )
    .await;

    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(model) => {
                tracing::info!("uploaded {name}");
                report.uploaded.push(model);
            }
            Err(e) => {
                tracing::warn!("failed to upload {name}: {e}");
                report.failed.push((name, e));
            }
        }
    }
    report
}

/// Store a thumbnail image and point the model at it. The thumbnail it
/// replaces is deleted from the store.
pub async fn upload_thumbnail<C: Catalog, S: ObjectStore>(
    catalog: &C,
    store: &S,
    model_id: ModelId,
    file_name: &str,
    bytes: Vec<u8>,
    millis: i64,
) -> Result<Model, CatalogError> {
    let content_type = sniff_content_type(&bytes)
        .filter(|t| t.starts_with("image/"))
        .ok_or_else(|| StoreError::UnknownContentType(file_name.to_string()))?;
    let previous = catalog.get_model(model_id).await?;
    let ext = thumbnail_extension(file_name, Some(content_type));
    let stored = store
        .put(&thumbnail_key(model_id, millis, &ext), bytes, content_type)
        .await?;
    let updated = catalog
        .update_model(model_id, ModelPatch::thumbnail(format!("{}?v={millis}", stored.url)))
        .await?;
    if without_query(&previous.thumbnail_url) != stored.url {
        discard_thumbnail(store, &previous).await;
    }
    Ok(updated)
}

/// Revert a model to its placeholder thumbnail and delete the stored one.
pub async fn reset_thumbnail<C: Catalog, S: ObjectStore>(
    catalog: &C,
    store: &S,
    model: &Model,
) -> Result<Model, CatalogError> {
    let updated = catalog
        .update_model(model.id, ModelPatch::thumbnail(placeholder_thumbnail(&model.name)))
        .await?;
    discard_thumbnail(store, model).await;
    Ok(updated)
}

fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Delete `model`'s captured thumbnail, if it has one. Failures are logged.
async fn discard_thumbnail<S: ObjectStore>(store: &S, model: &Model) {
    if !model.has_thumbnail() {
        return;
    }
    let url = &model.thumbnail_url;
    if let Err(e) = store.delete(url).await {
        tracing::warn!("could not delete old thumbnail {url} of model {}: {e}", model.id);
    }
}
