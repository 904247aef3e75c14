//! Model library: catalog and blob storage on a background runtime.
//!
//! Bevy systems never await. They send `LibraryRequest`s over a channel;
//! a tokio runtime on its own thread runs each request against the
//! catalog and the filesystem store, and answers with `LibraryEvent`s
//! that `poll_library_events` picks up on the next frame.

use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;
use tokio::sync::mpsc;
use vitrine_catalog::bulk::{delete_items, move_items, set_public};
use vitrine_catalog::entity::FolderSummary;
use vitrine_catalog::gallery::{PublicPage, gallery_contents, public_page};
use vitrine_catalog::store::is_allowed_content_type;
use vitrine_catalog::upload::{
    UploadFile, display_name, is_glb, placeholder_thumbnail, reset_thumbnail, stored_file_name,
    upload_models, upload_thumbnail,
};
use vitrine_catalog::{
    BulkReport, Catalog, CatalogError, Folder, FolderId, FolderPatch, ItemRef, MemoryCatalog,
    Model, ModelId, ModelPatch, NewFolder, NewModel, ObjectStore, StoreError, StoredObject,
};
use vitrine_core::ViewSettings;

// ── Filesystem store ────────────────────────────────────────────────

/// Blob store writing into a directory under the Bevy asset root.
///
/// URLs are asset paths (`<prefix>/<key>`) so the viewer can load them
/// with the asset server directly.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    url_prefix: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.url_prefix, key.trim_start_matches('/'))
    }

    /// Filesystem path behind a URL from `put`, if it belongs to this store.
    fn path_for(&self, url: &str) -> Option<PathBuf> {
        let path = url.split_once('?').map_or(url, |(p, _)| p);
        let key = path.strip_prefix(&self.url_prefix)?.trim_start_matches('/');
        if key.is_empty() || key.split('/').any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(key))
    }
}

fn io_error(e: std::io::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        if !is_allowed_content_type(content_type) {
            return Err(StoreError::ContentTypeNotAllowed(content_type.to_string()));
        }
        let url = self.url_for(key);
        let path = self
            .path_for(&url)
            .ok_or_else(|| StoreError::Backend(format!("invalid key {key:?}")))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, bytes).await.map_err(io_error)?;
        tracing::debug!("wrote {}", path.display());
        Ok(StoredObject { url })
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        let path = self
            .path_for(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(url.to_string()))
            }
            Err(e) => Err(io_error(e)),
        }
    }
}

// ── Requests and events ─────────────────────────────────────────────

#[derive(Debug)]
pub enum LibraryRequest {
    Contents { folder: Option<FolderId> },
    PublicPage { page: u32 },
    AllFolders,
    CreateFolder(NewFolder),
    RenameFolder { id: FolderId, name: String },
    RenameModel { id: ModelId, name: String },
    OpenModel { id: ModelId },
    Delete { items: Vec<ItemRef> },
    Move { items: Vec<ItemRef>, target: Option<FolderId> },
    SetPublic { items: Vec<ItemRef>, is_public: bool },
    /// Pick `.glb` files with a dialog and upload them into `folder`.
    PickAndUpload { folder: Option<FolderId> },
    UploadThumbnail { id: ModelId, file_name: String, bytes: Vec<u8> },
    ResetThumbnail { id: ModelId },
    SaveView { id: ModelId, settings: ViewSettings },
    DeleteView { id: ModelId },
}

/// Which bulk action produced a [`LibraryEvent::Bulk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Move { target: Option<FolderId> },
    SetPublic,
}

#[derive(Debug)]
pub enum LibraryEvent {
    Contents {
        folder: Option<FolderId>,
        breadcrumbs: Vec<Folder>,
        folders: Vec<Folder>,
        models: Vec<Model>,
    },
    PublicPage(PublicPage),
    AllFolders(Vec<FolderSummary>),
    ModelOpened(Model),
    ModelUpdated(Model),
    ViewSaved { id: ModelId, settings: ViewSettings },
    ViewDeleted { id: ModelId },
    Bulk {
        action: BulkAction,
        report: BulkReport,
    },
    Uploaded {
        uploaded: usize,
        skipped: Vec<String>,
        failed: Vec<String>,
        /// Opened right away when exactly one file was uploaded.
        open: Option<Model>,
    },
    /// The catalog changed; listings should be refreshed.
    Changed,
    Failed { message: String },
}

/// Channel endpoints for talking to the library worker.
#[derive(Resource)]
pub struct LibraryBridge {
    requests: mpsc::UnboundedSender<LibraryRequest>,
    pub events: mpsc::UnboundedReceiver<LibraryEvent>,
}

impl LibraryBridge {
    pub fn request(&self, request: LibraryRequest) {
        if self.requests.send(request).is_err() {
            tracing::error!("library worker is gone; request dropped");
        }
    }
}

// ── Worker ──────────────────────────────────────────────────────────

struct Library {
    catalog: MemoryCatalog,
    store: FsObjectStore,
}

/// Spawn the library worker thread.
///
/// Existing `.glb` files under the store root are imported into the
/// catalog first, so the gallery is not empty after a restart.
pub fn spawn_library_worker(store: FsObjectStore) -> LibraryBridge {
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<LibraryRequest>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<LibraryEvent>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build tokio runtime for library worker: {e}");
                return;
            }
        };

        rt.block_on(async move {
            let library = Arc::new(Library {
                catalog: MemoryCatalog::new(),
                store,
            });
            match import_existing(&library).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Imported {n} model(s) from {}", library.store.root.display()),
                Err(e) => tracing::warn!("Library import failed: {e}"),
            }

            while let Some(request) = request_rx.recv().await {
                let library = Arc::clone(&library);
                let events = event_tx.clone();
                tokio::spawn(async move {
                    handle_request(&library, request, &events).await;
                });
            }
            tracing::info!("Library worker stopped");
        });
    });

    LibraryBridge {
        requests: request_tx,
        events: event_rx,
    }
}

/// Directories scanned at startup, relative to the store root.
const IMPORT_DIRS: [&str; 2] = ["", "models"];

async fn import_existing(library: &Library) -> std::io::Result<usize> {
    let mut imported = 0;
    for dir in IMPORT_DIRS {
        let mut entries = match tokio::fs::read_dir(library.store.root.join(dir)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !is_glb(&file_name) || !entry.file_type().await?.is_file() {
                continue;
            }
            let key = if dir.is_empty() {
                file_name.clone()
            } else {
                format!("{dir}/{file_name}")
            };
            let name = display_name(stored_file_name(&file_name));
            let created = library
                .catalog
                .create_model(NewModel {
                    name: name.to_string(),
                    model_url: library.store.url_for(&key),
                    thumbnail_url: placeholder_thumbnail(name),
                    folder_id: None,
                })
                .await;
            match created {
                Ok(_) => imported += 1,
                Err(e) => tracing::warn!("Skipping {key}: {e}"),
            }
        }
    }
    Ok(imported)
}

async fn pick_glb_files() -> Vec<UploadFile> {
    let picked = tokio::task::spawn_blocking(|| {
        rfd::FileDialog::new()
            .set_title("Upload models")
            .add_filter("glTF binary", &["glb"])
            .pick_files()
    })
    .await;
    let paths = match picked {
        Ok(Some(paths)) => paths,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!("File dialog task failed: {e}");
            return Vec::new();
        }
    };

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match tokio::fs::read(&path).await {
            Ok(bytes) => files.push(UploadFile { name, bytes }),
            Err(e) => tracing::warn!("Could not read {}: {e}", path.display()),
        }
    }
    files
}

fn send(events: &mpsc::UnboundedSender<LibraryEvent>, event: LibraryEvent) {
    let _ = events.send(event);
}

fn changed(events: &mpsc::UnboundedSender<LibraryEvent>) {
    send(events, LibraryEvent::Changed);
}

async fn handle_request(
    library: &Library,
    request: LibraryRequest,
    events: &mpsc::UnboundedSender<LibraryEvent>,
) {
    let catalog = &library.catalog;
    let store = &library.store;
    let result: Result<(), CatalogError> = async {
        match request {
            LibraryRequest::Contents { folder } => {
                let breadcrumbs = match folder {
                    Some(id) => catalog.breadcrumbs(id).await?,
                    None => Vec::new(),
                };
                let contents = gallery_contents(catalog, folder).await?;
                send(
                    events,
                    LibraryEvent::Contents {
                        folder,
                        breadcrumbs,
                        folders: contents.folders,
                        models: contents.models,
                    },
                );
            }
            LibraryRequest::PublicPage { page } => {
                send(events, LibraryEvent::PublicPage(public_page(catalog, page).await?));
            }
            LibraryRequest::AllFolders => {
                send(events, LibraryEvent::AllFolders(catalog.all_folders().await?));
            }
            LibraryRequest::CreateFolder(new) => {
                catalog.create_folder(new).await?;
                changed(events);
            }
            LibraryRequest::RenameFolder { id, name } => {
                let patch = FolderPatch {
                    name: Some(name),
                    ..Default::default()
                };
                catalog.update_folder(id, patch).await?;
                changed(events);
            }
            LibraryRequest::RenameModel { id, name } => {
                let model = catalog.update_model(id, ModelPatch::rename(name)).await?;
                send(events, LibraryEvent::ModelUpdated(model));
                changed(events);
            }
            LibraryRequest::OpenModel { id } => {
                send(events, LibraryEvent::ModelOpened(catalog.get_model(id).await?));
            }
            LibraryRequest::Delete { items } => {
                let report = delete_items(catalog, store, &items, || changed(events)).await;
                let action = BulkAction::Delete;
                send(events, LibraryEvent::Bulk { action, report });
            }
            LibraryRequest::Move { items, target } => {
                let report = move_items(catalog, &items, target, || changed(events)).await;
                let action = BulkAction::Move { target };
                send(events, LibraryEvent::Bulk { action, report });
            }
            LibraryRequest::SetPublic { items, is_public } => {
                let report = set_public(catalog, &items, is_public, || changed(events)).await;
                let action = BulkAction::SetPublic;
                send(events, LibraryEvent::Bulk { action, report });
            }
            LibraryRequest::PickAndUpload { folder } => {
                let files = pick_glb_files().await;
                if files.is_empty() {
                    return Ok(());
                }
                let report = upload_models(catalog, store, files, folder).await;
                let open = report.single_upload().cloned();
                send(
                    events,
                    LibraryEvent::Uploaded {
                        uploaded: report.uploaded.len(),
                        skipped: report.skipped,
                        failed: report
                            .failed
                            .into_iter()
                            .map(|(name, e)| format!("{name}: {e}"))
                            .collect(),
                        open,
                    },
                );
                changed(events);
            }
            LibraryRequest::UploadThumbnail { id, file_name, bytes } => {
                let millis = chrono::Utc::now().timestamp_millis();
                let model = upload_thumbnail(catalog, store, id, &file_name, bytes, millis).await?;
                send(events, LibraryEvent::ModelUpdated(model));
                changed(events);
            }
            LibraryRequest::ResetThumbnail { id } => {
                let model = catalog.get_model(id).await?;
                let model = reset_thumbnail(catalog, store, &model).await?;
                send(events, LibraryEvent::ModelUpdated(model));
                changed(events);
            }
            LibraryRequest::SaveView { id, settings } => {
                let model = catalog.update_model(id, ModelPatch::save_view(&settings)).await?;
                send(events, LibraryEvent::ViewSaved { id, settings });
                send(events, LibraryEvent::ModelUpdated(model));
            }
            LibraryRequest::DeleteView { id } => {
                let model = catalog.update_model(id, ModelPatch::clear_view()).await?;
                send(events, LibraryEvent::ViewDeleted { id });
                send(events, LibraryEvent::ModelUpdated(model));
            }
        }
        Ok(())
    }
    .await;

    if let Err(e) = result {
        tracing::warn!("Library request failed: {e}");
        send(
            events,
            LibraryEvent::Failed {
                message: e.to_string(),
            },
        );
    }
}
