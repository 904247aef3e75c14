//! Gallery state on the Bevy side: the open folder, filter, selection and
//! open model, kept in sync with library worker events.

use std::collections::HashMap;

use bevy::prelude::*;
use vitrine_bevy::events::ViewerCommand;
use vitrine_catalog::filter::GalleryFilter;
use vitrine_catalog::{Folder, FolderId, ItemRef, Model};
use vitrine_core::ViewerSession;
use vitrine_core::selection::{self, ClickModifiers, ItemSelection};

use crate::ipc::ViewerToUi;
use crate::library::{BulkAction, LibraryBridge, LibraryEvent, LibraryRequest};
use crate::ws_bridge::OutboundUiMessages;

#[derive(Resource, Default)]
pub struct GalleryState {
    pub folder: Option<FolderId>,
    pub breadcrumbs: Vec<Folder>,
    pub folders: Vec<Folder>,
    /// Unfiltered models of the open folder.
    models: Vec<Model>,
    pub filter: GalleryFilter,
    pub selection: ItemSelection,
    pub open_model: Option<Model>,
}

impl GalleryState {
    /// Models of the open folder that pass the filter, in grid order.
    pub fn visible_models(&self) -> Vec<Model> {
        let known: HashMap<FolderId, Folder> = self
            .breadcrumbs
            .iter()
            .chain(&self.folders)
            .map(|f| (f.id, f.clone()))
            .collect();
        self.filter.apply(&self.models, &known, chrono::Utc::now())
    }

    /// Grid item ids in display order: folders first, then models.
    pub fn item_ids(&self) -> Vec<String> {
        self.folders
            .iter()
            .map(|f| f.id.to_string())
            .chain(self.visible_models().iter().map(|m| m.id.to_string()))
            .collect()
    }

    /// Change the filter. Selected models it hides are deselected.
    pub fn set_filter(&mut self, filter: GalleryFilter) {
        self.filter = filter;
        let items = self.item_ids();
        self.selection.retain_listed(&items);
    }

    pub fn click(&mut self, id: &str, mods: ClickModifiers) {
        let items = self.item_ids();
        self.selection.click(&items, id, mods);
    }

    /// Selected ids resolved against the filtered listing.
    pub fn selected_items(&self) -> Vec<ItemRef> {
        let folders = self
            .folders
            .iter()
            .filter(|f| self.selection.contains(&f.id.to_string()))
            .map(|f| ItemRef::Folder(f.id));
        let models = self
            .visible_models()
            .into_iter()
            .filter(|m| self.selection.contains(&m.id.to_string()))
            .map(|m| ItemRef::Model(m.id));
        folders.chain(models).collect()
    }

    /// The model after (or before) the open one in grid order, wrapping.
    pub fn neighbor(&self, forward: bool) -> Option<Model> {
        let open = self.open_model.as_ref()?;
        let models = self.visible_models();
        // Not in the listing (filtered out or another folder): stay put.
        let current = models.iter().position(|m| m.id == open.id)?;
        let next = if forward {
            selection::next_index(Some(current), models.len())
        } else {
            selection::prev_index(Some(current), models.len())
        }?;
        models.into_iter().nth(next)
    }

    fn set_listing(
        &mut self,
        folder: Option<FolderId>,
        breadcrumbs: Vec<Folder>,
        folders: Vec<Folder>,
        models: Vec<Model>,
    ) {
        self.folder = folder;
        self.breadcrumbs = breadcrumbs;
        self.folders = folders;
        self.models = models;
        let items = self.item_ids();
        self.selection.retain_listed(&items);
    }

    /// Forget the open model if a bulk action deleted it or moved it out of
    /// the open folder. Returns `true` when the viewer must close.
    fn settle_bulk(&mut self, action: BulkAction, done: &[ItemRef]) -> bool {
        self.selection.clear();
        let Some(open) = &self.open_model else {
            return false;
        };
        if !done.contains(&ItemRef::Model(open.id)) {
            return false;
        }
        let gone = match action {
            BulkAction::Delete => true,
            BulkAction::Move { target } => target != self.folder,
            BulkAction::SetPublic => false,
        };
        if gone {
            self.open_model = None;
        }
        gone
    }

    fn replace_model(&mut self, model: &Model) {
        if let Some(slot) = self.models.iter_mut().find(|m| m.id == model.id) {
            *slot = model.clone();
        }
        if let Some(open) = self.open_model.as_mut().filter(|m| m.id == model.id) {
            *open = model.clone();
        }
    }

    pub fn contents_message(&self) -> ViewerToUi {
        ViewerToUi::GalleryContents {
            folder: self.folder,
            breadcrumbs: self.breadcrumbs.clone(),
            folders: self.folders.clone(),
            models: self.visible_models(),
        }
    }

    pub fn selection_message(&self) -> ViewerToUi {
        ViewerToUi::Selection {
            ids: self.selection.ids().map(str::to_string).collect(),
        }
    }
}

/// Show `model` in the viewer.
pub fn open_model(gallery: &mut GalleryState, viewer: &mut MessageWriter<ViewerCommand>, model: Model) {
    viewer.write(ViewerCommand::LoadModel {
        model_id: model.id.to_string(),
        model_url: model.model_url.clone(),
        thumbnail_url: model.thumbnail_url.clone(),
        view_settings: model.view_settings(),
    });
    gallery.open_model = Some(model);
}

/// Persist the open model's current view. Returns `false` when no model is open.
pub fn save_open_view(
    gallery: &GalleryState,
    session: &ViewerSession,
    library: &LibraryBridge,
) -> bool {
    let Some(model) = &gallery.open_model else {
        return false;
    };
    library.request(LibraryRequest::SaveView {
        id: model.id,
        settings: session.snapshot(),
    });
    true
}

/// Bevy system: apply library worker results to the gallery and viewer.
pub fn poll_library_events(
    mut library: ResMut<LibraryBridge>,
    mut gallery: ResMut<GalleryState>,
    mut outbound: ResMut<OutboundUiMessages>,
    mut viewer: MessageWriter<ViewerCommand>,
) {
    while let Ok(event) = library.events.try_recv() {
        match event {
            LibraryEvent::Contents {
                folder,
                breadcrumbs,
                folders,
                models,
            } => {
                if folder != gallery.folder {
                    tracing::debug!("Dropping stale listing for {folder:?}");
                    continue;
                }
                gallery.set_listing(folder, breadcrumbs, folders, models);
                outbound.send(gallery.contents_message());
                outbound.send(gallery.selection_message());
            }
            LibraryEvent::PublicPage(page) => outbound.send(ViewerToUi::PublicPage { page }),
            LibraryEvent::AllFolders(folders) => outbound.send(ViewerToUi::FolderList { folders }),
            LibraryEvent::ModelOpened(model) => open_model(&mut gallery, &mut viewer, model),
            LibraryEvent::ModelUpdated(model) => {
                gallery.replace_model(&model);
                outbound.send(ViewerToUi::ModelUpdated { model });
            }
            LibraryEvent::ViewSaved { id, settings } => {
                if gallery.open_model.as_ref().is_some_and(|m| m.id == id) {
                    viewer.write(ViewerCommand::ViewSaved(settings));
                }
                outbound.send(ViewerToUi::Notice {
                    message: "View settings saved".to_string(),
                });
            }
            LibraryEvent::ViewDeleted { id } => {
                if gallery.open_model.as_ref().is_some_and(|m| m.id == id) {
                    viewer.write(ViewerCommand::DeleteView);
                }
                outbound.send(ViewerToUi::Notice {
                    message: "View settings deleted".to_string(),
                });
            }
            LibraryEvent::Bulk { action, report } => {
                if gallery.settle_bulk(action, &report.done) {
                    viewer.write(ViewerCommand::CloseModel);
                }
                outbound.send(gallery.selection_message());
                outbound.send(ViewerToUi::BulkResult {
                    summary: report.summary(),
                    succeeded: report.succeeded,
                    failed: report.failed,
                });
            }
            LibraryEvent::Uploaded {
                uploaded,
                skipped,
                failed,
                open,
            } => {
                outbound.send(ViewerToUi::UploadResult {
                    uploaded,
                    skipped,
                    failed,
                });
                if let Some(model) = open {
                    open_model(&mut gallery, &mut viewer, model);
                }
            }
            LibraryEvent::Changed => library.request(LibraryRequest::Contents {
                folder: gallery.folder,
            }),
            LibraryEvent::Failed { message } => outbound.send(ViewerToUi::Error { message }),
        }
    }
}
