//! WebSocket IPC bridge between Bevy and the web UI.
//!
//! A tokio current-thread runtime on its own thread owns the socket. Bevy
//! systems exchange JSON strings with it over unbounded channels: inbound
//! messages become viewer commands, grid input or library requests, and
//! outbound messages are queued in `OutboundUiMessages` and flushed once
//! per frame.

use base64::Engine;
use bevy::prelude::*;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use vitrine_bevy::events::{
    CaptureThumbnail, GridInput, ViewChanged, ViewerCommand, ViewerNotice, VisibleCellsChanged,
};
use vitrine_bevy::resources::ViewerState;
use vitrine_core::lighting::presets::PRESETS;
use vitrine_core::selection::ClickModifiers;

use crate::gallery::{self, GalleryState};
use crate::ipc::{UiToViewer, ViewSnapshot, ViewerToUi};
use crate::library::{LibraryBridge, LibraryRequest};

/// Resource holding outbound messages to send to the UI.
///
/// Systems queue messages via `send()`, and the `flush_outbound_messages`
/// system drains them each frame and forwards over WebSocket.
#[derive(Resource, Default)]
pub struct OutboundUiMessages {
    messages: Vec<ViewerToUi>,
}

impl OutboundUiMessages {
    /// Queue a message to send to the UI.
    pub fn send(&mut self, msg: ViewerToUi) {
        self.messages.push(msg);
    }

    /// Drain all queued messages, returning them.
    pub fn drain(&mut self) -> Vec<ViewerToUi> {
        std::mem::take(&mut self.messages)
    }
}

/// Resource holding the channel endpoints for WebSocket IPC.
#[derive(Resource)]
pub struct WsBridge {
    /// Send messages from Bevy to the WebSocket server (-> UI).
    pub outbound_tx: mpsc::UnboundedSender<String>,
    /// Receive messages from the WebSocket server (<- UI).
    pub inbound_rx: mpsc::UnboundedReceiver<String>,
}

/// Spawn the WebSocket server on a dedicated thread.
///
/// The server listens on `ws://127.0.0.1:{port}` and serves one client
/// at a time. When it disconnects, the next connection is accepted.
pub fn spawn_ws_server(port: u16) -> WsBridge {
    let (bevy_to_ws_tx, mut bevy_to_ws_rx) = mpsc::unbounded_channel::<String>();
    let (ws_to_bevy_tx, ws_to_bevy_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build tokio runtime for WS bridge: {e}");
                return;
            }
        };

        rt.block_on(async move {
            let addr = format!("127.0.0.1:{port}");
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!("Failed to bind WebSocket server on {addr}: {e}");
                    return;
                }
            };
            tracing::info!("WebSocket IPC server listening on ws://{addr}");

            loop {
                let Ok((stream, peer)) = listener.accept().await else {
                    continue;
                };
                tracing::info!("WebSocket client connected: {peer}");

                let ws_stream = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(e) => {
                        tracing::error!("WebSocket handshake failed: {e}");
                        continue;
                    }
                };

                let (mut ws_sink, mut ws_source) = ws_stream.split();
                let tx = ws_to_bevy_tx.clone();

                let recv_handle = tokio::spawn(async move {
                    while let Some(Ok(msg)) = ws_source.next().await {
                        if let tokio_tungstenite::tungstenite::Message::Text(text) = msg
                            && tx.send(text.to_string()).is_err()
                        {
                            break;
                        }
                    }
                });

                // bevy_to_ws_rx stays on this task so it survives reconnects.
                tokio::pin!(recv_handle);
                loop {
                    tokio::select! {
                        _ = &mut recv_handle => break,
                        msg = bevy_to_ws_rx.recv() => {
                            let Some(text) = msg else { break };
                            let ws_msg = tokio_tungstenite::tungstenite::Message::Text(text.into());
                            if ws_sink.send(ws_msg).await.is_err() {
                                break;
                            }
                        }
                    }
                }

                tracing::info!("WebSocket client disconnected");
            }
        });
    });

    WsBridge {
        outbound_tx: bevy_to_ws_tx,
        inbound_rx: ws_to_bevy_rx,
    }
}

/// Bevy system: sends queued outbound messages over the WebSocket bridge.
pub fn flush_outbound_messages(mut outbound: ResMut<OutboundUiMessages>, bridge: Res<WsBridge>) {
    for msg in outbound.drain() {
        match serde_json::to_string(&msg) {
            Ok(json) => {
                let _ = bridge.outbound_tx.send(json);
            }
            Err(e) => tracing::error!("Failed to serialize ViewerToUi: {e}"),
        }
    }
}

/// Bevy system: receives inbound messages from the WebSocket bridge and
/// dispatches them.
#[allow(clippy::too_many_arguments)]
pub fn poll_inbound_messages(
    mut bridge: ResMut<WsBridge>,
    mut viewer: MessageWriter<ViewerCommand>,
    mut grid: MessageWriter<GridInput>,
    mut capture: MessageWriter<CaptureThumbnail>,
    mut gallery: ResMut<GalleryState>,
    library: Res<LibraryBridge>,
    state: Res<ViewerState>,
    mut outbound: ResMut<OutboundUiMessages>,
) {
    while let Ok(json) = bridge.inbound_rx.try_recv() {
        match serde_json::from_str::<UiToViewer>(&json) {
            Ok(msg) => dispatch_ui_message(
                msg,
                &mut viewer,
                &mut grid,
                &mut capture,
                &mut gallery,
                &library,
                &state,
                &mut outbound,
            ),
            Err(e) => tracing::warn!("Failed to parse UI message: {e}"),
        }
    }
}

/// Convert a `UiToViewer` message into the appropriate ECS action.
///
/// Viewer operations become `ViewerCommand`s, grid gestures become
/// `GridInput`, and anything touching the catalog goes to the library
/// worker.
#[allow(clippy::too_many_arguments)]
fn dispatch_ui_message(
    msg: UiToViewer,
    viewer: &mut MessageWriter<ViewerCommand>,
    grid: &mut MessageWriter<GridInput>,
    capture: &mut MessageWriter<CaptureThumbnail>,
    gallery: &mut GalleryState,
    library: &LibraryBridge,
    state: &ViewerState,
    outbound: &mut OutboundUiMessages,
) {
    match msg {
        UiToViewer::RequestState => {
            outbound.send(ViewerToUi::Initialize {
                view: ViewSnapshot::of(&state.session),
                presets: PRESETS.iter().map(|p| p.name.to_string()).collect(),
            });
            outbound.send(gallery.contents_message());
            outbound.send(gallery.selection_message());
            library.request(LibraryRequest::Contents {
                folder: gallery.folder,
            });
        }

        // ── Gallery ─────────────────────────────────────────────────
        UiToViewer::OpenFolder { folder } => {
            gallery.folder = folder;
            gallery.selection.clear();
            library.request(LibraryRequest::Contents { folder });
        }
        UiToViewer::SetFilter { filter } => {
            gallery.set_filter(filter);
            outbound.send(gallery.contents_message());
            outbound.send(gallery.selection_message());
        }
        UiToViewer::ClickItem { id, shift, toggle } => {
            gallery.click(&id, ClickModifiers { shift, toggle });
            outbound.send(gallery.selection_message());
        }
        UiToViewer::ClearSelection => {
            gallery.selection.clear();
            outbound.send(gallery.selection_message());
        }
        UiToViewer::RequestPublicPage { page } => {
            library.request(LibraryRequest::PublicPage { page });
        }
        UiToViewer::ListAllFolders => library.request(LibraryRequest::AllFolders),
        UiToViewer::CreateFolder { mut folder } => {
            folder.parent_id = folder.parent_id.or(gallery.folder);
            library.request(LibraryRequest::CreateFolder(folder));
        }
        UiToViewer::RenameFolder { id, name } => {
            library.request(LibraryRequest::RenameFolder { id, name });
        }
        UiToViewer::RenameModel { id, name } => {
            library.request(LibraryRequest::RenameModel { id, name });
        }
        UiToViewer::DeleteSelected => {
            with_selection(gallery, outbound, |items| {
                library.request(LibraryRequest::Delete { items })
            });
        }
        UiToViewer::MoveSelected { target } => {
            with_selection(gallery, outbound, |items| {
                library.request(LibraryRequest::Move { items, target })
            });
        }
        UiToViewer::SetSelectedPublic { is_public } => {
            with_selection(gallery, outbound, |items| {
                library.request(LibraryRequest::SetPublic { items, is_public })
            });
        }
        UiToViewer::UploadModels => library.request(LibraryRequest::PickAndUpload {
            folder: gallery.folder,
        }),
        UiToViewer::UploadThumbnail {
            id,
            file_name,
            data,
        } => match base64::engine::general_purpose::STANDARD.decode(data.as_bytes()) {
            Ok(bytes) => library.request(LibraryRequest::UploadThumbnail {
                id,
                file_name,
                bytes,
            }),
            Err(e) => {
                tracing::warn!("Thumbnail payload for {id} is not base64: {e}");
                outbound.send(ViewerToUi::Error {
                    message: format!("Invalid thumbnail data: {e}"),
                });
            }
        },
        UiToViewer::ResetThumbnail { id } => library.request(LibraryRequest::ResetThumbnail { id }),

        // ── Viewer ──────────────────────────────────────────────────
        UiToViewer::OpenModel { id } => library.request(LibraryRequest::OpenModel { id }),
        UiToViewer::CloseModel => {
            gallery.open_model = None;
            viewer.write(ViewerCommand::CloseModel);
        }
        UiToViewer::NextModel | UiToViewer::PrevModel => {
            let forward = matches!(msg, UiToViewer::NextModel);
            if let Some(model) = gallery.neighbor(forward) {
                gallery::open_model(gallery, viewer, model);
            }
        }
        UiToViewer::SaveView => {
            if !gallery::save_open_view(gallery, &state.session, library) {
                outbound.send(ViewerToUi::Notice {
                    message: "Open a model to save its view".to_string(),
                });
            }
        }
        UiToViewer::DeleteView => {
            if let Some(model) = &gallery.open_model {
                library.request(LibraryRequest::DeleteView { id: model.id });
            }
        }
        UiToViewer::ResetView => {
            viewer.write(ViewerCommand::ResetView);
        }
        UiToViewer::AddLight => {
            viewer.write(ViewerCommand::AddLight);
        }
        UiToViewer::RemoveLight { id } => {
            viewer.write(ViewerCommand::RemoveLight(id));
        }
        UiToViewer::CloneLight { id } => {
            viewer.write(ViewerCommand::CloneLight(id));
        }
        UiToViewer::ToggleLight { id } => {
            viewer.write(ViewerCommand::ToggleLight(id));
        }
        UiToViewer::SelectLight { id } => {
            viewer.write(ViewerCommand::SelectLight(id));
        }
        UiToViewer::UpdateLight { id, patch } => {
            viewer.write(ViewerCommand::UpdateLight { id, patch });
        }
        UiToViewer::FocusLight => {
            viewer.write(ViewerCommand::FocusSelected);
        }
        UiToViewer::RandomizeLights => {
            viewer.write(ViewerCommand::Randomize);
        }
        UiToViewer::ApplyPreset { name } => {
            viewer.write(ViewerCommand::ApplyPreset(name));
        }
        UiToViewer::CyclePreset => {
            viewer.write(ViewerCommand::CyclePreset);
        }
        UiToViewer::SetEnvironment { environment } => {
            viewer.write(ViewerCommand::SetEnvironment(environment));
        }
        UiToViewer::SetMaterialMode { mode } => {
            viewer.write(ViewerCommand::SetMaterialMode(mode));
        }
        UiToViewer::StudioWhite => {
            viewer.write(ViewerCommand::StudioWhite);
        }
        UiToViewer::ToggleOrthographic => {
            viewer.write(ViewerCommand::ToggleOrthographic);
        }
        UiToViewer::Reframe => {
            viewer.write(ViewerCommand::Reframe);
        }
        UiToViewer::CaptureThumbnail => match &gallery.open_model {
            Some(model) => {
                capture.write(CaptureThumbnail {
                    model_id: model.id.to_string(),
                });
            }
            None => tracing::warn!("CaptureThumbnail: no model open"),
        },
        UiToViewer::PanelDrag { active } => {
            viewer.write(ViewerCommand::PanelDrag(active));
        }

        // ── Grid ────────────────────────────────────────────────────
        UiToViewer::GridDragStart => {
            grid.write(GridInput::DragStart);
        }
        UiToViewer::GridDrag { dx, dy } => {
            grid.write(GridInput::Drag(Vec2::new(dx, dy)));
        }
        UiToViewer::GridDragEnd => {
            grid.write(GridInput::DragEnd);
        }
        UiToViewer::GridWheel { dx, dy } => {
            grid.write(GridInput::Wheel(Vec2::new(dx, dy)));
        }
        UiToViewer::GridResize { width, height } => {
            grid.write(GridInput::Resize(Vec2::new(width, height)));
        }
    }
}

fn with_selection(
    gallery: &GalleryState,
    outbound: &mut OutboundUiMessages,
    action: impl FnOnce(Vec<vitrine_catalog::ItemRef>),
) {
    let items = gallery.selected_items();
    if items.is_empty() {
        outbound.send(ViewerToUi::Notice {
            message: "Nothing selected".to_string(),
        });
        return;
    }
    action(items);
}

// ── Outbound sync ───────────────────────────────────────────────────

/// Bevy system: push the viewer state after any change.
pub fn push_view_updates(
    mut changed: MessageReader<ViewChanged>,
    state: Res<ViewerState>,
    mut outbound: ResMut<OutboundUiMessages>,
) {
    if changed.read().count() == 0 {
        return;
    }
    outbound.send(ViewerToUi::ViewUpdated {
        view: ViewSnapshot::of(&state.session),
    });
}

/// Bevy system: forward viewer notices and visible grid cells.
pub fn forward_viewer_messages(
    mut notices: MessageReader<ViewerNotice>,
    mut cells: MessageReader<VisibleCellsChanged>,
    mut outbound: ResMut<OutboundUiMessages>,
) {
    for notice in notices.read() {
        outbound.send(ViewerToUi::Notice {
            message: notice.message.clone(),
        });
    }
    if let Some(latest) = cells.read().last() {
        outbound.send(ViewerToUi::VisibleCells {
            pan: latest.pan.to_array(),
            cells: latest.cells.clone(),
        });
    }
}
