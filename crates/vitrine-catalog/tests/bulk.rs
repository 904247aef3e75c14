use std::cell::Cell;

use uuid::Uuid;
use vitrine_catalog::bulk::{delete_items, move_items, set_public};
use vitrine_catalog::upload::{
    UploadFile, placeholder_thumbnail, reset_thumbnail, upload_models, upload_thumbnail,
};
use vitrine_catalog::{
    Catalog, CatalogError, ItemRef, MemoryCatalog, MemoryObjectStore, NewFolder, NewModel, Sort,
};

async fn seed_models(catalog: &MemoryCatalog, n: usize) -> Vec<ItemRef> {
    let mut items = Vec::new();
    for i in 0..n {
        let m = catalog
            .create_model(NewModel {
                name: format!("m{i}"),
                model_url: format!("memory://blobs/m{i}.glb"),
                thumbnail_url: placeholder_thumbnail(&format!("m{i}")),
                folder_id: None,
            })
            .await
            .unwrap();
        items.push(ItemRef::Model(m.id));
    }
    items
}

#[tokio::test]
async fn test_partial_failure_counts_and_single_refresh() {
    let catalog = MemoryCatalog::new();
    let mut items = seed_models(&catalog, 3).await;
    items.insert(1, ItemRef::Model(Uuid::new_v4()));
    items.push(ItemRef::Model(Uuid::new_v4()));

    let refreshes = Cell::new(0);
    let report = set_public(&catalog, &items, true, || refreshes.set(refreshes.get() + 1)).await;

    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 2);
    assert_eq!(report.summary(), "3 succeeded, 2 failed");
    assert_eq!(report.done, [items[0], items[2], items[3]]);
    assert_eq!(refreshes.get(), 1);
    assert!(
        report
            .errors
            .iter()
            .all(|(_, e)| matches!(e, CatalogError::NotFound { .. }))
    );
}

#[tokio::test]
async fn test_refresh_runs_even_when_everything_fails() {
    let catalog = MemoryCatalog::new();
    let items = [ItemRef::Folder(Uuid::new_v4())];
    let refreshes = Cell::new(0);
    let report = move_items(&catalog, &items, None, || refreshes.set(refreshes.get() + 1)).await;
    assert_eq!((report.succeeded, report.failed), (0, 1));
    assert_eq!(refreshes.get(), 1);
}

#[tokio::test]
async fn test_move_models_and_folders() {
    let catalog = MemoryCatalog::new();
    let target = catalog
        .create_folder(NewFolder {
            name: "target".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let loose = catalog
        .create_folder(NewFolder {
            name: "loose".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let mut items = seed_models(&catalog, 2).await;
    items.push(ItemRef::Folder(loose.id));

    let report = move_items(&catalog, &items, Some(target.id), || {}).await;
    assert!(report.is_clean());
    assert_eq!(catalog.list_models(Some(target.id), Sort::NAME_ASC).await.unwrap().len(), 2);
    assert_eq!(catalog.list_folders(Some(target.id), Sort::NAME_ASC).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_blobs_but_keeps_placeholder_alone() {
    let catalog = MemoryCatalog::new();
    let store = MemoryObjectStore::default();

    let report = upload_models(
        &catalog,
        &store,
        vec![
            UploadFile {
                name: "big chair.glb".into(),
                bytes: b"glTF\x02\0\0\0".to_vec(),
            },
            UploadFile {
                name: "readme.txt".into(),
                bytes: b"hello".to_vec(),
            },
        ],
        None,
    )
    .await;
    assert_eq!(report.skipped, ["readme.txt"]);
    let model = report.single_upload().unwrap().clone();
    assert_eq!(model.name, "big chair");
    assert!(model.model_url.ends_with("big_chair.glb"));
    assert!(!model.has_thumbnail());
    assert_eq!(store.len(), 1);

    let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    let with_thumb = upload_thumbnail(&catalog, &store, model.id, "shot.png", png, 42)
        .await
        .unwrap();
    assert!(with_thumb.has_thumbnail());
    assert!(with_thumb.thumbnail_url.ends_with("-42.png?v=42"));
    assert_eq!(store.len(), 2);

    let report = delete_items(&catalog, &store, &[ItemRef::Model(model.id)], || {}).await;
    assert!(report.is_clean());
    assert!(store.is_empty());
    assert_eq!(catalog.model_count(), 0);
}

#[tokio::test]
async fn test_delete_non_empty_folder_fails_item() {
    let catalog = MemoryCatalog::new();
    let store = MemoryObjectStore::default();
    let folder = catalog
        .create_folder(NewFolder {
            name: "full".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    catalog
        .create_model(NewModel {
            name: "inside".into(),
            model_url: "memory://blobs/inside.glb".into(),
            thumbnail_url: placeholder_thumbnail("inside"),
            folder_id: Some(folder.id),
        })
        .await
        .unwrap();

    let report = delete_items(&catalog, &store, &[ItemRef::Folder(folder.id)], || {}).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors[0].1, CatalogError::FolderNotEmpty(folder.id));
}

#[tokio::test]
async fn test_thumbnail_rejects_non_images() {
    let catalog = MemoryCatalog::new();
    let store = MemoryObjectStore::default();
    let items = seed_models(&catalog, 1).await;
    let ItemRef::Model(id) = items[0] else {
        unreachable!()
    };
    let err = upload_thumbnail(&catalog, &store, id, "evil.png", b"<svg/>".to_vec(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Store(_)));
    assert!(store.is_empty());
}

fn glb(name: &str, body: &[u8]) -> UploadFile {
    UploadFile {
        name: name.into(),
        bytes: [b"glTF".as_slice(), body].concat(),
    }
}

#[tokio::test]
async fn test_same_file_name_uploads_keep_separate_blobs() {
    let catalog = MemoryCatalog::new();
    let store = MemoryObjectStore::default();

    let first = upload_models(&catalog, &store, vec![glb("chair.glb", b"-A")], None).await;
    let second = upload_models(&catalog, &store, vec![glb("chair.glb", b"-B")], None).await;
    let a = first.single_upload().unwrap().clone();
    let b = second.single_upload().unwrap().clone();
    assert_ne!(a.model_url, b.model_url);
    assert_eq!(store.get(&a.model_url).unwrap().1, b"glTF-A");

    let report = delete_items(&catalog, &store, &[ItemRef::Model(a.id)], || {}).await;
    assert!(report.is_clean());
    assert!(store.get(&a.model_url).is_none());
    assert_eq!(store.get(&b.model_url).unwrap().1, b"glTF-B");
}

#[tokio::test]
async fn test_thumbnail_replace_and_reset_delete_old_blobs() {
    let catalog = MemoryCatalog::new();
    let store = MemoryObjectStore::default();
    let items = seed_models(&catalog, 1).await;
    let ItemRef::Model(id) = items[0] else {
        unreachable!()
    };
    let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();

    let first = upload_thumbnail(&catalog, &store, id, "a.png", png.clone(), 1)
        .await
        .unwrap();
    let second = upload_thumbnail(&catalog, &store, id, "b.png", png, 2)
        .await
        .unwrap();
    assert!(store.get(&first.thumbnail_url).is_none());
    assert!(store.get(&second.thumbnail_url).is_some());
    assert_eq!(store.len(), 1);

    let reset = reset_thumbnail(&catalog, &store, &second).await.unwrap();
    assert!(!reset.has_thumbnail());
    assert_eq!(reset.thumbnail_url, placeholder_thumbnail("m0"));
    assert!(store.is_empty());
}
