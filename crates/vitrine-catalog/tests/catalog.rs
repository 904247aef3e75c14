use vitrine_catalog::gallery::{PUBLIC_PAGE_SIZE, gallery_contents, public_page};
use vitrine_catalog::upload::placeholder_thumbnail;
use vitrine_catalog::{
    Catalog, CatalogError, FolderPatch, MemoryCatalog, ModelPatch, NewFolder, NewModel, Sort,
    SortKey, SortOrder,
};
use vitrine_core::{LightRig, ViewSettings};

fn new_folder(name: &str, parent: Option<uuid::Uuid>) -> NewFolder {
    NewFolder {
        name: name.into(),
        parent_id: parent,
        description: None,
    }
}

fn new_model(name: &str, folder: Option<uuid::Uuid>) -> NewModel {
    NewModel {
        name: name.into(),
        model_url: format!("memory://blobs/{name}.glb"),
        thumbnail_url: placeholder_thumbnail(name),
        folder_id: folder,
    }
}

#[tokio::test]
async fn test_listing_filters_and_sorts() {
    let catalog = MemoryCatalog::new();
    let root = catalog.create_folder(new_folder("Props", None)).await.unwrap();
    catalog.create_folder(new_folder("b-sub", Some(root.id))).await.unwrap();
    catalog.create_folder(new_folder("A-sub", Some(root.id))).await.unwrap();
    catalog.create_model(new_model("loose", None)).await.unwrap();
    let first = catalog.create_model(new_model("zeta", Some(root.id))).await.unwrap();
    let second = catalog.create_model(new_model("alpha", Some(root.id))).await.unwrap();

    let subs = catalog.list_folders(Some(root.id), Sort::NAME_ASC).await.unwrap();
    let names: Vec<_> = subs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["A-sub", "b-sub"]);

    let newest = catalog.list_models(Some(root.id), Sort::NEWEST_FIRST).await.unwrap();
    assert_eq!(newest[0].id, second.id);
    assert_eq!(newest[1].id, first.id);

    let oldest = Sort {
        key: SortKey::CreatedAt,
        order: SortOrder::Asc,
    };
    let at_root = catalog.list_models(None, oldest).await.unwrap();
    assert_eq!(at_root.len(), 1);
    assert_eq!(at_root[0].name, "loose");

    let contents = gallery_contents(&catalog, Some(root.id)).await.unwrap();
    assert_eq!(contents.folders.len(), 2);
    assert_eq!(contents.models[0].name, "alpha");
}

#[tokio::test]
async fn test_create_requires_name_and_parent() {
    let catalog = MemoryCatalog::new();
    let err = catalog.create_folder(new_folder("", None)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    let err = catalog
        .create_folder(new_folder("orphan", Some(uuid::Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { kind: "folder", .. }));
}

#[tokio::test]
async fn test_empty_patch_is_rejected() {
    let catalog = MemoryCatalog::new();
    let folder = catalog.create_folder(new_folder("F", None)).await.unwrap();
    let model = catalog.create_model(new_model("m", None)).await.unwrap();

    assert_eq!(
        catalog.update_folder(folder.id, FolderPatch::default()).await,
        Err(CatalogError::EmptyPatch)
    );
    assert_eq!(
        catalog.update_model(model.id, ModelPatch::default()).await,
        Err(CatalogError::EmptyPatch)
    );

    let renamed = catalog
        .update_model(model.id, ModelPatch::rename("renamed"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "renamed");
}

#[tokio::test]
async fn test_folder_cannot_move_into_descendant() {
    let catalog = MemoryCatalog::new();
    let a = catalog.create_folder(new_folder("a", None)).await.unwrap();
    let b = catalog.create_folder(new_folder("b", Some(a.id))).await.unwrap();
    let patch = FolderPatch {
        parent_id: Some(Some(b.id)),
        ..Default::default()
    };
    let err = catalog.update_folder(a.id, patch).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[tokio::test]
async fn test_delete_folder_only_when_empty() {
    let catalog = MemoryCatalog::new();
    let parent = catalog.create_folder(new_folder("parent", None)).await.unwrap();
    let child = catalog.create_folder(new_folder("child", Some(parent.id))).await.unwrap();
    let model = catalog.create_model(new_model("m", Some(child.id))).await.unwrap();

    assert_eq!(
        catalog.delete_folder(parent.id).await,
        Err(CatalogError::FolderNotEmpty(parent.id))
    );
    assert_eq!(
        catalog.delete_folder(child.id).await,
        Err(CatalogError::FolderNotEmpty(child.id))
    );

    catalog.delete_model(model.id).await.unwrap();
    catalog.delete_folder(child.id).await.unwrap();
    catalog.delete_folder(parent.id).await.unwrap();
    assert_eq!(catalog.folder_count(), 0);
}

#[tokio::test]
async fn test_breadcrumbs_root_first() {
    let catalog = MemoryCatalog::new();
    let a = catalog.create_folder(new_folder("a", None)).await.unwrap();
    let b = catalog.create_folder(new_folder("b", Some(a.id))).await.unwrap();
    let c = catalog.create_folder(new_folder("c", Some(b.id))).await.unwrap();

    let path = catalog.breadcrumbs(c.id).await.unwrap();
    let ids: Vec<_> = path.iter().map(|f| f.id).collect();
    assert_eq!(ids, [a.id, b.id, c.id]);
    assert_eq!(catalog.breadcrumbs(a.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_all_folders_by_name() {
    let catalog = MemoryCatalog::new();
    let z = catalog.create_folder(new_folder("Zoo", None)).await.unwrap();
    catalog.create_folder(new_folder("attic", Some(z.id))).await.unwrap();
    let all = catalog.all_folders().await.unwrap();
    let names: Vec<_> = all.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["attic", "Zoo"]);
}

#[tokio::test]
async fn test_public_pagination() {
    let catalog = MemoryCatalog::new();
    let mut ids = Vec::new();
    for i in 0..(PUBLIC_PAGE_SIZE + 5) {
        let m = catalog.create_model(new_model(&format!("m{i}"), None)).await.unwrap();
        catalog.update_model(m.id, ModelPatch::publish(true)).await.unwrap();
        ids.push(m.id);
    }
    catalog.create_model(new_model("private", None)).await.unwrap();

    let first = public_page(&catalog, 0).await.unwrap();
    assert_eq!(first.models.len(), PUBLIC_PAGE_SIZE);
    assert_eq!(first.next_page, Some(1));
    assert_eq!(first.models[0].id, *ids.last().unwrap(), "newest first");

    let second = public_page(&catalog, 1).await.unwrap();
    assert_eq!(second.models.len(), 5);
    assert!(!second.has_more());
    assert!(second.models.iter().all(|m| m.is_public));
}

#[tokio::test]
async fn test_exactly_one_full_page_has_no_next() {
    let catalog = MemoryCatalog::new();
    for i in 0..PUBLIC_PAGE_SIZE {
        let m = catalog.create_model(new_model(&format!("m{i}"), None)).await.unwrap();
        catalog.update_model(m.id, ModelPatch::publish(true)).await.unwrap();
    }
    let page = public_page(&catalog, 0).await.unwrap();
    assert_eq!(page.models.len(), PUBLIC_PAGE_SIZE);
    assert_eq!(page.next_page, None);
}

#[tokio::test]
async fn test_view_settings_save_and_clear() {
    let catalog = MemoryCatalog::new();
    let model = catalog.create_model(new_model("m", None)).await.unwrap();
    assert!(model.view_settings().is_none());

    let rig = LightRig::from_params(vitrine_core::lighting::presets::PRESETS[1].lights);
    let settings = ViewSettings::capture(&rig, &Default::default(), None, None);
    let saved = catalog
        .update_model(model.id, ModelPatch::save_view(&settings))
        .await
        .unwrap();
    assert_eq!(saved.view_settings(), Some(settings));

    let cleared = catalog.update_model(model.id, ModelPatch::clear_view()).await.unwrap();
    assert!(cleared.view_settings().is_none());
}
