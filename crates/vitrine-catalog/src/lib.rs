//! Vitrine Catalog: persistence seams for the gallery.
//!
//! The gallery talks to two external collaborators: a relational catalog of
//! folders and models ([`Catalog`]) and a blob store for model and thumbnail
//! files ([`ObjectStore`]). This crate defines both as traits, ships
//! in-memory implementations, and builds the gallery workflows (uploads,
//! bulk actions, public pagination, filtering) on top of them.

pub mod bulk;
pub mod catalog;
pub mod entity;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod memory;
pub mod store;
pub mod upload;

pub use bulk::{BulkReport, ItemRef};
pub use catalog::{Catalog, Sort, SortKey, SortOrder};
pub use entity::{Folder, FolderId, FolderPatch, Model, ModelId, ModelPatch, NewFolder, NewModel};
pub use error::{CatalogError, CatalogResult, StoreError};
pub use memory::MemoryCatalog;
pub use store::{MemoryObjectStore, ObjectStore, StoredObject};
