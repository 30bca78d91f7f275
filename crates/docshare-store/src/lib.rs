//! docshare-store: persistence and document orchestration for Docshare
//!
//! This crate provides:
//! - Storage traits for users, documents, versions and permission grants
//! - A PostgreSQL implementation via sqlx, with embedded migrations
//! - An in-memory implementation for tests
//! - [`DocumentService`], which checks access and runs the edit pipeline
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docshare_store::{DocumentService, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//! let service = DocumentService::new(Arc::new(store));
//!
//! let doc = service.get_document(caller, document_id).await?;
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod models;
pub mod schema;
pub mod service;
pub mod store;

pub use backend::{
    Backend, DEFAULT_USER_SEARCH_LIMIT, DocumentStore, IdentityStore, PermissionLedger,
    VersionHistory,
};
pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use models::*;
pub use service::{DocumentService, MAX_TITLE_LENGTH};
pub use store::{Store, StoreConfig};

// Re-export docshare-core for downstream crates
pub use docshare_core;
