//! Practica core library.
//!
//! - [`types`]: [`Stage`], [`TemplateKind`], [`EmailTemplate`], [`StudentRow`]
//! - [`store`]: [`KeyValueStore`] with memory and JSON-file implementations
//! - [`config`]: `config.yaml` settings and the stage route table
//! - [`error`]: [`StoreError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod paths;
pub mod store;
pub mod types;

pub use config::{RouteTable, Settings};
pub use error::{ConfigError, StoreError};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::{EmailTemplate, Stage, StudentRow, TemplateKind};
