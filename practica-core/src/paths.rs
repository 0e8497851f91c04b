//! Filesystem layout under `<home>/.practica/`.
//!
//! ```text
//! ~/.practica/
//!   config.yaml   (optional, route overrides)
//!   store.json    (key-value store, mode 0600)
//!   templates/    (optional, fragment template overrides)
//! ```

use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const STORE_FILE: &str = "store.json";
pub const CONFIG_FILE: &str = "config.yaml";
pub const TEMPLATES_DIR: &str = "templates";

pub fn practica_root(home: &Path) -> PathBuf {
    home.join(".practica")
}

pub fn store_path(home: &Path) -> PathBuf {
    practica_root(home).join(STORE_FILE)
}

pub fn config_path(home: &Path) -> PathBuf {
    practica_root(home).join(CONFIG_FILE)
}

pub fn templates_dir(home: &Path) -> PathBuf {
    practica_root(home).join(TEMPLATES_DIR)
}

/// The current user's home directory.
pub fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}
