//! inkwell: a server-rendered blog frontend for a hosted content store
//!
//! Posts and comments live in the content store. Listing pages are rendered
//! on every request; post pages are prerendered at startup and revalidated
//! in the background. Reader comments are stored unapproved until moderated.

pub mod cache;
pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pages;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::content::{ContentSource, DatasetExport, HttpContentClient};

/// Name of the configuration file in the base directory
pub const CONFIG_FILE: &str = "blog.yml";

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Blog configuration
    pub config: config::BlogConfig,
    /// Base directory
    pub base_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::BlogConfig::load(&config_path)?
        } else {
            config::BlogConfig::default()
        };
        config.apply_env();

        Ok(Self { config, base_dir })
    }

    /// The content source to read from: a dataset export if one is given,
    /// otherwise the hosted store
    pub fn content_source(&self, dataset: Option<&Path>) -> Result<Arc<dyn ContentSource>> {
        match dataset {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.base_dir.join(path)
                };
                Ok(Arc::new(DatasetExport::load(path)?))
            }
            None => Ok(Arc::new(HttpContentClient::new(&self.config)?)),
        }
    }
}
