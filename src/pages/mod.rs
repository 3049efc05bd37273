//! Page data fetching and rendering

pub mod detail;
pub mod listing;

use anyhow::Result;

use crate::config::BlogConfig;
use crate::content::{BodyRenderer, ImageUrlBuilder};
use crate::templates::{SiteData, TemplateRenderer};

/// Everything needed to turn fetched documents into HTML
pub struct Site {
    pub config: BlogConfig,
    pub templates: TemplateRenderer,
    pub body: BodyRenderer,
    pub images: ImageUrlBuilder,
}

impl Site {
    pub fn new(config: BlogConfig) -> Result<Self> {
        Ok(Self {
            templates: TemplateRenderer::new()?,
            body: BodyRenderer::new(&config),
            images: ImageUrlBuilder::new(&config),
            config,
        })
    }

    fn context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("site", &SiteData::new(&self.config));
        context
    }
}
