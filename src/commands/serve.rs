//! Build and serve the blog

use anyhow::Result;
use std::sync::Arc;

use crate::comments::HttpCommentSubmitter;
use crate::content::ContentSource;
use crate::pages::Site;
use crate::server::{self, AppState};
use crate::Blog;

/// Prerender every known post, then serve until interrupted
pub async fn run(blog: &Blog, source: Arc<dyn ContentSource>, ip: &str, port: u16) -> Result<()> {
    let endpoint = blog
        .config
        .comment_endpoint
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", ip, port));
    let submitter = Arc::new(HttpCommentSubmitter::new(&endpoint));
    tracing::debug!("Comments are submitted to {}", submitter.url());

    let site = Site::new(blog.config.clone())?;
    let state = Arc::new(AppState::new(site, source, submitter));

    tracing::info!("Building pages...");
    state.prerender().await?;

    tracing::info!("Starting server at http://{}:{}", ip, port);
    server::start(state, ip, port).await
}
