//! List posts in the content store

use anyhow::Result;

use crate::content::{ContentSource, PostSummary};
use crate::pages::listing;

/// Print every post
pub async fn run(source: &dyn ContentSource) -> Result<()> {
    let posts = listing::fetch_posts(source).await?;
    println!("Posts ({}):", posts.len());
    for post in &posts {
        println!("{}", format_line(post));
    }
    Ok(())
}

fn format_line(post: &PostSummary) -> String {
    let author = post
        .author
        .as_ref()
        .map(|a| a.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("unknown author");
    format!("  {} - {} [{}]", post.title, author, post.slug.current)
}
