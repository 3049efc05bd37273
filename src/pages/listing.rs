//! The post listing (home) page
//!
//! Rendered from a fresh query on every request; never cached.

use anyhow::Result;

use super::Site;
use crate::content::{fetch_as, queries, ContentError, ContentSource, PostSummary, QueryParams};
use crate::templates::PostCard;

/// Fetch every post for the listing
pub async fn fetch_posts(source: &dyn ContentSource) -> Result<Vec<PostSummary>, ContentError> {
    let posts: Option<Vec<PostSummary>> =
        fetch_as(source, queries::ALL_POSTS, &QueryParams::new()).await?;
    Ok(posts.unwrap_or_default())
}

/// Render the listing page
pub fn render(site: &Site, posts: &[PostSummary]) -> Result<String> {
    let cards: Vec<PostCard> = posts
        .iter()
        .map(|post| PostCard::new(post, &site.images))
        .collect();

    let mut context = site.context();
    context.insert("posts", &cards);
    site.templates.render("index.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;
    use crate::content::DatasetExport;

    const EXPORT: &str = r#"
{"_id":"a1","_type":"author","name":"Ada Lovelace"}
{"_id":"p1","_type":"post","title":"Engines","slug":{"current":"engines"},"author":{"_ref":"a1"},"description":"On analytical engines"}
{"_id":"p2","_type":"post","title":"Notes","slug":{"current":"notes"},"author":{"_ref":"a1"},"description":"Translator notes"}
"#;

    #[tokio::test]
    async fn test_every_post_is_listed() {
        let export = DatasetExport::from_ndjson(EXPORT).unwrap();
        let site = Site::new(BlogConfig::default()).unwrap();

        let posts = fetch_posts(&export).await.unwrap();
        assert_eq!(posts.len(), 2);

        let html = render(&site, &posts).unwrap();
        for post in &posts {
            assert!(html.contains(&post.title));
            assert!(html.contains(&post.description));
            assert!(html.contains(&format!("/post/{}", post.slug.current)));
        }
        assert_eq!(html.matches("Ada Lovelace").count(), 2);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let export = DatasetExport::new();
        let site = Site::new(BlogConfig::default()).unwrap();

        let posts = fetch_posts(&export).await.unwrap();
        assert!(posts.is_empty());
        assert!(render(&site, &posts).is_ok());
    }
}
