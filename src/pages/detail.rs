//! The post detail page
//!
//! Routes are precomputed from every known slug when the server starts.
//! Pages are cached per slug and regenerated after the revalidate interval
//! (see [`crate::cache::PageCache`]); unknown slugs are generated on first
//! request.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

use super::Site;
use crate::comments::FormState;
use crate::content::{fetch_as, queries, ContentError, ContentSource, Post, PostPath, QueryParams};
use crate::templates::{CommentView, FormView, PostView};

/// A generated detail page: the post it was built from and its HTML
#[derive(Debug, Clone)]
pub struct DetailPage {
    pub post: Arc<Post>,
    pub html: Arc<str>,
}

/// Slugs of every post, one static route each
pub async fn static_paths(source: &dyn ContentSource) -> Result<Vec<String>, ContentError> {
    let posts: Option<Vec<PostPath>> =
        fetch_as(source, queries::POST_SLUGS, &QueryParams::new()).await?;

    Ok(posts
        .unwrap_or_default()
        .into_iter()
        .filter_map(|post| {
            if post.slug.current.is_empty() {
                tracing::warn!("Post {} has no slug, no route declared", post.id);
                None
            } else {
                Some(post.slug.current)
            }
        })
        .collect())
}

/// Fetch one post with its approved comments, or `None` if no post has this slug
pub async fn fetch_post(
    source: &dyn ContentSource,
    slug: &str,
) -> Result<Option<Post>, ContentError> {
    let mut params = QueryParams::new();
    params.insert("slug".to_string(), json!(slug));
    fetch_as(source, queries::POST_BY_SLUG, &params).await
}

/// Render a post with the comment form in the given state
pub fn render(site: &Site, post: &Post, form: &FormState) -> Result<String> {
    let body_html = site.body.render(&post.body);
    let view = PostView::new(post, &site.images, &site.config, body_html);
    let comments: Vec<CommentView> = post.visible_comments().map(CommentView::new).collect();

    let mut context = site.context();
    context.insert("post", &view);
    context.insert("comments", &comments);
    context.insert("form", &FormView::new(post, form));
    site.templates.render("post.html", &context)
}

/// Fetch and render the page for a slug, as the cache stores it
pub async fn generate(
    site: &Site,
    source: &dyn ContentSource,
    slug: &str,
) -> Result<Option<DetailPage>> {
    let Some(post) = fetch_post(source, slug).await? else {
        tracing::debug!("No post for slug {:?}", slug);
        return Ok(None);
    };

    let html = render(site, &post, &FormState::default())?;
    Ok(Some(DetailPage {
        post: Arc::new(post),
        html: html.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::{CommentInput, FieldError};
    use crate::config::BlogConfig;
    use crate::content::DatasetExport;

    const EXPORT: &str = r#"
{"_id":"a1","_type":"author","name":"Ada Lovelace"}
{"_id":"p1","_type":"post","_createdAt":"2022-01-02T03:04:05Z","title":"Engines","slug":{"current":"engines"},"author":{"_ref":"a1"},"description":"On engines","body":[{"_type":"block","style":"normal","children":[{"_type":"span","text":"Body text"}]}]}
{"_id":"p2","_type":"post","title":"Untitled"}
{"_id":"c1","_type":"comment","post":{"_ref":"p1"},"name":"Bob","email":"b@x","comment":"Approved remark","approved":true}
{"_id":"c2","_type":"comment","post":{"_ref":"p1"},"name":"Eve","email":"e@x","comment":"Pending remark","approved":false}
"#;

    fn setup() -> (DatasetExport, Site) {
        (
            DatasetExport::from_ndjson(EXPORT).unwrap(),
            Site::new(BlogConfig::default()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_static_paths_skip_empty_slugs() {
        let (export, _) = setup();
        assert_eq!(static_paths(&export).await.unwrap(), vec!["engines"]);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let (export, site) = setup();
        assert!(fetch_post(&export, "missing").await.unwrap().is_none());
        assert!(generate(&site, &export, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_page_shows_only_approved_comments() {
        let (export, site) = setup();
        let page = generate(&site, &export, "engines").await.unwrap().unwrap();

        assert!(page.html.contains("Engines"));
        assert!(page.html.contains("Body text"));
        assert!(page.html.contains("Ada Lovelace"));
        assert!(page.html.contains("Approved remark"));
        assert!(!page.html.contains("Pending remark"));
        assert!(page.html.contains("Published at"));
        assert!(page.html.contains(r#"name="_id" value="p1""#));
    }

    #[tokio::test]
    async fn test_render_form_states() {
        let (export, site) = setup();
        let post = fetch_post(&export, "engines").await.unwrap().unwrap();

        let invalid = FormState::Unsubmitted {
            input: CommentInput {
                post_id: "p1".to_string(),
                email: "a@b".to_string(),
                ..Default::default()
            },
            errors: vec![FieldError::NameRequired],
        };
        let html = render(&site, &post, &invalid).unwrap();
        assert!(html.contains("The Name Field is required"));
        assert!(!html.contains("The Email Field is required"));
        assert!(html.contains(r#"value="a@b""#));

        let html = render(&site, &post, &FormState::Submitted).unwrap();
        assert!(html.contains("Thanks for submitting!"));
        assert!(!html.contains(r#"id="comment-form""#));
    }
}
