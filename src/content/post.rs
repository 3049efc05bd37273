//! Post, Author and Comment documents as returned by the content store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::body::Block;

/// Treat an explicit `null` the same as a missing field.
///
/// Query projections return `null` for every projected field the document
/// does not have, so plain `#[serde(default)]` is not enough.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// URL-friendly identifier of a post (`slug { current }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "nullable")]
    pub current: String,
}

/// A reference to another document (`{ "_ref": "..." }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub id: String,
}

/// An image field: a reference to an image asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<Reference>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Post author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// A reader comment attached to a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", default, deserialize_with = "nullable")]
    pub id: String,

    /// The post this comment belongs to
    #[serde(default)]
    pub post: Option<Reference>,

    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub email: String,

    #[serde(default, deserialize_with = "nullable")]
    pub comment: String,

    /// Set by moderation; only approved comments are ever displayed
    #[serde(default, deserialize_with = "nullable")]
    pub approved: bool,
}

impl Comment {
    /// Whether this comment may be shown on the given post
    pub fn is_visible_on(&self, post_id: &str) -> bool {
        self.approved
            && self
                .post
                .as_ref()
                .map(|post| post.id == post_id)
                .unwrap_or(false)
    }
}

/// The listing projection of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub title: String,

    #[serde(default, deserialize_with = "nullable")]
    pub slug: Slug,

    #[serde(default)]
    pub author: Option<Author>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,
}

/// Only the fields needed to declare a route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPath {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub slug: Slug,
}

/// A fully loaded blog post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,

    /// Creation timestamp
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "nullable")]
    pub title: String,

    #[serde(default)]
    pub author: Option<Author>,

    /// Approved comments, in the order the store returned them
    #[serde(default, deserialize_with = "nullable")]
    pub comments: Vec<Comment>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,

    #[serde(default, deserialize_with = "nullable")]
    pub slug: Slug,

    /// Rich body content
    #[serde(default, deserialize_with = "nullable")]
    pub body: Vec<Block>,
}

impl Post {
    /// Comments that may be displayed on this post
    pub fn visible_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments
            .iter()
            .filter(move |comment| comment.is_visible_on(&self.id))
    }

    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(|a| a.name.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_summary_with_nulls() {
        let summary: PostSummary = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Hello",
            "slug": { "current": "hello" },
            "author": { "name": "Ada", "image": null },
            "description": null,
            "mainImage": null
        }))
        .unwrap();

        assert_eq!(summary.slug.current, "hello");
        assert_eq!(summary.description, "");
        assert_eq!(summary.author.unwrap().name, "Ada");
        assert!(summary.main_image.is_none());
    }

    #[test]
    fn test_parse_post() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "_createdAt": "2022-03-01T10:20:30Z",
            "title": "Hello",
            "author": { "name": "Ada", "image": { "asset": { "_ref": "image-abc-10x20-png" } } },
            "comments": null,
            "slug": { "current": "hello" },
            "body": [
                { "_type": "block", "style": "normal", "children": [{ "_type": "span", "text": "Hi" }] }
            ]
        }))
        .unwrap();

        assert_eq!(post.author_name(), "Ada");
        assert!(post.comments.is_empty());
        assert_eq!(post.body.len(), 1);
        assert_eq!(
            post.created_at.unwrap().to_rfc3339(),
            "2022-03-01T10:20:30+00:00"
        );
    }

    #[test]
    fn test_visible_comments_filter() {
        let comment = |id: &str, post: &str, approved: bool| Comment {
            id: id.to_string(),
            post: Some(Reference {
                id: post.to_string(),
            }),
            name: "n".to_string(),
            approved,
            ..Default::default()
        };

        let post = Post {
            id: "p1".to_string(),
            comments: vec![
                comment("c1", "p1", true),
                comment("c2", "p1", false),
                comment("c3", "p2", true),
            ],
            ..Default::default()
        };

        let ids: Vec<_> = post.visible_comments().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1"]);
    }
}
