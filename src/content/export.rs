//! Serving content from a dataset export
//!
//! A dataset export is NDJSON: one document per line. [`DatasetExport`]
//! keeps the documents in memory and answers the blog's own queries
//! natively, which is enough to run the site offline or in tests. Any
//! other query is rejected with [`ContentError::UnsupportedQuery`].

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::client::{ContentError, ContentSource, QueryParams};
use super::queries;

/// In-memory documents loaded from an export
#[derive(Default)]
pub struct DatasetExport {
    documents: RwLock<Vec<Value>>,
    next_id: AtomicU64,
}

impl DatasetExport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an NDJSON export file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let export = Self::from_ndjson(&content)?;
        tracing::info!(
            "Loaded {} documents from {:?}",
            export.len(),
            path.as_ref()
        );
        Ok(export)
    }

    /// Parse NDJSON content; blank lines are ignored
    pub fn from_ndjson(content: &str) -> Result<Self, ContentError> {
        let export = Self::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            export.upsert(serde_json::from_str(line)?);
        }
        Ok(export)
    }

    /// Insert a document, replacing any existing document with the same `_id`
    pub fn upsert(&self, document: Value) {
        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        let id = document.get("_id").cloned();
        match documents
            .iter_mut()
            .find(|d| id.is_some() && d.get("_id") == id.as_ref())
        {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    /// Set a top-level field on a document; returns false if it does not exist
    pub fn set_field(&self, id: &str, field: &str, value: Value) -> bool {
        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        match documents.iter_mut().find(|d| d["_id"] == id) {
            Some(Value::Object(fields)) => {
                fields.insert(field.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Remove a document by id
    pub fn remove(&self, id: &str) -> bool {
        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        let before = documents.len();
        documents.retain(|d| d["_id"] != id);
        documents.len() != before
    }

    /// All documents of a given `_type`
    pub fn documents_of_type(&self, kind: &str) -> Vec<Value> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        documents
            .iter()
            .filter(|d| d["_type"] == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents
            .read()
            .map(|d| d.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, id: &str) -> Option<Value> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        documents.iter().find(|d| d["_id"] == id).cloned()
    }

    /// `author -> { name, image }`
    fn expand_author(&self, post: &Value) -> Value {
        post["author"]["_ref"]
            .as_str()
            .and_then(|id| self.find(id))
            .map(|author| pick(&author, &["name", "image"]))
            .unwrap_or(Value::Null)
    }

    fn all_posts(&self) -> Value {
        let posts = self
            .documents_of_type("post")
            .iter()
            .map(|post| {
                let mut summary = pick(post, &["_id", "title", "slug", "description", "mainImage"]);
                summary["author"] = self.expand_author(post);
                summary
            })
            .collect();
        Value::Array(posts)
    }

    fn post_slugs(&self) -> Value {
        let posts = self
            .documents_of_type("post")
            .iter()
            .map(|post| {
                json!({
                    "_id": post["_id"],
                    "slug": { "current": post["slug"]["current"] },
                })
            })
            .collect();
        Value::Array(posts)
    }

    fn post_by_slug(&self, slug: &Value) -> Value {
        let Some(post) = self
            .documents_of_type("post")
            .into_iter()
            .find(|post| &post["slug"]["current"] == slug)
        else {
            return Value::Null;
        };

        let comments: Vec<Value> = self
            .documents_of_type("comment")
            .into_iter()
            .filter(|c| c["post"]["_ref"] == post["_id"] && c["approved"] == true)
            .collect();

        let mut result = pick(
            &post,
            &[
                "_id",
                "_createdAt",
                "title",
                "description",
                "mainImage",
                "slug",
                "body",
            ],
        );
        result["author"] = self.expand_author(&post);
        result["comments"] = Value::Array(comments);
        result
    }
}

/// Project the named fields, with `null` for missing ones
fn pick(document: &Value, fields: &[&str]) -> Value {
    let mut projected = Map::new();
    for field in fields {
        projected.insert(
            field.to_string(),
            document.get(*field).cloned().unwrap_or(Value::Null),
        );
    }
    Value::Object(projected)
}

#[async_trait]
impl ContentSource for DatasetExport {
    async fn fetch(&self, query: &str, params: &QueryParams) -> Result<Value, ContentError> {
        match query {
            q if q == queries::ALL_POSTS => Ok(self.all_posts()),
            q if q == queries::POST_SLUGS => Ok(self.post_slugs()),
            q if q == queries::POST_BY_SLUG => {
                let slug = params.get("slug").cloned().unwrap_or(Value::Null);
                Ok(self.post_by_slug(&slug))
            }
            _ => Err(ContentError::UnsupportedQuery),
        }
    }

    async fn create(&self, mut document: Value) -> Result<Value, ContentError> {
        let Value::Object(fields) = &mut document else {
            return Err(ContentError::Decode(serde::de::Error::custom(
                "document must be an object",
            )));
        };

        let id = match fields.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let id = format!("local-{}", n);
                fields.insert("_id".to_string(), Value::String(id.clone()));
                id
            }
        };
        fields
            .entry("_createdAt")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));

        self.upsert(document);
        Ok(json!({ "results": [{ "id": id, "operation": "create" }] }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"
{"_id":"author-1","_type":"author","name":"Ada","image":{"asset":{"_ref":"image-a-1x1-png"}}}
{"_id":"post-1","_type":"post","title":"First","slug":{"current":"first"},"author":{"_ref":"author-1"},"description":"d1","body":[]}
{"_id":"post-2","_type":"post","title":"Second","slug":{"current":"second"}}
{"_id":"c1","_type":"comment","post":{"_ref":"post-1"},"name":"Bob","email":"b@x","comment":"yes","approved":true}
{"_id":"c2","_type":"comment","post":{"_ref":"post-1"},"name":"Eve","email":"e@x","comment":"spam","approved":false}
{"_id":"c3","_type":"comment","post":{"_ref":"post-2"},"name":"Dan","email":"d@x","comment":"other","approved":true}
"#;

    fn slug_params(slug: &str) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("slug".to_string(), json!(slug));
        params
    }

    #[tokio::test]
    async fn test_all_posts_expands_author() {
        let export = DatasetExport::from_ndjson(EXPORT).unwrap();
        let posts = export
            .fetch(queries::ALL_POSTS, &QueryParams::new())
            .await
            .unwrap();

        assert_eq!(posts.as_array().unwrap().len(), 2);
        assert_eq!(posts[0]["author"]["name"], "Ada");
        assert_eq!(posts[1]["author"], Value::Null);
        assert_eq!(posts[1]["description"], Value::Null);
    }

    #[tokio::test]
    async fn test_post_by_slug_only_approved_comments() {
        let export = DatasetExport::from_ndjson(EXPORT).unwrap();
        let post = export
            .fetch(queries::POST_BY_SLUG, &slug_params("first"))
            .await
            .unwrap();

        let comments = post["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["_id"], "c1");
    }

    #[tokio::test]
    async fn test_post_by_slug_missing() {
        let export = DatasetExport::from_ndjson(EXPORT).unwrap();
        let post = export
            .fetch(queries::POST_BY_SLUG, &slug_params("nope"))
            .await
            .unwrap();
        assert!(post.is_null());
    }

    #[tokio::test]
    async fn test_unknown_query() {
        let export = DatasetExport::new();
        let err = export
            .fetch("*[_type == 'movie']", &QueryParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::UnsupportedQuery));
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let export = DatasetExport::new();
        let response = export
            .create(json!({ "_type": "comment", "approved": false }))
            .await
            .unwrap();

        let id = response["results"][0]["id"].as_str().unwrap().to_string();
        assert_eq!(export.documents_of_type("comment")[0]["_id"], id.as_str());
    }

    #[test]
    fn test_set_field_and_remove() {
        let export = DatasetExport::from_ndjson(EXPORT).unwrap();
        assert!(export.set_field("c2", "approved", json!(true)));
        assert!(!export.set_field("missing", "approved", json!(true)));
        assert!(export.remove("c2"));
        assert_eq!(export.documents_of_type("comment").len(), 2);
    }
}
