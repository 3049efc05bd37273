//! Delivering comments to the submission endpoint

use async_trait::async_trait;
use serde_json::{json, Value};

use super::form::CommentInput;

/// Path of the comment submission endpoint
pub const COMMENT_ENDPOINT: &str = "/api/createComment";

/// The comment never reached the endpoint
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Something that accepts validated comments
#[async_trait]
pub trait CommentSubmitter: Send + Sync {
    async fn submit(&self, input: &CommentInput) -> Result<(), SubmitError>;
}

/// POSTs comments as JSON to `{base_url}/api/createComment`
///
/// Any HTTP response counts as delivered, whatever its status; only a
/// transport failure is an error.
pub struct HttpCommentSubmitter {
    client: reqwest::Client,
    url: String,
}

impl HttpCommentSubmitter {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", base_url.trim_end_matches('/'), COMMENT_ENDPOINT),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CommentSubmitter for HttpCommentSubmitter {
    async fn submit(&self, input: &CommentInput) -> Result<(), SubmitError> {
        let response = self.client.post(&self.url).json(input).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Comment endpoint answered {}", status);
        }
        Ok(())
    }
}

/// The comment document to create for a submission; it starts unapproved
pub fn new_comment_document(input: &CommentInput) -> Value {
    json!({
        "_type": "comment",
        "post": {
            "_type": "reference",
            "_ref": input.post_id,
        },
        "name": input.name,
        "email": input.email,
        "comment": input.comment,
        "approved": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn input() -> CommentInput {
        CommentInput {
            post_id: "post-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            comment: String::new(),
        }
    }

    #[test]
    fn test_url() {
        let submitter = HttpCommentSubmitter::new("http://localhost:3000/");
        assert_eq!(submitter.url(), "http://localhost:3000/api/createComment");
    }

    #[test]
    fn test_new_comment_document() {
        let doc = new_comment_document(&input());
        assert_eq!(doc["_type"], "comment");
        assert_eq!(doc["post"]["_ref"], "post-1");
        assert_eq!(doc["approved"], false);
    }

    #[tokio::test]
    async fn test_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/createComment"))
            .and(body_json(json!({
                "_id": "post-1",
                "name": "Ada",
                "email": "ada@example.com",
                "comment": ""
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = HttpCommentSubmitter::new(&server.uri());
        submitter.submit(&input()).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_still_delivered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = HttpCommentSubmitter::new(&server.uri());
        assert!(submitter.submit(&input()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let submitter = HttpCommentSubmitter::new(&uri);
        let err = submitter.submit(&input()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Http(_)));
    }
}
