//! Content store client
//!
//! Pages depend on [`ContentSource`] rather than on HTTP directly, so they
//! can run against a dataset export or a test double.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::BlogConfig;

/// Named query parameters (`$slug` and friends), without the `$`
pub type QueryParams = Map<String, Value>;

/// Errors talking to the content store
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content store is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("request to content store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected document shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("query is not supported by this content source")]
    UnsupportedQuery,

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// A read/write handle on the content store
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a query and return its raw result (`null` when nothing matched)
    async fn fetch(&self, query: &str, params: &QueryParams) -> Result<Value, ContentError>;

    /// Create a new document and return the store's response
    async fn create(&self, document: Value) -> Result<Value, ContentError>;
}

/// Run a query and decode its result
pub async fn fetch_as<T>(
    source: &dyn ContentSource,
    query: &str,
    params: &QueryParams,
) -> Result<T, ContentError>
where
    T: DeserializeOwned,
{
    let value = source.fetch(query, params).await?;
    Ok(serde_json::from_value(value)?)
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

/// Client for the hosted store's HTTP API
pub struct HttpContentClient {
    client: reqwest::Client,
    query_url: String,
    mutate_url: String,
    token: Option<String>,
}

impl HttpContentClient {
    /// Create a client for the configured project and dataset
    pub fn new(config: &BlogConfig) -> Result<Self, ContentError> {
        if config.project_id.is_empty() {
            return Err(ContentError::NotConfigured("project_id"));
        }
        if config.dataset.is_empty() {
            return Err(ContentError::NotConfigured("dataset"));
        }

        let host = if config.use_cdn && config.token.is_none() {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let base_url = format!("https://{}.{}", config.project_id, host);
        Ok(Self::with_base_url(&base_url, config))
    }

    /// Create a client against an explicit API base URL
    pub fn with_base_url(base_url: &str, config: &BlogConfig) -> Self {
        let base = format!(
            "{}/v{}/data",
            base_url.trim_end_matches('/'),
            config.api_version.trim_start_matches('v')
        );
        Self {
            client: reqwest::Client::new(),
            query_url: format!("{}/query/{}", base, config.dataset),
            mutate_url: format!("{}/mutate/{}", base, config.dataset),
            token: config.token.clone(),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ContentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ContentError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ContentSource for HttpContentClient {
    async fn fetch(&self, query: &str, params: &QueryParams) -> Result<Value, ContentError> {
        let mut pairs = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        tracing::debug!("Querying content store ({} params)", params.len());

        let request = self.client.get(&self.query_url).query(&pairs);
        let response = Self::check(self.authorize(request).send().await?).await?;
        let body: QueryResponse = response.json().await?;
        Ok(body.result)
    }

    async fn create(&self, document: Value) -> Result<Value, ContentError> {
        if self.token.is_none() {
            return Err(ContentError::NotConfigured("token"));
        }

        let mutations = json!({ "mutations": [{ "create": document }] });
        let request = self.client.post(&self.mutate_url).json(&mutations);
        let response = Self::check(self.authorize(request).send().await?).await?;
        Ok(response.json().await?)
    }
}
