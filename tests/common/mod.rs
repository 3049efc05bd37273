#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use inkwell::comments::{CommentInput, CommentSubmitter, SubmitError};
use inkwell::config::BlogConfig;
use inkwell::content::DatasetExport;
use inkwell::pages::Site;
use inkwell::server::{self, AppState};

pub const EXPORT: &str = r#"
{"_id":"author-ada","_type":"author","name":"Ada Lovelace","image":{"asset":{"_ref":"image-ada-64x64-png"}}}
{"_id":"author-alan","_type":"author","name":"Alan Turing"}
{"_id":"post-engines","_type":"post","_createdAt":"2022-01-02T03:04:05Z","title":"Analytical Engines","slug":{"current":"engines"},"author":{"_ref":"author-ada"},"description":"Notes on the engine","mainImage":{"asset":{"_ref":"image-cover-800x600-jpg"}},"body":[{"_type":"block","style":"normal","children":[{"_type":"span","text":"The engine weaves patterns."}]}]}
{"_id":"post-machines","_type":"post","_createdAt":"2022-02-03T04:05:06Z","title":"Computing Machinery","slug":{"current":"machines"},"author":{"_ref":"author-alan"},"description":"Can machines think","body":[]}
{"_id":"comment-1","_type":"comment","post":{"_ref":"post-engines"},"name":"Charles","email":"c@example.com","comment":"Splendid work","approved":true}
{"_id":"comment-2","_type":"comment","post":{"_ref":"post-engines"},"name":"Mallory","email":"m@example.com","comment":"Buy cheap watches","approved":false}
{"_id":"comment-3","_type":"comment","post":{"_ref":"post-machines"},"name":"Grace","email":"g@example.com","comment":"Imitation game","approved":true}
"#;

/// Records submissions instead of sending them
#[derive(Default)]
pub struct RecordingSubmitter {
    pub sent: Mutex<Vec<CommentInput>>,
}

#[async_trait]
impl CommentSubmitter for RecordingSubmitter {
    async fn submit(&self, input: &CommentInput) -> Result<(), SubmitError> {
        self.sent.lock().unwrap().push(input.clone());
        Ok(())
    }
}

pub fn config() -> BlogConfig {
    BlogConfig {
        project_id: "testproj".to_string(),
        dataset: "production".to_string(),
        ..Default::default()
    }
}

pub fn state_with(
    export: Arc<DatasetExport>,
    submitter: Arc<dyn CommentSubmitter>,
) -> Arc<AppState> {
    let site = Site::new(config()).unwrap();
    Arc::new(AppState::new(site, export, submitter))
}

pub fn export() -> Arc<DatasetExport> {
    Arc::new(DatasetExport::from_ndjson(EXPORT).unwrap())
}

pub fn app(state: &Arc<AppState>) -> Router {
    server::router(Arc::clone(state))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cache = response
        .headers()
        .get(server::CACHE_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, cache, String::from_utf8(body.to_vec()).unwrap())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_form(app: &Router, uri: &str, form: &str) -> (StatusCode, String) {
    let request = Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

pub async fn post_json(app: &Router, uri: &str, json: &str) -> (StatusCode, String) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}
