//! Shared helpers for folio-web integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use folio_common::auth::AdminCredentials;
use folio_web::config::SiteConfig;
use folio_web::mail::{DisabledMailer, MailError, MailMessage, Mailer};
use folio_web::{build_router, AppState};
use futures::future::BoxFuture;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::util::ServiceExt; // for `oneshot`

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret";
pub const MAIL_FROM: &str = "site@example.com";
pub const MAIL_TO: &str = "owner@example.com";

/// Captures relayed messages instead of calling a provider
pub struct RecordingMailer {
    tx: mpsc::UnboundedSender<MailMessage>,
}

impl Mailer for RecordingMailer {
    fn envelope(&self) -> Option<(&str, &str)> {
        Some((MAIL_FROM, MAIL_TO))
    }

    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<(), MailError>> {
        let _ = self.tx.send(message.clone());
        Box::pin(async { Ok(()) })
    }
}

/// A site rooted in a temporary data directory
pub struct TestSite {
    pub dir: TempDir,
    pub state: AppState,
    pub app: Router,
    pub mail: mpsc::UnboundedReceiver<MailMessage>,
}

impl TestSite {
    /// Admin password set, recording mailer
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut SiteConfig)) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::build(adjust, Arc::new(RecordingMailer { tx }), rx).await
    }

    pub async fn without_mail() -> Self {
        let (_tx, rx) = mpsc::unbounded_channel();
        Self::build(|_| {}, Arc::new(DisabledMailer), rx).await
    }

    async fn build(
        adjust: impl FnOnce(&mut SiteConfig),
        mailer: Arc<dyn Mailer>,
        mail: mpsc::UnboundedReceiver<MailMessage>,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::with_data_dir(dir.path().join("data"));
        config.admin = Some(AdminCredentials::new(ADMIN_USER, ADMIN_PASSWORD));
        adjust(&mut config);

        let state = AppState::initialize(config, mailer).await.unwrap();
        let app = build_router(state.clone());
        Self {
            dir,
            state,
            app,
            mail,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.state.config.data_dir.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        self.state.config.work_dir.clone()
    }

    /// Next relayed message, if one arrives promptly
    pub async fn next_mail(&mut self) -> Option<MailMessage> {
        tokio::time::timeout(Duration::from_secs(2), self.mail.recv())
            .await
            .ok()
            .flatten()
    }

    /// Filenames in registry order, read from disk
    pub async fn track_names(&self) -> Vec<String> {
        self.state
            .store
            .load_tracks()
            .await
            .unwrap()
            .tracks
            .into_iter()
            .map(|t| t.filename)
            .collect()
    }
}

pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(ADMIN_USER, ADMIN_PASSWORD))
        .body(Body::empty())
        .unwrap()
}

/// Authenticated urlencoded form POST
pub fn admin_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(ADMIN_USER, ADMIN_PASSWORD))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

pub fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a multipart/form-data body
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }
}

const BOUNDARY: &str = "folio-test-boundary-7MA4YWxkTrZu0gW";

/// Authenticated multipart POST
pub fn admin_multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(ADMIN_USER, ADMIN_PASSWORD))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).expect("Should parse JSON")
}

/// `Location` header of a redirect
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Should redirect")
        .to_str()
        .unwrap()
        .to_string()
}

/// Decoded `?message=` / `?error=` pair from a redirect target
pub fn flash(response: &Response) -> (Option<String>, Option<String>) {
    let location = location(response);
    let query = location.split_once('?').map(|(_, q)| q).unwrap_or_default();
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap();
    let find = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    (find("message"), find("error"))
}
