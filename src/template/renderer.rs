//! Fetch template documents as HTML

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const GOOGLE_DOC_PREFIX: &str = "https://docs.google.com/document/d/";
const GOOGLE_EXPORT_URL: &str = "https://docs.google.com/feeds/download/documents/export/Export";

/// Errors fetching a template document
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template document not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read template document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("authentication failed fetching {url} (HTTP {status})")]
    Auth { url: String, status: u16 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

/// Renders a template document reference to an HTML string
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render_as_html(&self, reference: &str) -> Result<String, RenderError>;
}

/// Document renderer for local files and web documents
///
/// Reference forms:
/// - `https://docs.google.com/document/d/<id>/...`: exported as HTML with the bearer token
/// - any other `http(s)://` URL: fetched as is, without credentials
/// - `file://<path>` or a bare path: read from disk, relative to the base directory
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    base_dir: PathBuf,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl DocumentFetcher {
    /// Create a fetcher resolving relative paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RenderError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_dir: base_dir.into(),
            bearer_token: None,
            client,
        })
    }

    /// Set the bearer token sent with Google Docs exports
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    /// Resolve a local reference to a filesystem path
    fn local_path(&self, reference: &str) -> PathBuf {
        let raw = reference.strip_prefix("file://").unwrap_or(reference);
        let expanded = shellexpand::tilde(raw);
        let path = Path::new(expanded.as_ref());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    async fn read_file(&self, reference: &str) -> Result<String, RenderError> {
        let path = self.local_path(reference);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RenderError::NotFound { path })
            }
            Err(source) => Err(RenderError::Io { path, source }),
        }
    }

    async fn fetch_url(&self, reference: &str) -> Result<String, RenderError> {
        // The token only ever goes to the Google export endpoint
        let (url, request) = match export_url(reference) {
            Some(url) => {
                let mut request = self.client.get(&url);
                if let Some(ref token) = self.bearer_token {
                    request = request.bearer_auth(token);
                }
                (url, request)
            }
            None => (reference.to_string(), self.client.get(reference)),
        };

        let response = request.send().await.map_err(|e| RenderError::Network {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            401 | 403 => {
                return Err(RenderError::Auth {
                    url,
                    status: status.as_u16(),
                });
            }
            code => return Err(RenderError::Http { url, status: code }),
        }

        response.text().await.map_err(|e| RenderError::Network {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DocumentRenderer for DocumentFetcher {
    async fn render_as_html(&self, reference: &str) -> Result<String, RenderError> {
        if is_web_reference(reference) {
            tracing::debug!(reference, "Fetching template document");
            self.fetch_url(reference).await
        } else {
            tracing::debug!(reference, "Reading template document");
            self.read_file(reference).await
        }
    }
}

fn is_web_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// HTML export URL for a Google Docs document URL
pub fn export_url(reference: &str) -> Option<String> {
    let rest = reference.strip_prefix(GOOGLE_DOC_PREFIX)?;
    let id = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|id| !id.is_empty())?;
    Some(format!("{}?id={}&exportFormat=html", GOOGLE_EXPORT_URL, id))
}
