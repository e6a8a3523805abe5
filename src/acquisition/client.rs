// src/acquisition/client.rs
use crate::utils::error::AcquireError;
use reqwest::header;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("contrib_extractor/", env!("CARGO_PKG_VERSION"));
const DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Where the filing comes from: a local file or an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(String),
    Url(String),
}

impl DocumentSource {
    pub fn parse(input: &str) -> Self {
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DocumentSource::Url(input.to_string())
        } else {
            DocumentSource::Path(input.to_string())
        }
    }

    /// File name used to label output files.
    pub fn stem(&self) -> String {
        let raw = match self {
            DocumentSource::Path(p) => p.as_str(),
            DocumentSource::Url(u) => u.split(['?', '#']).next().unwrap_or(u),
        };
        Path::new(raw)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("filing")
            .to_string()
    }
}

/// Creates a reqwest client configured for filing downloads.
fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()
}

/// Downloads a filing document from its URL.
pub async fn download_document(url: &str) -> Result<Vec<u8>, AcquireError> {
    let client = build_client()?; // Propagate client build error if any

    tracing::info!("Downloading document from: {}", url);

    let response = client
        .get(url)
        .header(header::ACCEPT, "application/pdf,*/*")
        .send()
        .await?; // Propagates reqwest::Error as AcquireError::Network

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AcquireError::DocumentNotFound(url.to_string()));
        }
        return Err(AcquireError::Http(status));
    }

    let body = response.bytes().await?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);
    Ok(body.to_vec())
}

/// Reads the document bytes from wherever `source` points.
pub async fn load_document(source: &DocumentSource) -> Result<Vec<u8>, AcquireError> {
    let bytes = match source {
        DocumentSource::Url(url) => download_document(url).await?,
        DocumentSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AcquireError::DocumentNotFound(path.clone())
            } else {
                AcquireError::Io(e)
            }
        })?,
    };

    if bytes.is_empty() {
        return Err(AcquireError::MalformedDocument(format!("{:?} is empty", source)));
    }

    Ok(bytes)
}
