// src/client.rs

//! HTTP transport for entitlement server and CDN requests
//!
//! Requests go through the [`Transport`] trait so the override fetcher and
//! the release lister can be driven by any client. [`HttpTransport`] is the
//! production implementation: a blocking reqwest client authenticated with
//! the consumer identity (or an entitlement certificate for the CDN).

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| Error::ParseError(format!("Response body is not UTF-8: {e}")))
    }
}

/// Authenticated GET requests relative to a base URL
pub trait Transport {
    /// Fetch `path` (absolute path below the base URL)
    ///
    /// Any status code is a successful return; only a failure to complete the
    /// request is an error.
    fn get(&self, path: &str) -> Result<Response>;
}

/// TLS material for an [`HttpTransport`]
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// PEM CA certificates trusted in addition to the built-in roots
    pub ca_certs: Vec<PathBuf>,
    /// Client certificate and key presented to the server
    pub client_identity: Option<(PathBuf, PathBuf)>,
    /// Skip server certificate verification
    pub insecure: bool,
}

impl TlsConfig {
    /// Trust every `*.pem` file in a CA directory
    pub fn with_ca_dir(mut self, dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            debug!("CA directory {} does not exist", dir.display());
            return Ok(self);
        }

        let entries = fs::read_dir(dir)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", dir.display())))?;
        let mut certs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "pem"))
            .collect();
        certs.sort();
        self.ca_certs.extend(certs);
        Ok(self)
    }

    pub fn with_client_identity(mut self, cert: PathBuf, key: PathBuf) -> Self {
        self.client_identity = Some((cert, key));
        self
    }
}

/// Blocking HTTPS transport
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url`
    pub fn new(base_url: &str, tls: &TlsConfig) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::InitError(format!("Invalid base URL {base_url}: {e}")))?;

        let mut builder = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .use_rustls_tls()
            .danger_accept_invalid_certs(tls.insecure);

        for ca_path in &tls.ca_certs {
            let pem = read_file(ca_path)?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                Error::InitError(format!("Invalid CA certificate {}: {e}", ca_path.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some((cert_path, key_path)) = &tls.client_identity {
            let mut pem = read_file(cert_path)?;
            pem.push(b'\n');
            pem.extend(read_file(key_path)?);
            let identity = reqwest::Identity::from_pem(&pem).map_err(|e| {
                Error::InitError(format!(
                    "Invalid client identity {}: {e}",
                    cert_path.display()
                ))
            })?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Full URL for a path below the base URL
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<Response> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;

        debug!("GET {} -> HTTP {} ({} bytes)", url, status, body.len());
        Ok(Response::new(status, body.to_vec()))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))
}
