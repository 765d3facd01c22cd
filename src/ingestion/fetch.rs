use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::Client;

use crate::error::{TapError, TapResult};

const USER_AGENT: &str = concat!("taplist/", env!("CARGO_PKG_VERSION"));

/// Result of a binary download that is allowed to miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binary {
    Found(Bytes),
    NotFound(u16),
}

/// Retrieval seam between the pipeline and the network.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Page markup; any non-success status is an error.
    async fn fetch(&self, url: &str) -> TapResult<String>;
    /// Raw bytes; a non-success status is reported as `Binary::NotFound`.
    async fn fetch_binary(&self, url: &str) -> TapResult<Binary>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> TapResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| fetch_err("<client>", e))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> TapResult<String> {
        let resp = self.client.get(url).send().await.map_err(|e| fetch_err(url, e))?;
        let resp = resp.error_for_status().map_err(|e| fetch_err(url, e))?;
        resp.text().await.map_err(|e| fetch_err(url, e))
    }

    async fn fetch_binary(&self, url: &str) -> TapResult<Binary> {
        let resp = self.client.get(url).send().await.map_err(|e| fetch_err(url, e))?;
        let status = resp.status();
        if !status.is_success() { return Ok(Binary::NotFound(status.as_u16())); }
        let bytes = resp.bytes().await.map_err(|e| fetch_err(url, e))?;
        Ok(Binary::Found(bytes))
    }
}

fn fetch_err(url: &str, e: reqwest::Error) -> TapError {
    TapError::Fetch { url: url.to_string(), reason: e.to_string() }
}

/// Write logo bytes to `<static_dir>/<file_name>`, creating the dir if needed.
pub fn save_logo(static_dir: &Path, file_name: &str, bytes: &[u8]) -> TapResult<PathBuf> {
    fs::create_dir_all(static_dir).map_err(|e| TapError::fs(static_dir, e))?;
    let path = static_dir.join(file_name);
    fs::write(&path, bytes).map_err(|e| TapError::fs(&path, e))?;
    Ok(path)
}
