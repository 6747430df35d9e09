//! Thumbnail downloads.

use crate::error::{CrawlError, Result};
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Something that can store the image at `url` into `dest`.
pub trait ImageFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Plain HTTP download with `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    #[instrument(level = "debug", skip(self, dest), fields(dest = %dest.display()))]
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        fs::write(dest, &bytes).await?;
        debug!(bytes = bytes.len(), "Saved thumbnail");
        Ok(())
    }
}
