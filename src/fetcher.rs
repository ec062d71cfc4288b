use std::{path::Path, time::Duration};

use anyhow::Context;
use log::debug;
use reqwest::Url;

use crate::{client::Fetch, error::Result, html::strip_chrome, toc::ResourceDescriptor, Outcome};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Downloads book chapters one at a time, pausing after every request.
pub struct ChapterFetcher<'a, F> {
    fetch: &'a F,
    delay: Duration,
}

impl<'a, F: Fetch> ChapterFetcher<'a, F> {
    pub fn new(fetch: &'a F, delay: Duration) -> Self {
        Self { fetch, delay }
    }

    /// Chapter html with the site chrome removed.
    pub async fn fetch_chapter(&self, url: &Url) -> Result<String> {
        let result = match self.fetch.get_text(url).await {
            Ok(body) => strip_chrome(&body),
            Err(err) => Err(err),
        };
        // Applies to failed requests too
        tokio::time::sleep(self.delay).await;
        result
    }

    /// Fetches `chapter` into `path` unless it was saved by a previous run.
    pub async fn save_chapter(&self, chapter: &ResourceDescriptor, path: &Path) -> Result<Outcome> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!("{} already exists", path.display());
            return Ok(Outcome::Skipped);
        }

        let content = self.fetch_chapter(&chapter.url).await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Unable to write {}", path.display()))?;

        Ok(Outcome::Downloaded)
    }
}
