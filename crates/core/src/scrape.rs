//! Whole-site scraping.
//!
//! Reads the sitemap, then for every listed page extracts the content region
//! and writes a regenerated page under the output root. A failed page is
//! logged and counted; only a failed sitemap fetch aborts the run.

use std::fs;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SiteConfig;
use crate::extract::extract_region;
use crate::fetch::Fetcher;
use crate::page::{PageMeta, build_page, clean_content};
use crate::paths::url_to_path;
use crate::sitemap::site_urls;
use crate::Result;

/// A window over an ordered work list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Batch {
    /// Items to skip from the start.
    pub offset: usize,
    /// Maximum items to process; all remaining when `None`.
    pub limit: Option<usize>,
}

impl Batch {
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// The selected slice of `items`, empty when `offset` is past the end.
    pub fn select<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(items.len()),
            None => items.len(),
        };
        &items[start..end]
    }
}

/// Options for [`scrape_site`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeOptions {
    pub offset: usize,
    pub limit: Option<usize>,
    /// Rewrite pages that already exist on disk.
    pub force: bool,
}

impl ScrapeOptions {
    pub fn batch(&self) -> Batch {
        Batch::new(self.offset, self.limit)
    }
}

/// Counters for one scrape run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    /// URLs in the sitemap, base URL included.
    pub total: usize,
    pub written: usize,
    /// Already present and not forced.
    pub skipped: usize,
    pub failed: usize,
    /// Fetched but without a content region, or with an empty one.
    pub no_content: usize,
    pub out_of_site: usize,
}

/// Scrapes every sitemap page of `config.base_url` into `config.output_root`.
pub async fn scrape_site<F: Fetcher>(config: &SiteConfig, fetcher: &F, options: ScrapeOptions) -> Result<ScrapeReport> {
    let triggers = config.trigger_matches()?;
    let sitemap_url = config.sitemap_url();

    info!(%sitemap_url, "fetching sitemap");
    let sitemap = fetcher.fetch_text(&sitemap_url).await?;
    let urls = site_urls(&sitemap, &config.base_url)?;

    let mut report = ScrapeReport { total: urls.len(), ..Default::default() };
    let batch = options.batch();
    let selected = batch.select(&urls);
    info!(total = urls.len(), batch = selected.len(), offset = batch.offset, "scraping pages");

    for (idx, url) in selected.iter().enumerate() {
        let position = batch.offset + idx + 1;

        let Some(page) = url_to_path(url, &config.base_url, &config.output_root) else {
            warn!(%url, "outside the site, skipping");
            report.out_of_site += 1;
            continue;
        };

        if page.file.exists() && !options.force {
            debug!(file = %page.file.display(), "exists, skipping");
            report.skipped += 1;
            continue;
        }

        info!("[{}/{}] {}", position, report.total, url);
        let html = match fetcher.fetch_text(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "fetch failed");
                report.failed += 1;
                continue;
            }
        };

        let region = match extract_region(&html, triggers.as_slice()) {
            Some(region) if !region.is_empty() => region,
            _ => {
                warn!(%url, "no content region");
                report.no_content += 1;
                continue;
            }
        };

        let meta = PageMeta::from_html(&html);
        let content = clean_content(&region.content, &config.base_url);
        let rendered = build_page(config, &meta, &content, &page.url_path);

        if let Some(parent) = page.file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&page.file, rendered)?;
        report.written += 1;
    }

    info!(
        written = report.written,
        skipped = report.skipped,
        failed = report.failed,
        no_content = report.no_content,
        "scrape finished"
    );
    Ok(report)
}
