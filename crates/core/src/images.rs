//! Image localization.
//!
//! Rewrites every remote `<img>` in the regenerated pages to a copy stored
//! under `images/<page folder>/`, downloading each file once. File names keep
//! the original basename and gain a short hash of the source URL so that
//! equal basenames from different URLs do not collide.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use sha1::{Digest, Sha1};
use tracing::{info, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::fetch::Fetcher;
use crate::paths::{find_pages, page_folder};
use crate::scrape::Batch;
use crate::Result;

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b([^>]*)>").expect("IMG_TAG regex should compile"));
static SRC_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc="([^"]+)""#).expect("SRC_ATTR regex should compile"));
static ALT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\balt="([^"]*)""#).expect("ALT_ATTR regex should compile"));
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("UNSAFE_CHARS regex should compile"));

/// Counters for one image localization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageReport {
    /// Pages in the whole site.
    pub total_pages: usize,
    /// Pages in the processed batch.
    pub pages: usize,
    pub downloaded: usize,
    /// Images already present on disk from an earlier run.
    pub reused: usize,
    pub failed: usize,
}

/// Replaces runs of characters outside `[A-Za-z0-9._-]` with `-`.
pub fn safe_name(name: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(name, "-");
    let trimmed = replaced.trim_matches('-');
    if trimmed.is_empty() { "image".to_string() } else { trimmed.to_string() }
}

/// Sanitized, percent-decoded basename of the URL path.
pub fn filename_from_url(src: &str) -> String {
    let path = Url::parse(src).map(|url| url.path().to_string()).unwrap_or_default();
    let decoded = percent_decode_str(&path).decode_utf8_lossy();
    let base = decoded.rsplit('/').next().unwrap_or_default();
    safe_name(base)
}

/// Local file name for an image URL: the basename with the first eight hex
/// digits of the URL's SHA-1 inserted before the extension.
///
/// ```rust
/// use sitecarve_core::hashed_filename;
///
/// let name = hashed_filename("https://cdn.example.com/a/photo%201.jpg");
/// assert!(name.starts_with("photo-1-"));
/// assert!(name.ends_with(".jpg"));
/// assert_eq!(name.len(), "photo-1-".len() + 8 + ".jpg".len());
/// ```
pub fn hashed_filename(src: &str) -> String {
    let filename = filename_from_url(src);
    let digest = hex::encode(Sha1::digest(src.as_bytes()));
    let hash = &digest[..8];

    match filename.split_once('.') {
        Some((stem, ext)) if !ext.is_empty() => format!("{stem}-{hash}.{ext}"),
        Some((stem, _)) => format!("{stem}-{hash}"),
        None => format!("{filename}-{hash}"),
    }
}

/// Whether `src` should be downloaded: an absolute URL that is not inline data.
fn is_remote(src: &str) -> bool {
    !src.starts_with("data:") && Url::parse(src).is_ok()
}

enum Fetched {
    Downloaded,
    Reused,
}

async fn download<F: Fetcher>(fetcher: &F, src: &str, dest: &Path) -> Result<Fetched> {
    if dest.exists() {
        return Ok(Fetched::Reused);
    }
    let bytes = fetcher.fetch_bytes(src).await?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, bytes)?;
    Ok(Fetched::Downloaded)
}

/// Downloads the remote images of one page into `images_root/folder` and
/// returns the rewritten markup. Images that fail to download keep their tag.
pub async fn localize_page<F: Fetcher>(
    html: &str, folder: &str, images_root: &Path, fetcher: &F, report: &mut ImageReport,
) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for caps in IMG_TAG.captures_iter(html) {
        let (Some(tag), Some(attrs)) = (caps.get(0), caps.get(1)) else { continue };
        let src = SRC_ATTR.captures(attrs.as_str()).and_then(|c| c.get(1)).map_or("", |m| m.as_str());
        if src.is_empty() || !is_remote(src) {
            continue;
        }
        let alt = ALT_ATTR.captures(attrs.as_str()).and_then(|c| c.get(1)).map_or("", |m| m.as_str());

        let filename = hashed_filename(src);
        let dest = images_root.join(folder).join(&filename);
        match download(fetcher, src, &dest).await {
            Ok(fetched) => {
                match fetched {
                    Fetched::Downloaded => report.downloaded += 1,
                    Fetched::Reused => report.reused += 1,
                }
                out.push_str(&html[last..tag.start()]);
                out.push_str(&format!(r#"<img src="/images/{folder}/{filename}" alt="{alt}">"#));
                last = tag.end();
            }
            Err(e) => {
                warn!(%src, error = %e, "image download failed");
                report.failed += 1;
            }
        }
    }

    out.push_str(&html[last..]);
    out
}

/// Localizes the images of every page in the configured output root.
pub async fn localize_images<F: Fetcher>(config: &SiteConfig, batch: Batch, fetcher: &F) -> Result<ImageReport> {
    let root = &config.output_root;
    let images_root = config.images_root();
    let pages = find_pages(root)?;

    let mut report = ImageReport { total_pages: pages.len(), ..Default::default() };
    let selected = batch.select(&pages);
    fs::create_dir_all(&images_root)?;

    for (idx, page) in selected.iter().enumerate() {
        let position = batch.offset + idx + 1;
        let html = fs::read_to_string(page)?;
        let folder = page_folder(page, root);

        let updated = localize_page(&html, &folder, &images_root, fetcher, &mut report).await;
        if updated != html {
            fs::write(page, updated)?;
        }
        report.pages += 1;
        info!("[{}/{}] {}", position, report.total_pages, page.display());
    }

    info!(images_root = %images_root.display(), downloaded = report.downloaded, "images localized");
    Ok(report)
}
