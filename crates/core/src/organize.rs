//! Image organization by site section.
//!
//! After [`localize_images`](crate::localize_images) every image lives under
//! a folder named after its page. Sections with a [`TaxonomyRule`] get a
//! tidier layout instead, with files named after the page slug.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Layout, SiteConfig, TaxonomyRule};
use crate::paths::{find_pages, page_section, page_slug};
use crate::Result;

static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img\b[^>]*src="([^"]+)"[^>]*>"#).expect("IMG_SRC regex should compile"));

/// Counters for one organize run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeReport {
    pub pages_updated: usize,
    pub images_moved: usize,
}

fn is_local_image(src: &str) -> bool {
    src.starts_with("/images/") && !src.split('/').any(|segment| segment == "..")
}

fn file_name(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension of the source file name including the dot, or empty.
fn extension(src: &str) -> &str {
    let name = file_name(src);
    name.rfind('.').map_or("", |idx| &name[idx..])
}

fn stem(src: &str) -> &str {
    let name = file_name(src);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn site_file(root: &Path, site_path: &str) -> PathBuf {
    root.join(site_path.trim_start_matches('/'))
}

/// Moves `src` to `dest` unless they are the same file or `dest` exists.
/// Returns whether a file was moved.
fn move_image(src: &Path, dest: &Path) -> Result<bool> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    if src == dest || dest.exists() {
        return Ok(false);
    }
    if !src.exists() {
        warn!(src = %src.display(), "image missing, leaving reference as is");
        return Ok(false);
    }
    fs::rename(src, dest)?;
    debug!(from = %src.display(), to = %dest.display(), "moved image");
    Ok(true)
}

fn retarget(caps: &Captures<'_>, dest: &str) -> String {
    caps[0].replace(&caps[1], dest)
}

/// Applies `rule` to one page's markup, moving image files under `root`.
/// Returns the rewritten markup and the number of files moved, or `None`
/// when the page has no local images.
pub fn organize_page(html: &str, slug: &str, rule: &TaxonomyRule, root: &Path) -> Result<Option<(String, usize)>> {
    let mut local: Vec<&str> = Vec::new();
    for caps in IMG_SRC.captures_iter(html) {
        if let Some(src) = caps.get(1).map(|m| m.as_str())
            && is_local_image(src)
            && !local.contains(&src)
        {
            local.push(src);
        }
    }
    let Some(&first) = local.first() else {
        return Ok(None);
    };

    let folder = rule.folder.trim_matches('/');
    let mut moved = 0;

    let updated = match rule.layout {
        Layout::Single => {
            let dest = format!("/images/{folder}/{slug}{}", extension(first));
            moved += usize::from(move_image(&site_file(root, first), &site_file(root, &dest))?);
            IMG_SRC
                .replace_all(html, |caps: &Captures<'_>| if &caps[1] == first { retarget(caps, &dest) } else { String::new() })
                .into_owned()
        }
        Layout::Collection if local.len() == 1 => {
            let dest = format!("/images/{folder}/{slug}{}", extension(first));
            moved += usize::from(move_image(&site_file(root, first), &site_file(root, &dest))?);
            html.replace(first, &dest)
        }
        Layout::Collection => {
            let mut targets = HashMap::new();
            for src in &local {
                let dest = format!("/images/{folder}/{slug}/{}{}", stem(src), extension(src));
                moved += usize::from(move_image(&site_file(root, src), &site_file(root, &dest))?);
                targets.insert(*src, dest);
            }
            IMG_SRC
                .replace_all(html, |caps: &Captures<'_>| match targets.get(&caps[1]) {
                    Some(dest) => retarget(caps, dest),
                    None => caps[0].to_string(),
                })
                .into_owned()
        }
    };

    Ok(Some((updated, moved)))
}

/// Applies the configured taxonomy rules to every page under the output root.
pub fn organize_images(config: &SiteConfig) -> Result<OrganizeReport> {
    let root = &config.output_root;
    let mut report = OrganizeReport::default();

    if config.taxonomy.is_empty() {
        info!("no taxonomy rules configured");
        return Ok(report);
    }

    for page in find_pages(root)? {
        let section = page_section(&page, root);
        let Some(rule) = config.rule_for(&section) else {
            continue;
        };

        let html = fs::read_to_string(&page)?;
        let slug = page_slug(&page, root);
        if let Some((updated, moved)) = organize_page(&html, &slug, rule, root)? {
            report.images_moved += moved;
            if updated != html {
                fs::write(&page, updated)?;
                report.pages_updated += 1;
                debug!(page = %page.display(), moved, "organized");
            }
        }
    }

    info!(pages_updated = report.pages_updated, images_moved = report.images_moved, "images organized");
    Ok(report)
}
