//! Mapping between source URLs and files of the regenerated site.
//!
//! Every page becomes a directory with an `index.html`, so `/writing/post`
//! is written to `<root>/writing/post/index.html` and served at the same path.

use std::path::{Component, Path, PathBuf};

use crate::Result;

/// Where one source page is written, and the path it is served at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
    pub file: PathBuf,
    /// Site-relative URL path, `/` for the home page.
    pub url_path: String,
}

/// Maps a page URL to its output file under `output_root`.
///
/// Returns `None` for URLs outside `base_url`.
///
/// ```rust
/// use std::path::Path;
/// use sitecarve_core::url_to_path;
///
/// let page = url_to_path("https://a.com/writing/post/", "https://a.com", Path::new("site")).unwrap();
/// assert_eq!(page.file, Path::new("site/writing/post/index.html"));
/// assert_eq!(page.url_path, "/writing/post");
/// ```
pub fn url_to_path(url: &str, base_url: &str, output_root: &Path) -> Option<PagePath> {
    let base = base_url.trim_end_matches('/');
    let path = url.strip_prefix(base)?;

    if path.is_empty() || path == "/" {
        return Some(PagePath { file: output_root.join("index.html"), url_path: "/".to_string() });
    }
    if !path.starts_with('/') {
        return None;
    }

    let path = path.strip_suffix('/').unwrap_or(path);
    let relative = path.trim_start_matches('/');
    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }

    Some(PagePath { file: output_root.join(relative).join("index.html"), url_path: path.to_string() })
}

fn relative_dirs(page: &Path, root: &Path) -> Vec<String> {
    let relative = page.strip_prefix(root).unwrap_or(page);
    let mut dirs: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    dirs.pop();
    dirs
}

/// Folder name for a page's downloaded images: `home` for the root page,
/// otherwise its directory components joined with `-`.
pub fn page_folder(page: &Path, root: &Path) -> String {
    let dirs = relative_dirs(page, root);
    if dirs.is_empty() { "home".to_string() } else { dirs.join("-") }
}

/// The page's own directory name, `home` for the root page.
pub fn page_slug(page: &Path, root: &Path) -> String {
    relative_dirs(page, root).pop().unwrap_or_else(|| "home".to_string())
}

/// The page's top-level directory, `home` for the root page.
pub fn page_section(page: &Path, root: &Path) -> String {
    relative_dirs(page, root).into_iter().next().unwrap_or_else(|| "home".to_string())
}

/// Every `index.html` below `root`, sorted, skipping `.git` directories.
pub fn find_pages(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/index.html", glob::Pattern::escape(&root.to_string_lossy()));

    let mut pages = Vec::new();
    for entry in glob::glob(&pattern)? {
        let page = entry?;
        if page.components().any(|c| c.as_os_str() == ".git") {
            continue;
        }
        pages.push(page);
    }
    pages.sort();
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.example.com";

    #[test]
    fn test_home_page() {
        let root = Path::new("out");
        for url in [BASE, "https://www.example.com/"] {
            let page = url_to_path(url, BASE, root).unwrap();
            assert_eq!(page.file, root.join("index.html"));
            assert_eq!(page.url_path, "/");
        }
    }

    #[test]
    fn test_nested_page() {
        let page = url_to_path("https://www.example.com/alcohol/old-fashioned", BASE, Path::new("out")).unwrap();
        assert_eq!(page.file, Path::new("out/alcohol/old-fashioned/index.html"));
        assert_eq!(page.url_path, "/alcohol/old-fashioned");
    }

    #[test]
    fn test_outside_base() {
        assert!(url_to_path("https://other.com/x", BASE, Path::new("out")).is_none());
        assert!(url_to_path("https://www.example.com.evil.net/x", BASE, Path::new("out")).is_none());
        assert!(url_to_path("https://www.example.com/../etc", BASE, Path::new("out")).is_none());
    }

    #[test]
    fn test_page_folder_slug_section() {
        let root = Path::new("/site");
        let home = Path::new("/site/index.html");
        let nested = Path::new("/site/my-collection-of-things/lamp/index.html");

        assert_eq!(page_folder(home, root), "home");
        assert_eq!(page_slug(home, root), "home");
        assert_eq!(page_section(home, root), "home");

        assert_eq!(page_folder(nested, root), "my-collection-of-things-lamp");
        assert_eq!(page_slug(nested, root), "lamp");
        assert_eq!(page_section(nested, root), "my-collection-of-things");
    }

    #[test]
    fn test_find_pages() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        for dir in ["", "work", "work/lamp", ".git/x"] {
            std::fs::create_dir_all(root.join(dir)).unwrap();
            std::fs::write(root.join(dir).join("index.html"), "").unwrap();
        }
        std::fs::write(root.join("work/other.html"), "").unwrap();

        let pages = find_pages(root).unwrap();
        assert_eq!(
            pages,
            vec![root.join("index.html"), root.join("work/index.html"), root.join("work/lamp/index.html")]
        );
    }
}
