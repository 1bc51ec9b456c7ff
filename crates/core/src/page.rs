//! Standalone page assembly around an extracted fragment.
//!
//! Pulls the few head fields worth carrying over (title, meta description)
//! out of the source document, cleans the fragment, and wraps it in the
//! regenerated site's document shell.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::SiteConfig;
use crate::serialize::escape_attribute;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("TITLE regex should compile"));
static META_DESCRIPTION_DQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name="description"[^>]+content="([^"]*)""#).expect("META_DESCRIPTION_DQ regex should compile")
});
static META_DESCRIPTION_SQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<meta[^>]+name='description'[^>]+content='([^']*)'").expect("META_DESCRIPTION_SQ regex should compile")
});
static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("SCRIPT regex should compile"));

/// Head fields carried from the source page into the regenerated one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
}

impl PageMeta {
    pub fn from_html(html: &str) -> Self {
        Self { title: extract_title(html), description: extract_meta_description(html) }
    }
}

/// Content of the first `<title>` element, trimmed; empty when absent.
pub fn extract_title(html: &str) -> String {
    TITLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// `content` of `<meta name="description">`, with double or single quotes.
pub fn extract_meta_description(html: &str) -> String {
    [&*META_DESCRIPTION_DQ, &*META_DESCRIPTION_SQ]
        .iter()
        .find_map(|re| re.captures(html).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Removes `<script>` elements and makes links to the source site
/// root-relative by stripping its origin.
pub fn clean_content(content: &str, base_url: &str) -> String {
    let mut cleaned = SCRIPT.replace_all(content, "").into_owned();

    for origin in origin_variants(base_url) {
        cleaned = cleaned.replace(&origin, "");
    }

    cleaned.trim().to_string()
}

/// The http and https spellings of `base_url`, without trailing slash.
fn origin_variants(base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        return Vec::new();
    }
    match base.split_once("://") {
        Some((_, rest)) if !rest.is_empty() => vec![format!("https://{rest}"), format!("http://{rest}")],
        _ => vec![base.to_string()],
    }
}

/// Renders the full HTML document for one regenerated page.
///
/// `title` and `description` are inserted as found in the source markup;
/// `content` is embedded verbatim.
pub fn build_page(config: &SiteConfig, meta: &PageMeta, content: &str, url_path: &str) -> String {
    let title = if meta.title.is_empty() { config.site_name.as_str() } else { meta.title.as_str() };

    let mut nav = String::new();
    for link in &config.nav {
        let _ = writeln!(nav, "        <a href=\"{}\">{}</a>", escape_attribute(&link.href), link.label);
    }

    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <link rel="canonical" href="{base}{url_path}">
    <link rel="stylesheet" href="{stylesheet}">
  </head>
  <body>
    <header class="site-header">
      <div class="site-brand"><a href="/">{site_name}</a></div>
      <nav class="site-nav">
{nav}      </nav>
    </header>
    <main class="site-content">
{content}
    </main>
    <div class="lightbox" hidden>
      <button class="lightbox-close" aria-label="Close">&times;</button>
      <img class="lightbox-image" alt="">
    </div>
    <script src="{script}"></script>
  </body>
</html>
"#,
        description = meta.description,
        base = config.base_url,
        stylesheet = config.stylesheet,
        site_name = config.site_name,
        script = config.script,
    )
}
