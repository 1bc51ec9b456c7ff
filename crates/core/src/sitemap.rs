//! Sitemap parsing.
//!
//! Reads `urlset/url/loc` entries from a standard sitemap document using an
//! XPath query bound to the sitemaps.org namespace.

use sxd_document::parser;
use sxd_xpath::{Context, Factory, Value};

use crate::{Result, SitecarveError};

/// Namespace of the sitemaps.org 0.9 schema.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const LOC_XPATH: &str = "/sm:urlset/sm:url/sm:loc";

/// Returns every non-empty `<loc>` in document order, trimmed.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>> {
    let xpath = Factory::new()
        .build(LOC_XPATH)
        .map_err(|e| SitecarveError::SitemapError(format!("invalid XPath '{}': {}", LOC_XPATH, e)))?
        .ok_or_else(|| SitecarveError::SitemapError(format!("empty XPath '{}'", LOC_XPATH)))?;

    let package = parser::parse(xml).map_err(|e| SitecarveError::SitemapError(format!("malformed XML: {}", e)))?;
    let document = package.as_document();

    let mut context = Context::new();
    context.set_namespace("sm", SITEMAP_NAMESPACE);

    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| SitecarveError::SitemapError(e.to_string()))?;

    let locs = match value {
        Value::Nodeset(nodes) => nodes
            .document_order()
            .into_iter()
            .map(|node| node.string_value().trim().to_string())
            .filter(|loc| !loc.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Ok(locs)
}

/// Returns the sitemap's URLs with `base_url` first, inserting it when the
/// sitemap does not already list it, with or without a trailing slash.
pub fn site_urls(xml: &str, base_url: &str) -> Result<Vec<String>> {
    let mut urls = parse_sitemap(xml)?;
    let base = base_url.trim_end_matches('/');
    if !urls.iter().any(|url| url.trim_end_matches('/') == base) {
        urls.insert(0, base_url.to_string());
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://www.example.com/work</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>
    https://www.example.com/writing/first-post
  </loc></url>
  <url><loc></loc></url>
  <url><loc>https://www.example.com/info/</loc></url>
</urlset>"#;

    #[test]
    fn test_parse_sitemap_in_document_order() {
        let locs = parse_sitemap(SITEMAP).unwrap();
        assert_eq!(
            locs,
            vec![
                "https://www.example.com/work",
                "https://www.example.com/writing/first-post",
                "https://www.example.com/info/",
            ]
        );
    }

    #[test]
    fn test_site_urls_prepends_base() {
        let urls = site_urls(SITEMAP, "https://www.example.com").unwrap();
        assert_eq!(urls[0], "https://www.example.com");
        assert_eq!(urls.len(), 4);
    }

    #[test]
    fn test_site_urls_keeps_listed_base() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://a.com/x</loc></url><url><loc>https://a.com</loc></url></urlset>"#;
        let urls = site_urls(xml, "https://a.com").unwrap();
        assert_eq!(urls, vec!["https://a.com/x", "https://a.com"]);
    }

    #[test]
    fn test_site_urls_matches_base_with_trailing_slash() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://a.com/</loc></url><url><loc>https://a.com/x</loc></url></urlset>"#;
        assert_eq!(site_urls(xml, "https://a.com").unwrap(), vec!["https://a.com/", "https://a.com/x"]);
        assert_eq!(site_urls(xml, "https://a.com/").unwrap().len(), 2);
    }

    #[test]
    fn test_wrong_namespace_yields_nothing() {
        let xml = "<urlset><url><loc>https://a.com/x</loc></url></urlset>";
        assert!(parse_sitemap(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(parse_sitemap("<urlset><url>"), Err(SitecarveError::SitemapError(_))));
    }
}
