//! Site configuration.
//!
//! A [`SiteConfig`] describes the source site and the shape of the
//! regenerated one. It is usually loaded from a TOML file:
//!
//! ```toml
//! base_url = "https://www.example.com"
//! output_root = "site"
//! site_name = "Example"
//! triggers = ["id=mainContent", "data-content-field=main-content"]
//!
//! [[nav]]
//! label = "Work"
//! href = "/"
//!
//! [[taxonomy]]
//! section = "alcohol"
//! layout = "single"
//! folder = "alcohol"
//! ```
//!
//! Every field except `base_url` has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::capture::AttrMatch;
use crate::fetch::FetchConfig;
use crate::{Result, SitecarveError};

/// File name looked up by [`SiteConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "sitecarve.toml";

/// Trigger specifications used when none are configured.
pub const DEFAULT_TRIGGERS: &[&str] = &["id=mainContent", "data-content-field=main-content"];

/// A link in the regenerated site header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// How images of a page section are laid out under `images/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One image per page, named after the page; other images are dropped.
    Single,
    /// A lone image is named after the page; several go into a folder named
    /// after the page.
    Collection,
}

/// Image layout for pages under one top-level section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxonomyRule {
    pub section: String,
    pub layout: Layout,
    /// Directory under `images/` receiving this section's images.
    pub folder: String,
}

/// Configuration for scraping one site and regenerating its pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Origin of the source site, without trailing slash.
    pub base_url: String,
    /// Sitemap location; defaults to `{base_url}/sitemap.xml`.
    #[serde(default)]
    pub sitemap_url: Option<String>,
    /// Directory the regenerated site is written to.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Used in the header brand and as the fallback page title.
    #[serde(default)]
    pub site_name: String,
    /// Attribute matches marking the content region, tried in order.
    #[serde(default = "default_trigger_specs")]
    pub triggers: Vec<String>,
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    #[serde(default = "default_script")]
    pub script: String,
    #[serde(default)]
    pub nav: Vec<NavLink>,
    #[serde(default)]
    pub taxonomy: Vec<TaxonomyRule>,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_trigger_specs() -> Vec<String> {
    DEFAULT_TRIGGERS.iter().map(|spec| spec.to_string()).collect()
}

fn default_stylesheet() -> String {
    "/assets/css/site.css".to_string()
}

fn default_script() -> String {
    "/assets/js/site.js".to_string()
}

impl SiteConfig {
    /// Creates a configuration for `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sitemap_url: None,
            output_root: default_output_root(),
            site_name: String::new(),
            triggers: default_trigger_specs(),
            stylesheet: default_stylesheet(),
            script: default_script(),
            nav: Vec::new(),
            taxonomy: Vec::new(),
            fetch: FetchConfig::default(),
        }
    }

    /// Creates a builder for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> SiteConfigBuilder {
        SiteConfigBuilder { config: Self::new(base_url) }
    }

    /// Parses and validates TOML configuration text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validated()
    }

    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SitecarveError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Looks for `sitecarve.toml` in the working directory, then in the user
    /// configuration directory (`~/.config/sitecarve/` on Linux).
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        let user = dirs::config_dir()?.join("sitecarve").join(CONFIG_FILE_NAME);
        user.exists().then_some(user)
    }

    /// Normalizes `base_url` and checks that URLs and triggers are usable.
    pub fn validated(mut self) -> Result<Self> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&self.base_url)
            .map_err(|e| SitecarveError::ConfigError(format!("base_url '{}': {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SitecarveError::ConfigError(format!(
                "base_url must be http or https, got '{}'",
                self.base_url
            )));
        }

        if let Some(sitemap) = &self.sitemap_url {
            Url::parse(sitemap).map_err(|e| SitecarveError::ConfigError(format!("sitemap_url '{}': {}", sitemap, e)))?;
        }

        if self.triggers.is_empty() {
            return Err(SitecarveError::ConfigError("at least one trigger is required".to_string()));
        }
        self.trigger_matches()?;

        if self.site_name.is_empty() {
            self.site_name = parsed.host_str().unwrap_or_default().to_string();
        }

        Ok(self)
    }

    pub fn sitemap_url(&self) -> String {
        self.sitemap_url.clone().unwrap_or_else(|| format!("{}/sitemap.xml", self.base_url))
    }

    /// Parses the trigger specifications.
    pub fn trigger_matches(&self) -> Result<Vec<AttrMatch>> {
        self.triggers.iter().map(|spec| spec.parse()).collect()
    }

    /// The taxonomy rule for a page section, if any.
    pub fn rule_for(&self, section: &str) -> Option<&TaxonomyRule> {
        self.taxonomy.iter().find(|rule| rule.section == section)
    }

    pub fn images_root(&self) -> PathBuf {
        self.output_root.join("images")
    }
}

/// Fluent construction of a [`SiteConfig`].
///
/// ```rust
/// use sitecarve_core::SiteConfig;
///
/// let config = SiteConfig::builder("https://example.com/")
///     .site_name("Example")
///     .output_root("out")
///     .trigger("id=content")
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "https://example.com");
/// assert_eq!(config.triggers, vec!["id=content"]);
/// ```
#[derive(Debug, Clone)]
pub struct SiteConfigBuilder {
    config: SiteConfig,
}

impl SiteConfigBuilder {
    pub fn sitemap_url(mut self, value: impl Into<String>) -> Self {
        self.config.sitemap_url = Some(value.into());
        self
    }

    pub fn output_root(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.output_root = value.into();
        self
    }

    pub fn site_name(mut self, value: impl Into<String>) -> Self {
        self.config.site_name = value.into();
        self
    }

    /// Replaces the default triggers with `value` on first use, then appends.
    pub fn trigger(mut self, value: impl Into<String>) -> Self {
        if self.config.triggers == default_trigger_specs() {
            self.config.triggers.clear();
        }
        self.config.triggers.push(value.into());
        self
    }

    pub fn nav(mut self, label: impl Into<String>, href: impl Into<String>) -> Self {
        self.config.nav.push(NavLink { label: label.into(), href: href.into() });
        self
    }

    pub fn taxonomy(mut self, section: impl Into<String>, layout: Layout, folder: impl Into<String>) -> Self {
        self.config.taxonomy.push(TaxonomyRule { section: section.into(), layout, folder: folder.into() });
        self
    }

    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.config.fetch = fetch;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<SiteConfig> {
        self.config.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::new("https://example.com").validated().unwrap();
        assert_eq!(config.sitemap_url(), "https://example.com/sitemap.xml");
        assert_eq!(config.site_name, "example.com");
        assert_eq!(config.trigger_matches().unwrap().len(), 2);
        assert_eq!(config.triggers, DEFAULT_TRIGGERS);
        assert_eq!(config.images_root(), PathBuf::from("./images"));
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
            base_url = "https://www.example.com/"
            site_name = "Example"
            output_root = "out"
            triggers = ["id=content"]

            [[nav]]
            label = "Work"
            href = "/"

            [[taxonomy]]
            section = "my-collection-of-things"
            layout = "collection"
            folder = "mycollectionofthings"

            [fetch]
            timeout = 5
            user_agent = "test-agent"
        "#;
        let config = SiteConfig::from_toml(text).unwrap();
        assert_eq!(config.base_url, "https://www.example.com");
        assert_eq!(config.output_root, PathBuf::from("out"));
        assert_eq!(config.nav, vec![NavLink { label: "Work".to_string(), href: "/".to_string() }]);
        assert_eq!(config.rule_for("my-collection-of-things").unwrap().layout, Layout::Collection);
        assert!(config.rule_for("alcohol").is_none());
        assert_eq!(config.fetch.timeout, 5);
        assert_eq!(config.fetch.user_agent, "test-agent");
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_urls() {
        assert!(matches!(
            SiteConfig::from_toml("base_url = \"https://a.com\"\nbogus = 1"),
            Err(SitecarveError::ConfigParseError(_))
        ));
        assert!(matches!(SiteConfig::from_toml("base_url = \"not a url\""), Err(SitecarveError::ConfigError(_))));
        assert!(matches!(SiteConfig::from_toml("base_url = \"ftp://a.com\""), Err(SitecarveError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_bad_triggers() {
        let result = SiteConfig::builder("https://a.com").trigger("mainContent").build();
        assert!(matches!(result, Err(SitecarveError::InvalidTrigger(_))));
    }

    #[test]
    fn test_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "base_url = \"https://a.com\"").unwrap();
        assert_eq!(SiteConfig::from_file(&path).unwrap().base_url, "https://a.com");

        let missing = tmp.path().join("missing.toml");
        assert!(matches!(SiteConfig::from_file(&missing), Err(SitecarveError::FileNotFound(_))));
    }
}
