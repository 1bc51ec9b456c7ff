pub mod capture;
pub mod config;
pub mod entities;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod images;
pub mod organize;
pub mod page;
pub mod paths;
pub mod scrape;
pub mod serialize;
pub mod sitemap;
pub mod token;
pub mod tokenizer;

pub use capture::{AttrMatch, Capture, CaptureState, Trigger};
pub use config::{CONFIG_FILE_NAME, DEFAULT_TRIGGERS, Layout, NavLink, SiteConfig, SiteConfigBuilder, TaxonomyRule};
#[doc(hidden)]
pub use entities::decode_attribute_value;
pub use error::{Result, SitecarveError};
pub use extract::{Region, extract_fragment, extract_region};
pub use fetch::{DEFAULT_USER_AGENT, FetchConfig, Fetcher, fetch_file, fetch_stdin};
#[cfg(feature = "fetch")]
pub use fetch::{HttpFetcher, fetch_url};
pub use images::{ImageReport, filename_from_url, hashed_filename, localize_images, localize_page, safe_name};
pub use organize::{OrganizeReport, organize_images, organize_page};
pub use page::{PageMeta, build_page, clean_content, extract_meta_description, extract_title};
pub use paths::{PagePath, find_pages, page_folder, page_section, page_slug, url_to_path};
pub use scrape::{Batch, ScrapeOptions, ScrapeReport, scrape_site};
pub use serialize::{escape_attribute, serialize};
pub use sitemap::{SITEMAP_NAMESPACE, parse_sitemap, site_urls};
pub use token::{Attribute, Token, VOID_ELEMENTS, is_void_element};
pub use tokenizer::{Tokenizer, tokenize};
