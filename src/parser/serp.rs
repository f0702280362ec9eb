//! Search results page link extraction
//!
//! Each known markup shape is an [`ExtractionStrategy`]. The
//! [`ResultExtractor`] either detects the shape from the document or uses the
//! one pinned in configuration, then filters and caps the links.
//!
//! A page that yields nothing is returned as an empty list. Nothing here can
//! tell "no results" apart from "the markup changed again"; the detected
//! format is logged at debug level to help with the latter.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::parser::selectors::{ContainerSelectors, ModernSelectors, RedirectSelectors};
use crate::utils::{extract_domain, normalize_whitespace};

/// Known results page markup shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerpFormat {
    /// Detect from the document
    #[default]
    Auto,
    /// `div.yuRUbf > a`
    Modern,
    /// Result blocks (`div.MjjYud`, `div.g`)
    Container,
    /// `/url?q=<target>` wrapped anchors
    Redirect,
    /// Nothing recognisable; a detection result, never a setting
    #[serde(skip)]
    Unknown,
}

impl fmt::Display for SerpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerpFormat::Auto => write!(f, "auto"),
            SerpFormat::Modern => write!(f, "modern"),
            SerpFormat::Container => write!(f, "container"),
            SerpFormat::Redirect => write!(f, "redirect"),
            SerpFormat::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for SerpFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "modern" => Ok(Self::Modern),
            "container" => Ok(Self::Container),
            "redirect" => Ok(Self::Redirect),
            other => Err(format!("unknown results format: {other}")),
        }
    }
}

/// A result link with its title, when the markup carries one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub link: String,
    pub title: Option<String>,
}

/// One markup shape
pub trait ExtractionStrategy: Send + Sync {
    /// Shape handled by this strategy
    fn format(&self) -> SerpFormat;

    /// Whether the document looks like this shape
    fn matches(&self, doc: &Html) -> bool;

    /// Raw `(href, title)` pairs in document order, before filtering
    fn candidates(&self, doc: &Html) -> Vec<(String, Option<String>)>;
}

/// Current organic result markup
#[derive(Default)]
pub struct ModernStrategy {
    selectors: ModernSelectors,
}

impl ExtractionStrategy for ModernStrategy {
    fn format(&self) -> SerpFormat {
        SerpFormat::Modern
    }

    fn matches(&self, doc: &Html) -> bool {
        doc.select(self.selectors.anchor).next().is_some()
    }

    fn candidates(&self, doc: &Html) -> Vec<(String, Option<String>)> {
        doc.select(self.selectors.anchor)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some((href.to_string(), first_text(&a, self.selectors.title)))
            })
            .collect()
    }
}

/// First link inside each result block
#[derive(Default)]
pub struct ContainerStrategy {
    selectors: ContainerSelectors,
}

impl ContainerStrategy {
    fn blocks<'a>(&self, doc: &'a Html) -> Option<Vec<ElementRef<'a>>> {
        self.selectors
            .blocks
            .iter()
            .map(|sel| doc.select(sel).collect::<Vec<_>>())
            .find(|blocks| !blocks.is_empty())
    }
}

impl ExtractionStrategy for ContainerStrategy {
    fn format(&self) -> SerpFormat {
        SerpFormat::Container
    }

    fn matches(&self, doc: &Html) -> bool {
        self.blocks(doc).is_some()
    }

    fn candidates(&self, doc: &Html) -> Vec<(String, Option<String>)> {
        let Some(blocks) = self.blocks(doc) else {
            return Vec::new();
        };

        blocks
            .iter()
            .filter_map(|block| {
                let a = block.select(self.selectors.anchor).next()?;
                let href = a.value().attr("href")?;
                let title = first_text(&a, self.selectors.title)
                    .or_else(|| first_text(block, self.selectors.title));
                Some((href.to_string(), title))
            })
            .collect()
    }
}

/// Legacy `/url?q=` wrapped anchors
#[derive(Default)]
pub struct RedirectStrategy {
    selectors: RedirectSelectors,
}

impl ExtractionStrategy for RedirectStrategy {
    fn format(&self) -> SerpFormat {
        SerpFormat::Redirect
    }

    fn matches(&self, doc: &Html) -> bool {
        doc.select(self.selectors.anchor)
            .filter_map(|a| a.value().attr("href"))
            .any(|href| unwrap_redirect(href).is_some())
    }

    fn candidates(&self, doc: &Html) -> Vec<(String, Option<String>)> {
        doc.select(self.selectors.anchor)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some((href.to_string(), first_text(&a, self.selectors.title)))
            })
            .collect()
    }
}

/// Extracts result links from a results page
pub struct ResultExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    pinned: SerpFormat,
}

impl ResultExtractor {
    /// Extractor that auto-detects among all known shapes
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(ModernStrategy::default()),
                Box::new(ContainerStrategy::default()),
                Box::new(RedirectStrategy::default()),
            ],
            pinned: SerpFormat::Auto,
        }
    }

    /// Always use `format` (or detect, for [`SerpFormat::Auto`])
    pub fn with_format(mut self, format: SerpFormat) -> Self {
        self.pinned = format;
        self
    }

    /// Register an additional shape; detection tries it last
    pub fn with_strategy(mut self, strategy: Box<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Detect which registered shape the document uses
    pub fn detect(&self, html: &str) -> SerpFormat {
        let doc = Html::parse_document(html);
        self.select_strategy(&doc)
            .map(|s| s.format())
            .unwrap_or(SerpFormat::Unknown)
    }

    fn select_strategy(&self, doc: &Html) -> Option<&dyn ExtractionStrategy> {
        match self.pinned {
            SerpFormat::Auto => self
                .strategies
                .iter()
                .find(|s| s.matches(doc))
                .map(|s| &**s),
            pinned => self
                .strategies
                .iter()
                .find(|s| s.format() == pinned)
                .map(|s| &**s),
        }
    }

    /// Up to `max` result links in document order
    ///
    /// Non-http links and links back to the search engine (its own domain,
    /// the cache mirror, the accounts subdomain) are skipped.
    pub fn extract(&self, html: &str, max: usize) -> Vec<ExtractedLink> {
        if max == 0 {
            return Vec::new();
        }

        let doc = Html::parse_document(html);
        let Some(strategy) = self.select_strategy(&doc) else {
            tracing::debug!("No known results markup found");
            return Vec::new();
        };

        let links: Vec<ExtractedLink> = strategy
            .candidates(&doc)
            .into_iter()
            .filter_map(|(href, title)| {
                let link = normalize_href(&href)?;
                if is_engine_link(&link) {
                    tracing::trace!(link = %link, "Skipping search engine link");
                    return None;
                }
                Some(ExtractedLink { link, title })
            })
            .take(max)
            .collect();

        tracing::debug!(
            format = %strategy.format(),
            count = links.len(),
            "Extracted result links"
        );

        links
    }
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the markup shape with the default strategy set
pub fn detect_format(html: &str) -> SerpFormat {
    ResultExtractor::new().detect(html)
}

/// Recover the target of a `/url?q=<target>&...` redirect wrapper
pub fn unwrap_redirect(href: &str) -> Option<String> {
    if !href.starts_with("/url?") {
        return None;
    }

    let wrapped = Url::parse(&format!("https://www.google.com{href}")).ok()?;
    wrapped
        .query_pairs()
        .find(|(k, v)| (k == "q" || k == "url") && !v.is_empty())
        .map(|(_, v)| v.into_owned())
        .filter(|target| target.starts_with("http://") || target.starts_with("https://"))
}

/// Absolute http(s) link for an anchor href, unwrapping redirects
pub fn normalize_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.starts_with("/url?") {
        return unwrap_redirect(href);
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    None
}

/// Whether `link` points back to the search engine itself
pub fn is_engine_link(link: &str) -> bool {
    let Ok(host) = extract_domain(link) else {
        return true;
    };
    let host = host.to_ascii_lowercase();

    host == "googleusercontent.com"
        || host.ends_with(".googleusercontent.com")
        || host.split('.').any(|label| label == "google")
}

fn first_text(element: &ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|sel| element.select(sel).next())
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
}
