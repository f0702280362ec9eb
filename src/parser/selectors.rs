//! CSS selectors for the known search results markup shapes
//!
//! The results page is an external, unversioned HTML contract. Each shape the
//! tool has had to deal with gets its own selector set here.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Current organic result: <div class="yuRUbf"><a href=..><h3>..</h3></a></div>
    static ref MODERN_ANCHOR: Selector = parse_selector!("div.yuRUbf > a[href]");

    // Result blocks, newest first
    static ref CONTAINER_BLOCKS: Vec<Selector> = vec![
        parse_selector!("div#search div.MjjYud"),
        parse_selector!("div#search div.g"),
    ];

    // Legacy redirect-wrapped anchors: /url?q=<target>&sa=U&...
    static ref REDIRECT_ANCHOR: Selector = parse_selector!("a[href^='/url?']");

    static ref ANCHOR: Selector = parse_selector!("a[href]");

    static ref TITLE: Vec<Selector> = vec![
        parse_selector!("h3"),
        parse_selector!("div[role='heading']"),
        parse_selector!("span"),
    ];
}

/// Selectors for the current markup shape
pub struct ModernSelectors {
    pub anchor: &'static Selector,
    pub title: &'static [Selector],
}

impl ModernSelectors {
    pub fn new() -> Self {
        Self {
            anchor: &MODERN_ANCHOR,
            title: &TITLE,
        }
    }
}

impl Default for ModernSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors for result-block markup (first link inside each block)
pub struct ContainerSelectors {
    pub blocks: &'static [Selector],
    pub anchor: &'static Selector,
    pub title: &'static [Selector],
}

impl ContainerSelectors {
    pub fn new() -> Self {
        Self {
            blocks: &CONTAINER_BLOCKS,
            anchor: &ANCHOR,
            title: &TITLE,
        }
    }
}

impl Default for ContainerSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors for legacy redirect-wrapped results
pub struct RedirectSelectors {
    pub anchor: &'static Selector,
    pub title: &'static [Selector],
}

impl RedirectSelectors {
    pub fn new() -> Self {
        Self {
            anchor: &REDIRECT_ANCHOR,
            title: &TITLE,
        }
    }
}

impl Default for RedirectSelectors {
    fn default() -> Self {
        Self::new()
    }
}
