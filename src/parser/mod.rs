//! Parsing of operator input and search results pages
//!
//! - [`ids`] turns free-text ID lists into identifiers
//! - [`serp`] extracts result links from search results HTML
//! - [`selectors`] holds the CSS selectors for each known markup shape

pub mod ids;
pub mod selectors;
pub mod serp;

pub use ids::{parse_content_ids, parse_ids, parse_single_id, serialize_php_array};
pub use serp::{detect_format, ExtractedLink, ExtractionStrategy, ResultExtractor, SerpFormat};
