//! tripdesk - back-office helper for a travel WordPress site
//!
//! Two jobs, run by an operator from the command line:
//!
//! - manage JetEngine relations between accommodations and their reviews
//!   (list children, bulk-add children, link a child to a parent)
//! - harvest the top search results for a keyword into a deduplicated CSV
//!   file, optionally publishing them as linked content items
//!
//! # Architecture
//!
//! - [`config`] - Settings from TOML and environment
//! - [`wp`] - WordPress REST clients (relations, content)
//! - [`crawler`] - Search page fetching and the [`crawler::Harvester`]
//! - [`parser`] - ID list parsing and result extraction
//! - [`storage`] - CSV sink and dedup buffer
//! - [`models`] - Core data structures
//! - [`app`] - Client wiring
//!
//! # Example
//!
//! ```no_run
//! use tripdesk::app::App;
//! use tripdesk::config::Config;
//! use tripdesk::models::ContentId;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let app = App::from_config(&config)?;
//!     let report = app
//!         .relations
//!         .add_children(ContentId(671), &[ContentId(886), ContentId(887)])
//!         .await;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;
pub mod wp;
