pub mod content;
pub mod relations;
pub mod scrape;
pub mod shell;

pub use content::{create_content, list_content};
pub use relations::{add_children, link_to_parent, ping, show_children};
pub use scrape::{scrape, ScrapeOptions};
pub use shell::shell;

use tripdesk::error::Error;

/// Print a failed action for the operator; the process keeps going
pub(crate) fn report_failure(action: &str, err: &Error) {
    tracing::debug!(action, category = %err.category(), error = %err, "Action failed");
    println!("✗ {action}: {}", err.user_message());
}
