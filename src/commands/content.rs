use anyhow::Result;
use serde_json::Value;

use tripdesk::app::App;
use tripdesk::models::NewContent;
use tripdesk::utils::{split_key_value, truncate_text};

use super::report_failure;

/// List one page of `content_type` items
pub async fn list_content(
    app: &App,
    content_type: &str,
    filters: &[String],
    per_page: Option<u32>,
) -> Result<()> {
    let mut query = app.content.default_query();
    if let Some(per_page) = per_page {
        query.per_page = per_page;
    }
    for pair in filters {
        match split_key_value(pair) {
            Some((key, value)) => query = query.filter(key, value),
            None => {
                println!("Ignoring filter {pair:?} (expected key=value)");
            }
        }
    }

    let items = match app.content.list(content_type, &query).await {
        Ok(items) => items,
        Err(e) => {
            report_failure(&format!("list {content_type}"), &e);
            return Ok(());
        }
    };

    if items.is_empty() {
        println!("No {content_type} items");
        return Ok(());
    }

    println!("{:>7}  {:<9}  {:<50}  link", "id", "status", "title");
    for item in &items {
        println!(
            "{:>7}  {:<9}  {:<50}  {}",
            item.id,
            item.status.as_deref().unwrap_or("-"),
            truncate_text(item.title_text(), 50),
            item.link.as_deref().unwrap_or("")
        );
    }
    println!("\n{} item(s)", items.len());

    Ok(())
}

/// Create a `content_type` item with extra `key=value` fields
///
/// Field values that parse as JSON are sent as JSON, anything else as a
/// string.
pub async fn create_content(
    app: &App,
    content_type: &str,
    title: &str,
    status: &str,
    fields: &[String],
) -> Result<()> {
    let mut item = NewContent::new(title, status);
    for pair in fields {
        let Some((key, value)) = split_key_value(pair) else {
            println!("Ignoring field {pair:?} (expected key=value)");
            continue;
        };
        let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
        item = item.with_field(key, value);
    }

    match app.content.create(content_type, &item).await {
        Ok(created) => {
            println!("✓ created {content_type} {} ({})", created.id, created.title_text());
            if let Some(link) = &created.link {
                println!("  {link}");
            }
        }
        Err(e) => report_failure(&format!("create {content_type}"), &e),
    }

    Ok(())
}
