use anyhow::Result;

use tripdesk::app::App;
use tripdesk::parser::{parse_content_ids, parse_single_id, serialize_php_array};

use super::report_failure;

/// Show the children of every parent ID found in `input`
pub async fn show_children(app: &App, input: &str) -> Result<()> {
    let parents = parse_content_ids(input);
    if parents.is_empty() {
        println!("No valid parent IDs in {input:?}");
        return Ok(());
    }

    for parent_id in parents {
        println!("\nParent {parent_id}");
        println!("----------------");

        let children = match app.relations.try_fetch_children(parent_id).await {
            Ok(children) => children,
            Err(e) => {
                report_failure(&format!("GET children of {parent_id}"), &e);
                continue;
            }
        };

        println!("{}", serde_json::to_string_pretty(&children)?);

        let ids: Vec<String> = children
            .iter()
            .filter_map(|c| c.child_id())
            .map(|id| id.to_string())
            .collect();

        if ids.is_empty() {
            println!("No valid child IDs");
        } else {
            println!("Child IDs: {}", ids.join(", "));
            println!("{}", serialize_php_array(&ids));
        }
    }

    Ok(())
}

/// Add every child ID found in `children` to `parent`
pub async fn add_children(app: &App, parent: &str, children: &str) -> Result<()> {
    let Some(parent_id) = parse_single_id(parent) else {
        println!("Invalid parent ID: {parent:?}");
        return Ok(());
    };

    let child_ids = parse_content_ids(children);
    if child_ids.is_empty() {
        println!("No valid child IDs in {children:?}");
        return Ok(());
    }

    let report = app.relations.add_children(parent_id, &child_ids).await;
    let mark = if report.all_succeeded() { "✓" } else { "✗" };
    println!("{mark} {}", report.summary());

    for (child_id, msg) in report.failed() {
        println!("  {child_id}: {msg}");
    }

    Ok(())
}

/// Attach an existing child to a parent
pub async fn link_to_parent(app: &App, child: &str, parent: &str) -> Result<()> {
    let (Some(child_id), Some(parent_id)) = (parse_single_id(child), parse_single_id(parent)) else {
        println!("Both IDs must be numeric (child {child:?}, parent {parent:?})");
        return Ok(());
    };

    match app.relations.link_to_parent(child_id, parent_id).await {
        Ok(()) => println!("✓ linked {child_id} to {parent_id}"),
        Err(e) => report_failure(&format!("link {child_id} to {parent_id}"), &e),
    }

    Ok(())
}

/// Call the bare relation endpoint and show the answer
pub async fn ping(app: &App) -> Result<()> {
    println!("GET {}", app.relations.endpoint());

    match app.relations.ping().await {
        Ok(response) => {
            let mark = if response.is_success() { "✓" } else { "✗" };
            println!("{mark} HTTP {}", response.status);
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
        Err(e) => report_failure("ping relation endpoint", &e),
    }

    Ok(())
}
