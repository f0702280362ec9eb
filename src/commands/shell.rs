use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use tripdesk::app::App;
use tripdesk::models::ContentId;
use tripdesk::parser::{parse_single_id, SerpFormat};

use super::{
    add_children, create_content, link_to_parent, list_content, ping, scrape, show_children,
    ScrapeOptions,
};

type Input = Lines<BufReader<Stdin>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Module {
    Relations,
    Scraping,
    Content,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ShowChildren,
    AddChildren,
    Link,
    Ping,
    Search,
    ListContent,
    CreateContent,
    Back,
}

/// Keyed menu entries: (key, label, value)
struct Menu<T: 'static> {
    title: &'static str,
    items: &'static [(&'static str, &'static str, T)],
}

impl<T: Copy> Menu<T> {
    fn render(&self) -> String {
        let mut out = format!("\n{}", self.title);
        for (key, label, _) in self.items {
            out.push_str(&format!("\n{key}) {label}"));
        }
        out
    }

    fn pick(&self, input: &str) -> Option<T> {
        let input = input.trim().to_ascii_lowercase();
        self.items
            .iter()
            .find(|(key, label, _)| *key == input || label.to_ascii_lowercase() == input)
            .map(|(_, _, value)| *value)
    }
}

const MODULES: Menu<Module> = Menu {
    title: "Modules",
    items: &[
        ("1", "Relations", Module::Relations),
        ("2", "Scraping", Module::Scraping),
        ("3", "Content", Module::Content),
        ("q", "Quit", Module::Quit),
    ],
};

const RELATIONS: Menu<Action> = Menu {
    title: "Relations",
    items: &[
        ("1", "Show children of parents", Action::ShowChildren),
        ("2", "Add children to a parent", Action::AddChildren),
        ("3", "Link a child to a parent", Action::Link),
        ("4", "Test relation endpoint", Action::Ping),
        ("b", "Back", Action::Back),
    ],
};

const SCRAPING: Menu<Action> = Menu {
    title: "Scraping",
    items: &[
        ("1", "Search a keyword", Action::Search),
        ("b", "Back", Action::Back),
    ],
};

const CONTENT: Menu<Action> = Menu {
    title: "Content",
    items: &[
        ("1", "List items", Action::ListContent),
        ("2", "Create an item", Action::CreateContent),
        ("b", "Back", Action::Back),
    ],
};

/// Interactive menu: pick a module, then one of its actions
pub async fn shell(app: &App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("{}", MODULES.render());
        let Some(choice) = prompt(&mut lines, "> ").await? else {
            return Ok(());
        };
        if choice.is_empty() {
            continue;
        }

        let menu = match MODULES.pick(&choice) {
            Some(Module::Relations) => &RELATIONS,
            Some(Module::Scraping) => &SCRAPING,
            Some(Module::Content) => &CONTENT,
            Some(Module::Quit) => return Ok(()),
            None => {
                println!("Unknown module {choice:?}");
                continue;
            }
        };

        // Stay in the module until the operator goes back or input ends
        loop {
            println!("{}", menu.render());
            let Some(choice) = prompt(&mut lines, "> ").await? else {
                return Ok(());
            };
            if choice.is_empty() {
                continue;
            }
            match menu.pick(&choice) {
                Some(Action::Back) => break,
                Some(action) => run(app, &mut lines, action).await?,
                None => println!("Unknown option {choice:?}"),
            }
        }
    }
}

async fn run(app: &App, lines: &mut Input, action: Action) -> Result<()> {
    match action {
        Action::ShowChildren => {
            let ids = ask(lines, "Parent IDs (comma / space / dot): ").await?;
            show_children(app, &ids).await
        }
        Action::AddChildren => {
            let parent = ask(lines, "Parent ID: ").await?;
            let children = ask(lines, "New child IDs (comma / space / dot): ").await?;
            add_children(app, &parent, &children).await
        }
        Action::Link => {
            let child = ask(lines, "Child ID: ").await?;
            let parent = ask(lines, "Parent ID to link to: ").await?;
            link_to_parent(app, &child, &parent).await
        }
        Action::Ping => ping(app).await,
        Action::Search => match ask_scrape(app, lines).await? {
            Some(options) => scrape(app, options).await,
            None => Ok(()),
        },
        Action::ListContent => {
            let content_type = ask(lines, "Content type: ").await?;
            let filters = ask(lines, "Filters key=value (space separated, blank for none): ").await?;
            let per_page = ask(lines, "Per page (blank for default): ").await?;
            let per_page = match optional_number::<u32>(&per_page) {
                Ok(n) => n,
                Err(msg) => {
                    println!("{msg}");
                    return Ok(());
                }
            };
            let filters: Vec<String> = filters.split_whitespace().map(str::to_string).collect();
            list_content(app, &content_type, &filters, per_page).await
        }
        Action::CreateContent => {
            let content_type = ask(lines, "Content type: ").await?;
            let title = ask(lines, "Title: ").await?;
            let status = ask(lines, "Status (blank for draft): ").await?;
            let status = if status.is_empty() { "draft".to_string() } else { status };

            let mut fields = Vec::new();
            loop {
                let field = ask(lines, "Field key=value (blank to finish): ").await?;
                if field.is_empty() {
                    break;
                }
                fields.push(field);
            }
            create_content(app, &content_type, &title, &status, &fields).await
        }
        Action::Back => Ok(()),
    }
}

/// Collect scrape options; `None` when an answer is invalid
async fn ask_scrape(app: &App, lines: &mut Input) -> Result<Option<ScrapeOptions>> {
    let keyword = ask(lines, "Keyword: ").await?;

    let label = format!("Results to keep (blank for {}): ", app.config.scraper.top_n);
    let top = match optional_number::<usize>(&ask(lines, &label).await?) {
        Ok(top) => top,
        Err(msg) => {
            println!("{msg}");
            return Ok(None);
        }
    };

    let direct = match parse_yes_no(&ask(lines, "Skip the proxy? [y/N]: ").await?, false) {
        Some(direct) => direct,
        None => {
            println!("Expected y or n");
            return Ok(None);
        }
    };

    let save = match parse_yes_no(&ask(lines, "Save to CSV? [Y/n]: ").await?, true) {
        Some(save) => save,
        None => {
            println!("Expected y or n");
            return Ok(None);
        }
    };

    let format = ask(lines, "Results format (blank for configured): ").await?;
    let format = if format.is_empty() {
        None
    } else {
        match format.parse::<SerpFormat>() {
            Ok(format) => Some(format),
            Err(msg) => {
                println!("{msg}");
                return Ok(None);
            }
        }
    };

    let link_to = match optional_id(&ask(lines, "Publish under parent ID (blank to skip): ").await?) {
        Ok(id) => id,
        Err(msg) => {
            println!("{msg}");
            return Ok(None);
        }
    };

    Ok(Some(ScrapeOptions {
        keyword,
        top,
        direct,
        no_save: !save,
        format,
        link_to,
    }))
}

/// Blank is no ID; anything else must be a valid content ID
fn optional_id(input: &str) -> std::result::Result<Option<ContentId>, String> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_single_id(raw)
        .map(Some)
        .ok_or_else(|| format!("Invalid parent ID: {raw:?}"))
}

/// Blank is no value; anything else must be a positive number
fn optional_number<N>(input: &str) -> std::result::Result<Option<N>, String>
where
    N: std::str::FromStr + PartialEq + Default,
{
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<N>() {
        Ok(n) if n != N::default() => Ok(Some(n)),
        _ => Err(format!("Invalid number: {raw:?}")),
    }
}

fn parse_yes_no(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" | "s" | "si" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Print `label` and read one trimmed line; `None` at end of input
async fn prompt(lines: &mut Input, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

async fn ask(lines: &mut Input, label: &str) -> Result<String> {
    Ok(prompt(lines, label).await?.unwrap_or_default())
}
