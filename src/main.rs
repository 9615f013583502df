// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Load settings and build the NoteExplorer
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = success, 1 = note/fetch failed, 2 = error)
//
// Everything that talks to GitHub lives in `github` and `notes`; this file
// only prints what they return.
// =============================================================================

mod cache; // src/cache.rs - shared memoization cache
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - settings file + overrides
mod github; // src/github/ - content API access
mod notes; // src/notes/ - note tree and note rendering

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Settings;
use github::{Content, GithubClient};
use notes::{NoteExplorer, TreeNode};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref(), cli.overrides())?;
    let client = GithubClient::new(&settings)?;
    let explorer = NoteExplorer::new(Arc::new(client), settings.rules());

    match cli.command {
        Commands::Tree { json, .. } => handle_tree(&explorer, &settings.root, json).await,
        Commands::Note { path, outline } => handle_note(&explorer, &path, outline).await,
        Commands::Fetch { path, json } => handle_fetch(&explorer, &path, json).await,
        Commands::Browse { .. } => handle_browse(&explorer, &settings.root).await,
    }
}

// Logs go to stderr so stdout stays clean for note text and JSON.
// RUST_LOG wins; otherwise -v means debug for this crate, and the default
// is warn so fetch errors are always visible.
fn init_logging(verbose: bool) {
    let directives = log_directives(std::env::var(EnvFilter::DEFAULT_ENV).ok(), verbose);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn log_directives(rust_log: Option<String>, verbose: bool) -> String {
    match rust_log.filter(|directives| !directives.trim().is_empty()) {
        Some(directives) => directives,
        None if verbose => "repo_notes=debug,warn".to_string(),
        None => "warn".to_string(),
    }
}

// Handles the 'tree' subcommand
async fn handle_tree(explorer: &NoteExplorer, root: &str, json: bool) -> Result<i32> {
    let tree = explorer.build_tree(root).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(0);
    }

    if tree.is_empty() {
        println!("⚠️  No notes found under '{}'", display_root(root));
        return Ok(0);
    }

    print_tree(&tree, false);
    print_tree_summary(&tree);
    Ok(0)
}

// Handles the 'note' subcommand
async fn handle_note(explorer: &NoteExplorer, path: &str, outline: bool) -> Result<i32> {
    match explorer.render_note(path).await {
        Ok(text) => {
            println!("{}", text);
            if outline {
                print_outline(&text);
            }
            Ok(0)
        }
        Err(e) => {
            warn!(path, kind = ?e.kind(), "note not rendered");
            eprintln!("{}", e);
            Ok(1)
        }
    }
}

// Handles the 'fetch' subcommand
async fn handle_fetch(explorer: &NoteExplorer, path: &str, json: bool) -> Result<i32> {
    let content = match explorer.fetch(path).await {
        Ok(content) => content,
        Err(e) => {
            if json {
                let output = serde_json::json!({ "error": e.kind(), "message": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                eprintln!("{}", e);
            }
            return Ok(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&content)?);
        return Ok(0);
    }

    match content {
        Content::File { text, .. } => println!("{}", text),
        Content::Directory { entries } => {
            println!("{:<6} {:<40} {}", "TYPE", "NAME", "PATH");
            println!("{}", "=".repeat(80));
            for entry in &entries {
                println!("{:<6} {:<40} {}", entry.item_type.as_str(), entry.name, entry.path);
            }
            println!();
            println!("📋 Total: {}", entries.len());
        }
    }
    Ok(0)
}

// Handles the 'browse' subcommand
//
// Reads one command per line from stdin until :quit or end of input.
async fn handle_browse(explorer: &NoteExplorer, root: &str) -> Result<i32> {
    let mut tree = explorer.build_tree(root).await;
    print_numbered_tree(&tree, root);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!();
        println!("Enter a note number or path (:tree, :clear, :stats, :quit)");

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };

        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":tree" => print_numbered_tree(&tree, root),
            ":clear" => {
                let removed = explorer.clear_cache();
                println!("🧹 Cleared {} cached result(s), reloading tree...", removed);
                tree = explorer.build_tree(root).await;
                print_numbered_tree(&tree, root);
            }
            ":stats" => {
                let stats = explorer.cache_stats();
                println!(
                    "📊 Cache: {} entries, {} hits, {} misses",
                    stats.entries, stats.hits, stats.misses
                );
            }
            selection => match resolve_selection(&tree, selection) {
                Ok(path) => {
                    println!("{}", "-".repeat(80));
                    println!("{}", explorer.render_note_text(&path).await);
                    println!("{}", "-".repeat(80));
                }
                Err(message) => println!("⚠️  {}", message),
            },
        }
    }

    Ok(0)
}

// Turns user input into a note path: a 1-based number from the numbered
// tree, or a path that names a note in the tree
fn resolve_selection(tree: &[TreeNode], input: &str) -> std::result::Result<String, String> {
    if let Ok(number) = input.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| notes::notes(tree).nth(index))
            .map(|node| node.id().to_string())
            .ok_or_else(|| format!("No note number {}", number));
    }

    match notes::find(tree, input) {
        Some(node) if node.is_note() => Ok(node.id().to_string()),
        Some(_) => Err(format!("'{}' is a folder, pick a note inside it", input)),
        None => Err(format!("'{}' is not in the tree", input)),
    }
}

fn display_root(root: &str) -> &str {
    if root.is_empty() {
        "/"
    } else {
        root
    }
}

fn print_numbered_tree(tree: &[TreeNode], root: &str) {
    println!("📚 Notes in {}", display_root(root));
    print_tree(tree, true);
    print_tree_summary(tree);
}

fn print_tree(tree: &[TreeNode], numbered: bool) {
    let mut next = 0;
    let mut lines = Vec::new();
    tree_lines(tree, 0, numbered.then_some(&mut next), &mut lines);
    for line in lines {
        println!("{}", line);
    }
}

// Renders the tree as an indented outline, one line per node
//
// With a counter, notes are numbered in depth-first order, which is the
// same order notes::notes() yields them in.
fn tree_lines(
    nodes: &[TreeNode],
    depth: usize,
    mut counter: Option<&mut usize>,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        if !node.is_note() {
            lines.push(format!("{}📁 {}/", indent, node.name()));
            tree_lines(node.children(), depth + 1, counter.as_deref_mut(), lines);
            continue;
        }

        match counter.as_deref_mut() {
            Some(n) => {
                *n += 1;
                lines.push(format!("{}📄 [{}] {}", indent, n, node.name()));
            }
            None => lines.push(format!("{}📄 {}", indent, node.name())),
        }
    }
}

fn print_tree_summary(tree: &[TreeNode]) {
    let count = notes::count(tree);
    println!();
    println!("📊 Summary:");
    println!("   📁 Folders: {}", count.folders);
    println!("   📄 Notes: {}", count.notes);
}

fn print_outline(text: &str) {
    let headings = notes::outline(text);
    let links = notes::note_links(text);

    println!();
    println!("{}", "=".repeat(80));
    println!("🧭 Outline ({} heading(s))", headings.len());
    for heading in &headings {
        println!("{}- {}", "  ".repeat(heading.level.saturating_sub(1)), heading.text);
    }

    println!("🔗 Links ({})", links.len());
    for link in &links {
        let marker = if link.external { "🌐" } else { "📄" };
        println!("   {} {}", marker, link.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<TreeNode> {
        vec![
            TreeNode::folder("daily", "daily", vec![TreeNode::note("daily/1.md", "1.md")]),
            TreeNode::note("todo.md", "todo.md"),
        ]
    }

    #[test]
    fn test_resolve_by_number() {
        let tree = sample_tree();
        assert_eq!(resolve_selection(&tree, "1"), Ok("daily/1.md".to_string()));
        assert_eq!(resolve_selection(&tree, "2"), Ok("todo.md".to_string()));
        assert!(resolve_selection(&tree, "0").is_err());
        assert!(resolve_selection(&tree, "3").is_err());
    }

    #[test]
    fn test_tree_lines_numbers_notes_depth_first() {
        let mut lines = Vec::new();
        let mut counter = 0;
        tree_lines(&sample_tree(), 0, Some(&mut counter), &mut lines);

        assert_eq!(lines, vec!["📁 daily/", "  📄 [1] 1.md", "📄 [2] todo.md"]);
        assert_eq!(counter, 2);
    }

    #[test]
    fn test_tree_lines_without_numbers() {
        let mut lines = Vec::new();
        tree_lines(&sample_tree(), 0, None, &mut lines);

        assert_eq!(lines, vec!["📁 daily/", "  📄 1.md", "📄 todo.md"]);
    }

    #[test]
    fn test_rust_log_wins_over_verbose() {
        assert_eq!(log_directives(Some("info".to_string()), true), "info");
        assert_eq!(log_directives(Some("trace".to_string()), false), "trace");
    }

    #[test]
    fn test_log_defaults_without_rust_log() {
        assert_eq!(log_directives(None, true), "repo_notes=debug,warn");
        assert_eq!(log_directives(None, false), "warn");
        assert_eq!(log_directives(Some("  ".to_string()), false), "warn");
    }

    #[test]
    fn test_resolve_by_path() {
        let tree = sample_tree();
        assert_eq!(resolve_selection(&tree, "todo.md"), Ok("todo.md".to_string()));
        assert!(resolve_selection(&tree, "daily").unwrap_err().contains("is a folder"));
        assert!(resolve_selection(&tree, "missing.md").is_err());
    }
}
