// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Global flags pick the repository (and can also come from environment
// variables); subcommands pick what to do with it:
//
//   repo-notes tree [ROOT] [--json]     print the note tree
//   repo-notes note PATH [--outline]    print one note
//   repo-notes fetch PATH [--json]      print a raw file or listing
//   repo-notes browse [ROOT]            interactive tree + note viewer
// =============================================================================

use crate::config::Overrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "repo-notes",
    version,
    about = "Browse and read a Markdown notes vault stored in a GitHub repository",
    long_about = "repo-notes reads a notes vault (for example an Obsidian vault) straight from GitHub \
                  through the content API. It never writes to the repository."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to read instead of ~/.config/repo-notes/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Repository owner (user or organization)
    #[arg(long, global = true, env = "REPO_NOTES_OWNER")]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, global = true, env = "REPO_NOTES_REPO")]
    pub repo: Option<String>,

    /// Branch, tag or commit to read from
    #[arg(long, global = true, env = "REPO_NOTES_BRANCH")]
    pub branch: Option<String>,

    /// Access token sent as `Authorization: token ...` (falls back to GITHUB_TOKEN)
    #[arg(long, global = true, env = "REPO_NOTES_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the note tree
    ///
    /// Example: repo-notes tree "Obsidian Vault" --json
    Tree {
        /// Folder to start from (defaults to the configured root)
        #[arg(env = "REPO_NOTES_ROOT")]
        root: Option<String>,

        /// Output the tree as JSON instead of an outline
        #[arg(long)]
        json: bool,
    },

    /// Print the text of one note
    ///
    /// Example: repo-notes note "Daily/2024-01-01.md" --outline
    Note {
        /// Repository path of the note
        path: String,

        /// Also list the note's headings and links
        #[arg(long)]
        outline: bool,
    },

    /// Fetch a single path and print what the API returned
    Fetch {
        /// Repository path of a file or folder
        path: String,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Interactive mode: pick notes from the tree by number or path
    Browse {
        /// Folder to start from (defaults to the configured root)
        #[arg(env = "REPO_NOTES_ROOT")]
        root: Option<String>,
    },
}

impl Cli {
    // Settings given on the command line, for Settings::load
    pub fn overrides(&self) -> Overrides {
        let root = match &self.command {
            Commands::Tree { root, .. } | Commands::Browse { root } => root.clone(),
            _ => None,
        };

        Overrides {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            root,
            token: self.token.clone(),
        }
    }
}
