// src/config.rs
// =============================================================================
// This module loads the settings that say which repository to read.
//
// Settings come from (later wins):
// 1. Built-in defaults
// 2. A TOML file: ~/.config/repo-notes/config.toml, or --config <path>
// 3. Environment variables / command-line flags (clap merges these two)
// 4. GITHUB_TOKEN, if no token was given any other way
//
// Example config.toml:
//
//   owner = "jive"
//   repo = "notes"
//   branch = "main"
//   root = "Obsidian Vault"
//   token = "ghp_..."
// =============================================================================

use crate::notes::NoteRules;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Folder the note tree starts from ("" = repository root)
    pub root: String,
    pub reserved_dir: String,
    pub note_extension: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let rules = NoteRules::default();
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            root: String::new(),
            reserved_dir: rules.reserved_dir,
            note_extension: rules.note_extension,
            api_base: "https://api.github.com".to_string(),
            timeout_secs: 10,
            token: None,
        }
    }
}

// Values given on the command line (or through their environment variables)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub root: Option<String>,
    pub token: Option<String>,
}

impl Settings {
    // Loads settings from the config file, then applies overrides
    //
    // A missing default config file is fine; a missing --config file is not.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut settings = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        settings.apply(overrides);
        if settings.token.is_none() {
            settings.token = non_empty(std::env::var("GITHUB_TOKEN").ok());
        }

        settings.validate()?;
        debug!(settings = ?settings, "settings loaded");
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(text)?;
        settings.token = non_empty(settings.token);
        Ok(settings)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(owner) = overrides.owner {
            self.owner = owner;
        }
        if let Some(repo) = overrides.repo {
            self.repo = repo;
        }
        if let Some(branch) = overrides.branch {
            self.branch = branch;
        }
        if let Some(root) = overrides.root {
            self.root = root;
        }
        if let Some(token) = non_empty(overrides.token) {
            self.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            bail!("No repository owner configured (set `owner` in the config file, --owner or REPO_NOTES_OWNER)");
        }
        if self.repo.trim().is_empty() {
            bail!("No repository configured (set `repo` in the config file, --repo or REPO_NOTES_REPO)");
        }
        if self.note_extension.is_empty() {
            bail!("`note_extension` must not be empty");
        }
        if self.timeout_secs == 0 {
            bail!("`timeout_secs` must be at least 1");
        }
        Url::parse(&self.api_base)
            .with_context(|| format!("Invalid `api_base` URL '{}'", self.api_base))?;
        Ok(())
    }

    pub fn rules(&self) -> NoteRules {
        NoteRules {
            reserved_dir: self.reserved_dir.clone(),
            note_extension: self.note_extension.clone(),
        }
    }
}

// An empty token would send a bare `Authorization: token` header
fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

// ~/.config/repo-notes/config.toml on Linux, the platform equivalent elsewhere
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("repo-notes").join("config.toml"))
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("root", &self.root)
            .field("reserved_dir", &self.reserved_dir)
            .field("note_extension", &self.note_extension)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
