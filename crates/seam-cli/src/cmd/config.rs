use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use seam_core::config::{ConfigWarning, RecipeConfig, WarnLevel};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a config file with every default spelled out
    Init {
        /// Where to write the config
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a config file for common mistakes
    Validate {
        path: PathBuf,
    },

    /// Print the effective config (defaults merged with FILE, if given)
    Show {
        path: Option<PathBuf>,
    },
}

pub fn run(subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Init { path, force } => init(&path, force, json),
        ConfigSubcommand::Validate { path } => validate(&path, json),
        ConfigSubcommand::Show { path } => show(path.as_deref(), json),
    }
}

/// Load a config for a build: errors abort, warnings are logged.
pub fn load_checked(path: &Path) -> anyhow::Result<RecipeConfig> {
    let config = RecipeConfig::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    let warnings = config.validate();
    for w in &warnings {
        if w.level == WarnLevel::Warning {
            tracing::warn!("{}: {}", path.display(), w.message);
        }
    }
    if has_errors(&warnings) {
        let messages: Vec<&str> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message.as_str())
            .collect();
        anyhow::bail!("invalid config {}: {}", path.display(), messages.join("; "));
    }
    Ok(config)
}

fn has_errors(warnings: &[ConfigWarning]) -> bool {
    warnings.iter().any(|w| w.level == WarnLevel::Error)
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(path: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    RecipeConfig::default()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({ "path": path }))?;
    } else {
        println!("  created: {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(path: &Path, json: bool) -> anyhow::Result<()> {
    let config = RecipeConfig::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if has_errors(&warnings) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = match path {
        Some(p) => RecipeConfig::load(p)
            .with_context(|| format!("failed to load config {}", p.display()))?,
        None => RecipeConfig::default(),
    };
    if json {
        print_json(&config)?;
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}
