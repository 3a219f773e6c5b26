//! Generate sources for one table
//!
//! # Example
//!
//! ```bash
//! daogen --connection mysql://root@localhost:3306/shop \
//!   --table user \
//!   --model-directory src/models \
//!   --dao src/dao \
//!   --repo src/repo
//! ```

use crate::cli::Cli;
use anyhow::{Context, Result};
use console::style;
use daogen::config::{ConfigOverrides, GeneratorConfig};
use daogen::emit::{EmittedFile, WriteOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Generate command
pub struct GenerateCommand {
    /// Explicit config file
    config_path: Option<PathBuf>,
    /// Flag values
    overrides: ConfigOverrides,
}

impl GenerateCommand {
    /// Create the command from parsed flags
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            overrides: cli.overrides(),
        }
    }

    /// Execute the generate command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration cannot be loaded or is incomplete
    /// - The database is unreachable or the table does not exist
    /// - A generated file cannot be written
    pub async fn execute(&self) -> Result<()> {
        let working_dir = std::env::current_dir().context("Failed to get current directory")?;

        let config = GeneratorConfig::load(self.config_path.as_deref(), &working_dir, &self.overrides)
            .context("Failed to load configuration")?;
        config.validate().context("Invalid options")?;
        let table = config.table_name().to_string();
        let configured_root = config.module_root.clone();

        println!(
            "\n{} {} {}",
            style("Generating sources for").cyan().bold(),
            style(&table).green().bold(),
            style("...").cyan().bold()
        );

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner.set_message(format!("Reading columns of {table}..."));

        let result = daogen::run(config, &working_dir).await;
        spinner.finish_and_clear();
        let report = result.with_context(|| format!("Failed to generate sources for {table}"))?;
        debug!(model = %report.spec.model_name, files = report.files.len(), "generation finished");

        println!();
        for file in &report.files {
            print_outcome(file);
        }

        println!("\n{}", style("Generate success!").green().bold());

        let hints = module_hints(&report.files);
        let root_hint = module_root_hint(&configured_root, &report.spec.module_root);
        if hints.is_empty() && root_hint.is_none() {
            return Ok(());
        }

        println!("\n{}", style("Next steps:").cyan().bold());
        let mut step = 1;
        if !hints.is_empty() {
            println!("  {step}. Declare the new modules:");
            for hint in &hints {
                println!("     {}", style(hint).yellow());
            }
            step += 1;
            println!(
                "  {step}. Set {} before calling the DAO",
                style("DATABASE_URL").yellow()
            );
            step += 1;
        }
        if let Some(hint) = root_hint {
            println!("  {step}. {hint}");
        }

        Ok(())
    }
}

fn print_outcome(file: &EmittedFile) {
    let (mark, note) = match file.outcome {
        WriteOutcome::Created => (style("✓").green(), "created"),
        WriteOutcome::Overwritten => (style("↻").yellow(), "overwritten"),
        WriteOutcome::SkippedExisting => (style("-").dim(), "exists, skipped"),
    };
    println!(
        "  {} {} ({}, {})",
        mark,
        style(file.path.display()).dim(),
        style(&file.description).dim(),
        note
    );
}

/// `mod.rs` declarations needed for newly written files
#[must_use]
pub fn module_hints(files: &[EmittedFile]) -> Vec<String> {
    files
        .iter()
        .filter(|file| file.outcome != WriteOutcome::SkippedExisting)
        .filter_map(|file| {
            let stem = file.path.file_stem()?.to_string_lossy().into_owned();
            let parent = file.path.parent().unwrap_or_else(|| Path::new(""));
            Some(format!(
                "{}: pub mod {stem};",
                parent.join("mod.rs").display()
            ))
        })
        .collect()
}

/// Reminder printed when `use` paths were rooted at the directory name
///
/// `None` when a module root was configured or the fallback is already
/// `crate`.
#[must_use]
pub fn module_root_hint(configured: &str, resolved: &str) -> Option<String> {
    if !configured.trim().is_empty() || resolved == "crate" {
        return None;
    }
    Some(format!(
        "Generated `use` paths start with `{resolved}::`; rerun with --module-root crate \
         if the files live in that crate's own src/"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daogen::codegen::ArtifactKind;

    fn emitted(path: &str, kind: ArtifactKind, outcome: WriteOutcome) -> EmittedFile {
        EmittedFile {
            path: PathBuf::from(path),
            description: String::new(),
            kind,
            outcome,
        }
    }

    #[test]
    fn test_module_hints_skip_existing_files() {
        let files = vec![
            emitted("src/models/user.rs", ArtifactKind::Model, WriteOutcome::Created),
            emitted("src/dao/user_dao.rs", ArtifactKind::Dao, WriteOutcome::Overwritten),
            emitted("src/dao/conn.rs", ArtifactKind::Connection, WriteOutcome::SkippedExisting),
        ];
        assert_eq!(
            module_hints(&files),
            vec![
                "src/models/mod.rs: pub mod user;".to_string(),
                "src/dao/mod.rs: pub mod user_dao;".to_string(),
            ]
        );
    }

    #[test]
    fn test_module_root_hint_only_for_fallback_root() {
        let hint = module_root_hint("", "my_service").unwrap();
        assert!(hint.contains("`my_service::`"));
        assert!(hint.contains("--module-root crate"));

        assert_eq!(module_root_hint("crate", "crate"), None);
        assert_eq!(module_root_hint("my_service", "my_service"), None);
        assert_eq!(module_root_hint("  ", "crate"), None);
    }

    #[test]
    fn test_from_cli() {
        let cli = <Cli as clap::Parser>::parse_from([
            "daogen",
            "--config",
            "daogen.yml",
            "--dao",
            "src/dao",
        ]);
        let command = GenerateCommand::from_cli(&cli);
        assert_eq!(command.config_path, Some(PathBuf::from("daogen.yml")));
        assert_eq!(command.overrides.dao.as_deref(), Some("src/dao"));
        assert!(!command.overrides.force);
    }
}
