//! Config command - View and validate CourseSync configuration
//!
//! Provides the `coursesync config` CLI command which:
//! 1. Shows the effective configuration (file plus environment overrides),
//!    with the password and access token masked
//! 2. Validates the configuration and reports every error found

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use coursesync_core::config::Config;
use tracing::info;

use super::CliContext;
use crate::output::plural;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    ///
    /// `config` is the outcome of resolving the configuration file; a parse
    /// failure is reported by `validate` rather than aborting up front.
    pub async fn execute(&self, ctx: &CliContext, config: Result<Config>) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(ctx, config?),
            ConfigCommand::Validate => execute_validate(ctx, config),
        }
    }
}

fn execute_show(ctx: &CliContext, config: Config) -> Result<()> {
    let formatter = ctx.formatter();
    let shown = config.redacted();

    info!(config_path = %ctx.config_path.display(), "Showing configuration");

    if ctx.is_json() {
        let json =
            serde_json::to_value(&shown).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
        return Ok(());
    }

    let source = if ctx.config_path.exists() {
        ctx.config_path.display().to_string()
    } else {
        format!("defaults, {} not found", ctx.config_path.display())
    };
    formatter.success(&format!("Configuration ({})", source));
    formatter.info("");

    let yaml =
        serde_yaml::to_string(&shown).context("Failed to serialize configuration to YAML")?;
    for line in yaml.lines() {
        formatter.info(line);
    }
    Ok(())
}

/// Every problem with the resolved configuration, one line each
fn problems(config: &Result<Config>) -> Vec<String> {
    match config {
        Ok(config) => config.validate().iter().map(|e| e.to_string()).collect(),
        Err(e) => vec![format!("{:#}", e)],
    }
}

fn execute_validate(ctx: &CliContext, config: Result<Config>) -> Result<()> {
    let formatter = ctx.formatter();
    let problems = problems(&config);
    let path = ctx.config_path.display().to_string();

    info!(config_path = %path, "Validating configuration");

    if ctx.is_json() {
        let json = serde_json::json!({
            "valid": problems.is_empty(),
            "config_path": path,
            "file_exists": ctx.config_path.exists(),
            "errors": problems,
        });
        formatter.print_json(&json);
    } else if problems.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", path));
    } else {
        formatter.error(&format!(
            "Configuration has {}:",
            plural(problems.len() as u32, "error")
        ));
        formatter.info(&format!("File: {}", path));
        formatter.info("");
        for problem in &problems {
            formatter.info(&format!("  {}", problem));
        }
    }

    if !problems.is_empty() {
        bail!("Configuration is invalid");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use coursesync_core::config::ConfigBuilder;
    use std::path::PathBuf;

    fn valid_config() -> Config {
        ConfigBuilder::new()
            .portal_login_url("https://moodle.test/login/index.php")
            .portal_credentials("student", "secret")
            .drive_access_token("ya29.token")
            .build()
    }

    fn ctx() -> CliContext {
        CliContext::new(OutputFormat::Json, true, PathBuf::from("/nonexistent/config.yaml"))
    }

    #[test]
    fn test_problems_of_valid_config() {
        assert!(problems(&Ok(valid_config())).is_empty());
    }

    #[test]
    fn test_problems_list_every_missing_setting() {
        let found = problems(&Ok(Config::default()));
        assert!(found.iter().any(|p| p.starts_with("portal.login_url")));
        assert!(found.iter().any(|p| p.starts_with("portal.username")));
        assert!(found.iter().any(|p| p.starts_with("drive.access_token")));
    }

    #[test]
    fn test_parse_failure_is_a_problem() {
        let err = anyhow::anyhow!("expected a mapping").context("Failed to parse configuration file");
        let found = problems(&Err(err));
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("expected a mapping"));
    }

    #[test]
    fn test_validate_fails_on_invalid_config() {
        assert!(execute_validate(&ctx(), Ok(Config::default())).is_err());
        assert!(execute_validate(&ctx(), Ok(valid_config())).is_ok());
    }

    #[test]
    fn test_show_never_prints_secrets() {
        let shown = valid_config().redacted();
        let yaml = serde_yaml::to_string(&shown).unwrap();
        assert!(!yaml.contains("secret"));
        assert!(!yaml.contains("ya29.token"));
        assert!(execute_show(&ctx(), valid_config()).is_ok());
    }
}
