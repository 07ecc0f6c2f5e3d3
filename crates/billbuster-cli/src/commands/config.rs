//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &Config, path: &Path, formatter: &Formatter) -> Result<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            println!("{}", redacted(config).to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            Config::default().save_to(path)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
    }

    Ok(())
}

/// Copy of `config` with the API key masked.
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.llm.api_key.is_some() {
        config.llm.api_key = Some("********".to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, ProviderKind};

    fn formatter() -> Formatter {
        Formatter::new(OutputFormat::Table, false)
    }

    #[test]
    fn test_redacted_hides_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".into());

        let shown = redacted(&config).to_toml().unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("********"));
    }

    #[test]
    fn test_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".billbuster").join("config.toml");
        let args = ConfigArgs {
            action: Some(ConfigAction::Init { force: false }),
        };

        execute_config(args, &Config::default(), &path, &formatter()).unwrap();

        let written = Config::load_from(&path).unwrap();
        assert_eq!(written.llm.provider, ProviderKind::Ollama);
        assert_eq!(written.pipeline.summary_batch_size, 20);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nprovider = \"mock\"\n").unwrap();

        let args = ConfigArgs {
            action: Some(ConfigAction::Init { force: false }),
        };
        let result = execute_config(args, &Config::default(), &path, &formatter());
        assert!(matches!(result, Err(CliError::InvalidInput(_))));

        let args = ConfigArgs {
            action: Some(ConfigAction::Init { force: true }),
        };
        execute_config(args, &Config::default(), &path, &formatter()).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().llm.provider, ProviderKind::Ollama);
    }
}
