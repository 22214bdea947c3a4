//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use viewlater_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "display_limit": config.display_limit,
                    "fetch_titles": config.fetch_titles,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:      {}", config.data_dir.display());
            println!("  display_limit: {}", config.display_limit);
            println!("  fetch_titles:  {}", config.fetch_titles);
            println!(
                "  log_file:      {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "display_limit" => {
            let limit: usize = value
                .parse()
                .context("Invalid value for display_limit. Use a positive number.")?;
            if limit == 0 {
                bail!("display_limit must be at least 1");
            }
            config.display_limit = limit;
        }
        "fetch_titles" => {
            config.fetch_titles = value
                .parse()
                .context("Invalid value for fetch_titles. Use 'true' or 'false'.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, display_limit, fetch_titles, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_values() {
        let mut config = Config::default();

        apply(&mut config, "display_limit", "8").unwrap();
        assert_eq!(config.display_limit, 8);

        apply(&mut config, "fetch_titles", "false").unwrap();
        assert!(!config.fetch_titles);

        apply(&mut config, "log_file", "/tmp/viewlater.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/viewlater.log")));
        apply(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());

        apply(&mut config, "data_dir", "/data").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data"));
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "display_limit", "0").is_err());
        assert!(apply(&mut config, "display_limit", "many").is_err());
        assert!(apply(&mut config, "fetch_titles", "maybe").is_err());
        assert!(apply(&mut config, "sync_url", "x").is_err());
        assert_eq!(config.display_limit, 3);
    }
}
