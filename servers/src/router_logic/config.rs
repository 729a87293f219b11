use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "router_rules.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "Rule-based IO router", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "ROUTER_CONFIG_PATH", help = "Path to the JSON settings file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "ROUTER_RULES_FILE", help = "Path to the JSON5 file with rules, external devices and devices.")]
    pub rules_file: Option<PathBuf>,

    #[clap(long, env = "ROUTER_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "ROUTER_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error, off).")]
    pub log_level: Option<String>,

    #[clap(long, env = "ROUTER_APP_NAME", help = "Prefix of the log file names.")]
    pub app_name: Option<String>,
}

impl Config {
    /// Built-in values, the lowest precedence layer.
    pub fn defaults() -> Config {
        Config {
            rules_file: Some(PathBuf::from("router_rules.json5")),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            app_name: Some("router_rules".to_string()),
            ..Default::default()
        }
    }

    // 'other' overrides 'self' for Some values
    pub fn merge(self, other: Config) -> Config {
        Config {
            config_path: other.config_path.or(self.config_path),
            rules_file: other.rules_file.or(self.rules_file),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            app_name: other.app_name.or(self.app_name),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("./logs"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or("router_rules")
    }
}

/// Reads a settings file. Missing or malformed files yield `None`.
fn read_settings_file(path: &Path) -> Option<Config> {
    if !path.exists() {
        eprintln!("Settings file not found at {}. Using defaults and environment/CLI variables.", path.display());
        return None;
    }
    match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str::<Config>(&text) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Failed to parse settings file {}: {}. Falling back to other sources.", path.display(), e);
                None
            }
        },
        Err(e) => {
            eprintln!("Failed to read settings file {}: {}. Falling back to other sources.", path.display(), e);
            None
        }
    }
}

/// Layers defaults, the settings file and CLI/env arguments.
pub fn resolve_config(cli: Config) -> Config {
    let settings_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

    let mut config = Config::defaults();
    if let Some(file_config) = read_settings_file(&settings_path) {
        config = config.merge(file_config);
    }
    config.merge(cli)
}

pub fn load_config() -> Config {
    resolve_config(Config::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        fs::write(&settings, r#"{ "logLevel": "debug", "rulesFile": "from_file.json5" }"#).unwrap();

        let cli = Config {
            config_path: Some(settings.clone()),
            rules_file: Some(PathBuf::from("from_cli.json5")),
            ..Default::default()
        };
        let config = resolve_config(cli);

        assert_eq!(config.rules_file, Some(PathBuf::from("from_cli.json5")));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.app_name(), "router_rules");
        assert_eq!(config.config_path, Some(settings));
    }

    #[test]
    fn test_malformed_settings_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        fs::write(&settings, "not json").unwrap();

        let config = resolve_config(Config {
            config_path: Some(settings),
            ..Default::default()
        });
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.rules_file, Config::defaults().rules_file);
    }

    #[test]
    fn test_parse_cli_flags() {
        let cli = Config::parse_from(["router_rules", "--log-level", "warn", "--rules-file", "r.json5"]);
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
        assert_eq!(cli.rules_file, Some(PathBuf::from("r.json5")));
    }
}
