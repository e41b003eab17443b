#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use ebook_client::ControllerConfig;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    LogFile,
    LogLevel,
    LogPollIntervalMs,
    OutputDir,
    ProgressIntervalMs,
    RequestTimeoutSecs,
    ServerLogLines,
    ServerUrl,
}

impl ConfigKey {
    fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConfigKey::LogPollIntervalMs
                | ConfigKey::ProgressIntervalMs
                | ConfigKey::RequestTimeoutSecs
                | ConfigKey::ServerLogLines
        )
    }
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_default()
            .join("ebook-term/config.toml");

        let res = match key {
            ConfigKey::LogFile => "ebook-term.log",
            ConfigKey::LogLevel => "info",
            ConfigKey::LogPollIntervalMs => "2000",
            ConfigKey::OutputDir => ".",
            ConfigKey::ProgressIntervalMs => "3000",
            ConfigKey::RequestTimeoutSecs => "600",
            ConfigKey::ServerLogLines => "50",
            ConfigKey::ServerUrl => "http://localhost:8000",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    /// Read the values a TOML config file sets. Values are checked against the
    /// possible values clap knows for the matching argument.
    pub fn parse_file(cmd: &Command, toml_str: &str) -> Result<Vec<(ConfigKey, String)>> {
        let doc = toml_str.parse::<toml_edit::Document>()?;
        let mut values = vec![];

        for key in ConfigKey::iter() {
            let Some(val) = doc.get(&key.to_string()) else {
                continue;
            };

            let mut possible_values = vec![];
            if let Some(arg) = cmd
                .get_arguments()
                .find(|e| e.get_long() == Some(key.to_string().as_str()))
            {
                possible_values = arg
                    .get_possible_values()
                    .iter()
                    .map(|e| e.get_name().to_string())
                    .collect::<Vec<String>>();
            }

            if let Some(val_int) = val.as_integer() {
                values.push((key, val_int.to_string()));
            } else if let Some(val_str) = val.as_str() {
                if val_str.is_empty() {
                    continue;
                }
                if !possible_values.is_empty() && !possible_values.contains(&val_str.to_string())
                {
                    bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                }
                values.push((key, val_str.to_string()));
            } else {
                bail!("config.toml has an unsupported value type for key '{key}'");
            }
        }

        return Ok(values);
    }

    pub async fn load(cmd: &Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path)
                .await
                .with_context(|| format!("Failed to read {}", config_path.display()))?;

            for (key, val) in Config::parse_file(cmd, &toml_str)? {
                Config::set(key, &val);
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        for key in ConfigKey::iter().filter(|key| key.is_numeric()) {
            Config::get_number(key)?;
        }

        tracing::debug!(
            server_url = Config::get(ConfigKey::ServerUrl),
            output_dir = Config::get(ConfigKey::OutputDir),
            "config"
        );

        return Ok(());
    }

    pub fn get_number(key: ConfigKey) -> Result<u64> {
        let val = Config::get(key);
        return val
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid value for '{key}': expected a number, got '{val}'"));
    }

    fn get_positive_number(key: ConfigKey) -> Result<u64> {
        let val = Config::get_number(key)?;
        if val == 0 {
            bail!("Invalid value for '{key}': must be at least 1");
        }

        return Ok(val);
    }

    pub fn controller_config() -> Result<ControllerConfig> {
        return Ok(ControllerConfig {
            request_timeout: Duration::from_secs(Config::get_positive_number(
                ConfigKey::RequestTimeoutSecs,
            )?),
            progress_interval: Duration::from_millis(Config::get_positive_number(
                ConfigKey::ProgressIntervalMs,
            )?),
            log_poll_interval: Duration::from_millis(Config::get_positive_number(
                ConfigKey::LogPollIntervalMs,
            )?),
            server_log_lines: Config::get_positive_number(ConfigKey::ServerLogLines)? as usize,
        });
    }

    pub fn serialize_default(cmd: &Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if key.is_numeric() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
