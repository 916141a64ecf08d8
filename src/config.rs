use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use serde::Deserialize;

use crate::kernel::{DEFAULT_REGION_SIZE, MAX_STACK_SIZE};

pub const CONFIG_FILE_PATH: &str = "config/simulator.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read config: {}", err),
            ConfigError::Parse(err) => write!(f, "malformed config: {}", err),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Stack given to every PCB, in bytes.
    pub stack_size: usize,
    /// Size of the simulated region all stacks are carved from.
    pub stack_region_size: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            stack_size: MAX_STACK_SIZE,
            stack_region_size: DEFAULT_REGION_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: String::from("info"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub kernel: KernelConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        match Config::load(path) {
            Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            result => result,
        }
    }

    pub fn get_log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log.level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log.level)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let stack_size = self.kernel.stack_size;
        if stack_size == 0 || stack_size > MAX_STACK_SIZE {
            return Err(ConfigError::Invalid(format!(
                "stack_size {} is outside 1..={}",
                stack_size, MAX_STACK_SIZE
            )));
        }

        if self.kernel.stack_region_size < stack_size {
            return Err(ConfigError::Invalid(format!(
                "stack_region_size {} cannot hold a single {} byte stack",
                self.kernel.stack_region_size, stack_size
            )));
        }

        self.get_log_level()?;
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_full() {
        let config: Config = r#"
            [kernel]
            stack_size = 512
            stack_region_size = 4096

            [log]
            level = "debug"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.kernel.stack_size, 512);
        assert_eq!(config.kernel.stack_region_size, 4096);
        assert_eq!(config.get_log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_config_parse_empty_uses_defaults() {
        let config: Config = "".parse().unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.kernel.stack_size, MAX_STACK_SIZE);
        assert_eq!(config.get_log_level().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_config_rejects_oversized_stack() {
        let result = "[kernel]\nstack_size = 4096\n".parse::<Config>();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_rejects_small_region() {
        let result = "[kernel]\nstack_size = 1024\nstack_region_size = 100\n".parse::<Config>();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_rejects_unknown_level() {
        let result = "[log]\nlevel = \"loud\"\n".parse::<Config>();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_rejects_malformed_toml() {
        let result = "[kernel\nstack_size = ".parse::<Config>();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml").unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_shipped_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/simulator.toml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.kernel, KernelConfig::default());
    }
}
