//! Configuration loader implementation

use crate::schema::Config;
use crate::validation::ConfigValidator;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use std::path::Path;
use types::ConfigError;

/// Prefix of environment variables that override configuration keys
pub const ENV_PREFIX: &str = "CALLSIM_";

/// Configuration loader that layers defaults, a YAML file and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Config> {
        let config_path = config_path.as_ref();

        // Check if config file exists
        if !config_path.exists() {
            return Err(ConfigError::FileNotFound {
                path: config_path.display().to_string(),
            }
            .into());
        }

        let figment = Self::base().merge(Yaml::file(config_path));
        Self::finish(figment)
    }

    /// Load configuration from defaults and environment variables only
    pub fn from_env() -> Result<Config> {
        Self::finish(Self::base())
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<Config> {
        let config: Config = Self::base()
            .merge(Yaml::string(yaml_content))
            .extract()
            .context("Failed to parse configuration from string")?;

        Self::check(&config)?;
        Ok(config)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn finish(figment: Figment) -> Result<Config> {
        let config: Config = figment
            // Override with environment variables, e.g. CALLSIM_SERVER__PORT=9000
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to parse configuration")?;

        Self::check(&config)?;
        Ok(config)
    }

    /// Reject configurations with validation errors, log-free
    fn check(config: &Config) -> Result<()> {
        let report = ConfigValidator::validate(config);
        if let Some(issue) = report.first_error() {
            return Err(ConfigError::ValidationError {
                field: issue.field.clone(),
                message: issue.message.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Render the default configuration as YAML
    pub fn example_yaml() -> Result<String> {
        serde_yaml::to_string(&Config::default()).context("Failed to serialize default configuration")
    }
}
