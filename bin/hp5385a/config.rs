use config::{Config, ConfigError, Environment, File};
use hp5385a::types::MAX_PRIMARY_ADDRESS;
use hp5385a::{IDENTITY_QUERY, Setting};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub instrument: InstrumentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl AppConfig {
    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.address > MAX_PRIMARY_ADDRESS {
            return Err(ConfigError::Message(format!(
                "instrument.address must be 0..={MAX_PRIMARY_ADDRESS}, got: {}",
                self.instrument.address
            )));
        }
        if self.instrument.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "instrument.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InstrumentConfig {
    /// GPIB board index (the `N` in `GPIBN::addr::INSTR`)
    pub board: u8,
    /// GPIB primary address of the counter
    pub address: u8,
    /// Channel selected at startup; prompted for when unset
    #[serde(default)]
    pub channel: Option<Setting>,
    pub identity_query: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Append-only file receiving every status sentence
    #[serde(default)]
    pub sentence_log: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConsoleConfig {
    pub verbosity: String,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            board: 0,
            address: 3,
            channel: None,
            identity_query: IDENTITY_QUERY.to_string(),
            timeout_ms: 2000,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            verbosity: "info".to_string(),
        }
    }
}

/// Load configuration from file with layered fallbacks
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::Message(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        builder = builder.add_source(File::from(path));
    } else if Path::new("hp5385a.toml").exists() {
        builder = builder.add_source(File::with_name("hp5385a.toml"));
    }

    // Environment overrides, e.g. HP5385A__INSTRUMENT__ADDRESS=12
    builder = builder.add_source(
        Environment::with_prefix("HP5385A")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let app_config = builder.build()?.try_deserialize::<AppConfig>()?;
    app_config.validate()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.instrument.identity_query, "*IDN?");
        assert!(config.logging.sentence_log.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[instrument]\naddress = 12\nchannel = \"B\"\n\n[logging]\nsentence_log = \"counter.txt\""
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.instrument.address, 12);
        assert_eq!(config.instrument.board, 0);
        assert_eq!(config.instrument.channel, Some(Setting::Text("B".into())));
        assert_eq!(config.logging.sentence_log.as_deref(), Some("counter.txt"));
    }

    #[test]
    fn test_rejects_out_of_range_address() {
        let mut config = AppConfig::default();
        config.instrument.address = 31;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/hp5385a.toml"))).is_err());
    }
}
