use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub enable_swagger: bool,
    pub enable_cors: bool,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            enable_swagger: true,
            enable_cors: false,
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

impl Settings {
    /// Defaults, then an optional `config.toml` in the working directory, then `APP_*` env.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load("config")
    }

    fn load(config_file: &str) -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        let config = Config::builder()
            .set_default("debug", defaults.debug)?
            .set_default("enable_swagger", defaults.enable_swagger)?
            .set_default("enable_cors", defaults.enable_cors)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .add_source(File::with_name(config_file).required(false))
            // APP_ENABLE_SWAGGER -> enable_swagger
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
