use config::{Environment, File};
use serde::Deserialize;
use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::AppError;

const ENV_PREFIX: &str = "PHISHGUARD";
const DEFAULT_CONFIG_FILE: &str = "phishguard.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub model_path: PathBuf,
    #[serde(default)]
    pub known_tlds_path: Option<PathBuf>,
    pub max_url_length: usize,
    pub metrics_enabled: bool,
}

impl Config {
    /// Defaults, then `phishguard.toml` (or `$PHISHGUARD_CONFIG`) if present,
    /// then `PHISHGUARD_*` environment variables.
    pub fn load() -> Result<Self, AppError> {
        let file = env::var("PHISHGUARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file, Environment::with_prefix(ENV_PREFIX))
    }

    pub fn load_from(file: &str, environment: Environment) -> Result<Self, AppError> {
        let settings = config::Config::builder()
            .set_default("bind_addr", "0.0.0.0:8000")?
            .set_default("model_path", "models/student.json")?
            .set_default("max_url_length", 8192_i64)?
            .set_default("metrics_enabled", true)?
            .add_source(File::with_name(file).required(false))
            .add_source(environment)
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        self.bind_addr
            .parse()
            .map_err(|e| AppError::Config(format!("invalid bind_addr {:?}: {}", self.bind_addr, e)))
    }

    fn validate(&self) -> Result<(), AppError> {
        self.socket_addr()?;
        if self.max_url_length == 0 {
            return Err(AppError::Config("max_url_length must be positive".to_string()));
        }
        Ok(())
    }
}
