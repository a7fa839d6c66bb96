//! Engine configuration loading.
//!
//! Sources are layered, later ones winning:
//! 1. [`EngineConfig`] defaults;
//! 2. an optional config file, format inferred from its extension;
//! 3. environment variables prefixed `KEEP_ITEMS_`
//!    (e.g. `KEEP_ITEMS_DROP_CHANCE=0.25`).

use std::path::PathBuf;

use config::{Config, Environment, File, Map};

use keep_core::error::ConfigError;
use keep_engine::EngineConfig;

/// Prefix of environment variables read by the loader.
pub const ENV_PREFIX: &str = "KEEP_ITEMS";

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "keep-items.toml";

/// `<platform config dir>/keep-items/keep-items.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keep-items")
        .join(CONFIG_FILE_NAME)
}

/// Layered loader for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    file_required: bool,
    env: Option<Map<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` if it exists.
    pub fn optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = false;
        self
    }

    /// Read `path`, failing if it is missing.
    pub fn required_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = true;
        self
    }

    /// Use `vars` instead of the process environment.
    pub fn env_vars(mut self, vars: Map<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.as_path()).required(self.file_required));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(self.env.clone()),
        );

        let config: EngineConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
