//! Configuration management for the watch client.
//!
//! Settings are resolved from several sources, later ones winning:
//! 1. Default values (hardcoded)
//! 2. Explicit config file passed to [`Settings::load`]
//! 3. File named by the `CONFIG_PATH` environment variable
//! 4. Environment variables prefixed with `CONSUL_WATCH__`
//!

mod client;
mod watch;
pub use client::*;
pub use watch::*;


//---
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    /// Connection parameters of the Consul agent
    #[serde(default)]
    pub client: ClientConfig,

    /// Polling cadence and per-key lock policy
    #[serde(default)]
    pub watch: WatchConfig,
}

impl Settings {
    /// Load and validate settings.
    ///
    /// # Arguments
    /// * `config_path` - Optional toml file layered on top of the defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        if let Ok(path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CONSUL_WATCH")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;
        self.watch.validate()?;
        Ok(())
    }
}
