//! Server configuration

use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Directory holding the model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the form, prediction, health and metrics endpoints
    #[serde(default = "default_port")]
    pub port: u16,

    /// Name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            bind_address: default_bind_address(),
            port: default_port(),
            instance_name: default_instance_name(),
        }
    }
}

impl ServerConfig {
    /// Load from an optional `composite-server.{toml,json,yaml}` file, then `COMPOSITE_*` env vars
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("composite-server").required(false))
                .add_source(Environment::with_prefix("COMPOSITE").try_parsing(true)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
