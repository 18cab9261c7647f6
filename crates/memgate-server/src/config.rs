//! Server configuration
//!
//! Loaded from a TOML file when one is present (`MEMGATE_CONFIG` path or
//! `./memgate.toml`), otherwise from environment variables. API keys may
//! always come from the environment so they can stay out of config files.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "memgate.toml";

/// Resolved configuration for the dispatch server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub memory_base_url: String,
    pub memory_api_key: String,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub model: String,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    memory: MemorySection,
    #[serde(default)]
    llm: LlmSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MemorySection {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmSection {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

impl ServerConfig {
    /// Load configuration, preferring a TOML file over the environment.
    pub fn load() -> Result<Self> {
        if let Some(file) = Self::read_file()? {
            return Self::from_file(file);
        }
        Self::from_env()
    }

    fn read_file() -> Result<Option<FileConfig>> {
        let path = env::var("MEMGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let file =
            toml::from_str(&raw).with_context(|| format!("Failed to parse config file {path}"))?;
        tracing::info!(%path, "loaded configuration file");
        Ok(Some(file))
    }

    fn from_file(file: FileConfig) -> Result<Self> {
        Ok(Self {
            host: file.server.host,
            port: file.server.port,
            memory_base_url: file
                .memory
                .base_url
                .unwrap_or_else(default_memory_base_url),
            memory_api_key: file.memory.api_key.map(Ok).unwrap_or_else(memory_api_key)?,
            openai_api_key: file.llm.api_key.map(Ok).unwrap_or_else(openai_api_key)?,
            openai_base_url: file.llm.base_url,
            model: file.llm.model.unwrap_or_else(default_model),
        })
    }

    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("MEMGATE_HOST").unwrap_or_else(|_| default_host()),
            port: env::var("MEMGATE_PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or_else(default_port),
            memory_base_url: env::var("MEMGATE_MEMORY_BASE_URL")
                .unwrap_or_else(|_| default_memory_base_url()),
            memory_api_key: memory_api_key()?,
            openai_api_key: openai_api_key()?,
            openai_base_url: env::var("MEMGATE_OPENAI_BASE_URL").ok(),
            model: env::var("MEMGATE_MODEL").unwrap_or_else(|_| default_model()),
        })
    }
}

fn memory_api_key() -> Result<String> {
    env::var("MEMGATE_MEMORY_API_KEY")
        .context("MEMGATE_MEMORY_API_KEY is not set and [memory].api_key is missing")
}

fn openai_api_key() -> Result<String> {
    env::var("MEMGATE_OPENAI_API_KEY")
        .or_else(|_| env::var("OPENAI_API_KEY"))
        .context("MEMGATE_OPENAI_API_KEY (or OPENAI_API_KEY) is not set and [llm].api_key is missing")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_memory_base_url() -> String {
    memgate_client::DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_parses() {
        let file: FileConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [memory]
            base_url = "http://localhost:4000"
            api_key = "mem-key"

            [llm]
            api_key = "sk-test"
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        let config = ServerConfig::from_file(file).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.memory_base_url, "http://localhost:4000");
        assert_eq!(config.memory_api_key, "mem-key");
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.openai_base_url, None);
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            [memory]
            api_key = "mem-key"

            [llm]
            api_key = "sk-test"
            "#,
        )
        .unwrap();

        let config = ServerConfig::from_file(file).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.memory_base_url, memgate_client::DEFAULT_BASE_URL);
        assert_eq!(config.model, "gpt-4o");
    }
}
