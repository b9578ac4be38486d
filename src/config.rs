use crate::cli::Cli;
use crate::error::ConfigError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Main configuration combining reader and output settings.
///
/// Can be loaded from files, env vars, or CLI args with precedence order:
/// CLI > File > Environment > Defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Most bytes pulled from the input in a single read.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Raw token bytes shown before a preview is cut.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            preview_limit: default_preview_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned columns, one token per line
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn default_chunk_size() -> usize {
    4096
}

fn default_preview_limit() -> usize {
    64
}

impl Config {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Create config from `RESP_LEX_*` values supplied by `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(format) = lookup("RESP_LEX_FORMAT") {
            config.output.format = OutputFormat::from_str(&format, true).map_err(|_| {
                ConfigError::Validation(format!("RESP_LEX_FORMAT: unknown format '{}'", format))
            })?;
        }

        if let Some(size) = lookup("RESP_LEX_CHUNK_SIZE") {
            config.reader.chunk_size = parse_env_usize("RESP_LEX_CHUNK_SIZE", &size)?;
        }

        if let Some(limit) = lookup("RESP_LEX_PREVIEW") {
            config.output.preview_limit = parse_env_usize("RESP_LEX_PREVIEW", &limit)?;
        }

        Ok(config)
    }

    /// Create config with CLI args taking precedence over file and environment.
    ///
    /// Precedence: CLI > File > Environment > Defaults
    pub fn from_sources(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, &Self::from_env()?)
    }

    fn resolve(cli: &Cli, env_config: &Config) -> Result<Self, ConfigError> {
        let file_config = cli
            .config
            .as_ref()
            .map(Self::load_from_file)
            .transpose()?;

        let config = Self::merge(cli, file_config.as_ref(), env_config);
        config.validate()?;
        Ok(config)
    }

    fn merge(cli: &Cli, file_config: Option<&Config>, env_config: &Config) -> Self {
        let base = file_config.unwrap_or(env_config);

        Config {
            reader: ReaderConfig {
                chunk_size: cli.chunk_size.unwrap_or(base.reader.chunk_size),
            },
            output: OutputConfig {
                format: cli.format.unwrap_or(base.output.format),
                preview_limit: cli.preview.unwrap_or(base.output.preview_limit),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reader.chunk_size == 0 {
            return Err(ConfigError::Validation(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn parse_env_usize(name: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| {
        ConfigError::Validation(format!("{}: expected a number, got '{}'", name, value))
    })
}
