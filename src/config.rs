use crate::filter::Normalizer;
use crate::filter::normalize::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid config file '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Record file used when `--data` is not given
    pub data_path: Option<PathBuf>,
    pub query: QueryRules,
    pub output: OutputRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRules {
    /// Deepest nesting of AND/OR/NOT accepted in a query
    pub max_depth: usize,
    /// Accept JSON5 when the query text is not strict JSON
    pub lenient_json: bool,
}

impl Default for QueryRules {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            lenient_json: true,
        }
    }
}

impl QueryRules {
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.max_depth)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRules {
    pub format: OutputStyle,
}

pub fn load_config(path: Option<&Path>) -> Result<SearchConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<SearchConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let config = toml::from_str::<SearchConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display.clone(),
        source,
    })?;

    if config.query.max_depth == 0 {
        return Err(ConfigError::Invalid {
            path: path_display,
            reason: "query.max_depth must be at least 1".to_string(),
        });
    }

    Ok(config)
}

pub fn default_config() -> &'static SearchConfig {
    static DEFAULT_CONFIG: LazyLock<SearchConfig> = LazyLock::new(SearchConfig::default);
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = default_config();
        assert!(config.data_path.is_none());
        assert_eq!(config.query.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.query.lenient_json);
        assert_eq!(config.output.format, OutputStyle::Text);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SearchConfig = toml::from_str(
            r#"
            data_path = "logs.json"

            [output]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_path, Some(PathBuf::from("logs.json")));
        assert_eq!(config.output.format, OutputStyle::Json);
        assert_eq!(config.query.max_depth, DEFAULT_MAX_DEPTH);
    }
}
