use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::filters::FilterLimits;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_MAX_FILTER_JSON_BYTES,
    DEFAULT_MAX_FILTERS, DEFAULT_MAX_PAGE, DEFAULT_MAX_PER_PAGE, DEFAULT_PORT,
    DEFAULT_PREVIEW_PER_PAGE,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Query endpoint limits section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    pub default_per_page: Option<u64>,
    pub max_per_page: Option<u64>,
    pub max_page: Option<u64>,
    pub max_filters: Option<usize>,
    pub max_filter_json_bytes: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub query: Option<QueryFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Top-level keys this version does not understand
    fn unknown_fields(&self) -> Vec<&str> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().map(|k| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let keys = self.unknown_fields();
        if !keys.is_empty() {
            tracing::warn!(
                fields = %keys.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(QueryFileConfig::default);
            if query.default_per_page.is_some() {
                current.default_per_page = query.default_per_page;
            }
            if query.max_per_page.is_some() {
                current.max_per_page = query.max_per_page;
            }
            if query.max_page.is_some() {
                current.max_page = query.max_page;
            }
            if query.max_filters.is_some() {
                current.max_filters = query.max_filters;
            }
            if query.max_filter_json_bytes.is_some() {
                current.max_filter_json_bytes = query.max_filter_json_bytes;
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Query endpoint configuration
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// perPage used when a request omits it
    pub default_per_page: u64,
    pub max_per_page: u64,
    pub max_page: u64,
    pub max_filters: usize,
    pub max_filter_json_bytes: usize,
}

impl QueryConfig {
    pub fn filter_limits(&self) -> FilterLimits {
        FilterLimits {
            max_json_bytes: self.max_filter_json_bytes,
            max_filters: self.max_filters,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PREVIEW_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            max_page: DEFAULT_MAX_PAGE,
            max_filters: DEFAULT_MAX_FILTERS,
            max_filter_json_bytes: DEFAULT_MAX_FILTER_JSON_BYTES,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub query: QueryConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.pqviewer/pqviewer.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            debug = config.debug,
            default_per_page = config.query.default_per_page,
            max_per_page = config.query.max_per_page,
            max_page = config.query.max_page,
            max_filters = config.query.max_filters,
            max_filter_json_bytes = config.query.max_filter_json_bytes,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();
        let defaults = QueryConfig::default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let query = QueryConfig {
            default_per_page: cli
                .default_per_page
                .or(file_query.default_per_page)
                .unwrap_or(defaults.default_per_page),
            max_per_page: cli
                .max_per_page
                .or(file_query.max_per_page)
                .unwrap_or(defaults.max_per_page),
            max_page: file_query.max_page.unwrap_or(defaults.max_page),
            max_filters: file_query.max_filters.unwrap_or(defaults.max_filters),
            max_filter_json_bytes: file_query
                .max_filter_json_bytes
                .unwrap_or(defaults.max_filter_json_bytes),
        };

        // --debug can only turn debug on
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Self {
            server: ServerConfig { host, port },
            query,
            debug,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port the browser client can't find
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        let query = &self.query;
        if query.max_per_page == 0 {
            anyhow::bail!("Configuration error: query.max_per_page must be greater than 0");
        }
        if query.default_per_page == 0 || query.default_per_page > query.max_per_page {
            anyhow::bail!(
                "Configuration error: query.default_per_page must be between 1 and query.max_per_page ({})",
                query.max_per_page
            );
        }
        if query.max_page == 0 {
            anyhow::bail!("Configuration error: query.max_page must be greater than 0");
        }
        if query.max_filters == 0 {
            anyhow::bail!("Configuration error: query.max_filters must be greater than 0");
        }
        if query.max_filter_json_bytes == 0 {
            anyhow::bail!(
                "Configuration error: query.max_filter_json_bytes must be greater than 0"
            );
        }

        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Server is bound to all interfaces and reachable from the network"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.pqviewer/pqviewer.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn parse(json: &str) -> FileConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_file_config_parse_full() {
        let config = parse(
            r#"{
                "server": {"host": "0.0.0.0", "port": 8080},
                "query": {
                    "default_per_page": 500,
                    "max_per_page": 5000,
                    "max_page": 10,
                    "max_filters": 5,
                    "max_filter_json_bytes": 1024
                },
                "debug": true
            }"#,
        );
        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));
        let query = config.query.as_ref().unwrap();
        assert_eq!(query.default_per_page, Some(500));
        assert_eq!(query.max_filters, Some(5));
        assert_eq!(config.debug, Some(true));
        assert!(config.unknown_fields().is_empty());
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config = parse("{}");
        assert!(config.server.is_none());
        assert!(config.query.is_none());
        assert!(config.debug.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let config = parse(r#"{"sever": {"port": 1}, "debug": false}"#);
        assert_eq!(config.unknown_fields(), vec!["sever"]);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = parse(
            r#"{"server": {"host": "base.host", "port": 1000}, "query": {"max_page": 5}}"#,
        );
        let overlay = parse(r#"{"server": {"port": 2000}, "query": {"max_filters": 3}, "debug": true}"#);
        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("base.host"));
        assert_eq!(server.port, Some(2000));
        let query = base.query.as_ref().unwrap();
        assert_eq!(query.max_page, Some(5));
        assert_eq!(query.max_filters, Some(3));
        assert_eq!(base.debug, Some(true));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_layers(&CliConfig::default(), FileConfig::default());
        config.validate().unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.query.default_per_page, 10_000);
        assert_eq!(config.query.max_per_page, 1_000_000);
        assert_eq!(config.query.filter_limits(), FilterLimits::default());
        assert!(!config.debug);
    }

    #[test]
    fn test_app_config_cli_override() {
        let file = parse(
            r#"{"server": {"host": "file.host", "port": 1000}, "query": {"default_per_page": 50}}"#,
        );
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            debug: true,
            default_per_page: Some(20),
            ..Default::default()
        };
        let config = AppConfig::from_layers(&cli, file);

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.query.default_per_page, 20);
        assert!(config.debug);
    }

    #[test]
    fn test_app_config_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server": {{"port": 4321}}, "query": {{"max_filters": 7}}}}"#).unwrap();

        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 4321);
        assert_eq!(config.query.max_filters, 7);
    }

    #[test]
    fn test_app_config_missing_config_path() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/pqviewer.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let result = AppConfig::from_layers(&cli, FileConfig::default()).validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server.host must not be empty")
        );
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let result = AppConfig::from_layers(&cli, FileConfig::default()).validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server.port must be greater than 0")
        );
    }

    #[test]
    fn test_app_config_validation_default_per_page() {
        for default_per_page in [0, DEFAULT_MAX_PER_PAGE + 1] {
            let cli = CliConfig {
                default_per_page: Some(default_per_page),
                ..Default::default()
            };
            let result = AppConfig::from_layers(&cli, FileConfig::default()).validate();
            assert!(
                result
                    .unwrap_err()
                    .to_string()
                    .contains("query.default_per_page")
            );
        }
    }

    #[test]
    fn test_app_config_validation_query_limits_zero() {
        let file = parse(r#"{"query": {"max_filters": 0}}"#);
        let result = AppConfig::from_layers(&CliConfig::default(), file).validate();
        assert!(result.unwrap_err().to_string().contains("query.max_filters"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));

        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
        assert!(!is_all_interfaces("::1"));
    }
}
