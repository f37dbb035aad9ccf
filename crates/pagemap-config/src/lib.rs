//! Configuration management for pagemap.
//!
//! Parses `pagemap.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values of the `[confluence]` section support environment
//! variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use pagemap_layout::LayoutConfig;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override output format.
    pub format: Option<OutputFormat>,
    /// Override traversal depth bound.
    pub max_depth: Option<usize>,
    /// Override overall traversal deadline in seconds (0 disables it).
    pub timeout_secs: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pagemap.toml";

/// Largest child listing batch the Confluence API serves.
const MAX_PAGE_SIZE: usize = 200;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings (optional section).
    pub confluence: Option<ConfluenceConfig>,
    /// Page hierarchy traversal settings.
    pub traversal: TraversalConfig,
    /// Diagram layout parameters.
    pub layout: LayoutConfig,
    /// Output settings as parsed from TOML.
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Confluence connection settings.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence server base URL.
    pub base_url: String,
    /// Account name for basic auth. Without it the token is sent as a bearer
    /// token.
    #[serde(default)]
    pub username: Option<String>,
    /// API token or personal access token.
    pub api_token: String,
    /// Child listing batch size.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.api_token, "confluence.api_token")?;
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::Validation(format!(
                "confluence.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_page_size() -> usize {
    25
}

fn default_request_timeout() -> u64 {
    30
}

/// Page hierarchy traversal settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Deepest page level fetched below the root.
    pub max_depth: usize,
    /// Overall deadline in seconds, 0 for none.
    pub timeout_secs: u64,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            timeout_secs: 0,
        }
    }
}

impl TraversalConfig {
    /// Overall traversal deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Which artifacts a build writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// SVG diagram only.
    Svg,
    /// Page tree and layout JSON only.
    Json,
    /// Everything.
    #[default]
    All,
}

impl OutputFormat {
    /// Whether the SVG diagram is written.
    #[must_use]
    pub fn writes_svg(self) -> bool {
        matches!(self, Self::Svg | Self::All)
    }

    /// Whether the JSON files are written.
    #[must_use]
    pub fn writes_json(self) -> bool {
        matches!(self, Self::Json | Self::All)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svg" => Ok(Self::Svg),
            "json" => Ok(Self::Json),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown output format '{other}' (expected svg, json or all)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Svg => "svg",
            Self::Json => "json",
            Self::All => "all",
        })
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    format: Option<OutputFormat>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Directory receiving the generated files.
    pub dir: PathBuf,
    /// Which files to write.
    pub format: OutputFormat,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_API_KEY`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a length field to be strictly positive.
fn require_positive(value: f64, field: &str) -> Result<(), ConfigError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pagemap.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
        if let Some(format) = settings.format {
            self.output_resolved.format = format;
        }
        if let Some(max_depth) = settings.max_depth {
            self.traversal.max_depth = max_depth;
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.traversal.timeout_secs = timeout_secs;
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Use this instead of accessing the `confluence` field directly when the
    /// command requires Confluence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            confluence: None,
            traversal: TraversalConfig::default(),
            layout: LayoutConfig::default(),
            output: OutputConfigRaw::default(),
            output_resolved: OutputConfig {
                dir: base.join("data"),
                format: OutputFormat::default(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file. The `[confluence]`
    /// section is checked by [`Config::require_confluence`] since only
    /// remote builds need it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_traversal()?;
        self.validate_layout()?;
        Ok(())
    }

    fn validate_traversal(&self) -> Result<(), ConfigError> {
        if self.traversal.max_depth == 0 {
            return Err(ConfigError::Validation(
                "traversal.max_depth must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_layout(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        require_positive(layout.char_width, "layout.char_width")?;
        require_positive(layout.line_height, "layout.line_height")?;
        if layout.max_label_chars == 0 {
            return Err(ConfigError::Validation(
                "layout.max_label_chars must be greater than 0".to_owned(),
            ));
        }
        for (value, field) in [
            (layout.sibling_gap, "layout.sibling_gap"),
            (layout.level_gap, "layout.level_gap"),
            (layout.padding, "layout.padding"),
            (layout.indent, "layout.indent"),
            (layout.section_gap, "layout.section_gap"),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{field} cannot be negative"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.api_token =
                expand::expand_env(&confluence.api_token, "confluence.api_token")?;
            if let Some(ref username) = confluence.username {
                confluence.username =
                    Some(expand::expand_env(username, "confluence.username")?);
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            dir: config_dir.join(self.output.dir.as_deref().unwrap_or("data")),
            format: self.output.format.unwrap_or_default(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert!(config.confluence.is_none());
        assert_eq!(config.traversal.max_depth, 32);
        assert_eq!(config.traversal.timeout(), None);
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.output_resolved.dir, PathBuf::from("/test/data"));
        assert_eq!(config.output_resolved.format, OutputFormat::All);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.traversal.max_depth, 32);
        assert!(config.confluence.is_none());
    }

    #[test]
    fn test_parse_confluence_config() {
        let toml = r#"
[confluence]
base_url = "https://wiki.example.com"
username = "me@example.com"
api_token = "token123"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();

        assert_eq!(confluence.base_url, "https://wiki.example.com");
        assert_eq!(confluence.username.as_deref(), Some("me@example.com"));
        assert_eq!(confluence.api_token, "token123");
        assert_eq!(confluence.page_size, 25);
        assert_eq!(confluence.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_partial_layout_keeps_defaults() {
        let toml = r"
[layout]
char_width = 8.0
excerpt_lines = 0
";
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.layout.char_width, 8.0);
        assert_eq!(config.layout.excerpt_lines, 0);
        assert_eq!(
            config.layout.line_height,
            LayoutConfig::default().line_height
        );
    }

    #[test]
    fn test_parse_unknown_format_fails() {
        let result: Result<Config, _> = toml::from_str("[output]\nformat = \"png\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("svg".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("all".parse::<OutputFormat>(), Ok(OutputFormat::All));
        assert!("png".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Svg.writes_svg());
        assert!(!OutputFormat::Svg.writes_json());
        assert!(OutputFormat::All.writes_json());
    }

    #[test]
    fn test_traversal_timeout() {
        let toml = "[traversal]\ntimeout_secs = 90\n";
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.traversal.timeout(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_load_resolves_output_dir_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[output]\ndir = \"out\"\nformat = \"svg\"\n");

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.output_resolved.dir, dir.path().join("out"));
        assert_eq!(config.output_resolved.format, OutputFormat::Svg);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[traversal\n");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_expands_env_vars() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("PAGEMAP_TEST_CONFLUENCE_URL", "https://wiki.example.com");
            std::env::set_var("PAGEMAP_TEST_API_KEY", "s3cret");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[confluence]
base_url = "${PAGEMAP_TEST_CONFLUENCE_URL}"
username = "${PAGEMAP_TEST_USERNAME:-bot}"
api_token = "${PAGEMAP_TEST_API_KEY}"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();
        let confluence = config.require_confluence().unwrap();

        assert_eq!(confluence.base_url, "https://wiki.example.com");
        assert_eq!(confluence.username.as_deref(), Some("bot"));
        assert_eq!(confluence.api_token, "s3cret");
        unsafe {
            std::env::remove_var("PAGEMAP_TEST_CONFLUENCE_URL");
            std::env::remove_var("PAGEMAP_TEST_API_KEY");
        }
    }

    #[test]
    fn test_load_unset_env_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("PAGEMAP_TEST_NO_TOKEN");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[confluence]
base_url = "https://wiki.example.com"
api_token = "${PAGEMAP_TEST_NO_TOKEN}"
"#,
        );

        let err = Config::load(Some(&path), None).unwrap_err();

        match err {
            ConfigError::EnvVar { field, .. } => assert_eq!(field, "confluence.api_token"),
            other => panic!("Expected ConfigError::EnvVar, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_zero_max_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[traversal]\nmax_depth = 0\n");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(err.to_string().contains("traversal.max_depth"));
    }

    #[test]
    fn test_load_rejects_non_positive_char_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[layout]\nchar_width = 0.0\n");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("layout.char_width"));
    }

    #[test]
    fn test_require_confluence_missing_section() {
        let config = Config::default_with_base(Path::new("/test"));

        let err = config.require_confluence().unwrap_err();

        assert!(err.to_string().contains("[confluence]"));
    }

    #[test]
    fn test_require_confluence_validates_fields() {
        let toml = r#"
[confluence]
base_url = "wiki.example.com"
api_token = "token"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("confluence.base_url"));

        let toml = r#"
[confluence]
base_url = "https://wiki.example.com"
api_token = "token"
page_size = 500
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("confluence.page_size"));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_config(&nested), Some(path));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            output_dir: Some(PathBuf::from("/custom/out")),
            max_depth: Some(4),
            timeout_secs: Some(10),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.output_resolved.dir, PathBuf::from("/custom/out"));
        assert_eq!(config.output_resolved.format, OutputFormat::All); // Unchanged
        assert_eq!(config.traversal.max_depth, 4);
        assert_eq!(config.traversal.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_load_applies_cli_settings_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[output]\nformat = \"json\"\n");
        let overrides = CliSettings {
            format: Some(OutputFormat::Svg),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&overrides)).unwrap();

        assert_eq!(config.output_resolved.format, OutputFormat::Svg);
        assert_eq!(config.output_resolved.dir, dir.path().join("data"));
    }

    #[test]
    fn test_cli_max_depth_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let overrides = CliSettings {
            max_depth: Some(0),
            ..Default::default()
        };

        assert!(Config::load(Some(&path), Some(&overrides)).is_err());
    }
}
