use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::Deserialize;

use super::dirs;
use super::env_var::EnvVars;

/// Top-level configuration for pds-issues.
#[derive(Debug, Default, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// GitHub organization settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Release theme creation settings.
    #[serde(default)]
    pub themes: ThemesConfig,

    /// Bulk labelling settings.
    #[serde(default)]
    pub labels: LabelsConfig,

    /// Issue report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// GitHub organization configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    /// Organization owning the repositories and project boards (default: "NASA-PDS").
    #[serde(default = "default_org")]
    #[schemars(default = "default_org")]
    pub org: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self { org: default_org() }
    }
}

/// Release theme configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThemesConfig {
    /// Title of the organization-wide tracking project (default: "Release Themes").
    /// Set to null to skip the tracking board.
    #[serde(default = "default_tracking_project")]
    #[schemars(default = "default_tracking_project")]
    pub tracking_project: Option<String>,

    /// Color of newly created build labels, without '#' (default: "0366d6").
    #[serde(default = "default_build_label_color")]
    #[schemars(default = "default_build_label_color")]
    pub build_label_color: String,

    /// Labels applied to every theme issue besides the build label.
    #[serde(default = "default_theme_labels")]
    #[schemars(default = "default_theme_labels")]
    pub labels: Vec<String>,
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            tracking_project: default_tracking_project(),
            build_label_color: default_build_label_color(),
            labels: default_theme_labels(),
        }
    }
}

/// Bulk labelling configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LabelsConfig {
    /// Color of the version label added to open bugs (default: "062C9B").
    #[serde(default = "default_version_label_color")]
    #[schemars(default = "default_version_label_color")]
    pub version_label_color: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            version_label_color: default_version_label_color(),
        }
    }
}

/// Issue report configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Products file mapping repositories to components
    /// (default: "conf/pds-products.yaml", relative to the working directory).
    #[serde(default = "default_products_config")]
    #[schemars(default = "default_products_config")]
    pub products_config: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            products_config: default_products_config(),
        }
    }
}

fn default_org() -> String {
    "NASA-PDS".to_string()
}

fn default_tracking_project() -> Option<String> {
    Some("Release Themes".to_string())
}

fn default_build_label_color() -> String {
    "0366d6".to_string()
}

fn default_theme_labels() -> Vec<String> {
    vec!["theme".to_string(), "Epic".to_string(), "i&t.skip".to_string()]
}

fn default_version_label_color() -> String {
    "062C9B".to_string()
}

fn default_products_config() -> PathBuf {
    PathBuf::from("conf").join("pds-products.yaml")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file (permission error, etc.)
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse error
    #[error("Invalid config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Load configuration.
///
/// `PDS_ISSUES_CONFIG` names an explicit file, which must exist. Otherwise
/// ~/.config/pds-issues/config.ya?ml is used, falling back to defaults.
pub fn load_config() -> anyhow::Result<Config> {
    if let Some(path) = EnvVars::load().config_path {
        return load_config_file(Path::new(&path));
    }
    let Some(dir) = dirs::config_dir() else {
        return Ok(Config::default());
    };
    load_config_from_dir(&dir.join("pds-issues"))
}

/// Load configuration from a specific directory.
/// Searches for config.yaml, then config.yml in the given directory.
/// Returns Config::default() if neither file exists.
pub fn load_config_from_dir(dir: &Path) -> anyhow::Result<Config> {
    for filename in &["config.yaml", "config.yml"] {
        let path = dir.join(filename);
        match std::fs::read_to_string(&path) {
            Ok(content) => return parse_config(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(ConfigError::ReadError { path, source: e }.into()),
        }
    }

    Ok(Config::default())
}

fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Parse YAML content into Config.
fn parse_config(content: &str, path: &Path) -> anyhow::Result<Config> {
    tracing::debug!(path = %path.display(), "loading configuration");
    serde_yaml::from_str(content)
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
        .map_err(Into::into)
}

/// Generate JSON Schema for the Config struct.
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(Config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn config_default_has_expected_values() {
        let config = Config::default();

        assert_eq!(config.github.org, "NASA-PDS");
        assert_eq!(
            config.themes.tracking_project.as_deref(),
            Some("Release Themes")
        );
        assert_eq!(config.themes.build_label_color, "0366d6");
        assert_eq!(config.themes.labels, vec!["theme", "Epic", "i&t.skip"]);
        assert_eq!(config.labels.version_label_color, "062C9B");
        assert_eq!(
            config.report.products_config,
            PathBuf::from("conf/pds-products.yaml")
        );
    }

    #[test]
    fn parse_full_yaml_config() {
        let yaml = indoc! {"
            github:
              org: my-org
            themes:
              tracking_project: Roadmap
              build_label_color: ff0000
              labels: [theme]
            labels:
              version_label_color: 00ff00
            report:
              products_config: /etc/products.yaml
        "};
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.github.org, "my-org");
        assert_eq!(config.themes.tracking_project.as_deref(), Some("Roadmap"));
        assert_eq!(config.themes.build_label_color, "ff0000");
        assert_eq!(config.themes.labels, vec!["theme"]);
        assert_eq!(config.labels.version_label_color, "00ff00");
        assert_eq!(
            config.report.products_config,
            PathBuf::from("/etc/products.yaml")
        );
    }

    #[test]
    fn parse_partial_yaml_uses_defaults() {
        let yaml = "github:\n  org: other\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.github.org, "other");
        assert_eq!(config.themes, ThemesConfig::default());
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn null_tracking_project_disables_board() {
        let yaml = "themes:\n  tracking_project: null\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.themes.tracking_project, None);
    }

    #[test]
    fn parse_empty_yaml_uses_all_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Config, _> = serde_yaml::from_str("unknown: 1\n");
        assert!(result.is_err());
    }

    #[rstest]
    #[case::yaml("config.yaml")]
    #[case::yml("config.yml")]
    fn load_config_from_dir_reads_either_extension(#[case] filename: &str) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(filename), "github:\n  org: from-file\n").unwrap();

        let config = load_config_from_dir(dir.path()).unwrap();
        assert_eq!(config.github.org, "from-file");
    }

    #[test]
    fn load_config_from_dir_without_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from_dir(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_config_from_dir_reports_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "github: [").unwrap();

        let err = load_config_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid config file"));
    }

    #[test]
    fn load_config_honours_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "github:\n  org: explicit\n").unwrap();

        temp_env::with_var("PDS_ISSUES_CONFIG", Some(path.as_os_str()), || {
            let config = load_config().unwrap();
            assert_eq!(config.github.org, "explicit");
        });
    }

    #[test]
    fn load_config_fails_when_explicit_path_is_missing() {
        temp_env::with_var(
            "PDS_ISSUES_CONFIG",
            Some("/nonexistent/pds-issues.yaml"),
            || {
                let err = load_config().unwrap_err();
                assert!(err.to_string().starts_with("Failed to read config file"));
            },
        );
    }
}
