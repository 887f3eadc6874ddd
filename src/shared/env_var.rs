//! Centralized reader for the environment variables this tool honours.
//!
//! Environment variable names are defined as private constants here;
//! external code accesses values through the `EnvVars` struct.

const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
const CONFIG_PATH: &str = "PDS_ISSUES_CONFIG";

/// Snapshot of the relevant environment variables at load time.
pub struct EnvVars {
    /// Personal access token used for the GitHub API.
    /// When unset, the token is taken from `gh auth token`.
    pub github_token: Option<String>,

    /// Explicit path to the configuration file.
    pub config_path: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

impl EnvVars {
    /// Read the environment variables from the current process.
    pub fn load() -> Self {
        Self {
            github_token: non_empty_var(GITHUB_TOKEN),
            config_path: non_empty_var(CONFIG_PATH),
        }
    }
}
