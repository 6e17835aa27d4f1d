use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// What the coordinator does when a worker thread cannot be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchPolicy {
    /// Report the failure and keep launching the remaining names
    #[default]
    Continue,
    /// Report the failure and launch nothing further; workers already
    /// running are still joined
    Abort,
}

/// Configuration for a multi-name search.
///
/// # Configuration Locations
///
/// Option defaults are read from, in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.multifind.yaml` in the current directory
/// 3. Global `$HOME/.config/multifind/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Descend into subdirectories
/// recursive: true
///
/// # ASCII case-insensitive name comparison
/// ignore_case: false
///
/// # Descend into symlinked directories
/// follow_links: false
///
/// # continue | abort
/// launch_policy: continue
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// The search root and the wanted names are supplied on the command line;
/// see [`SearchConfig::merge_with_cli`]. Names are kept as OS strings and are
/// never read from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Directory to start the search from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// File names to look for, one worker each
    #[serde(skip)]
    pub names: Vec<OsString>,

    /// Walk the whole subtree instead of the immediate children only
    #[serde(default)]
    pub recursive: bool,

    /// Compare names with an ASCII case fold
    #[serde(default)]
    pub ignore_case: bool,

    /// Descend into symlinked directories
    #[serde(default)]
    pub follow_links: bool,

    #[serde(default)]
    pub launch_policy: LaunchPolicy,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            names: Vec::new(),
            recursive: false,
            ignore_case: false,
            follow_links: false,
            launch_policy: LaunchPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Creates a configuration for `names` under `root_path` with every
    /// option at its default
    pub fn new<I, N>(root_path: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<OsString>,
    {
        Self {
            root_path: root_path.into(),
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("multifind/config.yaml")),
            Some(PathBuf::from(".multifind.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly named file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// `log_level` is left alone: the CLI only knows whether a level was
    /// given, so it applies an explicit `--log-level` itself.
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        // Root and names only ever come from the command line
        self.root_path = cli_config.root_path;
        self.names = cli_config.names;

        // Flags can switch an option on, never off
        if cli_config.recursive {
            self.recursive = true;
        }
        if cli_config.ignore_case {
            self.ignore_case = true;
        }
        if cli_config.follow_links {
            self.follow_links = true;
        }
        if cli_config.launch_policy != LaunchPolicy::default() {
            self.launch_policy = cli_config.launch_policy;
        }
        self
    }
}
