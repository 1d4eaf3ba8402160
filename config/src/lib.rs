//! Configuration loading, layering, and validation for repomerge.
//!
//! Values are resolved in layers, later layers winning:
//!
//! 1. Built-in defaults (token budget 15000, `cl100k_base` encoding)
//! 2. An optional TOML file (`$REPOMERGE_CONFIG`, `./repomerge.toml`, or
//!    `~/.repomerge/config.toml`)
//! 3. Environment variables (`MERGE_INPUT`, `RECONCILE_OUTPUT`, `TOKEN_BUDGET`, ...)
//!
//! Command-line flags are layered on top by the binary. Nothing below the
//! binary reads the environment: the pipeline receives a resolved
//! [`PipelineConfig`].
//!
//! ```toml
//! now = "2024-01-10T00:00:00Z"
//!
//! [paths]
//! merge_input = "${DATA_DIR}/runs"
//! merge_output = "merged.json"
//! reconcile_output = "reconciled.json"
//! dirty_list = "dirty.json"
//! filtered_output = "filtered.json"
//! split_prefix = "chunks/output"
//!
//! [split]
//! token_budget = 15000
//! encoding = "cl100k_base"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use repomerge_context::TokenEncoding;
use repomerge_types::TokenBudget;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "REPOMERGE_CONFIG";

/// Environment variable names understood by [`PipelineConfig::from_sources`].
pub mod env_keys {
    pub const MERGE_INPUT: &str = "MERGE_INPUT";
    pub const MERGE_OUTPUT: &str = "MERGE_OUTPUT";
    pub const RECONCILE_INPUT: &str = "RECONCILE_INPUT";
    pub const RECONCILE_OUTPUT: &str = "RECONCILE_OUTPUT";
    pub const FILTERED_REFERENCE: &str = "FILTERED_REFERENCE";
    pub const FILTERED_INPUT: &str = "FILTERED_INPUT";
    pub const FILTERED_OUTPUT: &str = "FILTERED_OUTPUT";
    pub const SPLIT_INPUT: &str = "SPLIT_INPUT";
    pub const SPLIT_PREFIX: &str = "SPLIT_PREFIX";
    pub const TOKEN_BUDGET: &str = "TOKEN_BUDGET";
    pub const TOKEN_ENCODING: &str = "TOKEN_ENCODING";
    pub const NOW: &str = "REPOMERGE_NOW";
}

/// Chunk file prefix used when none is configured.
pub const DEFAULT_SPLIT_PREFIX: &str = "output";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{key}: invalid token budget {value:?} (expected a positive integer)")]
    InvalidBudget { key: String, value: String },
    #[error("{key}: unknown token encoding {value:?} (expected cl100k_base or o200k_base)")]
    InvalidEncoding { key: String, value: String },
    #[error("{key}: invalid reference time {value:?}: {source}")]
    InvalidNow {
        key: String,
        value: String,
        source: chrono::ParseError,
    },
    #[error("no {what} configured (set {key})")]
    Missing { what: &'static str, key: &'static str },
}

impl ConfigError {
    /// The config file this error concerns, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// On-disk TOML layout.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// Reference instant (RFC 3339) for relative timestamps.
    pub now: Option<String>,
    pub paths: Option<PathsConfig>,
    pub split: Option<SplitConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PathsConfig {
    pub merge_input: Option<String>,
    pub merge_output: Option<String>,
    pub reconcile_input: Option<String>,
    pub reconcile_output: Option<String>,
    pub dirty_list: Option<String>,
    pub filtered_input: Option<String>,
    pub filtered_output: Option<String>,
    pub split_input: Option<String>,
    pub split_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SplitConfig {
    pub token_budget: Option<u32>,
    pub encoding: Option<String>,
}

impl FileConfig {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

/// Expand `${VAR}` references using `lookup`. Unset variables expand to "".
pub fn expand_env_vars(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&lookup(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

/// Fully resolved pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    /// Directory of scrape-run JSON files.
    pub merge_input: Option<PathBuf>,
    pub merge_output: Option<PathBuf>,
    pub reconcile_input: Option<PathBuf>,
    pub reconcile_output: Option<PathBuf>,
    /// Dirty list of `owner/name` strings to drop.
    pub dirty_list: Option<PathBuf>,
    pub filtered_input: Option<PathBuf>,
    pub filtered_output: Option<PathBuf>,
    pub split_input: Option<PathBuf>,
    pub split_prefix: Option<PathBuf>,
    pub token_budget: TokenBudget,
    pub token_encoding: TokenEncoding,
    /// Reference instant; the binary falls back to the wall clock.
    pub now: Option<DateTime<Utc>>,
}

impl PipelineConfig {
    /// Load from `explicit` (or the default config file location) and the
    /// process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| config_path(lookup));
        let file = match path {
            Some(path) => {
                let file = FileConfig::load_from(&path)?;
                tracing::info!(path = %path.display(), "Loaded config file");
                Some((path, file))
            }
            None => None,
        };
        Self::from_sources(file, lookup)
    }

    /// Layer an optional parsed file and an environment lookup over defaults.
    ///
    /// Relative paths from the file are resolved against the file's directory;
    /// relative paths from the environment are kept as given.
    pub fn from_sources(
        file: Option<(PathBuf, FileConfig)>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some((path, file)) = file {
            config.apply_file(&path, file, &lookup)?;
        }

        let env_paths: [(&str, &mut Option<PathBuf>); 9] = [
            (env_keys::MERGE_INPUT, &mut config.merge_input),
            (env_keys::MERGE_OUTPUT, &mut config.merge_output),
            (env_keys::RECONCILE_INPUT, &mut config.reconcile_input),
            (env_keys::RECONCILE_OUTPUT, &mut config.reconcile_output),
            (env_keys::FILTERED_REFERENCE, &mut config.dirty_list),
            (env_keys::FILTERED_INPUT, &mut config.filtered_input),
            (env_keys::FILTERED_OUTPUT, &mut config.filtered_output),
            (env_keys::SPLIT_INPUT, &mut config.split_input),
            (env_keys::SPLIT_PREFIX, &mut config.split_prefix),
        ];
        for (key, slot) in env_paths {
            if let Some(value) = env(key) {
                *slot = Some(PathBuf::from(value));
            }
        }

        if let Some(value) = env(env_keys::TOKEN_BUDGET) {
            config.token_budget = parse_budget(env_keys::TOKEN_BUDGET, &value)?;
        }
        if let Some(value) = env(env_keys::TOKEN_ENCODING) {
            config.token_encoding = parse_encoding(env_keys::TOKEN_ENCODING, &value)?;
        }
        if let Some(value) = env(env_keys::NOW) {
            config.now = Some(parse_now(env_keys::NOW, &value)?);
        }

        Ok(config)
    }

    fn apply_file(
        &mut self,
        path: &Path,
        file: FileConfig,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let resolve = |raw: Option<String>| {
            raw.map(|raw| expand_env_vars(&raw, lookup))
                .filter(|value| !value.is_empty())
                .map(|value| base.join(value))
        };

        if let Some(paths) = file.paths {
            self.merge_input = resolve(paths.merge_input);
            self.merge_output = resolve(paths.merge_output);
            self.reconcile_input = resolve(paths.reconcile_input);
            self.reconcile_output = resolve(paths.reconcile_output);
            self.dirty_list = resolve(paths.dirty_list);
            self.filtered_input = resolve(paths.filtered_input);
            self.filtered_output = resolve(paths.filtered_output);
            self.split_input = resolve(paths.split_input);
            self.split_prefix = resolve(paths.split_prefix);
        }

        let key = |name: &str| format!("{name} in {}", path.display());
        if let Some(split) = file.split {
            if let Some(budget) = split.token_budget {
                self.token_budget = parse_budget(&key("split.token_budget"), &budget.to_string())?;
            }
            if let Some(encoding) = split.encoding {
                self.token_encoding = parse_encoding(&key("split.encoding"), &encoding)?;
            }
        }
        if let Some(now) = file.now {
            self.now = Some(parse_now(&key("now"), &expand_env_vars(&now, lookup))?);
        }

        Ok(())
    }

    /// Input for reconciliation: explicit, else the merge output.
    pub fn reconcile_input(&self) -> Result<&Path, ConfigError> {
        self.reconcile_input
            .as_deref()
            .or(self.merge_output.as_deref())
            .ok_or(ConfigError::Missing {
                what: "reconcile input",
                key: env_keys::MERGE_OUTPUT,
            })
    }

    pub fn reconcile_output(&self) -> Result<&Path, ConfigError> {
        self.reconcile_output.as_deref().ok_or(ConfigError::Missing {
            what: "reconcile output",
            key: env_keys::RECONCILE_OUTPUT,
        })
    }

    /// Input for filtering: explicit, else the reconcile output.
    pub fn filtered_input(&self) -> Result<&Path, ConfigError> {
        self.filtered_input
            .as_deref()
            .or(self.reconcile_output.as_deref())
            .ok_or(ConfigError::Missing {
                what: "filter input",
                key: env_keys::FILTERED_INPUT,
            })
    }

    pub fn filtered_output(&self) -> Result<&Path, ConfigError> {
        self.filtered_output.as_deref().ok_or(ConfigError::Missing {
            what: "filter output",
            key: env_keys::FILTERED_OUTPUT,
        })
    }

    pub fn dirty_list(&self) -> Result<&Path, ConfigError> {
        self.dirty_list.as_deref().ok_or(ConfigError::Missing {
            what: "dirty list",
            key: env_keys::FILTERED_REFERENCE,
        })
    }

    pub fn merge_input(&self) -> Result<&Path, ConfigError> {
        self.merge_input.as_deref().ok_or(ConfigError::Missing {
            what: "merge input directory",
            key: env_keys::MERGE_INPUT,
        })
    }

    pub fn merge_output(&self) -> Result<&Path, ConfigError> {
        self.merge_output.as_deref().ok_or(ConfigError::Missing {
            what: "merge output",
            key: env_keys::MERGE_OUTPUT,
        })
    }

    /// Input for splitting: explicit, else the latest corpus stage configured.
    pub fn split_input(&self) -> Result<&Path, ConfigError> {
        self.split_input
            .as_deref()
            .or(self.filtered_output.as_deref())
            .or(self.reconcile_output.as_deref())
            .ok_or(ConfigError::Missing {
                what: "split input",
                key: env_keys::SPLIT_INPUT,
            })
    }

    #[must_use]
    pub fn split_prefix(&self) -> &Path {
        self.split_prefix
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SPLIT_PREFIX))
    }
}

/// Locate the config file: `$REPOMERGE_CONFIG`, `./repomerge.toml`, then
/// `~/.repomerge/config.toml`. Only the explicit path may be missing on disk
/// (it is then reported as a read error by the caller).
pub fn config_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(explicit) = lookup(CONFIG_PATH_ENV).filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(explicit));
    }

    let local = PathBuf::from("repomerge.toml");
    if local.exists() {
        return Some(local);
    }

    dirs::home_dir()
        .map(|home| home.join(".repomerge").join("config.toml"))
        .filter(|path| path.exists())
}

fn parse_budget(key: &str, value: &str) -> Result<TokenBudget, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|tokens| TokenBudget::new(tokens).ok())
        .ok_or_else(|| ConfigError::InvalidBudget {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_encoding(key: &str, value: &str) -> Result<TokenEncoding, ConfigError> {
    TokenEncoding::parse(value).ok_or_else(|| ConfigError::InvalidEncoding {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_now(key: &str, value: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|at| at.with_timezone(&Utc))
        .map_err(|source| ConfigError::InvalidNow {
            key: key.to_string(),
            value: value.to_string(),
            source,
        })
}
