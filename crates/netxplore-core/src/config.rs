use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "netxplore.toml";

/// Tunables for one analysis run.
///
/// Loaded once per request and passed down by reference; nothing in the
/// pipeline reads configuration from globals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub centrality: CentralityConfig,
    #[serde(default)]
    pub community: CommunityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// How many leading lines format detection inspects.
    #[serde(default = "default_detect_lines")]
    pub detect_lines: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            detect_lines: default_detect_lines(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    #[serde(default = "default_max_iter")]
    pub eigenvector_max_iter: usize,
    #[serde(default = "default_tolerance")]
    pub eigenvector_tolerance: f64,
    #[serde(default = "default_max_iter")]
    pub pagerank_max_iter: usize,
    #[serde(default = "default_tolerance")]
    pub pagerank_tolerance: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            eigenvector_max_iter: default_max_iter(),
            eigenvector_tolerance: default_tolerance(),
            pagerank_max_iter: default_max_iter(),
            pagerank_tolerance: default_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityConfig {
    /// Algorithm used when the caller does not name one.
    #[serde(default = "default_algorithm")]
    pub default_algorithm: String,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            default_algorithm: default_algorithm(),
        }
    }
}

const fn default_detect_lines() -> usize {
    10
}

const fn default_max_iter() -> usize {
    100
}

const fn default_tolerance() -> f64 {
    1e-6
}

fn default_algorithm() -> String {
    "louvain".to_string()
}

/// Read a config file as a raw TOML table. A missing file is not an error.
fn load_config_table(path: &Path) -> Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<toml::Table>(&content)
        .map(Some)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse a config file on its own. A missing file is not an error.
pub fn load_config_file(path: &Path) -> Result<Option<AnalysisConfig>> {
    load_config_table(path)?
        .map(|table| {
            toml::Value::Table(table)
                .try_into()
                .with_context(|| format!("Invalid settings in {}", path.display()))
        })
        .transpose()
}

/// Location of the per-user config file, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("netxplore/config.toml"))
}

/// Overlay `top` onto `base`, key by key. Nested tables merge; any other
/// value in `top` replaces the one in `base`.
fn merge_tables(base: &mut toml::Table, top: toml::Table) {
    for (key, value) in top {
        if let toml::Value::Table(nested) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, nested);
                continue;
            }
            base.insert(key, toml::Value::Table(nested));
        } else {
            base.insert(key, value);
        }
    }
}

/// Merge the files in `layers`, lowest precedence first, over the
/// built-in defaults. Missing files are skipped.
fn merge_layers(layers: &[PathBuf]) -> Result<AnalysisConfig> {
    let mut merged = toml::Table::new();
    for path in layers {
        if let Some(table) = load_config_table(path)? {
            debug!(path = %path.display(), "loaded config layer");
            merge_tables(&mut merged, table);
        }
    }
    toml::Value::Table(merged)
        .try_into()
        .context("Invalid merged configuration")
}

/// Resolve the effective configuration.
///
/// Layers apply over the built-in defaults, later ones winning per key:
/// the user config file, then the project file. The project file is
/// `explicit` (a `--config` flag) when given, else
/// `<project_root>/netxplore.toml`. An explicit path that does not exist is
/// an error rather than a silent fallback.
pub fn resolve_config(explicit: Option<&Path>, project_root: &Path) -> Result<AnalysisConfig> {
    let project_path = match explicit {
        Some(path) if !path.exists() => {
            anyhow::bail!("Config file {} does not exist", path.display())
        }
        Some(path) => path.to_path_buf(),
        None => project_root.join(PROJECT_CONFIG_FILE),
    };

    let layers: Vec<PathBuf> = user_config_path()
        .into_iter()
        .chain(std::iter::once(project_path))
        .collect();
    merge_layers(&layers)
}
