//! Application configuration for notebookify.
//!
//! User config lives at `~/.notebookify/notebookify.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NotebookError, Result};
use crate::types::{KernelSpec, LanguageInfo, NotebookMetadata};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "notebookify.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".notebookify";

// ---------------------------------------------------------------------------
// Config structs (matching notebookify.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Kernel written into every notebook's metadata.
    #[serde(default)]
    pub kernel: KernelConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Extension of input scripts, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Name of the sibling folder notebooks are written to when no
    /// output directory is given.
    #[serde(default = "default_output_dir_name")]
    pub output_dir_name: String,

    /// Recurse into subdirectories by default.
    #[serde(default)]
    pub recursive: bool,

    /// Serialization strategy.
    #[serde(default)]
    pub writer: WriterStrategy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            output_dir_name: default_output_dir_name(),
            recursive: false,
            writer: WriterStrategy::default(),
        }
    }
}

fn default_extension() -> String {
    "py".into()
}
fn default_output_dir_name() -> String {
    "notebooks".into()
}

/// How notebooks are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterStrategy {
    /// Structured writer, falling back to plain on failure.
    #[default]
    Auto,
    /// Validating structured writer only.
    Structured,
    /// Direct structural JSON only.
    Plain,
}

impl std::str::FromStr for WriterStrategy {
    type Err = NotebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "structured" => Ok(Self::Structured),
            "plain" => Ok(Self::Plain),
            other => Err(NotebookError::config(format!(
                "unknown writer '{other}': expected 'auto', 'structured', or 'plain'"
            ))),
        }
    }
}

/// `[kernel]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Kernel name (`kernelspec.name`).
    #[serde(default = "default_kernel_name")]
    pub name: String,

    /// Human-readable kernel name.
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Source language, used for code cells and `language_info.name`.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: default_kernel_name(),
            display_name: default_display_name(),
            language: default_language(),
        }
    }
}

fn default_kernel_name() -> String {
    "python3".into()
}
fn default_display_name() -> String {
    "Python 3".into()
}
fn default_language() -> String {
    "python".into()
}

impl From<&KernelConfig> for NotebookMetadata {
    fn from(kernel: &KernelConfig) -> Self {
        Self {
            kernelspec: KernelSpec {
                name: kernel.name.clone(),
                language: kernel.language.clone(),
                display_name: kernel.display_name.clone(),
            },
            language_info: LanguageInfo {
                name: kernel.language.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Convert config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime conversion configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Input extension, without the dot.
    pub extension: String,
    /// Recurse into subdirectories.
    pub recursive: bool,
    /// Explicit output directory (overrides the sibling folder).
    pub output_dir: Option<PathBuf>,
    /// Sibling folder name used when `output_dir` is `None`.
    pub output_dir_name: String,
    /// Serialization strategy.
    pub writer: WriterStrategy,
    /// Document-level notebook metadata.
    pub metadata: NotebookMetadata,
}

impl From<&AppConfig> for ConvertConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            extension: config.defaults.extension.trim_start_matches('.').to_string(),
            recursive: config.defaults.recursive,
            output_dir: None,
            output_dir_name: config.defaults.output_dir_name.clone(),
            writer: config.defaults.writer,
            metadata: NotebookMetadata::from(&config.kernel),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.notebookify/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NotebookError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.notebookify/notebookify.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NotebookError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NotebookError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NotebookError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NotebookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NotebookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir_name"));
        assert!(toml_str.contains("python3"));
        assert!(toml_str.contains("writer = \"auto\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.extension, "py");
        assert_eq!(parsed.kernel.display_name, "Python 3");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
recursive = true
writer = "plain"

[kernel]
language = "scala"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.defaults.recursive);
        assert_eq!(config.defaults.writer, WriterStrategy::Plain);
        assert_eq!(config.defaults.output_dir_name, "notebooks");
        assert_eq!(config.kernel.language, "scala");
        assert_eq!(config.kernel.name, "python3");
    }

    #[test]
    fn convert_config_from_app_config() {
        let mut app = AppConfig::default();
        app.defaults.extension = ".PY".into();
        app.kernel.language = "r".into();

        let convert = ConvertConfig::from(&app);
        assert_eq!(convert.extension, "PY");
        assert!(convert.output_dir.is_none());
        assert_eq!(convert.metadata.kernelspec.language, "r");
        assert_eq!(convert.metadata.language_info.name, "r");
    }

    #[test]
    fn default_metadata_matches_kernel_defaults() {
        let convert = ConvertConfig::default();
        assert_eq!(convert.metadata, NotebookMetadata::default());
    }

    #[test]
    fn writer_strategy_parsing() {
        assert_eq!("auto".parse::<WriterStrategy>().unwrap(), WriterStrategy::Auto);
        assert_eq!("plain".parse::<WriterStrategy>().unwrap(), WriterStrategy::Plain);
        let err = "nbformat".parse::<WriterStrategy>().unwrap_err();
        assert!(err.to_string().contains("unknown writer 'nbformat'"));
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!(
            "nbfy-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[defaults\nextension = 1").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to parse"));

        let _ = std::fs::remove_file(&path);
    }
}
