//! Configuration for lectern.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (LECTERN_HOME, LECTERN_DB, LECTERN_API_KEY)
//! 2. Config file (.lectern/config.yaml)
//! 3. Defaults (~/.lectern)
//!
//! Config file discovery:
//! - Searches current directory and parents for .lectern/config.yaml
//! - Relative paths in the config file resolve against the config file's
//!   parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub captions: CaptionsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Record store path (relative to the config file's parent)
    pub db: Option<String>,
    /// Blob bucket holding uploaded documents/audio/images
    pub bucket: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendsConfig {
    /// Base URL of the OpenAI-compatible generation API
    pub generation_url: Option<String>,
    pub generation_model: Option<String>,
    /// Name of the env var holding the generation API key
    pub api_key_env: Option<String>,
    pub whisper_path: Option<String>,
    pub whisper_model: Option<String>,
    pub tesseract_path: Option<String>,
    pub pdftoppm_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionsConfig {
    /// Optional proxy for the caption fetch, with credentials
    pub proxy_url: Option<String>,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<String>,
}

/// Proxy settings for the caption client.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Resolved configuration with absolute paths and defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Engine state directory
    pub home: PathBuf,
    /// Record store path
    pub db_path: PathBuf,
    pub bucket: String,
    pub region: String,
    pub generation_url: String,
    pub generation_model: String,
    pub api_key: Option<String>,
    pub whisper_path: String,
    pub whisper_model: String,
    pub tesseract_path: String,
    pub pdftoppm_path: String,
    pub captions_proxy: Option<ProxyConfig>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".lectern").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path_str)
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".lectern");

    let config_file = find_config_file();
    let (file, base_dir) = match &config_file {
        Some(path) => {
            let file = load_config_file(path)?;
            // Base directory is the parent of .lectern/
            let base = path
                .parent()
                .and_then(|p| p.parent())
                .unwrap_or(Path::new("."))
                .to_path_buf();
            (file, base)
        }
        None => (ConfigFile::default(), PathBuf::from(".")),
    };

    let home = std::env::var("LECTERN_HOME")
        .map(PathBuf::from)
        .unwrap_or(default_home);

    let db_path = if let Ok(env_db) = std::env::var("LECTERN_DB") {
        PathBuf::from(env_db)
    } else if let Some(ref db) = file.storage.db {
        resolve_path(&base_dir, db)
    } else {
        home.join("lectern.db")
    };

    let api_key_env = file
        .backends
        .api_key_env
        .clone()
        .unwrap_or_else(|| "LECTERN_API_KEY".to_string());
    let api_key = std::env::var(&api_key_env).ok();

    let captions_proxy = file.captions.proxy_url.clone().map(|url| ProxyConfig {
        url,
        username: file.captions.proxy_username.clone(),
        password: file.captions.proxy_password.clone(),
    });

    Ok(ResolvedConfig {
        home,
        db_path,
        bucket: file
            .storage
            .bucket
            .unwrap_or_else(|| "lectern-uploads".to_string()),
        region: file
            .storage
            .region
            .unwrap_or_else(|| "us-east-1".to_string()),
        generation_url: file
            .backends
            .generation_url
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        generation_model: file
            .backends
            .generation_model
            .unwrap_or_else(|| "gpt-4o".to_string()),
        api_key,
        whisper_path: file
            .backends
            .whisper_path
            .unwrap_or_else(|| "whisper".to_string()),
        whisper_model: file
            .backends
            .whisper_model
            .unwrap_or_else(|| "base".to_string()),
        tesseract_path: file
            .backends
            .tesseract_path
            .unwrap_or_else(|| "tesseract".to_string()),
        pdftoppm_path: file
            .backends
            .pdftoppm_path
            .unwrap_or_else(|| "pdftoppm".to_string()),
        captions_proxy,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the lectern home directory.
pub fn lectern_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the record store path.
pub fn db_path() -> Result<PathBuf> {
    Ok(config()?.db_path.clone())
}
