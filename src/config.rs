//! Configuration management for imgtext using the prefer crate.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! `IMGTEXT_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ocr::{
    EngineMode, Language, OcrOptions, OptionsError, SegmentationMode, DEFAULT_TESSERACT_CMD,
};

/// Name used for config file discovery (`imgtext.toml`, `imgtext.json`, ...).
pub const CONFIG_NAME: &str = "imgtext";

/// Default bind address for `imgtext serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Default upload limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tesseract command: a bare name looked up on PATH, or a full path.
    pub tesseract_cmd: String,
    /// Default page segmentation mode.
    pub psm: SegmentationMode,
    /// Default OCR engine mode.
    pub oem: EngineMode,
    /// Default recognition language.
    pub language: Language,
    /// Clean up recognized text before showing and exporting it.
    pub sanitize: bool,
    /// Server bind address.
    pub bind: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// How long the server keeps extraction results for download.
    pub cache_ttl_secs: u64,
    /// How many extraction results the server keeps.
    pub cache_capacity: usize,

    /// File this config was loaded from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tesseract_cmd: DEFAULT_TESSERACT_CMD.to_string(),
            psm: SegmentationMode::default(),
            oem: EngineMode::default(),
            language: Language::default(),
            sanitize: true,
            bind: DEFAULT_BIND.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cache_ttl_secs: 600,
            cache_capacity: 64,
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, prefer discovers
    /// an `imgtext.*` file in the standard locations; if none is found the
    /// defaults are used. Environment overrides are applied either way.
    pub async fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::discover().await,
        };
        config.with_env_overrides()
    }

    async fn discover() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => {
                tracing::debug!("No {} config file found, using defaults", CONFIG_NAME);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// Supports TOML, YAML and JSON based on file extension.
    pub async fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e)
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config file contents in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> anyhow::Result<Self> {
        let config = match ext {
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse YAML config: {}", e))?,
            "json" => serde_json::from_str(contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse JSON config: {}", e))?,
            _ => toml::from_str(contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?,
        };
        Ok(config)
    }

    /// Apply `IMGTEXT_*` environment variables.
    pub fn with_env_overrides(self) -> anyhow::Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(
        mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(cmd) = var("IMGTEXT_TESSERACT_CMD") {
            self.tesseract_cmd = cmd;
        }
        if let Some(psm) = var("IMGTEXT_PSM") {
            self.psm = psm.parse().map_err(env_error("IMGTEXT_PSM"))?;
        }
        if let Some(oem) = var("IMGTEXT_OEM") {
            self.oem = oem.parse().map_err(env_error("IMGTEXT_OEM"))?;
        }
        if let Some(lang) = var("IMGTEXT_LANG") {
            self.language = lang.parse().map_err(env_error("IMGTEXT_LANG"))?;
        }
        if let Some(sanitize) = var("IMGTEXT_SANITIZE") {
            self.sanitize = !matches!(
                sanitize.trim().to_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        if let Some(bind) = var("IMGTEXT_BIND") {
            self.bind = bind;
        }
        Ok(self)
    }

    /// Default recognition options from this config.
    pub fn ocr_options(&self) -> OcrOptions {
        OcrOptions::new(self.oem, self.psm, self.language)
    }

    /// Render as TOML (for `imgtext config`).
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn env_error(key: &'static str) -> impl Fn(OptionsError) -> anyhow::Error {
    move |e| anyhow::anyhow!("{}: {}", key, e)
}
