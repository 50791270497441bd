//! Runtime configuration for a GoodBoy instance.
//!
//! The configuration lives in a single JSON file. Every key is optional: the
//! file is merged over [`GoodBoyConfig::default`], and a missing file is
//! written out with the defaults so users have something to edit.
//!
//! ```rust,no_run
//! use goodboy::config::{Engine, GoodBoyConfig};
//!
//! let mut config = GoodBoyConfig::load("data/goodboy_config.json")?;
//! config.apply_env_overrides();
//! if config.engine == Engine::Cloud {
//!     println!("talking to {}", config.cloud_api_base);
//! }
//! # Ok::<(), goodboy::GoodBoyError>(())
//! ```

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "data/goodboy_config.json";

/// Which generation backend to build.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// A llama.cpp-compatible server hosting a GGUF model from `model_path`.
    #[default]
    Local,
    /// An OpenAI-compatible chat-completions endpoint.
    Cloud,
}

impl FromStr for Engine {
    type Err = GoodBoyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Engine::Local),
            "cloud" => Ok(Engine::Cloud),
            other => Err(GoodBoyError::Validation(format!("unknown engine '{}'", other))),
        }
    }
}

/// How much freedom suggested tool actions get.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SafetyMode {
    /// Only side-effect-free tools may be suggested.
    ReadOnly,
    /// Anything but dangerous operations; the user confirms.
    #[default]
    Interactive,
    /// Dangerous operations allowed when explicitly allow-listed.
    Autonomous,
}

impl fmt::Display for SafetyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SafetyMode::ReadOnly => "read-only",
            SafetyMode::Interactive => "interactive",
            SafetyMode::Autonomous => "autonomous",
        };
        f.write_str(s)
    }
}

/// Every recognised configuration key with its default.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GoodBoyConfig {
    pub engine: Engine,
    pub model_path: PathBuf,
    pub local_api_base: String,
    pub cloud_api_base: String,
    pub cloud_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_api_key: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub safety_mode: SafetyMode,
    pub allowed_tools: Vec<String>,
    pub memory_retention_days: i64,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub memory_dir: PathBuf,
    pub enable_evolution: bool,
    pub enable_mini_bots: bool,
    pub log_level: String,
}

impl Default for GoodBoyConfig {
    fn default() -> Self {
        GoodBoyConfig {
            engine: Engine::Local,
            model_path: PathBuf::from("models/"),
            local_api_base: "http://127.0.0.1:8080".to_string(),
            cloud_api_base: "http://127.0.0.1:8000".to_string(),
            cloud_model: "gpt-4.1-mini".to_string(),
            cloud_api_key: None,
            max_tokens: 512,
            temperature: 0.6,
            safety_mode: SafetyMode::Interactive,
            allowed_tools: Vec::new(),
            memory_retention_days: 30,
            request_timeout_secs: 120,
            data_dir: PathBuf::from("data"),
            memory_dir: PathBuf::from("memory"),
            enable_evolution: true,
            enable_mini_bots: true,
            log_level: "info".to_string(),
        }
    }
}

impl GoodBoyConfig {
    /// Load the file at `path`, merging it over the defaults.
    ///
    /// A missing file is created with the defaults. A file that cannot be
    /// parsed is logged and ignored so a typo never keeps the assistant down.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GoodBoyError> {
        let path = path.as_ref();
        match jsonl::read_document::<GoodBoyConfig>(path) {
            Ok(Some(config)) => Ok(config),
            Ok(None) => {
                let config = GoodBoyConfig::default();
                config.save(path)?;
                log::info!("goodboy::config: wrote default configuration to {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                log::error!("goodboy::config: {}; falling back to defaults", e);
                Ok(GoodBoyConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GoodBoyError> {
        jsonl::write_document(path.as_ref(), self)?;
        Ok(())
    }

    /// Let `GOODBOY_ENGINE`, `GOODBOY_API_KEY` and `GOODBOY_MODEL_PATH` win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("GOODBOY_ENGINE") {
            match raw.parse() {
                Ok(engine) => self.engine = engine,
                Err(e) => log::warn!("goodboy::config: ignoring GOODBOY_ENGINE: {}", e),
            }
        }
        if let Ok(key) = std::env::var("GOODBOY_API_KEY") {
            if !key.trim().is_empty() {
                self.cloud_api_key = Some(key);
            }
        }
        if let Ok(path) = std::env::var("GOODBOY_MODEL_PATH") {
            self.model_path = PathBuf::from(path);
        }
    }

    /// Builder-style setter, handy in tests and demos.
    pub fn with_storage_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.data_dir = root.join("data");
        self.memory_dir = root.join("memory");
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_safety_mode(mut self, mode: SafetyMode) -> Self {
        self.safety_mode = mode;
        self
    }

    /// Per-call deadline for backend requests.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
