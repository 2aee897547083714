//! Configuration and predictor factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adaptiq_core::engine::EngineConfig;
use adaptiq_core::model::Difficulty;
use adaptiq_core::traits::Predictor;

use crate::hold::{FixedPredictor, HoldPredictor};
use crate::http::HttpPredictor;

/// Environment variable that points the session at an HTTP predictor.
pub const PREDICTOR_URL_ENV: &str = "ADAPTIQ_PREDICTOR_URL";

/// Which predictor to use.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PredictorConfig {
    #[default]
    Hold,
    Fixed {
        difficulty: Difficulty,
    },
    Http {
        url: String,
        #[serde(default)]
        api_key: Option<String>,
        /// Transport-level timeout for each request.
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
}

impl std::fmt::Debug for PredictorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictorConfig::Hold => f.write_str("Hold"),
            PredictorConfig::Fixed { difficulty } => f
                .debug_struct("Fixed")
                .field("difficulty", difficulty)
                .finish(),
            PredictorConfig::Http {
                url,
                api_key,
                timeout_ms,
            } => f
                .debug_struct("Http")
                .field("url", url)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("timeout_ms", timeout_ms)
                .finish(),
        }
    }
}

/// Top-level adaptiq configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiqConfig {
    /// Question pool file or directory.
    #[serde(default)]
    pub pool: Option<PathBuf>,
    /// Seed for reproducible question draws.
    #[serde(default)]
    pub seed: Option<u64>,
    /// How long to wait for the predictor. 0 disables the limit.
    #[serde(default = "default_timeout_ms")]
    pub predictor_timeout_ms: u64,
    /// Stop the game when the predictor fails.
    #[serde(default)]
    pub halt_on_prediction_error: bool,
    /// Stop after this many rounds.
    #[serde(default)]
    pub max_rounds: Option<u64>,
    #[serde(default)]
    pub predictor: PredictorConfig,
}

fn default_timeout_ms() -> u64 {
    2000
}

impl Default for AdaptiqConfig {
    fn default() -> Self {
        Self {
            pool: None,
            seed: None,
            predictor_timeout_ms: default_timeout_ms(),
            halt_on_prediction_error: false,
            max_rounds: None,
            predictor: PredictorConfig::default(),
        }
    }
}

impl AdaptiqConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            predictor_timeout: (self.predictor_timeout_ms > 0)
                .then(|| Duration::from_millis(self.predictor_timeout_ms)),
            halt_on_prediction_error: self.halt_on_prediction_error,
            max_rounds: self.max_rounds,
            seed: self.seed,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to an empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_predictor_config(config: &PredictorConfig) -> PredictorConfig {
    match config {
        PredictorConfig::Http {
            url,
            api_key,
            timeout_ms,
        } => PredictorConfig::Http {
            url: resolve_env_vars(url),
            api_key: api_key
                .as_deref()
                .map(resolve_env_vars)
                .filter(|key| !key.is_empty()),
            timeout_ms: *timeout_ms,
        },
        other => other.clone(),
    }
}

/// Point the configuration at an HTTP predictor at `url`, keeping any
/// API key and timeout already configured for HTTP.
pub fn apply_predictor_url(config: &mut AdaptiqConfig, url: String) {
    config.predictor = match std::mem::take(&mut config.predictor) {
        PredictorConfig::Http {
            api_key,
            timeout_ms,
            ..
        } => PredictorConfig::Http {
            url,
            api_key,
            timeout_ms,
        },
        _ => PredictorConfig::Http {
            url,
            api_key: None,
            timeout_ms: None,
        },
    };
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `adaptiq.toml` in the current directory
/// 2. `~/.config/adaptiq/config.toml`
///
/// `ADAPTIQ_PREDICTOR_URL` overrides the configured predictor.
pub fn load_config() -> Result<AdaptiqConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AdaptiqConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("adaptiq.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config(&path)?
        }
        None => AdaptiqConfig::default(),
    };

    if let Ok(url) = std::env::var(PREDICTOR_URL_ENV) {
        if !url.is_empty() {
            apply_predictor_url(&mut config, url);
        }
    }

    config.predictor = resolve_predictor_config(&config.predictor);
    Ok(config)
}

fn parse_config(path: &Path) -> Result<AdaptiqConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config = toml::from_str::<AdaptiqConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;

    // Relative pool paths are relative to the config file.
    if let (Some(pool), Some(dir)) = (&config.pool, path.parent()) {
        if pool.is_relative() && !dir.as_os_str().is_empty() {
            config.pool = Some(dir.join(pool));
        }
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptiq"))
}

/// Create a predictor instance from its configuration.
pub fn create_predictor(config: &PredictorConfig) -> Result<Box<dyn Predictor>> {
    match config {
        PredictorConfig::Hold => Ok(Box::new(HoldPredictor)),
        PredictorConfig::Fixed { difficulty } => Ok(Box::new(FixedPredictor::new(*difficulty))),
        PredictorConfig::Http {
            url,
            api_key,
            timeout_ms,
        } => {
            let predictor = match timeout_ms {
                Some(ms) => {
                    HttpPredictor::with_timeout(url, api_key.clone(), Duration::from_millis(*ms))?
                }
                None => HttpPredictor::new(url, api_key.clone())?,
            };
            Ok(Box::new(predictor))
        }
    }
}
