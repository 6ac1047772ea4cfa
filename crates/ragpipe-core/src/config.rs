//! Layered settings for chunking and retrieval.
//!
//! Built-in defaults, then `config.toml`, then `config.<env>.toml` (env from
//! `RUST_ENV`, default `dev`), then `APP_*` environment variables where `__`
//! separates sections (`APP_RETRIEVAL__HYBRID_ENABLED=true`).
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunking::ChunkingOptions;
use crate::error::{Error, Result};

pub const DEFAULT_RRF_K: f64 = 60.0;

/// Retrieval defaults. Per-request overrides take precedence over the flags here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalOptions {
    pub hybrid_enabled: bool,
    pub rerank_enabled: bool,
    /// 1.0 = pure relevance, 0.0 = pure diversity.
    pub mmr_lambda: f32,
    /// Each source is asked for `candidate_multiplier * top_k` candidates.
    pub candidate_multiplier: usize,
    pub rrf_k: f64,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self { hybrid_enabled: false, rerank_enabled: false, mmr_lambda: 0.7, candidate_multiplier: 3, rrf_k: DEFAULT_RRF_K }
    }
}

impl RetrievalOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.mmr_lambda) {
            return Err(Error::InvalidConfig(format!("mmr_lambda must be within [0, 1], got {}", self.mmr_lambda)));
        }
        if self.candidate_multiplier == 0 {
            return Err(Error::InvalidConfig("candidate_multiplier must be at least 1".to_string()));
        }
        if !(self.rrf_k.is_finite() && self.rrf_k > 0.0) {
            return Err(Error::InvalidConfig(format!("rrf_k must be a positive number, got {}", self.rrf_k)));
        }
        Ok(())
    }
}

/// Locations used by the command line front end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataSettings {
    pub raw_txt_dir: String,
    pub index_dir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { raw_txt_dir: "data/txt".to_string(), index_dir: "data/indexes/tantivy".to_string() }
    }
}

impl DataSettings {
    pub fn raw_txt_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.raw_txt_dir)
    }

    pub fn index_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.index_dir)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingOptions,
    pub retrieval: RetrievalOptions,
    pub data: DataSettings,
}

pub struct Config {
    figment: Figment,
    settings: Settings,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            other => tracing::debug!(env = other, "no environment specific config file"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.chunking.validate()?;
        settings.retrieval.validate()?;
        Ok(Self { figment, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }
}

/// Expands a leading `~` and `${VAR}`/`$VAR` references without canonicalizing.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let raw = input.as_ref();
    let with_env = shellexpand::env(raw).unwrap_or(std::borrow::Cow::Borrowed(raw));
    PathBuf::from(shellexpand::tilde(&with_env).into_owned())
}

/// Absolute paths pass through; relative ones are joined onto `base` after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
