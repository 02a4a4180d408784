use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::ModelTable;
use crate::types::Strategy;

/// Window sizes used by the splitters.
///
/// `chunk_size`/`overlap` count words and drive the plain-text overlap
/// window. `element_chunk_size` counts characters and `element_overlap`
/// counts words; both drive the page-aware window over document elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_overlap")]
    pub overlap: usize,

    #[serde(default = "default_element_chunk_size")]
    pub element_chunk_size: usize,

    #[serde(default = "default_element_overlap")]
    pub element_overlap: usize,

    /// Strategy forced for every document; chosen per document when unset.
    #[serde(default)]
    pub strategy: Option<Strategy>,
}

fn default_chunk_size() -> usize { 100 }
fn default_overlap() -> usize { 20 }
fn default_element_chunk_size() -> usize { 500 }
fn default_element_overlap() -> usize { 50 }

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            element_chunk_size: default_element_chunk_size(),
            element_overlap: default_element_overlap(),
            strategy: None,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        validate_window(self.chunk_size, self.overlap)?;
        validate_window(self.element_chunk_size, self.element_overlap)
    }
}

/// Reject windows that cannot make progress.
pub fn validate_window(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::InvalidConfig("chunk_size must be greater than zero".to_string()));
    }
    if overlap >= chunk_size {
        return Err(Error::InvalidConfig(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

const MULTI_PERIOD: &[&str] = &["U.S.A", "U.S", "U.K", "Ph.D", "e.g", "i.e", "a.m", "p.m"];

const SINGLE_PERIOD: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "vs", "etc", "al", "cf", "Inc", "Ltd", "Co",
    "Corp", "St", "Ave", "Rd", "Blvd", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug",
    "Sep", "Oct", "Nov", "Dec", "Fig", "No", "Vol", "pp", "ed", "trans", "Gen", "Col", "Capt",
    "Lt", "Sgt",
];

/// Abbreviations whose periods never end a sentence. Matching is
/// case-insensitive and anchored at a word boundary.
///
/// `multi_period` entries are written without their final period
/// ("Ph.D"); `single_period` entries without any ("Dr").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationLexicon {
    #[serde(default = "default_multi_period")]
    pub multi_period: Vec<String>,

    #[serde(default = "default_single_period")]
    pub single_period: Vec<String>,
}

fn default_multi_period() -> Vec<String> { MULTI_PERIOD.iter().map(|s| s.to_string()).collect() }
fn default_single_period() -> Vec<String> { SINGLE_PERIOD.iter().map(|s| s.to_string()).collect() }

impl Default for AbbreviationLexicon {
    fn default() -> Self {
        Self { multi_period: default_multi_period(), single_period: default_single_period() }
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load from the current directory.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Merge `config.toml`, `config.<RUST_ENV>.toml` and `APP_*` variables,
    /// resolving the files against `base`.
    pub fn load_from(base: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(base.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The `[chunking]` section, defaulted when absent.
    pub fn chunking(&self) -> anyhow::Result<ChunkingConfig> {
        if !self.has("chunking") {
            return Ok(ChunkingConfig::default());
        }
        let chunking: ChunkingConfig = self.get("chunking")?;
        chunking.validate()?;
        Ok(chunking)
    }

    /// The `[abbreviations]` section, defaulted when absent.
    pub fn lexicon(&self) -> anyhow::Result<AbbreviationLexicon> {
        if !self.has("abbreviations") {
            return Ok(AbbreviationLexicon::default());
        }
        self.get("abbreviations")
    }

    /// The `[models]` table, or the built-in one when absent.
    pub fn models(&self) -> anyhow::Result<ModelTable> {
        if !self.has("models") {
            return Ok(ModelTable::default());
        }
        self.get("models")
    }

    fn has(&self, key: &str) -> bool {
        self.figment.find_value(key).is_ok()
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.chunking()?;
        self.lexicon()?;
        self.models()?;
        Ok(())
    }
}
