//! Figment-backed configuration loader and path helpers.
//!
//! Merges `config.toml` + `config.<env>.toml` + `APP_*` env vars. Typed
//! sections (`[pipeline]`, `[chunking]`, `[generation.<backend>]`) are pulled
//! out by the crates that own them via [`Config::get`] or
//! [`Config::section_or_default`].

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load `config.toml` + `config.<RUST_ENV>.toml` from the working directory,
    /// then `APP_*` env vars (`__` separates nested keys).
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::from_dir(Path::new("."), &env_name)
    }

    pub fn from_dir(dir: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Build from an in-memory value, mostly for tests and embedding callers.
    pub fn from_serialized<T: Serialize>(value: &T) -> Self {
        Self { figment: Figment::from(Serialized::defaults(value)) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    /// Like [`get`](Self::get) but falls back to `T::default()` when `key` is absent.
    pub fn section_or_default<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        if self.figment.contains(key) { self.get(key) } else { Ok(T::default()) }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.figment.contains(key)
    }

    fn validate(&self) -> Result<()> {
        if self.figment.contains("generation") {
            let table: figment::value::Dict = self.get("generation")?;
            if table.is_empty() {
                return Err(Error::InvalidConfig("[generation] is present but configures no backend".into()));
            }
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
