use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use arena_bracket::{Format, SeedingMethod};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! from_environment {
    ($config:expr, $($key:expr, $name:tt),*$(,)?) => {{
        $(
            {
                if let Ok(value) = env::var($key) {
                    match value.parse() {
                        Ok(value) => $config.$name = value,
                        Err(_) => log::warn!("Ignoring invalid value for {}: {:?}", $key, value),
                    }
                }
            }
        )*
    }};
}

/// The configuration of the CLI, read from `arena-bracket.toml` and the `AB_*` environment
/// variables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loglevel: LevelFilter,
    /// The path of the state file holding the roster and the bracket.
    pub state: PathBuf,
    /// The default format of new brackets.
    pub format: Format,
    /// The default seeding method of new brackets.
    pub seeding: SeedingMethod,
    /// Makes shuffling reproducible when set.
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let buf = fs::read_to_string(path)?;

        Ok(toml::from_str(&buf)?)
    }

    /// Reads the config file at `path`, falling back to the default config if the file does
    /// not exist.
    pub fn from_file_or_default<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        match Self::from_file(path) {
            Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            res => res,
        }
    }

    pub fn with_environment(mut self) -> Self {
        from_environment!(
            self,
            "AB_LOGLEVEL",
            loglevel,
            "AB_STATE",
            state,
            "AB_FORMAT",
            format,
            "AB_SEEDING",
            seeding,
        );

        if let Ok(value) = env::var("AB_RNG_SEED") {
            match value.parse() {
                Ok(seed) => self.rng_seed = Some(seed),
                Err(_) => log::warn!("Ignoring invalid value for AB_RNG_SEED: {:?}", value),
            }
        }

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: LevelFilter::Warn,
            state: PathBuf::from("tournament.json"),
            format: Format::SingleElimination,
            seeding: SeedingMethod::Auto,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
