//! # Tournament Options
//!
//! Some formats accept additional configuration that changes how the bracket is built or
//! ranked. An example would be including a match for the third place in a single elimination
//! tournament, or defining the number of rounds played in a swiss tournament.
//!
//! This module provides this kind of configuration via [`TournamentOption`] using a key-value map.
//! [`OptionValue`] contains all types supported. Values are kept in a sorted map so that a
//! serialized bracket always lists its options in the same order.
mod serde_impl;

use std::collections::btree_map::{Iter, Keys};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown key {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: expected {expected}, found {found}")]
    InvalidValue {
        key: String,
        found: &'static str,
        expected: &'static str,
    },
    #[error("value for {key} out of range: {value} is greater than {max}")]
    OutOfRange { key: String, value: u64, max: u64 },
    #[error("invalid value {0:?}: expected a bool or an unsigned integer")]
    InvalidLiteral(String),
}

/// The options accepted by a format, including a human readable name and the default value of
/// every option. [`TournamentOptionValues`] should be used when just expecting a list of
/// key-value pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentOptions(BTreeMap<String, TournamentOption>);

impl TournamentOptions {
    /// Creates a new [`Builder`].
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the option with the given `key`. Returns `None` if the given key does not exist.
    pub fn get(&self, key: &str) -> Option<&TournamentOption> {
        self.0.get(key)
    }

    /// Returns an iterator over all keys.
    pub fn keys(&self) -> Keys<'_, String, TournamentOption> {
        self.0.keys()
    }

    /// Returns an iterator over all [`TournamentOption`]s.
    pub fn iter(&self) -> Iter<'_, String, TournamentOption> {
        self.0.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A list of key-values for a tournament which only contains the values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentOptionValues(BTreeMap<String, OptionValue>);

impl TournamentOptionValues {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the [`OptionValue`] with the given `key`. Returns `None` if no value exist for the
    /// given `key`.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: ToString,
        V: Into<OptionValue>,
    {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn iter(&self) -> Iter<'_, String, OptionValue> {
        self.0.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the boolean stored under `key`, or `default` if the key is missing or holds
    /// another type.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(OptionValue::Bool(val)) => *val,
            _ => default,
        }
    }

    /// Returns the unsigned integer stored under `key`, or `default` if the key is missing or
    /// holds another type.
    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        match self.get(key) {
            Some(OptionValue::U64(val)) => *val,
            _ => default,
        }
    }

    /// Validates the values against the accepted `options` and fills every missing key with its
    /// default value.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a key is not accepted by `options` or a value has a different
    /// type than the default value of its option.
    pub fn merge(mut self, options: TournamentOptions) -> Result<Self, Error> {
        for (key, value) in self.0.iter() {
            let default_value = match options.0.get(key) {
                Some(option) => &option.value,
                None => return Err(Error::UnknownKey(key.to_owned())),
            };

            if default_value.value_type() != value.value_type() {
                return Err(Error::InvalidValue {
                    key: key.to_owned(),
                    found: value.value_type(),
                    expected: default_value.value_type(),
                });
            }
        }

        // Fill the unassigned fields with defaults.
        for (key, option) in options.0.into_iter() {
            self.0.entry(key).or_insert(option.value);
        }

        Ok(self)
    }
}

impl FromIterator<(String, OptionValue)> for TournamentOptionValues {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (String, OptionValue)>,
    {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentOption {
    pub name: String,
    pub value: OptionValue,
}

/// The value of a [`TournamentOption`]. Every option of a format is either a switch or a count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    U64(u64),
}

impl OptionValue {
    /// Returns the name of the type of this value.
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U64(_) => "u64",
        }
    }
}

impl Display for OptionValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(val) => Display::fmt(val, f),
            Self::U64(val) => Display::fmt(val, f),
        }
    }
}

/// Parses a value as typed on a command line: `true`/`false` or an unsigned integer.
impl FromStr for OptionValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::Bool(true)),
            "false" => Ok(Self::Bool(false)),
            _ => s
                .parse()
                .map(Self::U64)
                .map_err(|_| Error::InvalidLiteral(s.to_owned())),
        }
    }
}

impl From<bool> for OptionValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for OptionValue {
    #[inline]
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Builder {
    options: TournamentOptions,
}

impl Builder {
    pub fn option<T, V>(mut self, key: &'static str, name: T, value: V) -> Self
    where
        T: ToString,
        V: Into<OptionValue>,
    {
        self.options.0.insert(
            key.to_string(),
            TournamentOption {
                name: name.to_string(),
                value: value.into(),
            },
        );
        self
    }

    #[inline]
    pub fn build(self) -> TournamentOptions {
        self.options
    }
}
