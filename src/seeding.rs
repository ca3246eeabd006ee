use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, ParticipantId, Result, Roster};

/// The method used to order the participants of a [`Roster`] into seeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Seeding {
    /// Seeds by external rank, rank 1 being the best. Unranked participants follow in
    /// registration order.
    Auto,
    /// Seeds by external rank descending, treating the rank as a rating. Unranked participants
    /// follow in registration order.
    Ranks,
    /// An explicit order, which must be a permutation of the roster.
    Manual(Vec<ParticipantId>),
    /// A uniform random permutation.
    Shuffle,
    /// The registration order.
    Reset,
}

impl Seeding {
    /// Creates a `Seeding` from a [`SeedingMethod`]. The `order` is only used by
    /// [`SeedingMethod::Manual`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteOrdering`] if the method is manual but no `order` is given.
    pub fn from_method(method: SeedingMethod, order: Option<Vec<ParticipantId>>) -> Result<Self> {
        Ok(match method {
            SeedingMethod::Auto => Self::Auto,
            SeedingMethod::Ranks => Self::Ranks,
            SeedingMethod::Manual => match order {
                Some(order) => Self::Manual(order),
                None => return Err(Error::IncompleteOrdering { expected: 0 }),
            },
            SeedingMethod::Shuffle => Self::Shuffle,
            SeedingMethod::Reset => Self::Reset,
        })
    }

    #[inline]
    pub fn method(&self) -> SeedingMethod {
        match self {
            Self::Auto => SeedingMethod::Auto,
            Self::Ranks => SeedingMethod::Ranks,
            Self::Manual(_) => SeedingMethod::Manual,
            Self::Shuffle => SeedingMethod::Shuffle,
            Self::Reset => SeedingMethod::Reset,
        }
    }

    /// Returns the ids of the participants in `roster` in seed order. `rng` is only used by
    /// [`Seeding::Shuffle`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteOrdering`] if a manual order is not a permutation of the
    /// roster.
    pub fn order<R>(&self, roster: &Roster, rng: &mut R) -> Result<Vec<ParticipantId>>
    where
        R: Rng + ?Sized,
    {
        log::debug!(
            "Ordering {} participants using {} seeding",
            roster.len(),
            self.method()
        );

        match self {
            Self::Auto => {
                let mut participants: Vec<_> = roster.iter().collect();
                // Stable, so ties keep the registration order.
                participants.sort_by_key(|p| (p.rank.is_none(), p.rank));
                Ok(participants.into_iter().map(|p| p.id).collect())
            }
            Self::Ranks => {
                let mut participants: Vec<_> = roster.iter().collect();
                participants.sort_by_key(|p| (p.rank.is_none(), Reverse(p.rank)));
                Ok(participants.into_iter().map(|p| p.id).collect())
            }
            Self::Manual(order) => {
                let expected = roster.len();
                let mut seen = HashSet::with_capacity(order.len());

                let is_permutation = order.len() == expected
                    && order
                        .iter()
                        .all(|id| roster.contains(*id) && seen.insert(*id));

                if !is_permutation {
                    return Err(Error::IncompleteOrdering { expected });
                }

                Ok(order.clone())
            }
            Self::Shuffle => {
                let mut order: Vec<_> = roster.ids().collect();
                order.shuffle(rng);
                Ok(order)
            }
            Self::Reset => Ok(roster.ids().collect()),
        }
    }
}

/// The name of a seeding method, without the data some methods carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    Auto,
    Ranks,
    Manual,
    Shuffle,
    Reset,
}

impl SeedingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Ranks => "ranks",
            Self::Manual => "manual",
            Self::Shuffle => "shuffle",
            Self::Reset => "reset",
        }
    }
}

impl Display for SeedingMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeedingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "ranks" => Ok(Self::Ranks),
            "manual" => Ok(Self::Manual),
            "shuffle" => Ok(Self::Shuffle),
            "reset" => Ok(Self::Reset),
            _ => Err(Error::UnsupportedSeeding(s.to_owned())),
        }
    }
}
