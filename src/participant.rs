use std::collections::HashSet;
use std::ops::Deref;
use std::slice::Iter;
use std::vec::IntoIter;

use serde::{Deserialize, Serialize};

use crate::{Error, ParticipantId, Result};

/// A participant of a tournament as supplied by the registration system.
///
/// The engine never changes a `Participant`. Its seed is the position in the seed list of the
/// [`Bracket`] it plays in.
///
/// [`Bracket`]: crate::Bracket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    /// An optional external rank used by the rank-based seeding methods.
    #[serde(default, rename = "seed_rank", skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl Participant {
    /// Creates a new unranked `Participant`.
    pub fn new<T>(id: u64, display_name: T) -> Self
    where
        T: ToString,
    {
        Self {
            id: ParticipantId(id),
            display_name: display_name.to_string(),
            rank: None,
        }
    }

    /// Sets the external rank of the `Participant`.
    #[inline]
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }
}

/// The participants of a tournament in registration order.
///
/// This is a wrapper around a `Vec<Participant>` that only hands out shared references; the
/// roster is a snapshot owned by the registration system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    /// Creates a new empty `Roster`.
    #[inline]
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
        }
    }

    /// Returns the participant with the given `id`.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    #[inline]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.get(id).is_some()
    }

    /// Returns an iterator over the ids of all participants in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().map(|p| p.id)
    }

    /// Checks that no two participants share an id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParticipant`] with the first repeated id.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.participants.len());
        for participant in &self.participants {
            if !seen.insert(participant.id) {
                return Err(Error::DuplicateParticipant(participant.id));
            }
        }

        Ok(())
    }
}

impl Deref for Roster {
    type Target = [Participant];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.participants
    }
}

impl FromIterator<Participant> for Roster {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Participant>,
    {
        Self {
            participants: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Roster {
    type Item = Participant;
    type IntoIter = IntoIter<Participant>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.participants.into_iter()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Participant;
    type IntoIter = Iter<'a, Participant>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.participants.iter()
    }
}

impl From<Vec<Participant>> for Roster {
    #[inline]
    fn from(participants: Vec<Participant>) -> Self {
        Self { participants }
    }
}
