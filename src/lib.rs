//! # arena-bracket
//!
//! This crate contains the bracket engine used for hosting tournaments. It turns an ordered list
//! of participants into a [`Bracket`], tracks match results and advances participants until a
//! champion is determined.
//!
//! Important types:
//! - [`Tournament`]: The operations surface binding a [`Roster`], a [`Seeding`] and a
//! [`Bracket`].
//! - [`Seeding`]: Produces the seed order of the participants.
//! - [`Bracket`]: The rounds and matches of one tournament, built for a [`Format`].
//! - [`Match`]: A *match* or *heat* of two parties, governed by [`MatchStatus`].
//! - [`Slot`]: A *spot* within a match, which can contain a participant, be permanently empty
//! (a bye) or be not decided yet.
//! - [`Standings`]: The win/loss table of a bracket.
//!
//! Four formats are supported: single elimination, double elimination, round robin and swiss.
//! Every format can be configured using [`options`].
//!
//! A [`Bracket`] is persisted as a JSON blob using [`Bracket::serialize`] and restored using
//! [`Bracket::deserialize`], which validates the blob against the format.
pub mod options;
pub mod standings;

mod bracket;
mod double_elimination;
mod id;
mod participant;
mod progression;
mod round_robin;
mod seeding;
mod serialize;
mod single_elimination;
mod state;
mod swiss;
mod tournament;
mod utils;

pub use bracket::{Bracket, BracketStatus, BracketTag, Format, MatchRef, Round};
pub use id::{MatchId, ParticipantId};
pub use participant::{Participant, Roster};
pub use seeding::{Seeding, SeedingMethod};
pub use standings::Standings;
pub use state::{Match, MatchStatus, Slot};
pub use tournament::Tournament;

use double_elimination::DoubleElimination;
use options::TournamentOptions;
use round_robin::RoundRobin;
use single_elimination::SingleElimination;
use swiss::Swiss;

use thiserror::Error;

use std::result;

/// An `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid number of participants: at least 2 are required, found {0}")]
    InvalidParticipantCount(usize),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("unsupported seeding method: {0}")]
    UnsupportedSeeding(String),
    #[error("incomplete ordering: expected a permutation of {expected} participants")]
    IncompleteOrdering { expected: usize },
    #[error("duplicate participant {0}")]
    DuplicateParticipant(ParticipantId),
    #[error("invalid option: {0}")]
    InvalidOption(#[from] options::Error),
    #[error("no match with id {0}")]
    MatchNotFound(MatchId),
    #[error("invalid transition of match {id}: cannot move from {from} to {to}")]
    InvalidTransition {
        id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    },
    #[error("participant {winner} does not play in match {id}")]
    WinnerNotInMatch { id: MatchId, winner: ParticipantId },
    #[error("malformed bracket data: {0}")]
    MalformedBracketData(String),
    #[error("no valid pairing exists for round {round}")]
    PairingExhausted { round: u32 },
    #[error("failed to serialize bracket: {0}")]
    Serialization(String),
}

/// Information about the matches a participant moves to after a match completes.
///
/// Each target is the match and the index of the slot within that match.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct NextMatches {
    pub winner: Option<(MatchRef, usize)>,
    pub loser: Option<(MatchRef, usize)>,
}

impl NextMatches {
    #[inline]
    pub fn new(winner: Option<(MatchRef, usize)>, loser: Option<(MatchRef, usize)>) -> Self {
        Self { winner, loser }
    }

    #[inline]
    pub fn winner(round: usize, position: usize, slot: usize) -> Self {
        Self::new(Some((MatchRef::new(round, position), slot)), None)
    }
}

/// A tournament system.
///
/// A system only describes the layout and the rules of a format; the state lives in the
/// [`Bracket`] passed to every method.
pub(crate) trait System {
    /// Returns the [`TournamentOptions`] accepted by this system.
    fn options(&self) -> TournamentOptions;

    /// Resolves option values that depend on the number of participants after the values were
    /// merged with the defaults.
    fn resolve_options(
        &self,
        _participants: usize,
        _options: &mut options::TournamentOptionValues,
    ) -> Result<()> {
        Ok(())
    }

    /// Pushes the initial rounds into the empty `bracket`.
    fn build(&self, bracket: &mut Bracket);

    /// Returns the [`NextMatches`] of the match at `at`.
    fn next_matches(&self, bracket: &Bracket, at: MatchRef) -> NextMatches;

    /// Called after the match at `at` completed and its participants were forwarded.
    fn match_completed(&self, _bracket: &mut Bracket, _at: MatchRef) -> Result<()> {
        Ok(())
    }

    /// Called before the match at `at` is reopened.
    fn match_reopened(&self, _bracket: &mut Bracket, _at: MatchRef) {}

    /// Returns `true` if the tournament has concluded.
    fn is_finished(&self, bracket: &Bracket) -> bool;

    /// Returns the champion of a concluded tournament.
    fn champion(&self, bracket: &Bracket) -> Option<ParticipantId>;
}

/// Returns the [`System`] implementing `format`.
pub(crate) fn system(format: Format) -> &'static dyn System {
    match format {
        Format::SingleElimination => &SingleElimination,
        Format::DoubleElimination => &DoubleElimination,
        Format::RoundRobin => &RoundRobin,
        Format::Swiss => &Swiss,
    }
}

#[cfg(test)]
mod tests {
    #[macro_export]
    macro_rules! option_values {
        ($($key:expr => $val:expr),*$(,)?) => {{
            let mut options = $crate::options::TournamentOptionValues::new();
            $(
                options.set($key, $val);
            )*

            options
        }};
    }

    #[macro_export]
    macro_rules! seeds {
        ($($x:expr),*$(,)?) => {
            vec![$($crate::ParticipantId($x)),*]
        };
    }
}
