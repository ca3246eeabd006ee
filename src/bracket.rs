use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::options::{TournamentOptionValues, TournamentOptions};
use crate::standings::Standings;
use crate::state::{Match, MatchStatus, Slot};
use crate::{progression, system, Error, MatchId, ParticipantId, Result};

/// The format of a tournament.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleElimination => "single_elimination",
            Self::DoubleElimination => "double_elimination",
            Self::RoundRobin => "round_robin",
            Self::Swiss => "swiss",
        }
    }

    /// Returns the [`TournamentOptions`] accepted by this format.
    #[inline]
    pub fn options(&self) -> TournamentOptions {
        system(*self).options()
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single_elimination" => Ok(Self::SingleElimination),
            "double_elimination" => Ok(Self::DoubleElimination),
            "round_robin" => Ok(Self::RoundRobin),
            "swiss" => Ok(Self::Swiss),
            _ => Err(Error::UnsupportedFormat(s.to_owned())),
        }
    }
}

/// The overall state of a [`Bracket`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl BracketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl Display for BracketStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of a tournament a [`Round`] belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketTag {
    Winners,
    Losers,
    GrandFinal,
    ThirdPlace,
}

/// The address of a [`Match`] within a [`Bracket`]: the index of its round and its position
/// within that round.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchRef {
    pub round: usize,
    pub position: usize,
}

impl MatchRef {
    #[inline]
    pub const fn new(round: usize, position: usize) -> Self {
        Self { round, position }
    }
}

/// A list of matches sharing a round number and bracket tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    number: u32,
    bracket: Option<BracketTag>,
    matches: Vec<Match>,
}

impl Round {
    pub(crate) fn new(number: u32, bracket: Option<BracketTag>, matches: Vec<Match>) -> Self {
        Self {
            number,
            bracket,
            matches,
        }
    }

    /// Returns the 1-based number of the round within its bracket.
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn bracket(&self) -> Option<BracketTag> {
        self.bracket
    }

    #[inline]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Returns `true` if every match of the round is completed.
    pub fn is_completed(&self) -> bool {
        self.matches
            .iter()
            .all(|m| m.status() == MatchStatus::Completed)
    }
}

/// The rounds and matches of a tournament.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bracket {
    format: Format,
    status: BracketStatus,
    options: TournamentOptionValues,
    seeds: Vec<ParticipantId>,
    rounds: Vec<Round>,
}

impl Bracket {
    /// Builds a new `Bracket` for the participants in `seeds`, given in seed order.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if less than two participants are given, a participant is given
    /// twice or the `options` are invalid for the `format`.
    pub fn new(
        format: Format,
        seeds: Vec<ParticipantId>,
        options: TournamentOptionValues,
    ) -> Result<Self> {
        if seeds.len() < 2 {
            return Err(Error::InvalidParticipantCount(seeds.len()));
        }

        let mut seen = HashSet::with_capacity(seeds.len());
        for id in &seeds {
            if !seen.insert(*id) {
                return Err(Error::DuplicateParticipant(*id));
            }
        }

        let system = system(format);
        let mut options = options.merge(system.options())?;
        system.resolve_options(seeds.len(), &mut options)?;
        log::debug!("Using options: {:?}", options);

        log::debug!(
            "Creating new {} bracket with {} participants",
            format,
            seeds.len()
        );

        let mut bracket = Self {
            format,
            status: BracketStatus::NotStarted,
            options,
            seeds,
            rounds: Vec::new(),
        };

        system.build(&mut bracket);
        progression::settle_all(system, &mut bracket)?;
        bracket.refresh_status();

        log::debug!(
            "Created new {} bracket with {} rounds and {} matches",
            format,
            bracket.rounds.len(),
            bracket.matches().count()
        );

        Ok(bracket)
    }

    /// Creates a `Bracket` from persisted parts. The caller validates the result.
    pub(crate) fn from_parts(
        format: Format,
        status: BracketStatus,
        options: TournamentOptionValues,
        seeds: Vec<ParticipantId>,
        rounds: Vec<Round>,
    ) -> Self {
        Self {
            format,
            status,
            options,
            seeds,
            rounds,
        }
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    #[inline]
    pub fn status(&self) -> BracketStatus {
        self.status
    }

    /// Returns the option values of the bracket, including all defaults.
    #[inline]
    pub fn options(&self) -> &TournamentOptionValues {
        &self.options
    }

    /// Returns the participants in seed order. The first participant has seed 1.
    #[inline]
    pub fn seeds(&self) -> &[ParticipantId] {
        &self.seeds
    }

    /// Returns the 1-based seed of the participant.
    pub fn seed(&self, id: ParticipantId) -> Option<usize> {
        self.seeds.iter().position(|s| *s == id).map(|i| i + 1)
    }

    #[inline]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Returns an iterator over all matches in round order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> + '_ {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    /// Returns the address of the match with the given `id`.
    pub fn find(&self, id: MatchId) -> Option<MatchRef> {
        self.rounds.iter().enumerate().find_map(|(round, r)| {
            r.matches
                .iter()
                .position(|m| m.id() == id)
                .map(|position| MatchRef::new(round, position))
        })
    }

    /// Returns the match with the given `id`.
    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.find(id).map(|at| &self[at])
    }

    /// Returns the index of the round with the given bracket tag and number.
    pub fn round_index(&self, bracket: Option<BracketTag>, number: u32) -> Option<usize> {
        self.rounds
            .iter()
            .position(|r| r.bracket == bracket && r.number == number)
    }

    /// Returns the winner of the tournament once it has concluded.
    pub fn champion(&self) -> Option<ParticipantId> {
        system(self.format).champion(self)
    }

    /// Returns the current standings of all participants.
    pub fn standings(&self) -> Standings {
        Standings::new(self)
    }

    /// Returns the number of matches that completed without being played.
    pub fn byes(&self) -> usize {
        self.matches()
            .filter(|m| m.status() == MatchStatus::Completed && !m.is_played())
            .count()
    }

    /// Records `winner` as the winner of the match with the given `id` and advances the
    /// participants.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the match does not exist, is not in progress or `winner`
    /// does not play in it. The bracket is left unchanged on error.
    pub fn report_result(&mut self, id: MatchId, winner: ParticipantId) -> Result<()> {
        let mut next = self.clone();
        next.apply_result(id, winner)?;
        *self = next;
        Ok(())
    }

    /// Reverts the completed match with the given `id` to in progress and clears every result
    /// that depends on it.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the match does not exist or is not a completed played
    /// match. The bracket is left unchanged on error.
    pub fn reopen(&mut self, id: MatchId) -> Result<()> {
        let mut next = self.clone();
        next.apply_reopen(id)?;
        *self = next;
        Ok(())
    }

    /// Applies a result in place. On error `self` may be partially updated.
    pub(crate) fn apply_result(&mut self, id: MatchId, winner: ParticipantId) -> Result<()> {
        let at = self.find(id).ok_or(Error::MatchNotFound(id))?;
        log::debug!("Reporting {} as the winner of match {}", winner, id);

        self[at].report(winner)?;
        progression::completed(system(self.format), self, at)?;
        self.refresh_status();
        Ok(())
    }

    fn apply_reopen(&mut self, id: MatchId) -> Result<()> {
        let at = self.find(id).ok_or(Error::MatchNotFound(id))?;
        self[at].check_reopen()?;
        log::debug!("Reopening match {}", id);

        let system = system(self.format);
        system.match_reopened(self, at);
        progression::retract(system, self, at);
        self[at].reopen()?;
        self.refresh_status();
        Ok(())
    }

    /// Returns the status derived from the matches of the bracket.
    pub(crate) fn derived_status(&self) -> BracketStatus {
        if system(self.format).is_finished(self) {
            BracketStatus::Completed
        } else if self
            .matches()
            .any(|m| m.is_played() && m.status() == MatchStatus::Completed)
        {
            BracketStatus::InProgress
        } else {
            BracketStatus::NotStarted
        }
    }

    pub(crate) fn refresh_status(&mut self) {
        self.status = self.derived_status();
    }

    /// Appends a round with the given slots. Match ids continue after the last match, the round
    /// number continues after the last round with the same tag. Returns the index of the new
    /// round.
    pub(crate) fn push_round(&mut self, bracket: Option<BracketTag>, slots: Vec<[Slot; 2]>) -> usize {
        let number = self.rounds.iter().filter(|r| r.bracket == bracket).count() as u32 + 1;
        let first_id = self.matches().count() as u64;

        let matches = slots
            .into_iter()
            .enumerate()
            .map(|(position, entrants)| {
                Match::new(
                    MatchId(first_id + position as u64),
                    number,
                    position,
                    bracket,
                    entrants,
                )
            })
            .collect();

        self.rounds.push(Round::new(number, bracket, matches));
        self.rounds.len() - 1
    }

    /// Removes all rounds from index `len` onwards.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.rounds.truncate(len);
    }

    /// Returns the slot of the participant with the given 0-based seed index. Indices beyond the
    /// number of participants are byes.
    pub(crate) fn seed_slot(&self, index: usize) -> Slot {
        match self.seeds.get(index) {
            Some(id) => Slot::Participant(*id),
            None => Slot::Bye,
        }
    }
}

impl Index<MatchRef> for Bracket {
    type Output = Match;

    #[inline]
    fn index(&self, index: MatchRef) -> &Self::Output {
        &self.rounds[index.round].matches[index.position]
    }
}

impl IndexMut<MatchRef> for Bracket {
    #[inline]
    fn index_mut(&mut self, index: MatchRef) -> &mut Self::Output {
        &mut self.rounds[index.round].matches[index.position]
    }
}

#[cfg(test)]
mod tests {
    use super::{Bracket, BracketStatus, Format};
    use crate::options::TournamentOptionValues;
    use crate::{option_values, seeds, Error, MatchId, MatchStatus, ParticipantId, Slot};

    #[test]
    fn test_format_parse() {
        assert_eq!("swiss".parse::<Format>().unwrap(), Format::Swiss);
        assert_eq!(
            "double_elimination".parse::<Format>().unwrap(),
            Format::DoubleElimination
        );
        assert_eq!(
            "ladder".parse::<Format>().unwrap_err(),
            Error::UnsupportedFormat(String::from("ladder"))
        );
        assert_eq!(Format::RoundRobin.to_string(), "round_robin");
    }

    #[test]
    fn test_bracket_new_errors() {
        assert_eq!(
            Bracket::new(Format::Swiss, seeds![1], TournamentOptionValues::new()).unwrap_err(),
            Error::InvalidParticipantCount(1)
        );
        assert_eq!(
            Bracket::new(
                Format::RoundRobin,
                seeds![1, 2, 1],
                TournamentOptionValues::new()
            )
            .unwrap_err(),
            Error::DuplicateParticipant(ParticipantId(1))
        );
        assert!(matches!(
            Bracket::new(
                Format::SingleElimination,
                seeds![1, 2],
                option_values!("rounds" => 3u64)
            ),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn test_bracket_report_atomic() {
        let mut bracket = Bracket::new(
            Format::SingleElimination,
            seeds![1, 2, 3, 4],
            TournamentOptionValues::new(),
        )
        .unwrap();
        assert_eq!(bracket.status(), BracketStatus::NotStarted);

        let before = bracket.clone();
        assert_eq!(
            bracket.report_result(MatchId(99), ParticipantId(1)),
            Err(Error::MatchNotFound(MatchId(99)))
        );
        assert_eq!(
            bracket.report_result(MatchId(2), ParticipantId(1)),
            Err(Error::InvalidTransition {
                id: MatchId(2),
                from: MatchStatus::Pending,
                to: MatchStatus::Completed,
            })
        );
        assert_eq!(bracket, before);

        bracket.report_result(MatchId(0), ParticipantId(4)).unwrap();
        assert_eq!(bracket.status(), BracketStatus::InProgress);
        assert_eq!(
            bracket.get(MatchId(2)).unwrap().entrants(),
            &[Slot::Participant(ParticipantId(4)), Slot::TBD]
        );
        assert_eq!(bracket.seed(ParticipantId(4)), Some(4));
    }
}
