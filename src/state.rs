use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{BracketTag, Error, MatchId, ParticipantId, Result};

/// A spot for a participant in a [`Match`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Participant(ParticipantId),
    /// A permanently empty spot. The opponent advances without playing.
    Bye,
    /// A spot that is filled once a previous match completes.
    TBD,
}

impl Slot {
    /// Returns the participant in this `Slot`, if any.
    #[inline]
    pub fn participant(&self) -> Option<ParticipantId> {
        match self {
            Self::Participant(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns `true` if the `Slot` is [`Participant`].
    ///
    /// [`Participant`]: Self::Participant
    #[inline]
    pub fn is_participant(&self) -> bool {
        matches!(self, Self::Participant(_))
    }

    /// Returns `true` if the `Slot` is [`Bye`].
    ///
    /// [`Bye`]: Self::Bye
    #[inline]
    pub fn is_bye(&self) -> bool {
        matches!(self, Self::Bye)
    }

    /// Returns `true` if the `Slot` is [`TBD`].
    ///
    /// [`TBD`]: Self::TBD
    #[inline]
    pub fn is_tbd(&self) -> bool {
        matches!(self, Self::TBD)
    }
}

impl From<ParticipantId> for Slot {
    #[inline]
    fn from(id: ParticipantId) -> Self {
        Self::Participant(id)
    }
}

/// The lifecycle state of a [`Match`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// At least one slot is not filled with a participant.
    Pending,
    /// Both slots hold a participant and no winner is recorded.
    InProgress,
    /// The winner is recorded.
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A match between two [`Slot`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    id: MatchId,
    round: u32,
    position: usize,
    bracket: Option<BracketTag>,
    entrants: [Slot; 2],
    status: MatchStatus,
    winner: Option<ParticipantId>,
}

/// What happened to a match after its slots changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Settle {
    /// Both participants are known, the match can be played.
    Ready,
    /// At least one slot is still [`Slot::TBD`].
    Waiting,
    /// The match completed without being played.
    Bye(ParticipantId),
    /// Both slots are [`Slot::Bye`].
    Void,
}

impl Match {
    pub(crate) fn new(
        id: MatchId,
        round: u32,
        position: usize,
        bracket: Option<BracketTag>,
        entrants: [Slot; 2],
    ) -> Self {
        Self {
            id,
            round,
            position,
            bracket,
            entrants,
            status: MatchStatus::Pending,
            winner: None,
        }
    }

    /// Creates a `Match` from raw persisted parts without checking any invariant.
    pub(crate) fn from_parts(
        id: MatchId,
        round: u32,
        position: usize,
        bracket: Option<BracketTag>,
        entrants: [Slot; 2],
        status: MatchStatus,
        winner: Option<ParticipantId>,
    ) -> Self {
        Self {
            id,
            round,
            position,
            bracket,
            entrants,
            status,
            winner,
        }
    }

    #[inline]
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Returns the 1-based number of the round within its bracket.
    #[inline]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Returns the 0-based position of the match within its round.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn bracket(&self) -> Option<BracketTag> {
        self.bracket
    }

    #[inline]
    pub fn entrants(&self) -> &[Slot; 2] {
        &self.entrants
    }

    #[inline]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    #[inline]
    pub fn winner(&self) -> Option<ParticipantId> {
        self.winner
    }

    /// Returns the participant that lost a completed match that was played.
    pub fn loser(&self) -> Option<ParticipantId> {
        let winner = self.winner?;
        self.entrants
            .iter()
            .filter_map(Slot::participant)
            .find(|id| *id != winner)
    }

    /// Returns `true` if both slots hold a participant.
    #[inline]
    pub fn is_played(&self) -> bool {
        self.entrants.iter().all(Slot::is_participant)
    }

    /// Returns `true` if the given participant plays in this match.
    #[inline]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.entrants.contains(&Slot::Participant(id))
    }

    /// Records `winner` as the winner of the match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the match is not in progress and
    /// [`Error::WinnerNotInMatch`] if `winner` is not one of the two participants.
    pub(crate) fn report(&mut self, winner: ParticipantId) -> Result<()> {
        if self.status != MatchStatus::InProgress {
            return Err(self.transition_error(MatchStatus::Completed));
        }

        if !self.contains(winner) {
            return Err(Error::WinnerNotInMatch {
                id: self.id,
                winner,
            });
        }

        self.status = MatchStatus::Completed;
        self.winner = Some(winner);
        Ok(())
    }

    /// Checks that the match can be reopened: it must be completed and both slots must hold a
    /// participant.
    pub(crate) fn check_reopen(&self) -> Result<()> {
        if self.status != MatchStatus::Completed || !self.is_played() {
            return Err(self.transition_error(MatchStatus::InProgress));
        }

        Ok(())
    }

    /// Reverts a completed played match to in progress.
    pub(crate) fn reopen(&mut self) -> Result<()> {
        self.check_reopen()?;
        self.status = MatchStatus::InProgress;
        self.winner = None;
        Ok(())
    }

    /// Updates the status after the slots changed. A match with a single participant facing a
    /// bye completes with that participant as the winner.
    ///
    /// Must not be called on a completed match.
    pub(crate) fn settle(&mut self) -> Settle {
        debug_assert_ne!(self.status, MatchStatus::Completed);

        match self.entrants {
            [Slot::Participant(_), Slot::Participant(_)] => {
                self.status = MatchStatus::InProgress;
                Settle::Ready
            }
            [Slot::Participant(id), Slot::Bye] | [Slot::Bye, Slot::Participant(id)] => {
                self.status = MatchStatus::Completed;
                self.winner = Some(id);
                Settle::Bye(id)
            }
            [Slot::Bye, Slot::Bye] => {
                self.status = MatchStatus::Pending;
                Settle::Void
            }
            _ => {
                self.status = MatchStatus::Pending;
                Settle::Waiting
            }
        }
    }

    /// Returns the slots forwarded to the next matches as `(winner, loser)`. A void match
    /// forwards a [`Slot::Bye`] as both. Returns `None` if the match has no outcome yet.
    pub(crate) fn outcome(&self) -> Option<(Slot, Slot)> {
        if self.entrants == [Slot::Bye, Slot::Bye] {
            return Some((Slot::Bye, Slot::Bye));
        }

        let winner = self.winner?;
        let loser = match self.entrants {
            [Slot::Participant(id), other] | [other, Slot::Participant(id)] if id == winner => {
                other
            }
            _ => return None,
        };

        Some((Slot::Participant(winner), loser))
    }

    /// Writes `value` into the slot at `index`. The status is not updated, see [`settle`].
    ///
    /// [`settle`]: Self::settle
    pub(crate) fn set_slot(&mut self, index: usize, value: Slot) {
        self.entrants[index] = value;
    }

    /// Clears the slot at `index` and reverts the match to pending.
    pub(crate) fn clear_slot(&mut self, index: usize) {
        self.entrants[index] = Slot::TBD;
        self.status = MatchStatus::Pending;
        self.winner = None;
    }

    fn transition_error(&self, to: MatchStatus) -> Error {
        Error::InvalidTransition {
            id: self.id,
            from: self.status,
            to,
        }
    }
}
