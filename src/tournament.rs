use rand::Rng;

use crate::options::TournamentOptionValues;
use crate::{
    Bracket, Error, Format, MatchId, Participant, ParticipantId, Result, Roster, Seeding,
    Standings,
};

/// A tournament: the [`Roster`] of participants, the [`Seeding`] used to order them and the
/// [`Bracket`] being played.
///
/// Every mutating method either succeeds or leaves the tournament unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tournament {
    roster: Roster,
    seeding: Seeding,
    bracket: Bracket,
}

impl Tournament {
    /// Builds a new `Tournament` using the thread-local random number generator for shuffling.
    ///
    /// # Errors
    ///
    /// See [`build_with_rng`].
    ///
    /// [`build_with_rng`]: Self::build_with_rng
    pub fn build(
        roster: Roster,
        format: Format,
        seeding: Seeding,
        options: TournamentOptionValues,
    ) -> Result<Self> {
        Self::build_with_rng(roster, format, seeding, options, &mut rand::thread_rng())
    }

    /// Builds a new `Tournament`, ordering the `roster` using `seeding` and building a bracket
    /// of the given `format`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the roster contains duplicate or less than two participants,
    /// the `seeding` produces no valid order or the `options` are invalid for the `format`.
    pub fn build_with_rng<R>(
        roster: Roster,
        format: Format,
        seeding: Seeding,
        options: TournamentOptionValues,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        roster.validate()?;
        if roster.len() < 2 {
            return Err(Error::InvalidParticipantCount(roster.len()));
        }

        let seeds = seeding.order(&roster, rng)?;
        let bracket = Bracket::new(format, seeds, options)?;

        Ok(Self {
            roster,
            seeding,
            bracket,
        })
    }

    /// Resumes a `Tournament` from a [`Bracket`] restored with [`Bracket::deserialize`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBracketData`] if the participants of the bracket and the
    /// `roster` differ.
    pub fn resume(roster: Roster, bracket: Bracket) -> Result<Self> {
        roster.validate()?;

        if let Some(id) = bracket.seeds().iter().find(|id| !roster.contains(**id)) {
            return Err(Error::MalformedBracketData(format!(
                "participant {} is not in the roster",
                id
            )));
        }

        // Seeds are unique, so equal lengths mean equal sets.
        if roster.len() != bracket.seeds().len() {
            return Err(Error::MalformedBracketData(format!(
                "roster has {} participants, bracket has {}",
                roster.len(),
                bracket.seeds().len()
            )));
        }

        log::debug!(
            "Resuming {} tournament with {} participants",
            bracket.format(),
            bracket.seeds().len()
        );

        Ok(Self {
            seeding: Seeding::Manual(bracket.seeds().to_vec()),
            roster,
            bracket,
        })
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[inline]
    pub fn seeding(&self) -> &Seeding {
        &self.seeding
    }

    #[inline]
    pub fn bracket(&self) -> &Bracket {
        &self.bracket
    }

    /// Returns the participant with the given `id`.
    #[inline]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.get(id)
    }

    /// Rebuilds the bracket with a new ordering, discarding all results.
    ///
    /// # Errors
    ///
    /// See [`reseed_with_rng`].
    ///
    /// [`reseed_with_rng`]: Self::reseed_with_rng
    pub fn reseed(&mut self, seeding: Seeding) -> Result<()> {
        self.reseed_with_rng(seeding, &mut rand::thread_rng())
    }

    /// Rebuilds the bracket with a new ordering, discarding all results. The format and options
    /// of the bracket are kept.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the `seeding` produces no valid order. The tournament is
    /// left unchanged on error.
    pub fn reseed_with_rng<R>(&mut self, seeding: Seeding, rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        let seeds = seeding.order(&self.roster, rng)?;
        let bracket = Bracket::new(
            self.bracket.format(),
            seeds,
            self.bracket.options().clone(),
        )?;

        log::debug!("Reseeded tournament using {} seeding", seeding.method());

        self.seeding = seeding;
        self.bracket = bracket;
        Ok(())
    }

    /// Records `winner` as the winner of the match with the given `id`.
    ///
    /// # Errors
    ///
    /// See [`Bracket::report_result`].
    #[inline]
    pub fn report_result(&mut self, id: MatchId, winner: ParticipantId) -> Result<()> {
        self.bracket.report_result(id, winner)
    }

    /// Reopens the completed match with the given `id`.
    ///
    /// # Errors
    ///
    /// See [`Bracket::reopen`].
    #[inline]
    pub fn reopen(&mut self, id: MatchId) -> Result<()> {
        self.bracket.reopen(id)
    }

    /// Serializes the bracket, see [`Bracket::serialize`].
    #[inline]
    pub fn serialize(&self) -> Result<String> {
        self.bracket.serialize()
    }

    #[inline]
    pub fn standings(&self) -> Standings {
        self.bracket.standings()
    }

    /// Returns the winner of the tournament once it has concluded.
    #[inline]
    pub fn champion(&self) -> Option<&Participant> {
        self.bracket.champion().and_then(|id| self.roster.get(id))
    }

    /// Returns the 1-based seed of the participant with the given `id`.
    #[inline]
    pub fn seed(&self, id: ParticipantId) -> Option<usize> {
        self.bracket.seed(id)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::Tournament;
    use crate::options::TournamentOptionValues;
    use crate::{
        seeds, Bracket, BracketStatus, Error, Format, MatchId, Participant, ParticipantId,
        Roster, Seeding,
    };

    fn roster(n: u64) -> Roster {
        (1..=n)
            .map(|id| Participant::new(id, format!("Player {}", id)))
            .collect()
    }

    #[test]
    fn test_tournament_build() {
        assert_eq!(
            Tournament::build(
                roster(1),
                Format::SingleElimination,
                Seeding::Reset,
                TournamentOptionValues::new()
            )
            .unwrap_err(),
            Error::InvalidParticipantCount(1)
        );

        assert_eq!(
            Tournament::build(
                roster(4),
                Format::SingleElimination,
                Seeding::Manual(seeds![1, 2, 3]),
                TournamentOptionValues::new()
            )
            .unwrap_err(),
            Error::IncompleteOrdering { expected: 4 }
        );

        let mut rng = StdRng::seed_from_u64(7);
        let first = Tournament::build_with_rng(
            roster(8),
            Format::DoubleElimination,
            Seeding::Shuffle,
            TournamentOptionValues::new(),
            &mut rng,
        )
        .unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let second = Tournament::build_with_rng(
            roster(8),
            Format::DoubleElimination,
            Seeding::Shuffle,
            TournamentOptionValues::new(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tournament_reseed() {
        let mut tournament = Tournament::build(
            roster(4),
            Format::SingleElimination,
            Seeding::Reset,
            TournamentOptionValues::new(),
        )
        .unwrap();
        tournament
            .report_result(MatchId(0), ParticipantId(1))
            .unwrap();
        assert_eq!(tournament.bracket().status(), BracketStatus::InProgress);

        let before = tournament.clone();
        assert!(tournament.reseed(Seeding::Manual(seeds![4, 3])).is_err());
        assert_eq!(tournament, before);

        tournament.reseed(Seeding::Manual(seeds![4, 3, 2, 1])).unwrap();
        assert_eq!(tournament.bracket().status(), BracketStatus::NotStarted);
        assert_eq!(tournament.seed(ParticipantId(4)), Some(1));
        assert_eq!(tournament.bracket().seeds(), seeds![4, 3, 2, 1]);
    }

    #[test]
    fn test_tournament_resume() {
        let mut tournament = Tournament::build(
            roster(3),
            Format::RoundRobin,
            Seeding::Reset,
            TournamentOptionValues::new(),
        )
        .unwrap();

        let played: Vec<_> = tournament
            .bracket()
            .matches()
            .filter(|m| m.is_played())
            .map(|m| (m.id(), m.entrants()[1].participant().unwrap()))
            .collect();
        for (id, winner) in played {
            tournament.report_result(id, winner).unwrap();
        }
        assert!(tournament.champion().is_some());

        let bracket = Bracket::deserialize(&tournament.serialize().unwrap()).unwrap();
        let resumed = Tournament::resume(roster(3), bracket.clone()).unwrap();
        assert_eq!(resumed.bracket(), tournament.bracket());
        assert_eq!(resumed.champion(), tournament.champion());

        assert!(matches!(
            Tournament::resume(roster(2), bracket.clone()),
            Err(Error::MalformedBracketData(_))
        ));

        // A reseed must keep the participants of the bracket.
        assert!(matches!(
            Tournament::resume(roster(4), bracket),
            Err(Error::MalformedBracketData(_))
        ));
    }

    #[test]
    fn test_tournament_resume_reseed() {
        let tournament = Tournament::build(
            roster(3),
            Format::SingleElimination,
            Seeding::Reset,
            TournamentOptionValues::new(),
        )
        .unwrap();

        let mut resumed =
            Tournament::resume(roster(3), tournament.bracket().clone()).unwrap();
        resumed.reseed(Seeding::Reset).unwrap();
        assert_eq!(resumed.bracket().seeds(), tournament.bracket().seeds());
    }
}
