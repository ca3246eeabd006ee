use crate::options::TournamentOptions;
use crate::state::{MatchStatus, Slot};
use crate::utils::bracket_order;
use crate::{Bracket, BracketTag, MatchRef, NextMatches, ParticipantId, System};

/// A single elimination tournament.
///
/// The first round holds half as many matches as the next power of two of the number of
/// participants. Seeds that do not exist are byes, so the best seeds advance without playing.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SingleElimination;

impl SingleElimination {
    /// Returns the number of rounds of the main bracket.
    #[inline]
    pub fn num_rounds(participants: usize) -> usize {
        participants.next_power_of_two().trailing_zeros() as usize
    }

    /// Returns `true` if the bracket holds a third place match.
    fn has_third_place(bracket: &Bracket) -> bool {
        bracket.rounds().len() > Self::num_rounds(bracket.seeds().len())
    }

    /// Returns the slots of the first round of an elimination bracket.
    pub fn first_round(bracket: &Bracket) -> Vec<[Slot; 2]> {
        let size = bracket.seeds().len().next_power_of_two();

        bracket_order(size)
            .chunks_exact(2)
            .map(|pair| [bracket.seed_slot(pair[0]), bracket.seed_slot(pair[1])])
            .collect()
    }
}

impl System for SingleElimination {
    fn options(&self) -> TournamentOptions {
        TournamentOptions::builder()
            .option(
                "third_place_match",
                "Include a match for the third place",
                false,
            )
            .build()
    }

    fn build(&self, bracket: &mut Bracket) {
        let participants = bracket.seeds().len();

        bracket.push_round(None, Self::first_round(bracket));

        let mut matches = participants.next_power_of_two() / 4;
        while matches > 0 {
            bracket.push_round(None, vec![[Slot::TBD, Slot::TBD]; matches]);
            matches /= 2;
        }

        // At least 4 participants are required for a third place match.
        if participants >= 4 && bracket.options().bool_or("third_place_match", false) {
            bracket.push_round(Some(BracketTag::ThirdPlace), vec![[Slot::TBD, Slot::TBD]]);
        }
    }

    fn next_matches(&self, bracket: &Bracket, at: MatchRef) -> NextMatches {
        let rounds = Self::num_rounds(bracket.seeds().len());

        // The final and the third place match.
        if at.round + 1 >= rounds {
            return NextMatches::default();
        }

        let mut next = NextMatches::winner(at.round + 1, at.position / 2, at.position % 2);

        // Semifinal losers play for the third place.
        if at.round + 2 == rounds && Self::has_third_place(bracket) {
            next.loser = Some((MatchRef::new(rounds, 0), at.position));
        }

        next
    }

    fn is_finished(&self, bracket: &Bracket) -> bool {
        let rounds = Self::num_rounds(bracket.seeds().len());

        bracket.rounds()[rounds - 1..]
            .iter()
            .all(|round| round.is_completed())
    }

    fn champion(&self, bracket: &Bracket) -> Option<ParticipantId> {
        let rounds = Self::num_rounds(bracket.seeds().len());
        let last = &bracket[MatchRef::new(rounds - 1, 0)];

        match last.status() {
            MatchStatus::Completed => last.winner(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::options::TournamentOptionValues;
    use crate::{
        option_values, seeds, Bracket, BracketStatus, BracketTag, Format, MatchId, MatchStatus,
        ParticipantId, Slot,
    };

    fn slots(bracket: &Bracket, round: usize) -> Vec<[Slot; 2]> {
        bracket.rounds()[round]
            .matches()
            .iter()
            .map(|m| *m.entrants())
            .collect()
    }

    const fn p(id: u64) -> Slot {
        Slot::Participant(ParticipantId(id))
    }

    #[test]
    fn test_single_elimination() {
        let bracket = Bracket::new(
            Format::SingleElimination,
            seeds![1, 2],
            TournamentOptionValues::new(),
        )
        .unwrap();
        assert_eq!(bracket.rounds().len(), 1);
        assert_eq!(slots(&bracket, 0), [[p(1), p(2)]]);
        assert_eq!(bracket.rounds()[0].matches()[0].status(), MatchStatus::InProgress);

        let bracket = Bracket::new(
            Format::SingleElimination,
            seeds![1, 2, 3, 4, 5],
            TournamentOptionValues::new(),
        )
        .unwrap();
        assert_eq!(bracket.rounds().len(), 3);
        assert_eq!(
            slots(&bracket, 0),
            [
                [p(1), Slot::Bye],
                [p(4), p(5)],
                [p(2), Slot::Bye],
                [p(3), Slot::Bye],
            ]
        );
        assert_eq!(slots(&bracket, 1), [[p(1), Slot::TBD], [p(2), p(3)]]);
        assert_eq!(slots(&bracket, 2), [[Slot::TBD, Slot::TBD]]);
        assert_eq!(bracket.byes(), 3);
        assert_eq!(bracket.status(), BracketStatus::NotStarted);
    }

    #[test]
    fn test_single_elimination_third_place() {
        let mut bracket = Bracket::new(
            Format::SingleElimination,
            seeds![1, 2, 3, 4],
            option_values!("third_place_match" => true),
        )
        .unwrap();
        assert_eq!(bracket.rounds().len(), 3);
        assert_eq!(bracket.rounds()[2].bracket(), Some(BracketTag::ThirdPlace));
        assert_eq!(bracket.rounds()[2].number(), 1);

        bracket.report_result(MatchId(0), ParticipantId(1)).unwrap();
        bracket.report_result(MatchId(1), ParticipantId(3)).unwrap();
        assert_eq!(slots(&bracket, 2), [[p(4), p(2)]]);

        bracket.report_result(MatchId(2), ParticipantId(3)).unwrap();
        assert_eq!(bracket.champion(), Some(ParticipantId(3)));
        assert_eq!(bracket.status(), BracketStatus::InProgress);

        bracket.report_result(MatchId(3), ParticipantId(2)).unwrap();
        assert_eq!(bracket.status(), BracketStatus::Completed);

        // Too few participants for a third place match.
        let bracket = Bracket::new(
            Format::SingleElimination,
            seeds![1, 2, 3],
            option_values!("third_place_match" => true),
        )
        .unwrap();
        assert_eq!(bracket.rounds().len(), 2);
    }
}
