use crate::options::TournamentOptions;
use crate::single_elimination::SingleElimination;
use crate::state::{MatchStatus, Slot};
use crate::{Bracket, BracketTag, MatchRef, NextMatches, ParticipantId, System};

/// A double elimination tournament.
///
/// The winners bracket is laid out like a [`SingleElimination`] bracket. Every loser of the
/// winners bracket drops into the losers bracket, a loss in the losers bracket eliminates. The
/// champions of both brackets meet in a single grand final.
///
/// With `k` winners rounds the losers bracket has `2(k - 1)` rounds. The odd losers rounds pair
/// the survivors among each other, the even losers rounds take in the losers of the next winners
/// round.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct DoubleElimination;

/// The layout of a double elimination bracket with a given number of participants.
#[derive(Copy, Clone, Debug)]
struct Layout {
    /// The number of slots in the first winners round, a power of two.
    size: usize,
    /// The number of winners rounds.
    winners: usize,
}

impl Layout {
    fn new(participants: usize) -> Self {
        Self {
            size: participants.next_power_of_two(),
            winners: SingleElimination::num_rounds(participants),
        }
    }

    /// Returns the number of losers rounds.
    #[inline]
    fn losers(&self) -> usize {
        2 * (self.winners - 1)
    }

    /// Returns the index of the losers round with the given 1-based `number`.
    #[inline]
    fn losers_round(&self, number: usize) -> usize {
        self.winners + number - 1
    }

    #[inline]
    fn grand_final(&self) -> usize {
        self.winners + self.losers()
    }

    /// Returns the number of matches in the losers round with the given 1-based `number`.
    fn losers_matches(&self, number: usize) -> usize {
        let j = (number + 1) / 2;
        self.size >> (j + 1)
    }
}

impl System for DoubleElimination {
    fn options(&self) -> TournamentOptions {
        TournamentOptions::default()
    }

    fn build(&self, bracket: &mut Bracket) {
        let layout = Layout::new(bracket.seeds().len());
        let tag = Some(BracketTag::Winners);

        bracket.push_round(tag, SingleElimination::first_round(bracket));

        let mut matches = layout.size / 4;
        while matches > 0 {
            bracket.push_round(tag, vec![[Slot::TBD, Slot::TBD]; matches]);
            matches /= 2;
        }

        for number in 1..=layout.losers() {
            bracket.push_round(
                Some(BracketTag::Losers),
                vec![[Slot::TBD, Slot::TBD]; layout.losers_matches(number)],
            );
        }

        bracket.push_round(Some(BracketTag::GrandFinal), vec![[Slot::TBD, Slot::TBD]]);
    }

    fn next_matches(&self, bracket: &Bracket, at: MatchRef) -> NextMatches {
        let layout = Layout::new(bracket.seeds().len());
        let grand_final = (MatchRef::new(layout.grand_final(), 0), 0);

        // Winners bracket
        if at.round < layout.winners {
            let number = at.round + 1;

            let winner = if number < layout.winners {
                (MatchRef::new(at.round + 1, at.position / 2), at.position % 2)
            } else {
                grand_final
            };

            let loser = if layout.winners == 1 {
                (MatchRef::new(layout.grand_final(), 0), 1)
            } else if number == 1 {
                (
                    MatchRef::new(layout.losers_round(1), at.position / 2),
                    at.position % 2,
                )
            } else {
                let round = layout.losers_round(2 * (number - 1));
                let count = bracket.rounds()[at.round].matches().len();

                // Every other round drops in reversed to delay rematches.
                let position = if number % 2 == 0 {
                    count - 1 - at.position
                } else {
                    at.position
                };

                (MatchRef::new(round, position), 1)
            };

            return NextMatches::new(Some(winner), Some(loser));
        }

        // Losers bracket
        if at.round < layout.grand_final() {
            let number = at.round - layout.winners + 1;

            let winner = if number == layout.losers() {
                (MatchRef::new(layout.grand_final(), 0), 1)
            } else if number % 2 == 1 {
                (MatchRef::new(at.round + 1, at.position), 0)
            } else {
                (MatchRef::new(at.round + 1, at.position / 2), at.position % 2)
            };

            return NextMatches::new(Some(winner), None);
        }

        NextMatches::default()
    }

    fn is_finished(&self, bracket: &Bracket) -> bool {
        bracket
            .rounds()
            .last()
            .map(|round| round.is_completed())
            .unwrap_or(false)
    }

    fn champion(&self, bracket: &Bracket) -> Option<ParticipantId> {
        let last = bracket.rounds().last()?.matches().first()?;

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
        seeds, Bracket, BracketStatus, BracketTag, Format, MatchId, MatchStatus, ParticipantId,
        Slot,
    };

    const fn p(id: u64) -> Slot {
        Slot::Participant(ParticipantId(id))
    }

    fn layout(bracket: &Bracket) -> Vec<(Option<BracketTag>, u32, usize)> {
        bracket
            .rounds()
            .iter()
            .map(|r| (r.bracket(), r.number(), r.matches().len()))
            .collect()
    }

    #[test]
    fn test_double_elimination_layout() {
        let bracket = Bracket::new(
            Format::DoubleElimination,
            seeds![1, 2, 3, 4, 5, 6, 7, 8],
            TournamentOptionValues::new(),
        )
        .unwrap();

        let w = Some(BracketTag::Winners);
        let l = Some(BracketTag::Losers);
        assert_eq!(
            layout(&bracket),
            [
                (w, 1, 4),
                (w, 2, 2),
                (w, 3, 1),
                (l, 1, 2),
                (l, 2, 2),
                (l, 3, 1),
                (l, 4, 1),
                (Some(BracketTag::GrandFinal), 1, 1),
            ]
        );
        assert_eq!(bracket.matches().count(), 14);
        assert_eq!(bracket.round_index(l, 4), Some(6));
        assert_eq!(bracket.round_index(Some(BracketTag::GrandFinal), 1), Some(7));
        assert_eq!(bracket.round_index(None, 1), None);
    }

    #[test]
    fn test_double_elimination_two() {
        let mut bracket = Bracket::new(
            Format::DoubleElimination,
            seeds![1, 2],
            TournamentOptionValues::new(),
        )
        .unwrap();
        assert_eq!(bracket.rounds().len(), 2);

        bracket.report_result(MatchId(0), ParticipantId(2)).unwrap();
        let grand_final = bracket.get(MatchId(1)).unwrap();
        assert_eq!(grand_final.entrants(), &[p(2), p(1)]);
        assert_eq!(grand_final.status(), MatchStatus::InProgress);

        bracket.report_result(MatchId(1), ParticipantId(1)).unwrap();
        assert_eq!(bracket.champion(), Some(ParticipantId(1)));
        assert_eq!(bracket.status(), BracketStatus::Completed);
    }

    #[test]
    fn test_double_elimination_drop_in() {
        let mut bracket = Bracket::new(
            Format::DoubleElimination,
            seeds![1, 2, 3, 4],
            TournamentOptionValues::new(),
        )
        .unwrap();

        // W1: 1v4 (0), 2v3 (1); W2: (2); L1: (3); L2: (4); GF: (5)
        bracket.report_result(MatchId(0), ParticipantId(1)).unwrap();
        bracket.report_result(MatchId(1), ParticipantId(2)).unwrap();
        assert_eq!(bracket.get(MatchId(3)).unwrap().entrants(), &[p(4), p(3)]);

        bracket.report_result(MatchId(2), ParticipantId(2)).unwrap();
        bracket.report_result(MatchId(3), ParticipantId(3)).unwrap();
        assert_eq!(bracket.get(MatchId(4)).unwrap().entrants(), &[p(3), p(1)]);

        bracket.report_result(MatchId(4), ParticipantId(3)).unwrap();
        assert_eq!(bracket.get(MatchId(5)).unwrap().entrants(), &[p(2), p(3)]);

        bracket.report_result(MatchId(5), ParticipantId(2)).unwrap();
        assert_eq!(bracket.champion(), Some(ParticipantId(2)));

        // Reopening the winners final takes the loser back out of the losers bracket.
        bracket.reopen(MatchId(2)).unwrap();
        assert_eq!(bracket.get(MatchId(4)).unwrap().entrants(), &[p(3), Slot::TBD]);
        assert_eq!(
            bracket.get(MatchId(5)).unwrap().entrants(),
            &[Slot::TBD, Slot::TBD]
        );
        assert_eq!(bracket.status(), BracketStatus::InProgress);
    }

    #[test]
    fn test_double_elimination_byes() {
        let bracket = Bracket::new(
            Format::DoubleElimination,
            seeds![1, 2, 3, 4, 5],
            TournamentOptionValues::new(),
        )
        .unwrap();

        // W1: 1vbye, 4v5, 2vbye, 3vbye
        let l1 = bracket.rounds()[3].matches();
        assert_eq!(l1[0].entrants(), &[Slot::Bye, Slot::TBD]);
        assert_eq!(l1[1].entrants(), &[Slot::Bye, Slot::Bye]);
        assert_eq!(l1[1].status(), MatchStatus::Pending);

        // The void match forwards a bye into the second losers round.
        let l2 = bracket.rounds()[4].matches();
        assert_eq!(l2[1].entrants(), &[Slot::Bye, Slot::TBD]);
        assert_eq!(bracket.status(), BracketStatus::NotStarted);
    }
}
