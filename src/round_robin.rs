use crate::options::TournamentOptions;
use crate::{Bracket, MatchRef, NextMatches, ParticipantId, System};

/// A round robin tournament where every participant plays every other participant once.
///
/// The schedule uses the circle method: participant 0 is pinned, all others rotate by one
/// position every round. With an odd number of participants a phantom participant is added;
/// whoever is paired with it has a bye in that round.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct RoundRobin;

impl RoundRobin {
    /// Returns the index of participant of the at the given `index` in a circle of length `n` at
    /// the given `round`.
    #[inline]
    fn circle_entrant(n: usize, round: usize, index: usize) -> usize {
        debug_assert!(n % 2 == 0);

        if index == 0 {
            return 0;
        }

        match index as isize - round as isize {
            res if res <= 0 => n - res.unsigned_abs() - 1,
            res => res as usize,
        }
    }
}

impl System for RoundRobin {
    fn options(&self) -> TournamentOptions {
        TournamentOptions::default()
    }

    fn build(&self, bracket: &mut Bracket) {
        // Number of participants, rounded up to the next even number.
        let n = bracket.seeds().len() + bracket.seeds().len() % 2;

        for round in 0..n - 1 {
            let slots = (0..n / 2)
                .map(|index| {
                    let first = Self::circle_entrant(n, round, index);
                    let second = Self::circle_entrant(n, round, n - index - 1);

                    [bracket.seed_slot(first), bracket.seed_slot(second)]
                })
                .collect();

            bracket.push_round(None, slots);
        }
    }

    fn next_matches(&self, _bracket: &Bracket, _at: MatchRef) -> NextMatches {
        NextMatches::default()
    }

    fn is_finished(&self, bracket: &Bracket) -> bool {
        bracket.rounds().iter().all(|round| round.is_completed())
    }

    fn champion(&self, bracket: &Bracket) -> Option<ParticipantId> {
        if !self.is_finished(bracket) {
            return None;
        }

        bracket.standings().first().map(|entry| entry.participant)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::RoundRobin;
    use crate::options::TournamentOptionValues;
    use crate::{seeds, Bracket, Format, MatchStatus, ParticipantId, Slot};

    #[test]
    fn test_circle_entrant() {
        let entrants = 10;
        let mut round = 0;

        macro_rules! test {
            ($($in:expr => $out:expr),*,) => {
                $(
                    assert_eq!(RoundRobin::circle_entrant(entrants, round, $in), $out);
                )*
            };
        }

        test! {
            0 => 0,
            1 => 1,
            2 => 2,
            5 => 5,
            9 => 9,
        }

        round = 1;

        test! {
            0 => 0,
            1 => 9,
            2 => 1,
            3 => 2,
            9 => 8,
        }

        round = 2;

        test! {
            0 => 0,
            1 => 8,
            2 => 9,
            3 => 1,
            9 => 7,
        }
    }

    #[test]
    fn test_round_robin() {
        let bracket = Bracket::new(
            Format::RoundRobin,
            seeds![1, 2, 3, 4],
            TournamentOptionValues::new(),
        )
        .unwrap();
        assert_eq!(bracket.rounds().len(), 3);
        assert!(bracket.rounds().iter().all(|r| r.matches().len() == 2));
        assert!(bracket
            .matches()
            .all(|m| m.status() == MatchStatus::InProgress));

        let bracket = Bracket::new(
            Format::RoundRobin,
            seeds![1, 2, 3, 4, 5],
            TournamentOptionValues::new(),
        )
        .unwrap();
        assert_eq!(bracket.rounds().len(), 5);

        let mut pairs = HashSet::new();
        for round in bracket.rounds() {
            assert_eq!(round.matches().len(), 3);
            assert_eq!(
                round
                    .matches()
                    .iter()
                    .filter(|m| m.entrants().contains(&Slot::Bye))
                    .count(),
                1
            );

            for m in round.matches() {
                if let [Slot::Participant(a), Slot::Participant(b)] = *m.entrants() {
                    assert!(pairs.insert((a.min(b), a.max(b))));
                }
            }
        }
        assert_eq!(pairs.len(), 10);
        assert!(pairs.contains(&(ParticipantId(1), ParticipantId(5))));
    }
}
