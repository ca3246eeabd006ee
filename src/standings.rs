//! # Standings
//!
//! The accumulated record of every participant in a [`Bracket`]. Round robin and swiss brackets
//! are ranked by their standings, but they are available for every format.
//!
//! The score of a participant is `wins * score_win + losses * score_loss + byes * score_bye`,
//! using the options of the bracket where present (1, 0 and 1 otherwise). The Buchholz rating
//! is the sum of the scores of all opponents the participant has played and serves as the first
//! tie-break.
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::ops::Deref;
use std::slice::Iter;

use serde::{Deserialize, Serialize};

use crate::state::{MatchStatus, Slot};
use crate::{Bracket, ParticipantId};

/// The column names of an [`Entry`], in display order.
const KEYS: [&str; 5] = ["Wins", "Losses", "Byes", "Score", "Buchholz"];

/// The standings of all participants, best first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Standings {
    entries: Vec<Entry>,
}

impl Standings {
    /// Computes the standings of the `bracket` from its completed matches.
    pub fn new(bracket: &Bracket) -> Self {
        let options = bracket.options();
        let score_win = options.u64_or("score_win", 1);
        let score_loss = options.u64_or("score_loss", 0);
        let score_bye = options.u64_or("score_bye", 1);

        let mut entries: Vec<Entry> = bracket
            .seeds()
            .iter()
            .enumerate()
            .map(|(index, id)| Entry::new(*id, index + 1))
            .collect();

        let index: HashMap<ParticipantId, usize> = bracket
            .seeds()
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();

        // The opponents that each participant has played against.
        let mut opponents = vec![Vec::new(); entries.len()];

        for m in bracket.matches() {
            if m.status() != MatchStatus::Completed {
                continue;
            }

            match *m.entrants() {
                [Slot::Participant(a), Slot::Participant(b)] => {
                    let (a, b) = match (index.get(&a), index.get(&b)) {
                        (Some(a), Some(b)) => (*a, *b),
                        _ => continue,
                    };

                    let (winner, loser) = if m.winner() == Some(entries[a].participant) {
                        (a, b)
                    } else {
                        (b, a)
                    };

                    entries[winner].wins += 1;
                    entries[loser].losses += 1;
                    opponents[a].push(b);
                    opponents[b].push(a);
                }
                [Slot::Participant(id), Slot::Bye] | [Slot::Bye, Slot::Participant(id)] => {
                    if let Some(&index) = index.get(&id) {
                        entries[index].byes += 1;
                    }
                }
                _ => (),
            }
        }

        // Score weights are caller input, so the sums saturate instead of overflowing.
        for entry in entries.iter_mut() {
            entry.score = entry
                .wins
                .saturating_mul(score_win)
                .saturating_add(entry.losses.saturating_mul(score_loss))
                .saturating_add(entry.byes.saturating_mul(score_bye));
        }

        let scores: Vec<u64> = entries.iter().map(|entry| entry.score).collect();
        for (entry, opponents) in entries.iter_mut().zip(opponents) {
            entry.buchholz = opponents
                .into_iter()
                .fold(0, |sum: u64, index| sum.saturating_add(scores[index]));
        }

        entries.sort();

        Self { entries }
    }

    /// Returns the column names of the values returned by [`Entry::values`].
    #[inline]
    pub fn keys(&self) -> &'static [&'static str] {
        &KEYS
    }

    /// Returns the entry of the participant with the given `id`.
    pub fn get(&self, id: ParticipantId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.participant == id)
    }

    /// Returns the 1-based placement of the participant with the given `id`.
    pub fn placement(&self, id: ParticipantId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.participant == id)
            .map(|index| index + 1)
    }
}

impl Deref for Standings {
    type Target = [Entry];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Standings {
    type Item = &'a Entry;
    type IntoIter = Iter<'a, Entry>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The record of a single participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub participant: ParticipantId,
    /// The 1-based seed of the participant.
    pub seed: usize,
    pub wins: u64,
    pub losses: u64,
    pub byes: u64,
    pub score: u64,
    pub buchholz: u64,
}

impl Entry {
    #[inline]
    const fn new(participant: ParticipantId, seed: usize) -> Self {
        Self {
            participant,
            seed,
            wins: 0,
            losses: 0,
            byes: 0,
            score: 0,
            buchholz: 0,
        }
    }

    /// Returns the values of the entry in the order of [`Standings::keys`].
    #[inline]
    pub fn values(&self) -> [u64; 5] {
        [self.wins, self.losses, self.byes, self.score, self.buchholz]
    }
}

impl PartialOrd for Entry {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Entries are ordered best first: score, Buchholz and wins descending, then seed ascending.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |e: &Self| (Reverse(e.score), Reverse(e.buchholz), Reverse(e.wins), e.seed);
        key(self).cmp(&key(other))
    }
}

#[cfg(test)]
mod tests {
    use crate::options::TournamentOptionValues;
    use crate::{option_values, seeds, Bracket, Format, MatchId, ParticipantId};

    #[test]
    fn test_standings_round_robin() {
        let mut bracket = Bracket::new(
            Format::RoundRobin,
            seeds![1, 2, 3],
            TournamentOptionValues::new(),
        )
        .unwrap();

        let standings = bracket.standings();
        assert_eq!(standings.len(), 3);
        assert_eq!(standings.keys()[3], "Score");
        // Byes complete when the bracket is built.
        assert!(standings
            .iter()
            .all(|entry| entry.wins == 0 && entry.byes == 1));

        let played: Vec<_> = bracket
            .matches()
            .filter(|m| m.is_played())
            .map(|m| (m.id(), m.entrants()[0].participant().unwrap()))
            .collect();
        assert_eq!(played.len(), 3);

        // The first participant of every match wins.
        for (id, winner) in played {
            bracket.report_result(id, winner).unwrap();
        }

        let standings = bracket.standings();
        assert!(standings.iter().all(|entry| entry.byes == 1));
        assert_eq!(standings.iter().map(|e| e.wins).sum::<u64>(), 3);
        assert_eq!(standings.iter().map(|e| e.losses).sum::<u64>(), 3);
        assert_eq!(bracket.champion(), Some(standings[0].participant));
    }

    #[test]
    fn test_standings_buchholz() {
        let mut bracket = Bracket::new(
            Format::Swiss,
            seeds![1, 2, 3, 4],
            option_values!("score_win" => 3u64),
        )
        .unwrap();

        bracket.report_result(MatchId(0), ParticipantId(2)).unwrap();
        bracket.report_result(MatchId(1), ParticipantId(3)).unwrap();

        let standings = bracket.standings();
        let first = standings.get(ParticipantId(2)).unwrap();
        assert_eq!(first.score, 3);
        assert_eq!(first.buchholz, 0);

        let last = standings.get(ParticipantId(1)).unwrap();
        assert_eq!(last.score, 0);
        assert_eq!(last.buchholz, 3);

        // Equal scores and Buchholz ratings are broken by seed.
        assert_eq!(standings.placement(ParticipantId(2)), Some(1));
        assert_eq!(standings.placement(ParticipantId(3)), Some(2));
        assert_eq!(standings.placement(ParticipantId(1)), Some(3));
        assert_eq!(standings.placement(ParticipantId(4)), Some(4));
    }

    #[test]
    fn test_standings_saturating_scores() {
        let mut bracket = Bracket::new(
            Format::Swiss,
            seeds![1, 2, 3, 4],
            option_values!("score_win" => u64::MAX, "score_loss" => u64::MAX),
        )
        .unwrap();

        bracket.report_result(MatchId(0), ParticipantId(1)).unwrap();
        bracket.report_result(MatchId(1), ParticipantId(3)).unwrap();
        bracket.report_result(MatchId(2), ParticipantId(1)).unwrap();

        let standings = bracket.standings();
        let first = standings.get(ParticipantId(1)).unwrap();
        assert_eq!(first.wins, 2);
        assert_eq!(first.score, u64::MAX);
        assert_eq!(first.buchholz, u64::MAX);
        assert_eq!(standings.get(ParticipantId(4)).unwrap().score, u64::MAX);
    }
}
