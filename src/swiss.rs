use std::cmp::Reverse;
use std::collections::HashSet;

use crate::options::{self, TournamentOptionValues, TournamentOptions};
use crate::state::{MatchStatus, Slot};
use crate::utils::NumExt;
use crate::{progression, Bracket, Error, MatchRef, NextMatches, ParticipantId, Result, System};

/// The maximum number of pairing attempts for a single round.
const PAIRING_BUDGET: usize = 100_000;

/// A swiss tournament.
///
/// Only the first round is built upfront, pairing adjacent seeds. Every following round is
/// paired once the previous round completed: participants are ordered by score and paired with
/// the closest opponent they have not met yet.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Swiss;

impl Swiss {
    /// Returns the planned number of rounds.
    fn num_rounds(bracket: &Bracket) -> usize {
        bracket.options().u64_or("rounds", 0) as usize
    }

    /// Builds the pairing of the next round from the completed rounds.
    fn next_round(bracket: &Bracket) -> Result<Vec<[Slot; 2]>> {
        let round = bracket.rounds().len() as u32 + 1;

        // Participants ordered by score, then by seed.
        let mut order: Vec<_> = bracket
            .standings()
            .iter()
            .map(|entry| (entry.participant, entry.score, entry.seed))
            .collect();
        order.sort_by_key(|(_, score, seed)| (Reverse(*score), *seed));
        let order: Vec<_> = order.into_iter().map(|(id, _, _)| id).collect();

        let mut met = HashSet::new();
        let mut had_bye = HashSet::new();
        for m in bracket.matches() {
            if m.status() != MatchStatus::Completed {
                continue;
            }

            match *m.entrants() {
                [Slot::Participant(a), Slot::Participant(b)] => {
                    met.insert(pair_key(a, b));
                }
                [Slot::Participant(id), Slot::Bye] | [Slot::Bye, Slot::Participant(id)] => {
                    had_bye.insert(id);
                }
                _ => (),
            }
        }

        // The lowest placed participant without a bye sits out. Everybody else is only
        // considered if no such participant leads to a valid pairing.
        let byes: Vec<Option<ParticipantId>> = if order.len() % 2 == 0 {
            vec![None]
        } else {
            let mut candidates: Vec<_> = order.iter().rev().copied().collect();
            candidates.sort_by_key(|id| had_bye.contains(id));
            candidates.into_iter().map(Some).collect()
        };

        for repeats in [0, 1] {
            if repeats == 1 {
                log::warn!(
                    "No pairing without rematches exists for round {}, allowing one rematch",
                    round
                );
            }

            for bye in &byes {
                let players: Vec<_> = order
                    .iter()
                    .copied()
                    .filter(|id| Some(*id) != *bye)
                    .collect();

                let mut budget = PAIRING_BUDGET;
                let mut pairs = Vec::with_capacity(players.len() / 2);
                let mut used = vec![false; players.len()];

                if pair(&players, &met, &mut used, &mut pairs, repeats, &mut budget) {
                    let mut slots: Vec<_> = pairs
                        .into_iter()
                        .map(|(a, b)| [Slot::Participant(a), Slot::Participant(b)])
                        .collect();

                    if let Some(bye) = bye {
                        slots.push([Slot::Participant(*bye), Slot::Bye]);
                    }

                    return Ok(slots);
                }
            }
        }

        Err(Error::PairingExhausted { round })
    }
}

/// Pairs the first unused participant in `players` with the closest unused opponent it has not
/// met, backtracking on failure. At most `repeats` pairings may be rematches.
fn pair(
    players: &[ParticipantId],
    met: &HashSet<(ParticipantId, ParticipantId)>,
    used: &mut [bool],
    pairs: &mut Vec<(ParticipantId, ParticipantId)>,
    repeats: usize,
    budget: &mut usize,
) -> bool {
    let first = match used.iter().position(|u| !u) {
        Some(first) => first,
        None => return true,
    };

    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    used[first] = true;
    for second in first + 1..players.len() {
        if used[second] {
            continue;
        }

        let rematch = met.contains(&pair_key(players[first], players[second]));
        if rematch && repeats == 0 {
            continue;
        }

        used[second] = true;
        pairs.push((players[first], players[second]));

        let repeats = if rematch { repeats - 1 } else { repeats };
        if pair(players, met, used, pairs, repeats, budget) {
            return true;
        }

        pairs.pop();
        used[second] = false;
    }
    used[first] = false;

    false
}

#[inline]
fn pair_key(a: ParticipantId, b: ParticipantId) -> (ParticipantId, ParticipantId) {
    (a.min(b), a.max(b))
}

impl System for Swiss {
    fn options(&self) -> TournamentOptions {
        TournamentOptions::builder()
            .option("rounds", "Number of rounds (0 for automatic)", 0u64)
            .option("score_win", "Score for a win", 1u64)
            .option("score_loss", "Score for a loss", 0u64)
            .option("score_bye", "Score for a bye", 1u64)
            .build()
    }

    fn resolve_options(
        &self,
        participants: usize,
        options: &mut TournamentOptionValues,
    ) -> Result<()> {
        let max = match participants % 2 {
            0 => participants - 1,
            _ => participants,
        } as u64;

        let rounds = match options.u64_or("rounds", 0) {
            0 => participants.ilog2_ceil() as u64,
            rounds => rounds,
        };

        if rounds > max {
            return Err(options::Error::OutOfRange {
                key: String::from("rounds"),
                value: rounds,
                max,
            }
            .into());
        }

        options.set("rounds", rounds);
        Ok(())
    }

    fn build(&self, bracket: &mut Bracket) {
        let n = bracket.seeds().len();

        let slots = (0..n)
            .step_by(2)
            .map(|index| [bracket.seed_slot(index), bracket.seed_slot(index + 1)])
            .collect();

        bracket.push_round(None, slots);
    }

    fn next_matches(&self, _bracket: &Bracket, _at: MatchRef) -> NextMatches {
        NextMatches::default()
    }

    fn match_completed(&self, bracket: &mut Bracket, at: MatchRef) -> Result<()> {
        let rounds = bracket.rounds().len();
        if at.round + 1 != rounds || !bracket.rounds()[at.round].is_completed() {
            return Ok(());
        }

        if rounds >= Self::num_rounds(bracket) {
            return Ok(());
        }

        let slots = Self::next_round(bracket)?;
        log::debug!("Pairing round {} of swiss bracket", rounds + 1);

        let round = bracket.push_round(None, slots);
        for position in 0..bracket.rounds()[round].matches().len() {
            progression::settle(self, bracket, MatchRef::new(round, position))?;
        }

        Ok(())
    }

    fn match_reopened(&self, bracket: &mut Bracket, at: MatchRef) {
        if bracket.rounds().len() > at.round + 1 {
            log::debug!("Discarding swiss rounds after round {}", at.round + 1);
            bracket.truncate(at.round + 1);
        }
    }

    fn is_finished(&self, bracket: &Bracket) -> bool {
        bracket.rounds().len() >= Self::num_rounds(bracket)
            && bracket.rounds().iter().all(|round| round.is_completed())
    }

    fn champion(&self, bracket: &Bracket) -> Option<ParticipantId> {
        if !self.is_finished(bracket) {
            return None;
        }

        bracket.standings().first().map(|entry| entry.participant)
    }
}
