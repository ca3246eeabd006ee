//! Moves participants between matches.
//!
//! A completed match writes its winner (and its loser, if the format has a target for it) into
//! the slots returned by [`System::next_matches`]. A match whose slots change is settled again:
//! it becomes playable, completes as a bye or forwards a bye of its own. Reopening a match walks
//! the same targets and clears everything that was derived from its result.
use crate::state::{MatchStatus, Settle, Slot};
use crate::{Bracket, MatchRef, Result, System};

/// Settles every match of a freshly built bracket in round order.
pub(crate) fn settle_all(system: &dyn System, bracket: &mut Bracket) -> Result<()> {
    for round in 0..bracket.rounds().len() {
        for position in 0..bracket.rounds()[round].matches().len() {
            settle(system, bracket, MatchRef::new(round, position))?;
        }
    }

    Ok(())
}

/// Updates the status of the match at `at` after its slots changed and forwards the outcome of
/// byes and void matches.
pub(crate) fn settle(system: &dyn System, bracket: &mut Bracket, at: MatchRef) -> Result<()> {
    if bracket[at].status() == MatchStatus::Completed {
        return Ok(());
    }

    match bracket[at].settle() {
        Settle::Bye(id) => {
            log::debug!("Match {} completed with a bye for {}", bracket[at].id(), id);
            completed(system, bracket, at)
        }
        Settle::Void => forward(system, bracket, at),
        Settle::Ready | Settle::Waiting => Ok(()),
    }
}

/// Forwards the outcome of the completed match at `at` and runs the format hook.
pub(crate) fn completed(system: &dyn System, bracket: &mut Bracket, at: MatchRef) -> Result<()> {
    forward(system, bracket, at)?;
    system.match_completed(bracket, at)
}

fn forward(system: &dyn System, bracket: &mut Bracket, at: MatchRef) -> Result<()> {
    let (winner, loser) = match bracket[at].outcome() {
        Some(outcome) => outcome,
        None => return Ok(()),
    };

    let next = system.next_matches(bracket, at);

    if let Some((target, slot)) = next.winner {
        place(system, bracket, target, slot, winner)?;
    }

    if let Some((target, slot)) = next.loser {
        place(system, bracket, target, slot, loser)?;
    }

    Ok(())
}

fn place(
    system: &dyn System,
    bracket: &mut Bracket,
    at: MatchRef,
    slot: usize,
    value: Slot,
) -> Result<()> {
    if bracket[at].entrants()[slot] == value {
        return Ok(());
    }

    bracket[at].set_slot(slot, value);
    settle(system, bracket, at)
}

/// Clears every slot filled by the match at `at`. Completed matches that received a cleared
/// participant are cleared recursively. Byes are never cleared.
pub(crate) fn retract(system: &dyn System, bracket: &mut Bracket, at: MatchRef) {
    let next = system.next_matches(bracket, at);

    for (target, slot) in [next.winner, next.loser].into_iter().flatten() {
        clear(system, bracket, target, slot);
    }
}

fn clear(system: &dyn System, bracket: &mut Bracket, at: MatchRef, slot: usize) {
    if !bracket[at].entrants()[slot].is_participant() {
        return;
    }

    if bracket[at].status() == MatchStatus::Completed {
        retract(system, bracket, at);
    }

    log::debug!("Clearing slot {} of match {}", slot, bracket[at].id());
    bracket[at].clear_slot(slot);
}

#[cfg(test)]
mod tests {
    use crate::options::TournamentOptionValues;
    use crate::{seeds, Bracket, Format, MatchId, MatchStatus, ParticipantId, Slot};

    #[test]
    fn test_reopen_cascade() {
        let mut bracket = Bracket::new(
            Format::SingleElimination,
            seeds![1, 2, 3, 4, 5, 6, 7, 8],
            TournamentOptionValues::new(),
        )
        .unwrap();

        // 1v8 and 4v5 feed the first semifinal, which feeds the final.
        bracket.report_result(MatchId(0), ParticipantId(1)).unwrap();
        bracket.report_result(MatchId(1), ParticipantId(4)).unwrap();
        bracket.report_result(MatchId(2), ParticipantId(2)).unwrap();
        bracket.report_result(MatchId(3), ParticipantId(3)).unwrap();
        bracket.report_result(MatchId(4), ParticipantId(1)).unwrap();
        bracket.report_result(MatchId(5), ParticipantId(2)).unwrap();
        assert_eq!(bracket.get(MatchId(6)).unwrap().status(), MatchStatus::InProgress);

        bracket.report_result(MatchId(6), ParticipantId(1)).unwrap();
        assert_eq!(bracket.champion(), Some(ParticipantId(1)));

        bracket.reopen(MatchId(0)).unwrap();

        let m = bracket.get(MatchId(0)).unwrap();
        assert_eq!(m.status(), MatchStatus::InProgress);
        assert_eq!(m.winner(), None);

        let m = bracket.get(MatchId(4)).unwrap();
        assert_eq!(m.status(), MatchStatus::Pending);
        assert_eq!(m.winner(), None);
        assert_eq!(
            m.entrants(),
            &[Slot::TBD, Slot::Participant(ParticipantId(4))]
        );

        let m = bracket.get(MatchId(6)).unwrap();
        assert_eq!(m.status(), MatchStatus::Pending);
        assert_eq!(m.winner(), None);
        assert_eq!(
            m.entrants(),
            &[Slot::TBD, Slot::Participant(ParticipantId(2))]
        );
        assert_eq!(bracket.champion(), None);

        // The other half of the bracket is untouched.
        assert_eq!(
            bracket.get(MatchId(5)).unwrap().winner(),
            Some(ParticipantId(2))
        );
    }

    #[test]
    fn test_reopen_keeps_byes() {
        let mut bracket = Bracket::new(
            Format::SingleElimination,
            seeds![1, 2, 3],
            TournamentOptionValues::new(),
        )
        .unwrap();

        // 1 has a bye, 2v3 is played.
        assert_eq!(
            bracket.get(MatchId(2)).unwrap().entrants(),
            &[Slot::Participant(ParticipantId(1)), Slot::TBD]
        );

        bracket.report_result(MatchId(1), ParticipantId(3)).unwrap();
        bracket.report_result(MatchId(2), ParticipantId(3)).unwrap();
        bracket.reopen(MatchId(1)).unwrap();

        let m = bracket.get(MatchId(2)).unwrap();
        assert_eq!(
            m.entrants(),
            &[Slot::Participant(ParticipantId(1)), Slot::TBD]
        );
        assert_eq!(m.status(), MatchStatus::Pending);

        assert!(bracket.reopen(MatchId(0)).is_err());
    }
}
