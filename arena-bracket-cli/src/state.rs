use std::fs;
use std::path::Path;

use arena_bracket::{Bracket, Roster, Tournament};
use serde::{Deserialize, Serialize};

use crate::Result;

/// The contents of a state file. The bracket is validated against the roster when loading.
#[derive(Debug, Serialize, Deserialize)]
struct State {
    roster: Roster,
    bracket: Bracket,
}

#[derive(Debug, Serialize)]
struct StateRef<'a> {
    roster: &'a Roster,
    bracket: &'a Bracket,
}

pub fn load<P>(path: P) -> Result<Tournament>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    log::debug!("Loading state from {}", path.display());

    let buf = fs::read_to_string(path)?;
    let state: State = serde_json::from_str(&buf)?;

    Ok(Tournament::resume(state.roster, state.bracket)?)
}

/// Writes the `tournament` to `path`, replacing the previous state only once the new state has
/// been written completely.
pub fn store<P>(path: P, tournament: &Tournament) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    log::debug!("Writing state to {}", path.display());

    let buf = serde_json::to_vec(&StateRef {
        roster: tournament.roster(),
        bracket: tournament.bracket(),
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, buf)?;
    fs::rename(&tmp, path)?;

    Ok(())
}
