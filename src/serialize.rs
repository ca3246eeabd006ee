//! The persisted form of a [`Bracket`].
//!
//! ```json
//! {"format":"single_elimination","status":"in_progress","options":{"third_place_match":false},
//!  "seeds":[11,12,13],
//!  "rounds":[{"round_number":1,"matches":[
//!    {"match_id":0,"player1":11,"player2":"bye","status":"completed","winner":11}]}]}
//! ```
//!
//! A slot is written as the id of its participant, `null` if it is not decided yet and `"bye"`
//! if it stays empty.
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Formatter};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::options::TournamentOptionValues;
use crate::state::{Match, MatchStatus, Slot};
use crate::{
    Bracket, BracketStatus, BracketTag, Error, Format, MatchId, ParticipantId, Result, Round,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BracketBlob {
    format: Format,
    status: BracketStatus,
    #[serde(default)]
    options: TournamentOptionValues,
    seeds: Vec<ParticipantId>,
    rounds: Vec<RoundBlob>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RoundBlob {
    round_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bracket: Option<BracketTag>,
    matches: Vec<MatchBlob>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct MatchBlob {
    match_id: MatchId,
    player1: Slot,
    player2: Slot,
    status: MatchStatus,
    winner: Option<ParticipantId>,
}

impl From<&Bracket> for BracketBlob {
    fn from(bracket: &Bracket) -> Self {
        let rounds = bracket
            .rounds()
            .iter()
            .map(|round| RoundBlob {
                round_number: round.number(),
                bracket: round.bracket(),
                matches: round
                    .matches()
                    .iter()
                    .map(|m| MatchBlob {
                        match_id: m.id(),
                        player1: m.entrants()[0],
                        player2: m.entrants()[1],
                        status: m.status(),
                        winner: m.winner(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            format: bracket.format(),
            status: bracket.status(),
            options: bracket.options().clone(),
            seeds: bracket.seeds().to_vec(),
            rounds,
        }
    }
}

impl Bracket {
    /// Serializes the bracket into its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn serialize(&self) -> Result<String> {
        serde_json::to_string(&BracketBlob::from(self))
            .map_err(|err| Error::Serialization(err.to_string()))
    }

    /// Restores a bracket from its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBracketData`] if the input is not valid JSON, misses fields,
    /// contains unknown tokens or describes a bracket that could not have been produced by
    /// building and playing its format.
    pub fn deserialize(input: &str) -> Result<Self> {
        let blob: BracketBlob = serde_json::from_str(input).map_err(malformed)?;
        Self::from_blob(blob)
    }

    fn from_blob(blob: BracketBlob) -> Result<Self> {
        let seeds: HashSet<ParticipantId> = blob.seeds.iter().copied().collect();
        if seeds.len() != blob.seeds.len() {
            return Err(malformed("duplicate seed"));
        }

        let mut numbers: HashMap<Option<BracketTag>, u32> = HashMap::new();
        let mut ids = HashSet::new();
        let mut rounds = Vec::with_capacity(blob.rounds.len());

        for round in blob.rounds {
            let number = numbers.entry(round.bracket).or_insert(0);
            *number += 1;
            if round.round_number != *number {
                return Err(malformed(format!(
                    "expected round number {}, found {}",
                    number, round.round_number
                )));
            }

            let mut matches = Vec::with_capacity(round.matches.len());
            for (position, m) in round.matches.into_iter().enumerate() {
                if !ids.insert(m.match_id) {
                    return Err(malformed(format!("duplicate match id {}", m.match_id)));
                }

                let entrants = [m.player1, m.player2];
                for id in entrants.iter().filter_map(Slot::participant).chain(m.winner) {
                    if !seeds.contains(&id) {
                        return Err(malformed(format!(
                            "match {} refers to unknown participant {}",
                            m.match_id, id
                        )));
                    }
                }

                let m = Match::from_parts(
                    m.match_id,
                    round.round_number,
                    position,
                    round.bracket,
                    entrants,
                    m.status,
                    m.winner,
                );
                check_match(&m)?;
                matches.push(m);
            }

            rounds.push(Round::new(round.round_number, round.bracket, matches));
        }

        let bracket =
            Bracket::from_parts(blob.format, blob.status, blob.options, blob.seeds, rounds);

        let expected = replay(&bracket)?;
        if expected.rounds() != bracket.rounds() {
            return Err(malformed(format!(
                "rounds do not match a {} bracket of {} participants",
                bracket.format(),
                bracket.seeds().len()
            )));
        }

        if expected.status() != bracket.status() {
            return Err(malformed(format!(
                "expected bracket status {}, found {}",
                expected.status(),
                bracket.status()
            )));
        }

        if expected.options() != bracket.options() {
            return Err(malformed("options do not match their resolved values"));
        }

        Ok(bracket)
    }
}

/// Checks that the status of a single match agrees with its slots and winner.
fn check_match(m: &Match) -> Result<()> {
    let valid = match m.status() {
        MatchStatus::Pending => m.winner().is_none() && !m.is_played(),
        MatchStatus::InProgress => m.winner().is_none() && m.is_played(),
        MatchStatus::Completed => match m.winner() {
            Some(winner) => m.contains(winner) && m.entrants().iter().all(|s| !s.is_tbd()),
            None => false,
        },
    };

    if valid {
        Ok(())
    } else {
        Err(malformed(format!(
            "match {} is {} with slots {:?} and winner {:?}",
            m.id(),
            m.status(),
            m.entrants(),
            m.winner()
        )))
    }
}

/// Builds a new bracket with the format, seeds and options of `bracket` and reports the winner
/// of every played match in round order.
fn replay(bracket: &Bracket) -> Result<Bracket> {
    let mut expected = Bracket::new(
        bracket.format(),
        bracket.seeds().to_vec(),
        bracket.options().clone(),
    )
    .map_err(malformed)?;

    for m in bracket.matches() {
        if m.status() != MatchStatus::Completed || !m.is_played() {
            continue;
        }

        if let Some(winner) = m.winner() {
            expected.apply_result(m.id(), winner).map_err(malformed)?;
        }
    }

    Ok(expected)
}

#[inline]
fn malformed<T>(err: T) -> Error
where
    T: ToString,
{
    Error::MalformedBracketData(err.to_string())
}

impl Serialize for Slot {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Participant(id) => serializer.serialize_u64(id.0),
            Self::Bye => serializer.serialize_str("bye"),
            Self::TBD => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SlotVisitor;

        impl<'de> Visitor<'de> for SlotVisitor {
            type Value = Slot;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("a participant id, \"bye\" or null")
            }

            fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Slot::Participant(ParticipantId(v)))
            }

            fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                match v {
                    "bye" => Ok(Slot::Bye),
                    _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
                }
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Slot::TBD)
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Slot::TBD)
            }
        }

        deserializer.deserialize_any(SlotVisitor)
    }
}

/// Serializes the bracket into the same form as [`Bracket::serialize`].
impl Serialize for Bracket {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        BracketBlob::from(self).serialize(serializer)
    }
}

/// Deserializes and validates the bracket, see [`Bracket::deserialize`].
impl<'de> Deserialize<'de> for Bracket {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let blob = BracketBlob::deserialize(deserializer)?;
        Bracket::from_blob(blob).map_err(de::Error::custom)
    }
}
