use std::fs;
use std::path::{Path, PathBuf};

use arena_bracket::options::{OptionValue, TournamentOptionValues};
use arena_bracket::{
    BracketTag, Format, MatchId, ParticipantId, Roster, Seeding, SeedingMethod, Slot,
    Tournament,
};
use clap::Subcommand;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::config::Config;
use crate::{state, Error, Result};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Builds a new bracket from a roster file, replacing the current state.
    Build {
        /// A JSON array of `{"id", "display_name", "seed_rank"?}` records.
        roster: PathBuf,
        #[arg(short, long)]
        format: Option<Format>,
        #[arg(short, long)]
        seeding: Option<SeedingMethod>,
        /// The comma separated participant ids used by manual seeding.
        #[arg(long)]
        order: Option<String>,
        /// A format option as `key=value`. Can be given multiple times.
        #[arg(short, long = "option")]
        options: Vec<String>,
    },
    /// Rebuilds the bracket with a new seeding, discarding all results.
    Reseed {
        seeding: SeedingMethod,
        #[arg(long)]
        order: Option<String>,
    },
    /// Reports the winner of a match.
    Report { id: u64, winner: u64 },
    /// Reopens a completed match.
    Reopen { id: u64 },
    /// Prints all rounds and matches.
    Show,
    /// Prints the standings.
    Standings,
}

impl Command {
    pub fn run(self, config: &Config, path: &Path) -> Result<()> {
        match self {
            Self::Build {
                roster,
                format,
                seeding,
                order,
                options,
            } => {
                let roster: Roster = serde_json::from_str(&fs::read_to_string(roster)?)?;
                let format = format.unwrap_or(config.format);
                let seeding = seeding_from_args(seeding.unwrap_or(config.seeding), order)?;
                let options = parse_options(&options)?;

                let tournament = Tournament::build_with_rng(
                    roster,
                    format,
                    seeding,
                    options,
                    &mut *rng(config),
                )?;

                log::info!(
                    "Built {} bracket with {} participants",
                    format,
                    tournament.roster().len()
                );

                state::store(path, &tournament)?;
                print_bracket(&tournament);
            }
            Self::Reseed { seeding, order } => {
                let mut tournament = state::load(path)?;
                let seeding = seeding_from_args(seeding, order)?;

                tournament.reseed_with_rng(seeding, &mut *rng(config))?;

                state::store(path, &tournament)?;
                print_bracket(&tournament);
            }
            Self::Report { id, winner } => {
                let mut tournament = state::load(path)?;
                tournament.report_result(MatchId(id), ParticipantId(winner))?;

                log::info!("Reported {} as winner of match {}", winner, id);

                state::store(path, &tournament)?;
                if let Some(champion) = tournament.champion() {
                    println!("Champion: {}", champion.display_name);
                }
            }
            Self::Reopen { id } => {
                let mut tournament = state::load(path)?;
                tournament.reopen(MatchId(id))?;

                log::info!("Reopened match {}", id);

                state::store(path, &tournament)?;
            }
            Self::Show => {
                let tournament = state::load(path)?;
                print_bracket(&tournament);
            }
            Self::Standings => {
                let tournament = state::load(path)?;
                let standings = tournament.standings();

                println!("# | Participant | {}", standings.keys().join(" | "));
                for (index, entry) in standings.iter().enumerate() {
                    let values: Vec<String> =
                        entry.values().iter().map(|v| v.to_string()).collect();

                    println!(
                        "{} | {} | {}",
                        index + 1,
                        name(&tournament, entry.participant),
                        values.join(" | ")
                    );
                }
            }
        }

        Ok(())
    }
}

/// Returns a seeded rng if the config fixes a seed.
fn rng(config: &Config) -> Box<dyn RngCore> {
    match config.rng_seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    }
}

fn seeding_from_args(method: SeedingMethod, order: Option<String>) -> Result<Seeding> {
    let order = match order {
        Some(order) => Some(parse_order(&order)?),
        None => None,
    };

    Ok(Seeding::from_method(method, order)?)
}

fn parse_order(s: &str) -> Result<Vec<ParticipantId>> {
    s.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse()
                .map(ParticipantId)
                .map_err(|_| Error::InvalidParticipantId(id.to_owned()))
        })
        .collect()
}

fn parse_options(options: &[String]) -> Result<TournamentOptionValues> {
    let mut values = TournamentOptionValues::new();

    for option in options {
        let (key, value) = option
            .split_once('=')
            .ok_or_else(|| Error::InvalidOptionArgument(option.clone()))?;

        let value: OptionValue = value
            .trim()
            .parse()
            .map_err(arena_bracket::Error::from)?;

        values.set(key.trim(), value);
    }

    Ok(values)
}

fn name(tournament: &Tournament, id: ParticipantId) -> String {
    match tournament.participant(id) {
        Some(participant) => participant.display_name.clone(),
        None => id.to_string(),
    }
}

fn slot(tournament: &Tournament, slot: Slot) -> String {
    match slot {
        Slot::Participant(id) => name(tournament, id),
        Slot::Bye => String::from("(bye)"),
        Slot::TBD => String::from("TBD"),
    }
}

fn print_bracket(tournament: &Tournament) {
    let bracket = tournament.bracket();
    println!("{} | {}", bracket.format(), bracket.status());

    for round in bracket.rounds() {
        let tag = match round.bracket() {
            Some(BracketTag::Winners) => "Winners ",
            Some(BracketTag::Losers) => "Losers ",
            Some(BracketTag::GrandFinal) => "Grand Final ",
            Some(BracketTag::ThirdPlace) => "Third Place ",
            None => "",
        };

        println!("{}Round {}", tag, round.number());
        for m in round.matches() {
            let [first, second] = *m.entrants();

            let winner = match m.winner() {
                Some(id) => format!(" -> {}", name(tournament, id)),
                None => String::new(),
            };

            println!(
                "  #{} {} vs {} [{}]{}",
                m.id(),
                slot(tournament, first),
                slot(tournament, second),
                m.status(),
                winner
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use arena_bracket::options::OptionValue;
    use arena_bracket::ParticipantId;

    use super::{parse_options, parse_order};
    use crate::Error;

    #[test]
    fn test_parse_order() {
        assert_eq!(
            parse_order("3, 1,2").unwrap(),
            vec![ParticipantId(3), ParticipantId(1), ParticipantId(2)]
        );
        assert!(matches!(
            parse_order("3,x"),
            Err(Error::InvalidParticipantId(id)) if id == "x"
        ));
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&[
            String::from("third_place_match=true"),
            String::from("rounds = 4"),
        ])
        .unwrap();

        assert_eq!(
            options.get("third_place_match"),
            Some(&OptionValue::Bool(true))
        );
        assert_eq!(options.get("rounds"), Some(&OptionValue::U64(4)));

        assert!(matches!(
            parse_options(&[String::from("rounds")]),
            Err(Error::InvalidOptionArgument(_))
        ));
        assert!(matches!(
            parse_options(&[String::from("rounds=-1")]),
            Err(Error::Bracket(arena_bracket::Error::InvalidOption(_)))
        ));
    }
}
