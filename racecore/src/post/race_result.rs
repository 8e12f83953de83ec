use crate::core::car::{Car, CarId};
use crate::core::championship::Championship;
use crate::core::class::CarClass;
use crate::core::matchmaking::Opponent;
use crate::core::race::{Race, RaceEventKind};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Entrant is used to store the label of a race participant for post-processing the results.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Entrant {
    pub car_id: CarId,
    pub label: String,
    pub class: CarClass,
    pub ai: bool,
}

impl Entrant {
    fn new(car: &Car, ai: bool) -> Entrant {
        Entrant {
            car_id: car.id,
            label: format!("{} {}", car.make, car.model),
            class: car.class(),
            ai,
        }
    }
}

/// RaceResult contains all race information that is required for post-processing the results.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RaceResult {
    pub race: Race,
    pub entrants: Vec<Entrant>,
}

#[derive(Debug, Serialize)]
struct RaceRow<'a> {
    run: usize,
    race_id: u64,
    route_id: u32,
    weather: String,
    winner: CarId,
    winner_label: &'a str,
    winner_time: f64,
    loser: CarId,
    loser_label: &'a str,
    loser_time: f64,
    margin: f64,
    events: usize,
}

#[derive(Debug, Serialize)]
struct StandingsRow<'a> {
    position: usize,
    car_id: CarId,
    car: &'a str,
    points: u32,
    prize: Option<u64>,
}

impl RaceResult {
    pub fn new(race: Race, car: &Car, opponent: &Opponent) -> RaceResult {
        let mut entrants = vec![
            Entrant::new(car, false),
            Entrant::new(opponent.car(), opponent.is_ai()),
        ];
        entrants.sort_by_key(|entrant| entrant.car_id);

        RaceResult { race, entrants }
    }

    pub fn opponent_is_ai(&self) -> bool {
        self.entrants.iter().any(|entrant| entrant.ai)
    }

    pub fn label_of(&self, car_id: CarId) -> &str {
        self.entrants
            .iter()
            .find(|entrant| entrant.car_id == car_id)
            .map_or("unknown", |entrant| entrant.label.as_str())
    }

    /// print_race_result prints the race times and the events of both participants to the
    /// console output.
    pub fn print_race_result(&self) {
        let race = &self.race;
        println!(
            "RESULT: Race {} on route {} ({}), start {}",
            race.id(),
            race.route_id(),
            race.weather().kind,
            race.started_at().format("%Y-%m-%d %H:%M")
        );

        for (pos, car_id) in race.placements().iter().enumerate() {
            let ai_tag = if self.entrants.iter().any(|e| e.car_id == *car_id && e.ai) {
                " [AI]"
            } else {
                ""
            };
            println!(
                "{:2}. {:>10} {:30} {:9.3}s",
                pos + 1,
                car_id,
                format!("{}{}", self.label_of(*car_id), ai_tag),
                race.time_of(*car_id).unwrap_or(f64::NAN)
            );
        }
        println!("RESULT: Margin {:.3}s", race.margin());

        for ev in race.events() {
            let what = match ev.kind {
                RaceEventKind::CheckpointBonus { checkpoint } => {
                    format!("checkpoint {} bonus", checkpoint)
                }
                RaceEventKind::HazardPenalty { hazard, kind } => {
                    format!("hazard {} ({:?})", hazard, kind)
                }
                RaceEventKind::NitrousBoost => "nitrous boost".to_owned(),
            };
            println!(
                "  {:7.2}km car {:>10}: {} ({:+.2}s)",
                ev.distance, ev.car_id, what, ev.delta
            );
        }
    }
}

/// entrant_labels collects the labels of all cars that took part in the races.
pub fn entrant_labels(race_results: &[RaceResult]) -> BTreeMap<CarId, String> {
    race_results
        .iter()
        .flat_map(|result| result.entrants.iter())
        .map(|entrant| {
            let label = if entrant.ai {
                format!("{} [AI]", entrant.label)
            } else {
                entrant.label.to_owned()
            };
            (entrant.car_id, label)
        })
        .collect()
}

/// win_counts returns the number of wins of every car over a set of races.
pub fn win_counts(race_results: &[RaceResult]) -> BTreeMap<CarId, u32> {
    let mut counts = BTreeMap::new();
    for result in race_results {
        for car_id in result.race.participants() {
            counts.entry(car_id).or_insert(0);
        }
        *counts.entry(result.race.winner()).or_insert(0) += 1;
    }
    counts
}

/// print_win_rates prints the share of races won by each car.
pub fn print_win_rates(race_results: &[RaceResult]) {
    let labels = entrant_labels(race_results);
    let no_races = race_results.len().max(1) as f64;

    println!("RESULT: Wins over {} races", race_results.len());
    for (car_id, wins) in win_counts(race_results) {
        println!(
            "{:>10} {:30} {:5} ({:5.1}%)",
            car_id,
            labels.get(&car_id).map_or("unknown", String::as_str),
            wins,
            wins as f64 / no_races * 100.0
        );
    }
}

/// write_race_results_csv writes one line per race to a CSV file.
pub fn write_race_results_csv(race_results: &[RaceResult], path: &Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .context(format!("Failed to create result file {}!", path.display()))?;

    for (run, result) in race_results.iter().enumerate() {
        let race = &result.race;
        wtr.serialize(RaceRow {
            run: run + 1,
            race_id: race.id(),
            route_id: race.route_id(),
            weather: race.weather().kind.to_string(),
            winner: race.winner(),
            winner_label: result.label_of(race.winner()),
            winner_time: race.time_of(race.winner()).unwrap_or(f64::NAN),
            loser: race.loser(),
            loser_label: result.label_of(race.loser()),
            loser_time: race.time_of(race.loser()).unwrap_or(f64::NAN),
            margin: race.margin(),
            events: race.events().len(),
        })
        .context("Failed to write race result!")?;
    }

    wtr.flush()
        .context(format!("Failed to write result file {}!", path.display()))?;
    Ok(())
}

/// print_standings prints the schedule and the current leaderboard of the championship.
pub fn print_standings(championship: &Championship, labels: &BTreeMap<CarId, String>) {
    println!(
        "RESULT: {} {} ({:?}), {} to {}",
        championship.name,
        championship.season,
        championship.status(),
        championship.start_date.format("%Y-%m-%d"),
        championship.end_date.format("%Y-%m-%d")
    );
    for round in championship.rounds() {
        println!(
            "  round {:2} {} {:25} x{} {}",
            round.number,
            round.date.format("%Y-%m-%d %H:%M"),
            round.route.name,
            round.multiplier,
            if round.is_completed() { "done" } else { "open" }
        );
    }

    println!("RESULT: Standings");
    for (pos, (car_id, points)) in championship.leaderboard().iter().enumerate() {
        let prize = championship
            .prize_for(*car_id)
            .map_or_else(String::new, |p| format!("{:>10}", p));
        println!(
            "{:2}. {:>10} {:30} {:5} {}",
            pos + 1,
            car_id,
            labels.get(car_id).map_or("unknown", String::as_str),
            points,
            prize
        );
    }
}

/// write_standings_csv writes the leaderboard of the championship to a CSV file.
pub fn write_standings_csv(
    championship: &Championship,
    labels: &BTreeMap<CarId, String>,
    path: &Path,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .context(format!("Failed to create standings file {}!", path.display()))?;

    for (pos, (car_id, points)) in championship.leaderboard().iter().enumerate() {
        wtr.serialize(StandingsRow {
            position: pos + 1,
            car_id: *car_id,
            car: labels.get(car_id).map_or("unknown", String::as_str),
            points: *points,
            prize: championship.prize_for(*car_id),
        })
        .context("Failed to write standings row!")?;
    }

    wtr.flush()
        .context(format!("Failed to write standings file {}!", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::car::tests::test_car;
    use crate::core::matchmaking::ai_opponent;
    use crate::core::race::{simulate_race, SimConstants};
    use crate::core::route::tests::test_route;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn results(n: u64) -> Vec<RaceResult> {
        let car = test_car(7, 300.0, 1300.0, 1000.0);
        let opponent = Opponent::Ai(ai_opponent(car.class()).unwrap());
        let route = test_route(1, 10.0);
        let start = Utc.with_ymd_and_hms(2026, 10, 17, 20, 0, 0).unwrap();

        (0..n)
            .map(|seed| {
                let race = simulate_race(
                    &car,
                    opponent.car(),
                    &route,
                    start,
                    &SimConstants::default(),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
                RaceResult::new(race, &car, &opponent)
            })
            .collect()
    }

    #[test]
    fn entrants_are_ordered_and_labeled() {
        let result = &results(1)[0];
        assert_eq!(result.entrants[0].car_id, 7);
        assert!(!result.entrants[0].ai);
        assert!(result.entrants[1].ai);
        assert!(result.opponent_is_ai());
        assert_eq!(result.label_of(7), "Subaru Impreza WRX");
        assert_eq!(result.label_of(8), "unknown");
    }

    #[test]
    fn wins_add_up() {
        let results = results(20);
        let counts = win_counts(&results);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.values().sum::<u32>(), 20);

        let labels = entrant_labels(&results);
        assert!(labels.values().any(|label| label.ends_with("[AI]")));
    }

    #[test]
    fn race_results_csv() {
        let path = std::env::temp_dir().join("streetrace_race_results_test.csv");
        write_race_results_csv(&results(3), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("run,race_id,route_id,weather,winner"));
        assert_eq!(lines.count(), 3);
        std::fs::remove_file(&path).unwrap();
    }
}
