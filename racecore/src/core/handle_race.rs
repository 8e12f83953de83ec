use crate::core::car::CarId;
use crate::core::championship::{build_season, Championship};
use crate::core::matchmaking::{find_match_by_id, CarRegistry, Garage, PoolProvider};
use crate::core::race::{simulate_race, SimConstants};
use crate::core::route::Route;
use crate::post::race_result::RaceResult;
use anyhow::Context;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

/// SeasonResult contains the final championship and the results of all its rounds.
#[derive(Debug, Clone)]
pub struct SeasonResult {
    pub championship: Championship,
    pub race_results: Vec<RaceResult>,
}

/// handle_race matches an opponent for the car on the route and simulates the race, returning
/// the result for post-processing.
pub fn handle_race<G, P, R>(
    registry: &G,
    provider: &P,
    car_id: CarId,
    route: &Route,
    started_at: DateTime<Utc>,
    sim_consts: &SimConstants,
    rng: &mut R,
) -> anyhow::Result<RaceResult>
where
    G: CarRegistry + ?Sized,
    P: PoolProvider + ?Sized,
    R: Rng + ?Sized,
{
    let car = registry
        .get_car(car_id)
        .context(format!("Car {} is not registered!", car_id))?;
    let opponent = find_match_by_id(registry, provider, car_id, route, &sim_consts.matchmaking)
        .context(format!(
            "Failed to find an opponent for car {} on route {}!",
            car_id, route.name
        ))?;

    let race = simulate_race(car, opponent.car(), route, started_at, sim_consts, rng).context(
        format!("Failed to simulate race of car {} on route {}!", car_id, route.name),
    )?;

    Ok(RaceResult::new(race, car, &opponent))
}

/// apply_stats updates the statistics of every registered participant of the race.
pub fn apply_stats(garage: &mut Garage, race_result: &RaceResult) {
    for car_id in race_result.race.participants() {
        if let Some(car) = garage.get_car_mut(car_id) {
            car.stats.record(&race_result.race, car_id);
        }
    }
}

/// handle_season schedules a championship over the route rotation and races every round with
/// the player car. Statistics of the registered cars are updated after each round.
#[allow(clippy::too_many_arguments)]
pub fn handle_season<P, R>(
    garage: &mut Garage,
    provider: &P,
    player_car: CarId,
    routes: &[Route],
    name: &str,
    round_count: u32,
    now: DateTime<Utc>,
    sim_consts: &SimConstants,
    rng: &mut R,
) -> anyhow::Result<SeasonResult>
where
    P: PoolProvider + ?Sized,
    R: Rng + ?Sized,
{
    let mut championship = build_season(1, name, routes, round_count, now)
        .context("Failed to schedule the championship!")?;
    info!(
        championship = %championship.name,
        season = %championship.season,
        rounds = round_count,
        "season scheduled"
    );

    let mut race_results = Vec::with_capacity(round_count as usize);

    while let Some((idx, round)) = championship.next_round() {
        let (number, route_id, date) = (round.number, round.route.id, round.date);
        let route = routes
            .iter()
            .find(|route| route.id == route_id)
            .context(format!("Route {} of round {} is unknown!", route_id, number))?;

        let race_result = handle_race(
            &*garage,
            provider,
            player_car,
            route,
            date,
            sim_consts,
            rng,
        )
        .context(format!("Failed to race round {}!", number))?;

        if race_result.opponent_is_ai() {
            info!(round = number, route = %route.name, "AI opponent entered");
        }

        championship
            .complete_round(idx, &race_result.race, &sim_consts.points_table)
            .context(format!("Failed to score round {}!", number))?;
        apply_stats(garage, &race_result);
        race_results.push(race_result);
    }

    Ok(SeasonResult {
        championship,
        race_results,
    })
}
