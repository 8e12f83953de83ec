use crate::core::car::{Car, CarId};
use crate::core::championship::PointsTable;
use crate::core::error::SimError;
use crate::core::matchmaking::MatchmakingPars;
use crate::core::performance::{compute_performance, PerformanceProfile};
use crate::core::route::{HazardKind, Route, RouteId};
use crate::core::weather::{draw_weather, WeatherSnapshot};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// * `launch_coeff` - (s) Time loss per launch (start plus every braking zone exit) at an
/// acceleration figure of 1
/// * `corner_coeff` - (s) Cornering time loss per squared technical rating at a handling of 1
/// * `brake_coeff` - (s) Braking time loss per squared braking zone count at a braking of 1
/// * `checkpoint_claim_prob` - Probability of claiming a checkpoint bonus in full visibility
/// * `hazard_hit_prob` - Probability of running into a hazard in dry daylight
/// * `nitrous_bonus` - (s) Time gained by the single nitrous boost of a race
/// * `min_time_fraction` - Lower bound of the race time as fraction of the pure cruise time
/// * `matchmaking` - Matchmaking parameters
/// * `points_table` - Championship points per placement
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimConstants {
    pub launch_coeff: f64,
    pub corner_coeff: f64,
    pub brake_coeff: f64,
    pub checkpoint_claim_prob: f64,
    pub hazard_hit_prob: f64,
    pub nitrous_bonus: f64,
    pub min_time_fraction: f64,
    pub matchmaking: MatchmakingPars,
    pub points_table: PointsTable,
}

impl Default for SimConstants {
    fn default() -> Self {
        SimConstants {
            launch_coeff: 2.0,
            corner_coeff: 8.0,
            brake_coeff: 0.8,
            checkpoint_claim_prob: 0.6,
            hazard_hit_prob: 0.35,
            nitrous_bonus: 1.5,
            min_time_fraction: 0.5,
            matchmaking: MatchmakingPars::default(),
            points_table: PointsTable::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RaceEventKind {
    CheckpointBonus { checkpoint: u32 },
    HazardPenalty { hazard: u32, kind: HazardKind },
    NitrousBoost,
}

/// * `car_id` - Car the event applies to
/// * `distance` - (km) Position on the route
/// * `kind` - What happened
/// * `delta` - (s) Effect on the race time, negative for bonuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEvent {
    pub car_id: CarId,
    pub distance: f64,
    pub kind: RaceEventKind,
    pub delta: f64,
}

/// Result of a simulated head-to-head race. It cannot be changed once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    id: u64,
    participants: [CarId; 2],
    route_id: RouteId,
    started_at: DateTime<Utc>,
    weather: WeatherSnapshot,
    times: BTreeMap<CarId, f64>,
    winner: CarId,
    events: Vec<RaceEvent>,
}

impl Race {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// participants returns both car ids in ascending order.
    pub fn participants(&self) -> [CarId; 2] {
        self.participants
    }

    pub fn route_id(&self) -> RouteId {
        self.route_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }

    /// times returns the race time (s) of every participant.
    pub fn times(&self) -> &BTreeMap<CarId, f64> {
        &self.times
    }

    pub fn time_of(&self, car_id: CarId) -> Option<f64> {
        self.times.get(&car_id).copied()
    }

    pub fn winner(&self) -> CarId {
        self.winner
    }

    pub fn loser(&self) -> CarId {
        if self.participants[0] == self.winner {
            self.participants[1]
        } else {
            self.participants[0]
        }
    }

    /// placements returns the participants in finishing order.
    pub fn placements(&self) -> [CarId; 2] {
        [self.winner, self.loser()]
    }

    /// margin returns the gap (s) between winner and loser.
    pub fn margin(&self) -> f64 {
        match (self.time_of(self.loser()), self.time_of(self.winner)) {
            (Some(t_loser), Some(t_winner)) => t_loser - t_winner,
            _ => 0.0,
        }
    }

    pub fn events(&self) -> &[RaceEvent] {
        &self.events
    }

    pub fn events_of(&self, car_id: CarId) -> impl Iterator<Item = &RaceEvent> {
        self.events.iter().filter(move |ev| ev.car_id == car_id)
    }
}

/// pick_winner returns the car with the lower race time. Exactly equal times go to the car
/// with the lower id.
pub fn pick_winner(a: (CarId, f64), b: (CarId, f64)) -> CarId {
    if a.1 < b.1 || (a.1 == b.1 && a.0 < b.0) {
        a.0
    } else {
        b.0
    }
}

/// generate_race_events draws the events of one car. Every checkpoint and every hazard
/// consumes exactly one draw, independent of the outcome.
pub fn generate_race_events<R: Rng + ?Sized>(
    car: &Car,
    route: &Route,
    weather: &WeatherSnapshot,
    sim_consts: &SimConstants,
    rng: &mut R,
) -> Vec<RaceEvent> {
    let mut events = Vec::new();

    let p_claim = (sim_consts.checkpoint_claim_prob * weather.visibility).clamp(0.0, 1.0);
    for cp in route.checkpoints.iter() {
        if rng.gen::<f64>() < p_claim {
            events.push(RaceEvent {
                car_id: car.id,
                distance: cp.distance,
                kind: RaceEventKind::CheckpointBonus { checkpoint: cp.id },
                delta: -cp.bonus_time,
            });
        }
    }

    let p_hit = (sim_consts.hazard_hit_prob * (2.0 - weather.grip) * (2.0 - weather.visibility))
        .clamp(0.0, 1.0);
    for hazard in route.hazards.iter() {
        if rng.gen::<f64>() < p_hit {
            events.push(RaceEvent {
                car_id: car.id,
                distance: hazard.distance,
                kind: RaceEventKind::HazardPenalty {
                    hazard: hazard.id,
                    kind: hazard.kind,
                },
                delta: hazard.penalty * (2.0 - weather.grip),
            });
        }
    }

    if car.customizations.nitrous {
        // fired on the final straight
        events.push(RaceEvent {
            car_id: car.id,
            distance: route.distance * 0.9,
            kind: RaceEventKind::NitrousBoost,
            delta: -sim_consts.nitrous_bonus,
        });
    }

    events.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    events
}

/// calc_race_time combines the weather-adjusted profile and the events into the race time (s).
/// The time grows when any profile figure drops and with every penalty, and shrinks with every
/// bonus. It never falls below `min_time_fraction` of the cruise time.
pub fn calc_race_time(
    profile: &PerformanceProfile,
    route: &Route,
    events: &[RaceEvent],
    sim_consts: &SimConstants,
) -> f64 {
    let t_cruise = 3600.0 * route.distance / profile.top_speed;
    let t_launch = sim_consts.launch_coeff * (route.braking_zones + 1) as f64 / profile.acceleration;

    let t_corner = if route.technical_rating > 0.0 {
        sim_consts.corner_coeff * route.technical_rating.powi(2) / profile.handling
    } else {
        0.0
    };

    let t_brake = if route.braking_zones > 0 {
        sim_consts.brake_coeff * (route.braking_zones as f64).powi(2) / profile.braking
    } else {
        0.0
    };

    let t_events: f64 = events.iter().map(|ev| ev.delta).sum();

    (t_cruise + t_launch + t_corner + t_brake + t_events).max(sim_consts.min_time_fraction * t_cruise)
}

/// simulate_race races two cars against each other on the route. If the route has no pinned
/// weather, a fresh draw is made. Both cars are processed in ascending id order, so swapping
/// the arguments does not change the result.
pub fn simulate_race<R: Rng + ?Sized>(
    car_a: &Car,
    car_b: &Car,
    route: &Route,
    started_at: DateTime<Utc>,
    sim_consts: &SimConstants,
    rng: &mut R,
) -> Result<Race, SimError> {
    if car_a.id == car_b.id {
        return Err(SimError::InvalidCar(format!(
            "car {} cannot race against itself",
            car_a.id
        )));
    }
    if route.checkpoints.is_empty() {
        return Err(SimError::EmptyRoute {
            route_id: route.id,
            distance: route.distance,
        });
    }

    let weather = match route.weather {
        Some(weather) => weather,
        None => draw_weather(rng),
    };
    let id = rng.gen::<u64>();

    let (first, second) = if car_a.id < car_b.id {
        (car_a, car_b)
    } else {
        (car_b, car_a)
    };

    let mut times = BTreeMap::new();
    let mut events = Vec::new();

    for car in [first, second] {
        let profile = compute_performance(car, route)?.in_conditions(&weather);
        let car_events = generate_race_events(car, route, &weather, sim_consts, rng);
        let t_race = calc_race_time(&profile, route, &car_events, sim_consts);

        debug!(
            car = car.id,
            t_race,
            no_events = car_events.len(),
            "car finished"
        );
        times.insert(car.id, t_race);
        events.extend(car_events);
    }
    events.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let winner = pick_winner(
        (first.id, times[&first.id]),
        (second.id, times[&second.id]),
    );

    info!(
        race = id,
        route = %route.name,
        weather = %weather.kind,
        winner,
        "race simulated"
    );

    Ok(Race {
        id,
        participants: [first.id, second.id],
        route_id: route.id,
        started_at,
        weather,
        times,
        winner,
        events,
    })
}
